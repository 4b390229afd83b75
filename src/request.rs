//! Request normalization.
//!
//! Turns the up-to-three free-form codes from the query into a
//! `ComparisonRequest` of 1–3 distinct registry codes. Validation happens
//! here, before anything touches the network.

use crate::model::VizError;
use crate::states::StateCode;

/// Most states a single chart will compare.
pub const MAX_STATES: usize = 3;

/// 1–3 distinct, validated state codes in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRequest {
    states: Vec<StateCode>,
}

impl ComparisonRequest {
    pub fn states(&self) -> &[StateCode] {
        &self.states
    }

    /// Number of requested states: 1, 2 or 3.
    pub fn arity(&self) -> usize {
        self.states.len()
    }
}

/// Validates and deduplicates the raw codes.
///
/// Empty strings in the optional slots count as absent. Every non-empty code
/// is checked against the registry first, in slot order, so the error names
/// the first unknown code. Duplicates are then collapsed with this precedence:
///
/// 1. all three equal: drop slots 2 and 3
/// 2. slot 1 == slot 3: drop slot 3
/// 3. slot 2 == slot 3: drop slot 3
/// 4. slot 1 == slot 2: promote slot 3 into slot 2 if present, else drop slot 2
///
/// Remaining empty slots are closed up, so `(A, -, B)` becomes `(A, B)`.
pub fn normalize(
    statecode: &str,
    statecode2: Option<&str>,
    statecode3: Option<&str>,
) -> Result<ComparisonRequest, VizError> {
    let first = validate(statecode)?;
    let mut second = validate_optional(statecode2)?;
    let mut third = validate_optional(statecode3)?;

    let first = Some(first);
    if first == second && second == third {
        second = None;
        third = None;
    } else if first == third {
        third = None;
    } else if second.is_some() && second == third {
        third = None;
    } else if first == second {
        second = third.take();
    }

    let states: Vec<StateCode> = [first, second, third].into_iter().flatten().collect();
    debug_assert!(!states.is_empty() && states.len() <= MAX_STATES);

    Ok(ComparisonRequest { states })
}

fn validate(raw: &str) -> Result<StateCode, VizError> {
    StateCode::parse(raw).ok_or_else(|| VizError::StateNotFound(raw.trim().to_ascii_uppercase()))
}

fn validate_optional(raw: Option<&str>) -> Result<Option<StateCode>, VizError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(code) => validate(code).map(Some),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
