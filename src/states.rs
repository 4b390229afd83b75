/// State registry for the unemployment visualization service.
///
/// Defines the canonical list of USPS codes the service accepts (the 50
/// states plus the District of Columbia) along with their display names.
/// This is the single source of truth for state codes; all other modules
/// should obtain a `StateCode` from here rather than passing raw strings.

use std::fmt;

// ---------------------------------------------------------------------------
// State metadata
// ---------------------------------------------------------------------------

/// Metadata for a single registry entry.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct State {
    /// Two-letter USPS abbreviation, upper case.
    pub code: &'static str,
    /// Full name used in chart titles and legends.
    pub name: &'static str,
}

/// All codes the service accepts, alphabetical by name.
///
/// Source: USPS state abbreviations. FRED publishes a `<CODE>UR` monthly
/// unemployment series for every entry.
pub static STATE_REGISTRY: &[State] = &[
    State { code: "AL", name: "Alabama" },
    State { code: "AK", name: "Alaska" },
    State { code: "AZ", name: "Arizona" },
    State { code: "AR", name: "Arkansas" },
    State { code: "CA", name: "California" },
    State { code: "CO", name: "Colorado" },
    State { code: "CT", name: "Connecticut" },
    State { code: "DE", name: "Delaware" },
    State { code: "DC", name: "District of Columbia" },
    State { code: "FL", name: "Florida" },
    State { code: "GA", name: "Georgia" },
    State { code: "HI", name: "Hawaii" },
    State { code: "ID", name: "Idaho" },
    State { code: "IL", name: "Illinois" },
    State { code: "IN", name: "Indiana" },
    State { code: "IA", name: "Iowa" },
    State { code: "KS", name: "Kansas" },
    State { code: "KY", name: "Kentucky" },
    State { code: "LA", name: "Louisiana" },
    State { code: "ME", name: "Maine" },
    State { code: "MD", name: "Maryland" },
    State { code: "MA", name: "Massachusetts" },
    State { code: "MI", name: "Michigan" },
    State { code: "MN", name: "Minnesota" },
    State { code: "MS", name: "Mississippi" },
    State { code: "MO", name: "Missouri" },
    State { code: "MT", name: "Montana" },
    State { code: "NE", name: "Nebraska" },
    State { code: "NV", name: "Nevada" },
    State { code: "NH", name: "New Hampshire" },
    State { code: "NJ", name: "New Jersey" },
    State { code: "NM", name: "New Mexico" },
    State { code: "NY", name: "New York" },
    State { code: "NC", name: "North Carolina" },
    State { code: "ND", name: "North Dakota" },
    State { code: "OH", name: "Ohio" },
    State { code: "OK", name: "Oklahoma" },
    State { code: "OR", name: "Oregon" },
    State { code: "PA", name: "Pennsylvania" },
    State { code: "RI", name: "Rhode Island" },
    State { code: "SC", name: "South Carolina" },
    State { code: "SD", name: "South Dakota" },
    State { code: "TN", name: "Tennessee" },
    State { code: "TX", name: "Texas" },
    State { code: "UT", name: "Utah" },
    State { code: "VT", name: "Vermont" },
    State { code: "VA", name: "Virginia" },
    State { code: "WA", name: "Washington" },
    State { code: "WV", name: "West Virginia" },
    State { code: "WI", name: "Wisconsin" },
    State { code: "WY", name: "Wyoming" },
];

// ---------------------------------------------------------------------------
// Validated code
// ---------------------------------------------------------------------------

/// A code known to be in [`STATE_REGISTRY`]. The only constructor is
/// [`StateCode::parse`], so holding one proves the code is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateCode(&'static State);

impl StateCode {
    /// Case-insensitive lookup. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<StateCode> {
        let wanted = raw.trim().to_ascii_uppercase();
        find_state(&wanted).map(StateCode)
    }

    pub fn as_str(&self) -> &'static str {
        self.0.code
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.code)
    }
}

/// Looks up a registry entry by exact (upper case) code.
pub fn find_state(code: &str) -> Option<&'static State> {
    STATE_REGISTRY.iter().find(|s| s.code == code)
}

/// Every registry code, in registry order.
pub fn all_state_codes() -> Vec<StateCode> {
    STATE_REGISTRY.iter().map(StateCode).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
