//! Trailing-window averages and narrative selection.
//!
//! Each requested state (and, for a single state, the national series) is
//! reduced to the mean of its observations in the reference year. The means
//! are dense-ranked, highest first, and the rank vector indexes a fixed table
//! of titles and line colors. Ties always land on a "same" narrative.
//!
//! # Clock injection
//! The reference year is passed in rather than read from the wall clock.
//! `reference_year_at` derives it from an explicit `now`; `reference_year`
//! is the convenience wrapper for production use.

use chrono::{DateTime, Datelike, Utc};

use crate::model::{TimeSeries, VizError, NATIONAL_LABEL};

/// How many years back the comparison window sits.
pub const TRAILING_YEARS: i32 = 5;

// ---------------------------------------------------------------------------
// Reference year
// ---------------------------------------------------------------------------

/// The comparison year for a request made at `now`.
pub fn reference_year_at(now: DateTime<Utc>) -> i32 {
    reference_year_for(now.year())
}

/// The comparison year when the current year is pinned explicitly.
pub fn reference_year_for(current_year: i32) -> i32 {
    current_year - TRAILING_YEARS
}

/// Convenience wrapper that uses the real current time.
/// Use `reference_year_at` in tests to keep them deterministic.
pub fn reference_year() -> i32 {
    reference_year_at(Utc::now())
}

/// Arithmetic mean of the observations dated in `year`, or `None` if there
/// are none.
pub fn trailing_mean(series: &TimeSeries, year: i32) -> Option<f64> {
    let (sum, count) = series
        .observations
        .iter()
        .filter(|o| o.date.year() == year)
        .fold((0.0, 0usize), |(sum, count), o| (sum + o.percent, count + 1));

    (count > 0).then(|| sum / count as f64)
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Line colors used by the narratives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineColor {
    /// Highest unemployment.
    ErrorRed,
    /// Lowest unemployment.
    SuccessGreen,
    /// In the middle, or tied.
    DarkCyan,
    /// National reference line when states are compared with each other.
    Black,
}

impl LineColor {
    /// CSS color string as it appears in the chart document.
    pub fn css(&self) -> &'static str {
        match self {
            LineColor::ErrorRed => "#CC0000",
            LineColor::SuccessGreen => "#4BB543",
            LineColor::DarkCyan => "darkcyan",
            LineColor::Black => "black",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            LineColor::ErrorRed => (0xCC, 0x00, 0x00),
            LineColor::SuccessGreen => (0x4B, 0xB5, 0x43),
            LineColor::DarkCyan => (0x00, 0x8B, 0x8B),
            LineColor::Black => (0x00, 0x00, 0x00),
        }
    }
}

// ---------------------------------------------------------------------------
// Narratives
// ---------------------------------------------------------------------------

/// Chart title plus one color per requested state and one for the national line.
#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub title: String,
    pub state_colors: Vec<LineColor>,
    pub national_color: LineColor,
}

/// Dense rank of each value, 0 for the highest. Equal values share a rank.
///
/// `[5.0, 4.0, 5.0]` ranks as `[0, 1, 0]`.
pub fn dense_ranks(values: &[f64]) -> Vec<usize> {
    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();

    values
        .iter()
        .map(|v| distinct.iter().position(|d| d == v).unwrap_or(0))
        .collect()
}

/// Picks the narrative for the ranked means.
///
/// `names` are the requested states' display names in slot order, `means`
/// their reference-year averages. `national_mean` is only consulted for a
/// single state, which is compared against the nation rather than a peer.
///
/// Returns `None` only for arities outside 1–3.
pub fn select_narrative(names: &[&str], means: &[f64], national_mean: f64, year: i32) -> Option<Narrative> {
    use LineColor::{Black, DarkCyan as Teal, ErrorRed as Red, SuccessGreen as Green};

    if names.len() != means.len() {
        return None;
    }

    if let [a] = names {
        let (title, state, national) = match dense_ranks(&[means[0], national_mean]).as_slice() {
            [0, 1] => (
                format!("{a} Unemployment Rates Averaged Higher than the {NATIONAL_LABEL} since {year}."),
                Red,
                Green,
            ),
            [1, 0] => (
                format!("{a} Unemployment Rates Averaged Lower than the {NATIONAL_LABEL} since {year}."),
                Green,
                Red,
            ),
            _ => (
                format!("{a} Averaged the Same Unemployment as the {NATIONAL_LABEL} since {year}."),
                Green,
                Teal,
            ),
        };
        return Some(Narrative { title, state_colors: vec![state], national_color: national });
    }

    let ranks = dense_ranks(means);
    let (title, state_colors) = match (names, ranks.as_slice()) {
        ([a, b], [0, 1]) => (
            format!("{a} Averaged Higher Unemployment than {b} since {year}."),
            vec![Red, Green],
        ),
        ([a, b], [1, 0]) => (
            format!("{a} Averaged Lower Unemployment than {b} since {year}."),
            vec![Green, Red],
        ),
        ([a, b], _) => (
            format!("{a} and {b} Averaged the Same Unemployment since {year}."),
            vec![Green, Teal],
        ),

        // Strict orderings.
        ([a, b, c], [0, 1, 2]) => (higher_than_both(a, b, c, year), vec![Red, Teal, Green]),
        ([a, b, c], [0, 2, 1]) => (higher_than_both(a, b, c, year), vec![Red, Green, Teal]),
        ([a, b, c], [1, 0, 2]) => (
            format!("{a} Averaged Higher Unemployment than {c}, but lower than {b} since {year}."),
            vec![Teal, Red, Green],
        ),
        ([a, b, c], [2, 0, 1]) => (lower_than_both(a, b, c, year), vec![Green, Red, Teal]),
        ([a, b, c], [2, 1, 0]) => (lower_than_both(a, b, c, year), vec![Green, Teal, Red]),
        ([a, b, c], [1, 2, 0]) => (
            format!("{a} Averaged Lower Unemployment than {c}, but higher than {b} since {year}."),
            vec![Teal, Green, Red],
        ),

        // The other two tied, first state strictly above or below them.
        ([a, b, c], [0, 1, 1]) => (higher_than_both(a, b, c, year), vec![Red, Teal, Teal]),
        ([a, b, c], [1, 0, 0]) => (lower_than_both(a, b, c, year), vec![Green, Teal, Teal]),

        // First state tied with one other.
        ([a, b, c], [0, 0, 1]) => (same_as_but(a, b, "higher", c, year), vec![Teal, Teal, Green]),
        ([a, b, c], [1, 1, 0]) => (same_as_but(a, b, "lower", c, year), vec![Teal, Teal, Red]),
        ([a, b, c], [0, 1, 0]) => (same_as_but(a, c, "higher", b, year), vec![Teal, Green, Teal]),
        ([a, b, c], [1, 0, 1]) => (same_as_but(a, c, "lower", b, year), vec![Teal, Red, Teal]),

        ([a, b, c], _) => (
            format!("{a}, {b} and {c} Averaged the Same Unemployment since {year}."),
            vec![Teal, Teal, Teal],
        ),

        _ => return None,
    };

    Some(Narrative { title, state_colors, national_color: Black })
}

fn higher_than_both(a: &str, b: &str, c: &str, year: i32) -> String {
    format!("{a} Averaged Higher Unemployment than {b} and {c} since {year}.")
}

fn lower_than_both(a: &str, b: &str, c: &str, year: i32) -> String {
    format!("{a} Averaged Lower Unemployment than {b} and {c} since {year}.")
}

fn same_as_but(a: &str, tied: &str, direction: &str, other: &str, year: i32) -> String {
    format!("{a} Averaged the Same Unemployment as {tied}, but {direction} than {other} since {year}.")
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Everything the renderer needs from the comparison step.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub year: i32,
    pub state_means: Vec<f64>,
    /// Only computed for single-state requests.
    pub national_mean: Option<f64>,
    pub narrative: Narrative,
}

/// Averages each series over `year` and selects the narrative.
///
/// Fails with `InsufficientData` if a series that takes part in the
/// comparison has no observations in `year`.
pub fn compare(states: &[TimeSeries], national: &TimeSeries, year: i32) -> Result<Comparison, VizError> {
    let mean_of = |series: &TimeSeries| {
        trailing_mean(series, year).ok_or_else(|| VizError::InsufficientData {
            series: series.id.to_string(),
            year,
        })
    };

    let state_means = states.iter().map(mean_of).collect::<Result<Vec<f64>, VizError>>()?;
    let national_mean = match states.len() {
        1 => Some(mean_of(national)?),
        _ => None,
    };

    let names: Vec<&str> = states.iter().map(|s| s.label()).collect();
    let narrative = select_narrative(&names, &state_means, national_mean.unwrap_or(f64::NAN), year)
        .ok_or_else(|| VizError::Render(format!("cannot compare {} states", states.len())))?;

    tracing::debug!(year, ?state_means, ?national_mean, title = %narrative.title, "comparison selected");

    Ok(Comparison { year, state_means, national_mean, narrative })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Observation, SeriesId};
    use crate::states::StateCode;
    use chrono::{NaiveDate, TimeZone};
    use LineColor::{Black, DarkCyan, ErrorRed, SuccessGreen};

    const YEAR: i32 = 2020;

    fn series(code: Option<&str>, year: i32, values: &[f64]) -> TimeSeries {
        let id = match code {
            Some(c) => SeriesId::State(StateCode::parse(c).unwrap()),
            None => SeriesId::National,
        };
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &percent)| Observation {
                date: NaiveDate::from_ymd_opt(year, i as u32 + 1, 1).unwrap(),
                percent,
            })
            .collect();
        TimeSeries::new(id, observations)
    }

    fn three(m1: f64, m2: f64, m3: f64) -> Narrative {
        select_narrative(&["Alpha", "Beta", "Gamma"], &[m1, m2, m3], f64::NAN, YEAR)
            .expect("3 states should always produce a narrative")
    }

    // --- Reference year -----------------------------------------------------

    #[test]
    fn test_reference_year_is_five_years_back() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(reference_year_at(now), 2020);
    }

    #[test]
    fn test_reference_year_on_new_years_day() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(reference_year_at(now), 2021);
    }

    // --- Trailing mean ------------------------------------------------------

    #[test]
    fn test_trailing_mean_uses_only_the_reference_year() {
        let mut s = series(Some("CA"), 2020, &[4.0, 6.0]);
        s.observations.extend(series(Some("CA"), 2021, &[100.0]).observations);
        s.observations.extend(series(Some("CA"), 2019, &[100.0]).observations);
        assert_eq!(trailing_mean(&s, 2020), Some(5.0));
    }

    #[test]
    fn test_trailing_mean_none_without_observations_in_year() {
        let s = series(Some("CA"), 2019, &[4.0, 6.0]);
        assert_eq!(trailing_mean(&s, 2020), None);
    }

    // --- Ranking ------------------------------------------------------------

    #[test]
    fn test_dense_ranks() {
        assert_eq!(dense_ranks(&[3.0, 2.0, 1.0]), vec![0, 1, 2]);
        assert_eq!(dense_ranks(&[1.0, 3.0, 2.0]), vec![2, 0, 1]);
        assert_eq!(dense_ranks(&[5.0, 4.0, 5.0]), vec![0, 1, 0]);
        assert_eq!(dense_ranks(&[2.0, 2.0, 2.0]), vec![0, 0, 0]);
    }

    // --- One state ----------------------------------------------------------

    #[test]
    fn test_single_state_higher_than_nation() {
        let n = select_narrative(&["California"], &[5.0], 4.0, YEAR).unwrap();
        assert_eq!(
            n.title,
            "California Unemployment Rates Averaged Higher than the United States since 2020."
        );
        assert_eq!(n.state_colors, vec![ErrorRed]);
        assert_eq!(n.national_color, SuccessGreen);
    }

    #[test]
    fn test_single_state_lower_than_nation() {
        let n = select_narrative(&["Utah"], &[3.0], 4.0, YEAR).unwrap();
        assert_eq!(n.title, "Utah Unemployment Rates Averaged Lower than the United States since 2020.");
        assert_eq!(n.state_colors, vec![SuccessGreen]);
        assert_eq!(n.national_color, ErrorRed);
    }

    #[test]
    fn test_single_state_same_as_nation() {
        let n = select_narrative(&["Ohio"], &[4.0], 4.0, YEAR).unwrap();
        assert_eq!(n.title, "Ohio Averaged the Same Unemployment as the United States since 2020.");
        assert_eq!(n.state_colors, vec![SuccessGreen]);
        assert_eq!(n.national_color, DarkCyan);
    }

    // --- Two states ---------------------------------------------------------

    #[test]
    fn test_two_states_are_antisymmetric() {
        let ab = select_narrative(&["Nevada", "Iowa"], &[6.0, 3.0], f64::NAN, YEAR).unwrap();
        assert_eq!(ab.title, "Nevada Averaged Higher Unemployment than Iowa since 2020.");
        assert_eq!(ab.state_colors, vec![ErrorRed, SuccessGreen]);

        let ba = select_narrative(&["Iowa", "Nevada"], &[3.0, 6.0], f64::NAN, YEAR).unwrap();
        assert_eq!(ba.title, "Iowa Averaged Lower Unemployment than Nevada since 2020.");
        assert_eq!(ba.state_colors, vec![SuccessGreen, ErrorRed]);

        assert_eq!(ab.national_color, Black);
        assert_eq!(ba.national_color, Black);
    }

    #[test]
    fn test_two_states_tied_use_same_narrative() {
        let n = select_narrative(&["Maine", "Vermont"], &[3.5, 3.5], f64::NAN, YEAR).unwrap();
        assert_eq!(n.title, "Maine and Vermont Averaged the Same Unemployment since 2020.");
        assert_eq!(n.state_colors, vec![SuccessGreen, DarkCyan]);
        assert!(!n.title.contains("Higher") && !n.title.contains("Lower"));
    }

    // --- Three states, strict orderings -------------------------------------

    #[test]
    fn test_three_states_first_highest_second_middle() {
        let n = three(3.0, 2.0, 1.0);
        assert_eq!(n.title, "Alpha Averaged Higher Unemployment than Beta and Gamma since 2020.");
        assert_eq!(n.state_colors, vec![ErrorRed, DarkCyan, SuccessGreen]);
    }

    #[test]
    fn test_three_states_first_highest_third_middle() {
        let n = three(3.0, 1.0, 2.0);
        assert_eq!(n.title, "Alpha Averaged Higher Unemployment than Beta and Gamma since 2020.");
        assert_eq!(n.state_colors, vec![ErrorRed, SuccessGreen, DarkCyan]);
    }

    #[test]
    fn test_three_states_second_highest_first_middle() {
        let n = three(2.0, 3.0, 1.0);
        assert_eq!(n.title, "Alpha Averaged Higher Unemployment than Gamma, but lower than Beta since 2020.");
        assert_eq!(n.state_colors, vec![DarkCyan, ErrorRed, SuccessGreen]);
    }

    #[test]
    fn test_three_states_second_highest_first_lowest() {
        let n = three(1.0, 3.0, 2.0);
        assert_eq!(n.title, "Alpha Averaged Lower Unemployment than Beta and Gamma since 2020.");
        assert_eq!(n.state_colors, vec![SuccessGreen, ErrorRed, DarkCyan]);
    }

    #[test]
    fn test_three_states_third_highest_first_lowest() {
        let n = three(1.0, 2.0, 3.0);
        assert_eq!(n.title, "Alpha Averaged Lower Unemployment than Beta and Gamma since 2020.");
        assert_eq!(n.state_colors, vec![SuccessGreen, DarkCyan, ErrorRed]);
    }

    #[test]
    fn test_three_states_third_highest_first_middle() {
        let n = three(2.0, 1.0, 3.0);
        assert_eq!(n.title, "Alpha Averaged Lower Unemployment than Gamma, but higher than Beta since 2020.");
        assert_eq!(n.state_colors, vec![DarkCyan, SuccessGreen, ErrorRed]);
    }

    #[test]
    fn test_three_state_strict_orderings_each_color_once() {
        let orderings = [
            (3.0, 2.0, 1.0),
            (3.0, 1.0, 2.0),
            (2.0, 3.0, 1.0),
            (1.0, 3.0, 2.0),
            (1.0, 2.0, 3.0),
            (2.0, 1.0, 3.0),
        ];
        let mut seen = std::collections::HashSet::new();
        for (a, b, c) in orderings {
            let n = three(a, b, c);
            let means = [a, b, c];
            for (i, color) in n.state_colors.iter().enumerate() {
                let expected = if means[i] == 3.0 {
                    ErrorRed
                } else if means[i] == 1.0 {
                    SuccessGreen
                } else {
                    DarkCyan
                };
                assert_eq!(*color, expected, "ordering {:?}, slot {}", means, i);
            }
            assert_eq!(n.national_color, Black);
            assert!(seen.insert(format!("{:?}", n.state_colors)), "color triple reused for {:?}", means);
        }
    }

    // --- Three states, ties -------------------------------------------------

    #[test]
    fn test_three_states_all_tied() {
        let n = three(4.0, 4.0, 4.0);
        assert_eq!(n.title, "Alpha, Beta and Gamma Averaged the Same Unemployment since 2020.");
        assert_eq!(n.state_colors, vec![DarkCyan, DarkCyan, DarkCyan]);
    }

    #[test]
    fn test_three_states_others_tied_below_first() {
        let n = three(5.0, 4.0, 4.0);
        assert_eq!(n.title, "Alpha Averaged Higher Unemployment than Beta and Gamma since 2020.");
        assert_eq!(n.state_colors, vec![ErrorRed, DarkCyan, DarkCyan]);
    }

    #[test]
    fn test_three_states_others_tied_above_first() {
        let n = three(3.0, 4.0, 4.0);
        assert_eq!(n.title, "Alpha Averaged Lower Unemployment than Beta and Gamma since 2020.");
        assert_eq!(n.state_colors, vec![SuccessGreen, DarkCyan, DarkCyan]);
    }

    #[test]
    fn test_three_states_first_tied_with_second() {
        let above = three(4.0, 4.0, 3.0);
        assert_eq!(
            above.title,
            "Alpha Averaged the Same Unemployment as Beta, but higher than Gamma since 2020."
        );
        assert_eq!(above.state_colors, vec![DarkCyan, DarkCyan, SuccessGreen]);

        let below = three(4.0, 4.0, 5.0);
        assert_eq!(
            below.title,
            "Alpha Averaged the Same Unemployment as Beta, but lower than Gamma since 2020."
        );
        assert_eq!(below.state_colors, vec![DarkCyan, DarkCyan, ErrorRed]);
    }

    #[test]
    fn test_three_states_first_tied_with_third() {
        let above = three(4.0, 3.0, 4.0);
        assert_eq!(
            above.title,
            "Alpha Averaged the Same Unemployment as Gamma, but higher than Beta since 2020."
        );
        assert_eq!(above.state_colors, vec![DarkCyan, SuccessGreen, DarkCyan]);

        let below = three(4.0, 5.0, 4.0);
        assert_eq!(
            below.title,
            "Alpha Averaged the Same Unemployment as Gamma, but lower than Beta since 2020."
        );
        assert_eq!(below.state_colors, vec![DarkCyan, ErrorRed, DarkCyan]);
    }

    #[test]
    fn test_mismatched_lengths_select_nothing() {
        assert!(select_narrative(&["Alpha", "Beta"], &[1.0], f64::NAN, YEAR).is_none());
        assert!(select_narrative(&[], &[], f64::NAN, YEAR).is_none());
    }

    // --- compare ------------------------------------------------------------

    #[test]
    fn test_compare_single_state_against_nation() {
        let ca = series(Some("CA"), YEAR, &[5.0, 5.0]);
        let us = series(None, YEAR, &[4.0, 4.0]);
        let cmp = compare(&[ca], &us, YEAR).expect("both series cover the year");
        assert_eq!(cmp.state_means, vec![5.0]);
        assert_eq!(cmp.national_mean, Some(4.0));
        assert_eq!(cmp.narrative.state_colors, vec![ErrorRed]);
    }

    #[test]
    fn test_compare_multi_state_ignores_national_coverage() {
        let ca = series(Some("CA"), YEAR, &[5.0]);
        let ny = series(Some("NY"), YEAR, &[4.0]);
        let us = series(None, 1990, &[4.0]);
        let cmp = compare(&[ca, ny], &us, YEAR).expect("national mean is not needed");
        assert_eq!(cmp.national_mean, None);
        assert_eq!(cmp.narrative.national_color, Black);
    }

    #[test]
    fn test_compare_fails_when_state_lacks_reference_year() {
        let ca = series(Some("CA"), 2010, &[5.0]);
        let us = series(None, YEAR, &[4.0]);
        let err = compare(&[ca], &us, YEAR).unwrap_err();
        match err {
            VizError::InsufficientData { series, year } => {
                assert_eq!(series, "CA");
                assert_eq!(year, YEAR);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }
}
