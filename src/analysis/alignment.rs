//! Restricting the national series to the requested states' date range.
//!
//! The cutoff is applied field by field: a national observation is kept when
//! its year, its month and its day are each at least the smallest year,
//! smallest month and smallest day seen anywhere in the state series. That
//! is not the same as `date >= earliest state date`. For FRED's monthly data
//! (day is always 1, and any multi-year state series contains January) the
//! two agree and the filter reduces to a year cutoff; for short or
//! mid-month series they diverge. The field-wise rule is kept as-is and the
//! divergence is pinned by tests below.

use chrono::Datelike;

use crate::model::TimeSeries;

/// Component-wise minimum (year, month, day) over every observation in
/// every series. `None` if there are no observations at all.
pub fn component_minimums(series: &[TimeSeries]) -> Option<(i32, u32, u32)> {
    let mut dates = series.iter().flat_map(|s| s.observations.iter().map(|o| o.date));
    let first = dates.next()?;

    Some(dates.fold((first.year(), first.month(), first.day()), |(y, m, d), date| {
        (y.min(date.year()), m.min(date.month()), d.min(date.day()))
    }))
}

/// Returns the national series trimmed to the states' range using the
/// field-wise rule described in the module docs. With no state observations
/// the national series is returned unchanged.
pub fn align_national(national: &TimeSeries, states: &[TimeSeries]) -> TimeSeries {
    let Some((min_year, min_month, min_day)) = component_minimums(states) else {
        return national.clone();
    };

    let observations = national
        .observations
        .iter()
        .filter(|o| o.date.year() >= min_year && o.date.month() >= min_month && o.date.day() >= min_day)
        .copied()
        .collect();

    TimeSeries::new(national.id, observations)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Observation, SeriesId};
    use crate::states::StateCode;
    use chrono::NaiveDate;

    fn state(code: &str) -> SeriesId {
        SeriesId::State(StateCode::parse(code).unwrap())
    }

    /// One observation per month from (y1, m1) through (y2, m2) inclusive, day 1.
    fn monthly(id: SeriesId, from: (i32, u32), to: (i32, u32)) -> TimeSeries {
        let mut observations = Vec::new();
        let (mut y, mut m) = from;
        while (y, m) <= to {
            observations.push(Observation {
                date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
                percent: 5.0,
            });
            m += 1;
            if m > 12 {
                m = 1;
                y += 1;
            }
        }
        TimeSeries::new(id, observations)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_multi_year_monthly_series_reduces_to_year_cutoff() {
        // Typical FRED shape: state data starts 1976, national 1948.
        let national = monthly(SeriesId::National, (1948, 1), (1980, 12));
        let ca = monthly(state("CA"), (1976, 1), (1980, 12));

        let aligned = align_national(&national, &[ca.clone()]);
        assert_eq!(aligned.first_date(), Some(ymd(1976, 1, 1)));
        assert_eq!(aligned.last_date(), Some(ymd(1980, 12, 1)));
        assert_eq!(aligned.len(), ca.len());
    }

    #[test]
    fn test_minimum_is_taken_across_all_state_series() {
        let national = monthly(SeriesId::National, (1990, 1), (2000, 12));
        let ca = monthly(state("CA"), (1995, 1), (2000, 12));
        let ny = monthly(state("NY"), (1992, 1), (2000, 12));

        let aligned = align_national(&national, &[ca, ny]);
        assert_eq!(aligned.first_date(), Some(ymd(1992, 1, 1)));
    }

    #[test]
    fn test_no_state_observations_leaves_national_unchanged() {
        let national = monthly(SeriesId::National, (2000, 1), (2000, 6));
        let aligned = align_national(&national, &[]);
        assert_eq!(aligned, national);
    }

    #[test]
    fn test_component_minimums_are_independent() {
        let series = TimeSeries::new(
            state("CA"),
            vec![
                Observation { date: ymd(2019, 11, 20), percent: 4.0 },
                Observation { date: ymd(2020, 2, 5), percent: 4.0 },
            ],
        );
        // The minimum month (2) and minimum day (5) come from different
        // observations than the minimum year (2019).
        assert_eq!(component_minimums(&[series]), Some((2019, 2, 5)));
    }

    // --- Field-wise filter diverges from a date cutoff ----------------------

    #[test]
    fn test_field_wise_filter_drops_early_months_of_later_years() {
        // State data covers March–June 2020 only, so the month floor is 3.
        // A plain date cutoff would keep every national month from March 2020
        // on; the field-wise rule also drops January and February 2021.
        let national = monthly(SeriesId::National, (2019, 1), (2021, 12));
        let ca = monthly(state("CA"), (2020, 3), (2020, 6));

        let aligned = align_national(&national, &[ca]);
        let kept: Vec<NaiveDate> = aligned.observations.iter().map(|o| o.date).collect();

        assert_eq!(kept.first(), Some(&ymd(2020, 3, 1)));
        assert!(!kept.contains(&ymd(2021, 1, 1)), "Jan 2021 is after the start but fails the month floor");
        assert!(!kept.contains(&ymd(2021, 2, 1)), "Feb 2021 is after the start but fails the month floor");
        assert!(kept.contains(&ymd(2021, 3, 1)));
        assert_eq!(aligned.len(), 10 + 10, "Mar–Dec of 2020 and of 2021");

        let date_cutoff = national.observations.iter().filter(|o| o.date >= ymd(2020, 3, 1)).count();
        assert_ne!(aligned.len(), date_cutoff, "field-wise filter should differ from a date cutoff here");
    }

    #[test]
    fn test_field_wise_filter_keeps_earlier_dates_with_large_components() {
        // State series spans 2020-06-10 .. 2021-01-25: floors are year 2020,
        // month 1, day 10. A national reading of 2020-02-15 predates every
        // state observation but clears all three floors, so it is kept.
        let ca = TimeSeries::new(
            state("CA"),
            vec![
                Observation { date: ymd(2020, 6, 10), percent: 4.0 },
                Observation { date: ymd(2021, 1, 25), percent: 4.0 },
            ],
        );
        let national = TimeSeries::new(
            SeriesId::National,
            vec![
                Observation { date: ymd(2020, 2, 15), percent: 3.5 },
                Observation { date: ymd(2020, 7, 1), percent: 3.5 },
                Observation { date: ymd(2020, 7, 12), percent: 3.5 },
            ],
        );

        let aligned = align_national(&national, &[ca]);
        let kept: Vec<NaiveDate> = aligned.observations.iter().map(|o| o.date).collect();
        assert_eq!(kept, vec![ymd(2020, 2, 15), ymd(2020, 7, 12)]);
    }
}
