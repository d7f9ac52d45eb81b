use crate::metrics::timeseries::EquityPoint;
use chrono::Datelike;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    //1-based calendar month
    pub month: u32,
    pub return_pct: f64,
}

//compounds bar returns within each calendar month, in chronological order
pub fn monthly_returns(curve: &[EquityPoint]) -> Vec<MonthlyReturn> {
    let mut out: Vec<MonthlyReturn> = Vec::new();
    let mut growth = 1.0;

    for (i, point) in curve.iter().enumerate() {
        let key = (point.timestamp.year(), point.timestamp.month());
        let r = if point.returns.is_finite() {
            point.returns
        } else {
            0.0
        };

        let same_month = i > 0 && {
            let prev = &curve[i - 1].timestamp;
            (prev.year(), prev.month()) == key
        };

        if same_month {
            growth *= 1.0 + r;
        } else {
            growth = 1.0 + r;
            out.push(MonthlyReturn {
                year: key.0,
                month: key.1,
                return_pct: 0.0,
            });
        }

        if let Some(last) = out.last_mut() {
            last.return_pct = (growth - 1.0) * 100.0;
        }
    }

    out
}

//pivots monthly returns into year rows with one slot per month
pub fn pivot_by_year(months: &[MonthlyReturn]) -> IndexMap<i32, [Option<f64>; 12]> {
    let mut table: IndexMap<i32, [Option<f64>; 12]> = IndexMap::new();
    for m in months {
        //months outside 1..=12 have no column
        let Some(slot) = (m.month as usize).checked_sub(1).filter(|&i| i < 12) else {
            continue;
        };
        table.entry(m.year).or_insert([None; 12])[slot] = Some(m.return_pct);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(y: i32, m: u32, d: u32, returns: f64) -> EquityPoint {
        EquityPoint::new(
            Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(),
            1.0,
            0.0,
            returns,
        )
    }

    #[test]
    fn empty_curve_has_no_months() {
        assert!(monthly_returns(&[]).is_empty());
    }

    #[test]
    fn compounds_within_month_and_resets_across() {
        let curve = vec![
            point(2024, 1, 30, 0.1),
            point(2024, 1, 31, 0.1),
            point(2024, 2, 1, -0.5),
            point(2024, 2, 2, f64::NAN),
        ];
        let months = monthly_returns(&curve);
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month), (2024, 1));
        assert!((months[0].return_pct - 21.0).abs() < 1e-9);
        assert_eq!((months[1].year, months[1].month), (2024, 2));
        assert!((months[1].return_pct + 50.0).abs() < 1e-9);
    }

    #[test]
    fn pivot_places_months_in_slots() {
        let months = vec![
            MonthlyReturn {
                year: 2023,
                month: 12,
                return_pct: 1.0,
            },
            MonthlyReturn {
                year: 2024,
                month: 1,
                return_pct: -2.0,
            },
        ];
        let table = pivot_by_year(&months);
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![2023, 2024]);
        assert_eq!(table[&2023][11], Some(1.0));
        assert_eq!(table[&2024][0], Some(-2.0));
        assert_eq!(table[&2024][1], None);
    }

    #[test]
    fn pivot_skips_months_outside_calendar() {
        let month = |month, return_pct| MonthlyReturn {
            year: 2024,
            month,
            return_pct,
        };
        let table = pivot_by_year(&[month(0, 5.0), month(13, 6.0), month(3, 1.5)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table[&2024][2], Some(1.5));
        assert_eq!(table[&2024].iter().flatten().count(), 1);
    }
}
