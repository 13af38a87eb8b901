use std::time::Instant;

use super::*;
use crate::net::types::PeriodBucketWire;
use time::macros::datetime;

fn bucket(year: i32, month: Option<u8>, day: Option<u8>, revenue: f64) -> PeriodBucketWire {
    PeriodBucketWire {
        period: PeriodKeyWire { year, month, day },
        investment: revenue / 2.0,
        revenue,
        net_margin: revenue / 2.0,
    }
}

fn keys(report: &Report) -> Vec<&str> {
    report.series.iter().map(|p| p.date_key.as_str()).collect()
}

// =============================================================
// Report::from_wire
// =============================================================

#[test]
fn series_is_sorted_ascending() {
    let wire = ReportWire {
        series: vec![
            bucket(2025, Some(3), Some(2), 30.0),
            bucket(2024, Some(12), Some(31), 10.0),
            bucket(2025, Some(1), Some(15), 20.0),
            bucket(2025, Some(3), Some(1), 25.0),
        ],
        ..ReportWire::default()
    };
    let report = Report::from_wire(wire);
    assert_eq!(keys(&report), vec!["2024-12-31", "2025-01-15", "2025-03-01", "2025-03-02"]);
    assert!(report.series.windows(2).all(|w| w[0].date_key <= w[1].date_key));
}

#[test]
fn monthly_buckets_key_to_first_of_month() {
    let wire = ReportWire {
        series: vec![bucket(2025, Some(10), None, 1.0), bucket(2025, Some(2), Some(0), 1.0)],
        ..ReportWire::default()
    };
    assert_eq!(keys(&Report::from_wire(wire)), vec!["2025-02-01", "2025-10-01"]);
}

#[test]
fn yearly_buckets_key_to_january_first() {
    let wire = ReportWire {
        series: vec![bucket(2025, None, None, 1.0), bucket(2023, None, None, 1.0)],
        ..ReportWire::default()
    };
    assert_eq!(keys(&Report::from_wire(wire)), vec!["2023-01-01", "2025-01-01"]);
}

#[test]
fn sorting_is_numeric_not_textual() {
    let wire = ReportWire {
        series: vec![bucket(2025, Some(10), Some(1), 1.0), bucket(2025, Some(9), Some(30), 1.0)],
        ..ReportWire::default()
    };
    assert_eq!(keys(&Report::from_wire(wire)), vec!["2025-09-30", "2025-10-01"]);
}

#[test]
fn amounts_and_totals_carry_over() {
    let wire = ReportWire {
        total_investment: 100.0,
        total_revenue: 250.0,
        net_margin: 150.0,
        top_sellers: vec![TopSeller { name: "Café".to_owned(), units_sold: 12 }],
        series: vec![bucket(2025, Some(1), Some(1), 40.0)],
    };
    let report = Report::from_wire(wire);
    assert!((report.total_revenue - 250.0).abs() < f64::EPSILON);
    assert_eq!(report.top_sellers.len(), 1);
    assert!((report.series[0].revenue - 40.0).abs() < f64::EPSILON);
    assert!((report.series[0].investment - 20.0).abs() < f64::EPSILON);
}

#[test]
fn empty_report_is_all_zero() {
    let report = Report::empty();
    assert!(report.total_investment.abs() < f64::EPSILON);
    assert!(report.top_sellers.is_empty());
    assert!(report.series.is_empty());
}

// =============================================================
// ReportsState
// =============================================================

#[test]
fn new_defaults_to_trailing_thirty_days_by_month() {
    let now = datetime!(2025-06-30 12:00:00 UTC);
    let state = ReportsState::new(now);
    assert_eq!(state.range.end(), now);
    assert_eq!(state.range.start(), datetime!(2025-05-31 12:00:00 UTC));
    assert_eq!(state.period, ReportPeriod::Month);
    assert!(state.report.is_none());
}

#[test]
fn setters_report_changes_only() {
    let mut state = ReportsState::new(datetime!(2025-06-30 12:00:00 UTC));
    assert!(!state.set_period(ReportPeriod::Month));
    assert!(state.set_period(ReportPeriod::Day));

    let same = state.range;
    assert!(!state.set_range(same));
    let other = DateRange::parse_dates("2025-01-01", "2025-01-31").unwrap();
    assert!(state.set_range(other));
    assert_eq!(state.query().range, other);
    assert_eq!(state.query().period, ReportPeriod::Day);
}

#[test]
fn apply_fetch_installs_normalized_report() {
    let mut state = ReportsState::new(datetime!(2025-06-30 12:00:00 UTC));
    let ticket = state.begin_fetch();
    assert!(state.loading);
    let wire = ReportWire {
        series: vec![bucket(2025, Some(6), None, 1.0), bucket(2025, Some(5), None, 1.0)],
        ..ReportWire::default()
    };
    assert!(state.apply_fetch(ticket, Ok(wire), Instant::now()));
    assert!(!state.loading);
    assert_eq!(keys(state.report.as_ref().unwrap()), vec!["2025-05-01", "2025-06-01"]);
}

#[test]
fn stale_fetch_is_discarded() {
    let mut state = ReportsState::new(datetime!(2025-06-30 12:00:00 UTC));
    let old = state.begin_fetch();
    let new = state.begin_fetch();
    let stale = ReportWire { total_revenue: 1.0, ..ReportWire::default() };
    assert!(!state.apply_fetch(old, Ok(stale), Instant::now()));
    assert!(state.report.is_none());
    assert!(state.loading);

    let fresh = ReportWire { total_revenue: 2.0, ..ReportWire::default() };
    assert!(state.apply_fetch(new, Ok(fresh), Instant::now()));
    assert!((state.report.as_ref().unwrap().total_revenue - 2.0).abs() < f64::EPSILON);
}

#[test]
fn failed_fetch_falls_back_to_empty_report() {
    let mut state = ReportsState::new(datetime!(2025-06-30 12:00:00 UTC));
    let ticket = state.begin_fetch();
    let err = ApiError::Request("connection refused".to_owned());
    assert!(state.apply_fetch(ticket, Err(err), Instant::now()));
    assert_eq!(state.report, Some(Report::empty()));
    assert!(state.notice.as_ref().is_some_and(Notice::is_error));
    assert!(!state.loading);
}
