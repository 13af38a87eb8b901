//! Reports state: selected range and period, and the normalized report.
//!
//! DESIGN
//! ======
//! Every fetch is stamped with a generation number. Only the response to the
//! newest fetch is applied, so a slow answer for an old range cannot
//! overwrite the report for the range currently selected.

#[cfg(test)]
#[path = "reports_test.rs"]
mod reports_test;

use time::OffsetDateTime;

use super::notice::Notice;
use crate::net::api::ApiError;
use crate::net::types::{DateRange, PeriodKeyWire, ReportPeriod, ReportQuery, ReportWire, TopSeller};

/// Length of the default trailing window.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// One point of the charted series.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesPoint {
    /// `YYYY-MM-DD`; sorts chronologically as text.
    pub date_key: String,
    pub investment: f64,
    pub revenue: f64,
    pub net_margin: f64,
}

/// A report ready for rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    pub total_investment: f64,
    pub total_revenue: f64,
    pub net_margin: f64,
    pub top_sellers: Vec<TopSeller>,
    /// Ascending by date.
    pub series: Vec<SeriesPoint>,
}

impl Report {
    /// Zero totals and empty lists, shown when a fetch fails.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize the wire payload: key each bucket by date and sort ascending.
    #[must_use]
    pub fn from_wire(wire: ReportWire) -> Self {
        let mut keyed: Vec<((i32, u8, u8), SeriesPoint)> = wire
            .series
            .into_iter()
            .map(|bucket| {
                let parts = date_parts(bucket.period);
                let point = SeriesPoint {
                    date_key: date_key(parts),
                    investment: bucket.investment,
                    revenue: bucket.revenue,
                    net_margin: bucket.net_margin,
                };
                (parts, point)
            })
            .collect();
        keyed.sort_by_key(|(parts, _)| *parts);

        Self {
            total_investment: wire.total_investment,
            total_revenue: wire.total_revenue,
            net_margin: wire.net_margin,
            top_sellers: wire.top_sellers,
            series: keyed.into_iter().map(|(_, point)| point).collect(),
        }
    }
}

/// Missing or zero month/day default to 1.
fn date_parts(key: PeriodKeyWire) -> (i32, u8, u8) {
    let month = key.month.filter(|m| *m > 0).unwrap_or(1);
    let day = key.day.filter(|d| *d > 0).unwrap_or(1);
    (key.year, month, day)
}

fn date_key((year, month, day): (i32, u8, u8)) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// Token identifying one issued fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Local state of the reports view.
#[derive(Clone, Debug)]
pub struct ReportsState {
    pub range: DateRange,
    pub period: ReportPeriod,
    /// `None` until the first fetch completes.
    pub report: Option<Report>,
    pub loading: bool,
    pub notice: Option<Notice>,
    generation: u64,
}

impl ReportsState {
    /// Trailing 30 days ending at `now`, grouped by month.
    #[must_use]
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            range: DateRange::trailing_days(now, DEFAULT_RANGE_DAYS),
            period: ReportPeriod::default(),
            report: None,
            loading: false,
            notice: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn query(&self) -> ReportQuery {
        ReportQuery { range: self.range, period: self.period }
    }

    /// Returns `true` when the range actually changed.
    pub fn set_range(&mut self, range: DateRange) -> bool {
        if self.range == range {
            return false;
        }
        self.range = range;
        true
    }

    /// Returns `true` when the period actually changed.
    pub fn set_period(&mut self, period: ReportPeriod) -> bool {
        if self.period == period {
            return false;
        }
        self.period = period;
        true
    }

    /// Start a fetch, superseding any earlier one.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    #[must_use]
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply a fetch result. Stale results are dropped and `false` is returned.
    /// A failure installs an empty report so the view can still render.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<ReportWire, ApiError>,
        now: std::time::Instant,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, current = self.generation, "discarding stale report");
            return false;
        }
        self.loading = false;
        match result {
            Ok(wire) => {
                self.report = Some(Report::from_wire(wire));
            }
            Err(error) => {
                tracing::warn!(%error, "report fetch failed");
                self.report = Some(Report::empty());
                self.notice = Some(Notice::error(format!("could not load reports: {}", error.summary()), now));
            }
        }
        true
    }
}
