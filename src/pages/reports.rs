//! Reports page: totals, best sellers and the per-period series.

#[cfg(test)]
#[path = "reports_test.rs"]
mod reports_test;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use time::OffsetDateTime;

use crate::components::banner::render_notice;
use crate::components::chart::{BAR_WIDTH, bar, bar_chart};
use crate::components::confirm::Confirm;
use crate::components::table::Table;
use crate::net::api::{ApiError, StoreApi};
use crate::net::types::{DateRange, ReportPeriod};
use crate::state::notice::Notice;
use crate::state::reports::ReportsState;
use crate::util::money::format_currency;

const SERIES_BAR_WIDTH: usize = 20;

pub struct ReportsPage {
    api: Arc<dyn StoreApi>,
    pub state: ReportsState,
}

impl ReportsPage {
    /// A page over the trailing 30 days ending at `now`. Nothing is fetched yet.
    #[must_use]
    pub fn new(api: Arc<dyn StoreApi>, now: OffsetDateTime) -> Self {
        Self { api, state: ReportsState::new(now) }
    }

    /// Fetch the report for the current range and period.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`]; the view has already fallen back to an
    /// empty report with an error notice.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let ticket = self.state.begin_fetch();
        let query = self.state.query();
        tracing::debug!(range = %query.range, period = %query.period, "loading report");
        match self.api.fetch_report(&query).await {
            Ok(wire) => {
                self.state.apply_fetch(ticket, Ok(wire), Instant::now());
                Ok(())
            }
            Err(error) => {
                self.state.apply_fetch(ticket, Err(error.clone()), Instant::now());
                Err(error)
            }
        }
    }

    /// Change the range; re-fetches only when it differs.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the re-fetch.
    pub async fn set_range(&mut self, range: DateRange) -> Result<(), ApiError> {
        if self.state.set_range(range) {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Change the period; re-fetches only when it differs.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the re-fetch.
    pub async fn set_period(&mut self, period: ReportPeriod) -> Result<(), ApiError> {
        if self.state.set_period(period) {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Clear stored report data for the selected range after confirmation,
    /// then reload. Returns `false` when the user declined.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the reset. A failed reload afterwards is
    /// reported as a warning notice only, since the data is already gone.
    pub async fn reset(&mut self, confirm: &mut dyn Confirm) -> Result<bool, ApiError> {
        let range = self.state.range;
        if !confirm.confirm(&format!("Delete all report data for {range}? This cannot be undone.")) {
            return Ok(false);
        }

        self.state.loading = true;
        if let Err(error) = self.api.reset_reports(&range).await {
            tracing::warn!(%error, "report reset failed");
            self.state.loading = false;
            self.state.notice =
                Some(Notice::error(format!("could not reset reports: {}", error.summary()), Instant::now()));
            return Err(error);
        }
        tracing::info!(%range, "reports reset");
        self.state.notice = Some(Notice::success("reports reset", Instant::now()));
        if let Err(error) = self.refresh().await {
            self.state.notice = Some(Notice::warning(
                format!("reports reset, but reloading failed: {}", error.summary()),
                Instant::now(),
            ));
        }
        Ok(true)
    }

    /// Render the report. The pending notice is shown once and consumed.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Reports  {}  by {}", self.state.range, self.state.period.label())?;

        match &self.state.report {
            None => writeln!(out, "Loading report...")?,
            Some(report) => {
                writeln!(
                    out,
                    "Investment: {}   Revenue: {}   Net margin: {}",
                    format_currency(report.total_investment),
                    format_currency(report.total_revenue),
                    format_currency(report.net_margin)
                )?;

                writeln!(out)?;
                writeln!(out, "Top 5 best sellers")?;
                if report.top_sellers.is_empty() {
                    writeln!(out, "  no sales in this range")?;
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let rows: Vec<(String, f64)> = report
                        .top_sellers
                        .iter()
                        .map(|seller| (seller.name.clone(), seller.units_sold as f64))
                        .collect();
                    for line in bar_chart(&rows, BAR_WIDTH, |units| format!("{units:.0} sold")) {
                        writeln!(out, "  {line}")?;
                    }
                }

                writeln!(out)?;
                writeln!(out, "Sales by {}", self.state.period.label())?;
                if report.series.is_empty() {
                    writeln!(out, "  no data for this range")?;
                } else {
                    let max = report.series.iter().map(|p| p.revenue.max(p.investment)).fold(0.0_f64, f64::max);
                    let mut table = Table::new(&["Date", "Revenue", "Investment", "Net margin", "Revenue bar"]);
                    for point in &report.series {
                        table.push_row(vec![
                            point.date_key.clone(),
                            format_currency(point.revenue),
                            format_currency(point.investment),
                            format_currency(point.net_margin),
                            bar(point.revenue, max, SERIES_BAR_WIDTH),
                        ]);
                    }
                    for line in table.render() {
                        writeln!(out, "{line}")?;
                    }
                }
            }
        }

        if self.state.loading {
            writeln!(out, "Refreshing...")?;
        }
        if let Some(notice) = self.state.notice.take() {
            writeln!(out, "{}", render_notice(&notice))?;
        }
        Ok(())
    }
}
