//! Product list page: catalog fetch, filtering, and one-click sales.

#[cfg(test)]
#[path = "products_test.rs"]
mod products_test;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::components::banner::render_notice;
use crate::components::table::Table;
use crate::config::ClientConfig;
use crate::net::api::{ApiError, StoreApi};
use crate::net::types::{ProductId, SaleRequest};
use crate::state::notice::Notice;
use crate::state::products::{ProductsState, SellError, StockBadge, StockFilter, stock_badge};
use crate::util::image::resolve_image_src;
use crate::util::money::format_currency;

pub struct ProductsPage {
    api: Arc<dyn StoreApi>,
    api_base: String,
    throttle: Duration,
    pub state: ProductsState,
}

impl ProductsPage {
    #[must_use]
    pub fn new(api: Arc<dyn StoreApi>, config: &ClientConfig) -> Self {
        Self {
            api,
            api_base: config.api_base.clone(),
            throttle: config.refresh_throttle,
            state: ProductsState::default(),
        }
    }

    /// Initial load with the loading indicator.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording an error notice.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.state.loading = true;
        self.state.last_fetch = Some(Instant::now());
        match self.api.list_products().await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "products loaded");
                self.state.replace_items(items, Instant::now());
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "product load failed");
                self.state.loading = false;
                self.state.notice =
                    Some(Notice::error(format!("could not load products: {}", error.summary()), Instant::now()));
                Err(error)
            }
        }
    }

    /// Re-fetch without touching the loading flag. Failures are only logged.
    pub async fn refresh_silently(&mut self) {
        match self.api.list_products().await {
            Ok(items) => self.state.replace_items(items, Instant::now()),
            Err(error) => tracing::warn!(%error, "silent product refresh failed"),
        }
    }

    /// Section re-entry. Returns `true` when a refresh was issued.
    pub async fn enter(&mut self, now: Instant) -> bool {
        if !self.state.should_refresh_on_enter(now, self.throttle) {
            tracing::debug!("product refresh throttled");
            return false;
        }
        self.state.last_fetch = Some(now);
        self.refresh_silently().await;
        true
    }

    pub fn set_query(&mut self, query: &str) {
        query.clone_into(&mut self.state.query);
    }

    pub fn set_stock_filter(&mut self, filter: StockFilter) {
        self.state.stock_filter = filter;
    }

    pub fn clear_filters(&mut self) {
        self.state.clear_filters();
    }

    /// Sell one unit of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SellError`] when the sale is refused locally or rejected by
    /// the service. The product returns to the sellable state either way.
    pub async fn sell(&mut self, id: ProductId) -> Result<serde_json::Value, SellError> {
        if let Err(error) = self.state.begin_sale(id) {
            tracing::debug!(product_id = id, %error, "sale refused locally");
            self.state.notice = Some(Notice::error(error.to_string(), Instant::now()));
            return Err(error);
        }

        let result = self.api.record_sale(&SaleRequest::single(id)).await;
        let outcome = match result {
            Ok(receipt) => {
                tracing::info!(product_id = id, "sale recorded");
                self.refresh_silently().await;
                self.state.notice = Some(Notice::success("sale recorded", Instant::now()));
                Ok(receipt)
            }
            Err(error) => {
                tracing::warn!(product_id = id, %error, "sale failed");
                let error = SellError::Api(error);
                self.state.notice = Some(Notice::error(error.to_string(), Instant::now()));
                Err(error)
            }
        };
        self.state.finish_sale(id);
        outcome
    }

    /// Render the list. The pending notice is shown once and consumed.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let visible = self.state.visible();
        write!(out, "Products ({} of {})", visible.len(), self.state.items.iter().filter(|p| p.is_active()).count())?;
        if self.state.has_active_filters() {
            write!(out, "  search: '{}'  stock: {}", self.state.query, self.state.stock_filter)?;
        }
        writeln!(out)?;

        if self.state.loading {
            writeln!(out, "Loading products...")?;
        } else if visible.is_empty() {
            writeln!(out, "No products match the current filters.")?;
        } else {
            let mut table = Table::new(&["ID", "Name", "Price", "Stock", "Status", "Image"]);
            for product in visible {
                let status = if self.state.is_selling(product.id) {
                    "SELLING...".to_owned()
                } else {
                    match stock_badge(product.stock) {
                        Some(StockBadge::Out) => "OUT OF STOCK".to_owned(),
                        Some(StockBadge::Low) => "LOW STOCK".to_owned(),
                        None => String::new(),
                    }
                };
                let image = resolve_image_src(&self.api_base, product.image_url.as_deref())
                    .unwrap_or_else(|| "-".to_owned());
                table.push_row(vec![
                    product.id.to_string(),
                    product.name.clone(),
                    format_currency(product.sale_price),
                    product.stock.to_string(),
                    status,
                    image,
                ]);
            }
            for line in table.render() {
                writeln!(out, "{line}")?;
            }
        }

        if let Some(notice) = self.state.notice.take() {
            writeln!(out, "{}", render_notice(&notice))?;
        }
        Ok(())
    }
}
