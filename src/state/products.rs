//! Product list state: fetched catalog, filters, and in-flight sales.
//!
//! DESIGN
//! ======
//! The fetched collection is kept as-is; the filtered view is derived on
//! demand from the query and stock tier so it can never drift from the data.
//! Sell gating lives here so a disabled sell is rejected before any request
//! is built.

#[cfg(test)]
#[path = "products_test.rs"]
mod products_test;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use super::notice::Notice;
use crate::net::api::ApiError;
use crate::net::types::{Product, ProductId};

/// Upper bound (inclusive) of the "low" stock tier.
pub const LOW_STOCK_MAX: i64 = 5;
/// Upper bound (inclusive) for the low-stock badge on product cards.
pub const LOW_STOCK_BADGE_MAX: i64 = 3;

/// Stock-tier filter for the product list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StockFilter {
    #[default]
    All,
    /// `0 < stock <= LOW_STOCK_MAX`
    Low,
    /// `stock == 0`
    Out,
}

impl StockFilter {
    #[must_use]
    pub fn matches(self, stock: i64) -> bool {
        match self {
            Self::All => true,
            Self::Low => stock > 0 && stock <= LOW_STOCK_MAX,
            Self::Out => stock == 0,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Low => "low",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for StockFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StockFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "todos" => Ok(Self::All),
            "low" | "bajo" => Ok(Self::Low),
            "out" | "agotado" => Ok(Self::Out),
            other => Err(format!("unknown stock filter '{other}' (expected all, low or out)")),
        }
    }
}

/// Badge drawn on a product card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockBadge {
    Low,
    Out,
}

#[must_use]
pub fn stock_badge(stock: i64) -> Option<StockBadge> {
    if stock == 0 {
        Some(StockBadge::Out)
    } else if stock > 0 && stock <= LOW_STOCK_BADGE_MAX {
        Some(StockBadge::Low)
    } else {
        None
    }
}

/// Active products whose name contains `query` (case-insensitive) and whose
/// stock falls in `filter`. A blank query matches everything.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], query: &str, filter: StockFilter) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| p.is_active())
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .filter(|p| filter.matches(p.stock))
        .collect()
}

/// Why a sell action was refused or failed.
#[derive(Debug, thiserror::Error)]
pub enum SellError {
    #[error("no stock available for {0}")]
    OutOfStock(String),
    #[error("a sale of {0} is already in progress")]
    InFlight(String),
    #[error("product {0} is not in the list")]
    NotFound(ProductId),
    #[error("could not record the sale: {0}")]
    Api(#[from] ApiError),
}

/// Local state of the product list view.
#[derive(Clone, Debug, Default)]
pub struct ProductsState {
    /// Last fetched collection, unfiltered.
    pub items: Vec<Product>,
    /// The initial fetch is in flight.
    pub loading: bool,
    /// Name search text as typed.
    pub query: String,
    /// Stock tier applied on top of the search.
    pub stock_filter: StockFilter,
    /// Products with a sale request in flight.
    pub selling: HashSet<ProductId>,
    /// When the last fetch was started or completed.
    pub last_fetch: Option<Instant>,
    /// One-shot alert shown on the next render.
    pub notice: Option<Notice>,
}

impl ProductsState {
    /// The derived, filtered view.
    #[must_use]
    pub fn visible(&self) -> Vec<&Product> {
        filter_products(&self.items, &self.query, self.stock_filter)
    }

    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        !self.query.trim().is_empty() || self.stock_filter != StockFilter::All
    }

    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.stock_filter = StockFilter::All;
    }

    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Install a freshly fetched collection.
    pub fn replace_items(&mut self, items: Vec<Product>, now: Instant) {
        self.items = items;
        self.loading = false;
        self.last_fetch = Some(now);
    }

    /// Whether re-entering the section should trigger a silent refresh.
    #[must_use]
    pub fn should_refresh_on_enter(&self, now: Instant, throttle: Duration) -> bool {
        self.last_fetch
            .is_none_or(|last| now.saturating_duration_since(last) > throttle)
    }

    #[must_use]
    pub fn is_selling(&self, id: ProductId) -> bool {
        self.selling.contains(&id)
    }

    /// A product can be sold when it has stock and no sale of it is pending.
    #[must_use]
    pub fn can_sell(&self, product: &Product) -> bool {
        product.stock > 0 && !self.is_selling(product.id)
    }

    /// Mark a sale as in flight, or refuse it.
    ///
    /// # Errors
    ///
    /// Returns [`SellError`] when the product is unknown, has no stock, or
    /// already has a sale in flight.
    pub fn begin_sale(&mut self, id: ProductId) -> Result<(), SellError> {
        let product = self.find(id).ok_or(SellError::NotFound(id))?;
        if product.stock <= 0 {
            return Err(SellError::OutOfStock(product.name.clone()));
        }
        if self.is_selling(id) {
            return Err(SellError::InFlight(product.name.clone()));
        }
        self.selling.insert(id);
        Ok(())
    }

    pub fn finish_sale(&mut self, id: ProductId) {
        self.selling.remove(&id);
    }
}
