//! HTTP client for the catalog, sales and reports service.
//!
//! DESIGN
//! ======
//! Views talk to the service only through the [`StoreApi`] trait so they can
//! be driven by an in-memory fake in tests. [`HttpStoreApi`] is the real
//! implementation over `reqwest`.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns [`ApiError`]; nothing here retries. Non-success
//! statuses keep the response body so the caller can surface the server's
//! own message.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::types::{
    DateRange, Product, ProductDraft, ProductId, ReportQuery, ReportWire, SaleRequest,
};
use crate::config::ClientConfig;

pub const PRODUCTS_PATH: &str = "/productos";
pub const SALES_PATH: &str = "/ventas/";
pub const REPORT_RANGE_PATH: &str = "/reportes/rango";
pub const REPORT_RESET_PATH: &str = "/reportes/reiniciar";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by store API calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The multipart image part could not be built.
    #[error("invalid image upload: {0}")]
    Image(String),
}

impl ApiError {
    /// Short text for banners; server bodies can be long HTML pages.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Status { status, body } if !body.trim().is_empty() && body.len() <= 200 => {
                format!("{status}: {}", body.trim())
            }
            Self::Status { status, .. } => format!("server responded {status}"),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// API TRAIT
// =============================================================================

/// Remote operations the views depend on. Enables mocking in tests.
#[async_trait::async_trait]
pub trait StoreApi: Send + Sync {
    /// `GET /productos`
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// `POST /productos` as multipart form data.
    async fn create_product(&self, draft: &ProductDraft) -> Result<(), ApiError>;

    /// `PUT /productos/{id}` as multipart form data.
    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<(), ApiError>;

    /// `DELETE /productos/{id}`; the service soft-deletes.
    async fn deactivate_product(&self, id: ProductId) -> Result<(), ApiError>;

    /// `POST /ventas/`. The receipt body is returned untouched.
    async fn record_sale(&self, sale: &SaleRequest) -> Result<serde_json::Value, ApiError>;

    /// `GET /reportes/rango?desde&hasta&periodo`
    async fn fetch_report(&self, query: &ReportQuery) -> Result<ReportWire, ApiError>;

    /// `DELETE /reportes/reiniciar?desde&hasta`
    async fn reset_reports(&self, range: &DateRange) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpStoreApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStoreApi {
    /// Build a client for the configured API base.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_base.clone() })
    }

    /// Build a client with default timeouts, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and return the body text of a success response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "store API request rejected");
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl StoreApi for HttpStoreApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.url(PRODUCTS_PATH);
        tracing::debug!(%url, "listing products");
        let body = self.send(self.http.get(&url)).await?;
        parse_products(&body)
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<(), ApiError> {
        let url = self.url(PRODUCTS_PATH);
        tracing::debug!(%url, name = %draft.name, "creating product");
        let form = product_form(draft)?;
        self.send(self.http.post(&url).multipart(form)).await?;
        Ok(())
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<(), ApiError> {
        let url = self.url(&product_path(id));
        tracing::debug!(%url, "updating product");
        let form = product_form(draft)?;
        self.send(self.http.put(&url).multipart(form)).await?;
        Ok(())
    }

    async fn deactivate_product(&self, id: ProductId) -> Result<(), ApiError> {
        let url = self.url(&product_path(id));
        tracing::debug!(%url, "deactivating product");
        self.send(self.http.delete(&url)).await?;
        Ok(())
    }

    async fn record_sale(&self, sale: &SaleRequest) -> Result<serde_json::Value, ApiError> {
        let url = self.url(SALES_PATH);
        tracing::debug!(%url, product_id = sale.product_id, quantity = sale.quantity, "recording sale");
        let body = self.send(self.http.post(&url).json(sale)).await?;
        parse_receipt(&body)
    }

    async fn fetch_report(&self, query: &ReportQuery) -> Result<ReportWire, ApiError> {
        let url = self.url(REPORT_RANGE_PATH);
        let params = report_range_params(query);
        tracing::debug!(%url, period = query.period.as_wire(), "fetching report");
        let body = self.send(self.http.get(&url).query(&params)).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn reset_reports(&self, range: &DateRange) -> Result<(), ApiError> {
        let url = self.url(REPORT_RESET_PATH);
        let params = report_reset_params(range);
        tracing::debug!(%url, "resetting reports");
        self.send(self.http.delete(&url).query(&params)).await?;
        Ok(())
    }
}

// =============================================================================
// REQUEST BUILDING
// =============================================================================

fn product_path(id: ProductId) -> String {
    format!("{PRODUCTS_PATH}/{id}")
}

fn report_range_params(query: &ReportQuery) -> Vec<(&'static str, String)> {
    let (desde, hasta) = query.range.query_bounds();
    vec![("desde", desde), ("hasta", hasta), ("periodo", query.period.as_wire().to_owned())]
}

fn report_reset_params(range: &DateRange) -> Vec<(&'static str, String)> {
    let (desde, hasta) = range.query_bounds();
    vec![("desde", desde), ("hasta", hasta)]
}

/// Text fields of the product form in the order the service expects them.
fn product_form_fields(draft: &ProductDraft) -> Vec<(&'static str, String)> {
    vec![
        ("nombre", draft.name.trim().to_owned()),
        ("costo", draft.cost.to_string()),
        ("precio_venta", draft.sale_price.to_string()),
        ("stock", draft.stock.to_string()),
    ]
}

fn product_form(draft: &ProductDraft) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in product_form_fields(draft) {
        form = form.text(name, value);
    }
    if let Some(image) = &draft.image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.mime)
            .map_err(|e| ApiError::Image(e.to_string()))?;
        form = form.part("imagen", part);
    }
    Ok(form)
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_products(body: &str) -> Result<Vec<Product>, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Sale receipts are opaque; an empty body is accepted as `null`.
fn parse_receipt(body: &str) -> Result<serde_json::Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}
