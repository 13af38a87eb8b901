//! In-memory stand-in for the store service, used by view tests.
//!
//! Mirrors the service's documented behavior: listings exclude deactivated
//! products, deactivation is a soft delete, and sales are rejected when the
//! quantity exceeds stock.

use std::sync::Mutex;

use super::api::{ApiError, StoreApi};
use super::types::{DateRange, Product, ProductDraft, ProductId, ReportQuery, ReportWire, SaleRequest};

#[derive(Default)]
pub struct FakeStore {
    inner: Mutex<FakeInner>,
}

#[derive(Default)]
struct FakeInner {
    products: Vec<Product>,
    sales: Vec<SaleRequest>,
    calls: Vec<String>,
    drafts: Vec<ProductDraft>,
    report: ReportWire,
    report_queries: Vec<ReportQuery>,
    resets: Vec<DateRange>,
    fail_next: Option<ApiError>,
    /// One-shot failures keyed by call name.
    fail_calls: Vec<(String, ApiError)>,
    next_id: ProductId,
}

pub fn product(id: ProductId, name: &str, stock: i64) -> Product {
    Product {
        id,
        name: name.to_owned(),
        cost: 10.0,
        sale_price: 15.0,
        stock,
        image_url: None,
        active: Some(true),
    }
}

impl FakeStore {
    pub fn with_products(products: Vec<Product>) -> Self {
        let next_id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(FakeInner { products, next_id, ..FakeInner::default() }),
        }
    }

    pub fn set_report(&self, report: ReportWire) {
        self.inner.lock().unwrap().report = report;
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }

    /// Make the next call named `name` fail with `error`.
    pub fn fail_call(&self, name: &str, error: ApiError) {
        self.inner.lock().unwrap().fail_calls.push((name.to_owned(), error));
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|c| c.as_str() == name).count()
    }

    pub fn sales(&self) -> Vec<SaleRequest> {
        self.inner.lock().unwrap().sales.clone()
    }

    pub fn drafts(&self) -> Vec<ProductDraft> {
        self.inner.lock().unwrap().drafts.clone()
    }

    pub fn report_queries(&self) -> Vec<ReportQuery> {
        self.inner.lock().unwrap().report_queries.clone()
    }

    pub fn resets(&self) -> Vec<DateRange> {
        self.inner.lock().unwrap().resets.clone()
    }

    /// Every stored row, deactivated ones included.
    pub fn all_products(&self) -> Vec<Product> {
        self.inner.lock().unwrap().products.clone()
    }

    fn begin(&self, name: &str) -> Result<std::sync::MutexGuard<'_, FakeInner>, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(name.to_owned());
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        if let Some(pos) = inner.fail_calls.iter().position(|(call, _)| call == name) {
            return Err(inner.fail_calls.remove(pos).1);
        }
        Ok(inner)
    }
}

fn not_found(id: ProductId) -> ApiError {
    ApiError::Status { status: 404, body: format!("producto {id} no encontrado") }
}

#[async_trait::async_trait]
impl StoreApi for FakeStore {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let inner = self.begin("list_products")?;
        Ok(inner.products.iter().filter(|p| p.is_active()).cloned().collect())
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<(), ApiError> {
        let mut inner = self.begin("create_product")?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.drafts.push(draft.clone());
        inner.products.push(Product {
            id,
            name: draft.name.clone(),
            cost: draft.cost,
            sale_price: draft.sale_price,
            stock: draft.stock,
            image_url: draft.image.as_ref().map(|img| format!("uploads/{}", img.file_name)),
            active: Some(true),
        });
        Ok(())
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<(), ApiError> {
        let mut inner = self.begin("update_product")?;
        inner.drafts.push(draft.clone());
        let product = inner.products.iter_mut().find(|p| p.id == id).ok_or_else(|| not_found(id))?;
        product.name.clone_from(&draft.name);
        product.cost = draft.cost;
        product.sale_price = draft.sale_price;
        product.stock = draft.stock;
        Ok(())
    }

    async fn deactivate_product(&self, id: ProductId) -> Result<(), ApiError> {
        let mut inner = self.begin("deactivate_product")?;
        let product = inner.products.iter_mut().find(|p| p.id == id).ok_or_else(|| not_found(id))?;
        product.active = Some(false);
        Ok(())
    }

    async fn record_sale(&self, sale: &SaleRequest) -> Result<serde_json::Value, ApiError> {
        let mut inner = self.begin("record_sale")?;
        let product = inner
            .products
            .iter_mut()
            .find(|p| p.id == sale.product_id)
            .ok_or_else(|| not_found(sale.product_id))?;
        if i64::from(sale.quantity) > product.stock {
            return Err(ApiError::Status { status: 400, body: "Stock insuficiente".to_owned() });
        }
        product.stock -= i64::from(sale.quantity);
        inner.sales.push(*sale);
        Ok(serde_json::json!({ "id_venta": inner.sales.len() }))
    }

    async fn fetch_report(&self, query: &ReportQuery) -> Result<ReportWire, ApiError> {
        let mut inner = self.begin("fetch_report")?;
        inner.report_queries.push(*query);
        Ok(inner.report.clone())
    }

    async fn reset_reports(&self, range: &DateRange) -> Result<(), ApiError> {
        let mut inner = self.begin("reset_reports")?;
        inner.resets.push(*range);
        inner.report = ReportWire::default();
        Ok(())
    }
}
