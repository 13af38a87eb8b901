//! Registration form state: one form for create and edit, plus the product table.
//!
//! DESIGN
//! ======
//! Field values are kept as the raw text the user typed; validation parses
//! them all at once and reports every violation together. The staged image
//! owns its preview, so any path that replaces or drops it releases the
//! preview (see `util::image`).

#[cfg(test)]
#[path = "registration_test.rs"]
mod registration_test;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use super::notice::Notice;
use crate::net::api::ApiError;
use crate::net::types::{Product, ProductDraft, ProductId};
use crate::util::image::{ImageAttachment, ImageError};

pub const NAME_MAX_CHARS: usize = 100;
/// How long a banner stays on screen.
pub const BANNER_TTL: Duration = Duration::from_secs(5);

/// Whether the form creates a new product or edits an existing one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Edit(ProductId),
}

/// Editable text fields of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Cost,
    SalePrice,
    Stock,
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "nombre" => Ok(Self::Name),
            "cost" | "costo" => Ok(Self::Cost),
            "price" | "sale_price" | "precio" | "precio_venta" => Ok(Self::SalePrice),
            "stock" => Ok(Self::Stock),
            other => Err(format!("unknown field '{other}' (expected name, cost, price or stock)")),
        }
    }
}

/// Every validation violation found in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join(". "))
    }
}

impl std::error::Error for ValidationError {}

/// Failures of registration actions.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("another request is still in progress")]
    Busy,
    #[error("product {0} is not in the list")]
    UnknownProduct(ProductId),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
}

/// The create/edit form.
#[derive(Debug, Default)]
pub struct ProductForm {
    /// Create or edit.
    pub mode: FormMode,
    /// Raw text of each field, validated only on submit.
    pub name: String,
    pub cost: String,
    pub sale_price: String,
    pub stock: String,
    /// Newly staged image; replaces the current one on submit.
    pub image: Option<ImageAttachment>,
    /// Image reference of the product being edited.
    pub image_url: Option<String>,
}

impl ProductForm {
    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn set_field(&mut self, field: FormField, value: &str) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Cost => &mut self.cost,
            FormField::SalePrice => &mut self.sale_price,
            FormField::Stock => &mut self.stock,
        };
        value.clone_into(slot);
    }

    /// Stage an image; the previous preview is released.
    pub fn attach_image(&mut self, attachment: ImageAttachment) {
        self.image = Some(attachment);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Load `product` for editing. Any staged image is dropped.
    pub fn load(&mut self, product: &Product) {
        *self = Self {
            mode: FormMode::Edit(product.id),
            name: product.name.clone(),
            cost: product.cost.to_string(),
            sale_price: product.sale_price.to_string(),
            stock: product.stock.to_string(),
            image: None,
            image_url: product.image_url.clone(),
        };
    }

    /// Back to an empty create form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check every field and collect all violations.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing each violation when any field is invalid.
    pub fn validate(&self) -> Result<ProductDraft, ValidationError> {
        let mut messages = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            messages.push("name is required".to_owned());
        } else if name.chars().count() > NAME_MAX_CHARS {
            messages.push(format!("name must be at most {NAME_MAX_CHARS} characters"));
        }

        let cost = positive_amount(&self.cost);
        if cost.is_none() {
            messages.push("cost must be greater than 0".to_owned());
        }
        let sale_price = positive_amount(&self.sale_price);
        if sale_price.is_none() {
            messages.push("sale price must be greater than 0".to_owned());
        }

        let stock = match self.stock.trim() {
            "" => {
                messages.push("stock is required".to_owned());
                None
            }
            raw => match raw.parse::<i64>() {
                Ok(value) if value < 0 => {
                    messages.push("stock cannot be negative".to_owned());
                    None
                }
                Ok(value) => Some(value),
                Err(_) => {
                    messages.push("stock must be a whole number".to_owned());
                    None
                }
            },
        };

        match (cost, sale_price, stock) {
            (Some(cost), Some(sale_price), Some(stock)) if messages.is_empty() => Ok(ProductDraft {
                name: name.to_owned(),
                cost,
                sale_price,
                stock,
                image: self.image.as_ref().map(|attachment| attachment.upload.clone()),
            }),
            _ => Err(ValidationError { messages }),
        }
    }
}

fn positive_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Stock level class shown in the product table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockClass {
    High,
    Medium,
    Low,
}

#[must_use]
pub fn stock_class(stock: i64) -> StockClass {
    if stock > 20 {
        StockClass::High
    } else if stock > 5 {
        StockClass::Medium
    } else {
        StockClass::Low
    }
}

/// Local state of the registration view.
#[derive(Debug, Default)]
pub struct RegistrationState {
    /// The create/edit form.
    pub form: ProductForm,
    /// Product table, as last fetched.
    pub products: Vec<Product>,
    /// A list load or mutation is in flight; actions are disabled.
    pub loading: bool,
    /// Inline message; expires after [`BANNER_TTL`].
    pub banner: Option<Notice>,
}

impl RegistrationState {
    /// Products shown in the table; deactivated rows are hidden.
    #[must_use]
    pub fn active_products(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_active()).collect()
    }

    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Edit a field; any banner is dismissed.
    pub fn set_field(&mut self, field: FormField, value: &str) {
        self.form.set_field(field, value);
        self.banner = None;
    }

    pub fn show_error(&mut self, text: impl Into<String>, now: Instant) {
        self.banner = Some(Notice::error(text, now));
    }

    pub fn show_success(&mut self, text: impl Into<String>, now: Instant) {
        self.banner = Some(Notice::success(text, now));
    }

    /// The banner, if it has not expired yet.
    #[must_use]
    pub fn visible_banner(&self, now: Instant) -> Option<&Notice> {
        self.banner.as_ref().filter(|b| b.is_visible(now, BANNER_TTL))
    }
}
