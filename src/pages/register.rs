//! Registration page: create, edit and deactivate products.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::components::banner::render_notice;
use crate::components::confirm::Confirm;
use crate::components::table::Table;
use crate::config::ClientConfig;
use crate::net::api::{ApiError, StoreApi};
use crate::net::types::ProductId;
use crate::state::notice::Notice;
use crate::state::registration::{FormField, FormMode, RegisterError, RegistrationState, StockClass, stock_class};
use crate::util::image::{ImageAttachment, PreviewTracker, load_upload, resolve_image_src};
use crate::util::money::format_currency;

pub struct RegisterPage {
    api: Arc<dyn StoreApi>,
    api_base: String,
    tracker: PreviewTracker,
    pub state: RegistrationState,
}

impl RegisterPage {
    #[must_use]
    pub fn new(api: Arc<dyn StoreApi>, config: &ClientConfig, tracker: PreviewTracker) -> Self {
        Self {
            api,
            api_base: config.api_base.clone(),
            tracker,
            state: RegistrationState::default(),
        }
    }

    /// Load the product table.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after showing an error banner.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.state.loading = true;
        let result = self.api.list_products().await;
        self.state.loading = false;
        match result {
            Ok(products) => {
                self.state.products = products;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "product table load failed");
                self.state
                    .show_error(format!("could not load products: {}", error.summary()), Instant::now());
                Err(error)
            }
        }
    }

    pub fn set_field(&mut self, field: FormField, value: &str) {
        self.state.set_field(field, value);
    }

    /// Stage the image at `path`, replacing any staged one.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::Image`] for unsupported or unreadable files.
    pub async fn attach_image(&mut self, path: &Path) -> Result<(), RegisterError> {
        match load_upload(path).await {
            Ok(upload) => {
                self.state.form.attach_image(ImageAttachment::new(upload, &self.tracker));
                self.state.banner = None;
                Ok(())
            }
            Err(error) => {
                self.state.show_error(error.to_string(), Instant::now());
                Err(error.into())
            }
        }
    }

    pub fn clear_image(&mut self) {
        self.state.form.clear_image();
    }

    /// Load product `id` into the form.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::UnknownProduct`] if `id` is not in the table.
    pub fn edit(&mut self, id: ProductId) -> Result<(), RegisterError> {
        let Some(product) = self.state.find(id).cloned() else {
            return Err(self.refuse(RegisterError::UnknownProduct(id)));
        };
        self.state.form.load(&product);
        self.state.banner = None;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.state.form.reset();
        self.state.banner = None;
    }

    /// Validate and send the form.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError`] for validation failures, a request already in
    /// flight, or a rejected request. The form keeps its contents on error.
    pub async fn submit(&mut self) -> Result<(), RegisterError> {
        if self.state.loading {
            return Err(self.refuse(RegisterError::Busy));
        }
        let draft = match self.state.form.validate() {
            Ok(draft) => draft,
            Err(error) => {
                self.state.show_error(error.to_string(), Instant::now());
                return Err(error.into());
            }
        };

        let mode = self.state.form.mode;
        self.state.loading = true;
        let result = match mode {
            FormMode::Create => self.api.create_product(&draft).await,
            FormMode::Edit(id) => self.api.update_product(id, &draft).await,
        };
        self.state.loading = false;

        match result {
            Ok(()) => {
                tracing::info!(name = %draft.name, ?mode, "product saved");
                self.state.form.reset();
                let text = match mode {
                    FormMode::Create => "product registered",
                    FormMode::Edit(_) => "product updated",
                };
                self.reload_and_announce(text).await;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, ?mode, "product save failed");
                self.state
                    .show_error(format!("could not save the product: {}", error.summary()), Instant::now());
                Err(error.into())
            }
        }
    }

    /// Soft-delete product `id` after confirmation. Returns `false` when the
    /// user declined.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError`] if `id` is unknown, a request is in flight,
    /// or the service rejects the call.
    pub async fn deactivate(&mut self, id: ProductId, confirm: &mut dyn Confirm) -> Result<bool, RegisterError> {
        if self.state.loading {
            return Err(self.refuse(RegisterError::Busy));
        }
        let Some(name) = self.state.find(id).map(|p| p.name.clone()) else {
            return Err(self.refuse(RegisterError::UnknownProduct(id)));
        };
        if !confirm.confirm(&format!("Deactivate \"{name}\"?")) {
            return Ok(false);
        }

        self.state.loading = true;
        let result = self.api.deactivate_product(id).await;
        self.state.loading = false;

        match result {
            Ok(()) => {
                tracing::info!(product_id = id, "product deactivated");
                if self.state.form.mode == FormMode::Edit(id) {
                    self.state.form.reset();
                }
                self.reload_and_announce(&format!("\"{name}\" deactivated")).await;
                Ok(true)
            }
            Err(error) => {
                tracing::warn!(product_id = id, %error, "deactivation failed");
                self.state
                    .show_error(format!("could not deactivate the product: {}", error.summary()), Instant::now());
                Err(error.into())
            }
        }
    }

    /// Reload the table after a mutation. A failed reload turns the success
    /// banner into a warning so the stale table is not silent.
    async fn reload_and_announce(&mut self, done: &str) {
        match self.load().await {
            Ok(()) => self.state.show_success(done, Instant::now()),
            Err(error) => {
                let text = format!("{done}, but the product list could not be refreshed: {}", error.summary());
                self.state.banner = Some(Notice::warning(text, Instant::now()));
            }
        }
    }

    /// Show a locally refused action in the banner and hand the error back.
    fn refuse(&mut self, error: RegisterError) -> RegisterError {
        self.state.show_error(error.to_string(), Instant::now());
        error
    }

    /// Render the form and the product table.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn render(&self, out: &mut dyn Write, now: Instant) -> io::Result<()> {
        let form = &self.state.form;
        match form.mode {
            FormMode::Create => writeln!(out, "Register new product")?,
            FormMode::Edit(id) => writeln!(out, "Edit product #{id}")?,
        }
        if let Some(banner) = self.state.visible_banner(now) {
            writeln!(out, "{}", render_notice(banner))?;
        }

        writeln!(out, "  name:       {}", form.name)?;
        writeln!(out, "  cost:       {}", form.cost)?;
        writeln!(out, "  sale price: {}", form.sale_price)?;
        writeln!(out, "  stock:      {}", form.stock)?;
        let image = match (&form.image, &form.image_url) {
            (Some(attachment), _) => attachment.describe(),
            (None, current) => resolve_image_src(&self.api_base, current.as_deref())
                .unwrap_or_else(|| "(none)".to_owned()),
        };
        writeln!(out, "  image:      {image}")?;

        let action = if form.is_editing() { "update" } else { "register" };
        if self.state.loading {
            writeln!(out, "Working...")?;
        } else if form.is_editing() {
            writeln!(out, "submit to {action}, cancel to discard")?;
        } else {
            writeln!(out, "submit to {action}")?;
        }
        writeln!(out)?;

        let products = self.state.active_products();
        if products.is_empty() {
            if !self.state.loading {
                writeln!(out, "No active products. Register the first one above.")?;
            }
            return Ok(());
        }

        let mut table = Table::new(&["ID", "Name", "Cost", "Price", "Stock", "Image"]);
        for product in products {
            let class = match stock_class(product.stock) {
                StockClass::High => "high",
                StockClass::Medium => "medium",
                StockClass::Low => "low",
            };
            table.push_row(vec![
                product.id.to_string(),
                product.name.clone(),
                format_currency(product.cost),
                format_currency(product.sale_price),
                format!("{} ({class})", product.stock),
                resolve_image_src(&self.api_base, product.image_url.as_deref()).unwrap_or_else(|| "-".to_owned()),
            ]);
        }
        for line in table.render() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
