//! Interactive line shell over the three sections.
//!
//! DESIGN
//! ======
//! Parsing is a pure function from a line to a [`ShellCommand`]. The shell
//! then routes the command to the active page and redraws it. Pages report
//! their own failures through notices and banners, so the shell only prints
//! errors that never reach a page (bad input, wrong section).
//!
//! Confirmations read from the same input as commands.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use time::OffsetDateTime;

use crate::components::confirm::LineConfirm;
use crate::components::navbar::render_navbar;
use crate::config::ClientConfig;
use crate::net::api::StoreApi;
use crate::net::types::{DateRange, ProductId, ReportPeriod};
use crate::pages::products::ProductsPage;
use crate::pages::register::RegisterPage;
use crate::pages::reports::ReportsPage;
use crate::state::nav::{NavState, Section};
use crate::state::products::StockFilter;
use crate::state::registration::FormField;
use crate::util::image::PreviewTracker;

const HELP: &str = "\
Sections:
  products | register | reports     switch section
Products:
  search <text>                     filter by name (blank clears)
  filter all|low|out                filter by stock tier
  clear                             clear search and stock filter
  sell <id>                         sell one unit
Register:
  set name|cost|price|stock <value> edit a form field
  image <path> | image none         stage or drop an image
  edit <id>                         load a product into the form
  submit                            register or update
  cancel                            discard the form
  deactivate <id>                   deactivate a product
Reports:
  range <YYYY-MM-DD> <YYYY-MM-DD>   select the date range
  period day|week|month|year        select the grouping
  reset                             delete report data for the range
Other:
  help                              this text
  quit                              exit";

/// One parsed shell line.
#[derive(Clone, Debug, PartialEq)]
pub enum ShellCommand {
    Help,
    /// Empty line: redraw the active section.
    Redraw,
    Go(Section),
    Search(String),
    Filter(StockFilter),
    Clear,
    Sell(ProductId),
    Set(FormField, String),
    /// `None` drops the staged image.
    Image(Option<PathBuf>),
    Edit(ProductId),
    Submit,
    Cancel,
    Deactivate(ProductId),
    Range(DateRange),
    Period(ReportPeriod),
    Reset,
    Quit,
}

/// Parse one input line.
///
/// # Errors
///
/// Returns a message describing the unknown command or bad argument.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "" => Ok(ShellCommand::Redraw),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        "products" | "register" | "reports" | "productos" | "registrar" | "reportes" => {
            word.parse().map(ShellCommand::Go)
        }
        "search" | "buscar" => Ok(ShellCommand::Search(rest.to_owned())),
        "filter" | "filtro" => require(rest, "filter all|low|out")?.parse().map(ShellCommand::Filter),
        "clear" => Ok(ShellCommand::Clear),
        "sell" | "vender" => parse_id(rest, "sell <id>").map(ShellCommand::Sell),
        "set" => {
            let usage = "set name|cost|price|stock <value>";
            let (field, value) = require(rest, usage)?.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Ok(ShellCommand::Set(field.parse()?, value.trim().to_owned()))
        }
        "image" | "imagen" => match require(rest, "image <path> | image none")? {
            "none" | "-" => Ok(ShellCommand::Image(None)),
            path => Ok(ShellCommand::Image(Some(PathBuf::from(path)))),
        },
        "edit" | "editar" => parse_id(rest, "edit <id>").map(ShellCommand::Edit),
        "submit" | "save" | "guardar" => Ok(ShellCommand::Submit),
        "cancel" | "cancelar" => Ok(ShellCommand::Cancel),
        "deactivate" | "desactivar" => parse_id(rest, "deactivate <id>").map(ShellCommand::Deactivate),
        "range" | "rango" => {
            let usage = "range <YYYY-MM-DD> <YYYY-MM-DD>";
            let mut parts = require(rest, usage)?.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(from), Some(to), None) => DateRange::parse_dates(from, to)
                    .map(ShellCommand::Range)
                    .map_err(|e| e.to_string()),
                _ => Err(format!("usage: {usage}")),
            }
        }
        "period" | "periodo" => require(rest, "period day|week|month|year")?.parse().map(ShellCommand::Period),
        "reset" | "reiniciar" => Ok(ShellCommand::Reset),
        other => Err(format!("unknown command '{other}' (type help)")),
    }
}

fn require<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(rest)
    }
}

fn parse_id(rest: &str, usage: &str) -> Result<ProductId, String> {
    require(rest, usage)?
        .parse()
        .map_err(|_| format!("invalid product id '{rest}'"))
}

/// Whether the shell keeps reading after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    api: Arc<dyn StoreApi>,
    config: ClientConfig,
    tracker: PreviewTracker,
    nav: NavState,
    products: ProductsPage,
    register: Option<RegisterPage>,
    reports: Option<ReportsPage>,
}

impl Shell {
    #[must_use]
    pub fn new(api: Arc<dyn StoreApi>, config: ClientConfig) -> Self {
        let products = ProductsPage::new(Arc::clone(&api), &config);
        Self {
            api,
            config,
            tracker: PreviewTracker::new(),
            nav: NavState::default(),
            products,
            register: None,
            reports: None,
        }
    }

    #[must_use]
    pub fn active(&self) -> Section {
        self.nav.active
    }

    /// Live image previews; zero whenever the registration view is unmounted.
    #[must_use]
    pub fn live_previews(&self) -> usize {
        self.tracker.live()
    }

    /// Initial mount of the default section.
    pub async fn start(&mut self) {
        let _ = self.products.load().await;
    }

    /// Switch sections, unmounting the one left behind.
    pub async fn navigate(&mut self, to: Section) {
        if self.nav.navigate(to).is_none() {
            return;
        }
        if to != Section::Register {
            self.register = None;
        }
        if to != Section::Reports {
            self.reports = None;
        }
        match to {
            Section::Products => {
                self.products.enter(Instant::now()).await;
            }
            Section::Register => {
                let mut page = RegisterPage::new(Arc::clone(&self.api), &self.config, self.tracker.clone());
                let _ = page.load().await;
                self.register = Some(page);
            }
            Section::Reports => {
                let mut page = ReportsPage::new(Arc::clone(&self.api), OffsetDateTime::now_utc());
                let _ = page.refresh().await;
                self.reports = Some(page);
            }
        }
    }

    /// Run one command. `input` answers confirmation prompts.
    ///
    /// # Errors
    ///
    /// Returns a message for commands that cannot run in the active section.
    pub async fn execute<R: BufRead>(&mut self, command: ShellCommand, input: &mut R) -> Result<Flow, String> {
        match command {
            ShellCommand::Help | ShellCommand::Redraw => {}
            ShellCommand::Quit => return Ok(Flow::Quit),
            ShellCommand::Go(section) => self.navigate(section).await,
            ShellCommand::Search(text) => self.products_page()?.set_query(&text),
            ShellCommand::Filter(filter) => self.products_page()?.set_stock_filter(filter),
            ShellCommand::Clear => self.products_page()?.clear_filters(),
            ShellCommand::Sell(id) => {
                let _ = self.products_page()?.sell(id).await;
            }
            ShellCommand::Set(field, value) => self.register_page()?.set_field(field, &value),
            ShellCommand::Image(Some(path)) => {
                let _ = self.register_page()?.attach_image(&path).await;
            }
            ShellCommand::Image(None) => self.register_page()?.clear_image(),
            ShellCommand::Edit(id) => {
                let _ = self.register_page()?.edit(id);
            }
            ShellCommand::Submit => {
                let _ = self.register_page()?.submit().await;
            }
            ShellCommand::Cancel => self.register_page()?.cancel(),
            ShellCommand::Deactivate(id) => {
                let mut confirm = LineConfirm::new(&mut *input);
                let _ = self.register_page()?.deactivate(id, &mut confirm).await;
            }
            ShellCommand::Range(range) => {
                let _ = self.reports_page()?.set_range(range).await;
            }
            ShellCommand::Period(period) => {
                let _ = self.reports_page()?.set_period(period).await;
            }
            ShellCommand::Reset => {
                let mut confirm = LineConfirm::new(&mut *input);
                let _ = self.reports_page()?.reset(&mut confirm).await;
            }
        }
        Ok(Flow::Continue)
    }

    fn products_page(&mut self) -> Result<&mut ProductsPage, String> {
        if self.nav.active == Section::Products {
            Ok(&mut self.products)
        } else {
            Err(wrong_section(Section::Products))
        }
    }

    fn register_page(&mut self) -> Result<&mut RegisterPage, String> {
        match (self.nav.active, self.register.as_mut()) {
            (Section::Register, Some(page)) => Ok(page),
            _ => Err(wrong_section(Section::Register)),
        }
    }

    fn reports_page(&mut self) -> Result<&mut ReportsPage, String> {
        match (self.nav.active, self.reports.as_mut()) {
            (Section::Reports, Some(page)) => Ok(page),
            _ => Err(wrong_section(Section::Reports)),
        }
    }

    /// Draw the navbar and the active section.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", render_navbar(self.nav.active))?;
        writeln!(out)?;
        match self.nav.active {
            Section::Products => self.products.render(out)?,
            Section::Register => {
                if let Some(page) = &self.register {
                    page.render(out, Instant::now())?;
                }
            }
            Section::Reports => {
                if let Some(page) = self.reports.as_mut() {
                    page.render(out)?;
                }
            }
        }
        writeln!(out)
    }

    /// Read commands from `input` until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from reading `input` or writing `out`.
    pub async fn run<R: BufRead>(&mut self, mut input: R, out: &mut dyn Write) -> io::Result<()> {
        self.start().await;
        self.render(out)?;

        let mut line = String::new();
        loop {
            write!(out, "{}> ", self.nav.active.label().to_lowercase())?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(message) => {
                    writeln!(out, "error: {message}")?;
                    continue;
                }
            };
            let show_help = command == ShellCommand::Help;
            match self.execute(command, &mut input).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) if show_help => writeln!(out, "{HELP}")?,
                Ok(Flow::Continue) => self.render(out)?,
                Err(message) => writeln!(out, "error: {message}")?,
            }
        }
        tracing::debug!("shell closed");
        Ok(())
    }
}

fn wrong_section(section: Section) -> String {
    format!("that command works in {section} (type `{}`)", section.label().to_lowercase())
}
