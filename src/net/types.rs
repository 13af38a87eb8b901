//! Wire schema for the catalog, sales and reports service.
//!
//! DESIGN
//! ======
//! The service speaks Spanish field names (`id_producto`, `precio_venta`, ...).
//! Rust-side names are English and mapped with serde renames so the rest of
//! the crate never sees the wire spelling.
//!
//! Amounts may arrive as JSON numbers or as numeric strings (decimal columns
//! rendered as text), so numeric fields go through the lenient helpers in
//! [`loose`].

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// Server-assigned product identifier.
pub type ProductId = i64;

// =============================================================================
// PRODUCTS
// =============================================================================

/// A sellable inventory item as returned by `GET /productos`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "id_producto")]
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "costo", deserialize_with = "loose::amount")]
    pub cost: f64,
    #[serde(rename = "precio_venta", deserialize_with = "loose::amount")]
    pub sale_price: f64,
    #[serde(deserialize_with = "loose::count")]
    pub stock: i64,
    #[serde(rename = "imagen_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "activo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Product {
    /// Only an explicit `false` marks a product as deactivated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active != Some(false)
    }
}

/// An image file staged for upload with a product form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Validated product fields ready to be posted as multipart form data.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub cost: f64,
    pub sale_price: f64,
    pub stock: i64,
    pub image: Option<ImageUpload>,
}

// =============================================================================
// SALES
// =============================================================================

/// Body of `POST /ventas/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    #[serde(rename = "id_producto")]
    pub product_id: ProductId,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

impl SaleRequest {
    /// The list view always sells a single unit.
    #[must_use]
    pub fn single(product_id: ProductId) -> Self {
        Self { product_id, quantity: 1 }
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// Aggregation granularity for `GET /reportes/rango`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl ReportPeriod {
    pub const ALL: [Self; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    /// Query-string value understood by the service.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Day => "dia",
            Self::Week => "semana",
            Self::Month => "mes",
            Self::Year => "anio",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "dia" | "día" => Ok(Self::Day),
            "week" | "semana" => Ok(Self::Week),
            "month" | "mes" => Ok(Self::Month),
            "year" | "anio" | "año" => Ok(Self::Year),
            other => Err(format!("unknown period '{other}' (expected day, week, month or year)")),
        }
    }
}

/// Errors building a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("start date {from} is after end date {to}")]
    Inverted { from: String, to: String },
}

/// Inclusive reporting window, always held in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    from: OffsetDateTime,
    to: OffsetDateTime,
}

impl DateRange {
    /// Build a range from two instants.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::Inverted`] when `from` is later than `to`.
    pub fn new(from: OffsetDateTime, to: OffsetDateTime) -> Result<Self, RangeError> {
        let from = from.to_offset(UtcOffset::UTC);
        let to = to.to_offset(UtcOffset::UTC);
        if from > to {
            return Err(RangeError::Inverted {
                from: from.date().to_string(),
                to: to.date().to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// The window ending at `now` and starting `days` days earlier.
    #[must_use]
    pub fn trailing_days(now: OffsetDateTime, days: i64) -> Self {
        let to = now.to_offset(UtcOffset::UTC);
        Self { from: to - Duration::days(days), to }
    }

    /// Whole calendar days: `from` at midnight through the last millisecond of `to`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::Inverted`] when `from` is after `to`.
    pub fn from_dates(from: Date, to: Date) -> Result<Self, RangeError> {
        let end_of_day = time::macros::time!(23:59:59.999);
        Self::new(from.midnight().assume_utc(), to.with_time(end_of_day).assume_utc())
    }

    /// Parse two `YYYY-MM-DD` strings into a whole-day range.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] when either date is malformed or the range is inverted.
    pub fn parse_dates(from: &str, to: &str) -> Result<Self, RangeError> {
        Self::from_dates(parse_date(from)?, parse_date(to)?)
    }

    #[must_use]
    pub fn start(&self) -> OffsetDateTime {
        self.from
    }

    #[must_use]
    pub fn end(&self) -> OffsetDateTime {
        self.to
    }

    /// `(desde, hasta)` query values as ISO-8601 UTC timestamps with millisecond precision.
    #[must_use]
    pub fn query_bounds(&self) -> (String, String) {
        (iso_millis(self.from), iso_millis(self.to))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.from.date(), self.to.date())
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`RangeError::InvalidDate`] when the text is not a valid date.
pub fn parse_date(raw: &str) -> Result<Date, RangeError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), format).map_err(|_| RangeError::InvalidDate(raw.trim().to_owned()))
}

fn iso_millis(at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second(),
        at.millisecond()
    )
}

/// Parameters of one report fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportQuery {
    pub range: DateRange,
    pub period: ReportPeriod,
}

/// Raw `GET /reportes/rango` payload. The client treats it as read-only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportWire {
    #[serde(rename = "inversion_total", default, deserialize_with = "loose::amount")]
    pub total_investment: f64,
    #[serde(rename = "generado_total", default, deserialize_with = "loose::amount")]
    pub total_revenue: f64,
    #[serde(rename = "ganancia_neta", default, deserialize_with = "loose::amount")]
    pub net_margin: f64,
    #[serde(rename = "top5", default)]
    pub top_sellers: Vec<TopSeller>,
    #[serde(rename = "ventas_por_periodo", default)]
    pub series: Vec<PeriodBucketWire>,
}

/// One entry of the best-seller list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopSeller {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "vendidos", default, deserialize_with = "loose::count")]
    pub units_sold: i64,
}

/// One time bucket of the sales series, keyed by calendar parts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucketWire {
    #[serde(rename = "periodo")]
    pub period: PeriodKeyWire,
    #[serde(rename = "inversion", default, deserialize_with = "loose::amount")]
    pub investment: f64,
    #[serde(rename = "generado", default, deserialize_with = "loose::amount")]
    pub revenue: f64,
    #[serde(rename = "ganancia_neta", default, deserialize_with = "loose::amount")]
    pub net_margin: f64,
}

/// Calendar parts of a bucket. Coarser periods omit `mes`/`dia`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodKeyWire {
    #[serde(rename = "anio", deserialize_with = "loose::year")]
    pub year: i32,
    #[serde(rename = "mes", default, deserialize_with = "loose::part", skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(rename = "dia", default, deserialize_with = "loose::part", skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
}

// =============================================================================
// LENIENT NUMBERS
// =============================================================================

/// Deserializers accepting numbers, numeric strings, or `null` (as zero).
pub(crate) mod loose {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Loose>::deserialize(deserializer)? {
            None => Ok(0.0),
            #[allow(clippy::cast_precision_loss)]
            Some(Loose::Int(value)) => Ok(value as f64),
            Some(Loose::Float(value)) => Ok(value),
            Some(Loose::Text(text)) => parse_text(&text)
                .filter(|value| value.is_finite())
                .ok_or_else(|| D::Error::custom(format!("invalid amount: {text:?}"))),
        }
    }

    pub fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Loose>::deserialize(deserializer)? {
            None => Ok(0),
            Some(Loose::Int(value)) => Ok(value),
            #[allow(clippy::cast_possible_truncation)]
            Some(Loose::Float(value)) if value.fract() == 0.0 && value.is_finite() => Ok(value as i64),
            Some(Loose::Float(value)) => Err(D::Error::custom(format!("invalid count: {value}"))),
            Some(Loose::Text(text)) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("invalid count: {text:?}"))),
        }
    }

    /// A calendar part: integer, integral float, or numeric string. `null` is `None`.
    pub fn part<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        let whole = match Option::<Loose>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Loose::Int(value)) => Some(value),
            #[allow(clippy::cast_possible_truncation)]
            Some(Loose::Float(value)) if value.fract() == 0.0 && value.is_finite() => Some(value as i64),
            Some(Loose::Float(_)) => None,
            Some(Loose::Text(text)) => match text.trim() {
                "" => return Ok(None),
                trimmed => trimmed.parse::<i64>().ok(),
            },
        };
        whole
            .and_then(|value| T::try_from(value).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom("invalid calendar part"))
    }

    /// Like [`part`] but the value must be present.
    pub fn year<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        part(deserializer)?.ok_or_else(|| D::Error::custom("missing year"))
    }

    fn parse_text(text: &str) -> Option<f64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Some(0.0);
        }
        trimmed.parse::<f64>().ok()
    }
}
