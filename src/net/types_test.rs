use super::*;
use time::macros::{date, datetime};

// =============================================================
// Product
// =============================================================

#[test]
fn product_deserializes_wire_names() {
    let json = r#"{
        "id_producto": 7,
        "nombre": "Café molido",
        "costo": 45.5,
        "precio_venta": 80,
        "stock": 12,
        "imagen_url": "/static/cafe.png",
        "activo": true
    }"#;
    let product: Product = serde_json::from_str(json).unwrap();
    assert_eq!(product.id, 7);
    assert_eq!(product.name, "Café molido");
    assert!((product.cost - 45.5).abs() < f64::EPSILON);
    assert!((product.sale_price - 80.0).abs() < f64::EPSILON);
    assert_eq!(product.stock, 12);
    assert_eq!(product.image_url.as_deref(), Some("/static/cafe.png"));
    assert!(product.is_active());
}

#[test]
fn product_accepts_decimal_strings() {
    let json = r#"{"id_producto":1,"nombre":"Té","costo":"12.50","precio_venta":"20.00","stock":"3"}"#;
    let product: Product = serde_json::from_str(json).unwrap();
    assert!((product.cost - 12.5).abs() < f64::EPSILON);
    assert!((product.sale_price - 20.0).abs() < f64::EPSILON);
    assert_eq!(product.stock, 3);
}

#[test]
fn product_rejects_non_numeric_amount() {
    let json = r#"{"id_producto":1,"nombre":"Té","costo":"cheap","precio_venta":1,"stock":1}"#;
    assert!(serde_json::from_str::<Product>(json).is_err());
}

#[test]
fn product_missing_or_null_active_counts_as_active() {
    let missing: Product =
        serde_json::from_str(r#"{"id_producto":1,"nombre":"a","costo":1,"precio_venta":2,"stock":0}"#).unwrap();
    let null: Product =
        serde_json::from_str(r#"{"id_producto":1,"nombre":"a","costo":1,"precio_venta":2,"stock":0,"activo":null}"#)
            .unwrap();
    assert!(missing.is_active());
    assert!(null.is_active());
}

#[test]
fn product_explicit_false_is_inactive() {
    let product: Product =
        serde_json::from_str(r#"{"id_producto":1,"nombre":"a","costo":1,"precio_venta":2,"stock":0,"activo":false}"#)
            .unwrap();
    assert!(!product.is_active());
}

// =============================================================
// SaleRequest
// =============================================================

#[test]
fn sale_request_serializes_wire_names() {
    let body = serde_json::to_value(SaleRequest::single(42)).unwrap();
    assert_eq!(body, serde_json::json!({ "id_producto": 42, "cantidad": 1 }));
}

// =============================================================
// ReportPeriod
// =============================================================

#[test]
fn report_period_default_is_month() {
    assert_eq!(ReportPeriod::default(), ReportPeriod::Month);
}

#[test]
fn report_period_wire_values() {
    let wire: Vec<&str> = ReportPeriod::ALL.iter().map(|p| p.as_wire()).collect();
    assert_eq!(wire, vec!["dia", "semana", "mes", "anio"]);
}

#[test]
fn report_period_parses_english_and_spanish() {
    assert_eq!("Week".parse::<ReportPeriod>().unwrap(), ReportPeriod::Week);
    assert_eq!("anio".parse::<ReportPeriod>().unwrap(), ReportPeriod::Year);
    assert_eq!(" dia ".parse::<ReportPeriod>().unwrap(), ReportPeriod::Day);
    assert!("fortnight".parse::<ReportPeriod>().is_err());
}

// =============================================================
// DateRange
// =============================================================

#[test]
fn trailing_days_spans_thirty_days() {
    let now = datetime!(2025-03-31 15:30:00 UTC);
    let range = DateRange::trailing_days(now, 30);
    assert_eq!(range.end(), now);
    assert_eq!(range.start(), datetime!(2025-03-01 15:30:00 UTC));
}

#[test]
fn from_dates_covers_whole_days() {
    let range = DateRange::from_dates(date!(2025-01-01), date!(2025-01-31)).unwrap();
    let (desde, hasta) = range.query_bounds();
    assert_eq!(desde, "2025-01-01T00:00:00.000Z");
    assert_eq!(hasta, "2025-01-31T23:59:59.999Z");
}

#[test]
fn new_normalizes_to_utc() {
    let from = datetime!(2025-01-01 00:00:00 -6);
    let to = datetime!(2025-01-02 00:00:00 -6);
    let range = DateRange::new(from, to).unwrap();
    assert_eq!(range.query_bounds().0, "2025-01-01T06:00:00.000Z");
}

#[test]
fn inverted_range_is_rejected() {
    let err = DateRange::from_dates(date!(2025-02-01), date!(2025-01-01)).unwrap_err();
    assert!(matches!(err, RangeError::Inverted { .. }));
}

#[test]
fn single_day_range_is_allowed() {
    assert!(DateRange::from_dates(date!(2025-02-01), date!(2025-02-01)).is_ok());
}

#[test]
fn parse_dates_rejects_garbage() {
    let err = DateRange::parse_dates("2025-13-01", "2025-01-01").unwrap_err();
    assert_eq!(err, RangeError::InvalidDate("2025-13-01".to_owned()));
}

#[test]
fn range_display_shows_dates() {
    let range = DateRange::parse_dates("2025-01-01", "2025-01-31").unwrap();
    assert_eq!(range.to_string(), "2025-01-01 .. 2025-01-31");
}

// =============================================================
// ReportWire
// =============================================================

#[test]
fn report_wire_parses_full_payload() {
    let json = serde_json::json!({
        "inversion_total": "150.00",
        "generado_total": 320.5,
        "ganancia_neta": "170.50",
        "top5": [{ "nombre": "Café", "vendidos": 9 }],
        "ventas_por_periodo": [
            { "periodo": { "anio": 2025, "mes": 2 }, "inversion": "10", "generado": "30", "ganancia_neta": "20" }
        ]
    });
    let report: ReportWire = serde_json::from_value(json).unwrap();
    assert!((report.total_investment - 150.0).abs() < f64::EPSILON);
    assert!((report.net_margin - 170.5).abs() < f64::EPSILON);
    assert_eq!(report.top_sellers[0].units_sold, 9);
    assert_eq!(report.series[0].period.month, Some(2));
    assert_eq!(report.series[0].period.day, None);
    assert!((report.series[0].revenue - 30.0).abs() < f64::EPSILON);
}

#[test]
fn report_wire_missing_sections_default_to_empty() {
    let report: ReportWire = serde_json::from_str("{}").unwrap();
    assert_eq!(report, ReportWire::default());
}

#[test]
fn report_wire_null_amounts_are_zero() {
    let report: ReportWire = serde_json::from_str(r#"{"inversion_total": null}"#).unwrap();
    assert!(report.total_investment.abs() < f64::EPSILON);
}

#[test]
fn period_key_accepts_text_and_float_parts() {
    let text: PeriodKeyWire = serde_json::from_str(r#"{"anio": "2025", "mes": "2", "dia": " 14 "}"#).unwrap();
    assert_eq!(text, PeriodKeyWire { year: 2025, month: Some(2), day: Some(14) });

    let float: PeriodKeyWire = serde_json::from_str(r#"{"anio": 2025.0, "mes": 2.0, "dia": null}"#).unwrap();
    assert_eq!(float, PeriodKeyWire { year: 2025, month: Some(2), day: None });

    let json = serde_json::json!({
        "ventas_por_periodo": [{ "periodo": { "anio": "2024", "mes": 12.0 }, "generado": 5 }]
    });
    let report: ReportWire = serde_json::from_value(json).unwrap();
    assert_eq!(report.series[0].period, PeriodKeyWire { year: 2024, month: Some(12), day: None });
}

#[test]
fn period_key_rejects_bad_parts() {
    assert!(serde_json::from_str::<PeriodKeyWire>(r#"{"anio": "dos mil"}"#).is_err());
    assert!(serde_json::from_str::<PeriodKeyWire>(r#"{"anio": 2025, "mes": 2.5}"#).is_err());
    assert!(serde_json::from_str::<PeriodKeyWire>(r#"{"anio": 2025, "mes": 300}"#).is_err());
    assert!(serde_json::from_str::<PeriodKeyWire>(r#"{"mes": 2}"#).is_err());
}
