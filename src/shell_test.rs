use std::io::Cursor;
use std::sync::Arc;

use super::*;
use crate::net::fake::{FakeStore, product};

// =============================================================
// parse_command
// =============================================================

#[test]
fn parses_navigation_in_both_languages() {
    assert_eq!(parse_command("register"), Ok(ShellCommand::Go(Section::Register)));
    assert_eq!(parse_command("  Reportes "), Ok(ShellCommand::Go(Section::Reports)));
}

#[test]
fn parses_product_commands() {
    assert_eq!(parse_command("search pan dulce"), Ok(ShellCommand::Search("pan dulce".to_owned())));
    assert_eq!(parse_command("search"), Ok(ShellCommand::Search(String::new())));
    assert_eq!(parse_command("filter low"), Ok(ShellCommand::Filter(StockFilter::Low)));
    assert_eq!(parse_command("sell 12"), Ok(ShellCommand::Sell(12)));
}

#[test]
fn parses_form_commands() {
    assert_eq!(
        parse_command("set name Pan de muerto"),
        Ok(ShellCommand::Set(FormField::Name, "Pan de muerto".to_owned()))
    );
    assert_eq!(parse_command("set precio 9.5"), Ok(ShellCommand::Set(FormField::SalePrice, "9.5".to_owned())));
    assert_eq!(parse_command("image none"), Ok(ShellCommand::Image(None)));
    assert_eq!(
        parse_command("image ./pan.png"),
        Ok(ShellCommand::Image(Some(PathBuf::from("./pan.png"))))
    );
}

#[test]
fn parses_report_commands() {
    let range = DateRange::parse_dates("2025-01-01", "2025-01-31").unwrap();
    assert_eq!(parse_command("range 2025-01-01 2025-01-31"), Ok(ShellCommand::Range(range)));
    assert_eq!(parse_command("period anio"), Ok(ShellCommand::Period(ReportPeriod::Year)));
}

#[test]
fn empty_line_redraws() {
    assert_eq!(parse_command("   "), Ok(ShellCommand::Redraw));
}

#[test]
fn rejects_bad_input() {
    assert!(parse_command("dance").unwrap_err().contains("unknown command"));
    assert!(parse_command("sell").unwrap_err().starts_with("usage"));
    assert!(parse_command("sell abc").unwrap_err().contains("invalid product id"));
    assert!(parse_command("filter some").is_err());
    assert!(parse_command("set color red").is_err());
    assert!(parse_command("range 2025-02-01 2025-01-01").is_err());
    assert!(parse_command("range 2025-02-01").is_err());
}

// =============================================================
// Shell
// =============================================================

fn shell_with(store: &Arc<FakeStore>) -> Shell {
    Shell::new(Arc::clone(store) as Arc<dyn StoreApi>, ClientConfig::default())
}

async fn run_script(shell: &mut Shell, script: &str) -> String {
    let mut out = Vec::new();
    shell.run(Cursor::new(script.as_bytes()), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn sells_from_product_section() {
    let store = Arc::new(FakeStore::with_products(vec![product(1, "Pan", 4)]));
    let mut shell = shell_with(&store);

    let output = run_script(&mut shell, "sell 1\nquit\n").await;
    assert_eq!(store.sales().len(), 1);
    assert!(output.contains("[OK] sale recorded"));
}

#[tokio::test]
async fn section_commands_require_their_section() {
    let store = Arc::new(FakeStore::with_products(vec![product(1, "Pan", 4)]));
    let mut shell = shell_with(&store);

    let output = run_script(&mut shell, "submit\nreset\n").await;
    assert!(output.contains("that command works in Register"));
    assert!(output.contains("that command works in Reports"));
    assert_eq!(store.call_count("reset_reports"), 0);
}

#[tokio::test]
async fn registers_product_through_form() {
    let store = Arc::new(FakeStore::default());
    let mut shell = shell_with(&store);

    let script = "register\nset name Pan\nset cost 2\nset price 3.5\nset stock 10\nsubmit\n";
    let output = run_script(&mut shell, script).await;
    assert_eq!(shell.active(), Section::Register);
    assert_eq!(store.drafts().len(), 1);
    assert!(output.contains("[OK] product registered"));
}

#[tokio::test]
async fn deactivation_reads_confirmation_from_input() {
    let store = Arc::new(FakeStore::with_products(vec![product(1, "Pan", 4)]));
    let mut shell = shell_with(&store);

    run_script(&mut shell, "register\ndeactivate 1\nn\n").await;
    assert_eq!(store.call_count("deactivate_product"), 0);

    run_script(&mut shell, "deactivate 1\ny\n").await;
    assert_eq!(store.call_count("deactivate_product"), 1);
}

#[tokio::test]
async fn leaving_register_releases_preview() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pan.png");
    std::fs::write(&path, [0_u8; 16]).unwrap();
    let store = Arc::new(FakeStore::default());
    let mut shell = shell_with(&store);

    run_script(&mut shell, &format!("register\nimage {}\n", path.display())).await;
    assert_eq!(shell.live_previews(), 1);

    run_script(&mut shell, "products\n").await;
    assert_eq!(shell.live_previews(), 0);
}

#[tokio::test]
async fn entering_reports_fetches_and_period_refetches() {
    let store = Arc::new(FakeStore::default());
    let mut shell = shell_with(&store);

    let output = run_script(&mut shell, "reports\nperiod day\nperiod day\n").await;
    assert_eq!(store.call_count("fetch_report"), 2);
    assert_eq!(store.report_queries()[1].period, ReportPeriod::Day);
    assert!(output.contains("by day"));
}

#[tokio::test]
async fn unknown_command_keeps_shell_running() {
    let store = Arc::new(FakeStore::default());
    let mut shell = shell_with(&store);

    let output = run_script(&mut shell, "dance\nhelp\n").await;
    assert!(output.contains("error: unknown command 'dance'"));
    assert!(output.contains("deactivate <id>"));
}
