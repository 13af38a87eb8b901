use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use claudstore::components::banner::render_notice;
use claudstore::components::confirm::{AssumeYes, Confirm, LineConfirm};
use claudstore::config::{ClientConfig, ConfigError};
use claudstore::net::api::{ApiError, HttpStoreApi, StoreApi};
use claudstore::net::types::{DateRange, ProductId, RangeError, ReportPeriod};
use claudstore::pages::products::ProductsPage;
use claudstore::pages::register::RegisterPage;
use claudstore::pages::reports::ReportsPage;
use claudstore::shell::Shell;
use claudstore::state::products::{SellError, StockFilter};
use claudstore::state::registration::{FormField, RegisterError};
use claudstore::util::image::PreviewTracker;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Sell(#[from] SellError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error("invalid date range: {0}")]
    Range(#[from] RangeError),
    #[error("--from and --to must be given together")]
    HalfRange,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("output failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "claudstore", about = "ClaudStore inventory and point-of-sale client")]
struct Cli {
    /// Service root, e.g. http://localhost:8000
    #[arg(long, env = "CLAUDSTORE_API_BASE")]
    api_base: Option<String>,

    /// Defaults to the interactive shell.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive shell with the products, register and reports sections.
    Shell,
    Products(ProductsCommand),
    Reports(ReportsCommand),
}

#[derive(Args, Debug)]
struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductsSubcommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all", help = "all, low or out")]
        stock: StockFilter,
    },
    /// Sell one unit.
    Sell { id: ProductId },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        cost: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: String,
        #[arg(long, help = "jpeg, jpg, png or webp file")]
        image: Option<PathBuf>,
    },
    /// Change the given fields of a product; the rest keep their values.
    Update {
        id: ProductId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cost: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Deactivate {
        id: ProductId,
        #[arg(long, default_value_t = false, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct ReportsCommand {
    #[command(subcommand)]
    command: ReportsSubcommand,
}

#[derive(Args, Debug)]
struct RangeArgs {
    #[arg(long, help = "YYYY-MM-DD; defaults to 30 days ago")]
    from: Option<String>,
    #[arg(long, help = "YYYY-MM-DD; defaults to today")]
    to: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ReportsSubcommand {
    Show {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value = "month", help = "day, week, month or year")]
        period: ReportPeriod,
    },
    /// Delete stored report data for the range.
    Reset {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value_t = false, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api_base) = &cli.api_base {
        config = config.with_api_base(api_base)?;
    }
    tracing::debug!(api_base = %config.api_base, "client configured");
    let api: Arc<dyn StoreApi> = Arc::new(HttpStoreApi::new(&config)?);

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let mut shell = Shell::new(api, config);
            shell.run(io::stdin().lock(), &mut io::stdout()).await?;
            Ok(())
        }
        Command::Products(products) => run_products(api, &config, products).await,
        Command::Reports(reports) => run_reports(api, reports).await,
    }
}

async fn run_products(api: Arc<dyn StoreApi>, config: &ClientConfig, products: ProductsCommand) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    match products.command {
        ProductsSubcommand::List { search, stock } => {
            let mut page = ProductsPage::new(api, config);
            page.load().await?;
            page.set_query(&search);
            page.set_stock_filter(stock);
            page.render(&mut stdout)?;
            Ok(())
        }
        ProductsSubcommand::Sell { id } => {
            let mut page = ProductsPage::new(api, config);
            page.load().await?;
            let receipt = page.sell(id).await?;
            writeln!(stdout, "{}", serde_json::to_string_pretty(&receipt)?)?;
            Ok(())
        }
        ProductsSubcommand::Create { name, cost, price, stock, image } => {
            let mut page = RegisterPage::new(api, config, PreviewTracker::new());
            fill_form(&mut page, Some(name), Some(cost), Some(price), Some(stock));
            if let Some(path) = image {
                page.attach_image(&path).await?;
            }
            page.submit().await?;
            print_banner(&page, &mut stdout)
        }
        ProductsSubcommand::Update { id, name, cost, price, stock, image } => {
            let mut page = RegisterPage::new(api, config, PreviewTracker::new());
            page.load().await?;
            page.edit(id)?;
            fill_form(&mut page, name, cost, price, stock);
            if let Some(path) = image {
                page.attach_image(&path).await?;
            }
            page.submit().await?;
            print_banner(&page, &mut stdout)
        }
        ProductsSubcommand::Deactivate { id, yes } => {
            let mut page = RegisterPage::new(api, config, PreviewTracker::new());
            page.load().await?;
            let mut confirm = confirmer(yes);
            if page.deactivate(id, confirm.as_mut()).await? {
                print_banner(&page, &mut stdout)
            } else {
                writeln!(stdout, "cancelled")?;
                Ok(())
            }
        }
    }
}

async fn run_reports(api: Arc<dyn StoreApi>, reports: ReportsCommand) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    let mut page = ReportsPage::new(api, OffsetDateTime::now_utc());
    match reports.command {
        ReportsSubcommand::Show { range, period } => {
            if let Some(range) = parse_range(&range)? {
                page.state.set_range(range);
            }
            page.state.set_period(period);
            page.refresh().await?;
            page.render(&mut stdout)?;
            Ok(())
        }
        ReportsSubcommand::Reset { range, yes } => {
            if let Some(range) = parse_range(&range)? {
                page.state.set_range(range);
            }
            let mut confirm = confirmer(yes);
            if page.reset(confirm.as_mut()).await? {
                writeln!(stdout, "reports reset for {}", page.state.range)?;
            } else {
                writeln!(stdout, "cancelled")?;
            }
            Ok(())
        }
    }
}

fn fill_form(
    page: &mut RegisterPage,
    name: Option<String>,
    cost: Option<String>,
    price: Option<String>,
    stock: Option<String>,
) {
    let fields = [
        (FormField::Name, name),
        (FormField::Cost, cost),
        (FormField::SalePrice, price),
        (FormField::Stock, stock),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            page.set_field(field, &value);
        }
    }
}

fn print_banner(page: &RegisterPage, out: &mut impl Write) -> Result<(), CliError> {
    if let Some(banner) = &page.state.banner {
        writeln!(out, "{}", render_notice(banner))?;
    }
    Ok(())
}

fn parse_range(args: &RangeArgs) -> Result<Option<DateRange>, CliError> {
    match (&args.from, &args.to) {
        (Some(from), Some(to)) => Ok(Some(DateRange::parse_dates(from, to)?)),
        (None, None) => Ok(None),
        _ => Err(CliError::HalfRange),
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(LineConfirm::new(io::stdin().lock()))
    }
}
