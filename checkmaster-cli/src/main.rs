use anyhow::{anyhow, Context, Result};
use checkmaster_core::store::review::{approve, reject, reset};
use checkmaster_core::store::selectors::{
    find_product, pending_products, review_counts, reviewed_products,
};
use checkmaster_core::store::StoreOptions;
use checkmaster_core::{
    get_version, Action, Config, FetchReport, HttpProductSource, Paginator, Product, ProductId,
    ProductStore, SnapshotStore, SqliteSlot,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Checkmaster: review queue for incoming product listings
#[derive(Parser, Debug)]
#[command(name = "checkmaster")]
#[command(about = "Review queue for incoming product listings", long_about = None)]
struct Cli {
    /// Upstream collection URL (overrides CHECKMASTER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the snapshot database (overrides CHECKMASTER_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive review session
    Review(ReviewArgs),
    /// Print the cached product snapshot
    Snapshot,
    /// Reset the cached product snapshot to empty
    ClearSnapshot,
}

#[derive(Parser, Debug)]
struct ReviewArgs {
    /// Start from the cached snapshot instead of fetching the first page
    #[arg(long)]
    resume: bool,
}

const HELP: &str = "\
Commands:
  list            show every product in the queue
  reviewed        show approved and rejected products
  more            load the next page
  show <id>       show one product in full
  approve <id>    approve a product
  reject <id>     reject a product
  reset <id>      send a product back to pending
  delete <id>     remove a product from the queue
  help            show this message
  quit            leave the session";

enum Command {
    List,
    Reviewed,
    More,
    Show(ProductId),
    Approve(ProductId),
    Reject(ProductId),
    Reset(ProductId),
    Delete(ProductId),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let mut id = || -> Result<ProductId> {
        let raw = words
            .next()
            .ok_or_else(|| anyhow!("`{}` needs a product id", verb))?;
        let id = raw
            .parse::<u64>()
            .with_context(|| format!("`{}` is not a product id", raw))?;
        Ok(ProductId(id))
    };

    let command = match verb.to_lowercase().as_str() {
        "list" | "ls" => Command::List,
        "reviewed" => Command::Reviewed,
        "more" => Command::More,
        "show" => Command::Show(id()?),
        "approve" => Command::Approve(id()?),
        "reject" => Command::Reject(id()?),
        "reset" => Command::Reset(id()?),
        "delete" | "rm" => Command::Delete(id()?),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(anyhow!("unknown command `{}` (try `help`)", other)),
    };
    Ok(Some(command))
}

fn print_row(product: &Product) {
    println!(
        "  #{:<4} [{:<9}] {}",
        product.id.0,
        product.status.label(),
        product.title
    );
}

fn print_products<'a>(heading: &str, products: impl IntoIterator<Item = &'a Product>) {
    println!("{}", heading);
    let mut empty = true;
    for product in products {
        print_row(product);
        empty = false;
    }
    if empty {
        println!("  (nothing here)");
    }
}

fn print_report(report: &FetchReport) {
    match &report.outcome {
        Ok(0) => println!("No more products at offset {}.", report.request.offset),
        Ok(count) => println!("Loaded {} products.", count),
        Err(e) => println!(
            "Could not load products at offset {}: {}. Type `more` to try the next page.",
            report.request.offset, e
        ),
    }
}

fn lookup(store: &ProductStore, id: ProductId) -> Result<Product> {
    find_product(store.state(), id)
        .cloned()
        .ok_or_else(|| anyhow!("no product #{} in the queue", id))
}

/// Apply one session command. Returns false when the session should end.
fn apply(store: &mut ProductStore, paginator: &mut Paginator, command: Command) -> Result<bool> {
    match command {
        Command::List => {
            let state = store.state();
            let counts = review_counts(state);
            print_products(
                &format!(
                    "{} products ({} pending, {} approved, {} rejected){}",
                    counts.total(),
                    counts.pending,
                    counts.approved,
                    counts.rejected,
                    if state.is_busy() { ", loading..." } else { "" }
                ),
                pending_products(state),
            );
        }
        Command::Reviewed => {
            print_products("Reviewed products:", reviewed_products(store.state()));
        }
        Command::More => {
            if store.state().loading_more {
                println!("Already loading, the next page will be requested as well.");
            }
            store.dispatch(paginator.advance());
        }
        Command::Show(id) => {
            let product = lookup(store, id)?;
            println!("#{} {}", product.id, product.title);
            println!("status:  {}", product.status);
            println!("fetched: {}", product.created_at.to_rfc3339());
            println!();
            println!("{}", product.description);
        }
        Command::Approve(id) => {
            let product = lookup(store, id)?;
            store.dispatch(approve(&product, true));
            println!("Approved #{}.", id);
        }
        Command::Reject(id) => {
            let product = lookup(store, id)?;
            store.dispatch(reject(&product, true));
            println!("Rejected #{}.", id);
        }
        Command::Reset(id) => {
            let product = lookup(store, id)?;
            store.dispatch(reset(&product));
            println!("#{} is pending again.", id);
        }
        Command::Delete(id) => {
            lookup(store, id)?;
            store.dispatch(Action::DeleteRequested { id });
            println!("Deleted #{}.", id);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

enum SessionEvent {
    Line(Option<String>),
    Fetched(FetchReport),
}

fn open_snapshot(config: &Config) -> Result<SnapshotStore> {
    let path = config.snapshot_path();
    let slot = SqliteSlot::open(&path)
        .with_context(|| format!("Failed to open snapshot at {}", path.display()))?
        .with_quota(config.snapshot_quota_bytes);
    SnapshotStore::new(Box::new(slot)).context("Failed to initialize snapshot")
}

async fn run_review(config: Config, args: ReviewArgs) -> Result<()> {
    let source = HttpProductSource::new(&config.api_url, config.http_timeout)
        .context("Failed to create product source")?;
    let snapshot = open_snapshot(&config)?;

    let mut store = ProductStore::new(Arc::new(source))
        .with_snapshot(snapshot)
        .with_options(StoreOptions::from(&config));
    let mut paginator = Paginator::from_config(&config);

    let restored = if args.resume {
        store.restore_from_snapshot()
    } else {
        0
    };
    if restored > 0 {
        paginator.resume_after(restored);
        println!("Resumed {} products from the snapshot.", restored);
    } else {
        store.dispatch(paginator.initial_request());
        println!("Loading products...");
    }
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let event = tokio::select! {
            line = lines.next_line() => SessionEvent::Line(line.context("Failed to read stdin")?),
            Some(report) = store.next_completion(), if store.in_flight() > 0 => {
                SessionEvent::Fetched(report)
            }
        };

        match event {
            SessionEvent::Fetched(report) => print_report(&report),
            SessionEvent::Line(None) => break,
            SessionEvent::Line(Some(line)) => match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(command)) => match apply(&mut store, &mut paginator, command) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("{}", e),
                },
                Err(e) => println!("{}", e),
            },
        }
    }

    let pending = store.in_flight();
    if pending > 0 {
        info!("Waiting for {} fetches before exiting", pending);
        for report in store.settle().await {
            print_report(&report);
        }
    }
    Ok(())
}

fn run_snapshot(config: Config) -> Result<()> {
    let snapshot = open_snapshot(&config)?;
    let products = snapshot.list_or_reset();
    print_products(
        &format!("{} cached products:", products.len()),
        products.iter(),
    );
    Ok(())
}

fn run_clear_snapshot(config: Config) -> Result<()> {
    let snapshot = open_snapshot(&config)?;
    snapshot.clear().context("Failed to clear snapshot")?;
    println!("Snapshot cleared.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }

    info!("checkmaster {} using {}", get_version(), config.api_url);

    match cli.command {
        Commands::Review(args) => run_review(config, args).await,
        Commands::Snapshot => run_snapshot(config),
        Commands::ClearSnapshot => run_clear_snapshot(config),
    }
}
