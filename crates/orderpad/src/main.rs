//! `opad` - CLI and form screen for orderpad
//!
//! This binary records customer orders, persists them on-device, and works
//! the list either from a form screen or from scriptable subcommands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use orderpad::cli::{
    AddCommand, Cli, Command, ConfigCommand, ListCommand, MoveCommand, OutputFormat, RemoveCommand,
};
use orderpad::{init_logging, Config, OrderBook, OrderRecord, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        None | Some(Command::Ui) => run_ui(&config).await,
        Some(Command::Add(cmd)) => handle_add(&config, &cmd).await,
        Some(Command::List(cmd)) => handle_list(&config, &cmd).await,
        Some(Command::Remove(cmd)) => handle_remove(&config, &cmd).await,
        Some(Command::MoveUp(cmd)) => handle_move(&config, &cmd, MoveDirection::Up).await,
        Some(Command::MoveDown(cmd)) => handle_move(&config, &cmd, MoveDirection::Down).await,
        Some(Command::Status(cmd)) => handle_status(&config, cmd.json).await,
        Some(Command::Config(cmd)) => handle_config(&config, cmd),
    }
}

/// Which way a `move-up`/`move-down` invocation shifts an order.
#[derive(Debug, Clone, Copy)]
enum MoveDirection {
    Up,
    Down,
}

/// Open the configured store and load the persisted order list.
async fn open_book(config: &Config) -> anyhow::Result<OrderBook> {
    let path = config.database_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("opening database at {}", path.display()))?;

    let mut book = OrderBook::new(Box::new(store));
    book.hydrate().await;
    Ok(book)
}

async fn run_ui(config: &Config) -> anyhow::Result<()> {
    let book = open_book(config).await?;
    orderpad::ui::run(config, book)
        .await
        .context("form screen failed")
}

async fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let record = OrderRecord::new(cmd.name.clone(), cmd.address.clone(), cmd.order.clone())?;

    let mut book = open_book(config).await?;
    book.add(record).await?;

    println!("Added order at position {}.", book.len());
    Ok(())
}

async fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let book = open_book(config).await?;

    match cmd.format {
        OutputFormat::Plain => {
            if book.is_empty() {
                println!("No orders saved.");
            }
            for (i, record) in book.records().iter().enumerate() {
                println!(
                    "{}. {} - {} - {}",
                    i + 1,
                    record.customer_name,
                    record.customer_address,
                    record.order_details
                );
            }
        }
        OutputFormat::Table => print_table(&book),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(book.records())?);
        }
    }
    Ok(())
}

fn print_table(book: &OrderBook) {
    if book.is_empty() {
        println!("No orders saved.");
        return;
    }

    let name_width = book
        .records()
        .iter()
        .map(|r| r.customer_name.len())
        .chain(std::iter::once("Customer".len()))
        .max()
        .unwrap_or(0);
    let address_width = book
        .records()
        .iter()
        .map(|r| r.customer_address.len())
        .chain(std::iter::once("Address".len()))
        .max()
        .unwrap_or(0);

    println!("{:>3}  {:name_width$}  {:address_width$}  Order", "#", "Customer", "Address");
    for (i, record) in book.records().iter().enumerate() {
        println!(
            "{:>3}  {:name_width$}  {:address_width$}  {}",
            i + 1,
            record.customer_name,
            record.customer_address,
            record.order_details
        );
    }
}

async fn handle_remove(config: &Config, cmd: &RemoveCommand) -> anyhow::Result<()> {
    let mut book = open_book(config).await?;

    let removed = match cmd.position.checked_sub(1) {
        Some(index) => book.remove(index).await?,
        None => false,
    };

    if !removed {
        anyhow::bail!("no order at position {}", cmd.position);
    }
    println!("Removed order {}.", cmd.position);
    Ok(())
}

async fn handle_move(
    config: &Config,
    cmd: &MoveCommand,
    direction: MoveDirection,
) -> anyhow::Result<()> {
    let mut book = open_book(config).await?;

    let Some(index) = cmd.position.checked_sub(1) else {
        anyhow::bail!("no order at position {}", cmd.position);
    };
    if index >= book.len() {
        anyhow::bail!("no order at position {}", cmd.position);
    }

    let moved = match direction {
        MoveDirection::Up => book.move_up(index).await?,
        MoveDirection::Down => book.move_down(index).await?,
    };

    match (moved, direction) {
        (true, MoveDirection::Up) => println!("Moved order up to position {}.", cmd.position - 1),
        (true, MoveDirection::Down) => {
            println!("Moved order down to position {}.", cmd.position + 1);
        }
        (false, MoveDirection::Up) => println!("Order {} is already first.", cmd.position),
        (false, MoveDirection::Down) => println!("Order {} is already last.", cmd.position),
    }
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let path = config.database_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("opening database at {}", path.display()))?;
    let stats = store.stats()?;

    let mut book = OrderBook::new(Box::new(store));
    book.hydrate().await;

    if json {
        let status = serde_json::json!({
            "database_path": path,
            "orders": book.len(),
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("opad status");
        println!("-----------");
        println!("Database:  {}", path.display());
        println!("Orders:    {}", book.len());
        println!("Size:      {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Ui]");
                println!("  Tick rate (ms): {}", config.ui.tick_rate_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
