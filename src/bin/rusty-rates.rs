//! rusty-rates CLI - fetch, cache and inspect NBP exchange rates
//!
//! ## Example Usage
//!
//! ```bash
//! # Refresh every pair and cache the full table
//! rusty-rates all
//!
//! # Refresh and cache a selection, with a summary per pair
//! rusty-rates select EUR/USD USD/PLN --stats
//!
//! # Print the cached selection without fetching
//! rusty-rates show --selected
//!
//! # List selectable pairs
//! rusty-rates pairs
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rusty_rates::prelude::*;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

type CliResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// rusty-rates: daily NBP exchange rates with derived cross-rates
#[derive(Parser)]
#[command(name = "rusty-rates")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch, cache and inspect daily exchange rates", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh all pairs and cache the full table
    All {
        /// Print summary statistics per pair
        #[arg(short = 's', long)]
        stats: bool,
    },

    /// Refresh all pairs and cache only the selected ones
    Select {
        /// Pairs to keep, e.g. EUR/USD CHF/PLN
        #[arg(value_name = "PAIR", required = true, num_args = 1..)]
        pairs: Vec<String>,

        /// Print summary statistics per pair
        #[arg(short = 's', long)]
        stats: bool,
    },

    /// Print a cached table without fetching
    Show {
        /// Show the cached selection instead of the full table
        #[arg(long)]
        selected: bool,

        /// Print summary statistics per pair
        #[arg(short = 's', long)]
        stats: bool,
    },

    /// List the pairs a refresh produces
    Pairs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match RatesConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    if cli.verbose {
        println!(
            "{} v{}",
            "rusty-rates".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Data dir: {}",
            config.store.data_dir.display().to_string().dimmed()
        );
    }

    let result = match cli.command {
        Commands::All { stats } => refresh_all(config, stats).await,
        Commands::Select { pairs, stats } => refresh_selected(config, pairs, stats).await,
        Commands::Show { selected, stats } => show_cached(config, selected, stats),
        Commands::Pairs => list_pairs(&config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn pipeline(config: RatesConfig) -> Result<ExchangeRates<NbpRateClient>> {
    let client = NbpRateClient::new(&config.source)?;
    ExchangeRates::new(client, config)
}

fn spinner(message: &str) -> std::result::Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

async fn refresh_all(config: RatesConfig, stats: bool) -> CliResult {
    let rates = pipeline(config)?;

    let pb = spinner("Fetching exchange rates...")?;
    let table = rates.get_all().await;
    pb.finish_and_clear();
    let table = table?;

    print_table(&table);
    if stats {
        print_stats(&table);
    }

    let path = rates.store().path_for(&rates.config().store.all_file_name);
    println!(
        "{} Data has been saved to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

async fn refresh_selected(config: RatesConfig, pairs: Vec<String>, stats: bool) -> CliResult {
    // Reject malformed pair names up front; well-formed unknown ones are dropped later
    let pairs = pairs
        .iter()
        .map(|p| p.parse::<CurrencyPair>().map(|pair| pair.column_name()))
        .collect::<Result<Vec<_>>>()?;

    let rates = pipeline(config)?;
    let available = rates.available_pairs();
    for pair in pairs.iter().filter(|p| !available.contains(p)) {
        eprintln!(
            "{} {} is not produced by this configuration (available: {})",
            "Warning:".yellow(),
            pair,
            available.join(", ")
        );
    }

    let pb = spinner("Fetching exchange rates...")?;
    let table = rates.get_selected(&pairs).await;
    pb.finish_and_clear();
    let table = table?;

    print_table(&table);
    if stats {
        print_stats(&table);
    }

    let path = rates
        .store()
        .path_for(&rates.config().store.selected_file_name);
    println!(
        "{} Data for {} has been saved to {}",
        "✓".green().bold(),
        table.column_names().join(", "),
        path.display()
    );
    Ok(())
}

fn show_cached(config: RatesConfig, selected: bool, stats: bool) -> CliResult {
    let rates = pipeline(config)?;
    let table = if selected {
        rates.cached_selected()?
    } else {
        rates.cached_all()?
    };

    print_table(&table);
    if stats {
        print_stats(&table);
    }
    Ok(())
}

fn list_pairs(config: &RatesConfig) -> CliResult {
    let fetched = config.fetched_pairs();
    println!("{}", "Available pairs".bold());
    println!("{}", "===============".dimmed());
    for pair in config.available_pairs() {
        let origin = if fetched.contains(&pair) {
            "fetched".dimmed()
        } else {
            "derived".cyan()
        };
        println!("  {:<10} {}", pair, origin);
    }
    Ok(())
}

fn print_table(table: &RateTable) {
    if table.is_empty() {
        println!("{}", "No data".yellow());
        return;
    }

    let mut header = format!("{:<12}", "Date");
    for name in table.column_names() {
        header.push_str(&format!("{:>12}", name));
    }
    println!("{}", header.bold());

    for (row, date) in table.dates().iter().enumerate() {
        let mut line = format!("{:<12}", date.format("%Y-%m-%d"));
        for column in table.columns() {
            match column.values[row] {
                Some(v) => line.push_str(&format!("{:>12.4}", v)),
                None => line.push_str(&format!("{:>12}", "-")),
            }
        }
        println!("{}", line);
    }
    println!();
}

fn print_stats(table: &RateTable) {
    println!("{}", "Summary".bold());
    println!("{}", "=======".dimmed());
    for stats in table.describe() {
        println!(
            "  {:<10} {} {:.4}  {} {:.4}  {} {:.4} ({})  {} {:.4} ({})",
            stats.column.bold(),
            "mean:".dimmed(),
            stats.mean,
            "median:".dimmed(),
            stats.median,
            "min:".red(),
            stats.min.1,
            stats.min.0,
            "max:".green(),
            stats.max.1,
            stats.max.0,
        );
    }
    println!();
}
