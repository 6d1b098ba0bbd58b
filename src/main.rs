use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use etf_allocator::{Allocator, Category, EngineConfig, RiskProfile, SelectionCriteria};

#[derive(Parser, Debug)]
#[command(name = "etf-allocator", version, about = "Score ETFs and build risk-profile portfolios")]
struct Cli {
    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Catalog snapshot path or http(s) URL. Overrides config and environment.
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the portfolio for CONSERVADOR, MODERADO or ARROJADO.
    Allocate { profile: String },

    /// Rank catalog candidates matching the given bounds.
    Rank {
        #[arg(long = "category")]
        categories: Vec<Category>,
        #[arg(long)]
        min_return: Option<f64>,
        #[arg(long)]
        max_volatility: Option<f64>,
        #[arg(long)]
        min_sharpe: Option<f64>,
        #[arg(long)]
        min_aum: Option<f64>,
        #[arg(long)]
        min_dividend_yield: Option<f64>,
        #[arg(long)]
        max_expense_ratio: Option<f64>,
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = EngineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(catalog) = cli.catalog {
        config.catalog = Some(catalog);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let allocator = config.build_allocator().context("building catalog")?;

    let output = match cli.command {
        Command::Allocate { profile } => {
            let Some(parsed) = RiskProfile::parse(&profile) else {
                bail!("unknown risk profile '{}' (expected CONSERVADOR, MODERADO or ARROJADO)", profile);
            };
            let allocations = allocator.allocate_profile(parsed).await;
            let summary = Allocator::summarize(&allocations);
            json!({
                "profile": parsed,
                "allocations": allocations,
                "summary": summary,
            })
        }
        Command::Rank {
            categories,
            min_return,
            max_volatility,
            min_sharpe,
            min_aum,
            min_dividend_yield,
            max_expense_ratio,
            exclude,
            limit,
        } => {
            let mut criteria = SelectionCriteria {
                min_return,
                max_volatility,
                min_sharpe,
                min_aum,
                min_dividend_yield,
                max_expense_ratio,
                ..SelectionCriteria::default()
            };
            for c in categories {
                criteria = criteria.category(c);
            }
            for s in &exclude {
                criteria = criteria.exclude(s);
            }

            let mut ranked = allocator.rank(&criteria).await;
            if let Some(n) = limit {
                ranked.truncate(n);
            }
            json!(ranked)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
