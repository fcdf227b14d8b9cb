//! Rates ingestion job runner
//!
//! `run` executes one cycle and exits, `schedule` keeps a daily cron job
//! alive until Ctrl-C, `report` prints the flattened loan rates sorted by loan type.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rates_core::config::Config;
use rates_core::domains::rates::{
    flatten_documents, run_cycle, PersonType, ProductFamily, RateFilter, RateRow,
};
use rates_core::kernel::{start_scheduler, BaseRateStore, JobDeps};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rates-jobs")]
#[command(about = "Open Finance loans/financings rates ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one fetch → classify → write cycle
    Run,

    /// Run the cycle on the configured cron schedule until interrupted
    Schedule,

    /// Print flattened loan rates from the store
    Report {
        #[arg(long, value_enum)]
        person_type: Option<PersonTypeArg>,
        /// Only rows for this brand (repeatable)
        #[arg(long = "brand")]
        brands: Vec<String>,
        /// Only rows of this loan type, e.g. "Cheque Especial" (repeatable)
        #[arg(long = "loan-type")]
        loan_types: Vec<String>,
        /// Emit JSON instead of a tab-separated table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PersonTypeArg {
    Natural,
    Business,
}

impl From<PersonTypeArg> for PersonType {
    fn from(arg: PersonTypeArg) -> Self {
        match arg {
            PersonTypeArg::Natural => PersonType::Natural,
            PersonTypeArg::Business => PersonType::Business,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        environment = %config.environment,
        database = %config.database_name,
        "Configuration loaded"
    );

    let deps = JobDeps::from_config(&config).await?;

    match cli.command {
        Commands::Run => {
            let report = run_cycle(&deps).await;
            // Cycle failures are logged and swallowed; the exit code stays 0.
            tracing::debug!(
                outcome = ?report.outcome,
                participants = report.participants,
                "Cycle finished"
            );
        }
        Commands::Schedule => {
            let mut scheduler = start_scheduler(deps, &config.cron).await?;
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutting down scheduler");
            scheduler.shutdown().await?;
        }
        Commands::Report {
            person_type,
            brands,
            loan_types,
            json,
        } => {
            let collection = config.collection_for(ProductFamily::Loans);
            let documents = deps
                .store
                .find_all(&collection)
                .await
                .with_context(|| format!("Failed to read {}", collection))?;

            if documents.is_empty() {
                tracing::warn!(collection = %collection, "No documents found in loans collection");
            }

            let filter = RateFilter {
                person_type: person_type.map(PersonType::from),
                brands,
                loan_types,
            };
            let rows = filter.apply(flatten_documents(&documents));

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_table(&rows);
            }
        }
    }

    Ok(())
}

const HEADERS: [&str; 9] = [
    "Organização",
    "Marca",
    "Tipo",
    "Taxa Mínima",
    "Taxa Máxima",
    "Indexador Referencial",
    "Garantias Requeridas",
    "Tipo Pessoa",
    "Termos e Condições",
];

fn print_table(rows: &[RateRow]) {
    println!("{}", HEADERS.join("\t"));
    for row in rows {
        let person_type = row.person_type.to_string();
        let cells = [
            row.organisation.as_deref().unwrap_or("-"),
            row.brand.as_deref().unwrap_or("-"),
            row.loan_type.as_str(),
            row.minimum_rate.as_str(),
            row.maximum_rate.as_str(),
            row.referential_indexer.as_str(),
            row.required_warranties.as_str(),
            person_type.as_str(),
            row.terms_conditions.as_deref().unwrap_or("-"),
        ];
        println!("{}", cells.join("\t"));
    }
}
