mod config;
mod render;

use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};

use wastetrack_core::RecordId;
use wastetrack_inventory::{
    ConditionAssessment, FileStorage, InventoryStore, MaterialComposition, MattressSize,
    MattressStatus,
};
use wastetrack_registration::{ConfirmedAsset, Registrar, RegistrationError, RegistrationForm, WalletIdentity};

use crate::config::AppConfig;

/// Register end-of-life mattresses and track them through disposal.
#[derive(Parser)]
#[command(name = "wastetrack", version, about = "Mattress waste-transfer tracking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the mattress size reference table
    Sizes,

    /// List registered mattresses, newest first
    List {
        /// Emit the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one record with its reference data and explorer link
    Show {
        /// Record id (MTR-<timestamp>)
        id: RecordId,
    },

    /// Record a mattress whose asset was minted by the operator's wallet tooling
    Register {
        /// Size category, e.g. "Single" or "Small double (Queen)"
        #[arg(long)]
        size: MattressSize,
        /// "Springs and Foam" or "Foam only"
        #[arg(long)]
        material: MaterialComposition,
        /// e.g. "Reusable good" or "Contaminated poor"
        #[arg(long)]
        condition: ConditionAssessment,
        /// Public key of the connected wallet
        #[arg(long)]
        wallet: Option<String>,
        /// Asset id returned by the confirmed mint
        #[arg(long)]
        asset_id: String,
        /// Mint transaction signature
        #[arg(long)]
        signature: Option<String>,
    },

    /// Move a record to a new lifecycle status
    Status {
        /// Record id (MTR-<timestamp>)
        id: RecordId,
        /// Target status, e.g. "stored" or "upcycled"
        status: MattressStatus,
    },

    /// Rewrite the stored collection in the current format
    Flush,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    wastetrack_observability::init_with(config.log_format);
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        transitions = config.transitions.as_str(),
        cluster = %config.cluster,
        mint_timeout = ?config.mint_timeout,
        "configuration loaded"
    );

    match cli.command {
        Commands::Sizes => print!("{}", render::size_table()),
        Commands::List { json } => {
            let store = open_store(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(store.records())?);
            } else {
                print!("{}", render::inventory(store.records()));
            }
        }
        Commands::Show { id } => {
            let store = open_store(&config)?;
            let record = store
                .get(&id)
                .with_context(|| format!("no mattress registered as {id}"))?;
            print!("{}", render::record_detail(record, config.cluster));
        }
        Commands::Register {
            size,
            material,
            condition,
            wallet,
            asset_id,
            signature,
        } => {
            let mut store = open_store(&config)?;
            let registrar = Registrar::new(ConfirmedAsset::new(asset_id, signature))
                .with_mint_timeout(config.mint_timeout)
                .with_cluster(config.cluster);
            let form = RegistrationForm::today()
                .with_size(size)
                .with_material(material)
                .with_condition(condition);
            let wallet = wallet.and_then(WalletIdentity::new);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .context("failed to start async runtime")?;

            match runtime.block_on(registrar.register(&mut store, wallet.as_ref(), &form)) {
                Ok(registration) => {
                    println!("registered {}", registration.record.id_typed());
                    println!("explorer: {}", registration.explorer_url);
                }
                Err(RegistrationError::NotPersisted { record, source, .. }) => {
                    eprintln!("unsaved record (keep this): {}", serde_json::to_string(&record)?);
                    return Err(source).context("record created but not saved");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Status { id, status } => {
            let mut store = open_store(&config)?;
            store
                .update_status(&id, status)
                .with_context(|| format!("failed to set {id} to {status}"))?;
            println!("{id} -> {status}");
        }
        Commands::Flush => {
            let mut store = open_store(&config)?;
            store.flush().context("failed to write inventory")?;
            println!("{} records written", store.len());
        }
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> anyhow::Result<InventoryStore<FileStorage>> {
    let storage = FileStorage::open(&config.data_dir)
        .with_context(|| format!("failed to open storage at {}", config.data_dir.display()))?;
    let store = InventoryStore::load(storage, config.transitions);
    if let Some(failure) = store.load_failure() {
        eprintln!("warning: {failure}; unreadable data was skipped");
    }
    if let Some(reason) = store.write_blocked() {
        eprintln!("warning: changes will not be saved: {reason}");
    }
    Ok(store)
}
