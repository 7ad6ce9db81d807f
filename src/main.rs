//! tenant-state - inspect and exercise the shared state container.
//!
//!   tenant-state domains                 # every domain and its accessor kind
//!   tenant-state inspect                 # durable slots and whether they parse
//!   tenant-state clear cart              # drop a persisted domain's slot
//!   tenant-state replay page-data.json   # seed a fresh container, print the state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use tenant_state::accessor::SeedOutcome;
use tenant_state::domain::{AccessorKind, Domain, DomainKey, DomainVisitor};
use tenant_state::durable::MemoryStorage;
use tenant_state::logging::init_tracing;
use tenant_state::{Domains, SeedPayload, StoreConfig};

/// Shared state container for the tenant storefront.
#[derive(Parser, Debug)]
#[command(name = "tenant-state")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every domain with its accessor kind.
    Domains,

    /// Show the durable slots of persisted domains.
    Inspect,

    /// Remove a persisted domain's durable slot.
    Clear {
        /// Domain name, e.g. `cart`.
        domain: String,
    },

    /// Apply a seed payload to a fresh client-phase container and print
    /// the resulting state as JSON.
    Replay {
        /// JSON file mapping domain names to initial values.
        payload: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing("warn");

    let config = match &cli.config {
        Some(path) => StoreConfig::load_from(path),
        None => StoreConfig::load(),
    }
    .context("loading configuration")?;

    match cli.command {
        Commands::Domains => cmd_domains(),
        Commands::Inspect => cmd_inspect(config)?,
        Commands::Clear { domain } => cmd_clear(config, &domain)?,
        Commands::Replay { payload } => cmd_replay(config, &payload)?,
    }

    Ok(())
}

fn cmd_domains() {
    for key in DomainKey::all() {
        println!("{:<14} {}", key.as_str(), key.kind().as_str());
    }
}

fn cmd_inspect(config: StoreConfig) -> anyhow::Result<()> {
    let domains = Domains::from_config(config).context("opening durable storage")?;

    for key in persisted_keys() {
        let status = key.visit(InspectSlot { domains: &domains });
        println!("{:<26} {}", domains.storage_key(key), status);
    }

    let known: Vec<String> = persisted_keys()
        .map(|key| domains.storage_key(key))
        .collect();
    for slot in domains.storage().keys()? {
        if !known.contains(&slot) {
            println!("{:<26} unknown slot", slot);
        }
    }

    Ok(())
}

fn cmd_clear(config: StoreConfig, name: &str) -> anyhow::Result<()> {
    let Some(key) = DomainKey::parse(name) else {
        bail!("unknown domain '{}'", name);
    };
    if key.kind() != AccessorKind::Persisted {
        bail!("domain '{}' is not persisted", name);
    }

    let domains = Domains::from_config(config).context("opening durable storage")?;
    key.visit(ResetDomain { domains: &domains });
    println!("cleared {}", domains.storage_key(key));
    Ok(())
}

fn cmd_replay(config: StoreConfig, path: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading payload '{}'", path.display()))?;
    let payload = SeedPayload::from_json(&json)
        .with_context(|| format!("parsing payload '{}'", path.display()))?;

    // Replays never touch real durable storage.
    let domains = Domains::new(config, Arc::new(MemoryStorage::new()));
    domains.enter_client_phase();
    let report = payload.apply(&domains);

    for (key, outcome) in &report.outcomes {
        eprintln!("{:<14} {}", key.as_str(), outcome.as_str());
    }
    for name in &report.ignored {
        eprintln!("{:<14} ignored", name);
    }

    let state = domains.snapshot();
    println!("{}", serde_json::to_string_pretty(state.as_ref())?);

    if report.outcomes.iter().any(|(_, o)| *o == SeedOutcome::Rejected) {
        bail!("payload contained malformed values");
    }
    Ok(())
}

fn persisted_keys() -> impl Iterator<Item = DomainKey> {
    DomainKey::all()
        .iter()
        .copied()
        .filter(|key| key.kind() == AccessorKind::Persisted)
}

struct InspectSlot<'a> {
    domains: &'a Domains,
}

impl DomainVisitor for InspectSlot<'_> {
    type Output = String;

    fn visit<D: Domain>(self) -> String {
        match self.domains.accessor::<D>().load_persisted() {
            Ok(Some(value)) => match serde_json::to_value(&value) {
                Ok(serde_json::Value::Array(items)) => format!("ok ({} items)", items.len()),
                Ok(_) => "ok".to_string(),
                Err(e) => format!("unserializable: {}", e),
            },
            Ok(None) => "empty".to_string(),
            Err(e) => format!("unreadable: {}", e),
        }
    }
}

struct ResetDomain<'a> {
    domains: &'a Domains,
}

impl DomainVisitor for ResetDomain<'_> {
    type Output = ();

    fn visit<D: Domain>(self) {
        self.domains.accessor::<D>().reset();
    }
}
