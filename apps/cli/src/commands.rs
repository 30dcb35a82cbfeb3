//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use schoolscout_core::{
    ProgressReporter, draft_outreach, generate_brief, generate_followups, run_discovery,
    run_enrichment,
};
use schoolscout_crawler::PageFetcher;
use schoolscout_discovery::Provider;
use schoolscout_drafts::{DraftService, ManualDelivery};
use schoolscout_shared::{
    AppConfig, LeadId, expand_home, init_config, load_config,
};
use schoolscout_storage::LeadStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// schoolscout — private-school outreach lead pipeline.
#[derive(Parser)]
#[command(
    name = "schoolscout",
    version,
    about = "Discover, enrich, and draft outreach for private K-12 schools.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Discover schools in a locality and upsert them as leads.
    Discover {
        /// Locality to search (defaults to config).
        #[arg(long)]
        locality: Option<String>,

        /// Maximum results to accept.
        #[arg(long)]
        max: Option<u32>,

        /// Search provider: serpapi or brave.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Crawl each lead's website, resolve contacts, and score contactability.
    Enrich {
        /// Generate deterministic fallback hooks with no model calls.
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate initial outreach drafts for the highest-scoring leads.
    Draft {
        /// Maximum number of leads to draft for.
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Generate deterministic fallback drafts with no model calls.
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate follow-up drafts for every lead.
    Followup {
        /// Days since initial outreach.
        #[arg(long, default_value_t = 5)]
        days: u32,

        /// Generate deterministic fallback drafts with no model calls.
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate a call brief for one lead.
    Brief {
        /// Lead identifier.
        #[arg(long)]
        lead_id: String,

        /// Generate a deterministic fallback brief with no model calls.
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored leads with their contactability assessment.
    List,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "schoolscout=info",
        1 => "schoolscout=debug",
        _ => "schoolscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Discover {
            locality,
            max,
            provider,
        } => cmd_discover(locality.as_deref(), max, provider.as_deref()).await,
        Command::Enrich { dry_run } => cmd_enrich(dry_run).await,
        Command::Draft { limit, dry_run } => cmd_draft(limit, dry_run).await,
        Command::Followup { days, dry_run } => cmd_followup(days, dry_run).await,
        Command::Brief { lead_id, dry_run } => cmd_brief(&lead_id, dry_run).await,
        Command::List => cmd_list().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Open the lead store at the configured path.
async fn open_store(config: &AppConfig) -> Result<LeadStore> {
    let db_path = expand_home(&config.defaults.db_path);
    Ok(LeadStore::open(&db_path).await?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_discover(
    locality: Option<&str>,
    max: Option<u32>,
    provider_name: Option<&str>,
) -> Result<()> {
    let config = load_config()?;
    let locality = locality.unwrap_or(&config.defaults.locality);
    let max = max.unwrap_or(config.defaults.max_results) as usize;
    let provider_name = provider_name.unwrap_or(&config.defaults.provider);

    // Validate credentials before doing anything else.
    let provider = Provider::from_config(provider_name, &config)?;
    let store = open_store(&config).await?;

    info!(locality, max, provider = provider.name(), "starting discovery");

    let stats = run_discovery(&store, &provider, locality, max).await?;

    println!();
    println!("  Discovered {} results; {} new leads saved.", stats.found, stats.new);
    println!();

    Ok(())
}

async fn cmd_enrich(dry_run: bool) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config).await?;
    let fetcher = PageFetcher::new(&config.crawl)?;
    let drafts = DraftService::new(&config.llm, dry_run)?;

    info!(dry_run, "starting enrichment pass");

    let reporter = CliProgress::new();
    let count = run_enrichment(&store, &fetcher, &drafts, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Enriched {count} leads.");
    println!();

    Ok(())
}

async fn cmd_draft(limit: usize, dry_run: bool) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config).await?;
    let drafts = DraftService::new(&config.llm, dry_run)?;
    let drafts_dir = PathBuf::from(&config.defaults.drafts_dir);

    let count = draft_outreach(&store, &drafts, &ManualDelivery, &drafts_dir, limit).await?;

    println!();
    println!("  Created {count} outreach drafts in {}", drafts_dir.display());
    println!("  Next steps: review the markdown drafts, personalize as needed, and send manually.");
    println!();

    Ok(())
}

async fn cmd_followup(days: u32, dry_run: bool) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config).await?;
    let drafts = DraftService::new(&config.llm, dry_run)?;
    let drafts_dir = PathBuf::from(&config.defaults.drafts_dir);

    let count = generate_followups(&store, &drafts, &ManualDelivery, &drafts_dir, days).await?;

    println!();
    println!("  Created {count} follow-up drafts in {}", drafts_dir.display());
    println!("  Next steps: review the follow-up drafts and send manually.");
    println!();

    Ok(())
}

async fn cmd_brief(lead_id: &str, dry_run: bool) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config).await?;
    let drafts = DraftService::new(&config.llm, dry_run)?;
    let briefs_dir = PathBuf::from(&config.defaults.briefs_dir);

    let lead_id: LeadId = lead_id
        .parse()
        .map_err(|e| eyre!("invalid lead id '{lead_id}': {e}"))?;

    let path = generate_brief(&store, &drafts, &ManualDelivery, &briefs_dir, &lead_id).await?;

    println!();
    println!("  Created call brief: {}", path.display());
    println!();

    Ok(())
}

async fn cmd_list() -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config).await?;
    let leads = store.list_leads().await?;

    if leads.is_empty() {
        println!("No leads yet. Run `schoolscout discover` first.");
        return Ok(());
    }

    println!();
    println!(
        "  {:<36}  {:<30} {:>5}  {:<8} {:<16} {}",
        "ID", "NAME", "SCORE", "TIER", "METHOD", "CONTACT"
    );
    for lead in &leads {
        println!(
            "  {:<36}  {:<30} {:>5}  {:<8} {:<16} {}",
            lead.lead_id,
            truncate(&lead.name, 30),
            lead.contact_score,
            lead.contact_tier,
            lead.contact_method,
            lead.primary_contact.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("  {} leads total.", leads.len());
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn lead_started(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriching [{current}/{total}] {name}"));
    }
}
