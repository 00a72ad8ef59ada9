//! Command-line surface for the clean-room kit.
//!
//! Four subcommands cover the demo lifecycle: `seed` fabricates the retail
//! source, `generate` derives both parties' datasets from it, `publish`
//! provisions one privacy-protected listing, and `verify` cross-checks the
//! hidden linkage. The simulated platform persists between invocations in
//! a JSON state file.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use cleanroom_kit_datagen::api::model::{GenerateConfig, SeedConfig, VerifyConfig};
use cleanroom_kit_datagen::api::{generate, seed, verify};
use cleanroom_kit_platform::ids::{DatasetId, Location, Principal, ProjectId, ShareScope};
use cleanroom_kit_platform::memory::InMemoryPlatform;
use cleanroom_kit_platform::sharing::SharingEnvironment;
use cleanroom_kit_provisioning::{
    PublishError, PublishRequest, ShareTarget, SharingService, TableProfile, TableRole,
};

#[derive(Parser)]
#[command(name = "cleanroom-kit")]
#[command(about = "Two-party data clean room simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Path of the simulated platform's JSON state file.
    #[arg(
        long,
        env = "CLEANROOM_STATE",
        default_value = "cleanroom-state.json",
        global = true
    )]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fabricate the simulated retail source tables.
    Seed(SeedArgs),
    /// Derive both parties' datasets from the source for one business date.
    Generate(GenerateArgs),
    /// Publish one listing into a data exchange.
    Publish(PublishArgs),
    /// Cross-check the hidden linkage between the generated datasets.
    Verify(VerifyArgs),
}

#[derive(Args)]
struct SeedArgs {
    /// Project that hosts the retail source.
    #[arg(long, default_value = "acme-retail")]
    project: String,

    /// Dataset the source tables are written into.
    #[arg(long, default_value = "retail_source")]
    dataset: String,

    /// Registered users to fabricate.
    #[arg(long, default_value_t = 200)]
    users: u32,

    /// Orders to fabricate.
    #[arg(long, default_value_t = 600)]
    orders: u32,

    /// Date the order history clusters around.
    #[arg(long, default_value = "2025-09-23")]
    anchor_date: NaiveDate,
}

#[derive(Args)]
struct GenerateArgs {
    /// Project of the retail source and the merchant's published dataset.
    #[arg(long, default_value = "acme-retail")]
    merchant_project: String,

    /// Project of the wallet provider's published dataset.
    #[arg(long, default_value = "nimbus-wallet")]
    wallet_project: String,

    #[arg(long, default_value = "retail_source")]
    source_dataset: String,

    #[arg(long, default_value = "merchant_provider")]
    merchant_dataset: String,

    #[arg(long, default_value = "wallet_provider")]
    wallet_dataset: String,

    /// Snapshot date; only orders created on this date are kept.
    #[arg(long, default_value = "2025-09-23")]
    as_of: NaiveDate,

    /// Secret salt both parties agreed on for the hashed join key.
    #[arg(long, env = "CLEANROOM_SALT", default_value = "demo-shared-salt-2025")]
    salt: String,

    /// Percentage of the merchant's orders the wallet provider has seen.
    #[arg(long, default_value_t = 50)]
    market_share: u8,
}

#[derive(Args)]
struct PublishArgs {
    /// Project the exchange and listing are provisioned in.
    #[arg(long, default_value = "acme-retail")]
    project: String,

    /// Catalog location of the exchange.
    #[arg(long, default_value = "US")]
    location: String,

    /// Exchange id within the project and location.
    #[arg(long, default_value = "commerce_clean_room")]
    exchange: String,

    /// Listing id within the exchange.
    #[arg(long)]
    listing: String,

    /// Dataset being shared, or hosting the shared table.
    #[arg(long)]
    dataset: String,

    /// Table to share; omit to share the whole dataset (open mode only).
    #[arg(long, requires = "role", requires = "rule_column")]
    table: Option<String>,

    /// Declared role of the shared table; decides its analysis rule.
    #[arg(long, value_enum, requires = "table")]
    role: Option<RoleArg>,

    /// Column the table's analysis rule applies to.
    #[arg(long, requires = "table")]
    rule_column: Option<String>,

    /// Sharing mode of the exchange.
    #[arg(long, value_enum, default_value = "clean-room")]
    mode: ModeArg,

    /// Subscriber identity granted access to the listing.
    #[arg(long)]
    subscriber: String,

    /// Human-readable listing name; derived from the listing id if omitted.
    #[arg(long)]
    display_name: Option<String>,

    /// Allow subscribers to copy query results out of the room.
    #[arg(long)]
    allow_egress: bool,

    /// Skip the interactive confirmation.
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct VerifyArgs {
    #[arg(long, default_value = "acme-retail")]
    merchant_project: String,

    #[arg(long, default_value = "nimbus-wallet")]
    wallet_project: String,

    #[arg(long, default_value = "merchant_provider")]
    merchant_dataset: String,

    #[arg(long, default_value = "wallet_provider")]
    wallet_dataset: String,

    /// Salt the datasets were generated with.
    #[arg(long, env = "CLEANROOM_SALT", default_value = "demo-shared-salt-2025")]
    salt: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Identity,
    AggregateMetric,
    Transactional,
}

impl From<RoleArg> for TableRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Identity => Self::Identity,
            RoleArg::AggregateMetric => Self::AggregateMetric,
            RoleArg::Transactional => Self::Transactional,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    CleanRoom,
    Open,
}

impl From<ModeArg> for SharingEnvironment {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::CleanRoom => Self::CleanRoom,
            ModeArg::Open => Self::Open,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            // Conflicts need an operator decision; everything else is a
            // plain failure.
            let conflict = err
                .downcast_ref::<PublishError>()
                .is_some_and(|e| matches!(e, PublishError::Conflict { .. }));
            if conflict {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let platform = Arc::new(
        InMemoryPlatform::load(&cli.state_file).with_context(|| {
            format!(
                "failed to load platform state from {}",
                cli.state_file.display()
            )
        })?,
    );
    log::debug!("platform state file: {}", cli.state_file.display());

    match cli.command {
        Commands::Seed(args) => run_seed(&platform, &cli.state_file, args).await,
        Commands::Generate(args) => run_generate(&platform, &cli.state_file, args).await,
        Commands::Publish(args) => run_publish(&platform, &cli.state_file, args).await,
        Commands::Verify(args) => run_verify(&platform, args).await,
    }
}

async fn run_seed(
    platform: &Arc<InMemoryPlatform>,
    state_file: &Path,
    args: SeedArgs,
) -> Result<()> {
    let project = ProjectId::new(args.project)?;
    let config = SeedConfig {
        dataset: DatasetId::new(project, args.dataset)?,
        user_count: args.users,
        order_count: args.orders,
        anchor_date: args.anchor_date,
    };
    let report = seed(platform.as_ref(), &config).await?;
    platform.save(state_file)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_generate(
    platform: &Arc<InMemoryPlatform>,
    state_file: &Path,
    args: GenerateArgs,
) -> Result<()> {
    let merchant_project = ProjectId::new(args.merchant_project)?;
    let wallet_project = ProjectId::new(args.wallet_project)?;
    let config = GenerateConfig {
        source_dataset: DatasetId::new(merchant_project.clone(), args.source_dataset)?,
        merchant_dataset: DatasetId::new(merchant_project, args.merchant_dataset)?,
        wallet_dataset: DatasetId::new(wallet_project, args.wallet_dataset)?,
        as_of_date: args.as_of,
        salt: args.salt,
        market_share_percent: args.market_share,
    };
    let report = generate(platform.as_ref(), &config).await?;
    platform.save(state_file)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_publish(
    platform: &Arc<InMemoryPlatform>,
    state_file: &Path,
    args: PublishArgs,
) -> Result<()> {
    let project = ProjectId::new(args.project)?;
    let location = Location::new(args.location)?;
    let scope = ShareScope::new(project.clone(), location);
    let dataset = DatasetId::new(project, args.dataset)?;

    let target = if let Some(table) = args.table {
        let (Some(role), Some(rule_column)) = (args.role, args.rule_column) else {
            bail!("--table requires --role and --rule-column");
        };
        ShareTarget::Table(TableProfile {
            table: dataset.table(table)?,
            role: role.into(),
            rule_column,
        })
    } else {
        ShareTarget::Dataset(dataset)
    };

    let request = PublishRequest {
        scope,
        exchange_id: args.exchange,
        listing_id: args.listing,
        environment: args.mode.into(),
        target,
        subscriber: Principal::new(args.subscriber)?,
        display_name: args.display_name,
        allow_egress: args.allow_egress,
    };

    if !args.yes && !confirm_publish(&request)? {
        return Ok(());
    }

    let service = SharingService::new(platform.clone(), platform.clone());
    let outcome = service.publish(&request).await?;
    platform.save(state_file)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Asks before provisioning. Without a terminal the request is described
/// and nothing is published; `--yes` is the non-interactive path.
fn confirm_publish(request: &PublishRequest) -> Result<bool> {
    let shared = match &request.target {
        ShareTarget::Dataset(dataset) => format!("dataset `{dataset}`"),
        ShareTarget::Table(profile) => format!("table `{}`", profile.table),
    };
    if !atty::is(atty::Stream::Stdin) {
        eprintln!(
            "Would publish {shared} as listing `{}` in exchange `{}` and grant `{}` \
             subscriber access. Pass --yes to proceed.",
            request.listing_id, request.exchange_id, request.subscriber
        );
        return Ok(false);
    }
    eprintln!(
        "About to publish {shared} as listing `{}` in exchange `{}` for `{}`.",
        request.listing_id, request.exchange_id, request.subscriber
    );
    eprintln!("Continue? [y/N]");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    if matches!(line.trim(), "y" | "Y" | "yes") {
        Ok(true)
    } else {
        eprintln!("Aborted.");
        Ok(false)
    }
}

async fn run_verify(platform: &Arc<InMemoryPlatform>, args: VerifyArgs) -> Result<()> {
    let merchant_project = ProjectId::new(args.merchant_project)?;
    let wallet_project = ProjectId::new(args.wallet_project)?;
    let config = VerifyConfig {
        merchant_dataset: DatasetId::new(merchant_project, args.merchant_dataset)?,
        wallet_dataset: DatasetId::new(wallet_project, args.wallet_dataset)?,
        salt: args.salt,
    };
    let report = verify(platform.as_ref(), &config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.passed {
        bail!("cross-party linkage verification failed");
    }
    Ok(())
}
