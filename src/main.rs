//! tableau-grants
//!
//! Command-line shell over the project permission reconciler.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tableau_grants::{
    auth::create_auth_provider,
    config::{LogFormat, load_config},
    error::ReconcileError,
    permissions::{DeclaredGrant, GrantAttributes, IDENTIFIER_FORMAT, Reconciler, encode},
    tableau::TableauClient,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Manage Tableau project permission grants
#[derive(Parser, Debug)]
#[command(name = "tableau-grants")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "TABLEAU_GRANTS_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides logging.level
    #[arg(long, env = "TABLEAU_GRANTS_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grant a capability on a project
    Create(GrantArgs),
    /// Confirm a grant is present; fails if it has been removed
    Read(GrantArgs),
    /// Remove a grant (already-absent grants succeed)
    Delete(GrantArgs),
    /// Adopt an existing grant by identifier
    Import {
        /// project_id:group_id:user_id:capability_name:capability_mode
        identifier: String,
    },
    /// List every grantee capability set on a project
    List {
        /// Project LUID
        #[arg(long)]
        project_id: String,
    },
    /// Print the compound identifier for a grant
    Id(GrantArgs),
}

/// Declared attributes of a single grant
#[derive(Args, Debug)]
struct GrantArgs {
    /// Project LUID
    #[arg(long)]
    project_id: String,

    /// Group LUID (set exactly one of --group-id/--user-id)
    #[arg(long)]
    group_id: Option<String>,

    /// User LUID (set exactly one of --group-id/--user-id)
    #[arg(long)]
    user_id: Option<String>,

    /// Read or Write
    #[arg(long)]
    capability_name: String,

    /// Allow or Deny (case sensitive)
    #[arg(long)]
    capability_mode: String,
}

impl From<GrantArgs> for GrantAttributes {
    fn from(args: GrantArgs) -> Self {
        GrantAttributes {
            project_id: args.project_id,
            group_id: args.group_id,
            user_id: args.user_id,
            capability_name: args.capability_name,
            capability_mode: args.capability_mode,
        }
    }
}

/// Persistable state for one grant
#[derive(Serialize)]
struct GrantState {
    id: String,
    #[serde(flatten)]
    attributes: GrantAttributes,
}

impl From<&DeclaredGrant> for GrantState {
    fn from(grant: &DeclaredGrant) -> Self {
        Self {
            id: grant.identifier(),
            attributes: grant.to_attributes(),
        }
    }
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Attach the identifier format hint to decoding failures only
fn import_error(err: ReconcileError) -> anyhow::Error {
    match err {
        ReconcileError::Decode(_) => anyhow::Error::new(err)
            .context(format!("Expected identifier format: {}", IDENTIFIER_FORMAT)),
        other => other.into(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load configuration, start logging, sign in and build the reconciler
async fn connect(config_path: Option<&str>, log_level: Option<&str>) -> anyhow::Result<Reconciler> {
    let config = load_config(config_path).context("Failed to load configuration")?;

    init_logging(
        log_level.unwrap_or(&config.logging.level),
        config.logging.format,
    );

    info!(
        version = env!("CARGO_PKG_VERSION"),
        url = %config.tableau.url,
        "Starting tableau-grants"
    );

    let auth = create_auth_provider(&config.tableau)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to authenticate"))?;
    info!(auth = auth.auth_type(), site_id = auth.site_id(), "Authenticated");

    let client = TableauClient::new(&config.tableau, auth)
        .inspect_err(|e| error!(error = %e, "Failed to create Tableau client"))?;

    Ok(Reconciler::new(Arc::new(client)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let log_level = cli.log_level.as_deref();

    match cli.command {
        Command::Id(args) => {
            // Identifier composition needs no server
            println!("{}", encode(&args.into()));
        }
        Command::Create(args) => {
            let reconciler = connect(config_path, log_level).await?;
            let grant = reconciler.create(&args.into()).await?;
            print_json(&GrantState::from(&grant))?;
        }
        Command::Read(args) => {
            let reconciler = connect(config_path, log_level).await?;
            let grant = reconciler.read(&args.into()).await?;
            print_json(&GrantState::from(&grant))?;
        }
        Command::Delete(args) => {
            let reconciler = connect(config_path, log_level).await?;
            reconciler.delete(&args.into()).await?;
        }
        Command::Import { identifier } => {
            let reconciler = connect(config_path, log_level).await?;
            let grant = reconciler.import(&identifier).await.map_err(import_error)?;
            print_json(&GrantState::from(&grant))?;
        }
        Command::List { project_id } => {
            let reconciler = connect(config_path, log_level).await?;
            let sets = reconciler.list(&project_id).await?;
            print_json(&sets)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_grants::error::DecodeError;

    #[test]
    fn test_import_error_hints_format_on_decode_failure() {
        let err = import_error(ReconcileError::Decode(DecodeError::MalformedIdentifier {
            identifier: "p1:g1".into(),
            fields: 2,
        }));
        assert!(err.to_string().contains(IDENTIFIER_FORMAT));
    }

    #[test]
    fn test_import_error_keeps_drift_message() {
        let err = import_error(ReconcileError::NotFound {
            project_id: "p1".into(),
            grantee: "group g1".into(),
            capability: "Read:Allow".into(),
        });
        let msg = format!("{err:#}");
        assert!(msg.contains("not found on project p1"));
        assert!(!msg.contains("Expected identifier format"));
    }
}
