//! AutoDB CLI: run the relay, validate schema names, or provision one
//! schema by hand.

use std::path::PathBuf;

use anyhow::Context;
use autodb_core::{AutoDbConfig, SchemaName};
use autodb_provision::{ProvisioningGate, SchemaProvisioner};
use autodb_proxy::AutoDbProxy;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "autodb", version, about = "MySQL relay that provisions schemas on demand")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the relay.
    Serve {
        /// Path to a YAML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on for client connections.
        #[arg(long, env = "AUTODB_LISTEN_PORT")]
        listen_port: Option<u16>,

        /// Upstream MySQL host.
        #[arg(long, env = "AUTODB_MYSQL_HOST")]
        mysql_host: Option<String>,

        /// Upstream MySQL port.
        #[arg(long, env = "AUTODB_MYSQL_PORT")]
        mysql_port: Option<u16>,

        /// Username for administrative connections.
        #[arg(long, env = "AUTODB_MYSQL_USER")]
        mysql_user: Option<String>,

        /// Password for administrative connections.
        #[arg(long, env = "AUTODB_MYSQL_PASSWORD")]
        mysql_password: Option<String>,

        /// Log verbosity (error, warn, info, debug, trace).
        #[arg(long, env = "AUTODB_LOG_LEVEL")]
        log_level: Option<String>,
    },

    /// Validate a schema name without touching the upstream.
    CheckName {
        /// The name to validate.
        name: String,
    },

    /// Run one provisioning call against the configured upstream.
    Ensure {
        /// The schema to ensure exists.
        name: String,

        /// Path to a YAML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AutoDbConfig> {
    match path {
        Some(p) => AutoDbConfig::from_file(p)
            .with_context(|| format!("loading configuration from {}", p.display())),
        None => Ok(AutoDbConfig::default()),
    }
}

/// Initialize the global subscriber once, before any session starts.
/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve {
            config,
            listen_port,
            mysql_host,
            mysql_port,
            mysql_user,
            mysql_password,
            log_level,
        } => {
            let mut cfg = load_config(config.as_ref())?;
            if let Some(port) = listen_port {
                cfg.listen.port = port;
            }
            if let Some(host) = mysql_host {
                cfg.upstream.host = host;
            }
            if let Some(port) = mysql_port {
                cfg.upstream.port = port;
            }
            if let Some(user) = mysql_user {
                cfg.admin.username = user;
            }
            if let Some(password) = mysql_password {
                cfg.admin.password = Some(password);
            }
            if let Some(level) = log_level {
                cfg.log_level = level;
            }

            init_tracing(&cfg.log_level);

            let proxy = AutoDbProxy::new(cfg);
            tokio::select! {
                result = proxy.run() => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutting down");
                }
            }
            Ok(())
        }

        Command::CheckName { name } => match SchemaName::new(&name) {
            Ok(schema) => {
                println!("ok: {schema}");
                Ok(())
            }
            Err(e) => anyhow::bail!("rejected: {e}"),
        },

        Command::Ensure { name, config } => {
            let cfg = load_config(config.as_ref())?;
            init_tracing(&cfg.log_level);

            let gate = ProvisioningGate::new(cfg.upstream.clone(), cfg.admin.clone());
            gate.ensure_schema(&name).await?;
            println!("schema '{name}' is ready");
            Ok(())
        }
    }
}
