//! Linear Auth CLI
//!
//! Small command-line front end over the credential resolver and cache.
//! Every command prints one JSON document so agents can parse the output.
//!
//! Run with:
//!   cargo run -p linear-auth-cli -- status
//!   cargo run -p linear-auth-cli -- login --with-token lin_api_...
//!   cargo run -p linear-auth-cli -- login --client-credentials --client-secret ...
//!   cargo run -p linear-auth-cli -- cache clear
//!
//! Set `RUST_LOG=linear_agent_auth=debug` to see which source wins.

use anyhow::Context;
use clap::{Parser, Subcommand};
use linear_agent_auth::utils::mask_secret;
use linear_agent_auth::{CredentialResolver, ExpiringCache, LinearError, ResolverConfig};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Inspect and manage Linear credentials
#[derive(Parser, Debug)]
#[command(name = "linear-auth-cli")]
#[command(about = "Inspect and manage Linear CLI credentials and cache")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show which credential would be used, without network calls
    Status,
    /// Resolve a credential, refreshing it if needed
    Token {
        /// Print the full value instead of a masked prefix
        #[arg(long)]
        reveal: bool,
    },
    /// Store credentials in the secret store
    Login {
        /// Personal API key (lin_api_...)
        #[arg(long, conflicts_with = "client_credentials")]
        with_token: Option<String>,

        /// Use the OAuth client-credentials grant
        #[arg(long)]
        client_credentials: bool,

        /// OAuth client id (defaults to the CLI's public client)
        #[arg(long, default_value = "", requires = "client_credentials")]
        client_id: String,

        /// OAuth client secret
        #[arg(long, requires = "client_credentials")]
        client_secret: Option<String>,
    },
    /// Remove every stored credential
    Logout,
    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Delete all cached entries
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match run(args.command, &cancel).await {
        Ok(output) => {
            println!("{output:#}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let report = match e.downcast_ref::<LinearError>() {
                Some(err) => serde_json::to_value(err.report()).unwrap_or_default(),
                None => serde_json::json!({ "code": "UNEXPECTED", "message": format!("{e:#}") }),
            };
            eprintln!("{report:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, cancel: &CancellationToken) -> anyhow::Result<serde_json::Value> {
    let resolver = CredentialResolver::new(ResolverConfig::default());

    let output = match command {
        Command::Status => serde_json::to_value(resolver.status().await)?,
        Command::Token { reveal } => {
            let credential = resolver.resolve(cancel).await?;
            let value = if reveal {
                credential.value().to_string()
            } else {
                mask_secret(credential.value())
            };
            serde_json::json!({
                "token": value,
                "method": credential.method(),
                "source": credential.source(),
                "expires_at": credential.expires_at(),
            })
        }
        Command::Login {
            with_token: Some(api_key),
            ..
        } => {
            resolver.login_with_api_key(&api_key).await?;
            serde_json::json!({ "stored": "api_key" })
        }
        Command::Login {
            client_credentials: true,
            client_id,
            client_secret,
            ..
        } => {
            let client_secret = client_secret.context("--client-secret is required")?;
            resolver
                .login_with_client_credentials(&client_id, &client_secret, cancel)
                .await?;
            serde_json::json!({ "stored": "client_credentials" })
        }
        Command::Login { .. } => {
            anyhow::bail!("pass --with-token <KEY> or --client-credentials")
        }
        Command::Logout => {
            resolver.logout().await?;
            serde_json::json!({ "logged_out": true })
        }
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            let cache = ExpiringCache::new().map_err(LinearError::from)?;
            cache.clear_all().await.map_err(LinearError::from)?;
            serde_json::json!({ "cleared": cache.dir() })
        }
    };

    Ok(output)
}
