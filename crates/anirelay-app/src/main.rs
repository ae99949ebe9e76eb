//! anirelay - caching CORS relay for streaming web apps.
//!
//! Runs the HTTP server that fronts third-party metadata and streaming
//! hosts for a browser single-page app: content-type-aware relaying,
//! permissive CORS, an optional response cache, and the OAuth
//! authorization-code exchange the frontend needs.

use std::path::PathBuf;
use std::time::Duration;

use anirelay_server::{OauthConfig, Server, ServerConfig, DEFAULT_PORT};
use clap::Parser;
use directories::ProjectDirs;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// anirelay - caching CORS relay for streaming web apps
#[derive(Parser, Debug)]
#[command(name = "anirelay", version, about)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Disable the response cache
    #[arg(long)]
    no_cache: bool,

    /// Freshness window for cached responses, in seconds
    #[arg(long, default_value_t = 3600)]
    cache_max_age: u64,

    /// Timeout for upstream fetches, in seconds
    #[arg(long, default_value_t = 15)]
    upstream_timeout: u64,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Get the logs directory path.
fn logs_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "anirelay", "anirelay").map(|dirs| dirs.data_dir().join("logs"))
}

/// Initialize logging with file rotation and a console layer.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("anirelay={},warn", log_level)));

    if let Some(log_dir) = logs_dir() {
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("anirelay")
                .filename_suffix("log")
                .build(&log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(std::io::stdout))
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                    .init();

                tracing::info!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }
    }

    // Fallback: console logging only
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::warn!("File logging unavailable, using console only");
    None
}

/// Reads the OAuth client configuration from the environment.
///
/// All four variables must be set; the token exchange route stays
/// unconfigured otherwise and answers with an error envelope.
fn oauth_from_env() -> Option<OauthConfig> {
    let token_url = std::env::var("ANIRELAY_TOKEN_URL").ok()?;
    let client_id = std::env::var("ANIRELAY_CLIENT_ID").ok()?;
    let client_secret = std::env::var("ANIRELAY_CLIENT_SECRET").ok()?;
    let redirect_uri = std::env::var("ANIRELAY_REDIRECT_URI").ok()?;

    Some(OauthConfig {
        token_url,
        client_id,
        client_secret,
        redirect_uri,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args);

    let oauth = oauth_from_env();
    if oauth.is_none() {
        tracing::warn!(
            "OAuth credentials not set (ANIRELAY_TOKEN_URL/CLIENT_ID/CLIENT_SECRET/REDIRECT_URI); \
             /exchange-token will answer with an error"
        );
    }

    let config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        cache_enabled: !args.no_cache,
        cache_max_age: args.cache_max_age,
        upstream_timeout: Duration::from_secs(args.upstream_timeout),
        oauth,
    };

    let server = Server::new(config)?;
    tracing::info!(
        host = %args.host,
        port = args.port,
        cache = !args.no_cache,
        "anirelay starting"
    );

    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_defaults() {
        let args = Args::parse_from(["anirelay"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, DEFAULT_PORT);
        assert!(!args.no_cache);
        assert_eq!(args.cache_max_age, 3600);
        assert_eq!(args.upstream_timeout, 15);
    }

    #[test]
    fn args_override() {
        let args = Args::parse_from(["anirelay", "--no-cache", "--port", "8080"]);
        assert!(args.no_cache);
        assert_eq!(args.port, 8080);
    }
}
