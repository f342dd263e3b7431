//! YaMDb Web Server
//!
//! Review and rating API for films, books and music.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use yamdb_web::server::YamdbServerBuilder;
use yamdb_web::{init_logging, WebConfig};

/// YaMDb Web Server - titles, reviews and comments over HTTP
#[derive(Parser, Debug)]
#[command(name = "yamdb-web")]
#[command(about = "Review and rating API for films, books and music")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "YAMDB_CONFIG")]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// SQLite database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Command line flags win over file and environment settings
    fn apply(self, config: &mut WebConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.dev {
            config.dev_mode = true;
        }
        if let Some(database_url) = self.database_url {
            config.database_url = database_url;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config =
        WebConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    init_logging(&config)?;

    println!("🚀 Starting YaMDb Web Server");
    println!("📍 Server: http://{}", config.address());
    println!("🔧 Development mode: {}", config.dev_mode);
    println!("🗄️  Database: {}", config.database_url);

    let server = YamdbServerBuilder::with_config(config)
        .build()
        .await
        .context("Failed to build server")?;

    server.start().await.context("Server failed")?;

    println!("✅ Server shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["yamdb-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.dev);

        let args = Args::parse_from(["yamdb-web", "--host", "0.0.0.0", "--port", "3000", "--dev"]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(3000));
        assert!(args.dev);
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = WebConfig::default();
        let args = Args::parse_from([
            "yamdb-web",
            "--port",
            "9000",
            "--database-url",
            "sqlite://reviews.db",
            "--log-level",
            "debug",
        ]);
        args.apply(&mut config);

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url, "sqlite://reviews.db");
        assert_eq!(config.logging.level, "debug");
    }
}
