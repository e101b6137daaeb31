//! `volleyd`: runs a Volley game server.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use volley::prelude::*;

/// Server-authoritative paddle game backend.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "VOLLEY_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// URL finished matches are POSTed to; results are only logged when unset
    #[arg(long, env = "VOLLEY_HISTORY_URL")]
    history_url: Option<String>,

    /// How long a dropped player may take to reconnect, in milliseconds
    #[arg(long, env = "VOLLEY_GRACE_MS", default_value_t = 5_000)]
    grace_ms: u64,

    /// Physics steps per second
    #[arg(short, long, env = "VOLLEY_TICK_RATE", default_value_t = 60)]
    tick_rate: u32,

    /// Points needed to win a match
    #[arg(long, env = "VOLLEY_WIN_SCORE", default_value_t = 5)]
    win_score: u32,

    /// Report matches as ranked instead of casual
    #[arg(long, env = "VOLLEY_RANKED")]
    ranked: bool,
}

#[tokio::main]
async fn main() -> Result<(), VolleyError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut server_config = ServerConfig::default().with_bind_addr(args.bind);
    server_config.history_url = args.history_url;

    let physics = PhysicsConfig {
        win_score: args.win_score,
        ..PhysicsConfig::default()
    };
    let match_type = if args.ranked {
        MatchType::Ranked
    } else {
        MatchType::Casual
    };
    let session_config = SessionConfig::default()
        .with_physics(physics)
        .with_grace_period(Duration::from_millis(args.grace_ms))
        .with_match_type(match_type);

    let server = VolleyServer::builder()
        .server_config(server_config)
        .session_config(session_config)
        .tick_config(TickConfig::with_rate(args.tick_rate))
        .build()
        .await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
