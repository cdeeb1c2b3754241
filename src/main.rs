mod cli;
mod config;
mod domain;
mod player;
mod progress_api;
mod progress_client;
mod storage;

use std::{path::Path, sync::Arc, time::Duration};

use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use player::{PlayerSession, SimulatedPlayback, run_playback};
use poem::{
    EndpointExt, Route, Server,
    listener::TcpListener,
    middleware::{Cors, Tracing as PoemTracing},
};
use poem_openapi::OpenApiService;
use progress_client::ProgressClient;
use storage::{ProgressRepo, SeaOrmProgressRepo, open_database};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

type VideoProgressResult<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> VideoProgressResult<()> {
    let cli = Cli::parse();

    // Initialize tracing (logs). Respect RUST_LOG if set, default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,poem=info,reqwest=warn,h2=warn",
        env!("CARGO_PKG_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting video progress"
    );
    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load();
    if let Err(e) = config.validate() {
        return Err(anyhow::anyhow!(e));
    }

    match cli.command {
        Command::Serve => {
            let db_conn = open_database(&config.db_connection_string).await?;
            let repo: Arc<dyn ProgressRepo> = Arc::new(SeaOrmProgressRepo::new(db_conn));
            run_poem(repo, &config).await
        }
        Command::Play {
            duration,
            start,
            speed,
            stall_at,
            stall_for,
        } => {
            if !(speed.is_finite() && speed > 0.0) {
                anyhow::bail!("--speed must be positive");
            }
            if !(stall_for.is_finite() && stall_for >= 0.0) {
                anyhow::bail!("--stall-for must be a non-negative number of seconds");
            }
            let mut playback = SimulatedPlayback::new(duration, start, speed);
            if let Some(at) = stall_at {
                playback = playback.with_stall(at, Duration::from_secs_f64(stall_for));
            }
            run_player(&config, playback).await
        }
    }
}

pub async fn run_poem(repo: Arc<dyn ProgressRepo>, config: &Config) -> VideoProgressResult<()> {
    let version = env!("CARGO_PKG_VERSION");
    let api = progress_api::ProgressApi { repo };
    let api_service = OpenApiService::new(api, "Video Progress API", version)
        .server(config.api_base_url.clone());
    let ui = api_service.rapidoc();
    let spec = api_service.spec();
    let route = Route::new()
        .nest("/", api_service)
        .nest("/ui", ui)
        .nest("/spec", poem::endpoint::make_sync(move |_| spec.clone()))
        .with(Cors::new())
        .with(PoemTracing);

    let bind_addr = config.bind_addr.as_str();
    tracing::info!(%bind_addr, "starting HTTP server");
    Server::new(TcpListener::bind(bind_addr)).run(route).await?;
    Ok(())
}

pub async fn run_player(
    config: &Config,
    mut playback: SimulatedPlayback,
) -> VideoProgressResult<()> {
    let client = ProgressClient::new(&config.api_base_url)?;
    tracing::info!(api_base = %config.api_base_url, "configured progress client");
    let mut session = PlayerSession::new(client);
    session.load_progress().await;
    if let Some(error) = &session.state().error {
        // tracking is best-effort; keep playing
        tracing::error!(%error, "progress unavailable");
    } else {
        tracing::info!(
            percent = session.state().percent,
            total_watched = %player::format::format_time(session.state().total_watched_time),
            loading = session.state().loading,
            "loaded stored progress"
        );
    }

    // a video without a usable length cannot be played
    let duration = playback.position().duration;
    if !(duration.is_finite() && duration > 0.0) {
        session.on_media_error();
        let banner = session.state().error.clone().unwrap_or_default();
        tracing::error!(%duration, "{banner}");
        anyhow::bail!(banner);
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    run_playback(&mut session, &mut playback, shutdown).await;
    Ok(())
}
