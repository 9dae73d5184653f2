//! Boundary snapping and content-aware reframe pipeline binary.

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sclip_pipeline::{runner, Cli, Command};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sclip=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Snap(args) => {
            let report = runner::run_snap(&args).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Detect(args) => {
            let report = runner::run_detect(&args).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Reframe(args) => {
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received shutdown signal, cancelling clip analysis");
                    cancel_tx.send(true).ok();
                }
            });

            let map = runner::run_reframe(&args, cancel_rx).await?;

            let mut summary = serde_json::Map::new();
            summary.insert("action".into(), "compute_reframe".into());
            summary.insert(
                "content_type".into(),
                args.content_type.as_str().into(),
            );
            summary.insert("clips_processed".into(), map.clip_count.into());
            summary.insert(
                "computation_time_sec".into(),
                map.computation_time_sec.into(),
            );
            for (name, entry) in &map.clips {
                summary.insert(
                    name.clone(),
                    serde_json::json!({
                        "strategy": entry.reframe.strategy,
                        "crop": entry.reframe.crop,
                        "keyframe_count": entry.reframe.crop_keyframes.len(),
                    }),
                );
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
