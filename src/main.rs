// ================================
// src/main.rs
// ================================
use anyhow::{Context, Result};
use std::{
    io::{self, BufRead},
    thread,
};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wall_following::{
    node::NodeHandles,
    transport::{self, Inbound},
    Config, WallFollowingNode,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wall_following=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("F1Tenth Wall Following Node with Rust");

    let config = Config::load().context("failed to load configuration")?;
    info!(side = ?config.side, target = config.target_wall_distance, "configuration ready");

    let (node, handles) = WallFollowingNode::new(config);
    let NodeHandles {
        scan_sender,
        emergency_stop,
        shutdown,
        mut drive_receiver,
    } = handles;

    ctrlc::set_handler(move || {
        let _ = shutdown.send(true);
    })
    .context("failed to install Ctrl-C handler")?;

    // Inbound: one JSON message per line on stdin. A plain thread, so a
    // pending read cannot hold up runtime shutdown.
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("failed to read input: {}", e);
                    break;
                }
            };
            match transport::decode_line(&line) {
                Ok(Some(Inbound::Scan(scan))) => {
                    if scan_sender.blocking_send(scan).is_err() {
                        break;
                    }
                }
                Ok(Some(Inbound::EmergencyStop { data })) => {
                    emergency_stop.send_replace(data);
                }
                Ok(None) => {}
                Err(e) => warn!("skipping malformed message: {}", e),
            }
        }
        info!("input closed");
    });

    // Outbound: drive parameters as JSON lines on stdout
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(command) = drive_receiver.recv().await {
            let line = transport::encode_drive(command)?;
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        anyhow::Ok(())
    });

    node.run().await;
    writer.await.context("drive writer panicked")??;

    info!("wall following node stopped");
    Ok(())
}
