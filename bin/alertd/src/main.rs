use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{AlertFired, AlertSink, BarEvent, Config};
use conditions::ConditionRegistry;
use engine::{dispatch, AlertEngine, AlertFileConfig};

/// Writes each fired alert's message to the log.
struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn deliver(&self, fired: &AlertFired) -> common::Result<()> {
        info!(
            target: "alert",
            id = %fired.alert_id,
            symbol = %fired.symbol,
            time = %fired.time,
            "{}",
            fired.message
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env()?;
    info!(
        alerts = %cfg.alerts_config_path,
        feed = cfg.bar_feed_path.as_deref().unwrap_or("<stdin>"),
        "alertd starting"
    );

    // ── Alerts ────────────────────────────────────────────────────────────────
    let alert_file = AlertFileConfig::load(&cfg.alerts_config_path)?;
    let alerts = alert_file
        .to_alerts(ConditionRegistry::builtin())
        .context("invalid alert config")?;
    let engine = AlertEngine::new(alerts)?;
    if engine.is_empty() {
        warn!("No alerts configured, bars will be read but nothing can fire");
    }

    // ── Channels ──────────────────────────────────────────────────────────────
    let capacity = cfg.channel_capacity;
    let (bar_tx, bar_rx) = mpsc::channel::<BarEvent>(capacity);
    let (fired_tx, fired_rx) = mpsc::channel::<AlertFired>(capacity);

    // ── Spawn tasks ───────────────────────────────────────────────────────────
    let engine_task = tokio::spawn(engine.run_queue(bar_rx, fired_tx));
    let sinks: Vec<Arc<dyn AlertSink>> = vec![Arc::new(LogSink)];
    let dispatch_task = tokio::spawn(dispatch(fired_rx, sinks));

    // ── Feed ──────────────────────────────────────────────────────────────────
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &cfg.bar_feed_path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open bar feed at '{path}'"))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let (read, skipped) = feed(reader, &bar_tx).await?;
    info!(bars = read, skipped, "Bar feed finished");

    drop(bar_tx);
    engine_task.await.context("alert engine task failed")?;
    dispatch_task.await.context("dispatcher task failed")?;
    info!("alertd stopped");
    Ok(())
}

/// Stream JSON-lines bars into the engine. Returns (bars sent, lines skipped).
async fn feed(
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    bar_tx: &mpsc::Sender<BarEvent>,
) -> anyhow::Result<(usize, usize)> {
    let mut lines = reader.lines();
    let (mut read, mut skipped, mut line_no) = (0usize, 0usize, 0usize);

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let bar: BarEvent = match serde_json::from_str(line) {
            Ok(bar) => bar,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed bar");
                skipped += 1;
                continue;
            }
        };

        if bar_tx.send(bar).await.is_err() {
            warn!("Alert engine stopped, ending feed early");
            break;
        }
        read += 1;
    }
    Ok((read, skipped))
}
