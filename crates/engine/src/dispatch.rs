use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use common::{AlertFired, AlertSink};

/// Deliver every fired alert to each sink, in order.
/// A failing sink is logged and does not block the others. Returns when the
/// channel closes.
pub async fn dispatch(mut fired_rx: mpsc::Receiver<AlertFired>, sinks: Vec<Arc<dyn AlertSink>>) {
    info!(sinks = sinks.len(), "Alert dispatcher running");
    while let Some(fired) = fired_rx.recv().await {
        for sink in &sinks {
            if let Err(e) = sink.deliver(&fired).await {
                warn!(id = %fired.alert_id, error = %e, "Alert delivery failed");
            }
        }
    }
    info!("Fired-alert channel closed, dispatcher stopping");
}
