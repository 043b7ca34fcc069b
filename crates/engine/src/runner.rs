use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use common::{AlertFired, BarEvent, Error, Result};
use conditions::registry;
use evaluator::PreviousValueCache;
use message::{default_message_template, render, MessageContext};

use crate::alert::{Alert, AlertFrequency, AlertStatus};

/// Holds the active alerts and evaluates them against incoming bars.
///
/// The previous-bar cache only advances on closed bars. Intra-bar ticks are
/// compared against the last closed bar, so a cross seen on a tick is still a
/// cross when the bar closes.
#[derive(Debug, Default)]
pub struct AlertEngine {
    alerts: Vec<Alert>,
    cache: PreviousValueCache,
}

impl AlertEngine {
    pub fn new(alerts: Vec<Alert>) -> Result<Self> {
        let mut engine = Self::default();
        for alert in alerts {
            engine.add(alert)?;
        }
        Ok(engine)
    }

    /// Register an alert. Rejects repeated ids and conditions on series the
    /// indicator does not produce.
    pub fn add(&mut self, alert: Alert) -> Result<()> {
        if self.alerts.iter().any(|a| a.id == alert.id) {
            return Err(Error::Config(format!("alert id '{}' already registered", alert.id)));
        }
        if let Some(config) = registry::indicator_config(alert.indicator()) {
            alert.condition.check_series(&config.series)?;
        }
        info!(
            id = %alert.id,
            name = %alert.name,
            symbol = %alert.symbol,
            condition = %alert.condition.describe(),
            frequency = %alert.frequency,
            "Registered alert"
        );
        self.alerts.push(alert);
        Ok(())
    }

    /// Remove an alert and forget its previous bar.
    pub fn remove(&mut self, alert_id: &str) -> Option<Alert> {
        let index = self.alerts.iter().position(|a| a.id == alert_id)?;
        self.cache.remove_alert(alert_id);
        Some(self.alerts.remove(index))
    }

    pub fn active(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Evaluate every alert on `bar.symbol`. Returns the alerts that fired.
    pub fn process(&mut self, bar: &BarEvent) -> Vec<AlertFired> {
        let mut fired = Vec::new();

        for alert in self.alerts.iter_mut().filter(|a| a.symbol == bar.symbol) {
            if alert.frequency == AlertFrequency::OncePerBarClose && !bar.is_bar_closed {
                continue;
            }

            let hit = if bar.is_bar_closed {
                self.cache
                    .evaluate(&alert.id, &alert.condition, &bar.indicators, Some(&bar.price))
            } else {
                self.cache
                    .peek(&alert.id, &alert.condition, &bar.indicators, Some(&bar.price))
            };
            if !hit {
                continue;
            }

            if alert.frequency == AlertFrequency::OncePerBar
                && alert.last_fired_bar == Some(bar.time)
            {
                debug!(id = %alert.id, "Already fired on this bar");
                continue;
            }

            alert.last_fired_bar = Some(bar.time);
            if alert.frequency == AlertFrequency::Once {
                alert.status = AlertStatus::Triggered;
            }

            let event = fire(alert, bar);
            info!(
                id = %event.alert_id,
                name = %event.name,
                symbol = %event.symbol,
                condition = %event.condition,
                price = event.price,
                "Alert fired"
            );
            fired.push(event);
        }

        let cache = &mut self.cache;
        self.alerts.retain(|a| {
            if a.status == AlertStatus::Triggered {
                cache.remove_alert(&a.id);
                info!(id = %a.id, "Alert retired after firing once");
                false
            } else {
                true
            }
        });

        fired
    }

    /// Run the alert loop.
    /// Reads bars from `bar_rx`, pushes fired alerts to `fired_tx`.
    pub async fn run(
        mut self,
        mut bar_rx: broadcast::Receiver<BarEvent>,
        fired_tx: mpsc::Sender<AlertFired>,
    ) {
        info!(alerts = self.alerts.len(), "AlertEngine running");
        loop {
            match bar_rx.recv().await {
                Ok(bar) => {
                    if !self.forward(&bar, &fired_tx).await {
                        return;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(dropped = n, "Alert engine lagged, dropped bars");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Bar channel closed, stopping alert engine");
                    return;
                }
            }
        }
    }

    /// Run the alert loop over a single-producer queue.
    /// A full `bar_rx` makes the producer wait instead of dropping bars.
    pub async fn run_queue(
        mut self,
        mut bar_rx: mpsc::Receiver<BarEvent>,
        fired_tx: mpsc::Sender<AlertFired>,
    ) {
        info!(alerts = self.alerts.len(), "AlertEngine running");
        while let Some(bar) = bar_rx.recv().await {
            if !self.forward(&bar, &fired_tx).await {
                return;
            }
        }
        info!("Bar queue closed, stopping alert engine");
    }

    /// Process one bar and push what fired. `false` once `fired_tx` is closed.
    async fn forward(&mut self, bar: &BarEvent, fired_tx: &mpsc::Sender<AlertFired>) -> bool {
        for event in self.process(bar) {
            if fired_tx.send(event).await.is_err() {
                warn!("Fired-alert channel closed, stopping alert engine");
                return false;
            }
        }
        true
    }
}

fn fire(alert: &Alert, bar: &BarEvent) -> AlertFired {
    let template = alert
        .message
        .clone()
        .unwrap_or_else(|| default_message_template(&alert.condition, &alert.symbol));
    let ctx = MessageContext::from_bar(bar).with_alert(&alert.name, alert.condition.describe());

    AlertFired {
        alert_id: alert.id.clone(),
        name: alert.name.clone(),
        symbol: bar.symbol.clone(),
        indicator: alert.indicator().to_string(),
        condition: alert.condition.condition_type().as_str().to_string(),
        message: render(&template, &ctx),
        price: bar.price.price(),
        time: bar.time,
    }
}
