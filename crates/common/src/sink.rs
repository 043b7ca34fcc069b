use async_trait::async_trait;

use crate::{AlertFired, Result};

/// Destination for fired alerts.
///
/// The engine only produces `AlertFired` events; a sink turns them into a
/// notification, webhook call, log line, etc. `alertd` ships a sink that logs.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver one fired alert. Errors are logged by the caller and do not
    /// stop delivery of later alerts.
    async fn deliver(&self, fired: &AlertFired) -> Result<()>;
}
