pub mod alert;
pub mod config;
pub mod dispatch;
pub mod runner;

pub use alert::{Alert, AlertFrequency, AlertStatus};
pub use config::{AlertConfig, AlertFileConfig};
pub use dispatch::dispatch;
pub use runner::AlertEngine;
