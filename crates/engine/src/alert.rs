use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use conditions::ConditionInstance;

/// How often an alert may fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
    /// Fire a single time, then retire the alert.
    Once,
    /// At most one fire per bar; later ticks of the same bar are ignored.
    #[default]
    OncePerBar,
    /// Evaluate on closed bars only.
    OncePerBarClose,
    /// Every evaluation that comes out true.
    EveryTime,
}

impl fmt::Display for AlertFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertFrequency::Once => "once",
            AlertFrequency::OncePerBar => "once_per_bar",
            AlertFrequency::OncePerBarClose => "once_per_bar_close",
            AlertFrequency::EveryTime => "every_time",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    /// Fired with [`AlertFrequency::Once`] and removed from the engine.
    Triggered,
}

/// A user alert: one condition on one indicator of one symbol.
#[derive(Debug, Clone)]
pub struct Alert {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub condition: ConditionInstance,
    /// Message template; the default template is used when absent.
    pub message: Option<String>,
    pub frequency: AlertFrequency,
    pub status: AlertStatus,
    /// Bar time of the last fire, for `OncePerBar`.
    pub(crate) last_fired_bar: Option<DateTime<Utc>>,
}

impl Alert {
    /// New active alert with a random id and the default frequency.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        condition: ConditionInstance,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            symbol: symbol.into(),
            condition,
            message: None,
            frequency: AlertFrequency::default(),
            status: AlertStatus::Active,
            last_fired_bar: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.message = Some(template.into());
        self
    }

    pub fn with_frequency(mut self, frequency: AlertFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn indicator(&self) -> &str {
        &self.condition.indicator
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}
