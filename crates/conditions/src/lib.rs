//! Alert condition vocabulary and the catalog of conditions each indicator supports.

pub mod catalog;
pub mod kind;
pub mod record;
pub mod registry;
pub mod template;

pub use kind::{ConditionKind, ConditionType, Operand, Threshold, Zone};
pub use record::ConditionRecord;
pub use registry::{ConditionRegistry, IndicatorAlertConfig};
pub use template::{ConditionInstance, ConditionOverrides, ConditionTemplate};
