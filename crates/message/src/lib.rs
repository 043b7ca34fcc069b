//! Alert message templating: `{{token}}` substitution and default templates.

pub mod context;
pub mod defaults;
pub mod render;

pub use context::{AlertMeta, MessageContext};
pub use defaults::default_message_template;
pub use render::render;
