//! Domain types, error taxonomy, and the alert rule resolver for the
//! StreamForge sidecar event server.
//!
//! This crate has no knowledge of HTTP, WebSocket, or SQLite — it is the
//! pure core the server crate wires up to I/O. Keeping it free of async
//! runtime and transport dependencies is what makes the resolver and merge
//! rule exhaustively unit-testable.

pub mod defaults;
pub mod error;
pub mod event_log;
pub mod event_type;
pub mod instance;
pub mod resolver;
pub mod setting;
pub mod template;
pub mod time;

mod alert;
mod variation;

pub use alert::{Alert, AlertPatch, NewAlert};
pub use error::{Result, StreamForgeError};
pub use event_log::{EventLog, EventLogFilter, NewEventLog};
pub use event_type::EventType;
pub use instance::{AlertInstance, AlertSpec, AlertWithVariations, TriggerFacts};
pub use resolver::{resolve, ResolvedAlert};
pub use setting::Setting;
pub use template::{NewTemplate, Template, TemplatePatch};
pub use variation::{ConditionType, NewVariation, Variation, VariationPatch};
