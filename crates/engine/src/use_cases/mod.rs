//! Use cases - User story orchestration.
//!
//! - `aggregate` - the status-page report and host resolution
//! - `session_properties` - property and context records on stored sessions
//! - `registry` - session, player and presence registration

pub mod aggregate;
pub mod registry;
pub mod session_properties;

pub use aggregate::{AggregateError, AggregateSessions, HostResolver};
pub use registry::{PresenceUpdate, RegistryError, RegistryOps};
pub use session_properties::{SessionPropertyError, SessionPropertyOps};
