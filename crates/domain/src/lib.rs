//! xsession domain types.
//!
//! - `property` - the variant-typed attribute record codec
//! - `ids` - hex identifiers for titles, sessions and players
//! - `session` - the session aggregate and directory players
//! - `report` - the aggregated status report

pub mod error;
pub mod ids;
pub mod property;
pub mod report;
pub mod session;

pub use error::{DomainError, PropertyError};
pub use ids::{SessionId, TitleId, Xuid};
pub use property::{keys, Property, PropertyDataType, PropertyValue};
pub use report::{ReportMetadata, SessionReport, SessionSummary, TitleGroup};
pub use session::{Player, Session, SessionContext};
