//! HTTP plumbing shared by every slice: application state, the `{error}` envelope,
//! request extractors and the system routes.

pub mod error;
pub mod extract;
mod health;
pub mod router;
pub mod state;

pub use error::{ApiError, ErrorBody};
pub use extract::{ApiJson, ApiQuery};
pub use health::HealthCheck;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
