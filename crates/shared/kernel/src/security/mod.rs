//! Who is calling, and which records they may name.

pub mod principal;
pub mod resource;
#[cfg(feature = "server")]
pub mod token;

pub use principal::Principal;
pub use resource::{ResourceGuard, ResourceGuardError};
#[cfg(feature = "server")]
pub use token::{TokenError, TokenVerifier};
