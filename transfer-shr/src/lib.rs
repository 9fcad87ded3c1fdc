//! Cross-cutting helpers used by more than one component of the transfer
//! engine, in the spirit of the workspace's own `*-shr` crate: small,
//! dependency-light utilities that don't belong to any one component's
//! public API.

pub mod errors;
pub mod redact;

pub use errors::ErrorTrace;
pub use redact::redact;
