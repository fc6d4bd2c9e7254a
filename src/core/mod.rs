//! Core constants, error types, and collaborator traits.
//!
//! Always compiled; the transport and client layers build on these.

pub mod constants;
mod error;
mod printable;
mod traits;

pub use error::*;
pub use printable::printable;
pub use traits::*;
