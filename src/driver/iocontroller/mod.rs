//! io controller driver
//! one controller on a half duplex serial line, ascii command set,
//! selected by address byte and polled for readiness before each command

pub mod prelude;
pub mod traits;
pub mod entity;
pub mod codec;
pub mod transport;
pub mod dummy;
pub mod session;

#[cfg(test)]
mod mock;

pub use session::{IoController, Timing};
