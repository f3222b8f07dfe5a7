pub mod common;
pub mod driver;

pub use common::error::{DriverError, ErrorCode};
pub use driver::iocontroller::{IoController, Timing};
