//! Shared utilities that glue the different domains together.
pub mod blocking;
pub mod config;
pub mod error;
pub mod log;

pub use error::{PenguinCode, PenguinError, PenguinResult};
