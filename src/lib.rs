// lib.rs - penguin dataset reads and versioned model predictions
pub mod api;
pub mod common;
pub mod data;
pub mod inference;
pub mod models;

pub use api::{router, AppState};
pub use common::{PenguinCode, PenguinError, PenguinResult};
