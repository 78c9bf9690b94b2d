pub mod api;
pub mod config;
pub mod error;
pub mod session;
mod main_lib;
mod scheduler;

pub use main_lib::{build_state, init_tracing, AppState};
