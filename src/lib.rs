mod calendar;
mod commands;
mod config;
mod display;
mod error;
mod handlers;
mod period;
mod presets;
mod quran;
mod scheduler;
mod state;
mod storage;
mod types;

pub use calendar::*;
pub use commands::*;
pub use config::*;
pub use display::*;
pub use error::*;
pub use handlers::*;
pub use period::*;
pub use presets::*;
pub use quran::*;
pub use scheduler::*;
pub use state::*;
pub use storage::*;
pub use types::*;
