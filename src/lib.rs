pub mod app;
pub mod client;
pub mod clipboard;
mod config;
pub mod download;
pub mod error;
pub mod intake;
pub mod ledger;
pub mod logging;
pub mod naming;
pub mod validate;
pub mod workflow;

pub use app::StickerSession;
pub use error::{AppError, AppResult};
