mod commands;
pub mod config;
pub mod console;
pub mod errors;
pub mod fsystem;
mod handlers;
pub mod save;
pub mod virus;
pub mod world;

pub use config::GameConfig;
pub use console::{Console, GameStatus, Mode};
