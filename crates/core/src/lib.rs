pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod iso20022;
pub mod stats;
pub mod view;

pub use config::Config;
pub use error::*;
