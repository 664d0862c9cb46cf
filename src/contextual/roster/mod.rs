pub mod api;
pub mod config;
pub mod error;
pub mod execute;
pub mod io;
pub mod model;
pub mod plan;
pub mod prompt;
pub mod report;
pub mod sync;

pub use error::{Result, ToolError};
