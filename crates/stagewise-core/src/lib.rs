pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod paths;
pub mod progress;
pub mod project;
pub mod report;
pub mod resources;
pub mod settings;
pub mod store;
pub mod task;
pub mod timeline;
pub mod types;
pub mod user;

pub use error::{Result, StagewiseError};
