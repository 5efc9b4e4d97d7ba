pub mod config;
pub mod dashboard;
pub mod projects;
pub mod report;
pub mod settings;
pub mod stages;
pub mod tasks;
pub mod users;
