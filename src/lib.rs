pub mod analytics;
pub mod config;
pub mod loader;
pub mod quality;
pub mod record;
pub mod report;
