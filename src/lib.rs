pub mod config;
pub mod dataset;
pub mod fake_source;
pub mod features;
pub mod http_client;
pub mod logging;
pub mod persist;
pub mod players;
pub mod predict;
pub mod prompt;
pub mod regression;
pub mod report_export;
pub mod runner;
pub mod source;
pub mod stats_page;
