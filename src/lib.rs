pub mod apply;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod matcher;
pub mod notify;
pub mod output;
pub mod status;
