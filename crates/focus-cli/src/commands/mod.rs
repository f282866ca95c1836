pub mod analyze;
pub mod config;
pub mod helpers;
pub mod history;
pub mod host;
pub mod init;
pub mod topic;
