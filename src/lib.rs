pub mod batch;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod errors;
pub mod insertion;
pub mod ledger;
pub mod lock;
pub mod logging;
pub mod oracle;
pub mod report;
pub mod variants;
