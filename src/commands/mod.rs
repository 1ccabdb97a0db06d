pub mod config;
pub mod edit;
pub mod export;
pub mod ingest;
pub mod list;
pub mod reset;
pub mod resolve;
pub mod run;
pub mod steps;

pub mod utils;
