pub mod analyzers;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod features;
pub mod filter;
pub mod generator;
pub mod output;
pub mod parser;
pub mod record;
pub mod report;
pub mod view;
