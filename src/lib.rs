pub mod cli;
pub mod config;
pub mod contracts;
pub mod deploy;
pub mod error;
pub mod expect;
pub mod fork;
pub mod funding;
pub mod list_pools;
pub mod model;
pub mod suite;
