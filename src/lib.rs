pub mod bot;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod objective;
pub mod world;
