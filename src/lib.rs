pub mod analyze;
pub mod changes;
pub mod cli;
pub mod config;
pub mod error;
pub mod golist;
pub mod impact;
pub mod model;
pub mod util;
