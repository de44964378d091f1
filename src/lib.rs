//! Grand Exchange flipping analysis: scores monitored items from their recent
//! price history and ranks the ones worth buying now to resell.

pub mod config;
pub mod error;
pub mod filter;
pub mod flips;
pub mod loader;
pub mod model;
pub mod monitor;
pub mod report;
pub mod stats;
pub mod summary;

pub use filter::filter_opportunities;
pub use flips::{find_opportunities, find_opportunities_now};
pub use summary::summarize;
