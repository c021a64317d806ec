pub mod audit;
pub mod config;
pub mod contestant;
pub mod error;
pub mod queue;
pub mod ranking;
pub mod scoreboard;
pub mod selection;
pub mod timer;
