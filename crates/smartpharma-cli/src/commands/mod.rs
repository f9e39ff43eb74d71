pub mod config;
pub mod input;
pub mod intake;
pub mod progress;
pub mod recommendations;
pub mod today;
