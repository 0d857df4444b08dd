pub mod cli;
pub mod config;
pub mod error;
pub mod inspect;
pub mod probe;
pub mod report;
pub mod survey;
pub mod util;
