pub mod config;
pub mod fetch;
pub mod output;
pub mod process;
pub mod run;
