pub mod config;
pub mod parse;
pub mod policy;
pub mod simulate;
