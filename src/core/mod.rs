//! Core proxy module

pub mod client;
pub mod config;
pub mod errors;
pub mod handler;
pub mod models;
pub mod usage;
