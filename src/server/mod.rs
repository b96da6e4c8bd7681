//! Local HTTP server

pub mod api;
