pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod server;
