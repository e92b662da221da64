//! Core system components of the paddle node
pub mod config;
pub mod event;
pub mod resources;
pub mod session;
pub mod state;
