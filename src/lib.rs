//! Dragon Arena - authoritative simulation for multiplayer dragon battles
//!
//! - `game`: player flight/energy/breath state machine and the arena tick loop
//! - `ws`: wire protocol and WebSocket sessions
//! - `http`: health and arena routes

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
pub mod ws;
