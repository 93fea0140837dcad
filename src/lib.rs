//! Arena game server library
//!
//! Authoritative simulation and session gateway for a top-down multiplayer
//! shooter: one world task owns all player/projectile state, advances it at
//! 60 ticks per second, and broadcasts deltas to every connected client.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
pub mod ws;
