//! Tradebot - Account-session orchestration for a trading platform bot
//!
//! This crate manages the login lifecycle of a platform account, defers
//! operations issued before login until the session exists, and re-emits
//! the platform clients' notifications on one outward event surface.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
