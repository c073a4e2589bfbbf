//! blockcoach library crate
//!
//! Exposes the coaching core so the terminal shell, tests and other front
//! ends can drive a session without going through CLI startup.

pub mod app;
pub mod coach;
pub mod config;
pub mod keyring;
