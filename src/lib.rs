//! RoomVent library.
//!
//! Window ventilation control for two rooms: the doctor's office
//! (temperature only) and the computer room (temperature and CO2).
//! Exposes the pure-logic modules and the host adapters for the binary
//! and for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod history;
pub mod pins;
pub mod scheduler;
pub mod sensors;
