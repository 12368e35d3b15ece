//! Application core: domain orchestration behind port traits.
//!
//! This module contains the per-tick control loop for both rooms:
//! input acquisition, fallback policy, decisions, actuation ordering and
//! history logging.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod inputs;
pub mod ports;
pub mod service;
