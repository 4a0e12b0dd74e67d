//! # brightr library
//!
//! Internal library for the brightr binary.
//!
//! brightr keeps a laptop display on a day/night brightness schedule. Once a
//! minute (or on demand via SIGUSR1) it decides whether the current moment
//! belongs to the Day or Night period and idempotently applies the matching
//! backlight percentage.
//!
//! ## Architecture
//!
//! - **Core Logic**: `core` module owns the scheduling engine, the pure
//!   period evaluator, and the idempotent brightness applier
//! - **Location**: `geo` module resolves coordinates through a fallback chain
//!   (IP geolocation → cached location → city geocoding)
//! - **Sun Times**: `sun` module fetches and caches sunrise/sunset instants
//! - **Backends**: `backend` module abstracts the platform brightness
//!   primitive (Linux sysfs backlight in production)
//! - **Configuration**: `config` module for TOML-based settings with
//!   defaults-on-failure loading
//! - **Infrastructure**: signal handling, notifications, logging

// Import macros from the logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod backend;
pub mod config;
pub mod core;
pub mod geo;
pub mod io;
pub mod sun;

// Re-export the main entry points for the binary
pub use crate::core::{Engine, EngineParams, Trigger};
