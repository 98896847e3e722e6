//! Interactivity for the Madoven Bakery site: mobile menu, in-page
//! navigation, back-to-top control, email copy with a legacy fallback, focus
//! rings and lazy image tracking.
//!
//! Everything except `frontend` is target independent and drives the page
//! through small view traits, so the state logic runs under `cargo test`
//! without a browser.

pub mod anchor;
pub mod clipboard;
pub mod config;
pub mod focus;
pub mod lazy;
pub mod log;
pub mod menu;
pub mod scroll;
pub mod throttle;
pub mod timer;

#[cfg(target_arch = "wasm32")]
pub mod frontend;
