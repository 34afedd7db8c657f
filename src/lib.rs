//! TinyPICO kit library: board support and multiplexed input events.
//!
//! The input core is two small state machines fed by raw samples:
//! - `debounce` / `touch`: per-channel press classification (click vs long
//!   press) for the Explorer shield's capacitive pads, with face-label
//!   lookup and an activity timestamp.
//! - `port`: edge detection over 16-bit GPIO expander snapshots.
//!
//! Around it sit `embedded-hal` drivers for the parts on the TinyPICO and
//! its shields (`mcp23017`, `ads1015`, `expander`, `mpr121`, `dotstar`,
//! `battery`), buzzer `tone` descriptions, and the NDJSON event protocol
//! (`protocol`, `comm`). The library is `no_std` with no allocator and is
//! tested on the host with `cargo test`; the ESP32 firmware in `main.rs` is a thin consumer.

#![cfg_attr(not(test), no_std)]

pub mod ads1015;
pub mod battery;
pub mod board;
pub mod comm;
pub mod debounce;
pub mod dotstar;
pub mod error;
pub mod expander;
pub mod mcp23017;
pub mod mpr121;
pub mod port;
pub mod protocol;
pub mod tone;
pub mod touch;

#[cfg(test)]
mod testing;
