//! AT86RF215 no-std driver and PRIME PLC/RF platform abstraction layer for
//! interrupt driven embedded `Rust`.
//!
//! The crate is split in layers:
//!   - HAL : Non blocking SPI transfer queue with interrupt gating.
//!   - Driver : RF215 transceivers, TX scheduling, RX and PIB access.
//!   - PAL : Routes the MAC requests to the PLC or RF medium by channel.
//!   - Sniffer : Mirrors every frame to a serial sink.
//!
//! Interrupt handlers call the entry points of the driver (or the PAL); the
//! `control-loop` feature provides an async loop doing the same from an
//! executor.



#![cfg_attr(not(test), no_std)]



pub mod common;
pub mod driver;
pub mod hal;
pub mod pal;
pub mod sniffer;
pub mod time;



mod config;
mod error;
mod shared;
mod state;

#[cfg(feature = "control-loop")]
mod control;

#[cfg(test)]
mod testing;



pub use config::*;

pub use error::*;

pub use shared::*;

pub use state::*;

pub use driver::{Rf215Driver, Rf215Listener};

pub use pal::{Pal, PalListener};

#[cfg(feature = "control-loop")]
pub use control::*;
