//! Driver for the Sensirion SGP30 indoor air quality sensor, built on the
//! [`embedded-hal`] traits, with an [`embedded-hal-async`] variant in
//! [`sgp30::asynch`].
//!
//! [`SGP30::new`] identifies the sensor, checks its feature set and starts
//! the on-chip air quality algorithm before handing out a driver, so
//! measurements can never be requested from an uninitialized device. Every
//! word read back is CRC-checked; a mismatch is reported as
//! [`Error::ChecksumMismatch`] and never retried internally.
//!
//! ```ignore
//! let mut sgp30 = SGP30::new(i2c, delay)?;
//! sgp30.set_baseline(0x8973, 0x8aae)?;
//!
//! loop {
//!     let reading = sgp30.measure_air_quality()?;
//!     println!("{reading}");
//!     delay.delay_ms(1000);
//! }
//! ```
//!
//! The word-level transaction layer is internal. Commands can only reach the
//! sensor through a driver that finished initialization:
//!
//! ```compile_fail
//! use sgp30::sensirion::Sensor;
//! ```
//!
//! ## Features
//!
//! - `log`: logs transactions using the `log` framework.
//! - `defmt`: logs transactions using `defmt`; also derives `defmt::Format`
//!   for the public types.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

#[cfg(test)]
mod debug_utils;
mod sensirion;
pub mod sgp30;

pub use sensirion::Error;
pub use sgp30::{AirQuality, Config, RawSignals, SGP30};
