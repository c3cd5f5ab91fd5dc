//! Energy domain discovery and power sampling for wattprobe.
//!
//! This crate provides the [`PowerBackend`] trait shared by hardware
//! measurement backends, and a Linux implementation that reads the
//! cumulative energy counters of the powercap (RAPL) interface.
//!
//! # Example
//!
//! ```no_run
//! use wattprobe_platform::{PowerBackend, ReaderConfig};
//!
//! # #[cfg(target_os = "linux")]
//! # fn main() -> wattprobe_platform::Result<()> {
//! use wattprobe_platform::linux::EnergyDomainReader;
//!
//! let mut reader = EnergyDomainReader::new(ReaderConfig::default());
//! if reader.is_available() {
//!     reader.initialize()?;
//!     // Blocks for the one second measurement window.
//!     for (device, watts) in reader.devices().iter().zip(reader.sample_power()?) {
//!         println!("{}: {:.2} W", device, watts);
//!     }
//!     reader.shutdown()?;
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(target_os = "linux"))]
//! # fn main() {}
//! ```

mod config;
mod error;
mod power;
mod types;

pub use config::{ReaderConfig, DEFAULT_MEASURE_DELAY_MS, DEFAULT_PREFIX, DEFAULT_ROOT};
pub use error::{Error, Result};
pub use power::{compute_power, PowerBackend, Sleeper, ThreadSleeper};
pub use types::{DomainKind, DomainPattern, DomainPower, EnergyDomain};

#[cfg(target_os = "linux")]
pub mod linux;
