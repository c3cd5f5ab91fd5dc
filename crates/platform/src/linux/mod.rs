//! Linux implementations backed by sysfs.

mod power;

pub use power::EnergyDomainReader;
