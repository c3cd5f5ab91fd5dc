//! Reader configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root of the Linux powercap interface.
pub const DEFAULT_ROOT: &str = "/sys/class/powercap";

/// Name prefix shared by the RAPL zones under the powercap root.
pub const DEFAULT_PREFIX: &str = "intel-rapl";

/// Length of the window between the two energy readings of a sample.
pub const DEFAULT_MEASURE_DELAY_MS: u64 = 1000;

/// Where to find the energy counters and how long to measure.
///
/// Missing fields fall back to the platform defaults, so an empty TOML table
/// deserializes to [`ReaderConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub root: PathBuf,
    pub prefix: String,
    pub measure_delay_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            prefix: DEFAULT_PREFIX.to_string(),
            measure_delay_ms: DEFAULT_MEASURE_DELAY_MS,
        }
    }
}

impl ReaderConfig {
    /// The measurement window. A zero window yields non-finite power values.
    pub fn measure_delay(&self) -> Duration {
        Duration::from_millis(self.measure_delay_ms)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the measurement window, stored in whole milliseconds.
    ///
    /// Sub-millisecond precision is dropped and windows longer than
    /// `u64::MAX` milliseconds saturate.
    pub fn with_measure_delay(mut self, delay: Duration) -> Self {
        self.measure_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
