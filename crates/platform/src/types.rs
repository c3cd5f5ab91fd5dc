//! Shared types for energy domain discovery and power sampling.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Kind of hardware a domain accounts for, derived from its `name` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    /// A whole CPU socket (`package-N`)
    Package,
    /// CPU cores of a package
    Core,
    /// Integrated graphics and other uncore parts
    Uncore,
    /// Memory attached to a package
    Dram,
    /// Platform-wide pseudo-domain that double-counts the others
    Psys,
    /// Label not recognised
    #[default]
    Unknown,
}

impl DomainKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "core" => DomainKind::Core,
            "uncore" => DomainKind::Uncore,
            "dram" => DomainKind::Dram,
            "psys" => DomainKind::Psys,
            n if n.starts_with("package") => DomainKind::Package,
            _ => DomainKind::Unknown,
        }
    }

    /// Returns a human-readable label for the domain kind.
    pub fn label(&self) -> &'static str {
        match self {
            DomainKind::Package => "Package",
            DomainKind::Core => "Core",
            DomainKind::Uncore => "Uncore",
            DomainKind::Dram => "DRAM",
            DomainKind::Psys => "Platform",
            DomainKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One energy domain found under the powercap root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnergyDomain {
    /// Directory name, e.g. `intel-rapl:0`.
    pub identifier: String,
    /// Absolute path of the domain directory.
    pub path: PathBuf,
    /// Contents of the `name` file, empty if it could not be read.
    pub name: String,
    /// Sub-domain directories (`intel-rapl:0:0`, ...) present at discovery.
    ///
    /// Informational only: sampling lists the directory again when the
    /// domain has no counter of its own, so parts added later are counted.
    pub sub_parts: Vec<String>,
}

impl EnergyDomain {
    pub fn kind(&self) -> DomainKind {
        DomainKind::from_name(&self.name)
    }
}

/// Average power of one domain over a measurement window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainPower {
    pub identifier: String,
    pub name: String,
    pub watts: f64,
}

/// Matches powercap zone names of the form `<prefix>:<N>` and
/// `<prefix>:<N>:<M>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPattern {
    prefix: String,
}

impl DomainPattern {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Index of a top-level domain, `None` if `name` is not `<prefix>:<N>`.
    pub fn domain_index(&self, name: &str) -> Option<u32> {
        match self.indices(name)?.as_slice() {
            [index] => Some(*index),
            _ => None,
        }
    }

    /// Indices of a sub-domain, `None` if `name` is not `<prefix>:<N>:<M>`.
    pub fn sub_domain_index(&self, name: &str) -> Option<(u32, u32)> {
        match self.indices(name)?.as_slice() {
            [domain, part] => Some((*domain, *part)),
            _ => None,
        }
    }

    fn indices(&self, name: &str) -> Option<Vec<u32>> {
        let rest = name.strip_prefix(self.prefix.as_str())?.strip_prefix(':')?;
        rest.split(':')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse().ok()
            })
            .collect()
    }
}
