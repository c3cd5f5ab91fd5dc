use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::power::{compute_power, PowerBackend, Sleeper, ThreadSleeper};
use crate::types::{DomainKind, DomainPattern, DomainPower, EnergyDomain};

const ENERGY_FILE: &str = "energy_uj";
const NAME_FILE: &str = "name";

/// Samples per-domain power from the powercap energy counters.
///
/// Each sample takes two counter readings `measure_delay` apart and blocks
/// the calling thread in between. Callers that cannot stall should run
/// [`sample_power`](PowerBackend::sample_power) on a worker thread.
pub struct EnergyDomainReader<S = ThreadSleeper> {
    root: PathBuf,
    pattern: DomainPattern,
    measure_delay: Duration,
    domains: Vec<EnergyDomain>,
    sleeper: S,
}

impl EnergyDomainReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self::with_sleeper(config, ThreadSleeper)
    }
}

impl Default for EnergyDomainReader {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

impl<S: Sleeper> EnergyDomainReader<S> {
    pub fn with_sleeper(config: ReaderConfig, sleeper: S) -> Self {
        Self {
            measure_delay: config.measure_delay(),
            pattern: DomainPattern::new(config.prefix),
            root: config.root,
            domains: Vec::new(),
            sleeper,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn measure_delay(&self) -> Duration {
        self.measure_delay
    }

    /// Domains found by the last [`initialize`](PowerBackend::initialize).
    pub fn domains(&self) -> &[EnergyDomain] {
        &self.domains
    }

    /// Like [`sample_power`](PowerBackend::sample_power), with each value
    /// labelled by its domain.
    pub fn sample_domains(&mut self) -> Result<Vec<DomainPower>> {
        let watts = self.measure()?;
        Ok(self
            .domains
            .iter()
            .zip(watts)
            .map(|(domain, watts)| DomainPower {
                identifier: domain.identifier.clone(),
                name: domain.name.clone(),
                watts,
            })
            .collect())
    }

    fn measure(&self) -> Result<Vec<f64>> {
        let before = self.read_all()?;
        self.sleeper.sleep(self.measure_delay);
        let after = self.read_all()?;

        Ok(self
            .domains
            .iter()
            .zip(before.into_iter().zip(after))
            .map(|(domain, (before, after))| {
                if after < before {
                    debug!(
                        domain = %domain.identifier,
                        before,
                        after,
                        "Energy counter went backwards, reporting negative power"
                    );
                }
                compute_power(before, after, self.measure_delay)
            })
            .collect())
    }

    fn read_all(&self) -> Result<Vec<u64>> {
        self.domains
            .iter()
            .map(|domain| self.read_energy(domain))
            .collect()
    }

    fn read_energy(&self, domain: &EnergyDomain) -> Result<u64> {
        let counter = domain.path.join(ENERGY_FILE);
        let has_counter = counter
            .try_exists()
            .map_err(Error::read(counter.as_path()))?;

        let energy_uj = if has_counter {
            read_counter(&counter)?
        } else {
            let parts = sub_parts(&domain.path, &self.pattern)?;
            debug!(
                domain = %domain.identifier,
                parts = parts.len(),
                "No domain counter, summing sub-domains"
            );
            parts.iter().try_fold(0u64, |total, part| {
                let energy_uj = read_counter(&domain.path.join(part).join(ENERGY_FILE))?;
                total.checked_add(energy_uj).ok_or_else(|| Error::Overflow {
                    path: domain.path.clone(),
                })
            })?
        };

        trace!(domain = %domain.identifier, energy_uj, "Read energy counter");
        Ok(energy_uj)
    }

    fn discover(&self) -> Vec<EnergyDomain> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "Energy root not readable");
                return Vec::new();
            }
        };

        let mut candidates: Vec<(u32, String)> = entries
            .flatten()
            .filter_map(|entry| {
                let identifier = entry.file_name().into_string().ok()?;
                let index = self.pattern.domain_index(&identifier)?;
                Some((index, identifier))
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .filter_map(|(_, identifier)| {
                let path = self.root.join(&identifier);
                let name = fs::read_to_string(path.join(NAME_FILE))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();

                if DomainKind::from_name(&name) == DomainKind::Psys {
                    debug!(domain = %identifier, "Skipping platform-wide psys domain");
                    return None;
                }

                let sub_parts = sub_parts(&path, &self.pattern).unwrap_or_default();
                debug!(
                    domain = %identifier,
                    name = %name,
                    sub_parts = sub_parts.len(),
                    "Discovered energy domain"
                );

                Some(EnergyDomain {
                    identifier,
                    path,
                    name,
                    sub_parts,
                })
            })
            .collect()
    }
}

impl<S: Sleeper> PowerBackend for EnergyDomainReader<S> {
    fn name(&self) -> &'static str {
        "powercap"
    }

    fn is_available(&self) -> bool {
        fs::read_dir(&self.root)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    fn initialize(&mut self) -> Result<()> {
        self.domains = self.discover();
        Ok(())
    }

    fn devices(&self) -> Vec<String> {
        self.domains
            .iter()
            .map(|domain| domain.identifier.clone())
            .collect()
    }

    fn sample_power(&mut self) -> Result<Vec<f64>> {
        self.measure()
    }
}

fn read_counter(path: &Path) -> Result<u64> {
    let content = fs::read_to_string(path).map_err(Error::read(path))?;
    let content = content.trim();
    content.parse().map_err(|_| Error::Parse {
        path: path.to_path_buf(),
        content: content.to_string(),
    })
}

fn sub_parts(dir: &Path, pattern: &DomainPattern) -> Result<Vec<String>> {
    let mut parts: Vec<((u32, u32), String)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(Error::read(dir))? {
        let entry = entry.map_err(Error::read(dir))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if let Some(index) = pattern.sub_domain_index(&name) {
            parts.push((index, name));
        }
    }
    parts.sort();
    Ok(parts.into_iter().map(|(_, name)| name).collect())
}
