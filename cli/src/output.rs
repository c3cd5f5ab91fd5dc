use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use wattprobe_platform::{DomainKind, DomainPower};

#[derive(Debug, Serialize)]
pub struct SampleRecord<'a> {
    pub timestamp: String,
    pub total_watts: f64,
    pub domains: &'a [DomainPower],
}

impl<'a> SampleRecord<'a> {
    pub fn new(taken_at: DateTime<Utc>, domains: &'a [DomainPower]) -> Self {
        Self {
            timestamp: taken_at.to_rfc3339(),
            total_watts: domains.iter().fold(0.0, |total, d| total + d.watts),
            domains,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let width = self
            .domains
            .iter()
            .map(|d| d.identifier.len())
            .max()
            .unwrap_or(0);

        let _ = writeln!(out, "{}", self.timestamp);
        for domain in self.domains {
            let label = match DomainKind::from_name(&domain.name) {
                DomainKind::Unknown if domain.name.is_empty() => "-".to_string(),
                DomainKind::Unknown => domain.name.clone(),
                kind => format!("{} ({})", kind, domain.name),
            };
            let _ = writeln!(
                out,
                "  {:<width$}  {:>8.2} W  {}",
                domain.identifier,
                domain.watts,
                label,
                width = width
            );
        }
        let _ = write!(
            out,
            "  {:<width$}  {:>8.2} W",
            "total",
            self.total_watts,
            width = width
        );
        out
    }
}
