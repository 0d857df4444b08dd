use crate::{
    config::{Config, Endpoint},
    probe::{ProbeRequest, ProbeResult, Prober},
    util::now_rfc3339,
};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyReport {
    pub started: String,
    pub finished: String,
    pub entries: Vec<SurveyEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyEntry {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub result: ProbeResult,
}

impl SurveyReport {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| !e.result.is_success()).count()
    }
}

/// Probes endpoints one after another, pausing between them.
pub struct Survey<P: Prober> {
    prober: P,
    timeout_seconds: u64,
    pause: Duration,
}

impl<P: Prober> Survey<P> {
    pub fn new(cfg: &Config, prober: P) -> Self {
        Self {
            prober,
            timeout_seconds: cfg.probe.timeout_seconds,
            pause: Duration::from_millis(cfg.survey.pause_millis),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn run(&self, endpoints: &[Endpoint]) -> SurveyReport {
        let started = now_rfc3339();
        let mut entries = Vec::with_capacity(endpoints.len());

        for (i, ep) in endpoints.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                debug!("pausing {:?} before {}", self.pause, ep.name);
                std::thread::sleep(self.pause);
            }

            info!("survey {}/{} {}", i + 1, endpoints.len(), ep.name);
            let mut req = ProbeRequest::new(&ep.url, self.timeout_seconds);
            req.list_field = ep.list_field.clone();

            entries.push(SurveyEntry {
                name: ep.name.clone(),
                url: ep.url.clone(),
                list_field: ep.list_field.clone(),
                note: ep.note.clone(),
                result: self.prober.probe(&req),
            });
        }

        SurveyReport {
            started,
            finished: now_rfc3339(),
            entries,
        }
    }
}

/// Keep only the named endpoints, in configured order. No names keeps all.
pub fn select(endpoints: &[Endpoint], only: &[String]) -> Result<Vec<Endpoint>> {
    if only.is_empty() {
        return Ok(endpoints.to_vec());
    }

    for name in only {
        if !endpoints.iter().any(|e| &e.name == name) {
            let known: Vec<&str> = endpoints.iter().map(|e| e.name.as_str()).collect();
            return Err(anyhow!(
                "unknown endpoint: {name} (configured: {})",
                known.join(", ")
            ));
        }
    }

    Ok(endpoints
        .iter()
        .filter(|e| only.contains(&e.name))
        .cloned()
        .collect())
}
