use crate::{
    config::Config,
    error::{FailureKind, ProbeError},
    inspect,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

/// Upper bound on any probe timeout; larger values are clamped to it.
pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub url: String,
    /// Bounds connecting plus waiting for response headers, and separately
    /// each silence between body chunks. Not a deadline for the whole body.
    pub timeout: Duration,
    /// JSON field holding the records to sample, e.g. `aircraft` or `ac`.
    pub list_field: Option<String>,
}

impl ProbeRequest {
    pub fn new(url: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(timeout_seconds.min(MAX_TIMEOUT_SECONDS)),
            list_field: None,
        }
    }

    pub fn with_list_field(mut self, field: impl Into<String>) -> Self {
        self.list_field = Some(field.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ProbeResult {
    Success(ProbeSuccess),
    Failure(ProbeFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSuccess {
    pub http_status: u16,
    pub top_level_keys: Vec<String>,
    pub sample_count: usize,
    pub samples: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success(_))
    }
}

impl From<ProbeError> for ProbeResult {
    fn from(err: ProbeError) -> Self {
        ProbeResult::Failure(ProbeFailure {
            kind: err.kind(),
            message: err.to_string(),
        })
    }
}

pub trait Prober {
    fn probe(&self, req: &ProbeRequest) -> ProbeResult;
}

impl<P: Prober + ?Sized> Prober for &P {
    fn probe(&self, req: &ProbeRequest) -> ProbeResult {
        (**self).probe(req)
    }
}

/// HTTP prober that blocks the caller. Requests run on a private
/// current-thread runtime; one client is reused for every probe it runs.
pub struct HttpProber {
    runtime: Runtime,
    client: Client,
}

impl HttpProber {
    pub fn new(user_agent: &str) -> Result<Self, ProbeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ProbeError::Network(format!("starting runtime: {e}")))?;
        let client = {
            let _enter = runtime.enter();
            Client::builder()
                .user_agent(user_agent)
                .no_proxy()
                .build()
                .map_err(|e| ProbeError::Network(format!("building HTTP client: {e}")))?
        };
        Ok(Self { runtime, client })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ProbeError> {
        Self::new(&cfg.probe.user_agent)
    }

    fn fetch(&self, req: &ProbeRequest) -> Result<(u16, Vec<u8>), ProbeError> {
        let url = reqwest::Url::parse(&req.url)
            .map_err(|e| ProbeError::Network(format!("invalid URL {}: {e}", req.url)))?;
        let window = req.timeout.min(Duration::from_secs(MAX_TIMEOUT_SECONDS));
        self.runtime.block_on(fetch_body(&self.client, url, window))
    }
}

async fn fetch_body(
    client: &Client,
    url: reqwest::Url,
    window: Duration,
) -> Result<(u16, Vec<u8>), ProbeError> {
    let mut resp = match tokio::time::timeout(window, client.get(url).send()).await {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => return Err(ProbeError::from_reqwest(e, window)),
        Err(_) => return Err(ProbeError::Timeout(window)),
    };
    let status = resp.status();
    if !status.is_success() {
        return Err(ProbeError::Http(status.to_string()));
    }

    // a slow body is fine as long as it keeps moving
    let mut body = Vec::new();
    loop {
        match tokio::time::timeout(window, resp.chunk()).await {
            Ok(Ok(Some(chunk))) => body.extend_from_slice(&chunk),
            Ok(Ok(None)) => break,
            Ok(Err(e)) => return Err(ProbeError::from_reqwest(e, window)),
            Err(_) => return Err(ProbeError::Timeout(window)),
        }
    }
    Ok((status.as_u16(), body))
}

impl Prober for HttpProber {
    fn probe(&self, req: &ProbeRequest) -> ProbeResult {
        debug!(
            "probe url={} timeout={:?} list_field={:?}",
            req.url, req.timeout, req.list_field
        );
        let started = Instant::now();

        let result = match self.fetch(req) {
            Ok((status, body)) => inspect::decode_body(status, &body, req.list_field.as_deref()),
            Err(err) => err.into(),
        };

        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            ProbeResult::Success(s) => info!(
                "probe ok url={} status={} keys={} sample_count={} elapsed_ms={}",
                req.url,
                s.http_status,
                s.top_level_keys.len(),
                s.sample_count,
                elapsed_ms
            ),
            ProbeResult::Failure(f) => warn!(
                "probe failed url={} kind={:?} elapsed_ms={}: {}",
                req.url, f.kind, elapsed_ms, f.message
            ),
        }
        result
    }
}

/// Probe once with a default client. Never returns an error: every failure
/// comes back as `ProbeResult::Failure`.
pub fn probe(req: &ProbeRequest) -> ProbeResult {
    match HttpProber::from_config(&Config::default()) {
        Ok(prober) => prober.probe(req),
        Err(err) => err.into(),
    }
}
