use crate::probe::MAX_TIMEOUT_SECONDS;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: Probe,
    #[serde(default)]
    pub survey: Survey,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        cfg.validate()
            .with_context(|| format!("invalid config: {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let t = self.probe.timeout_seconds;
        if t == 0 || t > MAX_TIMEOUT_SECONDS {
            bail!("probe.timeout_seconds must be between 1 and {MAX_TIMEOUT_SECONDS}, got {t}");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Probe {
    pub timeout_seconds: u64,
    pub user_agent: String,
}
impl Default for Probe {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: concat!("adsb-probe/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Survey {
    /// Delay between consecutive probes, to go easy on shared public feeds.
    pub pause_millis: u64,
    pub endpoints: Vec<Endpoint>,
}
impl Default for Survey {
    fn default() -> Self {
        Self {
            pause_millis: 1000,
            endpoints: default_endpoints(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint {
            name: "adsb.lol".into(),
            url: "https://adsb.lol/data/aircraft.json".into(),
            list_field: Some("aircraft".into()),
            note: Some("tar1090-style feed; no route info".into()),
        },
        Endpoint {
            name: "opensky".into(),
            url: "https://opensky-network.org/api/states/all?lamin=38.0&lomin=-77.5&lamax=39.5&lomax=-76.0"
                .into(),
            list_field: Some("states".into()),
            note: Some("CORS enabled, no route info in the state vectors".into()),
        },
        Endpoint {
            name: "adsbexchange".into(),
            url: "https://adsbexchange.com/api/aircraft/json/lat/38.9/lon/-77.0/dist/25/".into(),
            list_field: Some("ac".into()),
            note: None,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub format: Format,
    /// Sample fields that indicate a feed carries origin/destination data.
    pub route_fields: Vec<String>,
}
impl Default for Report {
    fn default() -> Self {
        Self {
            format: Format::Text,
            route_fields: vec!["from".into(), "to".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
