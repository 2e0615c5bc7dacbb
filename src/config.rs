// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::OrgId;

pub const DEFAULT_SITE_URL: &str = "https://projects.propublica.org";
pub const DEFAULT_ORGANIZATIONS_URL: &str =
    "https://projects.propublica.org/nonprofits/organizations";

/// Runtime knobs for fetching. Every field has a default, so a YAML file
/// only needs the keys it wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Base that relative filing links are resolved against.
    pub site_url: String,
    /// Index pages live at `<organizations_url>/<org_id>`.
    pub organizations_url: String,
    /// Pause after every request attempt, and again before a retry.
    pub request_delay_ms: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            organizations_url: DEFAULT_ORGANIZATIONS_URL.to_string(),
            request_delay_ms: 1000,
            max_retries: 3,
            timeout_secs: 30,
            user_agent: concat!("form990scraper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ScraperConfig {
    /// Load a (possibly partial) YAML config file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Index page listing every filing of one organization.
    pub fn organization_url(&self, org_id: &OrgId) -> String {
        format!("{}/{}", self.organizations_url.trim_end_matches('/'), org_id)
    }
}
