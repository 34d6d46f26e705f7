use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// On-disk record of one sealed secret.
///
/// `created` is absent in files written before it was introduced; those
/// still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyFile {
    enc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<String>,
}

impl KeyFile {
    pub fn new(enc: String) -> Self {
        Self {
            enc,
            created: Some(Utc::now().to_rfc3339()),
        }
    }

    /// The envelope text.
    pub fn enc(&self) -> &str {
        &self.enc
    }

    pub fn created(&self) -> Option<&str> {
        self.created.as_deref()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).context("failed to serialize key file")
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).context("key file is not valid JSON")
    }
}
