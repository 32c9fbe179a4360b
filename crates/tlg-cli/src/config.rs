use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tlg_ingest::IngestConfig;
use tlg_store::StoreConfig;
use tracing::debug;

/// Name of the config file looked up in the ledger root.
pub const CONFIG_FILE: &str = "ledger.toml";

/// Contents of `ledger.toml`. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub store: StoreConfig,
    pub ingest: IngestConfig,
}

impl LedgerConfig {
    /// Load from `explicit`, or from `<root>/ledger.toml` when present.
    /// An explicit path must exist; the default one may be missing.
    pub fn load(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = root.join(CONFIG_FILE);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
