use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DATA_DIR_ENV: &str = "TIMETABLE_HOME";
pub const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_EDIT_PASSWORD: &str = "closed";

/// External command that answers AI requests.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AiConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub ai: AiConfig,
    /// Shared password that unlocks editing.
    #[serde(default = "default_edit_password")]
    pub edit_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            edit_password: default_edit_password(),
        }
    }
}

fn default_edit_password() -> String {
    DEFAULT_EDIT_PASSWORD.to_string()
}

impl AppConfig {
    pub fn unlocks(&self, password: Option<&str>) -> bool {
        password == Some(self.edit_password.as_str())
    }
}

/// `$TIMETABLE_HOME`, else `~/.timetable`.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".timetable"))
}

/// Reads `config.json` from `data_dir`, writing the defaults there first if
/// the file does not exist yet.
pub fn load_or_init(data_dir: &Path) -> Result<AppConfig> {
    let path = data_dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        return serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()));
    }

    fs::create_dir_all(data_dir)?;
    let config = AppConfig::default();
    fs::write(&path, serde_json::to_string_pretty(&config)?)?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(config)
}
