use log::debug;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_path")]
    pub logs_dir: PathBuf,
    /// Where temporary clones are created. Falls back to the working directory.
    #[serde(default, deserialize_with = "deserialize_optional_path")]
    pub temp_dir: Option<PathBuf>,
}

fn deserialize_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(expand_tilde(&s))
}

fn deserialize_optional_path<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| expand_tilde(&s)))
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        home_dir().join(stripped)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = dirs::config_dir().map(|p| p.join("unpackr").join("config.yaml"));

        if let Some(ref path) = config_path
            && path.exists()
            && let Ok(contents) = std::fs::read_to_string(path)
            && let Ok(config) = serde_yml::from_str::<Config>(&contents)
        {
            debug!("config: loaded from {}", path.display());
            return config;
        }

        debug!("config: using defaults (no config file found at {:?})", config_path);
        Self::default()
    }

    /// Directory temporary clones are created in.
    pub fn clone_root(&self) -> std::io::Result<PathBuf> {
        match &self.temp_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs_dir: home_dir().join(".unpackr").join("logs"),
            temp_dir: None,
        }
    }
}
