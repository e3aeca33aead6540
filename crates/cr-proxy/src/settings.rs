use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

const PLACEHOLDER_KEY: &str = "YOUR_CLASH_ROYALE_API_KEY_HERE";

#[serde_as]
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Settings {
    pub api_key: Option<String>,
    pub api_key_file: Option<PathBuf>,
    pub base_url: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub request_timeout: Duration,
    pub listen_addr: SocketAddr,
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_file: None,
            base_url: cr_api::DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5050)),
            cors_origins: [
                "http://localhost:5173",
                "http://127.0.0.1:5173",
                "http://localhost:3000",
                "http://127.0.0.1:3000",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .field("api_key_file", &self.api_key_file)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("listen_addr", &self.listen_addr)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl Settings {
    pub fn figment(config: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Json::file(config))
            .merge(Env::prefixed("CR_"))
    }

    pub fn load(config: &Path) -> Result<Self> {
        Self::figment(config)
            .extract()
            .with_context(|| format!("Failed to load settings from {}", config.display()))
    }

    pub fn api_key(&self) -> Result<String> {
        let key = match (&self.api_key, &self.api_key_file) {
            (Some(key), _) => key.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read API key from {}", path.display()))?,
            (None, None) => {
                bail!("No API key configured. Set CR_API_KEY or api_key in the config file")
            }
        };
        let key = key.trim();
        if key.is_empty() || key == PLACEHOLDER_KEY {
            bail!(
                "API key not configured. Replace the placeholder with a real Clash Royale API key"
            );
        }
        Ok(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_jail| {
            let settings: Settings = Settings::figment(Path::new("missing.json")).extract()?;
            assert_eq!(settings.listen_addr.port(), 5050);
            assert_eq!(settings.request_timeout, Duration::from_secs(30));
            assert_eq!(settings.cors_origins.len(), 4);
            assert!(settings.api_key().is_err());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.json",
                r#"{"api_key": "from-file", "request_timeout": 3, "cors_origins": []}"#,
            )?;
            jail.set_env("CR_API_KEY", "from-env");
            jail.set_env("CR_LISTEN_ADDR", "127.0.0.1:8080");

            let settings: Settings = Settings::figment(Path::new("config.json")).extract()?;
            assert_eq!(settings.api_key().unwrap(), "from-env");
            assert_eq!(settings.request_timeout, Duration::from_secs(3));
            assert_eq!(settings.listen_addr, "127.0.0.1:8080".parse().unwrap());
            assert!(settings.cors_origins.is_empty());
            Ok(())
        });
    }

    #[test]
    fn reads_key_file_and_rejects_placeholder() {
        Jail::expect_with(|jail| {
            jail.create_file("key.txt", "  file-key\n")?;
            jail.create_file("config.json", r#"{"api_key_file": "key.txt"}"#)?;
            let settings: Settings = Settings::figment(Path::new("config.json")).extract()?;
            assert_eq!(settings.api_key().unwrap(), "file-key");

            jail.set_env("CR_API_KEY", PLACEHOLDER_KEY);
            let settings: Settings = Settings::figment(Path::new("config.json")).extract()?;
            assert!(settings.api_key().is_err());
            Ok(())
        });
    }

    #[test]
    fn debug_hides_key() {
        let settings = Settings {
            api_key: Some("hunter2".into()),
            ..Settings::default()
        };
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
