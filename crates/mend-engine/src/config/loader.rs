use super::schema::EngineConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./mend.yaml
    /// 2. ~/.mend/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<EngineConfig, ConfigError> {
        let local_config = PathBuf::from("./mend.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".mend").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(EngineConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<EngineConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mend.yaml");
        tokio::fs::write(&path, "fast_timeout_ms: 250\nmin_candidate_score: 0.5\n")
            .await
            .unwrap();

        let config = ConfigLoader::load_from(&path).await.unwrap();
        assert_eq!(config.fast_timeout_ms, 250);
        assert!((config.min_candidate_score - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.max_heal_attempts, 2);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = ConfigLoader::load_from(Path::new("/nonexistent/mend.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
