//! Configuration management for pairlink.

use anyhow::{Context, Result};
use pairlink_client::Pairing;
use pairlink_core::{PairingRole, PairingSecret};
use pairlink_relay::Config;
use pairlink_types::PushEndpoint;
use serde::{Deserialize, Serialize};
use std::path::Path;

const PAIRING_FILE: &str = "pairing.json";
const DEFAULT_DATABASE: &str = "queues.db";

/// Pairing state stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Role of this device ("initiator" or "responder").
    pub role: String,
    /// Hex-encoded shared pairing secret.
    pub secret_hex: String,
    /// Registered push endpoint, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_endpoint: Option<String>,
    /// When the pairing was created.
    pub created_at: u64,
}

impl PairingConfig {
    /// Create a new pairing configuration.
    pub fn new(role: PairingRole, secret: &PairingSecret) -> Self {
        Self {
            role: role.to_string(),
            secret_hex: secret.to_hex(),
            push_endpoint: None,
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Build the runtime pairing context.
    pub fn to_pairing(&self) -> Result<Pairing> {
        let role: PairingRole = self.role.parse().context("Invalid role in pairing file")?;
        let secret =
            PairingSecret::from_hex(&self.secret_hex).context("Invalid secret in pairing file")?;
        let pairing = Pairing::new(&secret, role).context("Failed to derive pairing")?;

        if let Some(handle) = &self.push_endpoint {
            pairing.set_push_endpoint(Some(
                PushEndpoint::new(handle.as_str()).context("Invalid push endpoint")?,
            ));
        }
        Ok(pairing)
    }

    /// Load pairing configuration from a directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(PAIRING_FILE);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Not paired. Run 'pairlink init' first.")?;
        serde_json::from_str(&contents).context("Invalid pairing configuration")
    }

    /// Save pairing configuration to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(PAIRING_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save pairing configuration")?;
        set_file_permissions_0600(&path).await?;
        Ok(())
    }

    /// Check if a pairing exists.
    pub async fn exists(data_dir: &Path) -> bool {
        tokio::fs::try_exists(data_dir.join(PAIRING_FILE))
            .await
            .unwrap_or(false)
    }
}

/// Load the relay configuration.
///
/// Without a file, defaults apply with the database under `data_dir`.
/// A relative database path in a file is resolved against `data_dir`.
pub fn load_relay_config(data_dir: &Path, path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => {
            let mut config = Config::default();
            config.storage.database = DEFAULT_DATABASE.into();
            config
        }
    };

    if config.storage.database.is_relative() {
        config.storage.database = data_dir.join(&config.storage.database);
    }
    Ok(config)
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairlink_client::PairingContext;
    use tempfile::tempdir;

    #[tokio::test]
    async fn pairing_config_roundtrip() {
        let dir = tempdir().unwrap();
        let secret = PairingSecret::generate().unwrap();
        let mut config = PairingConfig::new(PairingRole::Responder, &secret);
        config.push_endpoint = Some("http://127.0.0.1:9/hook".into());
        config.save(dir.path()).await.unwrap();

        assert!(PairingConfig::exists(dir.path()).await);
        let loaded = PairingConfig::load(dir.path()).await.unwrap();
        assert_eq!(loaded.role, "responder");
        assert_eq!(loaded.secret_hex, secret.to_hex());

        let pairing = loaded.to_pairing().unwrap();
        assert_eq!(pairing.role(), PairingRole::Responder);
        assert_eq!(
            pairing.push_endpoint().unwrap().as_str(),
            "http://127.0.0.1:9/hook"
        );
    }

    #[tokio::test]
    async fn missing_pairing_mentions_init() {
        let dir = tempdir().unwrap();
        let err = PairingConfig::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("pairlink init"));
    }

    #[test]
    fn corrupted_secret_is_rejected() {
        let secret = PairingSecret::generate().unwrap();
        let mut config = PairingConfig::new(PairingRole::Initiator, &secret);
        config.secret_hex = "zz".into();
        assert!(config.to_pairing().is_err());
    }

    #[test]
    fn default_relay_config_lives_in_data_dir() {
        let dir = tempdir().unwrap();
        let config = load_relay_config(dir.path(), None).unwrap();
        assert_eq!(config.storage.database, dir.path().join("queues.db"));
    }

    #[test]
    fn relative_database_in_file_resolves_against_data_dir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("relay.toml");
        std::fs::write(&file, "[storage]\ndatabase = \"shared.db\"\n").unwrap();

        let config = load_relay_config(dir.path(), Some(&file)).unwrap();
        assert_eq!(config.storage.database, dir.path().join("shared.db"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pairing_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let secret = PairingSecret::generate().unwrap();
        PairingConfig::new(PairingRole::Initiator, &secret)
            .save(dir.path())
            .await
            .unwrap();

        let path = dir.path().join("pairing.json");
        let perms = tokio::fs::metadata(&path).await.unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600, "file should be 0600");
    }
}
