//! Register or clear the push endpoint.

use anyhow::{Context, Result};
use pairlink_types::PushEndpoint;
use std::path::Path;

use crate::config::PairingConfig;

/// Run the endpoint command. `None` clears the endpoint.
pub async fn run(data_dir: &Path, handle: Option<&str>) -> Result<()> {
    let mut config = PairingConfig::load(data_dir).await?;

    let endpoint = handle
        .map(PushEndpoint::new)
        .transpose()
        .context("Invalid push endpoint")?;
    let previous = config.push_endpoint.take();
    config.push_endpoint = endpoint.map(|e| e.as_str().to_owned());
    config.save(data_dir).await?;

    match (&config.push_endpoint, previous) {
        (Some(current), _) => println!("Push endpoint set to {}.", current),
        (None, Some(old)) => println!("Push endpoint {} cleared.", old),
        (None, None) => println!("No push endpoint was registered."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairlink_core::{PairingRole, PairingSecret};
    use tempfile::tempdir;

    async fn initialized() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let secret = PairingSecret::generate().unwrap();
        PairingConfig::new(PairingRole::Initiator, &secret)
            .save(dir.path())
            .await
            .unwrap();
        dir
    }

    #[tokio::test]
    async fn set_then_clear() {
        let dir = initialized().await;

        run(dir.path(), Some("http://127.0.0.1:9/hook")).await.unwrap();
        let config = PairingConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.push_endpoint.as_deref(), Some("http://127.0.0.1:9/hook"));

        run(dir.path(), None).await.unwrap();
        let config = PairingConfig::load(dir.path()).await.unwrap();
        assert!(config.push_endpoint.is_none());
    }

    #[tokio::test]
    async fn blank_handle_is_rejected() {
        let dir = initialized().await;
        assert!(run(dir.path(), Some("   ")).await.is_err());
        assert!(PairingConfig::load(dir.path())
            .await
            .unwrap()
            .push_endpoint
            .is_none());
    }
}
