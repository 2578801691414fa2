//! Create the local pairing.

use anyhow::{Context, Result};
use pairlink_core::{PairingRole, PairingSecret};
use std::path::Path;

use crate::config::PairingConfig;

/// Run the init command.
pub async fn run(data_dir: &Path, role: PairingRole, secret_hex: Option<&str>) -> Result<()> {
    // Check if already initialized
    if PairingConfig::exists(data_dir).await {
        anyhow::bail!(
            "Pairing already initialized. Delete {} to reinitialize.",
            data_dir.join("pairing.json").display()
        );
    }

    let generated = secret_hex.is_none();
    let secret = match secret_hex {
        Some(hex) => PairingSecret::from_hex(hex.trim()).context("Invalid pairing secret")?,
        None => PairingSecret::generate().context("Failed to generate pairing secret")?,
    };

    let config = PairingConfig::new(role, &secret);
    config.save(data_dir).await?;

    println!("Pairing initialized as {}.", role);
    println!("  Pairing ID: {}", secret.pairing_id());
    if generated {
        println!();
        println!("Share this secret with the {}:", role.peer());
        println!("  {}", secret.to_hex());
    }

    Ok(())
}
