use crate::inventory::{Inventory, ValidationError};
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Errors that prevent discovery from starting
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Cannot open inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed inventory {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Load, parse and validate an inventory YAML file
pub fn load_inventory(inventory_path: &Path) -> Result<Inventory, InventoryError> {
    info!("Loading inventory from: {:?}", inventory_path);

    let file = File::open(inventory_path).map_err(|source| InventoryError::Io {
        path: inventory_path.to_path_buf(),
        source,
    })?;

    let inventory: Inventory =
        serde_yaml::from_reader(file).map_err(|source| InventoryError::Yaml {
            path: inventory_path.to_path_buf(),
            source,
        })?;

    inventory.validate()?;

    info!(
        "Inventory holds {} seed devices, {} management interfaces",
        inventory.devices.len(),
        inventory.discovery.management_interfaces.len()
    );

    Ok(inventory)
}
