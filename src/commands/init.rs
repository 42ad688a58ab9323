// Init command for creating an empty release catalog

use crate::ui;
use updraft::FileStore;
use updraft::config::{Config, StoreKind};

pub fn init(config: &Config) -> anyhow::Result<()> {
    if config.store == StoreKind::Memory {
        ui::warning("Store is 'memory'; nothing to initialize.");
        return Ok(());
    }

    let store = FileStore::new(config.catalog_path());
    if store.init()? {
        ui::success(&format!("Initialized {}", store.path().display()));
    } else {
        ui::dim(&format!(
            "Catalog {} already exists. Skipping initialization.",
            store.path().display()
        ));
    }
    Ok(())
}
