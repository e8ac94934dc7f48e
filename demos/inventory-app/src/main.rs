use autowire::prelude::*;
use std::env;

mod services;

use services::{
    AuditLog, InventoryService, MemoryStore, ReportService, SnapshotStore, StockStore,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting inventory app...");

    let config = ContainerConfig::from_env()?;
    let audit_lifetime = env::var("INVENTORY_AUDIT_LIFETIME")
        .ok()
        .map(|value| value.parse::<Lifetime>())
        .transpose()?
        .unwrap_or(Lifetime::Shared);

    // 1. Register descriptors, bindings and plain values
    let container = ContainerBuilder::with_config(config)
        .instance("app.name", "inventory-app".to_string())
        .injectable::<MemoryStore>()
        .injectable::<AuditLog>()
        .injectable::<InventoryService>()
        .injectable::<ReportService>()
        .singleton_trait::<dyn StockStore, MemoryStore, _>(|store| store as Arc<dyn StockStore>)
        .bind_with(type_key::<AuditLog>(), type_key::<AuditLog>(), audit_lifetime)
        .build();

    // 2. Reports read from a frozen snapshot instead of the live store
    container
        .when_type::<ReportService>()
        .needs_type::<dyn StockStore>()
        .give_factory(|c: &Container| {
            let live = c.resolve_trait::<dyn StockStore>()?;
            Ok(Arc::new(SnapshotStore::capture(live.as_ref())) as Arc<dyn StockStore>)
        });

    // 3. Resolve and use the graph
    let inventory = container.resolve::<InventoryService>()?;
    for (sku, qty) in inventory.low_stock() {
        tracing::warn!(%sku, qty, threshold = inventory.threshold(), "Low stock");
    }

    let strict = container.resolve_with::<InventoryService>(
        Parameters::new().with("low_stock_threshold", 100u32),
    )?;
    tracing::info!(
        count = strict.low_stock().len(),
        threshold = strict.threshold(),
        "Items under the strict threshold"
    );

    let report = container.resolve::<ReportService>()?;
    tracing::info!("{}", report.summary());

    tracing::info!("Inventory app finished");
    Ok(())
}
