use autowire::prelude::*;
use std::collections::BTreeMap;

pub trait StockStore: Send + Sync {
    fn name(&self) -> &'static str;
    fn quantity(&self, sku: &str) -> u32;
    fn levels(&self) -> BTreeMap<String, u32>;
}

fn seed_stock() -> BTreeMap<String, u32> {
    [("bolt-m6", 420), ("hinge-brass", 7), ("washer-m6", 3), ("drawer-rail", 64)]
        .into_iter()
        .map(|(sku, qty)| (sku.to_string(), qty))
        .collect()
}

#[derive(Injectable)]
pub struct MemoryStore {
    #[inject(default = seed_stock())]
    stock: BTreeMap<String, u32>,
}

impl StockStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn quantity(&self, sku: &str) -> u32 {
        self.stock.get(sku).copied().unwrap_or(0)
    }

    fn levels(&self) -> BTreeMap<String, u32> {
        self.stock.clone()
    }
}

/// A frozen copy of another store, handed to reporting only.
pub struct SnapshotStore {
    stock: BTreeMap<String, u32>,
}

impl SnapshotStore {
    pub fn capture(store: &dyn StockStore) -> Self {
        Self {
            stock: store.levels(),
        }
    }
}

impl StockStore for SnapshotStore {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn quantity(&self, sku: &str) -> u32 {
        self.stock.get(sku).copied().unwrap_or(0)
    }

    fn levels(&self) -> BTreeMap<String, u32> {
        self.stock.clone()
    }
}

#[derive(Injectable)]
pub struct AuditLog {
    #[inject(key = "app.name")]
    app: String,
}

impl AuditLog {
    pub fn record(&self, event: &str) {
        tracing::info!(app = %self.app, event, "audit");
    }
}

#[derive(Injectable)]
pub struct InventoryService {
    store: Arc<dyn StockStore>,
    audit: Arc<AuditLog>,
    #[inject(default = 10u32)]
    low_stock_threshold: u32,
}

impl InventoryService {
    pub fn low_stock(&self) -> Vec<(String, u32)> {
        self.audit.record("low_stock_scan");
        self.store
            .levels()
            .into_iter()
            .filter(|(_, qty)| *qty < self.low_stock_threshold)
            .collect()
    }

    pub fn threshold(&self) -> u32 {
        self.low_stock_threshold
    }
}

#[derive(Injectable)]
pub struct ReportService {
    inventory: Arc<InventoryService>,
    store: Arc<dyn StockStore>,
}

impl ReportService {
    pub fn summary(&self) -> String {
        let low = self.inventory.low_stock();
        let total: u32 = self.store.levels().values().sum();
        format!(
            "{} units on hand ({} store), {} SKUs below {}, bolts: {}",
            total,
            self.store.name(),
            low.len(),
            self.inventory.threshold(),
            self.store.quantity("bolt-m6"),
        )
    }
}
