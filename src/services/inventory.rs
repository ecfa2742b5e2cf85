use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

use super::filters::InventoryFilter;
use crate::adapter::vocabulary::INVENTORY_CATEGORIES;
use crate::entities::InventoryItem;
use crate::errors::ServiceError;
use crate::repositories::Repository;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStatistics {
    pub total_items: usize,
    pub low_stock_items: usize,
    pub expired_items: usize,
    pub expiring_soon_items: usize,
    /// Distinct canonical categories
    pub categories: usize,
    pub total_value: f64,
    pub by_category: BTreeMap<String, usize>,
}

pub fn statistics(items: &[InventoryItem], today: NaiveDate) -> InventoryStatistics {
    let mut by_category = BTreeMap::new();
    for item in items {
        *by_category.entry(item.category_label()).or_insert(0) += 1;
    }

    InventoryStatistics {
        total_items: items.len(),
        low_stock_items: items.iter().filter(|i| i.is_low_stock()).count(),
        expired_items: items.iter().filter(|i| i.is_expired(today)).count(),
        expiring_soon_items: items.iter().filter(|i| i.is_expiring_soon(today)).count(),
        categories: by_category.len(),
        total_value: items.iter().map(InventoryItem::total_value).sum(),
        by_category,
    }
}

/// Inventory page operations on top of the inventory repository
#[derive(Clone)]
pub struct InventoryService {
    repository: Repository<InventoryItem>,
}

impl InventoryService {
    pub fn new(repository: Repository<InventoryItem>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>, ServiceError> {
        Ok(filter.apply(self.repository.list().await?))
    }

    #[instrument(skip(self))]
    pub async fn statistics(&self, today: NaiveDate) -> Result<InventoryStatistics, ServiceError> {
        let items = self.repository.list().await?;
        Ok(statistics(&items, today))
    }

    pub async fn low_stock(&self) -> Result<Vec<InventoryItem>, ServiceError> {
        let items = self.repository.list().await?;
        Ok(items.into_iter().filter(|i| i.is_low_stock()).collect())
    }

    /// Items whose category normalises to the same label as `category`
    pub async fn by_category(&self, category: &str) -> Result<Vec<InventoryItem>, ServiceError> {
        let label = INVENTORY_CATEGORIES.label_of(category);
        let items = self.repository.list().await?;
        Ok(items
            .into_iter()
            .filter(|i| i.category_label() == label)
            .collect())
    }

    pub async fn update_stock(&self, id: i64, current_stock: Value) -> Result<InventoryItem, ServiceError> {
        self.repository.update_stock(id, current_stock).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: &str, cost: f64, current: i64, expiry: Option<NaiveDate>) -> InventoryItem {
        InventoryItem {
            id: 1,
            item_name: "Item".into(),
            category: category.into(),
            description: String::new(),
            supplier: String::new(),
            unit_cost: cost,
            current_stock: current,
            min_stock: 10,
            max_stock: 100,
            unit: String::new(),
            storage_location: String::new(),
            purchase_date: None,
            expiry_date: expiry,
            notes: String::new(),
        }
    }

    #[test]
    fn statistics_group_by_canonical_category() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let items = vec![
            item("suplies", 0.5, 200, None),
            item("Supplies", 2.0, 5, NaiveDate::from_ymd_opt(2024, 4, 1)),
            item("Equipments", 10.0, 20, NaiveDate::from_ymd_opt(2024, 5, 20)),
        ];

        let stats = statistics(&items, today);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.low_stock_items, 1);
        assert_eq!(stats.expired_items, 1);
        assert_eq!(stats.expiring_soon_items, 1);
        assert_eq!(stats.categories, 2);
        assert_eq!(stats.by_category["Supplies"], 2);
        assert_eq!(stats.total_value, 310.0);
    }
}
