//! Client-side list filtering over already-fetched records.

use serde::Deserialize;

use crate::adapter::vocabulary::INVENTORY_CATEGORIES;
use crate::entities::{
    Crop, Farm, FinancialRecord, InventoryItem, IrrigationRecord, Task, WeatherForecast,
};

/// Text fields matched by the list search box
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// Case-insensitive substring match; a blank query matches everything.
    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

pub fn search<T: Searchable>(items: Vec<T>, query: Option<&str>) -> Vec<T> {
    match query {
        Some(query) if !query.trim().is_empty() => {
            items.into_iter().filter(|item| item.matches(query)).collect()
        }
        _ => items,
    }
}

impl Searchable for Farm {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.location.as_str(),
            self.farm_type.as_str(),
            self.notes.as_str(),
        ]
    }
}

impl Searchable for Crop {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.variety.as_str(),
            self.field_location.as_str(),
            self.status.as_str(),
        ]
    }
}

impl Searchable for Task {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.category.as_str()]
    }
}

impl Searchable for FinancialRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.category.as_str(), self.description.as_str(), self.record_type.as_str()]
    }
}

impl Searchable for InventoryItem {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.item_name.as_str(),
            self.description.as_str(),
            self.supplier.as_str(),
            self.storage_location.as_str(),
        ]
    }
}

impl Searchable for IrrigationRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.irrigation_type.as_str(),
            self.water_source.as_str(),
            self.schedule.as_str(),
        ]
    }
}

impl Searchable for WeatherForecast {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.condition.as_str()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockFilter {
    Low,
    Ok,
}

/// Inventory page filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilter {
    pub search: Option<String>,
    /// Any accepted spelling of a category; compared by canonical label
    pub category: Option<String>,
    pub stock: Option<StockFilter>,
}

impl InventoryFilter {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(query) = self.search.as_deref() {
            if !item.matches(query) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            if !category.eq_ignore_ascii_case("all")
                && INVENTORY_CATEGORIES.label_of(category) != item.category_label()
            {
                return false;
            }
        }
        match self.stock {
            Some(StockFilter::Low) => item.is_low_stock(),
            Some(StockFilter::Ok) => !item.is_low_stock(),
            None => true,
        }
    }

    pub fn apply(&self, items: Vec<InventoryItem>) -> Vec<InventoryItem> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, category: &str, current: i64) -> InventoryItem {
        InventoryItem {
            id,
            item_name: name.into(),
            category: category.into(),
            description: String::new(),
            supplier: "Valley Seed Co.".into(),
            unit_cost: 1.0,
            current_stock: current,
            min_stock: 10,
            max_stock: 100,
            unit: String::new(),
            storage_location: String::new(),
            purchase_date: None,
            expiry_date: None,
            notes: String::new(),
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let items = vec![item(1, "Corn Seeds", "Seeds", 50), item(2, "Hoe", "Equipment", 5)];
        let found = search(items, Some("CORN"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn category_filter_compares_canonical_labels() {
        let filter = InventoryFilter {
            category: Some("Supplies".into()),
            ..Default::default()
        };
        let items = vec![item(1, "Tubing", "suplies", 50), item(2, "Hoe", "Equipments", 50)];
        let found = filter.apply(items);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn stock_filter_splits_low_and_ok() {
        let items = vec![item(1, "A", "Seeds", 5), item(2, "B", "Seeds", 50)];
        let low = InventoryFilter {
            stock: Some(StockFilter::Low),
            ..Default::default()
        };
        let ok = InventoryFilter {
            stock: Some(StockFilter::Ok),
            ..Default::default()
        };
        assert_eq!(low.apply(items.clone())[0].id, 1);
        assert_eq!(ok.apply(items)[0].id, 2);
    }
}
