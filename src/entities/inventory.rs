use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::impl_entity;
use crate::adapter::vocabulary::INVENTORY_CATEGORIES;
use crate::adapter::{ColumnConvention, EntitySchema, FieldSpec, SortKey};
use crate::store::SortDirection;

/// Days ahead that count as "expiring soon"
pub const EXPIRY_WARNING_DAYS: i64 = 30;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(rename = "Id")]
    pub id: i64,
    pub item_name: String,
    pub category: String,
    pub description: String,
    pub supplier: String,
    pub unit_cost: f64,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub unit: String,
    pub storage_location: String,
    pub purchase_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub notes: String,
}

static FIELDS: [FieldSpec; 13] = [
    FieldSpec::text("itemName", "item_name").required(),
    FieldSpec::choice("category", "category", &INVENTORY_CATEGORIES).required(),
    FieldSpec::text("description", "description"),
    FieldSpec::text("supplier", "supplier"),
    FieldSpec::number("unitCost", "unit_cost"),
    FieldSpec::integer("currentStock", "current_stock"),
    FieldSpec::integer("minStock", "minimum_stock").aliases(&["MinStock_c", "min_stock_c"]),
    FieldSpec::integer("maxStock", "maximum_stock").aliases(&["MaxStock_c", "max_stock_c"]),
    FieldSpec::text("unit", "unit"),
    FieldSpec::text("storageLocation", "storage_location"),
    FieldSpec::date("purchaseDate", "purchase_date"),
    FieldSpec::date("expiryDate", "expiry_date"),
    FieldSpec::text("notes", "notes"),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "Inventory item",
    table: "inventory_c",
    convention: ColumnConvention::PascalSuffixed,
    fields: &FIELDS,
    order: (SortKey::Id, SortDirection::Desc),
    page_limit: None,
    read_only: false,
};

impl_entity!(InventoryItem, SCHEMA);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum StockStatus {
    #[serde(rename = "Low Stock")]
    #[strum(serialize = "Low Stock")]
    Low,
    #[serde(rename = "Good Stock")]
    #[strum(serialize = "Good Stock")]
    Good,
    #[serde(rename = "Overstocked")]
    #[strum(serialize = "Overstocked")]
    Overstocked,
}

impl StockStatus {
    /// Min-check precedes max-check, so `current == min == max` is Low.
    pub fn classify(current: i64, min: i64, max: i64) -> Self {
        if current <= min {
            StockStatus::Low
        } else if current >= max {
            StockStatus::Overstocked
        } else {
            StockStatus::Good
        }
    }
}

impl InventoryItem {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.current_stock, self.min_stock, self.max_stock)
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_status() == StockStatus::Low
    }

    /// Current stock as a percentage of maximum; 0 when no maximum is set
    pub fn stock_percentage(&self) -> f64 {
        if self.max_stock <= 0 {
            return 0.0;
        }
        self.current_stock as f64 / self.max_stock as f64 * 100.0
    }

    pub fn total_value(&self) -> f64 {
        self.unit_cost * self.current_stock as f64
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry < today)
    }

    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        self.expiry_date.map_or(false, |expiry| {
            let days = (expiry - today).num_days();
            days > 0 && days <= EXPIRY_WARNING_DAYS
        })
    }

    pub fn category_label(&self) -> String {
        INVENTORY_CATEGORIES.label_of(&self.category)
    }

    pub fn category_icon(&self) -> &'static str {
        INVENTORY_CATEGORIES.icon_of(&self.category)
    }
}
