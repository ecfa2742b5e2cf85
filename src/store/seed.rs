//! Demo records for the in-memory store.

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use tracing::info;

use super::{InMemoryRecordStore, Record};
use crate::adapter::{FormInput, TableMapping};
use crate::errors::ServiceError;

/// Seeds `mapping`'s table with its demo rows. Returns the number of rows written.
pub async fn seed_table(
    store: &InMemoryRecordStore,
    mapping: &TableMapping,
    today: NaiveDate,
) -> Result<usize, ServiceError> {
    let rows = match mapping.table() {
        // Inventory rows are stored as the backend had them, spelling drift included.
        "inventory_c" => inventory_rows(),
        table => demo_forms(table, today)
            .iter()
            .map(|form| mapping.encode_patch(form))
            .collect::<Result<Vec<_>, _>>()?,
    };

    let count = store.seed(mapping.table(), rows).await.len();
    info!(table = mapping.table(), count, "seeded in-memory table");
    Ok(count)
}

fn forms(values: Vec<Value>) -> Vec<FormInput> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

fn day(today: NaiveDate, offset: i64) -> String {
    (today + Duration::days(offset)).format("%Y-%m-%d").to_string()
}

/// Demo entities keyed by view-model field names
pub fn demo_forms(table: &str, today: NaiveDate) -> Vec<FormInput> {
    match table {
        "farm_c" => forms(vec![
            json!({
                "name": "Green Valley Farm",
                "location": "Sacramento County, CA",
                "sizeAcres": 150,
                "type": "Mixed Crops",
                "soilType": "Loam",
                "irrigationType": "Drip",
                "fertilityLevel": "High",
            }),
            json!({
                "name": "Sunrise Orchards",
                "location": "Yakima, WA",
                "sizeAcres": 85.5,
                "type": "Orchard",
                "soilType": "Sandy loam",
                "irrigationType": "Sprinkler",
            }),
        ]),
        "crop_c" => forms(vec![
            json!({
                "name": "Sweet Corn",
                "variety": "Golden Bantam",
                "plantingDate": day(today, -45),
                "expectedHarvest": day(today, 40),
                "fieldLocation": "North Field",
                "quantity": 1200,
                "status": "growing",
                "farmId": 1,
            }),
            json!({
                "name": "Tomatoes",
                "variety": "Roma",
                "plantingDate": day(today, -60),
                "expectedHarvest": day(today, 5),
                "fieldLocation": "Greenhouse 2",
                "quantity": 400,
                "status": "ready",
                "farmId": 1,
            }),
            json!({
                "name": "Honeycrisp Apples",
                "variety": "Honeycrisp",
                "plantingDate": day(today, -400),
                "fieldLocation": "Block A",
                "quantity": 250,
                "status": "harvested",
                "farmId": 2,
            }),
        ]),
        "task_c" => forms(vec![
            json!({
                "title": "Check drip lines",
                "description": "Inspect north field emitters for clogging",
                "dueDate": day(today, -2),
                "priority": "high",
                "category": "irrigation",
                "cropId": 1,
            }),
            json!({
                "title": "Harvest tomatoes",
                "dueDate": day(today, 3),
                "priority": "medium",
                "category": "harvest",
                "cropId": 2,
            }),
            json!({
                "title": "Order fertilizer",
                "dueDate": day(today, 10),
                "priority": "low",
                "completed": true,
            }),
        ]),
        "financial_c" => forms(vec![
            json!({
                "type": "income",
                "category": "Crop sales",
                "amount": 4200,
                "description": "Apple wholesale contract",
                "date": day(today, -20),
                "cropId": 3,
            }),
            json!({
                "type": "expense",
                "category": "Seeds",
                "amount": 650.75,
                "description": "Sweet corn seed",
                "date": day(today, -46),
                "cropId": 1,
            }),
        ]),
        "irrigation_c" => forms(vec![
            json!({
                "name": "North Field Drip",
                "irrigationType": "Drip",
                "waterSource": "Well",
                "schedule": "Daily 6:00",
                "duration": 45,
                "waterUsed": 1800,
            }),
            json!({
                "name": "Orchard Sprinklers",
                "irrigationType": "Sprinkler",
                "waterSource": "Canal",
                "schedule": "Mon/Thu 20:00",
                "duration": 90,
                "waterUsed": 5200,
            }),
        ]),
        "weather_c" => {
            let conditions = ["sunny", "partly-cloudy", "cloudy", "rainy", "stormy", "sunny", "partly-cloudy"];
            forms(
                conditions
                    .iter()
                    .enumerate()
                    .map(|(offset, condition)| {
                        let offset = offset as i64;
                        json!({
                            "date": day(today, offset),
                            "temperature": {"high": 24 + offset % 3, "low": 12 + offset % 2},
                            "condition": condition,
                            "humidity": 55 + offset * 3,
                            "precipitation": if *condition == "rainy" || *condition == "stormy" { 12.5 } else { 0.0 },
                        })
                    })
                    .collect(),
            )
        }
        _ => Vec::new(),
    }
}

/// Inventory rows in the `PascalCase_c` columns of the inventory table
pub fn inventory_rows() -> Vec<Record> {
    let rows = vec![
        json!({
            "ItemName_c": "Organic Corn Seeds",
            "Category_c": "Seeds",
            "Description_c": "Non-GMO sweet corn seeds",
            "Supplier_c": "Valley Seed Co.",
            "UnitCost_c": 45.99,
            "CurrentStock_c": 25,
            "MinimumStock_c": 10,
            "MaximumStock_c": 100,
            "Unit_c": "bags",
            "StorageLocation_c": "Warehouse A",
            "PurchaseDate_c": "2024-01-15",
            "ExpiryDate_c": "2025-12-31",
            "Notes_c": "Store in a cool, dry place",
        }),
        json!({
            "ItemName_c": "NPK Fertilizer 10-10-10",
            "Category_c": "fertilizers",
            "Supplier_c": "AgriChem Supply",
            "UnitCost_c": 32.5,
            "CurrentStock_c": 5,
            "MinimumStock_c": 15,
            "MaximumStock_c": 80,
            "Unit_c": "bags",
            "StorageLocation_c": "Chemical Shed",
            "PurchaseDate_c": "2024-02-01",
        }),
        json!({
            "ItemName_c": "Pruning Shears",
            "Category_c": "Equipments",
            "Supplier_c": "FarmTools Direct",
            "UnitCost_c": 28.75,
            "CurrentStock_c": 12,
            "MinimumStock_c": 5,
            "MaximumStock_c": 12,
            "Unit_c": "pieces",
            "StorageLocation_c": "Tool Shed",
        }),
        json!({
            "ItemName_c": "Irrigation Tubing",
            "Category_c": "suplies",
            "Description_c": "1/2 inch drip tubing",
            "Supplier_c": "WaterWise",
            "UnitCost_c": "0.85",
            "CurrentStock_c": 500,
            "MinimumStock_c": 200,
            "MaximumStock_c": 1000,
            "Unit_c": "feet",
            "StorageLocation_c": "Warehouse B",
        }),
    ];
    rows.into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
