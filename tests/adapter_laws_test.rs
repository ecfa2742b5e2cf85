//! Record adapter behaviour against the in-memory store.

use std::sync::Arc;

use assert_matches::assert_matches;
use farmstead_api::adapter::vocabulary::INVENTORY_CATEGORIES;
use farmstead_api::adapter::FormInput;
use farmstead_api::config::RecordStoreConfig;
use farmstead_api::entities::{farm, InventoryItem, StockStatus};
use farmstead_api::errors::ServiceError;
use farmstead_api::services::AppServices;
use farmstead_api::store::{InMemoryRecordStore, Record, RecordStore};
use axum::http::StatusCode;
use chrono::NaiveDate;
use farmstead_api::adapter::ColumnConvention;
use serde_json::{json, Value};

fn services() -> (Arc<InMemoryRecordStore>, AppServices) {
    let store = Arc::new(InMemoryRecordStore::new());
    let services = AppServices::with_store(&RecordStoreConfig::default(), store.clone());
    (store, services)
}

async fn insert_raw(store: &InMemoryRecordStore, table: &str, row: Value) -> i64 {
    let row: Record = row.as_object().cloned().expect("row must be an object");
    let stored = store.create_records(table, vec![row]).await.unwrap();
    stored.results[0]
        .data
        .as_ref()
        .and_then(|row| row.get("Id"))
        .and_then(Value::as_i64)
        .expect("store assigns an id")
}

fn form(value: Value) -> FormInput {
    value.as_object().cloned().expect("form must be an object")
}

fn inventory_form(current_stock: Value) -> FormInput {
    form(json!({
        "itemName": "Seed Potatoes",
        "category": "Seeds",
        "supplier": "Valley Seed Co.",
        "unitCost": 2.5,
        "currentStock": current_stock,
        "minStock": 10,
        "maxStock": 100,
        "unit": "kg",
        "purchaseDate": "2024-03-01",
    }))
}

#[tokio::test]
async fn created_record_round_trips_through_get_by_id() {
    let (_, services) = services();

    let created = services
        .inventory
        .create(&inventory_form(json!(40)))
        .await
        .unwrap();
    let fetched = services.inventory.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.item_name, "Seed Potatoes");
    assert_eq!(fetched.current_stock, 40);
    assert_eq!(fetched.unit_cost, 2.5);
    assert_eq!(fetched.purchase_date.map(|d| d.to_string()).as_deref(), Some("2024-03-01"));
    assert_eq!(fetched.expiry_date, None);
    assert_eq!(fetched.description, "");
}

#[tokio::test]
async fn update_replaces_the_whole_record() {
    let (_, services) = services();
    let created = services
        .inventory
        .create(&inventory_form(json!(40)))
        .await
        .unwrap();

    services
        .inventory
        .update(created.id, &form(json!({ "itemName": "Seed Potatoes", "category": "Seeds", "currentStock": 7 })))
        .await
        .unwrap();
    let fetched = services.inventory.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched.current_stock, 7);
    assert_eq!(fetched.unit_cost, 0.0);
    assert_eq!(fetched.min_stock, 0);
    assert_eq!(fetched.max_stock, 0);
    assert_eq!(fetched.supplier, "");
    assert_eq!(fetched.unit, "");
    assert_eq!(fetched.purchase_date, None);
}

#[tokio::test]
async fn deleted_record_is_not_found() {
    let (_, services) = services();
    let created = services
        .farms
        .create(&form(json!({ "name": "Creekside", "sizeAcres": 12 })))
        .await
        .unwrap();

    assert!(services.farms.delete(created.id).await.unwrap());
    assert_matches!(
        services.farms.get_by_id(created.id).await,
        Err(ServiceError::NotFound(message)) if message == format!("Farm with id {}", created.id)
    );
}

#[tokio::test]
async fn writes_to_a_missing_record_are_not_found() {
    let (_, services) = services();
    assert_matches!(
        services.farms.delete(99).await,
        Err(ServiceError::NotFound(message)) if message == "Farm with id 99"
    );

    let err = services
        .farms
        .update(999, &form(json!({ "name": "Ghost" })))
        .await
        .unwrap_err();
    assert_matches!(&err, ServiceError::NotFound(message) if message == "Farm with id 999");
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    assert_matches!(
        services.inventory.update_stock(7, json!(3)).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let (_, services) = services();
    let first = services
        .farms
        .create(&form(json!({ "name": "One" })))
        .await
        .unwrap();
    services.farms.delete(first.id).await.unwrap();
    let second = services
        .farms
        .create(&form(json!({ "name": "Two" })))
        .await
        .unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn numeric_strings_parse_strictly() {
    let (_, services) = services();

    let garbage = services
        .inventory
        .create(&inventory_form(json!("12abc")))
        .await
        .unwrap();
    let clean = services
        .inventory
        .create(&inventory_form(json!("12")))
        .await
        .unwrap();

    assert_eq!(services.inventory.get_by_id(garbage.id).await.unwrap().current_stock, 0);
    assert_eq!(services.inventory.get_by_id(clean.id).await.unwrap().current_stock, 12);
}

#[tokio::test]
async fn stock_classification_checks_min_before_max() {
    assert_eq!(StockStatus::classify(5, 10, 100), StockStatus::Low);
    assert_eq!(StockStatus::classify(10, 10, 100), StockStatus::Low);
    assert_eq!(StockStatus::classify(100, 10, 100), StockStatus::Overstocked);
    assert_eq!(StockStatus::classify(50, 10, 100), StockStatus::Good);
    assert_eq!(StockStatus::classify(20, 20, 20), StockStatus::Low);
    assert_eq!(StockStatus::Low.to_string(), "Low Stock");
}

#[tokio::test]
async fn drifted_category_spelling_maps_through_the_vocabulary() {
    let (store, services) = services();

    let mut raw = Record::new();
    raw.insert("ItemName_c".into(), json!("Drip Tubing"));
    raw.insert("Category_c".into(), json!("suplies"));
    raw.insert("CurrentStock_c".into(), json!(300));
    let stored = store.create_records("inventory_c", vec![raw]).await.unwrap();
    let id = stored.results[0]
        .data
        .as_ref()
        .and_then(|row| row.get("Id"))
        .and_then(Value::as_i64)
        .unwrap();

    let item: InventoryItem = services.inventory.get_by_id(id).await.unwrap();
    assert_eq!(item.category_label(), "Supplies");
    assert_eq!(item.category_icon(), "Package");

    let normalized = INVENTORY_CATEGORIES.normalize("suplies");
    assert_eq!(normalized.label, "Supplies");
    assert_eq!(normalized.icon, "Package");
}

#[tokio::test]
async fn farm_acreage_sums_across_the_list() {
    let (_, services) = services();
    for (name, acres) in [("North", json!(10)), ("South", json!(20.5))] {
        services
            .farms
            .create(&form(json!({ "name": name, "sizeAcres": acres })))
            .await
            .unwrap();
    }

    let farms = services.farms.list().await.unwrap();
    assert_eq!(farm::total_acres(&farms), 30.5);
    assert_eq!(services.farm_summary().await.unwrap().total_acres, 30.5);
}

#[tokio::test]
async fn weather_cannot_be_written() {
    let (_, services) = services();
    let result = services
        .weather
        .create(&form(json!({ "condition": "sunny" })))
        .await;
    assert_matches!(result, Err(ServiceError::InvalidOperation(_)));
    assert_matches!(services.weather.delete(1).await, Err(ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn count_matches_the_number_of_rows() {
    let (_, services) = services();
    for name in ["A", "B", "C"] {
        services
            .farms
            .create(&form(json!({ "name": name })))
            .await
            .unwrap();
    }
    assert_eq!(services.farms.count().await.unwrap(), 3);
}

#[tokio::test]
async fn reads_resolve_aliases_and_other_conventions() {
    let (store, services) = services();

    // Historical `MinStock_c`/`MaxStock_c` aliases
    let aliased = insert_raw(
        &store,
        "inventory_c",
        json!({ "ItemName_c": "Hoe", "Category_c": "tools", "MinStock_c": 10, "MaxStock_c": 50, "CurrentStock_c": 3 }),
    )
    .await;
    // Rows written by a snake_case deployment
    let snake = insert_raw(
        &store,
        "inventory_c",
        json!({ "item_name_c": "Rake", "category_c": "Equipment", "current_stock_c": 20, "minimum_stock_c": 5, "maximum_stock_c": 40 }),
    )
    .await;

    let hoe = services.inventory.get_by_id(aliased).await.unwrap();
    assert_eq!((hoe.min_stock, hoe.max_stock, hoe.current_stock), (10, 50, 3));
    assert_eq!(hoe.stock_status(), StockStatus::Low);

    let rake = services.inventory.get_by_id(snake).await.unwrap();
    assert_eq!(rake.item_name, "Rake");
    assert_eq!(rake.current_stock, 20);
    assert_eq!(rake.stock_status(), StockStatus::Good);

    let listed = services.inventory.list().await.unwrap();
    let names: Vec<&str> = listed.iter().map(|i| i.item_name.as_str()).collect();
    assert_eq!(names, vec!["Rake", "Hoe"]);
    assert_eq!(listed[1].min_stock, 10);
}

#[tokio::test]
async fn seeded_inventory_reads_under_a_snake_case_convention() {
    let mut config = RecordStoreConfig {
        simulated_latency_ms: 0,
        ..RecordStoreConfig::default()
    };
    config
        .conventions
        .insert("inventory_c".to_string(), ColumnConvention::SnakeSuffixed);
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let services = AppServices::from_config(&config, today).await.unwrap();

    let items = services.inventory.list().await.unwrap();
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|i| !i.item_name.is_empty() && i.current_stock > 0));
    let npk = items
        .iter()
        .find(|i| i.item_name.starts_with("NPK"))
        .expect("seeded fertilizer");
    assert_eq!(npk.category_label(), "Fertilizers");
    assert!(npk.is_low_stock());

    // Writes land in the configured columns and win on the next read.
    let updated = services.inventory.update_stock(npk.id, json!(60)).await.unwrap();
    assert_eq!(updated.current_stock, 60);
    assert!(!updated.is_low_stock());
}

#[tokio::test]
async fn blank_inventory_category_is_not_invented() {
    let (store, services) = services();
    let id = insert_raw(&store, "inventory_c", json!({ "ItemName_c": "Mystery crate", "Category_c": "  " })).await;

    let item = services.inventory.get_by_id(id).await.unwrap();
    assert_eq!(item.category, "");
    assert_eq!(item.category_label(), "");
}

#[tokio::test]
async fn listing_is_capped_at_the_page_size_newest_first() {
    let (_, services) = services();
    for n in 1..=105 {
        services
            .farms
            .create(&form(json!({ "name": format!("Farm {}", n) })))
            .await
            .unwrap();
    }

    let farms = services.farms.list().await.unwrap();
    assert_eq!(farms.len(), 100);
    assert_eq!(farms[0].id, 105);
    assert_eq!(farms[99].id, 6);
    assert!(farms.windows(2).all(|pair| pair[0].id > pair[1].id));
    assert_eq!(services.farms.count().await.unwrap(), 105);
}

#[tokio::test]
async fn weather_lists_ten_days_in_date_order() {
    let (store, services) = services();
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    // Inserted newest first so store order differs from date order.
    for offset in (0..12).rev() {
        let date = start + chrono::Duration::days(offset);
        insert_raw(
            &store,
            "weather_c",
            json!({ "date_c": date.to_string(), "condition_c": "cloudy", "temperature_high_c": 20 }),
        )
        .await;
    }

    let forecast = services.weather.list().await.unwrap();
    assert_eq!(forecast.len(), 10);
    assert_eq!(forecast[0].date, Some(start));
    assert_eq!(forecast[9].date, Some(start + chrono::Duration::days(9)));
    assert!(forecast.windows(2).all(|pair| pair[0].date < pair[1].date));
    assert_eq!(forecast[0].temperature.high, 20.0);
}
