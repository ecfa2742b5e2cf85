use serde::{Deserialize, Serialize};

use super::impl_entity;
use crate::adapter::{ColumnConvention, EntitySchema, FieldSpec, SortKey};
use crate::store::SortDirection;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrigationRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    pub name: String,
    pub irrigation_type: String,
    pub water_source: String,
    pub schedule: String,
    /// Minutes
    pub duration: f64,
    /// Liters
    pub water_used: f64,
}

static FIELDS: [FieldSpec; 6] = [
    FieldSpec::text("name", "name").system("Name").required(),
    FieldSpec::text("irrigationType", "irrigation_type"),
    FieldSpec::text("waterSource", "water_source"),
    FieldSpec::text("schedule", "schedule"),
    FieldSpec::number("duration", "duration"),
    FieldSpec::number("waterUsed", "water_used"),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "Irrigation record",
    table: "irrigation_c",
    convention: ColumnConvention::SnakeSuffixed,
    fields: &FIELDS,
    order: (SortKey::Id, SortDirection::Desc),
    page_limit: None,
    read_only: false,
};

impl_entity!(IrrigationRecord, SCHEMA);

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrigationSummary {
    pub systems: usize,
    pub total_water_used: f64,
    pub total_duration: f64,
}

pub fn summarize(records: &[IrrigationRecord]) -> IrrigationSummary {
    IrrigationSummary {
        systems: records.len(),
        total_water_used: records.iter().map(|r| r.water_used).sum(),
        total_duration: records.iter().map(|r| r.duration).sum(),
    }
}
