use serde::{Deserialize, Serialize};

use super::impl_entity;
use crate::adapter::{ColumnConvention, EntitySchema, FieldSpec, SortKey};
use crate::store::SortDirection;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    #[serde(rename = "Id")]
    pub id: i64,
    pub name: String,
    pub location: String,
    pub size_acres: f64,
    #[serde(rename = "type")]
    pub farm_type: String,
    pub notes: String,
    pub soil_type: String,
    pub gps_coordinates: String,
    pub current_crop: String,
    pub irrigation_type: String,
    pub past_crops: String,
    pub fertility_level: String,
}

static FIELDS: [FieldSpec; 11] = [
    FieldSpec::text("name", "name").required(),
    FieldSpec::text("location", "location"),
    FieldSpec::number("sizeAcres", "size_acres")
        .non_negative()
        .aliases(&["size_c", "Size"]),
    FieldSpec::text("type", "type"),
    FieldSpec::text("notes", "notes"),
    FieldSpec::text("soilType", "soil_type"),
    FieldSpec::text("gpsCoordinates", "gps_coordinates"),
    FieldSpec::text("currentCrop", "current_crop"),
    FieldSpec::text("irrigationType", "irrigation_type"),
    FieldSpec::text("pastCrops", "past_crops"),
    FieldSpec::text("fertilityLevel", "fertility_level"),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "Farm",
    table: "farm_c",
    convention: ColumnConvention::SnakeSuffixed,
    fields: &FIELDS,
    order: (SortKey::Id, SortDirection::Desc),
    page_limit: None,
    read_only: false,
};

impl_entity!(Farm, SCHEMA);

/// Sum of `sizeAcres` over `farms`
pub fn total_acres(farms: &[Farm]) -> f64 {
    farms.iter().map(|farm| farm.size_acres).sum()
}
