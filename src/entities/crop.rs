use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::impl_entity;
use crate::adapter::vocabulary::{Normalized, CROP_STATUSES};
use crate::adapter::{ColumnConvention, EntitySchema, FieldSpec, SortKey};
use crate::store::SortDirection;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    #[serde(rename = "Id")]
    pub id: i64,
    pub name: String,
    pub variety: String,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest: Option<NaiveDate>,
    pub field_location: String,
    pub quantity: f64,
    pub status: String,
    pub notes: String,
    pub farm_id: Option<i64>,
}

static FIELDS: [FieldSpec; 9] = [
    FieldSpec::text("name", "name").required(),
    FieldSpec::text("variety", "variety"),
    FieldSpec::date("plantingDate", "planting_date").required(),
    FieldSpec::date("expectedHarvest", "expected_harvest"),
    FieldSpec::text("fieldLocation", "field_location"),
    FieldSpec::number("quantity", "quantity").non_negative(),
    FieldSpec::choice("status", "status", &CROP_STATUSES),
    FieldSpec::text("notes", "notes"),
    FieldSpec::reference("farmId", "farm_id").required(),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "Crop",
    table: "crop_c",
    convention: ColumnConvention::SnakeSuffixed,
    fields: &FIELDS,
    order: (SortKey::Id, SortDirection::Desc),
    page_limit: None,
    read_only: false,
};

impl_entity!(Crop, SCHEMA);

impl Crop {
    /// Anything not yet harvested
    pub fn is_active(&self) -> bool {
        CROP_STATUSES.normalize(&self.status).value != "harvested"
    }

    pub fn status_term(&self) -> Normalized {
        CROP_STATUSES.normalize(&self.status)
    }
}
