use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::impl_entity;
use crate::adapter::vocabulary::WEATHER_CONDITIONS;
use crate::adapter::{ColumnConvention, EntitySchema, FieldSpec, SortKey};
use crate::store::SortDirection;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub high: f64,
    pub low: f64,
}

/// Externally sourced forecast entry; never written through the adapter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    #[serde(rename = "Id")]
    pub id: i64,
    pub date: Option<NaiveDate>,
    pub temperature: Temperature,
    pub condition: String,
    pub humidity: f64,
    pub precipitation: f64,
}

static FIELDS: [FieldSpec; 6] = [
    FieldSpec::date("date", "date"),
    FieldSpec::number("temperature.high", "temperature_high"),
    FieldSpec::number("temperature.low", "temperature_low"),
    FieldSpec::choice("condition", "condition", &WEATHER_CONDITIONS),
    FieldSpec::number("humidity", "humidity"),
    FieldSpec::number("precipitation", "precipitation"),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "Weather forecast",
    table: "weather_c",
    convention: ColumnConvention::SnakeSuffixed,
    fields: &FIELDS,
    order: (SortKey::Field("date"), SortDirection::Asc),
    page_limit: Some(10),
    read_only: true,
};

impl_entity!(WeatherForecast, SCHEMA);

impl WeatherForecast {
    pub fn condition_icon(&self) -> &'static str {
        WEATHER_CONDITIONS.icon_of(&self.condition)
    }

    pub fn condition_label(&self) -> String {
        WEATHER_CONDITIONS.label_of(&self.condition)
    }
}
