use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::impl_entity;
use crate::adapter::vocabulary::TASK_PRIORITIES;
use crate::adapter::{ColumnConvention, EntitySchema, FieldSpec, SortKey};
use crate::store::SortDirection;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "Id")]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: String,
    pub category: String,
    pub completed: bool,
    pub crop_id: Option<i64>,
}

static FIELDS: [FieldSpec; 7] = [
    FieldSpec::text("title", "title").required(),
    FieldSpec::text("description", "description"),
    FieldSpec::date("dueDate", "due_date"),
    FieldSpec::choice("priority", "priority", &TASK_PRIORITIES),
    FieldSpec::text_or("category", "category", "general"),
    FieldSpec::boolean("completed", "completed"),
    FieldSpec::reference("cropId", "crop_id"),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "Task",
    table: "task_c",
    convention: ColumnConvention::SnakeSuffixed,
    fields: &FIELDS,
    order: (SortKey::Id, SortDirection::Desc),
    page_limit: None,
    read_only: false,
};

impl_entity!(Task, SCHEMA);

impl Task {
    /// Incomplete with a due date strictly before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.map_or(false, |due| due < today)
    }
}
