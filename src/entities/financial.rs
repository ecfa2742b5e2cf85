use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::impl_entity;
use crate::adapter::vocabulary::FINANCIAL_TYPES;
use crate::adapter::{ColumnConvention, EntitySchema, FieldSpec, SortKey};
use crate::store::SortDirection;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "type")]
    pub record_type: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub crop_id: Option<i64>,
}

static FIELDS: [FieldSpec; 6] = [
    FieldSpec::choice("type", "type", &FINANCIAL_TYPES).required(),
    FieldSpec::text("category", "category"),
    FieldSpec::number("amount", "amount").required(),
    FieldSpec::text("description", "description"),
    FieldSpec::date("date", "date"),
    FieldSpec::reference("cropId", "crop_id"),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "Financial record",
    table: "financial_c",
    convention: ColumnConvention::SnakeSuffixed,
    fields: &FIELDS,
    order: (SortKey::Id, SortDirection::Desc),
    page_limit: None,
    read_only: false,
};

impl_entity!(FinancialRecord, SCHEMA);

impl FinancialRecord {
    pub fn is_income(&self) -> bool {
        FINANCIAL_TYPES.normalize(&self.record_type).value == "income"
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceTotals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_income: f64,
}

pub fn totals(records: &[FinancialRecord]) -> FinanceTotals {
    let (income, expenses) = records.iter().fold((0.0, 0.0), |(income, expenses), r| {
        if r.is_income() {
            (income + r.amount, expenses)
        } else {
            (income, expenses + r.amount)
        }
    });
    FinanceTotals {
        total_income: income,
        total_expenses: expenses,
        net_income: income - expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, amount: f64) -> FinancialRecord {
        FinancialRecord {
            id: 1,
            record_type: kind.into(),
            category: "seed".into(),
            amount,
            description: String::new(),
            date: None,
            crop_id: None,
        }
    }

    #[test]
    fn totals_split_income_and_expenses() {
        let summary = totals(&[
            record("income", 1200.0),
            record("expense", 300.5),
            record("Revenue", 100.0),
        ]);
        assert_eq!(summary.total_income, 1300.0);
        assert_eq!(summary.total_expenses, 300.5);
        assert_eq!(summary.net_income, 999.5);
    }
}
