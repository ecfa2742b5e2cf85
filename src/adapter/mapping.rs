use serde_json::{Map, Value};

use super::{coerce, ColumnConvention, EntitySchema, FieldKind, FieldSpec, SortKey};
use crate::errors::ServiceError;
use crate::store::{record_id, Condition, Operator, OrderBy, Record, ID_COLUMN};

/// Caller-supplied entity keyed by view-model field names.
/// Dotted fields may be given nested (`{"temperature": {"high": 21}}`) or flat.
pub type FormInput = Map<String, Value>;

/// Predicate on a view-model field, translated to a column at query time
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: &'static str,
    pub operator: Operator,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self {
            field,
            operator: Operator::EqualTo,
            value: value.into(),
        }
    }
}

/// An entity schema bound to the naming convention of one deployment.
#[derive(Debug, Clone, Copy)]
pub struct TableMapping {
    schema: &'static EntitySchema,
    convention: ColumnConvention,
}

impl TableMapping {
    pub fn new(schema: &'static EntitySchema, convention: ColumnConvention) -> Self {
        Self { schema, convention }
    }

    /// Uses the schema's own default convention.
    pub fn for_schema(schema: &'static EntitySchema) -> Self {
        Self::new(schema, schema.convention)
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn table(&self) -> &'static str {
        self.schema.table
    }

    pub fn convention(&self) -> ColumnConvention {
        self.convention
    }

    /// Column written for `field` under the configured convention
    pub fn column_for(&self, field: &str) -> Option<String> {
        self.schema
            .field(field)
            .map(|spec| spec.column_name(self.convention))
    }

    /// Columns tried on read: configured convention, the others, then aliases.
    pub fn read_candidates(&self, spec: &FieldSpec) -> Vec<String> {
        let mut candidates = vec![spec.column_name(self.convention)];
        for convention in ColumnConvention::ALL {
            let column = spec.column_name(convention);
            if !candidates.contains(&column) {
                candidates.push(column);
            }
        }
        for alias in spec.aliases {
            if !candidates.iter().any(|c| c == alias) {
                candidates.push((*alias).to_string());
            }
        }
        candidates
    }

    /// Native columns requested on read: every column `decode` may resolve from.
    pub fn read_projection(&self) -> Vec<String> {
        let mut columns = vec![ID_COLUMN.to_string()];
        for spec in self.schema.fields {
            for column in self.read_candidates(spec) {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }
        columns
    }

    pub fn default_order(&self) -> OrderBy {
        let (key, direction) = self.schema.order;
        let field_name = match key {
            SortKey::Id => ID_COLUMN.to_string(),
            SortKey::Field(field) => self
                .column_for(field)
                .unwrap_or_else(|| ID_COLUMN.to_string()),
        };
        OrderBy {
            field_name,
            direction,
        }
    }

    pub fn condition(&self, filter: &FieldFilter) -> Result<Condition, ServiceError> {
        let column = if filter.field == ID_COLUMN {
            ID_COLUMN.to_string()
        } else {
            self.column_for(filter.field).ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "{} has no field named {}",
                    self.schema.entity, filter.field
                ))
            })?
        };
        Ok(Condition::new(column, filter.operator, filter.value.clone()))
    }

    /// Backend record to view-model JSON, every field present and defaulted.
    pub fn decode(&self, record: &Record) -> Result<Value, ServiceError> {
        let id = record_id(record).ok_or_else(|| {
            ServiceError::SerializationError(format!(
                "{} record without an {} column",
                self.schema.table, ID_COLUMN
            ))
        })?;

        let mut out = Map::new();
        out.insert(ID_COLUMN.to_string(), Value::from(id));
        for spec in self.schema.fields {
            let raw = self
                .read_candidates(spec)
                .iter()
                .filter_map(|column| record.get(column))
                .find(|value| !value.is_null())
                .cloned()
                .unwrap_or(Value::Null);
            insert_path(&mut out, spec.field, coerce_field(spec, &raw));
        }
        Ok(Value::Object(out))
    }

    /// Full record for create/update. Every field is written; omitted ones get
    /// their default, so an update replaces the whole record.
    pub fn encode(&self, input: &FormInput) -> Result<Record, ServiceError> {
        self.validate(input)?;
        let mut record = Record::new();
        for spec in self.schema.fields {
            let raw = lookup_path(input, spec.field).cloned().unwrap_or(Value::Null);
            record.insert(spec.column_name(self.convention), coerce_field(spec, &raw));
        }
        self.check_non_negative(&record)?;
        Ok(record)
    }

    /// Only the fields present in `input`, without required-field checks.
    pub fn encode_patch(&self, input: &FormInput) -> Result<Record, ServiceError> {
        let mut record = Record::new();
        for spec in self.schema.fields {
            if let Some(raw) = lookup_path(input, spec.field) {
                record.insert(spec.column_name(self.convention), coerce_field(spec, raw));
            }
        }
        self.check_non_negative(&record)?;
        Ok(record)
    }

    /// Required fields must be present and not blank.
    pub fn validate(&self, input: &FormInput) -> Result<(), ServiceError> {
        let missing: Vec<&FieldSpec> = self
            .schema
            .fields
            .iter()
            .filter(|spec| spec.required)
            .filter(|spec| {
                let raw = lookup_path(input, spec.field);
                match spec.kind {
                    FieldKind::Reference => raw.and_then(coerce::reference).is_none(),
                    FieldKind::Date => raw.and_then(coerce::date).is_none(),
                    _ => coerce::is_blank(raw),
                }
            })
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        let names: Vec<String> = missing.iter().map(|spec| humanize(spec.field)).collect();
        let verb = if names.len() == 1 { "is" } else { "are" };
        Err(ServiceError::ValidationError(format!(
            "{} {} required",
            capitalize(&join_names(&names)),
            verb
        )))
    }

    fn check_non_negative(&self, record: &Record) -> Result<(), ServiceError> {
        for spec in self.schema.fields.iter().filter(|spec| spec.non_negative) {
            let column = spec.column_name(self.convention);
            if let Some(value) = record.get(&column) {
                if coerce::number(value) < 0.0 {
                    return Err(ServiceError::ValidationError(format!(
                        "{} must not be negative",
                        capitalize(&humanize(spec.field))
                    )));
                }
            }
        }
        Ok(())
    }
}

fn coerce_field(spec: &FieldSpec, raw: &Value) -> Value {
    match spec.kind {
        FieldKind::Text { default } => Value::String(coerce::text(raw, default)),
        FieldKind::Number => coerce::number_value(coerce::number(raw)),
        FieldKind::Integer => Value::from(coerce::integer(raw)),
        FieldKind::Boolean => Value::Bool(coerce::boolean(raw)),
        FieldKind::Date => coerce::date_value(raw),
        FieldKind::Reference => coerce::reference(raw).map(Value::from).unwrap_or(Value::Null),
        FieldKind::Choice(vocabulary) => {
            Value::String(vocabulary.normalize(&coerce::text(raw, "")).value)
        }
    }
}

/// Reads a possibly dotted field from flat or nested input.
pub fn lookup_path<'a>(input: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = input.get(path) {
        return Some(value);
    }
    let mut parts = path.split('.');
    let mut current = input.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn insert_path(out: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

/// `plantingDate` -> `planting date`
fn humanize(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch == '.' || ch == '_' {
            out.push(' ');
        } else if ch.is_ascii_uppercase() {
            out.push(' ');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::vocabulary::INVENTORY_CATEGORIES;
    use crate::adapter::FieldSpec;
    use crate::store::SortDirection;
    use assert_matches::assert_matches;
    use serde_json::json;

    static FIELDS: [FieldSpec; 6] = [
        FieldSpec::text("itemName", "item_name").required(),
        FieldSpec::choice("category", "category", &INVENTORY_CATEGORIES).required(),
        FieldSpec::integer("currentStock", "current_stock").non_negative(),
        FieldSpec::date("expiryDate", "expiry_date").aliases(&["Expiry"]),
        FieldSpec::number("temperature.high", "temperature_high"),
        FieldSpec::text("name", "name").system("Name"),
    ];

    static SCHEMA: EntitySchema = EntitySchema {
        entity: "Item",
        table: "item_c",
        convention: ColumnConvention::PascalSuffixed,
        fields: &FIELDS,
        order: (SortKey::Id, SortDirection::Desc),
        page_limit: None,
        read_only: false,
    };

    fn form(value: Value) -> FormInput {
        value.as_object().cloned().unwrap()
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn reads_any_convention_and_aliases() {
        let mapping = TableMapping::for_schema(&SCHEMA);
        let decoded = mapping
            .decode(&record(json!({
                "Id": 3,
                "item_name_c": "Seed drill",
                "Category": "Equipments",
                "CurrentStock_c": "7",
                "Expiry": "2025-01-31T00:00:00Z",
                "Name": "drill",
            })))
            .unwrap();

        assert_eq!(decoded["Id"], 3);
        assert_eq!(decoded["itemName"], "Seed drill");
        assert_eq!(decoded["category"], "Equipment");
        assert_eq!(decoded["currentStock"], 7);
        assert_eq!(decoded["expiryDate"], "2025-01-31");
        assert_eq!(decoded["temperature"]["high"], 0.0);
        assert_eq!(decoded["name"], "drill");
    }

    #[test]
    fn configured_convention_wins_over_others() {
        let mapping = TableMapping::new(&SCHEMA, ColumnConvention::SnakeSuffixed);
        let decoded = mapping
            .decode(&record(json!({
                "Id": 1,
                "item_name_c": "current",
                "ItemName_c": "stale",
            })))
            .unwrap();
        assert_eq!(decoded["itemName"], "current");
    }

    #[test]
    fn read_projection_covers_fallback_columns() {
        let mapping = TableMapping::new(&SCHEMA, ColumnConvention::SnakeSuffixed);
        let columns = mapping.read_projection();

        assert_eq!(columns[0], "Id");
        assert_eq!(columns[1], "item_name_c");
        for column in ["ItemName_c", "ItemName", "Expiry", "Name"] {
            assert!(columns.iter().any(|c| c == column), "missing {}", column);
        }
        let names = columns.iter().filter(|c| c.as_str() == "Name").count();
        assert_eq!(names, 1);
    }

    #[test]
    fn writes_use_configured_convention() {
        let mapping = TableMapping::new(&SCHEMA, ColumnConvention::SnakeSuffixed);
        let encoded = mapping
            .encode(&form(json!({
                "itemName": "Hoe",
                "category": "tools",
                "temperature": {"high": "21.5"},
            })))
            .unwrap();

        assert_eq!(encoded["item_name_c"], "Hoe");
        assert_eq!(encoded["category_c"], "Equipment");
        assert_eq!(encoded["current_stock_c"], 0);
        assert_eq!(encoded["expiry_date_c"], Value::Null);
        assert_eq!(encoded["temperature_high_c"], 21.5);
        assert_eq!(encoded["Name"], "");
        assert!(!encoded.contains_key("Id"));
    }

    #[test]
    fn missing_required_fields_are_named() {
        let mapping = TableMapping::for_schema(&SCHEMA);
        assert_matches!(
            mapping.encode(&form(json!({"itemName": "  "}))),
            Err(ServiceError::ValidationError(msg)) if msg == "Item name and category are required"
        );
    }

    #[test]
    fn negative_values_are_rejected() {
        let mapping = TableMapping::for_schema(&SCHEMA);
        assert_matches!(
            mapping.encode_patch(&form(json!({"currentStock": -2}))),
            Err(ServiceError::ValidationError(msg)) if msg == "Current stock must not be negative"
        );
    }

    #[test]
    fn patch_only_writes_supplied_fields() {
        let mapping = TableMapping::for_schema(&SCHEMA);
        let patch = mapping
            .encode_patch(&form(json!({"currentStock": "12"})))
            .unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["CurrentStock_c"], 12);
    }

    #[test]
    fn filters_translate_to_columns() {
        let mapping = TableMapping::for_schema(&SCHEMA);
        let condition = mapping
            .condition(&FieldFilter::eq("itemName", "Hoe"))
            .unwrap();
        assert_eq!(condition.field_name, "ItemName_c");
        assert!(mapping.condition(&FieldFilter::eq("bogus", 1)).is_err());
    }

    #[test]
    fn decode_requires_an_id() {
        let mapping = TableMapping::for_schema(&SCHEMA);
        assert_matches!(
            mapping.decode(&record(json!({"ItemName_c": "x"}))),
            Err(ServiceError::SerializationError(_))
        );
    }
}
