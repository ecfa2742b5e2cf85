/*!
 * # Record Adapter
 *
 * Field tables that translate between the stable field names used by the
 * entity view models and the backend's column names, which differ between
 * deployments (`size_acres_c`, `SizeAcres_c`, `SizeAcres`).
 *
 * Every entity is described by a static [`EntitySchema`]. Correcting a column
 * name, adding a historical alias or fixing an enumeration spelling is a data
 * change in the schema or in [`vocabulary`], never a code change.
 */

use serde::{Deserialize, Serialize};

use crate::store::SortDirection;

pub mod coerce;
pub mod mapping;
pub mod vocabulary;

pub use mapping::{FieldFilter, FormInput, TableMapping};
pub use vocabulary::{Term, Vocabulary};

/// Column naming convention of one backend deployment
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColumnConvention {
    /// `size_acres_c`
    SnakeSuffixed,
    /// `SizeAcres_c`
    PascalSuffixed,
    /// `SizeAcres`
    Pascal,
}

impl ColumnConvention {
    pub const ALL: [ColumnConvention; 3] = [
        ColumnConvention::SnakeSuffixed,
        ColumnConvention::PascalSuffixed,
        ColumnConvention::Pascal,
    ];

    /// Renders a snake_case stem in this convention.
    pub fn render(self, stem: &str) -> String {
        match self {
            ColumnConvention::SnakeSuffixed => format!("{}_c", stem),
            ColumnConvention::PascalSuffixed => format!("{}_c", pascal_case(stem)),
            ColumnConvention::Pascal => pascal_case(stem),
        }
    }
}

fn pascal_case(stem: &str) -> String {
    stem.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Where a field lives in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Rendered through the table's naming convention
    Stem(&'static str),
    /// Same name in every deployment (`Name`)
    System(&'static str),
}

/// Value type of a field, which also fixes its default
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text { default: &'static str },
    /// Floating point, default 0
    Number,
    /// Whole number, default 0
    Integer,
    /// Default false
    Boolean,
    /// ISO date or null
    Date,
    /// Soft foreign key: positive id or null
    Reference,
    /// Normalised through a vocabulary; default is the vocabulary's default
    Choice(&'static Vocabulary),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// View-model field name; dotted paths nest (`temperature.high`)
    pub field: &'static str,
    pub column: Column,
    pub kind: FieldKind,
    pub required: bool,
    pub non_negative: bool,
    /// Historical column names accepted on read only
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    const fn new(field: &'static str, stem: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            column: Column::Stem(stem),
            kind,
            required: false,
            non_negative: false,
            aliases: &[],
        }
    }

    pub const fn text(field: &'static str, stem: &'static str) -> Self {
        Self::new(field, stem, FieldKind::Text { default: "" })
    }

    pub const fn text_or(field: &'static str, stem: &'static str, default: &'static str) -> Self {
        Self::new(field, stem, FieldKind::Text { default })
    }

    pub const fn number(field: &'static str, stem: &'static str) -> Self {
        Self::new(field, stem, FieldKind::Number)
    }

    pub const fn integer(field: &'static str, stem: &'static str) -> Self {
        Self::new(field, stem, FieldKind::Integer)
    }

    pub const fn boolean(field: &'static str, stem: &'static str) -> Self {
        Self::new(field, stem, FieldKind::Boolean)
    }

    pub const fn date(field: &'static str, stem: &'static str) -> Self {
        Self::new(field, stem, FieldKind::Date)
    }

    pub const fn reference(field: &'static str, stem: &'static str) -> Self {
        Self::new(field, stem, FieldKind::Reference)
    }

    pub const fn choice(field: &'static str, stem: &'static str, vocabulary: &'static Vocabulary) -> Self {
        Self::new(field, stem, FieldKind::Choice(vocabulary))
    }

    pub const fn system(self, column: &'static str) -> Self {
        Self {
            column: Column::System(column),
            ..self
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn non_negative(self) -> Self {
        Self {
            non_negative: true,
            ..self
        }
    }

    pub const fn aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    /// Column name for this field under `convention`
    pub fn column_name(&self, convention: ColumnConvention) -> String {
        match self.column {
            Column::Stem(stem) => convention.render(stem),
            Column::System(name) => name.to_string(),
        }
    }
}

/// Default listing order
#[derive(Debug, Clone, Copy)]
pub enum SortKey {
    Id,
    Field(&'static str),
}

/// Field table for one entity type
#[derive(Debug)]
pub struct EntitySchema {
    /// Display name used in messages ("Crop")
    pub entity: &'static str,
    pub table: &'static str,
    pub convention: ColumnConvention,
    pub fields: &'static [FieldSpec],
    pub order: (SortKey, SortDirection),
    /// Overrides the configured page size
    pub page_limit: Option<u32>,
    pub read_only: bool,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.field == name)
    }
}
