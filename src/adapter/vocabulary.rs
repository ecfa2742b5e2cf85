//! Enumeration vocabularies.
//!
//! Backend values drift in case and spelling (`suplies`, `Equipments`).
//! Each vocabulary maps every accepted spelling to one canonical term.

use serde::Serialize;

/// One canonical value of a vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Term {
    /// Value written back to the store
    pub value: &'static str,
    /// Display label
    pub label: &'static str,
    /// Icon name; rendering is left to the client
    pub icon: &'static str,
    /// Extra spellings accepted on read, lower-case
    #[serde(skip)]
    pub spellings: &'static [&'static str],
}

/// Result of normalising a raw value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    pub value: String,
    pub label: String,
    pub icon: &'static str,
    /// False when the raw value matched no term
    pub known: bool,
}

#[derive(Debug)]
pub struct Vocabulary {
    pub name: &'static str,
    pub terms: &'static [Term],
    /// Index into `terms` used for blank input; `None` leaves blanks blank
    pub default: Option<usize>,
    /// Strict vocabularies replace unknown values with the default;
    /// open ones pass them through trimmed.
    pub strict: bool,
    pub fallback_icon: &'static str,
}

impl Vocabulary {
    pub fn default_term(&self) -> Option<&Term> {
        self.default.and_then(|index| self.terms.get(index))
    }

    /// Case-insensitive lookup over values, labels and drifted spellings.
    pub fn lookup(&self, raw: &str) -> Option<&Term> {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.terms.iter().find(|term| {
            term.value.eq_ignore_ascii_case(&needle)
                || term.label.eq_ignore_ascii_case(&needle)
                || term.spellings.iter().any(|s| *s == needle)
        })
    }

    pub fn normalize(&self, raw: &str) -> Normalized {
        if let Some(term) = self.lookup(raw) {
            return known(term);
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() || self.strict {
            return match self.default_term() {
                Some(term) => known(term),
                None => Normalized {
                    value: String::new(),
                    label: String::new(),
                    icon: self.fallback_icon,
                    known: false,
                },
            };
        }

        Normalized {
            value: trimmed.to_string(),
            label: trimmed.to_string(),
            icon: self.fallback_icon,
            known: false,
        }
    }

    /// Canonical label, used when comparing categories across spellings.
    pub fn label_of(&self, raw: &str) -> String {
        self.normalize(raw).label
    }

    pub fn icon_of(&self, raw: &str) -> &'static str {
        self.normalize(raw).icon
    }
}

fn known(term: &Term) -> Normalized {
    Normalized {
        value: term.value.to_string(),
        label: term.label.to_string(),
        icon: term.icon,
        known: true,
    }
}

const fn term(value: &'static str, label: &'static str, icon: &'static str) -> Term {
    Term {
        value,
        label,
        icon,
        spellings: &[],
    }
}

const fn term_with(
    value: &'static str,
    label: &'static str,
    icon: &'static str,
    spellings: &'static [&'static str],
) -> Term {
    Term {
        value,
        label,
        icon,
        spellings,
    }
}

pub static INVENTORY_CATEGORIES: Vocabulary = Vocabulary {
    name: "inventory category",
    terms: &[
        term_with("Seeds", "Seeds", "Sprout", &["seed"]),
        term_with("Fertilizers", "Fertilizers", "Beaker", &["fertilizer", "fertiliser", "fertilisers"]),
        term_with("Equipment", "Equipment", "Wrench", &["equipments", "tools"]),
        term_with("Supplies", "Supplies", "Package", &["supply", "suplies", "suppies"]),
    ],
    default: None,
    strict: false,
    fallback_icon: "Package",
};

pub static CROP_STATUSES: Vocabulary = Vocabulary {
    name: "crop status",
    terms: &[
        term("planted", "Planted", "Sprout"),
        term("growing", "Growing", "TrendingUp"),
        term("ready", "Ready", "CheckCircle"),
        term("harvested", "Harvested", "Package"),
    ],
    default: Some(0),
    strict: true,
    fallback_icon: "Sprout",
};

pub static TASK_PRIORITIES: Vocabulary = Vocabulary {
    name: "task priority",
    terms: &[
        term("low", "Low", "ArrowDown"),
        term_with("medium", "Medium", "Minus", &["normal"]),
        term_with("high", "High", "AlertTriangle", &["urgent"]),
    ],
    default: Some(1),
    strict: true,
    fallback_icon: "Minus",
};

pub static FINANCIAL_TYPES: Vocabulary = Vocabulary {
    name: "financial type",
    terms: &[
        term_with("income", "Income", "TrendingUp", &["revenue"]),
        term_with("expense", "Expense", "TrendingDown", &["expenses", "cost"]),
    ],
    default: Some(1),
    strict: true,
    fallback_icon: "DollarSign",
};

pub static WEATHER_CONDITIONS: Vocabulary = Vocabulary {
    name: "weather condition",
    terms: &[
        term_with("sunny", "Sunny", "Sun", &["clear"]),
        term_with("partly-cloudy", "Partly Cloudy", "CloudSun", &["partly cloudy", "partly_cloudy"]),
        term_with("cloudy", "Cloudy", "Cloud", &["overcast"]),
        term_with("rainy", "Rainy", "CloudRain", &["rain"]),
        term_with("stormy", "Stormy", "CloudLightning", &["storm", "thunderstorm"]),
        term_with("snowy", "Snowy", "Snowflake", &["snow"]),
    ],
    default: Some(0),
    strict: false,
    fallback_icon: "Sun",
};
