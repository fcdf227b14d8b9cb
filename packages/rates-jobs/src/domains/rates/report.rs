//! Flattens stored loan documents into rate rows for the dashboard.
//!
//! Each entry of `loans.data[]` contributes one row per interest rate. Rates
//! are fractions upstream (`0.0525`) and are shown as Brazilian-formatted
//! percentages (`5,25%`).

use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub const NOT_INFORMED: &str = "Não informado";

const PERSONAL_LOANS_FAMILY: &str = "opendata-loans_personal-loans";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    Natural,
    Business,
}

impl PersonType {
    /// Personal-loans family → natural person; anything else → business.
    pub fn from_family_type(api_family_type: Option<&str>) -> Self {
        if api_family_type == Some(PERSONAL_LOANS_FAMILY) {
            PersonType::Natural
        } else {
            PersonType::Business
        }
    }
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonType::Natural => f.write_str("Pessoa Física"),
            PersonType::Business => f.write_str("Pessoa Jurídica"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRow {
    pub organisation: Option<String>,
    pub brand: Option<String>,
    pub loan_type: String,
    pub minimum_rate: String,
    pub maximum_rate: String,
    pub referential_indexer: String,
    pub required_warranties: String,
    pub person_type: PersonType,
    pub terms_conditions: Option<String>,
}

/// Look `key` up on the document, then under its `data` payload.
fn field<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    document
        .get(key)
        .or_else(|| document.get("data").and_then(|data| data.get(key)))
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn items(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// `"CREDITO_PESSOAL_CONSIGNADO"` → `"Credito Pessoal Consignado"`
pub fn humanize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_alphabetic = false;

    for c in raw.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if previous_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            out.push(c);
            previous_alphabetic = false;
        }
    }

    out
}

/// Fraction → percentage with comma decimals: `0.0525` → `"5,25%"`.
///
/// Accepts numbers or numeric strings; anything else reads as not informed.
pub fn format_rate(raw: Option<&Value>) -> String {
    let rate = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match rate {
        Some(rate) if rate.is_finite() => format!("{:.2}%", rate * 100.0).replace('.', ","),
        _ => NOT_INFORMED.to_string(),
    }
}

fn warranties(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => humanize(s),
        Some(Value::Array(list)) => {
            let names: Vec<String> = list.iter().filter_map(Value::as_str).map(humanize).collect();
            if names.is_empty() {
                NOT_INFORMED.to_string()
            } else {
                names.join(", ")
            }
        }
        _ => NOT_INFORMED.to_string(),
    }
}

/// Flatten one stored loans document.
pub fn flatten_document(document: &Value) -> Vec<RateRow> {
    let organisation = text(field(document, "organisationName"));
    let person_type = PersonType::from_family_type(
        field(document, "ApiFamilyType").and_then(Value::as_str),
    );
    let loans = field(document, "loans").and_then(|loans| loans.get("data"));

    let mut rows = Vec::new();
    for loan in items(loans) {
        let brand = text(loan.get("participant").and_then(|p| p.get("brand")));
        let loan_type = loan
            .get("type")
            .and_then(Value::as_str)
            .map(humanize)
            .unwrap_or_else(|| NOT_INFORMED.to_string());
        let required_warranties = warranties(loan.get("requiredWarranties"));
        let terms_conditions = text(loan.get("termsConditions"));

        for rate in items(loan.get("interestRates")) {
            rows.push(RateRow {
                organisation: organisation.clone(),
                brand: brand.clone(),
                loan_type: loan_type.clone(),
                minimum_rate: format_rate(rate.get("minimumRate")),
                maximum_rate: format_rate(rate.get("maximumRate")),
                referential_indexer: rate
                    .get("referentialRateIndexer")
                    .and_then(Value::as_str)
                    .map(humanize)
                    .unwrap_or_else(|| NOT_INFORMED.to_string()),
                required_warranties: required_warranties.clone(),
                person_type,
                terms_conditions: terms_conditions.clone(),
            });
        }
    }

    rows
}

pub fn flatten_documents(documents: &[Value]) -> Vec<RateRow> {
    documents.iter().flat_map(flatten_document).collect()
}

/// Row filter. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct RateFilter {
    pub person_type: Option<PersonType>,
    pub brands: Vec<String>,
    /// Humanised loan types, e.g. `"Credito Pessoal Consignado"`.
    pub loan_types: Vec<String>,
}

impl RateFilter {
    pub fn matches(&self, row: &RateRow) -> bool {
        if let Some(person_type) = self.person_type {
            if row.person_type != person_type {
                return false;
            }
        }

        if !self.brands.is_empty() {
            let Some(brand) = &row.brand else {
                return false;
            };
            if !self.brands.iter().any(|b| b.eq_ignore_ascii_case(brand)) {
                return false;
            }
        }

        if !self.loan_types.is_empty()
            && !self
                .loan_types
                .iter()
                .any(|t| t.to_lowercase() == row.loan_type.to_lowercase())
        {
            return false;
        }

        true
    }

    /// Keep matching rows, ordered by loan type. Ties keep document order.
    pub fn apply(&self, rows: Vec<RateRow>) -> Vec<RateRow> {
        let mut rows: Vec<RateRow> = rows.into_iter().filter(|row| self.matches(row)).collect();
        rows.sort_by(|a, b| a.loan_type.cmp(&b.loan_type));
        rows
    }
}
