use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Classification bucket for an API resource, derived from its discovery URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFamily {
    Loans,
    Financings,
}

impl ProductFamily {
    /// In classification precedence order.
    pub const ALL: [ProductFamily; 2] = [ProductFamily::Loans, ProductFamily::Financings];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductFamily::Loans => "loans",
            ProductFamily::Financings => "financings",
        }
    }

    /// Substring that marks a discovery URL as belonging to this family.
    pub fn marker(self) -> &'static str {
        match self {
            ProductFamily::Loans => "opendata-loans",
            ProductFamily::Financings => "opendata-financings",
        }
    }

    /// `<environment>.<family>.rates`
    pub fn collection_name(self, environment: &str) -> String {
        format!("{}.{}.rates", environment, self.as_str())
    }

    /// Match a discovery URL against the family markers. Loans wins when both match.
    pub fn from_endpoint_url(url: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| url.contains(family.marker()))
    }
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One API resource matched to a product family. Produced fresh each cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub organisation_id: String,
    pub family: ProductFamily,
    /// Raw ApiResource object, stored unmodified
    pub payload: Value,
}

/// Classifier output, partitioned by family in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub loans: Vec<ClassifiedRecord>,
    pub financings: Vec<ClassifiedRecord>,
}

impl Classified {
    /// Partition records by family, keeping their relative order.
    pub fn from_records(records: impl IntoIterator<Item = ClassifiedRecord>) -> Self {
        let mut classified = Self::default();
        for record in records {
            classified.push(record);
        }
        classified
    }

    pub fn push(&mut self, record: ClassifiedRecord) {
        match record.family {
            ProductFamily::Loans => self.loans.push(record),
            ProductFamily::Financings => self.financings.push(record),
        }
    }

    pub fn family(&self, family: ProductFamily) -> &[ClassifiedRecord] {
        match family {
            ProductFamily::Loans => &self.loans,
            ProductFamily::Financings => &self.financings,
        }
    }

    pub fn len(&self) -> usize {
        self.loans.len() + self.financings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Upsert keyed by `organisationId` that replaces `data` wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOp {
    pub organisation_id: String,
    pub data: Value,
}

impl From<&ClassifiedRecord> for UpsertOp {
    fn from(record: &ClassifiedRecord) -> Self {
        Self {
            organisation_id: record.organisation_id.clone(),
            data: record.payload.clone(),
        }
    }
}

/// Document persisted per (organisation, family).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "organisationId")]
    pub organisation_id: String,
    pub data: Value,
}

/// Counts reported by the store for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
}
