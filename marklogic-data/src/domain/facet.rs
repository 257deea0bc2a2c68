use crate::client::RawFacet;

/// One distinct value of a facet and the number of matches carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FacetValue {
    label: String,
    count: u64,
}

impl FacetValue {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        FacetValue {
            label: label.into(),
            count,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// The breakdown of a search's matches by the distinct values of one
/// property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetResult {
    name: String,
    values: Vec<FacetValue>,
}

impl FacetResult {
    pub fn new(name: impl Into<String>, values: Vec<FacetValue>) -> Self {
        FacetResult {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[FacetValue] {
        &self.values
    }

    /// Number of distinct values, not the sum of their counts.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, label: &str) -> Option<&FacetValue> {
        self.values.iter().find(|v| v.label == label)
    }

    /// Sum of the per-value counts.
    pub fn total(&self) -> u64 {
        self.values.iter().map(|v| v.count).sum()
    }
}

impl From<&RawFacet> for FacetResult {
    fn from(raw: &RawFacet) -> Self {
        FacetResult {
            name: raw.name.clone(),
            values: raw
                .values
                .iter()
                .map(|(label, count)| FacetValue::new(label.clone(), *count))
                .collect(),
        }
    }
}
