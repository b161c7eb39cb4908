mod load;
mod parse;

pub use load::load_records;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationRecord {
    pub source: String,
    pub target: String,
    pub label: String,
    pub details: Vec<String>,
}

impl RelationRecord {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
            details: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    pub fn attribute(&self) -> Option<String> {
        let parts = self
            .details
            .iter()
            .map(|detail| detail.trim())
            .filter(|detail| !detail.is_empty())
            .collect::<Vec<_>>();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" / "))
        }
    }
}
