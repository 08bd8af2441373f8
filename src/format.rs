use chrono::SecondsFormat;

use crate::{
    error::Result,
    model::ArxivRecord
};

// Formatter for table rows. Nested fields are stored as json inside a single cell.
pub struct Formatter;

impl Formatter {
    /// One cell per entry of `model::COLUMNS`, in that order. Absent optionals are empty.
    pub fn to_row(data: &ArxivRecord) -> Result<Vec<String>> {
        Ok(vec![
            data.title.clone(),
            data.published.to_rfc3339_opts(SecondsFormat::Secs, true),
            data.updated.to_rfc3339_opts(SecondsFormat::Secs, true),
            data.summary.clone(),
            serde_json::to_string(&data.authors)?,
            data.arxiv_link_with_arxiv_version.clone(),
            data.pdf_link_with_arxiv_version.clone(),
            data.primary_category.clone(),
            serde_json::to_string(&data.categories)?,
            data.comment.clone().unwrap_or_default(),
            data.doi.clone().unwrap_or_default(),
            data.journal_reference.clone().unwrap_or_default(),
            data.arxiv_id.clone(),
            data.arxiv_version.clone(),
            data.arxiv_link.clone(),
            data.pdf_link.clone()
        ])
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{Author, COLUMNS};

    fn record() -> ArxivRecord {
        ArxivRecord {
            title: "A Title".to_string(),
            published: Utc.with_ymd_and_hms(2013, 12, 9, 5, 57, 57).unwrap(),
            updated: Utc.with_ymd_and_hms(2014, 2, 3, 12, 0, 0).unwrap(),
            summary: "An abstract.".to_string(),
            authors: vec![
                Author { name: "Ada Lovelace".to_string(), affiliations: vec!["Royal Society".to_string()] },
                Author { name: "Charles Babbage".to_string(), affiliations: vec![] }
            ],
            arxiv_link_with_arxiv_version: "http://arxiv.org/abs/1312.2261v2".to_string(),
            pdf_link_with_arxiv_version: "http://arxiv.org/pdf/1312.2261v2".to_string(),
            primary_category: "hep-th".to_string(),
            categories: vec!["hep-th".to_string(), "gr-qc".to_string()],
            comment: None,
            doi: Some("10.1007/JHEP02(2014)001".to_string()),
            journal_reference: None,
            arxiv_id: "1312.2261".to_string(),
            arxiv_version: "v2".to_string(),
            arxiv_link: "http://arxiv.org/abs/1312.2261".to_string(),
            pdf_link: "http://arxiv.org/pdf/1312.2261".to_string()
        }
    }

    #[test]
    fn test_row_layout() {
        let row = Formatter::to_row(&record()).unwrap();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[1], "2013-12-09T05:57:57Z");
        assert_eq!(
            row[4],
            r#"[{"name":"Ada Lovelace","affiliations":["Royal Society"]},{"name":"Charles Babbage","affiliations":[]}]"#
        );
        assert_eq!(row[8], r#"["hep-th","gr-qc"]"#);
        assert_eq!(row[9], "");
        assert_eq!(row[10], "10.1007/JHEP02(2014)001");
        assert_eq!(row[11], "");
        assert_eq!(row[13], "v2");
    }
}
