//! Builds arxiv API request urls, either for a category listing or for explicit ids.

use crate::error::{Result, ScrapeError};

// category listing, newest submissions first.
macro_rules! category_url {
    () => { concat!(
        "{}search_query={}&start={}&max_results={}",
        "&sortBy=submittedDate&sortOrder=descending"
    ) }
}

/// A request descriptor. Exactly one mode is active.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Category {
        category: String,
        start: u32,
        page_size: u32
    },
    IdList(Vec<String>)
}

impl Query {
    /// Category wins over an id list; an empty category or empty list counts as absent.
    pub fn from_parts(
        start: u32,
        page_size: u32,
        category: Option<&str>,
        id_list: Option<&[String]>
    ) -> Result<Self> {
        match (category, id_list) {
            (Some(category), _) if !category.is_empty() => Ok(Query::Category {
                category: category.to_string(),
                start,
                page_size
            }),
            (_, Some(ids)) if !ids.is_empty() => Ok(Query::IdList(ids.to_vec())),
            _ => Err(ScrapeError::InvalidQuery)
        }
    }

    pub fn to_url(&self, base_url: &str) -> String {
        match self {
            Query::Category { category, start, page_size } => {
                format!(category_url!(), base_url, category, start, page_size)
            }
            Query::IdList(ids) => format!("{}id_list={}", base_url, ids.join(","))
        }
    }

    /// Same query for another page. Id lists have no paging.
    pub fn with_page(&self, start: u32, page_size: u32) -> Self {
        match self {
            Query::Category { category, .. } => Query::Category {
                category: category.clone(),
                start,
                page_size
            },
            Query::IdList(ids) => Query::IdList(ids.clone())
        }
    }
}

/// Request string for either a category page or a list of ids.
/// `start` and `page_size` are ignored in id-list mode.
pub fn generate_query(
    start: u32,
    page_size: u32,
    base_url: &str,
    category: Option<&str>,
    id_list: Option<&[String]>
) -> Result<String> {
    Query::from_parts(start, page_size, category, id_list).map(|query| query.to_url(base_url))
}
