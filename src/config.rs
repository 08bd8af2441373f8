use std::{env, path::PathBuf};

use crate::error::{Result, ScrapeError};

const ENV_FILE: &str = "arxivscraper.env";

pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/api/query?";
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const ARXIV_NAMESPACE: &str = "http://arxiv.org/schemas/atom";

/// The two vocabularies found in an arxiv feed: generic Atom elements and
/// arxiv-specific metadata (affiliation, primary_category, comment, doi, journal_ref).
#[derive(Debug, Clone, PartialEq)]
pub struct Namespaces {
    pub atom: String,
    pub arxiv: String
}

impl Default for Namespaces {
    fn default() -> Self {
        Namespaces {
            atom: ATOM_NAMESPACE.to_string(),
            arxiv: ARXIV_NAMESPACE.to_string()
        }
    }
}

/// Endpoint and feed settings shared by the query builder and the response parser.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub namespaces: Namespaces,
    pub abs_url: String,
    pub pdf_url: String,
    /// Seconds before the single GET gives up. 0 means no bound.
    pub timeout_secs: u64
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            namespaces: Namespaces::default(),
            abs_url: String::from("http://arxiv.org/abs/"),
            pdf_url: String::from("http://arxiv.org/pdf/"),
            timeout_secs: 60
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Defaults overridden by `ARXIV_*` variables, optionally loaded from `arxivscraper.env`.
    pub fn from_env() -> Result<Self> {
        // the env file is optional; variables may already be exported.
        dotenvy::from_filename(ENV_FILE).ok();
        let mut config = ApiConfig::default();
        if let Some(url) = get_env_string("ARXIV_API_URL") {
            config.base_url = url;
        }
        if let Some(ns) = get_env_string("ARXIV_ATOM_NS") {
            config.namespaces.atom = ns;
        }
        if let Some(ns) = get_env_string("ARXIV_META_NS") {
            config.namespaces.arxiv = ns;
        }
        if let Some(secs) = get_u64_from_env("ARXIV_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        Ok(config)
    }
}

/// Parameters of one driver run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub category: Option<String>,
    pub id_list: Option<Vec<String>>,
    pub start: u32,
    /// Upper bound on rows for category runs. The default is a single page of 100,
    /// not a bulk crawl; raise it (with `wait_time` between pages) to page further.
    pub total_results: u32,
    pub page_size: u32,
    /// Fixed idle interval between pages, in seconds.
    pub wait_time: u64,
    pub output_dir: PathBuf,
    pub file_name: String
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            category: Some(String::from("cat:hep-th")),
            id_list: None,
            start: 0,
            total_results: 100,
            page_size: 100,
            wait_time: 5,
            output_dir: PathBuf::from("."),
            file_name: String::from("example_file_2019")
        }
    }
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ScrapeError::Config("page_size must be positive".to_string()));
        }
        if self.total_results == 0 {
            return Err(ScrapeError::Config("total_results must be positive".to_string()));
        }
        if self.file_name.trim().is_empty() {
            return Err(ScrapeError::Config("file_name must not be empty".to_string()));
        }
        Ok(())
    }
}

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_u64_from_env(key: &str) -> Result<Option<u64>> {
    match get_env_string(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScrapeError::Config(format!("failed to parse {} as an integer: {}", key, raw)))
    }
}
