use std::{sync::OnceLock, time::Duration};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::ApiConfig,
    error::{Result, ScrapeError},
    model::{split_version, ArxivRecord, Author, ResultTable},
    query::Query,
    xml::{self, Element}
};

const HTML_LINK: &str = "text/html";
const PDF_LINK: &str = "application/pdf";

/// Fetches one feed page and maps its entries onto `ArxivRecord`s.
#[derive(Debug)]
pub struct ArxivParser {
    config: ApiConfig,
    client: Client
}

impl ArxivParser {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        Ok(Self::with_client(config, builder.build()?))
    }

    pub fn with_client(config: ApiConfig, client: Client) -> Self {
        ArxivParser {
            config,
            client
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn query_url(&self, query: &Query) -> String {
        query.to_url(&self.config.base_url)
    }

    async fn get_raw_xml(&self, url: &str) -> Result<String> {
        let response = self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// One GET, then the whole body is parsed. Any failure discards the page.
    pub async fn run_query(&self, url: &str) -> Result<ResultTable> {
        info!(query = url, "executing query");
        let xml = self.get_raw_xml(url).await?;
        let table = self.parse_feed(&xml)?;
        info!(rows = table.len(), "query returned results");
        Ok(table)
    }

    pub fn parse_feed(&self, xml: &str) -> Result<ResultTable> {
        let ns = &self.config.namespaces;
        let root = xml::parse_document(xml)?;
        if !root.is(&ns.atom, "feed") {
            return Err(ScrapeError::Parse(format!("expected an atom <feed> root, found <{}>", root.name)));
        }

        let mut table = ResultTable::new();
        for entry in root.find_all(&ns.atom, "entry") {
            // empty result sets come back as a single entry without an id.
            let Some(id) = entry.find_text(&ns.atom, "id") else {
                debug!("skipping placeholder entry without id");
                continue;
            };
            table.push(self.parse_entry(entry, id.trim())?);
        }
        Ok(table)
    }

    fn parse_entry(&self, entry: &Element, id: &str) -> Result<ArxivRecord> {
        let ns = &self.config.namespaces;

        let title = normalize_title(required_text(entry, &ns.atom, "title", id)?);
        let published = parse_timestamp(required_text(entry, &ns.atom, "published", id)?)?;
        let updated = parse_timestamp(required_text(entry, &ns.atom, "updated", id)?)?;
        let summary = normalize_summary(required_text(entry, &ns.atom, "summary", id)?);

        let authors = entry.find_all(&ns.atom, "author")
            .map(|author| -> Result<Author> {
                Ok(Author {
                    name: required_text(author, &ns.atom, "name", id)?.trim().to_string(),
                    affiliations: author.find_all(&ns.arxiv, "affiliation")
                        .map(|a| a.text().trim().to_string())
                        .collect()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let arxiv_link_with_arxiv_version = typed_link(entry, &ns.atom, HTML_LINK, id)?;
        let pdf_link_with_arxiv_version = typed_link(entry, &ns.atom, PDF_LINK, id)?;

        let primary_category = entry.find(&ns.arxiv, "primary_category")
            .and_then(|e| e.attr("term"))
            .ok_or_else(|| missing_element(id, "arxiv:primary_category"))?
            .to_string();
        let categories = entry.find_all(&ns.atom, "category")
            .filter_map(|e| e.attr("term"))
            .map(String::from)
            .collect();

        // not every entry carries these.
        let comment = entry.find_text(&ns.arxiv, "comment").map(String::from);
        let doi = entry.find_text(&ns.arxiv, "doi").map(String::from);
        let journal_reference = entry.find_text(&ns.arxiv, "journal_ref").map(String::from);

        let segment = abs_segment(&arxiv_link_with_arxiv_version)?;
        let (arxiv_id, arxiv_version) = split_version(segment);
        let arxiv_link = format!("{}{}", self.config.abs_url, arxiv_id);
        let pdf_link = format!("{}{}", self.config.pdf_url, arxiv_id);

        Ok(ArxivRecord {
            title,
            published,
            updated,
            summary,
            authors,
            primary_category,
            categories,
            comment,
            doi,
            journal_reference,
            arxiv_id: arxiv_id.to_string(),
            arxiv_version: arxiv_version.to_string(),
            arxiv_link,
            pdf_link,
            arxiv_link_with_arxiv_version,
            pdf_link_with_arxiv_version
        })
    }
}

fn required_text<'a>(parent: &'a Element, ns: &str, name: &str, id: &str) -> Result<&'a str> {
    parent.find_text(ns, name).ok_or_else(|| missing_element(id, name))
}

fn missing_element(id: &str, name: &str) -> ScrapeError {
    ScrapeError::Parse(format!("entry {} is missing <{}>", id, name))
}

fn typed_link(entry: &Element, ns: &str, link_type: &str, id: &str) -> Result<String> {
    entry.find_all(ns, "link")
        .find(|link| link.attr("type") == Some(link_type))
        .and_then(|link| link.attr("href"))
        .map(String::from)
        .ok_or_else(|| ScrapeError::MissingLink {
            entry: id.to_string(),
            link_type: link_type.to_string()
        })
}

fn abs_segment(link: &str) -> Result<&str> {
    link.rfind("/abs/")
        .map(|idx| &link[idx + "/abs/".len()..])
        .ok_or_else(|| ScrapeError::Parse(format!("html link has no /abs/ segment: {}", link)))
}

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn normalize_title(raw: &str) -> String {
    whitespace().replace_all(raw.trim(), " ").into_owned()
}

fn normalize_summary(raw: &str) -> String {
    raw.trim().lines().collect::<Vec<_>>().join(" ")
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ScrapeError::Parse(format!("invalid timestamp: {}", raw)))
}
