//! One-shot driver: build the query, run it, write the table.
//!
//! Category runs may span several pages when `total_results` exceeds `page_size`,
//! and never return more than `total_results` rows.
//! Pages are fetched one after another with a fixed pause in between, and the run
//! stops at the first empty page. Nothing is written unless every page succeeded.

use std::{path::PathBuf, time::Duration};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::{
    config::HarvestConfig,
    error::Result,
    model::ResultTable,
    parser::ArxivParser,
    query::Query,
    storage::LocalSaver
};

#[derive(Debug)]
pub struct HarvestReport {
    pub queries: Vec<String>,
    pub rows: usize,
    pub path: PathBuf
}

pub struct Harvester {
    parser: ArxivParser,
    config: HarvestConfig
}

impl Harvester {
    pub fn new(parser: ArxivParser, config: HarvestConfig) -> Self {
        Harvester {
            parser,
            config
        }
    }

    /// `(start, max_results)` for each request of this run. Category pages never reach
    /// past `start + total_results`; the last one shrinks to what is left.
    /// Id-list queries are always a single request.
    fn pages(&self, query: &Query) -> Vec<(u32, u32)> {
        let start = self.config.start;
        match query {
            Query::IdList(_) => vec![(start, self.config.page_size)],
            Query::Category { page_size, .. } => {
                let end = start.saturating_add(self.config.total_results);
                (start..end)
                    .step_by(*page_size as usize)
                    .map(|page_start| (page_start, (*page_size).min(end - page_start)))
                    .collect()
            }
        }
    }

    pub async fn fetch(&self) -> Result<(Vec<String>, ResultTable)> {
        self.config.validate()?;
        let query = Query::from_parts(
            self.config.start,
            self.config.page_size,
            self.config.category.as_deref(),
            self.config.id_list.as_deref()
        )?;

        let mut queries = Vec::new();
        let mut table = ResultTable::new();
        for (page, (start, page_size)) in self.pages(&query).into_iter().enumerate() {
            if page > 0 && self.config.wait_time > 0 {
                debug!(seconds = self.config.wait_time, "waiting before next page");
                sleep(Duration::from_secs(self.config.wait_time)).await;
            }
            let url = self.parser.query_url(&query.with_page(start, page_size));
            let mut page_table = self.parser.run_query(&url).await?;
            queries.push(url);
            if page_table.is_empty() {
                debug!(page, "empty page, stopping");
                break;
            }
            debug!(page, documents = page_table.len(), "page fetched");
            table.append(&mut page_table);
        }
        if matches!(query, Query::Category { .. }) {
            table.truncate(self.config.total_results as usize);
        }
        Ok((queries, table))
    }

    pub async fn run(&self) -> Result<HarvestReport> {
        let (queries, table) = self.fetch().await?;
        let path = LocalSaver::save_table_as_csv_gz(&self.config.output_dir, &self.config.file_name, &table)?;
        info!(rows = table.len(), path = %path.display(), "harvest finished");
        Ok(HarvestReport {
            queries,
            rows: table.len(),
            path
        })
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::{config::ApiConfig, error::ScrapeError};

    const TWO_ENTRIES: &str = include_str!("../tests/fixtures/two_entries.xml");
    const EMPTY_FEED: &str = include_str!("../tests/fixtures/empty_feed.xml");

    fn parser_for(server: &mockito::Server) -> ArxivParser {
        let config = ApiConfig::default().with_base_url(&format!("{}/api/query?", server.url()));
        ArxivParser::new(config).unwrap()
    }

    fn page_matcher(start: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("search_query".into(), "cat:hep-th".into()),
            Matcher::UrlEncoded("start".into(), start.into()),
            Matcher::UrlEncoded("sortBy".into(), "submittedDate".into()),
            Matcher::UrlEncoded("sortOrder".into(), "descending".into())
        ])
    }

    #[tokio::test]
    async fn test_id_list_run_writes_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/api/query")
            .match_query(Matcher::UrlEncoded("id_list".into(), "1312.2261,0710.5765v1".into()))
            .with_body(TWO_ENTRIES)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = HarvestConfig {
            category: None,
            id_list: Some(vec!["1312.2261".to_string(), "0710.5765v1".to_string()]),
            total_results: 500,
            output_dir: dir.path().to_path_buf(),
            file_name: "ids".to_string(),
            ..HarvestConfig::default()
        };
        let report = Harvester::new(parser_for(&server), config).run().await.unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.queries.len(), 1);
        assert!(report.queries[0].ends_with("/api/query?id_list=1312.2261,0710.5765v1"));
        assert_eq!(report.path, dir.path().join("ids.csv.gz"));
        assert!(report.path.exists());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_category_pages_stop_at_empty_page() {
        let mut server = mockito::Server::new_async().await;
        let first = server.mock("GET", "/api/query")
            .match_query(page_matcher("0"))
            .with_body(TWO_ENTRIES)
            .expect(1)
            .create_async()
            .await;
        let second = server.mock("GET", "/api/query")
            .match_query(page_matcher("2"))
            .with_body(EMPTY_FEED)
            .expect(1)
            .create_async()
            .await;

        let config = HarvestConfig {
            total_results: 6,
            page_size: 2,
            wait_time: 0,
            ..HarvestConfig::default()
        };
        let (queries, table) = Harvester::new(parser_for(&server), config).fetch().await.unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(queries.len(), 2);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_query_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = HarvestConfig {
            category: None,
            id_list: None,
            output_dir: dir.path().to_path_buf(),
            ..HarvestConfig::default()
        };
        let result = Harvester::new(parser_for(&server), config).run().await;

        assert!(matches!(result, Err(ScrapeError::InvalidQuery)));
        assert!(!LocalSaver::table_path(dir.path(), "example_file_2019").exists());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body_writes_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/api/query")
            .match_query(Matcher::Any)
            .with_body("<feed xmlns=\"http://www.w3.org/2005/Atom\"><entry>")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = HarvestConfig {
            output_dir: dir.path().to_path_buf(),
            ..HarvestConfig::default()
        };
        let result = Harvester::new(parser_for(&server), config).run().await;

        assert!(matches!(result, Err(ScrapeError::Parse(_))));
        assert!(!LocalSaver::table_path(dir.path(), "example_file_2019").exists());
    }

    #[tokio::test]
    async fn test_category_run_stops_at_total_results() {
        let mut server = mockito::Server::new_async().await;
        let first = server.mock("GET", "/api/query")
            .match_query(Matcher::AllOf(vec![
                page_matcher("0"),
                Matcher::UrlEncoded("max_results".into(), "2".into())
            ]))
            .with_body(TWO_ENTRIES)
            .expect(1)
            .create_async()
            .await;
        // a server that ignores max_results still cannot push the run past the total.
        let last = server.mock("GET", "/api/query")
            .match_query(Matcher::AllOf(vec![
                page_matcher("2"),
                Matcher::UrlEncoded("max_results".into(), "1".into())
            ]))
            .with_body(TWO_ENTRIES)
            .expect(1)
            .create_async()
            .await;

        let config = HarvestConfig {
            total_results: 3,
            page_size: 2,
            wait_time: 0,
            ..HarvestConfig::default()
        };
        let (queries, table) = Harvester::new(parser_for(&server), config).fetch().await.unwrap();

        assert_eq!(queries.len(), 2);
        assert!(queries[1].contains("&start=2&max_results=1&"));
        assert_eq!(table.len(), 3);
        first.assert_async().await;
        last.assert_async().await;
    }

    #[test]
    fn test_pages() {
        let parser = ArxivParser::new(ApiConfig::default()).unwrap();
        let config = HarvestConfig {
            start: 10,
            total_results: 250,
            page_size: 100,
            ..HarvestConfig::default()
        };
        let harvester = Harvester::new(parser, config);
        let query = Query::from_parts(10, 100, Some("cat:hep-th"), None).unwrap();
        assert_eq!(harvester.pages(&query), vec![(10, 100), (110, 100), (210, 50)]);
        assert_eq!(harvester.pages(&Query::IdList(vec!["1312.2261".to_string()])), vec![(10, 100)]);

        let parser = ArxivParser::new(ApiConfig::default()).unwrap();
        let small = Harvester::new(parser, HarvestConfig {
            total_results: 30,
            page_size: 100,
            ..HarvestConfig::default()
        });
        assert_eq!(small.pages(&query), vec![(0, 30)]);
    }
}
