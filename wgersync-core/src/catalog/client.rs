use log::{debug, error};
use serde::de::DeserializeOwned;

use super::{CatalogSource, ExercisePage, NamedRef, ReferenceList, ReferenceTable};
use crate::config::Config;
use crate::error::Result;

/// HTTP client for the public wger REST API.
pub struct WgerClient {
    http: reqwest::Client,
    base_url: String,
    language: u32,
    page_size: u32,
}

impl WgerClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wgersync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            language: config.language,
            page_size: config.page_size,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!("Request to {} failed: {}", url, e);
                e
            })?;
        Ok(response.json::<T>().await?)
    }
}

impl CatalogSource for WgerClient {
    fn first_page_url(&self) -> String {
        self.url(&format!(
            "exerciseinfo/?limit={}&language={}",
            self.page_size, self.language
        ))
    }

    async fn fetch_reference_table(&self, table: ReferenceTable) -> Result<Vec<NamedRef>> {
        let list: ReferenceList = self.get_json(&self.url(table.path())).await?;
        Ok(list.results)
    }

    async fn fetch_exercise_page(&self, url: &str) -> Result<ExercisePage> {
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> Config {
        Config {
            database_url: ":memory:".into(),
            api_base_url: base.into(),
            language: 2,
            page_size: 100,
        }
    }

    #[test]
    fn first_page_carries_limit_and_language() {
        let client = WgerClient::new(&config("https://wger.de/api/v2")).unwrap();
        assert_eq!(
            client.first_page_url(),
            "https://wger.de/api/v2/exerciseinfo/?limit=100&language=2"
        );
    }

    #[test]
    fn reference_urls_join_without_double_slash() {
        let client = WgerClient::new(&config("http://localhost:8000/api/v2/")).unwrap();
        assert_eq!(
            client.url(ReferenceTable::Category.path()),
            "http://localhost:8000/api/v2/exercisecategory/"
        );
        assert_eq!(
            client.url(ReferenceTable::Muscle.path()),
            "http://localhost:8000/api/v2/muscle/"
        );
    }
}
