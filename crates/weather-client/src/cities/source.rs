// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use log::{debug, info, warn};

use super::{CityList, CityListError, EmblemMap};
use crate::fetch::FetchError;

const CITY_LIST_FILE: &str = "cities.json";
const EMBLEM_MAP_FILE: &str = "emblems.json";

/// Base location that static files (city list, emblems, photos) are read from.
///
/// Either a local directory or an HTTP(S) base URL; relative names are
/// resolved against it the same way a page resolves relative links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Local(PathBuf),
    Remote(String),
}

impl DataSource {
    /// Interpret a configured base: URLs become `Remote`, anything else a directory.
    #[must_use]
    pub fn parse(base: &str) -> Self {
        let base = base.trim();
        if base.starts_with("http://") || base.starts_with("https://") {
            let mut url = base.to_string();
            if !url.ends_with('/') {
                url.push('/');
            }
            Self::Remote(url)
        } else {
            Self::Local(PathBuf::from(base))
        }
    }

    /// Full location of a file under this base.
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        match self {
            Self::Local(dir) => dir.join(name).to_string_lossy().into_owned(),
            Self::Remote(base) => format!("{}{}", base, name.trim_start_matches('/')),
        }
    }

    /// Read a file's bytes; non-2xx answers count as failures.
    pub async fn load_bytes(
        &self,
        http: &reqwest::Client,
        name: &str,
    ) -> Result<Vec<u8>, FetchError> {
        let location = self.resolve(name);
        match self {
            Self::Local(_) => {
                debug!("Reading {}", location);
                tokio::fs::read(&location)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: location,
                        source,
                    })
            }
            Self::Remote(_) => {
                debug!("GET {}", location);
                let response = http.get(&location).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        status,
                        url: location,
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }

    /// Load and validate `cities.json`.
    pub async fn load_city_list(&self, http: &reqwest::Client) -> Result<CityList, CityListError> {
        let bytes = self.load_bytes(http, CITY_LIST_FILE).await?;
        let cities = CityList::from_json(&bytes)?;
        info!("Loaded {} cities from {}", cities.len(), self.resolve(CITY_LIST_FILE));
        Ok(cities)
    }

    /// Load `emblems.json`; any failure yields an empty map.
    pub async fn load_emblems(&self, http: &reqwest::Client) -> EmblemMap {
        match self.load_bytes(http, EMBLEM_MAP_FILE).await {
            Ok(bytes) => {
                let emblems = EmblemMap::from_json_lenient(&bytes);
                info!("Loaded {} city emblems", emblems.len());
                emblems
            }
            Err(e) => {
                warn!("Emblems unavailable, using default symbol: {}", e);
                EmblemMap::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_adds_slash() {
        let source = DataSource::parse("https://example.org/weather_app");
        assert_eq!(
            source.resolve("cities.json"),
            "https://example.org/weather_app/cities.json"
        );
    }

    #[test]
    fn test_parse_local() {
        let source = DataSource::parse("data");
        assert_eq!(source, DataSource::Local(PathBuf::from("data")));
        assert!(source.resolve("cities.json").ends_with("cities.json"));
    }

    #[tokio::test]
    async fn test_load_local_city_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cities.json"),
            r#"[{"slug":"omsk","name_ru":"Омск","lat":54.9885,"lon":73.3242,"timezone":"Asia/Omsk"}]"#,
        )
        .unwrap();

        let source = DataSource::Local(dir.path().to_path_buf());
        let http = reqwest::Client::new();
        let cities = source.load_city_list(&http).await.unwrap();
        assert_eq!(cities.get("omsk").unwrap().timezone, "Asia/Omsk");

        // No emblems.json in the directory
        assert!(source.load_emblems(&http).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_city_list_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::Local(dir.path().to_path_buf());
        let result = source.load_city_list(&reqwest::Client::new()).await;
        assert!(matches!(result, Err(CityListError::Fetch(FetchError::Io { .. }))));
    }
}
