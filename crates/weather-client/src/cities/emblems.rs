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

use std::collections::HashMap;

use log::{debug, warn};
use serde_json::Value;

/// Symbol shown for a city without a usable emblem image.
pub const DEFAULT_CITY_SYMBOL: &str = "\u{1F3DB}";

/// Optional slug → coat-of-arms image URL overlay.
#[derive(Debug, Clone, Default)]
pub struct EmblemMap(HashMap<String, String>);

impl EmblemMap {
    /// Parse `emblems.json`, degrading to an empty map on malformed input.
    ///
    /// Entries whose value is not a string are dropped one by one; the
    /// rest of the file still applies.
    #[must_use]
    pub fn from_json_lenient(json: &[u8]) -> Self {
        let raw: HashMap<String, Value> = match serde_json::from_slice(json) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Ignoring malformed emblem map: {}", e);
                return Self::default();
            }
        };

        let entries = raw
            .into_iter()
            .filter_map(|(slug, value)| match value {
                Value::String(url) => Some((slug, url)),
                other => {
                    debug!("Dropping emblem entry {}: not a string ({})", slug, other);
                    None
                }
            })
            .collect();
        Self(entries)
    }

    /// Image URL for a city, if one is known and non-empty.
    #[must_use]
    pub fn url(&self, slug: &str) -> Option<&str> {
        self.0.get(slug).map(String::as_str).filter(|u| !u.is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
