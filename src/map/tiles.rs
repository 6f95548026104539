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

//! Tile download, disk cache and texture management.
//!
//! Tiles are cached on disk under a SHA-256 of their URL and expire after
//! seven days. Each [`TileManager`] serves one [`TileSource`].

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use eframe::egui::{self, ColorImage, TextureHandle};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use walkers::sources::TileSource;
use walkers::TileId;

use crate::USER_AGENT;

const CACHE_DURATION_DAYS: u64 = 7;

/// Disk cache filename for a tile URL
pub fn cache_filename(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}.png", hasher.finalize())
}

pub enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

type TileMap = Arc<Mutex<HashMap<TileId, TileState>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TileManager {
    name: String,
    source: Arc<dyn TileSource + Send + Sync>,
    cache_dir: PathBuf,
    client: Option<reqwest::blocking::Client>,
    tiles: TileMap,
    pending: Arc<Mutex<HashSet<TileId>>>,
}

impl std::fmt::Debug for TileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileManager")
            .field("name", &self.name)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl TileManager {
    /// Manager for `source`, cached under `<cache>/russia-weather-desktop/<name>`
    pub fn new(name: &str, source: impl TileSource + Send + Sync + 'static) -> Self {
        Self::with_cache_dir(name, source, Self::default_cache_dir(name))
    }

    pub fn with_cache_dir(
        name: &str,
        source: impl TileSource + Send + Sync + 'static,
        cache_dir: PathBuf,
    ) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory {}: {}", cache_dir.display(), e);
        }
        cleanup_old_tiles(&cache_dir, Duration::from_secs(CACHE_DURATION_DAYS * 24 * 60 * 60));

        // OSM rejects requests without an identifying User-Agent
        let client = match reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Tile downloads disabled for {}: {}", name, e);
                None
            }
        };

        Self {
            name: name.to_string(),
            source: Arc::new(source),
            cache_dir,
            client,
            tiles: Arc::new(Mutex::new(HashMap::new())),
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn default_cache_dir(name: &str) -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("russia-weather-desktop");
        path.push("tiles");
        path.push(name);
        path
    }

    pub fn attribution(&self) -> &'static str {
        self.source.attribution().text
    }

    /// Get tile from memory or disk cache, or queue it for download
    pub fn get_tile(&self, tile: TileId, ctx: &egui::Context) -> Option<TextureHandle> {
        let mut tiles = lock(&self.tiles);

        match tiles.get(&tile) {
            Some(TileState::Loaded(texture)) => Some(texture.clone()),
            Some(TileState::Loading | TileState::Failed) => None,
            None => {
                let url = self.source.tile_url(tile);
                let cache_path = self.cache_dir.join(cache_filename(&url));

                if cache_path.exists() {
                    match load_tile_from_disk(&cache_path, ctx, &self.name, tile) {
                        Ok(texture) => {
                            tiles.insert(tile, TileState::Loaded(texture.clone()));
                            return Some(texture);
                        }
                        Err(e) => debug!("Discarding unreadable cached tile: {}", e),
                    }
                }

                tiles.insert(tile, TileState::Loading);
                drop(tiles);
                self.queue_download(tile, url, ctx.clone());
                None
            }
        }
    }

    fn queue_download(&self, tile: TileId, url: String, ctx: egui::Context) {
        if !lock(&self.pending).insert(tile) {
            return;
        }
        let Some(client) = self.client.clone() else {
            lock(&self.tiles).insert(tile, TileState::Failed);
            lock(&self.pending).remove(&tile);
            return;
        };

        let tiles = self.tiles.clone();
        let pending = self.pending.clone();
        let cache_path = self.cache_dir.join(cache_filename(&url));
        let name = self.name.clone();

        std::thread::spawn(move || {
            let state = match download_tile(&client, &url, &cache_path) {
                Ok(image) => {
                    let texture = ctx.load_texture(texture_name(&name, tile), image, egui::TextureOptions::default());
                    TileState::Loaded(texture)
                }
                Err(e) => {
                    warn!("Failed to load tile {}: {}", url, e);
                    TileState::Failed
                }
            };
            lock(&tiles).insert(tile, state);
            lock(&pending).remove(&tile);
            ctx.request_repaint();
        });
    }

    pub fn has_loading_tiles(&self) -> bool {
        lock(&self.tiles)
            .values()
            .any(|state| matches!(state, TileState::Loading))
    }

    pub fn get_error_count(&self) -> usize {
        lock(&self.tiles)
            .values()
            .filter(|state| matches!(state, TileState::Failed))
            .count()
    }
}

fn texture_name(name: &str, tile: TileId) -> String {
    format!("{}_{}_{}/{}", name, tile.zoom, tile.x, tile.y)
}

fn cleanup_old_tiles(cache_dir: &Path, max_age: Duration) -> usize {
    let now = SystemTime::now();
    let mut removed = 0;

    if let Ok(entries) = fs::read_dir(cache_dir) {
        for entry in entries.flatten() {
            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);
            if expired && fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }
    }
    if removed > 0 {
        info!("Removed {} expired tiles from {}", removed, cache_dir.display());
    }
    removed
}

/// Convert a decoded image to an egui image using its real dimensions
pub fn to_color_image(image: &image::DynamicImage) -> ColorImage {
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw())
}

/// Decode PNG/JPEG bytes into an egui image
pub fn decode_image(bytes: &[u8]) -> Result<ColorImage, image::ImageError> {
    Ok(to_color_image(&image::load_from_memory(bytes)?))
}

fn load_tile_from_disk(
    path: &Path,
    ctx: &egui::Context,
    name: &str,
    tile: TileId,
) -> Result<TextureHandle, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    let image = decode_image(&bytes)?;
    Ok(ctx.load_texture(texture_name(name, tile), image, egui::TextureOptions::default()))
}

fn download_tile(
    client: &reqwest::blocking::Client,
    url: &str,
    cache_path: &Path,
) -> Result<ColorImage, Box<dyn std::error::Error>> {
    debug!("Downloading tile: {}", url);
    let response = client.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;

    let image = decode_image(&bytes)?;
    if let Err(e) = fs::write(cache_path, &bytes) {
        warn!("Failed to save tile to cache: {}", e);
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_filename_is_stable_hash() {
        let a = cache_filename("https://a.tile.openstreetmap.org/3/1/1.png");
        let b = cache_filename("https://a.tile.openstreetmap.org/3/1/1.png");
        let c = cache_filename("https://b.tile.openstreetmap.org/3/1/1.png");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64 + ".png".len());
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fresh.png"), b"x").unwrap();
        assert_eq!(cleanup_old_tiles(dir.path(), Duration::from_secs(3600)), 0);
        assert!(dir.path().join("fresh.png").exists());

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cleanup_old_tiles(dir.path(), Duration::from_millis(1)), 1);
        assert!(!dir.path().join("fresh.png").exists());
    }

    #[test]
    fn test_decode_uses_real_dimensions() {
        let mut png = Vec::new();
        image::RgbaImage::new(3, 2)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded.size, [3, 2]);
        assert!(decode_image(b"not an image").is_err());
    }
}
