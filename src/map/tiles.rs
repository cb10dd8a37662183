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

//! Base map raster tiles.
//!
//! Tiles come from the Mapbox static tiles API for the configured style.
//! Downloads run on background threads; decoded tiles are kept as egui
//! textures and the raw bytes are cached on disk for a week.

use egui::{ColorImage, TextureHandle};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// Tile edge length in pixels
pub const TILE_SIZE: u32 = 256;

const CACHE_DURATION_DAYS: u64 = 7;

/// Web Mercator projection utilities
#[derive(Debug)]
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to tile Y coordinate at the given (fractional) zoom
    pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
        let lat_rad = lat.to_radians();
        let n = 2_f64.powf(zoom);
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Convert longitude to tile X coordinate at the given (fractional) zoom
    pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        ((lon + 180.0) / 360.0) * n
    }

    /// Convert tile Y coordinate back to latitude
    pub fn y_to_lat(y: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        let lat_rad = (std::f64::consts::PI * (1.0 - 2.0 * y / n)).sinh().atan();
        lat_rad.to_degrees()
    }

    /// Convert tile X coordinate back to longitude
    pub fn x_to_lon(x: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        x / n * 360.0 - 180.0
    }

    /// Ground resolution in meters per pixel at a latitude and zoom
    pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
        const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;
        EARTH_CIRCUMFERENCE_M * lat.to_radians().cos() / (f64::from(TILE_SIZE) * 2_f64.powf(zoom))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }
}

/// Mapbox raster tiles for one style
#[derive(Debug, Clone)]
pub struct MapboxTileSource {
    style: String,
    access_token: Option<String>,
}

impl MapboxTileSource {
    pub fn new(style: String, access_token: Option<String>) -> Self {
        Self {
            style,
            access_token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Tile URL for the style, e.g. `mapbox/streets-v11`
    pub fn tile_url(&self, coord: TileCoord) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/{}/tiles/{}/{}/{}/{}?access_token={}",
            self.style,
            TILE_SIZE,
            coord.zoom,
            coord.x,
            coord.y,
            self.access_token.as_deref().unwrap_or_default()
        )
    }

    /// Cache filename, independent of the access token
    fn cache_filename(&self, coord: TileCoord) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}/{}/{}/{}", self.style, coord.zoom, coord.x, coord.y).as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

pub enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

/// Tile positioned relative to the viewport center
#[derive(Debug, Clone, Copy)]
pub struct VisibleTile {
    pub coord: TileCoord,
    /// Offset of the tile's top-left corner from the viewport center, in pixels
    pub offset_x: f32,
    pub offset_y: f32,
    /// Edge length on screen, in pixels
    pub size: f32,
}

pub struct TileManager {
    source: MapboxTileSource,
    cache_dir: PathBuf,
    tiles: Arc<Mutex<HashMap<TileCoord, TileState>>>,
}

impl TileManager {
    pub fn new(source: MapboxTileSource) -> Self {
        let cache_dir = Self::get_cache_dir();

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory {}: {e}", cache_dir.display());
        }

        Self::cleanup_old_tiles(&cache_dir);

        Self {
            source,
            cache_dir,
            tiles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn get_cache_dir() -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("geotransit-desktop");
        path.push("tiles");
        path
    }

    fn cleanup_old_tiles(cache_dir: &Path) {
        let now = SystemTime::now();
        let max_age = Duration::from_secs(CACHE_DURATION_DAYS * 24 * 60 * 60);

        let Ok(entries) = fs::read_dir(cache_dir) else {
            return;
        };

        for entry in entries.flatten() {
            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);

            if expired && fs::remove_file(entry.path()).is_ok() {
                debug!("Removed old tile cache: {:?}", entry.path());
            }
        }
    }

    /// Get tile from memory or disk cache, or queue it for download
    pub fn get_tile(&self, coord: TileCoord, ctx: &egui::Context) -> Option<TextureHandle> {
        let Ok(mut tiles) = self.tiles.lock() else {
            return None;
        };

        match tiles.get(&coord) {
            Some(TileState::Loaded(texture)) => return Some(texture.clone()),
            Some(TileState::Loading | TileState::Failed) => return None,
            None => {}
        }

        if !self.source.has_token() {
            tiles.insert(coord, TileState::Failed);
            return None;
        }

        let cache_path = self.cache_dir.join(self.source.cache_filename(coord));
        if cache_path.exists() {
            match fs::read(&cache_path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| decode_tile(&bytes, coord, ctx))
            {
                Ok(texture) => {
                    tiles.insert(coord, TileState::Loaded(texture.clone()));
                    return Some(texture);
                }
                Err(e) => warn!("Failed to load cached tile: {e}"),
            }
        }

        tiles.insert(coord, TileState::Loading);
        drop(tiles);
        self.queue_download(coord, ctx.clone());
        None
    }

    fn queue_download(&self, coord: TileCoord, ctx: egui::Context) {
        let tiles = self.tiles.clone();
        let url = self.source.tile_url(coord);
        let cache_path = self.cache_dir.join(self.source.cache_filename(coord));

        std::thread::spawn(move || {
            let state = match download_tile(&url, &cache_path, coord, &ctx) {
                Ok(texture) => TileState::Loaded(texture),
                Err(e) => {
                    warn!("Failed to fetch tile {}/{}/{}: {e}", coord.zoom, coord.x, coord.y);
                    TileState::Failed
                }
            };

            if let Ok(mut tiles) = tiles.lock() {
                tiles.insert(coord, state);
            }
            ctx.request_repaint();
        });
    }

    /// Get all tiles needed to cover a viewport
    pub fn get_visible_tiles(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Vec<VisibleTile> {
        let tile_zoom = zoom.round().clamp(0.0, 22.0) as u8;
        let scale = 2_f32.powf(zoom - f32::from(tile_zoom));
        let tile_pixels = TILE_SIZE as f32 * scale;

        let center_tile_x = WebMercator::lon_to_x(center_lon, f64::from(tile_zoom));
        let center_tile_y = WebMercator::lat_to_y(center_lat, f64::from(tile_zoom));

        let tiles_wide = (viewport_width / tile_pixels).ceil() as i32 + 2;
        let tiles_high = (viewport_height / tile_pixels).ceil() as i32 + 2;

        let start_x = center_tile_x.floor() as i32 - tiles_wide / 2;
        let start_y = center_tile_y.floor() as i32 - tiles_high / 2;

        let max_tile = 2_i32.pow(u32::from(tile_zoom));
        let mut visible = Vec::new();

        for dy in 0..tiles_high {
            for dx in 0..tiles_wide {
                let tile_x = start_x + dx;
                let tile_y = start_y + dy;

                // Longitude wraps, latitude does not
                if tile_y < 0 || tile_y >= max_tile {
                    continue;
                }
                let wrapped_x = tile_x.rem_euclid(max_tile);

                visible.push(VisibleTile {
                    coord: TileCoord::new(wrapped_x as u32, tile_y as u32, tile_zoom),
                    offset_x: ((f64::from(tile_x) - center_tile_x) * f64::from(tile_pixels)) as f32,
                    offset_y: ((f64::from(tile_y) - center_tile_y) * f64::from(tile_pixels)) as f32,
                    size: tile_pixels,
                });
            }
        }

        visible
    }

    pub fn has_loading_tiles(&self) -> bool {
        self.tiles
            .lock()
            .map(|tiles| tiles.values().any(|state| matches!(state, TileState::Loading)))
            .unwrap_or(false)
    }

    pub fn get_error_count(&self) -> usize {
        self.tiles
            .lock()
            .map(|tiles| tiles.values().filter(|state| matches!(state, TileState::Failed)).count())
            .unwrap_or(0)
    }
}

fn download_tile(
    url: &str,
    cache_path: &Path,
    coord: TileCoord,
    ctx: &egui::Context,
) -> Result<TextureHandle, String> {
    let response = reqwest::blocking::get(url).map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    let bytes = response.bytes().map_err(|e| e.to_string())?;
    if let Err(e) = fs::write(cache_path, &bytes) {
        warn!("Failed to save tile to cache: {e}");
    }

    decode_tile(&bytes, coord, ctx)
}

fn decode_tile(bytes: &[u8], coord: TileCoord, ctx: &egui::Context) -> Result<TextureHandle, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw());

    Ok(ctx.load_texture(
        format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
        color_image,
        egui::TextureOptions::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_mercator_round_trip() {
        let zoom = 8.0;
        let (lat, lon) = (55.75, 37.62);

        let x = WebMercator::lon_to_x(lon, zoom);
        let y = WebMercator::lat_to_y(lat, zoom);

        assert!((WebMercator::x_to_lon(x, zoom) - lon).abs() < 1e-9);
        assert!((WebMercator::y_to_lat(y, zoom) - lat).abs() < 1e-9);
    }

    #[test]
    fn test_meters_per_pixel_at_equator() {
        // ~156 km per pixel at zoom 0
        let mpp = WebMercator::meters_per_pixel(0.0, 0.0);
        assert!((mpp - 156_543.03).abs() < 1.0);
    }

    #[test]
    fn test_tile_url_and_cache_name() {
        let source = MapboxTileSource::new("mapbox/streets-v11".to_string(), Some("tok".to_string()));
        let coord = TileCoord::new(154, 80, 8);

        assert_eq!(
            source.tile_url(coord),
            "https://api.mapbox.com/styles/v1/mapbox/streets-v11/tiles/256/8/154/80?access_token=tok"
        );

        let other_token = MapboxTileSource::new("mapbox/streets-v11".to_string(), None);
        assert_eq!(source.cache_filename(coord), other_token.cache_filename(coord));
    }
}
