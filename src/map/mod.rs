//! Map rendering and tile management.
//!
//! This module provides base map tile fetching, caching, and Web Mercator
//! projection utilities for the polygon editor canvas.

pub mod tiles;
pub mod view;

pub use tiles::{MapboxTileSource, TileManager};
pub use view::MapView;
