//! Map rendering and tile management.
//!
//! This module provides map tile fetching, caching, Web Mercator projection,
//! city markers and the registry that owns live map instances.

pub mod layers;
pub mod projection;
pub mod registry;
pub mod sources;
pub mod tiles;
pub mod view;

pub use layers::{MapLayers, OverlaySettings};
pub use projection::Viewport;
pub use registry::{MapContainer, MapRegistry};
pub use sources::WeatherLayer;
pub use tiles::to_color_image;
pub use view::{MapAction, MapView, Marker};

/// Home map centre, over the middle of Russia
pub const HOME_CENTER: (f64, f64) = (61.0, 96.0);
pub const HOME_ZOOM: f32 = 3.0;
/// Zoom used when the home map is preselected on one city
pub const PRESELECT_ZOOM: f32 = 5.0;
pub const CITY_ZOOM: f32 = 6.0;
