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

//! Ownership of live map instances.
//!
//! At most one map lives in each container. Mounting into an occupied
//! container disposes the previous instance first.

use std::collections::HashMap;

use log::debug;

use super::view::MapView;

/// Screen slot a map is mounted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapContainer {
    Home,
    City,
}

#[derive(Debug, Default)]
pub struct MapRegistry {
    instances: HashMap<MapContainer, MapView>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a map, replacing whatever was in the container
    pub fn mount(&mut self, container: MapContainer, view: MapView) -> &mut MapView {
        self.dispose(container);
        debug!("Mounting map into {:?}", container);
        self.instances.entry(container).or_insert(view)
    }

    pub fn dispose(&mut self, container: MapContainer) -> bool {
        let removed = self.instances.remove(&container).is_some();
        if removed {
            debug!("Disposed map in {:?}", container);
        }
        removed
    }

    /// Tear down every map, as on a route change
    pub fn dispose_all(&mut self) {
        for container in self.instances.keys() {
            debug!("Disposed map in {:?}", container);
        }
        self.instances.clear();
    }

    pub fn get_mut(&mut self, container: MapContainer) -> Option<&mut MapView> {
        self.instances.get_mut(&container)
    }

    pub fn active_count(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Marker, Viewport};

    fn city_map(slug: &str, lat: f64, lon: f64) -> MapView {
        let mut view = MapView::new(("city_map", slug), Viewport::new(lat, lon, 6.0));
        view.add_marker(Marker::new(slug, slug, lat, lon).highlighted());
        view
    }

    #[test]
    fn test_mount_replaces_without_explicit_dispose() {
        let mut registry = MapRegistry::new();
        registry.mount(MapContainer::City, city_map("kazan", 55.83, 49.07));
        registry.mount(MapContainer::City, city_map("ufa", 54.74, 55.97));
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_dispose_all() {
        let mut registry = MapRegistry::new();
        registry.mount(MapContainer::Home, MapView::new("home", Viewport::new(61.0, 96.0, 3.0)));
        registry.mount(MapContainer::City, city_map("kazan", 55.83, 49.07));
        assert_eq!(registry.active_count(), 2);

        registry.dispose_all();
        assert_eq!(registry.active_count(), 0);
        assert!(!registry.dispose(MapContainer::Home));
    }
}
