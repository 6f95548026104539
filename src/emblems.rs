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

//! City emblem textures.
//!
//! Emblems are requested the first time a marker or list row needs one and
//! kept for the session. A failed emblem stays failed and the default
//! symbol is drawn instead.

use std::collections::HashMap;

use eframe::egui;
use weather_client::EmblemMap;

use crate::worker::{ImageKey, ImageLocation, Job, JobSender};

/// Emblems are small; anything larger is scaled down before upload
const EMBLEM_MAX_SIZE: u32 = 48;

enum EmblemSlot {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

pub struct EmblemTextures {
    slots: HashMap<String, EmblemSlot>,
    jobs: JobSender,
}

impl EmblemTextures {
    pub fn new(jobs: JobSender) -> Self {
        Self {
            slots: HashMap::new(),
            jobs,
        }
    }

    /// Texture for a city's emblem, requesting it on first use
    pub fn get_or_request(&mut self, slug: &str, emblems: &EmblemMap) -> Option<egui::TextureHandle> {
        match self.slots.get(slug) {
            Some(EmblemSlot::Ready(texture)) => Some(texture.clone()),
            Some(EmblemSlot::Loading | EmblemSlot::Failed) => None,
            None => {
                let url = emblems.url(slug)?;
                self.slots.insert(slug.to_string(), EmblemSlot::Loading);
                self.jobs.submit(Job::Image {
                    key: ImageKey::Emblem(slug.to_string()),
                    location: ImageLocation::Url(url.to_string()),
                    max_size: EMBLEM_MAX_SIZE,
                });
                None
            }
        }
    }

    /// Store a finished download
    pub fn store(&mut self, ctx: &egui::Context, slug: String, image: Option<egui::ColorImage>) {
        let slot = match image {
            Some(image) => EmblemSlot::Ready(ctx.load_texture(
                format!("emblem_{slug}"),
                image,
                egui::TextureOptions::LINEAR,
            )),
            None => EmblemSlot::Failed,
        };
        self.slots.insert(slug, slot);
    }
}
