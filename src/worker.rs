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

//! Background I/O worker.
//!
//! All network and file access runs on a tokio runtime owned by a dedicated
//! thread. The UI submits [`Job`]s and drains [`WorkerEvent`]s each frame;
//! every event triggers a repaint. Jobs that belong to a screen carry the
//! router generation they were issued under so the UI can drop late
//! results.

use std::sync::mpsc;
use std::sync::Arc;

use eframe::egui;
use log::{debug, error, info, warn};
use tokio::sync::{mpsc as tokio_mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use weather_client::{City, CityList, DataSource, EmblemMap, FetchError, Forecast, WeatherClient};

use crate::map::to_color_image;
use crate::router::Generation;
use crate::USER_AGENT;

/// Concurrent image and temperature lookups
const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Identifies a requested image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageKey {
    Emblem(String),
    Photo {
        generation: Generation,
        slug: String,
        index: usize,
    },
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocation {
    /// Absolute URL
    Url(String),
    /// File name relative to the assets base
    Asset(String),
}

#[derive(Debug)]
pub enum Job {
    LoadCities,
    LoadEmblems,
    Forecast {
        generation: Generation,
        city: City,
    },
    CurrentTemperature {
        generation: Generation,
        slug: String,
        lat: f64,
        lon: f64,
    },
    Image {
        key: ImageKey,
        location: ImageLocation,
        max_size: u32,
    },
}

pub enum WorkerEvent {
    CitiesLoaded(Result<CityList, String>),
    EmblemsLoaded(EmblemMap),
    Forecast {
        generation: Generation,
        slug: String,
        result: Result<Forecast, String>,
    },
    CurrentTemperature {
        generation: Generation,
        slug: String,
        temperature: Option<i64>,
    },
    Image {
        key: ImageKey,
        image: Option<egui::ColorImage>,
    },
}

/// Everything the worker needs to talk to the outside world.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub data: DataSource,
    pub assets: DataSource,
    pub weather: WeatherClient,
    pub http: reqwest::Client,
}

impl WorkerSettings {
    pub fn new(data_base: &str, assets_base: &str, policy: weather_client::RetryPolicy) -> Self {
        // Wikimedia rejects requests without an identifying User-Agent
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self {
            data: DataSource::parse(data_base),
            assets: DataSource::parse(assets_base),
            weather: WeatherClient::new(http.clone(), policy),
            http,
        }
    }
}

pub struct FetchWorker {
    jobs: tokio_mpsc::UnboundedSender<Job>,
    events: mpsc::Receiver<WorkerEvent>,
    cancel: CancellationToken,
}

impl FetchWorker {
    /// Spawn the worker thread and its runtime
    pub fn spawn(settings: WorkerSettings, ctx: egui::Context) -> Self {
        let (job_tx, job_rx) = tokio_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();

        let worker_cancel = cancel.clone();
        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start fetch runtime: {}", e);
                    return;
                }
            };
            runtime.block_on(run(settings, job_rx, event_tx, ctx, worker_cancel));
            info!("Fetch worker stopped");
        });

        Self {
            jobs: job_tx,
            events: event_rx,
            cancel,
        }
    }

    pub fn submit(&self, job: Job) {
        if self.jobs.send(job).is_err() {
            warn!("Fetch worker is gone, dropping job");
        }
    }

    /// Handle for components that request work on their own
    pub fn sender(&self) -> JobSender {
        JobSender(self.jobs.clone())
    }

    /// Events completed since the last call
    pub fn drain(&self) -> Vec<WorkerEvent> {
        self.events.try_iter().collect()
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Cloneable job submitter.
#[derive(Debug, Clone)]
pub struct JobSender(tokio_mpsc::UnboundedSender<Job>);

impl JobSender {
    pub fn submit(&self, job: Job) {
        if self.0.send(job).is_err() {
            warn!("Fetch worker is gone, dropping job");
        }
    }
}

#[derive(Clone)]
struct Outbox {
    events: mpsc::Sender<WorkerEvent>,
    ctx: egui::Context,
}

impl Outbox {
    fn send(&self, event: WorkerEvent) {
        if self.events.send(event).is_ok() {
            self.ctx.request_repaint();
        }
    }
}

async fn run(
    settings: WorkerSettings,
    mut jobs: tokio_mpsc::UnboundedReceiver<Job>,
    events: mpsc::Sender<WorkerEvent>,
    ctx: egui::Context,
    cancel: CancellationToken,
) {
    let settings = Arc::new(settings);
    let outbox = Outbox { events, ctx };
    let limiter = Arc::new(Semaphore::new(MAX_CONCURRENT_LOOKUPS));

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            job = jobs.recv() => {
                let Some(job) = job else { break };
                debug!("Job: {:?}", job);
                let settings = settings.clone();
                let outbox = outbox.clone();
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    let event = handle(job, &settings, &limiter).await;
                    outbox.send(event);
                });
            }
        }
    }
}

async fn handle(job: Job, settings: &WorkerSettings, limiter: &Semaphore) -> WorkerEvent {
    match job {
        Job::LoadCities => {
            let result = settings.data.load_city_list(&settings.http).await.map_err(|e| {
                error!("Failed to load city list: {}", e);
                e.to_string()
            });
            WorkerEvent::CitiesLoaded(result)
        }
        Job::LoadEmblems => WorkerEvent::EmblemsLoaded(settings.data.load_emblems(&settings.http).await),
        Job::Forecast { generation, city } => {
            let result = settings.weather.forecast(&city).await.map_err(|e| {
                warn!("Forecast for {} failed: {}", city.slug, e);
                e.to_string()
            });
            WorkerEvent::Forecast {
                generation,
                slug: city.slug,
                result,
            }
        }
        Job::CurrentTemperature {
            generation,
            slug,
            lat,
            lon,
        } => {
            let _permit = limiter.acquire().await.ok();
            let temperature = settings.weather.current_temperature(lat, lon).await;
            WorkerEvent::CurrentTemperature {
                generation,
                slug,
                temperature,
            }
        }
        Job::Image {
            key,
            location,
            max_size,
        } => {
            let _permit = limiter.acquire().await.ok();
            let image = match load_image(settings, &location, max_size).await {
                Ok(image) => Some(image),
                Err(e) => {
                    debug!("Image {:?} unavailable: {}", location, e);
                    None
                }
            };
            WorkerEvent::Image { key, image }
        }
    }
}

async fn load_image(
    settings: &WorkerSettings,
    location: &ImageLocation,
    max_size: u32,
) -> Result<egui::ColorImage, Box<dyn std::error::Error + Send + Sync>> {
    let bytes = match location {
        ImageLocation::Asset(name) => settings.assets.load_bytes(&settings.http, name).await?,
        ImageLocation::Url(url) => fetch_bytes(&settings.http, url).await?,
    };

    // Decoding is CPU bound
    let image = tokio::task::spawn_blocking(move || -> Result<egui::ColorImage, image::ImageError> {
        let decoded = image::load_from_memory(&bytes)?;
        let decoded = if decoded.width() > max_size || decoded.height() > max_size {
            decoded.resize(max_size, max_size, image::imageops::FilterType::Lanczos3)
        } else {
            decoded
        };
        Ok(to_color_image(&decoded))
    })
    .await??;
    Ok(image)
}

async fn fetch_bytes(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}
