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

mod app;
mod config;
mod emblems;
mod host;
mod map;
mod photos;
mod router;
mod screens;
mod worker;

use clap::Parser;
use eframe::egui;
use log::info;

use app::{LaunchOptions, WeatherApp};
use config::AppConfig;
use host::HostContext;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Sent with every request; OSM and Wikimedia both require one
pub const USER_AGENT: &str = concat!("russia-weather-desktop/", env!("CARGO_PKG_VERSION"));

/// Weather across Russian cities on a map
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Open this city's page on launch (deep link)
    #[arg(long, value_name = "SLUG")]
    start: Option<String>,

    /// Centre the home map on this city and open its popup
    #[arg(long, value_name = "SLUG")]
    city: Option<String>,

    /// Initial location hash
    #[arg(long, default_value = "#/")]
    location: String,

    /// Directory or http(s) base URL holding cities.json and emblems.json
    #[arg(long, value_name = "BASE")]
    data: Option<String>,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Starting Russia Weather {}", env!("CARGO_PKG_VERSION"));
    let config = AppConfig::load_or_default();
    let host = HostContext::from_env(args.start);
    let launch = LaunchOptions {
        location: args.location,
        preselect: args.city,
        data_base: args.data,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_title("Погода в городах России"),
        ..Default::default()
    };

    eframe::run_native(
        "Russia Weather",
        options,
        Box::new(|cc| Ok(Box::new(WeatherApp::new(cc, config, host, launch)))),
    )
}
