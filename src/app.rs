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

//! Application state and the per-frame loop.
//!
//! Every navigation goes through [`WeatherApp::enter_route`]. It plans the
//! route, then [`mount_route`] tears down the mounted maps, rebuilds the
//! screen with placeholders and lists the background jobs that fill them in. Results are matched back to the
//! screen by router generation and city slug.

use eframe::egui;
use log::{debug, info, warn};
use weather_client::{City, CityList, EmblemMap};

use crate::config::{self, AppConfig, API_KEY_ENV};
use crate::emblems::EmblemTextures;
use crate::host::HostContext;
use crate::map::{MapContainer, MapLayers, MapRegistry, WeatherLayer};
use crate::router::{Generation, Route, Router};
use crate::screens::city::build_city_map;
use crate::screens::home::build_home_map;
use crate::screens::{self, Action, CityListScreen, CityScreen, HomeScreen, ScreenContext, CITY_LIST_ERROR};
use crate::worker::{FetchWorker, ImageKey, ImageLocation, Job, WorkerEvent, WorkerSettings};

/// Photos are shown at card size; larger files are scaled down
const PHOTO_MAX_SIZE: u32 = 1024;

/// Startup choices that come from the command line.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Initial location hash
    pub location: String,
    /// City to centre the home map on
    pub preselect: Option<String>,
    /// Data base override for this run only
    pub data_base: Option<String>,
}

#[derive(Debug)]
enum CitiesState {
    NotRequested,
    Loading,
    Loaded(CityList),
    Failed,
}

impl CitiesState {
    fn list(&self) -> Option<&CityList> {
        match self {
            Self::Loaded(list) => Some(list),
            _ => None,
        }
    }
}

/// What a route resolves to given the city list state.
#[derive(Debug)]
enum RoutePlan<'a> {
    /// Home renders with or without the list
    Home(Option<&'a CityList>),
    CityList(&'a CityList),
    City(&'a City),
    NotFound,
    Waiting,
    ListFailed,
}

fn plan_route<'a>(route: &Route, cities: &'a CitiesState) -> RoutePlan<'a> {
    match (route, cities) {
        (Route::Home, _) => RoutePlan::Home(cities.list()),
        (_, CitiesState::Failed) => RoutePlan::ListFailed,
        (Route::CityList, CitiesState::Loaded(list)) => RoutePlan::CityList(list),
        (Route::City(slug), CitiesState::Loaded(list)) => match list.get(slug) {
            Some(city) => RoutePlan::City(city),
            None => RoutePlan::NotFound,
        },
        _ => RoutePlan::Waiting,
    }
}

/// Build the screen for a plan and the jobs that fill it in.
///
/// Every mounted map is disposed before the new ones are mounted, so at most
/// one map lives per container after any route change.
fn mount_route(
    plan: RoutePlan<'_>,
    generation: Generation,
    maps: &mut MapRegistry,
    preselect: &mut Option<String>,
) -> (Screen, Vec<Job>) {
    maps.dispose_all();

    match plan {
        RoutePlan::Home(list) => {
            // Preselect waits for the list so an early home map cannot consume it
            let preselect = list.and_then(|_| preselect.take());
            maps.mount(MapContainer::Home, build_home_map(list, preselect.as_deref()));
            (Screen::Home(HomeScreen::new()), temperature_jobs(generation, list))
        }
        RoutePlan::CityList(list) => (
            Screen::CityList(CityListScreen::new()),
            temperature_jobs(generation, Some(list)),
        ),
        RoutePlan::City(city) => {
            maps.mount(MapContainer::City, build_city_map(city));
            let job = Job::Forecast {
                generation,
                city: city.clone(),
            };
            (Screen::City(Box::new(CityScreen::new(city))), vec![job])
        }
        RoutePlan::NotFound => (Screen::NotFound, Vec::new()),
        RoutePlan::Waiting => (Screen::Waiting, Vec::new()),
        RoutePlan::ListFailed => (Screen::ListFailed, Vec::new()),
    }
}

/// Current-temperature lookups for every city's marker label
fn temperature_jobs(generation: Generation, cities: Option<&CityList>) -> Vec<Job> {
    cities
        .into_iter()
        .flatten()
        .map(|city| Job::CurrentTemperature {
            generation,
            slug: city.slug.clone(),
            lat: city.lat,
            lon: city.lon,
        })
        .collect()
}

enum Screen {
    Home(HomeScreen),
    CityList(CityListScreen),
    City(Box<CityScreen>),
    NotFound,
    Waiting,
    ListFailed,
}

pub struct WeatherApp {
    config: AppConfig,
    host: HostContext,
    router: Router,
    worker: FetchWorker,
    cities: CitiesState,
    emblems: EmblemMap,
    emblem_textures: EmblemTextures,
    layers: MapLayers,
    maps: MapRegistry,
    screen: Screen,
    /// Consumed by the first home map built after the list loads
    preselect: Option<String>,
    location_input: String,
    api_key_source: Option<&'static str>,
}

impl WeatherApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, host: HostContext, options: LaunchOptions) -> Self {
        if host.theme.apply(&cc.egui_ctx) {
            info!("Applied host theme");
        }

        let env_key = std::env::var(API_KEY_ENV).ok();
        let api_key_source = config::api_key_source(env_key.as_deref(), config.openweathermap_api_key.as_deref());
        let api_key = config::resolve_api_key(env_key, config.openweathermap_api_key.as_deref());

        let data_base = options.data_base.unwrap_or_else(|| config.data_base.clone());
        info!("City data from {}, photos from {}", data_base, config.assets_base);
        let settings = WorkerSettings::new(&data_base, &config.assets_base, config.retry_policy());
        let worker = FetchWorker::spawn(settings, cc.egui_ctx.clone());
        let emblem_textures = EmblemTextures::new(worker.sender());

        let router = Router::new(&options.location, host.start_param.as_deref());
        let location_input = router.location().to_string();

        let mut app = Self {
            config,
            host,
            router,
            worker,
            cities: CitiesState::NotRequested,
            emblems: EmblemMap::default(),
            emblem_textures,
            layers: MapLayers::new(api_key),
            maps: MapRegistry::new(),
            screen: Screen::Waiting,
            preselect: options.preselect,
            location_input,
            api_key_source,
        };
        app.enter_route();
        app
    }

    /// Start loading the city list and emblems unless already done
    fn ensure_cities(&mut self) {
        if matches!(self.cities, CitiesState::NotRequested) {
            info!("Loading city list");
            self.cities = CitiesState::Loading;
            self.worker.submit(Job::LoadCities);
            self.worker.submit(Job::LoadEmblems);
        }
    }

    fn navigate(&mut self, route: &Route) {
        self.router.navigate_to(route);
        self.enter_route();
    }

    /// Rebuild the screen for the router's current route
    fn enter_route(&mut self) {
        self.ensure_cities();
        self.location_input = self.router.location().to_string();

        let plan = plan_route(self.router.route(), &self.cities);
        let generation = self.router.generation();
        let (screen, jobs) = mount_route(plan, generation, &mut self.maps, &mut self.preselect);
        self.screen = screen;
        for job in jobs {
            self.worker.submit(job);
        }
        self.request_next_photo();
    }

    fn request_next_photo(&mut self) {
        let Screen::City(screen) = &mut self.screen else {
            return;
        };
        if let Some((index, filename)) = screen.next_photo_request() {
            self.worker.submit(Job::Image {
                key: ImageKey::Photo {
                    generation: self.router.generation(),
                    slug: screen.slug().to_string(),
                    index,
                },
                location: ImageLocation::Asset(filename),
                max_size: PHOTO_MAX_SIZE,
            });
        }
    }

    fn retry_forecast(&mut self) {
        let Screen::City(screen) = &mut self.screen else {
            return;
        };
        let Some(city) = self.cities.list().and_then(|list| list.get(screen.slug())) else {
            return;
        };
        info!("Retrying forecast for {}", city.slug);
        screen.retry_forecast();
        self.worker.submit(Job::Forecast {
            generation: self.router.generation(),
            city: city.clone(),
        });
    }

    fn handle_events(&mut self, ctx: &egui::Context) {
        for event in self.worker.drain() {
            match event {
                WorkerEvent::CitiesLoaded(result) => {
                    self.cities = match result {
                        Ok(list) => {
                            info!("Loaded {} cities", list.len());
                            CitiesState::Loaded(list)
                        }
                        Err(_) => CitiesState::Failed,
                    };
                    self.router.reload();
                    self.enter_route();
                }
                WorkerEvent::EmblemsLoaded(emblems) => {
                    info!("Loaded {} emblems", emblems.len());
                    self.emblems = emblems;
                }
                WorkerEvent::Forecast {
                    generation,
                    slug,
                    result,
                } => {
                    if !self.router.is_current(generation) {
                        debug!("Dropping stale forecast for {}", slug);
                        continue;
                    }
                    if let Screen::City(screen) = &mut self.screen {
                        if screen.slug() == slug {
                            screen.set_forecast(result);
                            if let Some(map) = self.maps.get_mut(MapContainer::City) {
                                map.set_temperature(&slug, screen.current_temperature());
                            }
                        }
                    }
                }
                WorkerEvent::CurrentTemperature {
                    generation,
                    slug,
                    temperature,
                } => {
                    if !self.router.is_current(generation) {
                        continue;
                    }
                    match &mut self.screen {
                        Screen::Home(_) => {
                            if let Some(map) = self.maps.get_mut(MapContainer::Home) {
                                map.set_temperature(&slug, temperature);
                            }
                        }
                        Screen::CityList(screen) => screen.set_temperature(slug, temperature),
                        _ => {}
                    }
                }
                WorkerEvent::Image {
                    key: ImageKey::Emblem(slug),
                    image,
                } => self.emblem_textures.store(ctx, slug, image),
                WorkerEvent::Image {
                    key: ImageKey::Photo {
                        generation,
                        slug,
                        index,
                    },
                    image,
                } => {
                    if !self.router.is_current(generation) {
                        continue;
                    }
                    if let Screen::City(screen) = &mut self.screen {
                        if screen.slug() == slug {
                            screen.photo_loaded(ctx, index, image);
                        }
                    }
                    self.request_next_photo();
                }
            }
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) -> Option<Route> {
        let mut target = None;
        let mut go_back = false;

        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(self.router.can_go_back(), egui::Button::new("←"))
                    .clicked()
                {
                    go_back = true;
                }

                let response = ui.add(egui::TextEdit::singleline(&mut self.location_input).desired_width(220.0));
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    target = Some(Route::parse(&self.location_input));
                }

                if ui.link("Главная").clicked() {
                    target = Some(Route::Home);
                }
                if ui.link("Города").clicked() {
                    target = Some(Route::CityList);
                }

                ui.separator();
                self.show_layers_menu(ui);

                if let Some(url) = self.config.bot_url.clone() {
                    if ui.button("Открыть бота").clicked() {
                        self.host.open_link(&url);
                    }
                }
            });
        });

        if go_back && self.router.back().is_some() {
            self.enter_route();
        }
        target
    }

    fn show_layers_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("Слои", |ui| {
            if !self.layers.has_overlays() {
                ui.label(format!("Погодные слои доступны с ключом OpenWeatherMap ({API_KEY_ENV})"));
                return;
            }

            let mut changed = false;
            for layer in WeatherLayer::ALL {
                changed |= ui
                    .checkbox(self.config.overlay_flag_mut(layer), layer.display_name())
                    .changed();
            }
            changed |= ui
                .add(egui::Slider::new(&mut self.config.overlay_opacity, 0.0..=1.0).text("Прозрачность"))
                .changed();
            if let Some(source) = self.api_key_source {
                ui.weak(format!("Ключ: {source}"));
            }

            if changed {
                if let Err(e) = self.config.save() {
                    warn!("Failed to save configuration: {}", e);
                }
            }
        });
    }
}

impl eframe::App for WeatherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_events(ctx);

        let mut target = self.show_top_bar(ctx);
        let mut retry = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut cx = ScreenContext {
                cities: self.cities.list(),
                cities_failed: matches!(self.cities, CitiesState::Failed),
                emblems: &self.emblems,
                emblem_textures: &mut self.emblem_textures,
                layers: &self.layers,
                overlays: self.config.overlay_settings(),
                maps: &mut self.maps,
            };

            let action = match &mut self.screen {
                Screen::Home(screen) => screen.show(ui, &mut cx),
                Screen::CityList(screen) => match cx.cities {
                    Some(list) => screen.show(ui, &mut cx, list),
                    None => None,
                },
                Screen::City(screen) => screen.show(ui, &mut cx),
                Screen::NotFound => {
                    ui.heading("Город не найден.");
                    ui.link("← Ко всем городам")
                        .clicked()
                        .then_some(Action::Navigate(Route::CityList))
                }
                Screen::Waiting => {
                    screens::show_loading(ui, "Загрузка списка городов...");
                    None
                }
                Screen::ListFailed => {
                    ui.colored_label(ui.visuals().error_fg_color, CITY_LIST_ERROR);
                    None
                }
            };

            match action {
                Some(Action::Navigate(route)) => target = Some(route),
                Some(Action::RetryForecast) => retry = true,
                None => {}
            }
        });

        if retry {
            self.retry_forecast();
        }
        if let Some(route) = target {
            self.navigate(&route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> CitiesState {
        CitiesState::Loaded(
            CityList::new(vec![
                City::new("moscow", "Москва", 55.7558, 37.6173),
                City::new("kazan", "Казань", 55.8304, 49.0661),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_known_city_plans_city_screen() {
        let cities = loaded();
        match plan_route(&Route::City("kazan".into()), &cities) {
            RoutePlan::City(city) => assert_eq!(city.name_ru, "Казань"),
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_unknown_city_is_not_found() {
        let cities = loaded();
        assert!(matches!(
            plan_route(&Route::City("atlantis".into()), &cities),
            RoutePlan::NotFound
        ));
    }

    #[test]
    fn test_list_routes_wait_then_fail() {
        for route in [Route::CityList, Route::City("kazan".into())] {
            assert!(matches!(plan_route(&route, &CitiesState::Loading), RoutePlan::Waiting));
            assert!(matches!(plan_route(&route, &CitiesState::Failed), RoutePlan::ListFailed));
        }
    }

    #[test]
    fn test_home_never_waits_for_list() {
        for cities in [CitiesState::NotRequested, CitiesState::Loading, CitiesState::Failed, loaded()] {
            assert!(matches!(plan_route(&Route::Home, &cities), RoutePlan::Home(_)));
        }
    }

    #[test]
    fn test_garbage_hash_plans_home() {
        assert!(matches!(plan_route(&Route::parse("#/weather/moscow"), &loaded()), RoutePlan::Home(_)));
    }

    /// Plan and mount the router's current route, as `enter_route` does
    fn enter(
        router: &Router,
        cities: &CitiesState,
        maps: &mut MapRegistry,
        preselect: &mut Option<String>,
    ) -> (Screen, Vec<Job>) {
        let plan = plan_route(router.route(), cities);
        mount_route(plan, router.generation(), maps, preselect)
    }

    #[test]
    fn test_city_to_city_keeps_one_map() {
        let cities = loaded();
        let mut maps = MapRegistry::new();
        let mut preselect = None;
        let mut router = Router::new("#/", None);

        router.navigate_to(&Route::City("kazan".into()));
        enter(&router, &cities, &mut maps, &mut preselect);
        router.navigate_to(&Route::City("moscow".into()));
        let (screen, jobs) = enter(&router, &cities, &mut maps, &mut preselect);

        assert!(matches!(&screen, Screen::City(s) if s.slug() == "moscow"));
        assert_eq!(maps.active_count(), 1);
        let view = maps.get_mut(MapContainer::City).unwrap();
        assert_eq!(view.markers().len(), 1);
        assert_eq!(view.markers()[0].slug, "moscow");
        assert!(matches!(
            jobs.as_slice(),
            [Job::Forecast { generation, city }]
                if *generation == router.generation() && city.slug == "moscow"
        ));
    }

    #[test]
    fn test_home_after_city_disposes_city_map() {
        let cities = loaded();
        let mut maps = MapRegistry::new();
        let mut preselect = Some("kazan".to_string());
        let mut router = Router::new("#/city/kazan", None);

        enter(&router, &cities, &mut maps, &mut preselect);
        router.navigate_to(&Route::Home);
        let (screen, jobs) = enter(&router, &cities, &mut maps, &mut preselect);

        assert!(matches!(screen, Screen::Home(_)));
        assert_eq!(maps.active_count(), 1);
        assert!(maps.get_mut(MapContainer::City).is_none());
        assert_eq!(maps.get_mut(MapContainer::Home).unwrap().popup(), Some("kazan"));
        assert!(preselect.is_none());
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|job| matches!(job, Job::CurrentTemperature { .. })));
    }

    #[test]
    fn test_preselect_kept_until_list_loads() {
        let mut maps = MapRegistry::new();
        let mut preselect = Some("kazan".to_string());
        let router = Router::new("#/", None);

        let (_, jobs) = enter(&router, &CitiesState::Loading, &mut maps, &mut preselect);
        assert!(jobs.is_empty());
        assert_eq!(preselect.as_deref(), Some("kazan"));

        let (_, jobs) = enter(&router, &CitiesState::Failed, &mut maps, &mut preselect);
        assert!(jobs.is_empty());
        assert_eq!(preselect.as_deref(), Some("kazan"));
        assert_eq!(maps.active_count(), 1);
    }
}
