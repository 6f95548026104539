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

//! Embedding host bridge.
//!
//! A launcher may pass a start city and theme colours through the
//! environment. When nothing is supplied the app behaves as standalone.

use eframe::egui;
use log::{info, warn};

pub const START_PARAM_ENV: &str = "TG_START_PARAM";
pub const THEME_BG_ENV: &str = "TG_THEME_BG";
pub const THEME_TEXT_ENV: &str = "TG_THEME_TEXT";

/// Parse `#rrggbb` or `rrggbb` into a colour.
pub fn parse_hex_color(value: &str) -> Option<egui::Color32> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(egui::Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Host-supplied colours. Invalid values are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThemeParams {
    pub bg_color: Option<egui::Color32>,
    pub text_color: Option<egui::Color32>,
}

impl ThemeParams {
    pub fn from_strings(bg: Option<&str>, text: Option<&str>) -> Self {
        let parse = |name: &str, value: Option<&str>| {
            let value = value?;
            let color = parse_hex_color(value);
            if color.is_none() {
                warn!("Ignoring invalid {} colour {:?}", name, value);
            }
            color
        };
        Self {
            bg_color: parse("background", bg),
            text_color: parse("text", text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bg_color.is_none() && self.text_color.is_none()
    }

    /// Apply to egui visuals. Returns false when there is nothing to apply.
    pub fn apply(&self, ctx: &egui::Context) -> bool {
        if self.is_empty() {
            return false;
        }
        let theme = *self;
        ctx.style_mut(|style| {
            if let Some(bg) = theme.bg_color {
                style.visuals.panel_fill = bg;
                style.visuals.window_fill = bg;
            }
            if let Some(text) = theme.text_color {
                style.visuals.override_text_color = Some(text);
            }
        });
        true
    }
}

/// What the embedding host provided at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostContext {
    pub start_param: Option<String>,
    pub theme: ThemeParams,
}

impl HostContext {
    /// Read the host environment; a CLI start value wins over the env one.
    pub fn from_env(cli_start: Option<String>) -> Self {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let start_param = cli_start.or_else(|| env(START_PARAM_ENV));
        let theme = ThemeParams::from_strings(
            env(THEME_BG_ENV).as_deref(),
            env(THEME_TEXT_ENV).as_deref(),
        );
        if start_param.is_some() || !theme.is_empty() {
            info!("Host context: start={:?} theme={:?}", start_param, theme);
        }
        Self { start_param, theme }
    }

    /// Open an external link in the system browser.
    pub fn open_link(&self, url: &str) {
        if let Err(e) = webbrowser::open(url) {
            warn!("Failed to open {}: {}", url, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#1e90ff"), Some(egui::Color32::from_rgb(30, 144, 255)));
        assert_eq!(parse_hex_color("FFFFFF"), Some(egui::Color32::WHITE));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_invalid_theme_values_ignored() {
        let theme = ThemeParams::from_strings(Some("not-a-colour"), Some("#000000"));
        assert_eq!(theme.bg_color, None);
        assert_eq!(theme.text_color, Some(egui::Color32::BLACK));
        assert!(ThemeParams::from_strings(None, None).is_empty());
    }

    #[test]
    fn test_empty_theme_changes_nothing() {
        let ctx = egui::Context::default();
        let before = ctx.style().visuals.panel_fill;
        assert!(!ThemeParams::default().apply(&ctx));
        assert_eq!(ctx.style().visuals.panel_fill, before);
    }
}
