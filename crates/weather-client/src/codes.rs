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

//! WMO weather interpretation codes as used by Open-Meteo.

/// Weather condition decoded from a WMO code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    RimeFog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    HeavySnow,
    SnowGrains,
    RainShowers,
    ViolentRainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormWithHail,
    /// Any code outside the table.
    Unknown,
}

impl WeatherCondition {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 => Self::Fog,
            48 => Self::RimeFog,
            51 | 53 | 55 => Self::Drizzle,
            61 | 63 => Self::Rain,
            65 => Self::HeavyRain,
            71 | 73 => Self::Snow,
            75 => Self::HeavySnow,
            77 => Self::SnowGrains,
            80 | 81 => Self::RainShowers,
            82 => Self::ViolentRainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => Self::Unknown,
        }
    }

    /// Current conditions: a missing code decodes as [`WeatherCondition::Unknown`].
    #[must_use]
    pub fn from_optional(code: Option<i32>) -> Self {
        code.map_or(Self::Unknown, Self::from_code)
    }

    /// Daily and hourly entries: a missing code is read as 0, clear sky.
    #[must_use]
    pub fn from_forecast(code: Option<i32>) -> Self {
        Self::from_code(code.unwrap_or(0))
    }

    /// Short Russian description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Ясно",
            Self::MainlyClear => "Преимущественно ясно",
            Self::PartlyCloudy => "Переменная облачность",
            Self::Overcast => "Пасмурно",
            Self::Fog => "Туман",
            Self::RimeFog => "Изморозь",
            Self::Drizzle => "Морось",
            Self::Rain => "Дождь",
            Self::HeavyRain | Self::RainShowers | Self::ViolentRainShowers => "Ливень",
            Self::Snow | Self::SnowShowers => "Снег",
            Self::HeavySnow => "Снегопад",
            Self::SnowGrains => "Снежные зёрна",
            Self::Thunderstorm => "Гроза",
            Self::ThunderstormWithHail => "Гроза с градом",
            Self::Unknown => "Облачно",
        }
    }

    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::MainlyClear => "🌤",
            Self::PartlyCloudy => "⛅",
            Self::Overcast => "☁️",
            Self::Fog | Self::RimeFog => "🌫",
            Self::Drizzle | Self::Rain => "🌧",
            Self::HeavyRain
            | Self::ViolentRainShowers
            | Self::Thunderstorm
            | Self::ThunderstormWithHail => "⛈",
            Self::Snow | Self::HeavySnow | Self::SnowGrains | Self::SnowShowers => "❄️",
            Self::RainShowers => "🌦",
            Self::Unknown => "🌡️",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// One-line clothing advice for a temperature in °C.
#[must_use]
pub fn temperature_mood(temp: f64) -> &'static str {
    if temp < -15.0 {
        "🥶 Довольно холодно — теплее одевайтесь! Теплая куртка и шапка не помешают."
    } else if temp < 0.0 {
        "🧣 Прохладно — захватите шарф и перчатки. Идеально для прогулки в парке."
    } else if temp < 15.0 {
        "🍂 Комфортная погода для прогулки. Лёгкая куртка или свитер — и вперёд!"
    } else if temp < 25.0 {
        "🌸 Тепло и уютно — отличный денёк! Можно и в футболке, и с лёгкой кофтой."
    } else {
        "🌞 Жарко — не забудьте воду и головной убор. Лучше в тени в полдень."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(WeatherCondition::from_code(0).description(), "Ясно");
        assert_eq!(WeatherCondition::from_code(53).description(), "Морось");
        assert_eq!(WeatherCondition::from_code(75).description(), "Снегопад");
        assert_eq!(WeatherCondition::from_code(99).description(), "Гроза с градом");
    }

    #[test]
    fn test_showers_share_text_but_not_emoji() {
        let showers = WeatherCondition::from_code(80);
        let violent = WeatherCondition::from_code(82);
        assert_eq!(showers.description(), violent.description());
        assert_eq!(showers.emoji(), "🌦");
        assert_eq!(violent.emoji(), "⛈");
    }

    #[test]
    fn test_unknown_defaults() {
        let unknown = WeatherCondition::from_code(42);
        assert_eq!(unknown, WeatherCondition::Unknown);
        assert_eq!(unknown.description(), "Облачно");
        assert_eq!(unknown.emoji(), "🌡️");
        assert_eq!(WeatherCondition::from_optional(None), WeatherCondition::Unknown);
    }

    #[test]
    fn test_missing_forecast_code_is_clear() {
        assert_eq!(WeatherCondition::from_forecast(None), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_forecast(Some(71)), WeatherCondition::Snow);
    }

    #[test]
    fn test_mood_bands() {
        assert!(temperature_mood(-20.0).starts_with("🥶"));
        assert!(temperature_mood(-1.0).starts_with("🧣"));
        assert!(temperature_mood(0.0).starts_with("🍂"));
        assert!(temperature_mood(25.0).starts_with("🌞"));
    }
}
