use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

/// Broad weather category used to pick background imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoarseCondition {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
}

impl CoarseCondition {
    /// Classify a free-text condition label.
    ///
    /// Tests run in a fixed order (clear/sun, cloud, rain) and the first hit
    /// wins, so "cloudy with rain" is `Cloudy`. Anything else is `Sunny`.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();

        if lower.contains("clear") || lower.contains("sun") {
            CoarseCondition::Sunny
        } else if lower.contains("cloud") {
            CoarseCondition::Cloudy
        } else if lower.contains("rain") {
            CoarseCondition::Rainy
        } else {
            CoarseCondition::default()
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoarseCondition::Sunny => "sunny",
            CoarseCondition::Cloudy => "cloudy",
            CoarseCondition::Rainy => "rainy",
        }
    }
}

impl std::fmt::Display for CoarseCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icon shown on a forecast card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconBucket {
    Thunderstorm,
    Drizzle,
    Rain,
    /// Shower and freezing rain.
    Showers,
    Snow,
    /// Mist, smoke, haze, fog and friends.
    Atmosphere,
    #[default]
    Clear,
    FewClouds,
    ScatteredClouds,
    /// Broken clouds and overcast.
    BrokenClouds,
}

impl IconBucket {
    pub fn glyph(&self) -> &'static str {
        match self {
            IconBucket::Thunderstorm => "⛈",
            IconBucket::Drizzle => "🌦",
            IconBucket::Rain => "🌧",
            IconBucket::Showers => "🌧",
            IconBucket::Snow => "❄",
            IconBucket::Atmosphere => "🌫",
            IconBucket::Clear => "☀",
            IconBucket::FewClouds => "🌤",
            IconBucket::ScatteredClouds => "⛅",
            IconBucket::BrokenClouds => "☁",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IconBucket::Thunderstorm => "Thunderstorm",
            IconBucket::Drizzle => "Drizzle",
            IconBucket::Rain => "Rain",
            IconBucket::Showers => "Showers",
            IconBucket::Snow => "Snow",
            IconBucket::Atmosphere => "Mist",
            IconBucket::Clear => "Clear",
            IconBucket::FewClouds => "Few clouds",
            IconBucket::ScatteredClouds => "Scattered clouds",
            IconBucket::BrokenClouds => "Cloudy",
        }
    }

    pub fn coarse(&self) -> CoarseCondition {
        match self {
            IconBucket::Clear | IconBucket::FewClouds => CoarseCondition::Sunny,
            IconBucket::ScatteredClouds | IconBucket::BrokenClouds | IconBucket::Atmosphere => {
                CoarseCondition::Cloudy
            }
            IconBucket::Thunderstorm
            | IconBucket::Drizzle
            | IconBucket::Rain
            | IconBucket::Showers => CoarseCondition::Rainy,
            // No snow imagery; snow shares the default.
            IconBucket::Snow => CoarseCondition::default(),
        }
    }
}

/// Map a provider's numeric condition code to an icon.
///
/// The two providers use unrelated code spaces. Unknown codes fall back to
/// [`IconBucket::Clear`].
pub fn classify_code(provider: ProviderId, code: u32) -> IconBucket {
    match provider {
        ProviderId::OpenWeather => openweather_bucket(code),
        ProviderId::WeatherApi => weatherapi_bucket(code),
    }
}

// https://openweathermap.org/weather-conditions
fn openweather_bucket(code: u32) -> IconBucket {
    match code {
        200..=232 => IconBucket::Thunderstorm,
        300..=321 => IconBucket::Drizzle,
        500..=504 => IconBucket::Rain,
        511 => IconBucket::Showers,
        520..=531 => IconBucket::Showers,
        600..=622 => IconBucket::Snow,
        701..=781 => IconBucket::Atmosphere,
        800 => IconBucket::Clear,
        801 => IconBucket::FewClouds,
        802 => IconBucket::ScatteredClouds,
        803 | 804 => IconBucket::BrokenClouds,
        _ => IconBucket::default(),
    }
}

// https://www.weatherapi.com/docs/weather_conditions.json
fn weatherapi_bucket(code: u32) -> IconBucket {
    match code {
        1000 => IconBucket::Clear,
        1003 => IconBucket::FewClouds,
        1006 => IconBucket::ScatteredClouds,
        1009 => IconBucket::BrokenClouds,
        1030 | 1135 | 1147 => IconBucket::Atmosphere,
        1087 | 1273 | 1276 | 1279 | 1282 => IconBucket::Thunderstorm,
        1072 | 1150 | 1153 | 1168 | 1171 => IconBucket::Drizzle,
        1063 | 1180 | 1183 | 1186 | 1189 | 1192 | 1195 => IconBucket::Rain,
        1198 | 1201 | 1240 | 1243 | 1246 => IconBucket::Showers,
        1066 | 1069 | 1114 | 1117 | 1204 | 1207 | 1210 | 1213 | 1216 | 1219 | 1222 | 1225
        | 1237 | 1249 | 1252 | 1255 | 1258 | 1261 | 1264 => IconBucket::Snow,
        _ => IconBucket::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_matching_is_case_insensitive() {
        assert_eq!(CoarseCondition::from_label("Clear"), CoarseCondition::Sunny);
        assert_eq!(CoarseCondition::from_label("SUNNY"), CoarseCondition::Sunny);
        assert_eq!(CoarseCondition::from_label("Clouds"), CoarseCondition::Cloudy);
        assert_eq!(CoarseCondition::from_label("light RAIN"), CoarseCondition::Rainy);
    }

    #[test]
    fn label_matching_uses_fixed_priority() {
        assert_eq!(CoarseCondition::from_label("rain and clouds"), CoarseCondition::Cloudy);
        assert_eq!(CoarseCondition::from_label("sun after rain"), CoarseCondition::Sunny);
        assert_eq!(CoarseCondition::from_label("Partly cloudy, sunny spells"), CoarseCondition::Sunny);
    }

    #[test]
    fn unmatched_label_defaults_to_sunny() {
        assert_eq!(CoarseCondition::from_label("Snow"), CoarseCondition::Sunny);
        assert_eq!(CoarseCondition::from_label(""), CoarseCondition::Sunny);
    }

    #[test]
    fn openweather_ranges() {
        let ow = |c| classify_code(ProviderId::OpenWeather, c);
        assert_eq!(ow(200), IconBucket::Thunderstorm);
        assert_eq!(ow(232), IconBucket::Thunderstorm);
        assert_eq!(ow(310), IconBucket::Drizzle);
        assert_eq!(ow(502), IconBucket::Rain);
        assert_eq!(ow(511), IconBucket::Showers);
        assert_eq!(ow(522), IconBucket::Showers);
        assert_eq!(ow(615), IconBucket::Snow);
        assert_eq!(ow(741), IconBucket::Atmosphere);
        assert_eq!(ow(800), IconBucket::Clear);
        assert_eq!(ow(801), IconBucket::FewClouds);
        assert_eq!(ow(802), IconBucket::ScatteredClouds);
        assert_eq!(ow(803), IconBucket::BrokenClouds);
        assert_eq!(ow(804), IconBucket::BrokenClouds);
    }

    #[test]
    fn weatherapi_codes() {
        let wa = |c| classify_code(ProviderId::WeatherApi, c);
        assert_eq!(wa(1000), IconBucket::Clear);
        assert_eq!(wa(1003), IconBucket::FewClouds);
        assert_eq!(wa(1009), IconBucket::BrokenClouds);
        assert_eq!(wa(1135), IconBucket::Atmosphere);
        assert_eq!(wa(1276), IconBucket::Thunderstorm);
        assert_eq!(wa(1153), IconBucket::Drizzle);
        assert_eq!(wa(1189), IconBucket::Rain);
        assert_eq!(wa(1243), IconBucket::Showers);
        assert_eq!(wa(1225), IconBucket::Snow);
    }

    #[test]
    fn unknown_codes_fall_back_to_default_bucket() {
        assert_eq!(classify_code(ProviderId::OpenWeather, 0), IconBucket::Clear);
        assert_eq!(classify_code(ProviderId::OpenWeather, 505), IconBucket::Clear);
        assert_eq!(classify_code(ProviderId::OpenWeather, 1000), IconBucket::Clear);
        assert_eq!(classify_code(ProviderId::WeatherApi, 9999), IconBucket::Clear);
        assert_eq!(classify_code(ProviderId::WeatherApi, 500), IconBucket::Clear);
    }

    #[test]
    fn code_spaces_are_provider_specific() {
        assert_eq!(classify_code(ProviderId::OpenWeather, 500), IconBucket::Rain);
        assert_eq!(classify_code(ProviderId::WeatherApi, 500), IconBucket::Clear);
        assert_eq!(classify_code(ProviderId::WeatherApi, 1189), IconBucket::Rain);
        assert_eq!(classify_code(ProviderId::OpenWeather, 1189), IconBucket::Clear);
    }

    #[test]
    fn buckets_map_to_coarse_conditions() {
        assert_eq!(IconBucket::BrokenClouds.coarse(), CoarseCondition::Cloudy);
        assert_eq!(IconBucket::Showers.coarse(), CoarseCondition::Rainy);
        assert_eq!(IconBucket::FewClouds.coarse(), CoarseCondition::Sunny);
    }
}
