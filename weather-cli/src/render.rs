use chrono::Local;
use weather_core::{Units, WeatherSummary};

/// Multi-line, human-readable view of current conditions.
pub fn summary(weather: &WeatherSummary, units: Units) -> String {
    let temp = units.temperature_symbol();
    let mut out = format!(
        "{name}\n  {now:.0}{temp}, {condition}\n  Feels like: {feels:.0}{temp}\n  Humidity:   {humidity}%\n  Wind speed: {wind} {speed}\n  Pressure:   {pressure} hPa",
        name = weather.location_name,
        now = weather.temperature.round(),
        condition = weather.condition,
        feels = weather.feels_like.round(),
        humidity = weather.humidity_pct,
        wind = weather.wind_speed,
        speed = units.speed_symbol(),
        pressure = weather.pressure_hpa,
    );

    if let Some(observed) = weather.observation_time {
        let local = observed.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        out.push_str(&format!("\n  Observed:   {local}"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeatherSummary {
        WeatherSummary {
            location_name: "Toronto".into(),
            temperature: -3.6,
            feels_like: -8.2,
            condition: "light snow".into(),
            humidity_pct: 74,
            pressure_hpa: 1021.0,
            wind_speed: 6.2,
            observation_time: None,
        }
    }

    #[test]
    fn metric_summary_uses_celsius_and_mps() {
        let out = summary(&sample(), Units::Metric);

        assert!(out.starts_with("Toronto\n"));
        assert!(out.contains("-4°C, light snow"));
        assert!(out.contains("Feels like: -8°C"));
        assert!(out.contains("Wind speed: 6.2 m/s"));
        assert!(out.contains("Pressure:   1021 hPa"));
        assert!(!out.contains("Observed"));
        assert_eq!(out.lines().count(), 6);
    }

    #[test]
    fn observation_time_adds_a_line() {
        let weather = WeatherSummary {
            observation_time: chrono::DateTime::from_timestamp(1_700_000_000, 0),
            ..sample()
        };
        let out = summary(&weather, Units::Standard);

        assert!(out.contains("K, light snow"));
        assert!(out.lines().last().unwrap().starts_with("  Observed:   "));
    }

    #[test]
    fn imperial_summary_uses_fahrenheit_and_mph() {
        let out = summary(&sample(), Units::Imperial);

        assert!(out.contains("°F"));
        assert!(out.contains("mph"));
    }
}
