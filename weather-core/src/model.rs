use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

/// A decoded weatherapi.com response: current conditions plus, when the
/// forecast endpoint was queried, the daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub current: WeatherSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
}

impl WeatherReport {
    /// Decode a response body. Unknown keys are ignored, missing required keys fail.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Forecast days in the order the provider returned them.
    pub fn forecast_days(&self) -> &[ForecastDay] {
        self.forecast.as_ref().map(|f| f.forecastday.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(rename = "temp_c")]
    pub temperature_c: f64,
    #[serde(rename = "feelslike_c")]
    pub feels_like_c: f64,
    pub condition: Condition,
    /// Sent as `65` or `65.0` depending on the provider.
    #[serde(rename = "humidity", deserialize_with = "whole_percentage")]
    pub humidity_pct: u8,
    pub wind_kph: f64,
    #[serde(rename = "wind_dir")]
    pub wind_direction: String,
    pub pressure_mb: f64,
    #[serde(rename = "uv")]
    pub uv_index: f64,
}

/// Accepts an integer or a finite whole-number float that fits in `u8`.
fn whole_percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => u8::try_from(v)
            .map_err(|_| D::Error::custom(format!("percentage {v} out of range"))),
        Raw::Float(v) if v.is_finite() && v.fract() == 0.0 && (0.0..=255.0).contains(&v) => {
            Ok(v as u8)
        }
        Raw::Float(v) => {
            Err(D::Error::custom(format!("percentage {v} is not a whole number in range")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Scheme-relative path, e.g. `//cdn.weatherapi.com/weather/64x64/day/113.png`.
    pub icon: String,
}

/// Coarse classification of a condition text, for picking decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Rainy,
    Snowy,
    Sunny,
    Other,
}

impl Condition {
    /// Icon location with the `https:` scheme attached.
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("http://") || self.icon.starts_with("https://") {
            self.icon.clone()
        } else {
            format!("https:{}", self.icon)
        }
    }

    pub fn kind(&self) -> ConditionKind {
        let text = self.text.to_lowercase();

        if text.contains("rain") {
            ConditionKind::Rainy
        } else if text.contains("snow") {
            ConditionKind::Snowy
        } else if text.contains("sun") || text.contains("clear") {
            ConditionKind::Sunny
        } else {
            ConditionKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub day: DaySummary,
}

impl ForecastDay {
    /// `None` when the provider used a format other than `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    #[serde(rename = "avgtemp_c")]
    pub avg_temperature_c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub localtime: String,
}

impl Location {
    /// Local wall-clock time at the location, e.g. `2024-03-21 14:05`.
    pub fn parsed_localtime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.localtime, "%Y-%m-%d %H:%M").ok()
    }

    pub fn display_name(&self) -> String {
        if self.region.is_empty() || self.region == self.name {
            format!("{}, {}", self.name, self.country)
        } else {
            format!("{}, {}, {}", self.name, self.region, self.country)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const LONDON_FORECAST: &str = r#"{
        "location": {
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
            "lat": 51.52,
            "lon": -0.11,
            "localtime": "2024-03-21 14:05"
        },
        "current": {
            "last_updated": "2024-03-21 14:00",
            "temp_c": 20.0,
            "feelslike_c": 19.0,
            "condition": { "text": "Sunny", "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png", "code": 1000 },
            "humidity": 65,
            "wind_kph": 12.0,
            "wind_dir": "NE",
            "pressure_mb": 1015.0,
            "uv": 5.0
        },
        "forecast": {
            "forecastday": [
                { "date": "2024-03-21", "day": { "avgtemp_c": 22.0, "maxtemp_c": 25.1 } },
                { "date": "2024-03-22", "day": { "avgtemp_c": 21.0 } },
                { "date": "2024-03-23", "day": { "avgtemp_c": 20.0 } }
            ]
        }
    }"#;

    #[test]
    fn decodes_every_current_field() {
        let report = WeatherReport::from_json(LONDON_FORECAST.as_bytes()).unwrap();
        let current = &report.current;

        assert_eq!(current.temperature_c, 20.0);
        assert_eq!(current.feels_like_c, 19.0);
        assert_eq!(current.condition.text, "Sunny");
        assert_eq!(current.condition.icon, "//cdn.weatherapi.com/weather/64x64/day/113.png");
        assert_eq!(current.humidity_pct, 65);
        assert_eq!(current.wind_kph, 12.0);
        assert_eq!(current.wind_direction, "NE");
        assert_eq!(current.pressure_mb, 1015.0);
        assert_eq!(current.uv_index, 5.0);

        let location = report.location.as_ref().expect("location present");
        assert_eq!(location.name, "London");
        assert_eq!(location.country, "United Kingdom");
    }

    #[test]
    fn forecast_order_is_preserved() {
        let report = WeatherReport::from_json(LONDON_FORECAST.as_bytes()).unwrap();

        let dates: Vec<&str> = report.forecast_days().iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, ["2024-03-21", "2024-03-22", "2024-03-23"]);

        let temps: Vec<f64> =
            report.forecast_days().iter().map(|d| d.day.avg_temperature_c).collect();
        assert_eq!(temps, [22.0, 21.0, 20.0]);
    }

    #[test]
    fn decoding_twice_gives_equal_reports() {
        let a = WeatherReport::from_json(LONDON_FORECAST.as_bytes()).unwrap();
        let b = WeatherReport::from_json(LONDON_FORECAST.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn humidity_accepts_whole_float() {
        let body = LONDON_FORECAST.replace(r#""humidity": 65"#, r#""humidity": 65.0"#);
        let report = WeatherReport::from_json(body.as_bytes()).unwrap();
        assert_eq!(report.current.humidity_pct, 65);
    }

    #[test]
    fn humidity_rejects_fractional_or_out_of_range() {
        for value in ["65.5", "-1", "300", "-1.0"] {
            let body =
                LONDON_FORECAST.replace(r#""humidity": 65"#, &format!(r#""humidity": {value}"#));
            assert!(WeatherReport::from_json(body.as_bytes()).is_err(), "humidity {value}");
        }
    }

    #[test]
    fn encode_then_decode_gives_same_report() {
        let report = WeatherReport::from_json(LONDON_FORECAST.as_bytes()).unwrap();

        let encoded = serde_json::to_vec(&report).unwrap();
        let decoded = WeatherReport::from_json(&encoded).unwrap();
        assert_eq!(decoded, report);

        // provider key names are written back out
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(value["current"]["temp_c"], 20.0);
        assert_eq!(value["current"]["wind_dir"], "NE");
        assert_eq!(value["forecast"]["forecastday"][1]["day"]["avgtemp_c"], 21.0);
    }

    #[test]
    fn encode_then_decode_without_location_or_forecast() {
        let mut report = WeatherReport::from_json(LONDON_FORECAST.as_bytes()).unwrap();
        report.location = None;
        report.forecast = None;

        let encoded = serde_json::to_vec(&report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert!(value.get("location").is_none());
        assert!(value.get("forecast").is_none());

        let decoded = WeatherReport::from_json(&encoded).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn current_only_body_has_no_forecast() {
        let body = r#"{"current":{"temp_c":-3.5,"feelslike_c":-8.1,
            "condition":{"text":"Light snow","icon":"//cdn/x.png"},
            "humidity":93,"wind_kph":20.2,"wind_dir":"NNW","pressure_mb":998.0,"uv":1.0}}"#;

        let report = WeatherReport::from_json(body.as_bytes()).unwrap();

        assert!(report.forecast.is_none());
        assert!(report.location.is_none());
        assert!(report.forecast_days().is_empty());
        assert_eq!(report.current.temperature_c, -3.5);
    }

    #[test]
    fn missing_condition_is_rejected() {
        let body = r#"{"current":{"temp_c":1.0,"feelslike_c":1.0,"humidity":1,
            "wind_kph":1.0,"wind_dir":"N","pressure_mb":1.0,"uv":1.0}}"#;

        let err = WeatherReport::from_json(body.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("condition"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let body = LONDON_FORECAST.replace(r#""humidity": 65"#, r#""humidity": "high""#);
        assert!(WeatherReport::from_json(body.as_bytes()).is_err());
    }

    #[test]
    fn icon_url_gets_https_scheme() {
        let condition = Condition { text: "Sunny".into(), icon: "//cdn/113.png".into() };
        assert_eq!(condition.icon_url(), "https://cdn/113.png");

        let absolute = Condition { text: "Sunny".into(), icon: "https://cdn/113.png".into() };
        assert_eq!(absolute.icon_url(), "https://cdn/113.png");
    }

    #[test]
    fn condition_kind_classification() {
        let kind = |text: &str| Condition { text: text.into(), icon: String::new() }.kind();

        assert_eq!(kind("Patchy light rain"), ConditionKind::Rainy);
        assert_eq!(kind("Heavy Snow"), ConditionKind::Snowy);
        assert_eq!(kind("Sunny"), ConditionKind::Sunny);
        assert_eq!(kind("Clear"), ConditionKind::Sunny);
        assert_eq!(kind("Overcast"), ConditionKind::Other);
        // rain wins over snow
        assert_eq!(kind("Light sleet: rain and snow"), ConditionKind::Rainy);
    }

    #[test]
    fn lenient_date_parsing() {
        let report = WeatherReport::from_json(LONDON_FORECAST.as_bytes()).unwrap();

        let first = &report.forecast_days()[0];
        assert_eq!(first.parsed_date(), NaiveDate::from_ymd_opt(2024, 3, 21));

        let odd = ForecastDay {
            date: "21/03/2024".into(),
            day: DaySummary { avg_temperature_c: 0.0 },
        };
        assert_eq!(odd.parsed_date(), None);

        let location = report.location.unwrap();
        let localtime = location.parsed_localtime().expect("localtime parses");
        assert_eq!(localtime.format("%H:%M").to_string(), "14:05");
        assert_eq!(
            location.display_name(),
            "London, City of London, Greater London, United Kingdom"
        );
    }
}
