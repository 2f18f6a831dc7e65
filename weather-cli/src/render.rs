use chrono::NaiveDate;
use std::fmt;
use weather_core::{WeatherError, WeatherReport};

/// Human-readable rendering of a report.
pub struct ReportView<'a> {
    city: &'a str,
    report: &'a WeatherReport,
}

impl<'a> ReportView<'a> {
    pub fn new(city: &'a str, report: &'a WeatherReport) -> Self {
        Self { city, report }
    }
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = &self.report.current;

        match &self.report.location {
            Some(location) => writeln!(f, "Weather in {}", location.display_name())?,
            None => writeln!(f, "Weather in {}", self.city)?,
        }

        if let Some(localtime) =
            self.report.location.as_ref().and_then(|l| l.parsed_localtime())
        {
            row(f, "Local time", &localtime.format("%a %d %b %H:%M").to_string())?;
        }

        row(f, "Temperature", &format!("{:.1}°C", current.temperature_c))?;
        row(f, "Feels like", &format!("{:.1}°C", current.feels_like_c))?;
        row(f, "Description", &current.condition.text)?;
        row(f, "Humidity", &format!("{}%", current.humidity_pct))?;
        row(f, "Wind", &format!("{:.1} km/h ({})", current.wind_kph, current.wind_direction))?;
        row(f, "Pressure", &format!("{} mb", current.pressure_mb))?;
        row(f, "UV index", &format!("{}", current.uv_index))?;
        row(f, "Icon", &current.condition.icon_url())?;

        let days = self.report.forecast_days();
        if !days.is_empty() {
            writeln!(f)?;
            writeln!(f, "Forecast")?;
            for day in days {
                let label = match day.parsed_date() {
                    Some(date) => format!("{} {}", weekday(date), day.date),
                    None => day.date.clone(),
                };
                row(f, &label, &format!("{:.1}°C", day.day.avg_temperature_c))?;
            }
        }

        Ok(())
    }
}

fn row(f: &mut fmt::Formatter<'_>, title: &str, value: &str) -> fmt::Result {
    writeln!(f, "  {:<16} {}", format!("{title}:"), value)
}

fn weekday(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// User-facing text for a failed lookup.
pub fn error_message(err: &WeatherError) -> String {
    let detail = match err {
        WeatherError::InvalidRequest { reason } => {
            format!("the city name cannot be used in a request ({reason})")
        }
        WeatherError::Transport(source) => {
            format!("unable to reach the weather service, check your connection ({source})")
        }
        WeatherError::NoData => "the weather service returned no data".to_string(),
        WeatherError::Decode(_) => {
            "the weather service sent a response that could not be read".to_string()
        }
        WeatherError::Status { status, message } => {
            format!("the weather service rejected the request ({status}): {message}")
        }
    };

    format!("Failed to fetch weather: {detail}")
}
