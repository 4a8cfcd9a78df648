//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use heatwatch_core::{Reading, TransitionEvent};
use heatwatch_types::{Location, RiskLevel};

/// Header row of the history CSV export.
pub const CSV_HEADER: &str =
    "timestamp,temperature_c,humidity_pct,pm25,uv_index,wind_kmh,heat_index_c,risk";

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    /// Serialize value to pretty JSON with a trailing newline.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)? + "\n")
    }

    /// Risk level label, colored by severity.
    #[must_use]
    pub fn risk(&self, level: RiskLevel) -> String {
        let label = level.to_string();
        if self.no_color {
            return label;
        }
        match level {
            RiskLevel::Low => label.green().to_string(),
            RiskLevel::Medium => label.yellow().to_string(),
            RiskLevel::High => label.red().bold().to_string(),
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.dimmed().to_string()
        }
    }
}

/// A reading together with where it was taken.
#[derive(Debug, Serialize)]
pub struct LocatedReading<'a> {
    pub location: &'a Location,
    #[serde(flatten)]
    pub reading: &'a Reading,
}

/// Format a timestamp as RFC 3339.
pub fn format_timestamp(reading: &Reading) -> Result<String> {
    Ok(reading.timestamp().format(&Rfc3339)?)
}

/// Multi-line description of a single reading.
#[must_use]
pub fn format_reading_text(location: Option<&Location>, reading: &Reading, opts: &FormatOptions) -> String {
    let mut out = String::new();
    if let Some(location) = location {
        out.push_str(&format!("{}\n", location));
        out.push_str(&format!("{}\n", opts.dim(&location.coordinates.to_string())));
    }
    out.push_str(&format!(
        "  Temperature  {:.1}°C\n  Humidity     {}%\n  Heat index   {:.1}°C\n",
        reading.temperature(),
        reading.humidity(),
        reading.heat_index()
    ));
    out.push_str(&format!(
        "  PM2.5        {} µg/m³\n  UV index     {}\n  Wind         {:.1} km/h\n",
        reading.pm25(),
        reading.uv_index(),
        reading.wind_speed()
    ));
    let level = reading.risk_level();
    out.push_str(&format!(
        "  Risk         {} ({})\n  {}\n",
        opts.risk(level),
        level.description(),
        level.action()
    ));
    out
}

/// One line per reading, for watch mode.
///
/// The arrow compares the heat index with the previous reading.
#[must_use]
pub fn format_watch_line(reading: &Reading, previous: Option<&Reading>, opts: &FormatOptions) -> String {
    let time = reading
        .timestamp()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "-".to_string());
    let trend = match previous.map(|p| reading.heat_index() - p.heat_index()) {
        Some(delta) if delta > 0.0 => "↑",
        Some(delta) if delta < 0.0 => "↓",
        Some(_) => "→",
        None => " ",
    };
    format!(
        "[{}] HI {:>5.1}°C {} | T {:.1}°C RH {:>3}% | PM2.5 {:>3} | UV {:>2} | {}\n",
        opts.dim(&time),
        reading.heat_index(),
        trend,
        reading.temperature(),
        reading.humidity(),
        reading.pm25(),
        reading.uv_index(),
        opts.risk(reading.risk_level())
    )
}

/// Announcement of a risk change.
#[must_use]
pub fn format_transition(transition: &TransitionEvent, opts: &FormatOptions) -> String {
    let arrow = if transition.is_escalation() { "▲" } else { "▼" };
    format!(
        "{} Risk {} → {}: {}\n",
        arrow,
        opts.risk(transition.from),
        opts.risk(transition.to),
        transition.to.action()
    )
}

/// Numbered list of search results.
#[must_use]
pub fn format_locations_text(locations: &[Location], opts: &FormatOptions) -> String {
    if locations.is_empty() {
        return "No matching places.\n".to_string();
    }
    locations
        .iter()
        .enumerate()
        .map(|(i, location)| {
            format!(
                "{:>2}. {}  {}\n",
                i + 1,
                location,
                opts.dim(&location.coordinates.to_string())
            )
        })
        .collect()
}

/// Escape a string for CSV output.
/// Wraps the value in quotes if it contains commas, quotes, or newlines.
/// Double quotes are escaped by doubling them.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render readings, oldest first, as CSV with a header row.
pub fn history_csv(readings: &[Reading]) -> Result<String> {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for r in readings {
        out.push_str(&format!(
            "{},{:.1},{},{},{},{:.1},{:.1},{}\n",
            csv_escape(&format_timestamp(r)?),
            r.temperature(),
            r.humidity(),
            r.pm25(),
            r.uv_index(),
            r.wind_speed(),
            r.heat_index(),
            csv_escape(&r.risk_level().to_string())
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatwatch_core::{Measurements, RiskClassifier};
    use heatwatch_types::Coordinates;
    use time::OffsetDateTime;
    use time::macros::datetime;

    fn reading(at: OffsetDateTime, temperature: f64, pm25: f64) -> Reading {
        Reading::derive(
            at,
            Measurements::new(temperature, 50.0, pm25, 2.0, 5.0),
            &RiskClassifier::default(),
        )
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_history_csv() {
        let readings = vec![
            reading(datetime!(2026-07-01 12:00 UTC), 25.0, 10.0),
            reading(datetime!(2026-07-01 13:00 UTC), 25.04, 80.0),
        ];
        let csv = history_csv(&readings).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "2026-07-01T12:00:00Z,25.0,50,10,2,5.0,25.0,Low");
        assert_eq!(lines[2], "2026-07-01T13:00:00Z,25.0,50,80,2,5.0,25.0,Medium");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_history_csv_has_header() {
        assert_eq!(history_csv(&[]).unwrap(), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_risk_without_color() {
        let opts = FormatOptions::new(true);
        assert_eq!(opts.risk(RiskLevel::High), "High");
    }

    #[test]
    fn test_reading_text_mentions_risk() {
        let opts = FormatOptions::new(true);
        let location = Location::new("Delhi", "IN", Coordinates::new(28.6139, 77.209).unwrap());
        let text = format_reading_text(
            Some(&location),
            &reading(OffsetDateTime::UNIX_EPOCH, 25.0, 80.0),
            &opts,
        );
        assert!(text.starts_with("Delhi, IN\n"));
        assert!(text.contains("PM2.5        80 µg/m³"));
        assert!(text.contains("Risk         Medium"));
    }

    #[test]
    fn test_watch_line_trend() {
        let opts = FormatOptions::new(true);
        let first = reading(OffsetDateTime::UNIX_EPOCH, 20.0, 10.0);
        let second = reading(OffsetDateTime::UNIX_EPOCH, 22.0, 10.0);
        assert!(format_watch_line(&second, Some(&first), &opts).contains("↑"));
        assert!(format_watch_line(&first, Some(&second), &opts).contains("↓"));
        assert!(format_watch_line(&first, None, &opts).ends_with("Low\n"));
    }

    #[test]
    fn test_locations_text() {
        let opts = FormatOptions::new(true);
        assert_eq!(format_locations_text(&[], &opts), "No matching places.\n");
        let places = vec![Location::new(
            "Phoenix",
            "US",
            Coordinates::new(33.4484, -112.074).unwrap(),
        )];
        assert_eq!(
            format_locations_text(&places, &opts),
            " 1. Phoenix, US  33.4484, -112.0740\n"
        );
    }

    #[test]
    fn test_located_reading_json() {
        let opts = FormatOptions::default();
        let location = Location::new("Delhi", "IN", Coordinates::new(28.6139, 77.209).unwrap());
        let r = reading(datetime!(2026-07-01 12:00 UTC), 25.0, 10.0);
        let json = opts
            .as_json(&LocatedReading {
                location: &location,
                reading: &r,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["location"]["name"], "Delhi");
        assert_eq!(value["timestamp"], "2026-07-01T12:00:00Z");
        assert_eq!(value["heat_index"], 25.0);
    }
}
