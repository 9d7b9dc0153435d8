//! Pure projection of a query outcome into the regions of the forecast screen.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use crate::{
    config::DEFAULT_ICON_BASE,
    model::{ForecastEntry, TimezoneOffset},
    outcome::QueryOutcome,
};

/// Icon used for samples that carry no condition code.
pub const FALLBACK_CONDITION_CODE: &str = "01d";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    /// A request is pending; nothing else is shown.
    Spinner,
    Forecast(ForecastView),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForecastView {
    pub header: Option<Header>,
    pub error: Option<String>,
    pub placeholder: Option<Placeholder>,
    /// Every sample after the first, in original order.
    pub rows: Vec<Row>,
}

/// The current conditions, taken from the first sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub temperature: i64,
    pub condition_code: String,
    pub icon_url: String,
    /// `HH:MM`, city local time.
    pub time: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Long English weekday name, city local time.
    pub day: String,
    /// `HH:MM`, 24-hour, city local time.
    pub time: String,
    pub description: String,
    pub condition_code: String,
    pub icon_url: String,
    pub temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placeholder {
    /// Nothing typed yet.
    Prompt,
    /// The query succeeded but returned no samples.
    NoData { city: String },
}

impl Placeholder {
    pub fn message(&self) -> String {
        match self {
            Placeholder::Prompt => "Type a city to see the weather :)".to_string(),
            Placeholder::NoData { city } => format!("No data for \u{201c}{city}\u{201d}."),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projector {
    icon_base: String,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE)
    }
}

impl Projector {
    pub fn new(icon_base: impl Into<String>) -> Self {
        Self { icon_base: icon_base.into() }
    }

    pub fn icon_url(&self, code: &str) -> String {
        format!("{}/{code}@2x.png", self.icon_base.trim_end_matches('/'))
    }

    pub fn project(&self, query: &str, outcome: &QueryOutcome) -> Screen {
        let (entries, offset): (&[ForecastEntry], TimezoneOffset) = match outcome {
            QueryOutcome::Loading => return Screen::Spinner,
            QueryOutcome::Error { message } => {
                return Screen::Forecast(ForecastView {
                    error: Some(message.clone()),
                    ..ForecastView::default()
                });
            }
            QueryOutcome::Empty => (&[], 0),
            QueryOutcome::Success { entries, timezone_offset } => (entries, *timezone_offset),
        };

        let Some((current, rest)) = entries.split_first() else {
            let city = query.trim();
            let placeholder = if city.is_empty() {
                Placeholder::Prompt
            } else {
                Placeholder::NoData { city: city.to_string() }
            };
            return Screen::Forecast(ForecastView {
                placeholder: Some(placeholder),
                ..ForecastView::default()
            });
        };

        Screen::Forecast(ForecastView {
            header: Some(self.header(current, offset)),
            error: None,
            placeholder: None,
            rows: rest.iter().map(|entry| self.row(entry, offset)).collect(),
        })
    }

    fn header(&self, entry: &ForecastEntry, offset: TimezoneOffset) -> Header {
        let code = condition_code(entry);
        Header {
            temperature: round_half_up(entry.temperature),
            icon_url: self.icon_url(code),
            condition_code: code.to_string(),
            time: format_local(entry.timestamp, offset, "%H:%M"),
            description: entry.description.clone(),
        }
    }

    fn row(&self, entry: &ForecastEntry, offset: TimezoneOffset) -> Row {
        let code = condition_code(entry);
        Row {
            day: format_local(entry.timestamp, offset, "%A"),
            time: format_local(entry.timestamp, offset, "%H:%M"),
            description: entry.description.clone(),
            condition_code: code.to_string(),
            icon_url: self.icon_url(code),
            temperature: round_half_up(entry.temperature),
        }
    }
}

fn condition_code(entry: &ForecastEntry) -> &str {
    entry
        .condition_code
        .as_deref()
        .filter(|code| !code.is_empty())
        .unwrap_or(FALLBACK_CONDITION_CODE)
}

/// Halves round towards positive infinity: 2.5 → 3, -2.5 → -2.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Wall-clock time of `timestamp` shifted by the city's UTC offset.
pub fn local_time(timestamp: i64, offset: TimezoneOffset) -> Option<NaiveDateTime> {
    let shifted = timestamp.checked_add(offset)?;
    DateTime::from_timestamp(shifted, 0).map(|dt| dt.naive_utc())
}

fn format_local(timestamp: i64, offset: TimezoneOffset, fmt: &str) -> String {
    local_time(timestamp, offset)
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TUE_22_13_UTC: i64 = 1_700_000_000;
    const THREE_HOURS: i64 = 10_800;

    fn entry(ts: i64, temp: f64, code: Option<&str>, desc: &str) -> ForecastEntry {
        ForecastEntry {
            timestamp: ts,
            temperature: temp,
            condition_code: code.map(str::to_string),
            description: desc.to_string(),
        }
    }

    fn success(entries: Vec<ForecastEntry>, offset: i64) -> QueryOutcome {
        QueryOutcome::Success { entries, timezone_offset: offset }
    }

    fn view(screen: Screen) -> ForecastView {
        match screen {
            Screen::Forecast(view) => view,
            Screen::Spinner => panic!("expected forecast view"),
        }
    }

    #[test]
    fn loading_shows_only_spinner() {
        let screen = Projector::default().project("Oslo", &QueryOutcome::Loading);
        assert_eq!(screen, Screen::Spinner);
    }

    #[test]
    fn header_is_first_sample_and_rows_the_rest_in_order() {
        let entries: Vec<_> = (0..4)
            .map(|i| {
                entry(TUE_22_13_UTC + i * THREE_HOURS, 10.0 + i as f64, Some("03d"), &format!("s{i}"))
            })
            .collect();

        let view = view(Projector::default().project("Oslo", &success(entries, 3600)));

        let header = view.header.unwrap();
        assert_eq!(header.description, "s0");
        assert_eq!(header.temperature, 10);
        assert_eq!(header.time, "23:13");
        assert_eq!(
            view.rows.iter().map(|r| r.description.as_str()).collect::<Vec<_>>(),
            vec!["s1", "s2", "s3"]
        );
        assert!(view.error.is_none());
        assert!(view.placeholder.is_none());
    }

    #[test]
    fn single_sample_has_header_and_no_rows() {
        let view = view(
            Projector::default()
                .project("Oslo", &success(vec![entry(TUE_22_13_UTC, 1.0, None, "x")], 0)),
        );

        assert!(view.header.is_some());
        assert!(view.rows.is_empty());
        assert!(view.placeholder.is_none());
    }

    #[test]
    fn rows_format_weekday_and_time_in_city_local_time() {
        let entries = vec![
            entry(TUE_22_13_UTC, 0.0, None, ""),
            entry(TUE_22_13_UTC + THREE_HOURS, 0.0, None, ""),
            entry(TUE_22_13_UTC + 2 * THREE_HOURS, 0.0, None, ""),
        ];

        let view = view(Projector::default().project("Berlin", &success(entries, 3600)));

        assert_eq!(view.rows[0].day, "Wednesday");
        assert_eq!(view.rows[0].time, "02:13");
        assert_eq!(view.rows[1].time, "05:13");
    }

    #[test]
    fn negative_offset_shifts_back() {
        let entries = vec![entry(TUE_22_13_UTC, 0.0, None, "")];
        let view = view(Projector::default().project("Phoenix", &success(entries, -25200)));

        assert_eq!(view.header.unwrap().time, "15:13");
    }

    #[test]
    fn empty_success_shows_no_data_not_error() {
        let view = view(Projector::default().project(" Quito ", &success(vec![], 0)));

        assert_eq!(view.placeholder, Some(Placeholder::NoData { city: "Quito".into() }));
        assert!(view.error.is_none());
        assert!(view.header.is_none());
    }

    #[test]
    fn failure_shows_exact_message_and_clears_data() {
        let outcome = QueryOutcome::error("city not found");
        let view = view(Projector::default().project("Atlantis", &outcome));

        assert_eq!(view.error.as_deref(), Some("city not found"));
        assert!(view.header.is_none());
        assert!(view.rows.is_empty());
        assert!(view.placeholder.is_none());
    }

    #[test]
    fn cleared_outcome_prompts_for_a_city() {
        let view = view(Projector::default().project("   ", &QueryOutcome::Empty));

        assert_eq!(view.placeholder, Some(Placeholder::Prompt));
    }

    #[test]
    fn icon_falls_back_when_code_absent() {
        let projector = Projector::new("https://icons.test/wn/");
        let entries = vec![
            entry(TUE_22_13_UTC, 0.0, Some("10n"), ""),
            entry(TUE_22_13_UTC, 0.0, None, ""),
            entry(TUE_22_13_UTC, 0.0, Some(""), ""),
        ];

        let view = view(projector.project("x", &success(entries, 0)));

        assert_eq!(view.header.unwrap().icon_url, "https://icons.test/wn/10n@2x.png");
        assert_eq!(view.rows[0].icon_url, "https://icons.test/wn/01d@2x.png");
        assert_eq!(view.rows[1].condition_code, FALLBACK_CONDITION_CODE);
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(21.49), 21);
    }

    #[test]
    fn projection_is_deterministic() {
        let outcome = success(vec![entry(TUE_22_13_UTC, 5.0, Some("01n"), "clear sky")], 0);
        let projector = Projector::default();

        assert_eq!(projector.project("Lima", &outcome), projector.project("Lima", &outcome));
    }

    #[test]
    fn out_of_range_timestamp_does_not_panic() {
        assert_eq!(local_time(i64::MAX, 1), None);
        assert_eq!(format_local(i64::MAX, 0, "%H:%M"), "--");
    }

    #[test]
    fn screen_serializes_with_tags() {
        let spinner = serde_json::to_value(Screen::Spinner).unwrap();
        assert_eq!(spinner, serde_json::json!({ "screen": "spinner" }));

        let view = Projector::default().project("Quito", &success(vec![], 0));
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["screen"], "forecast");
        assert_eq!(json["placeholder"]["kind"], "no_data");
        assert_eq!(json["placeholder"]["city"], "Quito");
    }
}
