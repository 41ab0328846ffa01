//! The fetch-and-render cycle as a pure state machine.
//!
//! [`Dashboard::update`] takes an [`Action`] and returns the [`Effect`]s the
//! runtime must perform (resolve a location, fetch, show a notice, exit).
//! Completed effects come back in as further actions. Nothing in here does I/O.

use chrono::{DateTime, Utc};
use std::mem;

use crate::{
    WeatherError,
    model::{CityName, Coordinates, WeatherSnapshot},
    notify::Notice,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// What a fetch is keyed by.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Coordinates(Coordinates),
    City(CityName),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    /// Nothing requested yet.
    Idle,
    /// A fetch is in flight. `stale` is whatever was on screen before it.
    Loading { lookup: Lookup, stale: Option<Box<WeatherSnapshot>> },
    Loaded(Box<WeatherSnapshot>),
    /// The last fetch failed. The previously shown snapshot stays visible.
    Failed { reason: WeatherError, stale: Option<Box<WeatherSnapshot>> },
}

impl RequestState {
    /// The snapshot to render in this state, if any.
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            RequestState::Idle => None,
            RequestState::Loaded(snapshot) => Some(&**snapshot),
            RequestState::Loading { stale, .. } | RequestState::Failed { stale, .. } => {
                stale.as_deref()
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading { .. })
    }

    fn into_snapshot(self) -> Option<Box<WeatherSnapshot>> {
        match self {
            RequestState::Idle => None,
            RequestState::Loaded(snapshot) => Some(snapshot),
            RequestState::Loading { stale, .. } | RequestState::Failed { stale, .. } => stale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Mount,
    LocationResolved(Coordinates),
    LocationFailed(WeatherError),
    InputChanged(String),
    Submit,
    KeyPressed(Key),
    FetchSucceeded(Box<WeatherSnapshot>),
    FetchFailed(Lookup, WeatherError),
    ToggleTheme,
    Tick(DateTime<Utc>),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ResolveLocation,
    Fetch(Lookup),
    Notify(Notice),
    Exit,
}

const STILL_LOADING: &str = "Still fetching weather data, please wait.";

#[derive(Debug, Clone)]
pub struct Dashboard {
    state: RequestState,
    theme: Theme,
    input: String,
    now: DateTime<Utc>,
    mounted: bool,
}

impl Dashboard {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: RequestState::Idle,
            theme: Theme::default(),
            input: String::new(),
            now,
            mounted: false,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.state.snapshot()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The submit control is disabled while a fetch is in flight.
    pub fn can_submit(&self) -> bool {
        !self.state.is_loading()
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Mount => {
                if self.mounted {
                    return Vec::new();
                }
                self.mounted = true;
                vec![Effect::ResolveLocation]
            }
            Action::LocationResolved(coords) => {
                tracing::debug!(lat = coords.latitude, lon = coords.longitude, "location resolved");
                self.begin(Lookup::Coordinates(coords))
            }
            Action::LocationFailed(err) => {
                tracing::warn!("geolocation failed: {}", err);
                vec![Effect::Notify(Notice::error(location_failure_message(&err)))]
            }
            Action::InputChanged(text) => {
                self.input = text;
                Vec::new()
            }
            Action::Submit | Action::KeyPressed(Key::Enter) => self.submit(),
            Action::KeyPressed(Key::Other) => Vec::new(),
            Action::FetchSucceeded(snapshot) => {
                let message = format!("Weather data fetched for {}", snapshot.location.name);
                self.state = RequestState::Loaded(snapshot);
                vec![Effect::Notify(Notice::success(message))]
            }
            Action::FetchFailed(lookup, reason) => {
                tracing::warn!("weather fetch failed: {}", reason);
                let notice = Notice::error(fetch_failure_message(&lookup, &reason));
                let stale = mem::replace(&mut self.state, RequestState::Idle).into_snapshot();
                self.state = RequestState::Failed { reason, stale };
                vec![Effect::Notify(notice)]
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
                Vec::new()
            }
            Action::Tick(now) => {
                self.now = now;
                Vec::new()
            }
            Action::Quit => vec![Effect::Exit],
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if !self.can_submit() {
            tracing::debug!("submit ignored while loading");
            return vec![Effect::Notify(Notice::warning(STILL_LOADING))];
        }

        match CityName::parse(&self.input) {
            Ok(city) => self.begin(Lookup::City(city)),
            Err(err) => vec![Effect::Notify(Notice::warning(err.to_string()))],
        }
    }

    fn begin(&mut self, lookup: Lookup) -> Vec<Effect> {
        let stale = mem::replace(&mut self.state, RequestState::Idle).into_snapshot();
        self.state = RequestState::Loading { lookup: lookup.clone(), stale };
        vec![Effect::Fetch(lookup)]
    }
}

fn location_failure_message(err: &WeatherError) -> &'static str {
    match err {
        WeatherError::LocationUnavailable => "Geolocation is not supported on this system.",
        _ => "Unable to fetch your location. Please enable location access.",
    }
}

/// "City not found" only makes sense for a lookup by name.
fn fetch_failure_message(lookup: &Lookup, err: &WeatherError) -> &'static str {
    match (lookup, err) {
        (Lookup::City(_), WeatherError::NotFound(_)) => "City not found! Please try again.",
        _ => "Failed to fetch weather data. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Atmosphere, Place, Sky, Sun, Temperatures, Wind};
    use crate::notify::NoticeLevel;

    fn snapshot(name: &str) -> Box<WeatherSnapshot> {
        Box::new(WeatherSnapshot {
            location: Place { name: name.to_string(), country_code: "GB".to_string() },
            instant: Temperatures {
                temperature_c: 14.6,
                feels_like_c: 13.9,
                temp_max_c: 16.1,
                temp_min_c: 12.8,
            },
            atmosphere: Atmosphere {
                humidity_pct: 81,
                pressure_hpa: 1012.0,
                cloudiness_pct: 75,
                visibility_meters: 10_000.0,
            },
            wind: Wind { speed_mps: 4.12 },
            sky: Sky { condition_code: 501, description: "moderate rain".to_string() },
            sun: Sun { sunrise_epoch: 1_792_390_500, sunset_epoch: 1_792_431_720 },
            timezone_offset_secs: Some(3600),
            observed_at_epoch: None,
        })
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(Utc::now())
    }

    fn notices(effects: &[Effect]) -> Vec<&Notice> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn mount_resolves_location_once() {
        let mut d = dashboard();
        assert_eq!(d.update(Action::Mount), vec![Effect::ResolveLocation]);
        assert!(d.update(Action::Mount).is_empty());
        assert_eq!(d.state(), &RequestState::Idle);
    }

    #[test]
    fn resolved_location_starts_one_coordinate_fetch() {
        let mut d = dashboard();
        d.update(Action::Mount);

        let coords = Coordinates::new(51.5, -0.12);
        let effects = d.update(Action::LocationResolved(coords));

        assert_eq!(effects, vec![Effect::Fetch(Lookup::Coordinates(coords))]);
        assert!(d.state().is_loading());
        assert!(!d.can_submit());

        let effects = d.update(Action::FetchSucceeded(snapshot("London")));
        assert_eq!(d.snapshot().map(|s| s.location.name.as_str()), Some("London"));
        assert!(matches!(d.state(), RequestState::Loaded(_)));

        let n = notices(&effects);
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].level, NoticeLevel::Success);
        assert_eq!(n[0].message, "Weather data fetched for London");
    }

    #[test]
    fn location_denial_leaves_state_idle_with_one_notice() {
        let mut d = dashboard();
        d.update(Action::Mount);

        let effects = d.update(Action::LocationFailed(WeatherError::LocationDenied));

        assert_eq!(d.state(), &RequestState::Idle);
        let n = notices(&effects);
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].level, NoticeLevel::Error);
        assert!(!effects.iter().any(|e| matches!(e, Effect::Fetch(_))));
    }

    #[test]
    fn missing_capability_has_its_own_message() {
        let mut d = dashboard();
        let effects = d.update(Action::LocationFailed(WeatherError::LocationUnavailable));
        assert!(notices(&effects)[0].message.contains("not supported"));
    }

    #[test]
    fn blank_submit_warns_without_fetching() {
        let mut d = dashboard();
        d.update(Action::InputChanged("   ".to_string()));

        let effects = d.update(Action::Submit);

        assert_eq!(effects, vec![Effect::Notify(Notice::warning("Please enter a city name!"))]);
        assert_eq!(d.state(), &RequestState::Idle);
    }

    #[test]
    fn enter_key_submits_like_the_button() {
        let mut a = dashboard();
        let mut b = dashboard();
        a.update(Action::InputChanged(" Paris ".to_string()));
        b.update(Action::InputChanged(" Paris ".to_string()));

        let by_button = a.update(Action::Submit);
        let by_key = b.update(Action::KeyPressed(Key::Enter));

        assert_eq!(by_button, by_key);
        let city = CityName::parse("Paris").unwrap();
        assert_eq!(by_key, vec![Effect::Fetch(Lookup::City(city))]);
        assert!(b.update(Action::KeyPressed(Key::Other)).is_empty());
    }

    #[test]
    fn submit_while_loading_warns_without_fetching() {
        let mut d = dashboard();
        d.update(Action::InputChanged("Paris".to_string()));
        d.update(Action::Submit);

        d.update(Action::InputChanged("Berlin".to_string()));
        let by_button = d.update(Action::Submit);
        let by_key = d.update(Action::KeyPressed(Key::Enter));

        let expected = vec![Effect::Notify(Notice::warning(STILL_LOADING))];
        assert_eq!(by_button, expected);
        assert_eq!(by_key, expected);
        match d.state() {
            RequestState::Loading { lookup, .. } => {
                assert_eq!(lookup, &Lookup::City(CityName::parse("Paris").unwrap()));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn failure_keeps_previous_snapshot() {
        let mut d = dashboard();
        d.update(Action::InputChanged("London".to_string()));
        d.update(Action::Submit);
        d.update(Action::FetchSucceeded(snapshot("London")));

        d.update(Action::InputChanged("Atlantis".to_string()));
        d.update(Action::Submit);
        // Still showing London while the new request is in flight.
        assert_eq!(d.snapshot().map(|s| s.location.name.as_str()), Some("London"));

        let atlantis = Lookup::City(CityName::parse("Atlantis").unwrap());
        let effects =
            d.update(Action::FetchFailed(atlantis, WeatherError::NotFound("Atlantis".into())));

        assert!(matches!(d.state(), RequestState::Failed { .. }));
        assert_eq!(d.snapshot().map(|s| s.location.name.as_str()), Some("London"));
        assert!(d.can_submit());
        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::error("City not found! Please try again."))]
        );
    }

    #[test]
    fn network_failure_uses_generic_message() {
        let mut d = dashboard();
        let coords = Coordinates::new(1.0, 2.0);
        d.update(Action::LocationResolved(coords));

        let effects = d.update(Action::FetchFailed(
            Lookup::Coordinates(coords),
            WeatherError::Network("reset".to_string()),
        ));

        assert_eq!(d.snapshot(), None);
        assert_eq!(
            notices(&effects)[0].message,
            "Failed to fetch weather data. Please try again."
        );
    }

    #[test]
    fn coordinate_not_found_is_not_a_missing_city() {
        let mut d = dashboard();
        d.update(Action::Mount);
        let coords = Coordinates::new(0.0, -30.0);
        d.update(Action::LocationResolved(coords));

        let effects = d.update(Action::FetchFailed(
            Lookup::Coordinates(coords),
            WeatherError::NotFound("0, -30".to_string()),
        ));

        assert!(matches!(d.state(), RequestState::Failed { .. }));
        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::error("Failed to fetch weather data. Please try again."))]
        );
    }

    #[test]
    fn later_completion_wins_when_requests_overlap() {
        let mut d = dashboard();
        d.update(Action::Mount);
        d.update(Action::InputChanged("Paris".to_string()));
        d.update(Action::Submit);
        d.update(Action::LocationResolved(Coordinates::new(51.5, -0.12)));

        d.update(Action::FetchSucceeded(snapshot("Paris")));
        d.update(Action::FetchSucceeded(snapshot("London")));

        assert_eq!(d.snapshot().map(|s| s.location.name.as_str()), Some("London"));
    }

    #[test]
    fn theme_toggle_is_independent_of_request_state() {
        let mut d = dashboard();
        d.update(Action::LocationResolved(Coordinates::new(1.0, 2.0)));
        d.update(Action::FetchSucceeded(snapshot("London")));
        let before = d.state().clone();
        let theme = d.theme();

        assert!(d.update(Action::ToggleTheme).is_empty());
        assert_eq!(d.theme(), Theme::Light);
        d.update(Action::ToggleTheme);

        assert_eq!(d.theme(), theme);
        assert_eq!(d.state(), &before);
    }

    #[test]
    fn tick_only_moves_the_clock() {
        let mut d = dashboard();
        let later = d.now() + chrono::Duration::seconds(1);

        assert!(d.update(Action::Tick(later)).is_empty());
        assert_eq!(d.now(), later);
        assert_eq!(d.state(), &RequestState::Idle);
    }

    #[test]
    fn quit_requests_exit() {
        let mut d = dashboard();
        assert_eq!(d.update(Action::Quit), vec![Effect::Exit]);
    }
}
