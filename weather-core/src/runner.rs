//! Executes the I/O effects of the dashboard.
//! Each lookup runs on its own task; results come back as actions on a channel.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    dashboard::{Action, Effect, Lookup},
    location::LocationResolver,
    provider::WeatherProvider,
};

#[derive(Debug, Clone)]
pub struct EffectRunner {
    provider: Arc<dyn WeatherProvider>,
    resolver: Arc<dyn LocationResolver>,
    actions: mpsc::UnboundedSender<Action>,
}

impl EffectRunner {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        resolver: Arc<dyn LocationResolver>,
    ) -> (Self, mpsc::UnboundedReceiver<Action>) {
        let (actions, rx) = mpsc::unbounded_channel();
        (Self { provider, resolver, actions }, rx)
    }

    /// Spawns location and fetch effects. Anything else (notices, exit) is
    /// handed back to the caller.
    pub fn dispatch(&self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::ResolveLocation => {
                self.spawn_resolve();
                None
            }
            Effect::Fetch(lookup) => {
                self.spawn_fetch(lookup);
                None
            }
            other => Some(other),
        }
    }

    fn spawn_resolve(&self) {
        let resolver = Arc::clone(&self.resolver);
        let tx = self.actions.clone();

        tokio::spawn(async move {
            let action = match resolver.resolve_current_location().await {
                Ok(coords) => Action::LocationResolved(coords),
                Err(err) => Action::LocationFailed(err),
            };
            // The receiver is gone only after the dashboard shut down.
            let _ = tx.send(action);
        });
    }

    fn spawn_fetch(&self, lookup: Lookup) {
        let provider = Arc::clone(&self.provider);
        let tx = self.actions.clone();

        tokio::spawn(async move {
            let result = match &lookup {
                Lookup::Coordinates(coords) => provider.fetch_by_coordinates(*coords).await,
                Lookup::City(city) => provider.fetch_city(city).await,
            };
            let action = match result {
                Ok(snapshot) => Action::FetchSucceeded(Box::new(snapshot)),
                Err(err) => Action::FetchFailed(lookup, err),
            };
            let _ = tx.send(action);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        WeatherError,
        location::{DisabledLocation, FixedLocation},
        model::{CityName, Coordinates, WeatherSnapshot},
        notify::Notice,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingProvider {
        requests: Mutex<Vec<Lookup>>,
    }

    #[async_trait]
    impl WeatherProvider for RecordingProvider {
        async fn fetch_by_coordinates(
            &self,
            coords: Coordinates,
        ) -> Result<WeatherSnapshot, WeatherError> {
            self.requests.lock().unwrap().push(Lookup::Coordinates(coords));
            Err(WeatherError::Network("offline".into()))
        }

        async fn fetch_city(&self, city: &CityName) -> Result<WeatherSnapshot, WeatherError> {
            self.requests.lock().unwrap().push(Lookup::City(city.clone()));
            Err(WeatherError::NotFound(city.to_string()))
        }
    }

    #[tokio::test]
    async fn resolve_then_fetch_round_trip() {
        let provider = Arc::new(RecordingProvider::default());
        let coords = Coordinates::new(51.5, -0.12);
        let (runner, mut rx) = EffectRunner::new(provider.clone(), Arc::new(FixedLocation(coords)));

        assert!(runner.dispatch(Effect::ResolveLocation).is_none());
        assert_eq!(rx.recv().await, Some(Action::LocationResolved(coords)));

        assert!(runner.dispatch(Effect::Fetch(Lookup::Coordinates(coords))).is_none());
        assert_eq!(
            rx.recv().await,
            Some(Action::FetchFailed(
                Lookup::Coordinates(coords),
                WeatherError::Network("offline".into())
            ))
        );

        assert_eq!(*provider.requests.lock().unwrap(), vec![Lookup::Coordinates(coords)]);
    }

    #[tokio::test]
    async fn denied_location_is_reported_as_action() {
        let (runner, mut rx) =
            EffectRunner::new(Arc::new(RecordingProvider::default()), Arc::new(DisabledLocation));

        runner.dispatch(Effect::ResolveLocation);

        assert_eq!(rx.recv().await, Some(Action::LocationFailed(WeatherError::LocationDenied)));
    }

    #[tokio::test]
    async fn city_fetch_uses_validated_name() {
        let provider = Arc::new(RecordingProvider::default());
        let (runner, mut rx) =
            EffectRunner::new(provider.clone(), Arc::new(DisabledLocation));

        let city = CityName::parse("Atlantis").unwrap();
        runner.dispatch(Effect::Fetch(Lookup::City(city.clone())));

        assert_eq!(
            rx.recv().await,
            Some(Action::FetchFailed(
                Lookup::City(city.clone()),
                WeatherError::NotFound("Atlantis".into())
            ))
        );
        assert_eq!(*provider.requests.lock().unwrap(), vec![Lookup::City(city)]);
    }

    #[test]
    fn non_io_effects_are_returned() {
        let (runner, _rx) =
            EffectRunner::new(Arc::new(RecordingProvider::default()), Arc::new(DisabledLocation));

        assert_eq!(runner.dispatch(Effect::Exit), Some(Effect::Exit));
        let notice = Effect::Notify(Notice::success("ok"));
        assert_eq!(runner.dispatch(notice.clone()), Some(notice));
    }
}
