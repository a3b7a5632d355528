//! View controller for the weather card.
//!
//! State changes go through [`reducer`], which is pure: selecting a place
//! resets the view to loading and asks for a fetch via [`Effect`], and fetch
//! results are folded back in as actions. [`WeatherView`] runs the effects on
//! tokio tasks and feeds their results back through a channel.
//!
//! Every fetch carries a [`RequestId`]. Only the result for the most recent
//! selection is applied; results for older selections are dropped, so the
//! last selection wins even when responses settle out of order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    cities,
    model::{Place, UnitSystem, WeatherPayload},
    provider::WeatherFetcher,
    resource::{UiResource, weather_resource},
    viewer::ResourceViewer,
};

pub const FETCH_FAILED_FALLBACK: &str = "Failed to fetch weather data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(pub u64);

impl RequestId {
    fn next(self) -> Self {
        RequestId(self.0.wrapping_add(1))
    }
}

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Ready(WeatherPayload),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    place: Place,
    units: UnitSystem,
    phase: Phase,
    request: RequestId,
}

impl ViewState {
    pub fn new(place: Place, units: UnitSystem) -> Self {
        Self {
            place,
            units,
            phase: Phase::Loading,
            request: RequestId::default(),
        }
    }

    pub fn place(&self) -> &Place {
        &self.place
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Id of the fetch the view is currently waiting on (or last applied).
    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn payload(&self) -> Option<&WeatherPayload> {
        match &self.phase {
            Phase::Ready(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(cities::default_place(), UnitSystem::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Intent: show weather for this place.
    PlaceSelect(Place),

    WeatherDidLoad {
        request: RequestId,
        payload: WeatherPayload,
    },

    WeatherDidError {
        request: RequestId,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchWeather {
        request: RequestId,
        place: Place,
        units: UnitSystem,
    },
}

/// Outcome of a reducer step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reduced {
    /// The visible state changed and the resource should be re-rendered.
    pub changed: bool,
    pub effect: Option<Effect>,
}

impl Reduced {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            effect: None,
        }
    }
}

pub fn reducer(state: &mut ViewState, action: Action) -> Reduced {
    match action {
        Action::PlaceSelect(place) => {
            let request = state.request.next();
            state.request = request;
            state.place = place.clone();
            state.phase = Phase::Loading;

            Reduced {
                changed: true,
                effect: Some(Effect::FetchWeather {
                    request,
                    place,
                    units: state.units,
                }),
            }
        }

        Action::WeatherDidLoad { request, payload } => {
            if request != state.request {
                debug!(
                    request = request.0,
                    current = state.request.0,
                    "dropping stale weather result"
                );
                return Reduced::unchanged();
            }
            state.phase = Phase::Ready(payload);
            Reduced::changed()
        }

        Action::WeatherDidError { request, message } => {
            if request != state.request {
                debug!(
                    request = request.0,
                    current = state.request.0,
                    "dropping stale weather error"
                );
                return Reduced::unchanged();
            }
            let message = if message.trim().is_empty() {
                FETCH_FAILED_FALLBACK.to_string()
            } else {
                message
            };
            state.phase = Phase::Failed(message);
            Reduced::changed()
        }
    }
}

/// Drives a [`ViewState`] against a [`WeatherFetcher`].
///
/// The caller owns the view and decides when to wait for results; fetches run
/// on spawned tasks, so [`WeatherView::select`] never blocks on the network.
/// Requires a tokio runtime.
#[derive(Debug)]
pub struct WeatherView {
    state: ViewState,
    fetcher: Arc<dyn WeatherFetcher>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
}

impl WeatherView {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>, place: Place, units: UnitSystem) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: ViewState::new(place, units),
            fetcher,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn resource(&self) -> UiResource {
        weather_resource(&self.state)
    }

    /// Starts the first fetch cycle for the initial place.
    pub fn mount(&mut self) -> UiResource {
        let place = self.state.place.clone();
        self.select(place)
    }

    /// Switches to `place` and starts fetching. Returns the loading resource.
    pub fn select(&mut self, place: Place) -> UiResource {
        self.dispatch(Action::PlaceSelect(place));
        self.resource()
    }

    /// Waits for the next fetch to settle and applies it.
    ///
    /// Returns the new resource, or `None` if the result was for an older
    /// selection and was dropped. Waits forever if no fetch is in flight;
    /// prefer [`WeatherView::settle_current`] unless results are being
    /// stepped through one at a time.
    pub async fn settle(&mut self) -> Option<UiResource> {
        // `self` holds a sender, so the channel never closes while we wait.
        let action = self.rx.recv().await?;
        self.dispatch(action).then(|| self.resource())
    }

    /// Waits until the current selection has settled, dropping stale results.
    /// Returns immediately if no fetch has been started yet.
    pub async fn settle_current(&mut self) -> UiResource {
        while self.state.is_loading() && self.state.request != RequestId::default() {
            self.settle().await;
        }
        self.resource()
    }

    /// Runs one full cycle for `place`: shows the loading resource, then the
    /// settled one.
    pub async fn select_and_show(
        &mut self,
        place: Place,
        viewer: &mut dyn ResourceViewer,
    ) -> anyhow::Result<()> {
        viewer.show(&self.select(place))?;
        viewer.show(&self.settle_current().await)
    }

    fn dispatch(&mut self, action: Action) -> bool {
        let reduced = reducer(&mut self.state, action);
        if let Some(effect) = reduced.effect {
            self.run_effect(effect);
        }
        reduced.changed
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::FetchWeather {
                request,
                place,
                units,
            } => {
                debug!(request = request.0, place = %place, units = %units, "fetching weather");
                let fetcher = Arc::clone(&self.fetcher);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let fetch_place = place.clone();
                    let fetch = tokio::spawn(async move {
                        fetcher.fetch_weather(&fetch_place, units).await
                    });

                    // A fetch that panics still has to settle the view.
                    let action = match fetch.await {
                        Ok(Ok(payload)) => Action::WeatherDidLoad { request, payload },
                        Ok(Err(err)) => {
                            let message = format!("{err:#}");
                            warn!(place = %place, error = %message, "error fetching weather data");
                            Action::WeatherDidError { request, message }
                        }
                        Err(err) => {
                            warn!(place = %place, error = %err, "weather fetch task failed");
                            Action::WeatherDidError {
                                request,
                                message: FETCH_FAILED_FALLBACK.to_string(),
                            }
                        }
                    };
                    // Receiver is gone only when the view was dropped.
                    let _ = tx.send(action);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn place(name: &str) -> Place {
        Place::new(name).unwrap()
    }

    fn payload(temperature: f64) -> WeatherPayload {
        WeatherPayload {
            provider: "test".into(),
            location_name: "Denver".into(),
            temperature,
            feels_like: temperature,
            humidity_pct: 40,
            wind_speed: 5.0,
            wind_direction_deg: None,
            weather_code: 0,
            is_day: true,
            units: UnitSystem::Imperial,
            observation_time: Utc::now(),
        }
    }

    #[test]
    fn default_state_is_loading_atlanta_imperial() {
        let state = ViewState::default();
        assert_eq!(state.place().as_str(), "Atlanta");
        assert_eq!(state.units(), UnitSystem::Imperial);
        assert!(state.is_loading());
    }

    #[test]
    fn place_select_resets_phase_and_requests_fetch() {
        let mut state = ViewState::default();
        state.phase = Phase::Failed("old".into());

        let reduced = reducer(&mut state, Action::PlaceSelect(place("Denver")));

        assert!(reduced.changed);
        assert!(state.is_loading());
        assert_eq!(state.error(), None);
        assert_eq!(
            reduced.effect,
            Some(Effect::FetchWeather {
                request: RequestId(1),
                place: place("Denver"),
                units: UnitSystem::Imperial,
            })
        );
    }

    #[test]
    fn load_for_current_request_is_applied() {
        let mut state = ViewState::default();
        reducer(&mut state, Action::PlaceSelect(place("Denver")));

        let request = state.request();
        let reduced = reducer(
            &mut state,
            Action::WeatherDidLoad {
                request,
                payload: payload(72.0),
            },
        );

        assert!(reduced.changed);
        assert_eq!(reduced.effect, None);
        assert_eq!(state.payload().map(|p| p.temperature), Some(72.0));
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut state = ViewState::default();
        reducer(&mut state, Action::PlaceSelect(place("Denver")));
        let stale = state.request();
        reducer(&mut state, Action::PlaceSelect(place("Austin")));

        let reduced = reducer(
            &mut state,
            Action::WeatherDidLoad {
                request: stale,
                payload: payload(72.0),
            },
        );
        assert!(!reduced.changed);
        assert!(state.is_loading());

        let reduced = reducer(
            &mut state,
            Action::WeatherDidError {
                request: stale,
                message: "late".into(),
            },
        );
        assert!(!reduced.changed);
        assert!(state.is_loading());
        assert_eq!(state.place().as_str(), "Austin");
    }

    #[test]
    fn empty_error_message_falls_back() {
        let mut state = ViewState::default();
        reducer(&mut state, Action::PlaceSelect(place("Austin")));
        let request = state.request();
        reducer(
            &mut state,
            Action::WeatherDidError {
                request,
                message: "  ".into(),
            },
        );

        assert_eq!(state.error(), Some(FETCH_FAILED_FALLBACK));
    }

    #[test]
    fn reselecting_same_place_starts_a_new_request() {
        let mut state = ViewState::default();
        reducer(&mut state, Action::PlaceSelect(place("Denver")));
        let first = state.request();
        reducer(
            &mut state,
            Action::WeatherDidLoad {
                request: first,
                payload: payload(72.0),
            },
        );

        reducer(&mut state, Action::PlaceSelect(place("Denver")));

        assert!(state.request() > first);
        assert!(state.is_loading());
        assert_eq!(state.payload(), None);
    }
}
