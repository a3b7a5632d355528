//! Core library for the `weathercard` CLI.
//!
//! This crate defines:
//! - Shared domain models (places, unit systems, weather payloads)
//! - Abstraction over weather providers
//! - The weather card markup and the UI resource that wraps it
//! - The view controller that ties selection, fetching and rendering together
//! - Configuration & credentials handling
//!
//! It is used by `weathercard-cli`, but can also be reused by other binaries or services.

pub mod card;
pub mod cities;
pub mod config;
pub mod model;
pub mod provider;
pub mod resource;
pub mod view;
pub mod viewer;

pub use config::{Config, ProviderConfig};
pub use model::{Condition, Place, UnitSystem, WeatherPayload};
pub use provider::{ProviderId, WeatherFetcher};
pub use resource::{UiResource, WEATHER_CARD_URI};
pub use view::{Phase, ViewState, WeatherView};
pub use viewer::ResourceViewer;
