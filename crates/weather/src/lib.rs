//! Live weather access for SkyWatch.
//!
//! [`OpenWeatherClient`] implements `skywatch_core::WeatherSource` against
//! the OpenWeatherMap current-weather endpoint. [`cities`] holds the
//! built-in collection catalog.

pub mod cities;
pub mod openweather;

pub use cities::default_cities;
pub use openweather::OpenWeatherClient;
