//! WeatherSource trait: the external current-weather provider.

use crate::error::FetchError;
use crate::observation::Observation;
use async_trait::async_trait;

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Provider name for logs (e.g. "openweathermap").
    fn name(&self) -> &str;

    /// Fetch the current conditions for one city.
    async fn fetch_city(&self, city: &str) -> Result<Observation, FetchError>;

    /// Fetch every city in order, one request at a time.
    ///
    /// Failures are logged and left out; the result holds only successes.
    async fn fetch_cities(&self, cities: &[String]) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(cities.len());
        for (idx, city) in cities.iter().enumerate() {
            tracing::debug!(city = %city, "Fetching {}/{}", idx + 1, cities.len());
            match self.fetch_city(city).await {
                Ok(obs) => observations.push(obs),
                Err(e) => tracing::warn!(city = %city, error = %e, "Weather fetch failed"),
            }
        }
        tracing::info!(
            requested = cities.len(),
            fetched = observations.len(),
            source = self.name(),
            "Weather fetch complete"
        );
        observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyEvenLength;

    #[async_trait]
    impl WeatherSource for OnlyEvenLength {
        fn name(&self) -> &str {
            "test"
        }

        async fn fetch_city(&self, city: &str) -> Result<Observation, FetchError> {
            if city.len() % 2 == 0 {
                Ok(Observation::for_city(city))
            } else {
                Err(FetchError::NotFound(city.into()))
            }
        }
    }

    #[tokio::test]
    async fn fetch_cities_keeps_only_successes_in_order() {
        let cities: Vec<String> = ["Rome", "Oslo", "Lima", "Paris", "Kyiv"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let observations = OnlyEvenLength.fetch_cities(&cities).await;
        let names: Vec<_> = observations
            .iter()
            .filter_map(|o| o.city_name.as_deref())
            .collect();
        assert_eq!(names, vec!["Rome", "Oslo", "Lima", "Kyiv"]);
    }
}
