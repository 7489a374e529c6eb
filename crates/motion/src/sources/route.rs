//! Walking-direction API client for fetching routes between two points.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::model::GeoPoint;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Route service returned status {0}")]
    Status(String),
    #[error("No route found")]
    NoRoute,
    #[error("Malformed polyline point: {0}")]
    Polyline(String),
}

/// Looks up a walkable route between two points.
#[async_trait]
pub trait RouteLookup: Send + Sync {
    /// Returns the ordered route coordinates from `origin` to `destination`.
    async fn walking_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Vec<GeoPoint>, RouteError>;
}

/// Route lookup that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoute;

#[async_trait]
impl RouteLookup for NoRoute {
    async fn walking_route(
        &self,
        _origin: GeoPoint,
        _destination: GeoPoint,
    ) -> Result<Vec<GeoPoint>, RouteError> {
        Err(RouteError::NoRoute)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionResponse {
    status: String,
    #[serde(default)]
    route: Option<DirectionRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionRoute {
    #[serde(default)]
    paths: Vec<DirectionPath>,
}

#[derive(Debug, Deserialize)]
struct DirectionPath {
    #[serde(default)]
    steps: Vec<DirectionStep>,
}

#[derive(Debug, Deserialize)]
struct DirectionStep {
    polyline: String,
}

/// Client for a walking-direction HTTP API.
///
/// The service answers `GET endpoint?origin=lng,lat&destination=lng,lat&key=..`
/// with `status == "1"` on success and the route as `lng,lat;lng,lat` polylines.
pub struct WalkingRouteClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    cache_dir: Option<PathBuf>,
}

impl WalkingRouteClient {
    /// Creates a client for the given endpoint and API key.
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            key: key.into(),
            cache_dir: None,
        }
    }

    /// Uses a preconfigured HTTP client (timeouts, proxy).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Enables file-based caching of looked-up routes.
    ///
    /// Cached routes are stored as JSON files keyed by a hash of the query.
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&path).ok();
        self.cache_dir = Some(path);
        self
    }

    fn query_key(origin: GeoPoint, destination: GeoPoint) -> String {
        format!(
            "{},{}->{},{}",
            origin.lng, origin.lat, destination.lng, destination.lat
        )
    }

    /// Parses a direction response into route coordinates.
    fn parse_response(body: &str) -> Result<Vec<GeoPoint>, RouteError> {
        let parsed: DirectionResponse = serde_json::from_str(body)?;
        if parsed.status != "1" {
            return Err(RouteError::Status(parsed.status));
        }

        let path = parsed
            .route
            .and_then(|r| r.paths.into_iter().next())
            .ok_or(RouteError::NoRoute)?;

        let mut coords = Vec::new();
        for step in &path.steps {
            for pair in step.polyline.split(';').filter(|s| !s.is_empty()) {
                coords.push(parse_pair(pair)?);
            }
        }

        if coords.len() < 2 {
            return Err(RouteError::NoRoute);
        }
        Ok(coords)
    }

    fn check_cache(&self, key: &str) -> Result<Option<Vec<GeoPoint>>, RouteError> {
        let Some(ref cache_dir) = self.cache_dir else {
            return Ok(None);
        };

        let hash = hash_query(key);
        let cache_path = cache_dir.join(format!("{hash}.json"));

        if cache_path.exists() {
            let data = std::fs::read_to_string(&cache_path)?;
            let route: Vec<GeoPoint> = serde_json::from_str(&data)?;
            tracing::debug!("Route cache hit for query hash {hash}");
            return Ok(Some(route));
        }

        Ok(None)
    }

    fn save_cache(&self, key: &str, route: &[GeoPoint]) -> Result<(), RouteError> {
        let Some(ref cache_dir) = self.cache_dir else {
            return Ok(());
        };

        let hash = hash_query(key);
        let cache_path = cache_dir.join(format!("{hash}.json"));
        std::fs::write(cache_path, serde_json::to_string(route)?)?;
        tracing::debug!("Cached route for query hash {hash}");

        Ok(())
    }
}

#[async_trait]
impl RouteLookup for WalkingRouteClient {
    async fn walking_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Vec<GeoPoint>, RouteError> {
        let key = Self::query_key(origin, destination);
        if let Some(cached) = self.check_cache(&key)? {
            return Ok(cached);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origin", format!("{},{}", origin.lng, origin.lat)),
                ("destination", format!("{},{}", destination.lng, destination.lat)),
                ("key", self.key.clone()),
                ("output", "json".to_string()),
            ])
            .send()
            .await?;

        let text = response.text().await?;
        let route = Self::parse_response(&text)?;

        self.save_cache(&key, &route)?;
        Ok(route)
    }
}

fn parse_pair(pair: &str) -> Result<GeoPoint, RouteError> {
    let (lng, lat) = pair
        .split_once(',')
        .ok_or_else(|| RouteError::Polyline(pair.to_string()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| RouteError::Polyline(pair.to_string()))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| RouteError::Polyline(pair.to_string()))?;
    Ok(GeoPoint::new(lng, lat))
}

/// Simple hash of a query string for the cache key.
fn hash_query(query: &str) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    query.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
