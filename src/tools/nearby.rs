//! `get_nearby_places`: facilities around the user's current position.
//!
//! The position comes from the host (geolocation lives there); the lookup
//! itself is a single GET against a configured places endpoint.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{NearbyPlacesConfig, DEFAULT_SEARCH_RADIUS_M};

/// Coordinates reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Why the host could not provide a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other,
}

impl PositionError {
    /// Parse the host's error code (`permission_denied`, ...).
    pub fn from_code(code: &str) -> Self {
        match code {
            "permission_denied" => Self::PermissionDenied,
            "position_unavailable" => Self::PositionUnavailable,
            "timeout" => Self::Timeout,
            _ => Self::Other,
        }
    }

    /// Text handed back to the agent.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "位置情報の取得が拒否されました。ブラウザの設定で位置情報へのアクセスを許可してください。"
            }
            Self::PositionUnavailable => "位置情報が利用できません。",
            Self::Timeout => "位置情報の取得がタイムアウトしました。",
            Self::Other => "位置情報の取得中にエラーが発生しました。",
        }
    }
}

/// Places endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbyResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

const NO_FACILITIES: &str = "周辺に施設が見つかりませんでした。";

/// Render a response for the agent.
pub fn format_facilities(resp: &NearbyResponse, pos: &Position) -> String {
    if resp.status != "success" || resp.facilities.is_empty() {
        return NO_FACILITIES.to_string();
    }

    let list = resp
        .facilities
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n");
    let count = resp.count.unwrap_or(resp.facilities.len() as u64);

    format!(
        "現在地(緯度: {:.4}, 経度: {:.4})周辺の施設({}件):\n\n{}",
        pos.latitude, pos.longitude, count, list
    )
}

/// Radius in meters as a query value (`1000`, not `1000.0`).
fn radius_param(radius: f64) -> String {
    if radius.fract() == 0.0 {
        format!("{}", radius as i64)
    } else {
        radius.to_string()
    }
}

pub struct NearbyPlaces {
    api_url: Option<String>,
    api_key: Option<String>,
    default_radius: f64,
    client: reqwest::Client,
}

impl NearbyPlaces {
    pub fn new(config: &NearbyPlacesConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Same as [`NearbyPlaces::new`] with a caller-supplied HTTP client.
    pub fn with_client(config: &NearbyPlacesConfig, client: reqwest::Client) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            default_radius: config.default_radius.unwrap_or(DEFAULT_SEARCH_RADIUS_M),
            client,
        }
    }

    /// Run the tool. Every failure is turned into text for the agent.
    pub async fn run(&self, radius: Option<f64>, position: Result<Position, PositionError>) -> String {
        let pos = match position {
            Ok(p) => p,
            Err(e) => {
                debug!(?e, "No position for nearby-places lookup");
                return e.user_message().to_string();
            }
        };

        let radius = radius.unwrap_or(self.default_radius);
        match self.lookup(radius, &pos).await {
            Ok(resp) => format_facilities(&resp, &pos),
            Err(e) => {
                warn!("Nearby-places lookup failed: {:#}", e);
                format!("エラーが発生しました: {}", e)
            }
        }
    }

    async fn lookup(&self, radius: f64, pos: &Position) -> anyhow::Result<NearbyResponse> {
        let url = self
            .api_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("nearby-places API URL is not configured"))?;
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("nearby-places API key is not configured"))?;

        debug!(lat = pos.latitude, lon = pos.longitude, radius, "Querying nearby places");

        let resp = self
            .client
            .get(url)
            .query(&[
                ("key", key.to_string()),
                ("lat", pos.latitude.to_string()),
                ("lon", pos.longitude.to_string()),
                ("radius", radius_param(radius)),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!("API request failed: {}", resp.status().as_u16());
        }

        Ok(resp.json().await?)
    }
}
