use axum::extract::{Query, State};
use axum::Json;
use doctonote_core::types::NOT_AVAILABLE;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ProxyError;
use crate::places::doctor_query;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RatingQuery {
    doctor_name: Option<String>,
    address: Option<String>,
}

/// Body of a successful rating lookup. `rating` is `"x.y"` or `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub rating: String,
    pub reviews_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
}

fn required(value: Option<String>) -> Result<String, ProxyError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ProxyError::ParameterMissing)
}

pub(crate) async fn doctor_rating(
    State(state): State<AppState>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<RatingResponse>, ProxyError> {
    let name = required(query.doctor_name)?;
    let address = required(query.address)?;
    let api_key = state
        .config
        .api_key
        .as_deref()
        .ok_or(ProxyError::MissingApiKey)?;

    info!(doctor = %name, address = %address, "rating request");

    let search = state
        .places
        .text_search(&doctor_query(&name, &address), api_key)
        .await?;

    let Some(place) = search.results.first() else {
        info!(doctor = %name, "no places found");
        return Ok(Json(RatingResponse {
            rating: NOT_AVAILABLE.to_string(),
            reviews_count: 0,
        }));
    };

    let rating = place.rating.ok_or_else(|| ProxyError::Upstream {
        message: "first place has no rating".to_string(),
    })?;

    info!(doctor = %name, rating, "found rating");
    Ok(Json(RatingResponse {
        rating: format!("{:.1}", rating),
        reviews_count: place.user_ratings_total.unwrap_or(0),
    }))
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "DoctoNote rating proxy is alive".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_missing_and_empty() {
        assert!(matches!(required(None), Err(ProxyError::ParameterMissing)));
        assert!(matches!(
            required(Some(String::new())),
            Err(ProxyError::ParameterMissing)
        ));
        assert_eq!(required(Some("Dr. Martin".into())).unwrap(), "Dr. Martin");
    }
}
