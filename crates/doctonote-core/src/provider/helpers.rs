//! Pure helpers: URL building and link-out synthesis (no HTTP).

use crate::types::{maps_search_url, Identity, RatingResult};

use super::RATING_ROUTE;

/// Backend URL for an identity: `{base}/api/doctor-rating?doctorName=..&address=..`.
pub fn rating_url(base_url: &str, identity: &Identity) -> String {
    format!(
        "{}{}?doctorName={}&address={}",
        base_url.trim_end_matches('/'),
        RATING_ROUTE,
        urlencoding::encode(&identity.name),
        urlencoding::encode(&identity.address)
    )
}

/// Give a successful result a link-out when the backend sent neither place id nor URL.
///
/// The synthesized link is a map search on `"<name> <address>"`.
pub fn ensure_link_out(mut result: RatingResult, identity: &Identity) -> RatingResult {
    if result.place_id.is_none() && result.place_url.is_none() {
        let query = format!("{} {}", identity.name, identity.address);
        result.place_url = Some(maps_search_url(&query));
    }
    result
}
