//! Rating payload types shared by the provider, the cache and the proxy.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Base URL for map searches used as link-out when no place is known.
pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

/// Base URL for direct place pages.
pub const MAPS_PLACE_URL: &str = "https://www.google.com/maps/place/?q=place_id:";

/// Wire value for a missing rating.
pub const NOT_AVAILABLE: &str = "N/A";

/// A doctor as extracted from a listing or profile page.
///
/// Both fields are free text. They may be empty but are always present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub address: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Rating value: a score, or `"N/A"` when none could be resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    NotAvailable,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Score(v) => write!(f, "{}", v),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Rating {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Score(v) => serializer.serialize_f64(*v),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    // The proxy sends one-decimal strings ("4.3"); older entries hold numbers.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        // Non-finite scores cannot be stored back as JSON numbers.
        match Raw::deserialize(deserializer)? {
            Raw::Number(v) if v.is_finite() => Ok(Self::Score(v)),
            Raw::Number(v) => Err(serde::de::Error::custom(format!("invalid rating: {}", v))),
            Raw::Text(s) if s == NOT_AVAILABLE => Ok(Self::NotAvailable),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Score)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid rating: {:?}", s))),
        }
    }
}

/// Resolved rating for one identity.
///
/// This is both the backend response shape and the cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResult {
    pub rating: Rating,

    #[serde(default)]
    pub reviews_count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
}

impl RatingResult {
    /// A result with a score and no link-out.
    pub fn scored(rating: f64, reviews_count: u64) -> Self {
        Self {
            rating: Rating::Score(rating),
            reviews_count,
            place_id: None,
            place_url: None,
            place_name: None,
        }
    }

    /// An `"N/A"` result with no link-out.
    pub fn not_available() -> Self {
        Self {
            rating: Rating::NotAvailable,
            reviews_count: 0,
            place_id: None,
            place_url: None,
            place_name: None,
        }
    }

    /// Fallback served when resolution fails: `"N/A"` plus a map search on the name.
    pub fn fallback(identity: &Identity) -> Self {
        Self {
            place_url: Some(maps_search_url(&identity.name)),
            ..Self::not_available()
        }
    }

    pub fn with_place_url(mut self, url: impl Into<String>) -> Self {
        self.place_url = Some(url.into());
        self
    }

    pub fn with_place_id(mut self, id: impl Into<String>) -> Self {
        self.place_id = Some(id.into());
        self
    }

    pub fn with_place_name(mut self, name: impl Into<String>) -> Self {
        self.place_name = Some(name.into());
        self
    }

    /// URL the badge should open, if any.
    ///
    /// Priority: place id, then explicit place URL, then a search on the place name.
    pub fn link_out(&self) -> Option<String> {
        if let Some(id) = &self.place_id {
            return Some(format!("{}{}", MAPS_PLACE_URL, id));
        }
        if let Some(url) = &self.place_url {
            return Some(url.clone());
        }
        self.place_name.as_deref().map(maps_search_url)
    }
}

/// Map search URL for a free-text query, percent-encoded.
pub fn maps_search_url(query: &str) -> String {
    format!("{}{}", MAPS_SEARCH_URL, urlencoding::encode(query))
}
