//! Nominatim / OpenStreetMap place search client.
//!
//! The public instance allows at most **1 request per second**; searches
//! are user-driven so they stay well under that.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use crate::{GeocodeError, GeocodedPlace};

/// Searches for a free-form place name and returns the first match.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn search(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
    country_codes: Option<&str>,
) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let mut params = vec![("q", query), ("format", "json"), ("limit", "1")];
    if let Some(codes) = country_codes {
        params.push(("countrycodes", codes));
    }

    let resp = client.get(base_url).query(&params).send().await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let resp = resp.error_for_status()?;
    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a Nominatim JSON response, keeping only the first candidate.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = coordinate(first, "lat")?;
    let longitude = coordinate(first, "lon")?;
    let display_name = first["display_name"].as_str().map(String::from);

    Ok(Some(GeocodedPlace {
        latitude,
        longitude,
        display_name,
    }))
}

/// Nominatim returns coordinates as strings; plain numbers are accepted too.
fn coordinate(candidate: &serde_json::Value, field: &str) -> Result<f64, GeocodeError> {
    let value = &candidate[field];
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| value.as_f64())
        .ok_or_else(|| GeocodeError::Parse {
            message: format!("Missing {field} in Nominatim response"),
        })
}
