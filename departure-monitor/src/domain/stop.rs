//! Locations returned by the stop finder.
//!
//! The stop finder returns stops, streets and points of interest mixed
//! together. Fields the provider omits are defaulted rather than rejected.

use serde::{Deserialize, Serialize};

/// Kind of location in a stop-finder result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnyType {
    Stop,
    Street,
    Poi,
    #[serde(other)]
    Other,
}

/// One stop-finder result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResult {
    /// Global stop id, e.g. `de:09162:6`.
    pub id: String,
    /// Display name.
    pub name: String,
    pub any_type: AnyType,
    #[serde(default)]
    pub stateless: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub quality: String,
    /// `"1"` on the provider's best match.
    #[serde(default)]
    pub best: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub main_loc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<LocationReference>,
}

impl LocationResult {
    /// Whether the provider flagged this as its best match.
    pub fn is_best(&self) -> bool {
        self.best == "1"
    }

    /// Whether this location is a transit stop.
    pub fn is_stop(&self) -> bool {
        self.any_type == AnyType::Stop
    }
}

/// Provider reference data attached to a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReference {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub gid: String,
    #[serde(default)]
    pub omc: String,
    #[serde(default, rename = "placeID")]
    pub place_id: String,
    #[serde(default)]
    pub place: String,
    /// Projected coordinates as `"x,y"`.
    #[serde(default)]
    pub coords: String,
}

/// A projected coordinate pair. The projection is the provider's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

impl LocationReference {
    /// Parse the `"x,y"` coordinate string.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let (x, y) = self.coords.split_once(',')?;
        Some(Coordinates {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
        })
    }
}

/// The first result flagged as best match.
pub fn best_stop(results: &[LocationResult]) -> Option<&LocationResult> {
    results.iter().find(|r| r.is_best())
}

/// Only the transit stops, in provider order.
pub fn transit_stops_only(results: Vec<LocationResult>) -> Vec<LocationResult> {
    results.into_iter().filter(LocationResult::is_stop).collect()
}

#[cfg(test)]
pub(crate) fn stop_fixture(id: &str, name: &str) -> LocationResult {
    LocationResult {
        id: id.to_string(),
        name: name.to_string(),
        any_type: AnyType::Stop,
        stateless: id.to_string(),
        usage: "sf".into(),
        kind: "any".into(),
        sort: String::new(),
        quality: String::new(),
        best: "0".into(),
        object: name.to_string(),
        main_loc: "München".into(),
        modes: None,
        postcode: None,
        street: None,
        reference: None,
    }
}
