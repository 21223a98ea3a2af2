// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Snapshot of a listing as the wizard sees it.
//!
//! The persistence layer owns the listing; the wizard only reads a copy.
//! Every field is optional because a draft fills up one step at a time.
//! A field holding a value of the wrong shape reads as absent rather than
//! failing the whole draft.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Property type as sent by the listing API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    House,
    Apartment,
    Land,
    Commercial,
    /// Any value the wizard does not know about.
    #[serde(other)]
    Other,
}

/// Photo attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub url: String,
}

/// Partially filled listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    /// Listing id, used to detect that a different listing was loaded
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,

    // Location
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,

    // Photos
    #[serde(default, deserialize_with = "lenient_list")]
    pub photos: Vec<Photo>,

    // Characteristics
    #[serde(default, deserialize_with = "lenient")]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub bathrooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub land_surface: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub property_type: Option<PropertyType>,

    // Description
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    // Contact
    #[serde(default, deserialize_with = "lenient")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone: Option<String>,
}

impl PropertyDraft {
    /// Whether the draft describes a plot of land.
    pub fn is_land(&self) -> bool {
        self.property_type == Some(PropertyType::Land)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

/// Read an optional field, treating a mistyped value as missing.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Valid(value)) => Ok(Some(value)),
        Some(Lenient::Invalid(_)) | None => Ok(None),
    }
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    lenient(deserializer).map(Option::unwrap_or_default)
}

/// A coordinate counts as present only when it is a finite number.
pub(crate) fn has_coordinate(value: Option<f64>) -> bool {
    value.is_some_and(f64::is_finite)
}

/// Strictly positive, finite amount.
pub(crate) fn is_positive(value: Option<f64>) -> bool {
    value.is_some_and(|v| v.is_finite() && v > 0.0)
}

/// Present and not blank after trimming.
pub(crate) fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
