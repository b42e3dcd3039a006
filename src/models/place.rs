//! Place and alternate-name records parsed from the bulk dumps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A city-level geographic entity from the places dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    /// Stable dump identifier. Immutable once inserted.
    pub id: i64,

    /// Canonical name.
    pub name: String,

    /// ASCII/romanized form of the name.
    pub ascii_name: String,

    /// ISO 3166-1 alpha-2 code, uppercase. Soft reference: a code without a
    /// seeded country never blocks insertion.
    pub country_code: String,

    /// First-level administrative division the place belongs to.
    pub admin_region: String,

    pub lat: f64,
    pub lon: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<i32>,

    pub timezone: String,

    /// Last modification date recorded in the dump.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<NaiveDate>,
}

/// Descriptive flags carried on an alternate-name row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameFlags {
    pub preferred: bool,
    pub short: bool,
    pub colloquial: bool,
    pub historic: bool,
}

/// A localized name variant for a place.
///
/// Rows referencing an unknown place id are never stored; the store enforces
/// this at insertion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternateName {
    /// Unique row identifier. Immutable once inserted.
    pub id: i64,

    /// The place this variant names.
    pub place_id: i64,

    /// Language code, at most 7 characters.
    pub lang: String,

    /// The localized name, at most 400 characters.
    pub name: String,

    pub flags: NameFlags,
}
