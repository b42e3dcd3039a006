//! Country records and the seed rows that produce them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A country, seeded from the static list bundled with the embedding
/// application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code, uppercase. Unique key.
    pub code: String,

    /// Canonical (English) name.
    pub name: String,

    /// Centroid latitude.
    pub lat: f64,

    /// Centroid longitude.
    pub lon: f64,

    /// Spoken language codes, most common first.
    pub languages: Vec<String>,

    /// Localized names keyed by language code.
    pub translations: HashMap<String, String>,
}

/// One row of the static country seed list, as supplied by the embedding
/// application. `languages` is the raw comma-separated form.
#[derive(Debug, Clone, Deserialize)]
pub struct CountrySeed {
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub languages: String,
    #[serde(default)]
    pub translations: HashMap<String, String>,
}

impl Country {
    /// Build a country from a seed row, normalizing and validating the code.
    /// Returns `None` when the code is not two ASCII letters.
    pub fn from_seed(seed: &CountrySeed) -> Option<Self> {
        let code = seed.code.trim().to_ascii_uppercase();
        if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return None;
        }

        let languages = seed
            .languages
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Some(Self {
            code,
            name: seed.name.clone(),
            lat: seed.lat,
            lon: seed.lon,
            languages,
            translations: seed.translations.clone(),
        })
    }
}
