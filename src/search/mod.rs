//! Tiered place and country search over the record store.

pub mod score;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::models::{AlternateName, Country, Place};
use crate::store::GeoStore;

/// Minimum accepted query length, in characters.
pub const MIN_QUERY_LEN: usize = 2;

const DEFAULT_LIMIT: usize = 20;
/// Autocomplete callers get a smaller default page, for as-you-type UIs.
const AUTOCOMPLETE_LIMIT: usize = 10;

/// What kind of entity a result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    City,
    Country,
}

/// Parameters for a forward search, already type-coerced by the API layer.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    /// Optional country filter; matched case-insensitively.
    pub country: Option<String>,
    /// Restrict results to one kind.
    pub kind: Option<ResultKind>,
    pub autocomplete: bool,
    /// Result cap; defaults depend on `autocomplete`.
    pub limit: Option<usize>,
}

/// One ranked hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,

    /// Place id; absent for countries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub name: String,
    pub score: f64,

    /// For cities the containing country, for countries their own code.
    pub country_code: String,

    /// First-level administrative division; cities only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_region: Option<String>,

    pub lat: f64,
    pub lon: f64,

    /// Localized names keyed by language code.
    pub translations: HashMap<String, String>,

    /// Spoken languages; countries only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

/// Ranked hits plus the returned count. An empty candidate set is a valid
/// zero-count response, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<SearchResult>,
}

/// Rank places and countries against `params.query`.
///
/// Candidates match by case-insensitive equality, substring containment or
/// trigram similarity on the primary name, ascii name (cities) or any
/// alternate-name variant; the first tier that matches decides the score.
pub fn search(store: &GeoStore, params: &SearchParams) -> Result<SearchResponse, ValidationError> {
    let query = params.query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN {
        return Err(ValidationError::QueryTooShort { min: MIN_QUERY_LEN });
    }

    let country_filter = params
        .country
        .as_deref()
        .map(|c| c.trim().to_ascii_uppercase());
    let limit = params.limit.unwrap_or(if params.autocomplete {
        AUTOCOMPLETE_LIMIT
    } else {
        DEFAULT_LIMIT
    });

    let reader = store.read();
    let mut results = Vec::new();

    if params.kind != Some(ResultKind::Country) {
        for place in reader.places() {
            if country_filter
                .as_deref()
                .is_some_and(|cc| place.country_code != cc)
            {
                continue;
            }
            let alternates = reader.alternates_for(place.id);
            let variants = alternates.iter().map(|a| a.name.as_str());
            if let Some(score) =
                score::score_names(&query, &place.name, Some(&place.ascii_name), variants)
            {
                results.push(city_result(place, alternates, score));
            }
        }
    }

    if params.kind != Some(ResultKind::City) {
        for country in reader.countries() {
            if country_filter.as_deref().is_some_and(|cc| country.code != cc) {
                continue;
            }
            // For countries the ascii name equals the primary name and the
            // variant set is the stored translations.
            let variants = country.translations.values().map(String::as_str);
            if let Some(score) = score::score_names(&query, &country.name, None, variants) {
                results.push(country_result(country, score));
            }
        }
    }

    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.name.cmp(&b.name))
    });
    results.truncate(limit);

    debug!(query = %params.query, hits = results.len(), "search complete");
    Ok(SearchResponse {
        count: results.len(),
        results,
    })
}

fn city_result(place: &Place, alternates: &[AlternateName], score: f64) -> SearchResult {
    // Later rows overwrite earlier ones per language; the canonical name
    // backfills "en" only when no English variant exists.
    let mut translations: HashMap<String, String> = HashMap::new();
    for alt in alternates {
        translations.insert(alt.lang.clone(), alt.name.clone());
    }
    translations
        .entry("en".to_string())
        .or_insert_with(|| place.name.clone());

    SearchResult {
        kind: ResultKind::City,
        id: Some(place.id),
        name: place.name.clone(),
        score,
        country_code: place.country_code.clone(),
        admin_region: Some(place.admin_region.clone()),
        lat: place.lat,
        lon: place.lon,
        translations,
        languages: Vec::new(),
    }
}

fn country_result(country: &Country, score: f64) -> SearchResult {
    SearchResult {
        kind: ResultKind::Country,
        id: None,
        name: country.name.clone(),
        score,
        country_code: country.code.clone(),
        admin_region: None,
        lat: country.lat,
        lon: country.lon,
        translations: country.translations.clone(),
        languages: country.languages.clone(),
    }
}
