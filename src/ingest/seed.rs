//! Country seeding from the application-supplied static list.

use tracing::{info, warn};

use crate::models::{Country, CountrySeed};
use crate::store::GeoStore;

/// Upsert every seed row into the store. Runs on every pipeline start;
/// existing countries are fully replaced, so re-seeding is idempotent.
/// Returns the number of countries applied.
pub fn seed_countries(store: &GeoStore, seeds: &[CountrySeed]) -> usize {
    let mut applied = 0;
    for seed in seeds {
        match Country::from_seed(seed) {
            Some(country) => {
                store.upsert_country(country);
                applied += 1;
            }
            None => warn!(code = %seed.code, "skipping seed row with invalid country code"),
        }
    }
    info!("seeded {applied} countries");
    applied
}
