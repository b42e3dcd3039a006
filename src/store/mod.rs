//! In-memory record store shared by ingestion, search and reverse lookup.

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;
use tracing::debug;

use crate::models::{AlternateName, Country, Place};

/// Per-collection record counts, refreshed by [`GeoStore::refresh_statistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub countries: usize,
    pub places: usize,
    pub alternate_names: usize,
}

/// Outcome of inserting a single alternate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltInsert {
    Inserted,
    /// The id was already present; insert-ignore.
    Duplicate,
    /// The referenced place is unknown; the row is dropped.
    Orphaned,
}

/// Per-batch alternate-name insertion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AltBatchOutcome {
    pub inserted: u64,
    pub duplicates: u64,
    pub orphaned: u64,
}

#[derive(Debug, Default)]
struct Inner {
    /// Keyed by uppercase alpha-2 code; iteration is code-ordered.
    countries: BTreeMap<String, Country>,
    /// Keyed by dump id; iteration is id-ordered.
    places: BTreeMap<i64, Place>,
    /// Resident id set so existence probes stay O(1) during the
    /// alternate-name pass.
    place_ids: HashSet<i64>,
    /// Variants per place, in insertion order.
    alternates: HashMap<i64, Vec<AlternateName>>,
    alternate_ids: HashSet<i64>,
}

/// Handle to the record store.
///
/// Cheap to share behind `Arc`. Readers take the shared lock and may be
/// unboundedly concurrent; the ingestion pipeline is the single writer and
/// completes before read traffic is considered ready.
#[derive(Debug, Default)]
pub struct GeoStore {
    inner: RwLock<Inner>,
    stats: RwLock<StoreStats>,
}

impl GeoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace a country, keyed by its code.
    pub fn upsert_country(&self, country: Country) {
        self.inner
            .write()
            .countries
            .insert(country.code.clone(), country);
    }

    /// Near-O(1) existence probe for a place id.
    pub fn place_exists(&self, id: i64) -> bool {
        self.inner.read().place_ids.contains(&id)
    }

    /// Insert a place unless its id is already present. Returns whether the
    /// row was inserted.
    pub fn insert_place_if_absent(&self, place: Place) -> bool {
        let mut inner = self.inner.write();
        Self::insert_place_locked(&mut inner, place)
    }

    /// Insert a batch of places under a single write lock. Returns
    /// `(inserted, ignored)` counts.
    pub fn insert_places(&self, batch: Vec<Place>) -> (u64, u64) {
        let mut inner = self.inner.write();
        let mut inserted = 0;
        let mut ignored = 0;
        for place in batch {
            if Self::insert_place_locked(&mut inner, place) {
                inserted += 1;
            } else {
                ignored += 1;
            }
        }
        (inserted, ignored)
    }

    fn insert_place_locked(inner: &mut Inner, place: Place) -> bool {
        if !inner.place_ids.insert(place.id) {
            return false;
        }
        inner.places.insert(place.id, place);
        true
    }

    /// Insert an alternate name unless its id is already present or its
    /// place reference is unknown.
    pub fn insert_alternate_if_absent(&self, alt: AlternateName) -> AltInsert {
        let mut inner = self.inner.write();
        Self::insert_alternate_locked(&mut inner, alt)
    }

    /// Insert a batch of alternate names under a single write lock.
    pub fn insert_alternates(&self, batch: Vec<AlternateName>) -> AltBatchOutcome {
        let mut inner = self.inner.write();
        let mut outcome = AltBatchOutcome::default();
        for alt in batch {
            match Self::insert_alternate_locked(&mut inner, alt) {
                AltInsert::Inserted => outcome.inserted += 1,
                AltInsert::Duplicate => outcome.duplicates += 1,
                AltInsert::Orphaned => outcome.orphaned += 1,
            }
        }
        outcome
    }

    fn insert_alternate_locked(inner: &mut Inner, alt: AlternateName) -> AltInsert {
        if !inner.place_ids.contains(&alt.place_id) {
            return AltInsert::Orphaned;
        }
        if !inner.alternate_ids.insert(alt.id) {
            return AltInsert::Duplicate;
        }
        inner.alternates.entry(alt.place_id).or_default().push(alt);
        AltInsert::Inserted
    }

    pub fn country_count(&self) -> usize {
        self.inner.read().countries.len()
    }

    pub fn place_count(&self) -> usize {
        self.inner.read().places.len()
    }

    pub fn alternate_count(&self) -> usize {
        self.inner.read().alternate_ids.len()
    }

    /// Post-load maintenance: compact over-allocated buffers and refresh the
    /// cached count snapshot. Harmless to call at any time.
    pub fn refresh_statistics(&self) -> StoreStats {
        let mut inner = self.inner.write();
        inner.place_ids.shrink_to_fit();
        inner.alternate_ids.shrink_to_fit();
        for variants in inner.alternates.values_mut() {
            variants.shrink_to_fit();
        }

        let stats = StoreStats {
            countries: inner.countries.len(),
            places: inner.places.len(),
            alternate_names: inner.alternate_ids.len(),
        };
        drop(inner);

        debug!(
            countries = stats.countries,
            places = stats.places,
            alternate_names = stats.alternate_names,
            "store statistics refreshed"
        );
        *self.stats.write() = stats;
        stats
    }

    /// Last snapshot taken by [`refresh_statistics`](Self::refresh_statistics).
    pub fn stats(&self) -> StoreStats {
        *self.stats.read()
    }

    /// Acquire a read view for iteration. Holds the shared lock until
    /// dropped.
    pub fn read(&self) -> StoreReader<'_> {
        StoreReader {
            guard: self.inner.read(),
        }
    }
}

/// Read view over the store, used by search and reverse lookup.
pub struct StoreReader<'a> {
    guard: RwLockReadGuard<'a, Inner>,
}

impl StoreReader<'_> {
    /// Places in ascending id order.
    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.guard.places.values()
    }

    /// Countries in ascending code order.
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.guard.countries.values()
    }

    pub fn country(&self, code: &str) -> Option<&Country> {
        self.guard.countries.get(code)
    }

    /// Name variants for a place, in insertion order.
    pub fn alternates_for(&self, place_id: i64) -> &[AlternateName] {
        self.guard
            .alternates
            .get(&place_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, CountrySeed, NameFlags};

    fn place(id: i64, name: &str) -> Place {
        Place {
            id,
            name: name.to_string(),
            ascii_name: name.to_string(),
            country_code: "GB".to_string(),
            admin_region: "ENG".to_string(),
            lat: 51.5,
            lon: -0.1,
            population: None,
            elevation: None,
            timezone: "Europe/London".to_string(),
            modified: None,
        }
    }

    fn alt(id: i64, place_id: i64, lang: &str, name: &str) -> AlternateName {
        AlternateName {
            id,
            place_id,
            lang: lang.to_string(),
            name: name.to_string(),
            flags: NameFlags::default(),
        }
    }

    #[test]
    fn place_insert_is_insert_ignore() {
        let store = GeoStore::new();
        assert!(store.insert_place_if_absent(place(1, "London")));
        assert!(!store.insert_place_if_absent(place(1, "Renamed")));
        assert_eq!(store.place_count(), 1);

        let reader = store.read();
        assert_eq!(reader.places().next().unwrap().name, "London");
    }

    #[test]
    fn place_exists_tracks_inserts() {
        let store = GeoStore::new();
        assert!(!store.place_exists(7));
        store.insert_place_if_absent(place(7, "Leeds"));
        assert!(store.place_exists(7));
    }

    #[test]
    fn orphaned_alternate_is_rejected() {
        let store = GeoStore::new();
        assert_eq!(
            store.insert_alternate_if_absent(alt(1, 99, "fr", "Londres")),
            AltInsert::Orphaned
        );
        assert_eq!(store.alternate_count(), 0);
    }

    #[test]
    fn duplicate_alternate_is_ignored() {
        let store = GeoStore::new();
        store.insert_place_if_absent(place(1, "London"));
        assert_eq!(
            store.insert_alternate_if_absent(alt(10, 1, "fr", "Londres")),
            AltInsert::Inserted
        );
        assert_eq!(
            store.insert_alternate_if_absent(alt(10, 1, "de", "London")),
            AltInsert::Duplicate
        );

        let reader = store.read();
        let variants = reader.alternates_for(1);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].lang, "fr");
    }

    #[test]
    fn country_upsert_replaces() {
        let store = GeoStore::new();
        let seed = CountrySeed {
            code: "FR".to_string(),
            name: "France".to_string(),
            lat: 46.0,
            lon: 2.0,
            languages: "fr".to_string(),
            translations: Default::default(),
        };
        store.upsert_country(Country::from_seed(&seed).unwrap());

        let renamed = CountrySeed {
            name: "République française".to_string(),
            ..seed
        };
        store.upsert_country(Country::from_seed(&renamed).unwrap());

        assert_eq!(store.country_count(), 1);
        let reader = store.read();
        assert_eq!(reader.country("FR").unwrap().name, "République française");
    }

    #[test]
    fn iteration_is_ordered() {
        let store = GeoStore::new();
        store.insert_place_if_absent(place(30, "C"));
        store.insert_place_if_absent(place(10, "A"));
        store.insert_place_if_absent(place(20, "B"));

        let reader = store.read();
        let ids: Vec<i64> = reader.places().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn statistics_snapshot() {
        let store = GeoStore::new();
        store.insert_place_if_absent(place(1, "London"));
        store.insert_alternate_if_absent(alt(1, 1, "fr", "Londres"));

        let stats = store.refresh_statistics();
        assert_eq!(
            stats,
            StoreStats {
                countries: 0,
                places: 1,
                alternate_names: 1
            }
        );
        assert_eq!(store.stats(), stats);
    }
}
