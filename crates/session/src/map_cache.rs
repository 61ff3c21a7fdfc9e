use crate::state::{SessionState, ViewStage};
use serde::Serialize;
use std::collections::HashMap;

/// Structured cache key for rendered map artifacts.
///
/// One distinct key per (mode, selection) combination. Comparison partner
/// lists are sorted on construction so the same partner set always hashes to
/// the same key regardless of discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapKey {
    /// City-wide base map.
    SeoulTotal,

    /// Ranking map, optionally highlighting a quintile and a comparison
    /// partner set.
    Ranking {
        quintile: Option<u8>,
        comparison: Vec<String>,
    },

    /// Zoomed single-district map.
    DistrictZoom {
        district: String,
        comparison: Vec<String>,
    },
}

impl MapKey {
    pub fn ranking(quintile: Option<u8>, comparison: &[String]) -> Self {
        MapKey::Ranking {
            quintile,
            comparison: sorted(comparison),
        }
    }

    pub fn district_zoom(district: &str, comparison: &[String]) -> Self {
        MapKey::DistrictZoom {
            district: district.to_string(),
            comparison: sorted(comparison),
        }
    }

    /// The key the current session state renders under: a selected district
    /// wins (zoom map), then the ranking stage, then the city-wide base map.
    pub fn for_state(state: &SessionState) -> Self {
        if let Some(district) = state.selected_district() {
            MapKey::district_zoom(district, state.comparison_districts())
        } else if state.stage() == ViewStage::Ranking {
            MapKey::ranking(state.selected_quintile(), state.comparison_districts())
        } else {
            MapKey::SeoulTotal
        }
    }
}

fn sorted(names: &[String]) -> Vec<String> {
    let mut names = names.to_vec();
    names.sort();
    names
}

/// Session-scoped memo of rendered map artifacts.
///
/// At most one entry per key; nothing expires. Staleness is the caller's
/// concern: clear a key (or the comparison-dependent keys) before
/// recomputing. Single-threaded by the host model, so no interior locking.
#[derive(Debug)]
pub struct MapCache<A> {
    entries: HashMap<MapKey, A>,
}

impl<A> Default for MapCache<A> {
    fn default() -> Self {
        MapCache {
            entries: HashMap::new(),
        }
    }
}

impl<A> MapCache<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cached(&self, key: &MapKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &MapKey) -> Option<&A> {
        self.entries.get(key)
    }

    /// Insert an artifact, returning the displaced one if the key was
    /// already populated.
    pub fn put(&mut self, key: MapKey, artifact: A) -> Option<A> {
        self.entries.insert(key, artifact)
    }

    /// Drop one entry. Returns whether anything was removed.
    pub fn clear(&mut self, key: &MapKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch the artifact for `key`, rendering it on first access. The
    /// closure runs at most once per distinct key per cache lifetime.
    pub fn render_with<F>(&mut self, key: MapKey, render: F) -> &A
    where
        F: FnOnce() -> A,
    {
        self.entries.entry(key).or_insert_with(|| {
            log::debug!("rendering map artifact for uncached key");
            render()
        })
    }

    /// Drop every entry whose key embeds a comparison partner set for the
    /// given district (and the ranking keys carrying partner sets). Called
    /// after a comparison-mode change makes those artifacts stale.
    pub fn invalidate_comparison_keys(&mut self, district: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| match key {
            MapKey::SeoulTotal => true,
            MapKey::Ranking { comparison, .. } => comparison.is_empty(),
            MapKey::DistrictZoom {
                district: d,
                comparison,
            } => comparison.is_empty() || d != district,
        });
        let dropped = before - self.entries.len();
        if dropped > 0 {
            log::info!("invalidated {dropped} comparison map entries for {district}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ComparisonMode;

    #[test]
    fn test_put_get_clear_round_trip() {
        let mut cache: MapCache<String> = MapCache::new();
        let key = MapKey::ranking(Some(2), &[]);

        assert!(!cache.is_cached(&key));
        assert_eq!(cache.put(key.clone(), "<html>A</html>".to_string()), None);
        assert_eq!(cache.get(&key).map(String::as_str), Some("<html>A</html>"));

        assert!(cache.clear(&key));
        assert!(!cache.is_cached(&key));
        assert!(!cache.clear(&key));
    }

    #[test]
    fn test_comparison_set_order_does_not_matter() {
        let a = MapKey::district_zoom("강남구", &["서초구".into(), "송파구".into()]);
        let b = MapKey::district_zoom("강남구", &["송파구".into(), "서초구".into()]);

        assert_eq!(a, b);
    }

    #[test]
    fn test_different_partner_sets_are_distinct_keys() {
        let base = MapKey::district_zoom("강남구", &[]);
        let with_partners = MapKey::district_zoom("강남구", &["서초구".into()]);

        assert_ne!(base, with_partners);
    }

    #[test]
    fn test_render_with_runs_once_per_key() {
        let mut cache: MapCache<String> = MapCache::new();
        let key = MapKey::SeoulTotal;
        let mut renders = 0;

        for _ in 0..3 {
            cache.render_with(key.clone(), || {
                renders += 1;
                "<html/>".to_string()
            });
        }

        assert_eq!(renders, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_for_state_prefers_district_zoom() {
        let mut state = SessionState::new();
        assert_eq!(MapKey::for_state(&state), MapKey::SeoulTotal);

        state.set_view_stage(ViewStage::Ranking);
        state.select_quintile(Some(1));
        assert_eq!(MapKey::for_state(&state), MapKey::ranking(Some(1), &[]));

        state.set_view_stage(ViewStage::DistrictSelected);
        state.select_district("강남구");
        state.set_comparison_mode(Some(ComparisonMode::Adjacent));
        state.set_comparison_districts(vec!["서초구".into()]);
        assert_eq!(
            MapKey::for_state(&state),
            MapKey::district_zoom("강남구", &["서초구".into()])
        );
    }

    #[test]
    fn test_invalidate_comparison_keys() {
        let mut cache: MapCache<&'static str> = MapCache::new();
        cache.put(MapKey::SeoulTotal, "total");
        cache.put(MapKey::ranking(Some(1), &[]), "ranking_plain");
        cache.put(MapKey::ranking(Some(1), &["서초구".into()]), "ranking_cmp");
        cache.put(MapKey::district_zoom("강남구", &[]), "zoom_plain");
        cache.put(
            MapKey::district_zoom("강남구", &["서초구".into()]),
            "zoom_cmp",
        );
        cache.put(
            MapKey::district_zoom("마포구", &["은평구".into()]),
            "other_district",
        );

        cache.invalidate_comparison_keys("강남구");

        assert!(cache.is_cached(&MapKey::SeoulTotal));
        assert!(cache.is_cached(&MapKey::ranking(Some(1), &[])));
        assert!(!cache.is_cached(&MapKey::ranking(Some(1), &["서초구".into()])));
        assert!(cache.is_cached(&MapKey::district_zoom("강남구", &[])));
        assert!(!cache.is_cached(&MapKey::district_zoom("강남구", &["서초구".into()])));
        assert!(cache.is_cached(&MapKey::district_zoom("마포구", &["은평구".into()])));
    }
}
