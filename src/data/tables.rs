//! Core Data Tables Module
//! Typed in-memory tables for the projection and feature datasets,
//! plus the join-key normalization both loaders share.

use std::collections::{BTreeSet, HashMap};

/// Normalize a join key: trim surrounding whitespace.
///
/// Applied identically to city names in the projection table, keys in the
/// feature table, and user selections, so the three always compare equal.
/// Idempotent by construction.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_string()
}

/// Canonical form of a cluster label.
///
/// Labels arrive as integers, floats ("1.0") or free text depending on how
/// the upstream export wrote the column. Integer-valued numbers render as
/// plain integers so "1", "1.0" and " 1 " all select the same cluster;
/// anything else is kept as trimmed text.
pub fn canonical_cluster_label(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n.to_string();
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            return (f as i64).to_string();
        }
    }
    trimmed.to_string()
}

/// Sort cluster labels into canonical presentation order.
///
/// Policy: numeric sort when every label parses as an integer (so "10" comes
/// after "2"), else plain lexicographic sort.
pub fn sort_cluster_labels(labels: &mut [String]) {
    let all_numeric = labels.iter().all(|l| l.parse::<i64>().is_ok());
    if all_numeric {
        labels.sort_by_key(|l| l.parse::<i64>().unwrap_or(i64::MAX));
    } else {
        labels.sort();
    }
}

/// One row of the projection table.
#[derive(Debug, Clone, PartialEq)]
pub struct CityPoint {
    pub city: String,
    pub cluster: String,
    pub coord: [f64; 3],
}

/// The projection table: one point per city row.
///
/// City names are not guaranteed unique in the source data; membership
/// queries deduplicate, point iteration does not.
#[derive(Debug, Clone, Default)]
pub struct CityTable {
    points: Vec<CityPoint>,
}

impl CityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: CityPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[CityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unique cluster labels in canonical sort order.
    pub fn cluster_labels(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self.points.iter().map(|p| p.cluster.as_str()).collect();
        let mut labels: Vec<String> = unique.into_iter().map(String::from).collect();
        sort_cluster_labels(&mut labels);
        labels
    }

    /// Deduplicated member cities of a cluster, sorted by name.
    pub fn members_of(&self, cluster: &str) -> BTreeSet<String> {
        self.points
            .iter()
            .filter(|p| p.cluster == cluster)
            .map(|p| p.city.clone())
            .collect()
    }

    /// Unique city names, sorted.
    pub fn city_names(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self.points.iter().map(|p| p.city.as_str()).collect();
        unique.into_iter().map(String::from).collect()
    }

    /// Cluster label of the first row matching a city name.
    pub fn cluster_of(&self, city: &str) -> Option<&str> {
        self.points
            .iter()
            .find(|p| p.city == city)
            .map(|p| p.cluster.as_str())
    }
}

/// The feature table: a rectangular mapping from join key to feature vector.
///
/// Every row has exactly one value per feature name, in schema order.
/// Duplicate keys keep the first row seen.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    feature_names: Vec<String>,
    keys: Vec<String>,
    rows: HashMap<String, Vec<f64>>,
}

impl FeatureTable {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            feature_names,
            keys: Vec::new(),
            rows: HashMap::new(),
        }
    }

    /// Insert a row under an already-normalized key.
    ///
    /// Returns false (and leaves the table unchanged) when the key is a
    /// duplicate or the row length does not match the schema.
    pub fn insert(&mut self, key: String, values: Vec<f64>) -> bool {
        if values.len() != self.feature_names.len() || self.rows.contains_key(&key) {
            return false;
        }
        self.keys.push(key.clone());
        self.rows.insert(key, values);
        true
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Row keys in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.rows.get(key).map(|v| v.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Global maximum over every finite value in the table.
    pub fn global_max(&self) -> Option<f64> {
        self.rows
            .values()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

/// Immutable session context: the two loaded tables plus the facts derived
/// once per session.
///
/// The radial axis maximum comes from the full feature table so the chart
/// scale stays comparable as the selection changes.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub cities: CityTable,
    pub features: FeatureTable,
    cluster_labels: Vec<String>,
    radial_max: f64,
}

impl Dataset {
    pub fn new(cities: CityTable, features: FeatureTable) -> Self {
        let cluster_labels = cities.cluster_labels();
        let radial_max = features
            .global_max()
            .filter(|m| *m > 0.0)
            .unwrap_or(1.0);
        Self {
            cities,
            features,
            cluster_labels,
            radial_max,
        }
    }

    /// Canonical cluster label order, fixed at construction.
    pub fn cluster_labels(&self) -> &[String] {
        &self.cluster_labels
    }

    /// Radial axis maximum for the profile chart, fixed at construction.
    pub fn radial_max(&self) -> f64 {
        self.radial_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(city: &str, cluster: &str) -> CityPoint {
        CityPoint {
            city: city.to_string(),
            cluster: cluster.to_string(),
            coord: [0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_key("  Paris "), "Paris");
        assert_eq!(normalize_key("Lyon"), "Lyon");
    }

    #[test]
    fn canonical_label_collapses_numeric_forms() {
        assert_eq!(canonical_cluster_label("1"), "1");
        assert_eq!(canonical_cluster_label(" 1 "), "1");
        assert_eq!(canonical_cluster_label("1.0"), "1");
        assert_eq!(canonical_cluster_label("-3.0"), "-3");
        assert_eq!(canonical_cluster_label("north"), "north");
        assert_eq!(canonical_cluster_label("1.5"), "1.5");
    }

    #[test]
    fn all_integer_labels_sort_numerically() {
        let mut labels = vec!["10".to_string(), "2".to_string(), "1".to_string()];
        sort_cluster_labels(&mut labels);
        assert_eq!(labels, vec!["1", "2", "10"]);
    }

    #[test]
    fn mixed_labels_sort_lexicographically() {
        let mut labels = vec!["10".to_string(), "2".to_string(), "east".to_string()];
        sort_cluster_labels(&mut labels);
        assert_eq!(labels, vec!["10", "2", "east"]);
    }

    #[test]
    fn members_deduplicate_repeated_city_rows() {
        let mut cities = CityTable::new();
        cities.push(point("Paris", "1"));
        cities.push(point("Paris", "1"));
        cities.push(point("Lyon", "1"));
        let members = cities.members_of("1");
        assert_eq!(members.len(), 2);
        assert!(members.contains("Paris"));
    }

    #[test]
    fn duplicate_feature_keys_keep_first_row() {
        let mut features = FeatureTable::new(vec!["a".to_string(), "b".to_string()]);
        assert!(features.insert("Paris".to_string(), vec![0.2, 0.8]));
        assert!(!features.insert("Paris".to_string(), vec![0.9, 0.9]));
        assert_eq!(features.get("Paris"), Some([0.2, 0.8].as_slice()));
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn ragged_row_is_rejected() {
        let mut features = FeatureTable::new(vec!["a".to_string(), "b".to_string()]);
        assert!(!features.insert("Paris".to_string(), vec![0.2]));
        assert!(features.is_empty());
    }

    #[test]
    fn radial_max_is_the_global_table_maximum() {
        let mut features = FeatureTable::new(vec!["a".to_string(), "b".to_string()]);
        features.insert("Paris".to_string(), vec![0.2, 0.8]);
        features.insert("Berlin".to_string(), vec![0.4, 0.6]);
        let dataset = Dataset::new(CityTable::new(), features);
        assert_eq!(dataset.radial_max(), 0.8);
    }

    #[test]
    fn radial_max_falls_back_on_empty_table() {
        let features = FeatureTable::new(vec!["a".to_string()]);
        let dataset = Dataset::new(CityTable::new(), features);
        assert_eq!(dataset.radial_max(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in ".{0,40}") {
            let once = normalize_key(&raw);
            prop_assert_eq!(normalize_key(&once), once);
        }

        #[test]
        fn prop_canonical_label_is_idempotent(raw in ".{0,20}") {
            let once = canonical_cluster_label(&raw);
            prop_assert_eq!(canonical_cluster_label(&once), once);
        }
    }
}
