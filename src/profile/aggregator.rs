//! Profile Aggregator Module
//! Turns the current selection into the feature vector the radar chart
//! plots: a single city's row, or the elementwise mean over a cluster's
//! members that survive the join against the feature table.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::data::{normalize_key, CityTable, FeatureTable};

/// What the selection control selects.
///
/// Explicit configuration; never inferred from the shape of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Selection is a cluster label; the profile averages its members.
    ByCluster,
    /// Selection is a single city name; the profile is that city's row.
    ByCity,
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::ByCluster
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    /// The selected city has no row in the feature table. Recoverable: the
    /// caller renders a message in place of the chart.
    #[error("no feature profile found for '{key}'")]
    ProfileNotFound { key: String, available: Vec<String> },
    /// The selected cluster has no members with feature data after the join.
    /// Recoverable, and distinct from a missing single profile.
    #[error("cluster '{label}' has no members with feature data")]
    EmptyAggregate { label: String, members: Vec<String> },
}

/// A plottable feature profile, polygon-closed for polar rendering: the
/// first (label, value) pair is repeated at the end of both sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateProfile {
    pub selection: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub member_count: usize,
    /// Sorted, deduplicated city names that contributed to the values.
    pub members: Vec<String>,
}

impl AggregateProfile {
    /// Number of distinct radar axes (the closing duplicate excluded).
    pub fn axis_count(&self) -> usize {
        self.labels.len().saturating_sub(1)
    }
}

/// Membership summary for one cluster, used by the selection control and
/// post-load diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOverview {
    pub label: String,
    pub city_count: usize,
    /// Members that also have a feature row.
    pub matched_count: usize,
}

/// Compute the profile for the current selection.
pub fn aggregate(
    selection: &str,
    cities: &CityTable,
    features: &FeatureTable,
    mode: SelectionMode,
) -> Result<AggregateProfile, AggregateError> {
    match mode {
        SelectionMode::ByCluster => cluster_profile(selection, cities, features),
        SelectionMode::ByCity => city_profile(selection, features),
    }
}

/// Elementwise mean over the cluster's members present in the feature table.
///
/// Members missing from the feature table are silently dropped; a cluster
/// whose members all miss is an [`AggregateError::EmptyAggregate`], never a
/// lookup panic. A single surviving member yields its row unchanged.
fn cluster_profile(
    selection: &str,
    cities: &CityTable,
    features: &FeatureTable,
) -> Result<AggregateProfile, AggregateError> {
    let label = normalize_key(selection);
    let members = cities.members_of(&label);

    let surviving: Vec<&String> = members
        .iter()
        .filter(|m| features.contains_key(m))
        .collect();
    if surviving.is_empty() {
        return Err(AggregateError::EmptyAggregate {
            label,
            members: members.into_iter().collect(),
        });
    }

    let mut sums = vec![0.0; features.feature_names().len()];
    for member in &surviving {
        // contains_key above guarantees the row exists
        if let Some(row) = features.get(member) {
            for (sum, v) in sums.iter_mut().zip(row) {
                *sum += v;
            }
        }
    }
    let n = surviving.len() as f64;
    let values: Vec<f64> = sums.into_iter().map(|s| s / n).collect();

    let member_count = surviving.len();
    let contributing: Vec<String> = surviving.into_iter().cloned().collect();
    Ok(close_polygon(AggregateProfile {
        selection: label,
        labels: features.feature_names().to_vec(),
        values,
        member_count,
        members: contributing,
    }))
}

/// Direct single-row lookup by normalized city name.
fn city_profile(
    selection: &str,
    features: &FeatureTable,
) -> Result<AggregateProfile, AggregateError> {
    let key = normalize_key(selection);
    let Some(row) = features.get(&key) else {
        return Err(AggregateError::ProfileNotFound {
            available: features.keys().iter().take(8).cloned().collect(),
            key,
        });
    };

    Ok(close_polygon(AggregateProfile {
        selection: key.clone(),
        labels: features.feature_names().to_vec(),
        values: row.to_vec(),
        member_count: 1,
        members: vec![key],
    }))
}

/// Append the first (label, value) pair again to close the radar polygon.
fn close_polygon(mut profile: AggregateProfile) -> AggregateProfile {
    if let (Some(label), Some(value)) = (
        profile.labels.first().cloned(),
        profile.values.first().copied(),
    ) {
        profile.labels.push(label);
        profile.values.push(value);
    }
    profile
}

/// Membership and join-match counts for every cluster, in canonical label
/// order. Fans out across clusters with rayon.
pub fn cluster_overview(cities: &CityTable, features: &FeatureTable) -> Vec<ClusterOverview> {
    cities
        .cluster_labels()
        .par_iter()
        .map(|label| {
            let members = cities.members_of(label);
            let matched_count = members.iter().filter(|m| features.contains_key(m)).count();
            ClusterOverview {
                label: label.clone(),
                city_count: members.len(),
                matched_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CityPoint;

    fn point(city: &str, cluster: &str) -> CityPoint {
        CityPoint {
            city: city.to_string(),
            cluster: cluster.to_string(),
            coord: [0.0, 0.0, 0.0],
        }
    }

    /// Dataset used across most tests: Paris and Lyon in cluster 1,
    /// Berlin in cluster 2, Lyon absent from the feature table.
    fn example() -> (CityTable, FeatureTable) {
        let mut cities = CityTable::new();
        cities.push(point("Paris", "1"));
        cities.push(point("Lyon", "1"));
        cities.push(point("Berlin", "2"));

        let mut features = FeatureTable::new(vec!["a".to_string(), "b".to_string()]);
        features.insert("Paris".to_string(), vec![0.2, 0.8]);
        features.insert("Berlin".to_string(), vec![0.4, 0.6]);
        (cities, features)
    }

    #[test]
    fn by_city_returns_the_row_polygon_closed() {
        let (cities, features) = example();
        let profile = aggregate("Paris", &cities, &features, SelectionMode::ByCity).unwrap();

        assert_eq!(profile.labels, ["a", "b", "a"]);
        assert_eq!(profile.values, [0.2, 0.8, 0.2]);
        assert_eq!(profile.member_count, 1);
        assert_eq!(profile.axis_count(), 2);
    }

    #[test]
    fn by_city_normalizes_the_selection() {
        let (cities, features) = example();
        let profile = aggregate("  Paris ", &cities, &features, SelectionMode::ByCity).unwrap();
        assert_eq!(profile.selection, "Paris");
    }

    #[test]
    fn unknown_city_reports_available_keys() {
        let (cities, features) = example();
        let err = aggregate("Madrid", &cities, &features, SelectionMode::ByCity).unwrap_err();
        match err {
            AggregateError::ProfileNotFound { key, available } => {
                assert_eq!(key, "Madrid");
                assert!(available.contains(&"Paris".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_members_are_silently_dropped() {
        let (cities, features) = example();
        // Lyon has no feature row, so cluster 1 degenerates to Paris alone.
        let profile = aggregate("1", &cities, &features, SelectionMode::ByCluster).unwrap();

        assert_eq!(profile.values, [0.2, 0.8, 0.2]);
        assert_eq!(profile.member_count, 1);
        assert_eq!(profile.members, ["Paris"]);
    }

    #[test]
    fn cluster_two_is_berlin_alone() {
        let (cities, features) = example();
        let profile = aggregate("2", &cities, &features, SelectionMode::ByCluster).unwrap();
        assert_eq!(profile.values, [0.4, 0.6, 0.4]);
        assert_eq!(profile.member_count, 1);
    }

    #[test]
    fn two_member_cluster_averages_elementwise() {
        let (mut cities, mut features) = example();
        cities.push(point("Munich", "2"));
        features.insert("Munich".to_string(), vec![0.8, 0.2]);

        let profile = aggregate("2", &cities, &features, SelectionMode::ByCluster).unwrap();
        assert_eq!(profile.member_count, 2);
        assert!((profile.values[0] - 0.6).abs() < 1e-12);
        assert!((profile.values[1] - 0.4).abs() < 1e-12);
        // Closing value mirrors the first axis.
        assert_eq!(profile.values[2], profile.values[0]);
    }

    #[test]
    fn fully_unmatched_cluster_is_empty_aggregate() {
        let (mut cities, features) = example();
        cities.push(point("Oslo", "3"));

        let err = aggregate("3", &cities, &features, SelectionMode::ByCluster).unwrap_err();
        match err {
            AggregateError::EmptyAggregate { label, members } => {
                assert_eq!(label, "3");
                assert_eq!(members, ["Oslo"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_cluster_is_empty_aggregate_not_a_panic() {
        let (cities, features) = example();
        let err = aggregate("99", &cities, &features, SelectionMode::ByCluster).unwrap_err();
        assert!(matches!(err, AggregateError::EmptyAggregate { .. }));
    }

    #[test]
    fn duplicate_city_rows_contribute_once() {
        let (mut cities, features) = example();
        cities.push(point("Paris", "1"));

        let profile = aggregate("1", &cities, &features, SelectionMode::ByCluster).unwrap();
        assert_eq!(profile.member_count, 1);
        assert_eq!(profile.values, [0.2, 0.8, 0.2]);
    }

    #[test]
    fn overview_counts_members_and_matches() {
        let (mut cities, features) = example();
        cities.push(point("Oslo", "3"));

        let overview = cluster_overview(&cities, &features);
        assert_eq!(overview.len(), 3);
        assert_eq!(overview[0].label, "1");
        assert_eq!(overview[0].city_count, 2);
        assert_eq!(overview[0].matched_count, 1);
        assert_eq!(overview[2].label, "3");
        assert_eq!(overview[2].matched_count, 0);
    }

    #[test]
    fn radial_scale_does_not_change_with_the_selection() {
        let (cities, features) = example();
        let dataset = crate::data::Dataset::new(cities, features);

        let before = dataset.radial_max();
        aggregate("1", &dataset.cities, &dataset.features, SelectionMode::ByCluster).unwrap();
        aggregate("2", &dataset.cities, &dataset.features, SelectionMode::ByCluster).unwrap();
        assert_eq!(dataset.radial_max(), before);
        // Cluster 2 peaks at 0.6 but the session scale stays at the table max.
        assert_eq!(before, 0.8);
    }

    #[test]
    fn numeric_selection_accepts_float_form() {
        let (cities, features) = example();
        // "1.0" normalizes to the same canonical label as "1".
        let profile = aggregate(
            &crate::data::canonical_cluster_label("1.0"),
            &cities,
            &features,
            SelectionMode::ByCluster,
        )
        .unwrap();
        assert_eq!(profile.selection, "1");
    }
}
