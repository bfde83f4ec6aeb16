//! Dataset Loader Module
//! Loads the projection and feature CSVs with Polars and builds the typed
//! session tables. Every error here is fatal to the session: the dashboard
//! renders nothing until both files load cleanly.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use super::tables::{
    canonical_cluster_label, normalize_key, CityPoint, CityTable, Dataset, FeatureTable,
};

/// Column holding the city name in the projection table.
pub const CITY_COL: &str = "City";
/// Column holding the cluster assignment in the projection table.
pub const CLUSTER_COL: &str = "Cluster label";
/// Number of projection coordinates per city.
const COORD_DIMS: usize = 3;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: PolarsError,
    },
    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: String, column: String },
    #[error("{path}: expected {expected} numeric coordinate columns, found {found}")]
    MissingCoordinates {
        path: String,
        expected: usize,
        found: usize,
    },
    #[error("{path}: non-numeric value in column '{column}' at row {row}")]
    NotRectangular {
        path: String,
        column: String,
        row: usize,
    },
    #[error("{path}: no data rows")]
    Empty { path: String },
}

/// Loads the two backing CSVs into an immutable [`Dataset`].
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load both tables and derive the session facts.
    ///
    /// The join key is normalized identically on both sides here; nothing
    /// downstream ever sees a raw key.
    pub fn load(projection_path: &Path, features_path: &Path) -> Result<Dataset, LoaderError> {
        let cities = Self::load_projection(projection_path)?;
        let features = Self::load_features(features_path)?;

        let city_names = cities.city_names();
        let matched = city_names
            .iter()
            .filter(|c| features.contains_key(c))
            .count();
        info!(
            cities = cities.len(),
            profiles = features.len(),
            matched,
            "dataset loaded"
        );
        if matched < city_names.len() {
            warn!(
                unmatched = city_names.len() - matched,
                "cities without a feature profile will be dropped from averages"
            );
        }

        Ok(Dataset::new(cities, features))
    }

    /// Read a CSV the way the rest of the app expects: inferred schema,
    /// malformed cells degraded to nulls rather than aborting the read.
    fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| LoaderError::Unreadable {
                path: path.display().to_string(),
                source,
            })
    }

    /// Load the projection table: `City`, `Cluster label`, and the first
    /// three numeric coordinate columns in schema order.
    fn load_projection(path: &Path) -> Result<CityTable, LoaderError> {
        let df = Self::read_csv(path)?;
        let path_str = path.display().to_string();

        let city_series = df.column(CITY_COL).map_err(|_| LoaderError::MissingColumn {
            path: path_str.clone(),
            column: CITY_COL.to_string(),
        })?;
        let cluster_series = df
            .column(CLUSTER_COL)
            .map_err(|_| LoaderError::MissingColumn {
                path: path_str.clone(),
                column: CLUSTER_COL.to_string(),
            })?;

        // Coordinate columns: numeric, not the cluster assignment.
        let coord_cols: Vec<&Column> = df
            .get_columns()
            .iter()
            .filter(|col| {
                col.name().as_str() != CLUSTER_COL
                    && matches!(
                        col.dtype(),
                        DataType::Float32
                            | DataType::Float64
                            | DataType::Int8
                            | DataType::Int16
                            | DataType::Int32
                            | DataType::Int64
                            | DataType::UInt8
                            | DataType::UInt16
                            | DataType::UInt32
                            | DataType::UInt64
                    )
            })
            .take(COORD_DIMS)
            .collect();
        if coord_cols.len() < COORD_DIMS {
            return Err(LoaderError::MissingCoordinates {
                path: path_str,
                expected: COORD_DIMS,
                found: coord_cols.len(),
            });
        }

        let mut coord_names = Vec::with_capacity(COORD_DIMS);
        let mut coord_cas = Vec::with_capacity(COORD_DIMS);
        for col in &coord_cols {
            coord_names.push(col.name().to_string());
            let cast = col
                .cast(&DataType::Float64)
                .map_err(|source| LoaderError::Unreadable {
                    path: path_str.clone(),
                    source,
                })?;
            coord_cas.push(cast);
        }

        let mut cities = CityTable::new();
        for i in 0..df.height() {
            let city_val = city_series
                .get(i)
                .map_err(|source| LoaderError::Unreadable {
                    path: path_str.clone(),
                    source,
                })?;
            let cluster_val = cluster_series
                .get(i)
                .map_err(|source| LoaderError::Unreadable {
                    path: path_str.clone(),
                    source,
                })?;
            if city_val.is_null() || cluster_val.is_null() {
                warn!(row = i, "skipping projection row with null city or cluster");
                continue;
            }

            let city = normalize_key(city_val.to_string().trim_matches('"'));
            let cluster = canonical_cluster_label(cluster_val.to_string().trim_matches('"'));

            let mut coord = [0.0; COORD_DIMS];
            for (d, cast) in coord_cas.iter().enumerate() {
                let ca = cast.f64().map_err(|source| LoaderError::Unreadable {
                    path: path_str.clone(),
                    source,
                })?;
                coord[d] = ca.get(i).ok_or_else(|| LoaderError::NotRectangular {
                    path: path_str.clone(),
                    column: coord_names[d].clone(),
                    row: i,
                })?;
            }

            cities.push(CityPoint {
                city,
                cluster,
                coord,
            });
        }

        if cities.is_empty() {
            return Err(LoaderError::Empty { path: path_str });
        }
        Ok(cities)
    }

    /// Load the feature table: first column is the join key, every other
    /// column is a feature. The table must be rectangular.
    fn load_features(path: &Path) -> Result<FeatureTable, LoaderError> {
        let df = Self::read_csv(path)?;
        let path_str = path.display().to_string();

        let columns = df.get_columns();
        let Some((key_col, feature_cols)) = columns.split_first() else {
            return Err(LoaderError::Empty { path: path_str });
        };
        if feature_cols.is_empty() {
            return Err(LoaderError::MissingColumn {
                path: path_str,
                column: "<feature columns>".to_string(),
            });
        }

        let feature_names: Vec<String> =
            feature_cols.iter().map(|c| c.name().to_string()).collect();

        let mut feature_cas = Vec::with_capacity(feature_cols.len());
        for col in feature_cols {
            let cast = col
                .cast(&DataType::Float64)
                .map_err(|source| LoaderError::Unreadable {
                    path: path_str.clone(),
                    source,
                })?;
            feature_cas.push(cast);
        }

        let mut features = FeatureTable::new(feature_names.clone());
        for i in 0..df.height() {
            let key_val = key_col.get(i).map_err(|source| LoaderError::Unreadable {
                path: path_str.clone(),
                source,
            })?;
            if key_val.is_null() {
                warn!(row = i, "skipping feature row with null key");
                continue;
            }
            let key = normalize_key(key_val.to_string().trim_matches('"'));

            let mut values = Vec::with_capacity(feature_cas.len());
            for (f, cast) in feature_cas.iter().enumerate() {
                let ca = cast.f64().map_err(|source| LoaderError::Unreadable {
                    path: path_str.clone(),
                    source,
                })?;
                let v = ca.get(i).ok_or_else(|| LoaderError::NotRectangular {
                    path: path_str.clone(),
                    column: feature_names[f].clone(),
                    row: i,
                })?;
                values.push(v);
            }

            if !features.insert(key.clone(), values) {
                warn!(key = %key, row = i, "duplicate feature key, keeping first row");
            }
        }

        if features.is_empty() {
            return Err(LoaderError::Empty { path: path_str });
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn loads_both_tables_and_normalizes_keys() {
        let dataset =
            DatasetLoader::load(&fixture("projection.csv"), &fixture("features.csv")).unwrap();

        assert_eq!(dataset.cities.len(), 3);
        // " Paris " in the file arrives trimmed.
        assert!(dataset.cities.city_names().contains(&"Paris".to_string()));
        assert_eq!(dataset.cluster_labels(), ["1", "2"]);
        assert_eq!(
            dataset.features.feature_names(),
            ["economy", "mobility", "environment"]
        );
        assert_eq!(dataset.radial_max(), 0.8);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err =
            DatasetLoader::load(&fixture("no_such.csv"), &fixture("features.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::Unreadable { .. }));
    }

    #[test]
    fn missing_cluster_column_is_reported() {
        let err = DatasetLoader::load(
            &fixture("projection_missing_cluster.csv"),
            &fixture("features.csv"),
        )
        .unwrap_err();
        match err {
            LoaderError::MissingColumn { column, .. } => assert_eq!(column, CLUSTER_COL),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_feature_table_is_not_rectangular() {
        let err = DatasetLoader::load(&fixture("projection.csv"), &fixture("features_ragged.csv"))
            .unwrap_err();
        match err {
            LoaderError::NotRectangular { column, row, .. } => {
                assert_eq!(column, "mobility");
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
