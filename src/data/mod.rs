//! Data module - dataset loading and typed tables

mod loader;
mod tables;

pub use loader::{DatasetLoader, LoaderError};
pub use tables::{
    canonical_cluster_label, normalize_key, CityPoint, CityTable, Dataset, FeatureTable,
};
