//! Coronary heart disease risk from six clinical measurements.
//!
//! `fit` trains a pipeline (standard scaling and one-hot encoding followed by
//! a random forest) on a CSV and saves it as one artifact; `serve` loads that
//! artifact once and answers a patient form with a risk label and probability.

pub mod classifier;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod decision_tree;
pub mod error;
pub mod functions;
pub mod node;
pub mod pipeline;
pub mod preprocess;
pub mod random_forest;
pub mod record;
pub mod telemetry;
pub mod training_data;
pub mod web;

pub use error::{Error, Result};
pub use pipeline::{Pipeline, Prediction, RiskLabel};
pub use record::{FamilyHistory, LabeledRecord, PatientRecord};
