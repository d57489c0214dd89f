//! Read/write model artifact JSON files.
//!
//! The artifact is the "portable" representation of a fitted model:
//! - the coefficient per design column
//! - the expected column order (intercept included)
//!
//! That is everything `predict` needs, so a loaded artifact restores
//! predictive capability without retraining. Format stability across
//! versions is not guaranteed.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::FittedCoefficients;

/// On-disk schema of the model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub target: String,
    /// Design-column order used at fit time.
    pub columns: Vec<String>,
    pub coefficients: BTreeMap<String, f64>,
}

/// Write a model artifact JSON file.
pub fn write_model_json(path: &Path, fitted: &FittedCoefficients) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!(
                    "Failed to create artifact directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create model artifact '{}': {e}",
            path.display()
        ))
    })?;

    let artifact = ModelFile {
        tool: "ti".to_string(),
        target: fitted.target.clone(),
        columns: fitted.columns.clone(),
        coefficients: fitted
            .columns
            .iter()
            .cloned()
            .zip(fitted.weights.iter().copied())
            .collect(),
    };

    serde_json::to_writer_pretty(file, &artifact)
        .map_err(|e| AppError::config(format!("Failed to write model artifact: {e}")))?;

    Ok(())
}

/// Read a model artifact JSON file back into fitted coefficients.
pub fn read_model_json(path: &Path) -> Result<FittedCoefficients, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!(
            "Failed to open model artifact '{}': {e}",
            path.display()
        ))
    })?;
    let artifact: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::config(format!("Invalid model artifact: {e}")))?;

    let mut weights = Vec::with_capacity(artifact.columns.len());
    for column in &artifact.columns {
        let w = artifact.coefficients.get(column).ok_or_else(|| {
            AppError::config(format!(
                "Model artifact is missing a coefficient for column '{column}'."
            ))
        })?;
        weights.push(*w);
    }

    Ok(FittedCoefficients {
        target: artifact.target,
        columns: artifact.columns,
        weights,
    })
}
