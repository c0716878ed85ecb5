//! Loading of the organization name → id mapping

use crate::data_fetcher::models::json_type_name;
use crate::error::AppError;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// A governing body whose id scopes the match query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub id: String,
}

impl Organization {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Reads the organizations file and returns the organizations in declaration order.
///
/// # Errors
/// Returns `AppError::Config` if the file is missing or unreadable, is not
/// valid JSON, is not an object, holds a non-scalar id, or is empty.
#[instrument]
pub async fn load_organizations(path: &Path) -> Result<Vec<Organization>, AppError> {
    if !path.exists() {
        return Err(AppError::config_error(format!(
            "Organizations file not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).await.map_err(|e| {
        AppError::config_error(format!(
            "Cannot read organizations file {}: {e}",
            path.display()
        ))
    })?;

    let organizations = parse_organizations(&content).map_err(|e| match e {
        AppError::Config(message) => {
            AppError::config_error(format!("{message} ({})", path.display()))
        }
        other => other,
    })?;
    debug!(
        "Loaded {} organizations from {}",
        organizations.len(),
        path.display()
    );
    Ok(organizations)
}

/// Parses a JSON object of `name: id` pairs.
///
/// Ids may be strings or numbers; numbers are kept in their JSON text form.
pub fn parse_organizations(content: &str) -> Result<Vec<Organization>, AppError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AppError::config_error(format!("Invalid JSON in organizations file: {e}")))?;

    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(AppError::config_error(format!(
                "Invalid organizations structure: expected an object, got {}",
                json_type_name(&other)
            )));
        }
    };

    let organizations = map
        .into_iter()
        .map(|(name, id)| match id {
            Value::String(id) => Ok(Organization::new(name, id)),
            Value::Number(id) => Ok(Organization::new(name, id.to_string())),
            other => Err(AppError::config_error(format!(
                "Invalid id for organization '{name}': expected string or number, got {}",
                json_type_name(&other)
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if organizations.is_empty() {
        return Err(AppError::config_error(
            "No organizations found in organizations file",
        ));
    }

    Ok(organizations)
}
