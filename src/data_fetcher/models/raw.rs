//! Defensively typed view of the match API response.
//!
//! Every nested object is optional and a malformed field degrades to `None`
//! instead of failing the surrounding record.

use super::structure::Club;
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatch {
    #[serde(default, deserialize_with = "lenient_object")]
    pub league: Option<RawLeague>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub home_league_entry: Option<RawLeagueEntry>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub away_league_entry: Option<RawLeagueEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLeague {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLeagueEntry {
    #[serde(default, deserialize_with = "lenient_object")]
    pub team: Option<RawTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeam {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Value,
    #[serde(default, deserialize_with = "lenient_clubs")]
    pub clubs: Vec<Club>,
}

impl RawMatch {
    /// Builds a match from one element of the response array.
    /// Anything that is not a JSON object is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// League id, if present and non-empty.
    pub fn league_id(&self) -> Option<&Value> {
        self.league.as_ref().and_then(|l| present_id(l.id.as_ref()))
    }
}

impl RawLeagueEntry {
    /// Team of this side, if it carries a usable id.
    pub fn team_with_id(&self) -> Option<(&Value, &RawTeam)> {
        let team = self.team.as_ref()?;
        present_id(team.id.as_ref()).map(|id| (id, team))
    }
}

/// Decodes a response body into match records.
///
/// # Errors
/// * `AppError::ApiMalformedJson` - the body is not JSON
/// * `AppError::ApiUnexpectedStructure` - the top level is not an array
pub fn decode_matches(body: &str, url: &str) -> Result<Vec<RawMatch>, AppError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| AppError::api_malformed_json(e.to_string(), url))?;

    match value {
        Value::Array(items) => Ok(items.into_iter().filter_map(RawMatch::from_value).collect()),
        other => Err(AppError::api_unexpected_structure(
            format!("expected a list of matches, got {}", json_type_name(&other)),
            url,
        )),
    }
}

/// Ids count as present unless they are null, false, zero or empty.
pub fn present_id(id: Option<&Value>) -> Option<&Value> {
    let id = id?;
    let empty = match id {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    };
    (!empty).then_some(id)
}

/// Key used for an id inside an object map: strings as-is, everything else in JSON form.
pub fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_clubs<'de, D>(deserializer: D) -> Result<Vec<Club>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
