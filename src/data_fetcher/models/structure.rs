use super::ordered_map::OrderedMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Real-world club behind a team. All fields are passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Club {
    pub id: Value,
    pub name: Value,
    pub acronym: Value,
    pub short_name: Value,
    pub logo_url: Value,
}

/// Team as stored in the snapshot.
///
/// At most one of `club` / `clubs` is set: a single club is stored under
/// `club`, several under `clubs`, none leaves both out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Value,
    pub name: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club: Option<Club>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clubs: Option<Vec<Club>>,
}

impl Team {
    /// Builds a team from one occurrence. Identical club payloads are
    /// collapsed, keeping first-seen order.
    pub fn new(id: Value, name: Value, clubs: Vec<Club>) -> Self {
        let mut distinct: Vec<Club> = Vec::with_capacity(clubs.len());
        for club in clubs {
            if !distinct.contains(&club) {
                distinct.push(club);
            }
        }

        let (club, clubs) = match distinct.len() {
            0 => (None, None),
            1 => (distinct.pop(), None),
            _ => (None, Some(distinct)),
        };

        Self {
            id,
            name,
            club,
            clubs,
        }
    }

    /// Ordering key for the team list: numbers and numeric strings by value,
    /// anything else as 0. Compare with `f64::total_cmp`.
    pub fn sort_key(&self) -> f64 {
        let key = match &self.id {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        key.filter(|k| k.is_finite()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: Value,
    pub name: Value,
    pub teams: Vec<Team>,
}

/// Per-organization entry of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationEntry {
    pub id: String,
    pub leagues: OrderedMap<League>,
    /// Set when processing the organization failed unexpectedly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrganizationEntry {
    pub fn team_count(&self) -> usize {
        self.leagues.values().map(|l| l.teams.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: String,
    pub total_organizations: usize,
    pub successful_organizations: usize,
    pub failed_organizations: usize,
}

/// The yearly snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub year: i32,
    pub organizations: OrderedMap<OrganizationEntry>,
    pub metadata: Metadata,
}

impl Structure {
    pub fn new(year: i32, total_organizations: usize, generated_at: impl Into<String>) -> Self {
        Self {
            year,
            organizations: OrderedMap::new(),
            metadata: Metadata {
                generated_at: generated_at.into(),
                total_organizations,
                successful_organizations: 0,
                failed_organizations: 0,
            },
        }
    }

    /// Stores the entry and counts it: an organization succeeds iff it has leagues.
    pub fn record(&mut self, name: impl Into<String>, entry: OrganizationEntry) {
        if entry.leagues.is_empty() {
            self.metadata.failed_organizations += 1;
        } else {
            self.metadata.successful_organizations += 1;
        }
        self.organizations.insert(name, entry);
    }
}
