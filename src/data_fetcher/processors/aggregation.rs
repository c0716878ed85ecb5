//! Folds a flat list of match records into leagues with deduplicated teams.
//!
//! Merging and ordering are separate steps: teams are collected by id while
//! the matches are walked (the last occurrence of an id wins, at the position
//! the id was first seen), and only the finished league sorts them.
//!
//! League and team ids share one keying rule ([`id_key`]), so `5` and `"5"`
//! name the same league and the same team.

use crate::data_fetcher::models::{
    League, OrderedMap, RawLeagueEntry, RawMatch, Team, id_key,
};
use serde_json::Value;

/// League under construction.
#[derive(Debug)]
struct LeagueBuilder {
    id: Value,
    name: Value,
    teams: OrderedMap<Team>,
}

impl LeagueBuilder {
    fn new(id: Value, name: Value) -> Self {
        Self {
            id,
            name,
            teams: OrderedMap::new(),
        }
    }

    /// Teams ascending by numeric id; ties (including every non-numeric id,
    /// which sorts as 0) keep first-seen order.
    fn finish(self) -> League {
        let mut teams: Vec<Team> = self.teams.into_iter().map(|(_, team)| team).collect();
        teams.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));
        League {
            id: self.id,
            name: self.name,
            teams,
        }
    }
}

/// Aggregates the matches of one organization into `league id → League`.
///
/// - matches without a league id are skipped
/// - the first name seen for a league is kept
/// - a team snapshot from a later match replaces the earlier one, whichever
///   side (home or away) it appears on
/// - leagues keep first-seen order, teams are sorted by id
pub fn aggregate_matches(matches: &[RawMatch]) -> OrderedMap<League> {
    let mut leagues: OrderedMap<LeagueBuilder> = OrderedMap::new();

    for raw in matches {
        let (Some(league), Some(league_id)) = (raw.league.as_ref(), raw.league_id()) else {
            continue;
        };

        let builder = leagues.get_or_insert_with(&id_key(league_id), || {
            LeagueBuilder::new(league_id.clone(), league.name.clone())
        });

        ingest_side(builder, raw.home_league_entry.as_ref());
        ingest_side(builder, raw.away_league_entry.as_ref());
    }

    leagues.map_values(LeagueBuilder::finish)
}

/// Writes the team of one match side into the league, replacing any
/// earlier snapshot of the same team id.
fn ingest_side(league: &mut LeagueBuilder, side: Option<&RawLeagueEntry>) {
    let Some((team_id, team)) = side.and_then(RawLeagueEntry::team_with_id) else {
        return;
    };

    let snapshot = Team::new(team_id.clone(), team.name.clone(), team.clubs.clone());
    league.teams.insert(id_key(team_id), snapshot);
}
