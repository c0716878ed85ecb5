use crate::data_fetcher::api::Sleeper;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sleeper that returns immediately and remembers every requested wait.
///
/// Clones share the same record, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits requested so far, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .map(|sleeps| sleeps.clone())
            .unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        std::future::ready(())
    }
}

/// Test utilities for creating match API payloads
pub struct TestDataBuilder;

impl TestDataBuilder {
    /// Club payload as the match API sends it
    pub fn club(id: i64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "acronym": null,
            "short_name": name,
            "logo_url": format!("https://example.com/logos/{id}.png")
        })
    }

    /// League entry wrapping a team with the given clubs
    pub fn entry(team_id: i64, team_name: &str, clubs: Vec<Value>) -> Value {
        json!({
            "team": {
                "id": team_id,
                "name": team_name,
                "clubs": clubs
            }
        })
    }

    /// A match between two league entries
    pub fn game(league_id: i64, league_name: &str, home: Value, away: Value) -> Value {
        json!({
            "id": league_id * 1000,
            "league": {"id": league_id, "name": league_name},
            "home_league_entry": home,
            "away_league_entry": away
        })
    }

    /// Response body for a list of matches
    pub fn body(matches: Vec<Value>) -> String {
        Value::Array(matches).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_sleeper_shares_record() {
        let sleeper = RecordingSleeper::new();
        let handle = sleeper.clone();
        sleeper.sleep(Duration::from_secs(2)).await;
        sleeper.sleep(Duration::from_secs(3)).await;
        assert_eq!(
            handle.recorded(),
            vec![Duration::from_secs(2), Duration::from_secs(3)]
        );
    }

    #[test]
    fn test_game_builder_shape() {
        let game = TestDataBuilder::game(
            5,
            "U18",
            TestDataBuilder::entry(100, "Tigers", vec![TestDataBuilder::club(9, "Club Nine")]),
            TestDataBuilder::entry(200, "Bears", vec![]),
        );
        assert_eq!(game["league"]["id"], json!(5));
        assert_eq!(game["home_league_entry"]["team"]["clubs"][0]["id"], json!(9));
        assert!(TestDataBuilder::body(vec![game]).starts_with('['));
    }
}
