use serde::{Deserialize, Serialize};

/// Tag written into `matches.source` for every row this pipeline touches.
pub const SOURCE_TAG: &str = "flashscore";

/// A competition row from the backing store that has at least one source URL
/// configured. Read-only from this pipeline's perspective.
#[derive(Debug, Clone)]
pub struct Competition {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub results_url: Option<String>,
    pub fixtures_url: Option<String>,
    pub standings_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    #[serde(rename = "FT")]
    Finished,
    #[serde(rename = "NS")]
    NotStarted,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Finished => "FT",
            MatchStatus::NotStarted => "NS",
        }
    }
}

/// One accepted match row as parsed off the page. The year (and with it the
/// full date) is unknown at parse time; `MatchRecord` carries the resolved
/// form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowItem {
    pub round: Option<u32>,
    pub month: String,
    pub day: u32,
    pub home: String,
    pub away: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: MatchStatus,
    pub kickoff_time: String,
}

/// A fully resolved match record, ready for the JSONL dump and the store.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub round: Option<u32>,
    pub month: String,
    pub day: u32,
    pub home: String,
    pub away: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: MatchStatus,
    pub kickoff_time: String,
    pub match_date: String,
    pub source_event_key: String,
}

impl MatchRecord {
    pub fn from_item(item: RowItem, match_date: String, source_event_key: String) -> Self {
        Self {
            round: item.round,
            month: item.month,
            day: item.day,
            home: item.home,
            away: item.away,
            home_score: item.home_score,
            away_score: item.away_score,
            status: item.status,
            kickoff_time: item.kickoff_time,
            match_date,
            source_event_key,
        }
    }
}
