use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::keys::slugify;
use crate::records::{Competition, MatchRecord, SOURCE_TAG};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const MATCH_CONFLICT_KEY: &str = "season_id,match_date,home_team_id,away_team_id";

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// PostgREST-style client for the backing store. One instance per run,
/// service-role credential on every request.
pub struct StoreClient {
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct CompetitionRow {
    id: i64,
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    results_url: Option<String>,
    #[serde(default)]
    fixtures_url: Option<String>,
    #[serde(default)]
    standings_url: Option<String>,
}

impl CompetitionRow {
    fn into_competition(self) -> Option<Competition> {
        let slug = self.slug.filter(|s| !s.trim().is_empty())?;
        let results_url = self.results_url.filter(|s| !s.trim().is_empty());
        let fixtures_url = self.fixtures_url.filter(|s| !s.trim().is_empty());
        if results_url.is_none() && fixtures_url.is_none() {
            return None;
        }
        Some(Competition {
            id: self.id,
            name: self.name,
            slug,
            results_url,
            fixtures_url,
            standings_url: self.standings_url,
        })
    }
}

#[derive(Debug, Serialize)]
struct MatchUpsert<'a> {
    season_id: i64,
    round: Option<u32>,
    match_date: &'a str,
    kickoff_time: &'a str,
    status: &'a str,
    home_team_id: i64,
    away_team_id: i64,
    home_score: Option<u32>,
    away_score: Option<u32>,
    source: &'a str,
    source_event_key: &'a str,
    source_url: &'a str,
}

impl StoreClient {
    /// Both settings are required; a missing one is a fatal startup
    /// condition.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("SUPABASE_URL").context("SUPABASE_URL is not set")?;
        let service_key =
            env::var("SUPABASE_SERVICE_ROLE_KEY").context("SUPABASE_SERVICE_ROLE_KEY is not set")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }

    /// Competitions with a slug and at least one source URL, in store
    /// order. An empty list is valid.
    pub fn get_competitions_with_urls(&self) -> Result<Vec<Competition>> {
        let body = self.fetch(self.get("competitions")?.query(&[(
            "select",
            "id,name,slug,results_url,fixtures_url,standings_url",
        )]))?;
        parse_competitions_json(&body)
    }

    /// Look up a season by (competition, name), inserting it on first
    /// encounter.
    pub fn get_or_create_season(&self, competition_id: i64, season_name: &str) -> Result<i64> {
        let body = self.fetch(self.get("seasons")?.query(&[
            ("select", "id,name".to_string()),
            ("competition_id", format!("eq.{competition_id}")),
            ("name", format!("eq.{season_name}")),
            ("limit", "1".to_string()),
        ]))?;
        let rows: Vec<IdRow> = serde_json::from_str(body.trim()).context("invalid seasons json")?;
        if let Some(row) = rows.first() {
            return Ok(row.id);
        }

        let inserted = self.insert(
            "seasons",
            &json!({ "competition_id": competition_id, "name": season_name }),
        )?;
        inserted
            .first()
            .map(|row| row.id)
            .ok_or_else(|| anyhow!("season insert returned no row"))
    }

    /// Teams are keyed by slug; two names that slugify identically are the
    /// same team.
    pub fn get_or_create_team(&self, name: &str) -> Result<i64> {
        let team_slug = slugify(name);
        let body = self.fetch(self.get("teams")?.query(&[
            ("select", "id".to_string()),
            ("slug", format!("eq.{team_slug}")),
            ("limit", "1".to_string()),
        ]))?;
        let rows: Vec<IdRow> = serde_json::from_str(body.trim()).context("invalid teams json")?;
        if let Some(row) = rows.first() {
            return Ok(row.id);
        }

        let inserted = self.insert("teams", &json!({ "name": name, "slug": team_slug }))?;
        inserted
            .first()
            .map(|row| row.id)
            .ok_or_else(|| anyhow!("team insert returned no row"))
    }

    /// Upsert a batch of match records, resolving team rows per record.
    /// Per-record failures are logged and counted, never aborting the
    /// batch. Returns (ok, fail).
    pub fn upsert_matches_bulk(
        &self,
        season_id: i64,
        items: &[MatchRecord],
        source_url: &str,
    ) -> (usize, usize) {
        let mut ok = 0usize;
        let mut fail = 0usize;

        for item in items {
            match self.upsert_single_match(season_id, item, source_url) {
                Ok(()) => ok += 1,
                Err(err) => {
                    fail += 1;
                    warn!(
                        "upsert failed for {} {} vs {} -> {err:#}",
                        item.match_date, item.home, item.away
                    );
                }
            }
        }

        (ok, fail)
    }

    fn upsert_single_match(
        &self,
        season_id: i64,
        item: &MatchRecord,
        source_url: &str,
    ) -> Result<()> {
        let home_team_id = self.get_or_create_team(&item.home)?;
        let away_team_id = self.get_or_create_team(&item.away)?;

        let payload = MatchUpsert {
            season_id,
            round: item.round,
            match_date: &item.match_date,
            kickoff_time: &item.kickoff_time,
            status: item.status.as_str(),
            home_team_id,
            away_team_id,
            home_score: item.home_score,
            away_score: item.away_score,
            source: SOURCE_TAG,
            source_event_key: &item.source_event_key,
            source_url,
        };

        let request = self
            .post("matches")?
            .query(&[("on_conflict", MATCH_CONFLICT_KEY)])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&payload);
        self.fetch(request)?;
        Ok(())
    }

    fn insert(&self, table: &str, payload: &serde_json::Value) -> Result<Vec<IdRow>> {
        let body = self.fetch(
            self.post(table)?
                .header("Prefer", "return=representation")
                .json(payload),
        )?;
        serde_json::from_str(body.trim()).with_context(|| format!("invalid {table} insert json"))
    }

    fn get(&self, table: &str) -> Result<RequestBuilder> {
        Ok(self.with_auth(http_client()?.get(self.table_url(table))))
    }

    fn post(&self, table: &str) -> Result<RequestBuilder> {
        Ok(self.with_auth(http_client()?.post(self.table_url(table))))
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn fetch(&self, req: RequestBuilder) -> Result<String> {
        let resp = req.send().context("store request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading store body")?;
        if !status.is_success() {
            return Err(anyhow!("store {}: {}", status, body));
        }
        Ok(body)
    }
}

/// Parse the competitions payload and keep rows with a slug and at least
/// one of results/fixtures URL.
pub fn parse_competitions_json(raw: &str) -> Result<Vec<Competition>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let rows: Vec<CompetitionRow> =
        serde_json::from_str(trimmed).context("invalid competitions json")?;
    Ok(rows
        .into_iter()
        .filter_map(CompetitionRow::into_competition)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::parse_competitions_json;

    #[test]
    fn competitions_without_slug_or_urls_are_dropped() {
        let raw = r#"[
            {"id": 1, "name": "Top 14", "slug": "top-14",
             "results_url": "https://example.com/top-14/results/",
             "fixtures_url": "https://example.com/top-14/fixtures/",
             "standings_url": null},
            {"id": 2, "name": "No slug", "slug": "",
             "results_url": "https://example.com/r", "fixtures_url": null,
             "standings_url": null},
            {"id": 3, "name": "No urls", "slug": "no-urls",
             "results_url": null, "fixtures_url": null, "standings_url": null},
            {"id": 4, "name": "Fixtures only", "slug": "fixtures-only",
             "results_url": null,
             "fixtures_url": "https://example.com/f", "standings_url": null}
        ]"#;
        let comps = parse_competitions_json(raw).expect("fixture should parse");
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].slug, "top-14");
        assert_eq!(comps[1].slug, "fixtures-only");
        assert!(comps[1].results_url.is_none());
    }

    #[test]
    fn null_body_is_empty() {
        assert!(parse_competitions_json("null").expect("null should parse").is_empty());
        assert!(parse_competitions_json("  ").expect("blank should parse").is_empty());
    }
}
