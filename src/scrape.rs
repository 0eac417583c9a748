use anyhow::Result;
use chrono::Utc;

use crate::browser::PageDriver;
use crate::keys::build_source_event_key;
use crate::records::{Competition, MatchRecord, MatchStatus, RowItem};
use crate::rows;
use crate::season;

/// Everything one competition yields: the resolved season label plus the
/// parsed results and fixtures, in page order.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub season_name: String,
    pub results: Vec<MatchRecord>,
    pub fixtures: Vec<MatchRecord>,
}

/// Scrape one competition: results page first, then fixtures, reusing the
/// season resolved on the first page as the fallback for the second.
pub fn scrape_competition(driver: &PageDriver, comp: &Competition) -> Result<ScrapeOutcome> {
    let mut season_name = season::infer_season_fallback(Utc::now());
    let mut results = Vec::new();
    let mut fixtures = Vec::new();

    if let Some(url) = comp.results_url.as_deref() {
        let parsed = scrape_page(driver, url, MatchStatus::Finished, &mut season_name)?;
        results = resolve_records(parsed, &comp.slug, &season_name)?;
    }

    if let Some(url) = comp.fixtures_url.as_deref() {
        let parsed = scrape_page(driver, url, MatchStatus::NotStarted, &mut season_name)?;
        fixtures = resolve_records(parsed, &comp.slug, &season_name)?;
    }

    Ok(ScrapeOutcome {
        season_name,
        results,
        fixtures,
    })
}

fn scrape_page(
    driver: &PageDriver,
    url: &str,
    status: MatchStatus,
    season_name: &mut String,
) -> Result<Vec<RowItem>> {
    driver.open(url)?;
    driver.accept_cookies_if_any();
    driver.wait_for_match_rows();
    driver.expand_all_events();

    if let Some(detected) = season::season_from_texts(&driver.heading_texts()) {
        *season_name = detected;
    }

    let raw_rows = driver.collect_raw_rows();
    Ok(rows::classify_rows(&raw_rows, status))
}

/// Resolve each parsed row's full date from the season label and attach
/// the source event key.
pub fn resolve_records(
    items: Vec<RowItem>,
    competition_slug: &str,
    season_name: &str,
) -> Result<Vec<MatchRecord>> {
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let match_date = season::build_match_date(season_name, &item.month, item.day)?;
        let source_event_key = build_source_event_key(
            competition_slug,
            season_name,
            &match_date,
            &item.kickoff_time,
            &item.home,
            &item.away,
        );
        records.push(MatchRecord::from_item(item, match_date, source_event_key));
    }
    Ok(records)
}
