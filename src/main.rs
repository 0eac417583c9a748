use anyhow::Result;
use tracing::{error, info, warn};

use flashscore_sync::audit;
use flashscore_sync::browser::{self, PageDriver};
use flashscore_sync::records::MatchRecord;
use flashscore_sync::run_log;
use flashscore_sync::scrape;
use flashscore_sync::store::StoreClient;

fn main() -> Result<()> {
    let run_log_path = run_log::make_run_log_path()?;
    run_log::init(&run_log_path, run_log::ALSO_CONSOLE)?;
    info!("run log: {}", run_log_path.display());

    if let Err(err) = run() {
        error!("fatal: {err:?}");
        return Err(err);
    }
    Ok(())
}

fn run() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let store = StoreClient::from_env()?;
    let competitions = store.get_competitions_with_urls()?;
    info!("found competitions with urls: {}", competitions.len());

    let chrome = browser::launch()?;
    let driver = PageDriver::new(&chrome)?;

    for comp in &competitions {
        info!("=== {} ({}) ===", comp.name, comp.slug);

        let outcome = match scrape::scrape_competition(&driver, comp) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("scrape failed: {} -> {err:#}", comp.slug);
                continue;
            }
        };

        info!("season: {}", outcome.season_name);
        info!("parsed results: {}", outcome.results.len());
        if !outcome.results.is_empty() {
            info!("results preview: {:?}", preview(&outcome.results));
        }
        info!("parsed fixtures: {}", outcome.fixtures.len());
        if !outcome.fixtures.is_empty() {
            info!("fixtures preview: {:?}", preview(&outcome.fixtures));
        }

        let (jsonl_path, summary_path) = audit::make_log_paths(&comp.slug, &outcome.season_name)?;
        audit::write_jsonl(
            &jsonl_path,
            outcome.results.iter().chain(outcome.fixtures.iter()),
        )?;
        info!("wrote local dump: {}", jsonl_path.display());

        let season_id = store.get_or_create_season(comp.id, &outcome.season_name)?;

        let mut upsert_ok = 0usize;
        let mut upsert_fail = 0usize;

        if let Some(url) = comp.results_url.as_deref()
            && !outcome.results.is_empty()
        {
            let (ok, fail) = store.upsert_matches_bulk(season_id, &outcome.results, url);
            upsert_ok += ok;
            upsert_fail += fail;
        }

        if let Some(url) = comp.fixtures_url.as_deref()
            && !outcome.fixtures.is_empty()
        {
            let (ok, fail) = store.upsert_matches_bulk(season_id, &outcome.fixtures, url);
            upsert_ok += ok;
            upsert_fail += fail;
        }

        audit::write_summary(
            &summary_path,
            comp,
            &outcome.season_name,
            &outcome.results,
            &outcome.fixtures,
            upsert_ok,
            upsert_fail,
        )?;
        info!("wrote summary: {}", summary_path.display());
        info!("upsert done (ok={upsert_ok}, fail={upsert_fail})");
    }

    info!("done");
    Ok(())
}

fn preview(records: &[MatchRecord]) -> &[MatchRecord] {
    &records[..records.len().min(3)]
}
