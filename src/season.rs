use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static SEASON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2})/(20\d{2})\b").expect("season regex"));

pub fn month_number(abbr: &str) -> Option<u32> {
    let n = match abbr {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(n)
}

/// Scan heading-like texts (in selector order) for a `YYYY/YYYY` season
/// label; the first match across all texts wins.
pub fn season_from_texts<S: AsRef<str>>(texts: &[S]) -> Option<String> {
    for text in texts {
        if let Some(caps) = SEASON_RE.captures(text.as_ref()) {
            return Some(format!("{}/{}", &caps[1], &caps[2]));
        }
    }
    None
}

/// July–June sporting season assumed: from July onwards the season is
/// `{year}/{year+1}`, before July it is `{year-1}/{year}`.
pub fn infer_season_fallback(now_utc: DateTime<Utc>) -> String {
    let y = now_utc.year();
    if now_utc.month() >= 7 {
        format!("{y}/{}", y + 1)
    } else {
        format!("{}/{y}", y - 1)
    }
}

/// Months July–December belong to the season's first year, January–June to
/// its second.
pub fn year_for_match(season_name: &str, month_abbr: &str) -> Result<i32> {
    let mnum = month_number(month_abbr)
        .ok_or_else(|| anyhow!("unknown month abbreviation {month_abbr:?}"))?;
    let (first, second) = season_name
        .split_once('/')
        .ok_or_else(|| anyhow!("season name {season_name:?} is not YYYY/YYYY"))?;
    let y1: i32 = first.trim().parse().context("season first year")?;
    let y2: i32 = second.trim().parse().context("season second year")?;
    Ok(if mnum >= 7 { y1 } else { y2 })
}

pub fn build_match_date(season_name: &str, month_abbr: &str, day: u32) -> Result<String> {
    let year = year_for_match(season_name, month_abbr)?;
    let month = month_number(month_abbr)
        .ok_or_else(|| anyhow!("unknown month abbreviation {month_abbr:?}"))?;
    Ok(format!("{year:04}-{month:02}-{day:02}"))
}
