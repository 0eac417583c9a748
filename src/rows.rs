use once_cell::sync::Lazy;
use regex::Regex;

use crate::records::{MatchStatus, RowItem};

/// Defensive cap against runaway pages.
pub const MAX_ROWS_PER_PAGE: usize = 800;

/// Section-header pseudo-rows the source page interleaves with real
/// matches. Exact matches on the extracted participant text.
const BAD_EXACT: &[&str] = &[
    "RUGBY UNION",
    "SOUTH AMERICA:",
    "SOUTH AMERICA",
    "ENGLAND:",
    "FRANCE:",
    "EUROPE:",
    "WORLD:",
    "ARGENTINA:",
    "USA:",
];

const BOILERPLATE: &[&str] = &["Advertisement", "We Care About Your Privacy"];

static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(\d{1,2})\b")
        .expect("month/day regex")
});

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})(?:\s?(AM|PM))?\b").expect("time regex"));

static ROUND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Round\s+(\d+)").expect("round regex"));

static SCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}$").expect("score regex"));

/// Attribute/text candidates captured for one participant element.
#[derive(Debug, Clone, Default)]
pub struct RawParticipant {
    pub title: Option<String>,
    pub aria_label: Option<String>,
    pub data_tooltip: Option<String>,
    pub text: String,
}

/// Everything the page driver pulls out of one `.event__match` row, before
/// any interpretation. Keeping this a dumb data bag lets the classifier run
/// without a live browser.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub home: Option<RawParticipant>,
    pub away: Option<RawParticipant>,
    pub text: String,
    pub home_score: Option<String>,
    pub away_score: Option<String>,
    /// Generic score-element texts, in DOM order, used as a positional
    /// fallback when the home/away-specific elements are absent.
    pub score_fallback: Vec<String>,
}

pub fn classify_rows(raw_rows: &[RawRow], status: MatchStatus) -> Vec<RowItem> {
    raw_rows
        .iter()
        .take(MAX_ROWS_PER_PAGE)
        .filter_map(|raw| classify_row(raw, status))
        .collect()
}

/// Decide whether a raw row is a real match and extract its fields.
/// Returns `None` for section headers, ads, rows without a date and
/// completed rows without plausible scores.
pub fn classify_row(raw: &RawRow, status: MatchStatus) -> Option<RowItem> {
    let home_loc = raw.home.as_ref()?;
    let away_loc = raw.away.as_ref()?;

    let home = best_text(home_loc);
    let away = best_text(away_loc);
    if is_bad_team(&home) || is_bad_team(&away) {
        return None;
    }

    let text = clean_text(&raw.text);
    if text.is_empty() || BOILERPLATE.iter().any(|b| text.contains(b)) {
        return None;
    }

    let caps = MONTH_DAY_RE.captures(&text)?;
    let month = caps[1].to_string();
    let day: u32 = caps[2].parse().ok()?;

    let kickoff_time = parse_kickoff_time_from_row_text(&text);

    let round = ROUND_RE
        .captures(&text)
        .and_then(|c| c[1].parse::<u32>().ok());

    let (home_score, away_score) = match status {
        MatchStatus::Finished => {
            let (hs, a_s) = locate_scores(raw)?;
            (Some(hs), Some(a_s))
        }
        MatchStatus::NotStarted => (None, None),
    };

    Some(RowItem {
        round,
        month,
        day,
        home,
        away,
        home_score,
        away_score,
        status,
        kickoff_time,
    })
}

/// Collapse all whitespace runs to single spaces and trim.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prefer the first attribute (title, aria-label, data-tooltip) whose
/// cleaned value is longer than 3 characters, falling back to rendered
/// text.
pub fn best_text(participant: &RawParticipant) -> String {
    for attr in [
        participant.title.as_deref(),
        participant.aria_label.as_deref(),
        participant.data_tooltip.as_deref(),
    ] {
        if let Some(raw) = attr {
            let value = clean_text(raw);
            if value.chars().count() > 3 {
                return value;
            }
        }
    }
    clean_text(&participant.text)
}

/// Reject section-header text masquerading as a team name.
pub fn is_bad_team(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    if BAD_EXACT.contains(&name) {
        return true;
    }
    let chars = name.chars().count();
    if is_all_uppercase(name) && chars <= 25 && (name.contains(':') || name.contains(' ')) {
        return true;
    }
    chars <= 3
}

/// `H:MM` / `HH:MM` with optional AM/PM, normalised to `HH:MM:SS`.
/// No parseable time yields the `00:00:00` time-unknown sentinel.
pub fn parse_kickoff_time_from_row_text(text: &str) -> String {
    let Some(caps) = TIME_RE.captures(text) else {
        return "00:00:00".to_string();
    };
    let mut hh: u32 = caps[1].parse().unwrap_or(0);
    let mm: u32 = caps[2].parse().unwrap_or(0);
    match caps.get(3).map(|m| m.as_str()) {
        Some("PM") if hh != 12 => hh += 12,
        Some("AM") if hh == 12 => hh = 0,
        _ => {}
    }
    format!("{hh:02}:{mm:02}:00")
}

fn locate_scores(raw: &RawRow) -> Option<(u32, u32)> {
    let (home_raw, away_raw) = match (raw.home_score.as_deref(), raw.away_score.as_deref()) {
        (Some(h), Some(a)) => (h, a),
        _ => {
            let h = raw.score_fallback.first()?.as_str();
            let a = raw.score_fallback.get(1)?.as_str();
            (h, a)
        }
    };
    let home = parse_score(home_raw)?;
    let away = parse_score(away_raw)?;
    Some((home, away))
}

fn parse_score(raw: &str) -> Option<u32> {
    let cleaned = clean_text(raw);
    if !SCORE_RE.is_match(&cleaned) {
        return None;
    }
    let value: u32 = cleaned.parse().ok()?;
    (value <= 120).then_some(value)
}

fn is_all_uppercase(s: &str) -> bool {
    let mut has_cased = false;
    for ch in s.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(text: &str) -> RawParticipant {
        RawParticipant {
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn finished_row(home: &str, away: &str, text: &str, hs: &str, a_s: &str) -> RawRow {
        RawRow {
            home: Some(participant(home)),
            away: Some(participant(away)),
            text: text.to_string(),
            home_score: Some(hs.to_string()),
            away_score: Some(a_s.to_string()),
            score_fallback: Vec::new(),
        }
    }

    #[test]
    fn kickoff_time_handles_meridiem() {
        assert_eq!(parse_kickoff_time_from_row_text("foo 3:45 PM bar"), "15:45:00");
        assert_eq!(parse_kickoff_time_from_row_text("foo 11:05 AM bar"), "11:05:00");
        assert_eq!(parse_kickoff_time_from_row_text("12:30 AM kickoff"), "00:30:00");
        assert_eq!(parse_kickoff_time_from_row_text("12:15 PM kickoff"), "12:15:00");
        assert_eq!(parse_kickoff_time_from_row_text("kickoff 20:05"), "20:05:00");
        assert_eq!(parse_kickoff_time_from_row_text("no time here"), "00:00:00");
    }

    #[test]
    fn bad_team_filter() {
        assert!(is_bad_team("SOUTH AMERICA:"));
        assert!(is_bad_team("FRANCE:"));
        assert!(is_bad_team("AB"));
        assert!(is_bad_team(""));
        assert!(is_bad_team("TOP 14 RUGBY"));
        assert!(!is_bad_team("Manchester United"));
        assert!(!is_bad_team("Toulouse"));
    }

    #[test]
    fn best_text_prefers_long_attributes() {
        let p = RawParticipant {
            title: Some("Stade Toulousain".to_string()),
            aria_label: None,
            data_tooltip: None,
            text: "Toulouse".to_string(),
        };
        assert_eq!(best_text(&p), "Stade Toulousain");

        let short_title = RawParticipant {
            title: Some("ST".to_string()),
            aria_label: Some("  Stade   Toulousain ".to_string()),
            data_tooltip: None,
            text: "Toulouse".to_string(),
        };
        assert_eq!(best_text(&short_title), "Stade Toulousain");

        assert_eq!(best_text(&participant("Toulouse")), "Toulouse");
    }

    #[test]
    fn rejects_header_and_short_rows() {
        let header = finished_row("SOUTH AMERICA:", "Boca Juniors", "Mar 15 3:00 PM", "1", "2");
        assert!(classify_row(&header, MatchStatus::Finished).is_none());

        let short = finished_row("AB", "Boca Juniors", "Mar 15 3:00 PM", "1", "2");
        assert!(classify_row(&short, MatchStatus::Finished).is_none());
    }

    #[test]
    fn rejects_rows_without_date_or_with_boilerplate() {
        let no_date = finished_row("River Plate", "Boca Juniors", "3:00 PM only", "1", "2");
        assert!(classify_row(&no_date, MatchStatus::Finished).is_none());

        let ad = finished_row(
            "River Plate",
            "Boca Juniors",
            "Advertisement Mar 15 3:00 PM",
            "1",
            "2",
        );
        assert!(classify_row(&ad, MatchStatus::Finished).is_none());
    }

    #[test]
    fn rejects_implausible_scores() {
        let big = finished_row("River Plate", "Boca Juniors", "Mar 15 3:00 PM", "121", "2");
        assert!(classify_row(&big, MatchStatus::Finished).is_none());

        let junk = finished_row("River Plate", "Boca Juniors", "Mar 15 3:00 PM", "x", "2");
        assert!(classify_row(&junk, MatchStatus::Finished).is_none());

        let ok = finished_row("River Plate", "Boca Juniors", "Mar 15 3:00 PM", "21", "17");
        let item = classify_row(&ok, MatchStatus::Finished).expect("row should classify");
        assert_eq!(item.home_score, Some(21));
        assert_eq!(item.away_score, Some(17));
    }

    #[test]
    fn score_fallback_is_positional() {
        let row = RawRow {
            home: Some(participant("River Plate")),
            away: Some(participant("Boca Juniors")),
            text: "Round 3 Mar 15 3:00 PM".to_string(),
            home_score: None,
            away_score: None,
            score_fallback: vec!["24".to_string(), "17".to_string()],
        };
        let item = classify_row(&row, MatchStatus::Finished).expect("row should classify");
        assert_eq!(item.home_score, Some(24));
        assert_eq!(item.away_score, Some(17));
        assert_eq!(item.round, Some(3));

        let missing = RawRow {
            score_fallback: vec!["24".to_string()],
            ..row
        };
        assert!(classify_row(&missing, MatchStatus::Finished).is_none());
    }

    #[test]
    fn fixtures_carry_no_scores() {
        let row = RawRow {
            home: Some(participant("River Plate")),
            away: Some(participant("Boca Juniors")),
            text: "Mar 22 8:05 PM".to_string(),
            ..Default::default()
        };
        let item = classify_row(&row, MatchStatus::NotStarted).expect("row should classify");
        assert_eq!(item.status, MatchStatus::NotStarted);
        assert_eq!(item.home_score, None);
        assert_eq!(item.away_score, None);
        assert_eq!(item.month, "Mar");
        assert_eq!(item.day, 22);
        assert_eq!(item.kickoff_time, "20:05:00");
    }

    #[test]
    fn row_cap_is_enforced() {
        let row = RawRow {
            home: Some(participant("River Plate")),
            away: Some(participant("Boca Juniors")),
            text: "Mar 22 8:05 PM".to_string(),
            ..Default::default()
        };
        let rows = vec![row; MAX_ROWS_PER_PAGE + 50];
        let items = classify_rows(&rows, MatchStatus::NotStarted);
        assert_eq!(items.len(), MAX_ROWS_PER_PAGE);
    }
}
