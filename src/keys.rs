use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug regex"));

/// Lowercase, collapse every non-alphanumeric run to a single hyphen, trim
/// leading/trailing hyphens. Idempotent: slugifying a slug returns it
/// unchanged.
pub fn slugify(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    NON_ALNUM_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Deterministic idempotency key for a match. The store's conflict column
/// set is narrower (it omits kickoff time); this key is stored alongside as
/// the source-facing identity.
pub fn build_source_event_key(
    competition_slug: &str,
    season_name: &str,
    match_date: &str,
    kickoff_time: &str,
    home: &str,
    away: &str,
) -> String {
    slugify(&format!(
        "{competition_slug}|{season_name}|{match_date}|{kickoff_time}|{home}|{away}"
    ))
}

#[cfg(test)]
mod tests {
    use super::{build_source_event_key, slugify};

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("River Plate"), "river-plate");
        assert_eq!(slugify("  Stade Français  "), "stade-fran-ais");
        assert_eq!(slugify("A.S. Roma!!"), "a-s-roma");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn slugify_is_idempotent() {
        for raw in ["River Plate", "2024/2025", "Boca Juniors", "--x--"] {
            let once = slugify(raw);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn source_event_key_is_deterministic() {
        let a = build_source_event_key(
            "top-14",
            "2024/2025",
            "2025-03-15",
            "15:00:00",
            "River Plate",
            "Boca Juniors",
        );
        let b = build_source_event_key(
            "top-14",
            "2024/2025",
            "2025-03-15",
            "15:00:00",
            "River Plate",
            "Boca Juniors",
        );
        assert_eq!(a, b);
        assert_eq!(
            a,
            "top-14-2024-2025-2025-03-15-15-00-00-river-plate-boca-juniors"
        );
    }
}
