use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};

use crate::rows::{MAX_ROWS_PER_PAGE, RawParticipant, RawRow};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120 Safari/537.36";

const NAVIGATION_TIMEOUT_SECS: u64 = 60;
const MATCH_ROWS_TIMEOUT_SECS: u64 = 15;
const MATCH_ROWS_GRACE_MS: u64 = 2000;
const EXPAND_ITERATIONS: usize = 10;
const SCROLL_STEP_PX: u32 = 3000;
const SCROLL_PAUSE_MS: u64 = 400;
const SHOW_MORE_PAUSE_MS: u64 = 700;
const COOKIE_PAUSE_MS: u64 = 300;

const MATCH_ROW_SELECTOR: &str = ".event__match";

const COOKIE_BUTTON_TEXTS: &[&str] = &["I Accept", "Accept", "Accept all", "AGREE", "Agree"];
const SHOW_MORE_TEXTS: &[&str] = &["Show more matches", "Show more"];
const SHOW_MORE_TAGS: &[&str] = &["a", "button"];

const HEADING_SELECTORS: &[&str] = &[".heading__info", ".heading__name", "header", "body"];

pub fn launch() -> Result<Browser> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .window_size(Some((1280, 900)))
        .idle_browser_timeout(Duration::from_secs(600))
        .build()
        .map_err(|err| anyhow!("chrome launch options: {err}"))?;
    Browser::new(options).context("failed to launch chrome")
}

/// One reused browser tab driven through navigation, cookie dismissal,
/// lazy-load expansion and raw row capture. Optional UI interactions
/// (cookie banners, show-more buttons) swallow their failures; navigation
/// does not.
pub struct PageDriver {
    tab: Arc<Tab>,
}

impl PageDriver {
    pub fn new(browser: &Browser) -> Result<Self> {
        let tab = browser.new_tab().context("failed to open tab")?;
        tab.set_default_timeout(Duration::from_secs(NAVIGATION_TIMEOUT_SECS));
        tab.set_user_agent(USER_AGENT, None, None)
            .context("failed to set user agent")?;
        Ok(Self { tab })
    }

    /// Navigate and wait for the DOM to settle, bounded by the navigation
    /// timeout. Failure here aborts the current competition.
    pub fn open(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .with_context(|| format!("navigate to {url}"))?;
        self.tab
            .wait_until_navigated()
            .with_context(|| format!("navigation timed out for {url}"))?;
        Ok(())
    }

    /// Best-effort cookie-consent dismissal: first candidate button that
    /// clicks wins, absence of all candidates is the common case.
    pub fn accept_cookies_if_any(&self) {
        for text in COOKIE_BUTTON_TEXTS {
            let xpath = format!("//button[contains(., '{text}')]");
            let Ok(buttons) = self.tab.find_elements_by_xpath(&xpath) else {
                continue;
            };
            let Some(button) = buttons.first() else {
                continue;
            };
            if button.click().is_ok() {
                thread::sleep(Duration::from_millis(COOKIE_PAUSE_MS));
                return;
            }
        }
    }

    /// Wait for at least one match row, degrading to a short grace pause
    /// when the page structure has changed; never a hard failure.
    pub fn wait_for_match_rows(&self) {
        let found = self
            .tab
            .wait_for_element_with_custom_timeout(
                MATCH_ROW_SELECTOR,
                Duration::from_secs(MATCH_ROWS_TIMEOUT_SECS),
            )
            .is_ok();
        if !found {
            thread::sleep(Duration::from_millis(MATCH_ROWS_GRACE_MS));
        }
    }

    /// Scroll and click through "show more" controls to force lazy-loaded
    /// rows into the DOM. Every individual failure is swallowed.
    pub fn expand_all_events(&self) {
        for _ in 0..EXPAND_ITERATIONS {
            let _ = self
                .tab
                .evaluate(&format!("window.scrollBy(0, {SCROLL_STEP_PX})"), false);
            thread::sleep(Duration::from_millis(SCROLL_PAUSE_MS));

            for text in SHOW_MORE_TEXTS {
                for tag in SHOW_MORE_TAGS {
                    let xpath = format!("//{tag}[contains(., '{text}')]");
                    let Ok(controls) = self.tab.find_elements_by_xpath(&xpath) else {
                        continue;
                    };
                    let Some(control) = controls.first() else {
                        continue;
                    };
                    if control.click().is_ok() {
                        thread::sleep(Duration::from_millis(SHOW_MORE_PAUSE_MS));
                    }
                }
            }
        }
    }

    /// Texts of the heading-like elements the season resolver scans, in
    /// selector order.
    pub fn heading_texts(&self) -> Vec<String> {
        let mut texts = Vec::new();
        for selector in HEADING_SELECTORS {
            let Ok(element) = self.tab.find_element(selector) else {
                continue;
            };
            if let Ok(text) = element.get_inner_text() {
                texts.push(text);
            }
        }
        texts
    }

    /// Capture the raw data of up to `MAX_ROWS_PER_PAGE` match rows for the
    /// pure classifier. A row whose extraction fails comes back with empty
    /// fields and gets rejected downstream.
    pub fn collect_raw_rows(&self) -> Vec<RawRow> {
        let rows = self
            .tab
            .find_elements(MATCH_ROW_SELECTOR)
            .unwrap_or_default();

        rows.iter()
            .take(MAX_ROWS_PER_PAGE)
            .map(|row| raw_row(row))
            .collect()
    }
}

fn raw_row(row: &Element) -> RawRow {
    let home = row
        .find_element(".event__participant--home")
        .ok()
        .map(|el| raw_participant(&el));
    let away = row
        .find_element(".event__participant--away")
        .ok()
        .map(|el| raw_participant(&el));

    let text = row.get_inner_text().unwrap_or_default();

    let home_score = element_text(row, ".event__score--home");
    let away_score = element_text(row, ".event__score--away");
    let score_fallback = row
        .find_elements(".event__score")
        .unwrap_or_default()
        .iter()
        .filter_map(|el| el.get_inner_text().ok())
        .collect();

    RawRow {
        home,
        away,
        text,
        home_score,
        away_score,
        score_fallback,
    }
}

fn raw_participant(element: &Element) -> RawParticipant {
    // DOM attributes come back as a flat [name, value, ...] list.
    let attrs = element.get_attributes().ok().flatten().unwrap_or_default();
    RawParticipant {
        title: attribute(&attrs, "title"),
        aria_label: attribute(&attrs, "aria-label"),
        data_tooltip: attribute(&attrs, "data-tooltip"),
        text: element.get_inner_text().unwrap_or_default(),
    }
}

fn attribute(attrs: &[String], name: &str) -> Option<String> {
    attrs
        .chunks_exact(2)
        .find(|pair| pair[0] == name)
        .map(|pair| pair[1].clone())
}

fn element_text(row: &Element, selector: &str) -> Option<String> {
    let element = row.find_element(selector).ok()?;
    element.get_inner_text().ok()
}
