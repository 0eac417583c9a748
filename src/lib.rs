//! Flashscore results/fixtures sync: scrape competition pages with a
//! headless browser, normalise the rows into match records and upsert them
//! into the Supabase backing store, dumping local audit logs along the way.

pub mod audit;
pub mod browser;
pub mod keys;
pub mod records;
pub mod rows;
pub mod run_log;
pub mod scrape;
pub mod season;
pub mod store;
