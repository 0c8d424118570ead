//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL mapping
//! - [`ClickStat`] - A per-link, per-day click counter
//! - [`DailyClicks`] - Clicks summed across links for one day
//!
//! Creation and partial updates use separate input types (`NewLink`,
//! `LinkPatch`).

pub mod click_stat;
pub mod link;

pub use click_stat::{ClickStat, DailyClicks};
pub use link::{Link, LinkPatch, NewLink};
