//! Robots-gated, bounded page fetching for lead enrichment.
//!
//! This crate is the only part of the enrichment core that performs network
//! I/O: it fetches a lead's homepage plus a fixed set of well-known pages
//! under a per-host politeness gate and hands the resulting [`PageBundle`]
//! to the pure extraction engine.

pub mod fetcher;
pub mod robots;

pub use fetcher::{FetchedPage, PageBundle, PageFetcher, PageKind, html_to_text};
pub use robots::{RobotsDecision, RobotsPolicy};
