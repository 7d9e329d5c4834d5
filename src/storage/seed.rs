use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::warn;

use crate::{ContentRecord, ShareRecord};

const SEED_JSON: &str = include_str!("../../data/seed.json");

/// Baseline content shipped with the application. Never written back.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub videos: Vec<ContentRecord>,
    #[serde(default)]
    pub shares: Vec<ShareRecord>,
}

lazy_static! {
    static ref SEED: SeedData = serde_json::from_str(SEED_JSON).unwrap_or_else(|e| {
        warn!(error = %e, "bundled seed data is malformed, starting empty");
        SeedData::default()
    });
}

pub fn seed_content() -> &'static [ContentRecord] {
    &SEED.videos
}

pub fn seed_shares() -> &'static [ShareRecord] {
    &SEED.shares
}
