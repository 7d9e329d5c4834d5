//! Aggregate views over the content list for the dashboard and reports.

use std::cmp::Reverse;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{ContentRecord, Source};

/// Inclusive bounds on the upload day. An unset bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Records without a readable upload day fall outside any bounded range.
    pub fn contains(&self, record: &ContentRecord) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(day) = record.upload_day() else {
            return false;
        };
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

pub fn within_range(records: &[ContentRecord], range: DateRange) -> Vec<ContentRecord> {
    records.iter().filter(|r| range.contains(r)).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub name: String,
    pub count: usize,
}

fn tally(keys: impl Iterator<Item = String>) -> Vec<Count> {
    let mut counts: Vec<Count> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|c| c.name == key) {
            Some(c) => c.count += 1,
            None => counts.push(Count { name: key, count: 1 }),
        }
    }
    counts
}

/// Per department in first-seen order; a blank department is "Unknown".
pub fn count_by_department(records: &[ContentRecord]) -> Vec<Count> {
    tally(records.iter().map(|r| {
        if r.department.trim().is_empty() {
            "Unknown".to_string()
        } else {
            r.department.clone()
        }
    }))
}

/// Per content type in first-seen order; a missing type is "Other".
pub fn count_by_content_type(records: &[ContentRecord]) -> Vec<Count> {
    tally(
        records
            .iter()
            .map(|r| r.content_type.map_or_else(|| "Other".to_string(), |t| t.to_string())),
    )
}

/// Per `YYYY-MM`, oldest month first. Undated records are left out.
pub fn count_by_month(records: &[ContentRecord]) -> Vec<Count> {
    let mut counts = tally(
        records
            .iter()
            .filter_map(|r| r.upload_day())
            .map(|d| format!("{:04}-{:02}", d.year(), d.month())),
    );
    counts.sort_by(|a, b| a.name.cmp(&b.name));
    counts
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_uploads: usize,
    pub total_searches: u64,
    pub total_shares: usize,
    pub cloud_percent: u32,
    pub local_percent: u32,
    pub top_tags: Vec<Count>,
    pub recent_uploads: Vec<ContentRecord>,
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (part as f64 / total as f64 * 100.0).round() as u32
    }
}

pub fn dashboard(records: &[ContentRecord], total_shares: usize, total_searches: u64) -> DashboardStats {
    let total = records.len();
    let local = records.iter().filter(|r| r.source() == Source::Local).count();

    let mut top_tags = tally(records.iter().flat_map(|r| r.tag_types().map(str::to_string)));
    top_tags.sort_by_key(|c| Reverse(c.count));
    top_tags.truncate(5);

    let mut recent_uploads = records.to_vec();
    recent_uploads.sort_by_key(|r| Reverse(r.upload_day()));
    recent_uploads.truncate(5);

    DashboardStats {
        total_uploads: total,
        total_searches,
        total_shares,
        cloud_percent: percent(total - local, total),
        local_percent: percent(local, total),
        top_tags,
        recent_uploads,
    }
}
