//! Narrowing the content list by a set of optional constraints.
//!
//! Filtering is stable and never panics on incomplete records: a record
//! missing a field simply fails any constraint that looks at that field.

use serde::{Deserialize, Serialize};

use crate::types::lenient;
use crate::{ContentRecord, ContentType};

/// Optional constraints, combined with AND. Blank strings count as unset,
/// including stored `""` for the typed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Case-insensitive substring over name, department, person and tag types.
    pub search_text: Option<String>,
    pub department: Option<String>,
    pub district: Option<String>,
    pub block: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub content_type: Option<ContentType>,
    /// Case-insensitive substring.
    pub person_tag: Option<String>,
    /// Exact match against any tag on the record.
    pub tag_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub year_start: Option<i32>,
    #[serde(deserialize_with = "lenient")]
    pub year_end: Option<i32>,
    /// Department chips: when non-empty the department must be one of these.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub departments: Vec<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        active(&self.search_text).is_none()
            && active(&self.department).is_none()
            && active(&self.district).is_none()
            && active(&self.block).is_none()
            && self.content_type.is_none()
            && active(&self.person_tag).is_none()
            && active(&self.tag_type).is_none()
            && self.year_start.is_none()
            && self.year_end.is_none()
            && self.departments.is_empty()
    }

    pub fn matches(&self, record: &ContentRecord) -> bool {
        if let Some(text) = active(&self.search_text) {
            let needle = text.to_lowercase();
            let hit = contains_folded(&record.name, &needle)
                || contains_folded(&record.department, &needle)
                || contains_folded(&record.person_tag, &needle)
                || record.tag_types().any(|t| contains_folded(t, &needle));
            if !hit {
                return false;
            }
        }

        if let Some(department) = active(&self.department) {
            if record.department != department {
                return false;
            }
        }
        if let Some(district) = active(&self.district) {
            if record.district != district {
                return false;
            }
        }
        if let Some(block) = active(&self.block) {
            if record.block != block {
                return false;
            }
        }
        if let Some(content_type) = self.content_type {
            if record.content_type != Some(content_type) {
                return false;
            }
        }
        if let Some(person) = active(&self.person_tag) {
            if !contains_folded(&record.person_tag, &person.to_lowercase()) {
                return false;
            }
        }
        if let Some(tag_type) = active(&self.tag_type) {
            if !record.tag_types().any(|t| t == tag_type) {
                return false;
            }
        }

        if self.year_start.is_some() || self.year_end.is_some() {
            let Some(year) = record.upload_year() else {
                return false;
            };
            if self.year_start.is_some_and(|start| year < start) {
                return false;
            }
            if self.year_end.is_some_and(|end| year > end) {
                return false;
            }
        }

        if !self.departments.is_empty() && !self.departments.contains(&record.department) {
            return false;
        }

        true
    }
}

fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    !haystack.is_empty() && haystack.to_lowercase().contains(needle_lower)
}

/// Matching records in their original relative order.
pub fn filter(records: &[ContentRecord], spec: &FilterSpec) -> Vec<ContentRecord> {
    if spec.is_empty() {
        return records.to_vec();
    }
    records.iter().filter(|r| spec.matches(r)).cloned().collect()
}

/// Distinct non-empty departments in first-seen order.
pub fn unique_departments(records: &[ContentRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        if !record.department.is_empty() && !seen.contains(&record.department) {
            seen.push(record.department.clone());
        }
    }
    seen
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// One 1-based page. Pages past the end are empty; page 0 is page 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);
    Page {
        items: items[start..end].to_vec(),
        total,
        page,
        per_page,
        total_pages: total.div_ceil(per_page),
    }
}
