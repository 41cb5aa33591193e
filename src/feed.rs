//! Derived alert views: filtering, ordering, pagination and unseen tracking.
//!
//! Everything here is a pure function of the raw fetched collection; the
//! processed list is never stored, so stale sort/filter closures cannot
//! exist.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::alert::{Alert, AlertId, AlertType};
use crate::PAGE_SIZE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Time,
    Confidence,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    #[default]
    All,
    Only(AlertType),
}

impl TypeFilter {
    #[must_use]
    pub fn admits(self, alert_type: AlertType) -> bool {
        match self {
            Self::All => true,
            Self::Only(want) => alert_type == want,
        }
    }
}

/// Per-screen presentation state, created on mount and discarded on
/// navigation. `current_page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub type_filter: TypeFilter,
    pub current_page: usize,
    pub selected: Option<AlertId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
            type_filter: TypeFilter::default(),
            current_page: 1,
            selected: None,
        }
    }
}

impl ViewState {
    /// Changing what is shown invalidates the page index, so any actual
    /// sort-key change snaps back to page 1.
    pub fn set_sort_key(&mut self, key: SortKey) {
        if self.sort_by != key {
            self.sort_by = key;
            self.current_page = 1;
        }
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggled();
        self.current_page = 1;
    }

    pub fn set_type_filter(&mut self, filter: TypeFilter) {
        if self.type_filter != filter {
            self.type_filter = filter;
            self.current_page = 1;
        }
    }
}

/// Filters and orders the collection for display.
///
/// The sort is stable: alerts with equal keys keep the order the server
/// returned them in.
#[must_use]
pub fn ordered<'a>(alerts: &'a [Alert], view: &ViewState) -> Vec<&'a Alert> {
    let mut rows: Vec<&Alert> = alerts
        .iter()
        .filter(|a| view.type_filter.admits(a.alert_type))
        .collect();
    rows.sort_by(|a, b| compare(view.sort_by, view.sort_order, a, b));
    rows
}

fn compare(key: SortKey, order: SortOrder, a: &Alert, b: &Alert) -> Ordering {
    let ascending = match key {
        SortKey::Time => a
            .timestamp_ms()
            .unwrap_or(0)
            .cmp(&b.timestamp_ms().unwrap_or(0)),
        SortKey::Confidence => a
            .confidence
            .partial_cmp(&b.confidence)
            .unwrap_or(Ordering::Equal),
    };
    match order {
        SortOrder::Asc => ascending,
        // Equal keys stay Equal under reverse, which preserves stability.
        SortOrder::Desc => ascending.reverse(),
    }
}

#[must_use]
pub fn filtered_count(alerts: &[Alert], filter: TypeFilter) -> usize {
    alerts.iter().filter(|a| filter.admits(a.alert_type)).count()
}

#[must_use]
pub fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Resolved slice bounds for one page of a list of `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    pub page: usize,
    pub page_count: usize,
    pub start: usize,
    pub end: usize,
}

/// Clamps `requested_page` into the valid range and resolves its bounds.
/// An empty list yields page 1 with an empty span.
#[must_use]
pub fn paginate(total: usize, requested_page: usize) -> PageSpan {
    let pages = page_count(total);
    let page = requested_page.clamp(1, pages.max(1));
    let start = (page - 1) * PAGE_SIZE;
    PageSpan {
        page,
        page_count: pages,
        start: start.min(total),
        end: (start + PAGE_SIZE).min(total),
    }
}

/// Ids of alerts the operator has not looked at yet. Rebuilt wholesale from
/// every successful list fetch; between fetches it only ever shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnseenSet(HashSet<AlertId>);

impl UnseenSet {
    #[must_use]
    pub fn rebuild(alerts: &[Alert]) -> Self {
        Self(
            alerts
                .iter()
                .filter(|a| !a.seen)
                .map(|a| a.id.clone())
                .collect(),
        )
    }

    /// Removes `id` from the set. Returns whether it was present, which is
    /// what decides if a mark-seen call goes to the server.
    pub fn mark_seen(&mut self, id: &AlertId) -> bool {
        self.0.remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &AlertId) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
