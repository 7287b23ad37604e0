#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Event status state machine and category taxonomy for BillionEye.
//!
//! This crate defines the canonical incident status lifecycle shared by the
//! agency dashboard, the event-report detail flow, and the server's status
//! mutation endpoint. The wire strings are part of the backend contract and
//! intentionally mix casing (`open`/`closed` vs `Accepted`/`Assigned`/
//! `Rejected`/`Unassigned`) — they must round-trip exactly.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lifecycle status of a reported incident.
///
/// Transitions are one-directional; `Closed` and `Rejected` are terminal.
/// The status is only ever changed through the status mutation endpoint —
/// callers never compute a new status locally except to cache the mutation
/// response.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum EventStatus {
    /// Freshly reported, awaiting agency triage.
    #[serde(rename = "open")]
    #[strum(serialize = "open")]
    Open,
    /// An agency has taken responsibility but not yet dispatched anyone.
    Accepted,
    /// Ground staff has been dispatched.
    Assigned,
    /// Work finished.
    #[serde(rename = "closed")]
    #[strum(serialize = "closed")]
    Closed,
    /// Declined by the agency.
    Rejected,
    /// Ground staff was withdrawn after an assignment. Distinct from
    /// [`Self::Open`]: the event does not reappear in the recent-reports tab.
    Unassigned,
}

impl EventStatus {
    /// Returns `true` if no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Rejected)
    }

    /// The statuses this status may legally move to.
    ///
    /// `Open` lists itself because the dashboard's accept action re-posts
    /// `open` with an `agencyId` to associate the deciding agency before
    /// navigating to the detail flow.
    #[must_use]
    pub const fn transitions(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::Open, Self::Accepted, Self::Assigned, Self::Rejected],
            Self::Accepted => &[Self::Assigned, Self::Rejected],
            Self::Assigned => &[Self::Closed, Self::Rejected, Self::Unassigned],
            Self::Unassigned => &[Self::Assigned, Self::Rejected],
            Self::Closed | Self::Rejected => &[],
        }
    }

    /// Returns `true` if moving from `self` to `next` is legal.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.transitions().contains(&next)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Open,
            Self::Accepted,
            Self::Assigned,
            Self::Closed,
            Self::Rejected,
            Self::Unassigned,
        ]
    }
}

/// The three agency dashboard tabs.
///
/// Tabs partition on status equality. A status outside the partition
/// (`Accepted`, `Unassigned`) falls into no tab and is effectively hidden —
/// this mirrors the backend contract and must not be "fixed" here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum DashboardTab {
    /// Newly reported, untriaged events.
    RecentReports,
    /// Events with ground staff dispatched.
    AssignedEvents,
    /// Closed or rejected events.
    ResolvedEvents,
}

impl DashboardTab {
    /// Returns `true` if an event with `status` belongs in this tab.
    #[must_use]
    pub const fn contains(self, status: EventStatus) -> bool {
        match self {
            Self::RecentReports => matches!(status, EventStatus::Open),
            Self::AssignedEvents => matches!(status, EventStatus::Assigned),
            Self::ResolvedEvents => matches!(status, EventStatus::Closed | EventStatus::Rejected),
        }
    }

    /// The tab an event with `status` appears in, or `None` if hidden.
    #[must_use]
    pub fn for_status(status: EventStatus) -> Option<Self> {
        Self::all().iter().copied().find(|tab| tab.contains(status))
    }

    /// Human-readable tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RecentReports => "Recent Reports",
            Self::AssignedEvents => "Assigned Events",
            Self::ResolvedEvents => "Resolved Events",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::RecentReports,
            Self::AssignedEvents,
            Self::ResolvedEvents,
        ]
    }
}

/// Per-category tallies shown on the dashboard's category cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    /// Free-text category label (the event description).
    pub category: String,
    /// Total events for this category.
    pub total: u64,
    /// Events currently `open`.
    pub open: u64,
    /// Events currently `Assigned`.
    pub assigned: u64,
    /// Events `closed` or `Rejected`.
    pub closed: u64,
}

/// Display icon for a free-text event category.
///
/// Matching is by case-insensitive substring, first match wins; the order is
/// part of the observable behavior (e.g. "Road Damage" matches "road" before
/// "damage").
#[must_use]
pub fn icon_for_category(category: &str) -> &'static str {
    let lower = category.to_lowercase();
    if lower.contains("road") {
        "🛣️"
    } else if lower.contains("pothole") {
        "⛓️"
    } else if lower.contains("flood") {
        "🌊"
    } else if lower.contains("fire") {
        "🔥"
    } else if lower.contains("accident") {
        "🚨"
    } else if lower.contains("healthcare") {
        "🏥"
    } else if lower.contains("tree") {
        "🌳"
    } else if lower.contains("water") {
        "💧"
    } else if lower.contains("electric") {
        "⚡"
    } else if lower.contains("waste") {
        "🗑️"
    } else if lower.contains("building") {
        "🏗️"
    } else if lower.contains("street light") || lower.contains("daytime") {
        "💡"
    } else if lower.contains("environmental") {
        "🌿"
    } else if lower.contains("damage") {
        "💥"
    } else {
        "📍"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_round_trip() {
        let expected = [
            (EventStatus::Open, "open"),
            (EventStatus::Accepted, "Accepted"),
            (EventStatus::Assigned, "Assigned"),
            (EventStatus::Closed, "closed"),
            (EventStatus::Rejected, "Rejected"),
            (EventStatus::Unassigned, "Unassigned"),
        ];
        for (status, s) in expected {
            assert_eq!(status.to_string(), s);
            assert_eq!(s.parse::<EventStatus>().unwrap(), status);
            assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{s}\""));
        }
    }

    #[test]
    fn tabs_partition_without_overlap() {
        for status in EventStatus::all() {
            let owning: Vec<DashboardTab> = DashboardTab::all()
                .iter()
                .copied()
                .filter(|tab| tab.contains(*status))
                .collect();
            assert!(
                owning.len() <= 1,
                "{status:?} appears in multiple tabs: {owning:?}"
            );
        }
    }

    #[test]
    fn accepted_and_unassigned_are_hidden() {
        assert_eq!(DashboardTab::for_status(EventStatus::Accepted), None);
        assert_eq!(DashboardTab::for_status(EventStatus::Unassigned), None);
    }

    #[test]
    fn tab_assignment_matches_contract() {
        assert_eq!(
            DashboardTab::for_status(EventStatus::Open),
            Some(DashboardTab::RecentReports)
        );
        assert_eq!(
            DashboardTab::for_status(EventStatus::Assigned),
            Some(DashboardTab::AssignedEvents)
        );
        assert_eq!(
            DashboardTab::for_status(EventStatus::Closed),
            Some(DashboardTab::ResolvedEvents)
        );
        assert_eq!(
            DashboardTab::for_status(EventStatus::Rejected),
            Some(DashboardTab::ResolvedEvents)
        );
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        assert!(EventStatus::Closed.transitions().is_empty());
        assert!(EventStatus::Rejected.transitions().is_empty());
        assert!(EventStatus::Closed.is_terminal());
        assert!(EventStatus::Rejected.is_terminal());
    }

    #[test]
    fn transition_menu_matches_observed_flows() {
        // Dashboard accept re-posts open with an agency id.
        assert!(EventStatus::Open.can_transition_to(EventStatus::Open));
        // EventReport assigns directly from open, bypassing Accepted.
        assert!(EventStatus::Open.can_transition_to(EventStatus::Assigned));
        assert!(EventStatus::Accepted.can_transition_to(EventStatus::Assigned));
        assert!(EventStatus::Assigned.can_transition_to(EventStatus::Closed));
        assert!(EventStatus::Assigned.can_transition_to(EventStatus::Unassigned));
        assert!(EventStatus::Unassigned.can_transition_to(EventStatus::Assigned));
        // Reject is reachable from every non-terminal state.
        for status in EventStatus::all() {
            if !status.is_terminal() {
                assert!(status.can_transition_to(EventStatus::Rejected), "{status:?}");
            }
        }
        // Nothing moves out of a terminal state.
        assert!(!EventStatus::Closed.can_transition_to(EventStatus::Open));
        assert!(!EventStatus::Rejected.can_transition_to(EventStatus::Assigned));
    }

    #[test]
    fn category_icons() {
        assert_eq!(icon_for_category("Road Damage"), "🛣️");
        assert_eq!(icon_for_category("Daytime Running Street Light"), "💡");
        assert_eq!(icon_for_category("Environmental Violation"), "🌿");
        assert_eq!(icon_for_category("Human healthcare services"), "🏥");
        assert_eq!(icon_for_category("something else"), "📍");
    }
}
