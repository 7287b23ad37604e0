//! Dashboard view helpers: tab bucketing and per-category summaries.

use std::collections::BTreeMap;

use billion_eye_event_models::{CategorySummary, DashboardTab, EventStatus};
use billion_eye_server_models::ApiEvent;

/// Events belonging to a dashboard tab, preserving the fetch order.
///
/// Statuses outside the three-tab partition (`Accepted`, `Unassigned`)
/// appear in no tab.
#[must_use]
pub fn bucket<'a>(events: &'a [ApiEvent], tab: DashboardTab) -> Vec<&'a ApiEvent> {
    events
        .iter()
        .filter(|event| tab.contains(event.status))
        .collect()
}

/// Per-category tallies for the dashboard's category cards, sorted by
/// category name.
#[must_use]
pub fn summarize(events: &[ApiEvent]) -> Vec<CategorySummary> {
    let mut by_category: BTreeMap<&str, CategorySummary> = BTreeMap::new();

    for event in events {
        let entry = by_category
            .entry(event.description.as_str())
            .or_insert_with(|| CategorySummary {
                category: event.description.clone(),
                ..CategorySummary::default()
            });
        entry.total += 1;
        match event.status {
            EventStatus::Open => entry.open += 1,
            EventStatus::Assigned => entry.assigned += 1,
            EventStatus::Closed | EventStatus::Rejected => entry.closed += 1,
            EventStatus::Accepted | EventStatus::Unassigned => {}
        }
    }

    by_category.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_id: &str, description: &str, status: EventStatus) -> ApiEvent {
        ApiEvent {
            event_id: event_id.to_string(),
            description: description.to_string(),
            status,
            latitude: 20.2961,
            longitude: 85.8245,
            image_url: None,
            agency_id: Some("agency-121".to_string()),
            assignment_time: None,
            ground_staff_name: None,
        }
    }

    fn sample_events() -> Vec<ApiEvent> {
        vec![
            event("e1", "Road Damage", EventStatus::Open),
            event("e2", "Road Damage", EventStatus::Assigned),
            event("e3", "Flooding", EventStatus::Closed),
            event("e4", "Flooding", EventStatus::Rejected),
            event("e5", "Road Damage", EventStatus::Accepted),
            event("e6", "Flooding", EventStatus::Unassigned),
        ]
    }

    #[test]
    fn tabs_partition_and_hide_out_of_band_statuses() {
        let events = sample_events();

        let recent = bucket(&events, DashboardTab::RecentReports);
        let assigned = bucket(&events, DashboardTab::AssignedEvents);
        let resolved = bucket(&events, DashboardTab::ResolvedEvents);

        assert_eq!(
            recent.iter().map(|e| e.event_id.as_str()).collect::<Vec<_>>(),
            ["e1"]
        );
        assert_eq!(
            assigned.iter().map(|e| e.event_id.as_str()).collect::<Vec<_>>(),
            ["e2"]
        );
        assert_eq!(
            resolved.iter().map(|e| e.event_id.as_str()).collect::<Vec<_>>(),
            ["e3", "e4"]
        );

        // e5 (Accepted) and e6 (Unassigned) are in no tab, and no event is
        // in more than one.
        let total = recent.len() + assigned.len() + resolved.len();
        assert_eq!(total, 4);
    }

    #[test]
    fn summaries_count_per_category() {
        let summaries = summarize(&sample_events());
        assert_eq!(summaries.len(), 2);

        let flooding = &summaries[0];
        assert_eq!(flooding.category, "Flooding");
        assert_eq!(flooding.total, 3);
        assert_eq!(flooding.closed, 2);

        let road = &summaries[1];
        assert_eq!(road.category, "Road Damage");
        assert_eq!(road.total, 3);
        assert_eq!(road.open, 1);
        assert_eq!(road.assigned, 1);
        assert_eq!(road.closed, 0);
    }
}
