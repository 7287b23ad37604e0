//! Event dashboard flow: category summary, status tabs, and per-event
//! actions.

use billion_eye_client::{ApiClient, ClientError, dashboard};
use billion_eye_event_models::{DashboardTab, EventStatus, icon_for_category};
use billion_eye_server_models::ApiEvent;
use billion_eye_session::SessionStore;
use billion_eye_storage::normalize_image_url;
use dialoguer::Select;

/// Runs the dashboard flow for one agency.
///
/// # Errors
///
/// Returns an error only for terminal I/O failures; API errors are printed
/// and leave the console usable.
pub async fn run(
    client: &ApiClient,
    session: &mut SessionStore,
    agency_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let response = match client.dashboard(agency_id).await {
            Ok(response) => response,
            Err(e) => {
                println!("Error loading agency dashboard: {e}");
                return Ok(());
            }
        };

        println!();
        println!("== {} ({agency_id}) ==", response.agency_name);
        print_category_cards(&response.assigned_events);

        let mut options: Vec<String> = DashboardTab::all()
            .iter()
            .map(|tab| {
                format!(
                    "{} ({})",
                    tab.label(),
                    dashboard::bucket(&response.assigned_events, *tab).len()
                )
            })
            .collect();
        options.push("Logout".to_string());
        options.push("Back".to_string());

        let choice = Select::new()
            .with_prompt("View")
            .items(&options)
            .default(0)
            .interact()?;

        match choice {
            idx if idx < DashboardTab::all().len() => {
                let tab = DashboardTab::all()[idx];
                let events = dashboard::bucket(&response.assigned_events, tab);
                browse_tab(client, agency_id, &events).await?;
            }
            idx if idx == options.len() - 2 => {
                logout(client, session).await;
                return Ok(());
            }
            _ => return Ok(()),
        }
    }
}

fn print_category_cards(events: &[ApiEvent]) {
    let summaries = dashboard::summarize(events);
    if summaries.is_empty() {
        println!("No events available");
        return;
    }

    println!("Event Categories:");
    for summary in summaries {
        println!(
            "  {} {} — {} total ({} open, {} assigned, {} resolved)",
            icon_for_category(&summary.category),
            summary.category,
            summary.total,
            summary.open,
            summary.assigned,
            summary.closed,
        );
    }
}

async fn browse_tab(
    client: &ApiClient,
    agency_id: &str,
    events: &[&ApiEvent],
) -> Result<(), Box<dyn std::error::Error>> {
    if events.is_empty() {
        println!("No events found");
        return Ok(());
    }

    let mut rows: Vec<String> = events
        .iter()
        .map(|event| {
            format!(
                "{} | {} | {} | ({:.4}, {:.4})",
                event.event_id,
                event.description,
                event
                    .assignment_time
                    .map_or_else(|| "N/A".to_string(), |ts| ts.to_rfc3339()),
                event.latitude,
                event.longitude,
            )
        })
        .collect();
    rows.push("Back".to_string());

    let choice = Select::new()
        .with_prompt("Event")
        .items(&rows)
        .default(0)
        .interact()?;

    if choice == rows.len() - 1 {
        return Ok(());
    }

    event_actions(client, agency_id, events[choice]).await?;
    Ok(())
}

/// The per-event action menu, keyed on status exactly like the dashboard's
/// action column.
async fn event_actions(
    client: &ApiClient,
    agency_id: &str,
    event: &ApiEvent,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(url) = event.image_url.as_deref().and_then(normalize_image_url) {
        println!("Image: {url}");
    }

    match event.status {
        EventStatus::Open => {
            let choice = Select::new()
                .with_prompt("Action")
                .items(&["Accept", "Reject", "Back"])
                .default(0)
                .interact()?;
            match choice {
                0 => {
                    // Accept associates this agency, then moves straight to
                    // the detail flow for ground-staff assignment.
                    report_outcome(client.accept_event(&event.event_id, agency_id).await);
                    crate::event_report::run(client, &event.event_id).await?;
                }
                1 => report_outcome(client.reject_event(&event.event_id).await),
                _ => {}
            }
        }
        EventStatus::Accepted | EventStatus::Unassigned => {
            let choice = Select::new()
                .with_prompt("Action")
                .items(&["Assign ground staff", "Reject", "Back"])
                .default(0)
                .interact()?;
            match choice {
                0 => crate::event_report::run(client, &event.event_id).await?,
                1 => report_outcome(client.reject_event(&event.event_id).await),
                _ => {}
            }
        }
        EventStatus::Assigned => {
            if let Some(name) = &event.ground_staff_name {
                println!("Assigned to: {name}");
            }
            let choice = Select::new()
                .with_prompt("Action")
                .items(&["Complete", "Reject", "Unassign", "Back"])
                .default(0)
                .interact()?;
            match choice {
                0 => report_outcome(client.complete_event(&event.event_id).await),
                1 => report_outcome(client.reject_event(&event.event_id).await),
                2 => report_outcome(client.unassign_event(&event.event_id).await),
                _ => {}
            }
        }
        EventStatus::Closed => println!("Task Completed"),
        EventStatus::Rejected => println!("Rejected"),
    }

    Ok(())
}

fn report_outcome(result: Result<ApiEvent, ClientError>) {
    match result {
        Ok(event) => println!("Event {} is now {}", event.event_id, event.status),
        Err(e) => println!("Error updating status: {e}"),
    }
}

async fn logout(client: &ApiClient, session: &mut SessionStore) {
    let Some(token) = session.token().map(str::to_string) else {
        println!("You are not logged in.");
        return;
    };

    match client.logout(&token).await {
        Ok(_) => {
            if let Err(e) = session.clear_token() {
                log::error!("Failed to clear session token: {e}");
            }
            println!("Logout Successful!");
        }
        Err(e) => println!("Logout failed: {e}"),
    }
}
