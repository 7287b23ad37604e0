//! Event report detail flow: metadata, location, and ground-staff
//! assignment.

use billion_eye_client::ApiClient;
use billion_eye_storage::normalize_image_url;
use dialoguer::Select;

/// Runs the event-report flow for one event.
///
/// # Errors
///
/// Returns an error only for terminal I/O failures; API errors are printed
/// and leave the console usable.
pub async fn run(
    client: &ApiClient,
    event_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let event = match client.event_report(event_id).await {
        Ok(event) => event,
        Err(e) => {
            println!("Error fetching report data: {e}");
            return Ok(());
        }
    };

    println!();
    println!("== REPORT DETAILS ==");
    println!("Report ID:       {}", event.event_id);
    println!("Object Detected: {}", event.description);
    println!("Status:          {}", event.status);
    println!(
        "Location:        ({:.6}, {:.6})",
        event.latitude, event.longitude
    );
    match event.assignment_time {
        Some(ts) => println!("Assigned at:     {}", ts.to_rfc3339()),
        None => println!("Assigned at:     N/A"),
    }
    if let Some(url) = event.image_url.as_deref().and_then(normalize_image_url) {
        println!("Incident image:  {url}");
    }

    let Some(agency_id) = event.agency_id.as_deref() else {
        println!("No agency is associated with this event yet.");
        return Ok(());
    };

    let staff = match client.ground_staff(agency_id).await {
        Ok(staff) => staff,
        Err(e) => {
            println!("Error fetching ground staff by agency: {e}");
            return Ok(());
        }
    };

    if staff.is_empty() {
        println!("No ground staff onboarded for {agency_id} yet.");
        return Ok(());
    }

    let mut options: Vec<String> = staff
        .iter()
        .map(|member| format!("{} - {}", member.name, member.number))
        .collect();
    options.push("Unassign".to_string());
    options.push("Back".to_string());

    let choice = Select::new()
        .with_prompt("Select Ground Staff")
        .items(&options)
        .default(0)
        .interact()?;

    if choice == options.len() - 1 {
        return Ok(());
    }

    if choice == options.len() - 2 {
        match client.unassign_event(event_id).await {
            Ok(_) => println!("Ground staff unassigned."),
            Err(e) => println!("Error unassigning ground staff: {e}"),
        }
        return Ok(());
    }

    let member = &staff[choice];
    println!("Selected Staff Details:");
    println!("  Name:    {}", member.name);
    println!("  Phone:   {}", member.number);
    println!("  Address: {}", member.address);

    match client.assign_event(event_id, &member.name).await {
        Ok(_) => println!("Event {event_id} assigned to {}", member.name),
        Err(e) => println!("Error assigning ground staff: {e}"),
    }

    Ok(())
}
