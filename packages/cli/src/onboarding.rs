//! Ground-staff onboarding flow.

use billion_eye_agency_models::sanitize_mobile_input;
use billion_eye_client::{ApiClient, ClientError};
use billion_eye_server_models::AddGroundStaffRequest;
use dialoguer::Input;

/// Runs the ground-staff registration form for one agency.
///
/// # Errors
///
/// Returns an error only for terminal I/O failures.
pub async fn run(client: &ApiClient, agency_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Ground Staff Registration ({agency_id})");

    let name: String = Input::new()
        .with_prompt("Name of ground staff")
        .interact_text()?;
    let number: String = Input::new()
        .with_prompt("Enter 10-digit mobile number")
        .interact_text()?;
    let number = sanitize_mobile_input(&number);
    let address: String = Input::new().with_prompt("Address").interact_text()?;

    let request = AddGroundStaffRequest {
        name,
        number,
        address,
        agency_id: agency_id.to_string(),
    };

    match client.add_ground_staff(&request).await {
        Ok(_) => println!("Ground staff added successfully!"),
        Err(ClientError::Validation { message }) => println!("{message}"),
        Err(e) => {
            log::error!("Failed to add ground staff: {e}");
            println!("An error occurred. Please try again.");
        }
    }

    Ok(())
}
