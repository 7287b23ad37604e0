//! Capture submission flow.
//!
//! The browser capture page owns the camera and geolocation hardware; here
//! the operator supplies a JPEG file and a coordinate fix, and the same
//! validation applies: no coordinates, no upload.

use base64::Engine as _;
use billion_eye_client::{ApiClient, ClientError, capture};
use chrono::Utc;
use dialoguer::Input;

/// Runs the capture submission flow.
///
/// # Errors
///
/// Returns an error only for terminal I/O failures; validation and upload
/// problems are printed and leave the console usable.
pub async fn run(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let path: String = Input::new()
        .with_prompt("Path to captured JPEG")
        .interact_text()?;

    let bytes = match std::fs::read(path.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Unable to read image: {e}");
            return Ok(());
        }
    };
    let base64_string = base64::engine::general_purpose::STANDARD.encode(&bytes);

    let latitude = prompt_coordinate("Latitude")?;
    let longitude = prompt_coordinate("Longitude")?;

    let request = match capture::build_capture_request(
        "12345",
        latitude,
        longitude,
        Utc::now(),
        &base64_string,
    ) {
        Ok(request) => request,
        Err(ClientError::Validation { message }) => {
            // The image stays on disk; the operator can retry with a fix.
            println!("{message}");
            return Ok(());
        }
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    match client.upload_image(&request).await {
        Ok(response) => {
            println!("Thank You for Reporting!");
            println!("Your contribution helps make a better and safer society.");
            println!("Image id: {}", response.image_id);
        }
        Err(e) => {
            log::error!("Upload error: {e}");
            println!("Upload failed. Please check your connection.");
        }
    }

    Ok(())
}

/// Reads a coordinate, mapping blank or unparseable input to NaN so the
/// shared validation produces the GPS error message instead of re-prompting.
fn prompt_coordinate(label: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let text: String = Input::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()?;
    Ok(text.trim().parse().unwrap_or(f64::NAN))
}
