//! Admin agency manager: list, create (point / polygon / import), delete.

use billion_eye_agency_models::sanitize_mobile_input;
use billion_eye_client::{ApiClient, ClientError};
use billion_eye_geofence::import::{CatchmentImport, parse_import};
use billion_eye_geofence::{JurisdictionPolygon, LatLng, MIN_POLYGON_POINTS};
use billion_eye_server_models::{ApiJurisdiction, CreateAgencyRequest, UpdateAgencyRequest};
use dialoguer::{Confirm, Input, Select};

/// Number of vertex entry slots offered for a jurisdiction polygon. Slots
/// may be left blank; at least [`MIN_POLYGON_POINTS`] must be filled.
const JURISDICTION_SLOTS: usize = 5;

/// Runs the admin agency manager.
///
/// # Errors
///
/// Returns an error only for terminal I/O failures.
pub async fn run(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let choice = Select::new()
            .with_prompt("Agency manager")
            .items(&[
                "List agencies",
                "Add new agency",
                "Edit agency",
                "Delete agency",
                "Back",
            ])
            .default(0)
            .interact()?;

        match choice {
            0 => list(client).await,
            1 => create(client).await?,
            2 => edit(client).await?,
            3 => delete(client).await?,
            _ => return Ok(()),
        }
    }
}

async fn list(client: &ApiClient) {
    match client.list_agencies().await {
        Ok(response) => {
            if response.data.is_empty() {
                println!("No agencies registered yet.");
            }
            for agency in response.data {
                let catchment = match (&agency.location, &agency.jurisdiction) {
                    (_, Some(jurisdiction)) => {
                        format!("polygon with {} vertices", jurisdiction.coordinates.len())
                    }
                    (Some(location), None) => {
                        format!("point ({:.4}, {:.4})", location.latitude, location.longitude)
                    }
                    (None, None) => "no catchment".to_string(),
                };
                println!(
                    "{} | {} | {} | responsible for: {} | {catchment}",
                    agency.agency_id,
                    agency.agency_name,
                    agency.mobile_number,
                    agency.event_responsible_for.join(", "),
                );
            }
        }
        Err(e) => println!("Error loading agencies: {e}"),
    }
}

async fn create(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let agency_name: String = Input::new().with_prompt("Agency name").interact_text()?;
    let mobile_number: String = Input::new()
        .with_prompt("Mobile number")
        .interact_text()?;
    let mobile_number = sanitize_mobile_input(&mobile_number);
    let password = dialoguer::Password::new().with_prompt("Password").interact()?;
    let categories: String = Input::new()
        .with_prompt("Events responsible for (comma-separated)")
        .allow_empty(true)
        .interact_text()?;
    let event_responsible_for: Vec<String> = categories
        .split(',')
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .collect();

    let location_choice = Select::new()
        .with_prompt("Location type")
        .items(&[
            "Single location",
            "Jurisdiction (polygon)",
            "Import (GeoJSON / JSON / CSV file)",
        ])
        .default(0)
        .interact()?;

    let mut request = CreateAgencyRequest {
        agency_name,
        mobile_number,
        password,
        lat: None,
        lng: None,
        event_responsible_for: Some(event_responsible_for),
        jurisdiction: None,
    };

    match location_choice {
        0 => {
            request.lat = Some(prompt_f64("Latitude")?);
            request.lng = Some(prompt_f64("Longitude")?);
        }
        1 => {
            let Some(polygon) = prompt_polygon()? else {
                return Ok(());
            };
            request.jurisdiction = Some(wire_jurisdiction(&polygon));
        }
        _ => {
            let path: String = Input::new().with_prompt("Import file path").interact_text()?;
            let contents = match std::fs::read_to_string(path.trim()) {
                Ok(contents) => contents,
                Err(e) => {
                    println!("Unable to read import file: {e}");
                    return Ok(());
                }
            };
            match parse_import(&contents) {
                Ok(CatchmentImport::Point(point)) => {
                    println!("Imported point ({:.4}, {:.4})", point.latitude, point.longitude);
                    request.lat = Some(point.latitude);
                    request.lng = Some(point.longitude);
                }
                Ok(CatchmentImport::Polygon(polygon)) => {
                    println!("Imported polygon with {} vertices", polygon.ring().len() - 1);
                    request.jurisdiction = Some(wire_jurisdiction(&polygon));
                }
                Err(e) => {
                    println!("Import failed: {e}");
                    return Ok(());
                }
            }
        }
    }

    match client.create_agency(&request).await {
        Ok(_) => println!("Agency Registered Successfully!"),
        Err(ClientError::Validation { message }) => println!("{message}"),
        Err(e) => println!("Registration Failed: {e}"),
    }

    Ok(())
}

/// Partial edit: blank answers leave the field untouched.
async fn edit(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let agency_id: String = Input::new().with_prompt("Agency id").interact_text()?;

    let name: String = Input::new()
        .with_prompt("New name (blank to keep)")
        .allow_empty(true)
        .interact_text()?;
    let mobile: String = Input::new()
        .with_prompt("New mobile number (blank to keep)")
        .allow_empty(true)
        .interact_text()?;
    let password: String = Input::new()
        .with_prompt("New password (blank to keep)")
        .allow_empty(true)
        .interact_text()?;
    let categories: String = Input::new()
        .with_prompt("New events responsible for, comma-separated (blank to keep)")
        .allow_empty(true)
        .interact_text()?;

    let non_empty = |value: String| {
        let trimmed = value.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    let request = UpdateAgencyRequest {
        agency_name: non_empty(name),
        mobile_number: non_empty(mobile).map(|m| sanitize_mobile_input(&m)),
        password: non_empty(password),
        event_responsible_for: non_empty(categories).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|category| !category.is_empty())
                .map(str::to_string)
                .collect()
        }),
        lat: None,
        lng: None,
        jurisdiction: None,
    };

    match client.update_agency(agency_id.trim(), &request).await {
        Ok(_) => println!("Agency updated."),
        Err(ClientError::Validation { message }) => println!("{message}"),
        Err(e) => println!("Update failed: {e}"),
    }

    Ok(())
}

async fn delete(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let agency_id: String = Input::new().with_prompt("Agency id").interact_text()?;

    if !Confirm::new()
        .with_prompt("Are you sure you want to delete this agency?")
        .default(false)
        .interact()?
    {
        return Ok(());
    }

    match client.delete_agency(agency_id.trim()).await {
        Ok(_) => println!("Agency deleted."),
        Err(e) => println!("Delete failed: {e}"),
    }

    Ok(())
}

fn prompt_f64(label: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let value: f64 = Input::new().with_prompt(label).interact_text()?;
    Ok(value)
}

/// Prompts for up to [`JURISDICTION_SLOTS`] vertices, blank to skip a slot.
/// Fewer than three filled slots blocks submission with a visible message.
fn prompt_polygon() -> Result<Option<JurisdictionPolygon>, Box<dyn std::error::Error>> {
    let mut vertices = Vec::new();

    for slot in 1..=JURISDICTION_SLOTS {
        let lat: String = Input::new()
            .with_prompt(format!("Point {slot} latitude (blank to skip)"))
            .allow_empty(true)
            .interact_text()?;
        if lat.trim().is_empty() {
            continue;
        }
        let lng: String = Input::new()
            .with_prompt(format!("Point {slot} longitude"))
            .allow_empty(true)
            .interact_text()?;

        let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) else {
            println!("Skipping point {slot}: not a valid (lat, lng) pair");
            continue;
        };
        match LatLng::new(lat, lng) {
            Ok(point) => vertices.push(point),
            Err(e) => println!("Skipping point {slot}: {e}"),
        }
    }

    match JurisdictionPolygon::from_vertices(&vertices) {
        Ok(polygon) => Ok(Some(polygon)),
        Err(_) => {
            println!(
                "A jurisdiction needs at least {MIN_POLYGON_POINTS} valid points; got {}.",
                vertices.len()
            );
            Ok(None)
        }
    }
}

/// The ring is already closed; positions go out in GeoJSON `[lng, lat]`
/// order.
fn wire_jurisdiction(polygon: &JurisdictionPolygon) -> ApiJurisdiction {
    ApiJurisdiction {
        coordinates: polygon.ring().iter().map(|p| p.to_position()).collect(),
        kind: "Polygon".to_string(),
    }
}
