//! Agency login flow with the client-side attempt throttle.

use billion_eye_agency_models::sanitize_mobile_input;
use billion_eye_client::{ApiClient, ClientError};
use billion_eye_session::{FailureWarning, SessionStore};
use dialoguer::{Input, Password};

/// Runs the login flow. Returns the agency id on success, `None` when the
/// submission was blocked or failed.
///
/// The lockout is checked before any prompt and again before the request,
/// mirroring the page's on-mount and on-submit checks.
///
/// # Errors
///
/// Returns an error only for terminal I/O or session-store failures; a
/// failed login is a normal outcome, not an error.
pub async fn run(
    client: &ApiClient,
    session: &mut SessionStore,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if session.blocked_until().is_some() {
        println!("{}", FailureWarning::Blocked.message());
        return Ok(None);
    }

    let mobile_number: String = Input::new()
        .with_prompt("Mobile number")
        .interact_text()?;
    let mobile_number = sanitize_mobile_input(&mobile_number);

    let password = Password::new().with_prompt("Password").interact()?;

    // Re-check in case the lockout was written while the operator typed.
    if session.blocked_until().is_some() {
        println!("{}", FailureWarning::Blocked.message());
        return Ok(None);
    }

    match client.login(&mobile_number, &password).await {
        Ok(response) => {
            session.record_success(&response.token)?;
            println!("Login Successful!");
            Ok(Some(response.agency.agency_id))
        }
        Err(ClientError::Validation { message }) => {
            // Field-shape problems don't count as failed attempts — no
            // request was sent.
            println!("{message}");
            Ok(None)
        }
        Err(error) => {
            let warning = session.record_failure()?;
            match warning {
                FailureWarning::Generic => {
                    if let ClientError::UnexpectedStatus { message, .. } = &error {
                        if message.is_empty() {
                            println!("{}", FailureWarning::Generic.message());
                        } else {
                            println!("{message}");
                        }
                    } else {
                        println!("{}", FailureWarning::Generic.message());
                    }
                }
                other => println!("{}", other.message()),
            }
            Ok(None)
        }
    }
}
