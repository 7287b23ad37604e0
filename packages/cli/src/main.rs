#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive operator console for BillionEye.
//!
//! Walks an agency operator through the same flows the web dashboard
//! exposes: login (with the client-side attempt throttle), the event
//! dashboard with its three status tabs, the event-report detail view with
//! ground-staff assignment, staff onboarding, citizen capture submission,
//! and the admin agency manager.

mod admin;
mod capture;
mod dashboard;
mod event_report;
mod login;
mod onboarding;

use billion_eye_client::ApiClient;
use billion_eye_session::SessionStore;
use dialoguer::Select;

/// Top-level flow selection for the operator console.
enum Flow {
    AgencyLogin,
    Dashboard,
    OnboardStaff,
    SubmitCapture,
    AdminAgencies,
}

impl Flow {
    const ALL: &[Self] = &[
        Self::AgencyLogin,
        Self::Dashboard,
        Self::OnboardStaff,
        Self::SubmitCapture,
        Self::AdminAgencies,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::AgencyLogin => "Agency login",
            Self::Dashboard => "Event dashboard",
            Self::OnboardStaff => "Onboard ground staff",
            Self::SubmitCapture => "Submit a captured incident",
            Self::AdminAgencies => "Admin: manage agencies",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    println!("BillionEye Operator Console");
    println!();

    let client = ApiClient::from_env();
    let mut session = SessionStore::load_from_env()?;

    let labels: Vec<&str> = Flow::ALL.iter().map(Flow::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Flow::ALL[idx] {
        Flow::AgencyLogin => {
            if let Some(agency_id) = login::run(&client, &mut session).await? {
                dashboard::run(&client, &mut session, &agency_id).await?;
            }
        }
        Flow::Dashboard => {
            let Some(agency_id) = require_login(&session) else {
                return Ok(());
            };
            dashboard::run(&client, &mut session, &agency_id).await?;
        }
        Flow::OnboardStaff => {
            let Some(agency_id) = require_login(&session) else {
                return Ok(());
            };
            onboarding::run(&client, &agency_id).await?;
        }
        Flow::SubmitCapture => capture::run(&client).await?,
        Flow::AdminAgencies => admin::run(&client).await?,
    }

    Ok(())
}

/// Route guard: flows behind the dashboard require a stored token.
///
/// The token itself carries no agency id, so the operator is asked for it —
/// the web client had it in the URL.
fn require_login(session: &SessionStore) -> Option<String> {
    if session.token().is_none() {
        println!("You are not logged in. Run the agency login flow first.");
        return None;
    }

    dialoguer::Input::<String>::new()
        .with_prompt("Agency id")
        .interact_text()
        .ok()
        .filter(|value| !value.trim().is_empty())
}
