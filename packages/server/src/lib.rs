#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the BillionEye application.
//!
//! Serves the `backend/...` REST contract consumed by the incident-reporting
//! front end — agency auth, the agency dashboard, event status mutations,
//! ground-staff management, and capture uploads — plus the pre-built SPA
//! under the `/billioneye` prefix with an `index.html` fallback for
//! client-side routes. An optional plain-HTTP listener answers every request
//! with a 301 to the HTTPS equivalent URL.

pub mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::dev::{ServiceRequest, ServiceResponse, fn_service};
use actix_web::{App, HttpServer, middleware, web};
use billion_eye_database::db;
use billion_eye_storage::ImageStore;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// `SQLite` database connection.
    pub db: Arc<dyn Database>,
    /// Incident image store. `None` when the S3 environment is not
    /// configured; uploads then record a relative image path for the CDN to
    /// resolve later.
    pub images: Option<Arc<ImageStore>>,
}

/// Registers the `backend/...` API routes on an app.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/backend")
            .route("/health", web::get().to(handlers::health))
            .route("/agency/login", web::post().to(handlers::login))
            .route("/agency/logout", web::post().to(handlers::logout))
            .route(
                "/agency/addgroundstaff",
                web::post().to(handlers::add_ground_staff),
            )
            .route("/agency", web::post().to(handlers::create_agency))
            .route("/agencies", web::get().to(handlers::list_agencies))
            .route(
                "/agencies/{agency_id}",
                web::put().to(handlers::update_agency),
            )
            .route(
                "/agencies/{agency_id}",
                web::delete().to(handlers::delete_agency),
            )
            .route(
                "/agency-dashboard/{agency_id}",
                web::get().to(handlers::dashboard),
            )
            .route(
                "/event-report/{event_id}",
                web::get().to(handlers::event_report),
            )
            .route(
                "/events/status/{event_id}",
                web::put().to(handlers::update_event_status),
            )
            .route(
                "/user/upload-image",
                web::post().to(handlers::upload_image),
            )
            .route(
                "/{agency_id}/groundstaff",
                web::get().to(handlers::ground_staff),
            ),
    );
}

/// Starts the BillionEye API server.
///
/// Opens the database, probes the image-store environment, and starts the
/// Actix-Web HTTP server. When `REDIRECT_HTTP_PORT` is set, a second plain
/// HTTP listener is started alongside that 301-redirects everything to the
/// HTTPS equivalent URL (TLS termination itself is handled in front of this
/// process).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Opening database...");
    let db_conn = db::open_from_env()
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let images = match ImageStore::from_env() {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            log::warn!("Image store not configured ({e}); storing relative image paths");
            None
        }
    };

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
        images,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);
    let redirect_port: Option<u16> = std::env::var("REDIRECT_HTTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok());
    let dist_dir = std::env::var("SPA_DIST_DIR").unwrap_or_else(|_| "build".to_string());

    log::info!("Starting server on {bind_addr}:{port}");

    let api_dist = dist_dir.clone();
    let api = HttpServer::new(move || {
        let cors = Cors::permissive();
        let dist = api_dist.clone();
        let index = format!("{dist}/index.html");

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve the pre-built SPA; unknown paths under the prefix fall
            // back to index.html so client-side routing keeps working.
            .service(
                Files::new("/billioneye", dist)
                    .index_file("index.html")
                    .default_handler(fn_service(move |req: ServiceRequest| {
                        let index = index.clone();
                        async move {
                            let (req, _) = req.into_parts();
                            let file = NamedFile::open_async(&index).await?;
                            let res = file.into_response(&req);
                            Ok(ServiceResponse::new(req, res))
                        }
                    })),
            )
    })
    .bind((bind_addr.clone(), port))?
    .run();

    if let Some(redirect_port) = redirect_port {
        log::info!("Starting HTTP->HTTPS redirect listener on {bind_addr}:{redirect_port}");
        let redirect = HttpServer::new(|| {
            App::new().default_service(web::to(handlers::redirect_to_https))
        })
        .bind((bind_addr, redirect_port))?
        .run();

        futures::try_join!(api, redirect)?;
        Ok(())
    } else {
        api.await
    }
}
