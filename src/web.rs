use std::collections::HashMap;
use std::sync::Mutex;

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::error::RotationError;
use crate::request::{resolve_court_sizes, validate_request, ScheduleRequest};
use crate::roster::parse_roster_csv;
use crate::rotation::{build_schedule, ChallengeCourt, LedgerState, Schedule, SessionConfig};

/// Shared service state. Each request builds with its own ledger; the only
/// cross-request state is the per-session stores and the uploaded roster,
/// all keyed explicitly.
pub struct AppState {
    pub sessions: Mutex<HashMap<String, LedgerState>>,
    pub challenges: Mutex<HashMap<String, ChallengeCourt>>,
    pub roster: Mutex<Option<Vec<String>>>,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    session: Option<String>,
    generated_at: String,
    schedule: Schedule,
}

fn is_admin(session: &Session) -> bool {
    session.get::<bool>("admin").ok().flatten().unwrap_or(false)
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        session.insert("admin", true)?;
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Admin roster upload endpoint (CSV body)
async fn upload_roster(
    session: Session,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    match parse_roster_csv(&body) {
        Ok(players) => {
            info!("roster uploaded with {} players", players.len());
            let count = players.len();
            *state.roster.lock().unwrap() = Some(players);
            Ok(HttpResponse::Ok()
                .json(serde_json::json!({"success": true, "players": count})))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to parse roster: {}", e)
        }))),
    }
}

// Schedule generation endpoint
async fn generate_schedule(
    req: web::Json<ScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if let Err(e) = validate_request(&req) {
        return Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": e})));
    }

    let players = if req.players.is_empty() {
        state.roster.lock().unwrap().clone().unwrap_or_default()
    } else {
        req.players.clone()
    };
    if players.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "No roster: supply players or upload one first"
        })));
    }

    let court_sizes = match resolve_court_sizes(&req) {
        Ok(sizes) => sizes,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "error": e})))
        }
    };
    let mut config = SessionConfig::with_court_sizes(court_sizes, req.rounds);
    config.opponent_scope = req.opponent_scope.unwrap_or_default();
    config.shuffle_seed = req.shuffle_seed;

    // Explicit history wins over whatever the service stored for the session.
    let history = match &req.history {
        Some(supplied) => Some(supplied.clone()),
        None => req
            .session
            .as_ref()
            .and_then(|name| state.sessions.lock().unwrap().get(name).cloned()),
    };

    match build_schedule(&config, &players, history.as_ref()) {
        Ok(schedule) => {
            if let Some(name) = &req.session {
                info!(
                    "session '{}' now at {} recorded rounds",
                    name, schedule.ledger.rounds_recorded
                );
                state
                    .sessions
                    .lock()
                    .unwrap()
                    .insert(name.clone(), schedule.ledger.clone());
            }
            Ok(HttpResponse::Ok().json(ScheduleResponse {
                session: req.session.clone(),
                generated_at: Utc::now().to_rfc3339(),
                schedule,
            }))
        }
        Err(RotationError::Config(e)) => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": e}))),
        Err(err) => {
            error!("schedule generation failed: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "error": err.to_string()})))
        }
    }
}

#[derive(Deserialize)]
pub struct ChallengeStartRequest {
    session: String,
    players: Vec<String>,
    #[serde(default = "default_streak_cap")]
    max_streak: u32,
}

fn default_streak_cap() -> u32 {
    3
}

#[derive(Deserialize)]
pub struct MatchResultRequest {
    winner: String,
}

#[derive(Serialize)]
pub struct ChallengeStateResponse {
    session: String,
    on_court: (String, String),
    bench: Vec<String>,
    matches_played: usize,
}

fn challenge_state(session: &str, court: &ChallengeCourt) -> ChallengeStateResponse {
    let (a, b) = court.on_court();
    ChallengeStateResponse {
        session: session.to_string(),
        on_court: (a.to_string(), b.to_string()),
        bench: court.bench().cloned().collect(),
        matches_played: court.history().len(),
    }
}

// Challenge-court (winner stays) endpoints
async fn start_challenge(
    req: web::Json<ChallengeStartRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.session.trim().is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": "session name must not be empty"})));
    }
    match ChallengeCourt::new(&req.players, req.max_streak) {
        Ok(court) => {
            info!(
                "challenge session '{}' started with {} players",
                req.session,
                req.players.len()
            );
            let response = challenge_state(&req.session, &court);
            state
                .challenges
                .lock()
                .unwrap()
                .insert(req.session.clone(), court);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

async fn record_challenge_result(
    name: web::Path<String>,
    req: web::Json<MatchResultRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut challenges = state.challenges.lock().unwrap();
    let Some(court) = challenges.get_mut(name.as_str()) else {
        return Ok(HttpResponse::NotFound()
            .json(serde_json::json!({"error": "Unknown challenge session"})));
    };
    match court.record_match(&req.winner) {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(snapshot)),
        Err(e) => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

async fn get_challenge(
    name: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let challenges = state.challenges.lock().unwrap();
    match challenges.get(name.as_str()) {
        Some(court) => Ok(HttpResponse::Ok().json(challenge_state(name.as_str(), court))),
        None => Ok(HttpResponse::NotFound()
            .json(serde_json::json!({"error": "Unknown challenge session"}))),
    }
}

// Stored session state endpoint
async fn get_session(
    name: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let sessions = state.sessions.lock().unwrap();
    match sessions.get(name.as_str()) {
        Some(ledger) => Ok(HttpResponse::Ok().json(ledger)),
        None => Ok(HttpResponse::NotFound()
            .json(serde_json::json!({"error": "Unknown session"}))),
    }
}

// Admin session reset endpoint
async fn reset_session(
    name: web::Path<String>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }
    let removed = state.sessions.lock().unwrap().remove(name.as_str());
    Ok(HttpResponse::Ok()
        .json(serde_json::json!({"success": true, "existed": removed.is_some()})))
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn admin_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/admin.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16, admin_password: String) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        sessions: Mutex::new(HashMap::new()),
        challenges: Mutex::new(HashMap::new()),
        roster: Mutex::new(None),
        admin_password,
    });
    let session_key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(
                SessionMiddleware::builder(
                    CookieSessionStore::default(),
                    session_key.clone(),
                )
                .cookie_secure(false)
                .build(),
            )
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/admin", web::get().to(admin_page))
            .route("/api/login", web::post().to(admin_login))
            .route("/api/roster", web::post().to(upload_roster))
            .route("/api/schedule", web::post().to(generate_schedule))
            .route("/api/challenge", web::post().to(start_challenge))
            .route(
                "/api/challenge/{name}/result",
                web::post().to(record_challenge_result),
            )
            .route("/api/challenge/{name}", web::get().to(get_challenge))
            .service(
                web::resource("/api/session/{name}")
                    .route(web::get().to(get_session))
                    .route(web::delete().to(reset_session)),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
