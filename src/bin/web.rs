//! Single binary web server: JSON API over in-memory scheduling sessions.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use badminton_court_scheduler::models::clamp_skill;
use badminton_court_scheduler::{
    apply_settings, finish_game, parse_roster, replan, set_player_enabled, skip_player,
    start_next_game, username_for, CourtId, Gender, Player, Session, SessionId, SessionSettings,
    Timestamp,
};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-session entry: session data + last activity time (for auto-cleanup).
struct SessionEntry {
    session: Session,
    last_activity: Instant,
}

/// In-memory state: many sessions by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<SessionId, SessionEntry>>>;

/// Inactivity threshold: sessions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

type EventResult = Result<(), Box<dyn Error>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    username: Option<String>,
    skill_level: i64,
    #[serde(default)]
    gender: Option<String>,
}

#[derive(Deserialize)]
struct EditPlayerBody {
    name: Option<String>,
    skill_level: Option<i64>,
    /// Empty string clears the gender.
    gender: Option<String>,
}

#[derive(Deserialize)]
struct EnabledBody {
    enabled: bool,
}

#[derive(Deserialize)]
struct SkipBody {
    slot: usize,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

#[derive(Deserialize)]
struct SessionPlayerPath {
    id: SessionId,
    username: String,
}

#[derive(Deserialize)]
struct SessionCourtPath {
    id: SessionId,
    court_id: CourtId,
}

#[derive(Deserialize)]
struct SessionQueuePath {
    id: SessionId,
    index: usize,
}

fn parse_gender(raw: &str) -> Result<Option<Gender>, Box<dyn Error>> {
    Gender::parse(raw).map_err(|value| format!("'{}' is not a gender", value).into())
}

/// Run one event against a session under the write lock and return the updated session.
/// Holding the lock for the whole event keeps planning calls for a session serialized.
fn with_session<F>(state: &AppState, id: SessionId, event: F) -> HttpResponse
where
    F: FnOnce(&mut Session, Timestamp) -> EventResult,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" })),
    };
    entry.last_activity = Instant::now();
    match event(&mut entry.session, Utc::now()) {
        Ok(()) => HttpResponse::Ok().json(&entry.session),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "badminton-court-scheduler",
    })
}

/// Create a new session (returns it with id; client stores id for subsequent requests).
#[post("/api/sessions")]
async fn api_create_session(state: AppState, body: Option<Json<SessionSettings>>) -> HttpResponse {
    let settings = body.map(Json::into_inner).unwrap_or_default();
    let session = match Session::new(settings) {
        Ok(s) => s,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    let id = session.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created session {}", id);
    let entry = g.entry(id).or_insert(SessionEntry {
        session,
        last_activity: Instant::now(),
    });
    HttpResponse::Ok().json(&entry.session)
}

/// Get a session by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/sessions/{id}")]
async fn api_get_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |_, _| Ok(()))
}

/// Load roster text (`name,skill[,gender[,username]]` per line) and add every player.
#[post("/api/sessions/{id}/roster")]
async fn api_load_roster(state: AppState, path: Path<SessionPath>, body: String) -> HttpResponse {
    with_session(&state, path.id, |s, now| {
        let players = parse_roster(&body, &s.players, now)?;
        s.add_players(players)?;
        replan(s, now);
        Ok(())
    })
}

/// Add one player.
#[post("/api/sessions/{id}/players")]
async fn api_add_player(state: AppState, path: Path<SessionPath>, body: Json<AddPlayerBody>) -> HttpResponse {
    let body = body.into_inner();
    with_session(&state, path.id, |s, now| {
        let username = match body.username {
            Some(u) => u,
            None => username_for(&body.name, &s.players),
        };
        let skill = clamp_skill(body.skill_level);
        let mut player = Player::new(body.name, username, skill, now);
        player.gender = parse_gender(body.gender.as_deref().unwrap_or(""))?;
        s.add_player(player)?;
        replan(s, now);
        Ok(())
    })
}

/// Edit a player's name, skill and/or gender.
#[put("/api/sessions/{id}/players/{username}")]
async fn api_edit_player(
    state: AppState,
    path: Path<SessionPlayerPath>,
    body: Json<EditPlayerBody>,
) -> HttpResponse {
    let body = body.into_inner();
    with_session(&state, path.id, |s, now| {
        let gender = body.gender.as_deref().map(parse_gender).transpose()?;
        s.edit_player(&path.username, body.name.as_deref(), body.skill_level, gender)?;
        replan(s, now);
        Ok(())
    })
}

/// Enable or disable a player for this session.
#[put("/api/sessions/{id}/players/{username}/enabled")]
async fn api_set_enabled(
    state: AppState,
    path: Path<SessionPlayerPath>,
    body: Json<EnabledBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s, now| {
        set_player_enabled(s, &path.username, body.enabled, now)?;
        Ok(())
    })
}

/// Replace the session settings.
#[put("/api/sessions/{id}/settings")]
async fn api_set_settings(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<SessionSettings>,
) -> HttpResponse {
    let settings = body.into_inner();
    with_session(&state, path.id, |s, now| {
        apply_settings(s, settings, now)?;
        Ok(())
    })
}

/// Start the next planned game on an empty court.
#[post("/api/sessions/{id}/courts/{court_id}/start")]
async fn api_start_court(state: AppState, path: Path<SessionCourtPath>) -> HttpResponse {
    with_session(&state, path.id, |s, now| {
        start_next_game(s, path.court_id, now)?;
        Ok(())
    })
}

/// Finish the game on a court.
#[post("/api/sessions/{id}/courts/{court_id}/finish")]
async fn api_finish_court(state: AppState, path: Path<SessionCourtPath>) -> HttpResponse {
    with_session(&state, path.id, |s, now| {
        finish_game(s, path.court_id, now)?;
        Ok(())
    })
}

/// Skip one player in a queued court; the best available player takes the slot.
#[post("/api/sessions/{id}/queue/{index}/skip")]
async fn api_skip_player(
    state: AppState,
    path: Path<SessionQueuePath>,
    body: Json<SkipBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s, now| {
        skip_player(s, path.index, body.slot, now)?;
        Ok(())
    })
}

/// Force a full re-plan of the queue.
#[post("/api/sessions/{id}/queue/regenerate")]
async fn api_regenerate_queue(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |s, now| {
        replan(s, now);
        Ok(())
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<SessionId, SessionEntry>::new()));

    // Background task: every 30 minutes, remove sessions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_session)
            .service(api_get_session)
            .service(api_load_roster)
            .service(api_add_player)
            .service(api_edit_player)
            .service(api_set_enabled)
            .service(api_set_settings)
            .service(api_start_court)
            .service(api_finish_court)
            .service(api_skip_player)
            .service(api_regenerate_queue)
    })
    .bind(bind)?
    .run()
    .await
}
