//! Castle Catapult entry point
//!
//! The browser build starts from `web::start` in the library; this binary
//! plays levels headless with a simple auto-aimer, answers its leaderboard
//! traffic from an in-process book, and logs the outcome.

#[cfg(not(target_arch = "wasm32"))]
use castle_catapult::{
    consts::PHYSICS_DT,
    leaderboard::{LeaderboardBook, LeaderboardReply},
    persistence::MemoryStore,
    scene::NullScene,
    sim::{GamePhase, GameSession, TickEvent, TickInput},
    tuning::Tuning,
};

/// Ticks allowed per level before the demo gives up
#[cfg(not(target_arch = "wasm32"))]
const MAX_TICKS: u32 = 60 * 180;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);
    let levels: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    let nickname = args.next();
    let tuning = match std::env::var("CATAPULT_TUNING") {
        Ok(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("ignoring tuning file {path}: {e}");
                Tuning::default()
            }
        },
        Err(_) => Tuning::default(),
    };

    log::info!("Castle Catapult (native) - seed {seed}, {levels} levels");
    let mut session = GameSession::new(seed, tuning, NullScene::default(), Box::new(MemoryStore::new()));
    if let Some(nickname) = nickname.as_deref()
        && let Err(e) = session.set_nickname(nickname)
    {
        log::warn!("not submitting scores: {e}");
    }
    let mut book = LeaderboardBook::new();

    for _ in 0..levels {
        play_level(&mut session);
        serve_leaderboard(&mut session, &mut book);
        if session.phase() != GamePhase::Won {
            break;
        }
        session.next_level();
    }

    let stats = session.progress().total_stats();
    log::info!(
        "done: {} levels completed, total score {:.1}",
        stats.levels_completed,
        stats.total_score
    );

    session.request_top(5);
    serve_leaderboard(&mut session, &mut book);
    if let Some(page) = session.leaderboard_page() {
        for (rank, entry) in page.entries.iter().enumerate() {
            log::info!("#{} {} {:.1}", rank + 1, entry.nickname, entry.total_score);
        }
    }
}

/// Answer queued leaderboard requests locally, as a host would over HTTP
#[cfg(not(target_arch = "wasm32"))]
fn serve_leaderboard(session: &mut GameSession<NullScene>, book: &mut LeaderboardBook) {
    for request in session.take_requests() {
        let (status, body) = book.serve(&request);
        match session.handle_leaderboard_response(request.method, status, &body) {
            Ok(LeaderboardReply::Submitted(response)) if response.improved => {
                log::info!("leaderboard best improved");
            }
            Ok(_) => {}
            Err(e) => log::warn!("leaderboard: {e}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn play_level(session: &mut GameSession<NullScene>) {
    for _ in 0..MAX_TICKS {
        let mut input = TickInput::default();
        if session.phase() == GamePhase::Aiming {
            auto_aim(session);
            input.fire = true;
        }
        for event in session.tick(PHYSICS_DT, &input) {
            match event {
                TickEvent::TargetDestroyed { kind } => log::info!("  {} down", kind.tag()),
                TickEvent::BuildingDestroyed { category, .. } => log::info!("  {category} smashed"),
                TickEvent::LevelWon { level, score, .. } => {
                    log::info!("level {level} won with score {score:.1}");
                }
                TickEvent::LevelLost { level } => log::info!("level {level} lost"),
                _ => {}
            }
        }
        if session.phase().is_over() {
            return;
        }
    }
    log::warn!("level {} did not finish", session.level_index());
}

/// Point at the nearest live target and pick the power whose preview lands closest
#[cfg(not(target_arch = "wasm32"))]
fn auto_aim(session: &mut GameSession<NullScene>) {
    let origin = session.catapult().position;
    let Some(target) = session
        .level()
        .targets()
        .iter()
        .filter(|t| !t.is_destroyed())
        .map(|t| t.position())
        .min_by(|a, b| a.distance(origin).total_cmp(&b.distance(origin)))
    else {
        return;
    };

    let offset = target - origin;
    let yaw = (-offset.z).atan2(offset.x);
    let pitch = 0.7;
    let tuning = session.tuning().clone();

    let mut best = (f32::MAX, tuning.min_power);
    let mut power = tuning.min_power;
    while power <= tuning.max_power {
        session.set_aim(yaw, pitch, power);
        if let Some(landing) = session.trajectory().landing {
            let d = landing - target;
            let miss = (d.x * d.x + d.z * d.z).sqrt();
            if miss < best.0 {
                best = (miss, power);
            }
        }
        power += 0.25;
    }
    session.set_aim(yaw, pitch, best.1);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is castle_catapult::web::start
}
