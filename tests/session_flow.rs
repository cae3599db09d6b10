use castle_catapult::consts::PHYSICS_DT;
use castle_catapult::LeaderboardError;
use castle_catapult::leaderboard::{HttpMethod, LeaderboardBook, LeaderboardReply};
use castle_catapult::persistence::MemoryStore;
use castle_catapult::scene::RecordingScene;
use castle_catapult::sim::trajectory::{ground_time, position_at};
use castle_catapult::sim::{
    GamePhase, GameSession, LevelPlan, TargetKind, TargetPlacement, TickEvent, TickInput,
};
use castle_catapult::tuning::Tuning;
use glam::Vec3;

const FIRE: TickInput = TickInput {
    aim: castle_catapult::sim::AimInput {
        yaw: 0.0,
        pitch: 0.0,
        power: 0.0,
    },
    fire: true,
};

fn session(store: MemoryStore) -> GameSession<RecordingScene> {
    GameSession::new(11, Tuning::default(), RecordingScene::new(), Box::new(store))
}

/// A one-shot level with a single basic target standing on the current aim's path
fn plan_on_path(session: &GameSession<RecordingScene>) -> LevelPlan {
    let start = session.catapult().launch_position();
    let velocity = session.catapult().launch_velocity();
    let gravity = session.world().gravity();
    // Time at which the shot passes the target's center height
    let t = ground_time(start - Vec3::Y * 0.8, velocity, gravity).unwrap();
    let p = position_at(start, velocity, gravity, t);
    LevelPlan {
        ammo: 1,
        buildings: Vec::new(),
        targets: vec![TargetPlacement {
            kind: TargetKind::Basic,
            base: Vec3::new(p.x, 0.0, p.z),
        }],
    }
}

fn run_until_over(session: &mut GameSession<RecordingScene>, max_ticks: u32) -> Vec<TickEvent> {
    let mut events = session.tick(PHYSICS_DT, &FIRE);
    for _ in 0..max_ticks {
        if session.phase().is_over() {
            break;
        }
        events.extend(session.tick(PHYSICS_DT, &TickInput::default()));
    }
    events
}

#[test]
fn direct_hit_wins_and_records_best() {
    let mut session = session(MemoryStore::new());
    session.set_nickname("ace").unwrap();
    session.set_aim(-1.0, 0.6, 20.0);
    let plan = plan_on_path(&session);
    session.load_plan(1, &plan);
    assert_eq!(session.remaining_targets(), 1);

    let events = run_until_over(&mut session, 600);

    assert_eq!(session.phase(), GamePhase::Won);
    assert!(events.contains(&TickEvent::TargetDestroyed {
        kind: TargetKind::Basic
    }));
    assert!(events.contains(&TickEvent::LevelWon {
        level: 1,
        score: 100.0,
        improved: true
    }));
    assert!(!events.iter().any(|e| matches!(e, TickEvent::SaveFailed { .. })));

    let record = session.progress().level_data(1).unwrap();
    assert_eq!(record.best_score, 100.0);
    assert_eq!(record.best_targets, 1);
    assert_eq!(record.best_shots, 1);
    assert_eq!(session.progress().total_levels_completed(), 1);

    let requests = session.take_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    let body = requests[0].body.as_deref().unwrap();
    assert!(body.contains("\"totalScore\":100.0"));
    assert!(body.contains("\"nickname\":\"ACE\""));
}

#[test]
fn save_failure_is_reported_not_fatal() {
    let mut session = session(MemoryStore::read_only());
    session.set_aim(-1.0, 0.6, 20.0);
    let plan = plan_on_path(&session);
    session.load_plan(1, &plan);

    let events = run_until_over(&mut session, 600);

    assert_eq!(session.phase(), GamePhase::Won);
    assert!(events.iter().any(|e| matches!(e, TickEvent::SaveFailed { .. })));
    assert_eq!(session.progress().level_data(1).unwrap().best_score, 100.0);
    assert!(session.take_requests().is_empty());
}

#[test]
fn missing_the_last_shot_loses() {
    let mut session = session(MemoryStore::new());
    session.set_aim(0.0, 0.5, 15.0);
    let plan = LevelPlan {
        ammo: 1,
        buildings: Vec::new(),
        targets: vec![TargetPlacement {
            kind: TargetKind::Knight,
            base: Vec3::new(-25.0, 0.0, 0.0),
        }],
    };
    session.load_plan(2, &plan);

    // Projectile TTL (10 s) plus the settle delay bounds the wait
    let events = run_until_over(&mut session, 60 * 14);

    assert_eq!(session.phase(), GamePhase::Lost);
    assert_eq!(events.last(), Some(&TickEvent::LevelLost { level: 2 }));
    assert_eq!(session.remaining_targets(), 1);
    assert!(session.projectiles().is_empty());
    assert!(session.progress().level_data(2).is_some_and(|r| !r.completed));
}

#[test]
fn replaying_levels_does_not_leak() {
    let mut session = session(MemoryStore::new());
    let bodies = session.world().body_count();
    let renders = session.scene().live_count();

    for _ in 0..5 {
        session.tick(PHYSICS_DT, &FIRE);
        for _ in 0..30 {
            session.tick(PHYSICS_DT, &TickInput::default());
        }
        session.next_level();
        session.load_level(1);
    }

    assert_eq!(session.world().body_count(), bodies);
    assert_eq!(session.scene().live_count(), renders);
    assert_eq!(session.world().collision_callback_count(), 1);
}

#[test]
fn same_seed_same_level() {
    let a = session(MemoryStore::new());
    let b = session(MemoryStore::new());
    let layout = |s: &GameSession<RecordingScene>| {
        s.level()
            .targets()
            .iter()
            .map(|t| (t.kind, t.position()))
            .collect::<Vec<_>>()
    };
    assert_eq!(layout(&a), layout(&b));
}

#[test]
fn leaderboard_round_trip_through_local_book() {
    let mut book = LeaderboardBook::new();
    let mut session = session(MemoryStore::new());
    session.set_nickname("ace").unwrap();
    session.set_aim(-1.0, 0.6, 20.0);
    let plan = plan_on_path(&session);
    session.load_plan(1, &plan);
    run_until_over(&mut session, 600);
    assert_eq!(session.phase(), GamePhase::Won);

    session.request_top(10);
    session.rename("bob").unwrap();
    let mut replies = Vec::new();
    for request in session.take_requests() {
        let (status, body) = book.serve(&request);
        assert_eq!(status, 200, "{body}");
        replies.push(session.handle_leaderboard_response(request.method, status, &body));
    }

    assert_eq!(replies.len(), 3);
    assert!(matches!(&replies[0], Ok(LeaderboardReply::Submitted(r)) if r.new_player));
    assert!(matches!(&replies[1], Ok(LeaderboardReply::Page(_))));
    assert!(matches!(&replies[2], Ok(LeaderboardReply::Renamed(_))));

    let page = session.leaderboard_page().unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].nickname, "ACE");
    assert_eq!(page.entries[0].total_score, 100.0);
    assert_eq!(session.leaderboard_entry().unwrap().nickname, "BOB");
    assert_eq!(book.top(1).entries[0].nickname, "BOB");
}

#[test]
fn leaderboard_failures_surface_as_errors() {
    let mut session = session(MemoryStore::new());
    session.request_top(5);
    let fetch = session.take_requests().remove(0);
    assert_eq!(fetch.method, HttpMethod::Get);
    assert_eq!(
        session.handle_leaderboard_response(fetch.method, 0, ""),
        Err(LeaderboardError::Network("no response".into()))
    );
    assert!(session.leaderboard_page().is_none());

    // Nothing was ever submitted from this device
    let mut book = LeaderboardBook::new();
    session.rename("zed").unwrap();
    let rename = session.take_requests().remove(0);
    let (status, body) = book.serve(&rename);
    assert_eq!(status, 404);
    assert!(matches!(
        session.handle_leaderboard_response(rename.method, status, &body),
        Err(LeaderboardError::Rejected(_))
    ));
    assert!(session.leaderboard_entry().is_none());

    assert!(session.rename("a1").is_err());
    assert!(session.take_requests().is_empty());
}

#[test]
fn direct_hit_reports_proximity_hits() {
    let mut session = session(MemoryStore::new());
    session.set_aim(-1.0, 0.6, 20.0);
    let plan = plan_on_path(&session);
    session.load_plan(1, &plan);

    let events = run_until_over(&mut session, 600);

    assert!(events.contains(&TickEvent::TargetsHit {
        hits: 1,
        destroyed: 1
    }));
}
