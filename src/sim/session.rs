//! Game-state controller: one level, the catapult, live shots and scoring
//!
//! Tick order: physics step, impact routing, aim/fire input, entity
//! updates, projectile updates with proximity scoring, outcome check.
//! All timing (settle delay, projectile lifetime) is explicit state
//! advanced here; nothing is scheduled.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::building::BuildingCategory;
use super::catapult::{AimInput, Catapult};
use super::entity::SimContext;
use super::layouts::LevelPlan;
use super::level::{Level, LevelEvent};
use super::projectile::{Projectile, SpentReason};
use super::scoring::ShotTally;
use super::target::TargetKind;
use super::trajectory::{Trajectory, TrajectoryConfig};
use super::world::World;
use crate::consts::MAX_FRAME_DT;
use crate::error::LeaderboardError;
use crate::leaderboard::{
    HttpMethod, HttpRequest, LeaderboardEntry, LeaderboardPage, LeaderboardReply, Nickname, Outbox,
    RenameRequest, SubmitScoreRequest, parse_reply,
};
use crate::persistence::SaveStore;
use crate::progress::ProgressBook;
use crate::scene::SceneSink;
use crate::tuning::Tuning;

/// Where the catapult stands
pub const CATAPULT_POSITION: Vec3 = Vec3::ZERO;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held aim/power keys
    pub aim: AimInput,
    /// Fire (ignored unless aiming with ammo left)
    pub fire: bool,
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to fire
    Aiming,
    /// At least one projectile is live
    InFlight,
    /// Shot resolved; letting debris come to rest
    Settling { remaining: f32 },
    Won,
    Lost,
}

impl GamePhase {
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Things the UI layer reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickEvent {
    ShotFired { shots_fired: u32, ammo_left: u32 },
    /// A shot passed within hit range of targets this tick
    TargetsHit { hits: u32, destroyed: u32 },
    BuildingDestroyed { category: BuildingCategory, score_value: f32 },
    TargetDestroyed { kind: TargetKind },
    LevelWon { level: u32, score: f32, improved: bool },
    LevelLost { level: u32 },
    SaveFailed { reason: String },
}

pub struct GameSession<S: SceneSink> {
    world: World,
    scene: S,
    level: Level,
    catapult: Catapult,
    projectiles: Vec<Projectile>,
    tally: ShotTally,
    phase: GamePhase,
    tuning: Tuning,
    base_seed: u64,
    progress: ProgressBook,
    store: Box<dyn SaveStore>,
    nickname: Option<Nickname>,
    outbox: Outbox,
    /// Latest top-N page the host fed back
    leaderboard_page: Option<LeaderboardPage>,
    /// This device's entry as the service last reported it
    leaderboard_entry: Option<LeaderboardEntry>,
}

impl<S: SceneSink> std::fmt::Debug for GameSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("level", &self.level)
            .field("phase", &self.phase)
            .field("tally", &self.tally)
            .field("projectiles", &self.projectiles.len())
            .finish()
    }
}

impl<S: SceneSink> GameSession<S> {
    /// Start at level 1 with progress loaded from `store`
    pub fn new(base_seed: u64, tuning: Tuning, scene: S, store: Box<dyn SaveStore>) -> Self {
        let progress = ProgressBook::load_or_default(store.as_ref());
        let mut world = World::default();
        let level = Level::new(1, base_seed, &mut world, &tuning);
        let catapult = Catapult::new(CATAPULT_POSITION, &tuning);
        let mut session = Self {
            world,
            scene,
            level,
            catapult,
            projectiles: Vec::new(),
            tally: ShotTally::default(),
            phase: GamePhase::Aiming,
            tuning,
            base_seed,
            progress,
            store,
            nickname: None,
            outbox: Outbox::new(),
            leaderboard_page: None,
            leaderboard_entry: None,
        };
        session.load_level(1);
        session
    }

    // === Accessors ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_index(&self) -> u32 {
        self.level.index()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn catapult(&self) -> &Catapult {
        &self.catapult
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn tally(&self) -> &ShotTally {
        &self.tally
    }

    pub fn score(&self) -> f32 {
        self.tally.score()
    }

    pub fn remaining_targets(&self) -> usize {
        self.level.remaining_targets()
    }

    pub fn ammo(&self) -> u32 {
        self.catapult.ammo
    }

    pub fn progress(&self) -> &ProgressBook {
        &self.progress
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Preview path for the current aim, using the world's gravity
    pub fn trajectory(&self) -> Trajectory {
        self.catapult
            .preview(self.world.gravity(), TrajectoryConfig::from(&self.tuning))
    }

    /// Aim directly (pointer / touch input). Clamped.
    pub fn set_aim(&mut self, yaw: f32, pitch: f32, power: f32) {
        self.catapult.aim(yaw, pitch);
        self.catapult.set_power(power);
    }

    // === Level transitions ===

    /// Tear down the current level and start `index`
    pub fn load_level(&mut self, index: u32) {
        self.begin_level(index);
        let mut ctx = SimContext::new(&mut self.world, &mut self.scene);
        self.level.load(&mut ctx);
        self.catapult.reload(self.level.ammo());
    }

    /// Start `index` with hand-placed content instead of its stored layout
    pub fn load_plan(&mut self, index: u32, plan: &LevelPlan) {
        self.begin_level(index);
        let mut ctx = SimContext::new(&mut self.world, &mut self.scene);
        self.level.load_plan(plan, &mut ctx);
        self.catapult.reload(self.level.ammo());
    }

    fn begin_level(&mut self, index: u32) {
        let mut ctx = SimContext::new(&mut self.world, &mut self.scene);
        for projectile in &mut self.projectiles {
            projectile.despawn(SpentReason::Removed, &mut ctx);
        }
        self.projectiles.clear();
        self.level.clear(&mut ctx);

        self.level = Level::new(index, self.base_seed, &mut self.world, &self.tuning);
        self.tally = ShotTally::default();
        self.phase = GamePhase::Aiming;
        self.progress.record_attempt(index);
    }

    pub fn restart_level(&mut self) {
        self.load_level(self.level.index());
    }

    pub fn next_level(&mut self) {
        self.load_level(self.level.index().saturating_add(1));
    }

    // === Leaderboard ===

    /// Set the tag used for automatic submissions after each win
    pub fn set_nickname(&mut self, raw: &str) -> Result<(), LeaderboardError> {
        self.nickname = Some(Nickname::parse(raw)?);
        Ok(())
    }

    /// Queue a submission of the current totals
    pub fn submit_score(&mut self) -> Result<(), LeaderboardError> {
        let nickname = self
            .nickname
            .clone()
            .ok_or(LeaderboardError::InvalidNickname {
                reason: "no nickname set",
            })?;
        let request = SubmitScoreRequest::new(
            nickname,
            self.progress.total_stats(),
            self.progress.device_id(),
        )?;
        self.outbox.submit(&request)
    }

    /// Queue a fetch of the best `limit` entries
    pub fn request_top(&mut self, limit: u32) {
        self.outbox.fetch_top(limit);
    }

    /// Change the tag on this device's entry; later submissions use it too
    pub fn rename(&mut self, raw: &str) -> Result<(), LeaderboardError> {
        let nickname = Nickname::parse(raw)?;
        self.outbox.rename(&RenameRequest {
            device_id: self.progress.device_id().to_string(),
            new_nickname: nickname.clone(),
        })?;
        self.nickname = Some(nickname);
        Ok(())
    }

    pub fn take_requests(&mut self) -> Vec<HttpRequest> {
        self.outbox.drain()
    }

    /// Feed back the host's answer to a drained request. A status of 0 means
    /// the request never got a response.
    pub fn handle_leaderboard_response(
        &mut self,
        method: HttpMethod,
        status: u16,
        body: &str,
    ) -> Result<LeaderboardReply, LeaderboardError> {
        let reply = parse_reply(method, status, body).inspect_err(|e| {
            log::warn!("leaderboard {method:?} failed: {e}");
        })?;
        match &reply {
            LeaderboardReply::Submitted(response) => {
                log::info!(
                    "leaderboard accepted score (improved: {}, new player: {})",
                    response.improved,
                    response.new_player
                );
                if let Some(entry) = &response.entry {
                    self.leaderboard_entry = Some(entry.clone());
                }
            }
            LeaderboardReply::Page(page) => {
                log::debug!("leaderboard page with {} entries", page.entries.len());
                self.leaderboard_page = Some(page.clone());
            }
            LeaderboardReply::Renamed(entry) => {
                log::info!("leaderboard entry renamed to {}", entry.nickname);
                self.leaderboard_entry = Some(entry.clone());
            }
        }
        Ok(reply)
    }

    pub fn leaderboard_page(&self) -> Option<&LeaderboardPage> {
        self.leaderboard_page.as_ref()
    }

    pub fn leaderboard_entry(&self) -> Option<&LeaderboardEntry> {
        self.leaderboard_entry.as_ref()
    }

    // === Tick ===

    /// Advance one frame. `dt` is clamped to [`MAX_FRAME_DT`].
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> Vec<TickEvent> {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        let mut events = Vec::new();

        self.world.step(dt);
        {
            let mut ctx = SimContext::new(&mut self.world, &mut self.scene);
            self.level.apply_impacts(&mut ctx);
        }

        if self.phase == GamePhase::Aiming {
            self.catapult.adjust(input.aim, dt);
            if input.fire {
                self.fire(&mut events);
            }
        }

        let mut ctx = SimContext::new(&mut self.world, &mut self.scene);
        self.level.update(dt, &mut ctx);
        for projectile in &mut self.projectiles {
            if projectile.is_active() {
                let report = self.level.check_collisions(projectile, &mut ctx);
                if report.hits > 0 {
                    events.push(TickEvent::TargetsHit {
                        hits: report.hits,
                        destroyed: report.destroyed,
                    });
                }
                projectile.update(dt, &mut ctx);
            }
        }
        self.projectiles.retain(Projectile::is_active);

        for event in self.level.drain_events() {
            events.push(self.score_event(event));
        }

        self.advance_phase(dt, &mut events);
        events
    }

    fn fire(&mut self, events: &mut Vec<TickEvent>) {
        let Some((position, velocity)) = self.catapult.take_shot() else {
            return;
        };
        let mut ctx = SimContext::new(&mut self.world, &mut self.scene);
        self.projectiles.push(Projectile::spawn(
            position,
            velocity,
            self.tuning.projectile_radius,
            self.tuning.projectile_mass,
            self.tuning.projectile_ttl,
            &mut ctx,
        ));
        self.tally.record_shot();
        self.phase = GamePhase::InFlight;
        log::debug!(
            "shot {} fired at {:.1} m/s, {} left",
            self.tally.shots_fired,
            self.catapult.power,
            self.catapult.ammo
        );
        events.push(TickEvent::ShotFired {
            shots_fired: self.tally.shots_fired,
            ammo_left: self.catapult.ammo,
        });
    }

    fn score_event(&mut self, event: LevelEvent) -> TickEvent {
        match event {
            LevelEvent::BuildingDestroyed {
                category,
                score_value,
                ..
            } => {
                self.tally.record_obstacle(score_value);
                TickEvent::BuildingDestroyed {
                    category,
                    score_value,
                }
            }
            LevelEvent::TargetDestroyed { kind, .. } => {
                self.tally.record_target();
                TickEvent::TargetDestroyed { kind }
            }
        }
    }

    fn advance_phase(&mut self, dt: f32, events: &mut Vec<TickEvent>) {
        if self.phase.is_over() {
            return;
        }
        if self.level.remaining_targets() == 0 {
            self.win(events);
            return;
        }
        match self.phase {
            GamePhase::InFlight if self.projectiles.is_empty() => {
                self.phase = GamePhase::Settling {
                    remaining: self.tuning.settle_delay,
                };
            }
            GamePhase::Settling { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = GamePhase::Settling { remaining };
                } else if self.catapult.has_ammo() {
                    self.phase = GamePhase::Aiming;
                } else {
                    self.lose(events);
                }
            }
            _ => {}
        }
    }

    fn win(&mut self, events: &mut Vec<TickEvent>) {
        let index = self.level.index();
        let score = self.tally.score();
        self.phase = GamePhase::Won;
        log::info!(
            "level {index} won: score {score:.1} ({} shots)",
            self.tally.shots_fired
        );

        let improved = self.progress.update_level(
            index,
            score,
            self.tally.targets_destroyed,
            self.tally.obstacles_destroyed,
            self.tally.shots_fired,
        );
        if let Err(e) = self.progress.save(self.store.as_mut()) {
            log::warn!("failed to save progress: {e}");
            events.push(TickEvent::SaveFailed {
                reason: e.to_string(),
            });
        }
        if self.nickname.is_some()
            && let Err(e) = self.submit_score()
        {
            log::warn!("leaderboard submission not queued: {e}");
        }
        events.push(TickEvent::LevelWon {
            level: index,
            score,
            improved,
        });
    }

    fn lose(&mut self, events: &mut Vec<TickEvent>) {
        let index = self.level.index();
        self.phase = GamePhase::Lost;
        log::info!(
            "level {index} lost with {} targets standing",
            self.level.remaining_targets()
        );
        events.push(TickEvent::LevelLost { level: index });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PHYSICS_DT;
    use crate::persistence::MemoryStore;
    use crate::scene::RecordingScene;

    fn session() -> GameSession<RecordingScene> {
        GameSession::new(
            42,
            Tuning::default(),
            RecordingScene::new(),
            Box::new(MemoryStore::new()),
        )
    }

    #[test]
    fn test_starts_aiming_on_level_one() {
        let s = session();
        assert_eq!(s.phase(), GamePhase::Aiming);
        assert_eq!(s.level_index(), 1);
        assert_eq!(s.ammo(), 5);
        assert!(s.remaining_targets() > 0);
        assert_eq!(s.world().collision_callback_count(), 1);
        assert_eq!(s.progress().level_data(1).unwrap().attempts, 1);
    }

    #[test]
    fn test_fire_consumes_ammo_once_per_flight() {
        let mut s = session();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        let events = s.tick(PHYSICS_DT, &fire);
        assert_eq!(
            events,
            vec![TickEvent::ShotFired {
                shots_fired: 1,
                ammo_left: 4
            }]
        );
        assert_eq!(s.phase(), GamePhase::InFlight);

        // Fire is ignored while the shot is in the air
        s.tick(PHYSICS_DT, &fire);
        assert_eq!(s.ammo(), 4);
        assert_eq!(s.tally().shots_fired, 1);
    }

    #[test]
    fn test_next_level_saturates() {
        let mut s = session();
        s.load_level(u32::MAX);
        s.next_level();
        assert_eq!(s.level_index(), u32::MAX);
        assert_eq!(s.world().collision_callback_count(), 1);
    }

    #[test]
    fn test_transitions_keep_one_handler() {
        let mut s = session();
        s.next_level();
        assert_eq!(s.level_index(), 2);
        s.restart_level();
        s.load_level(9);
        assert_eq!(s.world().collision_callback_count(), 1);
        assert_eq!(s.progress().level_data(2).unwrap().attempts, 2);
    }

    #[test]
    fn test_restart_releases_old_bodies() {
        let mut s = session();
        let bodies = s.world().body_count();
        let renders = s.scene().live_count();
        s.tick(
            PHYSICS_DT,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        s.restart_level();
        assert_eq!(s.world().body_count(), bodies);
        assert_eq!(s.scene().live_count(), renders);
        assert_eq!(s.ammo(), 5);
        assert_eq!(s.tally().shots_fired, 0);
    }

    #[test]
    fn test_huge_frame_is_clamped() {
        let mut s = session();
        s.tick(5.0, &TickInput::default());
        assert_eq!(s.world().substeps_total(), crate::consts::MAX_SUBSTEPS as u64);
        s.tick(f32::NAN, &TickInput::default());
        assert_eq!(s.world().substeps_total(), crate::consts::MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_submission_requires_nickname() {
        let mut s = session();
        assert!(s.submit_score().is_err());
        assert!(s.set_nickname("no").is_err());
        s.set_nickname("abc").unwrap();
        s.submit_score().unwrap();
        let sent = s.take_requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.as_deref().unwrap().contains("\"nickname\":\"ABC\""));
    }
}
