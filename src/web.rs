//! Browser host bindings
//!
//! The JS side owns the canvas, DOM and network. It calls `tick` from
//! `requestAnimationFrame`, mirrors the render nodes, sends whatever
//! `take_leaderboard_requests` hands back and returns each answer through
//! `handle_leaderboard_response`.

use wasm_bindgen::prelude::*;

use crate::leaderboard::HttpMethod;
use crate::persistence::{LocalStorageStore, PROGRESS_KEY};
use crate::scene::RecordingScene;
use crate::sim::{GameSession, TickEvent, TickInput};
use crate::tuning::Tuning;

/// Floats per entry in [`WebGame::body_transforms`]
pub const TRANSFORM_STRIDE: usize = 8;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebGame {
    session: GameSession<RecordingScene>,
    input: TickInput,
    last_events: Vec<TickEvent>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebGame {
        let store = LocalStorageStore::new(PROGRESS_KEY);
        let session = GameSession::new(seed, Tuning::default(), RecordingScene::new(), Box::new(store));
        log::info!("castle catapult ready (seed {seed})");
        WebGame {
            session,
            input: TickInput::default(),
            last_events: Vec::new(),
        }
    }

    /// Replace the balance values with a JSON tuning file; restarts the level
    pub fn with_tuning(seed: u64, json: &str) -> Result<WebGame, JsValue> {
        let tuning = Tuning::from_json(json).map_err(to_js_error)?;
        let store = LocalStorageStore::new(PROGRESS_KEY);
        Ok(WebGame {
            session: GameSession::new(seed, tuning, RecordingScene::new(), Box::new(store)),
            input: TickInput::default(),
            last_events: Vec::new(),
        })
    }

    /// Advance one frame; returns this frame's events as JSON
    pub fn tick(&mut self, dt_ms: f64) -> String {
        let input = self.input;
        self.input.fire = false;
        self.last_events = self.session.tick((dt_ms / 1000.0) as f32, &input);
        serde_json::to_string(&self.last_events).unwrap_or_else(|e| {
            log::warn!("could not encode tick events: {e}");
            "[]".to_string()
        })
    }

    pub fn aim(&mut self, yaw: f32, pitch: f32, power: f32) {
        self.session.set_aim(yaw, pitch, power);
    }

    /// Held-key aim rates for the next ticks (-1..=1 each)
    pub fn hold_aim(&mut self, yaw: f32, pitch: f32, power: f32) {
        self.input.aim.yaw = yaw;
        self.input.aim.pitch = pitch;
        self.input.aim.power = power;
    }

    /// Fire on the next tick
    pub fn fire(&mut self) {
        self.input.fire = true;
    }

    pub fn remaining_targets(&self) -> u32 {
        self.session.remaining_targets() as u32
    }

    pub fn ammo(&self) -> u32 {
        self.session.ammo()
    }

    pub fn score(&self) -> f32 {
        self.session.score()
    }

    pub fn level(&self) -> u32 {
        self.session.level_index()
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.session.phase())
    }

    /// Preview path as flat xyz triples
    pub fn trajectory(&self) -> Vec<f32> {
        self.session.trajectory().to_flat()
    }

    /// `[slot, px, py, pz, qx, qy, qz, qw]` per body
    pub fn body_transforms(&self) -> Vec<f32> {
        let world = self.session.world();
        let mut out = Vec::with_capacity(world.body_count() * TRANSFORM_STRIDE);
        for (handle, body) in world.bodies() {
            out.push(handle.index() as f32);
            out.extend_from_slice(&body.position.to_array());
            out.extend_from_slice(&body.orientation.to_array());
        }
        out
    }

    /// Live render nodes as JSON `[[id, node], ...]`
    pub fn render_nodes(&self) -> String {
        let nodes: Vec<_> = self.session.scene().nodes().collect();
        serde_json::to_string(&nodes).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn restart_level(&mut self) {
        self.session.restart_level();
    }

    pub fn next_level(&mut self) {
        self.session.next_level();
    }

    pub fn load_level(&mut self, index: u32) {
        self.session.load_level(index.max(1));
    }

    pub fn set_nickname(&mut self, nickname: &str) -> Result<(), JsValue> {
        self.session.set_nickname(nickname).map_err(to_js_error)
    }

    pub fn submit_score(&mut self) -> Result<(), JsValue> {
        self.session.submit_score().map_err(to_js_error)
    }

    /// Queue a fetch of the top `limit` entries
    pub fn request_top(&mut self, limit: u32) {
        self.session.request_top(limit);
    }

    pub fn rename(&mut self, nickname: &str) -> Result<(), JsValue> {
        self.session.rename(nickname).map_err(to_js_error)
    }

    /// Hand back the answer to a request from `take_leaderboard_requests`.
    /// Pass status 0 when the fetch itself failed. Returns the parsed reply as JSON.
    pub fn handle_leaderboard_response(&mut self, method: &str, status: u16, body: &str) -> Result<String, JsValue> {
        let method = HttpMethod::parse(method).ok_or_else(|| to_js_error(format!("unknown method {method}")))?;
        let reply = self
            .session
            .handle_leaderboard_response(method, status, body)
            .map_err(to_js_error)?;
        serde_json::to_string(&reply).map_err(to_js_error)
    }

    /// Pending HTTP requests as JSON; the queue is emptied
    pub fn take_leaderboard_requests(&mut self) -> String {
        let requests = self.session.take_requests();
        serde_json::to_string(&requests).unwrap_or_else(|e| {
            log::warn!("could not encode leaderboard requests: {e}");
            "[]".to_string()
        })
    }

    /// Aggregate totals as JSON `{totalScore, levelsCompleted}`
    pub fn total_stats(&self) -> String {
        serde_json::to_string(&self.session.progress().total_stats()).unwrap_or_default()
    }
}
