//! Remote leaderboard: wire types, validation and the server's rules
//!
//! The game never awaits the network. Requests are queued in an [`Outbox`]
//! that the host drains and sends; the host hands each response back
//! (method, status, body) and [`parse_reply`] turns it into a `Result`.
//! [`LeaderboardBook`] applies the service's rules in-process and answers
//! the same requests, so headless runs and tests need no server.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::progress::TotalStats;

/// Highest total score the service accepts
pub const MAX_TOTAL_SCORE: f32 = 1_000_000.0;
/// Highest levels-completed count the service accepts
pub const MAX_LEVELS_COMPLETED: u32 = 1000;
/// Page size when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

pub const LEADERBOARD_PATH: &str = "/api/leaderboard";
pub const RENAME_PATH: &str = "/api/leaderboard/nickname";

const NICKNAME_LEN: usize = 3;

/// Three-letter combinations nobody gets to display
const DENYLIST: &[&str] = &[
    "ASS", "CUM", "DIK", "FAG", "FUC", "FUK", "FUX", "JIZ", "KKK", "NAZ", "NIG", "SEX", "SHT",
    "TIT", "WTF",
];

/// Validated player tag: exactly three letters A-Z
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);

impl Nickname {
    /// Upper-cases, then checks length, alphabet and the denylist
    pub fn parse(raw: &str) -> Result<Self, LeaderboardError> {
        let name = raw.trim().to_ascii_uppercase();
        if name.chars().count() != NICKNAME_LEN {
            return Err(LeaderboardError::InvalidNickname {
                reason: "must be exactly 3 letters",
            });
        }
        if !name.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(LeaderboardError::InvalidNickname {
                reason: "only letters A-Z are allowed",
            });
        }
        if DENYLIST.contains(&name.as_str()) {
            return Err(LeaderboardError::InvalidNickname {
                reason: "not allowed",
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = LeaderboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Nickname> for String {
    fn from(value: Nickname) -> Self {
        value.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check a total before it leaves the client (or enters the book)
pub fn validate_score(total_score: f32, levels_completed: u32) -> Result<(), LeaderboardError> {
    if !total_score.is_finite() || !(0.0..=MAX_TOTAL_SCORE).contains(&total_score) {
        return Err(LeaderboardError::ScoreOutOfRange(total_score));
    }
    if levels_completed > MAX_LEVELS_COMPLETED {
        return Err(LeaderboardError::LevelsOutOfRange(levels_completed));
    }
    Ok(())
}

// === Wire types ===

/// `POST /api/leaderboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreRequest {
    pub nickname: Nickname,
    pub total_score: f32,
    pub levels_completed: u32,
    pub device_id: String,
}

impl SubmitScoreRequest {
    pub fn new(
        nickname: Nickname,
        stats: TotalStats,
        device_id: impl Into<String>,
    ) -> Result<Self, LeaderboardError> {
        validate_score(stats.total_score, stats.levels_completed)?;
        Ok(Self {
            nickname,
            total_score: stats.total_score,
            levels_completed: stats.levels_completed,
            device_id: device_id.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub nickname: String,
    pub total_score: f32,
    pub levels_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreResponse {
    pub success: bool,
    #[serde(default)]
    pub entry: Option<LeaderboardEntry>,
    #[serde(default)]
    pub improved: bool,
    #[serde(default)]
    pub new_player: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /api/leaderboard?limit=N`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
}

/// `PATCH /api/leaderboard/nickname`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub device_id: String,
    pub new_nickname: Nickname,
}

/// `PATCH` answer: the entry under its new name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameResponse {
    pub success: bool,
    #[serde(default)]
    pub entry: Option<LeaderboardEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of any failed request
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// A parsed, successful response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LeaderboardReply {
    Submitted(SubmitScoreResponse),
    Page(LeaderboardPage),
    Renamed(LeaderboardEntry),
}

/// Status 0 means the host never got an answer; other non-2xx statuses
/// carry the service's `error` message when it sent one.
fn http_failure(status: u16, body: &str) -> LeaderboardError {
    if status == 0 {
        return LeaderboardError::Network(if body.is_empty() {
            "no response".to_string()
        } else {
            body.to_string()
        });
    }
    log::warn!("leaderboard request failed with HTTP {status}");
    let reason = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("HTTP {status}"));
    LeaderboardError::Rejected(reason)
}

fn decode_response<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, LeaderboardError> {
    serde_json::from_str(body).map_err(|e| {
        log::warn!("malformed leaderboard response: {e}");
        LeaderboardError::MalformedResponse(e.to_string())
    })
}

/// Parse a submit response. Non-2xx statuses and `success: false` are errors.
pub fn parse_submit_response(status: u16, body: &str) -> Result<SubmitScoreResponse, LeaderboardError> {
    if !(200..300).contains(&status) {
        return Err(http_failure(status, body));
    }
    let response: SubmitScoreResponse = decode_response(body)?;
    if !response.success {
        let reason = response.error.unwrap_or_else(|| "unknown".to_string());
        return Err(LeaderboardError::Rejected(reason));
    }
    Ok(response)
}

/// Parse a top-N page
pub fn parse_page(body: &str) -> Result<LeaderboardPage, LeaderboardError> {
    decode_response(body)
}

/// Parse whichever response belongs to a request sent with `method`
pub fn parse_reply(method: HttpMethod, status: u16, body: &str) -> Result<LeaderboardReply, LeaderboardError> {
    match method {
        HttpMethod::Post => parse_submit_response(status, body).map(LeaderboardReply::Submitted),
        _ if !(200..300).contains(&status) => Err(http_failure(status, body)),
        HttpMethod::Get => parse_page(body).map(LeaderboardReply::Page),
        HttpMethod::Patch => {
            let response: RenameResponse = decode_response(body)?;
            match (response.success, response.entry) {
                (true, Some(entry)) => Ok(LeaderboardReply::Renamed(entry)),
                _ => Err(LeaderboardError::Rejected(
                    response.error.unwrap_or_else(|| "unknown".to_string()),
                )),
            }
        }
    }
}

// === Request queue ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    /// Case-insensitive verb name, as the host reports it
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }
}

/// A request for the host to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<String>,
}

/// Fire-and-forget request queue drained by the host
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    pending: Vec<HttpRequest>,
}

fn encode<T: Serialize>(value: &T) -> Result<String, LeaderboardError> {
    serde_json::to_string(value).map_err(|e| LeaderboardError::Encode(e.to_string()))
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, request: &SubmitScoreRequest) -> Result<(), LeaderboardError> {
        self.pending.push(HttpRequest {
            method: HttpMethod::Post,
            path: LEADERBOARD_PATH.to_string(),
            body: Some(encode(request)?),
        });
        Ok(())
    }

    pub fn fetch_top(&mut self, limit: u32) {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        self.pending.push(HttpRequest {
            method: HttpMethod::Get,
            path: format!("{LEADERBOARD_PATH}?limit={limit}"),
            body: None,
        });
    }

    pub fn rename(&mut self, request: &RenameRequest) -> Result<(), LeaderboardError> {
        self.pending.push(HttpRequest {
            method: HttpMethod::Patch,
            path: RENAME_PATH.to_string(),
            body: Some(encode(request)?),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<HttpRequest> {
        std::mem::take(&mut self.pending)
    }
}

// === Server rules ===

#[derive(Debug, Clone)]
struct StoredEntry {
    nickname: Nickname,
    total_score: f32,
    levels_completed: u32,
    /// Insertion order, breaks ties in the ranking
    seq: u64,
}

impl StoredEntry {
    fn to_wire(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            nickname: self.nickname.to_string(),
            total_score: self.total_score,
            levels_completed: self.levels_completed,
        }
    }
}

/// In-process model of the leaderboard service: one entry per device,
/// scores only ever improve, and a tied score may still change the nickname.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardBook {
    entries: HashMap<String, StoredEntry>,
    next_seq: u64,
}

impl LeaderboardBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn submit(&mut self, request: &SubmitScoreRequest) -> Result<SubmitScoreResponse, LeaderboardError> {
        validate_score(request.total_score, request.levels_completed)?;

        let Some(existing) = self.entries.get_mut(&request.device_id) else {
            let entry = StoredEntry {
                nickname: request.nickname.clone(),
                total_score: request.total_score,
                levels_completed: request.levels_completed,
                seq: self.next_seq,
            };
            self.next_seq += 1;
            let wire = entry.to_wire();
            self.entries.insert(request.device_id.clone(), entry);
            return Ok(SubmitScoreResponse {
                success: true,
                entry: Some(wire),
                improved: true,
                new_player: true,
                error: None,
            });
        };

        let improved = request.total_score > existing.total_score;
        if improved {
            existing.total_score = request.total_score;
            existing.levels_completed = request.levels_completed;
            existing.nickname = request.nickname.clone();
        } else if request.total_score == existing.total_score {
            existing.nickname = request.nickname.clone();
        }
        Ok(SubmitScoreResponse {
            success: true,
            entry: Some(existing.to_wire()),
            improved,
            new_player: false,
            error: None,
        })
    }

    pub fn rename(&mut self, request: &RenameRequest) -> Result<LeaderboardEntry, LeaderboardError> {
        let entry = self
            .entries
            .get_mut(&request.device_id)
            .ok_or(LeaderboardError::UnknownDevice)?;
        entry.nickname = request.new_nickname.clone();
        Ok(entry.to_wire())
    }

    /// Answer a queued request the way the service would: `(status, json body)`.
    /// Validation failures are 400, unknown devices and routes 404.
    pub fn serve(&mut self, request: &HttpRequest) -> (u16, String) {
        let result = match request.method {
            HttpMethod::Post if request.path == LEADERBOARD_PATH => decode_request(request)
                .and_then(|r: SubmitScoreRequest| self.submit(&r))
                .and_then(|r| encode(&r)),
            HttpMethod::Get if is_top_path(&request.path) => encode(&self.top(page_limit(&request.path))),
            HttpMethod::Patch if request.path == RENAME_PATH => decode_request(request)
                .and_then(|r: RenameRequest| self.rename(&r))
                .and_then(|entry| {
                    encode(&RenameResponse {
                        success: true,
                        entry: Some(entry),
                        error: None,
                    })
                }),
            _ => return (404, error_body("not found")),
        };
        match result {
            Ok(body) => (200, body),
            Err(e) => {
                let status = if e == LeaderboardError::UnknownDevice { 404 } else { 400 };
                (status, error_body(&e.to_string()))
            }
        }
    }

    /// Best first; ties go to the higher level count, then the earlier entry
    pub fn top(&self, limit: u32) -> LeaderboardPage {
        let limit = limit.clamp(1, MAX_PAGE_SIZE) as usize;
        let mut ranked: Vec<&StoredEntry> = self.entries.values().collect();
        ranked.sort_by(|a, b| {
            b.total_score
                .total_cmp(&a.total_score)
                .then(b.levels_completed.cmp(&a.levels_completed))
                .then(a.seq.cmp(&b.seq))
        });
        LeaderboardPage {
            entries: ranked.into_iter().take(limit).map(StoredEntry::to_wire).collect(),
        }
    }
}

fn decode_request<T: serde::de::DeserializeOwned>(request: &HttpRequest) -> Result<T, LeaderboardError> {
    let body = request
        .body
        .as_deref()
        .ok_or_else(|| LeaderboardError::BadRequest("missing body".to_string()))?;
    serde_json::from_str(body).map_err(|e| LeaderboardError::BadRequest(e.to_string()))
}

fn error_body(message: &str) -> String {
    serde_json::json!({ "success": false, "error": message }).to_string()
}

fn is_top_path(path: &str) -> bool {
    path == LEADERBOARD_PATH
        || path
            .strip_prefix(LEADERBOARD_PATH)
            .is_some_and(|rest| rest.starts_with('?'))
}

/// `limit` query parameter, or the default page size
fn page_limit(path: &str) -> u32 {
    path.split_once('?')
        .into_iter()
        .flat_map(|(_, query)| query.split('&'))
        .find_map(|pair| pair.strip_prefix("limit="))
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nick(s: &str) -> Nickname {
        Nickname::parse(s).unwrap()
    }

    fn request(name: &str, score: f32, device: &str) -> SubmitScoreRequest {
        SubmitScoreRequest {
            nickname: nick(name),
            total_score: score,
            levels_completed: 1,
            device_id: device.to_string(),
        }
    }

    #[test]
    fn test_nickname_rules() {
        assert_eq!(nick("abc").as_str(), "ABC");
        assert_eq!(nick(" xyz ").as_str(), "XYZ");
        assert!(matches!(
            Nickname::parse("AB"),
            Err(LeaderboardError::InvalidNickname { .. })
        ));
        assert!(Nickname::parse("ABCD").is_err());
        assert!(Nickname::parse("A1C").is_err());
        assert!(Nickname::parse("ÄBC").is_err());
        assert_eq!(
            Nickname::parse("kkk"),
            Err(LeaderboardError::InvalidNickname {
                reason: "not allowed"
            })
        );
    }

    #[test]
    fn test_nickname_deserialization_validates() {
        assert!(serde_json::from_str::<Nickname>("\"bob\"").is_ok());
        assert!(serde_json::from_str::<Nickname>("\"bobby\"").is_err());
    }

    #[test]
    fn test_score_validation() {
        assert!(validate_score(0.0, 0).is_ok());
        assert!(validate_score(-1.0, 0).is_err());
        assert!(validate_score(f32::NAN, 0).is_err());
        assert!(validate_score(MAX_TOTAL_SCORE + 1.0, 0).is_err());
        assert_eq!(
            validate_score(10.0, MAX_LEVELS_COMPLETED + 1),
            Err(LeaderboardError::LevelsOutOfRange(MAX_LEVELS_COMPLETED + 1))
        );
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_string(&request("abc", 75.0, "dev-1")).unwrap();
        assert!(json.contains("\"totalScore\":75.0"));
        assert!(json.contains("\"levelsCompleted\":1"));
        assert!(json.contains("\"deviceId\":\"dev-1\""));
        assert!(json.contains("\"nickname\":\"ABC\""));
    }

    #[test]
    fn test_book_keeps_one_entry_per_device() {
        let mut book = LeaderboardBook::new();
        let first = book.submit(&request("AAA", 100.0, "d1")).unwrap();
        assert!(first.new_player && first.improved);

        let worse = book.submit(&request("BBB", 50.0, "d1")).unwrap();
        assert!(!worse.improved && !worse.new_player);
        assert_eq!(worse.entry.as_ref().unwrap().nickname, "AAA");
        assert_eq!(worse.entry.unwrap().total_score, 100.0);

        let tie = book.submit(&request("CCC", 100.0, "d1")).unwrap();
        assert!(!tie.improved);
        assert_eq!(tie.entry.unwrap().nickname, "CCC");

        let better = book.submit(&request("DDD", 120.0, "d1")).unwrap();
        assert!(better.improved);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_top_ordering_and_limit() {
        let mut book = LeaderboardBook::new();
        book.submit(&request("AAA", 10.0, "a")).unwrap();
        book.submit(&request("BBB", 30.0, "b")).unwrap();
        book.submit(&request("CCC", 20.0, "c")).unwrap();
        book.submit(&request("DDD", 30.0, "d")).unwrap();

        let names: Vec<_> = book.top(3).entries.into_iter().map(|e| e.nickname).collect();
        assert_eq!(names, ["BBB", "DDD", "CCC"]);
        assert_eq!(book.top(0).entries.len(), 1);
        assert_eq!(book.top(5000).entries.len(), 4);
    }

    #[test]
    fn test_rename() {
        let mut book = LeaderboardBook::new();
        book.submit(&request("AAA", 10.0, "a")).unwrap();
        let renamed = book
            .rename(&RenameRequest {
                device_id: "a".into(),
                new_nickname: nick("zed"),
            })
            .unwrap();
        assert_eq!(renamed.nickname, "ZED");
        assert_eq!(
            book.rename(&RenameRequest {
                device_id: "nobody".into(),
                new_nickname: nick("zed"),
            }),
            Err(LeaderboardError::UnknownDevice)
        );
    }

    #[test]
    fn test_outbox_requests() {
        let mut outbox = Outbox::new();
        outbox.submit(&request("abc", 5.0, "d")).unwrap();
        outbox.fetch_top(500);
        outbox
            .rename(&RenameRequest {
                device_id: "d".into(),
                new_nickname: nick("xyz"),
            })
            .unwrap();
        let sent = outbox.drain();
        assert!(outbox.is_empty());
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[1].path, "/api/leaderboard?limit=100");
        assert!(sent[1].body.is_none());
        assert_eq!(sent[2].method, HttpMethod::Patch);
        assert!(sent[2].body.as_deref().unwrap().contains("\"newNickname\":\"XYZ\""));
    }

    #[test]
    fn test_parse_submit_response() {
        let ok = r#"{"success":true,"entry":{"nickname":"ABC","totalScore":75.0,"levelsCompleted":2},"improved":true,"newPlayer":false}"#;
        let response = parse_submit_response(200, ok).unwrap();
        assert!(response.improved);
        assert_eq!(response.entry.unwrap().levels_completed, 2);

        assert!(matches!(
            parse_submit_response(500, ok),
            Err(LeaderboardError::Rejected(_))
        ));
        assert!(matches!(
            parse_submit_response(200, "<html>"),
            Err(LeaderboardError::MalformedResponse(_))
        ));
        assert_eq!(
            parse_submit_response(200, r#"{"success":false,"error":"banned"}"#),
            Err(LeaderboardError::Rejected("banned".into()))
        );
    }

    #[test]
    fn test_parse_reply_by_method() {
        let page = r#"{"entries":[]}"#;
        assert_eq!(
            parse_reply(HttpMethod::Get, 200, page),
            Ok(LeaderboardReply::Page(LeaderboardPage::default()))
        );
        let renamed = r#"{"success":true,"entry":{"nickname":"ZED","totalScore":3.0,"levelsCompleted":1}}"#;
        assert!(matches!(
            parse_reply(HttpMethod::Patch, 200, renamed),
            Ok(LeaderboardReply::Renamed(e)) if e.nickname == "ZED"
        ));
        assert_eq!(
            parse_reply(HttpMethod::Get, 0, ""),
            Err(LeaderboardError::Network("no response".into()))
        );
        assert_eq!(
            parse_reply(HttpMethod::Patch, 404, r#"{"success":false,"error":"who?"}"#),
            Err(LeaderboardError::Rejected("who?".into()))
        );
        assert_eq!(
            parse_reply(HttpMethod::Post, 503, "busy"),
            Err(LeaderboardError::Rejected("HTTP 503".into()))
        );
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("DELETE"), None);
    }

    #[test]
    fn test_book_serves_queued_requests() {
        let mut book = LeaderboardBook::new();
        let mut outbox = Outbox::new();
        outbox.submit(&request("abc", 40.0, "d1")).unwrap();
        outbox.fetch_top(5);
        outbox
            .rename(&RenameRequest {
                device_id: "d1".into(),
                new_nickname: nick("xyz"),
            })
            .unwrap();
        outbox
            .rename(&RenameRequest {
                device_id: "ghost".into(),
                new_nickname: nick("xyz"),
            })
            .unwrap();

        let replies: Vec<_> = outbox
            .drain()
            .iter()
            .map(|r| {
                let (status, body) = book.serve(r);
                parse_reply(r.method, status, &body)
            })
            .collect();
        assert!(matches!(&replies[0], Ok(LeaderboardReply::Submitted(r)) if r.new_player));
        assert!(matches!(&replies[1], Ok(LeaderboardReply::Page(p)) if p.entries.len() == 1));
        assert!(matches!(&replies[2], Ok(LeaderboardReply::Renamed(e)) if e.nickname == "XYZ"));
        assert!(matches!(&replies[3], Err(LeaderboardError::Rejected(_))));

        let bogus = HttpRequest {
            method: HttpMethod::Post,
            path: LEADERBOARD_PATH.into(),
            body: Some(r#"{"nickname":"AB"}"#.into()),
        };
        assert_eq!(book.serve(&bogus).0, 400);
        assert_eq!(page_limit("/api/leaderboard"), DEFAULT_PAGE_SIZE);
        assert_eq!(page_limit("/api/leaderboard?limit=3"), 3);
    }

    #[test]
    fn test_parse_page() {
        let page = parse_page(r#"{"entries":[{"nickname":"ABC","totalScore":1.5,"levelsCompleted":1}]}"#).unwrap();
        assert_eq!(page.entries.len(), 1);
        assert!(parse_page("{}").is_err());
    }
}
