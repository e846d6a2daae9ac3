//! Chat session controller
//!
//! Owns every piece of mutable session state: the selections, the log, the
//! busy tracker, live and final reasoning, notices and the pending clear.
//! A submission is split into `begin` (validate, police, classify, append the
//! user entry, go busy) and `finish` (go idle, append the answer or raise a
//! notice) so the TUI can run the network call on a task in between.
//! `submit` runs both halves back to back for one-shot use.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::client::{Backend, DemoResponse, RequestEnvelope, ResponseEnvelope};
use crate::config::Config;
use crate::conversation::{ChatEntry, Conversation, Timing};
use crate::dispatch::{self, Endpoint, Policy};
use crate::error::ClientError;
use crate::input;
use crate::models::Mode;
use crate::progress::{self, ProgressEvent, ProgressKind, ProgressTracker, Scheduler};

pub const FAILURE_NOTICE: &str = "There was a problem processing your question.";
pub const DOWNGRADE_NOTICE: &str =
    "Network access is disabled, so the mode was switched to simple. Press Enter to ask again.";
pub const CANCELLED_NOTICE: &str = "Request cancelled.";
pub const CLEARED_NOTICE: &str = "Conversation cleared.";

/// How long a notice stays on screen
pub const NOTICE_TTL: Duration = Duration::from_secs(4);
/// Delay before the input box takes focus again after a reply
pub const FOCUS_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub expires_at: Instant,
}

/// Current UI selections, read at submission time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub model_id: String,
    pub network_allowed: bool,
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            mode: cfg.default_mode,
            model_id: cfg.default_model.clone(),
            network_allowed: cfg.network_allowed,
        }
    }
}

/// A request ready to go on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub generation: u64,
    pub endpoint: Endpoint,
    pub request: RequestEnvelope,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Empty input or already busy; nothing happened
    Rejected,
    /// Mode needed the network; switched to simple, nothing sent
    Downgraded,
    Dispatch(Dispatch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rejected,
    Downgraded,
    Answered,
    Failed,
    Cancelled,
    /// Completion for a busy period that already ended
    Stale,
}

pub struct SessionController {
    pub config: SessionConfig,
    conversation: Conversation,
    tracker: ProgressTracker,
    live_reasoning: Vec<String>,
    final_reasoning: Option<Vec<String>>,
    notices: VecDeque<Notice>,
    pending_clear: bool,
    focus_at: Option<Instant>,
    progress_tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            conversation: Conversation::default(),
            tracker: ProgressTracker::new(),
            live_reasoning: Vec::new(),
            final_reasoning: None,
            notices: VecDeque::new(),
            pending_clear: false,
            focus_at: None,
            progress_tx: None,
        }
    }

    /// Run the cosmetic scheduler for each busy period, reporting into `tx`
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn is_busy(&self) -> bool {
        self.tracker.is_busy()
    }

    pub fn can_submit(&self, text: &str) -> bool {
        input::can_submit(text, self.is_busy())
    }

    /// Scripted steps while busy, authentic ones after a reply that had them
    pub fn live_reasoning(&self) -> &[String] {
        &self.live_reasoning
    }

    pub fn final_reasoning(&self) -> Option<&[String]> {
        self.final_reasoning.as_deref()
    }

    pub fn input_focused(&self) -> bool {
        !self.is_busy() && self.focus_at.map_or(true, |at| Instant::now() >= at)
    }

    // ───────────────────────────────────────────────────────────
    // Selections
    // ───────────────────────────────────────────────────────────

    pub fn cycle_mode(&mut self) -> Mode {
        self.config.mode = self.config.mode.cycle();
        self.config.mode
    }

    pub fn toggle_network(&mut self) -> bool {
        self.config.network_allowed = !self.config.network_allowed;
        self.config.network_allowed
    }

    pub fn set_model(&mut self, model_id: &str) {
        self.config.model_id = model_id.to_string();
    }

    // ───────────────────────────────────────────────────────────
    // Submission lifecycle
    // ───────────────────────────────────────────────────────────

    /// Validate, apply the network policy, classify, append the user entry
    /// and go busy. The caller performs the network call afterwards.
    pub fn begin(&mut self, text: &str) -> Submission {
        if !self.can_submit(text) {
            return Submission::Rejected;
        }

        if let Policy::Downgrade(mode) = dispatch::check_policy(self.config.mode, self.config.network_allowed) {
            tracing::info!(from = self.config.mode.name(), to = mode.name(), "mode downgraded, network disabled");
            self.config.mode = mode;
            self.notify(NoticeKind::Info, DOWNGRADE_NOTICE);
            return Submission::Downgraded;
        }

        let question = text.trim().to_string();
        let endpoint = dispatch::classify(&question, self.config.mode, self.config.network_allowed);
        let request = RequestEnvelope {
            question: question.clone(),
            mode: self.config.mode,
            model_id: self.config.model_id.clone(),
            network_allowed: self.config.network_allowed,
        };

        let Some(generation) = self.start_busy(endpoint) else {
            return Submission::Rejected;
        };
        self.conversation.append(ChatEntry::user(&question));
        tracing::info!(
            generation,
            path = endpoint.path(),
            mode = self.config.mode.name(),
            model = %self.config.model_id,
            "submitting question"
        );

        Submission::Dispatch(Dispatch {
            generation,
            endpoint,
            request,
        })
    }

    /// Like `begin`, for the canned agent demo. Returns the generation to finish with.
    /// An unknown topic raises a notice listing the valid ones.
    pub fn begin_demo(&mut self, topic: &str) -> Option<u64> {
        if self.is_busy() {
            return None;
        }
        let Some(description) = dispatch::DEMO_TOPICS
            .iter()
            .find(|(key, _)| *key == topic)
            .map(|(_, d)| *d)
        else {
            let text = format!(
                "Unknown demo topic {:?}. Try one of: {}",
                topic,
                dispatch::demo_topic_keys()
            );
            self.notify(NoticeKind::Info, &text);
            return None;
        };
        let generation = self.start_busy(Endpoint::AgentDemo)?;
        self.conversation
            .append(ChatEntry::user(&format!("Agent demo: {}", description)));
        tracing::info!(generation, topic, "running agent demo");
        Some(generation)
    }

    fn start_busy(&mut self, endpoint: Endpoint) -> Option<u64> {
        let generation = self.tracker.start()?;
        self.live_reasoning.clear();
        self.final_reasoning = None;
        self.pending_clear = false;

        if let Some(tx) = &self.progress_tx {
            let mode = if endpoint == Endpoint::AgentDemo {
                Mode::AgentGeneral
            } else {
                self.config.mode
            };
            let script = progress::script_for(endpoint, mode, &self.config.model_id);
            self.tracker.attach(Scheduler::spawn(generation, script, tx.clone()));
        }
        Some(generation)
    }

    /// Fold a scheduler event into the state. Stale events are dropped.
    pub fn apply_progress(&mut self, event: ProgressEvent) {
        if !self.tracker.is_current(&event) {
            return;
        }
        match event.kind {
            ProgressKind::Reasoning(step) => self.live_reasoning.push(step),
            _ => {
                self.tracker.apply(&event);
            }
        }
    }

    /// Go idle and record the result of the busy period `generation`.
    pub fn finish(&mut self, generation: u64, result: Result<ResponseEnvelope, ClientError>) -> Outcome {
        if self.tracker.generation() != Some(generation) {
            tracing::debug!(generation, "ignoring stale completion");
            return Outcome::Stale;
        }
        let period = self.tracker.stop();
        self.focus_at = Some(Instant::now() + FOCUS_DELAY);

        match result {
            Ok(resp) => {
                let authentic = resp.reasoning().filter(|steps| !steps.is_empty());
                match &authentic {
                    Some(steps) => self.live_reasoning = steps.clone(),
                    None => self.live_reasoning.clear(),
                }
                self.final_reasoning = authentic;

                let local = period.map(|p| Timing {
                    started_at: Some(p.started_wall.format("%H:%M:%S").to_string()),
                    finished_at: Some(p.finished_wall.format("%H:%M:%S").to_string()),
                    duration_seconds: Some(p.elapsed.as_secs_f64()),
                    iteration_count: None,
                    search_count: None,
                    network_allowed: Some(self.config.network_allowed),
                });

                let mut entry = ChatEntry::assistant(resp, None);
                entry.timing = merge_timing(entry.timing.take(), local);
                tracing::info!(
                    generation,
                    mode = entry.mode.map(|m| m.name()).unwrap_or("unknown"),
                    "answer received"
                );
                self.conversation.append(entry);
                Outcome::Answered
            }
            Err(e) if e.is_cancelled() => {
                self.live_reasoning.clear();
                tracing::info!(generation, "request cancelled by user");
                self.notify(NoticeKind::Info, CANCELLED_NOTICE);
                Outcome::Cancelled
            }
            Err(e) => {
                self.live_reasoning.clear();
                tracing::warn!(generation, error = %e, "request failed");
                self.notify(NoticeKind::Error, FAILURE_NOTICE);
                Outcome::Failed
            }
        }
    }

    pub fn finish_demo(&mut self, generation: u64, result: Result<DemoResponse, ClientError>) -> Outcome {
        self.finish(generation, result.map(|demo| demo.answer))
    }

    /// Generation to abort, if a request is in flight
    pub fn cancel(&mut self) -> Option<u64> {
        let generation = self.tracker.generation()?;
        self.finish(generation, Err(ClientError::Cancelled));
        Some(generation)
    }

    /// Full lifecycle for one question, awaiting the backend inline
    pub async fn submit<B: Backend + ?Sized>(&mut self, backend: &B, text: &str) -> Outcome {
        match self.begin(text) {
            Submission::Rejected => Outcome::Rejected,
            Submission::Downgraded => Outcome::Downgraded,
            Submission::Dispatch(d) => {
                let result = backend.send(d.endpoint, &d.request).await;
                self.finish(d.generation, result)
            }
        }
    }

    pub async fn run_demo<B: Backend + ?Sized>(&mut self, backend: &B, topic: &str) -> Outcome {
        match self.begin_demo(topic) {
            Some(generation) => {
                let model_id = self.config.model_id.clone();
                let result = backend.agent_demo(topic, &model_id).await;
                self.finish_demo(generation, result)
            }
            None => Outcome::Rejected,
        }
    }

    // ───────────────────────────────────────────────────────────
    // Clearing
    // ───────────────────────────────────────────────────────────

    /// First step of a clear; nothing is removed until `confirm_clear(true)`
    pub fn request_clear(&mut self) {
        self.pending_clear = true;
    }

    pub fn clear_pending(&self) -> bool {
        self.pending_clear
    }

    /// Second step. Returns how many entries were removed, if it went ahead.
    pub fn confirm_clear(&mut self, confirmed: bool) -> Option<usize> {
        if !std::mem::take(&mut self.pending_clear) || !confirmed {
            return None;
        }
        let removed = self.conversation.clear();
        self.final_reasoning = None;
        if !self.is_busy() {
            self.live_reasoning.clear();
        }
        tracing::info!(removed, "conversation cleared");
        self.notify(NoticeKind::Success, CLEARED_NOTICE);
        Some(removed)
    }

    // ───────────────────────────────────────────────────────────
    // Notices
    // ───────────────────────────────────────────────────────────

    pub fn notify(&mut self, kind: NoticeKind, text: &str) {
        self.notices.push_back(Notice {
            kind,
            text: text.to_string(),
            expires_at: Instant::now() + NOTICE_TTL,
        });
    }

    /// Newest notice that has not expired; expired ones are dropped
    pub fn notice(&mut self) -> Option<&Notice> {
        let now = Instant::now();
        self.notices.retain(|n| n.expires_at > now);
        self.notices.back()
    }

    /// Every notice raised so far that is still queued
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }
}

/// Backend timing wins field by field; local measurements fill the gaps
fn merge_timing(remote: Option<Timing>, local: Option<Timing>) -> Option<Timing> {
    match (remote, local) {
        (Some(r), Some(l)) => Some(Timing {
            started_at: r.started_at.or(l.started_at),
            finished_at: r.finished_at.or(l.finished_at),
            duration_seconds: r.duration_seconds.or(l.duration_seconds),
            iteration_count: r.iteration_count,
            search_count: r.search_count,
            network_allowed: r.network_allowed.or(l.network_allowed),
        }),
        (r, l) => r.or(l),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and replays a canned result
    struct FakeBackend {
        calls: Mutex<Vec<(Endpoint, RequestEnvelope)>>,
        reply: Box<dyn Fn() -> Result<ResponseEnvelope, ClientError> + Send + Sync>,
    }

    impl FakeBackend {
        fn answering(json: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Box::new(move || -> Result<ResponseEnvelope, ClientError> {
                    Ok(serde_json::from_str(json).unwrap())
                }),
            }
        }

        fn failing_with(status: u16) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Box::new(move || -> Result<ResponseEnvelope, ClientError> {
                    Err(ClientError::Status {
                        status,
                        body: String::new(),
                    })
                }),
            }
        }

        fn calls(&self) -> Vec<(Endpoint, RequestEnvelope)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn send(
            &self,
            endpoint: Endpoint,
            request: &RequestEnvelope,
        ) -> Result<ResponseEnvelope, ClientError> {
            self.calls.lock().unwrap().push((endpoint, request.clone()));
            (self.reply)()
        }

        async fn agent_demo(&self, _topic: &str, _model_id: &str) -> Result<DemoResponse, ClientError> {
            let answer = (self.reply)()?;
            Ok(DemoResponse {
                question: "¿Cuál es el precio actual del Bitcoin?".into(),
                demo_kind: Some("Precio Bitcoin".into()),
                answer,
            })
        }
    }

    fn controller(mode: Mode, network: bool) -> SessionController {
        SessionController::new(SessionConfig {
            mode,
            model_id: "llama3".into(),
            network_allowed: network,
        })
    }

    #[tokio::test]
    async fn test_weather_question_scenario() {
        let backend = FakeBackend::answering(r#"{"respuesta":"18°C","modo":"agente"}"#);
        let mut c = controller(Mode::Simple, true);

        let outcome = c.submit(&backend, "¿Cuál es el clima en Quito?").await;
        assert_eq!(outcome, Outcome::Answered);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::Weather);

        let entries = c.conversation().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].text, "¿Cuál es el clima en Quito?");
        assert_eq!(entries[1].role, Role::Assistant);
        assert_eq!(entries[1].mode, Some(Mode::Agent));
        assert!(!c.is_busy());
    }

    #[tokio::test]
    async fn test_empty_input_does_nothing() {
        let backend = FakeBackend::answering(r#"{"respuesta":"x"}"#);
        let mut c = controller(Mode::Simple, true);

        assert!(!c.can_submit(""));
        assert_eq!(c.submit(&backend, "").await, Outcome::Rejected);
        assert_eq!(c.submit(&backend, "   ").await, Outcome::Rejected);
        assert!(backend.calls().is_empty());
        assert!(c.conversation().is_empty());
        assert!(c.notice().is_none());
    }

    #[tokio::test]
    async fn test_http_500_scenario() {
        let backend = FakeBackend::failing_with(500);
        let mut c = controller(Mode::Simple, true);

        assert_eq!(c.submit(&backend, "hola").await, Outcome::Failed);
        assert_eq!(c.conversation().count(Role::User), 1);
        assert_eq!(c.conversation().count(Role::Assistant), 0);
        assert_eq!(c.notices().count(), 1);
        let notice = c.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, FAILURE_NOTICE);
        assert!(!c.is_busy());
    }

    #[tokio::test]
    async fn test_agent_without_network_is_downgraded() {
        let backend = FakeBackend::answering(r#"{"respuesta":"x","modo":"simple"}"#);
        let mut c = controller(Mode::Agent, false);

        assert_eq!(c.submit(&backend, "noticias de hoy").await, Outcome::Downgraded);
        assert!(backend.calls().is_empty());
        assert!(c.conversation().is_empty());
        assert_eq!(c.config.mode, Mode::Simple);
        assert_eq!(c.notice().unwrap().kind, NoticeKind::Info);

        // Retrying goes out as simple
        assert_eq!(c.submit(&backend, "noticias de hoy").await, Outcome::Answered);
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.mode, Mode::Simple);
        assert_eq!(calls[0].0, Endpoint::Chat);
    }

    #[tokio::test]
    async fn test_quick_search_routes_to_quick_endpoint() {
        let backend = FakeBackend::answering(r#"{"respuesta":"x","modo":"busqueda_rapida"}"#);
        let mut c = controller(Mode::QuickSearch, true);
        c.submit(&backend, "precio del bitcoin").await;
        let calls = backend.calls();
        assert_eq!(calls[0].0, Endpoint::QuickSearch);
        assert_eq!(calls[0].1.question, "precio del bitcoin");
        assert!(calls[0].1.network_allowed);
    }

    #[test]
    fn test_user_entry_precedes_dispatch() {
        let mut c = controller(Mode::Simple, true);
        let Submission::Dispatch(d) = c.begin("  hola  ") else {
            panic!("expected dispatch");
        };
        assert_eq!(d.request.question, "hola");
        assert_eq!(c.conversation().count(Role::User), 1);
        assert!(c.is_busy());
        assert!(!c.input_focused());

        // Busy: a second submission is a no-op
        assert_eq!(c.begin("otra"), Submission::Rejected);
        assert_eq!(c.conversation().len(), 1);
    }

    #[test]
    fn test_authentic_reasoning_replaces_script() {
        let mut c = controller(Mode::Agent, true);
        let Submission::Dispatch(d) = c.begin("noticias") else {
            panic!("expected dispatch");
        };
        c.apply_progress(ProgressEvent {
            generation: d.generation,
            kind: ProgressKind::Reasoning("Thought: scripted".into()),
        });
        assert_eq!(c.live_reasoning(), ["Thought: scripted"]);

        let resp: ResponseEnvelope =
            serde_json::from_str(r#"{"respuesta":"ok","pensamientos":["real 1","real 2"]}"#).unwrap();
        assert_eq!(c.finish(d.generation, Ok(resp)), Outcome::Answered);
        assert_eq!(c.live_reasoning(), ["real 1", "real 2"]);
        assert_eq!(c.final_reasoning().unwrap().len(), 2);
        let entry = &c.conversation().entries()[1];
        assert_eq!(entry.reasoning_steps.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut c = controller(Mode::Simple, true);
        let Submission::Dispatch(d) = c.begin("hola") else {
            panic!("expected dispatch");
        };
        assert_eq!(c.cancel(), Some(d.generation));
        assert_eq!(c.notice().unwrap().text, CANCELLED_NOTICE);

        let resp: ResponseEnvelope = serde_json::from_str(r#"{"respuesta":"tarde"}"#).unwrap();
        assert_eq!(c.finish(d.generation, Ok(resp)), Outcome::Stale);
        assert_eq!(c.conversation().count(Role::Assistant), 0);
    }

    #[test]
    fn test_local_timing_fills_gaps() {
        let mut c = controller(Mode::Simple, true);
        let Submission::Dispatch(d) = c.begin("hola") else {
            panic!("expected dispatch");
        };
        let resp: ResponseEnvelope =
            serde_json::from_str(r#"{"respuesta":"ok","metadata":{"busquedas":2}}"#).unwrap();
        c.finish(d.generation, Ok(resp));
        let timing = c.conversation().entries()[1].timing.clone().unwrap();
        assert_eq!(timing.search_count, Some(2));
        assert!(timing.started_at.is_some());
        assert!(timing.duration_seconds.is_some());
        assert_eq!(timing.iteration_count, None);
    }

    #[tokio::test]
    async fn test_clear_needs_confirmation() {
        let backend = FakeBackend::answering(r#"{"respuesta":"x"}"#);
        let mut c = controller(Mode::Simple, true);
        c.submit(&backend, "hola").await;
        assert_eq!(c.conversation().len(), 2);

        assert_eq!(c.confirm_clear(true), None, "no clear without a request");
        c.request_clear();
        assert_eq!(c.confirm_clear(false), None);
        assert_eq!(c.conversation().len(), 2);

        c.request_clear();
        assert_eq!(c.confirm_clear(true), Some(2));
        assert!(c.conversation().is_empty());
        assert_eq!(c.conversation().welcome(), crate::conversation::WELCOME);
        assert_eq!(c.notice().unwrap().text, CLEARED_NOTICE);
    }

    #[tokio::test]
    async fn test_demo_appends_both_entries() {
        let backend = FakeBackend::answering(r#"{"respuesta":"soleado","modo":"agente_general"}"#);
        let mut c = controller(Mode::Simple, true);
        assert_eq!(c.run_demo(&backend, "bitcoin").await, Outcome::Answered);
        let entries = c.conversation().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Agent demo: Bitcoin price");
        assert_eq!(entries[1].mode, Some(Mode::AgentGeneral));
    }

    #[tokio::test]
    async fn test_unknown_demo_topic_lists_valid_ones() {
        let backend = FakeBackend::answering(r#"{"respuesta":"x"}"#);
        let mut c = controller(Mode::Simple, true);
        assert_eq!(c.run_demo(&backend, "astrologia").await, Outcome::Rejected);
        assert!(c.conversation().is_empty());
        assert!(!c.is_busy());
        let notice = c.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert!(notice.text.contains("noticias, bitcoin, deportes, tech, economia, general"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_notices_expire() {
        let mut c = controller(Mode::Simple, true);
        c.notify(NoticeKind::Info, "hola");
        assert!(c.notice().is_some());
        tokio::time::sleep(NOTICE_TTL + Duration::from_millis(1)).await;
        assert!(c.notice().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_events_flow_into_state() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut c = controller(Mode::Agent, true).with_progress(tx);
        let Submission::Dispatch(d) = c.begin("noticias") else {
            panic!("expected dispatch");
        };

        tokio::time::sleep(Duration::from_millis(1100)).await;
        while let Ok(ev) = rx.try_recv() {
            c.apply_progress(ev);
        }
        assert_eq!(c.tracker().label(), Some("Planning the approach..."));
        assert_eq!(c.live_reasoning().len(), 1);

        c.finish(d.generation, Err(ClientError::Timeout(900)));
        assert!(!c.tracker().has_scheduler());
        assert!(c.live_reasoning().is_empty());
    }
}
