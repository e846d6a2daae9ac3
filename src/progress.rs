//! Busy/idle tracking and the cosmetic progress script
//!
//! While a request is in flight the UI shows an elapsed counter and a canned
//! sequence of labels (and, for multi-step modes, canned reasoning lines).
//! None of it reflects real backend progress. All timed output comes from a
//! single `Scheduler` task, so stopping the tracker stops every pending cue.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::dispatch::Endpoint;
use crate::models::Mode;

/// Elapsed-counter refresh period
pub const TICK: Duration = Duration::from_millis(100);

/// One scripted update, `at` measured from submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub at: Duration,
    pub text: String,
}

impl Cue {
    fn new(ms: u64, text: impl Into<String>) -> Self {
        Self {
            at: Duration::from_millis(ms),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressScript {
    pub labels: Vec<Cue>,
    pub reasoning: Vec<Cue>,
}

/// Canned script for a request about to go to `endpoint`
pub fn script_for(endpoint: Endpoint, mode: Mode, model: &str) -> ProgressScript {
    let labels = match (endpoint, mode) {
        (Endpoint::Weather, _) => vec![
            Cue::new(500, "Detecting location..."),
            Cue::new(1000, "Querying current weather..."),
            Cue::new(2000, "Reading forecast data..."),
            Cue::new(4000, format!("Writing the answer with {}...", model)),
        ],
        (Endpoint::QuickSearch, _) => vec![
            Cue::new(500, "Searching the web..."),
            Cue::new(1000, "Reading top results..."),
            Cue::new(2000, format!("Summarizing with {}...", model)),
        ],
        (_, Mode::Agent) | (Endpoint::AgentDemo, _) => vec![
            Cue::new(500, format!("Starting agent with {}...", model)),
            Cue::new(1000, "Planning the approach..."),
            Cue::new(2000, "Searching the web..."),
            Cue::new(4000, "Analysing results..."),
            Cue::new(8000, "Drafting the final answer..."),
            Cue::new(30000, "Still working, agent runs can take a few minutes..."),
        ],
        _ => vec![
            Cue::new(500, "Analysing your question..."),
            Cue::new(1000, format!("Asking {}...", model)),
            Cue::new(2000, "Writing the answer..."),
        ],
    };

    let reasoning = match (endpoint, mode) {
        (Endpoint::Weather, _) => vec![
            Cue::new(800, "Action: look up current conditions"),
            Cue::new(2500, "Observation: weather data received"),
        ],
        (Endpoint::QuickSearch, _) => vec![
            Cue::new(800, "Action: quick web search"),
            Cue::new(2500, "Observation: collecting result snippets"),
        ],
        (_, m) if m.is_multi_step() => vec![
            Cue::new(800, "Thought: this may need current information"),
            Cue::new(2500, "Action: web search"),
            Cue::new(5000, "Observation: reading search results"),
            Cue::new(9000, "Thought: I now know the final answer"),
        ],
        _ => Vec::new(),
    };

    ProgressScript { labels, reasoning }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressKind {
    Tick(Duration),
    Label(String),
    Reasoning(String),
}

/// Scheduler output, stamped with the busy period it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub generation: u64,
    pub kind: ProgressKind,
}

/// Owns the one task that emits ticks and cues. Aborted on `cancel` or drop.
#[derive(Debug)]
pub struct Scheduler {
    handle: JoinHandle<()>,
}

impl Scheduler {
    pub fn spawn(
        generation: u64,
        script: ProgressScript,
        tx: mpsc::UnboundedSender<ProgressEvent>,
    ) -> Self {
        let mut timeline: Vec<(Duration, ProgressKind)> = script
            .labels
            .into_iter()
            .map(|c| (c.at, ProgressKind::Label(c.text)))
            .chain(
                script
                    .reasoning
                    .into_iter()
                    .map(|c| (c.at, ProgressKind::Reasoning(c.text))),
            )
            .collect();
        // Stable: labels before reasoning at equal offsets
        timeline.sort_by_key(|(at, _)| *at);
        let mut timeline: VecDeque<_> = timeline.into();

        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let mut ticker = tokio::time::interval(TICK);

            loop {
                let next_cue = timeline.front().map(|(at, _)| start + *at);
                let kind = tokio::select! {
                    _ = ticker.tick() => ProgressKind::Tick(start.elapsed()),
                    _ = tokio::time::sleep_until(next_cue.unwrap_or(start)), if next_cue.is_some() => {
                        match timeline.pop_front() {
                            Some((_, kind)) => kind,
                            None => continue,
                        }
                    }
                };
                if tx.send(ProgressEvent { generation, kind }).is_err() {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Clone)]
pub struct BusyState {
    pub generation: u64,
    pub started: Instant,
    pub started_wall: DateTime<Local>,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TrackerState {
    Idle,
    Busy(BusyState),
}

/// Summary of a finished busy period
#[derive(Debug, Clone)]
pub struct BusyPeriod {
    pub started_wall: DateTime<Local>,
    pub finished_wall: DateTime<Local>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct ProgressTracker {
    state: TrackerState,
    generation: u64,
    scheduler: Option<Scheduler>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            state: TrackerState::Idle,
            generation: 0,
            scheduler: None,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, TrackerState::Busy(_))
    }

    /// Generation of the current busy period, if any
    pub fn generation(&self) -> Option<u64> {
        match &self.state {
            TrackerState::Busy(b) => Some(b.generation),
            TrackerState::Idle => None,
        }
    }

    /// Idle -> Busy. Returns the new generation, or `None` if already busy.
    pub fn start(&mut self) -> Option<u64> {
        if self.is_busy() {
            return None;
        }
        self.generation += 1;
        self.state = TrackerState::Busy(BusyState {
            generation: self.generation,
            started: Instant::now(),
            started_wall: Local::now(),
            label: None,
        });
        Some(self.generation)
    }

    /// Hand the running scheduler to the tracker so `stop` can cancel it
    pub fn attach(&mut self, scheduler: Scheduler) {
        if let Some(old) = self.scheduler.replace(scheduler) {
            old.cancel();
        }
    }

    pub fn has_scheduler(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Whether `event` belongs to the current busy period
    pub fn is_current(&self, event: &ProgressEvent) -> bool {
        self.generation() == Some(event.generation)
    }

    /// Apply a label event. Stale or non-label events are ignored.
    pub fn apply(&mut self, event: &ProgressEvent) -> bool {
        if !self.is_current(event) {
            return false;
        }
        match (&mut self.state, &event.kind) {
            (TrackerState::Busy(b), ProgressKind::Label(text)) => {
                b.label = Some(text.clone());
                true
            }
            (TrackerState::Busy(_), ProgressKind::Tick(_)) => true,
            _ => false,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.state {
            TrackerState::Busy(b) => b.label.as_deref(),
            TrackerState::Idle => None,
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match &self.state {
            TrackerState::Busy(b) => Some(b.started.elapsed()),
            TrackerState::Idle => None,
        }
    }

    /// Busy -> Idle, cancelling every pending cue
    pub fn stop(&mut self) -> Option<BusyPeriod> {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.cancel();
        }
        match std::mem::replace(&mut self.state, TrackerState::Idle) {
            TrackerState::Busy(b) => Some(BusyPeriod {
                started_wall: b.started_wall,
                finished_wall: Local::now(),
                elapsed: b.started.elapsed(),
            }),
            TrackerState::Idle => None,
        }
    }
}

/// `12.3s` style counter
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{}m{:02}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}
