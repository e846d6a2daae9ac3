//! Conversation rendering
//!
//! Turns the log into styled ratatui lines for the TUI and into plain text
//! for one-shot output. Reasoning lists are collapsed unless the caller says
//! otherwise; which entries are expanded is view state, not entry state.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::collections::HashSet;
use unicode_width::UnicodeWidthStr;

use crate::conversation::{ChatEntry, Conversation, Role, Timing};
use crate::models::Mode;

/// Placeholder for timing fields the backend did not send
pub const MISSING: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub icon: &'static str,
    pub label: &'static str,
}

const SIMPLE_BADGE: Badge = Badge { icon: "💬", label: "Simple" };

/// Badge for an assistant entry. Unknown or missing modes look like simple.
pub fn badge(mode: Option<Mode>) -> Badge {
    match mode {
        Some(Mode::Agent) => Badge { icon: "🤖", label: "Agent" },
        Some(Mode::AgentGeneral) => Badge { icon: "🤖", label: "General agent" },
        Some(Mode::QuickSearch) => Badge { icon: "⚡", label: "Quick search" },
        Some(Mode::DirectSearch) => Badge { icon: "🔎", label: "Direct search" },
        Some(Mode::SimpleFallback) | Some(Mode::GeneralFallback) => {
            Badge { icon: "↩", label: "Fallback" }
        }
        Some(Mode::Simple) | None => SIMPLE_BADGE,
    }
}

/// Compact one-line timing summary; every field is shown
pub fn timing_summary(t: &Timing) -> String {
    fn or_missing<T: ToString>(v: &Option<T>) -> String {
        v.as_ref().map(|x| x.to_string()).unwrap_or_else(|| MISSING.to_string())
    }
    let duration = t
        .duration_seconds
        .map(|d| format!("{:.1}s", d))
        .unwrap_or_else(|| MISSING.to_string());
    format!(
        "start {} · end {} · {} · iterations {} · searches {}",
        or_missing(&t.started_at),
        or_missing(&t.finished_at),
        duration,
        or_missing(&t.iteration_count),
        or_missing(&t.search_count),
    )
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub user: Color,
    pub assistant: Color,
    pub muted: Color,
    pub thinking: Color,
    pub welcome: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            user: Color::Blue,
            assistant: Color::Cyan,
            muted: Color::DarkGray,
            thinking: Color::Magenta,
            welcome: Color::Green,
        }
    }
}

/// Which entries (by index) have their reasoning expanded
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    expanded: HashSet<usize>,
}

impl ViewState {
    pub fn is_expanded(&self, idx: usize) -> bool {
        self.expanded.contains(&idx)
    }

    pub fn toggle(&mut self, idx: usize) -> bool {
        if !self.expanded.remove(&idx) {
            self.expanded.insert(idx);
        }
        self.is_expanded(idx)
    }

    pub fn reset(&mut self) {
        self.expanded.clear();
    }
}

/// Index of the newest entry that has something to expand
pub fn last_expandable(conv: &Conversation) -> Option<usize> {
    conv.entries()
        .iter()
        .rposition(|e| e.visible_reasoning().is_some())
}

pub fn entry_lines(entry: &ChatEntry, expanded: bool, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let time = entry.created_at.format("%H:%M").to_string();

    match entry.role {
        Role::User => {
            lines.push(Line::from(vec![
                Span::styled("You", Style::default().fg(theme.user).add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", time), Style::default().fg(theme.muted)),
            ]));
        }
        Role::Assistant => {
            let b = badge(entry.mode);
            let mut header = vec![
                Span::styled(
                    "Assistant",
                    Style::default().fg(theme.assistant).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {} {}", b.icon, b.label)),
            ];
            if let Some(model) = &entry.model_used {
                header.push(Span::styled(format!("  [{}]", model), Style::default().fg(theme.muted)));
            }
            header.push(Span::styled(format!("  {}", time), Style::default().fg(theme.muted)));
            lines.push(Line::from(header));
        }
    }

    for text_line in entry.text.lines() {
        lines.push(Line::from(format!("  {}", text_line)));
    }

    if let Some(steps) = entry.visible_reasoning() {
        let style = Style::default().fg(theme.thinking);
        if expanded {
            lines.push(Line::styled(format!("  ▾ Reasoning ({} steps)", steps.len()), style));
            for (i, step) in steps.iter().enumerate() {
                lines.push(Line::styled(format!("    {}. {}", i + 1, step), style));
            }
        } else {
            lines.push(Line::styled(
                format!("  ▸ Reasoning ({} steps, Ctrl-R to expand)", steps.len()),
                style,
            ));
        }
    }

    if let Some(timing) = &entry.timing {
        lines.push(Line::styled(
            format!("  ⏱ {}", timing_summary(timing)),
            Style::default().fg(theme.muted),
        ));
    }

    lines.push(Line::from(""));
    lines
}

/// Whole log: welcome entry first, then every entry in order
pub fn conversation_lines(conv: &Conversation, view: &ViewState, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(conv.welcome().to_string(), Style::default().fg(theme.welcome)),
        Line::from(""),
    ];
    for (idx, entry) in conv.entries().iter().enumerate() {
        lines.extend(entry_lines(entry, view.is_expanded(idx), theme));
    }
    lines
}

/// Rows the lines occupy once wrapped to `width` columns
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| {
            let w: usize = line.spans.iter().map(|s| s.content.width()).sum();
            w.max(1).div_ceil(width)
        })
        .sum()
}

/// Scroll offset that keeps the newest line visible, minus how far the user scrolled back
pub fn tail_scroll(content_rows: usize, viewport_rows: u16, back: usize) -> u16 {
    let max = content_rows.saturating_sub(viewport_rows as usize);
    max.saturating_sub(back).min(u16::MAX as usize) as u16
}

/// Plain text rendering for non-interactive output
pub fn entry_plain(entry: &ChatEntry, expanded: bool) -> String {
    let mut out = String::new();
    match entry.role {
        Role::User => out.push_str(&format!("> {}\n", entry.text)),
        Role::Assistant => {
            let b = badge(entry.mode);
            let model = entry
                .model_used
                .as_deref()
                .map(|m| format!(" [{}]", m))
                .unwrap_or_default();
            out.push_str(&format!("{} {}{}\n{}\n", b.icon, b.label, model, entry.text));
            if let Some(steps) = entry.visible_reasoning() {
                if expanded {
                    out.push_str("Reasoning:\n");
                    for (i, step) in steps.iter().enumerate() {
                        out.push_str(&format!("  {}. {}\n", i + 1, step));
                    }
                } else {
                    out.push_str(&format!("[{} reasoning steps hidden]\n", steps.len()));
                }
            }
            if let Some(t) = &entry.timing {
                out.push_str(&format!("[{}]\n", timing_summary(t)));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ResponseEnvelope;

    fn assistant(json: &str) -> ChatEntry {
        let resp: ResponseEnvelope = serde_json::from_str(json).unwrap();
        ChatEntry::assistant(resp, None)
    }

    fn text_of(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| &*s.content).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_unknown_mode_falls_back_to_simple() {
        assert_eq!(badge(None), SIMPLE_BADGE);
        let entry = assistant(r#"{"respuesta":"x","modo":"oraculo"}"#);
        assert_eq!(badge(entry.mode), SIMPLE_BADGE);
    }

    #[test]
    fn test_known_badges() {
        assert_eq!(badge(Some(Mode::Agent)).label, "Agent");
        assert_eq!(badge(Some(Mode::QuickSearch)).icon, "⚡");
        assert_eq!(badge(Some(Mode::GeneralFallback)).label, "Fallback");
    }

    #[test]
    fn test_timing_placeholders() {
        let t = Timing {
            started_at: Some("10:00:00".into()),
            duration_seconds: Some(2.25),
            ..Default::default()
        };
        let s = timing_summary(&t);
        assert!(s.contains("start 10:00:00"));
        assert!(s.contains("end --"));
        assert!(s.contains("2.2s") || s.contains("2.3s"));
        assert!(s.contains("iterations --"));
        assert!(s.contains("searches --"));
    }

    #[test]
    fn test_reasoning_collapsed_by_default() {
        let entry = assistant(r#"{"respuesta":"ok","pensamientos":["uno","dos"]}"#);
        let collapsed = text_of(&entry_lines(&entry, false, &Theme::default()));
        assert!(collapsed.contains("Reasoning (2 steps"));
        assert!(!collapsed.contains("1. uno"));

        let expanded = text_of(&entry_lines(&entry, true, &Theme::default()));
        assert!(expanded.contains("1. uno"));
        assert!(expanded.contains("2. dos"));
    }

    #[test]
    fn test_no_empty_collapsible() {
        let entry = assistant(r#"{"respuesta":"ok","pasos_intermedios":[]}"#);
        let text = text_of(&entry_lines(&entry, false, &Theme::default()));
        assert!(!text.contains("Reasoning"));
        assert!(!entry_plain(&entry, true).contains("Reasoning"));
    }

    #[test]
    fn test_welcome_renders_first() {
        let mut conv = Conversation::new("Bienvenido");
        conv.append(ChatEntry::user("hola"));
        let lines = conversation_lines(&conv, &ViewState::default(), &Theme::default());
        assert_eq!(text_of(&lines[..1]), "Bienvenido");
        assert!(text_of(&lines).contains("hola"));
    }

    #[test]
    fn test_view_state_toggle() {
        let mut view = ViewState::default();
        assert!(view.toggle(3));
        assert!(view.is_expanded(3));
        assert!(!view.toggle(3));
    }

    #[test]
    fn test_last_expandable() {
        let mut conv = Conversation::default();
        conv.append(assistant(r#"{"respuesta":"a","pensamientos":["x"]}"#));
        conv.append(assistant(r#"{"respuesta":"b"}"#));
        assert_eq!(last_expandable(&conv), Some(0));
    }

    #[test]
    fn test_wrapped_height_and_tail() {
        let lines = vec![Line::from("abcdefghij"), Line::from("")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1);
        assert_eq!(tail_scroll(10, 4, 0), 6);
        assert_eq!(tail_scroll(10, 4, 2), 4);
        assert_eq!(tail_scroll(3, 4, 0), 0);
    }

    #[test]
    fn test_plain_user_entry() {
        assert_eq!(entry_plain(&ChatEntry::user("hola"), false), "> hola\n");
    }
}
