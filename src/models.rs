//! Answering modes and the model catalogue
//!
//! The backend speaks Spanish on the wire (`agente`, `busqueda_rapida`...).
//! English spellings are accepted when parsing so that newer backend
//! revisions keep working.

use serde::{Deserialize, Serialize};

/// Backend answering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "simple")]
    Simple,
    #[serde(rename = "agente", alias = "agent")]
    Agent,
    #[serde(rename = "agente_general", alias = "agent_general")]
    AgentGeneral,
    #[serde(rename = "busqueda_rapida", alias = "quick_search")]
    QuickSearch,
    #[serde(rename = "busqueda_directa", alias = "direct_search")]
    DirectSearch,
    #[serde(rename = "simple_fallback")]
    SimpleFallback,
    #[serde(rename = "fallback_general", alias = "general_fallback")]
    GeneralFallback,
}

impl Mode {
    /// Modes a user can pick; the rest only come back from the backend
    pub fn selectable() -> &'static [Mode] {
        &[Mode::Simple, Mode::Agent, Mode::QuickSearch]
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Agent => "agente",
            Mode::AgentGeneral => "agente_general",
            Mode::QuickSearch => "busqueda_rapida",
            Mode::DirectSearch => "busqueda_directa",
            Mode::SimpleFallback => "simple_fallback",
            Mode::GeneralFallback => "fallback_general",
        }
    }

    /// Parse a backend mode string. Unknown strings yield `None`.
    pub fn from_wire(s: &str) -> Option<Mode> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Some(Mode::Simple),
            "agente" | "agent" => Some(Mode::Agent),
            "agente_general" | "agent_general" => Some(Mode::AgentGeneral),
            "busqueda_rapida" | "quick_search" => Some(Mode::QuickSearch),
            "busqueda_directa" | "direct_search" => Some(Mode::DirectSearch),
            "simple_fallback" => Some(Mode::SimpleFallback),
            "fallback_general" | "general_fallback" => Some(Mode::GeneralFallback),
            _ => None,
        }
    }

    /// Whether the backend needs web access to serve this mode
    pub fn requires_network(&self) -> bool {
        matches!(self, Mode::Agent | Mode::QuickSearch)
    }

    /// Modes whose answers come out of a multi-step reasoning loop
    pub fn is_multi_step(&self) -> bool {
        matches!(
            self,
            Mode::Agent | Mode::AgentGeneral | Mode::QuickSearch | Mode::DirectSearch
        )
    }

    /// Next user-selectable mode (F2 in the TUI)
    pub fn cycle(&self) -> Mode {
        let modes = Mode::selectable();
        let idx = modes.iter().position(|m| m == self).unwrap_or(0);
        modes[(idx + 1) % modes.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Agent => "agent",
            Mode::AgentGeneral => "agent (general)",
            Mode::QuickSearch => "quick search",
            Mode::DirectSearch => "direct search",
            Mode::SimpleFallback => "simple (fallback)",
            Mode::GeneralFallback => "general (fallback)",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::from_wire(s).ok_or_else(|| {
            anyhow::anyhow!("Unknown mode: {}. Valid modes: simple, agent, quick_search", s)
        })
    }
}

/// Default catalogue offered by the model picker
pub fn default_models() -> Vec<String> {
    ["llama3", "gemini-1.5-flash", "deepseek-r1", "mistral"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Short provider hint shown next to a model id
pub fn provider_hint(model_id: &str) -> &'static str {
    match model_id {
        m if m.starts_with("gemini") => "google",
        m if m.starts_with("gpt") => "openai",
        m if m.contains("lmstudio") => "lmstudio",
        _ => "ollama",
    }
}
