//! Endpoint selection and the network policy gate
//!
//! Order matters: the policy gate runs first and may stop a submission
//! outright; classification only sees requests that will be sent.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

use crate::models::Mode;

/// Words that send a question to the weather endpoint (substring match)
pub const WEATHER_KEYWORDS: &[&str] = &[
    "clima",
    "temperatura",
    "lluvia",
    "llover",
    "pronóstico",
    "pronostico",
    "humedad",
    "weather",
    "forecast",
];

/// Backend routes this client posts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Chat,
    QuickSearch,
    Weather,
    AgentDemo,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Chat => "/chat",
            Endpoint::QuickSearch => "/busqueda-rapida",
            Endpoint::Weather => "/clima-actual",
            Endpoint::AgentDemo => "/agente-general",
        }
    }
}

fn weather_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = WEATHER_KEYWORDS
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .ok()
    })
    .as_ref()
}

pub fn is_weather_question(question: &str) -> bool {
    match weather_regex() {
        Some(re) => re.is_match(question),
        None => {
            let lower = question.to_lowercase();
            WEATHER_KEYWORDS.iter().any(|k| lower.contains(k))
        }
    }
}

/// Pick the endpoint for a question that passed the policy gate. First match wins.
pub fn classify(question: &str, mode: Mode, network_allowed: bool) -> Endpoint {
    if network_allowed && is_weather_question(question) {
        Endpoint::Weather
    } else if mode == Mode::QuickSearch {
        Endpoint::QuickSearch
    } else {
        Endpoint::Chat
    }
}

/// Result of the pre-dispatch policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Allowed,
    /// Mode needs web access that the session forbids; use this mode instead
    Downgrade(Mode),
}

pub fn check_policy(mode: Mode, network_allowed: bool) -> Policy {
    if !network_allowed && mode.requires_network() {
        Policy::Downgrade(Mode::Simple)
    } else {
        Policy::Allowed
    }
}

/// Canned topics accepted by the agent demo endpoint
pub const DEMO_TOPICS: &[(&str, &str)] = &[
    ("noticias", "AI news"),
    ("bitcoin", "Bitcoin price"),
    ("deportes", "recent sports"),
    ("tech", "OpenAI news"),
    ("economia", "oil price"),
    ("general", "general news"),
];

pub fn is_demo_topic(topic: &str) -> bool {
    DEMO_TOPICS.iter().any(|(key, _)| *key == topic)
}

pub fn demo_topic_keys() -> String {
    DEMO_TOPICS
        .iter()
        .map(|(key, _)| *key)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `/demo <topic>` chat command. `/demo` has to stand alone, so questions
/// like "/democracia" are sent as questions.
pub fn parse_demo_command(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix("/demo")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_overrides_mode() {
        let q = "¿Cuál es el clima en Quito?";
        for mode in [Mode::Simple, Mode::Agent, Mode::QuickSearch] {
            assert_eq!(classify(q, mode, true), Endpoint::Weather);
        }
    }

    #[test]
    fn test_weather_match_is_case_insensitive() {
        assert!(is_weather_question("CLIMA hoy"));
        assert!(is_weather_question("Pronóstico para mañana"));
        assert!(is_weather_question("What's the Weather like?"));
        assert!(!is_weather_question("¿Quién ganó la Champions?"));
    }

    #[test]
    fn test_weather_needs_network() {
        assert_eq!(classify("clima en Lima", Mode::Simple, false), Endpoint::Chat);
    }

    #[test]
    fn test_quick_search_without_weather() {
        assert_eq!(
            classify("precio del bitcoin", Mode::QuickSearch, true),
            Endpoint::QuickSearch
        );
    }

    #[test]
    fn test_default_is_chat() {
        assert_eq!(classify("hola", Mode::Simple, true), Endpoint::Chat);
        assert_eq!(classify("hola", Mode::Agent, true), Endpoint::Chat);
    }

    #[test]
    fn test_policy_downgrades_network_modes() {
        assert_eq!(check_policy(Mode::Agent, false), Policy::Downgrade(Mode::Simple));
        assert_eq!(check_policy(Mode::QuickSearch, false), Policy::Downgrade(Mode::Simple));
        assert_eq!(check_policy(Mode::Simple, false), Policy::Allowed);
        assert_eq!(check_policy(Mode::Agent, true), Policy::Allowed);
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Chat.path(), "/chat");
        assert_eq!(Endpoint::QuickSearch.path(), "/busqueda-rapida");
        assert_eq!(Endpoint::Weather.path(), "/clima-actual");
        assert_eq!(Endpoint::AgentDemo.path(), "/agente-general");
    }

    #[test]
    fn test_demo_topics() {
        assert!(is_demo_topic("bitcoin"));
        assert!(is_demo_topic("economia"));
        assert!(!is_demo_topic("Bitcoin"));
        assert!(!is_demo_topic("clima"));
        assert_eq!(
            demo_topic_keys(),
            "noticias, bitcoin, deportes, tech, economia, general"
        );
    }

    #[test]
    fn test_demo_command_is_a_whole_word() {
        assert_eq!(parse_demo_command("/demo bitcoin"), Some("bitcoin"));
        assert_eq!(parse_demo_command("  /demo   tech "), Some("tech"));
        assert_eq!(parse_demo_command("/demo"), Some(""));
        assert_eq!(parse_demo_command("/democracia en Ecuador"), None);
        assert_eq!(parse_demo_command("qué es /demo"), None);
    }
}
