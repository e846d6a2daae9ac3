//! consulta - terminal client for a question-answering backend
//!
//! USAGE:
//!   consulta                              # interactive chat
//!   consulta ask "..." [--mode m] [--model id] [--offline]
//!   consulta demo <topic>                 # canned agent demo
//!   consulta doctor                       # check config and backend
//!   consulta config set <key> <value>     # non-interactive config

use anyhow::{Context, Result};
use std::sync::Arc;

use consulta::client::HttpBackend;
use consulta::config::{self, Config};
use consulta::controller::{Outcome, SessionConfig, SessionController};
use consulta::dispatch;
use consulta::models::Mode;
use consulta::{logging, render, ui};

// ═══════════════════════════════════════════════════════════════
// CLI
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq)]
enum Command {
    Interactive {
        mode: Option<Mode>,
        model: Option<String>,
        offline: bool,
    },
    Ask {
        question: String,
        mode: Option<Mode>,
        model: Option<String>,
        offline: bool,
        reasoning: bool,
    },
    Demo {
        topic: String,
    },
    Doctor,
    ConfigSet {
        key: String,
        value: String,
    },
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(Command::Help);
    }

    match args.first().map(|s| s.as_str()) {
        Some("doctor") => return Ok(Command::Doctor),
        Some("demo") => {
            let topic = args.get(1).cloned().unwrap_or_default();
            return Ok(Command::Demo { topic });
        }
        Some("config") => {
            if args.get(1).map(|s| s.as_str()) == Some("set") {
                return Ok(Command::ConfigSet {
                    key: args.get(2).cloned().unwrap_or_default(),
                    value: args.get(3).cloned().unwrap_or_default(),
                });
            }
            anyhow::bail!("Usage: consulta config set <key> <value>");
        }
        _ => {}
    }

    // Parse flags and the question
    let ask = args.first().map(|s| s.as_str()) == Some("ask");
    let mut mode = None;
    let mut model = None;
    let mut offline = false;
    let mut reasoning = false;
    let mut words = Vec::new();
    let mut i = if ask { 1 } else { 0 };

    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                i += 1;
                let value = args.get(i).context("--mode needs a value")?;
                mode = Some(value.parse()?);
            }
            "--model" | "-m" => {
                i += 1;
                model = args.get(i).cloned();
            }
            "--offline" => offline = true,
            "--reasoning" | "-r" => reasoning = true,
            s if !s.starts_with('-') => words.push(s.to_string()),
            s => anyhow::bail!("Unknown flag: {}", s),
        }
        i += 1;
    }

    if ask {
        Ok(Command::Ask {
            question: words.join(" "),
            mode,
            model,
            offline,
            reasoning,
        })
    } else {
        Ok(Command::Interactive { mode, model, offline })
    }
}

fn print_help() {
    println!(r#"consulta - terminal client for a question-answering backend

USAGE:
    consulta [--mode m] [--model id] [--offline]   # interactive chat
    consulta ask "<question>" [FLAGS]              # one question, print the answer
    consulta demo <topic>                          # agent demo: noticias, bitcoin, deportes,
                                                   #   tech, economia, general
    consulta doctor                                # check config and backend
    consulta config set <key> <value>              # backend, model, mode, network, timeout

FLAGS:
        --mode <m>          simple | agent | quick_search
    -m, --model <id>        Model id to request
        --offline           Forbid web access for this session
    -r, --reasoning         (ask) print reasoning steps
    -h, --help              Show this help

CONFIG:
    ~/.config/consulta/config.json    Backend URL, defaults
    ~/.local/state/consulta/          Log file

ENVIRONMENT:
    CONSULTA_BACKEND_URL    Override backend URL from config
    CONSULTA_LOG            Log filter (default: info)

CONTROLS (interactive mode):
    Enter       Send
    F2          Cycle mode
    F3          Pick model
    F4          Toggle web access
    Ctrl-L      Clear conversation (asks first)
    Ctrl-R      Expand/collapse newest reasoning
    Tab         Switch tabs
    Esc         Cancel request / quit
"#);
}

// ═══════════════════════════════════════════════════════════════
// MAIN
// ═══════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    if command != Command::Help {
        // Logging is best effort; a read-only state dir must not block the chat
        if let Err(e) = logging::init() {
            eprintln!("warning: file logging disabled: {:#}", e);
        }
    }

    match command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Doctor => run_doctor().await,
        Command::ConfigSet { key, value } => run_config_set(&key, &value),
        Command::Demo { topic } => run_demo(&topic).await,
        Command::Ask {
            question,
            mode,
            model,
            offline,
            reasoning,
        } => run_ask(&question, mode, model, offline, reasoning).await,
        Command::Interactive { mode, model, offline } => run_interactive(mode, model, offline).await,
    }
}

// ═══════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════

fn session_config(cfg: &Config, mode: Option<Mode>, model: Option<String>, offline: bool) -> SessionConfig {
    let mut session = SessionConfig::from(cfg);
    if let Some(m) = mode {
        session.mode = m;
    }
    if let Some(m) = model {
        session.model_id = m;
    }
    if offline {
        session.network_allowed = false;
    }
    session
}

async fn run_doctor() -> Result<()> {
    println!("consulta doctor\n");

    let cfg = Config::load()?;
    let path = config::config_path()?;
    println!("[{}] Config: {}",
        if path.exists() { "✓" } else { "-" },
        path.display()
    );
    println!("[✓] Backend: {}", cfg.backend_url);
    println!("[✓] Defaults: model {}, mode {}, web {}",
        cfg.default_model,
        cfg.default_mode.name(),
        if cfg.network_allowed { "on" } else { "off" }
    );

    print!("[?] Backend status: checking...");
    let backend = HttpBackend::new(&cfg.backend_url, cfg.request_timeout_secs);
    match backend.check_status().await {
        Ok(status) => {
            println!("\r[✓] Backend status: reachable      ");
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Err(e) => println!("\r[✗] Backend status: {}", e),
    }

    Ok(())
}

fn run_config_set(key: &str, value: &str) -> Result<()> {
    let mut cfg = Config::load()?;
    cfg.set(key, value)?;
    cfg.save()?;
    println!("Set {} = {} in {}", key, value, config::config_path()?.display());
    Ok(())
}

async fn run_ask(
    question: &str,
    mode: Option<Mode>,
    model: Option<String>,
    offline: bool,
    reasoning: bool,
) -> Result<()> {
    let cfg = Config::load()?;
    let backend = HttpBackend::new(&cfg.backend_url, cfg.request_timeout_secs);
    let mut controller = SessionController::new(session_config(&cfg, mode, model, offline));

    let before = controller.conversation().len();
    let outcome = controller.submit(&backend, question).await;
    for entry in &controller.conversation().entries()[before..] {
        print!("{}", render::entry_plain(entry, reasoning));
    }
    report(&mut controller, outcome)
}

async fn run_demo(topic: &str) -> Result<()> {
    if !dispatch::is_demo_topic(topic) {
        anyhow::bail!(
            "Unknown demo topic: {:?}. Valid topics: {}",
            topic,
            dispatch::demo_topic_keys()
        );
    }

    let cfg = Config::load()?;
    let backend = HttpBackend::new(&cfg.backend_url, cfg.request_timeout_secs);
    let mut controller = SessionController::new(SessionConfig::from(&cfg));

    println!("Running agent demo ({}), this can take a while...\n", topic);
    let outcome = controller.run_demo(&backend, topic).await;
    for entry in controller.conversation().entries() {
        print!("{}", render::entry_plain(entry, true));
    }
    report(&mut controller, outcome)
}

/// Print any notice and turn failures into a non-zero exit
fn report(controller: &mut SessionController, outcome: Outcome) -> Result<()> {
    if let Some(notice) = controller.notice() {
        eprintln!("{}", notice.text);
    }
    match outcome {
        Outcome::Answered => Ok(()),
        Outcome::Rejected => anyhow::bail!("Nothing to ask: the question is empty"),
        Outcome::Downgraded => anyhow::bail!("Request not sent"),
        Outcome::Failed | Outcome::Cancelled | Outcome::Stale => anyhow::bail!("Request failed"),
    }
}

async fn run_interactive(mode: Option<Mode>, model: Option<String>, offline: bool) -> Result<()> {
    let cfg = Config::load()?;
    let backend = Arc::new(HttpBackend::new(&cfg.backend_url, cfg.request_timeout_secs));
    let controller = SessionController::new(session_config(&cfg, mode, model, offline));

    let mut models = cfg.models.clone();
    if !models.contains(&controller.config.model_id) {
        models.push(controller.config.model_id.clone());
    }

    tracing::info!(backend = backend.base_url(), "starting interactive session");
    ui::run_tui(backend, controller, models).await
}
