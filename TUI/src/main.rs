mod action;
mod app;
mod backend;
mod command;
mod config;
mod download;
mod error;
mod logging;
mod orchestrator;
mod status;
mod ui;
mod ui_state;

#[cfg(test)]
mod test_support;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use arboard::Clipboard;
use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use app::{App, RejectReason};
use backend::{GenerationRequest, HttpGenerationClient};
use config::{Config, ServiceConfig, BACKEND_URL_ENV, DEFAULT_BACKEND_URL, DEFAULT_PROJECT_NAME};
use download::ArchiveWriter;
use logging::LogTarget;
use orchestrator::Orchestrator;
use status::{Status, IN_PROGRESS_MESSAGE};
use ui::draw;
use ui_state::{Focus, Screen};

/// Describe a project in plain words and get back a ready-to-run zip.
#[derive(Parser, Debug)]
#[command(name = "codebuddy", version, about)]
struct Cli {
    /// Base URL of the generation service
    #[arg(long, env = BACKEND_URL_ENV, default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Project name; the archive is saved as <name>.zip
    #[arg(short, long, default_value = DEFAULT_PROJECT_NAME)]
    name: String,

    /// Directory archives are saved into (defaults to the current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Generate once from this prompt without starting the terminal UI
    #[arg(short, long)]
    prompt: Option<String>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Log file (interactive sessions default to a file in the temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let headless = cli.prompt.is_some();

    let log_target = match (&cli.log_file, headless) {
        (Some(path), _) => LogTarget::File(path),
        (None, false) => LogTarget::UserDefault,
        (None, true) => LogTarget::Stderr,
    };
    let log_path = logging::init_tracing(cli.verbose, log_target)?;

    let service_config = ServiceConfig::new(&cli.backend_url)?;
    let output_dir = config::resolve_output_dir(cli.output_dir.clone())?;
    info!(
        backend_url = %service_config.base_url(),
        output_dir = %output_dir.display(),
        log_file = ?log_path,
        headless,
        "Starting codebuddy"
    );

    let client = HttpGenerationClient::new(service_config.clone())?;
    let runtime = tokio::runtime::Runtime::new()?;
    let orchestrator = Orchestrator::new(
        Arc::new(client),
        ArchiveWriter::new(output_dir),
        runtime.handle().clone(),
    );

    match cli.prompt {
        Some(prompt) => runtime.block_on(run_headless(orchestrator, prompt, cli.name)),
        None => {
            let mut app = App::new(orchestrator, cli.name, Config::default());
            app.service_url = service_config.base_url().to_string();
            run_tui(&mut app)?;
            if app.orchestrator.is_busy() {
                warn!("Exiting with a generation still in progress");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_headless(
    mut orchestrator: Orchestrator,
    prompt: String,
    project_name: String,
) -> anyhow::Result<ExitCode> {
    if prompt.trim().is_empty() {
        eprintln!("{}", RejectReason::EmptyPrompt);
        return Ok(ExitCode::from(2));
    }

    println!("{}", IN_PROGRESS_MESSAGE);
    let request = GenerationRequest {
        prompt,
        project_name,
    };
    let status = orchestrator.run_once(request).await?;
    println!("{}", status);

    Ok(match status {
        Status::Success { .. } => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn run_tui(app: &mut App) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(app.config().tick_rate_ms);

    loop {
        app.tick();

        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match app.ui.screen {
                    Screen::Home => {
                        // Any key transitions to the generator
                        if key.code == KeyCode::Esc {
                            return Ok(());
                        }
                        app.ui.screen = Screen::Generator;
                        app.orchestrator.probe_health();
                    }
                    Screen::Generator if app.ui.show_help => {
                        app.ui.show_help = false;
                    }
                    Screen::Generator => match key.code {
                        KeyCode::Esc => {
                            if app.showing_command_popup() {
                                app.reset_command_selection();
                            } else if app.prompt.is_empty() {
                                return Ok(());
                            } else {
                                app.prompt.clear();
                            }
                        }
                        KeyCode::Enter => {
                            if app.ui.focus == Focus::ProjectName {
                                app.ui.focus = Focus::Prompt;
                            } else if app.showing_command_popup()
                                && app.ui.command_selection.is_some()
                            {
                                app.apply_command_selection();
                            } else {
                                app.submit_input();
                            }
                        }
                        KeyCode::Tab => {
                            if app.showing_command_popup() && app.ui.command_selection.is_some() {
                                app.apply_command_selection();
                            } else {
                                app.cycle_focus();
                            }
                        }
                        KeyCode::BackTab => app.cycle_focus(),
                        KeyCode::Backspace => app.backspace(),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.clear();
                        }
                        KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            if let Ok(mut clipboard) = Clipboard::new() {
                                if let Ok(text) = clipboard.get_text() {
                                    app.insert_text(&text);
                                }
                            }
                        }
                        KeyCode::Char(c) => app.insert_char(c),
                        KeyCode::Up => app.command_select_up(),
                        KeyCode::Down => app.command_select_down(),
                        _ => {}
                    },
                },
                Event::Paste(text) => {
                    if app.ui.screen == Screen::Generator {
                        app.insert_text(&text);
                    }
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::test_support::FakeService;
    use tokio::runtime::Handle;

    fn orchestrator(service: Arc<FakeService>, dir: &std::path::Path) -> Orchestrator {
        Orchestrator::new(service, ArchiveWriter::new(dir), Handle::current())
    }

    #[tokio::test]
    async fn test_headless_empty_prompt_exits_2_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(FakeService::new(Ok(b"zip".to_vec())));

        let code = run_headless(orchestrator(service.clone(), dir.path()), "  \n".into(), "myapp".into())
            .await
            .unwrap();

        assert_eq!(code, ExitCode::from(2));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_headless_success_saves_archive_and_exits_0() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(FakeService::new(Ok(b"PK-bytes".to_vec())));

        let code = run_headless(orchestrator(service.clone(), dir.path()), "todo app".into(), "myapp".into())
            .await
            .unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(service.calls(), 1);
        assert_eq!(std::fs::read(dir.path().join("myapp.zip")).unwrap(), b"PK-bytes");
    }

    #[tokio::test]
    async fn test_headless_failure_exits_1() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(FakeService::new(Err(GenerationError::Service("invalid prompt".into()))));

        let code = run_headless(orchestrator(service.clone(), dir.path()), "todo app".into(), "myapp".into())
            .await
            .unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(service.calls(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
