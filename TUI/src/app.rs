use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::action::Action;
use crate::backend::GenerationRequest;
use crate::command::CommandParser;
use crate::config::{Config, COMMANDS};
use crate::download::sanitize_project_name;
use crate::orchestrator::{GenerationId, Orchestrator, OrchestratorEvent};
use crate::status::Status;
use crate::ui_state::{Focus, UIState};

/// Why a submission did not start a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    EmptyPrompt,
    GenerationInFlight(GenerationId),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyPrompt => write!(f, "Describe the project first"),
            RejectReason::GenerationInFlight(_) => {
                write!(f, "Still generating - wait for the current project to finish")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(GenerationRequest),
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceHealth {
    #[default]
    Unknown,
    Online {
        checked_at: DateTime<Utc>,
    },
    Offline(String),
}

pub struct App {
    pub ui: UIState,
    pub prompt: String,
    pub project_name: String,
    pub orchestrator: Orchestrator,
    pub health: ServiceHealth,
    /// Shown in the sidebar only
    pub service_url: String,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub animation_frame: usize,
    pub animation_tick: u64,
    pub should_quit: bool,
    config: Config,
}

impl App {
    pub fn new(orchestrator: Orchestrator, project_name: String, config: Config) -> Self {
        Self {
            ui: UIState::new(),
            prompt: String::new(),
            project_name,
            orchestrator,
            health: ServiceHealth::Unknown,
            service_url: String::new(),
            last_finished_at: None,
            animation_frame: 0,
            animation_tick: 0,
            should_quit: false,
            config,
        }
    }

    pub fn status(&self) -> &Status {
        self.orchestrator.status()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the next archive will be written
    pub fn destination(&self) -> PathBuf {
        self.orchestrator.writer().destination(&self.project_name)
    }

    /// Validate the current input without side effects.
    pub fn compose(&self) -> SubmitOutcome {
        if self.prompt.trim().is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyPrompt);
        }
        if let Some(id) = self.orchestrator.in_flight() {
            return SubmitOutcome::Rejected(RejectReason::GenerationInFlight(id));
        }
        SubmitOutcome::Accepted(GenerationRequest {
            prompt: self.prompt.clone(),
            project_name: self.project_name.clone(),
        })
    }

    /// Hand the current input to the orchestrator. Rejections leave the
    /// status untouched and are shown as a notice instead.
    pub fn submit(&mut self) -> SubmitOutcome {
        let outcome = match self.compose() {
            SubmitOutcome::Accepted(request) => match self.orchestrator.start(request.clone()) {
                Ok(_) => SubmitOutcome::Accepted(request),
                Err(busy) => SubmitOutcome::Rejected(RejectReason::GenerationInFlight(busy.0)),
            },
            rejected => rejected,
        };

        if let SubmitOutcome::Rejected(reason) = &outcome {
            debug!(reason = ?reason, "Submission rejected");
            self.post_notice(reason.to_string());
        }
        outcome
    }

    /// Enter in the prompt box: slash commands run locally, anything else is
    /// submitted.
    pub fn submit_input(&mut self) {
        if self.prompt.trim_start().starts_with('/') {
            self.handle_command();
        } else {
            self.submit();
        }
    }

    /// Reset prompt and status. The project name is kept, and a running
    /// generation keeps its status.
    pub fn clear(&mut self) {
        self.prompt.clear();
        self.reset_command_selection();
        if !self.orchestrator.reset() {
            self.post_notice("Generation still running - status kept");
        }
    }

    fn handle_command(&mut self) {
        match CommandParser::parse(&self.prompt) {
            Ok(action) => {
                self.prompt.clear();
                self.apply_action(action);
            }
            Err(message) => {
                self.prompt.clear();
                self.post_notice(message);
            }
        }
        self.reset_command_selection();
    }

    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::Help => self.ui.show_help = true,
            Action::Clear => self.clear(),
            Action::ShowProjectName => {
                let message = format!(
                    "Project: {} (saves to {})",
                    self.project_name,
                    self.destination().display()
                );
                self.post_notice(message);
            }
            Action::SetProjectName { name } => {
                self.project_name = name;
                let message = format!(
                    "Project name set - saves as {}.zip",
                    sanitize_project_name(&self.project_name)
                );
                self.post_notice(message);
            }
            Action::Quit => self.should_quit = true,
        }
    }

    pub fn post_notice(&mut self, message: impl Into<String>) {
        self.ui.notice = Some(message.into());
        self.ui.notice_tick = self.animation_tick;
    }

    pub fn tick(&mut self) {
        self.animation_tick += 1;
        self.animation_frame = (self.animation_frame + 1) % self.config.animation_frame_mod;

        if self.ui.notice.is_some()
            && self.animation_tick - self.ui.notice_tick >= self.config.notice_timeout_ticks
        {
            self.ui.notice = None;
        }

        self.process_events();
    }

    /// Apply whatever the orchestrator has finished since the last tick.
    pub fn process_events(&mut self) {
        while let Some(event) = self.orchestrator.poll() {
            match event {
                OrchestratorEvent::Finished(completion) => {
                    self.last_finished_at = Some(Utc::now());
                    if completion.succeeded() {
                        self.prompt.clear();
                        self.reset_command_selection();
                    }
                }
                OrchestratorEvent::Health(Ok(health)) if health.is_ok() => {
                    self.health = ServiceHealth::Online {
                        checked_at: Utc::now(),
                    };
                }
                OrchestratorEvent::Health(Ok(health)) => {
                    self.health = ServiceHealth::Offline(format!("status '{}'", health.status));
                }
                OrchestratorEvent::Health(Err(e)) => {
                    self.health = ServiceHealth::Offline(e.to_string());
                }
            }
        }
    }

    pub fn insert_char(&mut self, c: char) {
        match self.ui.focus {
            Focus::Prompt => {
                self.prompt.push(c);
                self.reset_command_selection();
            }
            Focus::ProjectName => self.project_name.push(c),
        }
    }

    /// Paste text into the focused field, flattening newlines
    pub fn insert_text(&mut self, text: &str) {
        let filtered: String = text
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        match self.ui.focus {
            Focus::Prompt => {
                self.prompt.push_str(&filtered);
                self.reset_command_selection();
            }
            Focus::ProjectName => self.project_name.push_str(filtered.trim()),
        }
    }

    pub fn backspace(&mut self) {
        match self.ui.focus {
            Focus::Prompt => {
                self.prompt.pop();
                self.reset_command_selection();
            }
            Focus::ProjectName => {
                self.project_name.pop();
            }
        }
    }

    pub fn cycle_focus(&mut self) {
        self.ui.focus = self.ui.focus.next();
        self.reset_command_selection();
    }

    /// Check if command popup should be shown
    pub fn showing_command_popup(&self) -> bool {
        self.ui.focus == Focus::Prompt && self.prompt.starts_with('/') && !self.prompt.contains(' ')
    }

    /// Get filtered commands based on current input
    pub fn get_filtered_commands(&self) -> Vec<(&'static str, &'static str)> {
        if !self.prompt.starts_with('/') {
            return vec![];
        }
        let filter = &self.prompt[1..];
        COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd[1..].starts_with(filter))
            .copied()
            .collect()
    }

    /// Move selection up in command popup
    pub fn command_select_up(&mut self) {
        let filtered = self.get_filtered_commands();
        if filtered.is_empty() {
            return;
        }

        // Cycle: None -> last command -> ... -> 0 -> None
        self.ui.command_selection = match self.ui.command_selection {
            None => Some(filtered.len() - 1),
            Some(0) => None,
            Some(n) => Some(n - 1),
        };
    }

    /// Move selection down in command popup
    pub fn command_select_down(&mut self) {
        let filtered = self.get_filtered_commands();
        if filtered.is_empty() {
            return;
        }

        // Cycle: None -> 0 -> 1 -> ... -> last -> None
        self.ui.command_selection = match self.ui.command_selection {
            None => Some(0),
            Some(n) if n >= filtered.len() - 1 => None,
            Some(n) => Some(n + 1),
        };
    }

    /// Apply selected command to input
    pub fn apply_command_selection(&mut self) {
        if let Some(idx) = self.ui.command_selection {
            let filtered = self.get_filtered_commands();
            if let Some((cmd, _)) = filtered.get(idx) {
                self.prompt = cmd.to_string();
            }
        }
        self.ui.command_selection = None;
    }

    /// Reset command selection when input changes
    pub fn reset_command_selection(&mut self) {
        self.ui.command_selection = None;
    }
}
