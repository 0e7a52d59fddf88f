use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, ServiceHealth};
use crate::config::{COMMANDS, EXAMPLE_PROMPTS};
use crate::status::Status;
use crate::ui_state::{Focus, Screen};

// Copper Sapphire Morning color palette
const BG_DARK: Color = Color::Rgb(12, 12, 16); // Deep background

// Sapphire blues
const SAPPHIRE: Color = Color::Rgb(101, 150, 243); // #6596F3 - Primary accent
const CYAN_LIGHT: Color = Color::Rgb(178, 220, 226); // #B2DCE2 - Light cyan

// Copper/warm tones
const COPPER: Color = Color::Rgb(138, 72, 38); // #8A4826 - Copper
const PALE_YELLOW: Color = Color::Rgb(234, 208, 148); // #EAD094 - Pale yellow

// Accent colors
const BURGUNDY: Color = Color::Rgb(204, 92, 68); // #CC5C44 - Warnings/errors
const OLIVE: Color = Color::Rgb(131, 179, 102); // #83B366 - Success/green
const LAVENDER: Color = Color::Rgb(211, 164, 234); // #D3A4EA - Purple accent

// Text colors
const TEXT_PRIMARY: Color = Color::Rgb(240, 240, 245); // Near white
const TEXT_SECONDARY: Color = Color::Rgb(180, 180, 190); // Light gray
const TEXT_MUTED: Color = Color::Rgb(105, 116, 133); // #697485 - Medium gray

// Border colors (subtle)
const BORDER_DIM: Color = Color::Rgb(45, 50, 60);

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &App) {
    // Fill entire background
    let bg = Block::default().style(Style::default().bg(BG_DARK));
    frame.render_widget(bg, frame.area());

    match app.ui.screen {
        Screen::Home => draw_home(frame, app),
        Screen::Generator => draw_generator(frame, app),
    }

    if app.ui.show_help {
        let area = frame.area();
        draw_help_overlay(frame, area);
    }
}

fn draw_home(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Center content vertically
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(10), // Logo container
            Constraint::Length(3),  // Subtitle
            Constraint::Length(3),  // Hint
            Constraint::Min(0),
        ])
        .split(area);

    // Center horizontally
    let logo_width = 82;
    let h_padding = (area.width.saturating_sub(logo_width)) / 2;
    let logo_area = Rect {
        x: area.x + h_padding,
        y: v_chunks[1].y,
        width: logo_width.min(area.width),
        height: v_chunks[1].height,
    };

    draw_glass_border(frame, logo_area, "", app.animation_frame, true);

    let inner = Rect {
        x: logo_area.x + 2,
        y: logo_area.y + 1,
        width: logo_area.width.saturating_sub(4),
        height: logo_area.height.saturating_sub(2),
    };
    draw_animated_logo(frame, inner, app.animation_frame);

    let subtitle = Paragraph::new("Tell the AI what you want built, and get a ready-to-run project zip")
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_SECONDARY));
    frame.render_widget(subtitle, v_chunks[2]);

    // Press any key hint with copper glow
    let glow = (app.animation_frame as f64 / 45.0).sin().abs() * 0.5 + 0.5;
    let r = (138.0 + (216.0 - 138.0) * glow) as u8;
    let g = (72.0 + (180.0 - 72.0) * glow) as u8;
    let b = (38.0 + (169.0 - 38.0) * glow) as u8;
    let hint = Paragraph::new("[ Press any key to start ]")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Rgb(r, g, b)));
    frame.render_widget(hint, v_chunks[3]);

    let version_area = Rect {
        x: area.x,
        y: area.height.saturating_sub(2),
        width: area.width,
        height: 1,
    };
    let version = Paragraph::new(concat!("v", env!("CARGO_PKG_VERSION")))
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_MUTED));
    frame.render_widget(version, version_area);
}

fn draw_glass_border(frame: &mut Frame, area: Rect, title: &str, anim_frame: usize, glow: bool) {
    // Animated border - cycles between sapphire and copper
    let border_color = if glow {
        let t = (anim_frame as f64 / 120.0).sin() * 0.5 + 0.5;
        let r = (84.0 + (138.0 - 84.0) * t) as u8;
        let g = (112.0 + (72.0 - 112.0) * t) as u8;
        let b = (156.0 + (38.0 - 156.0) * t) as u8;
        Color::Rgb(r, g, b)
    } else {
        BORDER_DIM
    };

    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    frame.render_widget(block, area);
}

fn draw_animated_logo(frame: &mut Frame, area: Rect, anim_frame: usize) {
    let logo_lines = [
        "",
        " ██████╗ ██████╗ ██████╗ ███████╗██████╗ ██╗   ██╗██████╗ ██████╗ ██╗   ██╗",
        "██╔════╝██╔═══██╗██╔══██╗██╔════╝██╔══██╗██║   ██║██╔══██╗██╔══██╗╚██╗ ██╔╝",
        "██║     ██║   ██║██║  ██║█████╗  ██████╔╝██║   ██║██║  ██║██║  ██║ ╚████╔╝ ",
        "██║     ██║   ██║██║  ██║██╔══╝  ██╔══██╗██║   ██║██║  ██║██║  ██║  ╚██╔╝  ",
        "╚██████╗╚██████╔╝██████╔╝███████╗██████╔╝╚██████╔╝██████╔╝██████╔╝   ██║   ",
        " ╚═════╝ ╚═════╝ ╚═════╝ ╚══════╝╚═════╝  ╚═════╝ ╚═════╝ ╚═════╝    ╚═╝   ",
        "",
    ];

    let mut lines: Vec<Line> = Vec::new();

    for (line_idx, logo_line) in logo_lines.iter().enumerate() {
        let mut spans: Vec<Span> = Vec::new();

        for (char_idx, ch) in logo_line.chars().enumerate() {
            // Wave from sapphire to copper
            let wave_offset =
                (anim_frame as f64 / 25.0) + (char_idx as f64 / 6.0) - (line_idx as f64 / 2.0);
            let t = wave_offset.sin() * 0.5 + 0.5;
            let r = (101.0 + (138.0 - 101.0) * t) as u8;
            let g = (150.0 + (72.0 - 150.0) * t) as u8;
            let b = (243.0 + (38.0 - 243.0) * t) as u8;

            spans.push(Span::styled(
                ch.to_string(),
                Style::default().fg(Color::Rgb(r, g, b)),
            ));
        }

        lines.push(Line::from(spans));
    }

    let logo = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(logo, area);
}

fn draw_generator(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout with padding
    let padded = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(app.config().sidebar_width),
            Constraint::Length(1), // Gap
            Constraint::Min(40),   // Form
        ])
        .split(padded);

    draw_sidebar(frame, app, main_chunks[0]);
    draw_form(frame, app, main_chunks[2]);

    if app.showing_command_popup() {
        draw_command_popup(frame, app, main_chunks[2]);
    }
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Service
            Constraint::Length(1), // Gap
            Constraint::Min(6),    // Session
            Constraint::Length(5), // Keyboard hints
        ])
        .split(area);

    draw_service_info(frame, app, chunks[0]);
    draw_session_info(frame, app, chunks[2]);
    draw_keyboard_hints(frame, chunks[3]);
}

fn draw_service_info(frame: &mut Frame, app: &App, area: Rect) {
    let (state, color) = match &app.health {
        ServiceHealth::Unknown => ("checking...".to_string(), TEXT_MUTED),
        ServiceHealth::Online { checked_at } => {
            (format!("online {}", checked_at.format("%H:%M:%S")), OLIVE)
        }
        ServiceHealth::Offline(reason) => (format!("unreachable: {}", reason), BURGUNDY),
    };

    let block = Block::default()
        .title(Span::styled(" Service ", Style::default().fg(SAPPHIRE)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(state, Style::default().fg(color))),
        Line::from(Span::styled(
            app.service_url.as_str(),
            Style::default().fg(TEXT_MUTED),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_session_info(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Output ", Style::default().fg(COPPER)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let last = app
        .last_finished_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(Span::styled("Saves to", Style::default().fg(TEXT_MUTED))),
        Line::from(Span::styled(
            app.destination().display().to_string(),
            Style::default().fg(PALE_YELLOW),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Last run ", Style::default().fg(TEXT_MUTED)),
            Span::styled(last, Style::default().fg(TEXT_SECONDARY)),
        ]),
        Line::from(vec![
            Span::styled("State    ", Style::default().fg(TEXT_MUTED)),
            Span::styled(app.status().label(), status_style(app.status())),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_keyboard_hints(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_DIM));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let hints = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("ESC", Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)),
            Span::styled(" quit  ", Style::default().fg(TEXT_MUTED)),
            Span::styled("/", Style::default().fg(COPPER).add_modifier(Modifier::BOLD)),
            Span::styled(" cmds", Style::default().fg(TEXT_MUTED)),
        ]),
        Line::from(vec![
            Span::styled("Tab", Style::default().fg(LAVENDER).add_modifier(Modifier::BOLD)),
            Span::styled(" field  ", Style::default().fg(TEXT_MUTED)),
            Span::styled("^L", Style::default().fg(LAVENDER).add_modifier(Modifier::BOLD)),
            Span::styled(" clear", Style::default().fg(TEXT_MUTED)),
        ]),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(OLIVE).add_modifier(Modifier::BOLD)),
            Span::styled(" generate", Style::default().fg(TEXT_MUTED)),
        ]),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(hints, inner);
}

fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    // Grow the prompt box with its content (min 3, max 10 rows)
    let prompt_width = area.width.saturating_sub(6) as usize;
    let prompt_lines = if prompt_width > 0 {
        app.prompt.width() / prompt_width + 1
    } else {
        1
    };
    let prompt_height = (prompt_lines as u16 + 2).clamp(3, 10);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Project name
            Constraint::Length(1),             // Gap
            Constraint::Length(prompt_height), // Prompt
            Constraint::Length(1),             // Gap
            Constraint::Length(3),             // Status
            Constraint::Length(1),             // Notice
            Constraint::Min(0),                // Examples
        ])
        .split(area);

    draw_project_name(frame, app, chunks[0]);
    draw_prompt(frame, app, chunks[2]);
    draw_status(frame, app, chunks[4]);
    draw_notice(frame, app, chunks[5]);
    draw_examples(frame, chunks[6]);
}

fn focus_border(app: &App, focus: Focus) -> Color {
    if app.ui.focus == focus {
        // Pulsing border when focused
        let glow = (app.animation_frame as f64 / 90.0).sin() * 0.3 + 0.7;
        Color::Rgb((101.0 * glow) as u8, (150.0 * glow) as u8, (243.0 * glow) as u8)
    } else {
        BORDER_DIM
    }
}

fn cursor(app: &App, focus: Focus) -> &'static str {
    if app.ui.focus == focus && app.animation_frame % 30 < 15 {
        "|"
    } else {
        " "
    }
}

fn draw_project_name(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Project name ", Style::default().fg(COPPER)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(focus_border(app, Focus::ProjectName)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = format!(" {}{}", app.project_name, cursor(app, Focus::ProjectName));
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(TEXT_PRIMARY)), inner);
}

fn draw_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Describe the project ", Style::default().fg(SAPPHIRE)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(focus_border(app, Focus::Prompt)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input = if app.prompt.is_empty() && app.ui.focus != Focus::Prompt {
        Paragraph::new(" > e.g. 'A blog in Flask with user auth and image uploads'")
            .style(Style::default().fg(TEXT_MUTED))
    } else {
        Paragraph::new(format!(" > {}{}", app.prompt, cursor(app, Focus::Prompt)))
            .style(Style::default().fg(TEXT_PRIMARY))
    };
    frame.render_widget(input.wrap(Wrap { trim: false }), inner);
}

fn status_style(status: &Status) -> Style {
    match status {
        Status::Idle => Style::default().fg(TEXT_MUTED),
        Status::InProgress => Style::default().fg(SAPPHIRE),
        Status::Success { .. } => Style::default().fg(OLIVE),
        Status::Error(_) => Style::default().fg(BURGUNDY).add_modifier(Modifier::BOLD),
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Status ", Style::default().fg(TEXT_SECONDARY)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let status = app.status();
    let mut spans = Vec::new();
    if status.is_in_progress() {
        let spinner = SPINNER[(app.animation_frame / 6) % SPINNER.len()];
        spans.push(Span::styled(format!(" {} ", spinner), Style::default().fg(CYAN_LIGHT)));
    } else {
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(status.to_string(), status_style(status)));

    frame.render_widget(Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }), inner);
}

fn draw_notice(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = &app.ui.notice {
        let line = Paragraph::new(format!(" {}", notice)).style(Style::default().fg(PALE_YELLOW));
        frame.render_widget(line, area);
    }
}

fn draw_examples(frame: &mut Frame, area: Rect) {
    if area.height < 3 {
        return;
    }
    let mut lines = vec![Line::from(Span::styled(
        " Examples:",
        Style::default().fg(TEXT_SECONDARY).add_modifier(Modifier::BOLD),
    ))];
    for example in EXAMPLE_PROMPTS {
        lines.push(Line::from(vec![
            Span::styled("   • ", Style::default().fg(COPPER)),
            Span::styled(format!("\"{}\"", example), Style::default().fg(TEXT_MUTED)),
        ]));
    }
    lines.push(Line::from(Span::styled(
        " The AI will try to produce a runnable scaffold.",
        Style::default().fg(TEXT_MUTED),
    )));

    let block = Block::default().borders(Borders::TOP).border_style(Style::default().fg(BORDER_DIM));
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_command_popup(frame: &mut Frame, app: &App, form_area: Rect) {
    let filtered = app.get_filtered_commands();
    if filtered.is_empty() {
        return;
    }

    // Below the project name and prompt boxes, kept inside the form
    let height = (filtered.len() as u16 + 2).min(form_area.height);
    let popup = Rect {
        x: form_area.x + 2,
        y: (form_area.y + 7).min(form_area.bottom().saturating_sub(height)),
        width: 40.min(form_area.width.saturating_sub(4)),
        height,
    }
    .intersection(form_area);
    if popup.height < 3 || popup.width < 3 {
        return;
    }

    let lines: Vec<Line> = filtered
        .iter()
        .enumerate()
        .map(|(i, (cmd, desc))| {
            let selected = app.ui.command_selection == Some(i);
            let cmd_style = if selected {
                Style::default().fg(BG_DARK).bg(SAPPHIRE).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(SAPPHIRE)
            };
            Line::from(vec![
                Span::styled(format!(" {:<8}", cmd), cmd_style),
                Span::styled(format!(" {}", desc), Style::default().fg(TEXT_MUTED)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(COPPER))
        .style(Style::default().bg(BG_DARK));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 50.min(area.width.saturating_sub(4));
    let height = (COMMANDS.len() as u16 + 6).min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
    .intersection(area);
    if popup.height < 3 || popup.width < 3 {
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        "Available commands",
        Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(""));
    for (cmd, desc) in COMMANDS {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<8}", cmd), Style::default().fg(SAPPHIRE)),
            Span::styled(*desc, Style::default().fg(TEXT_SECONDARY)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("ESC to close", Style::default().fg(TEXT_MUTED))));

    let block = Block::default()
        .title(Span::styled(" Help ", Style::default().fg(LAVENDER)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(LAVENDER))
        .style(Style::default().bg(BG_DARK));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
