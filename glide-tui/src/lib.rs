use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use glide_core::session::{Session, SessionOptions};
use glide_nav::{LoadOutcome, NavMode};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::fs;
use std::io;
use std::path::PathBuf;
use tokio::runtime::Handle;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExitMode {
    None,
    Normal,      // exit, quit - ask about saving
    ForceQuit,   // :q! - don't save, don't ask
    WriteQuit,   // :wq!, ZZ - save and quit, don't ask
}

pub struct App {
    handle: Handle,
    session: Session,
    input: String,
    command_history: Vec<String>,
    output: Vec<String>,
    status: String,
    cursor_position: usize,
    should_quit: bool,
    scroll_offset: usize,
    history_index: Option<usize>,
    temp_input: String,
    exit_mode: ExitMode,
    awaiting_save_confirmation: bool,
}

impl App {
    pub fn new(handle: Handle, session: Session) -> Self {
        let mut app = Self {
            handle,
            session,
            input: String::new(),
            command_history: Vec::new(),
            output: Vec::new(),
            status: String::from("Type 'help' for commands"),
            cursor_position: 0,
            should_quit: false,
            scroll_offset: 0,
            history_index: None,
            temp_input: String::new(),
            exit_mode: ExitMode::None,
            awaiting_save_confirmation: false,
        };
        app.show_page();
        app
    }

    /// Replace the content pane with the current page.
    fn show_page(&mut self) {
        let mut lines = vec![format!("⌂ {}", self.session.location()), String::new()];
        for line in self.session.page().content_text().lines() {
            lines.push(line.trim_end().to_string());
        }
        self.output = lines;
        self.scroll_offset = 0;
    }

    fn show_links(&mut self) {
        let mut lines = vec![String::from("Sidebar links:"), String::new()];
        for link in self.session.page().sidebar() {
            let marker = if link.active { "●" } else { " " };
            lines.push(format!("  {} {:<20} {}", marker, link.label, link.href));
        }
        if self.session.page().sidebar().is_empty() {
            lines.push(String::from("  (none found)"));
        }
        self.output = lines;
        self.scroll_offset = 0;
    }

    fn show_history(&mut self) {
        let mut lines = vec![String::from("Navigation history:"), String::new()];
        for (idx, entry) in self.session.history().entries().iter().enumerate() {
            let cursor = if idx == self.session.history().cursor() { "▸" } else { " " };
            let kind = if entry.ajax { "ajax" } else { "full" };
            lines.push(format!("  {} [{}] {}", cursor, kind, entry.href));
        }
        self.output = lines;
        self.scroll_offset = 0;
    }

    fn show_help(&mut self) {
        self.output = vec![
            "Available commands:".to_string(),
            "  open <href>       - Navigate to a link (dashboard links load as fragments)".to_string(),
            "  back              - History back".to_string(),
            "  forward           - History forward".to_string(),
            "  section [name]    - Load /dashboard or /dashboard?section=<name>".to_string(),
            "  links             - List sidebar links (● marks the active one)".to_string(),
            "  history           - Show the navigation history stack".to_string(),
            "  page              - Show the current content region".to_string(),
            "  clear             - Clear the content pane".to_string(),
            "  help              - Show this help message".to_string(),
            "  exit, quit        - Exit the browser".to_string(),
        ];
        self.scroll_offset = 0;
    }

    fn describe_outcome(outcome: &LoadOutcome) -> String {
        let mode = match outcome.mode {
            NavMode::Fragment => "fragment",
            NavMode::FullLoad => "full load",
        };
        let mut status = format!(
            "✓ {} {} ({}) in {}ms",
            mode,
            outcome.url,
            outcome.status_code,
            outcome.response_time.as_millis()
        );
        if let Some(ref reason) = outcome.fallback_reason {
            status.push_str(&format!(" - fell back: {}", reason));
        }
        status
    }

    fn apply_navigation(&mut self, result: anyhow::Result<Option<LoadOutcome>>) {
        match result {
            Ok(Some(outcome)) => {
                self.status = Self::describe_outcome(&outcome);
                self.show_page();
            }
            Ok(None) => {
                self.status = String::from("Nothing there - history edge reached");
            }
            Err(e) => {
                self.status = format!("✗ {}", e);
            }
        }
    }

    fn get_history_file_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde("~/.glide_history").as_ref())
    }

    pub fn load_command_history(&mut self) {
        let path = Self::get_history_file_path();
        if let Ok(content) = fs::read_to_string(&path) {
            let mut lines: Vec<String> = content.lines().map(|s| s.to_string()).collect();

            // Keep only the last 100 entries
            if lines.len() > 100 {
                lines.drain(0..lines.len() - 100);
            }

            self.command_history = lines;
        }
    }

    pub fn save_command_history(&self) -> Result<()> {
        let path = Self::get_history_file_path();
        let content = self.command_history.join("\n");
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn navigate_history_backward(&mut self) {
        if self.command_history.is_empty() {
            return;
        }

        // If starting history navigation, save current input
        if self.history_index.is_none() {
            self.temp_input = self.input.clone();
        }

        let new_index = match self.history_index {
            None => Some(self.command_history.len() - 1),
            Some(0) => Some(0), // Already at oldest
            Some(idx) => Some(idx - 1),
        };

        if let Some(idx) = new_index {
            self.history_index = new_index;
            self.input = self.command_history[idx].clone();
            self.cursor_position = self.input.len();
        }
    }

    pub fn navigate_history_forward(&mut self) {
        if self.command_history.is_empty() || self.history_index.is_none() {
            return;
        }

        let new_index = match self.history_index {
            Some(idx) if idx >= self.command_history.len() - 1 => {
                // Reached the end, restore temp input
                self.input = self.temp_input.clone();
                self.cursor_position = self.input.len();
                self.history_index = None;
                self.temp_input.clear();
                return;
            }
            Some(idx) => Some(idx + 1),
            None => None,
        };

        if let Some(idx) = new_index {
            self.history_index = new_index;
            self.input = self.command_history[idx].clone();
            self.cursor_position = self.input.len();
        }
    }

    fn request_exit(&mut self, mode: ExitMode) {
        self.exit_mode = mode;

        match mode {
            ExitMode::Normal => {
                if !self.command_history.is_empty() {
                    self.awaiting_save_confirmation = true;
                    self.status =
                        String::from("Save command history to ~/.glide_history? [y/N]:");
                } else {
                    self.should_quit = true;
                }
            }
            ExitMode::ForceQuit => {
                self.should_quit = true;
            }
            ExitMode::WriteQuit => {
                if !self.command_history.is_empty() {
                    if let Err(e) = self.save_command_history() {
                        self.status = format!("Error saving history: {}", e);
                    }
                }
                self.should_quit = true;
            }
            ExitMode::None => {}
        }
    }

    fn handle_save_confirmation(&mut self, response: &str) {
        self.awaiting_save_confirmation = false;

        let response = response.trim().to_lowercase();
        if response == "y" || response == "yes" {
            if let Err(e) = self.save_command_history() {
                self.status = format!("Error saving history: {}", e);
            } else {
                self.status = String::from("History saved to ~/.glide_history");
            }
        }
        self.should_quit = true;
    }

    pub fn handle_input(&mut self, input: String) {
        if input.is_empty() {
            return;
        }

        // If awaiting save confirmation, handle it separately
        if self.awaiting_save_confirmation {
            self.handle_save_confirmation(&input);
            return;
        }

        // Add command to history and limit to 100 items
        self.command_history.push(input.clone());
        if self.command_history.len() > 100 {
            self.command_history.remove(0);
        }

        // Reset history navigation
        self.history_index = None;
        self.temp_input.clear();

        let parts: Vec<&str> = input.trim().split_whitespace().collect();
        if parts.is_empty() {
            return;
        }

        match parts[0] {
            "exit" | "quit" => {
                self.request_exit(ExitMode::Normal);
            }
            ":q!" => {
                self.request_exit(ExitMode::ForceQuit);
            }
            ":wq!" | "ZZ" => {
                self.request_exit(ExitMode::WriteQuit);
            }
            "help" => {
                self.show_help();
            }
            "clear" => {
                self.output.clear();
                self.status = String::from("Cleared - 'page' brings the content back");
            }
            "open" => {
                if let Some(href) = parts.get(1) {
                    let href = href.to_string();
                    let result = self
                        .handle
                        .block_on(self.session.navigate(&href))
                        .map(Some)
                        .map_err(anyhow::Error::from);
                    self.apply_navigation(result);
                } else {
                    self.status = String::from("Error: open requires an href");
                }
            }
            "back" => {
                let result = self
                    .handle
                    .block_on(self.session.back())
                    .map_err(anyhow::Error::from);
                self.apply_navigation(result);
            }
            "forward" => {
                let result = self
                    .handle
                    .block_on(self.session.forward())
                    .map_err(anyhow::Error::from);
                self.apply_navigation(result);
            }
            "section" => {
                let section = parts.get(1).copied();
                let result = self
                    .handle
                    .block_on(self.session.load_section(section))
                    .map(Some)
                    .map_err(anyhow::Error::from);
                self.apply_navigation(result);
            }
            "links" => {
                self.show_links();
            }
            "history" => {
                self.show_history();
            }
            "page" => {
                self.show_page();
            }
            _ => {
                self.status = format!("Unknown command: {} ('help' lists commands)", parts[0]);
            }
        }
    }
}

pub fn run(handle: Handle, start_url: Url) -> Result<()> {
    // Start the session before touching the terminal so connection
    // errors print normally.
    let session = handle.block_on(Session::start(SessionOptions::new(start_url.as_str())))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(handle, session);

    // Load command history from file
    app.load_command_history();

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Only process KeyPress events, ignore KeyRelease
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char(c) => {
                    app.input.insert(app.cursor_position, c);
                    app.cursor_position += 1;
                    // Reset history navigation when typing
                    app.history_index = None;
                    app.temp_input.clear();
                }
                KeyCode::Backspace => {
                    if app.cursor_position > 0 {
                        app.input.remove(app.cursor_position - 1);
                        app.cursor_position -= 1;
                        app.history_index = None;
                        app.temp_input.clear();
                    }
                }
                KeyCode::Enter => {
                    let input = app.input.drain(..).collect();
                    app.cursor_position = 0;
                    app.handle_input(input);
                }
                KeyCode::Up => {
                    app.navigate_history_backward();
                }
                KeyCode::Down => {
                    app.navigate_history_forward();
                }
                KeyCode::Left => {
                    if app.cursor_position > 0 {
                        app.cursor_position -= 1;
                    }
                }
                KeyCode::Right => {
                    if app.cursor_position < app.input.len() {
                        app.cursor_position += 1;
                    }
                }
                KeyCode::Home => {
                    app.cursor_position = 0;
                }
                KeyCode::End => {
                    app.cursor_position = app.input.len();
                }
                KeyCode::Esc => {
                    app.should_quit = true;
                }
                KeyCode::PageUp => {
                    app.scroll_offset = app.scroll_offset.saturating_sub(10);
                }
                KeyCode::PageDown => {
                    app.scroll_offset =
                        (app.scroll_offset + 10).min(app.output.len().saturating_sub(1));
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Sidebar + content
            Constraint::Length(1), // Input area
            Constraint::Length(1), // Horizontal rule
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(10)])
        .split(chunks[0]);

    // Sidebar pane: nav links, active one highlighted
    let items: Vec<ListItem> = app
        .session
        .page()
        .sidebar()
        .iter()
        .map(|link| {
            let style = if link.active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };
            let marker = if link.active { "● " } else { "  " };
            ListItem::new(format!("{}{}", marker, link.label)).style(style)
        })
        .collect();

    let sidebar = List::new(items).block(
        Block::default()
            .title(" sidebar ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(sidebar, panes[0]);

    // Content pane - scrollable
    let content_height = panes[1].height.saturating_sub(2) as usize;
    let total_lines = app.output.len();

    // Auto-scroll to top on new content, clamp manual scrolling
    let scroll_offset = app
        .scroll_offset
        .min(total_lines.saturating_sub(content_height));

    let visible_output: Vec<Line> = app
        .output
        .iter()
        .skip(scroll_offset)
        .take(content_height)
        .map(|line| Line::from(line.clone()))
        .collect();

    let content = Paragraph::new(visible_output)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .title(format!(" {} ", app.session.location().path()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(content, panes[1]);

    // Input area with prompt
    let prompt = "gld> ";
    let input_text = format!("{}{}", prompt, app.input);
    let input = Paragraph::new(input_text).style(Style::default().fg(Color::Yellow));
    f.render_widget(input, chunks[1]);

    // Set cursor position (accounting for prompt)
    f.set_cursor_position((
        chunks[1].x + prompt.len() as u16 + app.cursor_position as u16,
        chunks[1].y,
    ));

    // Horizontal rule above status
    let rule = Paragraph::new("─".repeat(chunks[2].width as usize))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(rule, chunks[2]);

    // Status bar
    let status = Paragraph::new(Line::from(vec![
        Span::raw(app.status.clone()),
        Span::raw("  |  "),
        Span::styled("ESC", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit  "),
        Span::styled("↑↓", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" history  "),
        Span::styled("PgUp/PgDn", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" scroll"),
    ]))
    .style(Style::default().fg(Color::DarkGray));

    f.render_widget(status, chunks[3]);
}
