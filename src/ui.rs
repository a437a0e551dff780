use anyhow::Result;
use crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::io;
use std::path::Path;
use textwrap::wrap;
use tui_input::{backend::crossterm::EventHandler, Input};

use whispr::chat::{random_emoji, ChatSession};
use whispr::models::{DeliveryStatus, Message, Notice, Sender, UNKNOWN_CONTACT};
use whispr::settings::Theme;
use whispr::{SharedProfile, SimulatedReceipts, StatusUpdate};

// Export types needed by main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

/// Navigation requests a screen hands back to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Quit,
    OpenSettings,
    CloseSettings,
    ToggleTheme,
}

/// Colours derived from the theme setting.
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub focus: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                accent: Color::Rgb(234, 88, 12),
                text: Color::Black,
                muted: Color::DarkGray,
                focus: Color::Blue,
            },
            Theme::Dark | Theme::System => Palette {
                accent: Color::Rgb(251, 146, 60),
                text: Color::White,
                muted: Color::Gray,
                focus: Color::Yellow,
            },
        }
    }
}

/// A one-line path entry popup (attachments, profile pictures).
pub struct PathPrompt {
    pub title: &'static str,
    pub input: Input,
}

impl PathPrompt {
    pub fn new(title: &'static str) -> Self {
        PathPrompt {
            title,
            input: Input::default(),
        }
    }
}

/// Result of feeding one key to a [`PathPrompt`].
pub enum PromptOutcome {
    Pending,
    Cancelled,
    /// Entered path, `None` when the line was blank.
    Submitted(Option<String>),
}

pub fn prompt_key(prompt: &mut PathPrompt, key: KeyEvent) -> PromptOutcome {
    match key.code {
        KeyCode::Esc => PromptOutcome::Cancelled,
        KeyCode::Enter => {
            let value = prompt.input.value().trim();
            if value.is_empty() {
                PromptOutcome::Submitted(None)
            } else {
                PromptOutcome::Submitted(Some(value.to_string()))
            }
        }
        _ => {
            prompt.input.handle_event(&Event::Key(key));
            PromptOutcome::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Contacts,
    Search,
    Message,
}

pub struct ChatUI {
    session: ChatSession,
    receipts: SimulatedReceipts,
    profile: SharedProfile,
    input: Input,
    search: Input,
    focus: Focus,
    attach_prompt: Option<PathPrompt>,
    notice: Option<Notice>,
}

impl ChatUI {
    pub fn new(session: ChatSession, receipts: SimulatedReceipts, profile: SharedProfile) -> Self {
        ChatUI {
            session,
            receipts,
            profile,
            input: Input::default(),
            search: Input::default(),
            focus: Focus::Message,
            attach_prompt: None,
            notice: None,
        }
    }

    pub fn apply_status(&mut self, update: StatusUpdate) {
        self.session
            .conversation_mut()
            .apply_status(&update.id, update.status);
    }

    fn show_notice(&mut self, notice: Notice) {
        debug!("UI: notice '{}': {}", notice.title, notice.description);
        self.notice = Some(notice);
    }

    pub fn clean_notices(&mut self, timeout_secs: i64) {
        if let Some(notice) = &self.notice {
            if notice.is_expired(chrono::Utc::now(), timeout_secs) {
                self.notice = None;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiEvent> {
        if let Some(prompt) = self.attach_prompt.as_mut() {
            match prompt_key(prompt, key) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancelled => self.attach_prompt = None,
                PromptOutcome::Submitted(path) => {
                    self.attach_prompt = None;
                    if let Some(notice) = self.session.attach(path.as_deref().map(Path::new)) {
                        self.show_notice(notice);
                    }
                }
            }
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Some(UiEvent::Quit),
                KeyCode::Char('s') => return Some(UiEvent::OpenSettings),
                KeyCode::Char('t') => return Some(UiEvent::ToggleTheme),
                KeyCode::Char('p') => {
                    let id = self.session.selected_id().clone();
                    let notice = self.session.toggle_pin(&id);
                    self.show_notice(notice);
                }
                KeyCode::Char('f') => self.focus = Focus::Search,
                KeyCode::Char('v') => {
                    let notice = self.session.voice_call();
                    self.show_notice(notice);
                }
                KeyCode::Char('g') => {
                    let notice = self.session.video_call();
                    self.show_notice(notice);
                }
                KeyCode::Char('a') => self.attach_prompt = Some(PathPrompt::new("Attach file")),
                KeyCode::Char('r') => {
                    let notice = self.session.toggle_recording();
                    self.show_notice(notice);
                }
                KeyCode::Char('e') => {
                    let emoji = random_emoji(&mut rand::thread_rng());
                    let value = format!("{}{}", self.input.value(), emoji);
                    self.input = Input::default().with_value(value);
                }
                _ => {}
            }
            return None;
        }

        match (self.focus, key.code) {
            (Focus::Search, KeyCode::Esc | KeyCode::Enter | KeyCode::Down) => {
                self.focus = Focus::Contacts;
            }
            (_, KeyCode::Esc) => return Some(UiEvent::Quit),
            (_, KeyCode::Tab) => {
                self.focus = match self.focus {
                    Focus::Contacts => Focus::Message,
                    Focus::Search | Focus::Message => Focus::Contacts,
                };
            }
            (Focus::Contacts, KeyCode::Up) => self.session.select_previous(),
            (Focus::Contacts, KeyCode::Down) => self.session.select_next(),
            (Focus::Contacts, KeyCode::Enter) => self.focus = Focus::Message,
            (Focus::Search, _) => {
                self.search.handle_event(&Event::Key(key));
                self.session.set_search(self.search.value());
            }
            (Focus::Message, KeyCode::Enter) => {
                if self.session.send(self.input.value(), &self.receipts).is_some() {
                    info!("UI: message sent to {}", self.session.selected_id());
                    self.input = Input::default();
                }
            }
            (Focus::Message, _) => {
                self.input.handle_event(&Event::Key(key));
            }
            _ => {}
        }
        None
    }

    pub fn draw(&self, frame: &mut Frame, palette: &Palette) {
        let size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar
                Constraint::Percentage(70), // Chat panel
            ])
            .split(size);

        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // App header
                Constraint::Length(3), // Search
                Constraint::Min(3),    // Contacts
            ])
            .split(chunks[0]);

        let chat = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Contact header
                Constraint::Min(5),    // Messages
                Constraint::Length(3), // Input box
                Constraint::Length(1), // Help line
            ])
            .split(chunks[1]);

        self.draw_app_header(frame, sidebar[0], palette);
        self.draw_search(frame, sidebar[1], palette);
        self.draw_contacts(frame, sidebar[2], palette);
        self.draw_contact_header(frame, chat[0], palette);
        draw_messages(frame, self.session.conversation().messages(), chat[1], self, palette);

        let input_widget = Paragraph::new(self.input.value()).block(
            Block::default()
                .title("Type a message...")
                .borders(Borders::ALL)
                .border_style(self.border(Focus::Message, palette)),
        );
        frame.render_widget(input_widget, chat[2]);

        let mut help_spans = vec![Span::styled(
            "Esc quit | Tab focus | ^F search | ^P pin | ^V call | ^G video | ^A attach | ^R record | ^E emoji | ^T theme | ^S settings",
            Style::default().fg(palette.muted),
        )];
        if self.session.is_recording() {
            help_spans.push(Span::styled(
                "  ● REC",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(help_spans)), chat[3]);

        match self.focus {
            Focus::Message => frame.set_cursor(
                chat[2].x + self.input.cursor() as u16 + 1,
                chat[2].y + 1,
            ),
            Focus::Search => frame.set_cursor(
                sidebar[1].x + self.search.cursor() as u16 + 1,
                sidebar[1].y + 1,
            ),
            Focus::Contacts => {}
        }

        if let Some(prompt) = &self.attach_prompt {
            draw_prompt(frame, prompt, size, palette);
        }
        if let Some(notice) = &self.notice {
            draw_notice(frame, notice, size, palette);
        }
    }

    fn border(&self, focus: Focus, palette: &Palette) -> Style {
        if self.focus == focus {
            Style::default().fg(palette.focus)
        } else {
            Style::default()
        }
    }

    fn draw_app_header(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let avatar = if self.profile.borrow().image().is_some() {
            "🖼  picture set"
        } else {
            "👤 no picture"
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "Whispr",
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", avatar), Style::default().fg(palette.muted)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let search = Paragraph::new(self.search.value()).block(
            Block::default()
                .title("Search conversations...")
                .borders(Borders::ALL)
                .border_style(self.border(Focus::Search, palette)),
        );
        frame.render_widget(search, area);
    }

    fn draw_contacts(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let selected = self.session.selected_id();
        let items: Vec<ListItem> = self
            .session
            .visible_contacts()
            .into_iter()
            .map(|c| {
                let marker = if &c.id == selected { "> " } else { "  " };
                let online = if c.is_online { "● " } else { "○ " };
                let pin = if c.is_pinned { " 📌" } else { "" };
                let unread = if c.unread_count > 0 {
                    format!(" ({})", c.unread_count)
                } else {
                    String::new()
                };

                let title = Line::from(vec![
                    Span::raw(marker),
                    Span::styled(
                        online,
                        Style::default().fg(if c.is_online { Color::Green } else { palette.muted }),
                    ),
                    Span::styled(c.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(pin),
                    Span::styled(format!("  {}", c.timestamp), Style::default().fg(palette.muted)),
                ]);
                let preview_style = if c.is_typing {
                    Style::default().fg(palette.accent)
                } else {
                    Style::default().fg(palette.muted)
                };
                let preview = Line::from(vec![
                    Span::raw("    "),
                    Span::styled(c.preview().to_string(), preview_style),
                    Span::styled(unread, Style::default().fg(palette.accent)),
                ]);
                ListItem::new(vec![title, preview])
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Chats (Tab to focus)")
                .borders(Borders::ALL)
                .border_style(self.border(Focus::Contacts, palette)),
        );
        frame.render_widget(list, area);
    }

    fn draw_contact_header(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let line = match self.session.selected_contact() {
            Some(contact) => Line::from(vec![
                Span::styled(
                    match &contact.avatar {
                        Some(_) => "[🖼] ".to_string(),
                        None => format!("[{}] ", contact.initials()),
                    },
                    Style::default().fg(palette.accent),
                ),
                Span::styled(contact.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  {}", contact.presence_line()),
                    Style::default().fg(palette.muted),
                ),
            ]),
            None => Line::from(UNKNOWN_CONTACT),
        };
        frame.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}

fn status_indicator(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Sending => " …",
        DeliveryStatus::Sent => " ✓",
        DeliveryStatus::Delivered | DeliveryStatus::Read => " ✓✓",
    }
}

fn draw_messages(
    f: &mut Frame,
    messages: &[Message],
    area: Rect,
    ui: &ChatUI,
    palette: &Palette,
) {
    let wrap_width = area.width.saturating_sub(2).max(1) as usize; // Account for borders
    let contact_name = ui
        .session
        .selected_contact()
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN_CONTACT);

    let items: Vec<ListItem> = messages
        .iter()
        .flat_map(|m| {
            let time = m
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%H:%M")
                .to_string();

            let (full_content, style) = match m.sender {
                Sender::Me => {
                    let style = match m.status {
                        DeliveryStatus::Sending => Style::default().fg(palette.muted),
                        DeliveryStatus::Sent | DeliveryStatus::Delivered => {
                            Style::default().fg(palette.text)
                        }
                        DeliveryStatus::Read => Style::default().fg(palette.accent),
                    };
                    (
                        format!("[{}] You: {}{}", time, m.text, status_indicator(m.status)),
                        style,
                    )
                }
                Sender::Other => (
                    format!("[{}] {}: {}", time, contact_name, m.text),
                    Style::default().fg(palette.text),
                ),
            };

            let wrapped_lines: Vec<String> = wrap(&full_content, wrap_width)
                .into_iter()
                .map(|l| l.into_owned())
                .collect();

            wrapped_lines
                .into_iter()
                .map(move |line| ListItem::new(Text::from(line)).style(style))
        })
        .collect();

    // Selecting the last row keeps the newest message in view
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(items.len() - 1));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Messages"))
        .highlight_style(Style::default());
    f.render_stateful_widget(list, area, &mut list_state);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect::new(
        (area.width.saturating_sub(width)) / 2,
        (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

pub fn draw_prompt(f: &mut Frame, prompt: &PathPrompt, area: Rect, palette: &Palette) {
    let popup = popup_area(area, 60, 5);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!("{} (Enter to confirm, Esc to cancel)", prompt.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.focus));
    let input = Paragraph::new(prompt.input.value()).block(block);
    f.render_widget(input, popup);
    f.set_cursor(
        popup.x + prompt.input.cursor() as u16 + 1,
        popup.y + 1,
    );
}

pub fn draw_notice(f: &mut Frame, notice: &Notice, area: Rect, palette: &Palette) {
    let width = 44.min(area.width.saturating_sub(4));
    let height = 5.min(area.height.saturating_sub(2));
    let popup = Rect::new(area.width.saturating_sub(width + 2), 1, width, height);

    let block = Block::default()
        .title(notice.title.as_str())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let inner_width = width.saturating_sub(4).max(1) as usize;
    let lines: Vec<Line> = wrap(&notice.description, inner_width)
        .into_iter()
        .map(|l| Line::from(l.into_owned()))
        .collect();

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().fg(palette.text)),
        popup,
    );
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use whispr::profile::ProfileStore;
    use whispr::storage::LocalStore;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(ui: &mut ChatUI, text: &str) {
        for c in text.chars() {
            ui.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn chat_ui(dir: &Path) -> ChatUI {
        let profile = ProfileStore::load(LocalStore::open(dir).unwrap()).shared();
        let (receipts, _rx) = SimulatedReceipts::new();
        ChatUI::new(ChatSession::seeded(), receipts, profile)
    }

    #[tokio::test]
    async fn test_enter_sends_and_clears_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = chat_ui(dir.path());

        type_text(&mut ui, "hi there");
        ui.handle_key(key(KeyCode::Enter));

        let last = ui.session.conversation().messages().last().unwrap();
        assert_eq!(last.text, "hi there");
        assert_eq!(ui.input.value(), "");
    }

    #[tokio::test]
    async fn test_blank_enter_keeps_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = chat_ui(dir.path());

        type_text(&mut ui, "   ");
        ui.handle_key(key(KeyCode::Enter));

        assert_eq!(ui.session.conversation().len(), 3);
        assert_eq!(ui.input.value(), "   ");
    }

    #[test]
    fn test_pin_shortcut_shows_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = chat_ui(dir.path());

        ui.handle_key(ctrl('p'));

        let notice = ui.notice.as_ref().unwrap();
        assert_eq!(notice.title, "Chat unpinned");
        assert_eq!(notice.description, "Alex Johnson has been unpinned");
    }

    #[test]
    fn test_search_filters_contacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = chat_ui(dir.path());

        ui.handle_key(ctrl('f'));
        type_text(&mut ui, "SAR");

        let names: Vec<&str> = ui
            .session
            .visible_contacts()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Sarah Chen"]);
    }

    #[test]
    fn test_blank_attach_prompt_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = chat_ui(dir.path());

        ui.handle_key(ctrl('a'));
        assert!(ui.attach_prompt.is_some());
        ui.handle_key(key(KeyCode::Enter));

        assert!(ui.attach_prompt.is_none());
        assert!(ui.notice.is_none());
    }

    #[test]
    fn test_navigation_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = chat_ui(dir.path());

        assert_eq!(ui.handle_key(ctrl('s')), Some(UiEvent::OpenSettings));
        assert_eq!(ui.handle_key(ctrl('t')), Some(UiEvent::ToggleTheme));
        assert_eq!(ui.handle_key(key(KeyCode::Esc)), Some(UiEvent::Quit));
    }

    #[tokio::test]
    async fn test_newest_message_stays_in_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = chat_ui(dir.path());
        for i in 1..=40 {
            type_text(&mut ui, &format!("note number {}", i));
            ui.handle_key(key(KeyCode::Enter));
        }

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        let palette = Palette::for_theme(Theme::Light);
        terminal.draw(|f| ui.draw(f, &palette)).unwrap();

        let buffer = terminal.backend().buffer();
        let rows: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol.as_str())
                    .collect()
            })
            .collect();
        assert!(rows.iter().any(|row| row.contains("note number 40")));
        assert!(!rows.iter().any(|row| row.contains("note number 1 ")));
    }

    #[test]
    fn test_draw_smoke() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = chat_ui(dir.path());
        ui.handle_key(ctrl('v'));

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        let palette = Palette::for_theme(Theme::Dark);
        terminal.draw(|f| ui.draw(f, &palette)).unwrap();
    }
}
