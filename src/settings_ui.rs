use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use log::warn;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};
use std::path::Path;
use tui_input::{backend::crossterm::EventHandler, Input};

use whispr::models::{initials, Notice};
use whispr::profile::encode_data_uri;
use whispr::settings::{Setting, SettingKey, Settings, SettingsSection, Theme};
use whispr::SharedProfile;

use crate::ui::{draw_notice, draw_prompt, prompt_key, Palette, PathPrompt, PromptOutcome, UiEvent};

const STORAGE_USAGE: [(&str, &str); 4] = [
    ("Total Usage", "2.4 GB"),
    ("Chat Messages", "1.2 GB"),
    ("Media Files", "800 MB"),
    ("Cache", "400 MB"),
];

const CONNECTION_INFO: [(&str, &str); 3] = [
    ("Current Latency", "24ms"),
    ("Transport Protocol", "WebSocket"),
    ("Connection Status", "Connected"),
];

pub struct SettingsUI {
    settings: Settings,
    profile: SharedProfile,
    section: SettingsSection,
    row: usize,
    editing: Option<Input>,
    picture_prompt: Option<PathPrompt>,
    notice: Option<Notice>,
}

impl SettingsUI {
    pub fn new(settings: Settings, profile: SharedProfile) -> Self {
        SettingsUI {
            settings,
            profile,
            section: SettingsSection::default(),
            row: 0,
            editing: None,
            picture_prompt: None,
            notice: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Header shortcut on the chat screen: dark goes to light, anything else to dark.
    pub fn toggle_theme(&mut self) {
        let next = if self.settings.theme == Theme::Dark {
            Theme::Light
        } else {
            Theme::Dark
        };
        self.settings.update(Setting::Theme(next));
    }

    pub fn clean_notices(&mut self, timeout_secs: i64) {
        if let Some(notice) = &self.notice {
            if notice.is_expired(chrono::Utc::now(), timeout_secs) {
                self.notice = None;
            }
        }
    }

    fn current_key(&self) -> Option<SettingKey> {
        self.section.keys().get(self.row).copied()
    }

    fn switch_section(&mut self, section: SettingsSection) {
        self.section = section;
        self.row = 0;
    }

    fn set_picture(&mut self, path: &Path) {
        let result = encode_data_uri(path)
            .and_then(|uri| self.profile.borrow_mut().set(Some(uri)));
        self.notice = Some(match result {
            Ok(()) => Notice::new("Profile updated", "Your new picture is saved"),
            Err(e) => {
                warn!("Could not set profile picture from {}: {}", path.display(), e);
                Notice::new("Picture not changed", e.to_string())
            }
        });
    }

    fn remove_picture(&mut self) {
        if self.profile.borrow().image().is_none() {
            return;
        }
        let result = self.profile.borrow_mut().set(None);
        self.notice = Some(match result {
            Ok(()) => Notice::new("Profile updated", "Your picture has been removed"),
            Err(e) => {
                warn!("Could not remove profile picture: {}", e);
                Notice::new("Picture not changed", e.to_string())
            }
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiEvent> {
        if let Some(prompt) = self.picture_prompt.as_mut() {
            match prompt_key(prompt, key) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancelled | PromptOutcome::Submitted(None) => self.picture_prompt = None,
                PromptOutcome::Submitted(Some(path)) => {
                    self.picture_prompt = None;
                    self.set_picture(Path::new(&path));
                }
            }
            return None;
        }

        if let Some(input) = self.editing.as_mut() {
            match key.code {
                KeyCode::Esc => self.editing = None,
                KeyCode::Enter => {
                    let value = input.value().to_string();
                    self.editing = None;
                    if let Some(key) = self.current_key() {
                        self.settings.update(Setting::Text(key, value));
                    }
                }
                _ => {
                    input.handle_event(&Event::Key(key));
                }
            }
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                return Some(UiEvent::Quit);
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => return Some(UiEvent::CloseSettings),
            KeyCode::Right => self.switch_section(self.section.next()),
            KeyCode::Left => self.switch_section(self.section.previous()),
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => {
                let rows = self.section.keys().len();
                if self.row + 1 < rows {
                    self.row += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(key) = self.current_key() {
                    let current = self.settings.get(key);
                    match current {
                        Setting::Text(_, text) => self.editing = Some(Input::default().with_value(text)),
                        other => self.settings.update(other.cycle()),
                    }
                }
            }
            KeyCode::Char('p') if self.section == SettingsSection::Account => {
                self.picture_prompt = Some(PathPrompt::new("Profile picture path"));
            }
            KeyCode::Char('x') if self.section == SettingsSection::Account => self.remove_picture(),
            _ => {}
        }
        None
    }

    pub fn draw(&self, frame: &mut Frame, palette: &Palette) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tabs
                Constraint::Min(5),    // Section body
                Constraint::Length(1), // Help line
            ])
            .split(size);

        let selected = SettingsSection::ALL
            .iter()
            .position(|s| *s == self.section)
            .unwrap_or(0);
        let tabs = Tabs::new(SettingsSection::ALL.iter().map(|s| s.title()).collect::<Vec<_>>())
            .block(Block::default().borders(Borders::ALL).title("Settings"))
            .select(selected)
            .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[0]);

        match self.section {
            SettingsSection::About => self.draw_about(frame, chunks[1], palette),
            section => {
                let info = self.info_lines(section, palette);
                let body = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(info.len() as u16 + if info.is_empty() { 0 } else { 2 }),
                        Constraint::Min(3),
                    ])
                    .split(chunks[1]);
                if !info.is_empty() {
                    frame.render_widget(
                        Paragraph::new(info).block(Block::default().borders(Borders::ALL)),
                        body[0],
                    );
                }
                self.draw_rows(frame, body[1], palette);
            }
        }

        let help = match self.section {
            SettingsSection::Account => "Esc back | ←/→ tab | ↑/↓ row | Enter edit/toggle | p picture | x remove picture",
            _ => "Esc back | ←/→ tab | ↑/↓ row | Enter/Space change",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(help, Style::default().fg(palette.muted))),
            chunks[2],
        );

        if let Some(prompt) = &self.picture_prompt {
            draw_prompt(frame, prompt, size, palette);
        }
        if let Some(notice) = &self.notice {
            draw_notice(frame, notice, size, palette);
        }
    }

    // Read-only lines shown above the editable rows of a section.
    fn info_lines(&self, section: SettingsSection, palette: &Palette) -> Vec<Line<'static>> {
        let pair = |label: &str, value: &str| {
            Line::from(vec![
                Span::raw(format!("{:<22}", label)),
                Span::styled(value.to_string(), Style::default().fg(palette.accent)),
            ])
        };

        match section {
            SettingsSection::Account => {
                let profile = self.profile.borrow();
                let picture = match profile.image() {
                    Some(_) => "set".to_string(),
                    None => format!("none (showing {})", initials(&self.settings.name)),
                };
                vec![pair("Profile Picture", &picture)]
            }
            SettingsSection::Storage => STORAGE_USAGE.iter().map(|(l, v)| pair(l, v)).collect(),
            SettingsSection::Developer => CONNECTION_INFO.iter().map(|(l, v)| pair(l, v)).collect(),
            _ => Vec::new(),
        }
    }

    fn draw_rows(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let items: Vec<ListItem> = self
            .section
            .keys()
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let value = match (&self.editing, i == self.row) {
                    (Some(input), true) => format!("{}▏", input.value()),
                    _ => self.settings.get(*key).display_value(),
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<28}", key.label())),
                    Span::styled(value, Style::default().fg(palette.accent)),
                ]))
            })
            .collect();

        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(self.row));
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(self.section.title()))
            .highlight_style(Style::default().fg(palette.focus).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_about(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let lines = vec![
            Line::from(Span::styled(
                "Whispr",
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Version {}", env!("CARGO_PKG_VERSION"))),
            Line::from("Ultra-fast, secure instant messaging"),
            Line::from(""),
            Line::from("Terms of Service | Privacy Policy | Open Source Licenses | Contact Support"),
            Line::from(""),
            Line::from(Span::styled(
                "Made with ❤️ for secure communication",
                Style::default().fg(palette.muted),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("About Whispr")),
            area,
        );
    }
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

    fn settings_ui(dir: &Path) -> SettingsUI {
        let profile = ProfileStore::load(LocalStore::open(dir).unwrap()).shared();
        SettingsUI::new(Settings::default(), profile)
    }

    #[test]
    fn test_enter_cycles_theme() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = settings_ui(dir.path());

        ui.handle_key(key(KeyCode::Right));
        assert_eq!(ui.section, SettingsSection::Preferences);
        ui.handle_key(key(KeyCode::Enter));

        assert_eq!(ui.settings().theme, Theme::Light);
        let mut expected = Settings::default();
        expected.theme = Theme::Light;
        assert_eq!(ui.settings(), &expected);
    }

    #[test]
    fn test_edit_display_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = settings_ui(dir.path());

        ui.handle_key(key(KeyCode::Enter));
        for _ in 0.."John Doe".len() {
            ui.handle_key(key(KeyCode::Backspace));
        }
        for c in "Jane".chars() {
            ui.handle_key(key(KeyCode::Char(c)));
        }
        ui.handle_key(key(KeyCode::Enter));

        assert_eq!(ui.settings().name, "Jane");
        assert!(ui.editing.is_none());
    }

    #[test]
    fn test_escape_cancels_edit_then_leaves() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = settings_ui(dir.path());

        ui.handle_key(key(KeyCode::Enter));
        ui.handle_key(key(KeyCode::Char('!')));
        assert_eq!(ui.handle_key(key(KeyCode::Esc)), None);
        assert_eq!(ui.settings().name, "John Doe");

        assert_eq!(ui.handle_key(key(KeyCode::Esc)), Some(UiEvent::CloseSettings));
    }

    #[test]
    fn test_picture_prompt_sets_and_removes_image() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("me.png");
        std::fs::write(&image, [1u8, 2, 3]).unwrap();
        let mut ui = settings_ui(dir.path());

        ui.handle_key(key(KeyCode::Char('p')));
        for c in image.to_string_lossy().chars() {
            ui.handle_key(key(KeyCode::Char(c)));
        }
        ui.handle_key(key(KeyCode::Enter));
        assert_eq!(ui.profile.borrow().image(), Some("data:image/png;base64,AQID"));

        ui.handle_key(key(KeyCode::Char('x')));
        assert_eq!(ui.profile.borrow().image(), None);
    }

    #[test]
    fn test_bad_picture_shows_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = settings_ui(dir.path());

        ui.handle_key(key(KeyCode::Char('p')));
        for c in "notes.txt".chars() {
            ui.handle_key(key(KeyCode::Char(c)));
        }
        ui.handle_key(key(KeyCode::Enter));

        assert_eq!(ui.notice.as_ref().unwrap().title, "Picture not changed");
        assert_eq!(ui.profile.borrow().image(), None);
    }

    #[test]
    fn test_toggle_theme_flips_between_light_and_dark() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = settings_ui(dir.path());

        ui.toggle_theme();
        assert_eq!(ui.settings().theme, Theme::Dark);
        ui.toggle_theme();
        assert_eq!(ui.settings().theme, Theme::Light);
    }

    #[test]
    fn test_draw_every_section() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = settings_ui(dir.path());
        let mut terminal = ratatui::Terminal::new(TestBackend::new(100, 30)).unwrap();
        let palette = Palette::for_theme(Theme::Light);

        for _ in SettingsSection::ALL {
            terminal.draw(|f| ui.draw(f, &palette)).unwrap();
            ui.handle_key(key(KeyCode::Right));
        }
    }
}
