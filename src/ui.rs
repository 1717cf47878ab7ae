use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::path::PathBuf;
use std::{io, time::Duration};
use textwrap::wrap;
use tui_input::{backend::crossterm::EventHandler, Input};

use quadchat::chat::{ChatSession, ConversationDirectory, MessageStore, SessionState, SimulatorConfig};
use quadchat::models::{Conversation, ConversationKind, Message, MessageKind};

// Export types needed by the main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

/// Commands the UI hands back to the main loop for side effects it does
/// not own (persistence, file I/O).
#[derive(Debug, PartialEq)]
pub enum UiCommand {
    /// A conversation was picked from the list.
    OpenChat(String),
    /// The user asked to attach an image from disk.
    SendImage(PathBuf),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum View {
    ConversationList,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tab {
    Private,
    Group,
}

impl Tab {
    fn kind(self) -> ConversationKind {
        match self {
            Tab::Private => ConversationKind::Private,
            Tab::Group => ConversationKind::Group,
        }
    }
}

pub struct ChatUI {
    directory: ConversationDirectory,
    store: MessageStore,
    simulator_config: SimulatorConfig,
    view: View,
    active_tab: Tab,
    list_state: ListState,
    input: Input,
    session: Option<ChatSession>,
    status: Option<String>,
}

impl ChatUI {
    pub fn new(
        directory: ConversationDirectory,
        store: MessageStore,
        simulator_config: SimulatorConfig,
    ) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        ChatUI {
            directory,
            store,
            simulator_config,
            view: View::ConversationList,
            active_tab: Tab::Private,
            list_state,
            input: Input::default(),
            session: None,
            status: None,
        }
    }

    /// Open a conversation by identifier: a directory id from the list,
    /// or a raw deep-link value. Both go through the same session path.
    pub fn open_chat(&mut self, identifier: Option<&str>) {
        if let Some(mut old) = self.session.take() {
            old.close();
        }
        let session = ChatSession::open_with_config(
            identifier,
            &self.directory,
            self.store.clone(),
            self.simulator_config,
        );
        self.session = Some(session);
        self.input.reset();
        self.status = None;
        self.view = View::Chat;
    }

    /// Select a conversation in the list view, if present.
    pub fn preselect(&mut self, id: &str) {
        let listed = self.directory.list(Some(self.active_tab.kind()));
        if let Some(index) = listed.iter().position(|c| c.id == id) {
            self.list_state.select(Some(index));
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut ChatSession> {
        self.session.as_mut()
    }

    /// Pull any pending simulated messages into the open transcript.
    /// Returns true if the screen needs a redraw.
    pub fn pump_simulated(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let appended = session.drain_simulated();
        if appended > 0 {
            debug!("{} simulated message(s) appended", appended);
        }
        appended > 0
    }

    fn close_chat(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        self.input.reset();
        self.status = None;
        self.view = View::ConversationList;
    }

    fn listed_conversations(&self) -> Vec<&Conversation> {
        self.directory.list(Some(self.active_tab.kind()))
    }

    fn switch_tab(&mut self) {
        self.active_tab = match self.active_tab {
            Tab::Private => Tab::Group,
            Tab::Group => Tab::Private,
        };
        self.list_state.select(Some(0));
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.listed_conversations().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.list_state.select(Some(next as usize));
    }

    /// Poll for one input event and translate it. Mirrors the draw split:
    /// list keys in the list view, compose keys in the chat view.
    pub fn handle_input(&mut self) -> Result<Option<UiCommand>> {
        if !event::poll(Duration::from_millis(10))? {
            return Ok(None);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }

        // Ctrl+C quits from anywhere
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(UiCommand::Quit));
        }

        match self.view {
            View::ConversationList => self.handle_list_key(key.code),
            View::Chat => self.handle_chat_key(key),
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) -> Result<Option<UiCommand>> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(UiCommand::Quit)),
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => self.switch_tab(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter => {
                let selected = self
                    .list_state
                    .selected()
                    .and_then(|i| self.listed_conversations().get(i).map(|c| c.id.clone()));
                if let Some(id) = selected {
                    info!("conversation {} selected from the list", id);
                    return Ok(Some(UiCommand::OpenChat(id)));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn handle_chat_key(&mut self, key: event::KeyEvent) -> Result<Option<UiCommand>> {
        let not_found = self
            .session
            .as_ref()
            .map_or(true, |s| s.state() == SessionState::NotFound);
        if not_found {
            // Terminal display state: only leaving is possible
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.close_chat(),
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => self.close_chat(),
            KeyCode::Enter => {
                let line = self.input.value().trim().to_string();
                self.input.reset();
                if let Some(path) = line.strip_prefix("/image ") {
                    let path = path.trim();
                    if !path.is_empty() {
                        return Ok(Some(UiCommand::SendImage(PathBuf::from(path))));
                    }
                } else if let Some(session) = self.session.as_mut() {
                    // Blank input is a silent no-op inside the session
                    session.send(&line);
                }
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
            }
        }
        Ok(None)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn draw<B: Backend>(&mut self, frame: &mut Frame<B>) {
        match self.view {
            View::ConversationList => self.draw_conversation_list(frame),
            View::Chat => self.draw_chat(frame),
        }
    }

    fn draw_conversation_list<B: Backend>(&mut self, frame: &mut Frame<B>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Tabs
                Constraint::Min(1),    // Conversation list
                Constraint::Length(1), // Help line
            ])
            .split(frame.size());

        let tab_line = Line::from(vec![
            Span::styled(
                " Private Chats ",
                tab_style(self.active_tab == Tab::Private),
            ),
            Span::raw(" "),
            Span::styled(" Group Chats ", tab_style(self.active_tab == Tab::Group)),
        ]);
        frame.render_widget(
            Paragraph::new(tab_line).block(Block::default().borders(Borders::BOTTOM)),
            chunks[0],
        );

        let items: Vec<ListItem> = self
            .listed_conversations()
            .iter()
            .map(|c| conversation_list_item(c))
            .collect();

        if items.is_empty() {
            let empty = Paragraph::new("No conversations yet\nStart chatting with your friends!")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(empty, chunks[1]);
        } else {
            let list = List::new(items)
                .block(Block::default().borders(Borders::NONE))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
        }

        let help = Paragraph::new("↑/↓ select · Enter open · Tab switch · q quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }

    fn draw_chat<B: Backend>(&mut self, frame: &mut Frame<B>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        if session.state() == SessionState::NotFound {
            draw_not_found(frame);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(1),    // Transcript
                Constraint::Length(3), // Compose box
                Constraint::Length(1), // Help / status line
            ])
            .split(frame.size());

        // Header: avatar glyph, name, and whether anyone is "there"
        let (title, presence) = match session.conversation() {
            Some(c) if c.is_group() => (
                format!(" {}  {} (Group) ", c.avatar_glyph, c.name),
                format!("{} members", c.members.len()),
            ),
            Some(c) => (
                format!(" {}  {} ", c.avatar_glyph, c.name),
                if session.simulator_running() {
                    "Online".to_string()
                } else {
                    "Offline".to_string()
                },
            ),
            None => (" ".to_string(), String::new()),
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(presence, Style::default().fg(Color::DarkGray)),
        ]))
        .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, chunks[0]);

        draw_transcript(frame, session, chunks[1]);

        let compose = Paragraph::new(self.input.value())
            .block(Block::default().borders(Borders::ALL).title("Message"));
        frame.render_widget(compose, chunks[2]);
        // Keep the cursor inside the compose box
        frame.set_cursor(
            chunks[2].x + self.input.visual_cursor() as u16 + 1,
            chunks[2].y + 1,
        );

        let footer = self
            .status
            .clone()
            .unwrap_or_else(|| "Enter send · /image <path> attach · Esc back".to_string());
        frame.render_widget(
            Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }
}

/// Render one transcript with messages grouped visually by sender: a
/// sender header is emitted only when attribution changes from the
/// previous message.
fn draw_transcript<B: Backend>(frame: &mut Frame<B>, session: &ChatSession, area: Rect) {
    let wrap_width = area.width.saturating_sub(2) as usize;
    let messages = session.transcript();

    let mut items: Vec<ListItem> = Vec::new();
    let mut previous_sender: Option<&str> = None;
    for message in messages {
        let label = session.sender_label(message);
        if previous_sender != Some(message.sender_id.as_str()) {
            let header = format!("{}  {}", label.avatar_glyph, label.name);
            let header_style = if label.is_local {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            };
            items.push(ListItem::new(Text::from(header)).style(header_style));
            previous_sender = Some(message.sender_id.as_str());
        }
        items.extend(message_lines(message, wrap_width));
    }

    if items.is_empty() {
        let empty = Paragraph::new("No messages yet\nStart a conversation!")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    // Select the last line so the list stays scrolled to the bottom; the
    // highlight style is left at default so the selection is invisible
    let mut list_state = ListState::default();
    list_state.select(Some(items.len() - 1));
    let list = List::new(items)
        .block(Block::default().borders(Borders::NONE))
        .highlight_style(Style::default());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn message_lines(message: &Message, wrap_width: usize) -> Vec<ListItem<'static>> {
    let style = if message.is_local() {
        Style::default().fg(Color::Cyan)
    } else if message.is_read {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut lines: Vec<String> = Vec::new();
    let body = format!("  {}  [{}]", message.content, message.timestamp_label);
    lines.extend(
        wrap(&body, wrap_width.max(8))
            .into_iter()
            .map(|l| l.into_owned()),
    );
    if message.kind == MessageKind::Image {
        // The transcript is text-only; point at the image instead
        let reference = message
            .image_url
            .as_deref()
            .map(|url| {
                if url.starts_with("data:") {
                    "attached image".to_string()
                } else {
                    url.to_string()
                }
            })
            .unwrap_or_else(|| "missing image".to_string());
        lines.push(format!("  🖼  {}", reference));
    }

    lines
        .into_iter()
        .map(|line| ListItem::new(Text::from(line)).style(style))
        .collect()
}

fn conversation_list_item(conversation: &Conversation) -> ListItem<'static> {
    let name = if conversation.is_group() {
        format!("{} (Group)", conversation.name)
    } else {
        conversation.name.clone()
    };
    let unread_badge = if conversation.unread {
        format!("  ({} new)", conversation.unread_count.max(1))
    } else {
        String::new()
    };

    let title_line = Line::from(vec![
        Span::styled(
            format!(" {}  ", conversation.avatar_glyph),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(unread_badge, Style::default().fg(Color::Red)),
        Span::styled(
            format!("  {}", conversation.timestamp_label),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let preview_style = if conversation.unread {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let preview_line = Line::from(Span::styled(
        format!("     {}", conversation.last_message_preview),
        preview_style,
    ));

    ListItem::new(Text::from(vec![title_line, preview_line]))
}

fn draw_not_found<B: Backend>(frame: &mut Frame<B>) {
    let area = frame.size();
    let text = Paragraph::new("Chat not found\n\nPress Esc to go back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(text, area);
}

fn tab_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
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
