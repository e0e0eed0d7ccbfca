use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use triage_core::api::{FailureKind, MessageId, RelayError, RelayReport, TuiConfig};

use super::sink::ChatEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Option<MessageId>,
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStatus {
    Idle,
    Waiting,
    Done(i32),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    None,
    Submit(String),
    Quit,
}

pub struct ChatApp {
    pub config: TuiConfig,
    pub start: Instant,
    pub status: ChatStatus,
    pub messages: VecDeque<ChatMessage>,
    pub input_buffer: String,
    pub input_cursor: usize,
    pub scroll: usize,
    pub follow: bool,
    /// Largest scroll offset of the last drawn frame.
    pub max_scroll: Cell<usize>,
    pub queries: usize,
    in_flight_since: Option<Instant>,
}

impl ChatApp {
    pub fn new(config: TuiConfig) -> Self {
        let follow = config.auto_scroll;
        Self {
            config,
            start: Instant::now(),
            status: ChatStatus::Idle,
            messages: VecDeque::new(),
            input_buffer: String::new(),
            input_cursor: 0,
            scroll: 0,
            follow,
            max_scroll: Cell::new(0),
            queries: 0,
            in_flight_since: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight_since.is_some()
    }

    pub fn busy_for(&self) -> Option<std::time::Duration> {
        self.in_flight_since.map(|t| t.elapsed())
    }

    pub fn status_label(&self) -> String {
        match self.status {
            ChatStatus::Idle => "READY".to_string(),
            ChatStatus::Waiting => "RUNNING".to_string(),
            ChatStatus::Done(code) => format!("DONE({code})"),
            ChatStatus::Failed(ref kind) => format!("ERROR({kind})"),
        }
    }

    pub fn handle_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Message { id, content } => self.push_message(ChatMessage {
                id: Some(id),
                role: Role::Assistant,
                content,
            }),
            ChatEvent::Update { id, content } => {
                match self.messages.iter_mut().rev().find(|m| m.id == Some(id)) {
                    Some(msg) => msg.content = content,
                    // trimmed away while streaming; surface it again
                    None => self.push_message(ChatMessage {
                        id: Some(id),
                        role: Role::Assistant,
                        content,
                    }),
                }
            }
        }
    }

    /// Mark the relay task as started. Call after `ChatAction::Submit`.
    pub fn begin_query(&mut self) {
        self.queries += 1;
        self.in_flight_since = Some(Instant::now());
        self.status = ChatStatus::Waiting;
    }

    pub fn finish_query(&mut self, result: &Result<RelayReport, RelayError>) {
        self.in_flight_since = None;
        self.status = match result {
            Ok(report) => ChatStatus::Done(report.exit_code),
            Err(err) => ChatStatus::Failed(failure_label(err)),
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ChatAction {
        match key.code {
            KeyCode::Esc => return ChatAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ChatAction::Quit
            }
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.insert_char('\n')
            }
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.input_cursor = 0,
            KeyCode::End => {
                self.input_cursor = self.input_buffer.len();
                self.follow = true;
            }
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(10),
            KeyCode::PageDown => self.scroll_down(10),
            KeyCode::Char(ch) if !is_chord(key.modifiers) => self.insert_char(ch),
            _ => {}
        }
        ChatAction::None
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(3),
            MouseEventKind::ScrollDown => self.scroll_down(3),
            _ => {}
        }
    }

    /// While a query is in flight the draft stays in the input box.
    fn submit(&mut self) -> ChatAction {
        if self.is_busy() {
            return ChatAction::None;
        }
        let query = std::mem::take(&mut self.input_buffer);
        self.input_cursor = 0;
        if !query.trim().is_empty() {
            self.push_message(ChatMessage {
                id: None,
                role: Role::User,
                content: query.clone(),
            });
        }
        self.follow = true;
        ChatAction::Submit(query)
    }

    fn push_message(&mut self, msg: ChatMessage) {
        self.messages.push_back(msg);
        while self.messages.len() > self.config.max_messages.max(1) {
            self.messages.pop_front();
        }
    }

    fn insert_char(&mut self, ch: char) {
        self.input_buffer.insert(self.input_cursor, ch);
        self.input_cursor += ch.len_utf8();
    }

    fn backspace(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(&self.input_buffer, self.input_cursor);
        self.input_buffer.replace_range(prev..self.input_cursor, "");
        self.input_cursor = prev;
    }

    fn move_left(&mut self) {
        self.input_cursor = prev_char_boundary(&self.input_buffer, self.input_cursor);
    }

    fn move_right(&mut self) {
        self.input_cursor = next_char_boundary(&self.input_buffer, self.input_cursor);
    }

    fn scroll_up(&mut self, amount: usize) {
        if self.follow {
            self.scroll = self.max_scroll.get();
            self.follow = false;
        }
        self.scroll = self.scroll.saturating_sub(amount);
    }

    fn scroll_down(&mut self, amount: usize) {
        if self.follow {
            return;
        }
        let max = self.max_scroll.get();
        self.scroll = self.scroll.saturating_add(amount).min(max);
        if self.scroll == max && self.config.auto_scroll {
            self.follow = true;
        }
    }
}

fn failure_label(err: &RelayError) -> String {
    match err.kind() {
        FailureKind::EmptyInput => "empty".to_string(),
        FailureKind::MissingCredential => "credential".to_string(),
        FailureKind::BinaryNotFound => "binary".to_string(),
        FailureKind::NonZeroExit => match err {
            RelayError::NonZeroExit { code } => format!("exit {code}"),
            _ => "exit".to_string(),
        },
        FailureKind::Runtime => "runtime".to_string(),
    }
}

/// Ctrl or Alt shortcuts. AltGr arrives as Ctrl+Alt and still types.
fn is_chord(modifiers: KeyModifiers) -> bool {
    let ctrl_alt = KeyModifiers::CONTROL | KeyModifiers::ALT;
    modifiers.intersects(ctrl_alt) && !modifiers.contains(ctrl_alt)
}

fn prev_char_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(s: &str, idx: usize) -> usize {
    s[idx..].chars().next().map_or(s.len(), |ch| idx + ch.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn app() -> ChatApp {
        ChatApp::new(TuiConfig::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut ChatApp, text: &str) {
        for ch in text.chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn enter_submits_and_records_the_user_turn() {
        let mut app = app();
        type_text(&mut app, "hello");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), ChatAction::Submit("hello".into()));
        assert_eq!(app.input_buffer, "");
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, Role::User);
    }

    #[test]
    fn blank_submit_reaches_relay_without_a_user_turn() {
        let mut app = app();
        type_text(&mut app, "  ");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), ChatAction::Submit("  ".into()));
        assert!(app.messages.is_empty());
    }

    #[test]
    fn busy_chat_keeps_the_draft() {
        let mut app = app();
        app.begin_query();
        type_text(&mut app, "next");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), ChatAction::None);
        assert_eq!(app.input_buffer, "next");

        app.finish_query(&Err(RelayError::NonZeroExit { code: 2 }));
        assert!(!app.is_busy());
        assert_eq!(app.status_label(), "ERROR(exit 2)");
        assert_eq!(app.handle_key(key(KeyCode::Enter)), ChatAction::Submit("next".into()));
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut app = app();
        type_text(&mut app, "a");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut app, "b");

        assert_eq!(app.input_buffer, "a\nb");
    }

    #[test]
    fn cursor_edits_respect_char_boundaries() {
        let mut app = app();
        type_text(&mut app, "né🤖");
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Backspace));

        assert_eq!(app.input_buffer, "n🤖");
        assert_eq!(app.input_cursor, 1);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.input_cursor, app.input_buffer.len());
    }

    #[test]
    fn updates_replace_the_matching_message() {
        let mut app = app();
        app.handle_event(ChatEvent::Message {
            id: MessageId(1),
            content: String::new(),
        });
        app.handle_event(ChatEvent::Update {
            id: MessageId(1),
            content: "line\n".into(),
        });
        app.handle_event(ChatEvent::Update {
            id: MessageId(1),
            content: "line\nmore\n".into(),
        });

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].content, "line\nmore\n");
    }

    #[test]
    fn oldest_messages_are_dropped_past_the_limit() {
        let mut app = ChatApp::new(TuiConfig {
            max_messages: 2,
            ..TuiConfig::default()
        });
        for id in 1..=3 {
            app.handle_event(ChatEvent::Message {
                id: MessageId(id),
                content: id.to_string(),
            });
        }

        let ids: Vec<_> = app.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![Some(MessageId(2)), Some(MessageId(3))]);
    }

    #[test]
    fn scrolling_up_leaves_follow_mode_and_end_returns() {
        let mut app = app();
        app.max_scroll.set(30);
        app.handle_key(key(KeyCode::PageUp));

        assert!(!app.follow);
        assert_eq!(app.scroll, 20);

        app.handle_key(key(KeyCode::End));
        assert!(app.follow);
    }

    #[test]
    fn ctrl_and_alt_chords_do_not_type() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT));
        app.handle_key(KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT));
        app.handle_key(KeyEvent::new(
            KeyCode::Char('@'),
            KeyModifiers::CONTROL | KeyModifiers::ALT,
        ));

        assert_eq!(app.input_buffer, "C@");
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Esc)), ChatAction::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ChatAction::Quit
        );
    }
}
