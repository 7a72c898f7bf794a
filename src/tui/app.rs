//! Main application logic for the terminal user interface.
//!
//! `App` turns key presses into controller intents and renders the
//! controller's state: compose box, filter tabs, the visible task list with
//! inline editing, the remaining count and a status bar carrying any error.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};

use crate::controller::Controller;
use crate::fields::{format_filter, Filter};
use crate::task::{normalise_text, TaskId};
use crate::tui::{
    colors::{palette, Palette},
    enums::{Intent, Mode},
    input::InputField,
    utils::centered_rect,
};

pub struct App {
    controller: Controller,
    mode: Mode,
    compose: InputField,
    draft: InputField,
    list_state: TableState,
    status_message: String,
    pending: Option<Intent>,
}

impl App {
    /// Wrap a controller and load the current list. A failed load is shown
    /// in the status bar rather than aborting.
    pub fn new(mut controller: Controller) -> Self {
        controller.refresh();
        let compose = InputField::with_value(controller.compose());
        let mut app = App {
            controller,
            mode: Mode::TaskList,
            compose,
            draft: InputField::new(),
            list_state: TableState::default(),
            status_message: String::new(),
            pending: None,
        };
        app.clamp_selection();
        app
    }

    fn palette(&self) -> Palette {
        palette(self.controller.theme())
    }

    fn selected_id(&self) -> Option<TaskId> {
        let idx = self.list_state.selected()?;
        self.controller.visible().nth(idx).map(|t| t.id)
    }

    /// Keep the selection inside the visible list.
    fn clamp_selection(&mut self) {
        let len = self.controller.visible().count();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        match self.list_state.selected() {
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.controller.visible().count();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
        self.list_state.select(Some(next));
    }

    fn set_filter(&mut self, filter: Filter) {
        self.controller.set_filter(filter);
        self.list_state.select(None);
        self.clamp_selection();
    }

    /// Handle one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            return true;
        }
        self.status_message.clear();
        match self.mode {
            Mode::TaskList => return self.handle_task_list_key(key),
            Mode::Compose => self.handle_compose_key(key),
            Mode::Edit => self.handle_edit_key(key),
            Mode::Help => self.mode = Mode::TaskList,
        }
        false
    }

    fn handle_task_list_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Char('x') => self.controller.dismiss_error(),
            KeyCode::Char('a') | KeyCode::Char('i') => self.mode = Mode::Compose,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    self.pending = Some(Intent::Toggle(id));
                }
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    if self.controller.begin_edit(id) {
                        let text = self.controller.tasks().iter().find(|t| t.id == id).map(|t| t.text.clone());
                        self.draft = InputField::with_value(text.as_deref().unwrap_or_default());
                        self.mode = Mode::Edit;
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.pending = Some(Intent::Remove(id));
                }
            }
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Pending),
            KeyCode::Char('3') => self.set_filter(Filter::Completed),
            KeyCode::Tab => self.set_filter(self.controller.filter().next()),
            KeyCode::Char('t') => {
                if self.controller.toggle_theme() {
                    self.status_message = format!("Switched to {} mode", self.controller.theme());
                }
            }
            KeyCode::Char('r') => self.pending = Some(Intent::Refresh),
            KeyCode::Char('h') | KeyCode::Char('?') => self.mode = Mode::Help,
            _ => {}
        }
        false
    }

    fn handle_compose_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.mode = Mode::TaskList,
            KeyCode::Enter => {
                if self.controller.can_submit() {
                    self.pending = Some(Intent::Submit);
                }
            }
            KeyCode::Char(c) => self.compose.handle_char(c),
            KeyCode::Backspace => self.compose.handle_backspace(),
            KeyCode::Delete => self.compose.handle_delete(),
            KeyCode::Left => self.compose.move_cursor_left(),
            KeyCode::Right => self.compose.move_cursor_right(),
            KeyCode::Home => self.compose.move_home(),
            KeyCode::End => self.compose.move_end(),
            _ => {}
        }
        self.controller.set_compose(self.compose.value.clone());
    }

    fn handle_edit_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.controller.cancel_edit();
                self.mode = Mode::TaskList;
            }
            KeyCode::Enter => {
                if normalise_text(&self.draft.value).is_some() {
                    self.pending = Some(Intent::SaveEdit);
                }
            }
            KeyCode::Char(c) => self.draft.handle_char(c),
            KeyCode::Backspace => self.draft.handle_backspace(),
            KeyCode::Delete => self.draft.handle_delete(),
            KeyCode::Left => self.draft.move_cursor_left(),
            KeyCode::Right => self.draft.move_cursor_right(),
            KeyCode::Home => self.draft.move_home(),
            KeyCode::End => self.draft.move_end(),
            _ => {}
        }
        self.controller.set_draft(self.draft.value.clone());
    }

    /// Run the queued intent against the controller.
    fn apply_pending(&mut self) {
        let Some(intent) = self.pending.take() else {
            return;
        };
        let done = match intent {
            Intent::Submit => {
                let added = self.controller.submit_new_task();
                if added {
                    self.compose.clear();
                }
                added.then_some("Task added")
            }
            Intent::SaveEdit => {
                let saved = self.controller.submit_edit();
                if saved {
                    self.mode = Mode::TaskList;
                }
                saved.then_some("Task updated")
            }
            Intent::Toggle(id) => self.controller.toggle(id).then_some("Task updated"),
            Intent::Remove(id) => self.controller.remove(id).then_some("Task deleted"),
            Intent::Refresh => self.controller.refresh().then_some("Reloaded"),
        };
        if let Some(msg) = done {
            self.status_message = msg.to_string();
        }
        self.clamp_selection();
    }

    fn render_header(&self, f: &mut Frame, area: Rect, p: Palette) {
        let context = format!(
            "{} storage  {} mode [t]",
            self.controller.backend_name(),
            self.controller.theme()
        );
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TO-DO LIST", Style::default().fg(p.fg).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(context, Style::default().fg(p.accent).add_modifier(Modifier::ITALIC)),
        ]))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(p.muted)))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_compose(&self, f: &mut Frame, area: Rect, p: Palette) {
        let active = self.mode == Mode::Compose;
        let line = if self.compose.value.is_empty() && !active {
            Line::from(Span::styled("Add a new task (press 'a')", Style::default().fg(p.muted)))
        } else {
            Line::from(Span::styled(self.compose.value.as_str(), Style::default().fg(p.fg)))
        };
        let add_hint = if self.controller.can_submit() {
            Span::styled(" [Enter] Add Task ", Style::default().fg(p.accent).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(" Add Task ", Style::default().fg(p.muted))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if active { p.accent } else { p.muted }))
            .title(" New task ")
            .title_bottom(Line::from(add_hint).alignment(Alignment::Right));
        f.render_widget(Paragraph::new(line).block(block), area);

        if active {
            let x = area.x + 1 + self.compose.cursor as u16;
            f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    fn render_filters(&self, f: &mut Frame, area: Rect, p: Palette) {
        let current = self.controller.filter();
        let titles: Vec<&str> = Filter::ALL.iter().map(|&f| format_filter(f)).collect();
        let selected = Filter::ALL.iter().position(|&f| f == current).unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(p.muted))
            .highlight_style(Style::default().fg(p.accent).add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(p.muted))
                    .title(" Filter [1-3] "),
            );
        f.render_widget(tabs, area);
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect, p: Palette) {
        let total = self.controller.tasks().len();
        let editing = self.controller.editing_id();
        let visible: Vec<_> = self.controller.visible().collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.muted))
            .title(format!(" Tasks ({}/{}) - Press 'h' for help ", visible.len(), total));

        if visible.is_empty() {
            let empty = Paragraph::new(self.controller.filter().empty_message())
                .style(Style::default().fg(p.muted))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let rows: Vec<Row> = visible
            .iter()
            .map(|task| {
                let check = if task.completed { "[x]" } else { "[ ]" };
                let text = if editing == Some(task.id) {
                    let (before, after) = self.draft.split_at_cursor();
                    Line::from(vec![
                        Span::raw(before.to_string()),
                        Span::styled("▌", Style::default().fg(p.accent)),
                        Span::raw(after.to_string()),
                    ])
                    .style(Style::default().fg(p.accent).add_modifier(Modifier::UNDERLINED))
                } else if task.completed {
                    Line::from(task.text.as_str())
                        .style(Style::default().fg(p.muted).add_modifier(Modifier::CROSSED_OUT))
                } else {
                    Line::from(task.text.as_str()).style(Style::default().fg(p.fg))
                };
                Row::new(vec![Cell::from(check), Cell::from(text)])
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(10)])
            .block(block)
            .row_highlight_style(Style::default().bg(p.highlight_bg).fg(p.highlight_fg))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.list_state);
    }

    fn render_summary(&self, f: &mut Frame, area: Rect, p: Palette) {
        let summary = Paragraph::new(format!("{} tasks remaining", self.controller.remaining_count()))
            .style(Style::default().fg(p.muted));
        f.render_widget(summary, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect, p: Palette) {
        let area = centered_rect(60, 70, area);
        f.render_widget(Clear, area);
        let bindings = [
            ("a", "Add a new task"),
            ("Space / Enter", "Toggle completed"),
            ("e", "Edit selected task"),
            ("d / Del", "Delete selected task"),
            ("1 2 3 / Tab", "Filter: all, pending, completed"),
            ("t", "Toggle light/dark theme"),
            ("r", "Reload tasks"),
            ("x / Esc", "Dismiss error"),
            ("q", "Quit"),
        ];
        let text: Vec<Line> = bindings
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(format!("{key:<16}"), Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
                    Span::raw(*what),
                ])
            })
            .collect();
        let help = Paragraph::new(text)
            .style(Style::default().bg(p.bg).fg(p.fg))
            .block(Block::default().borders(Borders::ALL).title(" Help "))
            .wrap(Wrap { trim: true });
        f.render_widget(help, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect, p: Palette) {
        let (text, style) = if self.pending.is_some() || self.controller.is_loading() {
            ("Working...".to_string(), Style::default().bg(p.accent).fg(p.bg))
        } else if let Some(err) = self.controller.error() {
            (
                format!("{err}  (x to dismiss)"),
                Style::default().bg(p.error_bg).fg(Color::White),
            )
        } else if !self.status_message.is_empty() {
            (self.status_message.clone(), Style::default().bg(p.accent).fg(p.bg))
        } else {
            let hint = match self.mode {
                Mode::TaskList => "a add | space toggle | e edit | d delete | 1-3 filter | t theme | h help | q quit",
                Mode::Compose => "Type a task | Enter add | Esc back",
                Mode::Edit => "Enter save | Esc cancel",
                Mode::Help => "Help - any key to return",
            };
            (hint.to_string(), Style::default().bg(p.accent).fg(p.bg))
        };
        f.render_widget(Paragraph::new(text).style(style), area);
    }

    fn render(&mut self, f: &mut Frame) {
        let p = self.palette();
        f.render_widget(Block::default().style(Style::default().bg(p.bg).fg(p.fg)), f.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0], p);
        self.render_compose(f, chunks[1], p);
        self.render_filters(f, chunks[2], p);
        self.render_task_list(f, chunks[3], p);
        self.render_summary(f, chunks[4], p);
        self.render_status_bar(f, chunks[5], p);

        if self.mode == Mode::Help {
            let area = f.area();
            self.render_help(f, area, p);
        }
    }

    /// Main event loop for the TUI application.
    ///
    /// Queued intents run after a frame showing the busy state has been drawn.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.pending.is_some() {
                self.apply_pending();
                continue;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key.code, key.modifiers) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{LocalStore, Storage};
    use ratatui::backend::TestBackend;

    fn app(dir: &tempfile::TempDir) -> App {
        let storage = Storage::in_dir(dir.path());
        App::new(Controller::new(Box::new(LocalStore::open(storage.clone())), storage))
    }

    fn press(app: &mut App, key: KeyCode) {
        assert!(!app.handle_key(key, KeyModifiers::NONE));
        app.apply_pending();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_add_toggle_and_filter_through_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert!(screen(&mut app).contains("No tasks yet. Add your first task!"));

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Call Alice");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.controller.tasks().len(), 2);
        assert!(app.compose.value.is_empty());

        press(&mut app, KeyCode::Char(' '));
        assert!(app.controller.tasks()[0].completed);

        press(&mut app, KeyCode::Char('3'));
        let shown = screen(&mut app);
        assert!(shown.contains("Buy milk"));
        assert!(!shown.contains("Call Alice"));
        assert!(shown.contains("1 tasks remaining"));
    }

    #[test]
    fn test_blank_compose_is_not_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(app.controller.tasks().is_empty());
        assert!(app.controller.error().is_none());
    }

    #[test]
    fn test_inline_edit_and_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Cal Alice");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::Edit);
        press(&mut app, KeyCode::Home);
        for _ in 0..3 {
            press(&mut app, KeyCode::Right);
        }
        type_text(&mut app, "l");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::TaskList);
        assert_eq!(app.controller.tasks()[0].text, "Call Alice");

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " later");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.controller.tasks()[0].text, "Call Alice");
    }

    #[test]
    fn test_delete_and_theme_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "temp");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('d'));
        assert!(app.controller.tasks().is_empty());
        assert_eq!(app.list_state.selected(), None);

        press(&mut app, KeyCode::Char('t'));
        assert!(screen(&mut app).contains("dark mode"));
        assert!(app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
    }
}
