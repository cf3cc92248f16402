use crate::commands::format_created;
use crate::config::Config;
use crate::model::{Filter, StoreError, Task, TaskId};
use crate::storage::{DataLocation, FileBackend};
use crate::store::Store;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub fn run(store: Store<FileBackend>, location: DataLocation, config: Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(store, location, config);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    store: Store<FileBackend>,
    location: DataLocation,
    config: Config,
    selected: usize,
    last_save: Instant,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Adding(TaskForm),
    Editing { task_id: TaskId, text: FieldValue },
    ConfirmDelete { task_id: TaskId },
}

struct TaskForm {
    text: FieldValue,
    category_idx: usize,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

#[derive(Copy, Clone)]
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    done: Color,
    danger: Color,
    highlight_bg: Color,
    highlight_fg: Color,
}

impl Palette {
    fn for_mode(dark: bool) -> Self {
        if dark {
            Palette {
                bg: Color::Rgb(18, 20, 28),
                fg: Color::Gray,
                muted: Color::DarkGray,
                accent: Color::LightCyan,
                done: Color::LightGreen,
                danger: Color::LightRed,
                highlight_bg: Color::Rgb(60, 64, 90),
                highlight_fg: Color::White,
            }
        } else {
            Palette {
                bg: Color::Rgb(246, 244, 238),
                fg: Color::Black,
                muted: Color::Rgb(120, 120, 130),
                accent: Color::Rgb(90, 70, 200),
                done: Color::Rgb(30, 140, 80),
                danger: Color::Rgb(200, 40, 40),
                highlight_bg: Color::Rgb(252, 214, 112),
                highlight_fg: Color::Black,
            }
        }
    }
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char_boundary(self.cursor, &self.value);
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.value.len();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn delete(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let next = next_char_boundary(self.cursor, &self.value);
        self.value.drain(self.cursor..next);
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }

    /// Applies a text-editing key. Returns false for keys it does not own.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c)
            }
            _ => return false,
        }
        true
    }
}

impl App {
    fn new(store: Store<FileBackend>, location: DataLocation, config: Config) -> Self {
        let status = format!("Loaded tasks from {}", location.dir.display());
        App {
            store,
            location,
            config,
            selected: 0,
            last_save: Instant::now(),
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Adding(_) | Mode::Editing { .. } => {
                self.handle_form_key(key);
                false
            }
            Mode::ConfirmDelete { .. } => {
                self.handle_confirm_key(key);
                false
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('n') | KeyCode::Char('a') => {
                let category_idx = self
                    .config
                    .categories
                    .iter()
                    .position(|c| *c == self.config.default_category)
                    .unwrap_or(0);
                self.mode = Mode::Adding(TaskForm {
                    text: FieldValue::new(""),
                    category_idx,
                });
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let editing = self
                    .current_task()
                    .map(|task| (task.id.clone(), FieldValue::new(&task.text)));
                if let Some((task_id, text)) = editing {
                    self.mode = Mode::Editing { task_id, text };
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.current_task().map(|t| t.id.clone()) {
                    let result = self.store.toggle_complete(&id);
                    self.after_mutation(result, "Toggled task");
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.current_task().map(|t| t.id.clone()) {
                    self.mode = Mode::ConfirmDelete { task_id: id };
                }
            }
            KeyCode::Char('c') => {
                let result = self.store.clear_completed();
                let message = match &result {
                    Ok(n) => format!("Cleared {} completed task(s)", n),
                    Err(_) => String::new(),
                };
                self.after_mutation(result, message);
            }
            KeyCode::Char('f') => self.cycle_filter(1),
            KeyCode::Char('F') => self.cycle_filter(-1),
            KeyCode::Char('t') => {
                let dark = !self.store.settings().dark;
                let result = self.store.set_dark_mode(dark);
                self.after_mutation(
                    result,
                    format!("Dark mode {}", if dark { "on" } else { "off" }),
                );
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.visible_len().saturating_sub(1);
            }
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match &mut mode {
            Mode::Adding(form) => match key.code {
                KeyCode::Esc => {
                    close_form = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Tab => form.cycle_category(1, self.config.categories.len()),
                KeyCode::BackTab => form.cycle_category(-1, self.config.categories.len()),
                KeyCode::Enter => {
                    let category = self
                        .config
                        .categories
                        .get(form.category_idx)
                        .cloned()
                        .unwrap_or_else(|| self.config.default_category.clone());
                    match self.store.add_task(&form.text.value, &category) {
                        Ok(Some(id)) => {
                            close_form = true;
                            self.selected = self
                                .store
                                .projector()
                                .visible_tasks()
                                .iter()
                                .position(|t| t.id == id)
                                .unwrap_or(0);
                            self.mark_saved(format!("Added task to {}", category));
                        }
                        Ok(None) => self.status = "Task text is empty".into(),
                        Err(err) => {
                            close_form = true;
                            self.report_save_error(err);
                        }
                    }
                }
                _ => {
                    form.text.handle_key(key);
                }
            },
            Mode::Editing { task_id, text } => match key.code {
                KeyCode::Esc => {
                    close_form = true;
                    self.status = "Edit canceled".into();
                }
                KeyCode::Enter => {
                    close_form = true;
                    let result = self.store.edit_text(task_id, &text.value);
                    match result {
                        Ok(true) => self.mark_saved("Updated task"),
                        Ok(false) => self.status = "Empty text, edit discarded".into(),
                        Err(err) => self.report_save_error(err),
                    }
                }
                _ => {
                    text.handle_key(key);
                }
            },
            Mode::Normal | Mode::ConfirmDelete { .. } => {}
        }
        self.mode = if close_form { Mode::Normal } else { mode };
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let task_id = match &self.mode {
            Mode::ConfirmDelete { task_id } => task_id.clone(),
            _ => return,
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let result = self.store.delete_task(&task_id);
                self.after_mutation(result, format!("Deleted {}", task_id));
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn after_mutation<T>(&mut self, result: Result<T, StoreError>, message: impl Into<String>) {
        match result {
            Ok(_) => self.mark_saved(message),
            Err(err) => self.report_save_error(err),
        }
        self.clamp_selection();
    }

    fn mark_saved(&mut self, message: impl Into<String>) {
        self.last_save = Instant::now();
        self.status = message.into();
        info!(status = %self.status, "saved");
    }

    fn report_save_error(&mut self, err: StoreError) {
        let err = anyhow::Error::from(err);
        warn!(error = %format!("{:#}", err), "save failed");
        self.status = format!("Save failed (changes kept in memory): {:#}", err);
    }

    fn cycle_filter(&mut self, delta: isize) {
        let options = self.filter_options();
        let current = self.store.filter().clone();
        let idx = options.iter().position(|f| *f == current).unwrap_or(0) as isize;
        let len = options.len() as isize;
        let next = options[((idx + delta).rem_euclid(len)) as usize].clone();
        self.status = format!("Filter: {}", next);
        self.store.set_filter(next);
        self.selected = 0;
    }

    /// `All`, `Completed`, then configured categories followed by any other
    /// category present in the list.
    fn filter_options(&self) -> Vec<Filter> {
        let mut options = vec![Filter::All, Filter::Completed];
        let projector = self.store.projector();
        let present = projector.categories();
        let configured = self.config.categories.iter().map(String::as_str);
        for category in configured.chain(present) {
            let filter = Filter::Category(category.to_string());
            if !options.contains(&filter) {
                options.push(filter);
            }
        }
        options
    }

    fn current_task(&self) -> Option<&Task> {
        self.store
            .projector()
            .visible_tasks()
            .get(self.selected)
            .copied()
    }

    fn visible_len(&self) -> usize {
        self.store.projector().visible_tasks().len()
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let palette = Palette::for_mode(self.store.settings().dark);
        let screen = f.size();
        f.render_widget(
            Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
            screen,
        );

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(screen);

        self.draw_header(f, layout[0], palette);
        self.draw_progress(f, layout[1], palette);
        self.draw_tasks(f, layout[2], palette);
        self.draw_footer(f, layout[3], palette);

        match &self.mode {
            Mode::Adding(form) => self.draw_add_form(f, form, palette),
            Mode::Editing { text, .. } => self.draw_edit_form(f, text, palette),
            Mode::ConfirmDelete { task_id } => self.draw_confirm(f, task_id, palette),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect, palette: Palette) {
        let title = Line::from(vec![
            Span::styled(
                "taskpad ",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(self.location.scope.label(), Style::default().fg(palette.done)),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.dir.display()),
                Style::default().fg(palette.muted),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(palette.muted),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("filter {}", self.store.filter()),
                Style::default().fg(palette.accent),
            ),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.muted));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_progress(&self, f: &mut ratatui::Frame<'_>, area: Rect, palette: Palette) {
        let stats = self.store.projector().stats();
        let label = format!(
            "{} remaining / {} total  •  {}%",
            stats.remaining, stats.total, stats.percent_complete
        );
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.muted))
                    .title("Progress"),
            )
            .gauge_style(Style::default().fg(palette.done).bg(palette.bg))
            .percent(u16::from(stats.percent_complete))
            .label(Span::styled(
                label,
                Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
            ));
        f.render_widget(gauge, area);
    }

    fn draw_tasks(&mut self, f: &mut ratatui::Frame<'_>, area: Rect, palette: Palette) {
        self.clamp_selection();
        let projector = self.store.projector();
        let tasks = projector.visible_tasks();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.muted))
            .title(Span::styled(
                format!("Tasks ({})", tasks.len()),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        if tasks.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "Nothing here. Press n to add a task.",
                Style::default().fg(palette.muted),
            )))
            .alignment(Alignment::Center)
            .block(block);
            f.render_widget(empty, area);
            return;
        }
        let width = area.width.saturating_sub(8) as usize;
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|task| task_item(task, width, palette))
            .collect();
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(palette.highlight_bg)
                .fg(palette.highlight_fg)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default();
        state.select(Some(self.selected));
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect, palette: Palette) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(footer_help_line(palette))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(palette.muted)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(palette.fg));
        f.render_widget(status, rows[1]);
    }

    fn draw_add_form(&self, f: &mut ratatui::Frame<'_>, form: &TaskForm, palette: Palette) {
        let category = self
            .config
            .categories
            .get(form.category_idx)
            .map(String::as_str)
            .unwrap_or(self.config.default_category.as_str());
        let lines = vec![
            field_line("Task", &form.text.with_caret(), palette),
            field_line("Category", &format!("◀ {} ▶", category), palette),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to add • Tab/Shift-Tab to change category • Esc to cancel",
                Style::default().fg(palette.muted),
            )),
        ];
        self.draw_dialog(f, "New Task", lines, palette.accent, palette);
    }

    fn draw_edit_form(&self, f: &mut ratatui::Frame<'_>, text: &FieldValue, palette: Palette) {
        let lines = vec![
            field_line("Task", &text.with_caret(), palette),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save • Esc to cancel • empty text keeps the old value",
                Style::default().fg(palette.muted),
            )),
        ];
        self.draw_dialog(f, "Edit Task", lines, palette.accent, palette);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, task_id: &str, palette: Palette) {
        let text = self
            .store
            .task(task_id)
            .map(|t| t.text.clone())
            .unwrap_or_else(|| task_id.to_string());
        let lines = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", truncate_text(&text, 40)),
                Style::default()
                    .fg(palette.danger)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        self.draw_dialog(f, "Confirm Delete", lines, palette.danger, palette);
    }

    fn draw_dialog(
        &self,
        f: &mut ratatui::Frame<'_>,
        title: &str,
        lines: Vec<Line<'static>>,
        color: Color,
        palette: Palette,
    ) {
        let screen = f.size();
        let area = centered_rect(60, 30, screen);
        let dialog = Paragraph::new(lines)
            .style(Style::default().bg(palette.bg).fg(palette.fg))
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

impl TaskForm {
    fn cycle_category(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let len = len as isize;
        self.category_idx = ((self.category_idx as isize + delta).rem_euclid(len)) as usize;
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn footer_help_line(palette: Palette) -> Line<'static> {
    let keys = [
        ("n", "add"),
        ("e", "edit"),
        ("space", "toggle"),
        ("d", "delete"),
        ("c", "clear done"),
        ("f/F", "filter"),
        ("t", "theme"),
        ("q", "quit"),
    ];
    let mut spans = Vec::new();
    for (idx, (key, label)) in keys.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(palette.accent)));
        spans.push(Span::styled(
            format!(" {}", label),
            Style::default().fg(palette.muted),
        ));
    }
    Line::from(spans)
}

fn task_item(task: &Task, width: usize, palette: Palette) -> ListItem<'static> {
    let (mark, mark_style) = if task.completed {
        ("✔", Style::default().fg(palette.done))
    } else {
        ("○", Style::default().fg(palette.muted))
    };
    let text_style = if task.completed {
        Style::default()
            .fg(palette.muted)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(palette.fg)
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", mark), mark_style),
            Span::styled(truncate_text(&task.text, width), text_style),
        ]),
        Line::from(Span::styled(
            format!(
                "  {} • {}",
                task.category,
                format_created(task.created_at)
            ),
            Style::default().fg(palette.muted).add_modifier(Modifier::DIM),
        )),
    ];
    ListItem::new(lines)
}

fn field_line(label: &str, value: &str, palette: Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value.to_string(), Style::default().fg(palette.accent)),
    ])
}

fn prev_char_boundary(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_char_boundary(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_edits_multibyte_text() {
        let mut field = FieldValue::new("héllo");
        field.move_left();
        field.move_left();
        field.move_left();
        field.move_left();
        assert_eq!(field.cursor, 1);
        field.move_right();
        assert_eq!(field.cursor, 3);
        field.backspace();
        assert_eq!(field.value, "hllo");
        field.insert_char('é');
        assert_eq!(field.value, "héllo");
        field.end();
        field.insert_char('!');
        assert_eq!(field.with_caret(), "héllo!▌");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a long task description", 10), "a long ...");
        assert_eq!(truncate_text("abcdef", 2), "ab");
    }

    #[test]
    fn category_cycle_wraps() {
        let mut form = TaskForm {
            text: FieldValue::new(""),
            category_idx: 0,
        };
        form.cycle_category(-1, 4);
        assert_eq!(form.category_idx, 3);
        form.cycle_category(1, 4);
        assert_eq!(form.category_idx, 0);
        form.cycle_category(1, 0);
        assert_eq!(form.category_idx, 0);
    }
}
