//! Status board.
//!
//! One column per status option, cards coloured by due flag. The board reads
//! the pad once on open and writes back through the same store whenever a
//! card changes, so flags and columns always reflect what is on disk.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use progresspad::action_plan::parse_history;
use progresspad::dates::today;
use progresspad::db::Store;
use progresspad::fields::Status;
use progresspad::settings::Settings;
use progresspad::task::{DueFlags, Task, TaskPatch};

use crate::output::format_due_relative;
use crate::tui::colors::{ACCENT_TEAL, OVERDUE_RED, SOON_GOLD, TODAY_AMBER};

const CARD_HEIGHT: usize = 5;

/// Statuses to show as columns, in settings order.
///
/// Statuses used by tasks but missing from the option list are appended so no
/// card is lost. `Deleted` never gets a column.
pub fn column_statuses(settings: &Settings, tasks: &[&Task], show_completed: bool) -> Vec<Status> {
    let mut statuses: Vec<Status> = settings.status_options.iter().map(|s| Status::parse(s)).collect();
    for task in tasks {
        if !statuses.contains(&task.status) {
            statuses.push(task.status.clone());
        }
    }
    statuses.retain(|s| !s.is_deleted() && (show_completed || !s.is_completed()));
    statuses
}

fn matches_text(task: &Task, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [
        Some(&task.id),
        task.description.as_ref(),
        task.product.as_ref(),
        task.module.as_ref(),
        task.category.as_ref(),
        task.current_action_plan.as_ref(),
    ]
    .into_iter()
    .flatten()
    .any(|s| s.to_lowercase().contains(&needle))
}

/// Colours for a card given its flags: (background, foreground).
fn card_colors(flags: DueFlags) -> (Color, Color) {
    if flags.is_overdue {
        (OVERDUE_RED, Color::White)
    } else if flags.due_today {
        (TODAY_AMBER, Color::Black)
    } else if flags.due_soon {
        (SOON_GOLD, Color::Black)
    } else {
        (Color::DarkGray, Color::White)
    }
}

pub struct BoardApp {
    store: Store,
    today: NaiveDate,
    statuses: Vec<Status>,
    columns: Vec<Vec<String>>,
    column_scroll_offsets: Vec<usize>,
    selected_column: usize,
    selected_card: usize,
    status_message: String,
    show_task_detail: bool,
    show_completed: bool,
    filter_active: bool,
    filter_text: String,
}

impl BoardApp {
    pub fn new(store: Store) -> Self {
        let mut app = BoardApp {
            store,
            today: today(),
            statuses: Vec::new(),
            columns: Vec::new(),
            column_scroll_offsets: Vec::new(),
            selected_column: 0,
            selected_card: 0,
            status_message: String::new(),
            show_task_detail: false,
            show_completed: false,
            filter_active: false,
            filter_text: String::new(),
        };
        app.update_columns();
        app
    }

    /// Rebuild columns from the pad, the Completed toggle and the text filter.
    fn update_columns(&mut self) {
        let settings = self.store.db.settings();
        let tasks = self.store.db.active_tasks();
        self.statuses = column_statuses(&settings, &tasks, self.show_completed);
        self.columns = self
            .statuses
            .iter()
            .map(|status| {
                tasks
                    .iter()
                    .filter(|t| &t.status == status)
                    .filter(|t| self.filter_text.is_empty() || matches_text(t, &self.filter_text))
                    .map(|t| t.id.clone())
                    .collect()
            })
            .collect();
        self.column_scroll_offsets = vec![0; self.columns.len()];
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.selected_column >= self.columns.len() {
            self.selected_column = 0;
        }
        let column_len = self.columns.get(self.selected_column).map_or(0, Vec::len);
        if column_len == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= column_len {
            self.selected_card = column_len - 1;
        }
    }

    fn selected_task_id(&self) -> Option<&str> {
        self.columns
            .get(self.selected_column)?
            .get(self.selected_card)
            .map(String::as_str)
    }

    fn selected_task(&self) -> Option<&Task> {
        self.store.db.get(self.selected_task_id()?)
    }

    fn visible_task_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Mark the selected task Completed, or reopen it as In Progress.
    fn toggle_task_completion(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let new_status = if task.status.is_completed() { Status::InProgress } else { Status::Completed };

        let patch = TaskPatch { status: Some(new_status.clone()), ..Default::default() };
        let saved = self.store.db.edit_task(&id, patch).and_then(|_| self.store.commit());
        match saved {
            Ok(()) => {
                self.status_message = format!("{id} marked {new_status}");
                self.update_columns();
                self.select_task(&id);
            }
            Err(e) => self.status_message = format!("Error saving: {e}"),
        }
    }

    /// Move the selection onto `id` if it is visible.
    fn select_task(&mut self, id: &str) {
        for (col, cards) in self.columns.iter().enumerate() {
            if let Some(pos) = cards.iter().position(|c| c == id) {
                self.selected_column = col;
                self.selected_card = pos;
                return;
            }
        }
        self.clamp_selection();
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.filter_active = false;
                self.filter_text.clear();
                self.status_message.clear();
                self.update_columns();
            }
            KeyCode::Enter => {
                self.filter_active = false;
                self.status_message = if self.filter_text.is_empty() {
                    "Filter cleared".to_string()
                } else {
                    format!("Filter: '{}' ({} tasks shown)", self.filter_text, self.visible_task_count())
                };
            }
            KeyCode::Backspace => {
                if self.filter_text.pop().is_some() {
                    self.update_columns();
                }
            }
            KeyCode::Char(c) => {
                self.filter_text.push(c);
                self.update_columns();
            }
            _ => {}
        }
    }

    /// Handle one key press. Returns true when the board should close.
    fn handle_input(&mut self) -> io::Result<bool> {
        if !event::poll(Duration::from_millis(50))? {
            return Ok(false);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(false);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }
        if self.filter_active {
            self.handle_filter_key(key.code);
            return Ok(false);
        }

        self.status_message.clear();
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Esc if self.show_task_detail => self.show_task_detail = false,
            KeyCode::Esc | KeyCode::Char('q') => return Ok(true),
            KeyCode::Enter => self.show_task_detail = !self.show_task_detail,
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column + 1 < self.columns.len() {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => self.selected_card = self.selected_card.saturating_sub(1),
            KeyCode::Down => {
                let column_len = self.columns.get(self.selected_column).map_or(0, Vec::len);
                if self.selected_card + 1 < column_len {
                    self.selected_card += 1;
                }
            }
            KeyCode::Char('c') => self.toggle_task_completion(),
            KeyCode::Char('t') => {
                self.show_completed = !self.show_completed;
                self.update_columns();
                self.status_message = if self.show_completed {
                    "Showing Completed column".to_string()
                } else {
                    "Hiding Completed column".to_string()
                };
            }
            KeyCode::Char('/') => {
                self.filter_active = true;
            }
            KeyCode::Char('h') => {
                self.status_message =
                    "Arrows: Move | Enter: Details | c: Complete | t: Toggle Completed | /: Filter | Esc: Quit".to_string();
            }
            _ => {}
        }
        Ok(false)
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_board(f, chunks[1]);
        self.render_status_bar(f, chunks[2]);

        if self.show_task_detail {
            self.render_task_detail_popup(f);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let pad_name = self
            .store
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("pad")
            .to_string();
        let header = Paragraph::new(Line::from(vec![
            Span::styled("PROGRESSPAD BOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("Pad: {pad_name}  Today: {}", self.today),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        if self.columns.is_empty() {
            f.render_widget(Paragraph::new("No status columns configured."), area);
            return;
        }
        let count = self.columns.len() as u32;
        let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, &column_area) in layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize) {
        let is_selected = column_index == self.selected_column;
        let cards = &self.columns[column_index];
        let title = format!("{} ({})", self.statuses[column_index], cards.len());

        let border_style = if is_selected {
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::default().borders(Borders::ALL).title(title).border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        if cards.is_empty() {
            return;
        }

        let available_height = inner.height as usize;
        let visible_cards = (available_height / CARD_HEIGHT).max(1);

        // Keep the selected card in view.
        let mut offset = self.column_scroll_offsets[column_index];
        if is_selected {
            if self.selected_card < offset {
                offset = self.selected_card;
            } else if self.selected_card >= offset + visible_cards {
                offset = self.selected_card + 1 - visible_cards;
            }
            self.column_scroll_offsets[column_index] = offset;
        }

        let mut y = 0;
        let mut rendered = 0;
        for (card_index, id) in self.columns[column_index].iter().enumerate().skip(offset) {
            if y + CARD_HEIGHT > available_height {
                break;
            }
            if let Some(task) = self.store.db.get(id) {
                let card_area = Rect {
                    x: inner.x,
                    y: inner.y + y as u16,
                    width: inner.width,
                    height: CARD_HEIGHT as u16,
                };
                self.render_card(f, card_area, task, is_selected && card_index == self.selected_card);
                y += CARD_HEIGHT;
                rendered += 1;
            }
        }

        let remaining = self.columns[column_index].len().saturating_sub(offset + rendered);
        if remaining > 0 && inner.height > 0 {
            let indicator = Paragraph::new(format!("▼ +{remaining} below")).style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { x: inner.x, y: inner.y + inner.height - 1, width: inner.width, height: 1 });
        }
    }

    fn render_card(&self, f: &mut Frame, area: Rect, task: &Task, is_selected: bool) {
        let flags = task.due_flags(self.today);
        let (bg, fg) = card_colors(flags);
        let mut style = Style::default().bg(bg).fg(fg);
        let mut border = Style::default().fg(fg);
        if is_selected {
            style = style.add_modifier(Modifier::BOLD);
            border = Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD);
        }

        let due = match task.due_date {
            Some(_) => format_due_relative(task.due_date, self.today),
            None => "no due date".to_string(),
        };
        let lines = vec![
            Line::from(format!("{}  {}", task.id, task.priority.as_deref().unwrap_or("-"))),
            Line::from(task.description.clone().unwrap_or_default()),
            Line::from(due),
        ];
        let card = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).border_style(border))
            .style(style)
            .wrap(Wrap { trim: true });
        f.render_widget(card, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if self.filter_active {
            format!("Filter: {} | Type to search, Enter to apply, Esc to cancel", self.filter_text)
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let completed = if self.show_completed { " [+Completed]" } else { "" };
            let filter = if self.filter_text.is_empty() {
                String::new()
            } else {
                format!(" [Filter: {}]", self.filter_text)
            };
            format!(
                "Tasks: {}{completed}{filter} | Enter: Details | c: Complete | t: Completed column | /: Filter | Esc: Quit",
                self.visible_task_count()
            )
        };
        let bar = Paragraph::new(text).style(Style::default().bg(ACCENT_TEAL).fg(Color::White));
        f.render_widget(bar, area);
    }

    fn render_task_detail_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let popup_area = {
            let area = f.area();
            let width = area.width * 80 / 100;
            let height = area.height * 80 / 100;
            Rect::new((area.width - width) / 2, (area.height - height) / 2, width, height)
        };
        f.render_widget(Clear, popup_area);

        let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        let flags = task.due_flags(self.today);
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{}: {}", task.id, dash(&task.description)),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Status:    {}", task.status)),
            Line::from(format!("Type:      {}", dash(&task.task_type))),
            Line::from(format!("Priority:  {}", dash(&task.priority))),
            Line::from(format!("Product:   {}", dash(&task.product))),
            Line::from(format!("Module:    {}", dash(&task.module))),
            Line::from(format!("Category:  {}", dash(&task.category))),
            Line::from(format!(
                "Due:       {} {}",
                format_due_relative(task.due_date, self.today),
                flags.label()
            )),
        ];
        for (name, value) in &task.custom_fields {
            lines.push(Line::from(format!("{name}: {value}")));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Current plan", Style::default().add_modifier(Modifier::BOLD))));
        lines.push(Line::from(dash(&task.current_action_plan)));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("History", Style::default().add_modifier(Modifier::BOLD))));
        for entry in parse_history(&task.action_plan_history) {
            let stamp = match (entry.date, entry.standup) {
                (Some(d), true) => format!("STANDUP {d}"),
                (Some(d), false) => d.to_string(),
                (None, _) => "undated".to_string(),
            };
            lines.push(Line::from(Span::styled(stamp, Style::default().fg(Color::Cyan))));
            lines.extend(entry.text.lines().map(|l| Line::from(format!("  {l}"))));
        }

        let popup = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Task Details (Enter to close)")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, popup_area);
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
