use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use client_book::models::ContactRow;

// State of the lookup results screen
pub struct LookupState {
    rows: Vec<ContactRow>,
    list_state: ListState,
    show_delete_confirmation: bool,
}

impl LookupState {
    pub fn new(rows: Vec<ContactRow>) -> Self {
        let mut list_state = ListState::default();
        if !rows.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            rows,
            list_state,
            show_delete_confirmation: false,
        }
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_row(&self) -> Option<&ContactRow> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn selected_client_id(&self) -> Option<i32> {
        self.selected_row().map(|row| row.id)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum LookupAction {
    Back,
    Refresh,
    DeleteClient(i32),
}

pub fn render_lookup<B: Backend>(frame: &mut Frame<B>, state: &mut LookupState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(size);

    let items: Vec<ListItem> = state
        .rows
        .iter()
        .map(|row| {
            ListItem::new(Spans::from(vec![
                Span::styled(format!("{:>5}  ", row.id), Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{} {}", row.first_name, row.last_name)),
                Span::raw(format!("  {}  {}", row.phone, row.email)),
            ]))
        })
        .collect();

    let title = format!("Clients ({} rows)", state.rows.len());
    let rows_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(rows_list, chunks[0], &mut state.list_state);

    let buttons_text = if state.selected_row().is_some() {
        "<D> Delete Client | <R> Refresh | <Esc> Back"
    } else {
        "<R> Refresh | <Esc> Back"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[1]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this client?"),
        Spans::from(""),
        Spans::from("All of its phones and emails will also be deleted."),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
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

pub fn handle_input(state: &mut LookupState) -> Result<Option<LookupAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(apply_key(state, key.code));
    }
    Ok(None)
}

pub fn apply_key(state: &mut LookupState, code: KeyCode) -> Option<LookupAction> {
    if state.show_delete_confirmation {
        match code {
            KeyCode::Char('y') => {
                state.toggle_delete_confirmation();
                return state.selected_client_id().map(LookupAction::DeleteClient);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                state.toggle_delete_confirmation();
            }
            _ => {}
        }
        return None;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(LookupAction::Back),
        KeyCode::Char('r') => return Some(LookupAction::Refresh),
        KeyCode::Char('d') if state.selected_row().is_some() => {
            state.toggle_delete_confirmation();
        }
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, phone: &str) -> ContactRow {
        ContactRow {
            id,
            first_name: "Николай".into(),
            last_name: "Староверов".into(),
            phone: phone.into(),
            email: "starov@jci.com".into(),
        }
    }

    #[test]
    fn navigation_wraps_around() {
        let mut state = LookupState::new(vec![row(1, "+111"), row(2, "+222")]);
        assert_eq!(state.selected_client_id(), Some(1));

        state.next();
        assert_eq!(state.selected_client_id(), Some(2));
        state.next();
        assert_eq!(state.selected_client_id(), Some(1));
        state.previous();
        assert_eq!(state.selected_client_id(), Some(2));
    }

    #[test]
    fn empty_results_select_nothing() {
        let mut state = LookupState::new(Vec::new());
        state.next();
        state.previous();

        assert_eq!(state.selected_client_id(), None);
        assert_eq!(apply_key(&mut state, KeyCode::Char('d')), None);
        assert!(!state.show_delete_confirmation);
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut state = LookupState::new(vec![row(7, "+79261114455")]);

        assert_eq!(apply_key(&mut state, KeyCode::Char('d')), None);
        assert!(state.show_delete_confirmation);
        assert_eq!(
            apply_key(&mut state, KeyCode::Char('y')),
            Some(LookupAction::DeleteClient(7))
        );
        assert!(!state.show_delete_confirmation);
    }

    #[test]
    fn escape_cancels_confirmation_before_leaving() {
        let mut state = LookupState::new(vec![row(7, "+79261114455")]);
        apply_key(&mut state, KeyCode::Char('d'));

        assert_eq!(apply_key(&mut state, KeyCode::Esc), None);
        assert_eq!(apply_key(&mut state, KeyCode::Esc), Some(LookupAction::Back));
    }
}
