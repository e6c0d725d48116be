//! Search box and virtual keyboard

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::app::{SearchInput, KEYBOARD};
use crate::ui::Theme;

pub fn render(frame: &mut Frame, area: Rect, search: &SearchInput) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(KEYBOARD.len() as u16 + 2)])
        .split(area);

    let input = Paragraph::new(format!("⌕ {}│", search.query))
        .style(Theme::text().fg(Theme::PRIMARY))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Theme::border_focused())
                .title(Span::styled(" SEARCH ", Theme::title())),
        );
    frame.render_widget(input, chunks[0]);

    let rows: Vec<Line> = KEYBOARD
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let keys: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(c, key)| {
                    let style = if search.keyboard.row == r && search.keyboard.col == c {
                        Theme::selected()
                    } else {
                        Theme::text()
                    };
                    Span::styled(format!(" {} ", key), style)
                })
                .collect();
            Line::from(keys)
        })
        .collect();

    let keyboard = Paragraph::new(rows).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(keyboard, chunks[1]);
}
