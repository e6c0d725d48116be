//! Terminal UI
//!
//! A thin ratatui renderer over [`App`]. Drawing never mutates state.

pub mod browser;
pub mod keyboard;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{App, Screen, Source};

/// Draw the whole screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Theme::BACKGROUND)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    if app.is_loading() {
        render_centered(frame, chunks[1], app.loading_message().unwrap_or(""), Theme::loading());
    } else {
        match &app.screen {
            Screen::Browsing(browse) => browser::render(frame, chunks[1], browse, &app.favorites),
            Screen::TextInput(search) => keyboard::render(frame, chunks[1], search),
        }
    }
    render_footer(frame, chunks[2], app);

    if let Some(error) = &app.error {
        render_error_popup(frame, area, error);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("glimpse", Theme::title()),
        Span::styled(format!(" v{}", env!("CARGO_PKG_VERSION")), Theme::dimmed()),
    ];
    if let Some(login) = &app.playing {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("▶ {}", login), Theme::live()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Key hints for the current screen
pub fn footer_hints(app: &App) -> &'static str {
    match &app.screen {
        _ if app.is_playing() => "b:stop  y:favorite  q:quit",
        Screen::Browsing(b) => match b.source {
            Source::Top => "↑↓:move  a:play  →:favorites  x:search  y:favorite  b:quit",
            Source::Favorites => "↑↓:move  a:play  ←:top  x:search  y:favorite  b:back",
            Source::Search => "↑↓:move  a:play  x:new search  y:favorite  b:back",
        },
        Screen::TextInput(_) => "arrows:keys  tab:type key  enter:search  esc:back",
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let hints = Paragraph::new(Span::styled(footer_hints(app), Theme::keybind()))
        .alignment(Alignment::Center);
    frame.render_widget(hints, area);
}

fn render_centered(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let y = area.y + area.height / 2;
    let line = Rect {
        x: area.x,
        y,
        width: area.width,
        height: 1.min(area.height),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text.to_string(), style)).alignment(Alignment::Center),
        line,
    );
}

fn render_error_popup(frame: &mut Frame, area: Rect, error: &str) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5.min(area.height);

    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let popup = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(error, Theme::error()))])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Theme::error())
                .title(Span::styled(" ERROR ", Theme::error()))
                .style(Style::default().bg(Theme::BACKGROUND)),
        );

    frame.render_widget(popup, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Completion;
    use crate::input::Input;
    use crate::models::{Broadcaster, Stream};
    use ratatui::backend::TestBackend;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn stream(login: &str, title: &str) -> Stream {
        Stream {
            id: "1".into(),
            title: title.into(),
            viewers_count: 1234,
            broadcaster: Broadcaster {
                login: login.into(),
                display_name: login.into(),
                ..Broadcaster::default()
            },
            ..Stream::default()
        }
    }

    #[test]
    fn test_loading_text_at_startup() {
        let mut app = App::default();
        app.start();
        assert!(draw(&app).contains("Loading streams..."));
    }

    #[test]
    fn test_renders_visible_window_only() {
        let mut app = App::default();
        app.start();
        app.complete(Completion::TopLoaded(Ok(vec![
            stream("alpha", "first"),
            stream("bravo", "second"),
            stream("charlie", "third"),
            stream("delta", "fourth"),
        ])));

        let screen = draw(&app);
        assert!(screen.contains("alpha"));
        assert!(screen.contains("charlie"));
        assert!(screen.contains("1.2K"));
        assert!(!screen.contains("delta"));
    }

    #[test]
    fn test_renders_keyboard() {
        let mut app = App::default();
        app.handle_input(Input::Search);
        app.handle_input(Input::Char('h'));
        let screen = draw(&app);
        assert!(screen.contains("SEARCH"));
        assert!(screen.contains("ENTER"));
        assert!(screen.contains("h│"));
    }

    #[test]
    fn test_error_popup() {
        let mut app = App::default();
        app.error = Some("something broke".into());
        assert!(draw(&app).contains("something broke"));
    }
}
