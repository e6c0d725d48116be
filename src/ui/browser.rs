//! Stream list view
//!
//! Shows the rows inside the page window, one card per stream.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};

use crate::app::BrowseState;
use crate::favorites::FavoritesStore;
use crate::models::Stream;
use crate::ui::Theme;

/// Render the visible part of a stream list
pub fn render(frame: &mut Frame, area: Rect, browse: &BrowseState, favorites: &FavoritesStore) {
    let title = if browse.streams.is_empty() {
        format!(" {} ", browse.source.label())
    } else {
        format!(
            " {} ({}/{}) ",
            browse.source.label(),
            browse.window.selected + 1,
            browse.streams.len()
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border_focused())
        .title(Span::styled(title, Theme::title()));

    if browse.streams.is_empty() {
        let empty = Paragraph::new("No streams to show")
            .style(Theme::dimmed())
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = browse
        .visible()
        .map(|(i, stream)| {
            let selected = i == browse.window.selected;
            stream_item(stream, selected, favorites.contains(stream.login()))
        })
        .collect();

    frame.render_widget(List::new(items).block(block).style(Theme::text()), area);
}

/// One stream card: name line, title line, spacer
fn stream_item(stream: &Stream, selected: bool, favorite: bool) -> ListItem<'static> {
    let marker = if selected { "▸ " } else { "  " };
    let star = if favorite { "★ " } else { "  " };

    let status = if stream.is_offline() {
        Span::styled("offline", Theme::dimmed())
    } else {
        Span::styled(format!("● {}", stream.viewers_label()), Theme::live())
    };

    let name = Line::from(vec![
        Span::styled(marker, Theme::accent()),
        Span::styled(star, Theme::accent()),
        Span::styled(
            stream.broadcaster.name().to_string(),
            if selected { Theme::selected() } else { Theme::title() },
        ),
        Span::raw("  "),
        status,
        Span::raw("  "),
        Span::styled(image_markers(stream), Theme::dimmed()),
    ]);

    let title = Line::from(vec![
        Span::raw("    "),
        Span::styled(stream.title.clone(), Theme::secondary()),
    ]);

    ListItem::new(vec![name, title, Line::from("")])
}

/// `[P]` / `[A]` when the preview or avatar bytes are loaded
pub fn image_markers(stream: &Stream) -> String {
    let preview = if stream.preview_image.is_some() { "[P]" } else { "[ ]" };
    let avatar = if stream.broadcaster.profile_image.is_some() {
        "[A]"
    } else {
        "[ ]"
    };
    format!("{}{}", preview, avatar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_image_markers() {
        let mut stream = Stream::default();
        assert_eq!(image_markers(&stream), "[ ][ ]");
        stream.preview_image = Some(Arc::from(vec![1u8]));
        assert_eq!(image_markers(&stream), "[P][ ]");
        stream.broadcaster.profile_image = Some(Arc::from(vec![1u8]));
        assert_eq!(image_markers(&stream), "[P][A]");
    }
}
