//! Footer component used for keybinding hints.

use crate::ui::theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

/// Returns the footer height required to render all hints for the given terminal width.
pub fn required_height(screen_width: u16, hints: &[Hint]) -> u16 {
    let width = usize::from(screen_width.max(1));
    wrap_hints(hints, width).len().max(1) as u16
}

/// Renders keybinding hints in a plain bottom bar.
pub fn render(frame: &mut Frame<'_>, area: Rect, hints: &[Hint]) {
    let width = usize::from(area.width.max(1));
    let lines = wrap_hints(hints, width);
    let text: Vec<Line<'static>> = if lines.is_empty() {
        vec![Line::from(" ")]
    } else {
        lines.iter().map(|line| styled_hint_line(line)).collect()
    };

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

/// One `[key] description` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub key: &'static str,
    pub desc: &'static str,
}

impl Hint {
    pub const fn new(key: &'static str, desc: &'static str) -> Self {
        Self { key, desc }
    }

    fn display_width(&self) -> usize {
        // "[" key "]" " " desc
        self.key.chars().count() + 3 + self.desc.chars().count()
    }
}

fn wrap_hints(hints: &[Hint], width: usize) -> Vec<Vec<Hint>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = Vec::<Hint>::new();
    let mut current_width = 0usize;

    for hint in hints {
        let hint_width = hint.display_width();
        let separator_width = if current.is_empty() { 0 } else { 2 };
        let projected_width = current_width + separator_width + hint_width;

        if projected_width <= width {
            current.push(*hint);
            current_width = projected_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        current_width = hint_width.min(width);
        current.push(*hint);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn styled_hint_line(hints: &[Hint]) -> Line<'static> {
    let mut spans = Vec::<Span<'static>>::new();
    for (index, hint) in hints.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled("  ", theme::dim()));
        }
        spans.push(Span::styled(format!("[{}]", hint.key), theme::info()));
        spans.push(Span::styled(format!(" {}", hint.desc), theme::dim()));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::{Hint, required_height, wrap_hints};

    const HINTS: [Hint; 3] = [
        Hint::new("tab", "next"),
        Hint::new("t", "theme"),
        Hint::new("q", "quit"),
    ];

    #[test]
    fn hints_fit_on_one_line_when_wide() {
        assert_eq!(required_height(120, &HINTS), 1);
    }

    #[test]
    fn hints_wrap_on_narrow_screens() {
        let lines = wrap_hints(&HINTS, 12);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], vec![Hint::new("t", "theme")]);
    }

    #[test]
    fn empty_hints_still_take_a_row() {
        assert_eq!(required_height(80, &[]), 1);
    }
}
