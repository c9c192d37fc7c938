//! Review screen: code input, language selector, submit button, and feedback pane.

use crate::app::state::AppState;
use crate::app::state::submission::SubmissionState;
use crate::domain::Focus;
use crate::render::markdown::MarkdownRenderer;
use crate::ui::components::dropdown;
use crate::ui::theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const SUBMIT_LABEL: &str = "Submit for Review";
const CODE_PLACEHOLDER: &str = "Paste or type your code here. Press Ctrl-E to open $EDITOR.";
const FEEDBACK_PLACEHOLDER: &str = "Submit code to see review feedback here.";

pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &mut AppState,
    markdown: &mut MarkdownRenderer,
) {
    let panes =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(area);
    let left = Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).split(panes[0]);
    let controls = Layout::horizontal([
        Constraint::Length(22),
        Constraint::Length(1),
        Constraint::Length(SUBMIT_LABEL.chars().count() as u16 + 4),
        Constraint::Min(0),
    ])
    .split(left[1]);

    render_code_pane(frame, left[0], state, markdown);
    dropdown::render_control(frame, controls[0], &state.language);
    render_submit_button(frame, controls[2], state);
    render_feedback_pane(frame, panes[1], state, markdown);

    state.regions.code = left[0];
    state.regions.submit = controls[2];
    state.regions.feedback = panes[1];

    let list = state.language.is_open().then(|| {
        dropdown::list_area(controls[0], state.language.options().len(), frame.area())
    });
    state.language.set_regions(controls[0], list);
    if let Some(list) = list {
        dropdown::render_list(frame, list, &state.language);
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        theme::focused_border()
    } else {
        theme::border()
    };
    Block::default()
        .title(Span::styled(title, theme::title()))
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn render_code_pane(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &mut AppState,
    markdown: &mut MarkdownRenderer,
) {
    let language = state.selected_language();
    let block = pane_block(
        format!(" Code ({}) ", language.label()),
        state.focus == Focus::Code,
    );
    let inner = block.inner(area);

    if state.code.text().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(CODE_PLACEHOLDER, theme::dim()))
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    if state.code.is_focused() {
        state.code.follow_tail(inner.height);
    }

    let mut lines = markdown.highlight_code(language, state.code.text()).to_vec();
    if state.code.is_focused() {
        if state.code.text().ends_with('\n') {
            lines.push(Line::default());
        }
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled("▏", theme::info()));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .scroll((state.code.scroll(), 0)),
        area,
    );
}

fn render_submit_button(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Submit;
    let (label, style) = match state.operation_display().filter(|_| state.is_busy()) {
        Some(spinner) => (spinner, theme::button_disabled()),
        None if focused => (SUBMIT_LABEL.to_owned(), theme::selected()),
        None => (SUBMIT_LABEL.to_owned(), theme::button()),
    };

    let border_style = if focused {
        theme::focused_border()
    } else {
        theme::border()
    };

    frame.render_widget(
        Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            ),
        area,
    );
}

fn render_feedback_pane(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    markdown: &mut MarkdownRenderer,
) {
    let points = state.review_points();
    let title = if points.is_empty() {
        " AI Feedback ".to_owned()
    } else {
        format!(" AI Feedback ({}) ", points.len())
    };
    let block = pane_block(title, state.focus == Focus::Feedback);

    let mut lines: Vec<Line<'static>> = Vec::new();
    match state.submission.state() {
        SubmissionState::InFlight { .. } | SubmissionState::Validating => {
            lines.push(status_line(
                state.operation_display().unwrap_or_default(),
                theme::info(),
            ));
        }
        SubmissionState::Failed { reason } => {
            lines.push(status_line(reason.message().to_owned(), theme::error()));
        }
        SubmissionState::Idle | SubmissionState::Succeeded { .. } => {}
    }

    if points.is_empty() {
        if lines.is_empty() {
            lines.push(status_line(FEEDBACK_PLACEHOLDER.to_owned(), theme::dim()));
        }
    } else {
        let first = usize::from(state.feedback_scroll).min(points.len() - 1);
        for (position, point) in points[first..].iter().enumerate() {
            if position > 0 || !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.extend(markdown.render_point(point));
        }
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

fn status_line(text: String, style: Style) -> Line<'static> {
    Line::from(Span::styled(text, style))
}
