//! Contact screen: name, email, and message fields with a send button.

use crate::app::state::AppState;
use crate::app::state::contact::{ContactField, ContactForm, SENT_MESSAGE};
use crate::ui::theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const CARD_WIDTH: u16 = 64;
const SEND_LABEL: &str = "Send Message";
const SENDING_LABEL: &str = "Sending...";
const RESET_LABEL: &str = "Submit another feedback";

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &mut AppState) {
    let [card] = Layout::horizontal([Constraint::Length(CARD_WIDTH.min(area.width))])
        .flex(Flex::Center)
        .areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border());
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let [heading, body] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(inner);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled("Contact Us", theme::title())),
            Line::from(Span::styled(
                "Have a question or feedback? We'd love to hear from you.",
                theme::dim(),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        heading,
    );

    if state.contact.is_sent() {
        render_sent(frame, body, state);
    } else {
        render_form(frame, body, state);
    }
}

fn render_sent(frame: &mut Frame<'_>, area: Rect, state: &mut AppState) {
    let [message, _, button] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled("✔", theme::success())),
            Line::from(Span::styled(SENT_MESSAGE, theme::success())),
        ])
        .alignment(Alignment::Center),
        message,
    );
    render_button(frame, button, RESET_LABEL, theme::button());
    state.regions.contact_send = button;
}

fn render_form(frame: &mut Frame<'_>, area: Rect, state: &mut AppState) {
    let [name, email, error, message, send] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(3),
    ])
    .areas(area);

    let form = &state.contact;
    render_field(frame, name, form, ContactField::Name, "Your Name", form.name());
    render_field(frame, email, form, ContactField::Email, "Your Email", form.email());
    if let Some(message) = form.email_error() {
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {message}"), theme::error())),
            error,
        );
    }
    render_field(
        frame,
        message,
        form,
        ContactField::Message,
        "Your Message",
        form.message(),
    );

    let (label, style) = if form.is_sending() {
        (SENDING_LABEL, theme::button_disabled())
    } else if form.field() == ContactField::Send {
        (SEND_LABEL, theme::selected())
    } else {
        (SEND_LABEL, theme::button())
    };
    render_button(frame, send, label, style);

    state.regions.contact_name = name;
    state.regions.contact_email = email;
    state.regions.contact_message = message;
    state.regions.contact_send = send;
}

fn render_field(
    frame: &mut Frame<'_>,
    area: Rect,
    form: &ContactForm,
    field: ContactField,
    placeholder: &'static str,
    text: &str,
) {
    let focused = form.field() == field;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            theme::focused_border()
        } else {
            theme::border()
        });
    let inner = block.inner(area);

    if text.is_empty() && !focused {
        frame.render_widget(
            Paragraph::new(Span::styled(placeholder, theme::dim())).block(block),
            area,
        );
        return;
    }

    let mut lines: Vec<Line<'_>> = text
        .split('\n')
        .map(|line| Line::from(Span::styled(line.to_owned(), theme::text())))
        .collect();
    if focused
        && !form.is_sending()
        && let Some(last) = lines.last_mut()
    {
        last.spans.push(Span::styled("▏", theme::info()));
    }

    let overflow = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_sub(inner.height.max(1));
    frame.render_widget(
        Paragraph::new(lines).block(block).scroll((overflow, 0)),
        area,
    );
}

fn render_button(frame: &mut Frame<'_>, area: Rect, label: &str, style: Style) {
    frame.render_widget(
        Paragraph::new(Span::styled(label.to_owned(), style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme::border()),
            ),
        area,
    );
}
