//! Application runtime, event loop, and keyboard/mouse handling.

pub mod editor;
pub mod events;
pub mod state;

use crate::api::client::ReviewApi;
use crate::api::contact::ContactSender;
use crate::app::events::{
    WorkerMessage, WorkerTasks, spawn_feedback_focus, spawn_send_contact, spawn_submit_review,
};
use crate::app::state::AppState;
use crate::app::state::submission::Effect;
use crate::app::state::theme::{ThemePreference, ThemeState};
use crate::domain::{Focus, Language, NotificationKind, Screen};
use crate::render::markdown::MarkdownRenderer;
use crate::storage::{Session, Storage};
use crate::ui;
use crate::ui::theme::ThemePalette;
use anyhow::Context;
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Position;
use std::io::{Stdout, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Runtime configuration assembled from the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_theme: ThemePreference,
    pub feedback_focus_delay: Duration,
    pub notification_duration: Duration,
    pub initial_code: Option<String>,
    pub language: Option<Language>,
}

/// Collaborators the event handlers need to execute effects.
struct Runtime {
    storage: Arc<dyn Storage>,
    api: Arc<dyn ReviewApi>,
    contact: Arc<dyn ContactSender>,
    tx: UnboundedSender<WorkerMessage>,
    tasks: WorkerTasks,
    feedback_focus_delay: Duration,
}

/// Runs the interactive TUI application.
pub async fn run(
    config: AppConfig,
    storage: Arc<dyn Storage>,
    api: Arc<dyn ReviewApi>,
    contact: Arc<dyn ContactSender>,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WorkerMessage>();

    let session = Session::load(storage.as_ref()).context("failed to load session")?;
    let mut state = initial_state(&config, session, storage.clone());

    let mut runtime = Runtime {
        storage,
        api,
        contact,
        tx,
        tasks: WorkerTasks::default(),
        feedback_focus_delay: config.feedback_focus_delay,
    };

    let mut terminal = setup_terminal()?;
    let mut markdown = MarkdownRenderer::new();

    let result = run_event_loop(
        &mut terminal,
        &mut state,
        &mut runtime,
        &mut rx,
        &mut markdown,
    )
    .await;

    let review_running = runtime.tasks.abort_all();
    if review_running && state.submission.cancel_in_flight() {
        tracing::info!("abandoned in-flight review on exit");
    }
    if state.contact.cancel_in_flight() {
        tracing::info!("abandoned contact message on exit");
    }

    restore_terminal(&mut terminal)?;
    result
}

fn initial_state(config: &AppConfig, session: Session, storage: Arc<dyn Storage>) -> AppState {
    let mut theme = ThemeState::load(storage, config.default_theme);
    ui::theme::apply(ThemePalette::for_preference(theme.preference()));
    theme.subscribe(|preference| {
        tracing::debug!(%preference, "applying theme palette");
        ui::theme::apply(ThemePalette::for_preference(preference));
    });

    tracing::info!(
        signed_in = session.is_signed_in(),
        theme = %theme.preference(),
        "starting review session"
    );

    let mut state = AppState::new(session, theme);
    state.set_notification_duration(config.notification_duration);
    if let Some(language) = config.language {
        state.select_language(language);
    }
    if let Some(code) = &config.initial_code {
        state.code.replace(code.clone());
    }
    state
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut AppState,
    runtime: &mut Runtime,
    rx: &mut UnboundedReceiver<WorkerMessage>,
    markdown: &mut MarkdownRenderer,
) -> anyhow::Result<()> {
    loop {
        state.advance_spinner();
        state.prune_notifications(Instant::now());

        while let Ok(message) = rx.try_recv() {
            process_worker_message(state, runtime, message);
        }

        terminal.draw(|frame| ui::render(frame, state, markdown))?;

        if state.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(60))? {
            handle_event(state, runtime, event::read()?);
        }

        if state.editor_requested {
            state.editor_requested = false;
            open_code_editor(state, terminal);
        }
    }

    Ok(())
}

fn process_worker_message(state: &mut AppState, runtime: &mut Runtime, message: WorkerMessage) {
    match message {
        WorkerMessage::ReviewFinished { request_id, result } => {
            let effects = state.finish_review(request_id, result);
            execute_effects(state, runtime, effects);
        }
        WorkerMessage::FeedbackFocusDue { request_id } => {
            if !state.focus_feedback(request_id) {
                tracing::debug!(request_id, "skipping feedback focus for superseded review");
            }
        }
        WorkerMessage::ContactFinished { request_id, result } => {
            state.finish_contact(request_id, result);
        }
    }
}

fn execute_effects(state: &mut AppState, runtime: &mut Runtime, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Dispatch(pending) => {
                tracing::info!(
                    request_id = pending.request_id,
                    language = %pending.request.language,
                    "dispatching review request"
                );
                let handle = spawn_submit_review(runtime.tx.clone(), runtime.api.clone(), pending);
                runtime.tasks.set_review(handle);
            }
            Effect::Notify { kind, message } => state.notify(kind, message),
            Effect::ScheduleFeedbackFocus { request_id } => {
                let handle = spawn_feedback_focus(
                    runtime.tx.clone(),
                    request_id,
                    runtime.feedback_focus_delay,
                );
                runtime.tasks.set_feedback_focus(handle);
            }
            Effect::SendContact(pending) => {
                tracing::info!(request_id = pending.request_id, "sending contact message");
                let handle =
                    spawn_send_contact(runtime.tx.clone(), runtime.contact.clone(), pending);
                runtime.tasks.set_contact(handle);
            }
        }
    }
}

fn handle_event(state: &mut AppState, runtime: &mut Runtime, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(state, runtime, key),
        Event::Mouse(mouse) => handle_mouse_event(state, runtime, mouse),
        Event::Paste(text) => {
            if state.logout_dialog.is_shown() {
                return;
            }
            match state.screen {
                Screen::Contact => state.contact.push_str(&text),
                Screen::Review if state.focus == Focus::Code => state.code.push_str(&text),
                Screen::Review => {}
            }
        }
        _ => {}
    }
}

fn handle_mouse_event(state: &mut AppState, runtime: &mut Runtime, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let effects = state.pointer_down(mouse.column, mouse.row, runtime.storage.as_ref());
            execute_effects(state, runtime, effects);
        }
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            let position = Position::new(mouse.column, mouse.row);
            let down = mouse.kind == MouseEventKind::ScrollDown;
            if state.regions.feedback.contains(position) {
                if down {
                    state.scroll_feedback_down();
                } else {
                    state.scroll_feedback_up();
                }
            } else if state.regions.code.contains(position) && !state.code.is_focused() {
                if down {
                    state.code.scroll_down();
                } else {
                    state.code.scroll_up();
                }
            }
        }
        _ => {}
    }
}

fn handle_key_event(state: &mut AppState, runtime: &mut Runtime, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    if state.logout_dialog.is_shown() {
        handle_dialog_key_event(state, runtime, key);
        return;
    }

    if state.screen == Screen::Contact {
        handle_contact_key_event(state, runtime, key);
        return;
    }

    if state.language.is_open() {
        handle_dropdown_key_event(state, key);
        return;
    }

    if ctrl {
        match key.code {
            KeyCode::Char('s') => {
                let effects = state.submit();
                execute_effects(state, runtime, effects);
            }
            KeyCode::Char('e') => state.editor_requested = true,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Tab => {
            state.focus_next();
            return;
        }
        KeyCode::BackTab => {
            state.focus_prev();
            return;
        }
        _ => {}
    }

    if state.focus == Focus::Code {
        handle_code_key_event(state, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Esc => state.set_focus(Focus::Code),
        KeyCode::Char('t') => {
            state.theme.toggle();
        }
        KeyCode::Char('L') => {
            if state.session.is_signed_in() {
                state.request_logout();
            }
        }
        KeyCode::Char('e') => state.editor_requested = true,
        KeyCode::Char('c') => state.show_screen(Screen::Contact),
        _ => match state.focus {
            Focus::Language => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down) {
                    state.language.toggle_open();
                }
            }
            Focus::Submit => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    let effects = state.submit();
                    execute_effects(state, runtime, effects);
                }
            }
            Focus::Feedback => match key.code {
                KeyCode::Down | KeyCode::Char('j') => state.scroll_feedback_down(),
                KeyCode::Up | KeyCode::Char('k') => state.scroll_feedback_up(),
                _ => {}
            },
            Focus::Code => {}
        },
    }
}

fn handle_code_key_event(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.focus_next(),
        KeyCode::Enter => state.code.newline(),
        KeyCode::Backspace => state.code.backspace(),
        KeyCode::PageDown => state.code.scroll_down(),
        KeyCode::PageUp => state.code.scroll_up(),
        KeyCode::Char(ch) => {
            if !ch.is_control() {
                state.code.push_char(ch);
            }
        }
        _ => {}
    }
}

fn handle_contact_key_event(state: &mut AppState, runtime: &mut Runtime, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            let effects = state.send_contact();
            execute_effects(state, runtime, effects);
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            state.show_screen(Screen::Review);
            return;
        }
        KeyCode::Tab => {
            state.contact.focus_next();
            return;
        }
        KeyCode::BackTab => {
            state.contact.focus_prev();
            return;
        }
        _ => {}
    }

    if state.contact.field().is_text() && !state.contact.is_sent() {
        match key.code {
            KeyCode::Enter => state.contact.newline(),
            KeyCode::Backspace => state.contact.backspace(),
            KeyCode::Char(ch) if !ch.is_control() => state.contact.push_char(ch),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            let effects = state.activate_contact_button();
            execute_effects(state, runtime, effects);
        }
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Char('t') => {
            state.theme.toggle();
        }
        KeyCode::Char('L') => {
            if state.session.is_signed_in() {
                state.request_logout();
            }
        }
        _ => {}
    }
}

fn handle_dialog_key_event(state: &mut AppState, runtime: &mut Runtime, key: KeyEvent) {
    match key.code {
        KeyCode::Left
        | KeyCode::Right
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Char('h')
        | KeyCode::Char('l') => state.logout_dialog.toggle_button(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(action) = state.logout_dialog.activate_selected() {
                state.execute_guarded(action, runtime.storage.as_ref());
            }
        }
        KeyCode::Char('y') => {
            if let Some(action) = state.logout_dialog.confirm() {
                state.execute_guarded(action, runtime.storage.as_ref());
            }
        }
        KeyCode::Esc | KeyCode::Char('n') => state.logout_dialog.cancel(),
        _ => {}
    }
}

fn handle_dropdown_key_event(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => state.language.highlight_next(),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => state.language.highlight_prev(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(language) = state.commit_language() {
                tracing::debug!(%language, "language selected");
            }
        }
        KeyCode::Esc => state.language.close(),
        _ => {}
    }
}

fn open_code_editor(state: &mut AppState, terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    match editor::edit_code_with_system_editor(
        state.code.text(),
        state.selected_language(),
        terminal,
    ) {
        Ok(text) => {
            state.code.replace(text);
            state.set_focus(Focus::Code);
        }
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "external editor failed");
            state.notify(NotificationKind::Error, format!("Editor failed: {error:#}"));
        }
    }
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;

    let mut out = stdout();
    execute!(
        out,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(out);
    let terminal = Terminal::new(backend).context("failed to create ratatui terminal")?;

    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .context("failed to leave alternate screen")?;

    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}
