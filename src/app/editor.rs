//! External editor integration for composing the code under review.

use crate::domain::Language;
use anyhow::{Context, Result, anyhow};
use crossterm::cursor::MoveTo;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::env;
use std::fs;
use std::io::{Stdout, stdout};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opens an external editor on the code buffer and returns the edited contents.
///
/// Editor priority:
/// 1) `$VISUAL`
/// 2) `$EDITOR`
/// 3) `nvim`
/// 4) `vim`
/// 5) `vi`
pub fn edit_code_with_system_editor(
    initial_text: &str,
    language: Language,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<String> {
    let path = temp_file_path(language);
    fs::write(&path, initial_text)
        .with_context(|| format!("failed to write {}", path.display()))?;

    suspend_tui()?;
    let edit_result = run_editor(&path);
    let resume_result = resume_tui(terminal);

    let output = edit_result.and_then(|()| {
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    });

    let _ = fs::remove_file(&path);

    if let Err(err) = resume_result {
        return Err(err.context("failed to restore TUI after editor"));
    }

    output
}

/// Opens a file path in the user's preferred editor.
pub fn edit_file_with_system_editor(path: &Path) -> Result<()> {
    run_editor(path)
}

fn editor_candidates() -> Vec<String> {
    let mut candidates = Vec::new();

    for variable in ["VISUAL", "EDITOR"] {
        if let Some(value) = env::var_os(variable) {
            let value = value.to_string_lossy().trim().to_owned();
            if !value.is_empty() {
                candidates.push(value);
            }
        }
    }

    candidates.extend(["nvim".to_owned(), "vim".to_owned(), "vi".to_owned()]);
    candidates
}

fn run_editor(path: &Path) -> Result<()> {
    for command in editor_candidates() {
        let Some(parts) = shlex::split(&command) else {
            tracing::warn!(%command, "skipping editor command with unbalanced quotes");
            continue;
        };
        let Some((program, args)) = parts.split_first() else {
            continue;
        };

        match Command::new(program).args(args).arg(path).status() {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => {
                return Err(anyhow!(
                    "editor `{}` exited with status {}",
                    command,
                    status
                        .code()
                        .map_or_else(|| "unknown".to_owned(), |code| code.to_string())
                ));
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(anyhow!("failed to launch editor `{}`: {}", command, err));
            }
        }
    }

    Err(anyhow!(
        "no editor found (tried $VISUAL, $EDITOR, nvim, vim, vi)"
    ))
}

fn temp_file_path(language: Language) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0);

    env::temp_dir().join(format!(
        "review-assistant-{}-{}.{}",
        std::process::id(),
        millis,
        language.extension()
    ))
}

fn suspend_tui() -> Result<()> {
    execute!(
        stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .context("failed to release terminal for external editor")?;
    disable_raw_mode().context("failed to disable raw mode")?;
    Ok(())
}

fn resume_tui(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    execute!(
        stdout(),
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste,
        Clear(ClearType::All),
        MoveTo(0, 0)
    )
    .context("failed to restore terminal view")?;
    enable_raw_mode().context("failed to enable raw mode")?;
    terminal
        .clear()
        .context("failed to clear terminal buffer")?;
    Ok(())
}
