//! Code highlighting via `tui-syntax-highlight` + `syntect`.

use crate::{app::state::theme::ThemePreference, domain::Language, ui::theme};
use ratatui::text::{Line, Span};
use syntect::{
    highlighting::ThemeSet,
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};
use tui_syntax_highlight::Highlighter;

const OCEAN_DARK_THEME: &str = "base16-ocean.dark";
const OCEAN_LIGHT_THEME: &str = "base16-ocean.light";

/// Syntax highlighter for the code buffer and fenced blocks in feedback.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_names: Vec<String>,
    active_theme_index: usize,
    highlighter: Highlighter,
    cache: Option<HighlightCache>,
}

struct HighlightCache {
    theme_index: usize,
    language: Language,
    source: String,
    lines: Vec<Line<'static>>,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Initializes default syntect syntax/theme assets.
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        let mut theme_names: Vec<String> = theme_set.themes.keys().cloned().collect();
        theme_names.sort();

        let active_theme_index = theme_index(&theme_names, OCEAN_LIGHT_THEME).unwrap_or(0);
        let highlighter = build_highlighter(&theme_set, &theme_names, active_theme_index);

        Self {
            syntax_set,
            theme_set,
            theme_names,
            active_theme_index,
            highlighter,
            cache: None,
        }
    }

    /// Highlights a fenced code block using a best-effort language lookup.
    pub fn highlight(&self, lang: &str, source: &str) -> Vec<Line<'static>> {
        let syntax = resolve_syntax(&self.syntax_set, lang);
        self.highlight_with_syntax(source, syntax)
    }

    /// Highlights the code buffer, reusing the previous result while nothing changed.
    pub fn highlight_code(&mut self, language: Language, source: &str) -> &[Line<'static>] {
        let stale = !self.cache.as_ref().is_some_and(|cache| {
            cache.theme_index == self.active_theme_index
                && cache.language == language
                && cache.source == source
        });

        if stale {
            let syntax = self
                .syntax_set
                .find_syntax_by_extension(language.extension())
                .unwrap_or_else(|| resolve_syntax(&self.syntax_set, language.as_api_str()));
            let lines = self.highlight_with_syntax(source, syntax);
            self.cache = Some(HighlightCache {
                theme_index: self.active_theme_index,
                language,
                source: source.to_owned(),
                lines,
            });
        }

        self.cache
            .as_ref()
            .map(|cache| cache.lines.as_slice())
            .unwrap_or_default()
    }

    pub fn set_theme(&mut self, name: &str) -> bool {
        let Some(index) = theme_index(&self.theme_names, name) else {
            return false;
        };

        if index != self.active_theme_index {
            self.active_theme_index = index;
            self.highlighter =
                build_highlighter(&self.theme_set, &self.theme_names, self.active_theme_index);
        }
        true
    }

    #[cfg(test)]
    fn current_theme_name(&self) -> &str {
        self.theme_names
            .get(self.active_theme_index)
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    pub fn set_ocean_theme(&mut self, preference: ThemePreference) -> bool {
        let name = match preference {
            ThemePreference::Dark => OCEAN_DARK_THEME,
            ThemePreference::Light => OCEAN_LIGHT_THEME,
        };
        self.set_theme(name)
    }

    fn highlight_with_syntax(&self, source: &str, syntax: &SyntaxReference) -> Vec<Line<'static>> {
        match self.highlighter.highlight_lines(
            LinesWithEndings::from(source),
            syntax,
            &self.syntax_set,
        ) {
            Ok(text) => text.lines,
            Err(error) => {
                tracing::debug!(%error, "syntax highlighting failed; rendering plain text");
                plain_code_lines(source)
            }
        }
    }
}

fn theme_index(theme_names: &[String], name: &str) -> Option<usize> {
    theme_names
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(name))
}

fn build_highlighter(
    theme_set: &ThemeSet,
    theme_names: &[String],
    active_theme_index: usize,
) -> Highlighter {
    let theme = theme_names
        .get(active_theme_index)
        .and_then(|name| theme_set.themes.get(name))
        .cloned()
        .unwrap_or_default();
    Highlighter::new(theme).line_numbers(false)
}

fn resolve_syntax<'a>(syntax_set: &'a SyntaxSet, lang: &str) -> &'a SyntaxReference {
    let normalized = normalize_lang(lang);
    syntax_set
        .find_syntax_by_token(&normalized)
        .or_else(|| syntax_set.find_syntax_by_name(&normalized))
        .unwrap_or_else(|| syntax_set.find_syntax_plain_text())
}

fn normalize_lang(lang: &str) -> String {
    match lang.trim().to_lowercase().as_str() {
        "js" => "javascript".to_owned(),
        "py" => "python".to_owned(),
        "c++" => "cpp".to_owned(),
        value => value.to_owned(),
    }
}

fn plain_code_lines(source: &str) -> Vec<Line<'static>> {
    source
        .lines()
        .map(|line| Line::from(vec![Span::styled(line.to_owned(), theme::text())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::SyntaxHighlighter;
    use crate::app::state::theme::ThemePreference;
    use crate::domain::Language;

    #[test]
    fn sets_ocean_theme_for_preference() {
        let mut highlighter = SyntaxHighlighter::new();
        assert!(highlighter.set_ocean_theme(ThemePreference::Dark));
        assert_eq!(highlighter.current_theme_name(), "base16-ocean.dark");
        assert!(highlighter.set_ocean_theme(ThemePreference::Light));
        assert_eq!(highlighter.current_theme_name(), "base16-ocean.light");
    }

    #[test]
    fn highlights_every_language() {
        let mut highlighter = SyntaxHighlighter::new();
        for language in Language::ALL {
            let lines = highlighter.highlight_code(language, "a = 1\nb = 2\n");
            let rendered: Vec<String> = lines.iter().map(ToString::to_string).collect();
            assert!(
                rendered.iter().any(|line| line.contains("b = 2")),
                "{language}: {rendered:?}"
            );
        }
    }

    #[test]
    fn highlight_cache_tracks_theme_changes() {
        let mut highlighter = SyntaxHighlighter::new();
        let light = highlighter
            .highlight_code(Language::Python, "x = 1\n")
            .to_vec();
        highlighter.set_ocean_theme(ThemePreference::Dark);
        let dark = highlighter
            .highlight_code(Language::Python, "x = 1\n")
            .to_vec();
        assert_ne!(light, dark);
    }
}
