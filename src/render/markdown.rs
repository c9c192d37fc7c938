//! Markdown rendering for review points.

use crate::app::state::theme::ThemePreference;
use crate::domain::{Language, ReviewPoint};
use crate::render::syntax::SyntaxHighlighter;
use crate::ui::theme;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

#[derive(Debug, Clone)]
struct CodeBlockState {
    language: String,
    content: String,
}

/// Markdown renderer with syntect-based fenced code highlighting.
#[derive(Default)]
pub struct MarkdownRenderer {
    syntax: SyntaxHighlighter,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            syntax: SyntaxHighlighter::new(),
        }
    }

    /// Keeps the syntect theme in step with the light/dark preference.
    pub fn sync_theme(&mut self, preference: ThemePreference) {
        self.syntax.set_ocean_theme(preference);
    }

    pub fn highlight_code(&mut self, language: Language, source: &str) -> &[Line<'static>] {
        self.syntax.highlight_code(language, source)
    }

    /// Renders one review point as `N. text`, with continuation lines indented under the text.
    pub fn render_point(&mut self, point: &ReviewPoint) -> Vec<Line<'static>> {
        let marker = format!("{}. ", point.index);
        let indent = " ".repeat(marker.chars().count());
        let body = self.render(&point.text);

        body.into_iter()
            .enumerate()
            .map(|(row, line)| {
                let prefix = if row == 0 {
                    Span::styled(marker.clone(), theme::point_index())
                } else {
                    Span::raw(indent.clone())
                };
                let mut spans = vec![prefix];
                spans.extend(line.spans);
                Line::from(spans)
            })
            .collect()
    }

    /// Renders markdown into styled ratatui lines.
    pub fn render(&mut self, text: &str) -> Vec<Line<'static>> {
        let parser = Parser::new_ext(text, Options::all());

        let mut lines: Vec<Vec<Span<'static>>> = vec![Vec::new()];
        let mut style_stack: Vec<Style> = vec![theme::text()];
        let mut in_code_block: Option<CodeBlockState> = None;

        for event in parser {
            if let Some(code) = in_code_block.as_mut() {
                match event {
                    Event::Text(content) | Event::Code(content) => code.content.push_str(&content),
                    Event::SoftBreak | Event::HardBreak => code.content.push('\n'),
                    Event::End(TagEnd::CodeBlock) => {
                        let highlighted = self.syntax.highlight(&code.language, &code.content);
                        for mut line in highlighted {
                            let mut prefixed = vec![Span::styled("  ", theme::dim())];
                            prefixed.append(&mut line.spans);
                            lines.push(prefixed);
                        }
                        lines.push(Vec::new());
                        in_code_block = None;
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(tag) => match tag {
                    Tag::Strong | Tag::Heading { .. } => {
                        let base = *style_stack.last().unwrap_or(&Style::default());
                        style_stack.push(base.add_modifier(Modifier::BOLD));
                    }
                    Tag::Emphasis => {
                        let base = *style_stack.last().unwrap_or(&Style::default());
                        style_stack.push(base.add_modifier(Modifier::ITALIC));
                    }
                    Tag::Strikethrough => {
                        let base = *style_stack.last().unwrap_or(&Style::default());
                        style_stack.push(base.add_modifier(Modifier::CROSSED_OUT));
                    }
                    Tag::Item => {
                        push_nonempty_newline(&mut lines);
                        push_span(&mut lines, Span::styled("- ", theme::dim()));
                    }
                    Tag::CodeBlock(kind) => {
                        push_nonempty_newline(&mut lines);
                        let language = match kind {
                            CodeBlockKind::Fenced(lang) => lang.to_string(),
                            CodeBlockKind::Indented => "text".to_owned(),
                        };
                        in_code_block = Some(CodeBlockState {
                            language,
                            content: String::new(),
                        });
                    }
                    Tag::Link { .. } => {
                        let base = *style_stack.last().unwrap_or(&Style::default());
                        style_stack.push(
                            base.add_modifier(Modifier::UNDERLINED)
                                .fg(theme::link_color()),
                        );
                    }
                    _ => {}
                },
                Event::End(tag_end) => match tag_end {
                    TagEnd::Paragraph => {
                        push_nonempty_newline(&mut lines);
                    }
                    TagEnd::Heading(_) => {
                        pop_style_if_possible(&mut style_stack);
                        push_nonempty_newline(&mut lines);
                    }
                    TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough | TagEnd::Link => {
                        pop_style_if_possible(&mut style_stack);
                    }
                    TagEnd::Item | TagEnd::List(_) => {
                        push_nonempty_newline(&mut lines);
                    }
                    _ => {}
                },
                Event::Text(content) => {
                    let style = *style_stack.last().unwrap_or(&Style::default());
                    push_span(&mut lines, Span::styled(content.to_string(), style));
                }
                Event::Code(content) => {
                    push_span(
                        &mut lines,
                        Span::styled(format!("`{content}`"), theme::inline_code()),
                    );
                }
                Event::SoftBreak | Event::HardBreak => {
                    push_nonempty_newline(&mut lines);
                }
                _ => {}
            }
        }

        while lines.last().is_some_and(|line| line.is_empty()) && lines.len() > 1 {
            lines.pop();
        }

        lines.into_iter().map(Line::from).collect()
    }
}

fn push_span(lines: &mut Vec<Vec<Span<'static>>>, span: Span<'static>) {
    if let Some(line) = lines.last_mut() {
        line.push(span);
    }
}

fn push_nonempty_newline(lines: &mut Vec<Vec<Span<'static>>>) {
    if lines.last().is_some_and(|line| line.is_empty()) {
        return;
    }
    lines.push(Vec::new());
}

fn pop_style_if_possible(style_stack: &mut Vec<Style>) {
    if style_stack.len() > 1 {
        style_stack.pop();
    }
}
