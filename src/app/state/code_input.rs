/// Multi-line code buffer edited in place or replaced from the external editor.
#[derive(Debug, Clone, Default)]
pub struct CodeInputState {
    text: String,
    focused: bool,
    scroll: u16,
}

impl CodeInputState {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn unfocus(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count().max(1)
    }

    pub fn push_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn newline(&mut self) {
        self.text.push('\n');
    }

    pub fn push_str(&mut self, pasted: &str) {
        self.text.push_str(&pasted.replace("\r\n", "\n").replace('\r', "\n"));
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn replace(&mut self, text: String) {
        self.text = text;
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.scroll = 0;
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_down(&mut self) {
        let max = u16::try_from(self.line_count().saturating_sub(1)).unwrap_or(u16::MAX);
        self.scroll = self.scroll.saturating_add(1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Keeps the last line visible in a viewport of `height` rows.
    pub fn follow_tail(&mut self, height: u16) {
        let lines = u16::try_from(self.line_count()).unwrap_or(u16::MAX);
        self.scroll = lines.saturating_sub(height.max(1));
    }
}
