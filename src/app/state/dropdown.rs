//! Open/closed and focus state for a single-select dropdown control.

use ratatui::layout::{Position, Rect};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct DropdownState {
    pub open: bool,
    pub focused: bool,
}

/// Result of a pointer press routed to the dropdown.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PointerOutcome {
    Opened,
    Selected(usize),
    /// Press landed inside the interactive region without changing anything.
    Inside,
    Closed,
    Ignored,
}

/// Dropdown over a fixed option list.
///
/// Screen regions are recorded by the renderer each frame; outside-press
/// detection uses the union of the control and the rendered option list.
#[derive(Debug, Clone)]
pub struct Dropdown<T> {
    options: Vec<T>,
    selected: usize,
    highlighted: usize,
    state: DropdownState,
    control_area: Rect,
    list_area: Option<Rect>,
}

impl<T: Copy + PartialEq> Dropdown<T> {
    pub fn new(options: impl Into<Vec<T>>, initial: T) -> Self {
        let options = options.into();
        let selected = options
            .iter()
            .position(|option| *option == initial)
            .unwrap_or(0);
        Self {
            options,
            selected,
            highlighted: selected,
            state: DropdownState::default(),
            control_area: Rect::default(),
            list_area: None,
        }
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn selected(&self) -> Option<T> {
        self.options.get(self.selected).copied()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    pub fn is_focused(&self) -> bool {
        self.state.focused
    }

    pub fn focus(&mut self) {
        self.state.focused = true;
    }

    /// Focus left the control.
    pub fn blur(&mut self) {
        self.state.focused = false;
        self.state.open = false;
        self.list_area = None;
    }

    pub fn set_regions(&mut self, control: Rect, list: Option<Rect>) {
        self.control_area = control;
        self.list_area = list;
    }

    pub fn list_area(&self) -> Option<Rect> {
        self.list_area
    }

    /// Whether `position` lies on the control or its rendered option list.
    pub fn contains(&self, position: Position) -> bool {
        self.control_area.contains(position)
            || self.list_area.is_some_and(|area| area.contains(position))
    }

    /// Handles a pointer press anywhere on screen.
    pub fn pointer_down(&mut self, column: u16, row: u16) -> PointerOutcome {
        let position = Position::new(column, row);

        if !self.contains(position) {
            if self.state.open {
                self.close();
                return PointerOutcome::Closed;
            }
            return PointerOutcome::Ignored;
        }

        if self.control_area.contains(position) {
            self.state.focused = true;
            if self.state.open {
                return PointerOutcome::Inside;
            }
            self.open();
            return PointerOutcome::Opened;
        }

        if self.state.open
            && let Some(list) = self.list_area
            && list.contains(position)
        {
            let offset = usize::from(row.saturating_sub(list.y.saturating_add(1)));
            let within_rows = row > list.y && offset < self.options.len();
            if within_rows {
                self.highlighted = offset;
                self.commit();
                return PointerOutcome::Selected(offset);
            }
            return PointerOutcome::Inside;
        }

        PointerOutcome::Ignored
    }

    pub fn toggle_open(&mut self) {
        if self.state.open {
            self.close();
        } else {
            self.state.focused = true;
            self.open();
        }
    }

    pub fn highlight_next(&mut self) {
        if !self.options.is_empty() {
            self.highlighted = (self.highlighted + 1) % self.options.len();
        }
    }

    pub fn highlight_prev(&mut self) {
        if !self.options.is_empty() {
            self.highlighted = self
                .highlighted
                .checked_sub(1)
                .unwrap_or(self.options.len() - 1);
        }
    }

    /// Commits the highlighted option, closes the list, and releases focus.
    pub fn commit(&mut self) -> Option<T> {
        if self.highlighted < self.options.len() {
            self.selected = self.highlighted;
        }
        self.state.open = false;
        self.state.focused = false;
        self.list_area = None;
        self.selected()
    }

    /// Closes the list without changing the selection.
    pub fn close(&mut self) {
        self.state.open = false;
        self.highlighted = self.selected;
        self.list_area = None;
    }

    fn open(&mut self) {
        self.state.open = true;
        self.highlighted = self.selected;
    }
}
