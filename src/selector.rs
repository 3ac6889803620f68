use crate::dual_list::{DualList, Side};
use crate::model::SelectorSnapshot;

#[derive(Debug, Clone)]
pub struct SelectorState {
    pub list: DualList<String>,
    pub focus: Side,
    cursor_available: usize,
    cursor_selected: usize,
    pub dirty: bool,
    pub status: String,
}

impl Default for SelectorState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorState {
    pub fn new() -> Self {
        Self {
            list: DualList::new(),
            focus: Side::Available,
            cursor_available: 0,
            cursor_selected: 0,
            dirty: true,
            status: String::from("Ready"),
        }
    }

    pub fn from_snapshot(snapshot: &SelectorSnapshot) -> Self {
        let mut state = Self::new();
        state.list.add_available(snapshot.available.iter().cloned());
        state.list.add_selected(snapshot.selected.iter().cloned());
        state
    }

    pub fn snapshot(&self) -> SelectorSnapshot {
        SelectorSnapshot {
            available: self.list.available().cloned().collect(),
            selected: self.list.selected().cloned().collect(),
        }
    }

    pub fn cursor(&self, side: Side) -> usize {
        match side {
            Side::Available => self.cursor_available,
            Side::Selected => self.cursor_selected,
        }
    }

    pub fn item_under_cursor(&self, side: Side) -> Option<&String> {
        self.list.item_at(side, self.cursor(side))
    }

    pub fn switch_focus(&mut self) {
        self.focus = self.focus.other();
        self.dirty = true;
    }

    pub fn focus_on(&mut self, side: Side) {
        self.focus = side;
        self.dirty = true;
    }

    pub fn select_next(&mut self) {
        let len = self.list.len(self.focus);
        if len == 0 {
            return;
        }
        let cursor = self.cursor_mut(self.focus);
        *cursor = (*cursor + 1).min(len - 1);
        self.dirty = true;
    }

    pub fn select_prev(&mut self) {
        let cursor = self.cursor_mut(self.focus);
        *cursor = cursor.saturating_sub(1);
        self.dirty = true;
    }

    pub fn toggle_mark_under_cursor(&mut self) {
        let side = self.focus;
        let Some(item) = self.item_under_cursor(side).cloned() else {
            self.set_status("Nothing to mark");
            return;
        };
        self.list.toggle_mark(side, &item);
        self.dirty = true;
    }

    /// `>>`: moves the marked available items, or the highlighted one when
    /// nothing is marked.
    pub fn move_to_selected(&mut self) -> usize {
        self.move_from(Side::Available)
    }

    pub fn move_to_available(&mut self) -> usize {
        self.move_from(Side::Selected)
    }

    pub fn add_items<I: IntoIterator<Item = String>>(&mut self, side: Side, items: I) {
        self.list.add(side, items);
        self.clamp_cursors();
        self.dirty = true;
    }

    pub fn clear(&mut self, side: Side) {
        self.list.clear(side);
        self.clamp_cursors();
        self.set_status(&format!("Cleared {}", side.title().to_ascii_lowercase()));
    }

    fn move_from(&mut self, from: Side) -> usize {
        if self.list.marked(from).next().is_none()
            && let Some(item) = self.item_under_cursor(from).cloned()
        {
            self.list.mark(from, &item);
        }

        let moved = self.list.transfer(from);
        self.clamp_cursors();
        if moved == 0 {
            self.set_status("Nothing selected");
        } else {
            self.set_status(&format!(
                "Moved {moved} item(s) to {}",
                from.other().title().to_ascii_lowercase()
            ));
        }
        moved
    }

    fn clamp_cursors(&mut self) {
        for side in [Side::Available, Side::Selected] {
            let len = self.list.len(side);
            let cursor = self.cursor_mut(side);
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
    }

    fn cursor_mut(&mut self, side: Side) -> &mut usize {
        match side {
            Side::Available => &mut self.cursor_available,
            Side::Selected => &mut self.cursor_selected,
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assert;

    fn numbered() -> SelectorState {
        let mut state = SelectorState::new();
        state.add_items(
            Side::Available,
            ["One", "Two", "Three", "Four"].map(String::from),
        );
        state
    }

    #[test]
    fn highlighted_item_moves_when_nothing_is_marked() {
        let mut state = numbered();
        state.select_next();
        assert_eq!(state.item_under_cursor(Side::Available).map(String::as_str), Some("One"));

        assert_eq!(state.move_to_selected(), 1);
        assert!(state.list.contains(Side::Selected, &String::from("One")));
        assert_eq!(state.status, "Moved 1 item(s) to selected elements");
    }

    #[test]
    fn marked_items_take_precedence_over_cursor() {
        let mut state = numbered();
        state.toggle_mark_under_cursor();
        state.select_next();
        state.select_next();
        state.toggle_mark_under_cursor();

        assert_eq!(state.move_to_selected(), 2);
        let selected: Vec<&str> = state.list.selected().map(String::as_str).collect();
        assert_eq!(selected, vec!["Four", "Three"]);
    }

    #[test]
    fn cursor_is_clamped_after_moving_last_row() {
        let mut state = numbered();
        for _ in 0..10 {
            state.select_next();
        }
        assert_eq!(state.cursor(Side::Available), 3);

        state.move_to_selected();
        assert_eq!(state.cursor(Side::Available), 2);
    }

    #[test]
    fn moving_from_empty_side_reports_nothing_selected() {
        let mut state = SelectorState::new();
        assert_eq!(state.move_to_available(), 0);
        assert_eq!(state.status, "Nothing selected");
    }

    #[test]
    fn snapshot_restores_both_sides() {
        let mut state = numbered();
        state.move_to_selected();
        let restored = SelectorState::from_snapshot(&state.snapshot());

        assert_eq!(restored.list.len(Side::Available), 3);
        assert_eq!(restored.list.len(Side::Selected), 1);
    }

    proptest::proptest! {
        #[test]
        fn cursors_stay_in_bounds(ops in proptest::collection::vec(0u8..8, 1..200)) {
            let mut state = numbered();

            for op in ops {
                match op {
                    0 => state.select_next(),
                    1 => state.select_prev(),
                    2 => state.switch_focus(),
                    3 => state.toggle_mark_under_cursor(),
                    4 => { state.move_to_selected(); }
                    5 => { state.move_to_available(); }
                    6 => state.clear(Side::Selected),
                    _ => state.add_items(Side::Available, [String::from("Five")]),
                }

                for side in [Side::Available, Side::Selected] {
                    let len = state.list.len(side);
                    prop_assert!(state.cursor(side) < len.max(1));
                }
            }
        }
    }
}
