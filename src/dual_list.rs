use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Available,
    Selected,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::Available => Self::Selected,
            Self::Selected => Self::Available,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Available => "Available Elements",
            Self::Selected => "Selected Elements",
        }
    }
}

#[derive(Debug, Clone)]
struct Column<T> {
    items: BTreeSet<T>,
    marked: BTreeSet<T>,
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self {
            items: BTreeSet::new(),
            marked: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DualList<T> {
    available: Column<T>,
    selected: Column<T>,
}

impl<T> Default for DualList<T> {
    fn default() -> Self {
        Self {
            available: Column::default(),
            selected: Column::default(),
        }
    }
}

impl<T: Ord + Clone> DualList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_available<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.add(Side::Available, items);
    }

    pub fn add_selected<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.add(Side::Selected, items);
    }

    pub fn set_available<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.clear_available();
        self.add_available(items);
    }

    pub fn set_selected<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.clear_selected();
        self.add_selected(items);
    }

    pub fn clear_available(&mut self) {
        self.clear(Side::Available);
    }

    pub fn clear_selected(&mut self) {
        self.clear(Side::Selected);
    }

    /// Inserts items into `side`. An item that currently sits on the other
    /// side is taken from there, along with its mark.
    pub fn add<I: IntoIterator<Item = T>>(&mut self, side: Side, items: I) {
        for item in items {
            let other = self.column_mut(side.other());
            other.marked.remove(&item);
            other.items.remove(&item);
            self.column_mut(side).items.insert(item);
        }
    }

    pub fn clear(&mut self, side: Side) {
        let column = self.column_mut(side);
        column.items.clear();
        column.marked.clear();
    }

    pub fn available(&self) -> impl Iterator<Item = &T> {
        self.available.items.iter()
    }

    pub fn selected(&self) -> impl Iterator<Item = &T> {
        self.selected.items.iter()
    }

    pub fn items(&self, side: Side) -> impl Iterator<Item = &T> {
        self.column(side).items.iter()
    }

    pub fn item_at(&self, side: Side, index: usize) -> Option<&T> {
        self.column(side).items.iter().nth(index)
    }

    pub fn len(&self, side: Side) -> usize {
        self.column(side).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.items.is_empty() && self.selected.items.is_empty()
    }

    pub fn contains(&self, side: Side, item: &T) -> bool {
        self.column(side).items.contains(item)
    }

    pub fn side_of(&self, item: &T) -> Option<Side> {
        if self.available.items.contains(item) {
            Some(Side::Available)
        } else if self.selected.items.contains(item) {
            Some(Side::Selected)
        } else {
            None
        }
    }

    pub fn mark(&mut self, side: Side, item: &T) -> bool {
        let column = self.column_mut(side);
        if !column.items.contains(item) {
            return false;
        }
        column.marked.insert(item.clone());
        true
    }

    pub fn unmark(&mut self, side: Side, item: &T) -> bool {
        self.column_mut(side).marked.remove(item)
    }

    pub fn toggle_mark(&mut self, side: Side, item: &T) -> bool {
        if self.unmark(side, item) {
            false
        } else {
            self.mark(side, item)
        }
    }

    pub fn is_marked(&self, side: Side, item: &T) -> bool {
        self.column(side).marked.contains(item)
    }

    pub fn marked(&self, side: Side) -> impl Iterator<Item = &T> {
        self.column(side).marked.iter()
    }

    pub fn clear_marks(&mut self, side: Side) {
        self.column_mut(side).marked.clear();
    }

    pub fn move_to_selected(&mut self) -> usize {
        self.transfer(Side::Available)
    }

    pub fn move_to_available(&mut self) -> usize {
        self.transfer(Side::Selected)
    }

    /// Moves every marked item of `from` to the other side and clears the
    /// marks on `from`. Returns how many items moved.
    pub fn transfer(&mut self, from: Side) -> usize {
        let marked = std::mem::take(&mut self.column_mut(from).marked);
        if marked.is_empty() {
            return 0;
        }

        let source = self.column_mut(from);
        for item in &marked {
            source.items.remove(item);
        }

        let count = marked.len();
        self.column_mut(from.other()).items.extend(marked);
        count
    }

    fn column(&self, side: Side) -> &Column<T> {
        match side {
            Side::Available => &self.available,
            Side::Selected => &self.selected,
        }
    }

    fn column_mut(&mut self, side: Side) -> &mut Column<T> {
        match side {
            Side::Available => &mut self.available,
            Side::Selected => &mut self.selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assert;
    use proptest::prop_assert_eq;
    use std::collections::BTreeSet;

    fn names(list: &DualList<String>, side: Side) -> Vec<&str> {
        list.items(side).map(String::as_str).collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn items_are_kept_sorted_and_unique() {
        let mut list = DualList::new();
        list.add_available(strings(&["Two", "One", "Three"]));
        list.add_available(strings(&["One", "Four"]));

        assert_eq!(
            names(&list, Side::Available),
            vec!["Four", "One", "Three", "Two"]
        );
        assert_eq!(list.len(Side::Selected), 0);
    }

    #[test]
    fn moving_marked_items_transfers_membership() {
        let mut list = DualList::new();
        list.add_available(strings(&["One", "Two", "Three"]));
        assert!(list.mark(Side::Available, &String::from("Two")));
        assert!(list.mark(Side::Available, &String::from("One")));

        assert_eq!(list.move_to_selected(), 2);
        assert_eq!(names(&list, Side::Available), vec!["Three"]);
        assert_eq!(names(&list, Side::Selected), vec!["One", "Two"]);
        assert_eq!(list.marked(Side::Available).count(), 0);
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        let mut list = DualList::new();
        list.add_available(strings(&["One"]));
        list.add_selected(strings(&["Two"]));

        assert_eq!(list.move_to_selected(), 0);
        assert_eq!(list.move_to_available(), 0);
        assert_eq!(names(&list, Side::Available), vec!["One"]);
        assert_eq!(names(&list, Side::Selected), vec!["Two"]);
    }

    #[test]
    fn marking_foreign_item_is_rejected() {
        let mut list = DualList::new();
        list.add_available(strings(&["One"]));
        list.add_selected(strings(&["Two"]));

        assert!(!list.mark(Side::Available, &String::from("Two")));
        assert!(!list.mark(Side::Selected, &String::from("Missing")));
        assert_eq!(list.marked(Side::Available).count(), 0);
    }

    #[test]
    fn toggle_mark_flips_state() {
        let mut list = DualList::new();
        list.add_available(strings(&["One"]));
        let one = String::from("One");

        assert!(list.toggle_mark(Side::Available, &one));
        assert!(list.is_marked(Side::Available, &one));
        assert!(!list.toggle_mark(Side::Available, &one));
        assert!(!list.is_marked(Side::Available, &one));
    }

    #[test]
    fn adding_to_one_side_takes_item_from_the_other() {
        let mut list = DualList::new();
        list.add_selected(strings(&["One", "Two"]));
        list.mark(Side::Selected, &String::from("One"));

        list.add_available(strings(&["One"]));

        assert_eq!(list.side_of(&String::from("One")), Some(Side::Available));
        assert_eq!(names(&list, Side::Selected), vec!["Two"]);
        assert_eq!(list.marked(Side::Selected).count(), 0);
    }

    #[test]
    fn clearing_a_side_drops_its_marks() {
        let mut list = DualList::new();
        list.add_available(strings(&["One", "Two"]));
        list.mark(Side::Available, &String::from("One"));

        list.clear_available();
        list.add_available(strings(&["One"]));

        assert_eq!(list.marked(Side::Available).count(), 0);
        assert_eq!(list.move_to_selected(), 0);
    }

    #[test]
    fn set_replaces_side_contents() {
        let mut list = DualList::new();
        list.add_available(strings(&["One", "Two"]));
        list.set_available(strings(&["Three"]));
        assert_eq!(names(&list, Side::Available), vec!["Three"]);

        list.set_selected(strings(&["Three", "Four"]));
        assert_eq!(names(&list, Side::Available), Vec::<&str>::new());
        assert_eq!(names(&list, Side::Selected), vec!["Four", "Three"]);
    }

    #[test]
    fn item_at_follows_sort_order() {
        let mut list = DualList::new();
        list.add_available([3_u32, 1, 2]);
        assert_eq!(list.item_at(Side::Available, 0), Some(&1));
        assert_eq!(list.item_at(Side::Available, 2), Some(&3));
        assert_eq!(list.item_at(Side::Available, 3), None);
    }

    proptest::proptest! {
        #[test]
        fn move_and_move_back_restores_membership(
            items in proptest::collection::btree_set(0u16..500, 0..40),
            picks in proptest::collection::vec(proptest::bool::ANY, 0..40),
        ) {
            let mut list = DualList::new();
            list.add_available(items.iter().copied());

            let chosen: Vec<u16> = items
                .iter()
                .zip(picks.iter().chain(std::iter::repeat(&false)))
                .filter(|(_, pick)| **pick)
                .map(|(item, _)| *item)
                .collect();
            for item in &chosen {
                list.mark(Side::Available, item);
            }

            let moved = list.move_to_selected();
            prop_assert_eq!(moved, chosen.len());
            for item in &chosen {
                prop_assert!(!list.contains(Side::Available, item));
                prop_assert!(list.contains(Side::Selected, item));
            }

            for item in &chosen {
                list.mark(Side::Selected, item);
            }
            list.move_to_available();

            let restored: BTreeSet<u16> = list.available().copied().collect();
            prop_assert_eq!(restored, items);
            prop_assert_eq!(list.len(Side::Selected), 0);
        }

        #[test]
        fn membership_stays_exclusive_after_random_ops(
            ops in proptest::collection::vec((0u8..7, 0u8..12), 1..200)
        ) {
            let mut list: DualList<u8> = DualList::new();

            for (op, item) in ops {
                match op {
                    0 => list.add_available([item]),
                    1 => list.add_selected([item]),
                    2 => { list.toggle_mark(Side::Available, &item); }
                    3 => { list.toggle_mark(Side::Selected, &item); }
                    4 => { list.move_to_selected(); }
                    5 => { list.move_to_available(); }
                    _ => {
                        if item % 2 == 0 {
                            list.clear_available();
                        } else {
                            list.clear_selected();
                        }
                    }
                }

                for value in list.available() {
                    prop_assert!(!list.contains(Side::Selected, value));
                }
                for side in [Side::Available, Side::Selected] {
                    for value in list.marked(side) {
                        prop_assert!(list.contains(side, value));
                    }
                    let items: Vec<&u8> = list.items(side).collect();
                    prop_assert!(items.windows(2).all(|pair| pair[0] < pair[1]));
                }
            }
        }
    }
}
