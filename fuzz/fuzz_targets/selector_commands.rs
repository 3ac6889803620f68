#![no_main]

use duotune::dual_list::Side;
use duotune::selector::SelectorState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut state = SelectorState::new();
    let len = (data.len() % 16).max(1);
    state.add_items(Side::Available, (0..len).map(|idx| format!("item_{idx}")));

    for byte in data {
        match byte % 8 {
            0 => state.switch_focus(),
            1 => state.select_next(),
            2 => state.select_prev(),
            3 => state.toggle_mark_under_cursor(),
            4 => {
                state.move_to_selected();
            }
            5 => {
                state.move_to_available();
            }
            6 => state.add_items(Side::Selected, [format!("item_{}", byte % 20)]),
            _ => state.clear(state.focus),
        }

        for side in [Side::Available, Side::Selected] {
            let len = state.list.len(side);
            assert!(len == 0 || state.cursor(side) < len);
            for item in state.list.items(side) {
                assert!(!state.list.contains(side.other(), item));
            }
        }
    }
});
