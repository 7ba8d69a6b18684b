use std::fmt;
use std::ops::Range;

use crossterm::event::{KeyCode, KeyEvent};

/// One single-character position in the code field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub value: Option<char>,
}

/// Fill phase of the field. Filled slots always form a contiguous prefix,
/// so the phase is fully determined by the filled count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Partial,
    Full,
}

/// Focus-and-input state of a segmented code-entry field.
///
/// Owns the logical slot sequence and decides which slot receives the next
/// keystroke. It never renders anything itself; the widget reads this state
/// and the host places the terminal cursor from it.
pub struct CodeFieldState {
    blocks: usize,
    elements_in_block: usize,
    slots: Vec<Slot>,
    focused: Option<usize>,
    on_complete: Option<Box<dyn FnMut(&str)>>,
}

impl CodeFieldState {
    /// Creates a field with `blocks * elements_in_block` empty slots.
    ///
    /// Panics if either count is zero - an invalid setup, not a runtime
    /// condition.
    pub fn new(blocks: usize, elements_in_block: usize) -> Self {
        assert!(
            blocks > 0 && elements_in_block > 0,
            "code field: blocks and elements count must be more than 0"
        );
        let n = blocks * elements_in_block;
        Self {
            blocks,
            elements_in_block,
            slots: (0..n).map(|index| Slot { index, value: None }).collect(),
            focused: None,
            on_complete: None,
        }
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn elements_in_block(&self) -> usize {
        self.elements_in_block
    }

    /// Total slot count.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Count of filled slots, i.e. the length of the filled prefix.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn phase(&self) -> Phase {
        match self.filled() {
            0 => Phase::Empty,
            k if k == self.slots.len() => Phase::Full,
            _ => Phase::Partial,
        }
    }

    /// The entered code: filled slot values concatenated in index order.
    pub fn code(&self) -> String {
        self.slots.iter().filter_map(|s| s.value).collect()
    }

    /// Distributes `code` into the slots in order. Characters beyond the slot
    /// count are dropped; slots past the end of `code` keep their value.
    pub fn set_code(&mut self, code: &str) {
        for (slot, ch) in self.slots.iter_mut().zip(code.chars()) {
            slot.value = Some(ch);
        }
    }

    /// Registers the callback fired when the last slot gets filled.
    pub fn set_on_complete(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Empties every slot and puts focus back on the first one.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.value = None;
        }
        self.focused = Some(0);
    }

    /// Stores a digit typed into `slot_index` and advances focus.
    ///
    /// Out-of-range indices and non-digit characters are ignored. When the
    /// entry fills the last open slot, focus leaves the field and the
    /// completion callback fires once with the assembled code.
    pub fn handle_char_entered(&mut self, slot_index: usize, ch: char) {
        if slot_index >= self.slots.len() || !ch.is_ascii_digit() {
            return;
        }
        self.slots[slot_index].value = Some(ch);
        let k = self.filled();
        if k < self.slots.len() && k > 0 {
            self.focused = Some(k);
        } else if k == self.slots.len() {
            self.focused = None;
            let code = self.code();
            if let Some(callback) = self.on_complete.as_mut() {
                callback(&code);
            }
        }
    }

    /// Clears the last non-empty slot and focuses where the next digit would
    /// land. One slot per call; a no-op on an all-empty field.
    pub fn handle_delete_backward(&mut self) {
        let Some(last) = self.slots.iter().rposition(|s| s.value.is_some()) else {
            return;
        };
        self.slots[last].value = None;
        // filled() equals `last` here, but clamp anyway so a non-contiguous
        // fill (set_code shorter than an earlier entry) cannot index past the
        // end.
        let next = self.filled().min(self.slots.len() - 1);
        self.focused = Some(next);
    }

    /// Redirects any focus request to the slot the policy allows: the last
    /// slot when full, the first when empty, otherwise the first open one.
    /// The requester cannot skip ahead of the filled prefix.
    pub fn handle_focus_gained(&mut self, _slot_index: usize) {
        let k = self.filled();
        let target = if k == self.slots.len() { k - 1 } else { k };
        self.focused = Some(target);
    }

    /// Routes a key press into the field. Digits land in the focused slot
    /// after passing the input filter; everything else the field does not
    /// understand is left to the host.
    pub fn handle_key(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Char(c) => {
                if let Some(idx) = self.focused {
                    let existing: String = self.slots[idx].value.iter().collect();
                    if accepts_replacement(&existing, 0..existing.len(), &c.to_string()) {
                        self.handle_char_entered(idx, c);
                    }
                }
            }
            KeyCode::Backspace => self.handle_delete_backward(),
            _ => {}
        }
    }
}

impl fmt::Debug for CodeFieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeFieldState")
            .field("blocks", &self.blocks)
            .field("elements_in_block", &self.elements_in_block)
            .field("code", &self.code())
            .field("focused", &self.focused)
            .finish()
    }
}

/// Input filter consulted before a keystroke replaces a slot's text: the
/// resulting text may hold at most one character. Multi-character
/// replacements (paste) pass through unchecked.
// TODO: distribute pasted text across the slots instead of passing it through.
pub fn accepts_replacement(existing: &str, range: Range<usize>, replacement: &str) -> bool {
    if replacement.chars().count() > 1 {
        return true;
    }
    let mut result = existing.to_string();
    result.replace_range(range, replacement);
    result.chars().count() <= 1
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_code(state: &mut CodeFieldState, code: &str) {
        state.handle_focus_gained(0);
        for ch in code.chars() {
            let idx = state.focused().expect("field lost focus mid-entry");
            state.handle_char_entered(idx, ch);
        }
    }

    #[test]
    fn construction_yields_empty_slots() {
        let state = CodeFieldState::new(2, 3);
        assert_eq!(state.blocks(), 2);
        assert_eq!(state.elements_in_block(), 3);
        assert_eq!(state.len(), 6);
        assert!(state.is_empty());
        assert_eq!(state.code(), "");
        assert_eq!(state.phase(), Phase::Empty);
        assert_eq!(state.focused(), None);
    }

    #[test]
    #[should_panic(expected = "more than 0")]
    fn zero_blocks_is_fatal() {
        let _ = CodeFieldState::new(0, 4);
    }

    #[test]
    fn typing_advances_focus_through_the_prefix() {
        let mut state = CodeFieldState::new(1, 4);
        state.handle_focus_gained(0);
        for (i, ch) in "123".chars().enumerate() {
            state.handle_char_entered(i, ch);
            assert_eq!(state.code(), "123"[..=i].to_string());
            assert_eq!(state.focused(), Some(i + 1));
        }
        assert_eq!(state.phase(), Phase::Partial);
    }

    #[test]
    fn completing_the_field_fires_callback_once_and_drops_focus() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut state = CodeFieldState::new(2, 3);
        state.set_on_complete(move |code| sink.borrow_mut().push(code.to_string()));
        type_code(&mut state, "483921");

        assert_eq!(*seen.borrow(), vec!["483921".to_string()]);
        assert_eq!(state.focused(), None);
        assert_eq!(state.phase(), Phase::Full);
    }

    #[test]
    fn refill_after_deletion_fires_callback_again() {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);

        let mut state = CodeFieldState::new(1, 3);
        state.set_on_complete(move |_| *sink.borrow_mut() += 1);
        type_code(&mut state, "123");
        state.handle_delete_backward();
        state.handle_char_entered(2, '9');

        assert_eq!(*count.borrow(), 2);
        assert_eq!(state.code(), "129");
    }

    #[test]
    fn non_digit_entry_is_ignored() {
        let mut state = CodeFieldState::new(1, 4);
        state.handle_focus_gained(0);
        state.handle_char_entered(0, 'x');
        assert_eq!(state.code(), "");
        assert_eq!(state.focused(), Some(0));
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let mut state = CodeFieldState::new(1, 4);
        state.handle_char_entered(17, '5');
        assert_eq!(state.code(), "");
    }

    #[test]
    fn delete_from_full_field_refocuses_last_slot() {
        let mut state = CodeFieldState::new(1, 4);
        type_code(&mut state, "1234");
        assert_eq!(state.focused(), None);

        state.handle_delete_backward();
        assert_eq!(state.code(), "123");
        assert_eq!(state.focused(), Some(3));
    }

    #[test]
    fn delete_on_empty_field_is_a_noop() {
        let mut state = CodeFieldState::new(2, 2);
        state.handle_delete_backward();
        assert_eq!(state.code(), "");
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn partial_entry_then_deletes_returns_to_empty() {
        let mut state = CodeFieldState::new(1, 4);
        type_code(&mut state, "12");
        state.handle_delete_backward();
        state.handle_delete_backward();
        assert_eq!(state.code(), "");
        assert_eq!(state.focused(), Some(0));
    }

    #[test]
    fn focus_requests_are_redirected_to_the_open_slot() {
        let mut state = CodeFieldState::new(2, 3);
        state.handle_focus_gained(4);
        assert_eq!(state.focused(), Some(0));

        type_code(&mut state, "12");
        state.handle_focus_gained(5);
        assert_eq!(state.focused(), Some(2));

        type_code(&mut state, "3456");
        state.handle_focus_gained(0);
        assert_eq!(state.focused(), Some(5));
    }

    #[test]
    fn set_code_distributes_and_truncates() {
        let mut state = CodeFieldState::new(1, 3);
        state.set_code("123");
        assert_eq!(state.code(), "123");

        let mut state = CodeFieldState::new(1, 3);
        state.set_code("123456");
        assert_eq!(state.code(), "123");

        let mut state = CodeFieldState::new(2, 3);
        state.set_code("987654");
        state.set_code("12");
        assert_eq!(state.code(), "127654");
    }

    #[test]
    fn clear_resets_slots_and_focus() {
        let mut state = CodeFieldState::new(1, 4);
        type_code(&mut state, "1234");
        state.clear();
        assert_eq!(state.code(), "");
        assert_eq!(state.focused(), Some(0));
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn key_events_route_through_the_filter() {
        let mut state = CodeFieldState::new(1, 4);
        state.handle_focus_gained(0);
        state.handle_key(key(KeyCode::Char('7')));
        state.handle_key(key(KeyCode::Char('q')));
        state.handle_key(key(KeyCode::Char('8')));
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.code(), "7");
        assert_eq!(state.focused(), Some(1));
    }

    #[test]
    fn replacement_filter_limits_length_to_one() {
        assert!(accepts_replacement("", 0..0, "5"));
        assert!(!accepts_replacement("5", 1..1, "6"));
        assert!(accepts_replacement("5", 0..1, "6"));
        assert!(accepts_replacement("5", 0..1, ""));
        // Pasted text is passed through, not yet distributed.
        assert!(accepts_replacement("5", 1..1, "483921"));
    }
}
