use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, StatefulWidgetRef, Widget};

use crate::field::state::CodeFieldState;

/// Gap between neighbouring slots of one block, in cells.
const ELEMENT_GAP: u16 = 1;
/// Gap between blocks, in cells.
const BLOCK_GAP: u16 = 3;

/// Renders a [`CodeFieldState`] as one row of digit cells grouped into
/// blocks, with an underline per slot. The focused slot's underline is
/// highlighted; the host places the terminal cursor via
/// [`CodeField::cursor_offset`].
#[derive(Clone, Copy, Default)]
pub struct CodeField;

impl CodeField {
    /// Rendered height: the digit row plus the underline row.
    pub const HEIGHT: u16 = 2;

    /// Column of slot `index` relative to the widget origin.
    fn slot_x(state: &CodeFieldState, index: usize) -> u16 {
        let epb = state.elements_in_block();
        let block = (index / epb) as u16;
        let element = (index % epb) as u16;
        let block_width = epb as u16 + (epb as u16 - 1) * ELEMENT_GAP;
        block * (block_width + BLOCK_GAP) + element * (1 + ELEMENT_GAP)
    }

    /// Total rendered width of the field.
    pub fn width(state: &CodeFieldState) -> u16 {
        Self::slot_x(state, state.len() - 1) + 1
    }

    /// Offset of the focused slot relative to the widget origin, for
    /// terminal cursor placement. `None` when no slot has focus.
    pub fn cursor_offset(state: &CodeFieldState) -> Option<(u16, u16)> {
        state.focused().map(|idx| (Self::slot_x(state, idx), 0))
    }
}

impl StatefulWidgetRef for &CodeField {
    type State = CodeFieldState;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let epb = state.elements_in_block();
        let element_gap = " ".repeat(ELEMENT_GAP as usize);
        let block_gap = " ".repeat(BLOCK_GAP as usize);

        let mut digits: Vec<Span> = Vec::new();
        let mut underlines: Vec<Span> = Vec::new();
        for slot in state.slots() {
            if slot.index > 0 {
                let gap = if slot.index % epb == 0 {
                    block_gap.clone()
                } else {
                    element_gap.clone()
                };
                digits.push(Span::raw(gap.clone()));
                underlines.push(Span::raw(gap));
            }

            let ch = slot.value.unwrap_or(' ');
            digits.push(Span::styled(
                ch.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            underlines.push(if state.focused() == Some(slot.index) {
                Span::raw("▔").cyan().bold()
            } else {
                Span::raw("▔").dark_gray()
            });
        }

        let paragraph = Paragraph::new(vec![Line::from(digits), Line::from(underlines)]);
        paragraph.render(area, buf);
    }
}
