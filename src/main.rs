use std::sync::mpsc;

use color_eyre::Result;
use crossterm::event::{self, KeyCode};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, FrameExt, List, ListItem, ListState, Paragraph};
use ratatui::{DefaultTerminal, Frame};
mod field;
mod presets;
pub use field::state::{CodeFieldState, Phase};
pub use field::widget::CodeField;

use crate::presets::{FieldPreset, PRESET_REGISTRY, get_preset_by_index, get_preset_by_name};

fn main() -> Result<()> {
    color_eyre::install()?;
    ratatui::run(|terminal| App::new().run(terminal))
}

struct App {
    preset: FieldPreset,
    state: CodeFieldState,
    widget: CodeField,
    mode: Mode,
    completed_tx: mpsc::Sender<String>,
    completed_rx: mpsc::Receiver<String>,
}

#[derive(Clone)]
pub enum Mode {
    Entry,
    PresetSelect(Option<usize>),
    Completed(String),
}

impl App {
    fn new() -> Self {
        let preset = get_preset_by_name(presets::sms::PRESET_NAME)
            .or_else(|| get_preset_by_index(0))
            .expect("no field presets registered");
        let (completed_tx, completed_rx) = mpsc::channel();
        let state = Self::build_state(preset, &completed_tx);
        Self {
            preset,
            state,
            widget: CodeField,
            mode: Mode::Entry,
            completed_tx,
            completed_rx,
        }
    }

    /// Builds a fresh slot sequence for `preset`, wires its completion
    /// callback to the channel and focuses the first slot.
    fn build_state(preset: FieldPreset, tx: &mpsc::Sender<String>) -> CodeFieldState {
        let mut state = CodeFieldState::new(preset.blocks, preset.elements_in_block);
        let tx = tx.clone();
        state.set_on_complete(move |code| {
            let _ = tx.send(code.to_string());
        });
        state.handle_focus_gained(0);
        state
    }

    fn run(mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;

            // Terminate the program if the user presses 'q' or 'Q' and true is returned
            if self.event_handler()? {
                return Ok(());
            }
            if let Ok(code) = self.completed_rx.try_recv() {
                self.mode = Mode::Completed(code);
            }
        }
    }

    /// Handles user input events.
    ///
    /// @returns Ok(true) if the user wants to quit the program.
    fn event_handler(&mut self) -> Result<bool> {
        if let Some(k) = event::read()?.as_key_press_event() {
            match self.mode {
                Mode::Entry => match k.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        self.mode = Mode::PresetSelect(None);
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.state.clear();
                    }
                    KeyCode::Left => {
                        let cur = self.state.focused().unwrap_or(0);
                        self.state.handle_focus_gained(cur.saturating_sub(1));
                    }
                    KeyCode::Right => {
                        let cur = self.state.focused().unwrap_or(0);
                        let last = self.state.len() - 1;
                        self.state.handle_focus_gained((cur + 1).min(last));
                    }
                    _ => self.state.handle_key(k),
                },
                Mode::PresetSelect(idx) => match k.code {
                    KeyCode::Esc => {
                        self.mode = Mode::Entry;
                    }
                    KeyCode::Down => {
                        if let Some(idx) = idx {
                            let presets_count = PRESET_REGISTRY.lock().unwrap().len();
                            if idx + 1 < presets_count {
                                self.mode = Mode::PresetSelect(Some(idx + 1));
                            } else {
                                self.mode = Mode::PresetSelect(Some(0));
                            }
                        } else {
                            self.mode = Mode::PresetSelect(Some(0));
                        }
                    }
                    KeyCode::Up => {
                        if let Some(idx) = idx {
                            let presets_count = PRESET_REGISTRY.lock().unwrap().len();
                            if idx == 0 {
                                self.mode = Mode::PresetSelect(Some(presets_count - 1));
                            } else {
                                self.mode = Mode::PresetSelect(Some(idx - 1));
                            }
                        } else {
                            self.mode = Mode::PresetSelect(Some(0));
                        }
                    }
                    KeyCode::Enter => {
                        if let Some(selected_idx) = idx {
                            let current_idx = PRESET_REGISTRY
                                .lock()
                                .unwrap()
                                .iter()
                                .position(|p| p.name == self.preset.name)
                                .unwrap_or(0);
                            if current_idx != selected_idx {
                                if let Some(preset) = get_preset_by_index(selected_idx) {
                                    // Full reconfiguration: the old slot
                                    // sequence is discarded, not resized.
                                    self.preset = preset;
                                    self.state = Self::build_state(preset, &self.completed_tx);
                                }
                            }
                        }
                        self.mode = Mode::Entry;
                    }
                    _ => {}
                },
                Mode::Completed(_) => match k.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
                    KeyCode::Enter | KeyCode::Esc => {
                        self.state.clear();
                        self.mode = Mode::Entry;
                    }
                    _ => {}
                },
            }
        }
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame) {
        let horizontal = Layout::horizontal([Constraint::Length(29), Constraint::Fill(1)]);
        let [settings, field_area] = frame.area().layout(&horizontal);

        self.render_settings(frame, settings);
        self.render_field(frame, field_area);
        self.render_preset_popup(frame);
        self.render_completed_popup(frame);
    }

    fn render_settings(&self, frame: &mut Frame, area: Rect) {
        let phase = match self.state.phase() {
            Phase::Empty => Span::raw("EMPTY").dark_gray().add_modifier(Modifier::BOLD),
            Phase::Partial => Span::raw("PARTIAL").yellow().add_modifier(Modifier::BOLD),
            Phase::Full => Span::raw("FULL").green().add_modifier(Modifier::BOLD),
        };
        let lines = vec![
            Line::from(Span::styled(
                format!("Preset = {}", self.preset.name),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "Slots  = {} x {}",
                    self.preset.blocks, self.preset.elements_in_block
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw("Code   = ").white(),
                Span::styled(self.state.code(), Style::default().cyan().bold()),
            ]),
            Line::from(vec![Span::raw("Phase  = ").white(), phase]),
            Line::from(""),
            Line::from(vec!["<0-9> ".blue().bold(), "type a digit".into()]),
            Line::from(vec!["<Backspace> ".blue().bold(), "delete".into()]),
            Line::from(vec!["<Left/Right> ".blue().bold(), "move focus".into()]),
            Line::from(vec!["<r> ".blue().bold(), "reset".into()]),
        ];
        let paragraph = Paragraph::new(lines).block(
            Block::bordered()
                .title_top(Line::from(vec![" Field ".into(), "<p> ".blue().bold()])),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_field(&mut self, frame: &mut Frame, area: Rect) {
        let outer_block = Block::bordered().title_top(
            Line::from(vec![
                " Enter the code ".into(),
                "<p> presets ".blue().bold(),
                " Quit ".into(),
                "<q> ".blue().bold(),
            ])
            .centered(),
        );
        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let width = CodeField::width(&self.state).min(inner.width);
        let height = CodeField::HEIGHT.min(inner.height);
        let centered = Rect::new(
            inner.x + inner.width.saturating_sub(width) / 2,
            inner.y + inner.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_stateful_widget_ref(&self.widget, centered, &mut self.state);

        if let Mode::Entry = self.mode {
            if let Some((x_offset, y_offset)) = CodeField::cursor_offset(&self.state) {
                frame.set_cursor_position((centered.x + x_offset, centered.y + y_offset));
            }
        }
    }

    fn render_preset_popup(&mut self, frame: &mut Frame) {
        let Mode::PresetSelect(idx) = self.mode else {
            return;
        };
        let items: Vec<ListItem> = PRESET_REGISTRY
            .lock()
            .unwrap()
            .iter()
            .map(|preset| ListItem::new(Span::raw(preset.name)))
            .collect();

        // Figure out which index corresponds to the current preset
        let selected_idx = idx.or_else(|| {
            PRESET_REGISTRY
                .lock()
                .unwrap()
                .iter()
                .position(|p| p.name == self.preset.name)
        });
        self.mode = Mode::PresetSelect(selected_idx);

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Choose a field preset (ESC to close)")
                    .style(Style::default().bg(Color::Black).fg(Color::White)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        let area = centered_rect(35, 25, frame.area());
        frame.render_widget(Clear, area);

        // Setup list state with highlighted element
        let mut state = ListState::default();
        if let Some(idx) = selected_idx {
            state.select(Some(idx));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_completed_popup(&self, frame: &mut Frame) {
        let Mode::Completed(code) = &self.mode else {
            return;
        };
        let lines = vec![
            Line::from("The code is complete:"),
            Line::from(Span::styled(
                code.clone(),
                Style::default().green().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec!["<Enter> ".blue().bold(), "start over".into()]),
        ];
        let paragraph = Paragraph::new(lines).centered().block(
            Block::bordered()
                .title_top(Line::from(" Complete ").centered())
                .style(Style::default().bg(Color::Black).fg(Color::White)),
        );

        let area = centered_rect(35, 25, frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(paragraph, area);
    }
}

/// helper function to create a centered rect using up certain percentage of the available rect `r`
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    // Cut the given rectangle into three vertical pieces
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    // Then cut the middle vertical piece into three width-wise pieces
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1] // Return the middle chunk
}
