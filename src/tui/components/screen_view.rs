//! # Screen View Component
//!
//! Renders the `View` most recently handed over by the flow and routes key
//! presses into it.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ScreenViewState` lives in `TuiState` and owns the view and focus
//! - `ScreenView` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::view::{View, Widget};

/// Persistent state: the displayed view and which focusable widget is active.
#[derive(Default)]
pub struct ScreenViewState {
    pub view: Option<View>,
    /// Position in the view's focus order.
    pub focus: usize,
}

impl ScreenViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the displayed view. Focus returns to the first widget.
    pub fn show(&mut self, view: View) {
        self.view = Some(view);
        self.focus = 0;
    }

    /// Index into `view.widgets` of the focused widget.
    pub fn focused_widget(&self) -> Option<usize> {
        let order = self.view.as_ref()?.focus_order();
        order.get(self.focus % order.len().max(1)).copied()
    }
}

/// Events emitted by the screen view.
#[derive(Debug, PartialEq, Eq)]
pub enum ViewEvent {
    /// A button was pressed; its action has already run.
    Pressed(String),
    /// The text of the named cell was edited.
    Edited(String),
}

impl EventHandler for ScreenViewState {
    type Event = ViewEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ViewEvent> {
        let order = self.view.as_ref()?.focus_order();
        if order.is_empty() {
            return None;
        }
        match event {
            TuiEvent::FocusNext => {
                self.focus = (self.focus + 1) % order.len();
                return None;
            }
            TuiEvent::FocusPrev => {
                self.focus = (self.focus + order.len() - 1) % order.len();
                return None;
            }
            _ => {}
        }

        let view = self.view.as_ref()?;
        let index = order[self.focus % order.len()];
        let mut advance = false;
        let result = match (&view.widgets[index], event) {
            (Widget::Button { label, on_press }, TuiEvent::Submit | TuiEvent::InputChar(' ')) => {
                on_press();
                Some(ViewEvent::Pressed(label.clone()))
            }
            (Widget::Entry { cell, .. }, TuiEvent::InputChar(c)) => {
                cell.update(|text| text.push(*c));
                Some(ViewEvent::Edited(cell.name().to_string()))
            }
            (Widget::Entry { cell, .. }, TuiEvent::Paste(pasted)) => {
                cell.update(|text| text.push_str(pasted));
                Some(ViewEvent::Edited(cell.name().to_string()))
            }
            (Widget::Entry { cell, .. }, TuiEvent::Backspace) => {
                cell.update(|text| {
                    text.pop();
                });
                Some(ViewEvent::Edited(cell.name().to_string()))
            }
            (Widget::Entry { .. }, TuiEvent::Submit) => {
                advance = true;
                None
            }
            _ => None,
        };
        if advance {
            self.focus = (self.focus + 1) % order.len();
        }
        result
    }
}

/// Transient render wrapper for the screen view.
pub struct ScreenView<'a> {
    state: &'a ScreenViewState,
}

impl<'a> ScreenView<'a> {
    pub fn new(state: &'a ScreenViewState) -> Self {
        Self { state }
    }
}

impl Component for ScreenView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(view) = &self.state.view else {
            let waiting = Paragraph::new("Waiting for the first screen...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(waiting, area);
            return;
        };

        let focused = self.state.focused_widget();
        let lines: Vec<Line> = view
            .widgets
            .iter()
            .enumerate()
            .map(|(i, widget)| widget_line(widget, focused == Some(i)))
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(Block::bordered().title(view.title.as_str()))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

fn widget_line(widget: &Widget, focused: bool) -> Line<'static> {
    let label_style = Style::default().fg(Color::DarkGray);
    match widget {
        Widget::Label(text) => Line::from(text.clone()),
        Widget::Entry { label, cell } => {
            let field_style = if focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default().add_modifier(Modifier::UNDERLINED)
            };
            Line::from(vec![
                Span::styled(format!("{label}: "), label_style),
                Span::styled(format!("[{}]", cell.get()), field_style),
            ])
        }
        Widget::Value { label, cell } => Line::from(vec![
            Span::styled(format!("{label}: "), label_style),
            Span::raw(cell.get().to_string()),
        ]),
        Widget::Button { label, .. } => {
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(format!("[ {label} ]"), style))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::SharedState;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn render_to_text(state: &ScreenViewState) -> String {
        let backend = TestBackend::new(40, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                ScreenView::new(state).render(f, f.area());
            })
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_render_without_view() {
        let state = ScreenViewState::new();
        assert!(render_to_text(&state).contains("Waiting for the first screen"));
    }

    #[test]
    fn test_render_shows_bound_values() {
        let store = SharedState::new();
        let txt = store.use_string("txt", "test text");
        let clicks = store.use_int("clicks", 3);

        let mut state = ScreenViewState::new();
        state.show(
            View::new("Editor")
                .label("I am B")
                .entry("Text", txt.clone())
                .value("Clicks", clicks.clone()),
        );

        let text = render_to_text(&state);
        assert!(text.contains("Editor"));
        assert!(text.contains("I am B"));
        assert!(text.contains("[test text]"));
        assert!(text.contains("Clicks: 3"));

        // Changes made elsewhere show up on the next frame.
        clicks.set(4);
        assert!(render_to_text(&state).contains("Clicks: 4"));
    }

    #[test]
    fn test_typing_edits_focused_entry() {
        let store = SharedState::new();
        let txt = store.use_string("txt", "ab");

        let mut state = ScreenViewState::new();
        state.show(View::new("A").entry("Text", txt.clone()));

        assert_eq!(
            state.handle_event(&TuiEvent::InputChar('c')),
            Some(ViewEvent::Edited("txt".to_string()))
        );
        state.handle_event(&TuiEvent::Paste("de".to_string()));
        state.handle_event(&TuiEvent::Backspace);
        assert_eq!(txt.get(), "abcd");
    }

    #[test]
    fn test_enter_presses_focused_button() {
        let presses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&presses);

        let mut state = ScreenViewState::new();
        state.show(
            View::new("A")
                .button("First", || {})
                .button("Second", move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
        );

        state.handle_event(&TuiEvent::FocusNext);
        assert_eq!(state.focused_widget(), Some(1));
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(ViewEvent::Pressed("Second".to_string()))
        );
        assert_eq!(presses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_focus_wraps_around() {
        let mut state = ScreenViewState::new();
        state.show(View::new("A").button("One", || {}).button("Two", || {}));

        state.handle_event(&TuiEvent::FocusPrev);
        assert_eq!(state.focused_widget(), Some(1));
        state.handle_event(&TuiEvent::FocusNext);
        assert_eq!(state.focused_widget(), Some(0));
    }

    #[test]
    fn test_enter_on_entry_moves_focus() {
        let store = SharedState::new();
        let mut state = ScreenViewState::new();
        state.show(
            View::new("A")
                .entry("Text", store.use_string("txt", ""))
                .button("Go", || {}),
        );

        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
        assert_eq!(state.focused_widget(), Some(1));
    }

    #[test]
    fn test_show_resets_focus() {
        let mut state = ScreenViewState::new();
        state.show(View::new("A").button("One", || {}).button("Two", || {}));
        state.handle_event(&TuiEvent::FocusNext);

        state.show(View::new("B").button("Only", || {}));
        assert_eq!(state.focus, 0);
        assert_eq!(state.focused_widget(), Some(0));
    }
}
