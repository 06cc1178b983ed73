//! # Views
//!
//! The content tree the terminal front-end displays. A screen generator
//! builds a `View`; the flow's worker hands it to the surface; the event loop
//! renders it and routes key presses into it.
//!
//! Entries and value labels are bound to shared cells, so they always show
//! the cell's current value, including changes made from another screen.

use std::fmt;
use std::sync::Arc;

use crate::core::state::{IntCell, StringCell};

/// Callback run when a button is pressed.
pub type Action = Arc<dyn Fn() + Send + Sync>;

pub enum Widget {
    Label(String),
    /// Editable text bound to a string cell.
    Entry { label: String, cell: StringCell },
    /// Read-only display of an int cell.
    Value { label: String, cell: IntCell },
    Button { label: String, on_press: Action },
}

impl Widget {
    pub fn is_focusable(&self) -> bool {
        matches!(self, Widget::Entry { .. } | Widget::Button { .. })
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Widget::Label(text) => f.debug_tuple("Label").field(text).finish(),
            Widget::Entry { label, cell } => f
                .debug_struct("Entry")
                .field("label", label)
                .field("cell", &cell.name())
                .finish(),
            Widget::Value { label, cell } => f
                .debug_struct("Value")
                .field("label", label)
                .field("cell", &cell.name())
                .finish(),
            Widget::Button { label, .. } => f.debug_struct("Button").field("label", label).finish(),
        }
    }
}

/// A screen's worth of widgets, top to bottom.
#[derive(Debug)]
pub struct View {
    pub title: String,
    pub widgets: Vec<Widget>,
}

impl View {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            widgets: Vec::new(),
        }
    }

    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.widgets.push(Widget::Label(text.into()));
        self
    }

    pub fn entry(mut self, label: impl Into<String>, cell: StringCell) -> Self {
        self.widgets.push(Widget::Entry {
            label: label.into(),
            cell,
        });
        self
    }

    pub fn value(mut self, label: impl Into<String>, cell: IntCell) -> Self {
        self.widgets.push(Widget::Value {
            label: label.into(),
            cell,
        });
        self
    }

    pub fn button(
        mut self,
        label: impl Into<String>,
        on_press: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.widgets.push(Widget::Button {
            label: label.into(),
            on_press: Arc::new(on_press),
        });
        self
    }

    /// Indices of the widgets that can take focus, in display order.
    pub fn focus_order(&self) -> Vec<usize> {
        self.widgets
            .iter()
            .enumerate()
            .filter(|(_, w)| w.is_focusable())
            .map(|(i, _)| i)
            .collect()
    }
}
