//! # TitleBar Component
//!
//! Top status bar showing which screen is displayed.
//!
//! ## Responsibilities
//!
//! - Display the key of the screen currently on the surface
//! - Display a status message (e.g., "Unknown screen: settings")
//! - Show a "→ next" indicator while a navigation has not been applied yet
//!
//! ## Design Decisions
//!
//! ### Stateless Component
//!
//! TitleBar is purely presentational: it receives all data as props and has no
//! internal state.
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(
//!     flow.current().map(|s| s.to_string()),
//!     status.clone(),
//!     flow.next().filter(|n| Some(*n) != flow.current()).map(|s| s.to_string()),
//! );
//! title_bar.render(frame, area);
//! ```
//!
//! ## Conditional Formatting
//!
//! 1. **Pending**: `"Screenflow [home → editor] | status"`
//! 2. **Status message**: `"Screenflow [home] | status"`
//! 3. **Default**: `"Screenflow [home]"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

/// Top status bar component.
pub struct TitleBar {
    /// Screen currently displayed (`None` before the first apply)
    pub current: Option<String>,
    /// Status message (e.g., last navigation error)
    pub status_message: String,
    /// Screen the flow is switching to, if it differs from `current`
    pub pending: Option<String>,
}

impl TitleBar {
    pub fn new(current: Option<String>, status_message: String, pending: Option<String>) -> Self {
        Self {
            current,
            status_message,
            pending,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let current = self.current.as_deref().unwrap_or("-");
        let screens = match &self.pending {
            Some(next) => format!("{current} → {next}"),
            None => current.to_string(),
        };

        let title_text = if self.status_message.is_empty() {
            format!("Screenflow [{screens}]")
        } else {
            format!("Screenflow [{screens}] | {}", self.status_message)
        };

        frame.render_widget(Span::raw(title_text), area);
    }
}
