//! # TUI Components
//!
//! - `TitleBar`: stateless top line showing the current screen and status
//! - `ScreenView`: renders the flow's current `View` and routes keys into it
//!
//! Components receive external data as props rather than reaching into the
//! flow directly, which keeps them testable against a `TestBackend`.

mod screen_view;
mod title_bar;

pub use screen_view::{ScreenView, ScreenViewState, ViewEvent};
pub use title_bar::TitleBar;
