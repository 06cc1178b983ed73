//! # Demo Screens
//!
//! Three screens sharing two cells:
//!
//! ```text
//!   home ───────► editor          "txt"    StringCell, edited on home and editor
//!     │  ◄──────    │             "clicks" IntCell, bumped on counter
//!     ▼             ▼             "status" StringCell, shown in the title bar
//!   counter ◄───────┘
//! ```
//!
//! Home is registered first, so it is what the flow shows on startup.

use log::warn;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::error::FlowError;
use crate::core::flow::{Flow, Navigator};
use crate::core::state::{SharedState, StringCell};
use crate::tui::view::View;

/// Name of the cell holding the status line.
pub const STATUS: &str = "status";
pub const TEXT: &str = "txt";
pub const CLICKS: &str = "clicks";

const DEFAULT_TEXT: &str = "test text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoScreen {
    Home,
    Editor,
    Counter,
}

impl DemoScreen {
    pub const ALL: [DemoScreen; 3] = [DemoScreen::Home, DemoScreen::Editor, DemoScreen::Counter];

    pub fn as_str(&self) -> &'static str {
        match self {
            DemoScreen::Home => "home",
            DemoScreen::Editor => "editor",
            DemoScreen::Counter => "counter",
        }
    }
}

impl fmt::Display for DemoScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemoScreen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DemoScreen::ALL
            .into_iter()
            .find(|screen| screen.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown screen: {wanted}"))
    }
}

pub type DemoFlow = Flow<DemoScreen, View>;
type DemoNavigator = Navigator<DemoScreen, View>;

/// Registers every demo screen on `flow`.
pub fn register_screens(flow: &DemoFlow) -> Result<(), FlowError> {
    let nav = flow.navigator();
    let state = flow.state();

    for screen in DemoScreen::ALL {
        let nav = nav.clone();
        let state = Arc::clone(&state);
        flow.register(screen, move || build(screen, &nav, &state))?;
    }
    Ok(())
}

fn build(screen: DemoScreen, nav: &DemoNavigator, state: &SharedState) -> View {
    let status = state.use_string(STATUS, "");
    let txt = state.use_string(TEXT, DEFAULT_TEXT);

    match screen {
        DemoScreen::Home => View::new("Home")
            .label("I am Home")
            .entry("Text", txt)
            .button("Go to editor", go(nav, &status, DemoScreen::Editor))
            .button("Go to counter", go(nav, &status, DemoScreen::Counter)),
        DemoScreen::Editor => View::new("Editor")
            .label("I am the editor, sharing Home's text")
            .entry("Text", txt)
            .button("Back home", go(nav, &status, DemoScreen::Home))
            .button("Go to counter", go(nav, &status, DemoScreen::Counter)),
        DemoScreen::Counter => {
            let clicks = state.use_int(CLICKS, 0);
            let bump = clicks.clone();
            let reset = clicks.clone();
            View::new("Counter")
                .label(format!("Text when this screen was built: {}", txt.get()))
                .value("Clicks", clicks)
                .button("+1", move || bump.update(|n| *n += 1))
                .button("Reset", move || reset.set(0))
                .button("Back home", go(nav, &status, DemoScreen::Home))
        }
    }
}

/// Button action navigating to `to`, reporting failures on the status line.
fn go(
    nav: &DemoNavigator,
    status: &StringCell,
    to: DemoScreen,
) -> impl Fn() + Send + Sync + 'static {
    let nav = nav.clone();
    let status = status.clone();
    move || match nav.navigate_to(to) {
        Ok(()) => status.set(String::new()),
        Err(e) => {
            warn!("Navigation to {} failed: {}", to, e);
            status.set(e.to_string());
        }
    }
}
