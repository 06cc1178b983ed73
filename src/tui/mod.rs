//! # TUI Adapter
//!
//! The ratatui-specific layer. Plays the three roles the core leaves to its
//! embedder: a display surface, a content-tree type (`View`), and the event
//! loop that shows it.
//!
//! ```text
//!   apply worker ── set_content(View) ──► ChannelSurface ──► mpsc ──┐
//!                                                                   ▼
//!   main thread: drain newest View → draw → poll keys → ScreenViewState
//!                                                  └─► button → navigate_to
//! ```
//!
//! The flow's worker never touches the terminal. Views cross over to the main
//! thread through a channel, and only the newest one is kept if several pile
//! up between frames.
//!
//! ## Redraw Strategy
//!
//! The loop only draws after an input event or a new view. Cells edited from
//! another thread show up on the next event or on the next poll timeout.

mod component;
mod components;
mod event;
pub mod screens;
mod ui;
pub mod view;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::sync::mpsc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::config::ResolvedConfig;
use crate::core::flow::Flow;
use crate::core::state::StringCell;
use crate::core::surface::ChannelSurface;
use crate::tui::component::EventHandler;
use crate::tui::components::ScreenViewState;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::screens::{DemoFlow, DemoScreen};
use crate::tui::ui::FrameProps;
use crate::tui::view::View;

const IDLE_POLL: Duration = Duration::from_millis(250);

/// TUI-specific presentation state
#[derive(Default)]
pub struct TuiState {
    pub screen: ScreenViewState,
}

impl TuiState {
    pub fn new() -> Self {
        Self::default()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // The keyboard protocol is harmlessly ignored by terminals that don't support it
        execute!(
            stdout(),
            EnableBracketedPaste,
            Hide,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Show
        );
    }
}

/// Builds the demo flow and sends it to the configured start screen.
fn build_flow(config: &ResolvedConfig) -> io::Result<(DemoFlow, mpsc::Receiver<View>)> {
    let (surface, views) = ChannelSurface::pair();
    let flow = Flow::named(&config.worker_name, surface).map_err(io::Error::other)?;
    screens::register_screens(&flow).map_err(io::Error::other)?;

    if let Some(start) = &config.start_screen {
        let status = flow.use_string(screens::STATUS, "");
        let requested = start
            .parse::<DemoScreen>()
            .and_then(|screen| flow.navigate_to(screen).map_err(|e| e.to_string()));
        if let Err(e) = requested {
            warn!("Cannot start on '{}': {}", start, e);
            status.set(e);
        }
    }
    Ok((flow, views))
}

pub fn run(config: ResolvedConfig) -> io::Result<()> {
    let (flow, views) = build_flow(&config)?;
    let status = flow.use_string(screens::STATUS, "");
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let terminal_mode_guard = TerminalModeGuard::new();
    if let Err(e) = &terminal_mode_guard {
        warn!("Failed to enable terminal modes: {}", e);
    }

    let result = event_loop(&mut terminal, &flow, &views, &status, &mut tui);

    drop(terminal_mode_guard);
    flow.close();
    ratatui::restore();
    info!("Screenflow exiting");
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    flow: &DemoFlow,
    views: &mpsc::Receiver<View>,
    status: &StringCell,
    tui: &mut TuiState,
) -> io::Result<()> {
    let mut needs_redraw = true;

    loop {
        // Older views were superseded before we got to draw them.
        if let Some(view) = views.try_iter().last() {
            debug!("Showing view '{}'", view.title);
            tui.screen.show(view);
            needs_redraw = true;
        }

        if needs_redraw {
            let props = FrameProps {
                current: flow.current().map(|s| s.to_string()),
                next: flow.next().map(|s| s.to_string()),
                status_message: status.get(),
            };
            terminal.draw(|f| ui::draw_ui(f, props, &mut *tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(IDLE_POLL);
        if first_event.is_none() {
            // Pick up cell changes made off the main thread.
            needs_redraw = true;
            continue;
        }

        // Process first event + drain ALL pending events before next draw
        needs_redraw = true;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Quit => return Ok(()),
                TuiEvent::Resize => {}
                _ => {
                    if let Some(view_event) = tui.screen.handle_event(&event) {
                        debug!("View event: {:?}", view_event);
                    }
                }
            }
        }
    }
}
