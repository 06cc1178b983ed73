//! # Core
//!
//! Screen navigation and shared state. Knows nothing about terminals or any
//! other UI technology: it only hands content trees to a [`Surface`].
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Flow (navigation)    │
//!                    │  • SharedState (cells)  │
//!                    │  • Surface (boundary)   │
//!                    │                         │
//!                    │  No I/O. No rendering.  │
//!                    └───────────┬─────────────┘
//!                                │ set_content(tree)
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │  Channel   │      │   Tests    │
//!     │  Adapter   │      │  Surface   │      │ (recorder) │
//!     │ (ratatui)  │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`flow`]: `Flow`, the navigation controller and its apply worker
//! - [`state`]: `SharedState`, named string and integer cells
//! - [`surface`]: the `Surface` trait
//! - [`error`]: `FlowError`
//! - [`config`]: settings for the `screenflow` binary

pub mod config;
pub mod error;
pub mod flow;
pub mod state;
pub mod surface;

pub use error::FlowError;
pub use flow::{Flow, Navigator, ScreenKey};
pub use state::{IntCell, SharedCell, SharedState, StringCell};
pub use surface::{ChannelSurface, Surface};
