//! Screenflow: a navigation controller that switches one display surface
//! between registered screens, plus a store of state the screens share.

pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

pub use crate::core::{Flow, FlowError, Navigator, SharedState, Surface};
