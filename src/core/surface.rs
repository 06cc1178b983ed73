//! # Display Surface
//!
//! The boundary between the flow and whatever actually shows content.
//! A surface is moved onto the flow's apply worker when the flow is created
//! and is only ever touched from that thread, so it needs to be `Send` but
//! not `Sync`.

use log::warn;
use std::sync::mpsc;

/// Something that can display a fully built content tree.
pub trait Surface: Send + 'static {
    /// The content-tree type produced by screen generators.
    type Content: Send + 'static;

    /// Replace whatever is currently displayed with `content`.
    fn set_content(&mut self, content: Self::Content);
}

/// A surface that forwards every content tree over a channel.
///
/// Useful when the thing that draws lives on another thread (a terminal
/// event loop, for example) and wants to pick up new content between frames.
pub struct ChannelSurface<C> {
    sender: mpsc::Sender<C>,
}

impl<C> ChannelSurface<C> {
    pub fn new(sender: mpsc::Sender<C>) -> Self {
        Self { sender }
    }

    /// Creates a surface together with the receiving end of its channel.
    pub fn pair() -> (Self, mpsc::Receiver<C>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl<C: Send + 'static> Surface for ChannelSurface<C> {
    type Content = C;

    fn set_content(&mut self, content: C) {
        if self.sender.send(content).is_err() {
            warn!("Dropping content: surface receiver is gone");
        }
    }
}
