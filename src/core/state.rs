//! # Shared State
//!
//! Named cells that every screen of a flow can read and write. A cell is
//! created the first time its name is asked for and lives until the flow
//! closes.
//!
//! ```text
//! SharedState
//! └── cells: Mutex<Cells>
//!     ├── strings: HashMap<String, StringCell>
//!     └── ints:    HashMap<String, IntCell>
//! ```
//!
//! The two kinds have separate namespaces: `use_string("n", ..)` and
//! `use_int("n", ..)` return unrelated cells.
//!
//! Cells are backed by a `tokio::sync::watch` channel, so anything holding a
//! cell can `subscribe()` and be told when the value changes.

use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// A named, shared, observable value.
///
/// Cloning a cell clones the handle, not the value: every clone reads and
/// writes the same slot.
pub struct SharedCell<T> {
    name: Arc<str>,
    value: Arc<watch::Sender<T>>,
}

pub type StringCell = SharedCell<String>;
pub type IntCell = SharedCell<i64>;

impl<T> Clone for SharedCell<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCell")
            .field("name", &self.name)
            .field("value", &*self.value.borrow())
            .finish()
    }
}

impl<T> SharedCell<T> {
    fn new(name: &str, initial: T) -> Self {
        let (value, _) = watch::channel(initial);
        Self {
            name: Arc::from(name),
            value: Arc::new(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Stores `value`. Subscribers are only notified if it differs from the
    /// value already held.
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        self.value.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Modifies the value in place and notifies subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.value.send_modify(f);
    }

    /// Returns a receiver that observes every change made through any handle.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    /// True if both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

#[derive(Default)]
struct Cells {
    strings: HashMap<String, StringCell>,
    ints: HashMap<String, IntCell>,
}

/// Lazily populated store of string and integer cells.
#[derive(Default)]
pub struct SharedState {
    cells: Mutex<Cells>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the string cell called `name`, creating it with `default` if
    /// it does not exist yet. `default` is ignored for an existing cell.
    pub fn use_string(&self, name: &str, default: impl Into<String>) -> StringCell {
        let mut cells = self.cells.lock();
        cells
            .strings
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Creating string cell '{}'", name);
                SharedCell::new(name, default.into())
            })
            .clone()
    }

    /// Returns the integer cell called `name`, creating it with `default` if
    /// it does not exist yet. `default` is ignored for an existing cell.
    pub fn use_int(&self, name: &str, default: i64) -> IntCell {
        let mut cells = self.cells.lock();
        cells
            .ints
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Creating int cell '{}'", name);
                SharedCell::new(name, default)
            })
            .clone()
    }

    /// Number of cells of both kinds.
    pub fn len(&self) -> usize {
        let cells = self.cells.lock();
        cells.strings.len() + cells.ints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every cell. Handles already given out keep working but are no
    /// longer reachable by name.
    pub fn clear(&self) {
        let mut cells = self.cells.lock();
        cells.strings.clear();
        cells.ints.clear();
    }
}
