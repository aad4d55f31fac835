//! Navigation primitives the access layer needs from a router.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::sync::Mutex;

/// Minimal router surface: read the current path, move to another one.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    /// Navigate, adding a history entry.
    fn push(&self, path: &str);

    /// Navigate, replacing the current history entry so "back" skips it.
    fn replace(&self, path: &str);
}

/// In-memory history stack.
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    #[must_use]
    pub fn new(start: &str) -> Self {
        Self { entries: Mutex::new(vec![start.to_owned()]) }
    }

    /// Copy of every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Pop the current entry, returning the new current path. The first entry
    /// is never popped.
    pub fn back(&self) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        if entries.len() < 2 {
            return None;
        }
        entries.pop();
        entries.last().cloned()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for History {
    fn current_path(&self) -> String {
        self.entries
            .lock()
            .ok()
            .and_then(|e| e.last().cloned())
            .unwrap_or_else(|| "/".to_owned())
    }

    fn push(&self, path: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            tracing::trace!(path, "history push");
            entries.push(path.to_owned());
        }
    }

    fn replace(&self, path: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            tracing::trace!(path, "history replace");
            match entries.last_mut() {
                Some(last) => path.clone_into(last),
                None => entries.push(path.to_owned()),
            }
        }
    }
}
