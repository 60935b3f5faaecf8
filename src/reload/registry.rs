//! Browser session registry for long-poll live reload.
//!
//! Each open tab polls with its own token. Per token:
//!
//! ```text
//! Unknown --poll--> Waiting --trigger--> Owed --poll (reply Reload)--> Unknown
//!                   Waiting --poll (reply Wait)--> Waiting
//! ```
//!
//! Every transition happens under one lock.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Answer to one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollReply {
    Reload,
    Wait,
}

#[derive(Debug, Default)]
pub struct ReloadRegistry {
    /// token -> owed a reload
    clients: Mutex<FxHashMap<String, bool>>,
}

impl ReloadRegistry {
    pub fn poll(&self, token: &str) -> PollReply {
        let mut clients = self.clients.lock();
        match clients.get(token).copied() {
            None => {
                clients.insert(token.to_string(), false);
                PollReply::Wait
            }
            Some(true) => {
                // the tab reloads and comes back with a fresh token
                clients.remove(token);
                PollReply::Reload
            }
            Some(false) => PollReply::Wait,
        }
    }

    /// Mark every tracked session as owed a reload.
    pub fn trigger(&self) {
        for owed in self.clients.lock().values_mut() {
            *owed = true;
        }
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }
}
