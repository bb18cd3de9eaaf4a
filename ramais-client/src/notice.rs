//! Auto-expiring user notices
//!
//! One notice is visible at a time; showing a new one replaces it and it
//! disappears on its own once the TTL elapses.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    current: Mutex<Option<(Notice, Instant)>>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<(Notice, Instant)>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn show(&self, level: NoticeLevel, text: impl Into<String>) -> Notice {
        let notice = Notice {
            level,
            text: text.into(),
        };
        *self.slot() = Some((notice.clone(), Instant::now()));
        notice
    }

    /// Show the outcome's message, if it carries one
    pub fn report(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Success(Some(text)) => {
                self.show(NoticeLevel::Success, text.clone());
            }
            Outcome::Success(None) => {}
            Outcome::Failure(text) => {
                self.show(NoticeLevel::Error, text.clone());
            }
        }
    }

    /// The visible notice, `None` once it has expired
    pub fn current(&self) -> Option<Notice> {
        let mut slot = self.slot();
        match slot.as_ref() {
            Some((_, shown_at)) if shown_at.elapsed() >= self.ttl => {
                *slot = None;
                None
            }
            Some((notice, _)) => Some(notice.clone()),
            None => None,
        }
    }

    pub fn clear(&self) {
        *self.slot() = None;
    }
}
