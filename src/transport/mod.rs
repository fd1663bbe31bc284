//! The collaborator boundary toward the telephony platform. Every method
//! is a suspension point: the flow blocks until the transport delivers the
//! caller's reply. Input filtering happens on the transport side, so the
//! digit strings handed back always satisfy the submitted constraints.

use crate::domain::Digit;
use serde::Serialize;

pub mod console;
pub mod script;

pub use console::ConsoleTransport;
pub use script::{ScriptedTransport, TranscriptEntry};

/// Which digits the transport may accept for one collection step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedDigits {
    Any,
    Set(Vec<Digit>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitConstraints {
    pub min_len: usize,
    pub max_len: usize,
    pub allowed: AllowedDigits,
}

impl DigitConstraints {
    /// A single keypress drawn from an explicit digit set, as used by menus
    /// and the selection engine.
    pub fn exactly_one_of(keys: impl IntoIterator<Item = Digit>) -> Self {
        Self {
            min_len: 1,
            max_len: 1,
            allowed: AllowedDigits::Set(keys.into_iter().collect()),
        }
    }

    /// A free numeric entry bounded to a length window.
    pub fn numeric(min_len: usize, max_len: usize) -> Self {
        Self {
            min_len,
            max_len,
            allowed: AllowedDigits::Any,
        }
    }

    pub fn accepts(&self, input: &str) -> bool {
        if input.len() < self.min_len || input.len() > self.max_len {
            return false;
        }
        input.chars().all(|c| {
            let Some(digit) = c.to_digit(10) else {
                return false;
            };
            match &self.allowed {
                AllowedDigits::Any => true,
                AllowedDigits::Set(keys) => keys.contains(&(digit as Digit)),
            }
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("caller disconnected")]
    Disconnected,
    #[error("transport protocol violation: {0}")]
    Protocol(String),
}

/// One live phone call. A single logical thread of control: no method is
/// invoked concurrently and no step proceeds speculatively.
pub trait CallTransport {
    /// The number the caller dialed; resolves the tenant account.
    fn called_number(&self) -> &str;

    fn play(&mut self, message: &str) -> Result<(), TransportError>;

    fn collect_digits(
        &mut self,
        prompt: &str,
        constraints: &DigitConstraints,
    ) -> Result<String, TransportError>;

    fn confirm(&mut self, prompt: &str, yes: &str, no: &str) -> Result<bool, TransportError>;

    /// Play a final message and hang up. No further interaction follows.
    fn terminate(&mut self, message: &str) -> Result<(), TransportError>;
}
