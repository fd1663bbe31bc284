//! A transport that replays a canned sequence of caller keypresses and
//! records the whole exchange. Drives the `demo` subcommand and the
//! scripted tests; running out of replies models the caller hanging up.

use super::{CallTransport, DigitConstraints, TransportError};
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum TranscriptEntry {
    Played {
        message: String,
    },
    Collected {
        prompt: String,
        constraints: DigitConstraints,
        reply: String,
    },
    Confirmed {
        prompt: String,
        accepted: bool,
    },
    Terminated {
        message: String,
    },
}

#[derive(Debug)]
pub struct ScriptedTransport {
    called_number: String,
    replies: VecDeque<String>,
    transcript: Vec<TranscriptEntry>,
}

impl ScriptedTransport {
    pub fn new(called_number: impl Into<String>, replies: &[&str]) -> Self {
        Self {
            called_number: called_number.into(),
            replies: replies.iter().map(|r| r.to_string()).collect(),
            transcript: Vec::new(),
        }
    }

    fn next_reply(&mut self) -> Result<String, TransportError> {
        self.replies.pop_front().ok_or(TransportError::Disconnected)
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// The hangup message, if the session reached one.
    pub fn terminal_message(&self) -> Option<&str> {
        self.transcript.iter().find_map(|entry| match entry {
            TranscriptEntry::Terminated { message } => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn played_messages(&self) -> Vec<&str> {
        self.transcript
            .iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Played { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn collected(&self) -> Vec<&TranscriptEntry> {
        self.transcript
            .iter()
            .filter(|entry| matches!(entry, TranscriptEntry::Collected { .. }))
            .collect()
    }
}

impl CallTransport for ScriptedTransport {
    fn called_number(&self) -> &str {
        &self.called_number
    }

    fn play(&mut self, message: &str) -> Result<(), TransportError> {
        self.transcript.push(TranscriptEntry::Played {
            message: message.to_string(),
        });
        Ok(())
    }

    fn collect_digits(
        &mut self,
        prompt: &str,
        constraints: &DigitConstraints,
    ) -> Result<String, TransportError> {
        let reply = self.next_reply()?;
        // A real transport filters keypresses; a script skipping that filter
        // is a defect in the script, not caller input.
        if !constraints.accepts(&reply) {
            return Err(TransportError::Protocol(format!(
                "scripted reply '{reply}' violates digit constraints"
            )));
        }
        self.transcript.push(TranscriptEntry::Collected {
            prompt: prompt.to_string(),
            constraints: constraints.clone(),
            reply: reply.clone(),
        });
        Ok(reply)
    }

    fn confirm(&mut self, prompt: &str, _yes: &str, _no: &str) -> Result<bool, TransportError> {
        let reply = self.next_reply()?;
        let accepted = match reply.as_str() {
            "1" => true,
            "2" => false,
            other => {
                return Err(TransportError::Protocol(format!(
                    "scripted confirmation must be 1 or 2, got '{other}'"
                )))
            }
        };
        self.transcript.push(TranscriptEntry::Confirmed {
            prompt: prompt.to_string(),
            accepted,
        });
        Ok(accepted)
    }

    fn terminate(&mut self, message: &str) -> Result<(), TransportError> {
        self.transcript.push(TranscriptEntry::Terminated {
            message: message.to_string(),
        });
        Ok(())
    }
}
