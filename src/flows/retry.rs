//! The one bounded-retry primitive every recoverable step goes through.
//! Flows never loop on themselves; a uniform attempt budget keeps the
//! whole system's retry behavior in one testable place.

use super::FlowInterrupt;
use crate::transport::CallTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// The two voices of a retried step: one heard between attempts, a distinct
/// one heard exactly once when the budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct RetryMessages {
    pub between_attempts: &'static str,
    pub exhausted: &'static str,
}

/// Run `attempt` until it yields a value or the budget is spent.
///
/// `Ok(None)` marks a soft failure worth retrying; errors propagate
/// unchanged. The between-attempts message plays only between attempts,
/// never before the first and never after the last. Exhaustion terminates
/// the session with the step's own message and surfaces as
/// [`FlowInterrupt::Hangup`]. Every attempt reruns the step from scratch;
/// there is no partial-state resume.
pub fn run_with_retries<T, F>(
    transport: &mut dyn CallTransport,
    policy: RetryPolicy,
    messages: RetryMessages,
    mut attempt: F,
) -> Result<T, FlowInterrupt>
where
    F: FnMut(&mut dyn CallTransport) -> Result<Option<T>, FlowInterrupt>,
{
    for n in 1..=policy.max_attempts {
        if n > 1 {
            transport.play(messages.between_attempts)?;
        }
        if let Some(value) = attempt(transport)? {
            return Ok(value);
        }
        tracing::debug!(attempt = n, budget = policy.max_attempts, "attempt failed");
    }

    transport.terminate(messages.exhausted)?;
    Err(FlowInterrupt::Hangup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts;
    use crate::transport::{ScriptedTransport, TranscriptEntry};

    const MESSAGES: RetryMessages = RetryMessages {
        between_attempts: "between",
        exhausted: prompts::MAX_ATTEMPTS_REACHED,
    };

    #[test]
    fn first_try_success_plays_no_messages() {
        let mut transport = ScriptedTransport::new("100", &[]);
        let value = run_with_retries(
            &mut transport,
            RetryPolicy::default(),
            MESSAGES,
            |_t| Ok(Some(7)),
        )
        .expect("succeeds");
        assert_eq!(value, 7);
        assert!(transport.transcript().is_empty());
    }

    #[test]
    fn between_message_plays_only_between_attempts() {
        let mut transport = ScriptedTransport::new("100", &[]);
        let mut calls = 0;
        let value = run_with_retries(
            &mut transport,
            RetryPolicy::default(),
            MESSAGES,
            |_t| {
                calls += 1;
                Ok(if calls == 3 { Some("ok") } else { None })
            },
        )
        .expect("succeeds on third attempt");
        assert_eq!(value, "ok");
        assert_eq!(
            transport.transcript(),
            &[
                TranscriptEntry::Played {
                    message: "between".to_string()
                },
                TranscriptEntry::Played {
                    message: "between".to_string()
                },
            ]
        );
    }

    #[test]
    fn exhaustion_terminates_once_and_stops_attempting() {
        let mut transport = ScriptedTransport::new("100", &[]);
        let mut calls = 0;
        let result: Result<(), _> = run_with_retries(
            &mut transport,
            RetryPolicy { max_attempts: 3 },
            MESSAGES,
            |_t| {
                calls += 1;
                Ok(None)
            },
        );

        assert!(matches!(result, Err(FlowInterrupt::Hangup)));
        assert_eq!(calls, 3);
        assert_eq!(
            transport.terminal_message(),
            Some(prompts::MAX_ATTEMPTS_REACHED)
        );
        let terminations = transport
            .transcript()
            .iter()
            .filter(|e| matches!(e, TranscriptEntry::Terminated { .. }))
            .count();
        assert_eq!(terminations, 1);
    }

    #[test]
    fn hard_errors_propagate_without_consuming_the_budget() {
        let mut transport = ScriptedTransport::new("100", &[]);
        let mut calls = 0;
        let result: Result<(), _> = run_with_retries(
            &mut transport,
            RetryPolicy::default(),
            MESSAGES,
            |_t| {
                calls += 1;
                Err(FlowInterrupt::Hangup)
            },
        );
        assert!(matches!(result, Err(FlowInterrupt::Hangup)));
        assert_eq!(calls, 1);
    }
}
