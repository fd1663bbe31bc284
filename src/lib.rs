//! Self-service telephone flows for a school celebration back office.
//!
//! Callers identify themselves with a student identification number and,
//! using only keypad digits, can report a celebration, choose a completion
//! track, attach gift vouchers, and later confirm the celebration took
//! place. The crate owns the call-flow orchestration only: telephony
//! transport and durable storage are collaborators behind the traits in
//! [`transport`] and [`store`].

pub mod config;
pub mod domain;
pub mod error;
pub mod flows;
pub mod prompts;
pub mod store;
pub mod telemetry;
pub mod transport;
