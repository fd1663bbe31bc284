//! The per-call state machine: authenticate, work out which menu branches
//! the caller's history makes available, dispatch into a subflow, and
//! guarantee the call always ends on a terminal message.

use super::retry::{run_with_retries, RetryMessages, RetryPolicy};
use super::{assignment, registration, FlowInterrupt};
use crate::config::IvrConfig;
use crate::domain::{Digit, Event, Student};
use crate::prompts;
use crate::store::EventStore;
use crate::transport::{CallTransport, DigitConstraints, TransportError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuBranch {
    ReportEvent,
    PathSelection,
    VoucherSelection,
    PostEventUpdate,
}

impl MenuBranch {
    pub const fn digit(self) -> Digit {
        match self {
            Self::ReportEvent => 1,
            Self::PathSelection => 2,
            Self::VoucherSelection => 3,
            Self::PostEventUpdate => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ReportEvent => "report a new celebration",
            Self::PathSelection => "choose a track",
            Self::VoucherSelection => "choose gift vouchers",
            Self::PostEventUpdate => "report a completed celebration",
        }
    }

    fn from_digit(digit: Digit) -> Option<Self> {
        match digit {
            1 => Some(Self::ReportEvent),
            2 => Some(Self::PathSelection),
            3 => Some(Self::VoucherSelection),
            4 => Some(Self::PostEventUpdate),
            _ => None,
        }
    }
}

/// Which menu branches the caller's event history unlocks. Reporting a new
/// celebration is always on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuAvailability {
    pub path_selection: bool,
    pub voucher_selection: bool,
    pub post_event_update: bool,
}

impl MenuAvailability {
    pub fn from_events(events: &[Event], today: NaiveDate) -> Self {
        Self {
            path_selection: events.iter().any(Event::needs_path),
            voucher_selection: events.iter().any(Event::needs_vouchers),
            post_event_update: events.iter().any(|e| e.awaits_post_update(today)),
        }
    }

    pub fn branches(&self) -> Vec<MenuBranch> {
        let mut branches = vec![MenuBranch::ReportEvent];
        if self.path_selection {
            branches.push(MenuBranch::PathSelection);
        }
        if self.voucher_selection {
            branches.push(MenuBranch::VoucherSelection);
        }
        if self.post_event_update {
            branches.push(MenuBranch::PostEventUpdate);
        }
        branches
    }
}

/// Everything one conversation needs, threaded explicitly through the
/// flows instead of living on mutable handler state.
pub struct SessionContext<'a> {
    pub transport: &'a mut dyn CallTransport,
    pub store: &'a dyn EventStore,
    pub config: &'a IvrConfig,
    pub now: DateTime<Utc>,
}

impl SessionContext<'_> {
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.config.max_attempts,
        }
    }
}

/// Drive one call from greeting to hangup. This is the only entry point;
/// whatever happens inside, the caller hears a terminal message.
pub fn run_session(
    transport: &mut dyn CallTransport,
    store: &dyn EventStore,
    config: &IvrConfig,
    now: DateTime<Utc>,
) {
    let mut ctx = SessionContext {
        transport,
        store,
        config,
        now,
    };

    match drive(&mut ctx) {
        Ok(()) => {}
        Err(FlowInterrupt::Hangup) => {}
        Err(FlowInterrupt::Transport(err)) => {
            tracing::warn!(error = %err, "call lost mid-session");
        }
        Err(FlowInterrupt::Store(err)) => {
            tracing::error!(error = %err, "persistence failure during session");
            if let Err(err) = ctx.transport.terminate(prompts::GENERIC_FAILURE) {
                tracing::warn!(error = %err, "failed to deliver failure message");
            }
        }
    }
}

fn drive(ctx: &mut SessionContext<'_>) -> Result<(), FlowInterrupt> {
    let student = authenticate(ctx)?;
    tracing::info!(student = ?student.id, "caller authenticated");

    let events = ctx.store.events_for_student(student.id)?;
    let menu = MenuAvailability::from_events(&events, ctx.today());
    let branch = present_menu(ctx, &menu)?;
    tracing::info!(?branch, "menu branch chosen");

    match branch {
        MenuBranch::ReportEvent => registration::report_event(ctx, &student),
        MenuBranch::PathSelection => assignment::assign_path(ctx, &student),
        MenuBranch::VoucherSelection => assignment::assign_vouchers(ctx, &student),
        MenuBranch::PostEventUpdate => assignment::post_event_update(ctx, &student),
    }
}

fn authenticate(ctx: &mut SessionContext<'_>) -> Result<Student, FlowInterrupt> {
    let called = ctx.transport.called_number().to_string();
    let Some(account) = ctx.store.account_by_called_number(&called)? else {
        tracing::error!(%called, "no account is mapped to the dialed number");
        ctx.transport.terminate(prompts::GENERIC_FAILURE)?;
        return Err(FlowInterrupt::Hangup);
    };

    ctx.transport.play(&prompts::welcome(&account.name))?;

    let constraints =
        DigitConstraints::numeric(ctx.config.token_min_len, ctx.config.token_max_len);
    let policy = ctx.retry_policy();
    let store = ctx.store;
    let account_id = account.id;

    let student = run_with_retries(
        ctx.transport,
        policy,
        RetryMessages {
            between_attempts: prompts::STUDENT_NOT_FOUND,
            exhausted: prompts::IDENTIFICATION_FAILED,
        },
        |transport| {
            let token = transport.collect_digits(prompts::TOKEN_PROMPT, &constraints)?;
            let found = store.student_by_token(account_id, &token)?;
            if found.is_none() {
                tracing::debug!("no student matched the entered token");
            }
            Ok(found)
        },
    )?;

    ctx.transport.play(&prompts::greeting(&student.name))?;
    Ok(student)
}

fn present_menu(
    ctx: &mut SessionContext<'_>,
    menu: &MenuAvailability,
) -> Result<MenuBranch, FlowInterrupt> {
    let branches = menu.branches();

    let mut prompt = prompts::MENU_INTRO.to_string();
    for branch in &branches {
        prompt.push(' ');
        prompt.push_str(&prompts::menu_option(branch.label(), branch.digit()));
    }

    let constraints =
        DigitConstraints::exactly_one_of(branches.iter().map(|branch| branch.digit()));
    let reply = ctx.transport.collect_digits(&prompt, &constraints)?;

    let digit = reply
        .parse::<Digit>()
        .map_err(|_| TransportError::Protocol(format!("menu reply '{reply}' is not a digit")))?;
    let branch = MenuBranch::from_digit(digit)
        .filter(|branch| branches.contains(branch))
        .ok_or_else(|| {
            TransportError::Protocol(format!("menu digit {digit} passed transport filtering"))
        })?;

    ctx.transport.play(&prompts::branch_chosen(branch.label()))?;
    Ok(branch)
}
