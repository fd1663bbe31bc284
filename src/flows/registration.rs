//! Reporting a brand-new celebration: occasion, date, optional vouchers,
//! then one atomic write.

use super::selection::{select_many, select_one, AutoSelect};
use super::session::SessionContext;
use super::{dates, FlowInterrupt};
use crate::domain::{Digit, Student};
use crate::prompts;
use crate::store::EventDraft;

pub(crate) fn report_event(
    ctx: &mut SessionContext<'_>,
    student: &Student,
) -> Result<(), FlowInterrupt> {
    let types = ctx.store.selectable_event_types(student.account_id)?;
    // The caller must always state the occasion out loud, even when the
    // account offers only one.
    let event_type = select_one(
        ctx.transport,
        prompts::EVENT_TYPE_INTRO,
        &types,
        AutoSelect::Disabled,
    )?;

    let policy = ctx.retry_policy();
    let today = ctx.today();
    let event_date = dates::collect_event_date(
        ctx.transport,
        policy,
        today,
        ctx.config.rollover_grace_days,
    )?;

    // Duplicate prevention is a lookup followed by a separate insert; two
    // concurrent calls can race past it. Accepted limitation.
    if let Some(existing) = ctx
        .store
        .find_event(student.id, event_type.key, event_date)?
    {
        tracing::info!(event = ?existing.id, "duplicate celebration report refused");
        ctx.transport
            .terminate(&prompts::duplicate_event(&ctx.config.support_number))?;
        return Err(FlowInterrupt::Hangup);
    }

    let gifts = offer_vouchers(ctx, student)?;

    let draft = EventDraft {
        student_id: student.id,
        event_type: event_type.key,
        event_date,
        gifts,
    };
    match ctx.store.create_event(draft) {
        Ok(event) => {
            tracing::info!(event = ?event.id, date = %event.event_date, "celebration recorded");
            ctx.transport.terminate(prompts::REGISTRATION_DONE)?;
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "celebration registration rolled back");
            ctx.transport.terminate(prompts::REGISTRATION_FAILED)?;
            Err(FlowInterrupt::Hangup)
        }
    }
}

fn offer_vouchers(
    ctx: &mut SessionContext<'_>,
    student: &Student,
) -> Result<Vec<Digit>, FlowInterrupt> {
    let wants_vouchers = ctx.transport.confirm(
        prompts::OFFER_VOUCHERS,
        prompts::YES_CONTINUE,
        prompts::NO_GO_BACK,
    )?;
    if !wants_vouchers {
        return Ok(Vec::new());
    }

    let store = ctx.store;
    let account_id = student.account_id;
    let policy = ctx.retry_policy();
    let mut load_gifts = move || store.selectable_gifts(account_id);
    let picked = select_many(
        ctx.transport,
        prompts::GIFT_INTRO,
        &mut load_gifts,
        ctx.config.max_vouchers,
        policy,
    )?;
    Ok(picked.into_iter().map(|item| item.key).collect())
}
