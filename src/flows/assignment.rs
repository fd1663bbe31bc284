//! The three flows that mutate an existing celebration in place: track
//! assignment, voucher attachment, and the post-event completion report.
//! Each picks its target from the eligible subset of the caller's history,
//! auto-selecting when only one celebration qualifies.

use super::selection::{select_many, select_one, AutoSelect};
use super::session::SessionContext;
use super::FlowInterrupt;
use crate::domain::{CatalogItem, Digit, Event, Student};
use crate::prompts;
use crate::store::EventChange;
use chrono::Datelike;

/// Selection keys are single digits, so at most nine eligible celebrations
/// can be offered at once.
const MAX_OFFERED_EVENTS: usize = 9;

fn event_menu_items(events: &[Event], type_names: &[CatalogItem]) -> Vec<CatalogItem> {
    events
        .iter()
        .take(MAX_OFFERED_EVENTS)
        .enumerate()
        .map(|(index, event)| {
            let type_name = type_names
                .iter()
                .find(|item| item.key == event.event_type)
                .map(|item| item.name.as_str())
                .unwrap_or("celebration");
            let month_name = prompts::MONTH_NAMES[event.event_date.month0() as usize];
            CatalogItem::new(
                (index + 1) as Digit,
                prompts::event_label(type_name, event.event_date.day(), month_name),
            )
        })
        .collect()
}

/// Pick one celebration out of the caller's eligible subset. The digit keys
/// are positional and ephemeral to this session.
fn pick_eligible_event(
    ctx: &mut SessionContext<'_>,
    student: &Student,
    intro: &'static str,
    eligible: impl Fn(&Event) -> bool,
) -> Result<Event, FlowInterrupt> {
    let mut events: Vec<Event> = ctx
        .store
        .events_for_student(student.id)?
        .into_iter()
        .filter(|event| eligible(event))
        .collect();
    if events.len() > MAX_OFFERED_EVENTS {
        tracing::warn!(
            total = events.len(),
            offered = MAX_OFFERED_EVENTS,
            "truncating eligible celebrations to the keypad range"
        );
        events.truncate(MAX_OFFERED_EVENTS);
    }

    let type_names = ctx.store.selectable_event_types(student.account_id)?;
    let items = event_menu_items(&events, &type_names);
    let chosen = select_one(ctx.transport, intro, &items, AutoSelect::Singleton)?;

    Ok(events[(chosen.key - 1) as usize].clone())
}

pub(crate) fn assign_path(
    ctx: &mut SessionContext<'_>,
    student: &Student,
) -> Result<(), FlowInterrupt> {
    let event = pick_eligible_event(ctx, student, prompts::PICK_EVENT_FOR_PATH, Event::needs_path)?;

    let paths = ctx.store.selectable_paths(student.account_id)?;
    let path = select_one(
        ctx.transport,
        prompts::PATH_INTRO,
        &paths,
        AutoSelect::Disabled,
    )?;

    let updated = ctx
        .store
        .update_event(event.id, EventChange::AssignPath(path.key))?;
    tracing::info!(event = ?updated.id, path = path.key, "track assigned");
    ctx.transport.terminate(&prompts::path_recorded(&path.name))?;
    Ok(())
}

pub(crate) fn assign_vouchers(
    ctx: &mut SessionContext<'_>,
    student: &Student,
) -> Result<(), FlowInterrupt> {
    let event = pick_eligible_event(
        ctx,
        student,
        prompts::PICK_EVENT_FOR_VOUCHERS,
        Event::needs_vouchers,
    )?;

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

    if picked.is_empty() {
        // The caller confirmed leaving empty-handed; the event stays
        // eligible for a later call.
        ctx.transport.terminate(prompts::NO_VOUCHERS_CHOSEN)?;
        return Ok(());
    }

    let gifts: Vec<Digit> = picked.iter().map(|item| item.key).collect();
    let updated = ctx
        .store
        .update_event(event.id, EventChange::AssignGifts(gifts))?;
    tracing::info!(event = ?updated.id, count = picked.len(), "vouchers attached");
    ctx.transport.terminate(prompts::VOUCHERS_RECORDED)?;
    Ok(())
}

pub(crate) fn post_event_update(
    ctx: &mut SessionContext<'_>,
    student: &Student,
) -> Result<(), FlowInterrupt> {
    let today = ctx.today();
    let event = pick_eligible_event(ctx, student, prompts::PICK_EVENT_FOR_UPDATE, |event| {
        event.awaits_post_update(today)
    })?;

    let paths = ctx.store.selectable_paths(student.account_id)?;
    let completed = select_one(
        ctx.transport,
        prompts::COMPLETED_PATH_INTRO,
        &paths,
        AutoSelect::Disabled,
    )?;

    let updated = ctx.store.update_event(
        event.id,
        EventChange::Complete {
            completed_path: completed.key,
            completed_at: ctx.now,
        },
    )?;
    tracing::info!(event = ?updated.id, path = completed.key, "celebration completed");
    ctx.transport.terminate(prompts::COMPLETION_RECORDED)?;
    Ok(())
}
