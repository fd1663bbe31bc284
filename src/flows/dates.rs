//! Collects a celebration date as two keypad entries, day then month, and
//! resolves them to a civil date. Callers frequently report a date that
//! already rolled past the civil-year boundary, so a result falling far
//! enough in the past is reinterpreted in next year's calendar.

use super::retry::{run_with_retries, RetryMessages, RetryPolicy};
use super::FlowInterrupt;
use crate::prompts;
use crate::transport::{CallTransport, DigitConstraints};
use chrono::{Datelike, NaiveDate};

/// Apply the year-rollover policy to a keypad day/month pair.
///
/// The pair is first read in `today`'s year. If that date lies more than
/// `grace_days` before `today`, the caller is assumed to mean the upcoming
/// occurrence and the pair is re-read in the next year. `None` means the
/// pair forms no real date in the chosen year (such as February 30th).
pub(crate) fn resolve_civil_date(
    day: u32,
    month: u32,
    today: NaiveDate,
    grace_days: i64,
) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if today.signed_duration_since(this_year).num_days() > grace_days {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

fn collect_number(
    transport: &mut dyn CallTransport,
    prompt: &str,
    max: u32,
) -> Result<Option<u32>, FlowInterrupt> {
    let reply = transport.collect_digits(prompt, &DigitConstraints::numeric(1, 2))?;
    match reply.parse::<u32>() {
        Ok(value) if (1..=max).contains(&value) => Ok(Some(value)),
        _ => Ok(None),
    }
}

/// Run the full date sub-flow: collect day and month, resolve with the
/// rollover policy, and read the result back for confirmation. Out-of-range
/// entries, impossible dates, and declined confirmations all consume one
/// attempt from the shared budget.
pub fn collect_event_date(
    transport: &mut dyn CallTransport,
    policy: RetryPolicy,
    today: NaiveDate,
    grace_days: i64,
) -> Result<NaiveDate, FlowInterrupt> {
    let messages = RetryMessages {
        between_attempts: prompts::DATE_NOT_RECOGNIZED,
        exhausted: prompts::MAX_ATTEMPTS_REACHED,
    };

    run_with_retries(transport, policy, messages, |transport| {
        let Some(day) = collect_number(transport, prompts::DAY_PROMPT, 31)? else {
            return Ok(None);
        };
        let Some(month) = collect_number(transport, &prompts::month_prompt(), 12)? else {
            return Ok(None);
        };
        let Some(date) = resolve_civil_date(day, month, today, grace_days) else {
            return Ok(None);
        };

        let month_name = prompts::MONTH_NAMES[date.month0() as usize];
        let readback = prompts::confirm_date(date.day(), month_name, date.year());
        if !transport.confirm(&readback, prompts::YES_CONFIRM, prompts::NO_RETRY)? {
            return Ok(None);
        }
        Ok(Some(date))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ScriptedTransport;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn recent_past_date_stays_in_the_current_year() {
        let today = date(2026, 3, 15);
        let resolved = resolve_civil_date(1, 3, today, 30).expect("resolves");
        assert_eq!(resolved, date(2026, 3, 1));
    }

    #[test]
    fn date_beyond_the_grace_window_rolls_into_next_year() {
        // January 1st reported in mid-March is long past the grace window.
        let today = date(2026, 3, 15);
        let resolved = resolve_civil_date(1, 1, today, 30).expect("resolves");
        assert_eq!(resolved, date(2027, 1, 1));
    }

    #[test]
    fn boundary_day_does_not_roll() {
        let today = date(2026, 3, 31);
        let resolved = resolve_civil_date(1, 3, today, 30).expect("resolves");
        assert_eq!(resolved, date(2026, 3, 1));
    }

    #[test]
    fn impossible_dates_resolve_to_nothing() {
        let today = date(2026, 3, 15);
        assert_eq!(resolve_civil_date(30, 2, today, 30), None);
        assert_eq!(resolve_civil_date(31, 4, today, 30), None);
    }

    #[test]
    fn full_sub_flow_confirms_the_resolved_date() {
        let today = date(2026, 3, 15);
        let mut transport = ScriptedTransport::new("100", &["1", "1", "1"]);
        let resolved =
            collect_event_date(&mut transport, RetryPolicy::default(), today, 30)
                .expect("date collected");
        assert_eq!(resolved, date(2027, 1, 1));
        assert!(transport
            .transcript()
            .iter()
            .any(|entry| format!("{entry:?}").contains("January 1, 2027")));
    }

    #[test]
    fn month_collection_reads_out_the_calendar_months() {
        let today = date(2026, 3, 15);
        let mut transport = ScriptedTransport::new("100", &["14", "5", "1"]);
        collect_event_date(&mut transport, RetryPolicy::default(), today, 30)
            .expect("date collected");

        let month_entry = transport.collected()[1];
        let crate::transport::TranscriptEntry::Collected { prompt, .. } = month_entry else {
            panic!("expected a collected entry");
        };
        assert!(prompt.contains("For January, press 1."));
        assert!(prompt.contains("For December, press 12."));
    }

    #[test]
    fn out_of_range_day_consumes_an_attempt() {
        let today = date(2026, 3, 15);
        // "32" is in-charset but out of range; second attempt succeeds.
        let mut transport = ScriptedTransport::new("100", &["32", "10", "3", "1"]);
        let resolved =
            collect_event_date(&mut transport, RetryPolicy::default(), today, 30)
                .expect("date collected");
        assert_eq!(resolved, date(2026, 3, 10));
        assert!(transport
            .played_messages()
            .contains(&prompts::DATE_NOT_RECOGNIZED));
    }

    #[test]
    fn persistent_bad_dates_exhaust_the_budget() {
        let today = date(2026, 3, 15);
        let mut transport = ScriptedTransport::new("100", &["32", "33", "34"]);
        let result = collect_event_date(&mut transport, RetryPolicy::default(), today, 30);
        assert!(matches!(result, Err(FlowInterrupt::Hangup)));
        assert_eq!(
            transport.terminal_message(),
            Some(prompts::MAX_ATTEMPTS_REACHED)
        );
    }
}
