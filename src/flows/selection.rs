//! Drives every keyed choice a caller makes. One engine serves menus of
//! event types, tracks, vouchers, and the caller's own celebrations; the
//! allowed keypad set is always exactly the keys on offer, so malformed
//! input cannot reach this code.

use super::retry::{run_with_retries, RetryMessages, RetryPolicy};
use super::FlowInterrupt;
use crate::domain::{CatalogItem, Digit};
use crate::prompts;
use crate::store::StoreError;
use crate::transport::{CallTransport, DigitConstraints, TransportError};

/// Digit reserved for "I am done picking" in multi-selection. Catalog keys
/// stay within 1-9, so it never collides.
pub const FINISH_KEY: Digit = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSelect {
    /// A list of exactly one item is taken without prompting.
    Singleton,
    /// The caller always picks explicitly, even from a list of one.
    Disabled,
}

fn parse_key(reply: &str) -> Result<Digit, TransportError> {
    match reply.as_bytes() {
        [digit @ b'0'..=b'9'] => Ok(*digit - b'0'),
        _ => Err(TransportError::Protocol(format!(
            "expected a single digit, got '{reply}'"
        ))),
    }
}

fn menu_prompt(intro: &str, items: &[CatalogItem]) -> String {
    let mut prompt = intro.to_string();
    for item in items {
        prompt.push(' ');
        prompt.push_str(&prompts::option_line(item));
    }
    prompt
}

/// Let the caller pick exactly one item.
///
/// An empty list is terminal: the caller hears the no-options message and
/// the call ends without any prompt. The auto-selected announcement is
/// distinct from the manual-pick one.
pub fn select_one(
    transport: &mut dyn CallTransport,
    intro: &str,
    items: &[CatalogItem],
    auto_select: AutoSelect,
) -> Result<CatalogItem, FlowInterrupt> {
    match items {
        [] => {
            tracing::info!(intro, "no selectable items, ending call");
            transport.terminate(prompts::NO_OPTIONS)?;
            Err(FlowInterrupt::Hangup)
        }
        [only] if auto_select == AutoSelect::Singleton => {
            transport.play(&prompts::auto_selected(&only.name))?;
            Ok(only.clone())
        }
        _ => {
            let constraints = DigitConstraints::exactly_one_of(items.iter().map(|i| i.key));
            let reply = transport.collect_digits(&menu_prompt(intro, items), &constraints)?;
            let key = parse_key(&reply)?;
            let item = items
                .iter()
                .find(|i| i.key == key)
                .ok_or_else(|| {
                    TransportError::Protocol(format!("digit {key} passed transport filtering"))
                })?
                .clone();
            transport.play(&prompts::picked(&item.name))?;
            Ok(item)
        }
    }
}

/// Let the caller pick up to `max_selections` distinct items.
///
/// Items are fetched fresh from `load_items` on every pass. Picking stops
/// at the finish key or the cap; finishing with nothing selected requires
/// an explicit yes. The confirmed set is then read back and, after an
/// irrevocability warning, confirmed once more. Declining either stage
/// clears the picks and restarts, bounded by the shared attempt budget.
pub fn select_many(
    transport: &mut dyn CallTransport,
    intro: &str,
    load_items: &mut dyn FnMut() -> Result<Vec<CatalogItem>, StoreError>,
    max_selections: usize,
    policy: RetryPolicy,
) -> Result<Vec<CatalogItem>, FlowInterrupt> {
    let messages = RetryMessages {
        between_attempts: prompts::SELECTION_RESTART,
        exhausted: prompts::MAX_ATTEMPTS_REACHED,
    };

    run_with_retries(transport, policy, messages, |transport| {
        let picked = pick_loop(transport, intro, load_items, max_selections)?;
        if picked.is_empty() {
            // The caller already confirmed proceeding with nothing; there is
            // no selection to read back or warn about.
            return Ok(Some(picked));
        }

        let names: Vec<&str> = picked.iter().map(|item| item.name.as_str()).collect();
        let recap = prompts::selection_recap(&names);
        if !transport.confirm(&recap, prompts::YES_CONFIRM, prompts::NO_RETRY)? {
            return Ok(None);
        }
        if !transport.confirm(
            prompts::SELECTION_FINAL_WARNING,
            prompts::YES_CONFIRM,
            prompts::NO_RETRY,
        )? {
            return Ok(None);
        }

        Ok(Some(picked))
    })
}

fn pick_loop(
    transport: &mut dyn CallTransport,
    intro: &str,
    load_items: &mut dyn FnMut() -> Result<Vec<CatalogItem>, StoreError>,
    max_selections: usize,
) -> Result<Vec<CatalogItem>, FlowInterrupt> {
    let mut picked: Vec<CatalogItem> = Vec::new();

    loop {
        let remaining: Vec<CatalogItem> = load_items()?
            .into_iter()
            .filter(|item| picked.iter().all(|p| p.key != item.key))
            .collect();

        if picked.is_empty() && remaining.is_empty() {
            tracing::info!(intro, "no selectable items, ending call");
            transport.terminate(prompts::NO_OPTIONS)?;
            return Err(FlowInterrupt::Hangup);
        }
        if remaining.is_empty() || picked.len() >= max_selections {
            return Ok(picked);
        }

        let mut prompt = menu_prompt(intro, &remaining);
        prompt.push(' ');
        prompt.push_str(&prompts::finish_option(FINISH_KEY));
        let keys = remaining
            .iter()
            .map(|i| i.key)
            .chain(std::iter::once(FINISH_KEY));
        let reply = transport.collect_digits(&prompt, &DigitConstraints::exactly_one_of(keys))?;
        let key = parse_key(&reply)?;

        if key == FINISH_KEY {
            if picked.is_empty()
                && !transport.confirm(
                    prompts::CONFIRM_EMPTY_SELECTION,
                    prompts::YES_CONTINUE,
                    prompts::NO_GO_BACK,
                )?
            {
                continue;
            }
            return Ok(picked);
        }

        let item = remaining
            .iter()
            .find(|i| i.key == key)
            .ok_or_else(|| {
                TransportError::Protocol(format!("digit {key} passed transport filtering"))
            })?
            .clone();
        transport.play(&prompts::picked(&item.name))?;
        picked.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{AllowedDigits, ScriptedTransport, TranscriptEntry};

    fn gifts() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new(1, "Book voucher"),
            CatalogItem::new(2, "Game voucher"),
            CatalogItem::new(4, "Trip voucher"),
        ]
    }

    fn collect_constraints(transport: &ScriptedTransport) -> Vec<&DigitConstraints> {
        transport
            .transcript()
            .iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Collected { constraints, .. } => Some(constraints),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn allowed_digits_are_exactly_the_item_keys() {
        let mut transport = ScriptedTransport::new("100", &["4"]);
        let item = select_one(&mut transport, "Pick.", &gifts(), AutoSelect::Disabled)
            .expect("selection succeeds");
        assert_eq!(item.key, 4);

        let constraints = collect_constraints(&transport);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].min_len, 1);
        assert_eq!(constraints[0].max_len, 1);
        assert_eq!(constraints[0].allowed, AllowedDigits::Set(vec![1, 2, 4]));
    }

    #[test]
    fn singleton_auto_selects_with_zero_digit_reads() {
        let items = vec![CatalogItem::new(3, "Bar Mitzvah")];
        let mut transport = ScriptedTransport::new("100", &[]);
        let item = select_one(&mut transport, "Pick.", &items, AutoSelect::Singleton)
            .expect("auto-selected");
        assert_eq!(item.key, 3);
        assert!(transport.collected().is_empty());
        assert_eq!(
            transport.played_messages(),
            vec![prompts::auto_selected("Bar Mitzvah")]
        );
    }

    #[test]
    fn singleton_with_auto_select_disabled_still_prompts() {
        let items = vec![CatalogItem::new(3, "Bar Mitzvah")];
        let mut transport = ScriptedTransport::new("100", &["3"]);
        let item = select_one(&mut transport, "Pick.", &items, AutoSelect::Disabled)
            .expect("explicit pick");
        assert_eq!(item.key, 3);
        assert_eq!(transport.collected().len(), 1);
    }

    #[test]
    fn empty_list_terminates_without_prompting() {
        let mut transport = ScriptedTransport::new("100", &[]);
        let result = select_one(&mut transport, "Pick.", &[], AutoSelect::Singleton);
        assert!(matches!(result, Err(FlowInterrupt::Hangup)));
        assert_eq!(transport.terminal_message(), Some(prompts::NO_OPTIONS));
        assert!(transport.collected().is_empty());
    }

    #[test]
    fn multi_pick_caps_selections_and_confirms() {
        // Two picks hit the cap; no finish key needed. Then recap + warning.
        let mut transport = ScriptedTransport::new("100", &["1", "2", "1", "1"]);
        let mut loader = || Ok(gifts());
        let picked = select_many(
            &mut transport,
            "Pick vouchers.",
            &mut loader,
            2,
            RetryPolicy::default(),
        )
        .expect("selection succeeds");

        let keys: Vec<Digit> = picked.iter().map(|i| i.key).collect();
        assert_eq!(keys, vec![1, 2]);
    }

    #[test]
    fn multi_pick_excludes_already_picked_items() {
        let mut transport = ScriptedTransport::new("100", &["2", "4", "0", "1", "1"]);
        let mut loader = || Ok(gifts());
        let picked = select_many(
            &mut transport,
            "Pick vouchers.",
            &mut loader,
            3,
            RetryPolicy::default(),
        )
        .expect("selection succeeds");

        let keys: Vec<Digit> = picked.iter().map(|i| i.key).collect();
        assert_eq!(keys, vec![2, 4]);

        // The second collection no longer offers key 2.
        let constraints = collect_constraints(&transport);
        assert_eq!(
            constraints[1].allowed,
            AllowedDigits::Set(vec![1, 4, FINISH_KEY])
        );
    }

    #[test]
    fn finishing_empty_requires_explicit_confirmation() {
        // Finish immediately, decline the empty confirm, pick one, finish,
        // then pass both confirmation stages.
        let mut transport = ScriptedTransport::new("100", &["0", "2", "1", "0", "1", "1"]);
        let mut loader = || Ok(gifts());
        let picked = select_many(
            &mut transport,
            "Pick vouchers.",
            &mut loader,
            3,
            RetryPolicy::default(),
        )
        .expect("selection succeeds");
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn confirmed_empty_selection_returns_no_items() {
        let mut transport = ScriptedTransport::new("100", &["0", "1"]);
        let mut loader = || Ok(gifts());
        let picked = select_many(
            &mut transport,
            "Pick vouchers.",
            &mut loader,
            3,
            RetryPolicy::default(),
        )
        .expect("selection succeeds");
        assert!(picked.is_empty());
    }

    #[test]
    fn declining_the_recap_restarts_with_cleared_picks() {
        // Attempt 1: pick 1, finish, decline recap. Attempt 2 (after the
        // restart message): pick 2, finish, confirm both stages.
        let mut transport =
            ScriptedTransport::new("100", &["1", "0", "2", "2", "0", "1", "1"]);
        let mut loader = || Ok(gifts());
        let picked = select_many(
            &mut transport,
            "Pick vouchers.",
            &mut loader,
            3,
            RetryPolicy::default(),
        )
        .expect("selection succeeds");

        let keys: Vec<Digit> = picked.iter().map(|i| i.key).collect();
        assert_eq!(keys, vec![2]);
        assert!(transport
            .played_messages()
            .contains(&prompts::SELECTION_RESTART));
    }

    #[test]
    fn declining_every_confirmation_exhausts_the_budget() {
        // Three attempts, each picking item 1 and declining the recap.
        let mut transport = ScriptedTransport::new(
            "100",
            &["1", "0", "2", "1", "0", "2", "1", "0", "2"],
        );
        let mut loader = || Ok(gifts());
        let result = select_many(
            &mut transport,
            "Pick vouchers.",
            &mut loader,
            3,
            RetryPolicy::default(),
        );

        assert!(matches!(result, Err(FlowInterrupt::Hangup)));
        assert_eq!(
            transport.terminal_message(),
            Some(prompts::MAX_ATTEMPTS_REACHED)
        );
    }
}
