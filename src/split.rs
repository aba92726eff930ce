//! Split policies: turning a [`SplitRequest`] into allocations that add up to
//! the expense amount.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::domain::{Error, Money, Participant, ParticipantId, Split, SplitRequest};

/// Divides `amount` into equal cent shares. Shares are cut down to whole cents
/// and the leftover cents go to the first participant, so the shares always sum
/// to `amount` exactly and none of them is negative.
pub fn equal_split(amount: Money, participants: &[ParticipantId]) -> Result<Vec<Split>, Error> {
    if participants.is_empty() {
        return Err(Error::Validation(
            "Cannot split an expense among zero participants".to_string(),
        ));
    }
    ensure_unique(participants.iter())?;

    let share = Money::new(amount.amount() / Decimal::from(participants.len())).truncate_cents();
    let splits = participants
        .iter()
        .map(|id| Split::new(id.clone(), share))
        .collect();

    Ok(reconcile(amount, splits))
}

/// Accepts caller-chosen amounts when they add up to `amount` within one cent.
pub fn custom_split(
    amount: Money,
    allocations: &[(ParticipantId, Money)],
) -> Result<Vec<Split>, Error> {
    ensure_unique(allocations.iter().map(|(id, _)| id))?;

    let splits: Vec<Split> = allocations
        .iter()
        .map(|(id, share)| Split::new(id.clone(), *share))
        .collect();

    validate_splits(amount, &splits)?;
    Ok(splits)
}

/// Splits `amount` by percentages that must add up to 100.
pub fn percentage_split(
    amount: Money,
    percentages: &[(ParticipantId, Decimal)],
) -> Result<Vec<Split>, Error> {
    if percentages.is_empty() {
        return Err(Error::Validation(
            "Cannot split an expense among zero participants".to_string(),
        ));
    }
    ensure_unique(percentages.iter().map(|(id, _)| id))?;

    if let Some((id, pct)) = percentages.iter().find(|(_, pct)| pct.is_sign_negative()) {
        return Err(Error::Validation(format!(
            "Percentage for {} must not be negative, got {}",
            id, pct
        )));
    }

    let total: Decimal = percentages.iter().map(|(_, pct)| *pct).sum();
    if (total - Decimal::ONE_HUNDRED).abs() > Money::TOLERANCE.amount() {
        return Err(Error::Validation(format!(
            "The percentages ({}) must add up to 100",
            total
        )));
    }

    let splits = percentages
        .iter()
        .map(|(id, pct)| {
            let share = Money::new(amount.amount() * *pct / Decimal::ONE_HUNDRED).truncate_cents();
            Split::new(id.clone(), share)
        })
        .collect();

    Ok(reconcile(amount, splits))
}

/// Resolves a request against the participants of a bill. An equal request
/// with no explicit participants covers everyone on the bill.
pub fn resolve(
    amount: Money,
    request: &SplitRequest,
    participants: &[Participant],
) -> Result<Vec<Split>, Error> {
    match request {
        SplitRequest::Equal(among) if among.is_empty() => {
            let everyone: Vec<ParticipantId> = participants.iter().map(|p| p.id.clone()).collect();
            equal_split(amount, &everyone)
        }
        SplitRequest::Equal(among) => equal_split(amount, among),
        SplitRequest::Custom(allocations) => custom_split(amount, allocations),
        SplitRequest::Percentage(percentages) => percentage_split(amount, percentages),
    }
}

/// Checks that no share is negative or out of range and that the shares sum
/// to `amount` within [`Money::TOLERANCE`].
pub fn validate_splits(amount: Money, splits: &[Split]) -> Result<(), Error> {
    if let Some(split) = splits.iter().find(|s| s.amount.is_negative()) {
        return Err(Error::Validation(format!(
            "Split amount for {} must not be negative, got {}",
            split.participant_id, split.amount
        )));
    }
    if let Some(split) = splits.iter().find(|s| !s.amount.in_range()) {
        return Err(Error::Validation(format!(
            "Split amount for {} exceeds the maximum of {}",
            split.participant_id,
            Money::MAX
        )));
    }

    let total: Money = splits.iter().map(|s| s.amount).sum();
    if !total.approx_eq(amount) {
        return Err(Error::Validation(format!(
            "The sum of splits ({}) must equal the expense amount ({})",
            total, amount
        )));
    }

    Ok(())
}

fn reconcile(amount: Money, mut splits: Vec<Split>) -> Vec<Split> {
    let allocated: Money = splits.iter().map(|s| s.amount).sum();
    let remainder = amount - allocated;
    if let Some(first) = splits.first_mut() {
        first.amount += remainder;
    }
    splits
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a ParticipantId>) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::Validation(format!(
                "Participant {} appears more than once in the split",
                id
            )));
        }
    }
    Ok(())
}
