//! Balance computation for a bill.
//!
//! Balances are never updated incrementally: every call rebuilds `paid` and
//! `owes` for all participants from the full expense list.

use crate::domain::{Expense, ExpenseId, Participant, ParticipantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRole {
    Payer,
    Split,
}

/// An expense pointing at a participant that is not part of the bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub expense_id: ExpenseId,
    pub participant_id: ParticipantId,
    pub role: ReferenceRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recomputation {
    pub participants: Vec<Participant>,
    pub dangling: Vec<DanglingReference>,
}

/// Returns a copy of `participants` with `paid` and `owes` rebuilt from `expenses`.
///
/// References to unknown participants are skipped.
pub fn recompute(participants: &[Participant], expenses: &[Expense]) -> Vec<Participant> {
    recompute_with_diagnostics(participants, expenses).participants
}

/// Same as [`recompute`], but also lists every reference that had to be skipped.
pub fn recompute_with_diagnostics(
    participants: &[Participant],
    expenses: &[Expense],
) -> Recomputation {
    let mut participants = participants.to_vec();
    let mut dangling = Vec::new();

    participants.iter_mut().for_each(Participant::reset_balance);

    for expense in expenses {
        match participants.iter_mut().find(|p| p.id == expense.paid_by) {
            Some(payer) => payer.paid = payer.paid.saturating_add(expense.amount),
            None => dangling.push(DanglingReference {
                expense_id: expense.id.clone(),
                participant_id: expense.paid_by.clone(),
                role: ReferenceRole::Payer,
            }),
        }

        for split in &expense.splits {
            match participants
                .iter_mut()
                .find(|p| p.id == split.participant_id)
            {
                Some(participant) => {
                    participant.owes = participant.owes.saturating_add(split.amount)
                }
                None => dangling.push(DanglingReference {
                    expense_id: expense.id.clone(),
                    participant_id: split.participant_id.clone(),
                    role: ReferenceRole::Split,
                }),
            }
        }
    }

    Recomputation {
        participants,
        dangling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Money, Split, SplitKind};
    use crate::split::equal_split;

    fn trio() -> Vec<Participant> {
        vec![
            Participant::new("p1", "Ana"),
            Participant::new("p2", "Ben"),
            Participant::new("p3", "Cy"),
        ]
    }

    fn ids(participants: &[Participant]) -> Vec<String> {
        participants.iter().map(|p| p.id.clone()).collect()
    }

    fn equal_expense(id: &str, cents: i64, payer: &str, among: &[Participant]) -> Expense {
        let amount = Money::from_cents(cents);
        Expense {
            id: id.to_string(),
            description: id.to_string(),
            amount,
            paid_by: payer.to_string(),
            split_kind: SplitKind::Equal,
            splits: equal_split(amount, &ids(among)).unwrap(),
        }
    }

    #[test]
    fn no_expenses_means_zero_balances() {
        let mut participants = trio();
        participants[0].paid = Money::from_cents(999);
        participants[1].owes = Money::from_cents(123);

        let out = recompute(&participants, &[]);

        assert_eq!(ids(&out), ids(&participants));
        assert!(out.iter().all(|p| p.paid.is_zero() && p.owes.is_zero()));
    }

    #[test]
    fn dinner_split_three_ways() {
        let participants = trio();
        let dinner = equal_expense("dinner", 150_00, "p1", &participants);

        let out = recompute(&participants, &[dinner]);

        assert_eq!(out[0].paid, Money::from_cents(150_00));
        assert_eq!(out[1].paid, Money::ZERO);
        assert_eq!(out[2].paid, Money::ZERO);
        for p in &out {
            assert_eq!(p.owes, Money::from_cents(50_00));
        }
        assert_eq!(out[0].balance(), Money::from_cents(100_00));
        assert_eq!(out[1].balance(), Money::from_cents(-50_00));
    }

    #[test]
    fn owes_add_up_to_the_expense() {
        let participants = trio();
        let groceries = equal_expense("groceries", 100_00, "p2", &participants);

        let out = recompute(&participants, &[groceries]);
        let owed: Money = out.iter().map(|p| p.owes).sum();

        assert_eq!(out[1].paid, Money::from_cents(100_00));
        assert!(owed.approx_eq(Money::from_cents(100_00)));
    }

    #[test]
    fn recompute_is_idempotent() {
        let participants = trio();
        let expenses = vec![
            equal_expense("cabin", 150_00, "p1", &participants),
            equal_expense("fuel", 61_10, "p3", &participants[1..]),
        ];

        let first = recompute(&participants, &expenses);
        let second = recompute(&first, &expenses);

        assert_eq!(first, second);
    }

    #[test]
    fn dropping_an_expense_restores_balances() {
        let participants = trio();
        let cabin = equal_expense("cabin", 150_00, "p1", &participants);
        let taxi = equal_expense("taxi", 42_50, "p2", &participants);

        let before = recompute(&participants, std::slice::from_ref(&cabin));
        let with_taxi = recompute(&before, &[cabin.clone(), taxi]);
        let after = recompute(&with_taxi, &[cabin]);

        assert_ne!(before, with_taxi);
        assert_eq!(before, after);
    }

    #[test]
    fn huge_hand_built_amounts_saturate_instead_of_panicking() {
        let participants = trio();
        let huge = Money::new(rust_decimal::Decimal::MAX);
        let expense = |id: &str| Expense {
            id: id.to_string(),
            description: id.to_string(),
            amount: huge,
            paid_by: "p1".to_string(),
            split_kind: SplitKind::Custom,
            splits: vec![Split::new("p2", huge)],
        };

        let out = recompute(&participants, &[expense("a"), expense("b")]);

        assert_eq!(out[0].paid, huge);
        assert_eq!(out[1].owes, huge);
    }

    #[test]
    fn dangling_references_are_skipped_and_reported() {
        let participants = trio();
        let expense = Expense {
            id: "ghost".to_string(),
            description: "ghost".to_string(),
            amount: Money::from_cents(20_00),
            paid_by: "nobody".to_string(),
            split_kind: SplitKind::Custom,
            splits: vec![
                Split::new("p1", Money::from_cents(10_00)),
                Split::new("p9", Money::from_cents(10_00)),
            ],
        };

        let result = recompute_with_diagnostics(&participants, &[expense]);

        assert!(result.participants.iter().all(|p| p.paid.is_zero()));
        assert_eq!(result.participants[0].owes, Money::from_cents(10_00));
        assert_eq!(
            result.dangling,
            vec![
                DanglingReference {
                    expense_id: "ghost".to_string(),
                    participant_id: "nobody".to_string(),
                    role: ReferenceRole::Payer,
                },
                DanglingReference {
                    expense_id: "ghost".to_string(),
                    participant_id: "p9".to_string(),
                    role: ReferenceRole::Split,
                },
            ]
        );
    }
}
