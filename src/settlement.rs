//! Turns net balances into the payments that settle a bill.

use crate::domain::{Money, Participant, ParticipantId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

#[derive(Debug, Clone)]
struct Position {
    id: ParticipantId,
    amount: Money,
}

/// Greedy settlement: the largest debtor pays the largest creditor until one
/// side is cleared, then repeat. Balances within a cent count as settled.
pub fn settle(participants: &[Participant]) -> Vec<Transfer> {
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();

    for participant in participants {
        let balance = participant.balance().round_cents();
        if balance.abs() < Money::TOLERANCE {
            continue;
        }
        let position = Position {
            id: participant.id.clone(),
            amount: balance.abs(),
        };
        if balance.is_negative() {
            debtors.push(position);
        } else {
            creditors.push(position);
        }
    }

    // ascending, so the largest sits at the end; on ties the smaller id goes first
    debtors.sort_by(|a, b| a.amount.cmp(&b.amount).then_with(|| b.id.cmp(&a.id)));
    creditors.sort_by(|a, b| a.amount.cmp(&b.amount).then_with(|| b.id.cmp(&a.id)));

    let mut transfers = Vec::new();
    while let (Some(debtor), Some(creditor)) = (debtors.last_mut(), creditors.last_mut()) {
        let amount = debtor.amount.min(creditor.amount);
        transfers.push(Transfer {
            from: debtor.id.clone(),
            to: creditor.id.clone(),
            amount,
        });

        debtor.amount -= amount;
        creditor.amount -= amount;
        let debtor_done = debtor.amount < Money::TOLERANCE;
        let creditor_done = creditor.amount < Money::TOLERANCE;
        if debtor_done {
            debtors.pop();
        }
        if creditor_done {
            creditors.pop();
        }
    }

    transfers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str, paid: i64, owes: i64) -> Participant {
        let mut p = Participant::new(id, id.to_uppercase());
        p.paid = Money::from_cents(paid);
        p.owes = Money::from_cents(owes);
        p
    }

    #[test]
    fn settled_bill_needs_no_transfers() {
        let participants = vec![participant("a", 10_00, 10_00), participant("b", 0, 0)];
        assert!(settle(&participants).is_empty());
    }

    #[test]
    fn one_payer_gets_paid_back_by_everyone() {
        let participants = vec![
            participant("a", 250_00, 83_34),
            participant("b", 0, 83_33),
            participant("c", 0, 83_33),
        ];

        let transfers = settle(&participants);

        assert_eq!(
            transfers,
            vec![
                Transfer {
                    from: "b".to_string(),
                    to: "a".to_string(),
                    amount: Money::from_cents(83_33)
                },
                Transfer {
                    from: "c".to_string(),
                    to: "a".to_string(),
                    amount: Money::from_cents(83_33)
                },
            ]
        );
    }

    #[test]
    fn transfers_clear_every_balance() {
        let participants = vec![
            participant("a", 90_00, 40_00),
            participant("b", 10_00, 40_00),
            participant("c", 20_00, 40_00),
            participant("d", 40_00, 40_00),
        ];

        let transfers = settle(&participants);

        for p in &participants {
            let received: Money = transfers.iter().filter(|t| t.to == p.id).map(|t| t.amount).sum();
            let sent: Money = transfers.iter().filter(|t| t.from == p.id).map(|t| t.amount).sum();
            assert_eq!(p.balance() - received + sent, Money::ZERO, "{}", p.id);
        }
        assert_eq!(transfers.len(), 2);
    }
}
