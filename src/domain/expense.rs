use rust_decimal::Decimal;

use crate::domain::{Money, ParticipantId};

pub type ExpenseId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    Equal,
    Custom,
    Percentage,
}

impl core::fmt::Display for SplitKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            SplitKind::Equal => "equal",
            SplitKind::Custom => "custom",
            SplitKind::Percentage => "percentage",
        };
        f.write_str(name)
    }
}

/// The part of an expense allocated to one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub participant_id: ParticipantId,
    pub amount: Money,
}

impl Split {
    pub fn new(participant_id: impl Into<ParticipantId>, amount: Money) -> Self {
        Self {
            participant_id: participant_id.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,
    pub split_kind: SplitKind,
    pub splits: Vec<Split>,
}

/// How an expense should be divided, before it is turned into [`Split`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitRequest {
    /// Equal shares among the listed participants, or the whole bill when empty.
    Equal(Vec<ParticipantId>),
    Custom(Vec<(ParticipantId, Money)>),
    Percentage(Vec<(ParticipantId, Decimal)>),
}

impl SplitRequest {
    pub fn kind(&self) -> SplitKind {
        match self {
            SplitRequest::Equal(_) => SplitKind::Equal,
            SplitRequest::Custom(_) => SplitKind::Custom,
            SplitRequest::Percentage(_) => SplitKind::Percentage,
        }
    }
}

/// Payload for adding an expense to a bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub id: Option<ExpenseId>,
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,
    pub split: SplitRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub paid_by: Option<ParticipantId>,
    pub split: Option<SplitRequest>,
}
