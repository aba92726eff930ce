use crate::domain::Money;

pub type ParticipantId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: Option<String>,
    pub is_registered: bool,
    pub paid: Money, // sum of expenses this participant covered
    pub owes: Money, // sum of this participant's split allocations
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            is_registered: false,
            paid: Money::ZERO,
            owes: Money::ZERO,
        }
    }

    /// Net position: positive when the participant is owed money.
    pub fn balance(&self) -> Money {
        self.paid - self.owes
    }

    pub fn reset_balance(&mut self) {
        self.paid = Money::ZERO;
        self.owes = Money::ZERO;
    }
}

/// Payload for adding someone to a bill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewParticipant {
    pub id: Option<ParticipantId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_registered: bool,
}
