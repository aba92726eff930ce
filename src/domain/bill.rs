use crate::domain::{Error, Expense, Money, NewParticipant, Participant};

pub type BillId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillStatus {
    Active,
    Pending,
    Settled,
    Archived,
}

impl TryFrom<&str> for BillStatus {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "settled" => Ok(Self::Settled),
            "archived" => Ok(Self::Archived),
            other => Err(Error::Validation(format!("Invalid bill status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bill {
    pub id: BillId,
    pub name: String,
    pub description: String,
    pub status: BillStatus,
    pub participants: Vec<Participant>,
    pub expenses: Vec<Expense>,
    pub invitation_code: String,
    pub is_exclusive: bool, // closed to invitations
}

impl Bill {
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn has_participant(&self, id: &str) -> bool {
        self.participant(id).is_some()
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn total_spent(&self) -> Money {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBill {
    pub id: Option<BillId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub participants: Vec<NewParticipant>,
    pub invitation_code: Option<String>,
    pub is_exclusive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<BillStatus>,
    pub is_exclusive: Option<bool>,
}
