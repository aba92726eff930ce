use crate::domain::{
    BillId, BillPatch, ExpenseDraft, ExpenseId, ExpensePatch, NewBill, NewParticipant,
    ParticipantId,
};

/// One bill operation, as read from the command stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateBill(NewBill),
    UpdateBill {
        bill: BillId,
        patch: BillPatch,
    },
    ArchiveBill {
        bill: BillId,
    },
    DeleteBill {
        bill: BillId,
    },
    AddParticipant {
        bill: BillId,
        participant: NewParticipant,
    },
    RemoveParticipant {
        bill: BillId,
        participant: ParticipantId,
    },
    AddExpense {
        bill: BillId,
        expense: ExpenseDraft,
    },
    UpdateExpense {
        bill: BillId,
        expense: ExpenseId,
        patch: ExpensePatch,
    },
    DeleteExpense {
        bill: BillId,
        expense: ExpenseId,
    },
    AcceptInvitation {
        code: String,
        participant: NewParticipant,
    },
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Command::CreateBill(new_bill) => write!(
                f,
                "create_bill,bill={}",
                new_bill.id.as_deref().unwrap_or("<generated>")
            ),
            Command::UpdateBill { bill, .. } => write!(f, "update_bill,bill={}", bill),
            Command::ArchiveBill { bill } => write!(f, "archive_bill,bill={}", bill),
            Command::DeleteBill { bill } => write!(f, "delete_bill,bill={}", bill),
            Command::AddParticipant { bill, participant } => write!(
                f,
                "add_participant,bill={},name={}",
                bill,
                participant.name.as_deref().unwrap_or("")
            ),
            Command::RemoveParticipant { bill, participant } => write!(
                f,
                "remove_participant,bill={},participant={}",
                bill, participant
            ),
            Command::AddExpense { bill, expense } => write!(
                f,
                "add_expense,bill={},amount={},paid_by={},split={}",
                bill,
                expense.amount,
                expense.paid_by,
                expense.split.kind()
            ),
            Command::UpdateExpense { bill, expense, .. } => {
                write!(f, "update_expense,bill={},expense={}", bill, expense)
            }
            Command::DeleteExpense { bill, expense } => {
                write!(f, "delete_expense,bill={},expense={}", bill, expense)
            }
            Command::AcceptInvitation { code, .. } => write!(f, "accept_invitation,code={}", code),
        }
    }
}
