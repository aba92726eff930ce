pub mod bill;
pub mod command;
pub mod error;
pub mod expense;
pub mod money;
pub mod participant;
pub mod traits;

pub use bill::{Bill, BillId, BillPatch, BillStatus, NewBill};
pub use command::Command;
pub use error::Error;
pub use expense::{
    Expense, ExpenseDraft, ExpenseId, ExpensePatch, Split, SplitKind, SplitRequest,
};
pub use money::Money;
pub use participant::{NewParticipant, Participant, ParticipantId};
pub use traits::{BillRepository, CommandStream, DeadLetterQueue};
