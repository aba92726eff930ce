//! Bill, participant and expense operations.
//!
//! Every mutation works on a copy of the stored bill: the copy is changed,
//! balances are rebuilt, and only then is it written back. Callers receive
//! snapshots and never hold references into the repository.

use rand::Rng;

use crate::balance::{self, ReferenceRole};
use crate::domain::{
    Bill, BillPatch, BillRepository, BillStatus, Error, Expense, ExpenseDraft, ExpensePatch,
    Money, NewBill, NewParticipant, Participant, SplitKind,
};
use crate::settings::Limits;
use crate::split;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 8;

#[derive(Debug)]
pub struct BillService<R>
where
    R: BillRepository,
{
    repository: R,
    limits: Limits,
}

impl<R> BillService<R>
where
    R: BillRepository,
{
    pub fn new(repository: R, limits: Limits) -> Self {
        Self { repository, limits }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn bill(&self, id: &str) -> Result<Bill, Error> {
        self.repository
            .bill(id)
            .cloned()
            .ok_or_else(|| Error::bill_not_found(id))
    }

    pub fn active_bills(&self) -> Vec<Bill> {
        self.bills_with_status(BillStatus::Active)
    }

    pub fn archived_bills(&self) -> Vec<Bill> {
        self.bills_with_status(BillStatus::Archived)
    }

    pub fn pending_bills(&self) -> Vec<Bill> {
        self.bills_with_status(BillStatus::Pending)
    }

    fn bills_with_status(&self, status: BillStatus) -> Vec<Bill> {
        self.repository
            .bills()
            .filter(|b| b.status == status)
            .cloned()
            .collect()
    }

    /// Random 8-character code, unique among stored bills.
    pub fn generate_invitation_code(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code: String = (0..CODE_LENGTH)
                .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
                .collect();
            if !self.code_taken(&code) {
                return code;
            }
        }
    }

    fn code_taken(&self, code: &str) -> bool {
        self.repository.bills().any(|b| b.invitation_code == code)
    }

    pub fn create_bill(&mut self, new_bill: NewBill) -> Result<Bill, Error> {
        if let Some(max) = self.limits.max_bills {
            if self.repository.bills().count() >= max {
                return Err(Error::LimitReached(format!(
                    "You have reached your limit of {} bills",
                    max
                )));
            }
        }
        self.check_participant_limit(new_bill.participants.len())?;

        let invitation_code = match new_bill.invitation_code {
            Some(code) => {
                let code = code.trim().to_string();
                if code.is_empty() || self.code_taken(&code) {
                    return Err(Error::Validation(format!(
                        "Invitation code '{}' is not available",
                        code
                    )));
                }
                code
            }
            None => self.generate_invitation_code(),
        };

        let id = match new_bill.id {
            Some(id) => id,
            None => self.repository.next_id("bill"),
        };

        let mut bill = Bill {
            id,
            name: non_blank(new_bill.name).unwrap_or_else(|| "Untitled Bill".to_string()),
            description: new_bill.description.unwrap_or_default(),
            status: BillStatus::Active,
            participants: Vec::with_capacity(new_bill.participants.len()),
            expenses: Vec::new(),
            invitation_code,
            is_exclusive: new_bill.is_exclusive,
        };
        for new_participant in new_bill.participants {
            let participant = self.make_participant(&bill, new_participant)?;
            bill.participants.push(participant);
        }

        self.repository.insert(bill.clone())?;
        tracing::debug!(bill = %bill.id, "created bill");
        Ok(bill)
    }

    pub fn update_bill(&mut self, id: &str, patch: BillPatch) -> Result<Bill, Error> {
        let mut bill = self.checkout(id)?;

        if let Some(name) = non_blank(patch.name) {
            bill.name = name;
        }
        if let Some(description) = patch.description {
            bill.description = description;
        }
        if let Some(status) = patch.status {
            bill.status = status;
        }
        if let Some(is_exclusive) = patch.is_exclusive {
            bill.is_exclusive = is_exclusive;
        }

        self.commit(bill)
    }

    pub fn archive_bill(&mut self, id: &str) -> Result<Bill, Error> {
        self.update_bill(
            id,
            BillPatch {
                status: Some(BillStatus::Archived),
                ..BillPatch::default()
            },
        )
    }

    pub fn delete_bill(&mut self, id: &str) -> Result<Bill, Error> {
        self.repository
            .remove(id)
            .ok_or_else(|| Error::bill_not_found(id))
    }

    pub fn add_expense(&mut self, bill_id: &str, draft: ExpenseDraft) -> Result<Expense, Error> {
        let mut bill = self.checkout(bill_id)?;

        let id = match draft.id {
            Some(id) => id,
            None => self.repository.next_id("exp"),
        };
        if bill.expense(&id).is_some() {
            return Err(Error::Validation(format!(
                "Expense ID {} already exists in bill {}",
                id, bill.id
            )));
        }

        let splits = split::resolve(draft.amount, &draft.split, &bill.participants)?;
        let expense = Expense {
            id,
            description: draft.description.trim().to_string(),
            amount: draft.amount,
            paid_by: draft.paid_by,
            split_kind: draft.split.kind(),
            splits,
        };
        validate_expense(&bill, &expense)?;

        bill.expenses.push(expense.clone());
        self.commit(bill)?;
        Ok(expense)
    }

    pub fn update_expense(
        &mut self,
        bill_id: &str,
        expense_id: &str,
        patch: ExpensePatch,
    ) -> Result<Expense, Error> {
        let mut bill = self.checkout(bill_id)?;
        let index = bill
            .expenses
            .iter()
            .position(|e| e.id == expense_id)
            .ok_or_else(|| Error::expense_not_found(expense_id))?;

        let Expense {
            id,
            description,
            amount: old_amount,
            paid_by,
            split_kind,
            splits,
        } = bill.expenses[index].clone();

        let amount = patch.amount.unwrap_or(old_amount);
        let (split_kind, splits) = match patch.split {
            Some(request) => (
                request.kind(),
                split::resolve(amount, &request, &bill.participants)?,
            ),
            // an equal split follows the new amount across the same people
            None if split_kind == SplitKind::Equal && amount != old_amount => {
                let among: Vec<_> = splits.into_iter().map(|s| s.participant_id).collect();
                (SplitKind::Equal, split::equal_split(amount, &among)?)
            }
            None => (split_kind, splits),
        };

        let updated = Expense {
            id,
            description: patch
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or(description),
            amount,
            paid_by: patch.paid_by.unwrap_or(paid_by),
            split_kind,
            splits,
        };
        validate_expense(&bill, &updated)?;

        bill.expenses[index] = updated.clone();
        self.commit(bill)?;
        Ok(updated)
    }

    pub fn delete_expense(&mut self, bill_id: &str, expense_id: &str) -> Result<Bill, Error> {
        let mut bill = self.checkout(bill_id)?;
        let index = bill
            .expenses
            .iter()
            .position(|e| e.id == expense_id)
            .ok_or_else(|| Error::expense_not_found(expense_id))?;

        bill.expenses.remove(index);
        self.commit(bill)
    }

    pub fn add_participant(
        &mut self,
        bill_id: &str,
        new_participant: NewParticipant,
    ) -> Result<Participant, Error> {
        let mut bill = self.checkout(bill_id)?;
        self.check_participant_limit(bill.participants.len() + 1)?;

        let participant = self.make_participant(&bill, new_participant)?;
        bill.participants.push(participant);

        let bill = self.commit(bill)?;
        bill.participants
            .last()
            .cloned()
            .ok_or_else(|| Error::Validation("Participant was not stored".to_string()))
    }

    /// Only participants who paid nothing and owe nothing can leave a bill.
    pub fn remove_participant(&mut self, bill_id: &str, participant_id: &str) -> Result<Bill, Error> {
        let mut bill = self.checkout(bill_id)?;
        let participant = bill
            .participant(participant_id)
            .ok_or_else(|| Error::participant_not_found(participant_id))?;

        if bill.expenses.iter().any(|e| e.paid_by == participant_id) {
            return Err(Error::Validation(
                "Cannot remove a participant who has paid for expenses. Reassign the expenses first."
                    .to_string(),
            ));
        }
        if participant.owes.is_positive() {
            return Err(Error::Validation(
                "Cannot remove a participant who still owes money. Settle up first.".to_string(),
            ));
        }

        bill.participants.retain(|p| p.id != participant_id);
        for expense in &mut bill.expenses {
            expense.splits.retain(|s| s.participant_id != participant_id);
        }

        self.commit(bill)
    }

    pub fn accept_invitation(
        &mut self,
        code: &str,
        new_participant: NewParticipant,
    ) -> Result<Bill, Error> {
        let code = code.trim();
        let mut bill = self
            .repository
            .bills()
            .find(|b| b.invitation_code == code)
            .cloned()
            .ok_or_else(|| Error::Validation(format!("Invalid invitation code '{}'", code)))?;

        if bill.is_exclusive {
            return Err(Error::Validation(format!(
                "Bill {} does not accept invitations",
                bill.id
            )));
        }
        if let Some(email) = new_participant.email.as_deref() {
            let already_in = bill
                .participants
                .iter()
                .filter_map(|p| p.email.as_deref())
                .any(|e| e.eq_ignore_ascii_case(email));
            if already_in {
                return Err(Error::Validation(format!(
                    "{} is already a participant in this bill",
                    email
                )));
            }
        }
        self.check_participant_limit(bill.participants.len() + 1)?;

        let mut participant = self.make_participant(&bill, new_participant)?;
        participant.is_registered = true;
        bill.participants.push(participant);

        self.commit(bill)
    }

    fn check_participant_limit(&self, wanted: usize) -> Result<(), Error> {
        match self.limits.max_participants {
            Some(max) if wanted > max => Err(Error::LimitReached(format!(
                "You have reached your limit of {} participants",
                max
            ))),
            _ => Ok(()),
        }
    }

    fn make_participant(
        &mut self,
        bill: &Bill,
        new_participant: NewParticipant,
    ) -> Result<Participant, Error> {
        let id = match new_participant.id {
            Some(id) => id,
            None => self.repository.next_id("part"),
        };
        if bill.has_participant(&id) {
            return Err(Error::Validation(format!(
                "Participant ID {} already exists in bill {}",
                id, bill.id
            )));
        }

        Ok(Participant {
            id,
            name: non_blank(new_participant.name)
                .unwrap_or_else(|| "Unnamed Participant".to_string()),
            email: non_blank(new_participant.email),
            is_registered: new_participant.is_registered,
            paid: Money::ZERO,
            owes: Money::ZERO,
        })
    }

    fn checkout(&self, id: &str) -> Result<Bill, Error> {
        self.bill(id)
    }

    /// Rebuilds balances on `bill` and writes it back.
    fn commit(&mut self, mut bill: Bill) -> Result<Bill, Error> {
        let recomputed = balance::recompute_with_diagnostics(&bill.participants, &bill.expenses);
        for reference in &recomputed.dangling {
            let role = match reference.role {
                ReferenceRole::Payer => "payer",
                ReferenceRole::Split => "split",
            };
            tracing::warn!(
                bill = %bill.id,
                expense = %reference.expense_id,
                participant = %reference.participant_id,
                role,
                "expense references a participant that is not on the bill"
            );
        }
        bill.participants = recomputed.participants;

        self.repository.replace(bill.clone())?;
        Ok(bill)
    }
}

fn validate_expense(bill: &Bill, expense: &Expense) -> Result<(), Error> {
    if expense.description.is_empty() {
        return Err(Error::Validation("Description is required".to_string()));
    }
    if !expense.amount.is_positive() {
        return Err(Error::Validation(
            "Amount must be greater than 0".to_string(),
        ));
    }
    if !expense.amount.in_range() {
        return Err(Error::Validation(format!(
            "Amount {} exceeds the maximum of {}",
            expense.amount,
            Money::MAX
        )));
    }
    if !bill.has_participant(&expense.paid_by) {
        return Err(Error::participant_not_found(&expense.paid_by));
    }
    if let Some(split) = expense
        .splits
        .iter()
        .find(|s| !bill.has_participant(&s.participant_id))
    {
        return Err(Error::participant_not_found(&split.participant_id));
    }
    split::validate_splits(expense.amount, &expense.splits)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
