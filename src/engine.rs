use std::io::Write;

use crate::domain::{
    BillRepository, Command, Error,
    traits::{CommandStream, DeadLetterQueue},
};
use crate::report;
use crate::service::BillService;

use futures::StreamExt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSummary {
    pub applied: usize,
    pub rejected: usize,
}

/// Feeds a command stream through the bill service. Commands that fail to
/// parse or apply go to the dead-letter queue and processing moves on.
#[derive(Debug)]
pub struct Engine<I, R, D>
where
    I: CommandStream,
    R: BillRepository,
    D: DeadLetterQueue,
{
    ingestion: I,
    service: BillService<R>,
    dlq: D,
}

impl<I, R, D> Engine<I, R, D>
where
    I: CommandStream,
    R: BillRepository,
    D: DeadLetterQueue,
{
    pub fn new(ingestion: I, service: BillService<R>, dlq: D) -> Self {
        Self {
            ingestion,
            service,
            dlq,
        }
    }

    pub fn service(&self) -> &BillService<R> {
        &self.service
    }

    pub async fn process(&mut self) -> Result<ProcessSummary, Error> {
        let mut summary = ProcessSummary::default();
        let mut res = self.ingestion.stream();

        while let Some(cmd) = res.next().await {
            let outcome = cmd.and_then(|cmd| {
                tracing::debug!(%cmd, "applying command");
                self.apply_command(cmd)
            });
            match outcome {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    summary.rejected += 1;
                    self.dlq.report(&e);
                }
            }
        }

        tracing::info!(
            applied = summary.applied,
            rejected = summary.rejected,
            "finished processing commands"
        );
        Ok(summary)
    }

    fn apply_command(&mut self, cmd: Command) -> Result<(), Error> {
        let service = &mut self.service;
        match cmd {
            Command::CreateBill(new_bill) => service.create_bill(new_bill).map(drop),
            Command::UpdateBill { bill, patch } => service.update_bill(&bill, patch).map(drop),
            Command::ArchiveBill { bill } => service.archive_bill(&bill).map(drop),
            Command::DeleteBill { bill } => service.delete_bill(&bill).map(drop),
            Command::AddParticipant { bill, participant } => {
                service.add_participant(&bill, participant).map(drop)
            }
            Command::RemoveParticipant { bill, participant } => {
                service.remove_participant(&bill, &participant).map(drop)
            }
            Command::AddExpense { bill, expense } => service.add_expense(&bill, expense).map(drop),
            Command::UpdateExpense {
                bill,
                expense,
                patch,
            } => service.update_expense(&bill, &expense, patch).map(drop),
            Command::DeleteExpense { bill, expense } => {
                service.delete_expense(&bill, &expense).map(drop)
            }
            Command::AcceptInvitation { code, participant } => {
                service.accept_invitation(&code, participant).map(drop)
            }
        }
    }

    /// Writes balances, followed by settlement transfers when asked for.
    pub fn flush<W: Write>(&self, out: &mut W, settlements: bool) -> Result<(), Error> {
        let repository = self.service.repository();
        report::write_balances(repository.bills(), &mut *out)?;
        if settlements {
            writeln!(out)?;
            report::write_settlements(repository.bills(), &mut *out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::ingestion::CsvReader;
    use crate::repository::InMemoryBills;
    use crate::settings::Limits;

    #[derive(Default)]
    struct RecordingDLQ {
        errors: RefCell<Vec<String>>,
    }

    impl DeadLetterQueue for RecordingDLQ {
        fn report(&self, error: &Error) {
            self.errors.borrow_mut().push(error.to_string());
        }
    }

    fn engine(body: &str) -> Engine<CsvReader<std::io::Cursor<Vec<u8>>>, InMemoryBills, RecordingDLQ> {
        let input = format!(
            "type, bill, id, name, email, amount, payer, split, shares, code, status\n{}",
            body
        );
        Engine::new(
            CsvReader::new(std::io::Cursor::new(input.into_bytes())),
            BillService::new(InMemoryBills::new(), Limits::default()),
            RecordingDLQ::default(),
        )
    }

    const TRIP: &str = "bill, trip, , Weekend Trip, , , , , , TRIP2023,\n\
        participant, trip, p1, Ana, , , , , , ,\n\
        participant, trip, p2, Ben, , , , , , ,\n\
        participant, trip, p3, Cy, , , , , , ,\n\
        expense, trip, e1, Dinner, , 150.00, p1, equal, , ,\n";

    #[tokio::test]
    async fn applies_commands_and_writes_balances() {
        let mut engine = engine(TRIP);

        let summary = engine.process().await.unwrap();
        assert_eq!(
            summary,
            ProcessSummary {
                applied: 5,
                rejected: 0
            }
        );

        let mut out = Vec::new();
        engine.flush(&mut out, true).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(
            out,
            "bill,participant,name,paid,owes,balance\n\
             trip,p1,Ana,150.00,50.00,100.00\n\
             trip,p2,Ben,0.00,50.00,-50.00\n\
             trip,p3,Cy,0.00,50.00,-50.00\n\
             \n\
             bill,from,to,amount\n\
             trip,p2,p1,50.00\n\
             trip,p3,p1,50.00\n"
        );
    }

    #[tokio::test]
    async fn rejected_commands_go_to_the_dlq() {
        let body = format!(
            "{}expense, trip, e2, Wine, , 100, p2, custom, p1:50;p2:49.98, ,\n\
             expense, nowhere, e3, Wine, , 10, p2, , , ,\n\
             refund, trip, , , , , , , , ,\n\
             delete_expense, trip, e1, , , , , , , ,\n",
            TRIP
        );
        let mut engine = engine(&body);

        let summary = engine.process().await.unwrap();

        assert_eq!(summary.applied, 6);
        assert_eq!(summary.rejected, 3);
        let errors = engine.dlq.errors.borrow();
        assert!(errors[0].contains("99.98"));
        assert!(errors[1].contains("nowhere"));
        assert!(errors[2].contains("refund"));

        let bill = engine.service().bill("trip").unwrap();
        assert!(bill.expenses.is_empty());
        assert!(bill.participants.iter().all(|p| p.balance().is_zero()));
    }

    #[tokio::test]
    async fn exclusive_bills_turn_away_invitations() {
        let input = "type, bill, id, name, email, amount, payer, split, shares, code, status, description, exclusive\n\
             bill, club, , Book Club, , , , , , CLUB0001, , , \n\
             join, , , Ana, ana@example.com, , , , , CLUB0001, , , \n\
             update_bill, club, , , , , , , , , , , true\n\
             join, , , Ben, ben@example.com, , , , , CLUB0001, , , \n";
        let mut engine = Engine::new(
            CsvReader::new(std::io::Cursor::new(input.as_bytes().to_vec())),
            BillService::new(InMemoryBills::new(), Limits::default()),
            RecordingDLQ::default(),
        );

        let summary = engine.process().await.unwrap();

        assert_eq!(summary.applied, 3);
        assert_eq!(summary.rejected, 1);
        assert!(engine.dlq.errors.borrow()[0].contains("does not accept invitations"));
        let bill = engine.service().bill("club").unwrap();
        assert!(bill.is_exclusive);
        assert_eq!(bill.participants.len(), 1);
    }
}
