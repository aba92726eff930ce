//! CSV output of balances and settlement transfers.

use std::io::Write;

use serde::Serialize;

use crate::domain::{Bill, Error, Money};
use crate::settlement;

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    bill: &'a str,
    participant: &'a str,
    name: &'a str,
    paid: Money,
    owes: Money,
    balance: Money,
}

#[derive(Debug, Serialize)]
struct TransferRow<'a> {
    bill: &'a str,
    from: &'a str,
    to: &'a str,
    amount: Money,
}

fn writer<W: Write>(out: W, header: &[&str]) -> Result<csv::Writer<W>, Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(header)?;
    Ok(wtr)
}

/// One row per participant, bills in the order given.
pub fn write_balances<'a, W: Write>(
    bills: impl Iterator<Item = &'a Bill>,
    out: W,
) -> Result<(), Error> {
    let mut wtr = writer(out, &["bill", "participant", "name", "paid", "owes", "balance"])?;
    for bill in bills {
        for participant in &bill.participants {
            wtr.serialize(BalanceRow {
                bill: &bill.id,
                participant: &participant.id,
                name: &participant.name,
                paid: participant.paid,
                owes: participant.owes,
                balance: participant.balance(),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_settlements<'a, W: Write>(
    bills: impl Iterator<Item = &'a Bill>,
    out: W,
) -> Result<(), Error> {
    let mut wtr = writer(out, &["bill", "from", "to", "amount"])?;
    for bill in bills {
        for transfer in settlement::settle(&bill.participants) {
            wtr.serialize(TransferRow {
                bill: &bill.id,
                from: &transfer.from,
                to: &transfer.to,
                amount: transfer.amount,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}
