use std::io::Read;
use std::pin::Pin;
use std::str::FromStr;

use futures::stream::{self, Stream};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{
    BillPatch, BillStatus, Command, Error, ExpenseDraft, ExpensePatch, Money, NewBill,
    NewParticipant, ParticipantId, SplitRequest,
};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Self { reader: Some(rdr) }
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    bill: Option<String>,
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    amount: Option<Money>,
    payer: Option<String>,
    split: Option<String>,
    shares: Option<String>,
    code: Option<String>,
    status: Option<String>,
    description: Option<String>,
    exclusive: Option<bool>,
}

fn required(value: Option<String>, field: &str, kind: &str) -> Result<String, Error> {
    value.ok_or_else(|| Error::Ingestion(format!("Missing {} for {} row", field, kind)))
}

fn parse_split(split: Option<&str>, shares: Option<&str>) -> Result<SplitRequest, Error> {
    let entries: Vec<&str> = shares
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();

    match split.unwrap_or("equal").to_ascii_lowercase().as_str() {
        "equal" => Ok(SplitRequest::Equal(
            entries.into_iter().map(ParticipantId::from).collect(),
        )),
        "custom" => Ok(SplitRequest::Custom(parse_pairs(&entries, Money::from_str)?)),
        "percentage" => Ok(SplitRequest::Percentage(parse_pairs(&entries, |v| {
            Decimal::from_str(v).map_err(|_| Error::Ingestion(format!("Invalid percentage: {}", v)))
        })?)),
        other => Err(Error::Ingestion(format!("Invalid split type: {}", other))),
    }
}

fn parse_pairs<T>(
    entries: &[&str],
    parse: impl Fn(&str) -> Result<T, Error>,
) -> Result<Vec<(ParticipantId, T)>, Error> {
    entries
        .iter()
        .map(|entry| {
            let (id, value) = entry
                .split_once(':')
                .ok_or_else(|| Error::Ingestion(format!("Invalid share '{}', expected id:value", entry)))?;
            Ok((id.trim().to_string(), parse(value.trim())?))
        })
        .collect()
}

impl TryFrom<CsvRow> for Command {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let kind = row.kind.trim().to_ascii_lowercase();
        let kind = kind.as_str();

        let command = match kind {
            "bill" => Command::CreateBill(NewBill {
                id: Some(required(row.bill, "bill", kind)?),
                name: row.name,
                description: row.description,
                invitation_code: row.code,
                is_exclusive: row.exclusive.unwrap_or(false),
                ..NewBill::default()
            }),
            "update_bill" => Command::UpdateBill {
                bill: required(row.bill, "bill", kind)?,
                patch: BillPatch {
                    name: row.name,
                    description: row.description,
                    status: row.status.as_deref().map(BillStatus::try_from).transpose()?,
                    is_exclusive: row.exclusive,
                },
            },
            "archive" => Command::ArchiveBill {
                bill: required(row.bill, "bill", kind)?,
            },
            "delete_bill" => Command::DeleteBill {
                bill: required(row.bill, "bill", kind)?,
            },
            "participant" => Command::AddParticipant {
                bill: required(row.bill, "bill", kind)?,
                participant: NewParticipant {
                    id: row.id,
                    name: row.name,
                    email: row.email,
                    is_registered: false,
                },
            },
            "remove_participant" => Command::RemoveParticipant {
                bill: required(row.bill, "bill", kind)?,
                participant: required(row.id, "id", kind)?,
            },
            "expense" => Command::AddExpense {
                bill: required(row.bill, "bill", kind)?,
                expense: ExpenseDraft {
                    id: row.id,
                    description: row.name.unwrap_or_else(|| "Untitled Expense".to_string()),
                    amount: row
                        .amount
                        .ok_or_else(|| Error::Ingestion(format!("Missing amount for {} row", kind)))?,
                    paid_by: required(row.payer, "payer", kind)?,
                    split: parse_split(row.split.as_deref(), row.shares.as_deref())?,
                },
            },
            "update_expense" => Command::UpdateExpense {
                bill: required(row.bill, "bill", kind)?,
                expense: required(row.id, "id", kind)?,
                patch: ExpensePatch {
                    description: row.name,
                    amount: row.amount,
                    paid_by: row.payer,
                    split: match (row.split.as_deref(), row.shares.as_deref()) {
                        (None, None) => None,
                        (split, shares) => Some(parse_split(split, shares)?),
                    },
                },
            },
            "delete_expense" => Command::DeleteExpense {
                bill: required(row.bill, "bill", kind)?,
                expense: required(row.id, "id", kind)?,
            },
            "join" => Command::AcceptInvitation {
                code: required(row.code, "code", kind)?,
                participant: NewParticipant {
                    id: row.id,
                    name: row.name,
                    email: row.email,
                    is_registered: true,
                },
            },
            other => {
                return Err(Error::Ingestion(format!("Invalid command type: {}", other)));
            }
        };

        Ok(command)
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvReader<R> {
    type CmdStream = Pin<Box<dyn Stream<Item = Result<Command, Error>> + Send>>;

    fn stream(&mut self) -> Self::CmdStream {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<Command, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Command::try_from(row),
                Err(e) => Err(Error::Ingestion(format!("CSV deserialization error: {}", e))),
            });

        Box::pin(stream::iter(iter))
    }
}
