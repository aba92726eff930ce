use futures::Stream;

use crate::domain::{Bill, Command, Error};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<Command, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Storage for bills. Implementations keep bills in creation order.
pub trait BillRepository {
    fn bill(&self, id: &str) -> Option<&Bill>;

    fn bills(&self) -> Box<dyn Iterator<Item = &Bill> + '_>;

    /// Stores a new bill; fails when the id is already taken.
    fn insert(&mut self, bill: Bill) -> Result<(), Error>;

    /// Swaps the stored bill with the same id for `bill`.
    fn replace(&mut self, bill: Bill) -> Result<(), Error>;

    fn remove(&mut self, id: &str) -> Option<Bill>;

    /// Hands out a fresh identifier such as `exp_7`.
    fn next_id(&mut self, prefix: &str) -> String;
}
