use crate::domain::{Bill, BillRepository, Error};

/// Bills held in memory, in creation order.
#[derive(Default, Debug)]
pub struct InMemoryBills {
    bills: Vec<Bill>,
    sequence: u64,
}

impl InMemoryBills {
    pub fn new() -> Self {
        Self {
            bills: Vec::new(),
            sequence: 0,
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.bills.iter().position(|b| b.id == id)
    }
}

impl BillRepository for InMemoryBills {
    fn bill(&self, id: &str) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id == id)
    }

    fn bills(&self) -> Box<dyn Iterator<Item = &Bill> + '_> {
        Box::new(self.bills.iter())
    }

    fn insert(&mut self, bill: Bill) -> Result<(), Error> {
        match self.position(&bill.id) {
            None => {
                self.bills.push(bill);
                Ok(())
            }
            Some(_) => Err(Error::Validation(format!(
                "Bill ID {} already exists",
                bill.id
            ))),
        }
    }

    fn replace(&mut self, bill: Bill) -> Result<(), Error> {
        let index = self
            .position(&bill.id)
            .ok_or_else(|| Error::bill_not_found(&bill.id))?;
        self.bills[index] = bill;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Option<Bill> {
        self.position(id).map(|index| self.bills.remove(index))
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{}_{}", prefix, self.sequence)
    }
}
