use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One row of the source ledger.
///
/// `date` is `None` when the source cell could not be parsed as a calendar
/// date. Such rows stay in the table but can never match a year filter.
/// Absent sub-category, class or source values are kept as `None` and form
/// their own group during aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: Option<NaiveDate>,
    pub amount: Decimal,
    pub main_category: String,
    pub sub_category: Option<String>,
    pub class: Option<String>,
    pub source: Option<String>,
}

/// An ordered sequence of records sharing one column schema.
///
/// Tables are never mutated in place; every pipeline step produces a new one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new() -> Table {
        Table { records: Vec::new() }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.records.iter()
    }

    /// Returns a new table containing clones of the records matching `pred`,
    /// in their original order.
    pub fn filtered<P>(&self, pred: P) -> Table
    where
        P: Fn(&Record) -> bool,
    {
        Table {
            records: self.records.iter().filter(|r| pred(r)).cloned().collect(),
        }
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Table {
        Table {
            records: iter.into_iter().collect(),
        }
    }
}
