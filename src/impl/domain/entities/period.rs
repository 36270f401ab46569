use chrono::NaiveDate;

/// One fiscal period. A locked period rejects all writes.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Period {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub locked: bool,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
