use chrono::NaiveDate;

/// One voucher: an accounting transaction grouping the entries that belong
/// together. `id` is 0 until the document has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Document {
    pub id: i32,
    /// Sequence number, unique within the fiscal period. Defines display
    /// ordering and document-type range membership. Number 0 is reserved for
    /// the period's opening-balance voucher.
    pub number: i32,
    pub period_id: i32,
    pub date: NaiveDate,
}

impl Document {
    pub fn new(period_id: i32, number: i32, date: NaiveDate) -> Self {
        Self {
            id: 0,
            number,
            period_id,
            date,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}
