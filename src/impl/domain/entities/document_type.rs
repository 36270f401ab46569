/// A document type assigns a name and a numeric range to a slice of the
/// period's sequence numbers, e.g. 1–99 bank statements, 100–199 sales
/// invoices. Membership is purely range-based.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct DocumentType {
    pub id: i32,
    /// Ordering number in the document-type list.
    pub number: i32,
    pub name: String,
    pub number_start: i32,
    pub number_end: i32,
}

impl DocumentType {
    pub fn contains(&self, document_number: i32) -> bool {
        document_number >= self.number_start && document_number <= self.number_end
    }
}
