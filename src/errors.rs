use fractic_server_error::{define_client_error, define_internal_error};

// VAT-related.
define_client_error!(
    InvalidVatRateIndex,
    "Invalid VAT rate index: {index}.",
    { index: u32 }
);

// Storage-related.
define_internal_error!(StoreLockPoisoned, "In-memory store lock poisoned.");
define_internal_error!(
    OrphanedEntry,
    "Entry {entry_id} references document {document_id}, which does not exist.",
    { entry_id: i32, document_id: i32 }
);

// Document-related.
define_client_error!(DocumentNotFound, "Document {id} not found.", { id: i32 });

// Period-related.
define_client_error!(NoOpenPeriod, "No fiscal period has been created yet.");
define_internal_error!(
    NoEditableDate,
    "Could not find an editable date after {date} (every following month is locked).",
    { date: &str }
);
