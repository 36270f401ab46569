use std::collections::BTreeMap;

/// Bookkeeping-wide settings row: organisation details, the active document
/// type, and a free-form property map.
///
/// Known property keys:
/// - `default_account`: account id auto-assigned to new entries.
/// - `locked/{period_id}`: comma-separated `YYYY-MM` months whose documents
///   may no longer be edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Settings {
    pub name: String,
    pub business_id: String,
    /// Id of the active document type, or `None` for the unrestricted range.
    pub document_type_id: Option<i32>,
    pub properties: BTreeMap<String, String>,
}

impl Settings {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Months of the given period that are locked for editing, as `YYYY-MM`
    /// strings.
    pub fn locked_months(&self, period_id: i32) -> Vec<String> {
        self.property(&format!("locked/{}", period_id))
            .unwrap_or("")
            .split(',')
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn default_account_id(&self) -> Option<i32> {
        self.property("default_account")?.parse().ok()
    }
}
