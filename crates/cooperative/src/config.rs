use serde::{Deserialize, Serialize};

/// What happens to a purchase which is granted nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroGrantPolicy {
    /// Remove the purchase
    #[default]
    Delete,

    /// Keep the purchase with a quantity of zero
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforceConfig {
    pub zero_grant: ZeroGrantPolicy,

    /// Maximal number of adjustments kept in the journal
    pub journal_capacity: usize,
}

impl Default for EnforceConfig {
    fn default() -> Self {
        Self {
            zero_grant: ZeroGrantPolicy::Delete,
            journal_capacity: 1000,
        }
    }
}
