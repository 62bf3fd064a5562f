use serde::{Deserialize, Serialize};

/// What a decode session does with a message that turns out to be corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptMessagePolicy {
    /// Abort the batch with the message's error.
    #[default]
    Fail,
    /// Drop every value the message contributed, count it and continue.
    Skip,
}

/// Whether string, bytes and submessage values borrow the input buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOwnership {
    /// Values are views into the input and live no longer than it.
    #[default]
    Borrowed,
    /// Values are copied out when a column is produced.
    Owned,
}

/// Session-wide options of a [`SparseDecoder`](crate::SparseDecoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub on_corrupt: CorruptMessagePolicy,
    pub ownership: ValueOwnership,
    /// Route message-set items (field 1 groups carrying a type id and a
    /// payload) to the field whose number equals the type id. When enabled,
    /// field 1 groups are never dispatched as ordinary fields.
    pub message_set_items: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            on_corrupt: CorruptMessagePolicy::Fail,
            ownership: ValueOwnership::Borrowed,
            message_set_items: false,
        }
    }
}

impl DecodeOptions {
    pub fn with_on_corrupt(mut self, policy: CorruptMessagePolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    pub fn with_ownership(mut self, ownership: ValueOwnership) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn with_message_set_items(mut self, enabled: bool) -> Self {
        self.message_set_items = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_json() {
        let options: DecodeOptions = serde_json::from_str(r#"{"on_corrupt": "skip"}"#).unwrap();
        assert_eq!(options.on_corrupt, CorruptMessagePolicy::Skip);
        assert_eq!(options.ownership, ValueOwnership::Borrowed);
        assert!(!options.message_set_items);

        let json = serde_json::to_string(&DecodeOptions::default().with_ownership(ValueOwnership::Owned))
            .unwrap();
        assert!(json.contains(r#""ownership":"owned""#));
    }
}
