use serde::{Deserialize, Serialize};
use strand_common::{Result, error::Error};
use strand_wire::{FieldKind, ValueType, wire_type::MAX_FIELD_NUMBER};

/// A field to extract from every message of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field number in the message schema.
    pub number: u32,
    /// Declared type of the field.
    pub kind: FieldKind,
    /// Repeated fields keep every occurrence; singular fields keep the last
    /// occurrence per message.
    #[serde(default)]
    pub repeated: bool,
    /// Position of this field's column in the decoded batch. Defaults to
    /// the field's position in the list the decoder was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<usize>,
    /// Value type the caller expects the column to have. Checked against
    /// `kind` when the decoder is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
}

impl FieldSpec {
    pub fn new(number: u32, kind: FieldKind) -> FieldSpec {
        FieldSpec {
            number,
            kind,
            repeated: false,
            output: None,
            value_type: None,
        }
    }

    pub fn repeated(number: u32, kind: FieldKind) -> FieldSpec {
        FieldSpec::new(number, kind).with_repeated(true)
    }

    pub fn with_repeated(mut self, repeated: bool) -> Self {
        self.repeated = repeated;
        self
    }

    pub fn with_output(mut self, output: usize) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.number == 0 || self.number > MAX_FIELD_NUMBER {
            return Err(Error::invalid_arg(
                "number",
                format!("field number {} is out of range", self.number),
            ));
        }
        if let Some(value_type) = self.value_type {
            if value_type != self.kind.value_type() {
                return Err(Error::invalid_arg(
                    "value_type",
                    format!(
                        "field {} of kind {} produces {} values, not {value_type}",
                        self.number,
                        self.kind,
                        self.kind.value_type()
                    ),
                ));
            }
        }
        Ok(())
    }
}
