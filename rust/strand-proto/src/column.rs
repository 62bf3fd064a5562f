use strand_wire::ValueType;

/// Typed values of one collected column.
///
/// `Bytes` holds views into the decoded input buffers; `OwnedBytes` holds
/// copies made when owned output was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues<'a> {
    Bool(Vec<bool>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Bytes(Vec<&'a [u8]>),
    OwnedBytes(Vec<Vec<u8>>),
}

impl<'a> ColumnValues<'a> {
    pub fn empty(value_type: ValueType) -> ColumnValues<'a> {
        match value_type {
            ValueType::Bool => ColumnValues::Bool(Vec::new()),
            ValueType::Int32 => ColumnValues::Int32(Vec::new()),
            ValueType::UInt32 => ColumnValues::UInt32(Vec::new()),
            ValueType::Int64 => ColumnValues::Int64(Vec::new()),
            ValueType::UInt64 => ColumnValues::UInt64(Vec::new()),
            ValueType::Float => ColumnValues::Float(Vec::new()),
            ValueType::Double => ColumnValues::Double(Vec::new()),
            ValueType::Bytes => ColumnValues::Bytes(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::UInt32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::UInt64(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
            ColumnValues::Bytes(v) => v.len(),
            ColumnValues::OwnedBytes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ColumnValues::Bool(_) => ValueType::Bool,
            ColumnValues::Int32(_) => ValueType::Int32,
            ColumnValues::UInt32(_) => ValueType::UInt32,
            ColumnValues::Int64(_) => ValueType::Int64,
            ColumnValues::UInt64(_) => ValueType::UInt64,
            ColumnValues::Float(_) => ValueType::Float,
            ColumnValues::Double(_) => ValueType::Double,
            ColumnValues::Bytes(_) | ColumnValues::OwnedBytes(_) => ValueType::Bytes,
        }
    }

    /// Returns the byte value at `index` for either bytes representation.
    pub fn bytes_at(&self, index: usize) -> Option<&[u8]> {
        match self {
            ColumnValues::Bytes(v) => v.get(index).copied(),
            ColumnValues::OwnedBytes(v) => v.get(index).map(Vec::as_slice),
            _ => None,
        }
    }

    /// Copies borrowed byte views so the values no longer depend on the
    /// input buffers.
    pub fn into_owned(self) -> ColumnValues<'static> {
        match self {
            ColumnValues::Bool(v) => ColumnValues::Bool(v),
            ColumnValues::Int32(v) => ColumnValues::Int32(v),
            ColumnValues::UInt32(v) => ColumnValues::UInt32(v),
            ColumnValues::Int64(v) => ColumnValues::Int64(v),
            ColumnValues::UInt64(v) => ColumnValues::UInt64(v),
            ColumnValues::Float(v) => ColumnValues::Float(v),
            ColumnValues::Double(v) => ColumnValues::Double(v),
            ColumnValues::Bytes(v) => {
                ColumnValues::OwnedBytes(v.into_iter().map(<[u8]>::to_vec).collect())
            }
            ColumnValues::OwnedBytes(v) => ColumnValues::OwnedBytes(v),
        }
    }
}

/// Values of one field (or map key) in arrival order, each paired with the
/// index of the message it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedColumn<'a> {
    pub values: ColumnValues<'a>,
    pub parent_indices: Vec<i64>,
}

impl<'a> CollectedColumn<'a> {
    pub fn new(values: ColumnValues<'a>, parent_indices: Vec<i64>) -> CollectedColumn<'a> {
        debug_assert_eq!(values.len(), parent_indices.len());
        CollectedColumn {
            values,
            parent_indices,
        }
    }

    pub fn empty(value_type: ValueType) -> CollectedColumn<'a> {
        CollectedColumn::new(ColumnValues::empty(value_type), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.parent_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent_indices.is_empty()
    }

    pub fn value_type(&self) -> ValueType {
        self.values.value_type()
    }

    pub fn into_owned(self) -> CollectedColumn<'static> {
        CollectedColumn {
            values: self.values.into_owned(),
            parent_indices: self.parent_indices,
        }
    }

    /// Number of values per parent in `0..num_parents`.
    ///
    /// Parent indices outside that range are ignored.
    pub fn value_counts(&self, num_parents: usize) -> Vec<usize> {
        let mut counts = vec![0usize; num_parents];
        for &parent in &self.parent_indices {
            if let Some(count) = usize::try_from(parent).ok().and_then(|p| counts.get_mut(p)) {
                *count += 1;
            }
        }
        counts
    }
}
