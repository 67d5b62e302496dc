//! Raw detection tensor views.
//!
//! A detection head emits one attribute vector per anchor:
//! `[cx, cy, w, h, objectness, class_0 .. class_{K-1}]`. `TensorView` borrows
//! the flat output buffer and resolves `(anchor, attribute)` pairs for either
//! memory layout without copying. Per-anchor access goes through
//! [`AnchorView`], which the scorer reads lazily so that anchors rejected on
//! objectness never touch their class logits.

use crate::util::{DecodeError, DecodeResult};

/// Number of leading box and objectness attributes before the class logits.
pub const BOX_ATTRIBUTES: usize = 5;

/// Memory order of the flat tensor buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[num_attributes][num_anchors]`: each attribute is a contiguous row.
    #[default]
    AttributeMajor,
    /// `[num_anchors][num_attributes]`: each anchor is a contiguous row.
    AnchorMajor,
}

/// Borrowed, immutable view over a raw detection tensor.
#[derive(Copy, Clone, Debug)]
pub struct TensorView<'a> {
    data: &'a [f32],
    num_attributes: usize,
    num_anchors: usize,
    layout: TensorLayout,
}

impl<'a> TensorView<'a> {
    /// Creates a view with an explicit layout.
    pub fn new(
        data: &'a [f32],
        num_attributes: usize,
        num_anchors: usize,
        layout: TensorLayout,
    ) -> DecodeResult<Self> {
        let expected = required_len(num_attributes, num_anchors)?;
        if data.len() != expected {
            return Err(DecodeError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            num_attributes,
            num_anchors,
            layout,
        })
    }

    /// Creates a `[num_attributes][num_anchors]` view.
    pub fn attribute_major(
        data: &'a [f32],
        num_attributes: usize,
        num_anchors: usize,
    ) -> DecodeResult<Self> {
        Self::new(data, num_attributes, num_anchors, TensorLayout::AttributeMajor)
    }

    /// Creates a `[num_anchors][num_attributes]` view.
    pub fn anchor_major(
        data: &'a [f32],
        num_attributes: usize,
        num_anchors: usize,
    ) -> DecodeResult<Self> {
        Self::new(data, num_attributes, num_anchors, TensorLayout::AnchorMajor)
    }

    pub fn num_attributes(&self) -> usize {
        self.num_attributes
    }

    pub fn num_anchors(&self) -> usize {
        self.num_anchors
    }

    /// Number of class logits per anchor.
    pub fn num_classes(&self) -> usize {
        self.num_attributes.saturating_sub(BOX_ATTRIBUTES)
    }

    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the value of `attribute` for `anchor`, if both are in range.
    pub fn get(&self, anchor: usize, attribute: usize) -> Option<f32> {
        if anchor >= self.num_anchors || attribute >= self.num_attributes {
            return None;
        }
        self.data.get(self.index(anchor, attribute)).copied()
    }

    /// Returns a per-anchor accessor, or `None` past the last anchor.
    pub fn anchor(&self, anchor: usize) -> Option<AnchorView<'a>> {
        if anchor >= self.num_anchors {
            return None;
        }
        Some(AnchorView {
            tensor: *self,
            anchor,
        })
    }

    /// Iterates over all anchors in index order.
    pub fn anchors(&self) -> impl Iterator<Item = AnchorView<'a>> + 'a {
        let tensor = *self;
        (0..tensor.num_anchors).map(move |anchor| AnchorView { tensor, anchor })
    }

    #[inline]
    fn index(&self, anchor: usize, attribute: usize) -> usize {
        match self.layout {
            TensorLayout::AttributeMajor => attribute * self.num_anchors + anchor,
            TensorLayout::AnchorMajor => anchor * self.num_attributes + attribute,
        }
    }
}

/// Attribute vector of a single anchor inside a [`TensorView`].
#[derive(Copy, Clone, Debug)]
pub struct AnchorView<'a> {
    tensor: TensorView<'a>,
    anchor: usize,
}

impl<'a> AnchorView<'a> {
    /// Index of this anchor in the tensor.
    pub fn index(&self) -> usize {
        self.anchor
    }

    /// Number of attributes carried by the anchor.
    pub fn len(&self) -> usize {
        self.tensor.num_attributes
    }

    pub fn is_empty(&self) -> bool {
        self.tensor.num_attributes == 0
    }

    /// Returns attribute `attribute`, or `None` when out of range.
    pub fn get(&self, attribute: usize) -> Option<f32> {
        if attribute >= self.tensor.num_attributes {
            return None;
        }
        self.tensor
            .data
            .get(self.tensor.index(self.anchor, attribute))
            .copied()
    }

    /// Copies the attribute vector out; mostly useful for tests and debugging.
    pub fn to_vec(&self) -> Vec<f32> {
        (0..self.len()).filter_map(|attr| self.get(attr)).collect()
    }
}

/// Owned detection tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedTensor {
    data: Vec<f32>,
    num_attributes: usize,
    num_anchors: usize,
    layout: TensorLayout,
}

impl OwnedTensor {
    /// Creates an owned tensor, validating the buffer length.
    pub fn new(
        data: Vec<f32>,
        num_attributes: usize,
        num_anchors: usize,
        layout: TensorLayout,
    ) -> DecodeResult<Self> {
        TensorView::new(&data, num_attributes, num_anchors, layout)?;
        Ok(Self {
            data,
            num_attributes,
            num_anchors,
            layout,
        })
    }

    /// Builds an attribute-major tensor from nested `[attribute][anchor]` rows.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> DecodeResult<Self> {
        let num_attributes = rows.len();
        let num_anchors = rows.first().map_or(0, |row| row.as_ref().len());
        let expected = required_len(num_attributes, num_anchors)?;

        let mut data = Vec::with_capacity(expected);
        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != num_anchors {
                return Err(DecodeError::RaggedRows {
                    row: row_idx,
                    expected: num_anchors,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            num_attributes,
            num_anchors,
            layout: TensorLayout::AttributeMajor,
        })
    }

    /// Returns a borrowed view of the tensor.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            data: &self.data,
            num_attributes: self.num_attributes,
            num_anchors: self.num_anchors,
            layout: self.layout,
        }
    }

    /// Returns the backing buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

fn required_len(num_attributes: usize, num_anchors: usize) -> DecodeResult<usize> {
    if num_attributes == 0 || num_anchors == 0 {
        return Err(DecodeError::InvalidDimensions {
            attributes: num_attributes,
            anchors: num_anchors,
        });
    }
    num_attributes
        .checked_mul(num_anchors)
        .ok_or(DecodeError::InvalidDimensions {
            attributes: num_attributes,
            anchors: num_anchors,
        })
}
