//! Strided slice addressing for bulk assignment
//!
//! Slices follow the usual start/stop/step rules of sequence slicing:
//! missing bounds default to the ends, negative bounds count from the end,
//! out-of-range bounds are clamped and a negative step walks backwards.

use crate::error::{Error, Result};
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

/// Slice description before it is bound to an array length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceSpec {
    /// First index (inclusive), `None` for the natural start
    pub start: Option<i64>,
    /// Last index (exclusive), `None` for the natural end
    pub stop: Option<i64>,
    /// Stride, `None` for 1
    pub step: Option<i64>,
}

/// Slice resolved against a concrete length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSlice {
    start: i64,
    step: i64,
    len: usize,
}

impl SliceSpec {
    /// Slice with explicit optional bounds and step
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Slice covering everything
    pub fn full() -> Self {
        Self::default()
    }

    /// Same bounds with a different step
    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Bind the slice to a sequence of `len` elements
    pub fn resolve(&self, len: usize) -> Result<ResolvedSlice> {
        // Clamped so the step can always be negated
        let step = self.step.unwrap_or(1).max(-i64::MAX);
        if step == 0 {
            return Err(Error::InvalidSlice("slice step cannot be zero".to_string()));
        }

        let len_i = i64::try_from(len)
            .map_err(|_| Error::InvalidSlice(format!("length {} too large", len)))?;

        let clamp = |bound: i64| -> i64 {
            if bound < 0 {
                let b = bound + len_i;
                if b < 0 {
                    if step < 0 { -1 } else { 0 }
                } else {
                    b
                }
            } else if bound >= len_i {
                if step < 0 { len_i - 1 } else { len_i }
            } else {
                bound
            }
        };

        let start = match self.start {
            Some(s) => clamp(s),
            None if step < 0 => len_i - 1,
            None => 0,
        };
        let stop = match self.stop {
            Some(s) => clamp(s),
            None if step < 0 => -1,
            None => len_i,
        };

        let count = if step < 0 {
            if stop < start {
                (start - stop - 1) / (-step) + 1
            } else {
                0
            }
        } else if start < stop {
            (stop - start - 1) / step + 1
        } else {
            0
        };

        Ok(ResolvedSlice {
            start,
            step,
            len: count as usize,
        })
    }
}

impl ResolvedSlice {
    /// Number of elements addressed
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the slice addresses nothing
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Addressed indices in assignment order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len as i64).map(move |k| (self.start + k * self.step) as usize)
    }
}

/// Bound as i64, saturating so huge bounds clamp to the end
fn bound(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

impl From<Range<usize>> for SliceSpec {
    fn from(r: Range<usize>) -> Self {
        Self::new(Some(bound(r.start)), Some(bound(r.end)), None)
    }
}

impl From<RangeInclusive<usize>> for SliceSpec {
    fn from(r: RangeInclusive<usize>) -> Self {
        Self::new(
            Some(bound(*r.start())),
            Some(bound(*r.end()).saturating_add(1)),
            None,
        )
    }
}

impl From<RangeFrom<usize>> for SliceSpec {
    fn from(r: RangeFrom<usize>) -> Self {
        Self::new(Some(bound(r.start)), None, None)
    }
}

impl From<RangeTo<usize>> for SliceSpec {
    fn from(r: RangeTo<usize>) -> Self {
        Self::new(None, Some(bound(r.end)), None)
    }
}

/// Borrowed values with a shape, as handed over by a binding layer
///
/// Only one-dimensional views can be assigned into an array.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferView<'a, R> {
    data: &'a [R],
    shape: Vec<usize>,
}

impl<'a, R> BufferView<'a, R> {
    /// One-dimensional view of `data`
    pub fn flat(data: &'a [R]) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// View of `data` with an explicit shape
    ///
    /// The product of `shape` must equal `data.len()`.
    pub fn with_shape(data: &'a [R], shape: &[usize]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(Error::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
        })
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the view holds no values
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values in row-major order
    pub fn data(&self) -> &'a [R] {
        self.data
    }
}

impl<'a, R> From<&'a [R]> for BufferView<'a, R> {
    fn from(data: &'a [R]) -> Self {
        Self::flat(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(spec: SliceSpec, len: usize) -> Vec<usize> {
        spec.resolve(len).unwrap().indices().collect()
    }

    #[test]
    fn test_full_and_ranges() {
        assert_eq!(indices(SliceSpec::full(), 4), vec![0, 1, 2, 3]);
        assert_eq!(indices((1..3).into(), 5), vec![1, 2]);
        assert_eq!(indices((1..=3).into(), 5), vec![1, 2, 3]);
        assert_eq!(indices((3..).into(), 5), vec![3, 4]);
        assert_eq!(indices((..2).into(), 5), vec![0, 1]);
    }

    #[test]
    fn test_step() {
        assert_eq!(indices(SliceSpec::full().with_step(2), 7), vec![0, 2, 4, 6]);
        assert_eq!(indices(SliceSpec::from(1..7).with_step(3), 10), vec![1, 4]);
    }

    #[test]
    fn test_negative_step() {
        assert_eq!(indices(SliceSpec::full().with_step(-1), 4), vec![3, 2, 1, 0]);
        assert_eq!(
            indices(SliceSpec::new(Some(5), Some(1), Some(-2)), 10),
            vec![5, 3]
        );
    }

    #[test]
    fn test_negative_bounds_and_clamping() {
        assert_eq!(indices(SliceSpec::new(Some(-2), None, None), 5), vec![3, 4]);
        assert_eq!(indices(SliceSpec::new(Some(-100), Some(2), None), 5), vec![0, 1]);
        assert_eq!(indices(SliceSpec::new(Some(3), Some(100), None), 5), vec![3, 4]);
        assert!(indices(SliceSpec::new(Some(4), Some(2), None), 5).is_empty());
    }

    #[test]
    fn test_empty_sequence() {
        let resolved = SliceSpec::full().resolve(0).unwrap();
        assert!(resolved.is_empty());
        let resolved = SliceSpec::full().with_step(-1).resolve(0).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_extreme_step() {
        assert_eq!(indices(SliceSpec::full().with_step(i64::MIN), 4), vec![3]);
        assert_eq!(indices(SliceSpec::full().with_step(i64::MAX), 4), vec![0]);
        assert!(indices(SliceSpec::full().with_step(i64::MIN), 0).is_empty());
    }

    #[test]
    fn test_huge_range_bounds_address_nothing() {
        assert!(indices((usize::MAX..).into(), 4).is_empty());
        assert!(indices((usize::MAX..=usize::MAX).into(), 4).is_empty());
        assert_eq!(indices((2..usize::MAX).into(), 4), vec![2, 3]);
        assert_eq!(indices((..usize::MAX).into(), 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_step_rejected() {
        let err = SliceSpec::full().with_step(0).resolve(5).unwrap_err();
        assert!(matches!(err, Error::InvalidSlice(_)));
    }

    #[test]
    fn test_buffer_view_shape() {
        let data = [1u32, 2, 3, 4, 5, 6];
        let flat = BufferView::flat(&data);
        assert_eq!(flat.ndim(), 1);
        assert_eq!(flat.len(), 6);

        let grid = BufferView::with_shape(&data, &[2, 3]).unwrap();
        assert_eq!(grid.ndim(), 2);

        let err = BufferView::with_shape(&data, &[4, 2]).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 8, actual: 6 }));
    }
}
