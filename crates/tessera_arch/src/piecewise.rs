//! Piecewise-linear breakpoint tables over the fabric's horizontal axis.
//!
//! A [`PiecewiseTable`] gives, for every integer column boundary `x` in
//! `[0, width]`, the number of columns of one resource kind lying in some
//! fixed window left of `x`. Inside each [`Segment`] the count is the line
//! `slope * x + offset`, so a solver can select a segment with one binary and
//! pin the count to that line.

use serde::{Deserialize, Serialize};

/// One interval of a breakpoint table.
///
/// Covers the integer boundaries `lo..=hi`. For logic columns the slope is 1
/// across a run of consecutive logic columns; memory and DSP tables are mostly
/// flat with single-column steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// First boundary covered.
    pub lo: u32,
    /// Last boundary covered.
    pub hi: u32,
    /// Count increase per column.
    pub slope: i64,
    /// Count at `x = 0` when the line is extended.
    pub offset: i64,
}

impl Segment {
    /// Evaluates the segment's line at `x`.
    pub fn value_at(&self, x: u32) -> i64 {
        self.slope * i64::from(x) + self.offset
    }

    /// Returns `true` if `x` lies in `lo..=hi`.
    pub fn contains(&self, x: u32) -> bool {
        x >= self.lo && x <= self.hi
    }
}

/// A monotone non-decreasing cumulative count function, stored as segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiecewiseTable {
    segments: Vec<Segment>,
}

impl PiecewiseTable {
    /// Builds a table from cumulative counts, where `values[x]` is the count
    /// at boundary `x`. Consecutive boundaries whose increments agree are
    /// merged into one segment.
    pub fn from_cumulative(values: &[i64]) -> Self {
        let n = values.len();
        let mut segments = Vec::new();
        let mut lo = 0;
        while lo < n {
            if lo + 1 == n {
                segments.push(Segment {
                    lo: lo as u32,
                    hi: lo as u32,
                    slope: 0,
                    offset: values[lo],
                });
                break;
            }
            let slope = values[lo + 1] - values[lo];
            let mut hi = lo + 1;
            while hi + 1 < n && values[hi + 1] - values[hi] == slope {
                hi += 1;
            }
            segments.push(Segment {
                lo: lo as u32,
                hi: hi as u32,
                slope,
                offset: values[lo] - slope * lo as i64,
            });
            lo = hi + 1;
        }
        Self { segments }
    }

    /// Builds the table counting columns that satisfy `is_counted` within the
    /// window `[from, to)`, for boundaries `0..=width`.
    pub fn counting(width: u32, from: u32, to: u32, is_counted: impl Fn(u32) -> bool) -> Self {
        let mut values = Vec::with_capacity(width as usize + 1);
        let mut acc = 0i64;
        values.push(0);
        for col in 0..width {
            if col >= from && col < to && is_counted(col) {
                acc += 1;
            }
            values.push(acc);
        }
        Self::from_cumulative(&values)
    }

    /// The segments in increasing `x` order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The last boundary covered by the table.
    pub fn width(&self) -> u32 {
        self.segments.last().map_or(0, |s| s.hi)
    }

    /// Returns the segment containing boundary `x`.
    pub fn segment_of(&self, x: u32) -> Option<(usize, &Segment)> {
        self.segments
            .iter()
            .enumerate()
            .find(|(_, s)| s.contains(x))
    }

    /// Evaluates the table at boundary `x`, or `None` past the fabric edge.
    pub fn eval(&self, x: u32) -> Option<i64> {
        self.segment_of(x).map(|(_, s)| s.value_at(x))
    }

    /// The count at the right fabric edge, which is the table's maximum.
    pub fn max_value(&self) -> i64 {
        self.segments
            .last()
            .map_or(0, |s| s.value_at(s.hi))
    }

    /// A constant large enough to deactivate any segment's pinning constraints
    /// anywhere on the fabric.
    pub fn big_m(&self) -> f64 {
        let worst_line = self
            .segments
            .iter()
            .map(|s| s.value_at(0).abs().max(s.value_at(self.width()).abs()))
            .max()
            .unwrap_or(0);
        (2 * i64::from(self.width()) + worst_line + self.max_value() + 1) as f64
    }

    /// Returns `true` if the table never decreases between adjacent boundaries.
    pub fn is_monotone(&self) -> bool {
        let mut prev = i64::MIN;
        for x in 0..=self.width() {
            match self.eval(x) {
                Some(v) if v >= prev => prev = v,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logic_runs_become_offset_lines() {
        // C C B C D C
        let cols = ['C', 'C', 'B', 'C', 'D', 'C'];
        let t = PiecewiseTable::counting(6, 0, 6, |c| cols[c as usize] == 'C');
        let segs = t.segments();
        assert_eq!(segs.len(), 3);
        assert_eq!((segs[0].lo, segs[0].hi, segs[0].slope, segs[0].offset), (0, 2, 1, 0));
        assert_eq!((segs[1].lo, segs[1].hi, segs[1].slope, segs[1].offset), (3, 4, 1, -1));
        assert_eq!((segs[2].lo, segs[2].hi, segs[2].slope, segs[2].offset), (5, 6, 1, -2));
        let expected = [0, 1, 2, 2, 3, 3, 4];
        for (x, want) in expected.iter().enumerate() {
            assert_eq!(t.eval(x as u32), Some(*want));
        }
    }

    #[test]
    fn sparse_columns_become_steps() {
        let cols = ['C', 'C', 'B', 'C', 'C', 'B', 'C'];
        let t = PiecewiseTable::counting(7, 0, 7, |c| cols[c as usize] == 'B');
        assert_eq!(t.eval(0), Some(0));
        assert_eq!(t.eval(2), Some(0));
        assert_eq!(t.eval(3), Some(1));
        assert_eq!(t.eval(5), Some(1));
        assert_eq!(t.eval(6), Some(2));
        assert_eq!(t.eval(7), Some(2));
        assert_eq!(t.max_value(), 2);
        assert!(t.is_monotone());
    }

    #[test]
    fn window_clips_count() {
        let t = PiecewiseTable::counting(8, 2, 5, |_| true);
        let got: Vec<i64> = (0..=8).map(|x| t.eval(x).unwrap()).collect();
        assert_eq!(got, vec![0, 0, 0, 1, 2, 3, 3, 3, 3]);
    }

    #[test]
    fn segments_partition_boundaries() {
        let t = PiecewiseTable::counting(10, 0, 10, |c| c % 3 != 0);
        let mut next = 0;
        for s in t.segments() {
            assert_eq!(s.lo, next);
            assert!(s.hi >= s.lo);
            next = s.hi + 1;
        }
        assert_eq!(next, 11);
        assert_eq!(t.width(), 10);
    }

    #[test]
    fn eval_past_edge_is_none() {
        let t = PiecewiseTable::counting(3, 0, 3, |_| true);
        assert_eq!(t.eval(3), Some(3));
        assert_eq!(t.eval(4), None);
    }

    #[test]
    fn big_m_dominates_values() {
        let t = PiecewiseTable::counting(12, 0, 12, |c| c % 2 == 0);
        let m = t.big_m();
        for x in 0..=12u32 {
            for s in t.segments() {
                assert!((s.value_at(x) as f64).abs() < m);
            }
        }
        assert!(m > 12.0);
    }

    #[test]
    fn single_boundary_table() {
        let t = PiecewiseTable::from_cumulative(&[0]);
        assert_eq!(t.segments().len(), 1);
        assert_eq!(t.eval(0), Some(0));
    }
}
