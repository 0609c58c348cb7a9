//! Lookup tables with linear and bilinear interpolation
//!
//! Breakpoints are expected to be strictly increasing. That is checked when
//! configuration is validated, not here: a malformed table still produces a
//! defined result, it just may not be a meaningful one.
//!
//! Queries outside the breakpoint range clamp to the first/last value. The
//! curve is never extrapolated past its end points.

use crate::math::saturate_wide;

/// Find the left index of the segment containing `x`
///
/// The result is clamped to `[0, len - 2]` so it always names a valid
/// segment (or 0 for tables with fewer than two points).
pub fn find_index(xs: &[i32], x: i32) -> usize {
    if xs.len() < 2 {
        return 0;
    }
    let last_segment = xs.len() - 2;

    let mut lo = 0usize;
    let mut hi = xs.len() - 1;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if x < xs[mid] {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    lo.min(last_segment)
}

/// Interpolate between `(x0, y0)` and `(x1, y1)` with `x` clamped to the segment
fn lerp(x0: i32, x1: i32, y0: i32, y1: i32, x: i32) -> i32 {
    if x1 <= x0 {
        return y0;
    }
    let x = x.clamp(x0, x1);
    let num = (x as i128 - x0 as i128) * (y1 as i128 - y0 as i128);
    saturate_wide(y0 as i128 + num / (x1 as i128 - x0 as i128))
}

/// One-dimensional lookup table
#[derive(Debug, Clone, Copy)]
pub struct Table2D<'a> {
    x: &'a [i32],
    y: &'a [i32],
}

impl<'a> Table2D<'a> {
    /// Create a table view; the shorter of the two slices sets the length
    pub fn new(x: &'a [i32], y: &'a [i32]) -> Self {
        let n = x.len().min(y.len());
        Self {
            x: &x[..n],
            y: &y[..n],
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Linearly interpolated value at `x`
    pub fn lookup(&self, x: i32) -> i32 {
        match self.len() {
            0 => 0,
            1 => self.y[0],
            _ => {
                let i = find_index(self.x, x);
                lerp(self.x[i], self.x[i + 1], self.y[i], self.y[i + 1], x)
            }
        }
    }

    /// Value of the last breakpoint at or below `x`, without interpolation
    ///
    /// Queries below the first breakpoint return the first value.
    pub fn lookup_raw(&self, x: i32) -> i32 {
        match self.len() {
            0 => 0,
            n if x >= self.x[n - 1] => self.y[n - 1],
            _ => self.y[find_index(self.x, x)],
        }
    }
}

/// Two-dimensional lookup table over an X/Y grid
///
/// `z` is row-major: the value for `(x[i], y[j])` lives at `z[j * stride + i]`.
#[derive(Debug, Clone, Copy)]
pub struct Table3D<'a> {
    x: &'a [i32],
    y: &'a [i32],
    z: &'a [i32],
    stride: usize,
}

impl<'a> Table3D<'a> {
    pub fn new(x: &'a [i32], y: &'a [i32], z: &'a [i32], stride: usize) -> Self {
        Self { x, y, z, stride }
    }

    /// Grid cell value; cells outside `z` read 0
    fn cell(&self, xi: usize, yi: usize) -> i32 {
        self.z.get(yi * self.stride + xi).copied().unwrap_or(0)
    }

    /// Interpolate along X on grid row `yi`
    fn row(&self, yi: usize, x: i32) -> i32 {
        if self.x.len() < 2 {
            return self.cell(0, yi);
        }
        let xi = find_index(self.x, x);
        lerp(
            self.x[xi],
            self.x[xi + 1],
            self.cell(xi, yi),
            self.cell(xi + 1, yi),
            x,
        )
    }

    /// Bilinear interpolation at `(x, y)`
    ///
    /// A single-point axis collapses the lookup to 1D along the other axis;
    /// a 1x1 grid returns its only cell.
    pub fn lookup(&self, x: i32, y: i32) -> i32 {
        if self.x.is_empty() || self.y.is_empty() {
            return 0;
        }
        if self.y.len() < 2 {
            return self.row(0, x);
        }
        let yi = find_index(self.y, y);
        let lower = self.row(yi, x);
        let upper = self.row(yi + 1, x);
        lerp(self.y[yi], self.y[yi + 1], lower, upper, y)
    }
}
