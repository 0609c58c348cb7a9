//! Running median filter

/// Median buffer capacity
pub const MAX_MEDIAN_WINDOW: usize = 16;

/// Median over the last `window` samples
///
/// The median is recomputed each call by a partial selection sort on a
/// stack copy of the window, which is cheap at 16 samples and keeps the
/// state a plain circular buffer. Even-sized windows average the two
/// middle samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MedianState {
    buffer: [i32; MAX_MEDIAN_WINDOW],
    index: u8,
    count: u8,
}

impl Default for MedianState {
    fn default() -> Self {
        Self::new()
    }
}

impl MedianState {
    pub const fn new() -> Self {
        Self {
            buffer: [0; MAX_MEDIAN_WINDOW],
            index: 0,
            count: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count as usize
    }

    pub fn update(&mut self, input: i32, window: u8) -> i32 {
        let window = (window as usize).clamp(1, MAX_MEDIAN_WINDOW);
        if self.count as usize > window {
            *self = Self::new();
        }

        let slot = self.index as usize % window;
        self.buffer[slot] = input;
        self.index = ((slot + 1) % window) as u8;
        if (self.count as usize) < window {
            self.count += 1;
        }

        let n = self.count as usize;
        let mut sorted = [0i32; MAX_MEDIAN_WINDOW];
        sorted[..n].copy_from_slice(&self.buffer[..n]);
        median_of(&mut sorted[..n])
    }
}

/// Median of `values`, reordering them in place
///
/// Only sorts up to the middle element. An empty slice yields 0.
pub fn median_of(values: &mut [i32]) -> i32 {
    let n = values.len();
    if n == 0 {
        return 0;
    }
    let mid = n / 2;
    for i in 0..=mid {
        let mut min_idx = i;
        for j in (i + 1)..n {
            if values[j] < values[min_idx] {
                min_idx = j;
            }
        }
        values.swap(i, min_idx);
    }

    if n % 2 == 1 {
        values[mid]
    } else {
        ((values[mid - 1] as i64 + values[mid] as i64) / 2) as i32
    }
}
