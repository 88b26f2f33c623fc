use serde::{Deserialize, Serialize};

use crate::core::types::ValueRange;
use crate::error::{ChartError, ChartResult};

/// Continuous linear mapping from a data domain onto a pixel range.
///
/// A degenerate domain (`start == end`) maps every value onto the middle of
/// the range instead of failing, so flat series still draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start: 0.0,
            range_end: 1.0,
        })
    }

    pub fn from_range(domain: ValueRange) -> ChartResult<Self> {
        Self::new(domain.min, domain.max)
    }

    pub fn with_range(mut self, range_start: f64, range_end: f64) -> ChartResult<Self> {
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }
        self.range_start = range_start;
        self.range_end = range_end;
        Ok(self)
    }

    pub fn with_domain(mut self, domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }
        self.domain_start = domain_start;
        self.domain_end = domain_end;
        Ok(self)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Domain as an ordered interval regardless of scale direction.
    #[must_use]
    pub fn domain_extent(self) -> ValueRange {
        ValueRange::new(
            self.domain_start.min(self.domain_end),
            self.domain_start.max(self.domain_end),
        )
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = if span == 0.0 {
            0.5
        } else {
            (value - self.domain_start) / span
        };
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        let normalized = if span == 0.0 {
            0.5
        } else {
            (pixel - self.range_start) / span
        };
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    /// Round tick values covering the domain, approximately `count` of them.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        ticks(self.domain_start, self.domain_end, count as f64)
    }

    /// Distance between consecutive ticks for `count`, used to pick label precision.
    #[must_use]
    pub fn tick_step(self, count: usize) -> f64 {
        let extent = self.domain_extent();
        tick_increment_step(extent.min, extent.max, count as f64)
    }
}

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let positive_inc = 10f64.powf(-power) / factor;
        i1 = (start * positive_inc).round();
        i2 = (stop * positive_inc).round();
        if i1 / positive_inc < start {
            i1 += 1.0;
        }
        if i2 / positive_inc > stop {
            i2 -= 1.0;
        }
        inc = -positive_inc;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Nice tick values between `start` and `stop`.
#[must_use]
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count);
    if !(i2 >= i1) || !inc.is_finite() {
        return Vec::new();
    }

    let n = (i2 - i1 + 1.0) as usize;
    let mut values: Vec<f64> = (0..n)
        .map(|i| {
            let index = i1 + i as f64;
            if inc < 0.0 { index / -inc } else { index * inc }
        })
        .collect();
    if reverse {
        values.reverse();
    }
    values
}

fn tick_increment_step(start: f64, stop: f64, count: f64) -> f64 {
    if !(count > 0.0) || !(stop > start) {
        return 1.0;
    }
    let (_, _, inc) = tick_spec(start, stop, count);
    if inc < 0.0 { 1.0 / -inc } else { inc }
}

#[cfg(test)]
mod tests {
    use super::{LinearScale, ticks};
    use approx::assert_abs_diff_eq;

    #[test]
    fn ticks_follow_one_two_five_progression() {
        assert_eq!(ticks(0.0, 10.0, 5.0), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks(0.0, 1.0, 10.0).len(), 11);
        assert_eq!(ticks(5.0, 5.0, 10.0), vec![5.0]);
    }

    #[test]
    fn ticks_respect_reversed_domain() {
        let values = ticks(10.0, 0.0, 5.0);
        assert_eq!(values.first().copied(), Some(10.0));
        assert_eq!(values.last().copied(), Some(0.0));
    }

    #[test]
    fn inverted_range_maps_top_to_max() {
        let scale = LinearScale::new(0.0, 30.0)
            .and_then(|s| s.with_range(100.0, 0.0))
            .expect("scale");
        assert_abs_diff_eq!(scale.map(30.0), 0.0);
        assert_abs_diff_eq!(scale.map(0.0), 100.0);
        assert_abs_diff_eq!(scale.invert(50.0), 15.0);
    }

    #[test]
    fn degenerate_domain_maps_to_midpoint() {
        let scale = LinearScale::new(4.0, 4.0)
            .and_then(|s| s.with_range(0.0, 200.0))
            .expect("scale");
        assert_abs_diff_eq!(scale.map(4.0), 100.0);
        assert_abs_diff_eq!(scale.map(99.0), 100.0);
    }

    #[test]
    fn non_finite_domain_is_rejected() {
        assert!(LinearScale::new(f64::NAN, 1.0).is_err());
        assert!(LinearScale::new(0.0, f64::INFINITY).is_err());
    }
}
