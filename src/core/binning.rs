use crate::core::scale::ticks;
use crate::core::types::ValueRange;

/// One histogram bucket over x with the spread of the y-values inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XBin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
    /// `max(y) - min(y)` of the samples in the bucket; `None` for empty buckets.
    pub spread: Option<f64>,
}

/// Buckets `(x, y)` samples by x using nice thresholds close to `bin_count`.
///
/// The last bucket is closed on the right so the maximum x lands inside it.
#[must_use]
pub fn bin_by_x(samples: &[(f64, f64)], bin_count: usize) -> Vec<XBin> {
    let Some(extent) = ValueRange::from_values(samples.iter().map(|(x, _)| *x)) else {
        return Vec::new();
    };
    if bin_count == 0 {
        return Vec::new();
    }

    let mut edges = vec![extent.min];
    edges.extend(
        ticks(extent.min, extent.max, bin_count as f64)
            .into_iter()
            .filter(|t| *t > extent.min && *t < extent.max),
    );
    edges.push(extent.max);

    let mut bins: Vec<XBin> = edges
        .windows(2)
        .map(|w| XBin {
            x0: w[0],
            x1: w[1],
            count: 0,
            spread: None,
        })
        .collect();
    if bins.is_empty() {
        bins.push(XBin {
            x0: extent.min,
            x1: extent.max,
            count: 0,
            spread: None,
        });
    }

    let mut extents: Vec<Option<ValueRange>> = vec![None; bins.len()];
    let last = bins.len() - 1;
    for &(x, y) in samples {
        if !x.is_finite() {
            continue;
        }
        let index = bins
            .iter()
            .position(|b| x < b.x1)
            .unwrap_or(last)
            .min(last);
        bins[index].count += 1;
        if y.is_finite() {
            extents[index] = Some(match extents[index] {
                None => ValueRange::new(y, y),
                Some(r) => ValueRange::new(r.min.min(y), r.max.max(y)),
            });
        }
    }

    for (bin, extent) in bins.iter_mut().zip(extents) {
        bin.spread = extent.map(ValueRange::span);
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::bin_by_x;

    #[test]
    fn spreads_are_computed_per_bucket() {
        let samples = [(0.0, 1.0), (1.0, 4.0), (5.0, 2.0), (9.0, 2.0), (10.0, 7.0)];
        let bins = bin_by_x(&samples, 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].spread, Some(3.0));
        assert_eq!(bins[1].count, 3);
        assert_eq!(bins[1].spread, Some(5.0));
    }

    #[test]
    fn empty_input_yields_no_bins() {
        assert!(bin_by_x(&[], 10).is_empty());
        assert!(bin_by_x(&[(1.0, 1.0)], 0).is_empty());
    }

    #[test]
    fn single_x_value_lands_in_one_bucket() {
        let bins = bin_by_x(&[(3.0, 1.0), (3.0, 5.0)], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].spread, Some(4.0));
    }
}
