//! Histogram distance metrics normalized to `[0, 1]`.
//!
//! All metrics take two histograms of identical shape and return 0 for
//! identical inputs. Mismatched shapes fail with `ShapeMismatch`.

use crate::histogram::Histogram;
use crate::util::math::{clamp01, safe_div, DIV_EPSILON};
use crate::util::ImgDescResult;
use std::fmt;
use std::str::FromStr;

/// Histogram distance model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Sum of absolute bin differences.
    #[default]
    CityBlock,
    /// Root of summed squared bin differences.
    Euclidean,
    /// One minus the Bhattacharyya coefficient.
    Bhattacharyya,
    /// Match distance between cumulative distributions.
    Mdpa,
}

type MetricFn = fn(&Histogram, &Histogram) -> f64;

impl Metric {
    /// Every metric, in declaration order.
    pub const ALL: [Metric; 4] = [
        Metric::CityBlock,
        Metric::Euclidean,
        Metric::Bhattacharyya,
        Metric::Mdpa,
    ];

    fn function(self) -> MetricFn {
        match self {
            Metric::CityBlock => city_block_unchecked,
            Metric::Euclidean => euclidean_unchecked,
            Metric::Bhattacharyya => bhattacharyya_unchecked,
            Metric::Mdpa => mdpa_unchecked,
        }
    }

    /// Snake-case name used by `Display` and `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            Metric::CityBlock => "city_block",
            Metric::Euclidean => "euclidean",
            Metric::Bhattacharyya => "bhattacharyya",
            Metric::Mdpa => "mdpa",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown metric `{s}`"))
    }
}

/// Distance between `a` and `b` under `metric`.
pub fn distance(a: &Histogram, b: &Histogram, metric: Metric) -> ImgDescResult<f64> {
    a.ensure_same_shape(b)?;
    Ok((metric.function())(a, b))
}

/// `sum |A - B| / (2 * channels)`.
pub fn city_block(a: &Histogram, b: &Histogram) -> ImgDescResult<f64> {
    distance(a, b, Metric::CityBlock)
}

/// `sqrt(sum (A - B)^2) / (channels * sqrt(2))`.
pub fn euclidean(a: &Histogram, b: &Histogram) -> ImgDescResult<f64> {
    distance(a, b, Metric::Euclidean)
}

/// `1 - sum_c BC_c / channels` with `BC_c = sum_i sqrt(A * B)`.
///
/// `BC_c` is taken relative to `sqrt(|A_c| * |B_c|)`, which is 1 for
/// normalized channels. A channel empty on both sides counts as
/// `BC_c = 1`; one empty on one side only counts as 0.
pub fn bhattacharyya(a: &Histogram, b: &Histogram) -> ImgDescResult<f64> {
    distance(a, b, Metric::Bhattacharyya)
}

/// `sum_c sum_i |sum_{j<=i} (A - B)| / (channels * (bins - 1))`.
pub fn mdpa(a: &Histogram, b: &Histogram) -> ImgDescResult<f64> {
    distance(a, b, Metric::Mdpa)
}

fn pairs<'a>(a: &'a Histogram, b: &'a Histogram) -> impl Iterator<Item = (f64, f64)> + 'a {
    a.values()
        .iter()
        .zip(b.values())
        .map(|(&x, &y)| (x as f64, y as f64))
}

fn city_block_unchecked(a: &Histogram, b: &Histogram) -> f64 {
    let sum: f64 = pairs(a, b).map(|(x, y)| (x - y).abs()).sum();
    clamp01(safe_div(sum, 2.0 * a.channels() as f64))
}

fn euclidean_unchecked(a: &Histogram, b: &Histogram) -> f64 {
    let sum: f64 = pairs(a, b).map(|(x, y)| (x - y) * (x - y)).sum();
    clamp01(safe_div(
        sum.sqrt(),
        a.channels() as f64 * std::f64::consts::SQRT_2,
    ))
}

fn mass(bins: &[f32]) -> f64 {
    bins.iter().map(|&v| (v as f64).abs()).sum()
}

fn bhattacharyya_unchecked(a: &Histogram, b: &Histogram) -> f64 {
    let coefficient: f64 = a
        .iter_channels()
        .zip(b.iter_channels())
        .map(|(ca, cb)| {
            let (mass_a, mass_b) = (mass(ca), mass(cb));
            if mass_a < DIV_EPSILON && mass_b < DIV_EPSILON {
                return 1.0;
            }
            let overlap: f64 = ca
                .iter()
                .zip(cb)
                .map(|(&x, &y)| (x as f64 * y as f64).max(0.0).sqrt())
                .sum();
            safe_div(overlap, (mass_a * mass_b).sqrt())
        })
        .sum();
    clamp01(1.0 - safe_div(coefficient, a.channels() as f64))
}

fn mdpa_unchecked(a: &Histogram, b: &Histogram) -> f64 {
    let mut sum = 0.0;
    for (ca, cb) in a.iter_channels().zip(b.iter_channels()) {
        let mut prefix = 0.0;
        for (&x, &y) in ca.iter().zip(cb) {
            prefix += x as f64 - y as f64;
            sum += prefix.abs();
        }
    }
    let denom = a.channels() as f64 * a.bins().saturating_sub(1) as f64;
    clamp01(safe_div(sum, denom))
}

#[cfg(test)]
mod tests {
    use super::{distance, Metric};
    use crate::histogram::Histogram;
    use crate::util::ImgDescError;

    fn spike(bins: usize, at: usize) -> Histogram {
        let mut values = vec![0.0; bins];
        values[at] = 1.0;
        Histogram::from_values(1, bins, values).unwrap()
    }

    #[test]
    fn opposite_spikes_are_maximally_distant() {
        let a = spike(256, 0);
        let b = spike(256, 255);
        assert_eq!(distance(&a, &b, Metric::CityBlock).unwrap(), 1.0);
        assert_eq!(distance(&a, &b, Metric::Bhattacharyya).unwrap(), 1.0);
        assert!((distance(&a, &b, Metric::Mdpa).unwrap() - 1.0).abs() < 1e-12);
        assert!((distance(&a, &b, Metric::Euclidean).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_channels_do_not_count_as_distance() {
        // Mass only in the first channel, as for a pure red image's edges.
        let mut values = vec![0.0; 12];
        values[1] = 1.0;
        let a = Histogram::from_values(3, 4, values).unwrap();
        for metric in Metric::ALL {
            assert_eq!(distance(&a, &a, metric).unwrap(), 0.0, "{metric}");
        }
        let blank = Histogram::from_values(3, 4, vec![0.0; 12]).unwrap();
        assert_eq!(distance(&blank, &blank, Metric::Bhattacharyya).unwrap(), 0.0);
        // Mass on one side only is still a full mismatch for that channel.
        let d = distance(&a, &blank, Metric::Bhattacharyya).unwrap();
        assert!((d - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn partial_mass_matches_itself_under_bhattacharyya() {
        // Top-k shade ratios rarely add up to 1.
        let mut values = vec![0.0; 8];
        values[0] = 0.4;
        values[3] = 0.1;
        values[5] = 0.05;
        let a = Histogram::from_values(1, 8, values).unwrap();
        assert_eq!(distance(&a, &a, Metric::Bhattacharyya).unwrap(), 0.0);
    }

    #[test]
    fn mdpa_grows_with_bin_offset() {
        let a = spike(8, 0);
        let near = distance(&a, &spike(8, 1), Metric::Mdpa).unwrap();
        let far = distance(&a, &spike(8, 6), Metric::Mdpa).unwrap();
        assert!(near < far);
        assert!((near - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let a = spike(4, 0);
        let b = spike(8, 0);
        for metric in Metric::ALL {
            assert_eq!(
                distance(&a, &b, metric).err(),
                Some(ImgDescError::ShapeMismatch {
                    left_channels: 1,
                    left_bins: 4,
                    right_channels: 1,
                    right_bins: 8,
                })
            );
        }
    }

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
        assert!("cosine".parse::<Metric>().is_err());
    }
}
