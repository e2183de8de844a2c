//! Raw, central and scale-normalized image moments per RGB channel.
//!
//! Moments weight pixel coordinates by the channel value:
//! `M[p,q,k] = sum x^p * y^q * color[k](x, y)`. Central moments subtract the
//! channel's own centroid first, and `eta[p,q] = mu[p,q] / M00^(1 + (p+q)/2)`
//! removes the dependence on scale. Two invariants are derived per channel:
//!
//! - first: `eta20 + eta02`
//! - second: `(eta20 - eta02)^2 + 4 * eta11^2`
//!
//! Both passes run as banded partial sums folded after the join.

use crate::histogram::RGB_CHANNELS;
use crate::image::PixelBuffer;
use crate::parallel::ParallelReducer;
use crate::trace::{trace_event, trace_span};
use crate::util::math::safe_div;
use crate::util::ImgDescResult;
use std::ops::Range;

/// Per-channel moment sums.
pub type ChannelSums = [f64; RGB_CHANNELS];

/// Raw moments up to second order for one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m11: f64,
    pub m20: f64,
    pub m02: f64,
}

impl RawMoments {
    fn merge(&mut self, other: &RawMoments) {
        self.m00 += other.m00;
        self.m10 += other.m10;
        self.m01 += other.m01;
        self.m11 += other.m11;
        self.m20 += other.m20;
        self.m02 += other.m02;
    }

    /// Intensity-weighted centroid `(cx, cy)`; zero mass yields the origin.
    pub fn centroid(&self) -> (f64, f64) {
        (safe_div(self.m10, self.m00), safe_div(self.m01, self.m00))
    }
}

/// Second-order central moments for one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CentralMoments {
    pub mu11: f64,
    pub mu20: f64,
    pub mu02: f64,
}

impl CentralMoments {
    fn merge(&mut self, other: &CentralMoments) {
        self.mu11 += other.mu11;
        self.mu20 += other.mu20;
        self.mu02 += other.mu02;
    }
}

/// Scale-normalized second-order moments for one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedMoments {
    pub eta11: f64,
    pub eta20: f64,
    pub eta02: f64,
}

impl NormalizedMoments {
    /// Scale-normalizes central moments by the channel mass `m00`.
    pub fn from_central(central: &CentralMoments, m00: f64) -> Self {
        Self {
            eta11: normalized_moment(central.mu11, m00, 1, 1),
            eta20: normalized_moment(central.mu20, m00, 2, 0),
            eta02: normalized_moment(central.mu02, m00, 0, 2),
        }
    }

    /// `eta20 + eta02`.
    pub fn first_invariant(&self) -> f64 {
        self.eta20 + self.eta02
    }

    /// `(eta20 - eta02)^2 + 4 * eta11^2`.
    pub fn second_invariant(&self) -> f64 {
        let diff = self.eta20 - self.eta02;
        diff * diff + 4.0 * self.eta11 * self.eta11
    }
}

/// Full moment analysis of an image.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentDescriptor {
    pub raw: [RawMoments; RGB_CHANNELS],
    pub central: [CentralMoments; RGB_CHANNELS],
    pub normalized: [NormalizedMoments; RGB_CHANNELS],
}

impl MomentDescriptor {
    /// Per-channel centroids.
    pub fn centroids(&self) -> [(f64, f64); RGB_CHANNELS] {
        self.raw.map(|m| m.centroid())
    }

    /// Per-channel first-order invariants.
    pub fn first_invariants(&self) -> [f64; RGB_CHANNELS] {
        self.normalized.map(|n| n.first_invariant())
    }

    /// Per-channel second-order invariants.
    pub fn second_invariants(&self) -> [f64; RGB_CHANNELS] {
        self.normalized.map(|n| n.second_invariant())
    }
}

/// Scale-normalizes a central moment of order `(p, q)`.
pub fn normalized_moment(mu: f64, m00: f64, p: u32, q: u32) -> f64 {
    let exponent = 1.0 + (p + q) as f64 / 2.0;
    safe_div(mu, m00.powf(exponent))
}

/// Raw moment `(p, q)` of every RGB channel over a band of rows.
pub fn raw_moment_rows(buffer: &PixelBuffer, rows: Range<usize>, p: i32, q: i32) -> ChannelSums {
    let mut sums = [0.0; RGB_CHANNELS];
    for y in rows.start..rows.end.min(buffer.height()) {
        let yq = (y as f64).powi(q);
        for (x, px) in buffer.rows(y..y + 1).iter().enumerate() {
            let w = (x as f64).powi(p) * yq;
            for (sum, v) in sums.iter_mut().zip(px.rgb_array()) {
                *sum += w * v as f64;
            }
        }
    }
    sums
}

/// Central moment `(p, q)` of every RGB channel over a band of rows.
pub fn central_moment_rows(
    buffer: &PixelBuffer,
    rows: Range<usize>,
    p: i32,
    q: i32,
    centroids: &[(f64, f64); RGB_CHANNELS],
) -> ChannelSums {
    let mut sums = [0.0; RGB_CHANNELS];
    for y in rows.start..rows.end.min(buffer.height()) {
        for (x, px) in buffer.rows(y..y + 1).iter().enumerate() {
            let values = px.rgb_array();
            for c in 0..RGB_CHANNELS {
                let (cx, cy) = centroids[c];
                let w = (x as f64 - cx).powi(p) * (y as f64 - cy).powi(q);
                sums[c] += w * values[c] as f64;
            }
        }
    }
    sums
}

/// Raw moment `(p, q)` of every RGB channel.
pub fn raw_moment(
    buffer: &PixelBuffer,
    p: i32,
    q: i32,
    reducer: &ParallelReducer,
) -> ImgDescResult<ChannelSums> {
    buffer.ensure_non_empty("moments need at least one pixel")?;
    reducer.reduce_rows(
        buffer.height(),
        [0.0; RGB_CHANNELS],
        |rows| Ok(raw_moment_rows(buffer, rows, p, q)),
        |acc, part| {
            add_sums(acc, &part);
            Ok(())
        },
    )
}

/// Central moment `(p, q)` of every RGB channel about the given centroids.
pub fn central_moment(
    buffer: &PixelBuffer,
    p: i32,
    q: i32,
    centroids: &[(f64, f64); RGB_CHANNELS],
    reducer: &ParallelReducer,
) -> ImgDescResult<ChannelSums> {
    buffer.ensure_non_empty("moments need at least one pixel")?;
    reducer.reduce_rows(
        buffer.height(),
        [0.0; RGB_CHANNELS],
        |rows| Ok(central_moment_rows(buffer, rows, p, q, centroids)),
        |acc, part| {
            add_sums(acc, &part);
            Ok(())
        },
    )
}

fn add_sums(acc: &mut ChannelSums, part: &ChannelSums) {
    for (dst, src) in acc.iter_mut().zip(part) {
        *dst += src;
    }
}

/// Computes raw, central and normalized moments of `buffer`.
///
/// Fails with `EmptyInput` for a buffer without pixels. A channel with zero
/// mass gets zero centroids and zero normalized moments.
pub fn analyze_moments(
    buffer: &PixelBuffer,
    reducer: &ParallelReducer,
) -> ImgDescResult<MomentDescriptor> {
    let _span = trace_span!("moments", width = buffer.width(), height = buffer.height()).entered();
    buffer.ensure_non_empty("moments need at least one pixel")?;

    let raw = reducer.reduce_rows(
        buffer.height(),
        [RawMoments::default(); RGB_CHANNELS],
        |rows| Ok(raw_moments_band(buffer, rows)),
        |acc, part| {
            for (dst, src) in acc.iter_mut().zip(&part) {
                dst.merge(src);
            }
            Ok(())
        },
    )?;
    let centroids = raw.map(|m| m.centroid());

    let central = reducer.reduce_rows(
        buffer.height(),
        [CentralMoments::default(); RGB_CHANNELS],
        |rows| Ok(central_moments_band(buffer, rows, &centroids)),
        |acc, part| {
            for (dst, src) in acc.iter_mut().zip(&part) {
                dst.merge(src);
            }
            Ok(())
        },
    )?;

    let mut normalized = [NormalizedMoments::default(); RGB_CHANNELS];
    for c in 0..RGB_CHANNELS {
        normalized[c] = NormalizedMoments::from_central(&central[c], raw[c].m00);
    }
    trace_event!(
        "moments_done",
        red_mass = raw[0].m00,
        green_mass = raw[1].m00,
        blue_mass = raw[2].m00
    );

    Ok(MomentDescriptor {
        raw,
        central,
        normalized,
    })
}

fn raw_moments_band(buffer: &PixelBuffer, rows: Range<usize>) -> [RawMoments; RGB_CHANNELS] {
    let mut out = [RawMoments::default(); RGB_CHANNELS];
    for y in rows.start..rows.end.min(buffer.height()) {
        let yf = y as f64;
        for (x, px) in buffer.rows(y..y + 1).iter().enumerate() {
            let xf = x as f64;
            for (m, v) in out.iter_mut().zip(px.rgb_array()) {
                let v = v as f64;
                m.m00 += v;
                m.m10 += xf * v;
                m.m01 += yf * v;
                m.m11 += xf * yf * v;
                m.m20 += xf * xf * v;
                m.m02 += yf * yf * v;
            }
        }
    }
    out
}

fn central_moments_band(
    buffer: &PixelBuffer,
    rows: Range<usize>,
    centroids: &[(f64, f64); RGB_CHANNELS],
) -> [CentralMoments; RGB_CHANNELS] {
    let mut out = [CentralMoments::default(); RGB_CHANNELS];
    for y in rows.start..rows.end.min(buffer.height()) {
        for (x, px) in buffer.rows(y..y + 1).iter().enumerate() {
            for ((m, v), &(cx, cy)) in out.iter_mut().zip(px.rgb_array()).zip(centroids) {
                let v = v as f64;
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                m.mu11 += dx * dy * v;
                m.mu20 += dx * dx * v;
                m.mu02 += dy * dy * v;
            }
        }
    }
    out
}
