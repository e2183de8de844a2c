//! Whole-image descriptor extraction and comparison.
//!
//! [`Extractor`] runs every stage on one [`PixelBuffer`] and returns an
//! [`ImageData`] record. Records are plain values; comparing two of them
//! only touches their histograms.

use crate::filter::gaussian::{GaussianBlur, GaussianParams};
use crate::filter::sobel::SobelFilter;
use crate::histogram::{color_histogram, edge_features, Histogram, RGB_CHANNELS};
use crate::image::PixelBuffer;
use crate::moments::{analyze_moments, MomentDescriptor};
use crate::parallel::{ParallelReducer, DEFAULT_MIN_BATCH_ROWS};
use crate::quantize::{cell_index, cluster_colors, count_colors, GRID_CELLS};
use crate::distance::{distance, Metric};
use crate::trace::{trace_event, trace_span};
use crate::util::math::safe_div;
use crate::util::{ImgDescError, ImgDescResult};
use std::fmt;

/// Largest accepted `top_k`: one entry per quantization cell.
pub const MAX_TOP_K: usize = GRID_CELLS;

/// Configuration for descriptor extraction.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    /// Sobel magnitude threshold in `[0, 1]`.
    pub sobel_threshold: f32,
    /// Entries in `best_colors` and `best_shades`.
    pub top_k: usize,
    /// Run row bands on the rayon pool when available.
    pub parallel: bool,
    /// Minimum rows per parallel band.
    pub min_batch_rows: usize,
    /// Blur applied before edge detection.
    pub edge_smoothing: Option<GaussianParams>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            sobel_threshold: 0.25,
            top_k: 5,
            parallel: true,
            min_batch_rows: DEFAULT_MIN_BATCH_ROWS,
            edge_smoothing: None,
        }
    }
}

impl ExtractConfig {
    /// Checks every parameter without building any filter.
    pub fn validate(&self) -> ImgDescResult<()> {
        if !(0.0..=1.0).contains(&self.sobel_threshold) {
            return Err(ImgDescError::invalid("sobel threshold must be in [0, 1]"));
        }
        if self.top_k == 0 {
            return Err(ImgDescError::invalid("top_k must be at least 1"));
        }
        if self.top_k > MAX_TOP_K {
            return Err(ImgDescError::invalid("top_k must not exceed the 512 grid cells"));
        }
        if let Some(params) = &self.edge_smoothing {
            params.validate()?;
        }
        Ok(())
    }

    /// Builds the row reducer described by this config.
    pub fn reducer(&self) -> ParallelReducer {
        ParallelReducer::new(self.parallel, self.min_batch_rows)
    }
}

/// 128-bit content identifier of a pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub [u8; 16]);

impl ImageId {
    /// Hashes the dimensions and pixel data with BLAKE3, keeping 16 bytes.
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(buffer.width() as u64).to_le_bytes());
        hasher.update(&(buffer.height() as u64).to_le_bytes());
        for px in buffer.pixels() {
            for v in [px.r, px.g, px.b, px.a] {
                hasher.update(&v.to_le_bytes());
            }
        }
        let digest = hasher.finalize();
        let mut id = [0u8; 16];
        id.copy_from_slice(&digest.as_bytes()[..16]);
        Self(id)
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A representative color and the fraction of pixels it stands for.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorInfo {
    /// Byte-precision color packed as `0xRRGGBBAA`.
    pub color: u32,
    /// Fraction of all pixels, 0 for padding entries.
    pub ratio: f64,
}

/// Descriptors extracted from one image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    /// Content hash of the source buffer.
    pub id: ImageId,
    /// Most frequent exact colors.
    pub best_colors: Vec<ColorInfo>,
    /// Most populated quantization cells.
    pub best_shades: Vec<ColorInfo>,
    /// Normalized RGB color histogram.
    pub histogram: Histogram,
    /// Edge-orientation histogram normalized per channel.
    pub edge_histogram: Histogram,
    /// Share of pixels that are edges, per channel.
    pub edge_densities: [f64; RGB_CHANNELS],
    /// First-order moment invariant per channel.
    pub geometric_moments: [f64; RGB_CHANNELS],
    /// Raw, central and normalized moments per channel.
    pub moments: MomentDescriptor,
}

/// Per-descriptor distances between two images.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DescriptorDistance {
    /// Distance between the color histograms.
    pub color: f64,
    /// Distance between the edge histograms.
    pub edge: f64,
    /// Distance between the shade palettes.
    pub shades: f64,
}

impl ImageData {
    /// Compares color histograms, edge histograms and shade palettes.
    pub fn compare(&self, other: &ImageData, metric: Metric) -> ImgDescResult<DescriptorDistance> {
        Ok(DescriptorDistance {
            color: distance(&self.histogram, &other.histogram, metric)?,
            edge: distance(&self.edge_histogram, &other.edge_histogram, metric)?,
            shades: distance(&self.shade_histogram()?, &other.shade_histogram()?, metric)?,
        })
    }

    /// Spreads `best_shades` over a one-channel histogram of grid cells.
    pub fn shade_histogram(&self) -> ImgDescResult<Histogram> {
        let mut values = vec![0.0f32; GRID_CELLS];
        for shade in &self.best_shades {
            let cell = cell_index(shade.color.to_be_bytes());
            values[cell] += shade.ratio as f32;
        }
        Histogram::from_values(1, GRID_CELLS, values)
    }
}

/// Runs all extraction stages with a fixed configuration.
#[derive(Clone, Debug)]
pub struct Extractor {
    config: ExtractConfig,
    sobel: SobelFilter,
    smoothing: Option<GaussianBlur>,
    reducer: ParallelReducer,
}

impl Extractor {
    /// Validates `config` and builds its filters once.
    pub fn new(config: ExtractConfig) -> ImgDescResult<Self> {
        config.validate()?;
        let sobel = SobelFilter::new(config.sobel_threshold)?;
        let smoothing = config
            .edge_smoothing
            .map(GaussianBlur::from_params)
            .transpose()?;
        let reducer = config.reducer();
        Ok(Self {
            config,
            sobel,
            smoothing,
            reducer,
        })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts every descriptor from `buffer`.
    ///
    /// Fails with `EmptyInput` for a buffer without pixels.
    pub fn extract(&self, buffer: &PixelBuffer) -> ImgDescResult<ImageData> {
        let _span = trace_span!(
            "extract",
            width = buffer.width(),
            height = buffer.height(),
            parallel = self.config.parallel
        )
        .entered();
        buffer.ensure_non_empty("descriptor extraction needs at least one pixel")?;
        let total = buffer.len() as f64;
        let top_k = self.config.top_k;

        let histogram = color_histogram(buffer, &self.reducer)?;

        let edges = match &self.smoothing {
            Some(blur) => {
                let smoothed = blur.apply(buffer, &self.reducer)?;
                self.sobel.apply(&smoothed, &self.reducer)?
            }
            None => self.sobel.apply(buffer, &self.reducer)?,
        };
        let (edge_histogram, edge_densities) = edge_features(&edges, &self.reducer)?.into_parts();

        let best_colors = count_colors(buffer, &self.reducer)?
            .best_colors(top_k)
            .into_iter()
            .map(|(color, count)| ColorInfo {
                color,
                ratio: safe_div(count as f64, total),
            })
            .collect();

        let best_shades = cluster_colors(buffer, &self.reducer)?
            .best_clusters(top_k)
            .into_iter()
            .map(|(_, cluster)| ColorInfo {
                color: cluster.packed(),
                ratio: safe_div(cluster.count as f64, total),
            })
            .collect();

        let moments = analyze_moments(buffer, &self.reducer)?;
        let geometric_moments = moments.first_invariants();

        let id = ImageId::from_buffer(buffer);
        trace_event!("extract_done", pixels = buffer.len());
        Ok(ImageData {
            id,
            best_colors,
            best_shades,
            histogram,
            edge_histogram,
            edge_densities,
            geometric_moments,
            moments,
        })
    }
}

/// Extracts descriptors from `buffer` with `config`.
pub fn extract(buffer: &PixelBuffer, config: &ExtractConfig) -> ImgDescResult<ImageData> {
    Extractor::new(config.clone())?.extract(buffer)
}

#[cfg(test)]
mod tests {
    use super::{ExtractConfig, ImageId, MAX_TOP_K};
    use crate::filter::gaussian::GaussianParams;
    use crate::image::{Color4f, PixelBuffer};
    use crate::util::ImgDescError;

    #[test]
    fn config_rejects_bad_parameters() {
        let bad_threshold = ExtractConfig {
            sobel_threshold: 1.5,
            ..ExtractConfig::default()
        };
        assert!(matches!(
            bad_threshold.validate(),
            Err(ImgDescError::InvalidParameter { .. })
        ));

        let bad_k = ExtractConfig {
            top_k: 0,
            ..ExtractConfig::default()
        };
        assert!(bad_k.validate().is_err());

        for top_k in [MAX_TOP_K + 1, 600, usize::MAX] {
            let too_many = ExtractConfig {
                top_k,
                ..ExtractConfig::default()
            };
            assert!(matches!(
                too_many.validate(),
                Err(ImgDescError::InvalidParameter { .. })
            ));
        }
        let all_cells = ExtractConfig {
            top_k: MAX_TOP_K,
            ..ExtractConfig::default()
        };
        assert!(all_cells.validate().is_ok());

        let even_blur = ExtractConfig {
            edge_smoothing: Some(GaussianParams {
                size: 4,
                sigma: 1.0,
            }),
            ..ExtractConfig::default()
        };
        assert!(even_blur.validate().is_err());
    }

    #[test]
    fn image_id_depends_on_content_and_shape() {
        let a = PixelBuffer::filled(2, 3, Color4f::WHITE).unwrap();
        let b = PixelBuffer::filled(3, 2, Color4f::WHITE).unwrap();
        let c = PixelBuffer::filled(2, 3, Color4f::WHITE).unwrap();
        assert_ne!(ImageId::from_buffer(&a), ImageId::from_buffer(&b));
        assert_eq!(ImageId::from_buffer(&a), ImageId::from_buffer(&c));
        assert_eq!(ImageId::from_buffer(&a).to_string().len(), 32);
    }
}
