use imgdesc::{
    extract, Color4f, ExtractConfig, Extractor, GaussianParams, ImgDescError, Metric, PixelBuffer,
    MAX_TOP_K,
};

const RED: Color4f = Color4f::new(1.0, 0.0, 0.0, 1.0);
const BLUE: Color4f = Color4f::new(0.0, 0.0, 1.0, 1.0);
const GREEN: Color4f = Color4f::new(0.0, 1.0, 0.0, 1.0);

/// Left 60% red, right 40% blue, with a green square in the middle.
fn make_scene(width: usize, height: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let in_square = (width / 2 - 4..width / 2 + 4).contains(&x)
            && (height / 2 - 4..height / 2 + 4).contains(&y);
        if in_square {
            GREEN
        } else if x * 5 < width * 3 {
            RED
        } else {
            BLUE
        }
    })
    .unwrap()
}

#[test]
fn extract_produces_complete_record() {
    let buffer = make_scene(40, 30);
    let data = extract(&buffer, &ExtractConfig::default()).unwrap();

    assert_eq!(data.best_colors.len(), 5);
    assert_eq!(data.best_shades.len(), 5);
    assert_eq!(data.best_colors[0].color, RED.pack());
    assert_eq!(data.best_colors[1].color, BLUE.pack());
    assert_eq!(data.best_colors[2].color, GREEN.pack());
    // Only three distinct colors exist; the tail is padding.
    assert_eq!(data.best_colors[3].color, 0);
    assert_eq!(data.best_colors[4].ratio, 0.0);

    let ratio_sum: f64 = data.best_colors.iter().map(|c| c.ratio).sum();
    assert!((ratio_sum - 1.0).abs() < 1e-12);
    assert_eq!(data.best_shades[0].color, RED.pack());
    assert!((data.best_shades[0].ratio - data.best_colors[0].ratio).abs() < 1e-12);

    for c in 0..3 {
        assert!((data.histogram.channel_sum(c) - 1.0).abs() < 1e-5);
        assert!(data.edge_densities[c] > 0.0 && data.edge_densities[c] < 1.0);
        assert!(data.geometric_moments[c] > 0.0);
    }
    assert_eq!(data.edge_histogram.bins(), 4);
}

#[test]
fn identical_images_compare_as_zero() {
    let extractor = Extractor::new(ExtractConfig::default()).unwrap();
    let a = extractor.extract(&make_scene(32, 32)).unwrap();
    let b = extractor.extract(&make_scene(32, 32)).unwrap();
    assert_eq!(a.id, b.id);
    for metric in Metric::ALL {
        let d = a.compare(&b, metric).unwrap();
        assert_eq!(d.color, 0.0, "{metric}");
        assert_eq!(d.edge, 0.0, "{metric}");
        assert_eq!(d.shades, 0.0, "{metric}");
    }
}

#[test]
fn single_channel_image_matches_itself() {
    // Green and blue carry no edges at all here.
    let extractor = Extractor::new(ExtractConfig::default()).unwrap();
    let red = PixelBuffer::from_fn(16, 16, |x, _| if x < 8 { RED } else { Color4f::BLACK })
        .unwrap();
    let flat = PixelBuffer::filled(16, 16, RED).unwrap();
    for buffer in [red, flat] {
        let data = extractor.extract(&buffer).unwrap();
        assert_eq!(data.edge_histogram.channel_sum(1), 0.0);
        for metric in Metric::ALL {
            let d = data.compare(&data, metric).unwrap();
            assert_eq!(d.color, 0.0, "{metric}");
            assert_eq!(d.edge, 0.0, "{metric}");
            assert_eq!(d.shades, 0.0, "{metric}");
        }
    }
}

#[test]
fn different_images_compare_as_positive() {
    let extractor = Extractor::new(ExtractConfig::default()).unwrap();
    let scene = extractor.extract(&make_scene(32, 32)).unwrap();
    let flat = extractor
        .extract(&PixelBuffer::filled(32, 32, BLUE).unwrap())
        .unwrap();
    assert_ne!(scene.id, flat.id);
    let d = scene.compare(&flat, Metric::CityBlock).unwrap();
    assert!(d.color > 0.0 && d.color <= 1.0);
    assert!(d.shades > 0.0);
}

#[test]
fn top_k_sets_record_length() {
    let config = ExtractConfig {
        top_k: 2,
        edge_smoothing: Some(GaussianParams::from_sigma(0.8)),
        ..ExtractConfig::default()
    };
    let data = extract(&make_scene(24, 24), &config).unwrap();
    assert_eq!(data.best_colors.len(), 2);
    assert_eq!(data.best_shades.len(), 2);
    assert_eq!(data.best_colors[0].color, RED.pack());
}

#[test]
fn top_k_is_capped_at_the_grid_size() {
    let white = PixelBuffer::filled(4, 4, Color4f::WHITE).unwrap();
    let too_many = ExtractConfig {
        top_k: 600,
        ..ExtractConfig::default()
    };
    let err = extract(&white, &too_many).err().unwrap();
    assert!(matches!(err, ImgDescError::InvalidParameter { .. }));
    let err = Extractor::new(ExtractConfig {
        top_k: usize::MAX,
        ..ExtractConfig::default()
    })
    .err()
    .unwrap();
    assert!(matches!(err, ImgDescError::InvalidParameter { .. }));

    let all_cells = ExtractConfig {
        top_k: MAX_TOP_K,
        ..ExtractConfig::default()
    };
    let data = extract(&white, &all_cells).unwrap();
    assert_eq!(data.best_colors.len(), MAX_TOP_K);
    assert_eq!(data.best_shades.len(), MAX_TOP_K);
    assert_eq!(data.best_shades[0].ratio, 1.0);
    assert_eq!(data.best_shades[1].ratio, 0.0);
}

#[test]
fn extractor_rejects_invalid_config_and_empty_input() {
    let err = Extractor::new(ExtractConfig {
        sobel_threshold: -0.5,
        ..ExtractConfig::default()
    })
    .err()
    .unwrap();
    assert!(matches!(err, ImgDescError::InvalidParameter { .. }));

    let empty = PixelBuffer::new(0, 0, Vec::new()).unwrap();
    let err = extract(&empty, &ExtractConfig::default()).err().unwrap();
    assert!(matches!(err, ImgDescError::EmptyInput { .. }));
}
