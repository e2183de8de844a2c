use imgdesc::{Color4f, ImgDescError, Kernel, PixelBuffer};

#[test]
fn pixel_buffer_rejects_wrong_pixel_count() {
    let err = PixelBuffer::new(2, 2, vec![Color4f::WHITE; 3]).err().unwrap();
    assert_eq!(err, ImgDescError::BufferSizeMismatch { needed: 4, got: 3 });
}

#[test]
fn pixel_buffer_accepts_zero_size() {
    let buffer = PixelBuffer::new(0, 5, Vec::new()).unwrap();
    assert!(buffer.is_empty());
    assert_eq!(buffer.height(), 5);
    assert!(buffer.row(0).unwrap().is_empty());
}

#[test]
fn pixel_buffer_rows_are_row_major() {
    let buffer = PixelBuffer::from_fn(3, 2, |x, y| Color4f::rgb(x as f32, y as f32, 0.0)).unwrap();
    assert_eq!(buffer.len(), 6);
    assert_eq!(buffer.get(2, 1), Some(&Color4f::rgb(2.0, 1.0, 0.0)));
    assert!(buffer.get(3, 0).is_none());
    let row = buffer.row(1).unwrap();
    assert_eq!(row.len(), 3);
    assert_eq!(row[0], Color4f::rgb(0.0, 1.0, 0.0));
    assert_eq!(buffer.rows(1..5).len(), 3);
}

#[test]
fn pixel_buffer_from_rgba8_scales_bytes() {
    let bytes = [255u8, 0, 51, 255, 0, 255, 0, 0];
    let buffer = PixelBuffer::from_rgba8(2, 1, &bytes).unwrap();
    assert_eq!(buffer.pixels()[0], Color4f::new(1.0, 0.0, 0.2, 1.0));
    assert_eq!(buffer.pixels()[1].a, 0.0);
    assert_eq!(buffer.pixels()[0].pack(), 0xFF00_33FF);

    let err = PixelBuffer::from_rgba8(2, 1, &bytes[..7]).err().unwrap();
    assert_eq!(err, ImgDescError::BufferSizeMismatch { needed: 8, got: 7 });
}

#[test]
fn kernel_rejects_zero_size_and_non_finite_values() {
    assert!(matches!(
        Kernel::new(0, 1, Vec::new()),
        Err(ImgDescError::InvalidParameter { .. })
    ));
    assert!(matches!(
        Kernel::with_factor(1, 1, 1.0, vec![f64::NAN]),
        Err(ImgDescError::InvalidParameter { .. })
    ));
}

#[test]
fn kernel_row_and_column_share_values() {
    let row = Kernel::row(vec![1.0, 2.0, 1.0]).unwrap();
    let column = Kernel::column(vec![1.0, 2.0, 1.0]).unwrap();
    assert_eq!((row.size_x(), row.size_y()), (3, 1));
    assert_eq!((column.size_x(), column.size_y()), (1, 3));
    assert_eq!(row.transposed(), column);
}
