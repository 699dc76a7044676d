use bitonal_encoder::encode::segment;
use bitonal_encoder::{Bitmap, CodecError, Compressor, Packing, ScanOrder, compress, decompress};
use proptest::prelude::*;

fn assert_roundtrip(compressor: &Compressor, bitmap: &Bitmap) {
    let bytes = compressor.compress(bitmap).expect("compression failed");
    let decoded = compressor.decompress(&bytes).expect("decompression failed");
    assert_eq!(&decoded, bitmap, "round trip changed the image");
}

/// Renders `text` as 3x5 block glyphs separated by one blank column.
fn render_glyphs(lines: &[&str]) -> Bitmap {
    const FONT: [(char, [&str; 5]); 4] = [
        ('a', [".#.", "#.#", "###", "#.#", "#.#"]),
        ('b', ["##.", "#.#", "##.", "#.#", "##."]),
        ('c', [".##", "#..", "#..", "#..", ".##"]),
        ('o', [".#.", "#.#", "#.#", "#.#", ".#."]),
    ];
    let cols = lines.iter().map(|l| l.len()).max().unwrap_or(0) * 4 + 1;
    let rows = lines.len() * 7 + 1;
    Bitmap::from_fn(rows, cols, |r, c| {
        let (line, glyph_row) = (r / 7, r % 7);
        let (index, glyph_col) = (c / 4, c % 4);
        if glyph_row == 0 || glyph_row == 6 || glyph_col == 0 || line >= lines.len() {
            return false;
        }
        let Some(ch) = lines[line].chars().nth(index) else {
            return false;
        };
        FONT.iter()
            .find(|(key, _)| *key == ch)
            .map(|(_, rows)| rows[glyph_row - 1].as_bytes()[glyph_col - 1] == b'#')
            .unwrap_or(false)
    })
    .expect("glyph page")
}

#[test]
fn test_text_like_page_shares_shapes() {
    let lines: Vec<String> = (0..40)
        .map(|i| "abco ".chars().cycle().skip(i % 5).take(40).collect())
        .collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let page = render_glyphs(&lines);

    let compressor = Compressor::new();
    let (bytes, stats) = compressor.compress_with_stats(&page).expect("compress");

    assert_eq!(stats.shapes, 4, "one shape per distinct glyph");
    assert_eq!(stats.placements, 40 * 32);
    assert!(stats.ratio() > 1.0, "ratio {}", stats.ratio());
    assert_eq!(compressor.decompress(&bytes).expect("decompress"), page);
}

#[test]
fn test_interlocking_components() {
    // Two combs whose bounding boxes overlap without the combs touching.
    let combs = Bitmap::from_ascii(&[
        "#########",
        "#...#...#",
        "#.#.#.#.#",
        "#.#.#.#.#",
        "..#...#..",
        ".#######.",
    ])
    .expect("combs");
    let seg = segment(&combs, false).expect("segment");
    assert_eq!(seg.placement_count(), 2);

    for order in ScanOrder::ALL {
        assert_roundtrip(&Compressor::new().with_scan_order(order), &combs);
    }

    // Same picture with the colors swapped.
    let inverted = Bitmap::from_fn(combs.rows() + 2, combs.cols() + 2, |r, c| {
        !(r >= 1 && c >= 1 && r <= combs.rows() && c <= combs.cols() && combs.get(r - 1, c - 1))
    })
    .expect("inverted");
    assert!(inverted.dominant_color());
    assert_roundtrip(&Compressor::new(), &inverted);
}

#[test]
fn test_nested_rings() {
    let size = 41;
    let rings = Bitmap::from_fn(size, size, |r, c| {
        let d = r.min(c).min(size - 1 - r).min(size - 1 - c);
        d % 2 == 0
    })
    .expect("rings");
    let seg = segment(&rings, rings.dominant_color()).expect("segment");
    assert!(seg.placement_count() > 1);
    assert_roundtrip(&Compressor::new(), &rings);
    assert_roundtrip(&Compressor::new().with_packing(Packing::Bits), &rings);
}

#[test]
fn test_corrupted_stream_is_an_error_not_a_panic() {
    let page = render_glyphs(&["abc", "cba"]);
    let bytes = compress(&page).expect("compress");
    let mut rejected = 0;
    for i in 0..bytes.len() {
        let mut damaged = bytes.clone();
        damaged[i] ^= 0x5A;
        if decompress(&damaged).is_err() {
            rejected += 1;
        }
    }
    assert!(
        rejected * 2 > bytes.len(),
        "only {} of {} damaged streams were rejected",
        rejected,
        bytes.len()
    );
    for len in 0..bytes.len() {
        assert!(decompress(&bytes[..len]).is_err(), "prefix of {} bytes accepted", len);
    }
}

#[test]
fn test_error_kinds() {
    let err = decompress(&[0, 0, 0]).expect_err("empty table");
    assert!(matches!(err, CodecError::Format(_)), "{:?}", err);
}

fn bitmap_strategy(max_dim: usize) -> impl Strategy<Value = Bitmap> {
    (0..=max_dim, 0..=max_dim, 1u32..=99).prop_flat_map(|(rows, cols, density)| {
        proptest::collection::vec(0u32..100, rows * cols).prop_map(move |noise| {
            let pixels: Vec<bool> = noise.iter().map(|&n| n < density).collect();
            Bitmap::from_pixels(rows, cols, &pixels).expect("pixels match dimensions")
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_roundtrip_up_to_256(bitmap in bitmap_strategy(256)) {
        let bytes = compress(&bitmap).unwrap();
        prop_assert_eq!(decompress(&bytes).unwrap(), bitmap);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_roundtrip_every_configuration(
        bitmap in bitmap_strategy(48),
        order in prop::sample::select(ScanOrder::ALL.to_vec()),
        bits in any::<bool>(),
        forced in any::<bool>(),
    ) {
        let mut compressor = Compressor::new();
        if bits {
            compressor = compressor.with_packing(Packing::Bits);
        }
        if forced {
            compressor = compressor.with_scan_order(order);
        }
        let bytes = compressor.compress(&bitmap).unwrap();
        prop_assert_eq!(compressor.decompress(&bytes).unwrap(), bitmap.clone());
        // Determinism.
        prop_assert_eq!(compressor.compress(&bitmap).unwrap(), bytes);
    }

    #[test]
    fn test_segmentation_never_duplicates_shapes(bitmap in bitmap_strategy(48)) {
        let seg = segment(&bitmap, bitmap.dominant_color()).unwrap();
        for (i, a) in seg.shapes.iter().enumerate() {
            for b in &seg.shapes[i + 1..] {
                prop_assert_ne!(a, b);
            }
        }
        let referenced: usize = seg.shape_blocks.iter().map(Vec::len).sum();
        prop_assert_eq!(referenced, seg.placement_count());
    }
}
