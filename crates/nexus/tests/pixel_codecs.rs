//! Grid and mapping encodings recover exactly what they were built from

use itertools::iproduct;
use nxtools_model::{Corner, CountDirection, PixelGrid, PixelMapping};
use nxtools_nexus::{decode_grid, decode_mapping, encode_grid, encode_mapping};
use rstest::rstest;

#[rstest]
fn grids_round_trip(
    #[values(CountDirection::Row, CountDirection::Column)] direction: CountDirection,
    #[values(Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight)]
    corner: Corner,
) {
    let sizes = 2..=6;
    let spacings = [0.1, 0.5, 1.0];

    for (rows, columns, row_height, col_width, first_id) in iproduct!(
        sizes.clone(),
        sizes.clone(),
        spacings,
        spacings,
        [0_i64, 1, 100]
    ) {
        let grid = PixelGrid::builder()
            .rows(rows)
            .columns(columns)
            .row_height(row_height)
            .col_width(col_width)
            .first_id(first_id)
            .count_direction(direction)
            .initial_count_corner(corner)
            .build();

        let decoded = decode_grid(&encode_grid(&grid)).unwrap();
        assert_eq!(decoded, grid);
    }
}

#[rstest]
fn ids_are_consecutive(
    #[values(CountDirection::Row, CountDirection::Column)] direction: CountDirection,
    #[values(Corner::TopLeft, Corner::BottomRight)] corner: Corner,
) {
    let grid = PixelGrid::builder()
        .rows(3)
        .columns(4)
        .first_id(20)
        .count_direction(direction)
        .initial_count_corner(corner)
        .build();

    let mut ids = encode_grid(&grid)
        .detector_ids
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
    ids.sort_unstable();
    assert_eq!(ids, (20..32).collect::<Vec<_>>());
}

/// A single row or column cannot show its direction or the missing spacing,
/// and its first id sits in two corners, so it decodes to the later corner of
/// bottom left, bottom right, top left, top right
#[rstest]
#[case::row_from_the_left((1, 5), Corner::BottomLeft, Corner::TopLeft)]
#[case::row_from_the_top_left((1, 5), Corner::TopLeft, Corner::TopLeft)]
#[case::row_from_the_right((1, 5), Corner::BottomRight, Corner::TopRight)]
#[case::row_from_the_top_right((1, 5), Corner::TopRight, Corner::TopRight)]
#[case::column_from_the_bottom((5, 1), Corner::BottomLeft, Corner::BottomRight)]
#[case::column_from_the_bottom_right((5, 1), Corner::BottomRight, Corner::BottomRight)]
#[case::column_from_the_top((5, 1), Corner::TopLeft, Corner::TopRight)]
#[case::column_from_the_top_right((5, 1), Corner::TopRight, Corner::TopRight)]
#[case::single_pixel((1, 1), Corner::BottomLeft, Corner::TopRight)]
fn single_lines(
    #[case] shape: (usize, usize),
    #[case] corner: Corner,
    #[case] expected: Corner,
    #[values(CountDirection::Row, CountDirection::Column)] direction: CountDirection,
) {
    let (rows, columns) = shape;
    let grid = PixelGrid::builder()
        .rows(rows)
        .columns(columns)
        .row_height(0.5)
        .col_width(0.5)
        .first_id(7)
        .count_direction(direction)
        .initial_count_corner(corner)
        .build();

    let once = decode_grid(&encode_grid(&grid)).unwrap();
    assert_eq!(once.initial_count_corner, expected);
    assert_eq!(once.count_direction, CountDirection::Row);
    assert_eq!(once.first_id, 7);

    // decoding what was decoded gives the same grid and the same ids
    let twice = decode_grid(&encode_grid(&once)).unwrap();
    assert_eq!(once, twice);
    assert_eq!(encode_grid(&once).detector_ids, encode_grid(&grid).detector_ids);
}

#[rstest]
#[case::ascending(|face: usize| 1000 + face as i64)]
#[case::negative(|face: usize| -(face as i64) - 1)]
#[case::repeated(|face: usize| [7, -7, 0][face % 3])]
#[case::extremes(|face: usize| if face % 2 == 0 { i64::MIN } else { i64::MAX })]
fn every_mapping_subset_round_trips(#[case] id_of: fn(usize) -> i64) {
    for face_count in 1..=10_usize {
        for mask in 0..(1_u32 << face_count) {
            let pixel_ids = (0..face_count)
                .map(|face| (mask & (1 << face) != 0).then(|| id_of(face)))
                .collect::<Vec<_>>();
            let mapping = PixelMapping::new(pixel_ids.clone());

            let pairs = encode_mapping(&mapping);
            assert_eq!(pairs.len(), mask.count_ones() as usize);
            assert!(pairs.windows(2).all(|w| w[0][0] < w[1][0]));
            for [face, id] in &pairs {
                assert_eq!(pixel_ids[*face as usize], Some(*id));
            }

            assert_eq!(decode_mapping(&pairs, face_count).unwrap(), mapping);
        }
    }
}
