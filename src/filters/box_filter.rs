//! Box filter in the transformed domain.
//!
//! Every pixel is replaced by the mean of the pixels in its row whose
//! cumulative distance lies within `[d - r, d + r]`. Because the distance
//! row is non-decreasing, the window bounds only ever move right and each
//! row is filtered in linear time with a running sum.
//!
//! Rows are independent. The default driver walks two rows in lockstep for
//! better memory locality; the single-row driver gives identical output.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut3, Axis};

use super::core::{validate_image_dim, MAX_CHANNELS};
use super::error::{FilterError, FilterResult};

/// How rows are scheduled by the box filter. Does not affect results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowInterleave {
    /// One row at a time.
    Single,
    /// Two adjacent rows per step; a trailing odd row is filtered alone.
    #[default]
    Pairs,
}

/// Sliding window state for one row.
#[derive(Debug, Clone, Copy)]
struct RowWindow {
    pos_l: usize,
    /// One past the last pixel in the window, may reach the row width.
    pos_r: usize,
    sum: [f32; MAX_CHANNELS],
}

impl RowWindow {
    fn new() -> Self {
        RowWindow {
            pos_l: 0,
            pos_r: 0,
            sum: [0.0; MAX_CHANNELS],
        }
    }

    /// Move the window to cover `[dist[x] - radius, dist[x] + radius]`.
    ///
    /// Pixel `x` always stays inside the window, even when `radius` is lost
    /// to rounding against large cumulative distances.
    ///
    /// # Returns
    /// Reciprocal of the window size
    #[inline]
    fn advance(
        &mut self,
        row: &ArrayView2<f32>,
        dist: &ArrayView1<f32>,
        x: usize,
        radius: f32,
        channels: usize,
    ) -> f32 {
        let width = dist.len();
        let lo = dist[x] - radius;
        let hi = dist[x] + radius;

        while self.pos_l < x && dist[self.pos_l] < lo {
            for c in 0..channels {
                self.sum[c] -= row[[self.pos_l, c]];
            }
            self.pos_l += 1;
        }
        while self.pos_r < width && (self.pos_r <= x || dist[self.pos_r] < hi) {
            for c in 0..channels {
                self.sum[c] += row[[self.pos_r, c]];
            }
            self.pos_r += 1;
        }

        debug_assert!(self.pos_r > self.pos_l, "empty box filter window");
        1.0 / (self.pos_r - self.pos_l) as f32
    }
}

fn filter_row(
    image: &mut ArrayViewMut3<f32>,
    distance: &ArrayView2<f32>,
    y: usize,
    scratch: &mut Array2<f32>,
    radius: f32,
    channels: usize,
) {
    scratch.assign(&image.index_axis(Axis(0), y));
    let row = scratch.view();
    let dist = distance.row(y);

    let mut window = RowWindow::new();
    for x in 0..dist.len() {
        let inv = window.advance(&row, &dist, x, radius, channels);
        for c in 0..channels {
            image[[y, x, c]] = window.sum[c] * inv;
        }
    }
}

fn filter_single(image: &mut ArrayViewMut3<f32>, distance: &ArrayView2<f32>, radius: f32, channels: usize) {
    let (height, width, total) = image.dim();
    let mut scratch = Array2::<f32>::zeros((width, total));

    for y in 0..height {
        filter_row(image, distance, y, &mut scratch, radius, channels);
    }
}

fn filter_pairs(image: &mut ArrayViewMut3<f32>, distance: &ArrayView2<f32>, radius: f32, channels: usize) {
    let (height, width, total) = image.dim();
    let mut scratch0 = Array2::<f32>::zeros((width, total));
    let mut scratch1 = Array2::<f32>::zeros((width, total));

    let mut y = 0;
    while y + 1 < height {
        let y1 = y + 1;
        scratch0.assign(&image.index_axis(Axis(0), y));
        scratch1.assign(&image.index_axis(Axis(0), y1));
        let (row0, row1) = (scratch0.view(), scratch1.view());
        let (dist0, dist1) = (distance.row(y), distance.row(y1));

        let mut window0 = RowWindow::new();
        let mut window1 = RowWindow::new();

        for x in 0..width {
            let inv0 = window0.advance(&row0, &dist0, x, radius, channels);
            let inv1 = window1.advance(&row1, &dist1, x, radius, channels);

            // Each row is normalized by its own window size
            for c in 0..channels {
                image[[y, x, c]] = window0.sum[c] * inv0;
                image[[y1, x, c]] = window1.sum[c] * inv1;
            }
        }

        y += 2;
    }

    if y < height {
        filter_row(image, distance, y, &mut scratch0, radius, channels);
    }
}

/// Apply the transformed-domain box filter to every row of `image` in place.
///
/// Color channels are averaged; the alpha channel of RGBA images is left
/// untouched.
///
/// # Arguments
/// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `distance` - Cumulative distances (height, width), non-decreasing per row
///   with steps of at least 1 as produced by
///   [`DomainTransform`](super::domain_transform::DomainTransform)
/// * `radius` - Half-width of the box in transformed-domain units
/// * `interleave` - Row scheduling
pub fn box_filter_transformed_domain(
    mut image: ArrayViewMut3<f32>,
    distance: ArrayView2<f32>,
    radius: f32,
    interleave: RowInterleave,
) -> FilterResult<()> {
    let channels = validate_image_dim(image.dim())?;
    let (height, width, _) = image.dim();

    if distance.dim() != (height, width) {
        return Err(FilterError::ShapeMismatch {
            expected: vec![height, width],
            actual: distance.shape().to_vec(),
        });
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(FilterError::InvalidRadius(radius));
    }

    match interleave {
        RowInterleave::Single => filter_single(&mut image, &distance, radius, channels),
        RowInterleave::Pairs => filter_pairs(&mut image, &distance, radius, channels),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::core::cumulative_sum_rows;
    use crate::filters::domain_transform::DomainTransform;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array3};

    fn uniform_distance(h: usize, w: usize) -> Array2<f32> {
        let mut d = Array2::<f32>::ones((h, w));
        cumulative_sum_rows(d.view_mut());
        d
    }

    fn window_sizes(dist: ArrayView1<f32>, radius: f32) -> Vec<(usize, usize)> {
        let dummy = Array2::<f32>::zeros((dist.len(), 1));
        let row = dummy.view();
        let mut window = RowWindow::new();
        (0..dist.len())
            .map(|x| {
                window.advance(&row, &dist, x, radius, 0);
                (window.pos_l, window.pos_r)
            })
            .collect()
    }

    #[test]
    fn test_window_bounds_uniform() {
        let dist = Array1::from(vec![1.0f32, 2.0, 3.0, 4.0, 5.0]);
        // radius 1.5 covers the neighbors at distance 1
        let bounds = window_sizes(dist.view(), 1.5);
        assert_eq!(bounds, vec![(0, 2), (0, 3), (1, 4), (2, 5), (3, 5)]);
    }

    #[test]
    fn test_window_never_empty() {
        let radii = [1e-3f32, 0.5, 1.0, 2.7, 40.0];
        let rows: Vec<Vec<f32>> = vec![
            vec![1.0; 12],
            vec![1.0, 1.0, 1.0, 90.0, 1.0, 1.0, 1.0, 1.0, 55.0, 1.0, 1.0, 1.0],
            (0..12).map(|i| 1.0 + (i % 3) as f32 * 7.5).collect(),
            vec![1.0],
        ];

        for raw in rows {
            let mut field = Array2::from_shape_vec((1, raw.len()), raw).unwrap();
            cumulative_sum_rows(field.view_mut());
            for &r in &radii {
                let bounds = window_sizes(field.row(0), r);
                for (x, &(l, rr)) in bounds.iter().enumerate() {
                    assert!(rr > l, "empty window at x={} r={}", x, r);
                    assert!(l <= x && x < rr, "center outside window at x={}", x);
                }
                // bounds never move left
                for pair in bounds.windows(2) {
                    assert!(pair[1].0 >= pair[0].0 && pair[1].1 >= pair[0].1);
                }
            }
        }
    }

    #[test]
    fn test_window_keeps_center_at_large_distances() {
        // f32 spacing is 16 around 2e8, so d +- 0.7 rounds back to d
        let field = Array2::from_shape_fn((2, 64), |(y, x)| 2.0e8 + 16.0 * (x + y) as f32);
        for &r in &[0.7f32, 3.0] {
            let bounds = window_sizes(field.row(0), r);
            for (x, &(l, rr)) in bounds.iter().enumerate() {
                assert!(l <= x && x < rr, "center outside window at x={} r={}", x, r);
            }
        }

        let original = Array3::from_shape_fn((2, 64, 3), |(y, x, c)| ((x * 7 + y + c) % 2) as f32 * 255.0);
        for interleave in [RowInterleave::Single, RowInterleave::Pairs] {
            let mut img = original.clone();
            box_filter_transformed_domain(img.view_mut(), field.view(), 0.7, interleave).unwrap();
            assert_eq!(img, original);
        }
    }

    #[test]
    fn test_average_uniform_distance() {
        let mut img = Array3::<f32>::zeros((1, 5, 1));
        for x in 0..5 {
            img[[0, x, 0]] = x as f32;
        }
        let d = uniform_distance(1, 5);

        box_filter_transformed_domain(img.view_mut(), d.view(), 1.5, RowInterleave::Single).unwrap();

        let expected = [0.5f32, 1.0, 2.0, 3.0, 3.5];
        for x in 0..5 {
            assert_abs_diff_eq!(img[[0, x, 0]], expected[x], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_flat_image_unchanged() {
        for &r in &[0.3f32, 1.0, 4.0, 100.0] {
            let mut img = Array3::<f32>::from_elem((5, 7, 3), 0.3);
            let d = uniform_distance(5, 7);
            box_filter_transformed_domain(img.view_mut(), d.view(), r, RowInterleave::Pairs).unwrap();
            for v in img.iter() {
                assert_abs_diff_eq!(*v, 0.3, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_edge_not_crossed() {
        let mut img = Array3::<f32>::zeros((1, 6, 3));
        for x in 3..6 {
            for c in 0..3 {
                img[[0, x, c]] = 1.0;
            }
        }
        let transform = DomainTransform::build(img.view(), 20.0).unwrap();

        box_filter_transformed_domain(img.view_mut(), transform.horizontal(), 5.0, RowInterleave::Pairs)
            .unwrap();

        for x in 0..3 {
            assert_eq!(img[[0, x, 0]], 0.0);
            assert_eq!(img[[0, x + 3, 0]], 1.0);
        }
    }

    #[test]
    fn test_pairs_match_single() {
        for &(h, w) in &[(1usize, 9usize), (2, 9), (5, 8), (6, 3)] {
            let img = Array3::from_shape_fn((h, w, 3), |(y, x, c)| {
                ((y * 31 + x * 17 + c * 3) % 10) as f32 / 9.0
            });
            let transform = DomainTransform::build(img.view(), 8.0).unwrap();

            let mut single = img.clone();
            let mut pairs = img.clone();
            box_filter_transformed_domain(single.view_mut(), transform.horizontal(), 3.3, RowInterleave::Single)
                .unwrap();
            box_filter_transformed_domain(pairs.view_mut(), transform.horizontal(), 3.3, RowInterleave::Pairs)
                .unwrap();

            assert_eq!(single, pairs, "mismatch for {}x{}", w, h);
        }
    }

    #[test]
    fn test_row_uses_own_divisor() {
        // Row 0 is flat, row 1 has an edge so its windows are smaller.
        // A flat row must keep its value regardless of its pair partner.
        let mut img = Array3::<f32>::from_elem((2, 6, 3), 0.5);
        for x in 3..6 {
            for c in 0..3 {
                img[[1, x, c]] = 1.0;
            }
        }
        let transform = DomainTransform::build(img.view(), 50.0).unwrap();

        box_filter_transformed_domain(img.view_mut(), transform.horizontal(), 2.5, RowInterleave::Pairs)
            .unwrap();

        for x in 0..6 {
            assert_abs_diff_eq!(img[[0, x, 0]], 0.5, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(img[[1, 0, 0]], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(img[[1, 5, 0]], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_alpha_preserved() {
        let mut img = Array3::<f32>::zeros((2, 4, 4));
        for x in 0..4 {
            img[[0, x, 0]] = x as f32;
            img[[0, x, 3]] = 0.25 * x as f32;
            img[[1, x, 3]] = 1.0;
        }
        let d = uniform_distance(2, 4);

        box_filter_transformed_domain(img.view_mut(), d.view(), 10.0, RowInterleave::Pairs).unwrap();

        for x in 0..4 {
            assert_abs_diff_eq!(img[[0, x, 0]], 1.5, epsilon = 1e-6);
            assert_eq!(img[[0, x, 3]], 0.25 * x as f32);
            assert_eq!(img[[1, x, 3]], 1.0);
        }
    }

    #[test]
    fn test_single_column_row() {
        let mut img = array![[[0.2f32, 0.4, 0.6]]];
        let d = uniform_distance(1, 1);
        box_filter_transformed_domain(img.view_mut(), d.view(), 3.0, RowInterleave::Pairs).unwrap();
        assert_abs_diff_eq!(img[[0, 0, 1]], 0.4, epsilon = 1e-7);
    }

    #[test]
    fn test_invalid_arguments() {
        let mut img = Array3::<f32>::zeros((2, 3, 3));
        let d = uniform_distance(2, 3);
        assert!(matches!(
            box_filter_transformed_domain(img.view_mut(), d.view(), 0.0, RowInterleave::Pairs),
            Err(FilterError::InvalidRadius(_))
        ));
        assert!(matches!(
            box_filter_transformed_domain(img.view_mut(), d.view(), f32::NAN, RowInterleave::Pairs),
            Err(FilterError::InvalidRadius(_))
        ));

        let wrong = uniform_distance(3, 2);
        assert!(matches!(
            box_filter_transformed_domain(img.view_mut(), wrong.view(), 1.0, RowInterleave::Pairs),
            Err(FilterError::ShapeMismatch { .. })
        ));

        let mut two = Array3::<f32>::zeros((2, 3, 2));
        assert!(matches!(
            box_filter_transformed_domain(two.view_mut(), d.view(), 1.0, RowInterleave::Pairs),
            Err(FilterError::UnsupportedChannels(2))
        ));
    }
}
