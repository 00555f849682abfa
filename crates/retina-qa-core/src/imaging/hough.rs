//! Hough-based detection of circles and line segments on 8-bit images.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

/// Parameters of the gradient Hough circle transform.
#[derive(Debug, Clone, Copy)]
pub struct CircleParams {
    /// Upper Canny threshold; the lower threshold is half of it.
    pub canny_high: f32,
    /// Minimum votes for a center, and minimum edge support for a radius.
    pub accumulator_threshold: u32,
    /// Minimum distance between accepted centers.
    pub min_center_distance: f64,
    /// Smallest radius searched.
    pub min_radius: u32,
    /// Largest radius searched.
    pub max_radius: u32,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            canny_high: 50.0,
            accumulator_threshold: 30,
            min_center_distance: 100.0,
            min_radius: 20,
            max_radius: 100,
        }
    }
}

/// A detected circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center column.
    pub x: u32,
    /// Center row.
    pub y: u32,
    /// Radius in pixels.
    pub radius: u32,
}

/// Finds circles with the gradient Hough transform.
///
/// Every edge pixel votes for centers along its gradient direction, on both
/// sides, for each radius in range. Centers are local maxima of the vote map
/// above the accumulator threshold, strongest first; each center's radius is
/// the most supported edge distance. At most `limit` circles are returned.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn detect_circles(image: &GrayImage, params: &CircleParams, limit: usize) -> Vec<Circle> {
    let (w, h) = image.dimensions();
    let (wi, hi) = (w as i64, h as i64);
    let edges = canny(image, params.canny_high / 2.0, params.canny_high);
    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);

    let mut edge_points = Vec::new();
    let mut votes = vec![0u32; w as usize * h as usize];
    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }
        edge_points.push((x, y));
        let dx = f64::from(gx.get_pixel(x, y).0[0]);
        let dy = f64::from(gy.get_pixel(x, y).0[0]);
        let magnitude = dx.hypot(dy);
        if magnitude == 0.0 {
            continue;
        }
        let (ux, uy) = (dx / magnitude, dy / magnitude);
        for sign in [1.0, -1.0] {
            for r in params.min_radius..=params.max_radius {
                let cx = (f64::from(x) + sign * f64::from(r) * ux).round() as i64;
                let cy = (f64::from(y) + sign * f64::from(r) * uy).round() as i64;
                if cx < 0 || cy < 0 || cx >= wi || cy >= hi {
                    break;
                }
                votes[(cy * wi + cx) as usize] += 1;
            }
        }
    }

    let at = |x: i64, y: i64| votes[(y * wi + x) as usize];
    let mut centers = Vec::new();
    for y in 1..hi - 1 {
        for x in 1..wi - 1 {
            let v = at(x, y);
            if v > params.accumulator_threshold
                && v > at(x - 1, y)
                && v >= at(x + 1, y)
                && v > at(x, y - 1)
                && v >= at(x, y + 1)
            {
                centers.push((x, y, v));
            }
        }
    }
    centers.sort_by(|a, b| b.2.cmp(&a.2));

    let min_dist_sq = params.min_center_distance * params.min_center_distance;
    let bins = (params.max_radius - params.min_radius + 1) as usize;
    let mut circles: Vec<Circle> = Vec::new();
    for (cx, cy, _) in centers {
        if circles.len() >= limit {
            break;
        }
        let too_close = circles.iter().any(|c| {
            let dx = f64::from(c.x) - cx as f64;
            let dy = f64::from(c.y) - cy as f64;
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }

        let mut histogram = vec![0u32; bins];
        for &(ex, ey) in &edge_points {
            let dx = f64::from(ex) - cx as f64;
            let dy = f64::from(ey) - cy as f64;
            let dist = dx.hypot(dy).round();
            if dist >= f64::from(params.min_radius) && dist <= f64::from(params.max_radius) {
                histogram[dist as usize - params.min_radius as usize] += 1;
            }
        }
        let best = histogram
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)));
        if let Some((bin, &support)) = best {
            if support >= params.accumulator_threshold {
                circles.push(Circle {
                    x: cx as u32,
                    y: cy as u32,
                    radius: params.min_radius + bin as u32,
                });
            }
        }
    }
    circles
}

/// Parameters of line-segment extraction.
#[derive(Debug, Clone, Copy)]
pub struct SegmentParams {
    /// Minimum Hough votes for a line.
    pub vote_threshold: u32,
    /// Non-maximum suppression radius in the Hough accumulator.
    pub suppression_radius: u32,
    /// Minimum segment length in pixels.
    pub min_length: f64,
    /// Largest run of missing edge pixels bridged within one segment.
    pub max_gap: u32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            vote_threshold: 50,
            suppression_radius: 8,
            min_length: 30.0,
            max_gap: 10,
        }
    }
}

/// A line segment between two end points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// First end point.
    pub start: (f64, f64),
    /// Last end point.
    pub end: (f64, f64),
}

impl Segment {
    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end.0 - self.start.0).hypot(self.end.1 - self.start.1)
    }
}

/// Extracts line segments from a binary edge map.
///
/// Lines come from the standard Hough transform; each line is then walked
/// across the image and split into runs of edge support, bridging gaps of
/// up to `max_gap` samples. Runs shorter than `min_length` are dropped.
#[must_use]
pub fn detect_segments(edges: &GrayImage, params: &SegmentParams) -> Vec<Segment> {
    let options = LineDetectionOptions {
        vote_threshold: params.vote_threshold,
        suppression_radius: params.suppression_radius,
    };
    detect_lines(edges, options)
        .iter()
        .flat_map(|line| walk_line(edges, line, params))
        .collect()
}

/// Whether any pixel in the 3x3 block around `(x, y)` is an edge.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn has_edge_near(edges: &GrayImage, x: i64, y: i64) -> bool {
    let (w, h) = edges.dimensions();
    (y - 1..=y + 1).any(|yy| {
        (x - 1..=x + 1).any(|xx| {
            xx >= 0
                && yy >= 0
                && xx < i64::from(w)
                && yy < i64::from(h)
                && edges.get_pixel(xx as u32, yy as u32).0[0] > 0
        })
    })
}

/// Splits one polar line `x cos(t) + y sin(t) = r` into supported segments.
#[allow(clippy::cast_possible_truncation)]
fn walk_line(edges: &GrayImage, line: &PolarLine, params: &SegmentParams) -> Vec<Segment> {
    let (w, h) = edges.dimensions();
    let theta = f64::from(line.angle_in_degrees).to_radians();
    let (sin, cos) = theta.sin_cos();
    let r = f64::from(line.r);

    // Step along the axis the line is closer to so consecutive samples are
    // one pixel apart on that axis.
    let mostly_horizontal = sin.abs() >= cos.abs();
    let steps = if mostly_horizontal { w } else { h };
    let point = |t: f64| {
        if mostly_horizontal {
            (t, (r - t * cos) / sin)
        } else {
            ((r - t * sin) / cos, t)
        }
    };

    let mut segments = Vec::new();
    let mut run: Option<((f64, f64), (f64, f64))> = None;
    let mut gap = 0u32;
    let close = |run: Option<((f64, f64), (f64, f64))>, segments: &mut Vec<Segment>| {
        if let Some((start, end)) = run {
            let segment = Segment { start, end };
            if segment.length() >= params.min_length {
                segments.push(segment);
            }
        }
    };

    for t in 0..steps {
        let (px, py) = point(f64::from(t));
        let on = px.is_finite()
            && py.is_finite()
            && has_edge_near(edges, px.round() as i64, py.round() as i64);
        if on {
            run = Some(match run {
                Some((start, _)) => (start, (px, py)),
                None => ((px, py), (px, py)),
            });
            gap = 0;
        } else if run.is_some() {
            gap += 1;
            if gap > params.max_gap {
                close(run.take(), &mut segments);
                gap = 0;
            }
        }
    }
    close(run, &mut segments);
    segments
}
