use std::path::Path;

use image::{Rgb, RgbImage};
use log::{info, warn};

use crate::error::Result;
use crate::train::loss_history::LossHistory;

pub const PLOT_WIDTH: u32 = 800;
pub const PLOT_HEIGHT: u32 = 400;
const MARGIN: u32 = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const RAW: Rgb<u8> = Rgb([150, 180, 230]);
const SMOOTHED: Rgb<u8> = Rgb([200, 30, 30]);

/// Roughly how many points the smoothed curve has.
const SMOOTHED_POINTS: usize = 50;

/// Draws the per-iteration loss (light blue) with a windowed mean on top
/// (red) inside a pair of axes. Non-finite losses are left out.
pub fn render_loss(history: &LossHistory) -> RgbImage {
    let mut img = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, BACKGROUND);

    let left = MARGIN as i64;
    let right = (PLOT_WIDTH - MARGIN) as i64;
    let top = MARGIN as i64;
    let bottom = (PLOT_HEIGHT - MARGIN) as i64;

    draw_line(&mut img, (left, bottom), (right, bottom), AXIS);
    draw_line(&mut img, (left, top), (left, bottom), AXIS);

    let finite: Vec<f64> = history.as_slice().iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < history.len() {
        warn!("{} non-finite loss values left out of the plot", history.len() - finite.len());
    }
    let (min, max) = match bounds(&finite) {
        Some(b) => b,
        None => return img,
    };

    let n = history.len();
    let to_x = |i: f64| left + ((i / (n.max(2) - 1) as f64) * (right - left) as f64).round() as i64;
    let to_y = |v: f64| {
        let t = if max > min { (max - v) / (max - min) } else { 0.5 };
        top + (t * (bottom - top) as f64).round() as i64
    };

    plot_series(&mut img, history.as_slice().iter().enumerate().map(|(i, &v)| (i as f64, v)), &to_x, &to_y, RAW);

    let window = (n / SMOOTHED_POINTS).max(1);
    let smoothed = history.window_means(window);
    // Each mean sits at the centre of its window.
    let centers = smoothed
        .iter()
        .enumerate()
        .map(|(k, &v)| (((k * window) as f64 + (window - 1) as f64 / 2.0).min((n - 1) as f64), v));
    plot_series(&mut img, centers, &to_x, &to_y, SMOOTHED);

    img
}

/// Renders the loss curve and writes it as a PNG to `path`.
pub fn save_loss_plot(history: &LossHistory, path: &Path) -> Result<()> {
    render_loss(history).save(path)?;
    info!("wrote loss curve to {}", path.display());
    Ok(())
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Connects consecutive finite points; a non-finite value breaks the line.
fn plot_series<I, X, Y>(img: &mut RgbImage, points: I, to_x: &X, to_y: &Y, color: Rgb<u8>)
where
    I: Iterator<Item = (f64, f64)>,
    X: Fn(f64) -> i64,
    Y: Fn(f64) -> i64,
{
    let mut prev: Option<(i64, i64)> = None;
    for (i, v) in points {
        if !v.is_finite() {
            prev = None;
            continue;
        }
        let p = (to_x(i), to_y(v));
        match prev {
            Some(q) => draw_line(img, q, p, color),
            None => put(img, p, color),
        }
        prev = Some(p);
    }
}

/// Bresenham line; points outside the image are skipped.
fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);

    loop {
        put(img, (x, y), color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn put(img: &mut RgbImage, (x, y): (i64, i64), color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}
