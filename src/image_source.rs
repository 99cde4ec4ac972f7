// image decode, box resampling to the display resolution, and preview persistence

use std::path::Path;

use image::{imageops, ImageBuffer, Rgb, RgbImage, Rgba};
use rayon::prelude::*;

use crate::error::{Img2LogicError, Result};
use crate::grid::{PaintedRect, PixelGrid, CHANNELS};
use crate::render::CpuRenderer;

/// decode any format the image crate knows, dropping alpha
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    profiling::scope!("load_rgb");
    let img = image::open(path)?;
    log::info!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.to_rgb8())
}

/// decode `path` and box-resample it to `width` x `height`
pub fn load_grid(path: &Path, width: u32, height: u32) -> Result<PixelGrid> {
    let img = load_rgb(path)?;
    resample_box(&img, width, height)
}

/// source taps (index, weight) for every destination sample along one axis.
/// each destination cell covers `src_len / dst_len` source pixels; partial
/// overlaps are weighted by the covered fraction, weights sum to 1.
fn box_taps(src_len: u32, dst_len: u32) -> Vec<Vec<(usize, f64)>> {
    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * ratio;
            let end = start + ratio;
            let mut taps = Vec::with_capacity(ratio.ceil() as usize + 1);
            let mut s = start.floor() as usize;
            while (s as f64) < end && s < src_len as usize {
                let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                if overlap > 1e-12 {
                    taps.push((s, overlap / ratio));
                }
                s += 1;
            }
            taps
        })
        .collect()
}

/// area-weighted (box) resample into a PixelGrid. separable: horizontal pass
/// into a float buffer, then vertical pass, both parallel over rows.
pub fn resample_box(src: &RgbImage, width: u32, height: u32) -> Result<PixelGrid> {
    profiling::scope!("resample_box");

    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return Err(Img2LogicError::EmptyImage { width: sw, height: sh });
    }
    if width == 0 || height == 0 {
        return Err(Img2LogicError::EmptyImage { width, height });
    }

    let x_taps = box_taps(sw, width);
    let y_taps = box_taps(sh, height);
    let src_raw = src.as_raw();
    let src_row = sw as usize * CHANNELS;
    let mid_row = width as usize * CHANNELS;

    // horizontal: sh rows of `width` samples
    let mut mid = vec![0f64; sh as usize * mid_row];
    mid.par_chunks_mut(mid_row).enumerate().for_each(|(y, dst)| {
        let row = &src_raw[y * src_row..(y + 1) * src_row];
        for (x, taps) in x_taps.iter().enumerate() {
            let mut acc = [0f64; 3];
            for &(sx, w) in taps {
                let p = &row[sx * CHANNELS..sx * CHANNELS + CHANNELS];
                acc[0] += p[0] as f64 * w;
                acc[1] += p[1] as f64 * w;
                acc[2] += p[2] as f64 * w;
            }
            dst[x * CHANNELS..x * CHANNELS + CHANNELS].copy_from_slice(&acc);
        }
    });

    // vertical
    let mut out = vec![0u8; height as usize * mid_row];
    out.par_chunks_mut(mid_row).zip(y_taps.par_iter()).for_each(|(dst, taps)| {
        for (i, d) in dst.iter_mut().enumerate() {
            let v: f64 = taps.iter().map(|&(sy, w)| mid[sy * mid_row + i] * w).sum();
            *d = (v + 0.5).floor().clamp(0.0, 255.0) as u8;
        }
    });

    PixelGrid::from_rgb(width, height, out)
}

pub fn grid_to_image(grid: &PixelGrid) -> Result<RgbImage> {
    ImageBuffer::<Rgb<u8>, _>::from_raw(grid.width(), grid.height(), grid.as_raw().to_vec()).ok_or(
        Img2LogicError::EmptyImage {
            width: grid.width(),
            height: grid.height(),
        },
    )
}

/// write the canvas as an image, each pixel blown up to `scale` x `scale`
pub fn save_canvas_preview(canvas: &PixelGrid, path: &Path, scale: u32) -> Result<()> {
    profiling::scope!("save_canvas_preview");
    let img = grid_to_image(canvas)?;
    let scale = scale.max(1);
    let img = if scale > 1 {
        imageops::resize(&img, img.width() * scale, img.height() * scale, imageops::FilterType::Nearest)
    } else {
        img
    };
    img.save(path)?;
    log::info!("wrote canvas preview {}", path.display());
    Ok(())
}

/// rasterise the rectangle list itself (tiny-skia) and write it
pub fn save_rect_preview(rects: &[PaintedRect], width: u32, height: u32, scale: u32, path: &Path) -> Result<()> {
    profiling::scope!("save_rect_preview");
    let scale = scale.max(1);
    let rgba = CpuRenderer::render_rects_rgba(rects, width, height, scale)?;
    let img = ImageBuffer::<Rgba<u8>, _>::from_raw(width * scale, height * scale, rgba)
        .ok_or(Img2LogicError::EmptyImage { width, height })?;
    img.save(path)?;
    log::info!("wrote rect preview {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Color, Rect};

    fn checker(w: u32, h: u32, block: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            if (x / block + y / block) % 2 == 0 {
                Rgb([200, 100, 0])
            } else {
                Rgb([0, 0, 50])
            }
        })
    }

    #[test]
    fn test_box_taps_sum_to_one() {
        for (src, dst) in [(10u32, 3u32), (3, 2), (80, 80), (2, 5), (1000, 176)] {
            for taps in box_taps(src, dst) {
                let total: f64 = taps.iter().map(|t| t.1).sum();
                assert!((total - 1.0).abs() < 1e-9, "{src}->{dst}: {total}");
            }
        }
    }

    #[test]
    fn test_fractional_taps() {
        let taps = box_taps(3, 2);
        assert_eq!(taps[0].len(), 2);
        assert_eq!(taps[0][0].0, 0);
        assert!((taps[0][0].1 - 2.0 / 3.0).abs() < 1e-12);
        assert!((taps[0][1].1 - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_image_stays_uniform() {
        let img = RgbImage::from_pixel(37, 23, Rgb([200, 17, 90]));
        let grid = resample_box(&img, 80, 80).unwrap();
        assert_eq!(grid, PixelGrid::filled(80, 80, Color::new(200, 17, 90)));
        let grid = resample_box(&img, 5, 4).unwrap();
        assert_eq!(grid, PixelGrid::filled(5, 4, Color::new(200, 17, 90)));
    }

    #[test]
    fn test_block_downsample_is_exact() {
        // 2x2 blocks shrink to single pixels
        let grid = resample_box(&checker(8, 8, 2), 4, 4).unwrap();
        assert_eq!(grid.pixel(0, 0), Color::new(200, 100, 0));
        assert_eq!(grid.pixel(1, 0), Color::new(0, 0, 50));
    }

    #[test]
    fn test_downsample_averages() {
        // every output pixel covers two of each color
        let grid = resample_box(&checker(8, 8, 1), 4, 4).unwrap();
        assert_eq!(grid.pixel(2, 3), Color::new(100, 50, 25));
    }

    #[test]
    fn test_empty_target_rejected() {
        let img = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        assert!(matches!(resample_box(&img, 0, 4), Err(Img2LogicError::EmptyImage { .. })));
    }

    #[test]
    fn test_previews_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let rects = vec![PaintedRect { rect: Rect::new(0, 0, 2, 2), color: Color::new(9, 8, 7) }];
        let mut canvas = PixelGrid::new_black(4, 3);
        canvas.fill_rect(&rects[0].rect, rects[0].color);

        let canvas_path = dir.path().join("canvas.png");
        save_canvas_preview(&canvas, &canvas_path, 3).unwrap();
        let back = image::open(&canvas_path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (12, 9));
        assert_eq!(back.get_pixel(5, 5), &Rgb([9, 8, 7]));
        assert_eq!(back.get_pixel(6, 5), &Rgb([0, 0, 0]));

        let rect_path = dir.path().join("rects.png");
        save_rect_preview(&rects, 4, 3, 2, &rect_path).unwrap();
        let back = image::open(&rect_path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (8, 6));
        assert_eq!(back.get_pixel(3, 3), &Rgb([9, 8, 7]));
        assert_eq!(back.get_pixel(4, 3), &Rgb([0, 0, 0]));

        let grid = load_grid(&canvas_path, 4, 3).unwrap();
        assert_eq!(grid, canvas);
    }
}
