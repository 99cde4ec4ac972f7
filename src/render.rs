use tiny_skia as sk;

use crate::error::{Img2LogicError, Result};
use crate::grid::PaintedRect;

pub struct CpuRenderer;

impl CpuRenderer {
    /// Rasterise a rectangle list onto an opaque black pixmap, each image pixel
    /// becoming a `scale` x `scale` block. Returns RGBA8 (alpha is always 255, so
    /// tiny-skia's premultiplied buffer is already straight alpha).
    pub fn render_rects_rgba(rects: &[PaintedRect], width: u32, height: u32, scale: u32) -> Result<Vec<u8>> {
        profiling::scope!("render_rects_rgba");
        let pix = Self::render_rects(rects, width, height, scale)?;
        Ok(pix.data().to_vec())
    }

    pub fn render_rects(rects: &[PaintedRect], width: u32, height: u32, scale: u32) -> Result<sk::Pixmap> {
        profiling::scope!("render_rects");

        let scale = scale.max(1);
        let (pw, ph) = (width.saturating_mul(scale), height.saturating_mul(scale));
        let mut pix = sk::Pixmap::new(pw, ph).ok_or(Img2LogicError::EmptyImage { width, height })?;
        pix.fill(sk::Color::BLACK);

        let mut paint = sk::Paint::default();
        // hard pixel edges, same as the display
        paint.anti_alias = false;

        for painted in rects {
            draw_rect(&mut pix, &mut paint, painted, scale as f32);
        }
        Ok(pix)
    }
}

fn draw_rect(pix: &mut sk::Pixmap, paint: &mut sk::Paint, painted: &PaintedRect, scale: f32) {
    let r = &painted.rect;
    let Some(rect) = sk::Rect::from_ltrb(
        r.x1 as f32 * scale,
        r.y1 as f32 * scale,
        r.x2 as f32 * scale,
        r.y2 as f32 * scale,
    ) else {
        return; // degenerate
    };
    paint.set_color_rgba8(painted.color.r, painted.color.g, painted.color.b, 255);
    pix.fill_rect(rect, paint, sk::Transform::identity(), None);
}
