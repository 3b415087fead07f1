//! Surface implementations: the browser canvas and an in-memory bitmap.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::{contact_point, StrokePoint, Surface, SurfaceRect};

const STROKE_WIDTH: f64 = 2.0;
const STROKE_COLOR: &str = "#000";

/// `<canvas>` backed surface
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        ctx.set_line_width(STROKE_WIDTH);
        ctx.set_stroke_style_str(STROKE_COLOR);
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Viewport coordinates -> bitmap coordinates
    pub fn point_from_client(&self, client_x: f64, client_y: f64) -> StrokePoint {
        let dom_rect = self.canvas.get_bounding_client_rect();
        let rect = SurfaceRect {
            left: dom_rect.left(),
            top: dom_rect.top(),
            width: dom_rect.width(),
            height: dom_rect.height(),
        };
        contact_point(
            client_x,
            client_y,
            rect,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        )
    }

    /// Paint a previously saved data URL once the image has decoded
    pub fn draw_data_url(&self, data_url: &str) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;
        let ctx = self.ctx.clone();
        let loaded = image.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            if let Err(err) = ctx.draw_image_with_html_image_element(&loaded, 0.0, 0.0) {
                log::warn!("saved signature not drawn: {:?}", err);
            }
        });
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
        image.set_src(data_url);
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn begin_path(&mut self, at: StrokePoint) {
        self.ctx.begin_path();
        self.ctx.move_to(at.x, at.y);
    }

    fn line_to(&mut self, to: StrokePoint) {
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn alpha_channel(&self) -> Vec<u8> {
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;
        match self.ctx.get_image_data(0.0, 0.0, width, height) {
            Ok(image) => image.data().0.into_iter().skip(3).step_by(4).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn to_data_url(&self) -> Option<String> {
        self.canvas.to_data_url().ok()
    }
}

/// In-memory alpha raster, used where no canvas is available
#[derive(Debug, Clone)]
pub struct BitmapSurface {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
    cursor: Option<StrokePoint>,
}

impl BitmapSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width * height],
            cursor: None,
        }
    }

    pub fn inked_pixels(&self) -> usize {
        self.alpha.iter().filter(|a| **a != 0).count()
    }

    fn stamp(&mut self, p: StrokePoint) {
        let (x, y) = (p.x.round(), p.y.round());
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.alpha[y * self.width + x] = 255;
        }
    }
}

impl Surface for BitmapSurface {
    fn begin_path(&mut self, at: StrokePoint) {
        self.cursor = Some(at);
    }

    fn line_to(&mut self, to: StrokePoint) {
        let from = self.cursor.unwrap_or(to);
        let steps = (to.x - from.x).abs().max((to.y - from.y).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.stamp(StrokePoint {
                x: from.x + (to.x - from.x) * t,
                y: from.y + (to.y - from.y) * t,
            });
        }
        self.cursor = Some(to);
    }

    fn clear(&mut self) {
        self.alpha.iter_mut().for_each(|a| *a = 0);
        self.cursor = None;
    }

    fn alpha_channel(&self) -> Vec<u8> {
        self.alpha.clone()
    }

    fn to_data_url(&self) -> Option<String> {
        Some(format!(
            "bitmap:{}x{}:{}",
            self.width,
            self.height,
            self.inked_pixels()
        ))
    }
}
