//! Signature Pad
//!
//! Freehand drawing surface for Leptos using mouse and touch events.
//! Touch contacts are mapped onto the same start/extend/finish path as the
//! mouse, so both input kinds share one stroke implementation.
//! Strokes are not kept as vectors; the raster is the only record.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

mod surface;

pub use surface::{BitmapSurface, CanvasSurface};

/// A point in surface (bitmap) coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
}

/// On-screen box of the surface element, in viewport coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Map a viewport contact point onto the bitmap.
///
/// The element may be displayed at a different size than its bitmap, so the
/// offset is scaled by bitmap size / displayed size on each axis.
pub fn contact_point(
    client_x: f64,
    client_y: f64,
    rect: SurfaceRect,
    bitmap_width: f64,
    bitmap_height: f64,
) -> StrokePoint {
    let scale_x = if rect.width > 0.0 { bitmap_width / rect.width } else { 1.0 };
    let scale_y = if rect.height > 0.0 { bitmap_height / rect.height } else { 1.0 };
    StrokePoint {
        x: (client_x - rect.left) * scale_x,
        y: (client_y - rect.top) * scale_y,
    }
}

/// Raster target of a signature pad
pub trait Surface {
    /// Start a new path at `at` without drawing anything
    fn begin_path(&mut self, at: StrokePoint);
    /// Extend the current path and stroke it immediately
    fn line_to(&mut self, to: StrokePoint);
    /// Wipe every pixel
    fn clear(&mut self);
    /// Alpha value of every pixel, row-major
    fn alpha_channel(&self) -> Vec<u8>;
    /// Encoded bitmap (PNG data URL for canvases)
    fn to_data_url(&self) -> Option<String>;
}

/// True when any pixel has non-zero alpha
pub fn has_ink(alpha: &[u8]) -> bool {
    alpha.iter().any(|a| *a != 0)
}

/// Drawing state over a surface
pub struct SignaturePad<S> {
    surface: S,
    drawing: bool,
}

/// Pad shared between event handlers
pub type SharedPad<S> = Rc<RefCell<SignaturePad<S>>>;

impl<S: Surface> SignaturePad<S> {
    pub fn new(surface: S) -> Self {
        Self { surface, drawing: false }
    }

    pub fn shared(surface: S) -> SharedPad<S> {
        Rc::new(RefCell::new(Self::new(surface)))
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Contact down: begin a stroke
    pub fn start(&mut self, at: StrokePoint) {
        self.drawing = true;
        self.surface.begin_path(at);
    }

    /// Contact moved: stroke a segment if a stroke is in progress
    pub fn extend(&mut self, to: StrokePoint) {
        if !self.drawing {
            return;
        }
        self.surface.line_to(to);
    }

    /// Contact up or left the surface.
    /// Returns true if a stroke ended, i.e. the raster may have changed.
    pub fn finish(&mut self) -> bool {
        std::mem::replace(&mut self.drawing, false)
    }

    pub fn clear(&mut self) {
        self.drawing = false;
        self.surface.clear();
    }

    /// Samples the raster; a cleared surface has no ink regardless of history
    pub fn has_signature(&self) -> bool {
        has_ink(&self.surface.alpha_channel())
    }

    /// Encoded bitmap, or an empty string for a blank surface
    pub fn data_url(&self) -> String {
        if !self.has_signature() {
            return String::new();
        }
        self.surface.to_data_url().unwrap_or_default()
    }
}

// ========================
// Event Handlers
// ========================

fn first_touch_point(
    pad: &SharedPad<CanvasSurface>,
    ev: &web_sys::TouchEvent,
) -> Option<StrokePoint> {
    let touch = ev.changed_touches().get(0)?;
    let point = pad
        .borrow()
        .surface()
        .point_from_client(touch.client_x() as f64, touch.client_y() as f64);
    Some(point)
}

/// End the stroke and hand the new raster to `on_commit`
fn end_stroke(pad: &SharedPad<CanvasSurface>, on_commit: Callback<String>) {
    let ended = pad.borrow_mut().finish();
    if ended {
        let data_url = pad.borrow().data_url();
        on_commit.run(data_url);
    }
}

/// mousedown: begin a stroke at the cursor
pub fn make_on_mouse_down(pad: SharedPad<CanvasSurface>) -> impl Fn(web_sys::MouseEvent) + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        ev.prevent_default();
        let point = pad
            .borrow()
            .surface()
            .point_from_client(ev.client_x() as f64, ev.client_y() as f64);
        pad.borrow_mut().start(point);
    }
}

/// mousemove: extend the stroke
pub fn make_on_mouse_move(pad: SharedPad<CanvasSurface>) -> impl Fn(web_sys::MouseEvent) + 'static {
    move |ev: web_sys::MouseEvent| {
        if !pad.borrow().is_drawing() {
            return;
        }
        let point = pad
            .borrow()
            .surface()
            .point_from_client(ev.client_x() as f64, ev.client_y() as f64);
        pad.borrow_mut().extend(point);
    }
}

/// mouseup / mouseleave: end the stroke and commit
pub fn make_on_mouse_up(
    pad: SharedPad<CanvasSurface>,
    on_commit: Callback<String>,
) -> impl Fn(web_sys::MouseEvent) + 'static {
    move |_ev: web_sys::MouseEvent| end_stroke(&pad, on_commit)
}

/// touchstart: same as mousedown at the first changed contact
pub fn make_on_touch_start(
    pad: SharedPad<CanvasSurface>,
) -> impl Fn(web_sys::TouchEvent) + 'static {
    move |ev: web_sys::TouchEvent| {
        // Keeps the page from scrolling and suppresses emulated mouse events
        ev.prevent_default();
        if let Some(point) = first_touch_point(&pad, &ev) {
            pad.borrow_mut().start(point);
        }
    }
}

/// touchmove: same as mousemove
pub fn make_on_touch_move(pad: SharedPad<CanvasSurface>) -> impl Fn(web_sys::TouchEvent) + 'static {
    move |ev: web_sys::TouchEvent| {
        ev.prevent_default();
        if let Some(point) = first_touch_point(&pad, &ev) {
            pad.borrow_mut().extend(point);
        }
    }
}

/// touchend / touchcancel: same as mouseup
pub fn make_on_touch_end(
    pad: SharedPad<CanvasSurface>,
    on_commit: Callback<String>,
) -> impl Fn(web_sys::TouchEvent) + 'static {
    move |ev: web_sys::TouchEvent| {
        ev.prevent_default();
        end_stroke(&pad, on_commit);
    }
}

/// Attach all mouse and touch listeners to the pad's canvas.
/// The listeners live as long as the page.
pub fn bind_canvas_listeners(
    pad: SharedPad<CanvasSurface>,
    on_commit: Callback<String>,
) -> Result<(), JsValue> {
    let canvas = pad.borrow().surface().canvas().clone();

    let mouse: [(&str, Box<dyn Fn(web_sys::MouseEvent)>); 4] = [
        ("mousedown", Box::new(make_on_mouse_down(pad.clone()))),
        ("mousemove", Box::new(make_on_mouse_move(pad.clone()))),
        ("mouseup", Box::new(make_on_mouse_up(pad.clone(), on_commit))),
        ("mouseleave", Box::new(make_on_mouse_up(pad.clone(), on_commit))),
    ];
    for (event, handler) in mouse {
        let closure = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev| handler(ev));
        canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    let touch: [(&str, Box<dyn Fn(web_sys::TouchEvent)>); 4] = [
        ("touchstart", Box::new(make_on_touch_start(pad.clone()))),
        ("touchmove", Box::new(make_on_touch_move(pad.clone()))),
        ("touchend", Box::new(make_on_touch_end(pad.clone(), on_commit))),
        ("touchcancel", Box::new(make_on_touch_end(pad, on_commit))),
    ];
    for (event, handler) in touch {
        let closure = Closure::<dyn FnMut(web_sys::TouchEvent)>::new(move |ev| handler(ev));
        canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> StrokePoint {
        StrokePoint { x, y }
    }

    #[test]
    fn test_contact_point_scales_to_bitmap() {
        let rect = SurfaceRect { left: 100.0, top: 50.0, width: 200.0, height: 75.0 };
        let p = contact_point(150.0, 75.0, rect, 400.0, 150.0);
        assert_eq!(p, pt(100.0, 50.0));
    }

    #[test]
    fn test_contact_point_zero_sized_rect() {
        let rect = SurfaceRect { left: 10.0, top: 10.0, width: 0.0, height: 0.0 };
        let p = contact_point(15.0, 12.0, rect, 400.0, 150.0);
        assert_eq!(p, pt(5.0, 2.0));
    }

    #[test]
    fn test_blank_pad_has_no_signature() {
        let pad = SignaturePad::new(BitmapSurface::new(40, 20));
        assert!(!pad.has_signature());
        assert_eq!(pad.data_url(), "");
    }

    #[test]
    fn test_stroke_leaves_ink() {
        let mut pad = SignaturePad::new(BitmapSurface::new(40, 20));
        pad.start(pt(2.0, 2.0));
        pad.extend(pt(30.0, 15.0));
        assert!(pad.finish());
        assert!(pad.has_signature());
        assert!(!pad.data_url().is_empty());
    }

    #[test]
    fn test_move_without_start_draws_nothing() {
        let mut pad = SignaturePad::new(BitmapSurface::new(40, 20));
        pad.extend(pt(30.0, 15.0));
        assert!(!pad.finish());
        assert!(!pad.has_signature());
    }

    #[test]
    fn test_tap_without_move_draws_nothing() {
        let mut pad = SignaturePad::new(BitmapSurface::new(40, 20));
        pad.start(pt(5.0, 5.0));
        assert!(pad.finish());
        assert!(!pad.has_signature());
    }

    #[test]
    fn test_clear_removes_signature() {
        let mut pad = SignaturePad::new(BitmapSurface::new(40, 20));
        pad.start(pt(1.0, 1.0));
        pad.extend(pt(20.0, 10.0));
        pad.finish();
        assert!(pad.has_signature());

        pad.clear();
        assert!(!pad.has_signature());
        assert!(!pad.is_drawing());
    }

    #[test]
    fn test_out_of_band_clear_is_detected() {
        let mut pad = SignaturePad::new(BitmapSurface::new(40, 20));
        pad.start(pt(1.0, 1.0));
        pad.extend(pt(20.0, 10.0));
        pad.finish();

        pad.surface_mut().clear();
        assert!(!pad.has_signature());
    }

    #[test]
    fn test_has_ink() {
        assert!(!has_ink(&[0, 0, 0]));
        assert!(has_ink(&[0, 1, 0]));
        assert!(!has_ink(&[]));
    }
}
