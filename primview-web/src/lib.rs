//! primview Web - demo gallery in the browser
//!
//! Renders with the core software renderer into a 2D canvas appended to a
//! host element. JavaScript owns the frame loop: call `render` from
//! `requestAnimationFrame` and `dispose` when the page goes away.

use primview_core::{demos, Canvas, Container, Error, FrameBuffer, Instances};
use tracing::{debug, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, ImageData};

fn surface_error(context: &str, err: JsValue) -> Error {
    Error::Surface(format!("{context}: {err:?}"))
}

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A DOM element that hosts the canvas
pub struct WebContainer {
    element: HtmlElement,
}

impl WebContainer {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl Container for WebContainer {
    type Canvas = WebCanvas;

    fn offset_width(&self) -> u32 {
        self.element.offset_width().max(0) as u32
    }

    fn offset_height(&self) -> u32 {
        self.element.offset_height().max(0) as u32
    }

    fn append_canvas(&mut self, width: u32, height: u32) -> primview_core::Result<WebCanvas> {
        let document = self
            .element
            .owner_document()
            .ok_or_else(|| Error::Surface("container is not in a document".to_string()))?;
        let canvas = document
            .create_element("canvas")
            .map_err(|e| surface_error("failed to create canvas", e))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::Surface("failed to cast to HtmlCanvasElement".to_string()))?;
        canvas.set_width(width);
        canvas.set_height(height);

        let context = canvas
            .get_context("2d")
            .map_err(|e| surface_error("failed to get 2d context", e))?
            .ok_or_else(|| Error::Surface("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Surface("failed to cast to CanvasRenderingContext2d".to_string()))?;

        self.element
            .append_child(&canvas)
            .map_err(|e| surface_error("failed to append canvas", e))?;
        debug!(width, height, "Canvas appended");

        Ok(WebCanvas {
            canvas: Some(canvas),
            context,
        })
    }
}

/// A `<canvas>` element drawn through its 2D context
pub struct WebCanvas {
    canvas: Option<HtmlCanvasElement>,
    context: CanvasRenderingContext2d,
}

impl Canvas for WebCanvas {
    fn present(&mut self, frame: &FrameBuffer) -> primview_core::Result<()> {
        if self.canvas.is_none() {
            return Err(Error::Disposed);
        }
        if frame.is_empty() {
            return Ok(());
        }
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(frame.as_rgba()),
            frame.width() as u32,
            frame.height() as u32,
        )
        .map_err(|e| surface_error("failed to wrap frame", e))?;
        self.context
            .put_image_data(&image, 0.0, 0.0)
            .map_err(|e| surface_error("failed to draw frame", e))
    }

    fn resize(&mut self, width: u32, height: u32) -> primview_core::Result<()> {
        let canvas = self.canvas.as_ref().ok_or(Error::Disposed)?;
        canvas.set_width(width);
        canvas.set_height(height);
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(canvas) = self.canvas.take() {
            canvas.remove();
        }
    }
}

/// One gallery page bound to a host element
#[wasm_bindgen]
pub struct DemoViewer {
    container: WebContainer,
    instances: Option<Instances<WebCanvas>>,
    title: String,
}

#[wasm_bindgen]
impl DemoViewer {
    /// Bootstrap the demo at `path` (e.g. `geometry/box` or `#/helper/grid`)
    /// into `element`
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, path: &str) -> Result<DemoViewer, JsValue> {
        let demo = demos::find(path)
            .ok_or_else(|| JsValue::from_str(&format!("unknown demo '{path}'")))?;
        let mut container = WebContainer::new(element);
        let instances = demo.bootstrap(&mut container).map_err(to_js)?;
        info!(path = demo.path, "Demo loaded");

        Ok(DemoViewer {
            container,
            instances: Some(instances),
            title: demo.title.to_string(),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn title(&self) -> String {
        self.title.clone()
    }

    /// Advance the controls by `dt` seconds and draw a frame
    pub fn render(&mut self, dt: f32) -> Result<(), JsValue> {
        let instances = self.instances()?;
        instances.update(dt);
        instances.render().map_err(to_js)
    }

    /// Orbit by the given angles in radians
    pub fn rotate(&mut self, left: f32, up: f32) -> Result<(), JsValue> {
        let controls = &mut self.instances()?.controls;
        controls.rotate_left(left);
        controls.rotate_up(up);
        Ok(())
    }

    /// Zoom in for `factor > 1`, out for `factor < 1`
    pub fn zoom(&mut self, factor: f32) -> Result<(), JsValue> {
        self.instances()?.controls.dolly_in(factor);
        Ok(())
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> Result<(), JsValue> {
        let instances = self.instances()?;
        instances.controls.pan(&instances.camera, dx, dy);
        Ok(())
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.instances()?.controls.auto_rotate = enabled;
        Ok(())
    }

    /// Re-measure the host element and resize to match
    pub fn resize(&mut self) -> Result<(), JsValue> {
        let width = self.container.offset_width();
        let height = self.container.offset_height();
        self.instances()?.resize(width, height).map_err(to_js)
    }

    /// Remove the canvas and stop the controls. Later calls fail.
    pub fn dispose(&mut self) {
        if let Some(instances) = self.instances.take() {
            instances.dispose();
            debug!(title = %self.title, "Demo disposed");
        }
    }
}

impl DemoViewer {
    fn instances(&mut self) -> Result<&mut Instances<WebCanvas>, JsValue> {
        self.instances.as_mut().ok_or_else(|| to_js(Error::Disposed))
    }
}

/// Paths of every demo in the gallery
#[wasm_bindgen]
pub fn demo_paths() -> Vec<JsValue> {
    demos::catalog()
        .iter()
        .map(|demo| JsValue::from_str(demo.path))
        .collect()
}

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::INFO)
            .build(),
    );
}
