/// Skyline Web - canvas 2D host for browsers
///
/// The page owns the `requestAnimationFrame` loop and calls
/// [`WebViewer::frame`] from it, requesting the next callback only while
/// `frame` returns `true`.
use nalgebra::Point2;
use skyline_core::geojson::parse_feature_collection;
use skyline_core::{
    GeometryClass, Layer, PlaneCollection, RenderLoop, Style, Surface, ViewerConfig, Viewport,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_console_logger::DEFAULT_LOGGER;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Route `log` records to the browser console and panics to `console.error`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    log::set_logger(&DEFAULT_LOGGER).map_err(|e| JsValue::from_str(&e.to_string()))?;
    log::set_max_level(log::LevelFilter::Debug);
    Ok(())
}

/// [`Surface`] over a browser 2D context.
pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSurface {
    pub fn new(context: CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self {
            context,
            width,
            height,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.context.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn set_style(&mut self, style: &Style) {
        self.context
            .set_stroke_style(&JsValue::from_str(&style.stroke.to_css()));
        self.context
            .set_fill_style(&JsValue::from_str(&style.fill.to_css()));
        self.context.set_line_width(style.line_width);
    }

    fn begin_path(&mut self) {
        self.context.begin_path();
    }

    fn move_to(&mut self, point: Point2<f64>) {
        self.context.move_to(point.x, point.y);
    }

    fn line_to(&mut self, point: Point2<f64>) {
        self.context.line_to(point.x, point.y);
    }

    fn close_path(&mut self) {
        self.context.close_path();
    }

    fn stroke(&mut self) {
        self.context.stroke();
    }

    fn fill(&mut self) {
        self.context.fill();
    }
}

fn js_error(e: skyline_core::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn layer_from_geojson(
    text: &str,
    class: GeometryClass,
    config: &ViewerConfig,
) -> Result<Layer, JsValue> {
    let geometries = parse_feature_collection(text).map_err(js_error)?;
    let planes = PlaneCollection::extract(&geometries);
    let layer_config = match class {
        GeometryClass::Building => &config.building,
        GeometryClass::Roof => &config.roof,
    };
    Ok(layer_config.layer(class, planes))
}

#[wasm_bindgen]
pub struct WebViewer {
    surface: CanvasSurface,
    render_loop: RenderLoop,
    layers: Vec<Layer>,
}

#[wasm_bindgen]
impl WebViewer {
    /// Build a viewer on the canvas with id `canvas_id`.
    ///
    /// `buildings` and `roofs` are GeoJSON FeatureCollection texts (either may
    /// be empty); `config` is an optional JSON viewer configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        buildings: &str,
        roofs: &str,
        config: Option<String>,
    ) -> Result<WebViewer, JsValue> {
        let config = match config {
            Some(text) => ViewerConfig::from_json_str(&text).map_err(js_error)?,
            None => ViewerConfig::default(),
        };

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {canvas_id}")))?
            .dyn_into()?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into()?;
        let surface = CanvasSurface::new(context, canvas.width() as f64, canvas.height() as f64);

        let mut layers = Vec::new();
        if !buildings.trim().is_empty() {
            layers.push(layer_from_geojson(buildings, GeometryClass::Building, &config)?);
        }
        if !roofs.trim().is_empty() {
            layers.push(layer_from_geojson(roofs, GeometryClass::Roof, &config)?);
        }

        let camera = config.initial_camera(&layers, surface.viewport());
        log::debug!(
            "viewer on #{canvas_id}: {} layers, camera at {:?}",
            layers.len(),
            camera.position
        );
        Ok(WebViewer {
            surface,
            render_loop: RenderLoop::new(camera, config.loop_settings()),
            layers,
        })
    }

    /// Start orbiting. Returns `true` when the page must request a frame.
    pub fn start(&mut self) -> bool {
        self.render_loop.start()
    }

    pub fn stop(&mut self) {
        self.render_loop.stop();
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    /// `requestAnimationFrame` callback body; returns whether to request
    /// another frame.
    pub fn frame(&mut self, timestamp_ms: f64) -> bool {
        self.render_loop
            .tick(timestamp_ms, &mut self.surface, &self.layers)
            .reschedule
    }

    /// Draw the current view without advancing the camera.
    pub fn redraw(&mut self) {
        self.render_loop.redraw(&mut self.surface, &self.layers);
    }

    /// Replace the camera, keeping the current viewport.
    pub fn set_camera(&mut self, position: Vec<f64>, target: Vec<f64>) -> Result<(), JsValue> {
        let (position, target) = match (position.as_slice(), target.as_slice()) {
            ([px, py, pz], [tx, ty, tz]) => (
                nalgebra::Point3::new(*px, *py, *pz),
                nalgebra::Point3::new(*tx, *ty, *tz),
            ),
            _ => return Err(JsValue::from_str("position and target need 3 coordinates")),
        };
        let camera = self
            .render_loop
            .camera()
            .with_position(position)
            .with_target(target);
        self.render_loop.submit_camera(camera);
        Ok(())
    }

    pub fn orbit(&mut self, degrees: f64) {
        let camera = self.render_loop.camera().orbit(degrees.to_radians());
        self.render_loop.submit_camera(camera);
    }
}
