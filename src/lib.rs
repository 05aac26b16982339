// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod geometry;

// External crate imports
use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use rusttype::{point, Font, PositionedGlyph, Scale};

// Standard library imports
use std::sync::mpsc::Receiver;
use std::time::Instant;

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

pub use geometry::{
    bisection_point, build_geometry, cartesian_to_polar, midpoint, polar_to_cartesian,
    rect_ray_intersection, Angle, AxisLayout, ChartError, ChartGeometry, Item, Point, Polar,
    RayIntersection, RING_COUNT,
};

// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// Color for chart strokes and fills
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for type-safe live chart updates
#[derive(Debug, Clone)]
pub enum ChartCommand {
    /// Set one axis value by item index.
    SetValue(usize, f64),
    /// Set one axis value by item label.
    SetValueByLabel(String, f64),
    /// Perpendicular bow distance of the data curve, in pixels.
    SetOffset(f64),
    /// Global rotation about the canvas center, in degrees.
    SetRotate(f64),
    /// Replace the leading axis values in item order.
    SetAllValues(Vec<f64>),
}

#[derive(Debug, Clone, Builder)]
pub struct ChartConfig {
    #[builder(default = "Spidergram".to_string())]
    pub title: String,

    // Canvas configuration. The framebuffer is `size` x `size` logical
    // pixels and the window opens at half that side length, so the chart
    // is displayed at 2x pixel density.
    #[builder(default = 1000)]
    pub size: u32,
    #[builder(default = 100.0)]
    pub padding: f64,

    // Curve shaping
    #[builder(default = 100.0)]
    pub offset: f64,
    #[builder(default = 0.0)]
    pub rotate: f64,

    // Label placement
    #[builder(default = 50.0)]
    pub label_offset: f64,
    #[builder(default = 30.0)]
    pub font_size: f32,

    // Colors and stroke weights
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background_color: Color,
    #[builder(default = Color::new(0xe0, 0x8d, 0x8d))]
    pub grid_color: Color,
    #[builder(default = 0.56)]
    pub grid_alpha: f64,
    #[builder(default = 1.0)]
    pub grid_width: f32,
    #[builder(default = Color::new(0xc1, 0x28, 0x28))]
    pub curve_color: Color,
    #[builder(default = 10.0)]
    pub curve_width: f32,
    #[builder(default = Color::new(0x00, 0x00, 0x00))]
    pub text_color: Color,

    // Window configuration
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    /// Raw TTF/OTF bytes for label text. Labels are skipped when absent.
    pub font_data: Option<Vec<u8>>,
}

/// Main chart struct - the primary public interface
#[derive(Debug)]
pub struct Chart {
    config: ChartConfig,
    items: Vec<Item>,
    font: Option<Font<'static>>,
}

impl Chart {
    pub fn new(config: ChartConfig, items: Vec<Item>) -> Result<Self, ChartError> {
        if items.is_empty() {
            return Err(ChartError::InvalidArgument(
                "chart needs at least one item",
            ));
        }
        let font = match &config.font_data {
            Some(data) => match Font::try_from_vec(data.clone()) {
                Some(font) => Some(font),
                None => {
                    return Err(ChartError::InvalidArgument(
                        "font data could not be parsed",
                    ))
                }
            },
            None => {
                tracing::warn!("no font supplied, axis labels will not be drawn");
                None
            }
        };
        Ok(Self {
            config,
            items,
            font,
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn set_value(&mut self, index: usize, value: f64) {
        self.update_value(index, value);
    }

    pub fn set_value_by_label(&mut self, label: &str, value: f64) {
        self.apply(ChartCommand::SetValueByLabel(label.to_string(), value));
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.config.offset = offset;
    }

    pub fn set_rotate(&mut self, degrees: f64) {
        self.config.rotate = degrees;
    }

    /// Applies one command, reporting whether it changed any render input.
    /// The windowed shell uses the report to redraw at most once per
    /// effective change.
    pub fn apply(&mut self, command: ChartCommand) -> bool {
        match command {
            ChartCommand::SetValue(index, value) => self.update_value(index, value),
            ChartCommand::SetValueByLabel(label, value) => {
                match self.items.iter().position(|item| item.label == label) {
                    Some(index) => self.update_value(index, value),
                    None => {
                        tracing::warn!(%label, "command for unknown axis label ignored");
                        false
                    }
                }
            }
            ChartCommand::SetOffset(offset) => {
                let changed = self.config.offset != offset;
                self.config.offset = offset;
                changed
            }
            ChartCommand::SetRotate(degrees) => {
                let changed = self.config.rotate != degrees;
                self.config.rotate = degrees;
                changed
            }
            ChartCommand::SetAllValues(values) => {
                let mut changed = false;
                for (index, value) in values.into_iter().enumerate() {
                    changed |= self.update_value(index, value);
                }
                changed
            }
        }
    }

    fn update_value(&mut self, index: usize, value: f64) -> bool {
        match self.items.get_mut(index) {
            Some(item) if item.value != value => {
                item.value = value;
                true
            }
            Some(_) => false,
            None => {
                tracing::warn!(index, "command for out-of-range axis ignored");
                false
            }
        }
    }

    /// Renders the chart into a caller-owned RGBA frame.
    ///
    /// Zero-value items are filtered out before layout, following the
    /// upstream shell convention; when nothing remains the frame is
    /// cleared and the call succeeds. A frame slice that does not match
    /// `width * height * 4` means the surface is not ready yet, which is
    /// an expected transient: the call is a silent no-op.
    ///
    /// Geometry errors abort the redraw with the frame untouched.
    pub fn redraw(&self, frame: &mut [u8], width: usize, height: usize) -> Result<(), ChartError> {
        if width == 0 || height == 0 || frame.len() != width * height * 4 {
            tracing::debug!(
                width,
                height,
                len = frame.len(),
                "drawing surface not ready, skipping redraw"
            );
            return Ok(());
        }
        let mut canvas = Canvas::new(frame, width, height);

        let visible: Vec<Item> = self
            .items
            .iter()
            .filter(|item| item.value != 0.0)
            .cloned()
            .collect();
        if visible.is_empty() {
            canvas.clear(self.config.background_color);
            tracing::debug!("all items at zero, nothing to lay out");
            return Ok(());
        }

        let scene = build_scene(&visible, &self.config)?;
        scene.render(&mut canvas, self.font.as_ref());
        Ok(())
    }
}

// ============================================================================
// WINDOWED SHELL
// ============================================================================

impl Chart {
    /// Opens a window and renders the chart until the window is closed.
    pub fn show(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    /// Same as [`Chart::show`], but live updates arrive on a channel;
    /// commands are drained without blocking and each effective change
    /// triggers one redraw.
    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<ChartCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    fn run_window(
        &mut self,
        receiver: Option<Receiver<ChartCommand>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let fb_side = self.config.size;
        let window_side = f64::from(fb_side) / 2.0;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(window_side, window_side))
            .with_resizable(false)
            .build(&event_loop)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let surface_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
        let mut pixels = Pixels::new(fb_side, fb_side, surface_texture)?;

        let frame_duration = std::time::Duration::from_secs_f64(1.0 / self.config.max_framerate);
        let mut last_frame = Instant::now();
        let mut dirty = true;

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        // The buffer keeps its logical side length; only
                        // the surface follows the window.
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        let frame = pixels.frame_mut();
                        if let Err(error) = self.redraw(frame, fb_side as usize, fb_side as usize) {
                            tracing::error!(%error, "redraw aborted");
                        }
                        let _ = pixels.render();
                        dirty = false;
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if let Some(ref receiver) = receiver {
                        while let Ok(command) = receiver.try_recv() {
                            dirty |= self.apply(command);
                        }
                    }
                    if dirty && last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug)]
enum DrawCommand {
    Clear(Color),
    Ring {
        center: Point,
        radius: f64,
        width: f32,
        color: Color,
        alpha: f32,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Color,
        alpha: f32,
    },
    Label {
        anchor: Point,
        rotation: Angle,
        text: String,
        font_size: f32,
        color: Color,
    },
    Curve {
        from: Point,
        control1: Point,
        control2: Point,
        to: Point,
        width: f32,
        color: Color,
    },
}

struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn render(&self, canvas: &mut Canvas, font: Option<&Font<'static>>) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => {
                    canvas.clear(*color);
                }
                DrawCommand::Ring {
                    center,
                    radius,
                    width,
                    color,
                    alpha,
                } => {
                    draw_circle_outline_aa(canvas, *center, *radius, *width, *color, *alpha);
                }
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    color,
                    alpha,
                } => {
                    draw_thick_line_aa(canvas, *from, *to, *width, *color, *alpha);
                }
                DrawCommand::Label {
                    anchor,
                    rotation,
                    text,
                    font_size,
                    color,
                } => {
                    if let Some(font) = font {
                        let scale = Scale::uniform(*font_size);
                        draw_rotated_text(canvas, *anchor, *rotation, text, font, scale, *color);
                    }
                }
                DrawCommand::Curve {
                    from,
                    control1,
                    control2,
                    to,
                    width,
                    color,
                } => {
                    draw_cubic_curve_aa(canvas, *from, *control1, *control2, *to, *width, *color);
                }
            }
        }
    }
}

/// Builds the ordered command list for one redraw: clear, background
/// rings, axis spokes with labels, then the closed smoothed data polygon.
///
/// The global rotation is folded into the center-origin -> canvas mapping
/// applied to every emitted point (and added to every label rotation), so
/// it reaches all passes; ring outlines are circles about the center and
/// are unaffected by it.
fn build_scene(items: &[Item], config: &ChartConfig) -> Result<Scene, ChartError> {
    let size = f64::from(config.size);
    let chart = geometry::build_geometry(items, size, config.padding, config.label_offset)?;
    let center = Point::new(size / 2.0, size / 2.0);
    let rotate = Angle::from_degrees(config.rotate);
    let place = |p: Point| p.rotated(rotate) + center;

    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(config.background_color));

    for radius in chart.rings {
        scene.add_command(DrawCommand::Ring {
            center,
            radius,
            width: config.grid_width,
            color: config.grid_color,
            alpha: config.grid_alpha as f32,
        });
    }

    for axis in &chart.axes {
        scene.add_command(DrawCommand::Line {
            from: place(axis.spoke_start),
            to: place(axis.spoke_end),
            width: config.grid_width,
            color: config.grid_color,
            alpha: config.grid_alpha as f32,
        });
        scene.add_command(DrawCommand::Label {
            anchor: place(axis.label_anchor),
            rotation: axis.label_rotation.add(config.rotate),
            text: axis.label.clone(),
            font_size: config.font_size,
            color: config.text_color,
        });
    }

    // Closed data polygon: each edge runs current -> next, wrapping the
    // last sample back to the first, so the bow keeps a uniform side.
    let samples: Vec<Point> = chart.samples().collect();
    if samples.len() > 1 {
        for (i, &a) in samples.iter().enumerate() {
            let b = samples[(i + 1) % samples.len()];
            let control = geometry::bisection_point(a, b, config.offset)?;
            scene.add_command(DrawCommand::Curve {
                from: place(a),
                control1: place(a),
                control2: place(control),
                to: place(b),
                width: config.curve_width,
                color: config.curve_color,
            });
        }
    } else {
        tracing::debug!("single visible axis, skipping the data curve pass");
    }

    Ok(scene)
}

// ============================================================================
// CORE DATA TYPES
// ============================================================================

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn set_pixel(frame: &mut [u8], width: usize, x: usize, y: usize, color: Color, alpha: f32) {
    if x < width && y < frame.len() / (width * 4) {
        let idx = (y * width + x) * 4;
        let src = [color.r as f32, color.g as f32, color.b as f32, 255.0 * alpha];
        let dst = [
            frame[idx] as f32,
            frame[idx + 1] as f32,
            frame[idx + 2] as f32,
            frame[idx + 3] as f32,
        ];
        let a = src[3] / 255.0;
        let out = [
            (src[0] * a + dst[0] * (1.0 - a)).round() as u8,
            (src[1] * a + dst[1] * (1.0 - a)).round() as u8,
            (src[2] * a + dst[2] * (1.0 - a)).round() as u8,
            0xff,
        ];
        frame[idx..idx + 4].copy_from_slice(&out);
    }
}

fn draw_thick_line_aa(
    canvas: &mut Canvas,
    from: Point,
    to: Point,
    thickness: f32,
    color: Color,
    stroke_alpha: f32,
) {
    let x0 = from.x.round() as i32;
    let y0 = from.y.round() as i32;
    let x1 = to.x.round() as i32;
    let y1 = to.y.round() as i32;
    let pad = thickness.ceil() as i32 + 1;
    let min_x = x0.min(x1) - pad;
    let max_x = x0.max(x1) + pad;
    let min_y = y0.min(y1) - pad;
    let max_y = y0.max(y1) + pad;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = dx * dx + dy * dy;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = (x - x0) as f32;
            let py = (y - y0) as f32;
            let t = if len_sq > 0.0 {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let lx = x0 as f32 + t * dx;
            let ly = y0 as f32 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0) * stroke_alpha;
            if aa > 0.01 {
                set_pixel(canvas.frame, canvas.width, x as usize, y as usize, color, aa);
            }
        }
    }
}

/// Stroked circle. Only the annulus bounding box is scanned; the ring
/// edges get the same one-pixel feather as the line primitive.
fn draw_circle_outline_aa(
    canvas: &mut Canvas,
    center: Point,
    radius: f64,
    width: f32,
    color: Color,
    stroke_alpha: f32,
) {
    let half = f64::from(width) / 2.0;
    let outer = radius + half;
    let inner = (radius - half).max(0.0);
    let min_x = (center.x - outer).floor() as i32 - 1;
    let max_x = (center.x + outer).ceil() as i32 + 1;
    let min_y = (center.y - outer).floor() as i32 - 1;
    let max_y = (center.y + outer).ceil() as i32 + 1;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f64 - center.x;
            let dy = y as f64 - center.y;
            let dist = (dx * dx + dy * dy).sqrt();
            let aa = if dist > outer {
                1.0 - (dist - outer).min(1.0)
            } else if dist < inner {
                1.0 - (inner - dist).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                let alpha = (aa as f32) * stroke_alpha;
                if alpha > 0.01 {
                    set_pixel(canvas.frame, canvas.width, x as usize, y as usize, color, alpha);
                }
            }
        }
    }
}

/// Cubic Bezier stroked by flattening into AA line segments. The step
/// count follows the control-polygon length, the same sizing rule as a
/// forward-differencing curve generator, clamped to keep degenerate and
/// huge curves bounded.
fn draw_cubic_curve_aa(
    canvas: &mut Canvas,
    from: Point,
    control1: Point,
    control2: Point,
    to: Point,
    thickness: f32,
    color: Color,
) {
    let len = from.distance(&control1) + control1.distance(&control2) + control2.distance(&to);
    let steps = ((len * 0.25) as usize).clamp(4, 256);
    let mut prev = from;
    for step in 1..=steps {
        let t = step as f64 / steps as f64;
        let next = cubic_point(from, control1, control2, to, t);
        draw_thick_line_aa(canvas, prev, next, thickness, color, 1.0);
        prev = next;
    }
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    Point::new(
        b0 * p0.x + b1 * c1.x + b2 * c2.x + b3 * p3.x,
        b0 * p0.y + b1 * c1.y + b2 * c2.y + b3 * p3.y,
    )
}

/// Draws a line of text centered on `anchor`, rotated about that anchor.
/// Glyphs are laid out straight, then every coverage pixel is rotated into
/// place and splatted with bilinear weights.
fn draw_rotated_text(
    canvas: &mut Canvas,
    anchor: Point,
    rotation: Angle,
    text: &str,
    font: &Font,
    scale: Scale,
    color: Color,
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    if min_x >= max_x {
        return;
    }
    let center_x = (min_x + max_x) as f64 / 2.0;
    let center_y = (min_y + max_y) as f64 / 2.0;
    let (sin_r, cos_r) = rotation.radians().sin_cos();

    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                if v > 0.001 {
                    let local_x = (gx as i32 + bb.min.x) as f64 - center_x;
                    let local_y = (gy as i32 + bb.min.y) as f64 - center_y;
                    let rotated_x = local_x * cos_r - local_y * sin_r;
                    let rotated_y = local_x * sin_r + local_y * cos_r;
                    draw_antialiased_pixel(
                        canvas,
                        anchor.x + rotated_x,
                        anchor.y + rotated_y,
                        color,
                        v,
                    );
                }
            });
        }
    }
}

fn draw_antialiased_pixel(canvas: &mut Canvas, x: f64, y: f64, color: Color, alpha: f32) {
    let x_floor = x.floor() as i32;
    let y_floor = y.floor() as i32;
    let x_frac = x - x_floor as f64;
    let y_frac = y - y_floor as f64;

    // Distribute coverage over the four nearest pixels.
    let samples = [
        (x_floor, y_floor, (1.0 - x_frac) * (1.0 - y_frac)),
        (x_floor + 1, y_floor, x_frac * (1.0 - y_frac)),
        (x_floor, y_floor + 1, (1.0 - x_frac) * y_frac),
        (x_floor + 1, y_floor + 1, x_frac * y_frac),
    ];

    for (px, py, weight) in samples {
        if px >= 0 && px < canvas.width as i32 && py >= 0 && py < canvas.height as i32 {
            let final_alpha = alpha * weight as f32;
            if final_alpha > 0.001 {
                set_pixel(
                    canvas.frame,
                    canvas.width,
                    px as usize,
                    py as usize,
                    color,
                    final_alpha,
                );
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ChartConfig {
        ChartConfig::builder().size(400).padding(40.0).build()
    }

    fn three_items() -> Vec<Item> {
        vec![
            Item::new("A", 1.0),
            Item::new("B", 0.5),
            Item::new("C", 0.5),
        ]
    }

    fn frame_for(config: &ChartConfig) -> Vec<u8> {
        let side = config.size as usize;
        vec![0u8; side * side * 4]
    }

    #[test]
    fn scene_passes_are_ordered() {
        let scene = build_scene(&three_items(), &test_config()).unwrap();
        assert_eq!(scene.commands.len(), 1 + RING_COUNT + 3 * 2 + 3);
        assert!(matches!(scene.commands[0], DrawCommand::Clear(_)));
        for command in &scene.commands[1..=RING_COUNT] {
            assert!(matches!(command, DrawCommand::Ring { .. }));
        }
        for pair in scene.commands[RING_COUNT + 1..RING_COUNT + 7].chunks(2) {
            assert!(matches!(pair[0], DrawCommand::Line { .. }));
            assert!(matches!(pair[1], DrawCommand::Label { .. }));
        }
        for command in &scene.commands[RING_COUNT + 7..] {
            assert!(matches!(command, DrawCommand::Curve { .. }));
        }
    }

    #[test]
    fn global_rotation_spins_spokes_but_not_rings() {
        let zero = build_scene(&three_items(), &test_config()).unwrap();
        let mut rotated_config = test_config();
        rotated_config.rotate = 90.0;
        let quarter = build_scene(&three_items(), &rotated_config).unwrap();

        // Rings are rotation-invariant.
        for (a, b) in zero.commands[1..=RING_COUNT]
            .iter()
            .zip(&quarter.commands[1..=RING_COUNT])
        {
            match (a, b) {
                (
                    DrawCommand::Ring {
                        center: ca,
                        radius: ra,
                        ..
                    },
                    DrawCommand::Ring {
                        center: cb,
                        radius: rb,
                        ..
                    },
                ) => {
                    assert_eq!(ca, cb);
                    assert_eq!(ra, rb);
                }
                _ => panic!("expected ring commands"),
            }
        }

        // The first spoke points along +x at rotate = 0 and along +y at
        // rotate = 90, with its distance from center unchanged.
        let spoke_end = |scene: &Scene| match &scene.commands[RING_COUNT + 1] {
            DrawCommand::Line { to, .. } => *to,
            other => panic!("expected a spoke line, got {other:?}"),
        };
        let end_zero = spoke_end(&zero);
        let end_quarter = spoke_end(&quarter);
        // size 400, padding 40: gap 32, outer ring 160, center (200, 200).
        assert!(end_zero.distance(&Point::new(360.0, 200.0)) < 1e-9);
        assert!(end_quarter.distance(&Point::new(200.0, 360.0)) < 1e-9);
    }

    #[test]
    fn flattened_cubic_with_midpoint_control_stays_on_chord() {
        // Control points (a, midpoint) are collinear with the endpoints,
        // so a zero offset degenerates every edge to its straight chord.
        let a = Point::new(10.0, 20.0);
        let b = Point::new(130.0, 60.0);
        let mid = midpoint(a, b);
        let chord = b - a;
        for step in 0..=32 {
            let t = step as f64 / 32.0;
            let p = cubic_point(a, a, mid, b, t);
            let offset = p - a;
            let cross = chord.x * offset.y - chord.y * offset.x;
            assert!(cross.abs() < 1e-6, "point {p:?} left the chord");
        }
    }

    #[test]
    fn redraw_is_idempotent() {
        let chart = Chart::new(test_config(), three_items()).unwrap();
        let side = chart.config().size as usize;

        let mut first = frame_for(chart.config());
        let mut second = frame_for(chart.config());
        chart.redraw(&mut first, side, side).unwrap();
        chart.redraw(&mut second, side, side).unwrap();
        assert!(first == second, "identical inputs must render identically");
    }

    #[test]
    fn changed_inputs_leave_no_drift() {
        let mut chart = Chart::new(test_config(), three_items()).unwrap();
        let side = chart.config().size as usize;

        let mut baseline = frame_for(chart.config());
        chart.redraw(&mut baseline, side, side).unwrap();

        let mut detour = frame_for(chart.config());
        chart.set_offset(-60.0);
        chart.set_rotate(45.0);
        chart.redraw(&mut detour, side, side).unwrap();
        assert!(detour != baseline);

        // Restoring the inputs restores the exact pixels.
        let mut restored = frame_for(chart.config());
        chart.set_offset(100.0);
        chart.set_rotate(0.0);
        chart.redraw(&mut restored, side, side).unwrap();
        assert!(restored == baseline);
    }

    #[test]
    fn mismatched_surface_is_a_silent_no_op() {
        let chart = Chart::new(test_config(), three_items()).unwrap();
        let mut stub = vec![7u8; 16];
        chart.redraw(&mut stub, 400, 400).unwrap();
        assert!(stub.iter().all(|&b| b == 7), "frame must stay untouched");
        chart.redraw(&mut stub, 0, 0).unwrap();
    }

    #[test]
    fn all_zero_values_clear_the_canvas() {
        let items = vec![Item::new("A", 0.0), Item::new("B", 0.0)];
        let chart = Chart::new(test_config(), items).unwrap();
        let side = chart.config().size as usize;
        let mut frame = frame_for(chart.config());
        chart.redraw(&mut frame, side, side).unwrap();
        assert!(frame
            .chunks_exact(4)
            .all(|px| px == [0xff, 0xff, 0xff, 0xff]));
    }

    #[test]
    fn single_visible_axis_skips_the_curve_pass() {
        let items = vec![Item::new("Solo", 0.8)];
        let scene = build_scene(&items, &test_config()).unwrap();
        assert_eq!(scene.commands.len(), 1 + RING_COUNT + 2);
        assert!(!scene
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Curve { .. })));
    }

    #[test]
    fn coincident_samples_abort_the_redraw() {
        // Opposite axes with mirrored values land on the same point, so
        // the curve control point is undefined and the redraw must fail
        // loudly instead of drawing a wrong polygon.
        let items = vec![Item::new("A", 0.5), Item::new("B", -0.5)];
        let chart = Chart::new(test_config(), items).unwrap();
        let side = chart.config().size as usize;
        let mut frame = frame_for(chart.config());
        let err = chart.redraw(&mut frame, side, side).unwrap_err();
        assert_eq!(err, ChartError::DegenerateSegment);
    }

    #[test]
    fn empty_items_are_rejected_up_front() {
        let err = Chart::new(test_config(), Vec::new()).unwrap_err();
        assert!(matches!(err, ChartError::InvalidArgument(_)));
    }

    #[test]
    fn apply_reports_effective_changes() {
        let mut chart = Chart::new(test_config(), three_items()).unwrap();
        assert!(chart.apply(ChartCommand::SetValue(1, 0.9)));
        assert!(!chart.apply(ChartCommand::SetValue(1, 0.9)));
        assert!(!chart.apply(ChartCommand::SetValue(99, 0.9)));
        assert!(chart.apply(ChartCommand::SetValueByLabel("A".into(), 0.2)));
        assert!(!chart.apply(ChartCommand::SetValueByLabel("missing".into(), 0.2)));
        assert!(!chart.apply(ChartCommand::SetOffset(100.0)));
        assert!(chart.apply(ChartCommand::SetOffset(-40.0)));
        assert!(chart.apply(ChartCommand::SetAllValues(vec![0.1, 0.2, 0.3])));
    }
}
