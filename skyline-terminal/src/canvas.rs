/// Character-cell drawing surface for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use skyline_core::{Style, Surface, Viewport};
use std::io::Write;

/// Character luminosity ramp for fills (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide; the canvas
/// exposes a viewport with square units and halves y when rasterizing.
pub const CELL_ASPECT: f64 = 2.0;

/// Line widths at or above this draw heavy outlines.
const HEAVY_STROKE: f64 = 0.5;

/// Painter-style canvas: every fill or stroke overwrites the cells it
/// touches, there is no depth buffer.
pub struct CharCanvas {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    style: Option<Style>,
    subpaths: Vec<Vec<Point2<f64>>>,
}

impl CharCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            style: None,
            subpaths: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Viewport the projection should target for this canvas.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f64, self.height as f64 * CELL_ASPECT)
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<char> {
        (col < self.width && row < self.height).then(|| self.char_buffer[row * self.width + col])
    }

    /// One string per row, for snapshots and tests.
    pub fn rows(&self) -> Vec<String> {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }

    fn plot(&mut self, col: i64, row: i64, character: char, color: Color) {
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return;
        }
        let idx = row as usize * self.width + col as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    fn to_cell(point: Point2<f64>) -> (i64, i64) {
        (point.x.floor() as i64, (point.y / CELL_ASPECT).floor() as i64)
    }

    /// Bresenham line between two viewport points, clipped to the canvas
    /// first so the walk never leaves the visible cells.
    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, character: char, color: Color) {
        let viewport = self.viewport();
        let Some((from, to)) = clip_segment(from, to, viewport.width, viewport.height) else {
            return;
        };
        let (mut x0, mut y0) = Self::to_cell(from);
        let (x1, y1) = Self::to_cell(to);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, character, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Even-odd scanline fill of the current path, sampled at cell centers.
    fn fill_path(&mut self, character: char, color: Color) {
        let edges: Vec<(Point2<f64>, Point2<f64>)> = self
            .subpaths
            .iter()
            .filter(|path| path.len() > 2)
            .flat_map(|path| path.iter().copied().zip(path.iter().copied().cycle().skip(1)))
            .collect();

        let mut crossings = Vec::new();
        for row in 0..self.height {
            let y = (row as f64 + 0.5) * CELL_ASPECT;
            crossings.clear();
            for (a, b) in &edges {
                if (a.y <= y && y < b.y) || (b.y <= y && y < a.y) {
                    crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f64::total_cmp);

            for span in crossings.chunks_exact(2) {
                let first = (span[0] - 0.5).ceil().max(0.0) as i64;
                let last = ((span[1] - 0.5).ceil() as i64).min(self.width as i64);
                for col in first..last {
                    self.plot(col, row as i64, character, color);
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Liang-Barsky clip of a segment to `[0, width] x [0, height]`.
fn clip_segment(
    from: Point2<f64>,
    to: Point2<f64>,
    width: f64,
    height: f64,
) -> Option<(Point2<f64>, Point2<f64>)> {
    let d = to - from;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    let boundaries = [
        (-d.x, from.x),
        (d.x, width - from.x),
        (-d.y, from.y),
        (d.y, height - from.y),
    ];
    for (p, q) in boundaries {
        if p == 0.0 {
            // parallel to this edge
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    let start = if t0 > 0.0 { from + d * t0 } else { from };
    let end = if t1 < 1.0 { from + d * t1 } else { to };
    Some((start, end))
}

fn terminal_color(color: skyline_core::Color) -> Color {
    Color::Rgb {
        r: color.0,
        g: color.1,
        b: color.2,
    }
}

/// Map a fill color's brightness onto the luminosity ramp.
fn fill_glyph(color: skyline_core::Color) -> char {
    let luma = 0.299 * color.0 as f64 + 0.587 * color.1 as f64 + 0.114 * color.2 as f64;
    let char_index = (luma / 255.0 * (LUMINOSITY_RAMP.len() - 1) as f64) as usize;
    LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)]
}

fn is_finite(point: &Point2<f64>) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

impl Surface for CharCanvas {
    fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
        self.subpaths.clear();
    }

    fn set_style(&mut self, style: &Style) {
        self.style = Some(*style);
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, point: Point2<f64>) {
        if is_finite(&point) {
            self.subpaths.push(vec![point]);
        }
    }

    fn line_to(&mut self, point: Point2<f64>) {
        if !is_finite(&point) {
            return;
        }
        match self.subpaths.last_mut() {
            Some(path) => path.push(point),
            None => self.subpaths.push(vec![point]),
        }
    }

    fn close_path(&mut self) {
        if let Some(path) = self.subpaths.last_mut() {
            if let (Some(&first), Some(&last)) = (path.first(), path.last()) {
                if path.len() > 1 && first != last {
                    path.push(first);
                }
            }
        }
    }

    fn stroke(&mut self) {
        let style = self
            .style
            .unwrap_or_else(|| skyline_core::GeometryClass::Building.default_style());
        let character = if style.line_width >= HEAVY_STROKE { '#' } else { '\'' };
        let color = terminal_color(style.stroke);

        let segments: Vec<(Point2<f64>, Point2<f64>)> = self
            .subpaths
            .iter()
            .flat_map(|path| path.windows(2).map(|w| (w[0], w[1])))
            .collect();
        for (from, to) in segments {
            self.draw_line(from, to, character, color);
        }
    }

    fn fill(&mut self) {
        let style = self
            .style
            .unwrap_or_else(|| skyline_core::GeometryClass::Roof.default_style());
        self.fill_path(fill_glyph(style.fill), terminal_color(style.fill));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skyline_core::GeometryClass;
    use std::time::{Duration, Instant};

    fn square(canvas: &mut CharCanvas, x0: f64, y0: f64, x1: f64, y1: f64) {
        canvas.begin_path();
        canvas.move_to(Point2::new(x0, y0));
        canvas.line_to(Point2::new(x1, y0));
        canvas.line_to(Point2::new(x1, y1));
        canvas.line_to(Point2::new(x0, y1));
        canvas.line_to(Point2::new(x0, y0));
    }

    #[test]
    fn test_viewport_accounts_for_cell_aspect() {
        let canvas = CharCanvas::new(80, 24);
        assert_eq!(canvas.viewport(), Viewport::new(80.0, 48.0));
    }

    #[test]
    fn test_stroke_outline() {
        let mut canvas = CharCanvas::new(6, 4);
        canvas.set_style(&GeometryClass::Roof.default_style());
        square(&mut canvas, 1.0, 0.0, 4.0, 6.0);
        canvas.stroke();

        assert_eq!(
            canvas.rows(),
            vec![" #### ", " #  # ", " #  # ", " #### "]
        );
    }

    #[test]
    fn test_fill_covers_interior() {
        let mut canvas = CharCanvas::new(6, 4);
        let style = Style {
            fill: skyline_core::Color(255, 255, 255),
            ..GeometryClass::Roof.default_style()
        };
        canvas.set_style(&style);
        square(&mut canvas, 1.0, 0.0, 5.0, 8.0);
        canvas.fill();

        assert_eq!(canvas.rows(), vec![" @@@@ "; 4]);
    }

    #[test]
    fn test_later_shapes_overpaint_earlier_ones() {
        let mut canvas = CharCanvas::new(6, 2);
        canvas.set_style(&Style {
            fill: skyline_core::Color(0, 0, 0),
            ..GeometryClass::Roof.default_style()
        });
        square(&mut canvas, 0.0, 0.0, 6.0, 4.0);
        canvas.fill();
        canvas.set_style(&Style {
            fill: skyline_core::Color(255, 255, 255),
            ..GeometryClass::Roof.default_style()
        });
        square(&mut canvas, 2.0, 0.0, 4.0, 4.0);
        canvas.fill();

        assert_eq!(canvas.rows(), vec!["..@@.."; 2]);
    }

    #[test]
    fn test_clear_and_offscreen_points() {
        let mut canvas = CharCanvas::new(4, 2);
        canvas.set_style(&GeometryClass::Building.default_style());
        canvas.begin_path();
        canvas.move_to(Point2::new(-100.0, -100.0));
        canvas.line_to(Point2::new(f64::NAN, 3.0));
        canvas.line_to(Point2::new(-50.0, 500.0));
        canvas.stroke();
        assert_eq!(canvas.rows(), vec!["    "; 2]);

        square(&mut canvas, 0.0, 0.0, 3.0, 2.0);
        canvas.stroke();
        assert_eq!(canvas.cell(0, 0), Some('\''));
        canvas.clear();
        assert_eq!(canvas.rows(), vec!["    "; 2]);
        assert_eq!(canvas.cell(4, 0), None);
    }

    #[test]
    fn test_close_path_strokes_the_closing_edge() {
        let mut canvas = CharCanvas::new(6, 4);
        canvas.set_style(&GeometryClass::Roof.default_style());
        canvas.begin_path();
        canvas.move_to(Point2::new(1.0, 0.0));
        canvas.line_to(Point2::new(4.0, 0.0));
        canvas.line_to(Point2::new(4.0, 6.0));
        canvas.line_to(Point2::new(1.0, 6.0));
        canvas.close_path();
        canvas.stroke();

        assert_eq!(
            canvas.rows(),
            vec![" #### ", " #  # ", " #  # ", " #### "]
        );
    }

    #[test]
    fn test_far_offscreen_segment_is_clipped() {
        let mut canvas = CharCanvas::new(80, 24);
        canvas.set_style(&GeometryClass::Building.default_style());
        canvas.begin_path();
        canvas.move_to(Point2::new(40.0, 20.0));
        canvas.line_to(Point2::new(4.0e8, 20.0));

        let started = Instant::now();
        canvas.stroke();
        assert!(started.elapsed() < Duration::from_millis(250));

        let rows = canvas.rows();
        assert_eq!(rows[10], format!("{}{}", " ".repeat(40), "'".repeat(40)));
        for (index, row) in rows.iter().enumerate().filter(|(index, _)| *index != 10) {
            assert_eq!(row.trim(), "", "row {index}");
        }
    }

    #[test]
    fn test_segments_outside_the_canvas_are_dropped() {
        let mut canvas = CharCanvas::new(8, 4);
        canvas.set_style(&GeometryClass::Building.default_style());
        canvas.begin_path();
        canvas.move_to(Point2::new(-1.0e9, -5.0));
        canvas.line_to(Point2::new(1.0e9, -5.0));
        canvas.line_to(Point2::new(1.0e9, 1.0e9));
        canvas.stroke();
        assert_eq!(canvas.rows(), vec!["        "; 4]);

        // crossing the whole canvas keeps only the visible part
        canvas.begin_path();
        canvas.move_to(Point2::new(-1.0e9, 3.0));
        canvas.line_to(Point2::new(1.0e9, 3.0));
        canvas.stroke();
        assert_eq!(canvas.rows()[1], "''");
    }

    #[test]
    fn test_clip_segment_keeps_inside_endpoints() {
        let from = Point2::new(0.1, 0.3);
        let to = Point2::new(2.7, 1.9);
        assert_eq!(clip_segment(from, to, 4.0, 4.0), Some((from, to)));
        assert_eq!(clip_segment(Point2::new(5.0, 1.0), Point2::new(9.0, 1.0), 4.0, 4.0), None);

        let (start, end) = clip_segment(Point2::new(-4.0, 2.0), Point2::new(8.0, 2.0), 4.0, 4.0).unwrap();
        assert!((start - Point2::new(0.0, 2.0)).norm() < 1e-12);
        assert!((end - Point2::new(4.0, 2.0)).norm() < 1e-12);
    }
}
