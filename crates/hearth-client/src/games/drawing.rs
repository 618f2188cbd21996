use thiserror::Error;

pub const MIN_BRUSH: u8 = 1;
pub const MAX_BRUSH: u8 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color '{0}', expected #rrggbb")]
pub struct BadColor(pub String);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One continuous pen-down gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: u8,
    pub points: Vec<Point>,
}

/// Canvas for the drawing game: a stack of strokes plus the current pen.
#[derive(Debug, Clone)]
pub struct DrawingBoard {
    width: f32,
    height: f32,
    color: String,
    brush: u8,
    strokes: Vec<Stroke>,
    active: Option<Stroke>,
}

impl Default for DrawingBoard {
    fn default() -> Self {
        Self::new(400.0, 300.0)
    }
}

impl DrawingBoard {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            color: "#000000".into(),
            brush: 5,
            strokes: Vec::new(),
            active: None,
        }
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn brush(&self) -> u8 {
        self.brush
    }

    pub fn set_color(&mut self, color: &str) -> Result<(), BadColor> {
        let hex = color.strip_prefix('#').unwrap_or("");
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BadColor(color.to_string()));
        }
        self.color = color.to_ascii_lowercase();
        Ok(())
    }

    /// Brush width, clamped to the slider range.
    pub fn set_brush(&mut self, size: u8) {
        self.brush = size.clamp(MIN_BRUSH, MAX_BRUSH);
    }

    /// Pen down. A stroke already in progress is finished first.
    pub fn begin(&mut self, x: f32, y: f32) {
        self.end();
        let point = self.clamp(x, y);
        self.active = Some(Stroke {
            color: self.color.clone(),
            width: self.brush,
            points: vec![point],
        });
    }

    /// Pen moved. Ignored while the pen is up.
    pub fn extend(&mut self, x: f32, y: f32) {
        let point = self.clamp(x, y);
        if let Some(stroke) = self.active.as_mut() {
            stroke.points.push(point);
        }
    }

    /// Pen up.
    pub fn end(&mut self) {
        if let Some(stroke) = self.active.take() {
            self.strokes.push(stroke);
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active = None;
    }

    fn clamp(&self, x: f32, y: f32) -> Point {
        Point {
            x: x.clamp(0.0, self.width),
            y: y.clamp(0.0, self.height),
        }
    }
}
