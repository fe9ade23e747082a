/// Software rasterization into an RGBA frame buffer with a depth buffer
use crate::color::Color;

/// Depth bias applied to lines so edges drawn over their own faces win
const LINE_DEPTH_BIAS: f32 = 1e-4;

/// A screen-space point: pixel x, pixel y and NDC depth
pub type ScreenPoint = (f32, f32, f32);

/// Colour and depth target
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            rgba: vec![0; size * 4],
            depth: vec![f32::INFINITY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    pub fn clear(&mut self, color: Color, alpha: f32) {
        let rgba = color.to_rgba(alpha);
        for pixel in self.rgba.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
        self.depth.fill(f32::INFINITY);
    }

    /// Raw RGBA bytes, row-major from the top-left corner
    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    pub fn pixel_color(&self, x: usize, y: usize) -> Option<Color> {
        self.pixel(x, y).map(|[r, g, b, _]| Color::new(r, g, b))
    }

    /// Write an opaque pixel if it is nearer than what is stored
    fn plot(&mut self, x: i32, y: i32, depth: f32, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth[idx] {
            self.depth[idx] = depth;
            self.rgba[idx * 4..idx * 4 + 4].copy_from_slice(&color.to_rgba(1.0));
        }
    }

    /// Box-filter this buffer down by an integer `factor` into `target`
    pub fn downsample_into(&self, factor: usize, target: &mut FrameBuffer) {
        let factor = factor.max(1);
        target.resize(self.width / factor, self.height / factor);
        let samples = (factor * factor) as u32;
        for y in 0..target.height {
            for x in 0..target.width {
                let mut sum = [0u32; 4];
                for sy in 0..factor {
                    for sx in 0..factor {
                        let i = ((y * factor + sy) * self.width + x * factor + sx) * 4;
                        for (channel, total) in sum.iter_mut().enumerate() {
                            *total += self.rgba[i + channel] as u32;
                        }
                    }
                }
                let o = (y * target.width + x) * 4;
                for (channel, total) in sum.iter().enumerate() {
                    target.rgba[o + channel] = (total / samples) as u8;
                }
            }
        }
        target.depth.fill(f32::INFINITY);
    }

    /// Fill a triangle using bounding-box scan with barycentric coverage
    pub fn fill_triangle(&mut self, coords: &[ScreenPoint; 3], color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box clipped to screen bounds
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, color);
                    }
                }
            }
        }
    }

    /// Draw a depth-tested line, clipped to the buffer first
    pub fn draw_line(&mut self, start: ScreenPoint, end: ScreenPoint, color: Color) {
        let Some((start, end)) = clip_to_rect(start, end, self.width as f32, self.height as f32)
        else {
            return;
        };
        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = start.0 + dx * t;
            let y = start.1 + dy * t;
            let depth = start.2 + (end.2 - start.2) * t - LINE_DEPTH_BIAS;
            self.plot(x.floor() as i32, y.floor() as i32, depth, color);
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Liang-Barsky clip of a segment against `[0, width] x [0, height]`
fn clip_to_rect(
    start: ScreenPoint,
    end: ScreenPoint,
    width: f32,
    height: f32,
) -> Option<(ScreenPoint, ScreenPoint)> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    let edges = [
        (-dx, start.0),
        (dx, width - start.0),
        (-dy, start.1),
        (dy, height - start.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let lerp = |t: f32| {
        (
            start.0 + dx * t,
            start.1 + dy * t,
            start.2 + (end.2 - start.2) * t,
        )
    };
    Some((lerp(t0), lerp(t1)))
}
