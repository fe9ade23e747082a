/// Terminal surfaces: a container sized in character cells and a canvas that
/// prints frames with crossterm
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
    QueueableCommand,
};
use std::io::{self, Stdout, Write};
use primview_core::{Canvas, Container, Error, FrameBuffer, Result};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '▀';

/// How a pair of vertically stacked pixels becomes one character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellMode {
    /// Two coloured pixels per cell using the upper half block
    #[default]
    HalfBlock,
    /// One ramp character per cell, coloured by the averaged pixels
    Ascii,
}

/// A terminal region measured in cells. Each cell holds two pixel rows.
pub struct TerminalContainer<W> {
    columns: u16,
    rows: u16,
    mode: CellMode,
    make_writer: fn() -> W,
}

impl TerminalContainer<Stdout> {
    /// The whole terminal window, printing to stdout
    pub fn stdout(mode: CellMode) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        Ok(Self::new(columns, rows, mode, io::stdout))
    }
}

impl<W: Write> TerminalContainer<W> {
    pub fn new(columns: u16, rows: u16, mode: CellMode, make_writer: fn() -> W) -> Self {
        Self {
            columns,
            rows,
            mode,
            make_writer,
        }
    }

    pub fn mode(&self) -> CellMode {
        self.mode
    }
}

/// Pixel size of a `columns` x `rows` cell area
pub fn pixel_size(columns: u16, rows: u16) -> (u32, u32) {
    (u32::from(columns), u32::from(rows) * 2)
}

impl<W: Write> Container for TerminalContainer<W> {
    type Canvas = TerminalCanvas<W>;

    fn offset_width(&self) -> u32 {
        pixel_size(self.columns, self.rows).0
    }

    fn offset_height(&self) -> u32 {
        pixel_size(self.columns, self.rows).1
    }

    /// Nothing is written until the first frame, so the host can switch to
    /// the alternate screen first
    fn append_canvas(&mut self, width: u32, height: u32) -> Result<TerminalCanvas<W>> {
        Ok(TerminalCanvas {
            writer: (self.make_writer)(),
            mode: self.mode,
            width,
            height,
            attached: true,
        })
    }
}

/// Canvas drawing frames as coloured character cells
pub struct TerminalCanvas<W: Write> {
    writer: W,
    mode: CellMode,
    width: u32,
    height: u32,
    attached: bool,
}

impl<W: Write> TerminalCanvas<W> {
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Write directly to the terminal, e.g. for an overlay line
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn draw_half_blocks(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        let mut current: Option<(Color, Color)> = None;
        for row in 0..frame.height().div_ceil(2) {
            self.writer.queue(cursor::MoveTo(0, row as u16))?;
            for x in 0..frame.width() {
                let top = cell_color(frame, x, row * 2);
                let bottom = cell_color(frame, x, row * 2 + 1);
                if current != Some((top, bottom)) {
                    self.writer
                        .queue(SetForegroundColor(top))?
                        .queue(SetBackgroundColor(bottom))?;
                    current = Some((top, bottom));
                }
                self.writer.queue(Print(HALF_BLOCK))?;
            }
        }
        Ok(())
    }

    fn draw_ascii(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        let mut current = None;
        for row in 0..frame.height().div_ceil(2) {
            self.writer.queue(cursor::MoveTo(0, row as u16))?;
            for x in 0..frame.width() {
                let (character, color) = ramp_cell(frame, x, row * 2);
                if current != Some(color) {
                    self.writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                self.writer.queue(Print(character))?;
            }
        }
        Ok(())
    }
}

fn to_terminal(color: primview_core::Color) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

fn cell_color(frame: &FrameBuffer, x: usize, y: usize) -> Color {
    frame
        .pixel_color(x, y)
        .map(to_terminal)
        .unwrap_or(Color::Reset)
}

/// Ramp character and colour for the two pixels starting at row `y`
fn ramp_cell(frame: &FrameBuffer, x: usize, y: usize) -> (char, Color) {
    let pixels: Vec<_> = [y, y + 1]
        .into_iter()
        .filter_map(|y| frame.pixel_color(x, y))
        .collect();
    if pixels.is_empty() {
        return (' ', Color::Reset);
    }

    let count = pixels.len() as u32;
    let average = |channel: fn(&primview_core::Color) -> u8| {
        (pixels.iter().map(|p| u32::from(channel(p))).sum::<u32>() / count) as u8
    };
    let color = primview_core::Color::new(average(|c| c.r), average(|c| c.g), average(|c| c.b));

    let index = (color.luminance() * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    let character = LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)];
    (character, to_terminal(color))
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        if !self.attached {
            return Err(Error::Disposed);
        }
        match self.mode {
            CellMode::HalfBlock => self.draw_half_blocks(frame)?,
            CellMode::Ascii => self.draw_ascii(frame)?,
        }
        self.writer.queue(ResetColor)?;
        self.writer.flush()?;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.writer.queue(Clear(ClearType::All))?;
        Ok(())
    }

    fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        // The terminal may already be gone; nothing left to report to
        let _ = self.writer.queue(ResetColor).and_then(|w| w.flush());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(mode: CellMode) -> TerminalContainer<Vec<u8>> {
        TerminalContainer::new(4, 2, mode, Vec::new)
    }

    fn frame(color: primview_core::Color) -> FrameBuffer {
        let mut frame = FrameBuffer::new(4, 4);
        frame.clear(color, 1.0);
        frame
    }

    #[test]
    fn test_cells_hold_two_pixel_rows() {
        let container = container(CellMode::HalfBlock);
        assert_eq!(container.offset_width(), 4);
        assert_eq!(container.offset_height(), 4);
        assert_eq!(pixel_size(80, 24), (80, 48));
    }

    #[test]
    fn test_half_block_output() {
        let mut container = container(CellMode::HalfBlock);
        let mut canvas = container.append_canvas(4, 4).unwrap();
        canvas.present(&frame(primview_core::Color::RED)).unwrap();
        let output = String::from_utf8_lossy(canvas.writer());
        assert_eq!(output.matches(HALF_BLOCK).count(), 8);
    }

    #[test]
    fn test_ascii_output_uses_ramp() {
        let mut container = container(CellMode::Ascii);
        let mut canvas = container.append_canvas(4, 4).unwrap();
        canvas.present(&frame(primview_core::Color::WHITE)).unwrap();
        let output = String::from_utf8_lossy(canvas.writer());
        assert_eq!(output.matches('@').count(), 8);
    }

    #[test]
    fn test_ramp_darkest_is_blank() {
        let (character, _) = ramp_cell(&frame(primview_core::Color::BLACK), 0, 0);
        assert_eq!(character, ' ');
    }

    #[test]
    fn test_canvas_leaves_screen_alone_until_drawn() {
        let mut container = container(CellMode::HalfBlock);
        let mut canvas = container.append_canvas(4, 4).unwrap();
        assert!(canvas.writer().is_empty());

        canvas.detach();
        let output = String::from_utf8_lossy(canvas.writer());
        assert!(!output.contains("\x1b[2J"));
    }

    #[test]
    fn test_detached_canvas_refuses_frames() {
        let mut container = container(CellMode::HalfBlock);
        let mut canvas = container.append_canvas(4, 4).unwrap();
        canvas.detach();
        canvas.detach();
        assert!(!canvas.is_attached());
        assert!(matches!(
            canvas.present(&frame(primview_core::Color::RED)),
            Err(Error::Disposed)
        ));
    }
}
