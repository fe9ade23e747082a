//! Display surfaces a renderer can attach to.
//!
//! A [`Container`] is owned by the host (a terminal, a DOM element, ...).
//! The bootstrap only reads its size and appends one [`Canvas`] to it.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::Result;
use crate::raster::FrameBuffer;

/// The child surface a renderer presents frames to
pub trait Canvas {
    /// Show a finished frame
    fn present(&mut self, frame: &FrameBuffer) -> Result<()>;

    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Remove the canvas from its container and release what it holds
    fn detach(&mut self);
}

/// A host surface with a measurable pixel size that accepts a canvas
pub trait Container {
    type Canvas: Canvas;

    fn offset_width(&self) -> u32;

    fn offset_height(&self) -> u32;

    /// Create a canvas of the given size and append it as a child
    fn append_canvas(&mut self, width: u32, height: u32) -> Result<Self::Canvas>;
}

/// In-memory container for tests and off-screen rendering
#[derive(Debug)]
pub struct HeadlessContainer {
    width: u32,
    height: u32,
    attached: Rc<Cell<usize>>,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            attached: Rc::new(Cell::new(0)),
        }
    }

    /// Canvases currently attached to this container
    pub fn child_count(&self) -> usize {
        self.attached.get()
    }
}

impl Container for HeadlessContainer {
    type Canvas = HeadlessCanvas;

    fn offset_width(&self) -> u32 {
        self.width
    }

    fn offset_height(&self) -> u32 {
        self.height
    }

    fn append_canvas(&mut self, width: u32, height: u32) -> Result<HeadlessCanvas> {
        self.attached.set(self.attached.get() + 1);
        Ok(HeadlessCanvas {
            width,
            height,
            frames_presented: 0,
            last_frame: None,
            attached: Some(Rc::clone(&self.attached)),
        })
    }
}

/// Canvas that keeps the most recently presented frame
#[derive(Debug)]
pub struct HeadlessCanvas {
    width: u32,
    height: u32,
    frames_presented: usize,
    last_frame: Option<FrameBuffer>,
    attached: Option<Rc<Cell<usize>>>,
}

impl HeadlessCanvas {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last_frame.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }
}

impl Canvas for HeadlessCanvas {
    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.frames_presented += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(attached) = self.attached.take() {
            attached.set(attached.get().saturating_sub(1));
        }
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_detach() {
        let mut container = HeadlessContainer::new(320, 240);
        let mut canvas = container.append_canvas(320, 240).unwrap();
        assert_eq!(container.child_count(), 1);
        assert!(canvas.is_attached());

        canvas.detach();
        canvas.detach();
        assert_eq!(container.child_count(), 0);
        assert!(!canvas.is_attached());
    }
}
