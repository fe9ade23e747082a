/// Interactive frame loop for a bootstrapped scene in the terminal
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use primview_core::Instances;
use std::io::{self, stdout, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::canvas::{pixel_size, TerminalCanvas};

/// Orbit step per key press, in radians
const ROTATE_STEP: f32 = 0.1;
/// Zoom factor per key press
const ZOOM_STEP: f32 = 1.1;
/// Pan step per key press, as a fraction of the target distance
const PAN_STEP: f32 = 0.05;

/// What a key press asks the app to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    Rotate { left: f32, up: f32 },
    Zoom(f32),
    Pan { dx: f32, dy: f32 },
    ToggleAutoRotate,
}

/// Map a key to an action
pub fn action_for(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('w') | KeyCode::Up => Action::Rotate {
            left: 0.0,
            up: ROTATE_STEP,
        },
        KeyCode::Char('s') | KeyCode::Down => Action::Rotate {
            left: 0.0,
            up: -ROTATE_STEP,
        },
        KeyCode::Char('a') | KeyCode::Left => Action::Rotate {
            left: ROTATE_STEP,
            up: 0.0,
        },
        KeyCode::Char('d') | KeyCode::Right => Action::Rotate {
            left: -ROTATE_STEP,
            up: 0.0,
        },
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Zoom(ZOOM_STEP),
        KeyCode::Char('-') => Action::Zoom(1.0 / ZOOM_STEP),
        KeyCode::Char('h') => Action::Pan {
            dx: -PAN_STEP,
            dy: 0.0,
        },
        KeyCode::Char('l') => Action::Pan {
            dx: PAN_STEP,
            dy: 0.0,
        },
        KeyCode::Char('k') => Action::Pan {
            dx: 0.0,
            dy: PAN_STEP,
        },
        KeyCode::Char('j') => Action::Pan {
            dx: 0.0,
            dy: -PAN_STEP,
        },
        KeyCode::Char('r') => Action::ToggleAutoRotate,
        _ => return None,
    };
    Some(action)
}

/// Main application struct for terminal scene rendering
pub struct TerminalApp {
    instances: Instances<TerminalCanvas<Stdout>>,
    title: String,
    target_frame_time: Duration,
    running: bool,
    last_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(instances: Instances<TerminalCanvas<Stdout>>, title: impl Into<String>, fps: u32) -> Self {
        Self {
            instances,
            title: title.into(),
            target_frame_time: Duration::from_secs(1) / fps.max(1),
            running: true,
            last_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Run until the user quits, then release the scene
    pub fn run(mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide
        )?;
        info!(title = %self.title, "Terminal renderer started");

        let result = self.main_loop();

        // Cleanup
        self.instances.dispose();
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let mut previous = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            // Update
            let dt = (frame_start - previous).as_secs_f32();
            previous = frame_start;
            self.instances.update(dt);

            // Render
            self.instances.render()?;
            self.draw_overlay()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time {
                std::thread::sleep(self.target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_sample = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> anyhow::Result<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => {
                if let Some(action) = action_for(code) {
                    self.apply(action);
                }
            }
            Event::Resize(columns, rows) => {
                let (width, height) = pixel_size(columns, rows);
                debug!(columns, rows, "Terminal resized");
                self.instances.resize(width, height)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        let controls = &mut self.instances.controls;
        match action {
            Action::Quit => self.running = false,
            Action::Rotate { left, up } => {
                controls.rotate_left(left);
                controls.rotate_up(up);
            }
            Action::Zoom(factor) => controls.dolly_in(factor),
            Action::Pan { dx, dy } => controls.pan(&self.instances.camera, dx, dy),
            Action::ToggleAutoRotate => controls.auto_rotate = !controls.auto_rotate,
        }
    }

    fn draw_overlay(&mut self) -> io::Result<()> {
        let status = format!(
            "primview | {} | FPS: {:.1} | WASD/Arrows=Orbit +/-=Zoom HJKL=Pan R=Auto-rotate Q=Quit",
            self.title, self.fps
        );
        let Some(canvas) = self.instances.renderer.canvas_mut() else {
            return Ok(());
        };
        let writer = canvas.writer_mut();
        queue!(
            writer,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        assert_eq!(action_for(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(action_for(KeyCode::Esc), Some(Action::Quit));
    }

    #[test]
    fn test_zoom_keys_are_inverse() {
        let (Some(Action::Zoom(zoom_in)), Some(Action::Zoom(zoom_out))) =
            (action_for(KeyCode::Char('+')), action_for(KeyCode::Char('-')))
        else {
            panic!("zoom keys not mapped");
        };
        assert!((zoom_in * zoom_out - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_arrows_match_wasd() {
        assert_eq!(action_for(KeyCode::Up), action_for(KeyCode::Char('w')));
        assert_eq!(action_for(KeyCode::Left), action_for(KeyCode::Char('a')));
        assert_eq!(action_for(KeyCode::Char('x')), None);
    }
}
