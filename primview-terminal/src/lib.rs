/// Terminal host for primview scenes: character-cell canvas and frame loop
pub mod app;
pub mod canvas;

pub use app::TerminalApp;
pub use canvas::{CellMode, TerminalCanvas, TerminalContainer};
