pub mod app;
pub mod clock_face;
pub mod input_translator;
pub mod terminal_ui;

pub use terminal_ui::TerminalUi;
