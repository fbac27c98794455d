pub mod background;
pub mod commands;
pub mod config;
pub mod controller;
pub mod input;
pub mod session;
pub mod shortcuts;

pub use background::{BackgroundImage, FileBackground, ImageHandle};
pub use commands::{Command, UndoManager};
pub use config::EditorConfig;
pub use controller::{InteractionController, Mode};
pub use input::{InputEvent, Modifiers};
pub use session::EditSession;
pub use shortcuts::{ShortcutAction, ShortcutMap};
