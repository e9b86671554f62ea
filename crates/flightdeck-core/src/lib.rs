pub mod config;
pub mod gesture;
pub mod keymap;
pub mod overlay;
pub mod template;
pub mod timer;
pub mod typeahead;

mod error;
mod session;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use keymap::{JsonFileStore, KeymapCache, SettingsStore};
pub use overlay::{OverlayController, OverlayRenderer, Viewport};
pub use session::{Navigator, OverlayState, SelectionSource, Session, SessionConfig, TimerKind};

pub use flightdeck_types::*;
pub use url::Url;
