//! Application state shared by the event loop and the renderer.

mod state;

pub use state::{ActiveNotice, App, LOGGED_OUT};
