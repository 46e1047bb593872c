//! dcplus-app - Application state and orchestration for Debug Console Plus
//!
//! This crate implements the TEA (The Elm Architecture) pattern for state
//! management on top of the log pipeline: the bounded store, the filter
//! engine that keeps the filtered view in step with it, and the virtual
//! viewport that scrolls over that view. It also owns configuration loading,
//! the debug adapter stream reader, and the Engine shared by the TUI and
//! headless runners.

pub mod actions;
pub mod config;
pub mod engine;
pub mod filter_engine;
pub mod handler;
pub mod input;
pub mod input_key;
pub mod message;
pub mod process;
pub mod session;
pub mod signals;
pub mod state;
pub mod store;
pub mod viewport;

// Re-export primary types
pub use engine::Engine;
pub use filter_engine::{FilterChange, FilterEngine, FilteredView};
pub use handler::{UpdateAction, UpdateResult};
pub use input::InputSource;
pub use input_key::InputKey;
pub use message::Message;
pub use session::{SessionId, SessionTracker};
pub use state::AppState;
pub use store::LogStore;
pub use viewport::{HeightMeasurer, RenderWindow, VirtualViewport, WindowRow};
