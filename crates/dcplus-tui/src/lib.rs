//! dcplus-tui - Terminal UI for Debug Console Plus
//!
//! This crate provides the ratatui-based terminal interface. It creates an
//! Engine from dcplus-app and adds terminal rendering, event polling, text
//! wrapping for the virtual viewport, and widget display.

pub mod event;
pub mod layout;
pub mod measure;
pub mod render;
pub mod runner;
pub mod terminal;
pub mod theme;
pub mod widgets;

#[cfg(test)]
pub mod test_utils;

// Re-export main entry point
pub use runner::run_with_workspace;
