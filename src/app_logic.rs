/*
 * This module provides the application logic layer, centered around
 * `MyAppLogic` which acts as the Presenter/Controller. It also includes
 * `MainWindowUiState` for the state tied to the main window (the shown tree
 * and its item id mappings) and the logical control identifiers shared with
 * the UI description. Unit tests for `MyAppLogic` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod main_window_ui_state;
pub mod ui_constants;

#[cfg(test)]
mod handler_tests;

pub use handler::MyAppLogic;
pub use main_window_ui_state::MainWindowUiState;
