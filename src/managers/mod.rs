// ottmarks state managers
// Managers handle stateful operations: the bookmark store, the session context and the dashboard view state.

pub mod bookmark_manager;
pub mod dashboard;
pub mod session_manager;
