
/// Session restore, login and logout lifecycle
pub mod session_tests;
