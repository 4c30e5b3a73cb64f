//! menu-driven front-end
/// the operations behind the menu entries, each returning a result struct
pub mod session;
/// pretty-printing of session results into tables
pub mod report;
/// rustyline loop
pub mod menu;
