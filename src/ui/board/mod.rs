//! Interactive terminal board over the task controller.

pub mod app;
pub mod form;
pub mod view;

pub use app::run;
