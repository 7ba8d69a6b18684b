pub mod state;
pub mod widget;
