pub mod draw;
pub mod form;
pub mod layout;
pub mod screens;
pub mod theme;
pub mod widgets;
