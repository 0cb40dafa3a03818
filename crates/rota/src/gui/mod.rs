pub mod app;
pub mod editor;
pub mod theme;
pub mod wheel;
