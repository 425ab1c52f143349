pub mod app;
pub mod panels;
pub mod scene;

pub use app::App;
