mod component;
mod render;
mod state;
mod style;

pub use component::NetworkGraphCanvas;
pub use style::{AMBER, BLUE, PINK, RED};
