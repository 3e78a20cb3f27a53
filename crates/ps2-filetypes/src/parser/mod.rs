mod icon_sys;
mod title_cfg;

pub use icon_sys::*;
pub use title_cfg::*;
