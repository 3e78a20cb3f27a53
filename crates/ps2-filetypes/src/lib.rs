//! PS2 save metadata formats.
//!
//! Pure byte-in, byte-out code: nothing here touches the filesystem.

mod common;
mod parser;

pub use common::*;
pub use parser::*;
