//! Two minimal gfx-hal programs sharing one renderer: `triangle` draws a
//! fixed white triangle, `heart` shades a beating heart from an implicit
//! curve in the fragment shader. See the `triangle` and `heart` binaries.

pub mod demo;
pub mod error;
pub mod renderer;
mod run;

pub use demo::Demo;
pub use error::Error;
pub use run::{run, DIMS};
