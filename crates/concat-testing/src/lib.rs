//! Testing utilities for concat composers.

pub mod recording;

pub use recording::{RecordingSurface, SurfaceCall};

pub mod prelude {
    pub use crate::recording::{RecordingSurface, SurfaceCall};
}
