//! Backend abstraction layer
//!
//! GPU execution lives outside this crate; backends implement [`Backend`] to
//! receive the linearized command buffers of each frame.

pub mod dummy;
pub mod traits;

pub use dummy::DummyBackend;
pub use traits::*;
