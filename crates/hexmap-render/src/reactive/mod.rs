//! Reactive value boxes driving incremental redraw.

mod property;

pub use property::{DirtyProperty, ListenerId};
