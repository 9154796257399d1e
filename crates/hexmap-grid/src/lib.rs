//! Hex lattice geometry and spatial indexing for the **hexmap** renderer.
//!
//! This crate is intentionally dependency-free so level and editor tooling
//! can consume the lattice math without pulling in any renderer code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`axial`] | `AxialCoord`, the integer lattice coordinate of one hex cell |
//! | [`corner`] | `Corner`, the clockwise six-corner enum with modular arithmetic |
//! | [`layout`] | `HexLayout`, flat-top topology and world-space geometry |
//! | [`chessboard`] | `Chessboard`, the position-keyed occupant multimap |
//! | [`vec2`] / [`rect`] | small world-space geometry primitives |
//!
//! # Quick start
//!
//! ```rust
//! use hexmap_grid::{Corner, HexLayout};
//!
//! let layout = HexLayout::new(8, 6, 50.0);
//! let pos = layout.axial_from_offset(3, 2);
//!
//! // Walking an edge and back lands on the starting cell.
//! let across = layout.neighbor_toward(pos, Corner::Right);
//! assert_eq!(layout.neighbor_toward(across, Corner::Right.offset(3)), pos);
//! ```

pub mod axial;
pub mod chessboard;
pub mod corner;
pub mod layout;
pub mod rect;
pub mod vec2;

pub use axial::AxialCoord;
pub use chessboard::Chessboard;
pub use corner::Corner;
pub use layout::HexLayout;
pub use rect::Rect;
pub use vec2::Vec2;
