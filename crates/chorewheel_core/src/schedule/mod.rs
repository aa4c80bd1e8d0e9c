//! Pure scheduling arithmetic.
//!
//! # Responsibility
//! - Period clock (`period`), rotation selection (`rotation`) and window
//!   enumeration (`window`).
//!
//! # Invariants
//! - No module here touches storage, membership or a wall clock.

pub mod period;
pub mod rotation;
pub mod window;
