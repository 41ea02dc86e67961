//! Common types, traits, and error definitions for grid_navigation
//!
//! This module provides the foundational building blocks shared by
//! the searches, the smoother and the path component.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
