//! Request handlers.

pub mod health;
pub mod music;
pub mod tracks;
pub mod trigger;

pub use health::*;
pub use music::*;
pub use tracks::*;
pub use trigger::*;
