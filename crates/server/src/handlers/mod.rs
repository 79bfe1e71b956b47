//! HTTP request handlers.

pub mod common;
pub mod oauth;
pub mod sounds;

pub use common::*;
pub use oauth::*;
pub use sounds::*;
