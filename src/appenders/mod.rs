//! Appender implementations

pub mod console;
pub mod network;
pub mod rotating_file;

pub use console::ConsoleAppender;
pub use network::NetworkAppender;
pub use rotating_file::{RotatingFileAppender, RotationPolicy};

pub use crate::core::Appender;
