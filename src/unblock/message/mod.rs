//! Human-readable messages for operation outcomes.

mod builder;

pub use builder::UnblockMessageBuilder;
