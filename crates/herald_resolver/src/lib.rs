//! Guild configuration resolution for Herald.
//!
//! [`ConfigResolver`] turns a guild id, an optional channel and an optional
//! inline override into an [`EffectiveConfig`](herald_core::EffectiveConfig)
//! by layering built-in defaults, the stored document, the channel override
//! and the inline override. It also owns the administrative write path:
//! every write is validated before anything is mutated and is serialized
//! per guild.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod merge;
mod resolver;

pub use merge::effective_config;
pub use resolver::ConfigResolver;
