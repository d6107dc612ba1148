//! Build-time registration of prompts, resources, and tools.

pub mod binding;
pub mod builder;

pub use binding::{Binding, Descriptor};
pub use builder::ServerBuilder;
