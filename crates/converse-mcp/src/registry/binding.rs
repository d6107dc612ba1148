//! Capability descriptors and their pairing with handlers.

use std::sync::Arc;

use serde::Serialize;

use crate::types::{CapabilityKind, PromptDefinition, ResourceDefinition, ToolDefinition};

/// Static metadata for one capability, independent of its handler.
pub trait Descriptor: Clone + Serialize + Send + Sync + 'static {
    const KIND: CapabilityKind;

    /// The exact, case-sensitive key requests look this capability up by.
    fn key(&self) -> &str;
}

impl Descriptor for PromptDefinition {
    const KIND: CapabilityKind = CapabilityKind::Prompt;

    fn key(&self) -> &str {
        &self.name
    }
}

impl Descriptor for ResourceDefinition {
    const KIND: CapabilityKind = CapabilityKind::Resource;

    fn key(&self) -> &str {
        &self.uri
    }
}

impl Descriptor for ToolDefinition {
    const KIND: CapabilityKind = CapabilityKind::Tool;

    fn key(&self) -> &str {
        &self.name
    }
}

/// One descriptor paired with the handler that serves it. The unit of
/// registration.
pub struct Binding<D, H: ?Sized> {
    pub descriptor: D,
    pub handler: Arc<H>,
}

impl<D: Descriptor, H: ?Sized> Binding<D, H> {
    pub fn key(&self) -> &str {
        self.descriptor.key()
    }
}

impl<D: Clone, H: ?Sized> Clone for Binding<D, H> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<D: std::fmt::Debug, H: ?Sized> std::fmt::Debug for Binding<D, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
