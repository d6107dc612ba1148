//! Resource: file://{path} — files from a directory, read on every request.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;

use crate::context::RequestContext;
use crate::types::{
    McpError, McpResult, ReadResourceResult, ResourceContent, ResourceDefinition,
    ResourceReadParams,
};

use super::{ResourceBinding, ResourceHandler};

/// Serves a single file from disk.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
    mime_type: Option<String>,
}

impl FileResource {
    pub fn new(path: PathBuf) -> Self {
        let mime_type = guess_mime_type(&path).map(str::to_string);
        Self { path, mime_type }
    }

    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }

    pub fn definition(&self) -> ResourceDefinition {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        let definition = ResourceDefinition::new(self.uri(), name)
            .with_description(format!("Contents of {}", self.path.display()));
        match &self.mime_type {
            Some(mime) => definition.with_mime_type(mime.clone()),
            None => definition,
        }
    }

    pub fn binding(self) -> ResourceBinding {
        ResourceBinding::new(self.definition(), self)
    }
}

#[async_trait]
impl ResourceHandler for FileResource {
    async fn read(
        &self,
        ctx: RequestContext,
        params: ResourceReadParams,
    ) -> McpResult<ReadResourceResult> {
        let bytes = tokio::select! {
            _ = ctx.cancellation().cancelled() => return Err(McpError::RequestCancelled),
            bytes = tokio::fs::read(&self.path) => bytes?,
        };

        let content = match String::from_utf8(bytes) {
            Ok(text) => ResourceContent::text(
                params.uri,
                self.mime_type.clone().or_else(|| Some("text/plain".to_string())),
                text,
            ),
            Err(e) => ResourceContent::blob(
                params.uri,
                self.mime_type
                    .clone()
                    .or_else(|| Some("application/octet-stream".to_string())),
                base64::engine::general_purpose::STANDARD.encode(e.into_bytes()),
            ),
        };

        Ok(ReadResourceResult {
            contents: vec![content],
        })
    }
}

/// One binding per regular file directly under `root`, ordered by file name.
pub fn discover(root: &Path) -> McpResult<Vec<ResourceBinding>> {
    let root = root.canonicalize()?;
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(&root)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    tracing::debug!("Discovered {} file resources under {}", paths.len(), root.display());

    Ok(paths
        .into_iter()
        .map(|path| FileResource::new(path).binding())
        .collect())
}

fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "txt" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "json" => "application/json",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}
