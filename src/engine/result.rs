use crate::engine::resource::ResourceError;
use crate::maven::module_metadata::ModuleMetadata;

/// Outcome classification of a module metadata resolution. `Missing` means the
///  repository definitively does not have the module; `Failed` means we could not
///  find out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Resolved,
    Missing,
    Failed,
}

/// Tri-state result of resolving a module's metadata. Sub-step failures with a
///  safe default (missing snapshot metadata, missing optional artifacts) never
///  surface here; only the outcome of the descriptor/artifact fetch itself does.
#[derive(Debug)]
pub enum MetadataResolveResult {
    Resolved(ModuleMetadata),
    Missing,
    Failed(ResourceError),
}

impl MetadataResolveResult {
    pub fn state(&self) -> ResolveState {
        match self {
            MetadataResolveResult::Resolved(_) => ResolveState::Resolved,
            MetadataResolveResult::Missing => ResolveState::Missing,
            MetadataResolveResult::Failed(_) => ResolveState::Failed,
        }
    }

    pub fn metadata(&self) -> Option<&ModuleMetadata> {
        match self {
            MetadataResolveResult::Resolved(metadata) => Some(metadata),
            _ => None,
        }
    }
}
