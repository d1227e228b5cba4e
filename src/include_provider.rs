use crate::BoxedIncludeProviderError;

/// Path after resolution by the [`IncludeProvider`]. Include-once guards are keyed on it,
/// so two spellings of the same file should resolve to the same value.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ResolvedIncludePath(pub String);

pub struct ResolvedInclude<IncludeContext> {
    pub resolved_path: ResolvedIncludePath,
    pub context: IncludeContext,
}

/// User-supplied include reader
///
/// The parser never touches the filesystem itself. Search paths, relative includes and
/// virtual file systems are the provider's business; `IncludeContext` is handed back on
/// every nested include so relative paths can be resolved against the including file.
pub trait IncludeProvider {
    type IncludeContext;

    fn resolve_path(
        &self,
        path: &str,
        context: &Self::IncludeContext,
    ) -> Result<ResolvedInclude<Self::IncludeContext>, BoxedIncludeProviderError>;

    fn get_include(
        &mut self,
        path: &ResolvedIncludePath,
    ) -> Result<String, BoxedIncludeProviderError>;
}
