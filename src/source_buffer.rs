use std::collections::HashSet;

use crate::ResolvedIncludePath;

/// Lines accumulated for one compilation unit, plus the include-once files already
/// expanded into it.
#[derive(Clone, Default, Debug)]
pub(crate) struct SourceBuffer {
    pub lines: Vec<String>,
    guarded: HashSet<ResolvedIncludePath>,
}

impl SourceBuffer {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn has_guard(&self, path: &ResolvedIncludePath) -> bool {
        self.guarded.contains(path)
    }

    pub fn add_guard(&mut self, path: ResolvedIncludePath) {
        self.guarded.insert(path);
    }

    /// Join into the final text; every line is newline terminated.
    pub fn into_source(self) -> String {
        let mut source = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            source.push_str(line);
            source.push('\n');
        }
        source
    }
}
