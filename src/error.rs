pub type BoxedIncludeProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Any error reported by the user-supplied `IncludeProvider`
    #[error("include provider error: \"{cause}\" when trying to include {file:?}")]
    IncludeProviderError {
        file: String,
        cause: BoxedIncludeProviderError,
    },

    /// Include nesting went deeper than the configured maximum; usually a cyclic include
    #[error("include depth {depth} exceeded when including {file:?}; triggered in {from:?} ({from_line})")]
    DepthExceeded {
        /// File which was about to be included
        file: String,

        /// File which contained the include directive
        from: String,

        /// Line in the `from` file on which the include happened
        from_line: usize,

        depth: u32,
    },

    /// Directive syntax is wrong for its kind
    #[error("{file}({line}): malformed expression, {reason}: {text}")]
    MalformedExpression {
        file: String,
        line: usize,
        /// Raw text of the offending line
        text: String,
        reason: &'static str,
    },

    #[error("{file}({line}): mutator {mutator:?} not found: {text}")]
    MutatorNotFound {
        file: String,
        line: usize,
        text: String,
        mutator: String,
    },

    #[error("{file}({line}): duplicate mutator {mutator:?}: {text}")]
    DuplicateMutator {
        file: String,
        line: usize,
        text: String,
        mutator: String,
    },

    #[error("{file}({line}): value {value} of mutator {mutator:?} appears more than once: {text}")]
    DuplicateMutatorValue {
        file: String,
        line: usize,
        text: String,
        mutator: String,
        value: i32,
    },

    /// A rewrite rule with the same "from" pattern was already declared
    #[error("{file}({line}): mutation rewrite already exists: {text}")]
    DuplicateRewriteRule {
        file: String,
        line: usize,
        text: String,
    },

    /// Re-entrant `technique_start`, mismatched or stray `technique_end`, or a block left open
    #[error("{file}({line}): {reason}: {text}")]
    TechniqueStateError {
        file: String,
        line: usize,
        text: String,
        reason: &'static str,
    },

    /// Ghost struct directives out of order, or a struct left open
    #[error("{file}({line}): {reason}: {text}")]
    StructStateError {
        file: String,
        line: usize,
        text: String,
        reason: &'static str,
    },

    #[error("no techniques were found in {file:?}")]
    NoTechniques { file: String },
}

/// Failure of [`crate::ParsedShader::canonicalize_mutation`]
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The rewrite rules form a cycle reachable from the given mutation
    #[error("mutation rewrite rules cycle back to {mutation:?}")]
    Cycle { mutation: Vec<i32> },
}

/// The line a directive came from; builds errors that point back at it.
#[derive(Clone, Copy)]
pub(crate) struct LineInfo<'a> {
    pub file: &'a str,
    pub line: usize,
    pub text: &'a str,
}

impl<'a> LineInfo<'a> {
    pub fn malformed(&self, reason: &'static str) -> ParseError {
        ParseError::MalformedExpression {
            file: self.file.to_owned(),
            line: self.line,
            text: self.text.to_owned(),
            reason,
        }
    }

    pub fn mutator_not_found(&self, mutator: &str) -> ParseError {
        ParseError::MutatorNotFound {
            file: self.file.to_owned(),
            line: self.line,
            text: self.text.to_owned(),
            mutator: mutator.to_owned(),
        }
    }

    pub fn duplicate_mutator(&self, mutator: &str) -> ParseError {
        ParseError::DuplicateMutator {
            file: self.file.to_owned(),
            line: self.line,
            text: self.text.to_owned(),
            mutator: mutator.to_owned(),
        }
    }

    pub fn duplicate_mutator_value(&self, mutator: &str, value: i32) -> ParseError {
        ParseError::DuplicateMutatorValue {
            file: self.file.to_owned(),
            line: self.line,
            text: self.text.to_owned(),
            mutator: mutator.to_owned(),
            value,
        }
    }

    pub fn duplicate_rewrite(&self) -> ParseError {
        ParseError::DuplicateRewriteRule {
            file: self.file.to_owned(),
            line: self.line,
            text: self.text.to_owned(),
        }
    }

    pub fn technique_state(&self, reason: &'static str) -> ParseError {
        ParseError::TechniqueStateError {
            file: self.file.to_owned(),
            line: self.line,
            text: self.text.to_owned(),
            reason,
        }
    }

    pub fn struct_state(&self, reason: &'static str) -> ParseError {
        ParseError::StructStateError {
            file: self.file.to_owned(),
            line: self.line,
            text: self.text.to_owned(),
            reason,
        }
    }
}
