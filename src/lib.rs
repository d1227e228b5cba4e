//! **shader-variants** parses annotated shader programs and expands them into compilable
//! variants. It is aimed at GLSL/HLSL sources that describe their own permutations with
//! `#pragma anki` directives.
//!
//! A program is crawled once through a user-supplied [`IncludeProvider`], so virtual file
//! systems, include paths and build-system dependency tracking stay on the caller's side.
//! Along the way the parser collects:
//!
//! * mutators (`#pragma anki mutator NAME 0 1 2`), the compile-time axes of variation,
//!   plus skip and rewrite rules that prune the Cartesian product,
//! * techniques (`#pragma anki technique_start vert Forward` ... `technique_end`), each
//!   with a source per shader stage,
//! * ghost structs, 16-bit type support, library name and ray type.
//!
//! Other preprocessor directives are copied through untouched for the shader compiler.
//! The resulting [`ParsedShader`] is read-only and can generate variants from many
//! threads at once.
//!
//! # Example
//!
//! ```rust
//! use shader_variants::*;
//!
//! struct FileIncludeProvider;
//! impl IncludeProvider for FileIncludeProvider {
//!     type IncludeContext = ();
//!
//!     fn resolve_path(
//!         &self,
//!         path: &str,
//!         _context: &Self::IncludeContext,
//!     ) -> Result<ResolvedInclude<Self::IncludeContext>, BoxedIncludeProviderError> {
//!         Ok(ResolvedInclude {
//!             resolved_path: ResolvedIncludePath(path.to_owned()),
//!             context: (),
//!         })
//!     }
//!
//!     fn get_include(
//!         &mut self,
//!         path: &ResolvedIncludePath,
//!     ) -> Result<String, BoxedIncludeProviderError> {
//!         Ok(std::fs::read_to_string(&path.0)?)
//!     }
//! }
//!
//! // ...
//!
//! fn build(path: &str) -> Result<(), ParseError> {
//!     let program = parse_file(path, &mut FileIncludeProvider, (), ParserConfig::default())?;
//!
//!     for mut mutation in program.mutations() {
//!         if program.skip_mutation(&mutation) || program.rewrite_mutation(&mut mutation) {
//!             continue;
//!         }
//!
//!         for technique in program.techniques() {
//!             for stage in technique.stages().stages() {
//!                 let _source = program.generate_variant(&mutation, technique, stage);
//!             }
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod ghost_struct;
mod hash;
mod include_provider;
mod mutation;
mod parser;
mod scanner;
mod source_buffer;
mod stage;
mod technique;
mod tokenizer;

pub use config::{Define, ParserConfig};
pub use error::{BoxedIncludeProviderError, ParseError, RewriteError};
pub use ghost_struct::{GhostStruct, Member, MemberType};
pub use hash::{hash_bytes, mutation_hash};
pub use include_provider::{IncludeProvider, ResolvedInclude, ResolvedIncludePath};
pub use mutation::{mutator_has_value, MutationIter, MutationSpace, Mutator, MAX_MUTATORS};
pub use parser::{ParsedShader, ShaderParser};
pub use stage::{ShaderStage, ShaderStages};
pub use technique::{Technique, UNNAMED_TECHNIQUE};
pub use tokenizer::{tokenize_line, MAX_NAME_LENGTH};

/// Parse the program rooted at `entry`.
pub fn parse_file<IncludeContext>(
    entry: &str,
    include_provider: &mut dyn IncludeProvider<IncludeContext = IncludeContext>,
    include_context: IncludeContext,
    config: ParserConfig,
) -> Result<ParsedShader, ParseError> {
    ShaderParser::new(entry, include_provider, include_context, config).parse()
}

#[cfg(test)]
mod tests;
