use crate::hash::ProgramHasher;
use crate::mutation::{MutationIter, MutationSpace, Mutator};
use crate::scanner::{ActiveBuffer, Scanner};
use crate::technique::Technique;
use crate::{IncludeProvider, ParseError, ParserConfig, RewriteError, ShaderStage};

/// Front end of a shader program: crawls the include tree from `entry` once.
///
/// Parsing consumes the parser, so a program can't be parsed twice and variants can only
/// be generated from the [`ParsedShader`] it returns.
pub struct ShaderParser<'a, IncludeContext> {
    entry: String,
    context: IncludeContext,
    scanner: Scanner<'a, IncludeContext>,
}

impl<'a, IncludeContext> ShaderParser<'a, IncludeContext> {
    pub fn new(
        entry: &str,
        include_provider: &'a mut dyn IncludeProvider<IncludeContext = IncludeContext>,
        context: IncludeContext,
        config: ParserConfig,
    ) -> Self {
        ShaderParser {
            entry: entry.to_owned(),
            context,
            scanner: Scanner::new(include_provider, config),
        }
    }

    pub fn parse(self) -> Result<ParsedShader, ParseError> {
        let ShaderParser {
            entry,
            context,
            mut scanner,
        } = self;

        scanner.include_child(&entry, &context, 0, &entry, 0)?;

        let Scanner {
            config,
            common,
            techniques,
            active,
            open_technique,
            open_struct,
            mutation_space,
            sixteen_bit_types,
            library,
            ray_type,
            ..
        } = scanner;

        if techniques.is_empty() {
            return Err(ParseError::NoTechniques { file: entry });
        }

        if let (ActiveBuffer::Technique(..), Some(opened)) = (active, &open_technique) {
            return Err(opened.info().technique_state("technique_start was never closed"));
        }

        if let Some((_, opened)) = &open_struct {
            return Err(opened.info().struct_state("struct was never closed"));
        }

        let techniques: Vec<Technique> = techniques.into_iter().map(|t| t.finish()).collect();
        let common_source = common.into_source();

        let mut hasher = ProgramHasher::new();
        hasher.write_str(&common_source);
        for technique in &techniques {
            hasher.write_str(technique.name());
            hasher.write_u32(technique.stages().bits());
            for stage in technique.stages().stages() {
                hasher.write_bytes(&technique.active_mutators(stage).to_le_bytes());
                hasher.write_str(technique.source(stage).unwrap_or_default());
            }
        }

        let mut space_bytes = Vec::new();
        mutation_space.digest_into(&mut space_bytes);
        hasher.write_bytes(&space_bytes);

        hasher.write_bool(sixteen_bit_types);
        hasher.write_str(library.as_deref().unwrap_or_default());
        hasher.write_bool(ray_type.is_some());
        hasher.write_u32(ray_type.unwrap_or(0));

        for define in &config.defines {
            hasher.write_str(&define.name);
            hasher.write_i32(define.value);
        }
        hasher.write_u32(config.max_bindless_textures);
        hasher.write_u32(config.max_bindless_readonly_texture_buffers);
        hasher.write_bool(config.mobile_platform);
        hasher.write_bool(config.force_full_fp_precision);
        hasher.write_bool(config.ray_tracing);
        hasher.write_bool(config.mesh_shaders);

        let hash = hasher.finish();

        log::debug!(
            "parsed {:?}: {} techniques, {} mutators, {} skip rules, {} rewrite rules, hash {:016x}",
            entry,
            techniques.len(),
            mutation_space.mutators().len(),
            mutation_space.skip_rule_count(),
            mutation_space.rewrite_rule_count(),
            hash
        );

        Ok(ParsedShader {
            hash,
            mutation_space,
            techniques,
            library,
            ray_type,
            sixteen_bit_types,
            config,
        })
    }
}

/// A fully parsed shader program. Read-only; variants may be generated from several
/// threads at once.
#[derive(Clone, Debug)]
pub struct ParsedShader {
    hash: u64,
    mutation_space: MutationSpace,
    techniques: Vec<Technique>,
    library: Option<String>,
    ray_type: Option<u32>,
    sixteen_bit_types: bool,
    config: ParserConfig,
}

impl ParsedShader {
    /// Stable content hash of the program, for build caching
    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn mutators(&self) -> &[Mutator] {
        self.mutation_space.mutators()
    }

    pub fn mutation_space(&self) -> &MutationSpace {
        &self.mutation_space
    }

    /// `None` if the count overflows `usize`
    pub fn mutation_count(&self) -> Option<usize> {
        self.mutation_space.mutation_count()
    }

    pub fn mutations(&self) -> MutationIter<'_> {
        self.mutation_space.mutations()
    }

    /// Whether `mutation` matches a skip rule and should not be built
    pub fn skip_mutation(&self, mutation: &[i32]) -> bool {
        self.mutation_space.skip_mutation(mutation)
    }

    /// Apply the first matching rewrite rule in place; `false` if none matched
    pub fn rewrite_mutation(&self, mutation: &mut [i32]) -> bool {
        self.mutation_space.rewrite_mutation(mutation)
    }

    /// Apply rewrite rules until none matches
    pub fn canonicalize_mutation(&self, mutation: &mut [i32]) -> Result<bool, RewriteError> {
        self.mutation_space.canonicalize_mutation(mutation)
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    pub fn technique(&self, name: &str) -> Option<&Technique> {
        self.techniques.iter().find(|t| t.name() == name)
    }

    pub fn technique_index(&self, name: &str) -> Option<usize> {
        self.techniques.iter().position(|t| t.name() == name)
    }

    pub fn library_name(&self) -> Option<&str> {
        self.library.as_deref()
    }

    pub fn ray_type(&self) -> Option<u32> {
        self.ray_type
    }

    pub fn supports_16bit_types(&self) -> bool {
        self.sixteen_bit_types
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Full source of one variant, ready for the shader compiler.
    ///
    /// # Panics
    ///
    /// If `mutation` doesn't have one legal value per mutator, or `technique` doesn't
    /// declare `stage`.
    pub fn generate_variant(
        &self,
        mutation: &[i32],
        technique: &Technique,
        stage: ShaderStage,
    ) -> String {
        assert_eq!(
            mutation.len(),
            self.mutators().len(),
            "mutation length doesn't match the number of mutators"
        );
        assert!(
            self.mutation_space.is_valid_mutation(mutation),
            "mutation {:?} contains values outside the mutator domains",
            mutation
        );
        assert!(
            technique.has_stage(stage),
            "technique {:?} has no {} stage",
            technique.name(),
            stage
        );

        let source = technique.source(stage).unwrap_or_default();
        let mut out = String::with_capacity(source.len() + 1024);

        for define in &self.config.defines {
            push_define(&mut out, &define.name, define.value);
        }

        for (index, (mutator, value)) in self.mutators().iter().zip(mutation).enumerate() {
            if technique.uses_mutator(stage, index) {
                push_define(&mut out, mutator.name(), value);
            }
        }

        for t in &self.techniques {
            let name = format!("ANKI_TECHNIQUE_{}", t.name());
            push_define(&mut out, &name, (t.name() == technique.name()) as i32);
        }

        for s in ShaderStage::ALL {
            if self.config.supports_stage(s) {
                let name = format!("ANKI_{}_SHADER", s.define_name());
                push_define(&mut out, &name, (s == stage) as i32);
            }
        }

        out.push_str(&format!(
            "#define kMaxBindlessTextures {}u\n",
            self.config.max_bindless_textures
        ));
        out.push_str(&format!(
            "#define kMaxBindlessReadonlyTextureBuffers {}u\n",
            self.config.max_bindless_readonly_texture_buffers
        ));
        push_define(&mut out, "ANKI_PLATFORM_MOBILE", self.config.mobile_platform as i32);
        push_define(
            &mut out,
            "ANKI_FORCE_FULL_FP_PRECISION",
            self.config.force_full_fp_precision as i32,
        );

        push_define(&mut out, "ANKI_SUPPORTS_16BIT_TYPES", self.sixteen_bit_types as i32);

        out.push_str(source);
        out
    }
}

fn push_define(out: &mut String, name: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("#define {} {}\n", name, value));
}
