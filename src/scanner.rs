use crate::error::LineInfo;
use crate::ghost_struct::{GhostStruct, MemberType};
use crate::hash::include_guard_hash;
use crate::mutation::MutationSpace;
use crate::source_buffer::SourceBuffer;
use crate::technique::{TechniqueBuilder, UNNAMED_TECHNIQUE};
use crate::tokenizer::{is_identifier, strip_comment, token_is_comment, tokenize_line};
use crate::{IncludeProvider, ParseError, ParserConfig, ResolvedInclude, ShaderStage};

/// Largest accepted `#pragma anki ray_type`
const MAX_RAY_TYPE: u32 = 128;

/// Where parsed lines currently go
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum ActiveBuffer {
    Common,
    Technique(usize, ShaderStage),
}

/// Owned copy of the line that opened a block, for "never closed" errors.
#[derive(Clone, Debug)]
pub(crate) struct OpenedAt {
    pub file: String,
    pub line: usize,
    pub text: String,
}

impl OpenedAt {
    fn new(at: &LineInfo<'_>) -> Self {
        OpenedAt {
            file: at.file.to_owned(),
            line: at.line,
            text: at.text.to_owned(),
        }
    }

    pub fn info(&self) -> LineInfo<'_> {
        LineInfo {
            file: &self.file,
            line: self.line,
            text: &self.text,
        }
    }
}

/// Per-file state threaded through the line loop
struct FileState<'f, IncludeContext> {
    resolved: &'f ResolvedInclude<IncludeContext>,
    depth: u32,
    found_pragma_once: bool,
}

/// Walks the include tree line by line, running the directive state machine.
pub(crate) struct Scanner<'a, IncludeContext> {
    include_provider: &'a mut dyn IncludeProvider<IncludeContext = IncludeContext>,
    pub config: ParserConfig,

    pub common: SourceBuffer,
    pub techniques: Vec<TechniqueBuilder>,
    pub active: ActiveBuffer,
    pub open_technique: Option<OpenedAt>,
    pub open_struct: Option<(GhostStruct, OpenedAt)>,

    pub mutation_space: MutationSpace,
    pub sixteen_bit_types: bool,
    pub library: Option<String>,
    pub ray_type: Option<u32>,
}

impl<'a, IncludeContext> Scanner<'a, IncludeContext> {
    pub fn new(
        include_provider: &'a mut dyn IncludeProvider<IncludeContext = IncludeContext>,
        config: ParserConfig,
    ) -> Self {
        Scanner {
            include_provider,
            config,
            common: SourceBuffer::default(),
            techniques: Vec::new(),
            active: ActiveBuffer::Common,
            open_technique: None,
            open_struct: None,
            mutation_space: MutationSpace::default(),
            sixteen_bit_types: false,
            library: None,
            ray_type: None,
        }
    }

    fn current_buffer(&mut self) -> &mut SourceBuffer {
        match self.active {
            ActiveBuffer::Common => &mut self.common,
            ActiveBuffer::Technique(index, stage) => self.techniques[index].buffer_mut(stage),
        }
    }

    fn append_line(&mut self, line: impl Into<String>) {
        self.current_buffer().push(line);
    }

    fn append_line_directive(&mut self, line: usize, file: &str) {
        if self.config.line_directives {
            let directive = format!("#line {} \"{}\"", line, sanitize_filename(file));
            self.append_line(directive);
        }
    }

    /// Resolve `path` against `context` and parse it, unless the current buffer already
    /// holds it behind an include-once guard.
    pub fn include_child(
        &mut self,
        path: &str,
        context: &IncludeContext,
        depth: u32,
        from: &str,
        from_line: usize,
    ) -> Result<(), ParseError> {
        if depth > self.config.max_include_depth {
            return Err(ParseError::DepthExceeded {
                file: path.to_owned(),
                from: from.to_owned(),
                from_line,
                depth,
            });
        }

        let resolved = self
            .include_provider
            .resolve_path(path, context)
            .map_err(|e| ParseError::IncludeProviderError {
                file: path.to_owned(),
                cause: e,
            })?;

        if self.current_buffer().has_guard(&resolved.resolved_path) {
            log::debug!("{:?} already included once, skipping", resolved.resolved_path.0);
            return Ok(());
        }

        self.parse_file(&resolved, depth)
    }

    fn parse_file(
        &mut self,
        resolved: &ResolvedInclude<IncludeContext>,
        depth: u32,
    ) -> Result<(), ParseError> {
        let text = self
            .include_provider
            .get_include(&resolved.resolved_path)
            .map_err(|e| ParseError::IncludeProviderError {
                file: resolved.resolved_path.0.clone(),
                cause: e,
            })?;

        log::debug!("parsing {:?} at include depth {}", resolved.resolved_path.0, depth);

        let file = resolved.resolved_path.0.as_str();
        self.append_line_directive(1, file);

        let mut state = FileState {
            resolved,
            depth,
            found_pragma_once: false,
        };

        let result = self.parse_lines(&text, file, &mut state);

        // Close the guard however the loop ended
        if state.found_pragma_once {
            self.append_line("#endif // Include guard");
        }

        result
    }

    fn parse_lines(
        &mut self,
        text: &str,
        file: &str,
        state: &mut FileState<'_, IncludeContext>,
    ) -> Result<(), ParseError> {
        for (i, line) in text.lines().enumerate() {
            if line.contains("pragma") || line.contains("include") {
                // Possibly a directive we care about
                let at = LineInfo {
                    file,
                    line: i + 1,
                    text: line,
                };
                self.parse_line(&at, state)?;
            } else {
                self.append_line(line);
            }
        }

        Ok(())
    }

    fn parse_line(
        &mut self,
        at: &LineInfo<'_>,
        state: &mut FileState<'_, IncludeContext>,
    ) -> Result<(), ParseError> {
        let tokens = tokenize_line(at.text);

        // Skip a lone hash, as in `# pragma`
        let (bare_hash, tokens) = match tokens.split_first() {
            Some((&"#", rest)) => (true, rest),
            _ => (false, &tokens[..]),
        };

        let keyword = match tokens.first() {
            Some(first) if bare_hash => *first,
            Some(first) => match first.strip_prefix('#') {
                Some(keyword) => keyword,
                None => {
                    self.append_line(at.text);
                    return Ok(());
                }
            },
            None => {
                self.append_line(at.text);
                return Ok(());
            }
        };

        if let Some(attached) = keyword.strip_prefix("include") {
            if attached.is_empty() || attached.starts_with('"') || attached.starts_with('<') {
                self.parse_include(attached, &tokens[1..], at, state)?;
                self.append_line_directive(at.line + 1, at.file);
                return Ok(());
            }
        } else if keyword == "pragma" {
            return self.parse_pragma(&tokens[1..], at, state);
        }

        self.append_line(at.text);
        Ok(())
    }

    fn parse_include(
        &mut self,
        attached: &str,
        rest: &[&str],
        at: &LineInfo<'_>,
        state: &mut FileState<'_, IncludeContext>,
    ) -> Result<(), ParseError> {
        let mut parts: Vec<&str> = Vec::with_capacity(rest.len() + 1);
        if !attached.is_empty() {
            parts.push(attached);
        }
        parts.extend(rest.iter().copied().take_while(|t| !token_is_comment(t)));
        let literal = parts.join(" ");

        let path = literal
            .strip_prefix('"')
            .and_then(|p| p.strip_suffix('"'))
            .or_else(|| literal.strip_prefix('<').and_then(|p| p.strip_suffix('>')));

        match path {
            Some(path) if !path.is_empty() => {
                let resolved = state.resolved;
                self.include_child(path, &resolved.context, state.depth + 1, at.file, at.line)
            }
            _ => Err(at.malformed("include expects a \"path\" or <path>")),
        }
    }

    fn parse_pragma(
        &mut self,
        args: &[&str],
        at: &LineInfo<'_>,
        state: &mut FileState<'_, IncludeContext>,
    ) -> Result<(), ParseError> {
        match args.first() {
            Some(&"once") => {
                if state.found_pragma_once {
                    return Err(at.malformed("can't have more than one #pragma once per file"));
                }

                if args.len() != 1 {
                    return Err(at.malformed("#pragma once takes no arguments"));
                }

                state.found_pragma_once = true;

                let path = state.resolved.resolved_path.clone();
                let guard = include_guard_hash(&path.0);
                self.append_line(format!("#ifndef _ANKI_INCL_GUARD_{}", guard));
                self.append_line(format!("#define _ANKI_INCL_GUARD_{}", guard));
                self.current_buffer().add_guard(path);

                self.append_line_directive(at.line + 1, at.file);
                Ok(())
            }
            Some(&"anki") => {
                self.parse_pragma_anki(&args[1..], at)?;
                self.append_line_directive(at.line + 1, at.file);
                Ok(())
            }
            _ => {
                // Some other pragma, leave it to the shader compiler
                self.append_line(at.text);
                Ok(())
            }
        }
    }

    fn parse_pragma_anki(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let (directive, args) = match args.split_first() {
            Some((directive, args)) => (*directive, args),
            None => return Err(at.malformed("#pragma anki without a directive")),
        };

        log::trace!("{}({}): #pragma anki {}", at.file, at.line, directive);

        match directive {
            "mutator" => {
                self.check_no_active_struct(at)?;
                self.mutation_space.parse_mutator(args, at)
            }
            "technique_start" => {
                self.check_no_active_struct(at)?;
                self.parse_technique_start(args, at)
            }
            "technique_end" => {
                self.check_no_active_struct(at)?;
                self.parse_technique_end(args, at)
            }
            "skip_mutation" => {
                self.check_no_active_struct(at)?;
                self.mutation_space.parse_skip_mutation(args, at)
            }
            "rewrite_mutation" => {
                self.check_no_active_struct(at)?;
                self.mutation_space.parse_rewrite_mutation(args, at)
            }
            "library" => {
                self.check_no_active_struct(at)?;
                self.parse_library(args, at)
            }
            "ray_type" => {
                self.check_no_active_struct(at)?;
                self.parse_ray_type(args, at)
            }
            "struct" => {
                self.check_no_active_struct(at)?;
                self.parse_struct_begin(args, at)
            }
            "member" => self.parse_member(args, at),
            "struct_end" => self.parse_struct_end(args, at),
            "16bit" => {
                if !strip_comment(args).is_empty() {
                    return Err(at.malformed("16bit takes no arguments"));
                }
                self.sixteen_bit_types = true;
                Ok(())
            }
            _ => Err(at.malformed("unknown #pragma anki directive")),
        }
    }

    fn check_no_active_struct(&self, at: &LineInfo<'_>) -> Result<(), ParseError> {
        if self.open_struct.is_some() {
            return Err(at.struct_state("directive not allowed inside a struct"));
        }
        Ok(())
    }

    /// `#pragma anki technique_start STAGE [NAME] [uses_mutators M0 M1 ...]`
    fn parse_technique_start(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let args = strip_comment(args);

        let (stage, args) = match args.split_first() {
            Some((token, args)) => match ShaderStage::from_token(token) {
                Some(stage) => (stage, args),
                None => return Err(at.malformed("unknown shader stage")),
            },
            None => return Err(at.malformed("technique_start needs a shader stage")),
        };

        if !self.config.supports_stage(stage) {
            return Err(at.malformed("shader stage not supported by the target"));
        }

        let (name, args) = match args.split_first() {
            None => (UNNAMED_TECHNIQUE, args),
            Some((&"uses_mutators", _)) => (UNNAMED_TECHNIQUE, args),
            Some((name, rest)) => (*name, rest),
        };

        if !is_identifier(name) {
            return Err(at.malformed("technique name is not an identifier"));
        }

        // Without uses_mutators every mutator is visible
        let active_mutators = match args.split_first() {
            None => u64::MAX,
            Some((&"uses_mutators", names)) => {
                let mut mask = 0u64;
                for name in names {
                    let index = self
                        .mutation_space
                        .mutator_index(name)
                        .ok_or_else(|| at.mutator_not_found(name))?;
                    mask |= 1u64 << index;
                }
                mask
            }
            Some(_) => return Err(at.malformed("expected uses_mutators")),
        };

        if self.active != ActiveBuffer::Common {
            return Err(at.technique_state(
                "need to close the previous technique_start before starting a new one",
            ));
        }

        let index = match self.techniques.iter().position(|t| t.name == name) {
            Some(index) => {
                if self.techniques[index].stages.contains(stage.bit()) {
                    return Err(at.technique_state(
                        "technique_start with the same name and stage appeared more than once",
                    ));
                }
                index
            }
            None => {
                self.techniques.push(TechniqueBuilder::new(name));
                self.techniques.len() - 1
            }
        };

        self.techniques[index].open_stage(stage, active_mutators, &self.common);
        self.active = ActiveBuffer::Technique(index, stage);
        self.open_technique = Some(OpenedAt::new(at));

        Ok(())
    }

    /// `#pragma anki technique_end STAGE [NAME]`
    fn parse_technique_end(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let args = strip_comment(args);

        let stage = match args.first() {
            Some(token) => ShaderStage::from_token(token)
                .ok_or_else(|| at.malformed("unknown shader stage"))?,
            None => return Err(at.malformed("technique_end needs a shader stage")),
        };

        let name = match args {
            [_] => UNNAMED_TECHNIQUE,
            [_, name] => *name,
            _ => return Err(at.malformed("too many arguments to technique_end")),
        };

        match self.active {
            ActiveBuffer::Common => {
                Err(at.technique_state("technique_end without a matching technique_start"))
            }
            ActiveBuffer::Technique(index, open_stage) => {
                if self.techniques[index].name != name || open_stage != stage {
                    return Err(at.technique_state(
                        "name or stage doesn't match the one in technique_start",
                    ));
                }

                self.active = ActiveBuffer::Common;
                self.open_technique = None;
                Ok(())
            }
        }
    }

    /// `#pragma anki library NAME`
    fn parse_library(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let name = match strip_comment(args) {
            [name] => *name,
            _ => return Err(at.malformed("library expects exactly one name")),
        };

        if self.library.is_some() {
            return Err(at.malformed("library name already set"));
        }

        self.library = Some(name.to_owned());
        Ok(())
    }

    /// `#pragma anki ray_type N`
    fn parse_ray_type(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let value = match strip_comment(args) {
            [value] => value
                .parse::<u32>()
                .map_err(|_| at.malformed("ray type is not an unsigned integer"))?,
            _ => return Err(at.malformed("ray_type expects exactly one value")),
        };

        if self.ray_type.is_some() {
            return Err(at.malformed("ray type already set"));
        }

        if value > MAX_RAY_TYPE {
            return Err(at.malformed("ray type has a very large value"));
        }

        self.ray_type = Some(value);
        Ok(())
    }

    /// `#pragma anki struct NAME`
    fn parse_struct_begin(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let name = match strip_comment(args) {
            [name] if is_identifier(name) => *name,
            _ => return Err(at.malformed("struct expects one identifier")),
        };

        let gstruct = GhostStruct::new(name);
        self.append_line(gstruct.opening_line());
        self.open_struct = Some((gstruct, OpenedAt::new(at)));

        Ok(())
    }

    /// `#pragma anki member TYPE NAME`
    fn parse_member(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let (type_token, name) = match strip_comment(args) {
            [type_token, name] => (*type_token, *name),
            _ if self.open_struct.is_none() => {
                return Err(at.struct_state("member outside of a struct"))
            }
            _ => return Err(at.malformed("member expects a type and a name")),
        };

        let (gstruct, _) = match self.open_struct.as_mut() {
            Some(open) => open,
            None => return Err(at.struct_state("member outside of a struct")),
        };

        let ty = MemberType::from_token(type_token)
            .ok_or_else(|| at.malformed("unrecognized member type"))?;

        if !is_identifier(name) {
            return Err(at.malformed("member name is not an identifier"));
        }

        if gstruct.has_member(name) {
            return Err(at.malformed("member declared more than once"));
        }

        let lines = gstruct.add_member(name, ty, type_token);
        for line in lines {
            self.append_line(line);
        }

        Ok(())
    }

    /// `#pragma anki struct_end`
    fn parse_struct_end(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let (gstruct, _) = match self.open_struct.take() {
            Some(open) => open,
            None => return Err(at.struct_state("struct_end without a matching struct")),
        };

        if !strip_comment(args).is_empty() {
            return Err(at.malformed("struct_end takes no arguments"));
        }

        if gstruct.members.is_empty() {
            return Err(at.malformed("struct doesn't have any members"));
        }

        for line in gstruct.closing_lines() {
            self.append_line(line);
        }

        Ok(())
    }
}

/// File names end up inside `#line "..."`; keep them free of quotes and backslashes.
fn sanitize_filename(file: &str) -> String {
    file.chars()
        .filter(|&c| c != '"')
        .map(|c| if c == '\\' { '/' } else { c })
        .collect()
}
