use std::collections::HashMap;

use crate::hash::include_guard_hash;
use crate::{
    BoxedIncludeProviderError, IncludeProvider, ParseError, ParsedShader, ParserConfig,
    ResolvedInclude, ResolvedIncludePath, RewriteError, ShaderParser, ShaderStage, ShaderStages,
};

struct DummyIncludeProvider;
impl IncludeProvider for DummyIncludeProvider {
    type IncludeContext = ();

    fn resolve_path(
        &self,
        path: &str,
        _context: &Self::IncludeContext,
    ) -> Result<ResolvedInclude<Self::IncludeContext>, BoxedIncludeProviderError> {
        Ok(ResolvedInclude {
            resolved_path: ResolvedIncludePath(path.to_owned()),
            context: (),
        })
    }

    fn get_include(
        &mut self,
        resolved: &ResolvedIncludePath,
    ) -> Result<String, BoxedIncludeProviderError> {
        Ok(format!(
            "#pragma anki technique_start comp\n[{}]\n#pragma anki technique_end comp\n",
            resolved.0
        ))
    }
}

struct HashMapIncludeProvider(HashMap<String, String>);
impl IncludeProvider for HashMapIncludeProvider {
    type IncludeContext = ();

    fn resolve_path(
        &self,
        path: &str,
        _context: &Self::IncludeContext,
    ) -> Result<ResolvedInclude<Self::IncludeContext>, BoxedIncludeProviderError> {
        Ok(ResolvedInclude {
            resolved_path: ResolvedIncludePath(path.to_owned()),
            context: (),
        })
    }

    fn get_include(
        &mut self,
        resolved: &ResolvedIncludePath,
    ) -> Result<String, BoxedIncludeProviderError> {
        self.0
            .get(&resolved.0)
            .cloned()
            .ok_or_else(|| format!("{} not found", resolved.0).into())
    }
}

/// Resolves includes relative to the directory of the including file
struct RelativeIncludeProvider(HashMap<String, String>);
impl IncludeProvider for RelativeIncludeProvider {
    type IncludeContext = String;

    fn resolve_path(
        &self,
        path: &str,
        context: &Self::IncludeContext,
    ) -> Result<ResolvedInclude<Self::IncludeContext>, BoxedIncludeProviderError> {
        let full = if context.is_empty() {
            path.to_owned()
        } else {
            format!("{}/{}", context, path)
        };
        let dir = match full.rfind('/') {
            Some(i) => full[..i].to_owned(),
            None => String::new(),
        };

        Ok(ResolvedInclude {
            resolved_path: ResolvedIncludePath(full),
            context: dir,
        })
    }

    fn get_include(
        &mut self,
        resolved: &ResolvedIncludePath,
    ) -> Result<String, BoxedIncludeProviderError> {
        self.0
            .get(&resolved.0)
            .cloned()
            .ok_or_else(|| format!("{} not found", resolved.0).into())
    }
}

fn files(files: &[(&str, &str)]) -> HashMapIncludeProvider {
    HashMapIncludeProvider(
        files
            .iter()
            .map(|(path, text)| (path.to_string(), text.to_string()))
            .collect(),
    )
}

fn parse_with(
    entry_files: &[(&str, &str)],
    config: ParserConfig,
) -> Result<ParsedShader, ParseError> {
    let mut provider = files(entry_files);
    crate::parse_file(entry_files[0].0, &mut provider, (), config)
}

fn parse(entry_files: &[(&str, &str)]) -> Result<ParsedShader, ParseError> {
    parse_with(entry_files, ParserConfig::default())
}

fn source(program: &ParsedShader, technique: &str, stage: ShaderStage) -> String {
    program
        .technique(technique)
        .and_then(|t| t.source(stage))
        .unwrap()
        .to_owned()
}

const COMPUTE_ONLY: &str = "\
#pragma anki technique_start comp
void main() {}
#pragma anki technique_end comp
";

#[test]
fn plain_lines_pass_through() {
    let program = parse(&[(
        "a.glsl",
        "#version 450\n#pragma anki technique_start comp\n#extension foo : enable\nvoid main() {}\n#pragma anki technique_end comp\n",
    )])
    .unwrap();

    assert_eq!(
        source(&program, "Unnamed", ShaderStage::Compute),
        "#version 450\n#extension foo : enable\nvoid main() {}\n"
    );
}

#[test]
fn pragma_once_file_appears_once() {
    let program = parse(&[
        (
            "a.glsl",
            "#pragma anki technique_start comp\n#include \"b.glsl\"\n#include <b.glsl>\nvoid main() {}\n#pragma anki technique_end comp\n",
        ),
        ("b.glsl", "#pragma once\nfloat b;\n"),
    ])
    .unwrap();

    let guard = include_guard_hash("b.glsl");
    let expected = format!(
        "#ifndef _ANKI_INCL_GUARD_{0}\n#define _ANKI_INCL_GUARD_{0}\nfloat b;\n#endif // Include guard\nvoid main() {{}}\n",
        guard
    );
    assert_eq!(source(&program, "Unnamed", ShaderStage::Compute), expected);
}

#[test]
fn include_without_pragma_once_repeats() {
    let program = parse(&[
        (
            "a.glsl",
            "#pragma anki technique_start comp\n#include \"b.glsl\"\n#include\"b.glsl\"\n#pragma anki technique_end comp\n",
        ),
        ("b.glsl", "float b;"),
    ])
    .unwrap();

    assert_eq!(
        source(&program, "Unnamed", ShaderStage::Compute),
        "float b;\nfloat b;\n"
    );
}

#[test]
fn pragma_once_carries_into_technique_buffers() {
    let program = parse(&[
        (
            "a.glsl",
            "#include \"common.glsl\"\n#pragma anki technique_start vert\n#include \"common.glsl\"\n#pragma anki technique_end vert\n",
        ),
        ("common.glsl", "#pragma once\nconst int x = 1;\n"),
    ])
    .unwrap();

    let src = source(&program, "Unnamed", ShaderStage::Vertex);
    assert_eq!(src.matches("const int x = 1;").count(), 1);
    assert_eq!(src.matches("#endif // Include guard").count(), 1);
}

#[test]
fn relative_includes_use_the_context() {
    let mut provider = RelativeIncludeProvider(
        [
            ("shaders/a.glsl", "#include \"lib/b.glsl\"\n"),
            ("shaders/lib/b.glsl", "#include \"c.glsl\"\n"),
            ("shaders/lib/c.glsl", COMPUTE_ONLY),
        ]
        .iter()
        .map(|(path, text)| (path.to_string(), text.to_string()))
        .collect(),
    );

    let program = ShaderParser::new("shaders/a.glsl", &mut provider, String::new(), ParserConfig::default())
        .parse()
        .unwrap();

    assert_eq!(source(&program, "Unnamed", ShaderStage::Compute), "void main() {}\n");
}

#[test]
fn malformed_include() {
    let result = parse(&[("a.glsl", "#include foo.glsl\n")]);
    assert!(matches!(
        result,
        Err(ParseError::MalformedExpression { line: 1, .. })
    ));
}

#[test]
fn include_provider_error() {
    let result = parse(&[("a.glsl", "#include \"missing.glsl\"\n")]);
    match result {
        Err(ParseError::IncludeProviderError { file, cause }) => {
            assert_eq!(file, "missing.glsl");
            assert_eq!(cause.to_string(), "missing.glsl not found");
        }
        other => panic!("unexpected result: {:?}", other.map(|p| p.hash())),
    }
}

#[test]
fn cyclic_include_exceeds_depth() {
    let result = parse(&[
        ("a.glsl", "#include \"b.glsl\"\n"),
        ("b.glsl", "#include \"a.glsl\"\n"),
    ]);

    match result {
        Err(ParseError::DepthExceeded { from_line, depth, .. }) => {
            assert_eq!(from_line, 1);
            assert_eq!(depth, 9);
        }
        other => panic!("unexpected result: {:?}", other.map(|p| p.hash())),
    }
}

#[test]
fn configured_include_depth() {
    let chain = [
        ("a.glsl", "#include \"b.glsl\"\n"),
        ("b.glsl", "#include \"c.glsl\"\n"),
        ("c.glsl", COMPUTE_ONLY),
    ];

    assert!(parse_with(&chain, ParserConfig::default().with_max_include_depth(2)).is_ok());
    assert!(matches!(
        parse_with(&chain, ParserConfig::default().with_max_include_depth(1)),
        Err(ParseError::DepthExceeded { .. })
    ));
}

#[test]
fn no_techniques() {
    let result = parse(&[("a.glsl", "void main() {}\n")]);
    assert!(matches!(result, Err(ParseError::NoTechniques { file }) if file == "a.glsl"));
}

#[test]
fn unclosed_technique() {
    let result = parse(&[(
        "a.glsl",
        "// header\n#pragma anki technique_start frag\nvoid main() {}\n",
    )]);

    assert!(matches!(
        result,
        Err(ParseError::TechniqueStateError { line: 2, .. })
    ));
}

#[test]
fn technique_state_errors() {
    let nested = "#pragma anki technique_start vert\n#pragma anki technique_start frag\n";
    let mismatched_stage = "#pragma anki technique_start vert\n#pragma anki technique_end frag\n";
    let mismatched_name = "#pragma anki technique_start vert A\n#pragma anki technique_end vert B\n";
    let stray_end = "#pragma anki technique_end vert\n";
    let reopened = "\
#pragma anki technique_start vert A
#pragma anki technique_end vert A
#pragma anki technique_start vert A
#pragma anki technique_end vert A
";

    for text in [nested, mismatched_stage, mismatched_name, stray_end, reopened] {
        assert!(
            matches!(parse(&[("a.glsl", text)]), Err(ParseError::TechniqueStateError { .. })),
            "{}",
            text
        );
    }
}

#[test]
fn technique_directive_syntax() {
    let unknown_stage = "#pragma anki technique_start pixel\n";
    let missing_stage = "#pragma anki technique_start\n";
    let junk = "#pragma anki technique_start vert A B\n";

    for text in [unknown_stage, missing_stage, junk] {
        assert!(
            matches!(parse(&[("a.glsl", text)]), Err(ParseError::MalformedExpression { .. })),
            "{}",
            text
        );
    }
}

#[test]
fn techniques_span_files() {
    let program = parse(&[
        (
            "a.glsl",
            "#pragma anki technique_start vert Forward\nvoid vs() {}\n#pragma anki technique_end vert Forward\n#include \"frag.glsl\"\n",
        ),
        (
            "frag.glsl",
            "#pragma anki technique_start frag Forward\nvoid fs() {}\n#pragma anki technique_end frag Forward\n",
        ),
    ])
    .unwrap();

    assert_eq!(program.techniques().len(), 1);
    let forward = program.technique("Forward").unwrap();
    assert_eq!(forward.stages(), ShaderStages::VERTEX | ShaderStages::FRAGMENT);
    assert_eq!(source(&program, "Forward", ShaderStage::Vertex), "void vs() {}\n");
    assert_eq!(source(&program, "Forward", ShaderStage::Fragment), "void fs() {}\n");
    assert_eq!(program.technique_index("Forward"), Some(0));
    assert!(program.technique("Unnamed").is_none());
}

#[test]
fn technique_buffers_snapshot_common_lines() {
    let program = parse(&[(
        "a.glsl",
        "\
int a;
#pragma anki technique_start vert
int vert_only;
#pragma anki technique_end vert
int b;
#pragma anki technique_start frag
#pragma anki technique_end frag
",
    )])
    .unwrap();

    assert_eq!(
        source(&program, "Unnamed", ShaderStage::Vertex),
        "int a;\nint vert_only;\n"
    );
    assert_eq!(
        source(&program, "Unnamed", ShaderStage::Fragment),
        "int a;\nint b;\n"
    );
}

#[test]
fn mutators_and_active_masks() {
    let program = parse(&[(
        "a.glsl",
        "\
#pragma anki mutator A 0 1
#pragma anki mutator B 1 2 3 // trailing
#pragma anki technique_start vert uses_mutators B
#pragma anki technique_end vert
#pragma anki technique_start frag
#pragma anki technique_end frag
",
    )])
    .unwrap();

    assert_eq!(program.mutators().len(), 2);
    assert_eq!(program.mutators()[1].values(), &[1, 2, 3]);
    assert_eq!(program.mutation_count(), Some(6));

    let unnamed = program.technique("Unnamed").unwrap();
    assert_eq!(unnamed.active_mutators(ShaderStage::Vertex), 0b10);
    assert_eq!(unnamed.active_mutators(ShaderStage::Fragment), u64::MAX);
}

#[test]
fn unknown_mutator_in_technique() {
    let result = parse(&[(
        "a.glsl",
        "#pragma anki mutator A 0 1\n#pragma anki technique_start vert uses_mutators A C\n",
    )]);

    assert!(matches!(
        result,
        Err(ParseError::MutatorNotFound { mutator, line: 2, .. }) if mutator == "C"
    ));
}

#[test]
fn variant_header_order() {
    let program = parse_with(
        &[(
            "a.glsl",
            "\
#pragma anki mutator A 0 1
#pragma anki mutator B 0 1
#pragma anki technique_start vert Forward uses_mutators B
void main() {}
#pragma anki technique_end vert Forward
#pragma anki technique_start frag Shadow
#pragma anki technique_end frag Shadow
",
        )],
        ParserConfig::default().with_define("FOO", 3),
    )
    .unwrap();

    let forward = program.technique("Forward").unwrap();
    let variant = program.generate_variant(&[1, 0], forward, ShaderStage::Vertex);

    let expected = "\
#define FOO 3
#define B 0
#define ANKI_TECHNIQUE_Forward 1
#define ANKI_TECHNIQUE_Shadow 0
#define ANKI_VERTEX_SHADER 1
#define ANKI_TESSELLATION_CONTROL_SHADER 0
#define ANKI_TESSELLATION_EVALUATION_SHADER 0
#define ANKI_GEOMETRY_SHADER 0
#define ANKI_TASK_SHADER 0
#define ANKI_MESH_SHADER 0
#define ANKI_FRAGMENT_SHADER 0
#define ANKI_COMPUTE_SHADER 0
#define ANKI_RAY_GEN_SHADER 0
#define ANKI_ANY_HIT_SHADER 0
#define ANKI_CLOSEST_HIT_SHADER 0
#define ANKI_MISS_SHADER 0
#define ANKI_INTERSECTION_SHADER 0
#define ANKI_CALLABLE_SHADER 0
#define kMaxBindlessTextures 512u
#define kMaxBindlessReadonlyTextureBuffers 512u
#define ANKI_PLATFORM_MOBILE 0
#define ANKI_FORCE_FULL_FP_PRECISION 0
#define ANKI_SUPPORTS_16BIT_TYPES 0
void main() {}
";
    assert_eq!(variant, expected);
}

#[test]
fn unsupported_stages() {
    let config = ParserConfig::default()
        .with_ray_tracing(false)
        .with_mesh_shaders(false);

    let rgen = "#pragma anki technique_start rgen\n#pragma anki technique_end rgen\n";
    assert!(matches!(
        parse_with(&[("a.glsl", rgen)], config.clone()),
        Err(ParseError::MalformedExpression { .. })
    ));

    let program = parse_with(&[("a.glsl", COMPUTE_ONLY)], config).unwrap();
    let technique = program.technique("Unnamed").unwrap();
    let variant = program.generate_variant(&[], technique, ShaderStage::Compute);

    assert!(variant.contains("#define ANKI_COMPUTE_SHADER 1\n"));
    assert!(!variant.contains("ANKI_RAY_GEN_SHADER"));
    assert!(!variant.contains("ANKI_MESH_SHADER"));
}

#[test]
#[should_panic]
fn variant_with_illegal_value_panics() {
    let program = parse(&[(
        "a.glsl",
        "#pragma anki mutator QUALITY 0 1 2\n#pragma anki technique_start comp\n#pragma anki technique_end comp\n",
    )])
    .unwrap();

    let technique = program.technique("Unnamed").unwrap();
    program.generate_variant(&[3], technique, ShaderStage::Compute);
}

#[test]
#[should_panic]
fn variant_for_undeclared_stage_panics() {
    let program = parse(&[("a.glsl", COMPUTE_ONLY)]).unwrap();
    let technique = program.technique("Unnamed").unwrap();
    program.generate_variant(&[], technique, ShaderStage::Fragment);
}

#[test]
fn skip_and_rewrite_after_parse() {
    let program = parse(&[(
        "a.glsl",
        "\
#pragma anki mutator FOO 0 1
#pragma anki mutator BAR 0 1
#pragma anki skip_mutation FOO 1 BAR 1
#pragma anki rewrite_mutation FOO 0 to FOO 1
#pragma anki technique_start comp
#pragma anki technique_end comp
",
    )])
    .unwrap();

    assert!(program.skip_mutation(&[1, 1]));
    assert!(!program.skip_mutation(&[0, 1]));

    let mut mutation = [0, 0];
    assert!(program.rewrite_mutation(&mut mutation));
    assert_eq!(mutation, [1, 0]);
    assert!(!program.rewrite_mutation(&mut mutation));

    let built: Vec<Vec<i32>> = program
        .mutations()
        .filter(|m| !program.skip_mutation(m))
        .collect();
    assert_eq!(built, vec![vec![0, 0], vec![0, 1], vec![1, 0]]);
}

#[test]
fn rewrite_cycle_is_reported() {
    let program = parse(&[(
        "a.glsl",
        "\
#pragma anki mutator FOO 0 1
#pragma anki rewrite_mutation FOO 0 to FOO 1
#pragma anki rewrite_mutation FOO 1 to FOO 0
#pragma anki technique_start comp
#pragma anki technique_end comp
",
    )])
    .unwrap();

    let mut mutation = [0];
    assert!(matches!(
        program.canonicalize_mutation(&mut mutation),
        Err(RewriteError::Cycle { .. })
    ));
}

#[test]
fn metadata_directives() {
    let program = parse(&[(
        "a.glsl",
        "\
#pragma anki library RtShadows
#pragma anki ray_type 1 // shadow rays
#pragma anki 16bit
#pragma anki technique_start comp
#pragma anki technique_end comp
",
    )])
    .unwrap();

    assert_eq!(program.library_name(), Some("RtShadows"));
    assert_eq!(program.ray_type(), Some(1));
    assert!(program.supports_16bit_types());

    let technique = program.technique("Unnamed").unwrap();
    let variant = program.generate_variant(&[], technique, ShaderStage::Compute);
    assert!(variant.contains("#define ANKI_SUPPORTS_16BIT_TYPES 1\n"));
}

#[test]
fn metadata_is_single_shot() {
    let two_libraries = "#pragma anki library A\n#pragma anki library B\n";
    let two_ray_types = "#pragma anki ray_type 0\n#pragma anki ray_type 1\n";
    let large_ray_type = "#pragma anki ray_type 129\n";
    let negative_ray_type = "#pragma anki ray_type -1\n";

    for text in [two_libraries, two_ray_types, large_ray_type, negative_ray_type] {
        assert!(
            matches!(parse(&[("a.glsl", text)]), Err(ParseError::MalformedExpression { .. })),
            "{}",
            text
        );
    }
}

#[test]
fn ghost_struct_expansion() {
    let program = parse(&[(
        "a.glsl",
        "\
#pragma anki technique_start comp
#pragma anki struct Light
#pragma anki member Vec3 position
#pragma anki member RF32 radius
#pragma anki struct_end
#pragma anki technique_end comp
",
    )])
    .unwrap();

    let expected = "\
struct Light {
#define Light_position_OFFSETOF 0
\tVec3 position;
#define Light_radius_OFFSETOF 12
\tRF32 radius;
};
#\tdefine Light_position_LOAD(buff, offset) buff.Load<Vec3>(Light_position_OFFSETOF + (offset)),
#\tdefine Light_radius_LOAD(buff, offset) buff.Load<F32>(Light_radius_OFFSETOF + (offset))
#define loadLight(buff, offset) { \\
\tLight_position_LOAD(buff, offset) \\
\tLight_radius_LOAD(buff, offset) \\
}
";
    assert_eq!(source(&program, "Unnamed", ShaderStage::Compute), expected);
}

#[test]
fn ghost_struct_state_errors() {
    let tail = "#pragma anki technique_start comp\n#pragma anki technique_end comp\n";

    let member_outside = format!("#pragma anki member F32 x\n{}", tail);
    let end_outside = format!("#pragma anki struct_end\n{}", tail);
    let nested = format!("#pragma anki struct A\n#pragma anki struct B\n{}", tail);
    let unclosed = format!("{}#pragma anki struct A\n#pragma anki member F32 x\n", tail);

    for text in [&member_outside, &end_outside, &nested, &unclosed] {
        let text = text.as_str();
        assert!(
            matches!(parse(&[("a.glsl", text)]), Err(ParseError::StructStateError { .. })),
            "{}",
            text
        );
    }

    let empty = format!("#pragma anki struct A\n#pragma anki struct_end\n{}", tail);
    assert!(matches!(
        parse(&[("a.glsl", empty.as_str())]),
        Err(ParseError::MalformedExpression { .. })
    ));
}

#[test]
fn unknown_anki_directive() {
    let result = parse(&[("a.glsl", "#pragma anki frobnicate\n")]);
    assert!(matches!(
        result,
        Err(ParseError::MalformedExpression { line: 1, .. })
    ));
}

#[test]
fn foreign_pragmas_pass_through() {
    let program = parse(&[(
        "a.glsl",
        "#pragma anki technique_start comp\n#pragma optimize(off)\n# pragma unroll\n#pragma\n#pragma anki technique_end comp\n",
    )])
    .unwrap();

    assert_eq!(
        source(&program, "Unnamed", ShaderStage::Compute),
        "#pragma optimize(off)\n# pragma unroll\n#pragma\n"
    );
}

#[test]
fn spaced_hash_directives() {
    let program = parse(&[
        (
            "a.glsl",
            "# pragma anki mutator A 0 1\n#\tpragma anki technique_start comp uses_mutators A\n# include \"b.glsl\"\n#  pragma anki technique_end comp\n",
        ),
        ("b.glsl", "# pragma once\nfloat b;\n"),
    ])
    .unwrap();

    assert_eq!(program.mutators().len(), 1);
    let technique = program.technique("Unnamed").unwrap();
    assert_eq!(technique.active_mutators(ShaderStage::Compute), 0b1);

    let guard = include_guard_hash("b.glsl");
    let expected = format!(
        "#ifndef _ANKI_INCL_GUARD_{0}\n#define _ANKI_INCL_GUARD_{0}\nfloat b;\n#endif // Include guard\n",
        guard
    );
    assert_eq!(source(&program, "Unnamed", ShaderStage::Compute), expected);
}

#[test]
fn every_mutator_slot_usable() {
    let mut text: String = (0..crate::MAX_MUTATORS)
        .map(|i| format!("#pragma anki mutator M{} 0 1\n", i))
        .collect();
    text.push_str(COMPUTE_ONLY);

    let program = parse(&[("a.glsl", text.as_str())]).unwrap();
    assert_eq!(program.mutators().len(), crate::MAX_MUTATORS);
    assert_eq!(program.mutation_count(), None);

    let technique = program.technique("Unnamed").unwrap();
    assert!(technique.uses_mutator(ShaderStage::Compute, crate::MAX_MUTATORS - 1));

    let mutation = vec![1; crate::MAX_MUTATORS];
    let variant = program.generate_variant(&mutation, technique, ShaderStage::Compute);
    assert!(variant.contains("#define M63 1\n"));
}

#[test]
fn line_directives() {
    let program = parse_with(
        &[("shaders\\a.glsl", COMPUTE_ONLY)],
        ParserConfig::default().with_line_directives(true),
    )
    .unwrap();

    assert_eq!(
        source(&program, "Unnamed", ShaderStage::Compute),
        "#line 1 \"shaders/a.glsl\"\n#line 2 \"shaders/a.glsl\"\nvoid main() {}\n"
    );
}

#[test]
fn hash_is_deterministic() {
    let text = "#pragma anki mutator A 0 1\n#pragma anki technique_start comp\nvoid main() {}\n#pragma anki technique_end comp\n";

    let a = parse(&[("a.glsl", text)]).unwrap();
    let b = parse(&[("other_name.glsl", text)]).unwrap();
    assert_eq!(a.hash(), b.hash());

    let changed_source = parse(&[("a.glsl", text.replace("main()", "main( )").as_str())]).unwrap();
    assert_ne!(a.hash(), changed_source.hash());

    let changed_mutator = parse(&[("a.glsl", text.replace("0 1", "0 2").as_str())]).unwrap();
    assert_ne!(a.hash(), changed_mutator.hash());

    let with_library = parse(&[("a.glsl", format!("#pragma anki library L\n{}", text).as_str())]).unwrap();
    assert_ne!(a.hash(), with_library.hash());
}

#[test]
fn each_include_is_a_compute_technique() {
    let program = crate::parse_file("x.glsl", &mut DummyIncludeProvider, (), ParserConfig::default())
        .unwrap();
    assert_eq!(source(&program, "Unnamed", ShaderStage::Compute), "[x.glsl]\n");
}

#[test]
fn parsed_shader_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ParsedShader>();
}

#[test]
fn variants_from_threads() -> anyhow::Result<()> {
    let program = parse(&[(
        "a.glsl",
        "#pragma anki mutator Q 0 1 2\n#pragma anki technique_start comp\nvoid main() {}\n#pragma anki technique_end comp\n",
    )])?;

    let technique = program.technique("Unnamed").unwrap();
    let variants: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = program
            .mutations()
            .map(|mutation| {
                let program = &program;
                s.spawn(move || program.generate_variant(&mutation, technique, ShaderStage::Compute))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(variants.len(), 3);
    for (i, variant) in variants.iter().enumerate() {
        assert!(variant.contains(&format!("#define Q {}\n", i)));
    }

    Ok(())
}
