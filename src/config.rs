use crate::ShaderStage;

/// Named integer define injected at the top of every generated variant
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Define {
    pub name: String,
    pub value: i32,
}

impl Define {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Define {
            name: name.into(),
            value,
        }
    }
}

/// Options fixed for the lifetime of a parser: caller defines, engine constants
/// emitted in the stage header, and what the target hardware supports.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserConfig {
    pub defines: Vec<Define>,

    pub max_bindless_textures: u32,
    pub max_bindless_readonly_texture_buffers: u32,

    pub mobile_platform: bool,
    pub force_full_fp_precision: bool,

    /// Ray tracing stages may be declared
    pub ray_tracing: bool,

    /// Task and mesh stages may be declared
    pub mesh_shaders: bool,

    /// Deepest include nesting accepted before giving up
    pub max_include_depth: u32,

    /// Emit `#line` markers so compiler diagnostics point at the original files
    pub line_directives: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            defines: Vec::new(),
            max_bindless_textures: 512,
            max_bindless_readonly_texture_buffers: 512,
            mobile_platform: false,
            force_full_fp_precision: false,
            ray_tracing: true,
            mesh_shaders: true,
            max_include_depth: 8,
            line_directives: false,
        }
    }
}

impl ParserConfig {
    pub fn with_define(mut self, name: impl Into<String>, value: i32) -> Self {
        self.defines.push(Define::new(name, value));
        self
    }

    pub fn with_ray_tracing(mut self, enabled: bool) -> Self {
        self.ray_tracing = enabled;
        self
    }

    pub fn with_mesh_shaders(mut self, enabled: bool) -> Self {
        self.mesh_shaders = enabled;
        self
    }

    pub fn with_max_include_depth(mut self, depth: u32) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn with_line_directives(mut self, enabled: bool) -> Self {
        self.line_directives = enabled;
        self
    }

    /// Whether the target can build `stage` at all
    pub fn supports_stage(&self, stage: ShaderStage) -> bool {
        if stage.is_ray_tracing() {
            self.ray_tracing
        } else if stage.is_mesh_pipeline() {
            self.mesh_shaders
        } else {
            true
        }
    }
}
