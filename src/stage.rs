use bitflags::bitflags;

/// Shader stage a technique block is written for
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderStage {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Task,
    Mesh,
    Fragment,
    Compute,
    RayGen,
    AnyHit,
    ClosestHit,
    Miss,
    Intersection,
    Callable,
}

/// (stage, directive token, name used in `ANKI_<NAME>_SHADER`)
const STAGE_TABLE: [(ShaderStage, &str, &str); ShaderStage::COUNT] = [
    (ShaderStage::Vertex, "vert", "VERTEX"),
    (ShaderStage::TessellationControl, "tessc", "TESSELLATION_CONTROL"),
    (ShaderStage::TessellationEvaluation, "tesse", "TESSELLATION_EVALUATION"),
    (ShaderStage::Geometry, "geom", "GEOMETRY"),
    (ShaderStage::Task, "task", "TASK"),
    (ShaderStage::Mesh, "mesh", "MESH"),
    (ShaderStage::Fragment, "frag", "FRAGMENT"),
    (ShaderStage::Compute, "comp", "COMPUTE"),
    (ShaderStage::RayGen, "rgen", "RAY_GEN"),
    (ShaderStage::AnyHit, "ahit", "ANY_HIT"),
    (ShaderStage::ClosestHit, "chit", "CLOSEST_HIT"),
    (ShaderStage::Miss, "miss", "MISS"),
    (ShaderStage::Intersection, "int", "INTERSECTION"),
    (ShaderStage::Callable, "call", "CALLABLE"),
];

impl ShaderStage {
    pub const COUNT: usize = 14;

    pub const ALL: [ShaderStage; ShaderStage::COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::TessellationControl,
        ShaderStage::TessellationEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Task,
        ShaderStage::Mesh,
        ShaderStage::Fragment,
        ShaderStage::Compute,
        ShaderStage::RayGen,
        ShaderStage::AnyHit,
        ShaderStage::ClosestHit,
        ShaderStage::Miss,
        ShaderStage::Intersection,
        ShaderStage::Callable,
    ];

    /// Parse the stage token of `technique_start`/`technique_end`, e.g. `frag`.
    pub fn from_token(token: &str) -> Option<ShaderStage> {
        STAGE_TABLE
            .iter()
            .find(|(_, t, _)| *t == token)
            .map(|(stage, _, _)| *stage)
    }

    pub fn token(self) -> &'static str {
        STAGE_TABLE[self.index()].1
    }

    /// Upper-case name as it appears in `ANKI_<NAME>_SHADER`
    pub fn define_name(self) -> &'static str {
        STAGE_TABLE[self.index()].2
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn bit(self) -> ShaderStages {
        ShaderStages::from_bits_retain(1 << self.index())
    }

    pub fn is_ray_tracing(self) -> bool {
        ShaderStages::RAY_TRACING.contains(self.bit())
    }

    pub fn is_mesh_pipeline(self) -> bool {
        matches!(self, ShaderStage::Task | ShaderStage::Mesh)
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

bitflags! {
    /// Set of stages declared by a technique
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const TESSELLATION_CONTROL = 1 << 1;
        const TESSELLATION_EVALUATION = 1 << 2;
        const GEOMETRY = 1 << 3;
        const TASK = 1 << 4;
        const MESH = 1 << 5;
        const FRAGMENT = 1 << 6;
        const COMPUTE = 1 << 7;
        const RAY_GEN = 1 << 8;
        const ANY_HIT = 1 << 9;
        const CLOSEST_HIT = 1 << 10;
        const MISS = 1 << 11;
        const INTERSECTION = 1 << 12;
        const CALLABLE = 1 << 13;

        const RAY_TRACING = Self::RAY_GEN.bits()
            | Self::ANY_HIT.bits()
            | Self::CLOSEST_HIT.bits()
            | Self::MISS.bits()
            | Self::INTERSECTION.bits()
            | Self::CALLABLE.bits();
    }
}

impl ShaderStages {
    /// Stages in the set, in declaration order of [`ShaderStage`]
    pub fn stages(self) -> impl Iterator<Item = ShaderStage> {
        ShaderStage::ALL
            .into_iter()
            .filter(move |stage| self.contains(stage.bit()))
    }
}
