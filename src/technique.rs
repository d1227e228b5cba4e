use crate::source_buffer::SourceBuffer;
use crate::{ShaderStage, ShaderStages};

pub const UNNAMED_TECHNIQUE: &str = "Unnamed";

/// A named bundle of shader stages, each with its own finalized source.
#[derive(Clone, Debug)]
pub struct Technique {
    name: String,
    stages: ShaderStages,
    active_mutators: [u64; ShaderStage::COUNT],
    sources: [String; ShaderStage::COUNT],
}

impl Technique {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> ShaderStages {
        self.stages
    }

    pub fn has_stage(&self, stage: ShaderStage) -> bool {
        self.stages.contains(stage.bit())
    }

    /// Bit `i` is set when mutator `i` is visible to `stage`
    pub fn active_mutators(&self, stage: ShaderStage) -> u64 {
        self.active_mutators[stage.index()]
    }

    /// Whether mutator `index` is defined when compiling `stage`
    pub fn uses_mutator(&self, stage: ShaderStage, index: usize) -> bool {
        index < 64 && self.active_mutators[stage.index()] & (1u64 << index) != 0
    }

    /// Preprocessed body of `stage`, without the generated header
    pub fn source(&self, stage: ShaderStage) -> Option<&str> {
        if self.has_stage(stage) {
            Some(&self.sources[stage.index()])
        } else {
            None
        }
    }
}

/// Technique while parsing: per-stage line buffers instead of joined sources.
#[derive(Debug)]
pub(crate) struct TechniqueBuilder {
    pub name: String,
    pub stages: ShaderStages,
    pub active_mutators: [u64; ShaderStage::COUNT],
    pub buffers: [Option<SourceBuffer>; ShaderStage::COUNT],
}

impl TechniqueBuilder {
    pub fn new(name: &str) -> Self {
        TechniqueBuilder {
            name: name.to_owned(),
            stages: ShaderStages::empty(),
            active_mutators: [0; ShaderStage::COUNT],
            buffers: Default::default(),
        }
    }

    /// Open `stage`, seeding its buffer with what has been seen outside techniques so far.
    pub fn open_stage(&mut self, stage: ShaderStage, active_mutators: u64, common: &SourceBuffer) {
        debug_assert!(!self.stages.contains(stage.bit()));
        self.stages |= stage.bit();
        self.active_mutators[stage.index()] = active_mutators;
        self.buffers[stage.index()] = Some(common.clone());
    }

    pub fn buffer_mut(&mut self, stage: ShaderStage) -> &mut SourceBuffer {
        self.buffers[stage.index()].get_or_insert_with(SourceBuffer::default)
    }

    /// Join every stage buffer; the line storage is dropped.
    pub fn finish(self) -> Technique {
        let TechniqueBuilder {
            name,
            stages,
            active_mutators,
            buffers,
        } = self;

        let mut sources: [String; ShaderStage::COUNT] = Default::default();
        for (source, buffer) in sources.iter_mut().zip(buffers) {
            if let Some(buffer) = buffer {
                *source = buffer.into_source();
            }
        }

        Technique {
            name,
            stages,
            active_mutators,
            sources,
        }
    }
}
