//! `#pragma anki struct` support.
//!
//! A ghost struct is declared member by member and expands into a plain struct plus
//! offset and byte-address-buffer load macros:
//!
//! ```text
//! #pragma anki struct Light
//! #pragma anki member Vec3 position
//! #pragma anki member F32 radius
//! #pragma anki struct_end
//! ```
//!
//! becomes
//!
//! ```text
//! struct Light {
//! #define Light_position_OFFSETOF 0
//! 	Vec3 position;
//! #define Light_radius_OFFSETOF 12
//! 	F32 radius;
//! };
//! #	define Light_position_LOAD(buff, offset) buff.Load<Vec3>(Light_position_OFFSETOF + (offset)),
//! #	define Light_radius_LOAD(buff, offset) buff.Load<F32>(Light_radius_OFFSETOF + (offset))
//! #define loadLight(buff, offset) { \
//! 	Light_position_LOAD(buff, offset) \
//! 	Light_radius_LOAD(buff, offset) \
//! }
//! ```

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MemberType {
    F32,
    Vec2,
    Vec3,
    Vec4,
    U32,
}

impl MemberType {
    /// `R`-prefixed spellings are the relaxed-precision aliases and share the layout.
    pub fn from_token(token: &str) -> Option<MemberType> {
        match token {
            "F32" | "RF32" => Some(MemberType::F32),
            "Vec2" | "RVec2" => Some(MemberType::Vec2),
            "Vec3" | "RVec3" => Some(MemberType::Vec3),
            "Vec4" | "RVec4" => Some(MemberType::Vec4),
            "U32" => Some(MemberType::U32),
            _ => None,
        }
    }

    pub fn size(self) -> u32 {
        match self {
            MemberType::F32 | MemberType::U32 => 4,
            MemberType::Vec2 => 8,
            MemberType::Vec3 => 12,
            MemberType::Vec4 => 16,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MemberType::F32 => "F32",
            MemberType::Vec2 => "Vec2",
            MemberType::Vec3 => "Vec3",
            MemberType::Vec4 => "Vec4",
            MemberType::U32 => "U32",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Member {
    pub name: String,
    pub ty: MemberType,
    pub offset: u32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GhostStruct {
    pub name: String,
    pub members: Vec<Member>,
}

impl GhostStruct {
    pub fn new(name: &str) -> Self {
        GhostStruct {
            name: name.to_owned(),
            members: Vec::new(),
        }
    }

    pub fn opening_line(&self) -> String {
        format!("struct {} {{", self.name)
    }

    /// Append a member, laid out right after the previous one. Returns the lines to emit;
    /// `type_token` is echoed as written so relaxed aliases survive.
    pub fn add_member(&mut self, name: &str, ty: MemberType, type_token: &str) -> [String; 2] {
        let offset = self
            .members
            .last()
            .map_or(0, |last| last.offset + last.ty.size());

        self.members.push(Member {
            name: name.to_owned(),
            ty,
            offset,
        });

        [
            format!("#define {}_{}_OFFSETOF {}", self.name, name, offset),
            format!("\t{} {};", type_token, name),
        ]
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    /// Lines closing the struct: the `};`, one load macro per member and the
    /// aggregate `loadNAME` macro.
    pub fn closing_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.members.len() * 2 + 3);
        lines.push("};".to_owned());

        for (i, m) in self.members.iter().enumerate() {
            let separator = if i + 1 != self.members.len() { "," } else { "" };
            lines.push(format!(
                "#\tdefine {s}_{m}_LOAD(buff, offset) buff.Load<{t}>({s}_{m}_OFFSETOF + (offset)){sep}",
                s = self.name,
                m = m.name,
                t = m.ty.name(),
                sep = separator
            ));
        }

        lines.push(format!("#define load{}(buff, offset) {{ \\", self.name));
        for m in &self.members {
            lines.push(format!("\t{}_{}_LOAD(buff, offset) \\", self.name, m.name));
        }
        lines.push("}".to_owned());

        lines
    }
}
