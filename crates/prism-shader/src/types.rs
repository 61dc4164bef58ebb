//! Type model shared by both parsers
//!
//! [`Type::size`] and [`Type::format`] are pure functions of the
//! `(aggregate, primitive)` pair and fail with [`UnsupportedType`] for
//! combinations that have no GPU vertex representation.

use crate::error::UnsupportedType;
use serde::Serialize;
use std::fmt;

/// Pipeline stage marked by `@vertex`, `@fragment` or `@compute`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub fn from_attribute(attribute: &str) -> Option<Self> {
        match attribute {
            "@vertex" => Some(Self::Vertex),
            "@fragment" => Some(Self::Fragment),
            "@compute" => Some(Self::Compute),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
        }
    }
}

/// Attributes attached to a declaration
///
/// Every field is independently optional; `None` means the attribute was
/// not written, never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup_size: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<ShaderStage>,
}

impl Modifier {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(stage) = self.stage {
            parts.push(format!("@{}", stage.as_str()));
        }
        if let Some(sizes) = &self.workgroup_size {
            let sizes: Vec<String> = sizes.iter().map(u32::to_string).collect();
            parts.push(format!("@workgroup_size({})", sizes.join(", ")));
        }
        if let Some(group) = self.group {
            parts.push(format!("@group({})", group));
        }
        if let Some(binding) = self.binding {
            parts.push(format!("@binding({})", binding));
        }
        if let Some(location) = self.location {
            parts.push(format!("@location({})", location));
        }
        if let Some(builtin) = &self.builtin {
            parts.push(format!("@builtin({})", builtin));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Vertex attribute formats accepted by WebGPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
    Uint32,
    Uint32x2,
    Uint32x3,
    Uint32x4,
}

impl VertexFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float32x2 => "float32x2",
            Self::Float32x3 => "float32x3",
            Self::Float32x4 => "float32x4",
            Self::Uint32 => "uint32",
            Self::Uint32x2 => "uint32x2",
            Self::Uint32x3 => "uint32x3",
            Self::Uint32x4 => "uint32x4",
        }
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A possibly aggregate type such as `f32` or `vec3<f32>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Type {
    /// Attributes written in type position, e.g. on a return type
    #[serde(skip_serializing_if = "Modifier::is_empty")]
    pub modifier: Modifier,
    /// Composite shape; `None` for scalars
    pub aggregate: Option<String>,
    pub primitive: String,
    /// Element count of a fixed-size `array<T, N>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

/// Primitive name used for declarations whose type is left to inference
pub const INFERRED: &str = "_";

impl Type {
    pub fn scalar(primitive: impl Into<String>) -> Self {
        Self {
            primitive: primitive.into(),
            ..Self::default()
        }
    }

    pub fn aggregate(aggregate: impl Into<String>, primitive: impl Into<String>) -> Self {
        Self {
            aggregate: Some(aggregate.into()),
            primitive: primitive.into(),
            ..Self::default()
        }
    }

    /// Placeholder for a declaration without a written type
    pub fn inferred() -> Self {
        Self::scalar(INFERRED)
    }

    pub fn is_inferred(&self) -> bool {
        self.aggregate.is_none() && self.primitive == INFERRED
    }

    fn unsupported(&self) -> UnsupportedType {
        UnsupportedType {
            aggregate: self.aggregate.clone(),
            primitive: self.primitive.clone(),
        }
    }

    /// Size in bytes
    pub fn size(&self) -> Result<u32, UnsupportedType> {
        let base = match self.primitive.as_str() {
            "f32" | "u32" => 4,
            "vec3u" => 12,
            _ => return Err(self.unsupported()),
        };
        let count = match self.aggregate.as_deref() {
            None => 1,
            Some("vec2") => 2,
            Some("vec3") => 3,
            Some("vec4") => 4,
            Some("mat3x3") => 9,
            Some("mat4x4") => 16,
            Some(_) => return Err(self.unsupported()),
        };
        Ok(base * count)
    }

    /// Vertex attribute format
    pub fn format(&self) -> Result<VertexFormat, UnsupportedType> {
        use VertexFormat::{
            Float32, Float32x2, Float32x3, Float32x4, Uint32, Uint32x2, Uint32x3, Uint32x4,
        };

        let float = match self.primitive.as_str() {
            "f32" => true,
            "u32" => false,
            _ => return Err(self.unsupported()),
        };
        let format = match (self.aggregate.as_deref(), float) {
            (None, true) => Float32,
            (Some("vec2"), true) => Float32x2,
            (Some("vec3"), true) => Float32x3,
            (Some("vec4"), true) => Float32x4,
            (None, false) => Uint32,
            (Some("vec2"), false) => Uint32x2,
            (Some("vec3"), false) => Uint32x3,
            (Some("vec4"), false) => Uint32x4,
            _ => return Err(self.unsupported()),
        };
        Ok(format)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifier.is_empty() {
            write!(f, "{} ", self.modifier)?;
        }
        match (&self.aggregate, self.length) {
            (Some(aggregate), Some(length)) => {
                write!(f, "{}<{}, {}>", aggregate, self.primitive, length)
            }
            (Some(aggregate), None) => write!(f, "{}<{}>", aggregate, self.primitive),
            (None, _) => f.write_str(&self.primitive),
        }
    }
}

/// A named, typed declaration: struct member, argument or global
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    #[serde(skip_serializing_if = "Modifier::is_empty")]
    pub modifier: Modifier,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            modifier: Modifier::default(),
            name: name.into(),
            ty,
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifier.is_empty() {
            write!(f, "{} ", self.modifier)?;
        }
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// A struct declaration; member order is declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Struct {
    #[serde(skip_serializing_if = "Modifier::is_empty")]
    pub modifier: Modifier,
    pub name: String,
    pub members: Vec<Variable>,
}

impl Struct {
    pub fn member(&self, name: &str) -> Option<&Variable> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Byte offset of each member, as the running sum of preceding sizes
    pub fn offsets(&self) -> Result<Vec<u32>, UnsupportedType> {
        let mut offset = 0;
        let mut offsets = Vec::with_capacity(self.members.len());
        for member in &self.members {
            offsets.push(offset);
            offset += member.ty.size()?;
        }
        Ok(offsets)
    }
}

impl fmt::Display for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifier.is_empty() {
            write!(f, "{} ", self.modifier)?;
        }
        writeln!(f, "struct {} {{", self.name)?;
        for member in &self.members {
            writeln!(f, "    {},", member)?;
        }
        f.write_str("}")
    }
}

/// A function signature; the body is kept only by the script parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    #[serde(skip_serializing_if = "Modifier::is_empty")]
    pub modifier: Modifier,
    pub name: String,
    pub args: Vec<Variable>,
    pub return_type: Option<Type>,
}

impl Function {
    pub fn stage(&self) -> Option<ShaderStage> {
        self.modifier.stage
    }

    pub fn arg(&self, name: &str) -> Option<&Variable> {
        self.args.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifier.is_empty() {
            write!(f, "{} ", self.modifier)?;
        }
        let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
        write!(f, "fn {}({})", self.name, args.join(", "))?;
        if let Some(ret) = &self.return_type {
            write!(f, " -> {}", ret)?;
        }
        Ok(())
    }
}
