//! Vertex buffer layouts derived from a function's argument list
//!
//! Arguments are split into a per-vertex group and a per-instance group,
//! each keeping the arguments' original relative order. Every non-empty
//! group becomes one [`VertexBufferLayout`] whose attribute offsets start
//! at zero.

use crate::error::LayoutError;
use crate::types::{Function, Variable, VertexFormat};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which arguments are fed per instance rather than per vertex
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Argument names that step per instance
    pub instance_attributes: Vec<String>,
}

impl LayoutConfig {
    pub fn with_instance_attributes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            instance_attributes: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_instance(&self, name: &str) -> bool {
        self.instance_attributes.iter().any(|n| n == name)
    }
}

/// How often a buffer advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    Vertex,
    Instance,
}

impl StepMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StepMode::Vertex => "vertex",
            StepMode::Instance => "instance",
        }
    }
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute within a vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexAttribute {
    pub shader_location: u32,
    pub offset: u32,
    pub format: VertexFormat,
}

/// Stride, step mode and attributes for binding one buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexBufferLayout {
    pub array_stride: u32,
    pub step_mode: StepMode,
    pub attributes: Vec<VertexAttribute>,
}

/// A candidate attribute and the group it belongs to
pub(crate) struct LayoutInput<'a> {
    pub variable: &'a Variable,
    pub instance: bool,
}

/// Layouts for `function`'s arguments, treating `instance_arg_names` as per-instance
///
/// An argument without `@location` gets its index in the argument list as
/// shader location, so locations never collide across the two buffers.
/// `@builtin` arguments are not vertex attributes and are skipped.
pub fn compute_vertex_buffer_layouts<S: AsRef<str>>(
    function: &Function,
    instance_arg_names: &[S],
) -> Result<Vec<VertexBufferLayout>, LayoutError> {
    let inputs: Vec<LayoutInput> = function
        .args
        .iter()
        .map(|arg| LayoutInput {
            variable: arg,
            instance: instance_arg_names.iter().any(|n| n.as_ref() == arg.name),
        })
        .collect();
    build_layouts(&inputs)
}

pub(crate) fn build_layouts(inputs: &[LayoutInput]) -> Result<Vec<VertexBufferLayout>, LayoutError> {
    let mut vertex = Vec::new();
    let mut instance = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        if input.variable.modifier.builtin.is_some() {
            continue;
        }
        let group = if input.instance {
            &mut instance
        } else {
            &mut vertex
        };
        group.push((index as u32, input.variable));
    }

    let mut layouts = Vec::new();
    for (step_mode, group) in [(StepMode::Vertex, vertex), (StepMode::Instance, instance)] {
        if group.is_empty() {
            continue;
        }
        layouts.push(group_layout(step_mode, &group)?);
    }
    Ok(layouts)
}

fn group_layout(
    step_mode: StepMode,
    group: &[(u32, &Variable)],
) -> Result<VertexBufferLayout, LayoutError> {
    let mut offset = 0;
    let mut attributes = Vec::with_capacity(group.len());

    for &(index, variable) in group {
        let unsupported = |source| LayoutError::Unsupported {
            argument: variable.name.clone(),
            source,
        };
        let size = variable.ty.size().map_err(unsupported)?;
        let format = variable.ty.format().map_err(unsupported)?;

        attributes.push(VertexAttribute {
            shader_location: variable.modifier.location.unwrap_or(index),
            offset,
            format,
        });
        offset += size;
    }

    Ok(VertexBufferLayout {
        array_stride: offset,
        step_mode,
        attributes,
    })
}

#[cfg(feature = "wgpu")]
mod wgpu_conv {
    use super::{StepMode, VertexBufferLayout};
    use crate::types::VertexFormat;

    impl From<VertexFormat> for wgpu::VertexFormat {
        fn from(format: VertexFormat) -> Self {
            match format {
                VertexFormat::Float32 => wgpu::VertexFormat::Float32,
                VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
                VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
                VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
                VertexFormat::Uint32 => wgpu::VertexFormat::Uint32,
                VertexFormat::Uint32x2 => wgpu::VertexFormat::Uint32x2,
                VertexFormat::Uint32x3 => wgpu::VertexFormat::Uint32x3,
                VertexFormat::Uint32x4 => wgpu::VertexFormat::Uint32x4,
            }
        }
    }

    impl From<StepMode> for wgpu::VertexStepMode {
        fn from(mode: StepMode) -> Self {
            match mode {
                StepMode::Vertex => wgpu::VertexStepMode::Vertex,
                StepMode::Instance => wgpu::VertexStepMode::Instance,
            }
        }
    }

    impl VertexBufferLayout {
        /// Attributes as wgpu descriptors; keep them alive for [`Self::to_wgpu`]
        pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
            self.attributes
                .iter()
                .map(|a| wgpu::VertexAttribute {
                    format: a.format.into(),
                    offset: u64::from(a.offset),
                    shader_location: a.shader_location,
                })
                .collect()
        }

        pub fn to_wgpu<'a>(
            &self,
            attributes: &'a [wgpu::VertexAttribute],
        ) -> wgpu::VertexBufferLayout<'a> {
            wgpu::VertexBufferLayout {
                array_stride: u64::from(self.array_stride),
                step_mode: self.step_mode.into(),
                attributes,
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Modifier, Type};

    fn main_fn() -> Function {
        Function {
            modifier: Modifier::default(),
            name: "main".into(),
            args: vec![
                Variable::new("pos", Type::aggregate("vec3", "f32")),
                Variable::new("norm", Type::aggregate("vec3", "f32")),
            ],
            return_type: None,
        }
    }

    #[test]
    fn test_single_vertex_layout() {
        let layouts = compute_vertex_buffer_layouts::<&str>(&main_fn(), &[]).unwrap();
        assert_eq!(layouts.len(), 1);

        let layout = &layouts[0];
        assert_eq!(layout.step_mode, StepMode::Vertex);
        assert_eq!(layout.array_stride, 24);
        let offsets: Vec<u32> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12]);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1]);
    }

    #[test]
    fn test_instance_split_restarts_offsets() {
        let layouts = compute_vertex_buffer_layouts(&main_fn(), &["pos"]).unwrap();
        assert_eq!(layouts.len(), 2);

        assert_eq!(layouts[0].step_mode, StepMode::Vertex);
        assert_eq!(layouts[0].attributes.len(), 1);
        assert_eq!(layouts[0].attributes[0].offset, 0);
        assert_eq!(layouts[0].attributes[0].shader_location, 1);

        assert_eq!(layouts[1].step_mode, StepMode::Instance);
        assert_eq!(layouts[1].attributes[0].offset, 0);
        assert_eq!(layouts[1].attributes[0].shader_location, 0);
        assert_eq!(layouts[1].array_stride, 12);
    }

    #[test]
    fn test_group_order_is_preserved() {
        let mut f = main_fn();
        f.args.push(Variable::new("color", Type::aggregate("vec4", "f32")));
        f.args.push(Variable::new("scale", Type::scalar("f32")));
        let layouts = compute_vertex_buffer_layouts(&f, &["scale", "pos"]).unwrap();

        let instance: Vec<u32> = layouts[1].attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(instance, vec![0, 3]);
        assert_eq!(layouts[1].attributes[1].offset, 12);
        assert_eq!(layouts[0].attributes[1].format, VertexFormat::Float32x4);
    }

    #[test]
    fn test_unsupported_argument() {
        let mut f = main_fn();
        f.args.push(Variable::new("bones", Type::aggregate("mat4x4", "f32")));
        let err = compute_vertex_buffer_layouts::<&str>(&f, &[]).unwrap_err();
        assert!(matches!(err, LayoutError::Unsupported { ref argument, .. } if argument == "bones"));
    }

    #[test]
    fn test_serializes_in_webgpu_shape() {
        let layouts = compute_vertex_buffer_layouts::<&str>(&main_fn(), &[]).unwrap();
        let json = serde_json::to_value(&layouts[0]).unwrap();
        assert_eq!(json["arrayStride"], 24);
        assert_eq!(json["stepMode"], "vertex");
        assert_eq!(json["attributes"][1]["shaderLocation"], 1);
        assert_eq!(json["attributes"][1]["format"], "float32x3");
    }

    #[test]
    fn test_config_matching() {
        let config = LayoutConfig::with_instance_attributes(vec!["pos".to_string()]);
        assert!(config.is_instance("pos"));
        assert!(!config.is_instance("norm"));
        assert!(!LayoutConfig::default().is_instance("pos"));
    }
}
