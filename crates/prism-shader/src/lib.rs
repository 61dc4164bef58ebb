//! Prism Shader - WGSL-like shader source front end
//!
//! Turns shader source text into structured metadata that the rendering
//! layer consumes when it builds pipelines: structs, global buffer
//! variables, function signatures, and the vertex buffer layouts derived
//! from an entry point's arguments.
//!
//! ## Key Types
//!
//! - [`Lexer`] / [`tokenize`] - Source text to [`TokenList`]; never fails
//! - [`Session`] - Unknown-token dedup, struct-name registry, diagnostics
//! - [`Module`] / [`parse_module`] - Top-level declarations
//! - [`Type`] - Size and vertex format computation
//! - [`VertexBufferLayout`] - GPU-facing buffer descriptors
//!
//! ## Example
//!
//! ```rust
//! use prism_shader::{Module, compute_vertex_buffer_layouts};
//!
//! let module = Module::parse("fn main(pos: vec3<f32>, norm: vec3<f32>) {}").unwrap();
//! let main = module.function("main").unwrap();
//! let layouts = compute_vertex_buffer_layouts::<&str>(main, &[]).unwrap();
//! assert_eq!(layouts[0].array_stride, 24);
//! ```

pub mod decl;
pub mod layout;
pub mod lexer;
pub mod module;
pub mod session;
pub mod stream;
pub mod token;
pub mod types;

mod error;

pub use error::{LayoutError, ParseError, Result, UnsupportedType};
pub use layout::{
    LayoutConfig, StepMode, VertexAttribute, VertexBufferLayout, compute_vertex_buffer_layouts,
};
pub use lexer::{Lexer, tokenize};
pub use module::{Module, parse_module};
pub use session::{Diagnostic, Session, Severity};
pub use stream::TokenStream;
pub use token::{SubKind, Token, TokenKind, TokenList};
pub use types::{Function, Modifier, ShaderStage, Struct, Type, Variable, VertexFormat};
