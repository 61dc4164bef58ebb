//! Prism WASM - WebAssembly bindings for the shader front end
//!
//! The browser rendering layer hands shader source to these functions and
//! gets JSON back: the parsed module, or vertex buffer layouts already in
//! the shape `GPUDevice.createRenderPipeline` expects.

use prism_script::ScriptParser;
use prism_shader::{LayoutConfig, Module, ParseError, tokenize};
use serde_json::Value;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

/// Token list as a JSON array
#[wasm_bindgen]
pub fn tokenize_json(source: &str) -> Result<String, JsValue> {
    to_json(&tokenize(source)).map_err(to_js_error)
}

/// `{ structs, vars, fns }` as JSON
#[wasm_bindgen]
pub fn parse_module_json(source: &str) -> Result<String, JsValue> {
    module_json(source).map_err(to_js_error)
}

/// Vertex buffer layouts for `function`, as a JSON array of
/// `{ arrayStride, stepMode, attributes: [{ shaderLocation, offset, format }] }`
///
/// `instance_attributes` lists the argument or member names that step per
/// instance.
#[wasm_bindgen]
pub fn vertex_buffer_layouts_json(
    source: &str,
    function: &str,
    instance_attributes: Vec<String>,
) -> Result<String, JsValue> {
    layouts_json(source, function, instance_attributes).map_err(to_js_error)
}

/// Full source unit including function-body ASTs, as JSON
#[wasm_bindgen]
pub fn parse_source_json(source: &str) -> Result<String, JsValue> {
    let unit = ScriptParser::new().parse(source).map_err(to_js_error)?;
    to_json(&unit).map_err(to_js_error)
}

fn module_json(source: &str) -> Result<String, String> {
    let module = Module::parse(source).map_err(|e| e.to_string())?;
    to_json(&module)
}

fn layouts_json(
    source: &str,
    function: &str,
    instance_attributes: Vec<String>,
) -> Result<String, String> {
    let module = Module::parse(source).map_err(|e| e.to_string())?;
    let config = LayoutConfig { instance_attributes };
    let layouts = module
        .vertex_buffer_layouts(function, &config)
        .map_err(|e| e.to_string())?;
    to_json(&layouts)
}

#[wasm_bindgen]
pub struct ValidationResult {
    success: bool,
    error_message: Option<String>,
    error_line: Option<u32>,
}

#[wasm_bindgen]
impl ValidationResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.error_message.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error_line(&self) -> Option<u32> {
        self.error_line
    }
}

impl From<Result<(), ParseError>> for ValidationResult {
    fn from(result: Result<(), ParseError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error_message: None,
                error_line: None,
            },
            Err(e) => Self {
                success: false,
                error_message: Some(e.to_string()),
                error_line: u32::try_from(e.line()).ok(),
            },
        }
    }
}

/// Parse `source` fully (bodies included) and report the first error
#[wasm_bindgen]
pub fn validate(source: &str) -> ValidationResult {
    ScriptParser::new().parse(source).map(|_| ()).into()
}

/// Vertex layouts for every `@vertex` entry point, keyed by function name
#[wasm_bindgen]
pub fn entry_point_layouts_json(
    source: &str,
    instance_attributes: Vec<String>,
) -> Result<String, JsValue> {
    let module = Module::parse(source).map_err(to_js_error)?;
    let config = LayoutConfig { instance_attributes };

    let mut entries = serde_json::Map::new();
    for function in module
        .fns
        .iter()
        .filter(|f| f.stage() == Some(prism_shader::ShaderStage::Vertex))
    {
        let layouts = module
            .vertex_buffer_layouts(&function.name, &config)
            .map_err(to_js_error)?;
        let value = serde_json::to_value(&layouts).map_err(to_js_error)?;
        entries.insert(function.name.clone(), value);
    }
    to_json(&Value::Object(entries)).map_err(to_js_error)
}
