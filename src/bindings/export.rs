//! Export wrapper generation.
//!
//! Each function of the export feed becomes a wrapper the script runtime can
//! call: it pulls its arguments off the script stack, calls the native
//! function and pushes the result back. Functions annotated with `CODE` are
//! only registered; their wrapper is written by hand in the native sources.

use super::grammar;
use super::parser::DeclarationSink;
use super::registry::{ConstantTable, RoutineTable};
use super::runtime::RuntimeApi;
use super::types::{ConstantDecl, FunctionDecl, ScriptCategory};

/// Local holding the native call's result.
pub const RETURN_VALUE: &str = "return_value";

/// Accumulated output of the export feed.
#[derive(Debug, Clone, Default)]
pub struct ExportOutput {
    /// Wrapper definitions in feed order
    pub wrappers: String,

    /// Names to register, in feed order
    pub routines: RoutineTable,

    /// Constants to register, in feed order
    pub constants: ConstantTable,
}

/// Generator for export wrappers.
pub struct ExportGenerator<'a> {
    api: &'a RuntimeApi,
    output: ExportOutput,
}

impl<'a> ExportGenerator<'a> {
    /// Create a generator printing calls through `api`.
    pub fn new(api: &'a RuntimeApi) -> Self {
        ExportGenerator {
            api,
            output: ExportOutput::default(),
        }
    }

    /// Add a function: emit its wrapper unless hand-written, then register it.
    pub fn add_function(&mut self, decl: &FunctionDecl) {
        if grammar::has_code_marker(&decl.annotation) {
            tracing::debug!("`{}` has a hand-written wrapper", decl.name);
        } else {
            self.output.wrappers.push_str(&self.wrapper(decl));
            self.output.wrappers.push('\n');
        }

        self.output.routines.push(&decl.name);
    }

    /// Add a constant to the constant table.
    pub fn add_constant(&mut self, decl: &ConstantDecl) {
        self.output.constants.push(&decl.name);
    }

    /// Render the wrapper for one function.
    pub fn wrapper(&self, decl: &FunctionDecl) -> String {
        let api = self.api;
        let slots = decl.slots();
        let ret = decl
            .return_type
            .as_ref()
            .map(|ty| (ty, ty.category()))
            .filter(|(_, category)| category.is_emittable());

        let mut out = String::new();
        out.push_str(&format!(
            "static int {}({})\n{{\n",
            api.wrapper_name(&decl.name),
            api.state_param()
        ));

        // locals
        match &ret {
            Some((ty, ScriptCategory::Opaque(_))) => {
                out.push_str(&format!("  {};\n", ty.declare(RETURN_VALUE)));
            }
            Some((ty, _)) => {
                out.push_str(&format!("  {}{};\n", ty.native_cast(), RETURN_VALUE));
            }
            None => {}
        }
        for slot in &slots {
            out.push_str(&format!("  {}{};\n", slot.ty.native_cast(), slot.name));
        }

        // argument checks, fail-fast through the GetArg macro
        for slot in &slots {
            let index = api.arg_index(slot.position);
            match (&slot.category, slot.category.runtime_kind()) {
                (ScriptCategory::Opaque(base), _) => {
                    out.push_str(&format!("  GetUD({}, {}, {});\n", index, slot.name, base));
                }
                (_, Some(kind)) => {
                    out.push_str(&format!(
                        "  GetArg({}, {}, {}, {});\n",
                        index,
                        slot.name,
                        slot.ty.native_cast().trim_end(),
                        kind
                    ));
                }
                (_, None) => {}
            }
        }

        // native call
        let args = slots
            .iter()
            .map(|slot| slot.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let call = format!("{}({});", decl.name, args);
        match &ret {
            Some(_) => out.push_str(&format!("  {} = {}\n", RETURN_VALUE, call)),
            None => out.push_str(&format!("  {}\n", call)),
        }

        // result
        let pushed = ret
            .as_ref()
            .and_then(|(_, category)| api.push_value(category, RETURN_VALUE));
        match pushed {
            Some(push) => {
                out.push_str(&format!("  {}\n", push));
                out.push_str("  return 1;\n");
            }
            None => out.push_str("  return 0;\n"),
        }

        out.push_str("}\n");
        out
    }

    /// Finish and hand back the accumulated output.
    pub fn finish(self) -> ExportOutput {
        self.output
    }
}

impl DeclarationSink for ExportGenerator<'_> {
    fn function(&mut self, decl: FunctionDecl) {
        self.add_function(&decl);
    }

    fn constant(&mut self, decl: ConstantDecl) {
        self.add_constant(&decl);
    }
}
