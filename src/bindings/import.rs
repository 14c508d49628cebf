//! Import stub generation.
//!
//! Each function of the import feed becomes a native function with the same
//! signature whose body calls the script function of the same name.

use super::parser::DeclarationSink;
use super::runtime::RuntimeApi;
use super::types::{ConstantDecl, FunctionDecl, VOID};

const RETURN_VALUE: &str = "return_value";

/// Accumulated output of the import feed.
#[derive(Debug, Clone, Default)]
pub struct ImportOutput {
    /// Stub definitions in feed order
    pub stubs: String,

    /// One prototype per stub, in feed order
    pub prototypes: String,

    /// Number of stubs
    pub count: usize,
}

/// Generator for import stubs.
pub struct ImportGenerator<'a> {
    api: &'a RuntimeApi,
    output: ImportOutput,
}

impl<'a> ImportGenerator<'a> {
    /// Create a generator printing calls through `api`.
    pub fn new(api: &'a RuntimeApi) -> Self {
        ImportGenerator {
            api,
            output: ImportOutput::default(),
        }
    }

    /// Add a function's stub and prototype.
    pub fn add_function(&mut self, decl: &FunctionDecl) {
        self.output.stubs.push_str(&self.stub(decl));
        self.output.stubs.push('\n');
        self.output
            .prototypes
            .push_str(&format!("{};\n", signature(decl)));
        self.output.count += 1;
    }

    /// Render the stub for one function.
    pub fn stub(&self, decl: &FunctionDecl) -> String {
        let api = self.api;
        let s = &api.state_var;
        let slots = decl.slots();

        let mut out = format!("{}\n{{\n", signature(decl));
        out.push_str(&format!("  {} = {}();\n", api.state_param(), api.state_getter));
        if let Some(ty) = &decl.return_type {
            out.push_str(&format!("  {};\n", ty.declare(RETURN_VALUE)));
        }

        // look the script function up by name
        out.push_str(&format!("  lua_pushstring({}, \"{}\");\n", s, decl.name));
        out.push_str(&format!("  lua_gettable({}, {});\n", s, api.globals_index));

        for slot in &slots {
            if let Some(push) = api.push_value(&slot.category, &slot.name) {
                out.push_str(&format!("  {}\n", push));
            }
        }

        let results = usize::from(decl.return_type.is_some());
        out.push_str(&format!(
            "  {}({}, {}, {});\n",
            api.call_function,
            s,
            slots.len(),
            results
        ));

        if let Some(ty) = &decl.return_type {
            if let Some(fetch) = api.fetch_value(&ty.category(), "-1") {
                out.push_str(&format!(
                    "  {} = ({}){};\n",
                    RETURN_VALUE,
                    ty.declaration(),
                    fetch
                ));
            }
            out.push_str(&format!("  lua_pop({}, 1);\n", s));
            out.push_str(&format!("  return {};\n", RETURN_VALUE));
        }

        out.push_str("}\n");
        out
    }

    /// Finish and hand back the accumulated output.
    pub fn finish(self) -> ImportOutput {
        self.output
    }
}

impl DeclarationSink for ImportGenerator<'_> {
    fn function(&mut self, decl: FunctionDecl) {
        self.add_function(&decl);
    }

    fn constant(&mut self, decl: ConstantDecl) {
        // the import direction has no constant table
        tracing::debug!("ignoring constant `{}` in import feed", decl.name);
    }
}

/// Native signature of a stub, e.g. `char *get_name(Sprite *sprite)`.
pub fn signature(decl: &FunctionDecl) -> String {
    let head = match &decl.return_type {
        Some(ty) => ty.declare(&decl.name),
        None => format!("{} {}", VOID, decl.name),
    };

    let params = decl
        .slots()
        .iter()
        .map(|slot| slot.ty.declare(&slot.name))
        .collect::<Vec<_>>();
    let params = if params.is_empty() {
        VOID.to_string()
    } else {
        params.join(", ")
    };

    format!("{}({})", head, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::parser::DeclParser;

    fn generate(feed: &str) -> ImportOutput {
        let api = RuntimeApi::default();
        let mut gen = ImportGenerator::new(&api);
        DeclParser::new().parse(feed.as_bytes(), &mut gen).unwrap();
        gen.finish()
    }

    #[test]
    fn test_void_stub_without_arguments() {
        let out = generate("void MaskAll (void);");

        assert_eq!(
            out.stubs,
            "\
void MaskAll(void)
{
  lua_State *L = get_lua_state();
  lua_pushstring(L, \"MaskAll\");
  lua_gettable(L, LUA_GLOBALSINDEX);
  do_script_raw(L, 0, 0);
}

"
        );
        assert_eq!(out.prototypes, "void MaskAll(void);\n");
    }

    #[test]
    fn test_stub_pushes_arguments_in_order() {
        let out = generate("void _ColorCurve (Curve *curve, bool r, const char *name);");

        assert!(out.stubs.starts_with(
            "void _ColorCurve(Curve *curve, bool r, const char *name)\n{\n"
        ));
        assert!(out.stubs.contains(
            "  push_userdata(L, Type_Curve, curve);\n  lua_pushboolean(L, r);\n  lua_pushstring(L, name);\n  do_script_raw(L, 3, 0);\n"
        ));
        assert!(!out.stubs.contains("return"));
    }

    #[test]
    fn test_stub_with_result() {
        let out = generate("int CountLayers (Sprite *sprite);");

        assert_eq!(
            out.stubs,
            "\
int CountLayers(Sprite *sprite)
{
  lua_State *L = get_lua_state();
  int return_value;
  lua_pushstring(L, \"CountLayers\");
  lua_gettable(L, LUA_GLOBALSINDEX);
  push_userdata(L, Type_Sprite, sprite);
  do_script_raw(L, 1, 1);
  return_value = (int)lua_tonumber(L, -1);
  lua_pop(L, 1);
  return return_value;
}

"
        );
    }

    #[test]
    fn test_stub_with_handle_result() {
        let out = generate("Image *GetImage (Sprite *sprite);");

        assert!(out.stubs.contains("  Image *return_value;\n"));
        assert!(out
            .stubs
            .contains("  return_value = (Image *)to_userdata(L, Type_Image, -1);\n"));
    }

    #[test]
    fn test_string_result() {
        let out = generate("const char *GetTitle (void);");

        assert!(out.stubs.starts_with("const char *GetTitle(void)\n"));
        assert!(out
            .stubs
            .contains("  return_value = (const char *)lua_tostring(L, -1);\n"));
    }

    #[test]
    fn test_constants_ignored() {
        let out = generate("#define FOO\nvoid f (void);");

        assert_eq!(out.count, 1);
        assert!(!out.stubs.contains("FOO"));
    }
}
