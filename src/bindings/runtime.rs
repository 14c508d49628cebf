//! Names of the script runtime API the generated glue calls into.
//!
//! The defaults produce glue for a Lua 5.0 style C API with the handle helpers
//! `push_userdata`/`to_userdata` and the `Type_<Name>` tag enumeration.
//!
//! Only the names below are configurable. The value primitives stay on the
//! Lua C API whatever the runtime is called: `lua_push{boolean,number,string}`,
//! `lua_is*`/`lua_to*`, `lua_isnil`, `lua_gettable` for
//! global lookup, `lua_pop` and `lua_setglobal`. The wrapper macros are always
//! `GetArg` and `GetUD`. A runtime that renames these needs compatible macros
//! in scope before the generated source is compiled.

use serde::{Deserialize, Serialize};

use crate::bindings::types::ScriptCategory;
use crate::util::diagnostic::InvalidIdentifierError;

/// Runtime API and generated symbol names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeApi {
    /// Runtime name used in section banners
    pub name: String,

    /// Interpreter state type
    pub state_type: String,

    /// Name of the state variable inside generated functions
    pub state_var: String,

    /// Function returning the interpreter state for import stubs
    pub state_getter: String,

    /// Prefix prepended to export wrapper names
    pub wrapper_prefix: String,

    /// Prefix of handle type tags (`Type_` + base name)
    pub handle_tag_prefix: String,

    /// Pushes a tagged handle: `(state, tag, ptr)`
    pub push_handle: String,

    /// Fetches a tagged handle: `(state, tag, index)`
    pub to_handle: String,

    /// Invokes a script function: `(state, nargs, nresults)`
    pub call_function: String,

    /// Pseudo-index of the globals table
    pub globals_index: String,

    /// Registers a C function under a global name
    pub register_function: String,

    /// Record type of the routine table
    pub routine_record: String,

    /// Generated routine table symbol
    pub routines_table: String,

    /// Generated constant table symbol
    pub constants_table: String,

    /// Generated registration routine symbol
    pub register_routine: String,

    /// Stack index of the first script argument
    pub first_arg_index: u32,
}

impl Default for RuntimeApi {
    fn default() -> Self {
        RuntimeApi {
            name: "Lua".to_string(),
            state_type: "lua_State".to_string(),
            state_var: "L".to_string(),
            state_getter: "get_lua_state".to_string(),
            wrapper_prefix: "bind_".to_string(),
            handle_tag_prefix: "Type_".to_string(),
            push_handle: "push_userdata".to_string(),
            to_handle: "to_userdata".to_string(),
            call_function: "do_script_raw".to_string(),
            globals_index: "LUA_GLOBALSINDEX".to_string(),
            register_function: "lua_register".to_string(),
            routine_record: "luaL_reg".to_string(),
            routines_table: "bindings_routines".to_string(),
            constants_table: "bindings_constants".to_string(),
            register_routine: "register_bindings".to_string(),
            first_arg_index: 1,
        }
    }
}

impl RuntimeApi {
    /// Check that every configured name is usable as a C identifier.
    pub fn validate(&self) -> Result<(), InvalidIdentifierError> {
        let required = [
            ("state_type", &self.state_type),
            ("state_var", &self.state_var),
            ("state_getter", &self.state_getter),
            ("wrapper_prefix", &self.wrapper_prefix),
            ("push_handle", &self.push_handle),
            ("to_handle", &self.to_handle),
            ("call_function", &self.call_function),
            ("globals_index", &self.globals_index),
            ("register_function", &self.register_function),
            ("routine_record", &self.routine_record),
            ("routines_table", &self.routines_table),
            ("constants_table", &self.constants_table),
            ("register_routine", &self.register_routine),
        ];

        for (field, value) in required {
            if !is_c_identifier(value) {
                return Err(InvalidIdentifierError::new(field, value));
            }
        }

        // may be empty, but must still splice into an identifier
        if !self.handle_tag_prefix.is_empty() && !is_c_identifier(&self.handle_tag_prefix) {
            return Err(InvalidIdentifierError::new(
                "handle_tag_prefix",
                &self.handle_tag_prefix,
            ));
        }

        Ok(())
    }

    /// Parameter list of generated functions taking the state.
    pub fn state_param(&self) -> String {
        format!("{} *{}", self.state_type, self.state_var)
    }

    /// Export wrapper symbol for a function.
    pub fn wrapper_name(&self, function: &str) -> String {
        format!("{}{}", self.wrapper_prefix, function)
    }

    /// Handle tag for an opaque base type.
    pub fn handle_tag(&self, base: &str) -> String {
        format!("{}{}", self.handle_tag_prefix, base)
    }

    /// Record struct type of the constant table.
    pub fn constant_record(&self) -> String {
        format!("_{}", self.constants_table)
    }

    /// Stack index of the argument in slot `position` (0-based).
    pub fn arg_index(&self, position: usize) -> u64 {
        u64::from(self.first_arg_index) + position as u64
    }

    /// Statement pushing `value` of `category` onto the script stack.
    pub fn push_value(&self, category: &ScriptCategory, value: &str) -> Option<String> {
        let s = &self.state_var;
        let stmt = match category {
            ScriptCategory::Boolean => format!("lua_pushboolean({}, {});", s, value),
            ScriptCategory::Integer | ScriptCategory::Float | ScriptCategory::Double => {
                format!("lua_pushnumber({}, {});", s, value)
            }
            ScriptCategory::String => format!("lua_pushstring({}, {});", s, value),
            ScriptCategory::Opaque(base) if !base.is_empty() => format!(
                "{}({}, {}, {});",
                self.push_handle,
                s,
                self.handle_tag(base),
                value
            ),
            ScriptCategory::Opaque(_) => return None,
        };
        Some(stmt)
    }

    /// Expression reading the stack slot `index` as `category`.
    pub fn fetch_value(&self, category: &ScriptCategory, index: &str) -> Option<String> {
        let s = &self.state_var;
        let expr = match category {
            ScriptCategory::Opaque(base) if !base.is_empty() => {
                format!("{}({}, {}, {})", self.to_handle, s, self.handle_tag(base), index)
            }
            ScriptCategory::Opaque(_) => return None,
            value => format!("lua_to{}({}, {})", value.runtime_kind()?, s, index),
        };
        Some(expr)
    }
}

/// Check whether a string is a valid C identifier.
pub fn is_c_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(RuntimeApi::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_identifier() {
        let api = RuntimeApi {
            routines_table: "bad name".to_string(),
            ..Default::default()
        };
        let err = api.validate().unwrap_err();
        assert_eq!(err.field, "routines_table");
        assert_eq!(err.value, "bad name");

        let api = RuntimeApi {
            handle_tag_prefix: String::new(),
            ..Default::default()
        };
        assert!(api.validate().is_ok());
    }

    #[test]
    fn test_is_c_identifier() {
        assert!(is_c_identifier("bind_"));
        assert!(is_c_identifier("_x1"));
        assert!(!is_c_identifier("1x"));
        assert!(!is_c_identifier(""));
        assert!(!is_c_identifier("a-b"));
    }

    #[test]
    fn test_push_and_fetch() {
        let api = RuntimeApi::default();
        assert_eq!(
            api.push_value(&ScriptCategory::Double, "return_value").unwrap(),
            "lua_pushnumber(L, return_value);"
        );
        assert_eq!(
            api.push_value(&ScriptCategory::Opaque("Sprite".into()), "return_value")
                .unwrap(),
            "push_userdata(L, Type_Sprite, return_value);"
        );
        assert!(api
            .push_value(&ScriptCategory::Opaque(String::new()), "x")
            .is_none());
        assert_eq!(
            api.fetch_value(&ScriptCategory::String, "-1").unwrap(),
            "lua_tostring(L, -1)"
        );
        assert_eq!(
            api.fetch_value(&ScriptCategory::Opaque("Curve".into()), "-1")
                .unwrap(),
            "to_userdata(L, Type_Curve, -1)"
        );
    }

    #[test]
    fn test_renamed_runtime_keeps_value_primitives() {
        let api = RuntimeApi {
            state_var: "S".to_string(),
            push_handle: "push_handle".to_string(),
            to_handle: "fetch_handle".to_string(),
            ..Default::default()
        };

        assert_eq!(
            api.push_value(&ScriptCategory::Double, "v").unwrap(),
            "lua_pushnumber(S, v);"
        );
        assert_eq!(
            api.fetch_value(&ScriptCategory::Boolean, "1").unwrap(),
            "lua_toboolean(S, 1)"
        );
        assert_eq!(
            api.fetch_value(&ScriptCategory::Opaque("Layer".into()), "1")
                .unwrap(),
            "fetch_handle(S, Type_Layer, 1)"
        );
    }

    #[test]
    fn test_arg_index() {
        let api = RuntimeApi::default();
        assert_eq!(api.arg_index(0), 1);

        let api = RuntimeApi {
            first_arg_index: 2,
            ..Default::default()
        };
        assert_eq!(api.arg_index(1), 3);
    }
}
