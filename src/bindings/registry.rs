//! Registration tables and the routine that installs them.
//!
//! Both tables are append-only and keep feed order. Entries are matched
//! positionally by the generated loop, so the order is part of the output
//! contract. Duplicate names are kept as separate entries.

use serde::Serialize;

use super::runtime::RuntimeApi;

/// Exported function names in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoutineTable {
    names: Vec<String>,
}

impl RoutineTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name.
    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Names in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// How many entries carry `name`.
    pub fn occurrences(&self, name: &str) -> usize {
        self.names.iter().filter(|n| *n == name).count()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Exported constant names in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConstantTable {
    names: Vec<String>,
}

impl ConstantTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name.
    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Names in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Emits the tables and the registration routine.
pub struct RegistrationEmitter<'a> {
    api: &'a RuntimeApi,
}

impl<'a> RegistrationEmitter<'a> {
    /// Create an emitter printing names through `api`.
    pub fn new(api: &'a RuntimeApi) -> Self {
        RegistrationEmitter { api }
    }

    /// `{ "name", wrapper }` entries closed by a null sentinel.
    pub fn routines_table(&self, routines: &RoutineTable) -> String {
        let api = self.api;
        let mut out = format!(
            "const {} {}[] = {{\n",
            api.routine_record, api.routines_table
        );
        for name in routines.iter() {
            out.push_str(&format!("  {{ \"{}\", {} }},\n", name, api.wrapper_name(name)));
        }
        out.push_str("  { NULL, NULL }\n};\n");
        out
    }

    /// `{ "NAME", NAME }` entries closed by a null sentinel.
    pub fn constants_table(&self, constants: &ConstantTable) -> String {
        let api = self.api;
        let mut out = format!(
            "struct {} {}[] = {{\n",
            api.constant_record(),
            api.constants_table
        );
        for name in constants.iter() {
            out.push_str(&format!("  {{ \"{}\", {} }},\n", name, name));
        }
        out.push_str("  { NULL, 0 }\n};\n");
        out
    }

    /// The routine installing every routine and constant as a global.
    pub fn register_routine(&self) -> String {
        let api = self.api;
        let s = &api.state_var;
        let routines = &api.routines_table;
        let constants = &api.constants_table;
        let align = " ".repeat(4 + api.register_function.len() + 1);

        let mut out = format!("void {}({})\n{{\n", api.register_routine, api.state_param());
        out.push_str("  int c;\n\n");
        out.push_str(&format!("  for (c=0; {}[c].name; c++)\n", routines));
        out.push_str(&format!("    {}({},\n", api.register_function, s));
        out.push_str(&format!("{}{}[c].name,\n", align, routines));
        out.push_str(&format!("{}{}[c].func);\n\n", align, routines));
        out.push_str(&format!("  for (c=0; {}[c].name; c++) {{\n", constants));
        out.push_str(&format!("    lua_pushnumber({}, {}[c].value);\n", s, constants));
        out.push_str(&format!("    lua_setglobal({}, {}[c].name);\n", s, constants));
        out.push_str("  }\n}\n");
        out
    }

    /// Both tables and the registration routine, blank-line separated.
    pub fn emit(&self, routines: &RoutineTable, constants: &ConstantTable) -> String {
        [
            self.routines_table(routines),
            self.constants_table(constants),
            self.register_routine(),
        ]
        .join("\n")
    }

    /// Forward declarations for the companion header.
    pub fn declarations(&self) -> String {
        let api = self.api;
        format!(
            "struct {record} {{\n  const char *name;\n  double value;\n}};\n\n\
             extern const {reg} {routines}[];\n\
             extern struct {record} {constants}[];\n\n\
             void {register}({state});\n",
            record = api.constant_record(),
            reg = api.routine_record,
            routines = api.routines_table,
            constants = api.constants_table,
            register = api.register_routine,
            state = api.state_param(),
        )
    }
}
