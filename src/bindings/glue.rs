//! Assembly of the generated artifacts.
//!
//! Three text files come out of a run:
//! - the glue source: argument macros, export wrappers, registration tables,
//!   the registration routine and the import stubs;
//! - the declarations header for the tables and the registration routine;
//! - the import header with one prototype per import stub.

use super::export::ExportOutput;
use super::import::ImportOutput;
use super::registry::RegistrationEmitter;
use super::runtime::RuntimeApi;

/// First line of every generated file.
pub const GENERATED_MARKER: &str = "/* Generated with scriptbind */";

const BANNER_WIDTH: usize = 72;

/// The generated artifacts, as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlueOutput {
    pub source: String,
    pub header: String,
    pub imports_header: String,
}

/// Assembles generator output into files.
pub struct GlueAssembler<'a> {
    api: &'a RuntimeApi,
    header_guard: String,
    imports_guard: String,
}

impl<'a> GlueAssembler<'a> {
    /// Create an assembler with guards derived from the default file names.
    pub fn new(api: &'a RuntimeApi) -> Self {
        GlueAssembler {
            api,
            header_guard: guard_for("genbinds.h"),
            imports_guard: guard_for("genimports.h"),
        }
    }

    /// Set the include guard of the declarations header.
    pub fn with_header_guard(mut self, guard: impl Into<String>) -> Self {
        self.header_guard = guard.into();
        self
    }

    /// Set the include guard of the import header.
    pub fn with_imports_guard(mut self, guard: impl Into<String>) -> Self {
        self.imports_guard = guard.into();
        self
    }

    /// Build all three artifacts.
    pub fn assemble(&self, export: &ExportOutput, import: &ImportOutput) -> GlueOutput {
        GlueOutput {
            source: self.source(export, import),
            header: self.header(),
            imports_header: self.imports_header(import),
        }
    }

    /// The glue source.
    pub fn source(&self, export: &ExportOutput, import: &ImportOutput) -> String {
        let api = self.api;
        let registration = RegistrationEmitter::new(api);

        let mut out = String::new();
        out.push_str(GENERATED_MARKER);
        out.push_str("\n\n");

        out.push_str(&banner(&format!("C -> {}", api.name)));
        out.push('\n');
        out.push_str(&self.macros());
        out.push('\n');
        out.push_str(&export.wrappers);
        out.push_str(&registration.emit(&export.routines, &export.constants));
        out.push('\n');

        out.push_str(&banner(&format!("{} -> C", api.name)));
        out.push('\n');
        out.push_str(&import.stubs);
        out
    }

    /// Argument extraction macros used by the export wrappers.
    ///
    /// `GetArg` accepts nil or the expected kind and returns 0 results from
    /// the enclosing wrapper on anything else.
    pub fn macros(&self) -> String {
        let api = self.api;
        let s = &api.state_var;

        let get_arg = vec![
            "#define GetArg(idx, var, cast, type)".to_string(),
            format!("  if (lua_isnil({s}, idx) || lua_is##type({s}, idx))"),
            format!("    var = (cast)lua_to##type({s}, idx);"),
            "  else".to_string(),
            "    return 0;".to_string(),
        ];
        let get_ud = vec![
            "#define GetUD(idx, var, type)".to_string(),
            format!(
                "  var = {}({s}, {}##type, idx);",
                api.to_handle, api.handle_tag_prefix
            ),
        ];

        let width = get_arg
            .iter()
            .chain(get_ud.iter())
            .map(String::len)
            .max()
            .unwrap_or(0);

        format!(
            "{}\n{}",
            continued_macro(&get_arg, width),
            continued_macro(&get_ud, width)
        )
    }

    /// The declarations header.
    pub fn header(&self) -> String {
        let decls = RegistrationEmitter::new(self.api).declarations();
        guarded(&self.header_guard, &decls)
    }

    /// The import header.
    pub fn imports_header(&self, import: &ImportOutput) -> String {
        guarded(&self.imports_guard, &import.prototypes)
    }
}

/// Include guard derived from a file name, e.g. `genbinds.h` -> `GENBINDS_H`.
pub fn guard_for(file_name: &str) -> String {
    let guard: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();

    if guard.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", guard)
    } else {
        guard
    }
}

fn banner(title: &str) -> String {
    let rule = format!("/*{}*/", "=".repeat(BANNER_WIDTH - 4));
    let title = format!("/* {:<width$} */", title, width = BANNER_WIDTH - 6);
    format!("{rule}\n{title}\n{rule}\n")
}

/// Join macro lines with aligned `\` continuations and a trailing blank line.
fn continued_macro(lines: &[String], width: usize) -> String {
    let mut out = String::new();
    let last = lines.len().saturating_sub(1);

    for (idx, line) in lines.iter().enumerate() {
        if idx == last {
            out.push_str(line);
        } else {
            out.push_str(&format!("{:<width$} \\", line, width = width));
        }
        out.push('\n');
    }
    out
}

fn guarded(guard: &str, body: &str) -> String {
    let mut out = format!("{}\n\n#ifndef {guard}\n#define {guard}\n\n", GENERATED_MARKER);
    out.push_str(body);
    if !body.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("#endif /* {guard} */\n"));
    out
}
