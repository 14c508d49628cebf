//! CLI integration tests for scriptbind.
//!
//! These tests run the binary against feed files in a temporary directory.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const EXPORTS: &str = "\
/* functions exposed to scripts */
#define SCREEN_W
#define SCREEN_H

double MAX (double x, double y);
double rand (double min, double max); /* CODE */
bool file_exists (char *filename);
Layer *GetLayer (Sprite *sprite, int index);
void RemoveLayer (void);
";

const IMPORTS: &str = "\
void MaskAll (void);
int CountLayers (Sprite *sprite);
";

const MALFORMED: &str = "\
void before (void);
typedef int Handle;
void after (void);
";

/// Get the scriptbind binary command.
fn scriptbind() -> Command {
    Command::cargo_bin("scriptbind").unwrap()
}

/// Create a temporary directory holding the standard feeds.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("export.h"), EXPORTS).unwrap();
    fs::write(tmp.path().join("import.h"), IMPORTS).unwrap();
    fs::write(tmp.path().join("broken.h"), MALFORMED).unwrap();
    tmp
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

// ============================================================================
// scriptbind generate
// ============================================================================

#[test]
fn test_generate_writes_all_artifacts() {
    let tmp = project();

    scriptbind()
        .args(["generate", "--exports", "export.h", "--imports", "import.h", "--out-dir", "gen"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let gen = tmp.path().join("gen");
    let source = read(&gen, "genbinds.c");
    assert!(source.starts_with("/* Generated with scriptbind */\n"));
    assert!(source.contains("static int bind_MAX(lua_State *L)\n"));
    assert!(source.contains("  GetUD(1, sprite, Sprite);\n  GetArg(2, index, int, number);\n"));
    assert!(source.contains("  GetArg(1, filename, const char *, string);\n"));
    assert!(source.contains("  { \"SCREEN_W\", SCREEN_W },\n  { \"SCREEN_H\", SCREEN_H },\n  { NULL, 0 }\n"));
    assert!(source.contains("void register_bindings(lua_State *L)\n"));
    assert!(source.contains("int CountLayers(Sprite *sprite)\n"));

    let header = read(&gen, "genbinds.h");
    assert!(header.contains("#ifndef GENBINDS_H\n"));
    assert!(header.contains("extern const luaL_reg bindings_routines[];\n"));

    let imports = read(&gen, "genimports.h");
    assert!(imports.contains("void MaskAll(void);\nint CountLayers(Sprite *sprite);\n"));
}

#[test]
fn test_generate_code_entries_are_registered_only() {
    let tmp = project();

    scriptbind()
        .args(["generate", "-e", "export.h", "-o", "gen"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let source = read(&tmp.path().join("gen"), "genbinds.c");
    assert!(!source.contains("static int bind_rand("));
    assert_eq!(source.matches("{ \"rand\", bind_rand },").count(), 1);
}

#[test]
fn test_generate_twice_is_fresh_and_identical() {
    let tmp = project();
    let args = ["generate", "-e", "export.h", "-i", "import.h", "-o", "gen"];

    scriptbind().args(args).current_dir(tmp.path()).assert().success();
    let first = fs::read(tmp.path().join("gen/genbinds.c")).unwrap();

    scriptbind()
        .args(args)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Fresh"))
        .stderr(predicate::str::contains("Created").not());
    let second = fs::read(tmp.path().join("gen/genbinds.c")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_generate_dry_run_writes_nothing() {
    let tmp = project();

    scriptbind()
        .args(["generate", "-e", "export.h", "-o", "gen", "--dry-run"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("would write"));

    assert!(!tmp.path().join("gen").exists());
}

#[test]
fn test_generate_skipped_lines_warn() {
    let tmp = project();

    scriptbind()
        .args(["generate", "-e", "broken.h", "-o", "gen"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 feed line(s) skipped"));

    let source = read(&tmp.path().join("gen"), "genbinds.c");
    assert!(source.contains("bind_before"));
    assert!(source.contains("bind_after"));
}

#[test]
fn test_generate_strict_fails_without_writing() {
    let tmp = project();

    scriptbind()
        .args(["generate", "-e", "broken.h", "-o", "gen", "--strict"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("were skipped"));

    assert!(!tmp.path().join("gen").exists());
}

#[test]
fn test_generate_strict_from_config() {
    let tmp = project();
    fs::write(tmp.path().join("scriptbind.toml"), "[generate]\nstrict = true\n").unwrap();

    scriptbind()
        .args(["generate", "-e", "broken.h", "-o", "gen"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn test_generate_uses_config_names() {
    let tmp = project();
    fs::write(
        tmp.path().join("bindings.toml"),
        r#"
[output]
source = "luabinds.c"

[runtime]
wrapper_prefix = "lua_"
"#,
    )
    .unwrap();

    scriptbind()
        .args(["generate", "-e", "export.h", "-o", "gen", "--config", "bindings.toml"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let source = read(&tmp.path().join("gen"), "luabinds.c");
    assert!(source.contains("static int lua_MAX(lua_State *L)"));
}

#[test]
fn test_generate_missing_config_file() {
    let tmp = project();

    scriptbind()
        .args(["generate", "-e", "export.h", "--config", "nope.toml"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_generate_missing_feed() {
    let tmp = project();

    scriptbind()
        .args(["generate", "-e", "missing.h", "-o", "gen"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read feed"));
}

#[test]
fn test_generate_non_utf8_feed_still_generates() {
    let tmp = project();
    fs::write(
        tmp.path().join("latin1.h"),
        b"/* funci\xf3n */\ndouble MAX (double x, double y);\n",
    )
    .unwrap();

    scriptbind()
        .args(["generate", "-e", "latin1.h", "-o", "gen"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let source = read(&tmp.path().join("gen"), "genbinds.c");
    assert!(source.contains("static int bind_MAX(lua_State *L)\n"));
}

#[test]
fn test_errors_reported_in_quiet_mode() {
    let tmp = project();

    scriptbind()
        .args(["--quiet", "--color", "never", "generate", "-e", "missing.h", "-o", "gen"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: failed to read feed"));
}

#[test]
fn test_errors_reported_as_json_event() {
    let tmp = project();

    scriptbind()
        .args(["generate", "-e", "missing.h", "--message-format", "json"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"reason\":\"error\""))
        .stdout(predicate::str::contains("failed to read feed"));
}

#[test]
fn test_generate_json_output() {
    let tmp = project();

    scriptbind()
        .args(["generate", "-e", "export.h", "-o", "gen", "--message-format", "json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reason\":\"generate-finished\""))
        .stdout(predicate::str::contains("\"status\":\"written\""));
}

// ============================================================================
// scriptbind check
// ============================================================================

#[test]
fn test_check_clean_feed() {
    let tmp = project();

    scriptbind()
        .args(["check", "export.h", "import.h"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 skipped line(s)"));
}

#[test]
fn test_check_reports_skipped_line() {
    let tmp = project();

    scriptbind()
        .args(["check", "broken.h", "--color", "never"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: skipped line: unrecognized declaration"))
        .stderr(predicate::str::contains("broken.h:2"))
        .stderr(predicate::str::contains("typedef int Handle;"));
}

#[test]
fn test_check_strict_fails() {
    let tmp = project();

    scriptbind()
        .args(["check", "broken.h", "--strict"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("were skipped"));
}

#[test]
fn test_check_quiet_prints_nothing() {
    let tmp = project();

    scriptbind()
        .args(["--quiet", "check", "broken.h"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// ============================================================================
// scriptbind completions
// ============================================================================

#[test]
fn test_completions_bash() {
    scriptbind()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scriptbind"));
}
