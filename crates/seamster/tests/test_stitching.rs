#![allow(clippy::disallowed_methods)]

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use seamster::{SourceMap, StitchRequest, map_path, stitch, stitch_to_disk};
use tempfile::TempDir;

/// A small project in the shape stitching was made for: two modules that
/// attach to the namespace, and an init file that calls into them.
fn project(dir: &TempDir) -> (Vec<PathBuf>, PathBuf) {
    let app = dir.path().join("app");
    let modules = app.join("modules");
    fs::create_dir_all(&modules).unwrap();

    let a = modules.join("a.js");
    fs::write(&a, "app.a = 'a';\n").unwrap();
    let b = modules.join("b.js");
    fs::write(&b, "app.b = function() {\n  app.bWasCalled = true;\n};\n").unwrap();
    let init = app.join("init.js");
    fs::write(&init, "app.b();\n").unwrap();

    (vec![a, b, init], app.join("bundle.js"))
}

#[test]
fn test_stitch_produces_expected_bundle() {
    let dir = TempDir::new().unwrap();
    let (files, destination) = project(&dir);
    let request = StitchRequest::new("app", files, destination).with_expose(true);

    let bundle = stitch(&request).unwrap();

    let expected = r#"(function() {
  var app = {}; typeof module != "undefined" && module.exports ? module.exports = app : window.app = app;
  (function() {
    app.a = 'a';
  })();
  (function() {
    app.b = function() {
      app.bWasCalled = true;
    };
  })();
  (function() {
    app.b();
  })();
})();
//# sourceMappingURL=bundle.js.map"#;
    assert_eq!(bundle.text, expected);

    let map = bundle.source_map.unwrap();
    assert_eq!(map.version, 3);
    assert_eq!(map.sources, vec!["modules/a.js", "modules/b.js", "init.js"]);
    assert_eq!(map.mappings, ";;;AAAA;;;ACAA;AACA;AACA;;;ACFA");
    assert!(map.names.is_empty());
}

#[test]
fn test_every_mapped_line_round_trips() {
    let dir = TempDir::new().unwrap();
    let (files, destination) = project(&dir);
    let request = StitchRequest::new("app", files.clone(), destination).with_expose(true);

    let bundle = stitch(&request).unwrap();
    let map = bundle.source_map.unwrap();
    let decoded = map.decode_mappings();
    assert_eq!(decoded.len(), 5, "one mapping per content line");

    // Each generated line must carry the same statement as the original
    // line it maps to, modulo the wrapper indentation.
    for mapping in decoded {
        let generated = bundle
            .text
            .lines()
            .nth(mapping.generated_line as usize - 1)
            .unwrap();
        let source = &map.sources[mapping.source as usize];
        let original_file = files
            .iter()
            .find(|file| file.ends_with(source))
            .unwrap_or_else(|| panic!("no fixture for source `{source}`"));
        let content = fs::read_to_string(original_file).unwrap();
        let original = content.lines().nth(mapping.original_line as usize - 1).unwrap();

        assert_eq!(generated.trim_start(), original.trim_start());
    }

    let location = map.lookup(4).unwrap();
    assert_eq!(location.source, "modules/a.js");
    assert_eq!(location.line, 1);
}

#[test]
fn test_artifacts_are_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let (files, destination) = project(&dir);
    let request = StitchRequest::new("app", files, destination.clone());

    let bundle = stitch_to_disk(&request).unwrap();

    assert_eq!(fs::read_to_string(&destination).unwrap(), bundle.text);

    let written = fs::read_to_string(map_path(&destination)).unwrap();
    let parsed = SourceMap::from_json(&written).unwrap();
    assert_eq!(Some(parsed), bundle.source_map);
    assert!(
        written.starts_with("{\"version\":3,\"sources\":"),
        "map artifact should be compact JSON: {written}"
    );
}

#[test]
fn test_empty_module_keeps_line_accounting() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.js");
    fs::write(&a, "app.a = 1;\n").unwrap();
    let empty = dir.path().join("empty.js");
    fs::write(&empty, "").unwrap();
    let c = dir.path().join("c.js");
    fs::write(&c, "app.c = 3;\n").unwrap();

    let request = StitchRequest::new(
        "app",
        vec![a, empty, c],
        dir.path().join("bundle.js"),
    );
    let bundle = stitch(&request).unwrap();
    let map = bundle.source_map.unwrap();

    let generated: Vec<(u32, u32)> = map
        .decode_mappings()
        .iter()
        .map(|mapping| (mapping.source, mapping.generated_line))
        .collect();
    assert_eq!(generated, vec![(0, 4), (1, 7), (2, 10)]);

    // The empty module still occupies a scope of its own; its single mapped
    // line is the blank one inside it.
    let line = bundle.text.lines().nth(6).unwrap();
    assert_eq!(line, "    ");
}

#[test]
fn test_destination_directories_are_created() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.js");
    fs::write(&a, "lib.a = 1;\n").unwrap();
    let destination = dir.path().join("deep/out/js/bundle.js");

    let request = StitchRequest::new("lib", vec![a], destination.clone());
    stitch_to_disk(&request).unwrap();

    assert!(destination.is_file());
    assert!(map_path(&destination).is_file());

    // The reference climbs back out of the destination directory.
    let map = SourceMap::from_json(&fs::read_to_string(map_path(&destination)).unwrap()).unwrap();
    assert_eq!(map.sources, vec!["../../../a.js"]);
}

#[test]
fn test_parent_segments_in_destination_resolve_before_mapping() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    let a = src.join("a.js");
    fs::write(&a, "lib.a = 1;\n").unwrap();

    // Spelled through `dist/..`, the destination directory is really `out`;
    // the recorded reference must climb from there, not from `dist/../out`.
    let destination = dir.path().join("dist/../out/bundle.js");
    let request = StitchRequest::new("lib", vec![a], destination);

    let map = stitch(&request).unwrap().source_map.unwrap();
    assert_eq!(map.sources, vec!["../src/a.js"]);
}

#[test]
fn test_source_map_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let (files, destination) = project(&dir);
    let request = StitchRequest::new("app", files, destination.clone()).with_source_map(false);

    let bundle = stitch_to_disk(&request).unwrap();

    assert!(bundle.source_map.is_none());
    assert!(!bundle.text.contains("sourceMappingURL"));
    assert!(!map_path(&destination).exists());
}

#[test]
fn test_namespace_is_not_exposed_by_default() {
    let dir = TempDir::new().unwrap();
    let (files, destination) = project(&dir);
    let request = StitchRequest::new("app", files, destination);

    let bundle = stitch(&request).unwrap();
    assert_eq!(bundle.text.lines().nth(1).unwrap(), "  var app = {};");
}

#[test]
fn test_stitching_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let (files, destination) = project(&dir);
    let request = StitchRequest::new("app", files, destination).with_expose(true);

    let first = stitch(&request).unwrap();
    let second = stitch(&request).unwrap();

    assert_eq!(first.text, second.text);
    assert_eq!(first.source_map, second.source_map);
}
