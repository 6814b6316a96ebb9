//! End-to-end resolution conformance over on-disk fixture trees.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use templar::{resolve, ErrorCategory};

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Base + child pair from the reference scenario: base declares OBJECTIVE
/// and goal_section; child extends it with CONSTRAINTS and intro_section.
fn seed_scenario(dir: &Path) {
    write(
        dir,
        "base.yaml",
        r#"
metadata:
  title: Base
  version: "1.0.0"
placeholders:
  OBJECTIVE:
    type: string
    required: true
template:
  goal_section: "Describe the goal."
"#,
    );
    write(
        dir,
        "child.yaml",
        r#"
extends: base.yaml
metadata:
  title: Child
placeholders:
  CONSTRAINTS:
    type: array
    items: string
    required: true
template:
  intro_section: "Specialized intro."
"#,
    );
}

#[test]
fn single_template_without_inheritance() {
    let dir = TempDir::new().unwrap();
    seed_scenario(dir.path());

    let resolved = resolve("base.yaml", dir.path()).unwrap();
    assert_eq!(resolved.placeholder_names(), ["OBJECTIVE"]);
    assert_eq!(resolved.template["goal_section"], "Describe the goal.");
}

#[test]
fn two_level_inheritance_scenario() {
    let dir = TempDir::new().unwrap();
    seed_scenario(dir.path());

    let resolved = resolve("child.yaml", dir.path()).unwrap();

    // Placeholders: inherited plus the child's own.
    assert_eq!(resolved.placeholder_names(), ["OBJECTIVE", "CONSTRAINTS"]);
    assert_eq!(resolved.placeholders["OBJECTIVE"]["required"], true);
    assert_eq!(resolved.placeholders["CONSTRAINTS"]["items"], "string");

    // Sections: goal_section inherited, intro_section from the child.
    assert_eq!(resolved.template["goal_section"], "Describe the goal.");
    assert_eq!(resolved.template["intro_section"], "Specialized intro.");

    // Metadata: child wins on collision, ancestor values survive.
    assert_eq!(resolved.metadata["title"], "Child");
    assert_eq!(resolved.metadata["version"], "1.0.0");

    // No inheritance metadata remains.
    let value = serde_json::to_value(&resolved).unwrap();
    assert!(value.get("extends").is_none());
}

#[test]
fn repeated_resolution_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    seed_scenario(dir.path());

    let first = resolve("child.yaml", dir.path()).unwrap();
    let second = resolve("child.yaml", dir.path()).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn result_keys_are_exactly_the_content_fields() {
    let dir = TempDir::new().unwrap();
    seed_scenario(dir.path());

    let resolved = resolve("child.yaml", dir.path()).unwrap();
    let value = serde_json::to_value(&resolved).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["metadata", "placeholders", "template"]);
}

#[test]
fn merged_sections_carry_no_control_tags() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.yaml", "template:\n  a: \"Old.\"\n  b: \"Gone.\"\n");
    write(
        dir.path(),
        "child.yaml",
        r#"
extends: base.yaml
template:
  a:
    override: true
    text: "New."
  b:
    remove: true
"#,
    );

    let resolved = resolve("child.yaml", dir.path()).unwrap();
    assert_eq!(resolved.template["a"], "New.");
    assert!(resolved.template.get("b").is_none());

    let rendered = serde_json::to_string(&resolved).unwrap();
    assert!(!rendered.contains("override"));
    assert!(!rendered.contains("remove"));
}

#[test]
fn circular_inheritance_two_nodes() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yaml", "extends: b.yaml\n");
    write(dir.path(), "b.yaml", "extends: a.yaml\n");

    let err = resolve("a.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::CircularInheritance);
}

#[test]
fn circular_inheritance_three_nodes() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yaml", "extends: b.yaml\n");
    write(dir.path(), "b.yaml", "extends: c.yaml\n");
    write(dir.path(), "c.yaml", "extends: a.yaml\n");

    let err = resolve("a.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::CircularInheritance);
}

#[test]
fn placeholder_type_change_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "base.yaml",
        "placeholders:\n  P:\n    type: string\n    required: true\n",
    );
    write(
        dir.path(),
        "child.yaml",
        "extends: base.yaml\nplaceholders:\n  P:\n    type: object\n",
    );

    let err = resolve("child.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::TypeConflict);
}

#[test]
fn required_cannot_be_weakened() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "base.yaml",
        "placeholders:\n  P:\n    type: string\n    required: true\n",
    );
    write(
        dir.path(),
        "child.yaml",
        "extends: base.yaml\nplaceholders:\n  P:\n    type: string\n    required: false\n",
    );

    let err = resolve("child.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ConstraintWeakening);
}

#[test]
fn required_survives_omission_and_restatement() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "base.yaml",
        "placeholders:\n  P:\n    type: string\n    required: true\n",
    );
    write(
        dir.path(),
        "omits.yaml",
        "extends: base.yaml\nplaceholders:\n  P:\n    type: string\n    description: refined\n",
    );
    write(
        dir.path(),
        "restates.yaml",
        "extends: base.yaml\nplaceholders:\n  P:\n    type: string\n    required: true\n",
    );

    for reference in ["omits.yaml", "restates.yaml"] {
        let resolved = resolve(reference, dir.path()).unwrap();
        assert_eq!(resolved.placeholders["P"]["required"], true);
    }
}

#[test]
fn ancestor_section_never_mentioned_is_unchanged() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "base.yaml",
        "template:\n  untouched: \"Exactly this.\"\n",
    );
    write(dir.path(), "child.yaml", "extends: base.yaml\ntemplate:\n  own: \"Mine.\"\n");

    let resolved = resolve("child.yaml", dir.path()).unwrap();
    assert_eq!(resolved.template["untouched"], "Exactly this.");
}

#[test]
fn plain_redeclaration_does_not_replace_ancestor_section() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.yaml", "template:\n  s: \"Ancestor.\"\n");
    write(
        dir.path(),
        "child.yaml",
        "extends: base.yaml\ntemplate:\n  s: \"Descendant without override.\"\n",
    );

    let resolved = resolve("child.yaml", dir.path()).unwrap();
    assert_eq!(resolved.template["s"], "Ancestor.");
}

#[test]
fn deep_chain_merges_base_first() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.yaml", "metadata:\n  tier: base\n  keep: base\n");
    write(
        dir.path(),
        "mid.yaml",
        "extends: base.yaml\nmetadata:\n  tier: mid\n",
    );
    write(
        dir.path(),
        "leaf.yaml",
        "extends: mid.yaml\nmetadata:\n  tier: leaf\n",
    );

    let resolved = resolve("leaf.yaml", dir.path()).unwrap();
    assert_eq!(resolved.metadata["tier"], "leaf");
    assert_eq!(resolved.metadata["keep"], "base");
}

#[test]
fn relative_extends_resolve_against_each_document() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "shared/base.yaml", "template:\n  root: \"From shared.\"\n");
    write(
        dir.path(),
        "prompts/deploy/child.yaml",
        "extends: ../../shared/base.yaml\ntemplate:\n  own: \"Own.\"\n",
    );

    let resolved = resolve("prompts/deploy/child.yaml", dir.path()).unwrap();
    assert_eq!(resolved.template["root"], "From shared.");
}

#[test]
fn unknown_top_level_field_rejected() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "bad.yaml",
        "metadata: {}\nexecution:\n  model: some-model\n",
    );

    let err = resolve("bad.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::UnknownField);
}

#[test]
fn legacy_parent_keys_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.yaml", "metadata: {}\n");
    write(dir.path(), "inherits.yaml", "inherits: base.yaml\n");
    write(
        dir.path(),
        "parent_ref.yaml",
        "parentRef: base.yaml\n",
    );

    for reference in ["inherits.yaml", "parent_ref.yaml"] {
        let err = resolve(reference, dir.path()).unwrap_err();
        assert_eq!(err.category, ErrorCategory::UnsupportedInheritanceKey);
    }
}

#[test]
fn extends_must_be_a_non_empty_string() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "empty.yaml", "extends: \"\"\n");
    write(
        dir.path(),
        "object.yaml",
        "extends:\n  templateRef: base.yaml\n",
    );

    for reference in ["empty.yaml", "object.yaml"] {
        let err = resolve(reference, dir.path()).unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidExtendsFormat);
    }
}

#[test]
fn missing_template_not_found() {
    let dir = TempDir::new().unwrap();
    let err = resolve("ghost.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::TemplateNotFound);
    assert_eq!(err.template_ref.as_deref(), Some("ghost.yaml"));
}

#[test]
fn non_mapping_root_is_invalid() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "scalar.yaml", "just a string\n");

    let err = resolve("scalar.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::InvalidTemplate);
}

#[test]
fn malformed_yaml_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.yaml", "metadata: [not, closed\n");

    let err = resolve("broken.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::LoadError);
}

#[test]
fn first_violation_in_an_ancestor_aborts() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.yaml", "temperature: 0.2\n");
    write(dir.path(), "child.yaml", "extends: base.yaml\nmetadata: {}\n");

    let err = resolve("child.yaml", dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::UnknownField);
    assert_eq!(err.template_ref.as_deref(), Some("base.yaml"));
}
