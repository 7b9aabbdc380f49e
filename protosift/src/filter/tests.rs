use super::*;

fn filter(sources: &[(&str, &str)], roots: &[&str]) -> Vec<ProtoFile> {
    let files: Vec<ProtoFile> = sources
        .iter()
        .map(|(name, source)| protosift_parse::parse(name, source).unwrap())
        .collect();
    crate::Schema { files }
        .fully_qualify()
        .unwrap()
        .retain_roots(roots.iter().copied())
        .unwrap()
        .files
}

fn type_names(files: &[ProtoFile]) -> Vec<String> {
    fn walk(ty: &Type, out: &mut Vec<String>) {
        out.push(ty.fully_qualified_name().to_owned());
        for nested in ty.nested_types() {
            walk(nested, out);
        }
    }

    let mut names = Vec::new();
    for file in files {
        for ty in &file.types {
            walk(ty, &mut names);
        }
    }
    names.sort();
    names
}

#[test]
fn retain_transitive_references() {
    let files = filter(
        &[(
            "one.proto",
            r#"
            package wire;

            message A { optional B b = 1; }
            message B { optional C c = 1; }
            message C {}
            message Unrelated {}
            "#,
        )],
        &["wire.A"],
    );

    assert_eq!(type_names(&files), ["wire.A", "wire.B", "wire.C"]);
}

#[test]
fn retain_pulls_in_enclosing_types() {
    let files = filter(
        &[(
            "one.proto",
            r#"
            package wire;

            message Outer {
                message Inner {}
                message Other {}
            }
            message A { optional Outer.Inner i = 1; }
            "#,
        )],
        &["wire.A"],
    );

    // keeping Inner keeps Outer, but not its unreferenced siblings
    assert_eq!(type_names(&files), ["wire.A", "wire.Outer", "wire.Outer.Inner"]);
}

#[test]
fn retain_tolerates_cycles() {
    let files = filter(
        &[(
            "one.proto",
            r#"
            package wire;

            message A { optional B b = 1; }
            message B { optional A a = 1; }
            "#,
        )],
        &["wire.A"],
    );

    assert_eq!(type_names(&files), ["wire.A", "wire.B"]);
}

#[test]
fn retain_service_root() {
    let files = filter(
        &[(
            "one.proto",
            r#"
            package wire;

            message Request { optional Payload p = 1; }
            message Response {}
            message Payload {}
            message Unrelated {}

            service Lookup {
                rpc Call (Request) returns (Response);
            }
            "#,
        )],
        &["wire.Lookup"],
    );

    assert_eq!(
        type_names(&files),
        ["wire.Payload", "wire.Request", "wire.Response"]
    );
    assert_eq!(files[0].services.len(), 1);
}

#[test]
fn retain_drops_empty_files() {
    let files = filter(
        &[
            (
                "one.proto",
                r#"import "two.proto"; package wire; message A { optional other.B b = 1; }"#,
            ),
            ("two.proto", "package other; message B {}"),
            ("three.proto", "package unused; message C {}"),
        ],
        &["wire.A"],
    );

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].file_name, "one.proto");
    assert_eq!(files[1].file_name, "two.proto");
}

#[test]
fn retain_extension_references() {
    let files = filter(
        &[(
            "one.proto",
            r#"
            package wire;

            message Target {}
            message Extra {}
            message Unrelated {}

            extend Target {
                optional Extra extra = 100;
            }
            "#,
        )],
        &["wire.Target"],
    );

    // extensions ride with the type they extend
    assert_eq!(type_names(&files), ["wire.Extra", "wire.Target"]);
    assert_eq!(files[0].extend_declarations.len(), 1);
}

#[test]
fn retain_drops_extensions_of_unmarked_types() {
    let files = filter(
        &[(
            "one.proto",
            r#"
            package wire;

            message A {}
            message Target {}

            extend Target {
                optional int32 extra = 100;
            }
            "#,
        )],
        &["wire.A"],
    );

    assert_eq!(type_names(&files), ["wire.A"]);
    assert!(files[0].extend_declarations.is_empty());
}

#[test]
fn retain_unknown_root() {
    let files: Vec<ProtoFile> =
        vec![protosift_parse::parse("one.proto", "package wire; message A {}").unwrap()];

    let err = crate::Schema { files }
        .fully_qualify()
        .unwrap()
        .retain_roots(["wire.Missing"])
        .unwrap_err();
    assert_eq!(format!("{}", err), "unknown type 'wire.Missing'");
}
