use assert_fs::{prelude::*, TempDir};

fn write(dir: &TempDir, path: &str, source: &str) {
    dir.child(path).write_str(source).unwrap();
}

#[test]
fn compile_from_disk() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "wire/person.proto",
        r#"
        import "wire/address.proto";

        package squareup.wire;

        // An individual.
        message Person {
            required string name = 1;
            optional Address address = 2;
        }
        "#,
    );
    write(
        &dir,
        "wire/address.proto",
        r#"
        package squareup.wire;

        message Address {
            optional string street = 1;
        }
        "#,
    );

    let schema = protosift::compile(["wire/person.proto"], [dir.path()]).unwrap();

    assert_eq!(
        schema.type_names(),
        ["squareup.wire.Address", "squareup.wire.Person"]
    );

    let person = &schema.files[0].types[0];
    match person {
        protosift::ast::Type::Message(message) => {
            assert_eq!(message.fields[1].ty, "squareup.wire.Address");
            assert_eq!(message.documentation, "An individual.");
        }
        protosift::ast::Type::Enum(_) => panic!("expected a message"),
    }
}

#[test]
fn compile_and_retain_roots() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "service.proto",
        r#"
        package wire;

        message LookupRequest { optional Query query = 1; }
        message LookupResponse {}
        message Query {}
        message Unrelated {}

        service PhoneService {
            rpc Lookup (LookupRequest) returns (LookupResponse);
        }
        "#,
    );

    let schema = protosift::compile(["service.proto"], [dir.path()])
        .unwrap()
        .retain_roots(["wire.PhoneService"])
        .unwrap();

    assert_eq!(
        schema.type_names(),
        ["wire.LookupRequest", "wire.LookupResponse", "wire.Query"]
    );
    assert_eq!(schema.files[0].services.len(), 1);
}

#[test]
fn compile_missing_import() {
    let dir = TempDir::new().unwrap();
    write(&dir, "one.proto", r#"import "missing.proto";"#);

    let err = protosift::compile(["one.proto"], [dir.path()]).unwrap_err();
    assert!(err.is_file_not_found());
}
