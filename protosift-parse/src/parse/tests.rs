use super::*;
use crate::ast;
use crate::error::ParseErrorKind;
use crate::lex::MAX_TAG;

fn parse(source: &str) -> ProtoFile {
    crate::parse("test.proto", source).unwrap()
}

fn parse_err(source: &str) -> ParseErrorKind {
    crate::parse("test.proto", source).unwrap_err().into_inner()
}

fn string_option(name: &str, value: &str) -> ast::Option {
    ast::Option {
        name: name.to_owned(),
        value: OptionValue::String(value.to_owned()),
    }
}

fn type_names(file: &ProtoFile) -> Vec<String> {
    fn walk(ty: &Type, out: &mut Vec<String>) {
        out.push(ty.fully_qualified_name().to_owned());
        for nested in ty.nested_types() {
            walk(nested, out);
        }
    }

    let mut names = Vec::new();
    for ty in &file.types {
        walk(ty, &mut names);
    }
    names.sort();
    names
}

#[test]
fn parse_empty_file() {
    let file = parse("");
    assert_eq!(file.file_name, "test.proto");
    assert_eq!(file.package_name, None);
    assert!(file.types.is_empty());
    assert!(file.services.is_empty());
    assert!(file.extend_declarations.is_empty());
    assert!(file.options.is_empty());
}

#[test]
fn parse_file_header() {
    let file = parse(
        r#"
        package squareup.wire;

        import "common/base.proto";
        import other.proto;
        option java_package = "com.squareup.wire";
        "#,
    );
    assert_eq!(file.package_name.as_deref(), Some("squareup.wire"));
    assert_eq!(file.dependencies, ["common/base.proto", "other.proto"]);
    assert_eq!(
        file.options,
        [string_option("java_package", "com.squareup.wire")]
    );
}

#[test]
fn parse_message() {
    let file = parse(
        r#"
        package wire;

        // A person.
        message Person {
            // The name.
            required string name = 1;
            optional int32 id = 2 [default = 0, deprecated = true];
            repeated PhoneNumber phone = 3;

            extensions 500 to max;

            option (squareup.redacted) = true;

            message PhoneNumber {
                optional string number = 1;
            }
            enum PhoneType {
                MOBILE = 0;
            }
        }
        "#,
    );

    assert_eq!(
        file.types,
        [Type::Message(Message {
            name: "Person".to_owned(),
            fully_qualified_name: "wire.Person".to_owned(),
            documentation: "A person.".to_owned(),
            fields: vec![
                Field {
                    label: Label::Required,
                    ty: "string".to_owned(),
                    name: "name".to_owned(),
                    tag: 1,
                    documentation: "The name.".to_owned(),
                    options: vec![],
                },
                Field {
                    label: Label::Optional,
                    ty: "int32".to_owned(),
                    name: "id".to_owned(),
                    tag: 2,
                    documentation: String::new(),
                    options: vec![
                        string_option("default", "0"),
                        string_option("deprecated", "true"),
                    ],
                },
                Field {
                    label: Label::Repeated,
                    ty: "PhoneNumber".to_owned(),
                    name: "phone".to_owned(),
                    tag: 3,
                    documentation: String::new(),
                    options: vec![],
                },
            ],
            nested_types: vec![
                Type::Message(Message {
                    name: "PhoneNumber".to_owned(),
                    fully_qualified_name: "wire.Person.PhoneNumber".to_owned(),
                    documentation: String::new(),
                    fields: vec![Field {
                        label: Label::Optional,
                        ty: "string".to_owned(),
                        name: "number".to_owned(),
                        tag: 1,
                        documentation: String::new(),
                        options: vec![],
                    }],
                    nested_types: vec![],
                    extension_ranges: vec![],
                    options: vec![],
                }),
                Type::Enum(Enum {
                    name: "PhoneType".to_owned(),
                    fully_qualified_name: "wire.Person.PhoneType".to_owned(),
                    documentation: String::new(),
                    values: vec![EnumValue {
                        name: "MOBILE".to_owned(),
                        tag: 0,
                        documentation: String::new(),
                        options: vec![],
                    }],
                    options: vec![],
                }),
            ],
            extension_ranges: vec![ExtensionRange {
                start: 500,
                end: MAX_TAG,
            }],
            options: vec![string_option("squareup.redacted", "true")],
        })]
    );
}

#[test]
fn nested_type_naming() {
    let file = parse("package wire; message Person { enum PhoneType {} message PhoneNumber {} }");
    assert_eq!(
        type_names(&file),
        ["wire.Person", "wire.Person.PhoneNumber", "wire.Person.PhoneType"]
    );
}

#[test]
fn parse_enum() {
    let file = parse(
        r#"
        enum Status {
            option allow_alias = true;
            ACTIVE = 0x01;
            RETIRED = -1 [(label) = "old"];
        }
        "#,
    );
    assert_eq!(
        file.types,
        [Type::Enum(Enum {
            name: "Status".to_owned(),
            fully_qualified_name: "Status".to_owned(),
            documentation: String::new(),
            values: vec![
                EnumValue {
                    name: "ACTIVE".to_owned(),
                    tag: 1,
                    documentation: String::new(),
                    options: vec![],
                },
                EnumValue {
                    name: "RETIRED".to_owned(),
                    tag: -1,
                    documentation: String::new(),
                    options: vec![string_option("label", "old")],
                },
            ],
            options: vec![string_option("allow_alias", "true")],
        })]
    );
}

#[test]
fn parse_service() {
    let file = parse(
        r#"
        package wire;

        service PhoneService {
            option default_timeout = 30;
            // Finds a phone record.
            rpc Lookup (LookupRequest) returns (LookupResponse);
            rpc Update (UpdateRequest) returns (UpdateResponse) {
                option transport = "json";
            }
        }
        "#,
    );
    assert_eq!(
        file.services,
        [Service {
            name: "PhoneService".to_owned(),
            fully_qualified_name: "wire.PhoneService".to_owned(),
            documentation: String::new(),
            options: vec![string_option("default_timeout", "30")],
            methods: vec![
                Method {
                    name: "Lookup".to_owned(),
                    documentation: "Finds a phone record.".to_owned(),
                    request_type: "LookupRequest".to_owned(),
                    response_type: "LookupResponse".to_owned(),
                    options: vec![],
                },
                Method {
                    name: "Update".to_owned(),
                    documentation: String::new(),
                    request_type: "UpdateRequest".to_owned(),
                    response_type: "UpdateResponse".to_owned(),
                    options: vec![string_option("transport", "json")],
                },
            ],
        }]
    );
}

#[test]
fn parse_extend() {
    let file = parse(
        r#"
        package wire;

        extend Foo {
            optional int32 bar = 126;
        }

        message M {
            extend Bar {
                optional string baz = 127;
            }
        }
        "#,
    );
    assert_eq!(file.extend_declarations.len(), 2);
    assert_eq!(file.extend_declarations[0].name, "Foo");
    assert_eq!(file.extend_declarations[0].fully_qualified_name, "wire.Foo");
    assert_eq!(file.extend_declarations[0].fields.len(), 1);
    assert_eq!(file.extend_declarations[1].name, "Bar");
    assert_eq!(file.extend_declarations[1].fully_qualified_name, "wire.M.Bar");
}

#[test]
fn parse_option_forms() {
    let file = parse(r#"option (a.b).c = "v";"#);
    assert_eq!(
        file.options,
        [ast::Option {
            name: "a.b".to_owned(),
            value: OptionValue::Option(Box::new(string_option("c", "v"))),
        }]
    );

    let file = parse(r#"option opts = { deadline: 15.0, tags: "x", tags: "y", sub: { k: v } };"#);
    assert_eq!(
        file.options,
        [ast::Option {
            name: "opts".to_owned(),
            value: OptionValue::Map(vec![
                string_option("deadline", "15.0"),
                ast::Option {
                    name: "tags".to_owned(),
                    value: OptionValue::List(vec![
                        OptionValue::String("x".to_owned()),
                        OptionValue::String("y".to_owned()),
                    ]),
                },
                ast::Option {
                    name: "sub".to_owned(),
                    value: OptionValue::Map(vec![string_option("k", "v")]),
                },
            ]),
        }]
    );
}

#[test]
fn stray_semicolons() {
    let file = parse("message A { ; optional int32 x = 1; ; } ;");
    match &file.types[0] {
        Type::Message(message) => assert_eq!(message.fields.len(), 1),
        Type::Enum(_) => panic!("expected a message"),
    }
}

#[test]
fn documentation_association() {
    let file = parse("// about A\nmessage A {}\nmessage B {}");
    match (&file.types[0], &file.types[1]) {
        (Type::Message(a), Type::Message(b)) => {
            assert_eq!(a.documentation, "about A");
            assert_eq!(b.documentation, "");
        }
        _ => panic!("expected two messages"),
    }
}

#[test]
fn duplicate_package() {
    assert_eq!(
        parse_err("package a; package b;"),
        ParseErrorKind::DuplicatePackage {
            first: 0..7,
            second: 11..18,
        }
    );
}

#[test]
fn package_not_allowed_in_message() {
    assert_eq!(
        parse_err("message A { package foo; }"),
        ParseErrorKind::UnexpectedToken {
            expected: "a field label, 'enum', 'extend', 'extensions', 'message' or 'option'"
                .to_owned(),
            found: "package".to_owned(),
            span: 12..19,
        }
    );
}

#[test]
fn rpc_requires_returns() {
    assert_eq!(
        parse_err("service S { rpc A (B) replies (C); }"),
        ParseErrorKind::UnexpectedToken {
            expected: "'returns'".to_owned(),
            found: "replies".to_owned(),
            span: 22..29,
        }
    );
}

#[test]
fn unclosed_message() {
    assert_eq!(
        parse_err("message A {"),
        ParseErrorKind::UnexpectedEof {
            expected: "'}'".to_owned(),
        }
    );
}

#[test]
fn invalid_field_tag() {
    assert_eq!(
        parse_err("message A { optional int32 x = abc; }"),
        ParseErrorKind::InvalidIntLiteral {
            value: "abc".to_owned(),
            span: 31..34,
        }
    );
}

#[test]
fn error_debug_format() {
    let err = crate::parse("test.proto", "message A { package foo; }").unwrap_err();
    assert_eq!(
        format!("{:?}", err),
        "test.proto:1:13: expected a field label, 'enum', 'extend', 'extensions', 'message' or \
         'option', but found 'package'"
    );
}
