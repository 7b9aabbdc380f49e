use std::collections::HashSet;

use protosift_parse::ast::{
    ExtendDeclaration, Field, Message, Method, ProtoFile, Service, Type,
};

use crate::error::{Error, ErrorKind};

/// The built-in scalar types, which resolve without lookup.
const SCALAR_TYPES: &[&str] = &[
    "bool", "bytes", "double", "fixed32", "fixed64", "float", "int32", "int64", "sfixed32",
    "sfixed64", "sint32", "sint64", "string", "uint32", "uint64",
];

pub(crate) fn is_scalar(name: &str) -> bool {
    SCALAR_TYPES.contains(&name)
}

/// Resolves `type_name`, as written in a declaration at `scope`, to a
/// fully qualified name from `all_types`.
///
/// Scalar type names and names that already appear in `all_types` verbatim
/// resolve to themselves. A name with a leading dot is absolute and must
/// match after the dot is stripped. Any other name is searched for in
/// `scope`, then in each enclosing scope in turn, innermost first.
///
/// `scope` is the fully qualified name of the enclosing declaration, such
/// as `squareup.wire.Person` for a field of that message, or the package
/// name for a top-level declaration.
pub fn resolve_type(
    all_types: &HashSet<String>,
    scope: &str,
    type_name: &str,
) -> Result<String, Error> {
    if is_scalar(type_name) || all_types.contains(type_name) {
        return Ok(type_name.to_owned());
    }

    if let Some(absolute) = type_name.strip_prefix('.') {
        if all_types.contains(absolute) {
            return Ok(absolute.to_owned());
        }
        return Err(unknown_type(type_name, scope));
    }

    let mut search = scope;
    while !search.is_empty() {
        let candidate = format!("{}.{}", search, type_name);
        if all_types.contains(&candidate) {
            return Ok(candidate);
        }

        match search.rfind('.') {
            Some(index) => search = &search[..index],
            None => break,
        }
    }

    Err(unknown_type(type_name, scope))
}

fn unknown_type(name: &str, scope: &str) -> Error {
    Error::from_kind(ErrorKind::UnknownType {
        name: name.to_owned(),
        scope: scope.to_owned(),
    })
}

/// Rewrites every type reference in `files` to its fully qualified form.
pub(crate) fn fully_qualify(
    files: &[ProtoFile],
    all_types: &HashSet<String>,
) -> Result<Vec<ProtoFile>, Error> {
    files
        .iter()
        .map(|file| qualify_file(file, all_types))
        .collect()
}

fn qualify_file(file: &ProtoFile, all_types: &HashSet<String>) -> Result<ProtoFile, Error> {
    Ok(ProtoFile {
        types: file
            .types
            .iter()
            .map(|ty| qualify_type(ty, all_types))
            .collect::<Result<_, _>>()?,
        services: file
            .services
            .iter()
            .map(|service| qualify_service(service, all_types))
            .collect::<Result<_, _>>()?,
        extend_declarations: file
            .extend_declarations
            .iter()
            .map(|extend| qualify_extend(extend, all_types))
            .collect::<Result<_, _>>()?,
        ..file.clone()
    })
}

fn qualify_type(ty: &Type, all_types: &HashSet<String>) -> Result<Type, Error> {
    match ty {
        Type::Message(message) => Ok(Type::Message(Message {
            fields: message
                .fields
                .iter()
                .map(|field| qualify_field(field, all_types, &message.fully_qualified_name))
                .collect::<Result<_, _>>()?,
            nested_types: message
                .nested_types
                .iter()
                .map(|nested| qualify_type(nested, all_types))
                .collect::<Result<_, _>>()?,
            ..message.clone()
        })),
        // enum values carry no type references
        Type::Enum(_) => Ok(ty.clone()),
    }
}

fn qualify_field(
    field: &Field,
    all_types: &HashSet<String>,
    scope: &str,
) -> Result<Field, Error> {
    Ok(Field {
        ty: resolve_type(all_types, scope, &field.ty)?,
        ..field.clone()
    })
}

fn qualify_service(service: &Service, all_types: &HashSet<String>) -> Result<Service, Error> {
    let scope = &service.fully_qualified_name;
    Ok(Service {
        methods: service
            .methods
            .iter()
            .map(|method| {
                Ok(Method {
                    request_type: resolve_type(all_types, scope, &method.request_type)?,
                    response_type: resolve_type(all_types, scope, &method.response_type)?,
                    ..method.clone()
                })
            })
            .collect::<Result<_, Error>>()?,
        ..service.clone()
    })
}

fn qualify_extend(
    extend: &ExtendDeclaration,
    all_types: &HashSet<String>,
) -> Result<ExtendDeclaration, Error> {
    // The scope the declaration appeared in is its provisional name with
    // the target name stripped off the end.
    let scope = extend
        .fully_qualified_name
        .strip_suffix(&extend.name)
        .unwrap_or("")
        .trim_end_matches('.');

    Ok(ExtendDeclaration {
        fully_qualified_name: resolve_type(all_types, scope, &extend.name)?,
        fields: extend
            .fields
            .iter()
            .map(|field| qualify_field(field, all_types, scope))
            .collect::<Result<_, _>>()?,
        ..extend.clone()
    })
}
