use std::collections::{HashMap, HashSet};

use protosift_parse::ast::{Message, ProtoFile, Type};

use crate::{
    error::{Error, ErrorKind},
    qualify::is_scalar,
};

/// Narrows `files` to the given root types and services plus everything
/// they transitively reference.
///
/// A kept nested type pulls in its enclosing types, so the declaration
/// tree stays intact. Files left with no declarations are dropped
/// entirely. Expects type references to be fully qualified; run
/// [`Schema::fully_qualify`](crate::Schema::fully_qualify) first.
pub(crate) fn retain_roots(
    files: &[ProtoFile],
    roots: impl IntoIterator<Item = impl AsRef<str>>,
) -> Result<Vec<ProtoFile>, Error> {
    let graph = Graph::build(files);
    let marked = graph.mark(roots)?;

    let mut result = Vec::new();
    for file in files {
        let types: Vec<Type> = file
            .types
            .iter()
            .filter_map(|ty| retain_type(ty, &marked))
            .collect();
        let services = file
            .services
            .iter()
            .filter(|service| marked.contains(service.fully_qualified_name.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        let extend_declarations = file
            .extend_declarations
            .iter()
            .filter(|extend| marked.contains(extend.fully_qualified_name.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        if types.is_empty() && services.is_empty() && extend_declarations.is_empty() {
            continue;
        }

        result.push(ProtoFile {
            types,
            services,
            extend_declarations,
            ..file.clone()
        });
    }

    Ok(result)
}

fn retain_type(ty: &Type, marked: &HashSet<&str>) -> Option<Type> {
    if !marked.contains(ty.fully_qualified_name()) {
        return None;
    }

    match ty {
        Type::Message(message) => Some(Type::Message(Message {
            nested_types: message
                .nested_types
                .iter()
                .filter_map(|nested| retain_type(nested, marked))
                .collect(),
            ..message.clone()
        })),
        Type::Enum(_) => Some(ty.clone()),
    }
}

/// The reference graph over every type and service declaration.
///
/// Each node records its enclosing declaration, if any, and the names it
/// references. Extension fields contribute their references to the node of
/// the type they extend.
struct Graph {
    nodes: Vec<Node>,
    ids: HashMap<String, usize>,
}

struct Node {
    name: String,
    parent: Option<usize>,
    references: Vec<String>,
}

impl Graph {
    fn build(files: &[ProtoFile]) -> Graph {
        let mut graph = Graph {
            nodes: Vec::new(),
            ids: HashMap::new(),
        };

        for file in files {
            for ty in &file.types {
                graph.add_type(ty, None);
            }
            for service in &file.services {
                let references = service
                    .methods
                    .iter()
                    .flat_map(|method| {
                        [method.request_type.clone(), method.response_type.clone()]
                    })
                    .filter(|name| !is_scalar(name))
                    .collect();
                graph.add_node(service.fully_qualified_name.clone(), None, references);
            }
        }

        // Extension fields are declared away from the type they belong to.
        // All nodes must exist before their references can be attached.
        for file in files {
            for extend in &file.extend_declarations {
                if let Some(&id) = graph.ids.get(&extend.fully_qualified_name) {
                    graph.nodes[id].references.extend(
                        extend
                            .fields
                            .iter()
                            .map(|field| field.ty.clone())
                            .filter(|name| !is_scalar(name)),
                    );
                }
            }
        }

        graph
    }

    fn add_type(&mut self, ty: &Type, parent: Option<usize>) {
        let references = match ty {
            Type::Message(message) => message
                .fields
                .iter()
                .map(|field| field.ty.clone())
                .filter(|name| !is_scalar(name))
                .collect(),
            Type::Enum(_) => Vec::new(),
        };

        let id = self.add_node(ty.fully_qualified_name().to_owned(), parent, references);
        for nested in ty.nested_types() {
            self.add_type(nested, Some(id));
        }
    }

    fn add_node(&mut self, name: String, parent: Option<usize>, references: Vec<String>) -> usize {
        let id = self.nodes.len();
        self.ids.insert(name.clone(), id);
        self.nodes.push(Node {
            name,
            parent,
            references,
        });
        id
    }

    /// Marks the nodes for `roots` and everything reachable from them,
    /// following references and enclosing declarations. Reference cycles
    /// terminate because each node is visited at most once.
    fn mark(&self, roots: impl IntoIterator<Item = impl AsRef<str>>) -> Result<HashSet<&str>, Error> {
        let mut worklist = Vec::new();
        for root in roots {
            let root = root.as_ref();
            match self.ids.get(root) {
                Some(&id) => worklist.push(id),
                None => {
                    return Err(Error::from_kind(ErrorKind::UnknownRoot {
                        name: root.to_owned(),
                    }))
                }
            }
        }

        let mut marked = HashSet::new();
        while let Some(id) = worklist.pop() {
            let node = &self.nodes[id];
            if !marked.insert(node.name.as_str()) {
                continue;
            }

            if let Some(parent) = node.parent {
                worklist.push(parent);
            }
            for reference in &node.references {
                match self.ids.get(reference) {
                    Some(&target) => worklist.push(target),
                    None => {
                        return Err(Error::from_kind(ErrorKind::UnknownType {
                            name: reference.clone(),
                            scope: node.name.clone(),
                        }))
                    }
                }
            }
        }

        Ok(marked)
    }
}

#[cfg(test)]
mod tests;
