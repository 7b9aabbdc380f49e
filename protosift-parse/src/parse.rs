use crate::ast::{
    self, Enum, EnumValue, ExtendDeclaration, ExtensionRange, Field, Label, Message, Method,
    OptionValue, ProtoFile, Service, Type,
};
use crate::error::{ParseErrorKind, Span};
use crate::lex::{parse_int, Lexer, MAX_TAG};

#[cfg(test)]
mod tests;

pub(crate) fn parse_file(name: &str, source: &str) -> Result<ProtoFile, ParseErrorKind> {
    Parser::new(name, source).parse_file()
}

/// The nesting level a declaration appears at. Legalizes which constructs
/// are permitted where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    File,
    Message,
    Enum,
    Extend,
    Service,
    Rpc,
}

impl Context {
    fn permits_package(self) -> bool {
        self == Context::File
    }

    fn permits_import(self) -> bool {
        self == Context::File
    }

    fn permits_option(self) -> bool {
        !matches!(self, Context::Extend)
    }

    fn permits_type(self) -> bool {
        matches!(self, Context::File | Context::Message)
    }

    fn permits_service(self) -> bool {
        self == Context::File
    }

    fn permits_extend(self) -> bool {
        matches!(self, Context::File | Context::Message)
    }

    fn permits_extensions(self) -> bool {
        self == Context::Message
    }

    fn permits_field(self) -> bool {
        matches!(self, Context::Message | Context::Extend)
    }

    fn permits_rpc(self) -> bool {
        self == Context::Service
    }

    fn expected(self) -> &'static str {
        match self {
            Context::File => {
                "'enum', 'extend', 'import', 'message', 'option', 'package' or 'service'"
            }
            Context::Message => {
                "a field label, 'enum', 'extend', 'extensions', 'message' or 'option'"
            }
            Context::Enum => "'option' or an enum value",
            Context::Extend => "a field label",
            Context::Service => "'option' or 'rpc'",
            Context::Rpc => "'option'",
        }
    }
}

/// One parsed declaration, routed back to the enclosing body by the caller.
enum Declaration {
    Type(Type),
    Field(Field),
    EnumValue(EnumValue),
    Method(Method),
    Option(ast::Option),
    ExtensionRange(ExtensionRange),
    /// Consumed entirely by the parser: packages, imports, extends and
    /// stray semicolons.
    Handled,
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    file_name: String,
    package_name: std::option::Option<String>,
    package_span: std::option::Option<Span>,
    /// The dotted scope prefix of the current nesting level, with a
    /// trailing dot, or empty at top level of an unpackaged file.
    prefix: String,
    dependencies: Vec<String>,
    types: Vec<Type>,
    services: Vec<Service>,
    extend_declarations: Vec<ExtendDeclaration>,
    options: Vec<ast::Option>,
}

impl<'a> Parser<'a> {
    fn new(name: &str, source: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            file_name: name.to_owned(),
            package_name: None,
            package_span: None,
            prefix: String::new(),
            dependencies: Vec::new(),
            types: Vec::new(),
            services: Vec::new(),
            extend_declarations: Vec::new(),
            options: Vec::new(),
        }
    }

    fn parse_file(mut self) -> Result<ProtoFile, ParseErrorKind> {
        loop {
            let documentation = self.lexer.read_documentation()?;
            if self.lexer.at_eof() {
                break;
            }
            match self.read_declaration(Context::File, documentation)? {
                Declaration::Type(ty) => self.types.push(ty),
                Declaration::Option(option) => self.options.push(option),
                Declaration::Handled => {}
                _ => unreachable!("declaration not legal at file scope"),
            }
        }

        Ok(ProtoFile {
            file_name: self.file_name,
            package_name: self.package_name,
            dependencies: self.dependencies,
            types: self.types,
            services: self.services,
            extend_declarations: self.extend_declarations,
            options: self.options,
        })
    }

    fn read_declaration(
        &mut self,
        context: Context,
        documentation: String,
    ) -> Result<Declaration, ParseErrorKind> {
        if self.lexer.peek_char(context.expected())? == ';' {
            self.lexer.skip_char();
            return Ok(Declaration::Handled);
        }

        let (word, span) = self.lexer.read_word()?;
        match word {
            "package" if context.permits_package() => {
                self.read_package(span)?;
                Ok(Declaration::Handled)
            }
            "import" if context.permits_import() => {
                self.read_import()?;
                Ok(Declaration::Handled)
            }
            "option" if context.permits_option() => {
                let option = self.read_option('=')?;
                self.lexer.expect_char(';')?;
                Ok(Declaration::Option(option))
            }
            "message" if context.permits_type() => Ok(Declaration::Type(Type::Message(
                self.read_message(documentation)?,
            ))),
            "enum" if context.permits_type() => {
                Ok(Declaration::Type(Type::Enum(self.read_enum(documentation)?)))
            }
            "service" if context.permits_service() => {
                let service = self.read_service(documentation)?;
                self.services.push(service);
                Ok(Declaration::Handled)
            }
            "extend" if context.permits_extend() => {
                let extend = self.read_extend(documentation)?;
                self.extend_declarations.push(extend);
                Ok(Declaration::Handled)
            }
            "rpc" if context.permits_rpc() => {
                Ok(Declaration::Method(self.read_rpc(documentation)?))
            }
            "extensions" if context.permits_extensions() => {
                Ok(Declaration::ExtensionRange(self.read_extensions()?))
            }
            "required" if context.permits_field() => Ok(Declaration::Field(
                self.read_field(Label::Required, documentation)?,
            )),
            "optional" if context.permits_field() => Ok(Declaration::Field(
                self.read_field(Label::Optional, documentation)?,
            )),
            "repeated" if context.permits_field() => Ok(Declaration::Field(
                self.read_field(Label::Repeated, documentation)?,
            )),
            _ if context == Context::Enum => {
                Ok(Declaration::EnumValue(self.read_enum_value(
                    word.to_owned(),
                    documentation,
                )?))
            }
            _ => Err(ParseErrorKind::UnexpectedToken {
                expected: context.expected().to_owned(),
                found: word.to_owned(),
                span,
            }),
        }
    }

    fn read_package(&mut self, span: Span) -> Result<(), ParseErrorKind> {
        if let Some(first) = &self.package_span {
            return Err(ParseErrorKind::DuplicatePackage {
                first: first.clone(),
                second: span,
            });
        }
        let (name, _) = self.lexer.read_name()?;
        self.package_name = Some(name.to_owned());
        self.package_span = Some(span);
        self.prefix = format!("{}.", name);
        self.lexer.expect_char(';')
    }

    fn read_import(&mut self) -> Result<(), ParseErrorKind> {
        let path = if self.lexer.peek_char("an import path")? == '"' {
            self.lexer.read_quoted_string()?
        } else {
            self.lexer.read_word()?.0.to_owned()
        };
        self.dependencies.push(path);
        self.lexer.expect_char(';')
    }

    /// Reads a single option entry. The key/value separator is `=` at
    /// declaration level and `:` inside `{...}` literal maps.
    fn read_option(&mut self, key_value_separator: char) -> Result<ast::Option, ParseErrorKind> {
        let (name, _) = self.lexer.read_name()?;

        // Dotted-path shorthand: `(a.b).c = v` nests `c = v` under `a.b`.
        let sub_name = if self.lexer.peek_char(&format!("'{}'", key_value_separator))? == '.' {
            self.lexer.skip_char();
            Some(self.lexer.read_name()?.0.to_owned())
        } else {
            None
        };

        self.lexer.expect_char(key_value_separator)?;
        let value = self.read_option_value()?;

        Ok(match sub_name {
            Some(sub_name) => ast::Option {
                name: name.to_owned(),
                value: OptionValue::Option(Box::new(ast::Option {
                    name: sub_name,
                    value,
                })),
            },
            None => ast::Option {
                name: name.to_owned(),
                value,
            },
        })
    }

    fn read_option_value(&mut self) -> Result<OptionValue, ParseErrorKind> {
        match self.lexer.peek_char("an option value")? {
            '"' => Ok(OptionValue::String(self.lexer.read_quoted_string()?)),
            '{' => Ok(OptionValue::Map(self.read_map('{', '}', ':')?)),
            _ => Ok(OptionValue::String(self.lexer.read_word()?.0.to_owned())),
        }
    }

    /// Reads a delimited option map: `{...}` literal maps with `:`
    /// separators, or `[...]` bracketed field options with `=` separators.
    fn read_map(
        &mut self,
        open: char,
        close: char,
        key_value_separator: char,
    ) -> Result<Vec<ast::Option>, ParseErrorKind> {
        self.lexer.expect_char(open)?;
        let mut map: Vec<ast::Option> = Vec::new();
        loop {
            if self.lexer.peek_char(&format!("'{}'", close))? == close {
                self.lexer.skip_char();
                return Ok(map);
            }

            let option = self.read_option(key_value_separator)?;
            insert_option(&mut map, option);

            if self.lexer.peek_char(&format!("'{}'", close))? == ',' {
                self.lexer.skip_char();
            }
        }
    }

    fn read_message(&mut self, documentation: String) -> Result<Message, ParseErrorKind> {
        let (name, _) = self.lexer.read_word()?;
        let fully_qualified_name = format!("{}{}", self.prefix, name);
        let saved_prefix =
            std::mem::replace(&mut self.prefix, format!("{}.", fully_qualified_name));

        self.lexer.expect_char('{')?;
        let mut fields = Vec::new();
        let mut nested_types = Vec::new();
        let mut extension_ranges = Vec::new();
        let mut options = Vec::new();
        loop {
            let documentation = self.lexer.read_documentation()?;
            if self.lexer.peek_char("'}'")? == '}' {
                self.lexer.skip_char();
                break;
            }
            match self.read_declaration(Context::Message, documentation)? {
                Declaration::Field(field) => fields.push(field),
                Declaration::Type(ty) => nested_types.push(ty),
                Declaration::Option(option) => options.push(option),
                Declaration::ExtensionRange(range) => extension_ranges.push(range),
                Declaration::Handled => {}
                _ => unreachable!("declaration not legal in a message"),
            }
        }
        self.prefix = saved_prefix;

        Ok(Message {
            name: name.to_owned(),
            fully_qualified_name,
            documentation,
            fields,
            nested_types,
            extension_ranges,
            options,
        })
    }

    fn read_enum(&mut self, documentation: String) -> Result<Enum, ParseErrorKind> {
        let (name, _) = self.lexer.read_word()?;
        let fully_qualified_name = format!("{}{}", self.prefix, name);

        self.lexer.expect_char('{')?;
        let mut values = Vec::new();
        let mut options = Vec::new();
        loop {
            let documentation = self.lexer.read_documentation()?;
            if self.lexer.peek_char("'}'")? == '}' {
                self.lexer.skip_char();
                break;
            }
            match self.read_declaration(Context::Enum, documentation)? {
                Declaration::EnumValue(value) => values.push(value),
                Declaration::Option(option) => options.push(option),
                Declaration::Handled => {}
                _ => unreachable!("declaration not legal in an enum"),
            }
        }

        Ok(Enum {
            name: name.to_owned(),
            fully_qualified_name,
            documentation,
            values,
            options,
        })
    }

    fn read_enum_value(
        &mut self,
        name: String,
        documentation: String,
    ) -> Result<EnumValue, ParseErrorKind> {
        self.lexer.expect_char('=')?;
        let tag = self.lexer.read_int()?;
        let options = if self.lexer.peek_char("';'")? == '[' {
            self.read_map('[', ']', '=')?
        } else {
            Vec::new()
        };
        self.lexer.expect_char(';')?;
        Ok(EnumValue {
            name,
            tag,
            documentation,
            options,
        })
    }

    fn read_field(
        &mut self,
        label: Label,
        documentation: String,
    ) -> Result<Field, ParseErrorKind> {
        let (ty, _) = self.lexer.read_word()?;
        let (name, _) = self.lexer.read_word()?;
        self.lexer.expect_char('=')?;
        let tag = self.lexer.read_int()?;
        let options = if self.lexer.peek_char("';'")? == '[' {
            self.read_map('[', ']', '=')?
        } else {
            Vec::new()
        };
        self.lexer.expect_char(';')?;
        Ok(Field {
            label,
            ty: ty.to_owned(),
            name: name.to_owned(),
            tag,
            documentation,
            options,
        })
    }

    fn read_service(&mut self, documentation: String) -> Result<Service, ParseErrorKind> {
        let (name, _) = self.lexer.read_word()?;
        let fully_qualified_name = format!("{}{}", self.prefix, name);

        self.lexer.expect_char('{')?;
        let mut methods = Vec::new();
        let mut options = Vec::new();
        loop {
            let documentation = self.lexer.read_documentation()?;
            if self.lexer.peek_char("'}'")? == '}' {
                self.lexer.skip_char();
                break;
            }
            match self.read_declaration(Context::Service, documentation)? {
                Declaration::Method(method) => methods.push(method),
                Declaration::Option(option) => options.push(option),
                Declaration::Handled => {}
                _ => unreachable!("declaration not legal in a service"),
            }
        }

        Ok(Service {
            name: name.to_owned(),
            fully_qualified_name,
            documentation,
            options,
            methods,
        })
    }

    fn read_rpc(&mut self, documentation: String) -> Result<Method, ParseErrorKind> {
        let (name, _) = self.lexer.read_word()?;

        self.lexer.expect_char('(')?;
        let (request_type, _) = self.lexer.read_word()?;
        self.lexer.expect_char(')')?;

        let (returns, span) = self.lexer.read_word()?;
        if returns != "returns" {
            return Err(ParseErrorKind::UnexpectedToken {
                expected: "'returns'".to_owned(),
                found: returns.to_owned(),
                span,
            });
        }

        self.lexer.expect_char('(')?;
        let (response_type, _) = self.lexer.read_word()?;
        self.lexer.expect_char(')')?;

        let mut options = Vec::new();
        if self.lexer.peek_char("';'")? == '{' {
            self.lexer.skip_char();
            loop {
                let documentation = self.lexer.read_documentation()?;
                if self.lexer.peek_char("'}'")? == '}' {
                    self.lexer.skip_char();
                    break;
                }
                match self.read_declaration(Context::Rpc, documentation)? {
                    Declaration::Option(option) => options.push(option),
                    Declaration::Handled => {}
                    _ => unreachable!("declaration not legal in an rpc body"),
                }
            }
        } else {
            self.lexer.expect_char(';')?;
        }

        Ok(Method {
            name: name.to_owned(),
            documentation,
            request_type: request_type.to_owned(),
            response_type: response_type.to_owned(),
            options,
        })
    }

    fn read_extend(&mut self, documentation: String) -> Result<ExtendDeclaration, ParseErrorKind> {
        let (name, _) = self.lexer.read_name()?;
        // Placeholder until qualification resolves the real target.
        let fully_qualified_name = format!("{}{}", self.prefix, name);

        self.lexer.expect_char('{')?;
        let mut fields = Vec::new();
        loop {
            let documentation = self.lexer.read_documentation()?;
            if self.lexer.peek_char("'}'")? == '}' {
                self.lexer.skip_char();
                break;
            }
            match self.read_declaration(Context::Extend, documentation)? {
                Declaration::Field(field) => fields.push(field),
                Declaration::Handled => {}
                _ => unreachable!("declaration not legal in an extend body"),
            }
        }

        Ok(ExtendDeclaration {
            name: name.to_owned(),
            fully_qualified_name,
            documentation,
            fields,
        })
    }

    fn read_extensions(&mut self) -> Result<ExtensionRange, ParseErrorKind> {
        let start = self.lexer.read_int()?;
        let mut end = start;
        if self.lexer.peek_char("';'")? != ';' {
            let (word, span) = self.lexer.read_word()?;
            if word != "to" {
                return Err(ParseErrorKind::UnexpectedToken {
                    expected: "'to'".to_owned(),
                    found: word.to_owned(),
                    span,
                });
            }
            let (bound, span) = self.lexer.read_word()?;
            end = if bound == "max" {
                MAX_TAG
            } else {
                parse_int(bound, span)?
            };
        }
        self.lexer.expect_char(';')?;
        Ok(ExtensionRange { start, end })
    }
}

/// Appends an option entry to an ordered map, aggregating repeated keys
/// into a list value.
fn insert_option(map: &mut Vec<ast::Option>, option: ast::Option) {
    match map.iter_mut().find(|existing| existing.name == option.name) {
        None => map.push(option),
        Some(existing) => match &mut existing.value {
            OptionValue::List(items) => items.push(option.value),
            other => {
                let first = std::mem::replace(other, OptionValue::List(Vec::new()));
                if let OptionValue::List(items) = other {
                    items.push(first);
                    items.push(option.value);
                }
            }
        },
    }
}
