//! Second pass: recover declarations from the token stream
//!
//! The extractor never builds expression or statement trees. It matches
//! declaration keywords at a known brace depth and uses the depth
//! annotations from the lexer to find where each construct ends, so a
//! malformed construct can be skipped without losing its siblings.

use crate::lexer::{parse_integer_literal, Token, TokenKind};
use crate::types::TypeParser;
use ast::{
    ConstantDecl, ContractKind, ContractUnit, Diagnostic, DiagnosticKind, ElementaryType, EnumDecl,
    ErrorDecl, EventDecl, FunctionDecl, Parameter, SourceUnit, SpecialFunction, StateMutability,
    StateVariableGetter, StructDecl, StructField, TypeRef, UserTypeDecl, Visibility,
};
use std::path::Path;

const DATA_LOCATIONS: &[&str] = &["memory", "storage", "calldata"];
const STATE_VARIABLE_ATTRIBUTES: &[&str] = &[
    "public",
    "private",
    "internal",
    "constant",
    "immutable",
    "override",
    "transient",
];

/// Where declarations found by the member parsers are stored
enum Scope<'u> {
    File,
    Contract(&'u mut ContractUnit),
}

pub struct Extractor<'t, 'src> {
    source: &'src str,
    tokens: &'t [Token<'src>],
    pos: usize,
    unit: SourceUnit,
}

impl<'t, 'src> Extractor<'t, 'src> {
    pub fn new(source: &'src str, tokens: &'t [Token<'src>], path: &Path) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            unit: SourceUnit::new(path),
        }
    }

    /// Walk the whole token stream and return the populated source unit
    pub fn extract(mut self) -> SourceUnit {
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Ident => self.parse_top_level_item(token),
                TokenKind::Punct(';') => self.pos += 1,
                _ => {
                    self.warn(
                        DiagnosticKind::MalformedDeclaration,
                        token,
                        format!("unexpected '{}' at file level", token.text),
                    );
                    self.skip_to_next_item(token.brace_depth);
                }
            }
        }

        tracing::debug!(
            "Extracted {} contracts from {}",
            self.unit.contracts.len(),
            self.unit.path.display()
        );
        self.unit
    }

    fn parse_top_level_item(&mut self, token: &'t Token<'src>) {
        match token.text {
            "pragma" => self.parse_pragma(),
            "import" => self.parse_import(),
            "contract" => self.parse_contract(ContractKind::Contract),
            "interface" => self.parse_contract(ContractKind::Interface),
            "library" => self.parse_contract(ContractKind::Library),
            "abstract" if self.peek_at(1).is_some_and(|t| t.is_keyword("contract")) => {
                self.pos += 1;
                self.parse_contract(ContractKind::Abstract);
            }
            "function" => {
                self.unit.free_function_count += 1;
                self.pos += 1;
                self.skip_construct(token.brace_depth, token.paren_depth);
            }
            "using" => {
                self.pos += 1;
                self.skip_construct(token.brace_depth, token.paren_depth);
            }
            _ => self.parse_member(&mut Scope::File),
        }
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn current(&self) -> &'t Token<'src> {
        let tokens: &'t [Token<'src>] = self.tokens;
        &tokens[self.pos]
    }

    fn peek(&self) -> Option<&'t Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&'t Token<'src>> {
        self.tokens.get(self.pos + ahead)
    }

    fn next(&mut self) -> Option<&'t Token<'src>> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn next_ident(&mut self) -> Option<&'t Token<'src>> {
        match self.peek() {
            Some(token) if token.is_ident() => self.next(),
            _ => None,
        }
    }

    fn warn(&mut self, kind: DiagnosticKind, token: &Token<'_>, message: String) {
        tracing::debug!("{}:{}: {}", self.unit.path.display(), token.line, message);
        let diagnostic = Diagnostic::new(kind, message)
            .in_file(&self.unit.path)
            .at_line(token.line);
        self.unit.diagnostics.push(diagnostic);
    }

    /// Skip to the end of the construct that started at `depth`: the `;` at
    /// that depth, or the `}` closing a body opened at that depth. Stops in
    /// front of a `}` belonging to an enclosing scope.
    fn skip_construct(&mut self, depth: u32, paren_depth: u32) {
        while let Some(token) = self.peek() {
            if token.is_punct('}') && token.brace_depth < depth {
                return;
            }
            self.pos += 1;
            let at_level = token.brace_depth == depth && token.paren_depth == paren_depth;
            if at_level && (token.is_punct(';') || token.is_punct('}')) {
                return;
            }
        }
    }

    /// Skip stray tokens up to the next identifier that can start an item at
    /// `depth`, or the `}` closing the enclosing scope
    fn skip_to_next_item(&mut self, depth: u32) {
        self.pos += 1;
        while let Some(token) = self.peek() {
            let starts_item = token.is_ident() && token.brace_depth == depth && token.paren_depth == 0;
            let closes_scope = token.is_punct('}') && token.brace_depth < depth;
            if starts_item || closes_scope {
                return;
            }
            self.pos += 1;
        }
    }

    /// Consume a balanced `( ... )` group and return the tokens inside it.
    /// Hitting a brace or semicolon before the closer means the group is
    /// unbalanced.
    fn take_parens(&mut self) -> Result<&'t [Token<'src>], String> {
        let open = match self.peek() {
            Some(token) if token.is_punct('(') => token,
            Some(token) => return Err(format!("expected '(', found '{}'", token.text)),
            None => return Err("expected '(', found end of input".to_string()),
        };
        let tokens: &'t [Token<'src>] = self.tokens;
        let start = self.pos + 1;
        let mut index = start;
        while let Some(token) = tokens.get(index) {
            if token.is_punct(')') && token.paren_depth == open.paren_depth {
                self.pos = index + 1;
                return Ok(&tokens[start..index]);
            }
            if token.is_punct(';') || token.is_punct('{') || token.is_punct('}') {
                break;
            }
            index += 1;
        }
        Err("unbalanced parentheses".to_string())
    }

    /// Consume a balanced `{ ... }` group and return the tokens inside it
    fn take_braces(&mut self) -> Result<&'t [Token<'src>], String> {
        let open = match self.peek() {
            Some(token) if token.is_punct('{') => token,
            Some(token) => return Err(format!("expected '{{', found '{}'", token.text)),
            None => return Err("expected '{', found end of input".to_string()),
        };
        let tokens: &'t [Token<'src>] = self.tokens;
        let start = self.pos + 1;
        for index in start..tokens.len() {
            let token = &tokens[index];
            if token.is_punct('}') && token.brace_depth == open.brace_depth {
                self.pos = index + 1;
                return Ok(&tokens[start..index]);
            }
        }
        Err("unclosed '{'".to_string())
    }

    /// Record a malformed construct and resynchronise after it
    fn malformed(&mut self, start: &'t Token<'src>, what: &str, reason: String) {
        self.warn(
            DiagnosticKind::MalformedDeclaration,
            start,
            format!("skipping malformed {}: {}", what, reason),
        );
        if self.pos <= self.index_of(start) {
            self.pos = self.index_of(start) + 1;
        }
        self.skip_construct(start.brace_depth, start.paren_depth);
    }

    fn index_of(&self, token: &Token<'_>) -> usize {
        self.tokens
            .iter()
            .position(|t| t.start == token.start)
            .unwrap_or(self.pos)
    }

    // ------------------------------------------------------------------
    // File level
    // ------------------------------------------------------------------

    fn parse_pragma(&mut self) {
        let start = self.current();
        self.pos += 1;
        let text_start = self.peek().map(|t| t.start).unwrap_or(start.end);
        let mut text_end = text_start;
        while let Some(token) = self.next() {
            if token.is_punct(';') {
                let text = self.source[text_start..text_end.max(text_start)].trim();
                self.unit.pragmas.push(text.to_string());
                return;
            }
            text_end = token.end;
        }
        self.warn(
            DiagnosticKind::MalformedDeclaration,
            start,
            "pragma without terminating ';'".to_string(),
        );
    }

    fn parse_import(&mut self) {
        let start = self.current();
        self.pos += 1;
        let mut path = None;
        while let Some(token) = self.peek() {
            if token.is_punct('}') && token.brace_depth < start.brace_depth {
                break;
            }
            self.pos += 1;
            if token.kind == TokenKind::StringLit && path.is_none() {
                path = Some(token.text.to_string());
            }
            if token.is_punct(';') && token.brace_depth == start.brace_depth {
                break;
            }
        }
        match path {
            Some(path) => self.unit.imports.push(path),
            None => self.warn(
                DiagnosticKind::MalformedDeclaration,
                start,
                "import without a path".to_string(),
            ),
        }
    }

    fn parse_contract(&mut self, kind: ContractKind) {
        let start = self.current();
        self.pos += 1;

        let name = match self.next_ident() {
            Some(name) => name.text,
            None => {
                self.malformed(start, "contract", "missing name".to_string());
                return;
            }
        };
        let mut contract = ContractUnit::new(name, kind, start.position());

        if self.peek().is_some_and(|t| t.is_keyword("is")) {
            self.pos += 1;
            if let Err(reason) = self.parse_base_list(&mut contract) {
                self.malformed(start, "contract", format!("{} in inheritance list of {}", reason, name));
                return;
            }
        }

        let open = match self.peek() {
            Some(token) if token.is_punct('{') => token,
            _ => {
                self.malformed(start, "contract", format!("missing body for {}", name));
                return;
            }
        };
        self.pos += 1;
        let body_depth = open.brace_depth + 1;

        loop {
            let Some(token) = self.peek() else {
                self.warn(
                    DiagnosticKind::MalformedDeclaration,
                    start,
                    format!("body of {} is not closed before end of file", name),
                );
                break;
            };

            if token.is_punct('}') && token.brace_depth < body_depth {
                self.pos += 1;
                break;
            }

            match token.kind {
                TokenKind::Ident => self.parse_contract_member(&mut contract, token),
                TokenKind::Punct(';') => self.pos += 1,
                _ => {
                    self.warn(
                        DiagnosticKind::MalformedDeclaration,
                        token,
                        format!("unexpected '{}' in body of {}", token.text, name),
                    );
                    self.skip_to_next_item(body_depth);
                }
            }
        }

        self.unit.contracts.push(contract);
    }

    fn parse_base_list(&mut self, contract: &mut ContractUnit) -> Result<(), String> {
        loop {
            let first = self
                .next_ident()
                .ok_or_else(|| "expected base contract name".to_string())?;
            let mut base = first.text.to_string();
            while self.peek().is_some_and(|t| t.is_punct('.')) {
                self.pos += 1;
                let segment = self
                    .next_ident()
                    .ok_or_else(|| "incomplete qualified base name".to_string())?;
                base.push('.');
                base.push_str(segment.text);
            }
            if self.peek().is_some_and(|t| t.is_punct('(')) {
                self.take_parens()?;
            }
            contract.bases.push(base);

            match self.peek() {
                Some(token) if token.is_punct(',') => self.pos += 1,
                _ => return Ok(()),
            }
        }
    }

    // ------------------------------------------------------------------
    // Contract members
    // ------------------------------------------------------------------

    fn parse_contract_member(&mut self, contract: &mut ContractUnit, token: &'t Token<'src>) {
        match token.text {
            "function" => self.parse_function(contract),
            "constructor" => self.parse_special(contract, SpecialFunction::Constructor),
            "fallback" => self.parse_special(contract, SpecialFunction::Fallback),
            "receive" => self.parse_special(contract, SpecialFunction::Receive),
            "modifier" => {
                contract.modifier_count += 1;
                self.pos += 1;
                self.skip_construct(token.brace_depth, token.paren_depth);
            }
            "using" => {
                self.pos += 1;
                self.skip_construct(token.brace_depth, token.paren_depth);
            }
            _ => self.parse_member(&mut Scope::Contract(contract)),
        }
    }

    fn parse_special(&mut self, contract: &mut ContractUnit, special: SpecialFunction) {
        let start = self.current();
        contract.special_functions.push(special);
        self.pos += 1;
        self.skip_construct(start.brace_depth, start.paren_depth);
    }

    /// Members that may appear both inside contracts and at file level
    fn parse_member(&mut self, scope: &mut Scope<'_>) {
        let token = self.current();
        match token.text {
            "event" => {
                if let Some(event) = self.parse_event() {
                    match scope {
                        Scope::File => self.unit.events.push(event),
                        Scope::Contract(contract) => contract.events.push(event),
                    }
                }
            }
            "error" if self.peek_at(2).is_some_and(|t| t.is_punct('(')) => {
                if let Some(error) = self.parse_error() {
                    match scope {
                        Scope::File => self.unit.errors.push(error),
                        Scope::Contract(contract) => contract.errors.push(error),
                    }
                }
            }
            "struct" => {
                if let Some(decl) = self.parse_struct() {
                    match scope {
                        Scope::File => self.unit.structs.push(decl),
                        Scope::Contract(contract) => contract.structs.push(decl),
                    }
                }
            }
            "enum" => {
                if let Some(decl) = self.parse_enum() {
                    match scope {
                        Scope::File => self.unit.enums.push(decl),
                        Scope::Contract(contract) => contract.enums.push(decl),
                    }
                }
            }
            "type" if self.peek_at(2).is_some_and(|t| t.is_keyword("is")) => {
                if let Some(decl) = self.parse_user_type() {
                    match scope {
                        Scope::File => self.unit.user_types.push(decl),
                        Scope::Contract(contract) => contract.user_types.push(decl),
                    }
                }
            }
            _ => self.parse_state_variable(scope),
        }
    }

    fn parse_function(&mut self, contract: &mut ContractUnit) {
        if self.peek_at(1).is_some_and(|t| t.is_punct('(')) && self.is_function_type_variable() {
            self.parse_state_variable(&mut Scope::Contract(contract));
            return;
        }

        let start = self.current();
        self.pos += 1;

        // Pre-0.6 unnamed fallback: `function() external payable`
        if self.peek().is_some_and(|t| t.is_punct('(')) {
            contract.special_functions.push(SpecialFunction::Fallback);
            self.skip_construct(start.brace_depth, start.paren_depth);
            return;
        }

        let name = match self.next_ident() {
            Some(name) => name.text.to_string(),
            None => {
                self.malformed(start, "function", "missing name".to_string());
                return;
            }
        };

        let parameters = match self.take_parens().and_then(|tokens| parse_parameters(tokens, false)) {
            Ok(parameters) => parameters,
            Err(reason) => {
                self.malformed(start, "function", format!("{} in parameters of {}", reason, name));
                return;
            }
        };

        let mut visibility = None;
        let mut mutability = None;
        let mut is_virtual = false;
        let mut is_override = false;

        loop {
            let Some(token) = self.peek() else {
                self.warn(
                    DiagnosticKind::MalformedDeclaration,
                    start,
                    format!("function {} is not terminated", name),
                );
                return;
            };

            match token.kind {
                TokenKind::Punct(';') => {
                    self.pos += 1;
                    break;
                }
                TokenKind::Punct('{') => {
                    if self.take_braces().is_err() {
                        self.warn(
                            DiagnosticKind::MalformedDeclaration,
                            start,
                            format!("body of function {} is not closed", name),
                        );
                        self.pos = self.tokens.len();
                        return;
                    }
                    break;
                }
                TokenKind::Punct('.') => self.pos += 1,
                TokenKind::Ident => {
                    self.pos += 1;
                    if let Some(vis) = Visibility::from_keyword(token.text) {
                        if let Some(existing) = visibility {
                            self.warn(
                                DiagnosticKind::DuplicateModifier,
                                token,
                                format!("function {} already declared {}, ignoring {}", name, existing, vis),
                            );
                        } else {
                            visibility = Some(vis);
                        }
                    } else if let Some(state) = StateMutability::from_keyword(token.text) {
                        if let Some(existing) = mutability {
                            self.warn(
                                DiagnosticKind::DuplicateModifier,
                                token,
                                format!("function {} already declared {}, ignoring {}", name, existing, state),
                            );
                        } else {
                            mutability = Some(state);
                        }
                    } else if token.text == "virtual" {
                        is_virtual = true;
                    } else if token.text == "returns" {
                        if let Err(reason) = self.take_parens() {
                            self.malformed(start, "function", format!("{} in returns of {}", reason, name));
                            return;
                        }
                    } else {
                        // `override`, `override(A, B)` or a modifier invocation
                        is_override |= token.text == "override";
                        if self.peek().is_some_and(|t| t.is_punct('(')) {
                            if let Err(reason) = self.take_parens() {
                                self.malformed(start, "function", format!("{} after {}", reason, token.text));
                                return;
                            }
                        }
                    }
                }
                _ => {
                    self.malformed(
                        start,
                        "function",
                        format!("unexpected '{}' in header of {}", token.text, name),
                    );
                    return;
                }
            }
        }

        let visibility_explicit = visibility.is_some();
        let visibility = visibility.unwrap_or_else(|| {
            if contract.kind == ContractKind::Interface {
                Visibility::External
            } else {
                self.warn(
                    DiagnosticKind::ImplicitVisibility,
                    start,
                    format!("function {} has no visibility keyword, treated as internal", name),
                );
                Visibility::Internal
            }
        });

        contract.functions.push(FunctionDecl {
            name,
            parameters,
            visibility,
            visibility_explicit,
            mutability: mutability.unwrap_or(StateMutability::NonPayable),
            is_virtual,
            is_override,
            position: start.position(),
        });
    }

    /// `function (...) external public cb;` declares a variable of function
    /// type: the statement ends in `;` (or `=`) right after a plain name
    fn is_function_type_variable(&self) -> bool {
        let Some(start) = self.peek() else {
            return false;
        };
        let mut last: Option<&Token<'_>> = None;
        for token in &self.tokens[self.pos..] {
            if token.brace_depth < start.brace_depth {
                return false;
            }
            let at_level =
                token.brace_depth == start.brace_depth && token.paren_depth == start.paren_depth;
            if at_level && (token.is_punct(';') || token.is_punct('=')) {
                return last.is_some_and(|t| t.is_ident() && !is_function_header_keyword(t.text));
            }
            if at_level && (token.is_punct('{') || token.is_punct('}')) {
                return false;
            }
            last = Some(token);
        }
        false
    }

    fn parse_event(&mut self) -> Option<EventDecl> {
        let start = self.current();
        self.pos += 1;
        let Some(name) = self.next_ident() else {
            self.malformed(start, "event", "missing name".to_string());
            return None;
        };
        let parameters = match self.take_parens().and_then(|tokens| parse_parameters(tokens, true)) {
            Ok(parameters) => parameters,
            Err(reason) => {
                self.malformed(start, "event", format!("{} in parameters of {}", reason, name.text));
                return None;
            }
        };

        let anonymous = self.peek().is_some_and(|t| t.is_keyword("anonymous"));
        if anonymous {
            self.pos += 1;
        }
        if !self.expect_semicolon(start, "event", name.text) {
            return None;
        }

        Some(EventDecl {
            name: name.text.to_string(),
            parameters,
            anonymous,
            position: start.position(),
        })
    }

    fn parse_error(&mut self) -> Option<ErrorDecl> {
        let start = self.current();
        self.pos += 1;
        let Some(name) = self.next_ident() else {
            self.malformed(start, "error", "missing name".to_string());
            return None;
        };
        let parameters = match self.take_parens().and_then(|tokens| parse_parameters(tokens, false)) {
            Ok(parameters) => parameters,
            Err(reason) => {
                self.malformed(start, "error", format!("{} in parameters of {}", reason, name.text));
                return None;
            }
        };
        if !self.expect_semicolon(start, "error", name.text) {
            return None;
        }

        Some(ErrorDecl {
            name: name.text.to_string(),
            parameters,
            position: start.position(),
        })
    }

    fn expect_semicolon(&mut self, start: &'t Token<'src>, what: &str, name: &str) -> bool {
        match self.peek() {
            Some(token) if token.is_punct(';') => {
                self.pos += 1;
                true
            }
            Some(token) => {
                let reason = format!("expected ';' after {}, found '{}'", name, token.text);
                self.malformed(start, what, reason);
                false
            }
            None => {
                self.malformed(start, what, format!("expected ';' after {}", name));
                false
            }
        }
    }

    fn parse_struct(&mut self) -> Option<StructDecl> {
        let start = self.current();
        self.pos += 1;
        let Some(name) = self.next_ident() else {
            self.malformed(start, "struct", "missing name".to_string());
            return None;
        };
        let body = match self.take_braces() {
            Ok(body) => body,
            Err(reason) => {
                self.malformed(start, "struct", format!("{} in {}", reason, name.text));
                return None;
            }
        };

        let mut fields = Vec::new();
        for member in body.split(|t| t.is_punct(';')).filter(|m| !m.is_empty()) {
            let mut parser = TypeParser::new(member);
            let field = parser.parse_type().and_then(|ty| match parser.remaining() {
                [field_name] if field_name.is_ident() => Ok(StructField {
                    name: field_name.text.to_string(),
                    ty,
                }),
                _ => Err(format!("expected a single field name after {}", ty)),
            });
            match field {
                Ok(field) => fields.push(field),
                Err(reason) => {
                    self.warn(
                        DiagnosticKind::MalformedDeclaration,
                        start,
                        format!("skipping malformed struct {}: {}", name.text, reason),
                    );
                    return None;
                }
            }
        }

        Some(StructDecl {
            name: name.text.to_string(),
            fields,
            position: start.position(),
        })
    }

    fn parse_enum(&mut self) -> Option<EnumDecl> {
        let start = self.current();
        self.pos += 1;
        let Some(name) = self.next_ident() else {
            self.malformed(start, "enum", "missing name".to_string());
            return None;
        };
        let body = match self.take_braces() {
            Ok(body) => body,
            Err(reason) => {
                self.malformed(start, "enum", format!("{} in {}", reason, name.text));
                return None;
            }
        };

        let mut variants = Vec::new();
        for variant in body.split(|t| t.is_punct(',')).filter(|v| !v.is_empty()) {
            match variant {
                [ident] if ident.is_ident() => variants.push(ident.text.to_string()),
                _ => {
                    self.warn(
                        DiagnosticKind::MalformedDeclaration,
                        start,
                        format!("skipping malformed enum {}: invalid variant", name.text),
                    );
                    return None;
                }
            }
        }

        Some(EnumDecl {
            name: name.text.to_string(),
            variants,
            position: start.position(),
        })
    }

    /// `type Price is uint128;`
    fn parse_user_type(&mut self) -> Option<UserTypeDecl> {
        let start = self.current();
        let name = self.tokens[self.pos + 1].text;
        self.pos += 3;

        let underlying = match self.next_ident().map(|t| ElementaryType::from_keyword(t.text)) {
            Some(Some(ElementaryType::Address)) => {
                if self.peek().is_some_and(|t| t.is_keyword("payable")) {
                    self.pos += 1;
                }
                ElementaryType::Address
            }
            Some(Some(elementary)) if !matches!(elementary, ElementaryType::String | ElementaryType::Bytes) => {
                elementary
            }
            _ => {
                self.malformed(
                    start,
                    "user-defined value type",
                    format!("{} must wrap an elementary value type", name),
                );
                return None;
            }
        };
        if !self.expect_semicolon(start, "user-defined value type", name) {
            return None;
        }

        Some(UserTypeDecl {
            name: name.to_string(),
            underlying,
            position: start.position(),
        })
    }

    /// State variables: public ones get a getter, integer constants are
    /// remembered for array lengths, everything else is skipped
    fn parse_state_variable(&mut self, scope: &mut Scope<'_>) {
        let start = self.current();
        let depth = start.brace_depth;

        let tokens: &'t [Token<'src>] = self.tokens;
        let begin = self.pos;
        let mut end = None;
        for index in begin..tokens.len() {
            let token = &tokens[index];
            if token.is_punct('}') && token.brace_depth < depth {
                break;
            }
            if token.is_punct(';') && token.brace_depth == depth && token.paren_depth == start.paren_depth {
                end = Some(index);
                break;
            }
        }
        let Some(end) = end else {
            self.malformed(start, "declaration", format!("'{}' is not terminated by ';'", start.text));
            return;
        };
        let statement = &tokens[begin..end];
        self.pos = end + 1;

        let mut parser = TypeParser::new(statement);
        let ty = match parser.parse_type() {
            Ok(ty) => ty,
            Err(reason) => {
                self.warn(
                    DiagnosticKind::MalformedDeclaration,
                    start,
                    format!("skipping unrecognised declaration starting with '{}': {}", start.text, reason),
                );
                return;
            }
        };

        let rest = parser.remaining();
        let mut is_public = false;
        let mut is_constant = false;
        let mut name = None;
        let mut index = 0;
        while index < rest.len() {
            let token = &rest[index];
            if token.is_punct('=') {
                break;
            }
            if token.is_ident() && STATE_VARIABLE_ATTRIBUTES.contains(&token.text) {
                is_public |= token.text == "public";
                is_constant |= token.text == "constant";
                if token.text == "override" && rest.get(index + 1).is_some_and(|t| t.is_punct('(')) {
                    let open_depth = rest[index + 1].paren_depth;
                    index += 2;
                    while index < rest.len() && !(rest[index].is_punct(')') && rest[index].paren_depth == open_depth) {
                        index += 1;
                    }
                }
            } else if token.is_ident() {
                name = Some(token);
            } else {
                self.warn(
                    DiagnosticKind::MalformedDeclaration,
                    start,
                    format!("skipping declaration with unexpected '{}'", token.text),
                );
                return;
            }
            index += 1;
        }

        let Some(name) = name else {
            self.warn(
                DiagnosticKind::MalformedDeclaration,
                start,
                format!("declaration of type {} has no name", ty),
            );
            return;
        };

        if is_constant && matches!(ty, TypeRef::Elementary(ElementaryType::Uint(_) | ElementaryType::Int(_))) {
            if let [_, value] = &rest[index.min(rest.len())..] {
                if let Some(value) = (value.kind == TokenKind::Number)
                    .then(|| parse_integer_literal(value.text))
                    .flatten()
                {
                    let constant = ConstantDecl {
                        name: name.text.to_string(),
                        value,
                    };
                    match scope {
                        Scope::File => self.unit.constants.push(constant),
                        Scope::Contract(contract) => contract.constants.push(constant),
                    }
                }
            }
        }

        if is_public {
            if let Scope::Contract(contract) = scope {
                contract.getters.push(StateVariableGetter {
                    name: name.text.to_string(),
                    ty,
                    position: start.position(),
                });
            }
        }
    }
}

fn is_function_header_keyword(word: &str) -> bool {
    Visibility::from_keyword(word).is_some()
        || StateMutability::from_keyword(word).is_some()
        || matches!(word, "virtual" | "override" | "function")
}

/// Split a parameter list on its top-level commas and parse each entry
fn parse_parameters(tokens: &[Token<'_>], allow_indexed: bool) -> Result<Vec<Parameter>, String> {
    let Some(first) = tokens.first() else {
        return Ok(Vec::new());
    };
    let list_depth = first.paren_depth;

    let mut parameters = Vec::new();
    let mut segment_start = 0;
    for index in 0..=tokens.len() {
        let at_boundary = index == tokens.len()
            || (tokens[index].is_punct(',') && tokens[index].paren_depth == list_depth);
        if !at_boundary {
            continue;
        }
        let segment = &tokens[segment_start..index];
        if segment.is_empty() {
            return Err("empty parameter".to_string());
        }
        parameters.push(parse_parameter(segment, allow_indexed)?);
        segment_start = index + 1;
    }
    Ok(parameters)
}

/// `type [location] [indexed] [name]`
fn parse_parameter(tokens: &[Token<'_>], allow_indexed: bool) -> Result<Parameter, String> {
    let mut parser = TypeParser::new(tokens);
    let ty = parser.parse_type()?;
    let mut parameter = Parameter::new(ty, None);

    for token in parser.remaining() {
        if !token.is_ident() {
            return Err(format!("unexpected '{}' in parameter", token.text));
        }
        if DATA_LOCATIONS.contains(&token.text) && parameter.name.is_none() {
            continue;
        }
        if token.text == "indexed" && parameter.name.is_none() {
            if !allow_indexed {
                return Err("'indexed' outside an event".to_string());
            }
            parameter.indexed = true;
            continue;
        }
        if parameter.name.is_some() {
            return Err(format!("unexpected '{}' after parameter name", token.text));
        }
        parameter.name = Some(token.text.to_string());
    }
    Ok(parameter)
}
