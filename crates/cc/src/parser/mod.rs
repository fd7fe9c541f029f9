//! C parser.
//!
//! A token-vector recursive-descent parser. Two things distinguish it from
//! a textbook one:
//!
//! - **Typedef feedback.** C grammar needs to know which identifiers name
//!   types. The parser is seeded with a list of presumed type names and
//!   grows it from `typedef` declarations; when it stalls on an identifier
//!   that is probably an unseen typedef it fails with a diagnostic the
//!   driver can mine for that name (`likely type near X`, `invalid function
//!   definition for X`), letting the driver re-parse with a larger seed.
//!
//! - **Comment attachment.** Comments are never dropped. Each statement,
//!   declaration, and struct field picks up the comments between it and the
//!   previous construct as `before` comments (blank source lines become
//!   empty comment markers) and same-line comments after it as `suffix`
//!   comments. Whatever trails the last declaration lands on the program
//!   node itself.

mod expr;
mod stmt;

use crate::ast::*;
use crate::error::{ParseError, Pos};
use crate::lexer::{self, LineIndex, RawComment, Token, TokenKind};
use std::collections::HashMap;
use text_size::TextSize;

pub type ParseResult<T> = Result<T, Box<ParseError>>;

/// Parse one translation unit. `types` lists identifiers to presume are
/// typedef names in addition to those the file declares itself.
pub fn parse(file: &str, src: &str, types: &[String]) -> ParseResult<Ast> {
    let out = lexer::lex(file, src)?;
    let mut p = Parser::new(file, src, out.tokens, out.comments, out.lines);
    for name in types {
        p.typedefs.insert(name.clone(), (None, None));
    }
    p.parse_program()?;
    Ok(p.ast)
}

pub(crate) struct Parser<'a> {
    src: &'a str,
    file: String,
    tokens: Vec<Token>,
    pos: usize,
    comments: Vec<RawComment>,
    cidx: usize,
    lines: LineIndex,
    pub(crate) ast: Ast,
    /// Known typedef names, mapped to the defining type and decl when the
    /// typedef has been seen (presumed names map to `(None, None)`).
    typedefs: HashMap<String, (Option<TypeId>, Option<DeclId>)>,
    /// struct/union/enum tag namespace.
    tags: HashMap<String, TypeId>,
    scopes: Vec<HashMap<String, DeclId>>,
    /// End line of the last consumed token or attached comment.
    last_line: u32,
    // Interned scalar types, so the annotator does not grow the arena on
    // every literal.
    pub(crate) ty_void: TypeId,
    pub(crate) ty_int: TypeId,
    pub(crate) ty_bool: TypeId,
    pub(crate) ty_float32: TypeId,
    pub(crate) ty_float64: TypeId,
    pub(crate) ty_string: TypeId,
}

impl<'a> Parser<'a> {
    fn new(
        file: &str,
        src: &'a str,
        tokens: Vec<Token>,
        comments: Vec<RawComment>,
        lines: LineIndex,
    ) -> Self {
        let mut ast = Ast::new(file);
        let ty_void = ast.alloc_type(Type::new(TypeKind::Void));
        let ty_int = ast.alloc_type(Type::new(TypeKind::Int));
        let ty_bool = ast.alloc_type(Type::new(TypeKind::Bool));
        let ty_float32 = ast.alloc_type(Type::new(TypeKind::Float32));
        let ty_float64 = ast.alloc_type(Type::new(TypeKind::Float64));
        let ty_char = ast.alloc_type(Type::new(TypeKind::Char));
        let mut string_ty = Type::new(TypeKind::Ptr);
        string_ty.base = Some(ty_char);
        let ty_string = ast.alloc_type(string_ty);
        Parser {
            src,
            file: file.to_string(),
            tokens,
            pos: 0,
            comments,
            cidx: 0,
            lines,
            ast,
            typedefs: HashMap::new(),
            tags: HashMap::new(),
            scopes: vec![HashMap::new()],
            last_line: 0,
            ty_void,
            ty_int,
            ty_bool,
            ty_float32,
            ty_float64,
            ty_string,
        }
    }

    // ----- token plumbing -----

    pub(crate) fn peek(&self) -> Token {
        self.tokens[self.pos]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    pub(crate) fn peek_at(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos];
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
            self.last_line = self.lines.line(tok.span.end());
        }
        tok
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            return true;
        }
        false
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.err_here())
        }
    }

    pub(crate) fn text(&self, tok: Token) -> &'a str {
        &self.src[tok.span]
    }

    pub(crate) fn pos_at(&self, at: TextSize) -> Pos {
        Pos::new(self.file.clone(), self.lines.line(at))
    }

    /// `syntax error near TOKEN` at the current token.
    pub(crate) fn err_here(&self) -> Box<ParseError> {
        let tok = self.peek();
        if tok.kind == TokenKind::Eof {
            return Box::new(ParseError::UnexpectedEof {
                pos: self.pos_at(tok.span.start()),
            });
        }
        Box::new(ParseError::syntax(
            self.pos_at(tok.span.start()),
            self.text(tok),
        ))
    }

    fn err_likely_type(&self, tok: Token) -> Box<ParseError> {
        Box::new(ParseError::likely_type(
            self.pos_at(tok.span.start()),
            self.text(tok),
        ))
    }

    // ----- comments -----

    fn is_directive(text: &str) -> bool {
        text.starts_with("//go:") || text.starts_with("//line ")
    }

    /// Comments strictly before the next token, with blank lines encoded as
    /// empty comments.
    pub(crate) fn take_lead_comments(&mut self) -> Vec<Comment> {
        let next = self.peek();
        let next_start = next.span.start();
        let mut out = Vec::new();
        let mut prev_line = self.last_line;
        while self.cidx < self.comments.len() && self.comments[self.cidx].span.end() <= next_start {
            let c = &self.comments[self.cidx];
            if prev_line > 0 && c.line_start > prev_line + 1 {
                out.push(Comment::blank());
            }
            out.push(Comment {
                text: c.text.clone(),
                suffix: false,
                directive: Self::is_directive(&c.text),
            });
            prev_line = c.line_end;
            self.cidx += 1;
        }
        let next_line = self.lines.line(next_start);
        if prev_line > 0 && next.kind != TokenKind::Eof && next_line > prev_line + 1 {
            out.push(Comment::blank());
        }
        self.last_line = self.last_line.max(prev_line);
        out
    }

    /// Comments on the same line as the construct that just ended.
    pub(crate) fn take_suffix_comments(&mut self) -> Vec<Comment> {
        let line = self.last_line;
        let mut out = Vec::new();
        while self.cidx < self.comments.len() {
            let c = &self.comments[self.cidx];
            if c.own_line || c.line_start != line {
                break;
            }
            out.push(Comment {
                text: c.text.clone(),
                suffix: true,
                directive: Self::is_directive(&c.text),
            });
            self.last_line = c.line_end;
            self.cidx += 1;
        }
        out
    }

    // ----- scopes -----

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn declare(&mut self, name: &str, decl: DeclId) {
        if !name.is_empty() {
            self.scopes
                .last_mut()
                .expect("scope stack never empty")
                .insert(name.to_string(), decl);
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<DeclId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    pub(crate) fn is_type_name(&self, name: &str) -> bool {
        self.typedefs.contains_key(name)
    }

    // ----- program -----

    fn parse_program(&mut self) -> ParseResult<()> {
        loop {
            let lead = self.take_lead_comments();
            if self.at(TokenKind::Eof) {
                self.ast.prog.syntax.comments.after = lead;
                return Ok(());
            }
            self.parse_top_decl(lead)?;
        }
    }

    fn parse_top_decl(&mut self, lead: Vec<Comment>) -> ParseResult<()> {
        // An unknown identifier opening a declaration-shaped line is the
        // typedef-feedback case: report it as a likely type so the driver
        // can retry with the name presumed.
        if self.at(TokenKind::Ident) && !self.is_type_name(self.text(self.peek())) {
            let next = self.peek_at(1);
            if next == TokenKind::Ident || next == TokenKind::Star {
                return Err(self.err_likely_type(self.peek()));
            }
            return Err(self.err_here());
        }

        let start = self.peek().span.start();
        let (storage, base) = self.parse_decl_specs(false)?;

        // `struct Foo { ... };` and friends: a type definition with no
        // declarator.
        if self.at(TokenKind::Semi) {
            self.advance();
            let mut decl = Decl {
                ty: Some(base),
                storage,
                ..Decl::default()
            };
            decl.syntax.span = text_size::TextRange::new(start, self.prev_end());
            decl.syntax.comments.before = lead;
            decl.syntax.comments.suffix = self.take_suffix_comments();
            let id = self.ast.alloc_decl(decl);
            self.ast.prog.decls.push(id);
            return Ok(());
        }

        let mut first = true;
        let mut lead = Some(lead);
        loop {
            let (name, ty) = self.parse_declarator(base)?;

            // Function definition.
            if first
                && self.at(TokenKind::LBrace)
                && matches!(self.ast.type_kind(Some(ty)), Some(TypeKind::Func))
            {
                let id = self.finish_decl(name.clone(), ty, storage, lead.take().unwrap(), start);
                self.declare(&name, id);
                self.register_typedef(&name, storage, ty, id);
                let body = self.parse_func_body(ty)?;
                self.ast[id].body = Some(body);
                self.ast[id].syntax.comments.suffix = self.take_suffix_comments();
                self.ast.prog.decls.push(id);
                return Ok(());
            }

            let id = self.finish_decl(name.clone(), ty, storage, lead.take().unwrap_or_default(), start);
            if self.eat(TokenKind::Assign) {
                let init = self.parse_initializer()?;
                self.ast[id].init = Some(init);
            }
            self.declare(&name, id);
            self.register_typedef(&name, storage, ty, id);
            self.ast.prog.decls.push(id);

            first = false;
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::Semi)?;
            self.ast[id].syntax.comments.suffix = self.take_suffix_comments();
            return Ok(());
        }
    }

    fn prev_end(&self) -> TextSize {
        if self.pos == 0 {
            TextSize::from(0)
        } else {
            self.tokens[self.pos - 1].span.end()
        }
    }

    fn finish_decl(
        &mut self,
        name: String,
        ty: TypeId,
        storage: Storage,
        lead: Vec<Comment>,
        start: TextSize,
    ) -> DeclId {
        let mut decl = Decl {
            name,
            ty: Some(ty),
            storage,
            ..Decl::default()
        };
        decl.syntax.span = text_size::TextRange::new(start, self.prev_end());
        decl.syntax.comments.before = lead;
        self.ast.alloc_decl(decl)
    }

    fn register_typedef(&mut self, name: &str, storage: Storage, ty: TypeId, decl: DeclId) {
        if storage.contains(Storage::TYPEDEF) && !name.is_empty() {
            self.typedefs
                .insert(name.to_string(), (Some(ty), Some(decl)));
            if self.ast[ty].type_decl.is_none() {
                self.ast[ty].type_decl = Some(decl);
            }
        }
    }

    // ----- declaration specifiers -----

    /// Parse storage-class and type specifiers. `in_params` changes only the
    /// diagnostic used when an unknown identifier sits in type position.
    pub(crate) fn parse_decl_specs(&mut self, in_params: bool) -> ParseResult<(Storage, TypeId)> {
        let mut storage = Storage::empty();
        let mut signed: Option<bool> = None;
        let mut longs = 0u8;
        let mut short = false;
        let mut base: Option<TypeId> = None;
        let mut saw_int_words = false;

        loop {
            match self.peek_kind() {
                TokenKind::Typedef => {
                    storage |= Storage::TYPEDEF;
                    self.advance();
                }
                TokenKind::Static => {
                    storage |= Storage::STATIC;
                    self.advance();
                }
                TokenKind::Extern => {
                    storage |= Storage::EXTERN;
                    self.advance();
                }
                TokenKind::Register => {
                    storage |= Storage::REGISTER;
                    self.advance();
                }
                TokenKind::Const => {
                    storage |= Storage::CONST;
                    self.advance();
                }
                TokenKind::Inline => {
                    storage |= Storage::INLINE;
                    self.advance();
                }
                TokenKind::Auto | TokenKind::Volatile => {
                    self.advance();
                }
                TokenKind::Void => {
                    self.advance();
                    base = Some(self.ty_void);
                }
                TokenKind::Char => {
                    self.advance();
                    let kind = if signed == Some(false) {
                        TypeKind::Uchar
                    } else {
                        TypeKind::Char
                    };
                    base = Some(self.ast.alloc_type(Type::new(kind)));
                }
                TokenKind::Float => {
                    self.advance();
                    base = Some(self.ty_float32);
                }
                TokenKind::Double => {
                    self.advance();
                    base = Some(self.ty_float64);
                }
                TokenKind::Int => {
                    self.advance();
                    saw_int_words = true;
                }
                TokenKind::Short => {
                    self.advance();
                    short = true;
                    saw_int_words = true;
                }
                TokenKind::Long => {
                    self.advance();
                    longs += 1;
                    saw_int_words = true;
                }
                TokenKind::Signed => {
                    self.advance();
                    signed = Some(true);
                    saw_int_words = true;
                }
                TokenKind::Unsigned => {
                    self.advance();
                    signed = Some(false);
                    saw_int_words = true;
                }
                TokenKind::Struct | TokenKind::Union => {
                    base = Some(self.parse_struct_spec()?);
                }
                TokenKind::Enum => {
                    base = Some(self.parse_enum_spec()?);
                }
                TokenKind::Ident => {
                    let tok = self.peek();
                    let name = self.text(tok);
                    if base.is_none() && !saw_int_words && self.is_type_name(name) {
                        self.advance();
                        let (def_ty, def_decl) = self.typedefs[name];
                        let mut ty = Type::new(TypeKind::TypedefType);
                        ty.name = name.to_string();
                        ty.base = def_ty;
                        ty.type_decl = def_decl;
                        ty.span = tok.span;
                        base = Some(self.ast.alloc_type(ty));
                    } else if base.is_none() && !saw_int_words {
                        // Type position, unknown name.
                        let err = if in_params {
                            Box::new(ParseError::invalid_func_def(
                                self.pos_at(tok.span.start()),
                                name,
                            ))
                        } else {
                            self.err_likely_type(tok)
                        };
                        return Err(err);
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }

        let base = match base {
            Some(b) => b,
            None => {
                let kind = match (signed, short, longs) {
                    (Some(false), true, _) => TypeKind::Ushort,
                    (_, true, _) => TypeKind::Short,
                    (Some(false), _, 0) => TypeKind::Uint,
                    (Some(false), _, 1) => TypeKind::Ulong,
                    (Some(false), _, _) => TypeKind::Ulonglong,
                    (_, _, 1) => TypeKind::Long,
                    (_, _, n) if n >= 2 => TypeKind::Longlong,
                    _ => TypeKind::Int,
                };
                if !saw_int_words {
                    // No specifier at all: only legal in old C; treat as int.
                    self.ty_int
                } else if kind == TypeKind::Int {
                    self.ty_int
                } else {
                    self.ast.alloc_type(Type::new(kind))
                }
            }
        };
        Ok((storage, base))
    }

    fn parse_struct_spec(&mut self) -> ParseResult<TypeId> {
        let kw = self.advance();
        let kind = if kw.kind == TokenKind::Union {
            TypeKind::Union
        } else {
            TypeKind::Struct
        };
        let mut tag = String::new();
        if self.at(TokenKind::Ident) {
            let tok = self.advance();
            tag = self.text(tok).to_string();
        }

        if !self.at(TokenKind::LBrace) {
            // Reference to a (possibly forward) tagged type.
            if let Some(&ty) = self.tags.get(&tag) {
                return Ok(ty);
            }
            let mut ty = Type::new(kind);
            ty.tag = tag.clone();
            ty.span = kw.span;
            let id = self.ast.alloc_type(ty);
            if !tag.is_empty() {
                self.tags.insert(tag, id);
            }
            return Ok(id);
        }

        // Definition. Reuse the forward node when the tag was already seen so
        // earlier references resolve to the completed type.
        let id = match self.tags.get(&tag) {
            Some(&ty) if !tag.is_empty() => ty,
            _ => {
                let mut ty = Type::new(kind);
                ty.tag = tag.clone();
                ty.span = kw.span;
                let id = self.ast.alloc_type(ty);
                if !tag.is_empty() {
                    self.tags.insert(tag.clone(), id);
                }
                id
            }
        };

        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        loop {
            let lead = self.take_lead_comments();
            if self.eat(TokenKind::RBrace) {
                // Trailing comments inside the braces attach to the last field.
                if let (Some(&last), false) = (fields.last(), lead.is_empty()) {
                    let last: DeclId = last;
                    self.ast[last].syntax.comments.after = lead;
                }
                break;
            }
            let start = self.peek().span.start();
            let (fstorage, fbase) = self.parse_decl_specs(false)?;
            let mut first = true;
            loop {
                let (name, ty) = self.parse_declarator(fbase)?;
                let lead = if first { lead.clone() } else { Vec::new() };
                let field = self.finish_decl(name, ty, fstorage, lead, start);
                fields.push(field);
                first = false;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Semi)?;
            if let Some(&last) = fields.last() {
                let last: DeclId = last;
                self.ast[last].syntax.comments.suffix = self.take_suffix_comments();
            }
        }
        self.ast[id].decls = fields;
        Ok(id)
    }

    fn parse_enum_spec(&mut self) -> ParseResult<TypeId> {
        let kw = self.advance();
        let mut tag = String::new();
        if self.at(TokenKind::Ident) {
            let tok = self.advance();
            tag = self.text(tok).to_string();
        }

        if !self.at(TokenKind::LBrace) {
            if let Some(&ty) = self.tags.get(&tag) {
                return Ok(ty);
            }
            let mut ty = Type::new(TypeKind::Enum);
            ty.tag = tag.clone();
            ty.span = kw.span;
            let id = self.ast.alloc_type(ty);
            if !tag.is_empty() {
                self.tags.insert(tag, id);
            }
            return Ok(id);
        }

        let mut ty = Type::new(TypeKind::Enum);
        ty.tag = tag.clone();
        ty.span = kw.span;
        let id = self.ast.alloc_type(ty);
        if !tag.is_empty() {
            self.tags.insert(tag.clone(), id);
        }

        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        let mut next_value: i64 = 0;
        loop {
            let lead = self.take_lead_comments();
            if self.eat(TokenKind::RBrace) {
                if let (Some(&last), false) = (members.last(), lead.is_empty()) {
                    let last: DeclId = last;
                    self.ast[last].syntax.comments.after = lead;
                }
                break;
            }
            let tok = self.expect(TokenKind::Ident)?;
            let name = self.text(tok).to_string();
            let mut decl = Decl {
                name: name.clone(),
                ..Decl::default()
            };
            decl.syntax.span = tok.span;
            decl.syntax.comments.before = lead;
            if self.eat(TokenKind::Assign) {
                let value = self.parse_assign_expr()?;
                let mut init = Init::default();
                init.expr = Some(value);
                decl.init = Some(self.ast.alloc_init(init));
                if let Some(v) = self.const_value(value) {
                    next_value = v + 1;
                }
            } else {
                decl.enum_value = Some(next_value);
                next_value += 1;
            }
            let member = self.ast.alloc_decl(decl);
            self.declare(&name, member);
            members.push(member);
            if !self.eat(TokenKind::Comma) {
                let lead = self.take_lead_comments();
                self.expect(TokenKind::RBrace)?;
                if let (Some(&last), false) = (members.last(), lead.is_empty()) {
                    let last: DeclId = last;
                    self.ast[last].syntax.comments.after = lead;
                }
                break;
            }
            if let Some(&last) = members.last() {
                let last: DeclId = last;
                self.ast[last].syntax.comments.suffix = self.take_suffix_comments();
            }
        }
        self.ast[id].decls = members;
        Ok(id)
    }

    fn const_value(&self, expr: ExprId) -> Option<i64> {
        let e = &self.ast[expr];
        match e.op {
            ExprOp::Number => {
                let text = e.text.trim_end_matches(['u', 'U', 'l', 'L']);
                if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    i64::from_str_radix(hex, 16).ok()
                } else {
                    text.parse().ok()
                }
            }
            ExprOp::Minus => {
                let left = e.left?;
                self.const_value(left).map(|v| -v)
            }
            _ => None,
        }
    }

    // ----- declarators -----

    /// Parse a declarator against `base`: pointer stars, the name (or
    /// nothing, for abstract declarators), then array and parameter-list
    /// suffixes. Nested `(*name)(...)` declarators route through a
    /// placeholder node that is patched once the suffixes are known.
    pub(crate) fn parse_declarator(&mut self, base: TypeId) -> ParseResult<(String, TypeId)> {
        let mut ty = base;
        while self.eat(TokenKind::Star) {
            while matches!(self.peek_kind(), TokenKind::Const | TokenKind::Volatile) {
                self.advance();
            }
            let mut ptr = Type::new(TypeKind::Ptr);
            ptr.base = Some(ty);
            ty = self.ast.alloc_type(ptr);
        }
        self.parse_direct_declarator(ty)
    }

    fn parse_direct_declarator(&mut self, base: TypeId) -> ParseResult<(String, TypeId)> {
        if self.at(TokenKind::LParen) && self.is_nested_declarator() {
            // The declaration's type is the inner declarator's result; the
            // placeholder becomes the suffixed base once that is known.
            self.advance();
            let placeholder = self.ast.alloc_type(Type::new(TypeKind::Named));
            let (name, inner_ty) = self.parse_declarator(placeholder)?;
            self.expect(TokenKind::RParen)?;
            let suffixed = self.parse_declarator_suffixes(base)?;
            let patched = self.ast[suffixed].clone();
            self.ast[placeholder] = patched;
            return Ok((name, inner_ty));
        }

        let name = if self.at(TokenKind::Ident) {
            let tok = self.advance();
            self.text(tok).to_string()
        } else {
            String::new()
        };
        let ty = self.parse_declarator_suffixes(base)?;
        Ok((name, ty))
    }

    /// A `(` after a declarator name starts a parameter list; a `(` before
    /// any name is grouping iff it is followed by `*` or a further `(`.
    fn is_nested_declarator(&self) -> bool {
        matches!(self.peek_at(1), TokenKind::Star | TokenKind::LParen)
    }

    fn parse_declarator_suffixes(&mut self, base: TypeId) -> ParseResult<TypeId> {
        enum Suffix {
            Array(Option<ExprId>),
            Func(Vec<DeclId>),
        }
        let mut suffixes = Vec::new();
        loop {
            if self.eat(TokenKind::LBracket) {
                let width = if self.at(TokenKind::RBracket) {
                    None
                } else {
                    Some(self.parse_assign_expr()?)
                };
                self.expect(TokenKind::RBracket)?;
                suffixes.push(Suffix::Array(width));
            } else if self.at(TokenKind::LParen) && !self.is_nested_declarator() {
                self.advance();
                let params = self.parse_params()?;
                suffixes.push(Suffix::Func(params));
            } else {
                break;
            }
        }

        let mut ty = base;
        for suffix in suffixes.into_iter().rev() {
            match suffix {
                Suffix::Array(width) => {
                    let mut arr = Type::new(TypeKind::Array);
                    arr.base = Some(ty);
                    arr.width = width;
                    ty = self.ast.alloc_type(arr);
                }
                Suffix::Func(params) => {
                    let mut func = Type::new(TypeKind::Func);
                    func.base = Some(ty);
                    func.decls = params;
                    ty = self.ast.alloc_type(func);
                }
            }
        }
        Ok(ty)
    }

    fn parse_params(&mut self) -> ParseResult<Vec<DeclId>> {
        let mut params = Vec::new();
        if self.eat(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            if self.eat(TokenKind::Ellipsis) {
                let decl = self.ast.alloc_decl(Decl {
                    name: "...".to_string(),
                    ..Decl::default()
                });
                params.push(decl);
            } else {
                let start = self.peek().span.start();
                let (storage, base) = self.parse_decl_specs(true)?;
                let (name, ty) = self.parse_declarator(base)?;
                let decl = self.finish_decl(name, ty, storage, Vec::new(), start);
                params.push(decl);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_func_body(&mut self, func_ty: TypeId) -> ParseResult<StmtId> {
        self.push_scope();
        let params = self.ast[func_ty].decls.clone();
        for param in params {
            let name = self.ast[param].name.clone();
            self.declare(&name, param);
        }
        let body = self.parse_block()?;
        self.pop_scope();
        Ok(body)
    }

    // ----- local declarations (used by stmt parsing) -----

    /// A statement opening with an unknown identifier shaped like a
    /// declaration (`T x`, `T *x;`) is the typedef-feedback case inside a
    /// function body.
    pub(crate) fn check_unknown_type(&self) -> ParseResult<()> {
        if !self.at(TokenKind::Ident) || self.is_type_name(self.text(self.peek())) {
            return Ok(());
        }
        let looks_like_decl = self.peek_at(1) == TokenKind::Ident
            || (self.peek_at(1) == TokenKind::Star
                && self.peek_at(2) == TokenKind::Ident
                && matches!(
                    self.peek_at(3),
                    TokenKind::Semi | TokenKind::Assign | TokenKind::Comma
                ));
        if looks_like_decl {
            return Err(self.err_likely_type(self.peek()));
        }
        Ok(())
    }

    /// True when the upcoming tokens open a local declaration.
    pub(crate) fn at_local_decl(&self) -> bool {
        let kind = self.peek_kind();
        if kind.starts_decl_spec() {
            return true;
        }
        if kind != TokenKind::Ident {
            return false;
        }
        let tok = self.peek();
        if !self.is_type_name(self.text(tok)) {
            return false;
        }
        // `T x`, `T *x`, `T **x`, `T x[...]`... but `T = 3` or `T(...)` is a use.
        let mut n = 1;
        while self.peek_at(n) == TokenKind::Star {
            n += 1;
        }
        self.peek_at(n) == TokenKind::Ident
    }

    /// Parse one local declaration line into a list of `StmtDecl` statements.
    pub(crate) fn parse_local_decl(&mut self, lead: Vec<Comment>) -> ParseResult<Vec<StmtId>> {
        let start = self.peek().span.start();
        let (storage, base) = self.parse_decl_specs(false)?;
        let mut stmts = Vec::new();
        let mut lead = Some(lead);
        loop {
            let (name, ty) = self.parse_declarator(base)?;
            let id = self.finish_decl(name.clone(), ty, storage, Vec::new(), start);
            if self.eat(TokenKind::Assign) {
                let init = self.parse_initializer()?;
                self.ast[id].init = Some(init);
            }
            self.declare(&name, id);
            self.register_typedef(&name, storage, ty, id);
            let mut stmt = Stmt {
                op: StmtOp::StmtDecl,
                decl: Some(id),
                ..Stmt::default()
            };
            stmt.syntax.comments.before = lead.take().unwrap_or_default();
            stmts.push(self.ast.alloc_stmt(stmt));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semi)?;
        if let Some(&last) = stmts.last() {
            let last: StmtId = last;
            let suffix = self.take_suffix_comments();
            self.ast[last].syntax.comments.suffix = suffix;
        }
        Ok(stmts)
    }

    pub(crate) fn parse_initializer(&mut self) -> ParseResult<InitId> {
        if self.eat(TokenKind::LBrace) {
            let mut braced = Vec::new();
            while !self.at(TokenKind::RBrace) {
                braced.push(self.parse_initializer()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace)?;
            let init = Init {
                braced,
                ..Init::default()
            };
            return Ok(self.ast.alloc_init(init));
        }
        let expr = self.parse_assign_expr()?;
        let init = Init {
            expr: Some(expr),
            ..Init::default()
        };
        Ok(self.ast.alloc_init(init))
    }
}
