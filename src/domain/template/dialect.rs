//! Compiles `{{ .Path }}`-style templates to minijinja source.
//!
//! Field references become subscripts on the root context (or on the
//! element bound by the innermost `range`), pipelines become filter chains
//! where the piped value is the last argument of the called function, and
//! trim markers are applied to the surrounding text at compile time.

use std::collections::BTreeSet;

use super::{ROOT_VAR, TemplateError};

/// Compiled template plus the root references it makes.
#[derive(Debug)]
pub(super) struct Compiled {
    pub source: String,
    /// Field paths read from the root context, e.g. `["Values", "cidr"]`.
    pub root_paths: Vec<Vec<String>>,
}

pub(super) fn translate(name: &str, input: &str) -> Result<Compiled, TemplateError> {
    let segments = split_segments(name, input)?;
    let mut translator = Translator::new(name);
    for segment in &segments {
        match segment {
            Segment::Text(text) => translator.emit_text(text),
            Segment::Action(body) => translator.action(body)?,
        }
    }
    translator.finish()
}

// ── Segmentation ───────────────────────────────────────────────────────

#[derive(Debug)]
enum Segment {
    Text(String),
    Action(String),
}

fn split_segments(name: &str, input: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = input;
    let mut trim_next_text = false;

    while let Some(start) = rest.find("{{") {
        let mut text = &rest[..start];
        if trim_next_text {
            text = text.trim_start();
        }
        let after_open = &rest[start + 2..];
        let trim_left = has_left_trim(after_open);
        if trim_left {
            text = text.trim_end();
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text.to_string()));
        }

        let body_start = if trim_left { 1 } else { 0 };
        let close = find_close(&after_open[body_start..]).ok_or_else(|| TemplateError::Syntax {
            template: name.to_string(),
            message: "unclosed action".to_string(),
            fragment: fragment(&rest[start..]),
        })?;
        let mut body = &after_open[body_start..body_start + close];
        trim_next_text = has_right_trim(body);
        if trim_next_text {
            body = &body[..body.len() - 1];
        }
        segments.push(Segment::Action(body.trim().to_string()));
        rest = &after_open[body_start + close + 2..];
    }

    let mut text = rest;
    if trim_next_text {
        text = text.trim_start();
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
    Ok(segments)
}

/// `{{- ` requires whitespace after the dash.
fn has_left_trim(after_open: &str) -> bool {
    let mut chars = after_open.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

/// ` -}}` requires whitespace before the dash.
fn has_right_trim(body: &str) -> bool {
    let mut chars = body.chars().rev();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

/// Offset of the closing `}}`, skipping quoted strings.
fn find_close(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'`' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'`' {
                    i += 1;
                }
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn fragment(text: &str) -> String {
    text.chars().take(40).collect()
}

// ── Tokens ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// `.A.B`
    Field(Vec<String>),
    /// `.`
    Dot,
    /// `$name.A.B`; an empty name is the root variable `$`.
    Variable(String, Vec<String>),
    Ident(String),
    Str(String),
    Number(String),
    Bool(bool),
    Nil,
    Pipe,
    LParen,
    RParen,
    Comma,
    Declare,
    Assign,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(body: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '.' => {
                if chars.get(i + 1).is_some_and(|c| is_ident_start(*c)) {
                    let mut path = Vec::new();
                    while chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|c| is_ident_start(*c)) {
                        i += 1;
                        path.push(read_ident(&mut i));
                    }
                    tokens.push(Token::Field(path));
                } else {
                    i += 1;
                    tokens.push(Token::Dot);
                }
            }
            '$' => {
                i += 1;
                let name = read_ident(&mut i);
                let mut path = Vec::new();
                while chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|c| is_ident_start(*c)) {
                    i += 1;
                    path.push(read_ident(&mut i));
                }
                tokens.push(Token::Variable(name, path));
            }
            '"' => {
                i += 1;
                let mut value = String::new();
                loop {
                    let Some(&c) = chars.get(i) else {
                        return Err("unterminated quoted string".to_string());
                    };
                    i += 1;
                    match c {
                        '"' => break,
                        '\\' => {
                            let escaped = chars.get(i).copied().ok_or("unterminated escape")?;
                            i += 1;
                            value.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                'r' => '\r',
                                other => other,
                            });
                        }
                        other => value.push(other),
                    }
                }
                tokens.push(Token::Str(value));
            }
            '`' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '`' {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err("unterminated raw string".to_string());
                }
                tokens.push(Token::Str(chars[start..i].iter().collect()));
                i += 1;
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                tokens.push(Token::Number(chars[start..i].iter().collect()));
            }
            '|' => {
                i += 1;
                tokens.push(Token::Pipe);
            }
            '(' => {
                i += 1;
                tokens.push(Token::LParen);
            }
            ')' => {
                i += 1;
                tokens.push(Token::RParen);
            }
            ',' => {
                i += 1;
                tokens.push(Token::Comma);
            }
            ':' if chars.get(i + 1) == Some(&'=') => {
                i += 2;
                tokens.push(Token::Declare);
            }
            '=' => {
                i += 1;
                tokens.push(Token::Assign);
            }
            c if is_ident_start(c) => {
                let ident = read_ident(&mut i);
                tokens.push(match ident.as_str() {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    "nil" => Token::Nil,
                    _ => Token::Ident(ident),
                });
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(tokens)
}

// ── Translation ────────────────────────────────────────────────────────

#[derive(Debug)]
enum Block {
    If,
    Range { dot: String, in_else: bool },
}

struct Translator<'a> {
    name: &'a str,
    out: String,
    blocks: Vec<Block>,
    /// Declared variables, one scope per open block plus the top level.
    scopes: Vec<Vec<String>>,
    root_paths: BTreeSet<Vec<String>>,
    counter: usize,
    /// Body of the action being translated, for error fragments.
    current: String,
}

impl<'a> Translator<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            out: String::new(),
            blocks: Vec::new(),
            scopes: vec![Vec::new()],
            root_paths: BTreeSet::new(),
            counter: 0,
            current: String::new(),
        }
    }

    fn syntax(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::Syntax {
            template: self.name.to_string(),
            message: message.into(),
            fragment: fragment(&self.current),
        }
    }

    /// Text that minijinja could read as a tag is emitted as a string literal.
    fn emit_text(&mut self, text: &str) {
        if text.contains("{%") || text.contains("{#") || text.ends_with('{') {
            self.out.push_str(&format!("{{{{ {} }}}}", string_literal(text)));
        } else {
            self.out.push_str(text);
        }
    }

    fn finish(self) -> Result<Compiled, TemplateError> {
        if !self.blocks.is_empty() {
            return Err(TemplateError::Syntax {
                template: self.name.to_string(),
                message: "unexpected end of template: missing {{ end }}".to_string(),
                fragment: String::new(),
            });
        }
        Ok(Compiled { source: self.out, root_paths: self.root_paths.into_iter().collect() })
    }

    fn action(&mut self, body: &str) -> Result<(), TemplateError> {
        self.current = body.to_string();
        if body.starts_with("/*") {
            if !body.ends_with("*/") {
                return Err(self.syntax("unclosed comment"));
            }
            return Ok(());
        }

        let tokens = tokenize(body).map_err(|message| self.syntax(message))?;
        match tokens.first() {
            None => Err(self.syntax("missing value for command")),
            Some(Token::Ident(keyword)) => match keyword.as_str() {
                "if" => {
                    let cond = self.pipeline(&tokens[1..])?;
                    self.out.push_str(&format!("{{% if {} %}}", cond));
                    self.blocks.push(Block::If);
                    self.scopes.push(Vec::new());
                    Ok(())
                }
                "else" => self.else_branch(&tokens[1..]),
                "end" => self.end(&tokens[1..]),
                "range" => self.range(&tokens[1..]),
                "with" | "define" | "template" | "block" | "break" | "continue" => {
                    Err(self.syntax(format!("unsupported action '{}'", keyword)))
                }
                _ => self.output(&tokens),
            },
            Some(Token::Variable(var, path))
                if path.is_empty() && !var.is_empty() && tokens.get(1) == Some(&Token::Assign) =>
            {
                Err(self.syntax(format!("assignment to ${} is not supported; declare with :=", var)))
            }
            Some(Token::Variable(var, path))
                if path.is_empty() && !var.is_empty() && tokens.get(1) == Some(&Token::Declare) =>
            {
                let value = self.pipeline(&tokens[2..])?;
                let target = variable_name(var);
                if let Some(scope) = self.scopes.last_mut() {
                    scope.push(var.clone());
                }
                self.out.push_str(&format!("{{% set {} = {} %}}", target, value));
                Ok(())
            }
            Some(_) => self.output(&tokens),
        }
    }

    fn output(&mut self, tokens: &[Token]) -> Result<(), TemplateError> {
        let expr = self.pipeline(tokens)?;
        self.out.push_str(&format!("{{{{ {} }}}}", expr));
        Ok(())
    }

    fn else_branch(&mut self, rest: &[Token]) -> Result<(), TemplateError> {
        let else_if = matches!(rest.first(), Some(Token::Ident(kw)) if kw == "if");
        if !else_if && !rest.is_empty() {
            return Err(self.syntax("unexpected tokens after else"));
        }

        let in_if = matches!(self.blocks.last(), Some(Block::If));
        let in_range = matches!(self.blocks.last(), Some(Block::Range { in_else: false, .. }));

        if in_if && else_if {
            let cond = self.pipeline(&rest[1..])?;
            self.out.push_str(&format!("{{% elif {} %}}", cond));
        } else if in_if {
            self.out.push_str("{% else %}");
        } else if in_range && !else_if {
            if let Some(Block::Range { in_else, .. }) = self.blocks.last_mut() {
                *in_else = true;
            }
            self.out.push_str("{% else %}");
        } else {
            return Err(self.syntax("unexpected else"));
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.clear();
        }
        Ok(())
    }

    fn end(&mut self, rest: &[Token]) -> Result<(), TemplateError> {
        if !rest.is_empty() {
            return Err(self.syntax("unexpected tokens after end"));
        }
        match self.blocks.pop() {
            Some(Block::If) => self.out.push_str("{% endif %}"),
            Some(Block::Range { .. }) => self.out.push_str("{% endfor %}"),
            None => return Err(self.syntax("unexpected end")),
        }
        self.scopes.pop();
        Ok(())
    }

    fn range(&mut self, rest: &[Token]) -> Result<(), TemplateError> {
        let declare_at = rest.iter().position(|t| *t == Token::Declare);
        let (declared, source) = match declare_at {
            Some(at) => {
                let mut names = Vec::new();
                for (index, token) in rest[..at].iter().enumerate() {
                    match (index % 2, token) {
                        (0, Token::Variable(name, path)) if path.is_empty() && !name.is_empty() => {
                            names.push(name.clone())
                        }
                        (1, Token::Comma) => {}
                        _ => return Err(self.syntax("malformed range declaration")),
                    }
                }
                if names.is_empty() || names.len() > 2 || rest[..at].len() % 2 == 0 {
                    return Err(self.syntax("range declares one or two variables"));
                }
                (names, &rest[at + 1..])
            }
            None => (Vec::new(), rest),
        };

        let iterable = self.pipeline(source)?;
        self.counter += 1;
        let (key, value) = match declared.as_slice() {
            [key, value] => (variable_name(key), variable_name(value)),
            [value] => (format!("__key{}", self.counter), variable_name(value)),
            _ => (format!("__key{}", self.counter), format!("__dot{}", self.counter)),
        };

        self.out.push_str(&format!("{{% for {}, {} in ({}) | pairs %}}", key, value, iterable));
        self.blocks.push(Block::Range { dot: value, in_else: false });
        self.scopes.push(declared);
        Ok(())
    }

    /// Innermost dot binding, `None` at the root.
    fn dot(&self) -> Option<&str> {
        self.blocks.iter().rev().find_map(|block| match block {
            Block::Range { dot, in_else: false } => Some(dot.as_str()),
            _ => None,
        })
    }

    fn is_declared(&self, var: &str) -> bool {
        self.scopes.iter().any(|scope| scope.iter().any(|v| v == var))
    }

    fn pipeline(&mut self, tokens: &[Token]) -> Result<String, TemplateError> {
        if tokens.is_empty() {
            return Err(self.syntax("missing value for command"));
        }

        let mut commands = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (index, token) in tokens.iter().enumerate() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth = depth.checked_sub(1).ok_or_else(|| self.syntax("unexpected ')'"))?
                }
                Token::Pipe if depth == 0 => {
                    commands.push(&tokens[start..index]);
                    start = index + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(self.syntax("unclosed '('"));
        }
        commands.push(&tokens[start..]);

        let mut piped: Option<String> = None;
        for command in commands {
            if command.is_empty() {
                return Err(self.syntax("missing command in pipeline"));
            }
            piped = Some(self.command(command, piped)?);
        }
        piped.ok_or_else(|| self.syntax("empty pipeline"))
    }

    fn command(&mut self, tokens: &[Token], piped: Option<String>) -> Result<String, TemplateError> {
        if let Token::Ident(function) = &tokens[0] {
            let mut args = self.operands(&tokens[1..])?;
            args.extend(piped);
            return self.call(function, args);
        }

        let mut operands = self.operands(tokens)?;
        if operands.len() != 1 {
            return Err(self.syntax("can't give argument to non-function"));
        }
        if piped.is_some() {
            return Err(self.syntax("non-function in pipeline"));
        }
        Ok(operands.remove(0))
    }

    fn operands(&mut self, tokens: &[Token]) -> Result<Vec<String>, TemplateError> {
        let mut operands = Vec::new();
        let mut index = 0;
        while index < tokens.len() {
            match &tokens[index] {
                Token::LParen => {
                    let mut depth = 0usize;
                    let mut close = None;
                    for (offset, token) in tokens[index..].iter().enumerate() {
                        match token {
                            Token::LParen => depth += 1,
                            Token::RParen => {
                                depth -= 1;
                                if depth == 0 {
                                    close = Some(index + offset);
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    let close = close.ok_or_else(|| self.syntax("unclosed '('"))?;
                    let inner = self.pipeline(&tokens[index + 1..close])?;
                    operands.push(format!("({})", inner));
                    index = close + 1;
                }
                token => {
                    operands.push(self.operand(token)?);
                    index += 1;
                }
            }
        }
        Ok(operands)
    }

    fn operand(&mut self, token: &Token) -> Result<String, TemplateError> {
        Ok(match token {
            Token::Field(path) => match self.dot() {
                Some(dot) => subscripts(dot, path),
                None => {
                    self.root_paths.insert(path.clone());
                    subscripts(ROOT_VAR, path)
                }
            },
            Token::Dot => self.dot().unwrap_or(ROOT_VAR).to_string(),
            Token::Variable(var, path) if var.is_empty() => {
                if !path.is_empty() {
                    self.root_paths.insert(path.clone());
                }
                subscripts(ROOT_VAR, path)
            }
            Token::Variable(var, path) => {
                if !self.is_declared(var) {
                    return Err(self.syntax(format!("undefined variable ${}", var)));
                }
                subscripts(&variable_name(var), path)
            }
            Token::Str(value) => string_literal(value),
            Token::Number(number) => number.clone(),
            Token::Bool(true) => "true".to_string(),
            Token::Bool(false) => "false".to_string(),
            Token::Nil => "none".to_string(),
            Token::Ident(function) => {
                return Err(self.syntax(format!("function '{}' used as an argument", function)));
            }
            other => return Err(self.syntax(format!("unexpected {:?} in operand", other))),
        })
    }

    fn call(&self, function: &str, args: Vec<String>) -> Result<String, TemplateError> {
        let arity = |expected: usize| -> Result<(), TemplateError> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(self.syntax(format!(
                    "wrong number of args for {}: want {} got {}",
                    function,
                    expected,
                    args.len()
                )))
            }
        };

        match function {
            "index" => {
                if args.len() < 2 {
                    return Err(self.syntax("index needs a collection and at least one key"));
                }
                let mut expr = format!("({})", args[0]);
                for key in &args[1..] {
                    expr = format!("{}[{}]", expr, key);
                }
                Ok(expr)
            }
            "len" => {
                arity(1)?;
                Ok(format!("({} | length)", args[0]))
            }
            "not" => {
                arity(1)?;
                Ok(format!("(not {})", args[0]))
            }
            "eq" | "ne" => {
                arity(2)?;
                let op = if function == "eq" { "==" } else { "!=" };
                Ok(format!("({} {} {})", args[0], op, args[1]))
            }
            "and" | "or" => {
                if args.len() < 2 {
                    return Err(self.syntax(format!("{} needs at least two arguments", function)));
                }
                Ok(format!("({})", args.join(&format!(" {} ", function))))
            }
            _ => {
                let Some((filter, expected)) = filter_for(function) else {
                    return Err(TemplateError::UnknownFunction {
                        template: self.name.to_string(),
                        function: function.to_string(),
                    });
                };
                arity(expected)?;
                let (value, rest) = args.split_last().ok_or_else(|| self.syntax("missing argument"))?;
                if rest.is_empty() {
                    Ok(format!("({} | {})", value, filter))
                } else {
                    Ok(format!("({} | {}({}))", value, filter, rest.join(", ")))
                }
            }
        }
    }
}

/// Functions implemented as filters: name -> (filter name, argument count).
fn filter_for(function: &str) -> Option<(&'static str, usize)> {
    Some(match function {
        "quote" => ("quote", 1),
        "squote" => ("squote", 1),
        "upper" => ("upper", 1),
        "lower" => ("lower", 1),
        "trim" => ("trim", 1),
        "toJson" => ("toJson", 1),
        "indent" => ("indent", 2),
        "nindent" => ("nindent", 2),
        "default" => ("default", 2),
        "join" => ("join", 2),
        "replace" => ("replace", 3),
        _ => return None,
    })
}

fn variable_name(var: &str) -> String {
    format!("_{}", var)
}

fn subscripts(base: &str, path: &[String]) -> String {
    let mut expr = base.to_string();
    for segment in path {
        expr.push('[');
        expr.push_str(&string_literal(segment));
        expr.push(']');
    }
    expr
}

fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\t' => literal.push_str("\\t"),
            '\r' => literal.push_str("\\r"),
            other => literal.push(other),
        }
    }
    literal.push('"');
    literal
}
