use crate::expression::error::ExpressionError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    True,
    False,

    LParen,
    RParen,
    Comma,
    Dot,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,

    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,

    Question,
    Colon,

    Eof,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Number(v) => format!("number {v}"),
            Self::Eof => "end of input".to_owned(),
            other => format!("{other:?}"),
        }
    }
}

pub(crate) fn lex(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while let Some(&b) = bytes.get(i) {
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let starts_number =
            b.is_ascii_digit() || (b == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit));

        let kind = if starts_number {
            i = scan_number(bytes, i)?;
            let text = &input[start..i];
            let v: f64 = text
                .parse()
                .map_err(|_| ExpressionError::new(start, format!("invalid number '{text}'")))?;
            TokenKind::Number(v)
        } else if b.is_ascii_alphabetic() || b == b'_' {
            while bytes.get(i).is_some_and(|c| c.is_ascii_alphanumeric() || *c == b'_') {
                i += 1;
            }
            match &input[start..i] {
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                ident => TokenKind::Ident(ident.to_owned()),
            }
        } else {
            let next = bytes.get(i + 1).copied();
            let (kind, width) = match (b, next) {
                (b'&', Some(b'&')) => (TokenKind::AndAnd, 2),
                (b'|', Some(b'|')) => (TokenKind::OrOr, 2),
                (b'=', Some(b'=')) => (TokenKind::EqEq, 2),
                (b'!', Some(b'=')) => (TokenKind::Ne, 2),
                (b'<', Some(b'=')) => (TokenKind::Le, 2),
                (b'>', Some(b'=')) => (TokenKind::Ge, 2),
                (b'(', _) => (TokenKind::LParen, 1),
                (b')', _) => (TokenKind::RParen, 1),
                (b',', _) => (TokenKind::Comma, 1),
                (b'.', _) => (TokenKind::Dot, 1),
                (b'+', _) => (TokenKind::Plus, 1),
                (b'-', _) => (TokenKind::Minus, 1),
                (b'*', _) => (TokenKind::Star, 1),
                (b'/', _) => (TokenKind::Slash, 1),
                (b'%', _) => (TokenKind::Percent, 1),
                (b'!', _) => (TokenKind::Bang, 1),
                (b'<', _) => (TokenKind::Lt, 1),
                (b'>', _) => (TokenKind::Gt, 1),
                (b'?', _) => (TokenKind::Question, 1),
                (b':', _) => (TokenKind::Colon, 1),
                _ => {
                    let c = input[start..].chars().next().unwrap_or('?');
                    return Err(ExpressionError::new(start, format!("unexpected character '{c}'")));
                }
            };
            i += width;
            kind
        };

        tokens.push(Token { kind, offset: start });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: input.len(),
    });
    Ok(tokens)
}

/// Number: `[0-9]+(.[0-9]+)?([eE][+-]?[0-9]+)?` or `.[0-9]+(...)`.
/// Returns the end offset.
fn scan_number(bytes: &[u8], mut i: usize) -> Result<usize, ExpressionError> {
    let digits = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    i = digits(i);
    if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
        i = digits(i + 1);
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let e_pos = i;
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        i = digits(i);
        if i == exp_start {
            return Err(ExpressionError::new(e_pos, "invalid number exponent (expected digits)"));
        }
    }
    Ok(i)
}
