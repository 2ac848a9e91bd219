use smallvec::SmallVec;

use crate::expression::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::expression::error::ExpressionError;
use crate::expression::lexer::{Token, TokenKind, lex};

/// Maximum nesting of the parsed tree, counting parentheses, operator chains,
/// unary prefixes and call arguments.
const MAX_DEPTH: usize = 128;

/// Parses a full expression. Precedence, lowest first:
/// `?:`, `||`, `&&`, `== !=`, `< <= > >=`, `+ -`, `* / %`, unary `- !`,
/// postfix `.field` / `(args)`.
pub(crate) fn parse_expr(src: &str) -> Result<Expr, ExpressionError> {
    let tokens = lex(src)?;
    let mut p = Parser { tokens, pos: 0, depth: 0 };
    let expr = p.parse_conditional()?;
    p.expect(&TokenKind::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token list always ends with Eof and `bump` never moves past it.
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if t.kind != TokenKind::Eof {
            self.pos += 1;
        }
        t
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ExpressionError> {
        if self.consume(kind) {
            Ok(())
        } else {
            let t = self.peek();
            Err(ExpressionError::new(
                t.offset,
                format!("expected {}, found {}", kind.describe(), t.kind.describe()),
            ))
        }
    }

    /// Opens one nesting level. Every `descend` is paired with an `ascend`
    /// on success; errors abort the whole parse.
    fn descend(&mut self, offset: usize) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::new(offset, "expression nested too deeply"));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn parse_conditional(&mut self) -> Result<Expr, ExpressionError> {
        self.descend(self.peek().offset)?;
        let expr = self.parse_conditional_inner()?;
        self.ascend(1);
        Ok(expr)
    }

    fn parse_conditional_inner(&mut self) -> Result<Expr, ExpressionError> {
        let cond = self.parse_or()?;
        if !self.consume(&TokenKind::Question) {
            return Ok(cond);
        }
        let then = self.parse_conditional()?;
        self.expect(&TokenKind::Colon)?;
        let otherwise = self.parse_conditional()?;
        let offset = cond.offset;
        Ok(Expr {
            kind: ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            offset,
        })
    }

    /// Left-associative binary level: `next (op next)*`.
    fn parse_binary_level(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ExpressionError>,
    ) -> Result<Expr, ExpressionError> {
        let mut left = next(self)?;
        // Each fold deepens the left spine by one.
        let mut folds = 0;
        'outer: loop {
            for (token, op) in ops {
                if &self.peek().kind == token {
                    let offset = self.bump().offset;
                    self.descend(offset)?;
                    folds += 1;
                    let right = next(self)?;
                    left = Expr {
                        kind: ExprKind::Binary {
                            op: *op,
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        offset,
                    };
                    continue 'outer;
                }
            }
            self.ascend(folds);
            return Ok(left);
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExpressionError> {
        self.parse_binary_level(&[(TokenKind::OrOr, BinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, ExpressionError> {
        self.parse_binary_level(&[(TokenKind::AndAnd, BinaryOp::And)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExpressionError> {
        self.parse_binary_level(
            &[(TokenKind::EqEq, BinaryOp::Eq), (TokenKind::Ne, BinaryOp::Ne)],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExpressionError> {
        self.parse_binary_level(
            &[
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::Ge, BinaryOp::Ge),
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expr, ExpressionError> {
        self.parse_binary_level(
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
            Self::parse_factor,
        )
    }

    fn parse_factor(&mut self) -> Result<Expr, ExpressionError> {
        self.parse_binary_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let offset = self.bump().offset;
        self.descend(offset)?;
        let expr = self.parse_unary()?;
        self.ascend(1);
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            offset,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExpressionError> {
        let mut e = self.parse_primary()?;
        let mut folds = 0;

        loop {
            if self.consume(&TokenKind::Dot) {
                let t = self.bump();
                self.descend(t.offset)?;
                folds += 1;
                let TokenKind::Ident(field) = t.kind else {
                    return Err(ExpressionError::new(
                        t.offset,
                        format!("expected field name after '.', found {}", t.kind.describe()),
                    ));
                };
                let offset = e.offset;
                e = Expr {
                    kind: ExprKind::Member {
                        base: Box::new(e),
                        field,
                    },
                    offset,
                };
                continue;
            }

            if self.peek().kind == TokenKind::LParen {
                let paren = self.bump().offset;
                let ExprKind::Ident(func) = e.kind else {
                    return Err(ExpressionError::new(paren, "call target must be a function name"));
                };
                let args = self.parse_args()?;
                e = Expr {
                    kind: ExprKind::Call { func, args },
                    offset: e.offset,
                };
                continue;
            }

            self.ascend(folds);
            return Ok(e);
        }
    }

    fn parse_args(&mut self) -> Result<SmallVec<[Box<Expr>; 4]>, ExpressionError> {
        let mut args = SmallVec::new();
        if self.consume(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(Box::new(self.parse_conditional()?));
            if self.consume(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        let t = self.bump();
        let kind = match t.kind {
            TokenKind::Number(v) => ExprKind::Number(v),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Ident(name) => ExprKind::Ident(name),
            TokenKind::LParen => {
                let e = self.parse_conditional()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(e);
            }
            other => {
                return Err(ExpressionError::new(
                    t.offset,
                    format!("unexpected {}", other.describe()),
                ));
            }
        };
        Ok(Expr { kind, offset: t.offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let e = parse_expr("1 + 2 * 3").unwrap();
        let ExprKind::Binary { op: BinaryOp::Add, right, .. } = e.kind else {
            panic!("unexpected ast");
        };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn parses_member_and_call_chains() {
        let e = parse_expr("vec3(1, 2, 3).y").unwrap();
        let ExprKind::Member { base, field } = e.kind else {
            panic!("unexpected ast");
        };
        assert_eq!(field, "y");
        assert!(matches!(base.kind, ExprKind::Call { ref func, ref args } if func == "vec3" && args.len() == 3));
    }

    #[test]
    fn conditional_is_right_associative() {
        let e = parse_expr("a ? 1 : b ? 2 : 3").unwrap();
        let ExprKind::Conditional { otherwise, .. } = e.kind else {
            panic!("unexpected ast");
        };
        assert!(matches!(otherwise.kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse_expr("1 2").unwrap_err();
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn call_on_non_identifier_is_rejected() {
        assert!(parse_expr("2(1)").is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let parens = format!("{}value{}", "(".repeat(100_000), ")".repeat(100_000));
        let err = parse_expr(&parens).unwrap_err();
        assert!(err.message.contains("nested too deeply"), "{err}");

        let negations = format!("{}1", "-".repeat(100_000));
        assert!(parse_expr(&negations).is_err());

        let chain = format!("1{}", " + 1".repeat(100_000));
        assert!(parse_expr(&chain).is_err());

        let members = format!("value{}", ".x".repeat(100_000));
        assert!(parse_expr(&members).is_err());
    }

    #[test]
    fn moderate_nesting_still_parses() {
        let src = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert!(parse_expr(&src).is_ok());
        assert!(parse_expr(&format!("1{}", " + 1".repeat(100))).is_ok());
    }
}
