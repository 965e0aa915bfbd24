use crate::template::ast::{Builtin, CmpOp, Condition, Expr, Lit};
use crate::template::error::TemplateParseError;
use crate::template::lexer::{Span, Token, TokenKind, lex};

/// Parse a value expression: a path, literal, or allow-listed function call.
pub(crate) fn parse_expr(src: &str) -> Result<Expr, TemplateParseError> {
    let tokens = lex(src.trim())?;
    let mut p = Parser { tokens, pos: 0 };
    let expr = p.parse_operand()?;
    p.expect_eof()?;
    Ok(expr)
}

/// Parse a guard condition: `operand`, or `operand <cmp> operand`.
pub(crate) fn parse_condition(src: &str) -> Result<Condition, TemplateParseError> {
    let tokens = lex(src.trim())?;
    let mut p = Parser { tokens, pos: 0 };
    let left = p.parse_operand()?;
    let op = match p.peek().kind {
        TokenKind::EqEq => Some(CmpOp::Eq),
        TokenKind::Ne => Some(CmpOp::Ne),
        TokenKind::Lt => Some(CmpOp::Lt),
        TokenKind::Le => Some(CmpOp::Le),
        TokenKind::Gt => Some(CmpOp::Gt),
        TokenKind::Ge => Some(CmpOp::Ge),
        _ => None,
    };
    let cond = if let Some(op) = op {
        p.bump();
        let right = p.parse_operand()?;
        Condition::Compare { op, left, right }
    } else {
        Condition::Truthy(left)
    };
    p.expect_eof()?;
    Ok(cond)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        self.pos += 1;
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_eof(&mut self) -> Result<(), TemplateParseError> {
        if self.peek().kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(TemplateParseError::new(
                self.span().start,
                format!("unexpected trailing token {:?}", self.peek().kind),
            ))
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, TemplateParseError> {
        let t = self.bump();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr::Lit(Lit::Number(v))),
            TokenKind::Minus => {
                let inner = self.bump();
                match inner.kind {
                    TokenKind::Number(v) => Ok(Expr::Lit(Lit::Number(-v))),
                    other => Err(TemplateParseError::new(
                        inner.span.start,
                        format!("expected number after '-', found {other:?}"),
                    )),
                }
            }
            TokenKind::Str(s) => Ok(Expr::Lit(Lit::Str(s))),
            TokenKind::True => Ok(Expr::Lit(Lit::Bool(true))),
            TokenKind::False => Ok(Expr::Lit(Lit::Bool(false))),
            TokenKind::Ident(name) => {
                if self.consume(TokenKind::LParen) {
                    let func = Builtin::from_name(&name).ok_or_else(|| {
                        TemplateParseError::new(
                            t.span.start,
                            format!("unknown function '{name}' (not in the allow-list)"),
                        )
                    })?;
                    let args = self.parse_args()?;
                    let (min, max) = func.arity();
                    if args.len() < min || args.len() > max {
                        return Err(TemplateParseError::new(
                            t.span.start,
                            format!(
                                "function '{}' takes {} argument(s), got {}",
                                func.name(),
                                if min == max {
                                    min.to_string()
                                } else {
                                    format!("at least {min}")
                                },
                                args.len()
                            ),
                        ));
                    }
                    Ok(Expr::Call { func, args })
                } else {
                    self.parse_path(name)
                }
            }
            other => Err(TemplateParseError::new(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }

    fn parse_path(&mut self, root: String) -> Result<Expr, TemplateParseError> {
        let mut segments = vec![root];
        while self.consume(TokenKind::Dot) {
            let t = self.bump();
            match t.kind {
                TokenKind::Ident(s) => segments.push(s),
                other => {
                    return Err(TemplateParseError::new(
                        t.span.start,
                        format!("expected ident after '.', found {other:?}"),
                    ));
                }
            }
        }
        Ok(Expr::Path(segments))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, TemplateParseError> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_operand()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            if self.consume(TokenKind::RParen) {
                return Ok(args);
            }
            return Err(TemplateParseError::new(
                self.span().start,
                format!("expected ',' or ')', found {:?}", self.peek().kind),
            ));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/parser.rs"]
mod tests;
