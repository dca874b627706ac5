//! Recursive-descent parser producing [`Expr`] trees.
//!
//! Precedence, loosest first: `or`, `and`, `not`, comparison chains,
//! subscripts, atoms.

use crate::error::GrammarError;
use crate::types::Value;

use super::ast::{BoolOp, CompareOp, Expr};
use super::lexer::{Spanned, Token, tokenize};

/// Longest expression text accepted, in bytes.
pub const MAX_EXPRESSION_LENGTH: usize = 4096;

/// Deepest nesting of parentheses, brackets, subscripts and `not` accepted.
pub const MAX_NESTING_DEPTH: usize = 64;

pub(crate) fn parse(source: &str) -> Result<Expr, GrammarError> {
    if source.len() > MAX_EXPRESSION_LENGTH {
        return Err(GrammarError::TooLong {
            len: source.len(),
            max: MAX_EXPRESSION_LENGTH,
        });
    }
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let expr = parser.or_expr(0)?;
    match parser.peek() {
        None => Ok(expr),
        Some(spanned) => Err(unexpected(spanned, "end of expression")),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|s| &s.token)
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|s| &s.token)
    }

    fn next(&mut self, expected: &str) -> Result<Spanned, GrammarError> {
        let spanned = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| GrammarError::UnexpectedEnd(expected.to_string()))?;
        self.pos += 1;
        Ok(spanned)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek_token() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), GrammarError> {
        let spanned = self.next(expected)?;
        if spanned.token == token {
            Ok(())
        } else {
            Err(unexpected(&spanned, expected))
        }
    }

    fn or_expr(&mut self, depth: usize) -> Result<Expr, GrammarError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(GrammarError::TooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        let mut operands = vec![self.and_expr(depth)?];
        while self.eat(&Token::Or) {
            operands.push(self.and_expr(depth)?);
        }
        Ok(bool_op(BoolOp::Or, operands))
    }

    fn and_expr(&mut self, depth: usize) -> Result<Expr, GrammarError> {
        let mut operands = vec![self.not_expr(depth)?];
        while self.eat(&Token::And) {
            operands.push(self.not_expr(depth)?);
        }
        Ok(bool_op(BoolOp::And, operands))
    }

    fn not_expr(&mut self, depth: usize) -> Result<Expr, GrammarError> {
        if self.eat(&Token::Not) {
            if depth + 1 > MAX_NESTING_DEPTH {
                return Err(GrammarError::TooDeep {
                    max: MAX_NESTING_DEPTH,
                });
            }
            return Ok(Expr::Not(Box::new(self.not_expr(depth + 1)?)));
        }
        self.comparison(depth)
    }

    fn comparison(&mut self, depth: usize) -> Result<Expr, GrammarError> {
        let left = self.postfix(depth)?;
        let mut chain = Vec::new();
        while let Some(op) = self.compare_op() {
            chain.push((op, self.postfix(depth)?));
        }
        Ok(if chain.is_empty() {
            left
        } else {
            Expr::Compare {
                left: Box::new(left),
                chain,
            }
        })
    }

    /// Consume a comparison operator if one is next.
    fn compare_op(&mut self) -> Option<CompareOp> {
        let (op, width) = match (self.peek_token()?, self.peek_second()) {
            (Token::Eq, _) => (CompareOp::Eq, 1),
            (Token::NotEq, _) => (CompareOp::NotEq, 1),
            (Token::Lt, _) => (CompareOp::Lt, 1),
            (Token::LtE, _) => (CompareOp::LtE, 1),
            (Token::Gt, _) => (CompareOp::Gt, 1),
            (Token::GtE, _) => (CompareOp::GtE, 1),
            (Token::In, _) => (CompareOp::In, 1),
            (Token::Not, Some(Token::In)) => (CompareOp::NotIn, 2),
            _ => return None,
        };
        self.pos += width;
        Some(op)
    }

    fn postfix(&mut self, depth: usize) -> Result<Expr, GrammarError> {
        let mut expr = self.atom(depth)?;
        let mut depth = depth;
        while let Some(Spanned { token, offset }) = self.peek().cloned() {
            match token {
                Token::LBracket => {
                    self.pos += 1;
                    depth += 1;
                    let index = self.or_expr(depth)?;
                    if let Some(colon) = self.peek().filter(|s| s.token == Token::Colon) {
                        return Err(disallowed("slice", colon.offset));
                    }
                    self.expect(Token::RBracket, "']'")?;
                    expr = Expr::Subscript {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Token::LParen => return Err(disallowed("function call", offset)),
                _ => break,
            }
        }
        Ok(expr)
    }

    fn atom(&mut self, depth: usize) -> Result<Expr, GrammarError> {
        let spanned = self.next("an operand")?;
        let expr = match spanned.token {
            Token::Name(name) => Expr::Name(name),
            Token::Number(n) => Expr::Constant(Value::Number(n)),
            Token::Str(s) => Expr::Constant(Value::String(s)),
            Token::True => Expr::Constant(Value::Bool(true)),
            Token::False => Expr::Constant(Value::Bool(false)),
            Token::None => Expr::Constant(Value::Null),
            Token::LParen => self.parenthesised(depth + 1)?,
            Token::LBracket => {
                Expr::List(self.sequence(Token::RBracket, "']'", depth + 1)?.0)
            }
            Token::LBrace => self.mapping(depth + 1)?,
            _ => return Err(unexpected(&spanned, "an operand")),
        };
        Ok(expr)
    }

    /// After `(`: a grouped expression or a tuple.
    fn parenthesised(&mut self, depth: usize) -> Result<Expr, GrammarError> {
        let (mut items, trailing_comma) = self.sequence(Token::RParen, "')'", depth)?;
        Ok(if items.len() == 1 && !trailing_comma {
            items.remove(0)
        } else {
            Expr::Tuple(items)
        })
    }

    /// Comma-separated expressions up to `close`; reports whether a comma
    /// followed the last item.
    fn sequence(
        &mut self,
        close: Token,
        expected: &str,
        depth: usize,
    ) -> Result<(Vec<Expr>, bool), GrammarError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        while !self.eat(&close) {
            if !items.is_empty() && !trailing_comma {
                let spanned = self.next(expected)?;
                return Err(unexpected(&spanned, &format!("',' or {expected}")));
            }
            items.push(self.or_expr(depth)?);
            trailing_comma = self.eat(&Token::Comma);
        }
        Ok((items, trailing_comma))
    }

    /// After `{`: a mapping literal with `key: value` entries.
    fn mapping(&mut self, depth: usize) -> Result<Expr, GrammarError> {
        let mut entries = Vec::new();
        loop {
            if self.eat(&Token::RBrace) {
                return Ok(Expr::Map(entries));
            }
            let key = self.or_expr(depth)?;
            if entries.is_empty()
                && let Some(spanned) = self
                    .peek()
                    .filter(|s| matches!(s.token, Token::Comma | Token::RBrace))
            {
                return Err(disallowed("set literal", spanned.offset));
            }
            self.expect(Token::Colon, "':'")?;
            let value = self.or_expr(depth)?;
            entries.push((key, value));
            if !self.eat(&Token::Comma) {
                self.expect(Token::RBrace, "',' or '}'")?;
                return Ok(Expr::Map(entries));
            }
        }
    }
}

fn bool_op(op: BoolOp, mut operands: Vec<Expr>) -> Expr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        Expr::BoolOp { op, operands }
    }
}

fn disallowed(construct: &str, offset: usize) -> GrammarError {
    GrammarError::Disallowed {
        construct: construct.to_string(),
        offset,
    }
}

/// Error for a token that does not fit here. Tokens outside the allow-list are
/// reported by the construct they would introduce.
fn unexpected(spanned: &Spanned, expected: &str) -> GrammarError {
    let offset = spanned.offset;
    match &spanned.token {
        Token::Forbidden(op @ ("+" | "-" | "*" | "/" | "//" | "%" | "**" | "@")) => {
            disallowed(&format!("arithmetic operator '{op}'"), offset)
        }
        Token::Forbidden(op @ ("&" | "|" | "^" | "~" | "<<" | ">>")) => {
            disallowed(&format!("bitwise operator '{op}'"), offset)
        }
        Token::Forbidden(".") => disallowed("attribute access", offset),
        Token::Forbidden("=" | ":=") => disallowed("assignment", offset),
        Token::Forbidden(op) => disallowed(&format!("operator '{op}'"), offset),
        Token::Reserved(word) => {
            let construct = match word.as_str() {
                "is" => "identity comparison 'is'".to_string(),
                "if" | "else" => "conditional expression".to_string(),
                "for" | "async" => "comprehension".to_string(),
                "lambda" => "lambda".to_string(),
                "await" | "yield" => format!("'{word}' expression"),
                other => format!("keyword '{other}'"),
            };
            disallowed(&construct, offset)
        }
        token => GrammarError::UnexpectedToken {
            found: token.to_string(),
            expected: expected.to_string(),
            offset,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn render(source: &str) -> String {
        parse(source).unwrap().to_string()
    }

    #[parameterized(
        single_compare = { r#"role == "pro""#, r#"(role == "pro")"# },
        and_binds_tighter = { "a or b and c", "(a or (b and c))" },
        flat_or = { "a or b or c", "(a or b or c)" },
        not_over_compare = { "not a == b", "(not (a == b))" },
        double_not = { "not not a", "(not (not a))" },
        chain = { "1 < x <= 10", "(1 < x <= 10)" },
        not_in = { "x not in ys", "(x not in ys)" },
        grouping = { "(a or b) and c", "((a or b) and c)" },
        tuple = { "x in (1, 2)", "(x in (1, 2))" },
        singleton_tuple = { "x in (1,)", "(x in (1,))" },
        empty_tuple = { "()", "()" },
        list = { r#"["a", "b"][0]"#, r#"["a", "b"][0]"# },
        mapping = { r#"{"k": 1}["k"] == level"#, r#"({"k": 1}["k"] == level)"# },
        constants = { "None != True", "(None != True)" },
    )]
    fn test_parse_shapes(source: &str, expected: &str) {
        assert_eq!(render(source), expected);
    }

    #[test]
    fn test_names_collected() {
        let expr = parse(r#"(role == "pro") or (dept in teams[idx] and not missing)"#).unwrap();
        let names: Vec<&str> = expr.names().into_iter().collect();
        assert_eq!(names, vec!["dept", "idx", "missing", "role", "teams"]);
    }

    #[parameterized(
        addition = { "level + 1 > 3", "arithmetic operator '+'" },
        unary_minus = { "level > -1", "arithmetic operator '-'" },
        power = { "2 ** 8", "arithmetic operator '**'" },
        bitwise = { "a | b", "bitwise operator '|'" },
        attribute = { "role.upper", "attribute access" },
        assignment = { "x = 1", "assignment" },
        walrus = { "(x := 1)", "assignment" },
        call = { "len(roles)", "function call" },
        call_on_subscript = { "roles[0]()", "function call" },
        slice = { "roles[0:1]", "slice" },
        identity = { "x is None", "identity comparison 'is'" },
        ternary = { "a if b else c", "conditional expression" },
        lambda = { "lambda: 1", "lambda" },
        comprehension = { "[x for x in roles]", "comprehension" },
        set_literal = { "{1, 2}", "set literal" },
        import = { "import os", "keyword 'import'" },
    )]
    fn test_disallowed_constructs(source: &str, construct: &str) {
        match parse(source) {
            Err(GrammarError::Disallowed { construct: found, .. }) => assert_eq!(found, construct),
            other => panic!("expected disallowed {construct}, got {other:?}"),
        }
    }

    #[parameterized(
        dangling_and = { "a and" },
        dangling_compare = { "a ==" },
        open_paren = { "(a" },
        open_list = { "[1, 2" },
        open_map = { "{\"a\": 1" },
        missing_comma = { "[1 2]" },
        adjacent_names = { "a b" },
        bare_tuple = { "a, b" },
        empty_subscript = { "a[]" },
        compare_then_not = { "a == not b" },
        lone_operator = { "==" },
    )]
    fn test_malformed(source: &str) {
        assert!(matches!(
            parse(source),
            Err(GrammarError::UnexpectedToken { .. } | GrammarError::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn test_error_offsets() {
        assert_eq!(
            parse("a b"),
            Err(GrammarError::UnexpectedToken {
                found: "name 'b'".to_string(),
                expected: "end of expression".to_string(),
                offset: 2,
            })
        );
        assert_eq!(
            parse("a and"),
            Err(GrammarError::UnexpectedEnd("an operand".to_string()))
        );
    }

    #[test]
    fn test_too_long() {
        let source = "a or ".repeat(MAX_EXPRESSION_LENGTH / 5 + 1) + "a";
        assert!(matches!(parse(&source), Err(GrammarError::TooLong { .. })));
    }

    #[test]
    fn test_too_deep() {
        let deep = "(".repeat(MAX_NESTING_DEPTH + 1) + "a" + &")".repeat(MAX_NESTING_DEPTH + 1);
        assert_eq!(
            parse(&deep),
            Err(GrammarError::TooDeep {
                max: MAX_NESTING_DEPTH
            })
        );
        let nots = "not ".repeat(MAX_NESTING_DEPTH + 1) + "a";
        assert!(matches!(parse(&nots), Err(GrammarError::TooDeep { .. })));
        let subscripts = "a".to_string() + &"[0]".repeat(MAX_NESTING_DEPTH + 1);
        assert!(matches!(parse(&subscripts), Err(GrammarError::TooDeep { .. })));
    }

    #[test]
    fn test_nesting_within_limit() {
        let nested = "(".repeat(MAX_NESTING_DEPTH) + "a" + &")".repeat(MAX_NESTING_DEPTH);
        assert_eq!(parse(&nested), Ok(Expr::Name("a".to_string())));
    }
}
