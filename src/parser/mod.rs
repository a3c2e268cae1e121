//! Recursive-descent parser turning policy text into [`Policy`] values.
//!
//! ```text
//! document   := statement (";"? statement)* ";"?
//! statement  := annotation* ( "policy" NAME "{" annotation* body ";"? "}" | body )
//! annotation := "@" IDENT "(" STRING ")"
//! body       := ("permit" | "forbid") "(" scope "," scope "," scope ")" clause*
//! scope      := VAR [ ("==" | "in") entity_ref ]
//! entity_ref := IDENT ("::" IDENT)* "::" (STRING | "*")
//! clause     := ("when" | "unless") "{" cond ("&&"? cond)* "}"
//! cond       := TARGET "." IDENT ("==" | "!=" | "in") literal
//! literal    := STRING | LONG | "true" | "false" | "[" (literal ("," literal)*)? "]"
//! ```
//!
//! A bare statement must be followed by `;` unless it is the last one. The
//! policy name comes from the `policy` wrapper, else from `@id("...")`, else
//! it is `policy_<n>` for the n-th policy of the batch.

pub(crate) mod lexer;

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::types::{
    AttrValue, Condition, ConditionTarget, Effect, EntityRef, Operator, Policy, ScopeConstraint,
    ScopeSlot,
};

use lexer::{Spanned, Token, tokenize};

/// Deepest list literal accepted, counting the outermost list as one.
const MAX_LIST_DEPTH: usize = 32;

/// Parse a single policy, named `policy_1` if it carries no name.
pub fn parse(text: &str) -> Result<Policy, ParseError> {
    parse_nth(text, 1)
}

/// Parse a single policy that is the `n`-th (1-based) entry of a batch; `n`
/// only matters for the default name.
pub fn parse_nth(text: &str, n: usize) -> Result<Policy, ParseError> {
    let mut parser = Parser::new(text)?;
    if parser.at_end() {
        return Err(parser.error_here("empty policy text; expected `permit`, `forbid` or `policy`"));
    }
    let (policy, _) = parser.statement(n)?;
    parser.eat(&Token::Semi);
    if !parser.at_end() {
        return Err(parser.unexpected("end of policy (one policy per text)"));
    }
    Ok(policy)
}

/// Parse a document holding any number of policies, numbered in source order.
///
/// The whole document is rejected on the first error.
pub fn parse_document(text: &str) -> Result<Vec<Policy>, ParseError> {
    let mut parser = Parser::new(text)?;
    let mut policies = Vec::new();
    while !parser.at_end() {
        let (policy, wrapped) = parser.statement(policies.len() + 1)?;
        policies.push(policy);
        if !parser.eat(&Token::Semi) && !wrapped && !parser.at_end() {
            return Err(parser.unexpected("`;` after the policy"));
        }
    }
    Ok(policies)
}

/// Parse a standalone entity reference such as `User::"alice"` or `Action::*`.
pub(crate) fn parse_entity_ref(text: &str) -> Result<EntityRef, ParseError> {
    let mut parser = Parser::new(text)?;
    let entity = parser.entity_ref()?;
    if !parser.at_end() {
        return Err(parser.unexpected("end of entity reference"));
    }
    Ok(entity)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    end: (usize, usize),
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Result<Self, ParseError> {
        let (tokens, end) = tokenize(text)?;
        Ok(Parser {
            text,
            tokens,
            pos: 0,
            end,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s == keyword)
    }

    /// Consume `token` if it is next.
    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let (line, column) = self
            .tokens
            .get(self.pos)
            .map(|s| (s.line, s.column))
            .unwrap_or(self.end);
        ParseError::new(message, self.text, line, column)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = self
            .peek()
            .map(Token::describe)
            .unwrap_or_else(|| "end of input".to_string());
        self.error_here(format!("expected {expected}, found {found}"))
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), ParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.at_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{keyword}`")))
        }
    }

    /// One policy. Also reports whether it used the `policy Name { .. }` form.
    fn statement(&mut self, n: usize) -> Result<(Policy, bool), ParseError> {
        let mut annotations = BTreeMap::new();
        self.annotations(&mut annotations)?;

        let mut wrapper_name = None;
        let wrapped = self.at_keyword("policy");
        if wrapped {
            self.pos += 1;
            wrapper_name = Some(self.policy_name()?);
            self.expect(Token::LBrace, "`{` after the policy name")?;
            self.annotations(&mut annotations)?;
        }

        let mut policy = self.body()?;

        if wrapped {
            self.eat(&Token::Semi);
            self.expect(Token::RBrace, "`}` closing the policy block")?;
        }

        policy.name = wrapper_name
            .or_else(|| annotations.get("id").cloned())
            .unwrap_or_else(|| format!("policy_{n}"));
        policy.annotations = annotations;
        Ok((policy, wrapped))
    }

    fn policy_name(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(s)) | Some(Token::Str(s)) if !s.is_empty() => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected("a policy name")),
        }
    }

    fn annotations(&mut self, into: &mut BTreeMap<String, String>) -> Result<(), ParseError> {
        while self.peek() == Some(&Token::At) {
            self.pos += 1;
            let key = self.expect_ident("an annotation name after `@`")?;
            if into.contains_key(&key) {
                self.pos -= 1;
                return Err(self.error_here(format!("duplicate annotation `@{key}`")));
            }
            self.expect(Token::LParen, "`(` after the annotation name")?;
            let value = match self.peek() {
                Some(Token::Str(s)) if key == "id" && s.is_empty() => {
                    return Err(self.error_here("`@id` must not be empty"));
                }
                Some(Token::Str(s)) => s.clone(),
                _ => return Err(self.unexpected("a quoted annotation value")),
            };
            self.pos += 1;
            self.expect(Token::RParen, "`)` closing the annotation")?;
            into.insert(key, value);
        }
        Ok(())
    }

    fn body(&mut self) -> Result<Policy, ParseError> {
        let effect = match self.peek() {
            Some(Token::Ident(s)) if s == "permit" => Effect::Permit,
            Some(Token::Ident(s)) if s == "forbid" => Effect::Forbid,
            _ => return Err(self.unexpected("`permit` or `forbid`")),
        };
        self.pos += 1;

        self.expect(Token::LParen, &format!("`(` after `{effect}`"))?;
        let principal = self.scope(ScopeSlot::Principal)?;
        self.expect(Token::Comma, "`,` after the principal scope")?;
        let action = self.scope(ScopeSlot::Action)?;
        self.expect(Token::Comma, "`,` after the action scope")?;
        let resource = self.scope(ScopeSlot::Resource)?;
        self.expect(Token::RParen, "`)` after the resource scope")?;

        let mut when = Vec::new();
        let mut unless = Vec::new();
        loop {
            if self.at_keyword("when") {
                self.pos += 1;
                when.extend(self.condition_block()?);
            } else if self.at_keyword("unless") {
                self.pos += 1;
                unless.extend(self.condition_block()?);
            } else {
                break;
            }
        }

        Ok(Policy {
            name: String::new(),
            effect,
            principal,
            action,
            resource,
            when,
            unless,
            annotations: BTreeMap::new(),
        })
    }

    fn scope(&mut self, slot: ScopeSlot) -> Result<ScopeConstraint, ParseError> {
        self.expect_keyword(&slot.to_string())?;
        if self.eat(&Token::EqEq) {
            Ok(ScopeConstraint::Equals(self.entity_ref()?))
        } else if self.at_keyword("in") {
            self.pos += 1;
            Ok(ScopeConstraint::In(self.entity_ref()?))
        } else {
            Ok(ScopeConstraint::Any)
        }
    }

    fn entity_ref(&mut self) -> Result<EntityRef, ParseError> {
        let mut segments = vec![self.expect_ident("an entity type")?];
        loop {
            self.expect(Token::ColonColon, "`::` in entity reference")?;
            let entity = match self.peek() {
                Some(Token::Str(id)) => EntityRef::new(segments.join("::"), id.clone()),
                Some(Token::Star) => EntityRef::wildcard(segments.join("::")),
                Some(Token::Ident(segment)) => {
                    segments.push(segment.clone());
                    self.pos += 1;
                    continue;
                }
                _ => return Err(self.unexpected("a quoted id, `*` or a type name after `::`")),
            };
            let entity = entity.map_err(|e| self.error_here(e.to_string()))?;
            self.pos += 1;
            return Ok(entity);
        }
    }

    fn condition_block(&mut self) -> Result<Vec<Condition>, ParseError> {
        self.expect(Token::LBrace, "`{` opening the condition block")?;
        let mut conditions = vec![self.condition()?];
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.pos += 1;
                    return Ok(conditions);
                }
                Some(Token::AndAnd) => {
                    self.pos += 1;
                    conditions.push(self.condition()?);
                }
                Some(Token::Ident(_)) => conditions.push(self.condition()?),
                _ => return Err(self.unexpected("`&&`, another condition or `}`")),
            }
        }
    }

    fn condition(&mut self) -> Result<Condition, ParseError> {
        let target = match self.peek() {
            Some(Token::Ident(s)) => s.parse::<ConditionTarget>().map_err(|_| {
                self.error_here(format!(
                    "unknown condition target `{s}`; expected `principal`, `action`, `resource` or `context`"
                ))
            })?,
            _ => return Err(self.unexpected("a condition such as `principal.hasGroup == \"name\"`")),
        };
        self.pos += 1;
        self.expect(Token::Dot, &format!("`.` after `{target}`"))?;
        let attribute = self.expect_ident("an attribute name")?;

        let operator = match self.peek() {
            Some(Token::EqEq) => Operator::Equals,
            Some(Token::NotEq) => Operator::NotEquals,
            Some(Token::Ident(s)) if s == "in" => Operator::In,
            _ => return Err(self.unexpected("`==`, `!=` or `in`")),
        };
        self.pos += 1;

        let literal_at = self.pos;
        let value = self.literal(0)?;
        if operator == Operator::In && !matches!(value, AttrValue::Set(_)) {
            self.pos = literal_at;
            return Err(self.error_here("`in` expects a list literal such as [\"a\", \"b\"]"));
        }

        Ok(Condition {
            target,
            attribute,
            operator,
            value,
        })
    }

    /// `depth` counts the list literals already open around this one.
    fn literal(&mut self, depth: usize) -> Result<AttrValue, ParseError> {
        let value = match self.peek() {
            Some(Token::Str(s)) => AttrValue::String(s.clone()),
            Some(Token::Long(n)) => AttrValue::Long(*n),
            Some(Token::Ident(s)) if s == "true" => AttrValue::Bool(true),
            Some(Token::Ident(s)) if s == "false" => AttrValue::Bool(false),
            Some(Token::LBracket) if depth >= MAX_LIST_DEPTH => {
                return Err(self.error_here("list literals nest too deeply"));
            }
            Some(Token::LBracket) => {
                self.pos += 1;
                return self.list_literal(depth + 1);
            }
            _ => return Err(self.unexpected("a string, number, boolean or list literal")),
        };
        self.pos += 1;
        Ok(value)
    }

    fn list_literal(&mut self, depth: usize) -> Result<AttrValue, ParseError> {
        let mut items = Vec::new();
        if self.eat(&Token::RBracket) {
            return Ok(AttrValue::Set(items));
        }
        loop {
            items.push(self.literal(depth)?);
            if self.eat(&Token::RBracket) {
                return Ok(AttrValue::Set(items));
            }
            self.expect(Token::Comma, "`,` or `]` in list literal")?;
        }
    }
}

#[cfg(test)]
mod tests;
