//! Template interpolation over a merged tree.
//!
//! `{{ dotted.path }}` placeholders are substituted after all layers have
//! been combined, so a leaf fragment may reference a key defined only in
//! an ancestor and vice versa. Resolution is recursive (a referenced
//! string may itself contain placeholders) with cycle detection.
//!
//! Path references interact with templating in both directions:
//!
//! - a plain string referencing a `!path` key sees the *adjusted* textual
//!   form, computed against the destination before substitution;
//! - a `!path` raw string may itself contain placeholders, substituted
//!   before the path is adjusted.
//!
//! Referencing an undefined key, a cycle, or a non-scalar value aborts
//! the compile.

use std::sync::LazyLock;

use regex::Regex;

use super::error::{DomainError, DomainResult};
use super::pathref::PathStyle;
use super::value::{Mapping, Value};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(.*?)\s*\}\}").expect("placeholder regex"));

/// Substitute every placeholder in `tree`, in place.
///
/// `style` controls the textual form path references take when they are
/// referenced from inside another string.
pub fn interpolate(tree: &mut Mapping, style: &PathStyle) -> DomainResult<()> {
    let context = tree.clone();
    let resolver = Resolver {
        root: &context,
        style,
    };
    walk_mapping(tree, &resolver)
}

fn walk_mapping(mapping: &mut Mapping, resolver: &Resolver<'_>) -> DomainResult<()> {
    for value in mapping.values_mut() {
        walk_value(value, resolver)?;
    }
    Ok(())
}

fn walk_value(value: &mut Value, resolver: &Resolver<'_>) -> DomainResult<()> {
    match value {
        Value::String(s) if s.contains("{{") => {
            let mut stack = Vec::new();
            let rendered = resolver.render_text(s, &mut stack)?;
            *s = rendered;
        }
        Value::Path(p) if p.raw().contains("{{") => {
            let mut stack = Vec::new();
            let raw = resolver.render_text(p.raw(), &mut stack)?;
            *p = p.with_raw(raw);
        }
        Value::Sequence(items) => {
            for item in items {
                walk_value(item, resolver)?;
            }
        }
        Value::Mapping(m) => walk_mapping(m, resolver)?,
        _ => {}
    }
    Ok(())
}

struct Resolver<'a> {
    root: &'a Mapping,
    style: &'a PathStyle,
}

impl Resolver<'_> {
    /// Dotted lookup against the merged tree.
    fn lookup(&self, expr: &str) -> Option<&Value> {
        let mut segments = expr.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_mapping()?.get(segment)?;
        }
        Some(current)
    }

    /// Render one `{{ expr }}` reference to its textual form.
    fn render_expr(&self, expr: &str, stack: &mut Vec<String>) -> DomainResult<String> {
        if stack.iter().any(|seen| seen == expr) {
            return Err(DomainError::CircularReference {
                expr: expr.to_owned(),
            });
        }
        let value = self
            .lookup(expr)
            .ok_or_else(|| DomainError::UndefinedReference {
                expr: expr.to_owned(),
            })?;

        stack.push(expr.to_owned());
        let rendered = match value {
            Value::String(s) => self.render_text(s, stack)?,
            Value::Path(p) => {
                let raw = self.render_text(p.raw(), stack)?;
                p.with_raw(raw).render(self.style)
            }
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Sequence(_) | Value::Mapping(_) => {
                stack.pop();
                return Err(DomainError::NonScalarReference {
                    expr: expr.to_owned(),
                    kind: value.kind(),
                });
            }
        };
        stack.pop();
        Ok(rendered)
    }

    /// Replace every placeholder occurrence in `text`.
    fn render_text(&self, text: &str, stack: &mut Vec<String>) -> DomainResult<String> {
        if !text.contains("{{") {
            return Ok(text.to_owned());
        }
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let whole = caps.get(0).expect("regex match");
            let expr = caps.get(1).expect("capture group").as_str();
            out.push_str(&text[last..whole.start()]);
            out.push_str(&self.render_expr(expr, stack)?);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}
