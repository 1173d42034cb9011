pub mod ast;
pub mod eval;
pub mod parser;

pub use eval::evaluate;
pub use parser::parse;

use crate::date::DateKey;
use crate::error::{Error, Result};
use ast::Expr;
use std::str::FromStr;
use std::sync::Arc;

/// A parsed condition. Clones share the same immutable tree, so one parse
/// can back any number of store calls.
#[derive(Debug, Clone)]
pub struct Condition(Arc<Expr>);

impl Condition {
    pub fn parse(text: &str) -> Result<Self> {
        let expr = parse(text)?;
        log::debug!("parsed condition {:?} -> {:?}", text, expr);
        Ok(Self(Arc::new(expr)))
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }

    pub fn evaluate(&self, date: &DateKey, event: &str) -> bool {
        evaluate(&self.0, date, event)
    }

    pub fn predicate(&self) -> impl Fn(&DateKey, &str) -> bool + Clone + Send + Sync + 'static {
        let condition = self.clone();
        move |date: &DateKey, event: &str| condition.evaluate(date, event)
    }
}

impl From<Expr> for Condition {
    fn from(expr: Expr) -> Self {
        Self(Arc::new(expr))
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Condition::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_is_shared() {
        let condition = Condition::parse(r#"event == "x""#).unwrap();
        let copy = condition.clone();
        assert!(std::ptr::eq(condition.expr(), copy.expr()));
    }

    #[test]
    fn test_predicate_across_threads() {
        let condition: Condition = "date >= 2017-01-01".parse().unwrap();
        let predicate = condition.predicate();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let predicate = predicate.clone();
                std::thread::spawn(move || {
                    let date = DateKey::new(2016 + i, 6, 1).unwrap();
                    predicate(&date, "")
                })
            })
            .collect();
        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![false, true, true, true]);
    }
}
