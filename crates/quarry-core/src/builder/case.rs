//! CASE expression builder.
//!
//! `end()` is only available once at least one WHEN/THEN pair was added.

use std::marker::PhantomData;

use crate::ast::{Case, Expr};
use crate::builder::expr::IntoExpr;

/// No WHEN branch yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoWhen;

/// At least one WHEN branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasWhen;

/// A CASE expression under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBuilder<S> {
    case: Case,
    _state: PhantomData<S>,
}

/// A WHEN waiting for its THEN.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWhen {
    case: Case,
    when: Expr,
}

/// `CASE WHEN ...`: a searched CASE.
#[must_use]
pub fn case() -> CaseBuilder<NoWhen> {
    CaseBuilder {
        case: Case {
            operand: None,
            branches: Vec::new(),
            else_branch: None,
        },
        _state: PhantomData,
    }
}

/// `CASE operand WHEN ...`: a simple CASE.
pub fn case_on(operand: impl IntoExpr) -> CaseBuilder<NoWhen> {
    let mut builder = case();
    builder.case.operand = Some(Box::new(operand.into_expr()));
    builder
}

impl<S> CaseBuilder<S> {
    /// Adds a `WHEN` branch; finish it with [`PendingWhen::then`].
    pub fn when(self, condition: impl IntoExpr) -> PendingWhen {
        PendingWhen {
            case: self.case,
            when: condition.into_expr(),
        }
    }
}

impl PendingWhen {
    /// Result of the pending branch.
    pub fn then(mut self, result: impl IntoExpr) -> CaseBuilder<HasWhen> {
        self.case.branches.push((self.when, result.into_expr()));
        CaseBuilder {
            case: self.case,
            _state: PhantomData,
        }
    }
}

impl CaseBuilder<HasWhen> {
    /// `ELSE result`.
    #[must_use]
    pub fn else_(mut self, result: impl IntoExpr) -> Self {
        self.case.else_branch = Some(Box::new(result.into_expr()));
        self
    }

    /// `END`.
    #[must_use]
    pub fn end(self) -> Expr {
        Expr::Case(self.case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::{is_equal, val};

    #[test]
    fn test_branches_keep_order() {
        let expr = case()
            .when(is_equal(1, 1))
            .then("one")
            .when(is_equal(2, 2))
            .then("two")
            .else_("many")
            .end();
        match expr {
            Expr::Case(case) => {
                assert!(case.operand.is_none());
                assert_eq!(case.branches.len(), 2);
                assert_eq!(case.branches[1].1, val("two"));
                assert_eq!(case.else_branch.as_deref(), Some(&val("many")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_simple_case_keeps_operand() {
        let expr = case_on(val(3)).when(3).then("three").end();
        assert!(matches!(expr, Expr::Case(Case { operand: Some(_), .. })));
    }
}
