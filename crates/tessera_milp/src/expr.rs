//! Linear expressions over model variables.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Index of a variable within its [`Model`](crate::Model).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct VarId(u32);

impl VarId {
    /// Creates an ID from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An affine expression `sum(coef * var) + constant`.
///
/// Terms are kept in insertion order and may repeat a variable; backends sum
/// repeated terms.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinExpr {
    /// The zero expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single term `coef * var`.
    pub fn term(var: VarId, coef: f64) -> Self {
        Self {
            terms: vec![(var, coef)],
            constant: 0.0,
        }
    }

    /// A constant expression.
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// The sum of `vars`, each with coefficient one.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    /// Appends `coef * var`.
    pub fn add_term(&mut self, var: VarId, coef: f64) {
        if coef != 0.0 {
            self.terms.push((var, coef));
        }
    }

    /// The variable terms.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// The constant part.
    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    /// Evaluates the expression against a full assignment of variable values.
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values.get(v.index()).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }

    /// Drops the constant part, returning it.
    pub fn take_constant(&mut self) -> f64 {
        std::mem::take(&mut self.constant)
    }

    /// The largest variable index referenced, if any.
    pub fn max_var(&self) -> Option<VarId> {
        self.terms.iter().map(|(v, _)| *v).max()
    }
}

impl From<VarId> for LinExpr {
    fn from(var: VarId) -> Self {
        Self::term(var, 1.0)
    }
}

impl From<f64> for LinExpr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl AddAssign<LinExpr> for LinExpr {
    fn add_assign(&mut self, rhs: LinExpr) {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
    }
}

impl AddAssign<VarId> for LinExpr {
    fn add_assign(&mut self, rhs: VarId) {
        self.terms.push((rhs, 1.0));
    }
}

impl AddAssign<f64> for LinExpr {
    fn add_assign(&mut self, rhs: f64) {
        self.constant += rhs;
    }
}

impl SubAssign<LinExpr> for LinExpr {
    fn sub_assign(&mut self, rhs: LinExpr) {
        *self += -rhs;
    }
}

impl SubAssign<VarId> for LinExpr {
    fn sub_assign(&mut self, rhs: VarId) {
        self.terms.push((rhs, -1.0));
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        self += rhs.into();
        self
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(mut self, rhs: T) -> LinExpr {
        self -= rhs.into();
        self
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, rhs: f64) -> LinExpr {
        for (_, c) in &mut self.terms {
            *c *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self * -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: u32) -> VarId {
        VarId::from_raw(i)
    }

    #[test]
    fn build_and_eval() {
        let e = LinExpr::from(v(0)) + LinExpr::term(v(1), 2.0) + 3.0;
        assert_eq!(e.eval(&[1.0, 4.0]), 12.0);
        assert_eq!(e.terms().len(), 2);
        assert_eq!(e.constant_part(), 3.0);
    }

    #[test]
    fn subtraction_negates() {
        let e = LinExpr::from(v(0)) - LinExpr::term(v(1), 2.0) - 1.0;
        assert_eq!(e.eval(&[5.0, 1.0]), 2.0);
    }

    #[test]
    fn scaling() {
        let e = (LinExpr::from(v(0)) + 1.0) * 4.0;
        assert_eq!(e.eval(&[2.0]), 12.0);
        assert_eq!((-e).eval(&[2.0]), -12.0);
    }

    #[test]
    fn zero_coefficients_are_dropped() {
        let mut e = LinExpr::new();
        e.add_term(v(3), 0.0);
        e.add_term(v(2), 1.5);
        assert_eq!(e.terms(), &[(v(2), 1.5)]);
        assert_eq!(e.max_var(), Some(v(2)));
    }

    #[test]
    fn sum_of_vars() {
        let e = LinExpr::sum([v(0), v(1), v(2)]);
        assert_eq!(e.eval(&[1.0, 1.0, 0.0]), 2.0);
    }
}
