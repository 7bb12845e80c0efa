/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Gap between `|v|` and the next representable value above it.
pub fn spacing(v: Real) -> Real {
    let a = v.abs();
    if !a.is_finite() {
        return Real::NAN;
    }
    Real::from_bits(a.to_bits() + 1) - a
}

/// Compare in units in the last place: `|a - b| <= nulp * spacing(max(|a|, |b|))`.
pub fn nulp_eq(a: Real, b: Real, nulp: Real) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    diff <= nulp * spacing(a.abs().max(b.abs()))
}

/// First non-finite entry of a slice, if any.
pub fn first_non_finite(values: &[Real]) -> Option<Real> {
    values.iter().copied().find(|v| !v.is_finite())
}
