//! First-order transport matrices.
//!
//! Inputs are in configuration units (metres, 1/m², 1/m); matrices come out
//! in millimetres so a slope in mrad moves the position in mm.

use bf_core::{
    CoreError, CoreResult, Real, TransferMatrix, first_non_finite, identity, m_to_mm,
    per_m_to_per_mm, per_m2_to_per_mm2, ps,
};

/// Fill the 2x2 block at `(ind, ind)` for one transverse plane.
///
/// `k > 0` focuses (trigonometric), `k <= 0` defocuses (hyperbolic); `k == 0`
/// degenerates to a drift of length `l`. Units of `l` and `k` must agree.
pub fn plane_block(l: Real, k: Real, ind: usize, m: &mut TransferMatrix) {
    if k > 0.0 {
        let sqrt_k = k.sqrt();
        let psi = sqrt_k * l;
        let (sn, cs) = psi.sin_cos();
        m[(ind, ind)] = cs;
        m[(ind + 1, ind + 1)] = cs;
        m[(ind, ind + 1)] = sn / sqrt_k;
        m[(ind + 1, ind)] = -sqrt_k * sn;
    } else {
        let sqrt_k = (-k).sqrt();
        let psi = sqrt_k * l;
        let cs = psi.cosh();
        let sn = psi.sinh();
        m[(ind, ind)] = cs;
        m[(ind + 1, ind + 1)] = cs;
        if sqrt_k != 0.0 {
            m[(ind, ind + 1)] = sn / sqrt_k;
            m[(ind + 1, ind)] = sqrt_k * sn;
        } else {
            m[(ind, ind + 1)] = l;
            m[(ind + 1, ind)] = 0.0;
        }
    }
}

/// Field-free drift.
pub fn drift(l_m: Real) -> TransferMatrix {
    let l = m_to_mm(l_m);
    let mut m = identity();
    m[(ps::X, ps::PX)] = l;
    m[(ps::Y, ps::PY)] = l;
    m
}

/// Gradient sector bend.
///
/// Horizontal strength is `K + 1/ρ²` with `ρ = L/phi`; vertical is `-K`.
pub fn sbend(l_m: Real, phi: Real, k_per_m2: Real) -> CoreResult<TransferMatrix> {
    let l = m_to_mm(l_m);
    let curvature = if l == 0.0 {
        if phi != 0.0 {
            return Err(CoreError::InvalidArg {
                what: "sbend with zero length must have zero bend angle",
            });
        }
        0.0
    } else {
        phi / l
    };
    let k = per_m2_to_per_mm2(k_per_m2);
    let mut m = identity();
    plane_block(l, k + curvature * curvature, ps::X, &mut m);
    plane_block(l, -k, ps::Y, &mut m);
    checked(m)
}

/// Quadrupole, focusing horizontally for `K > 0`.
pub fn quadrupole(l_m: Real, k_per_m2: Real) -> CoreResult<TransferMatrix> {
    let l = m_to_mm(l_m);
    let k = per_m2_to_per_mm2(k_per_m2);
    let mut m = identity();
    plane_block(l, k, ps::X, &mut m);
    plane_block(l, -k, ps::Y, &mut m);
    checked(m)
}

/// Solenoid with `K = B0 / (2 Bρ)`; couples the two transverse planes.
pub fn solenoid(l_m: Real, k_per_m: Real) -> CoreResult<TransferMatrix> {
    let l = m_to_mm(l_m);
    let k = per_m_to_per_mm(k_per_m);
    let (s, c) = (k * l).sin_cos();
    let mut m = identity();

    m[(ps::X, ps::X)] = c * c;
    m[(ps::PX, ps::PX)] = c * c;
    m[(ps::Y, ps::Y)] = c * c;
    m[(ps::PY, ps::PY)] = c * c;

    let (sc_over_k, s2_over_k) = if k != 0.0 {
        (s * c / k, s * s / k)
    } else {
        (l, 0.0)
    };

    m[(ps::X, ps::PX)] = sc_over_k;
    m[(ps::X, ps::Y)] = s * c;
    m[(ps::X, ps::PY)] = s2_over_k;

    m[(ps::PX, ps::X)] = -k * s * c;
    m[(ps::PX, ps::Y)] = -k * s * s;
    m[(ps::PX, ps::PY)] = s * c;

    m[(ps::Y, ps::X)] = -s * c;
    m[(ps::Y, ps::PX)] = -s2_over_k;
    m[(ps::Y, ps::PY)] = sc_over_k;

    m[(ps::PY, ps::X)] = k * s * s;
    m[(ps::PY, ps::PX)] = -s * c;
    m[(ps::PY, ps::Y)] = -k * s * c;

    checked(m)
}

fn checked(m: TransferMatrix) -> CoreResult<TransferMatrix> {
    match first_non_finite(m.as_slice()) {
        Some(value) => Err(CoreError::NonFinite {
            what: "transfer matrix entry",
            value,
        }),
        None => Ok(m),
    }
}
