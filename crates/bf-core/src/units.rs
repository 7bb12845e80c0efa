// bf-core/src/units.rs
//
// Configurations give lengths in metres; transfer matrices work in
// millimetres (and milliradians for slopes).

use uom::si::f64::Length as UomLength;
use uom::si::length::{meter, millimeter};

pub type Length = UomLength;

/// Millimetres per metre.
pub const MM_PER_M: f64 = 1e3;

#[inline]
pub fn m(v: f64) -> Length {
    Length::new::<meter>(v)
}

/// Length in millimetres, the unit of the transfer-matrix position terms.
#[inline]
pub fn to_mm(l: Length) -> f64 {
    l.get::<millimeter>()
}

/// Metres straight to millimetres.
#[inline]
pub fn m_to_mm(v: f64) -> f64 {
    to_mm(m(v))
}

/// Quadrupole-style strength: 1/m² to 1/mm².
#[inline]
pub fn per_m2_to_per_mm2(k: f64) -> f64 {
    k / (MM_PER_M * MM_PER_M)
}

/// Solenoid-style strength: 1/m to 1/mm.
#[inline]
pub fn per_m_to_per_mm(k: f64) -> f64 {
    k / MM_PER_M
}
