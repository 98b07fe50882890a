// wf-core/src/units.rs

use uom::si::f64::{Angle as UomAngle, Length as UomLength, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type Length = UomLength;
pub type Time = UomTime;

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn ms(v: f64) -> Time {
    use uom::si::time::millisecond;
    Time::new::<millisecond>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn to_mm(l: Length) -> f64 {
    l.get::<uom::si::length::millimeter>()
}

#[inline]
pub fn to_seconds(t: Time) -> f64 {
    t.get::<uom::si::time::second>()
}

#[inline]
pub fn to_millis(t: Time) -> f64 {
    t.get::<uom::si::time::millisecond>()
}
