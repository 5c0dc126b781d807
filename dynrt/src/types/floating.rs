//! Floating Module - `float`/`floatstore`
//!
//! Backed by `f64`. Unlike integers, float arithmetic never raises
//! `OverflowError` for magnitude (IEEE 754 saturates to infinity); it does
//! raise `ZeroDivisionError` for `0.0 / 0.0`-style division, keeping that
//! one case symmetric with integer division rather than silently
//! producing `NaN`.

use crate::exception::{singleton, ExcKind};
use crate::object::{Obj, Payload, Tag};

pub fn new_float(v: f64) -> Obj {
    Obj::new(Tag::Float, Payload::Float(v))
}

pub fn new_floatstore(v: f64) -> Obj {
    Obj::new(Tag::FloatStore, Payload::Float(v))
}

/// `float_from_c(v)`: alias for [`new_float`].
pub fn float_from_c(v: f64) -> Obj {
    new_float(v)
}

fn value(x: &Obj) -> Result<f64, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    x.with_payload(|p| p.as_float())
        .ok_or_else(|| singleton(ExcKind::TypeError))
}

fn wrap(x: &Obj, v: f64) -> Obj {
    Obj::new(x.tag(), Payload::Float(v))
}

pub fn add(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    Ok(wrap(a, value(a)? + value(b)?))
}

pub fn sub(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    Ok(wrap(a, value(a)? - value(b)?))
}

pub fn mul(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    Ok(wrap(a, value(a)? * value(b)?))
}

pub fn div(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let (av, bv) = (value(a)?, value(b)?);
    if bv == 0.0 {
        return Err(singleton(ExcKind::ZeroDivisionError));
    }
    Ok(wrap(a, av / bv))
}

pub fn neg(a: &Obj) -> Result<Obj, Obj> {
    Ok(wrap(a, -value(a)?))
}

pub fn abs(a: &Obj) -> Result<Obj, Obj> {
    Ok(wrap(a, value(a)?.abs()))
}

pub fn truthy(x: &Obj) -> Result<bool, Obj> {
    Ok(value(x)? != 0.0)
}
