//! Integer Module - `int`/`intstore`
//!
//! Backed by a plain `i64`; arithmetic overflow raises `OverflowError`
//! rather than wrapping or promoting to an arbitrary-precision
//! representation — this runtime's numeric tower is closed, with no
//! bignum fallback.

use crate::exception::{singleton, ExcKind};
use crate::object::{Obj, Payload, Tag};

pub fn new_int(v: i64) -> Obj {
    Obj::new(Tag::Int, Payload::Int(v))
}

pub fn new_intstore(v: i64) -> Obj {
    Obj::new(Tag::IntStore, Payload::Int(v))
}

/// `int_from_c(v)`: alias for [`new_int`] naming the scalar-constructor
/// entry point by its host-facing name.
pub fn int_from_c(v: i64) -> Obj {
    new_int(v)
}

fn value(x: &Obj) -> Result<i64, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    x.with_payload(|p| p.as_int())
        .ok_or_else(|| singleton(ExcKind::TypeError))
}

fn wrap(x: &Obj, v: i64) -> Obj {
    Obj::new(x.tag(), Payload::Int(v))
}

pub fn add(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let (av, bv) = (value(a)?, value(b)?);
    av.checked_add(bv)
        .map(|v| wrap(a, v))
        .ok_or_else(|| singleton(ExcKind::OverflowError))
}

pub fn sub(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let (av, bv) = (value(a)?, value(b)?);
    av.checked_sub(bv)
        .map(|v| wrap(a, v))
        .ok_or_else(|| singleton(ExcKind::OverflowError))
}

pub fn mul(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let (av, bv) = (value(a)?, value(b)?);
    av.checked_mul(bv)
        .map(|v| wrap(a, v))
        .ok_or_else(|| singleton(ExcKind::OverflowError))
}

pub fn floordiv(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let (av, bv) = (value(a)?, value(b)?);
    if bv == 0 {
        return Err(singleton(ExcKind::ZeroDivisionError));
    }
    av.checked_div_euclid(bv)
        .map(|v| wrap(a, v))
        .ok_or_else(|| singleton(ExcKind::OverflowError))
}

pub fn modulo(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let (av, bv) = (value(a)?, value(b)?);
    if bv == 0 {
        return Err(singleton(ExcKind::ZeroDivisionError));
    }
    av.checked_rem_euclid(bv)
        .map(|v| wrap(a, v))
        .ok_or_else(|| singleton(ExcKind::OverflowError))
}

pub fn neg(a: &Obj) -> Result<Obj, Obj> {
    let av = value(a)?;
    av.checked_neg()
        .map(|v| wrap(a, v))
        .ok_or_else(|| singleton(ExcKind::OverflowError))
}

pub fn abs(a: &Obj) -> Result<Obj, Obj> {
    let av = value(a)?;
    av.checked_abs()
        .map(|v| wrap(a, v))
        .ok_or_else(|| singleton(ExcKind::OverflowError))
}

pub fn truthy(x: &Obj) -> Result<bool, Obj> {
    Ok(value(x)? != 0)
}

pub fn to_float(x: &Obj) -> Result<f64, Obj> {
    Ok(value(x)? as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_overflow() {
        let a = new_int(5);
        let b = new_int(3);
        assert_eq!(add(&a, &b).unwrap().with_payload(|p| p.as_int()), Some(8));

        let max = new_int(i64::MAX);
        let one = new_int(1);
        assert!(add(&max, &one).is_err());
    }

    #[test]
    fn test_floordiv_by_zero_raises_zero_division() {
        let a = new_int(10);
        let zero = new_int(0);
        assert!(floordiv(&a, &zero).is_err());
    }

    #[test]
    fn test_zero_is_falsy() {
        assert!(!truthy(&new_int(0)).unwrap());
        assert!(truthy(&new_int(-1)).unwrap());
    }
}
