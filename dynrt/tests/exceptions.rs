//! Exceptions are first-class immortal handles: once raised, passing one
//! around as a value should never mutate it, leak a comparison sentinel,
//! or lose its place in the exception tree.

use dynrt::{dispatch, types, ExcKind};

#[test]
fn test_every_built_in_exception_traces_back_to_base_exception() {
    for kind in [
        ExcKind::TypeError,
        ExcKind::ValueError,
        ExcKind::KeyError,
        ExcKind::IndexError,
        ExcKind::OverflowError,
        ExcKind::ZeroDivisionError,
        ExcKind::StopIteration,
        ExcKind::RecursionLimitError,
    ] {
        let e = dynrt::singleton(kind);
        assert!(dynrt::is_exception_of(&e, ExcKind::BaseException));
    }
}

#[test]
fn test_key_error_and_index_error_both_descend_from_lookup_error_but_not_each_other() {
    let key_error = dynrt::singleton(ExcKind::KeyError);
    let index_error = dynrt::singleton(ExcKind::IndexError);
    assert!(dynrt::is_exception_of(&key_error, ExcKind::LookupError));
    assert!(dynrt::is_exception_of(&index_error, ExcKind::LookupError));
    assert!(!dynrt::is_exception_of(&key_error, ExcKind::IndexError));
    assert!(!dynrt::is_exception_of(&index_error, ExcKind::KeyError));
}

#[test]
fn test_getitem_out_of_range_raises_an_exception_handle_not_a_panic() {
    let list = types::new_list(vec![types::new_int(1)]);
    let err = dispatch::getitem(&list, &types::new_int(99)).unwrap_err();
    assert!(dynrt::is_exception(&err));
    assert!(dynrt::is_exception_of(&err, ExcKind::IndexError));
    assert!(dynrt::is_exception_of_any(
        &err,
        &[ExcKind::ValueError, ExcKind::LookupError]
    ));
}

#[test]
fn test_an_exception_handle_passed_through_getdefault_as_the_fallback_is_returned_unchanged() {
    let d = dynrt::types::new_dict(vec![]).unwrap();
    let fallback = dynrt::singleton(ExcKind::KeyError);
    let result = dispatch::getdefault(&d, &types::new_int(1), &fallback).unwrap();
    assert!(dynrt::Obj::ptr_eq(&result, &fallback));
}

#[test]
fn test_len_of_an_exception_is_a_type_error_not_a_crash() {
    let e = dynrt::singleton(ExcKind::ValueError);
    let err = dispatch::len(&e).unwrap_err();
    assert!(dynrt::is_exception(&err));
}

#[test]
#[should_panic]
fn test_comparison_not_implemented_can_never_be_materialized_as_a_handle() {
    let _ = dynrt::singleton(ExcKind::ComparisonNotImplemented);
}

#[test]
fn test_exception_singletons_are_identical_handles_across_calls() {
    let a = dynrt::singleton(ExcKind::TypeError);
    let b = dynrt::singleton(ExcKind::TypeError);
    assert!(dynrt::Obj::ptr_eq(&a, &b));
}
