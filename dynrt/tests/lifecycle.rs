//! Refcounting, freeze/copy/invalidate as seen from outside `lifecycle`:
//! cyclic structure must survive a deep copy and a deep invalidate alike.

use dynrt::{dispatch, lifecycle, types};

#[test]
fn test_incref_decref_keep_a_handle_alive_across_clones() {
    let x = types::new_int(42);
    let extra = lifecycle::incref(&x);
    assert!(dynrt::Obj::ptr_eq(&x, &extra));
    lifecycle::decref(extra);
    // the original handle is still usable after the clone is dropped
    assert_eq!(x.with_payload(|p| p.as_int()), Some(42));
}

#[test]
fn test_deep_freeze_recursively_freezes_nested_lists() {
    let inner = types::new_list(vec![types::new_int(1)]);
    let outer = types::new_list(vec![inner.clone()]);
    lifecycle::deep_freeze(&outer).unwrap();
    assert!(dispatch::push(&outer, types::new_int(2)).is_err());
    assert!(dispatch::push(&inner, types::new_int(2)).is_err());
}

#[test]
fn test_deep_copy_of_a_self_referential_list_preserves_the_cycle() {
    let l = types::new_list(vec![]);
    dispatch::push(&l, l.clone()).unwrap();
    let copied = lifecycle::deep_copy(&l).unwrap();

    assert!(!dynrt::Obj::ptr_eq(&l, &copied));
    let first = dispatch::getitem(&copied, &types::new_int(0)).unwrap();
    assert!(dynrt::Obj::ptr_eq(&first, &copied));
}

#[test]
fn test_deep_copy_preserves_shared_substructure_not_just_values() {
    let shared = types::new_list(vec![types::new_int(1)]);
    let outer = types::new_list(vec![shared.clone(), shared.clone()]);
    let copied = lifecycle::deep_copy(&outer).unwrap();

    let a = dispatch::getitem(&copied, &types::new_int(0)).unwrap();
    let b = dispatch::getitem(&copied, &types::new_int(1)).unwrap();
    assert!(dynrt::Obj::ptr_eq(&a, &b));
    assert!(!dynrt::Obj::ptr_eq(&a, &shared));
}

#[test]
fn test_deep_invalidate_tears_down_a_self_referential_list_without_hanging() {
    let l = types::new_list(vec![]);
    dispatch::push(&l, l.clone()).unwrap();
    lifecycle::deep_invalidate(&l).unwrap();
    assert!(l.is_invalidated());
    // idempotent
    assert!(lifecycle::deep_invalidate(&l).is_ok());
}

#[test]
fn test_invalidated_handle_rejects_every_further_operation() {
    let x = types::new_int(7);
    lifecycle::invalidate(&x).unwrap();
    assert!(dispatch::len(&x).is_err() || dispatch::bool_of(&x).is_err());
    assert!(dynrt::hash::current_hash(&x).is_err());
}

#[test]
fn test_copy_of_a_mutable_list_is_a_distinct_handle_with_equal_elements() {
    let l = types::new_list(vec![types::new_int(1), types::new_int(2)]);
    let c = lifecycle::copy(&l).unwrap();
    assert!(!dynrt::Obj::ptr_eq(&l, &c));
    assert_eq!(dispatch::len(&c).unwrap(), dispatch::len(&l).unwrap());
    dispatch::push(&c, types::new_int(3)).unwrap();
    assert_eq!(dispatch::len(&l).unwrap(), 2);
}

#[test]
fn test_copying_an_iterator_returns_an_invalidated_sentinel() {
    let l = types::new_list(vec![types::new_int(1)]);
    let it = dispatch::iter(&l).unwrap();
    let snapshot = lifecycle::copy(&it).unwrap();
    assert!(snapshot.is_invalidated());
}
