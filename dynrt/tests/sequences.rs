//! Sequence (tuple/list) behavior: construction, indexing, mutation.

use dynrt::{dispatch, lifecycle, types};

#[test]
fn test_build_list_by_appending_integers_zero_through_four() {
    let list = types::new_list(vec![]);
    for i in 0..5 {
        dispatch::push(&list, types::new_int(i)).unwrap();
    }
    assert_eq!(dispatch::len(&list).unwrap(), 5);
    let two = dispatch::getitem(&list, &types::new_int(2)).unwrap();
    assert_eq!(two.with_payload(|p| p.as_int()), Some(2));
}

#[test]
fn test_negative_index_matches_len_minus_one() {
    let list = types::new_list((0..5).map(types::new_int).collect());
    let last = dispatch::getitem(&list, &types::new_int(-1)).unwrap();
    let via_len = dispatch::getitem(&list, &types::new_int(4)).unwrap();
    assert!(dynrt::is_exception(&last) == false);
    assert_eq!(
        last.with_payload(|p| p.as_int()),
        via_len.with_payload(|p| p.as_int())
    );
}

#[test]
fn test_out_of_range_index_raises_index_error() {
    let bytes = types::new_bytes(b"ABCDE".to_vec());
    let err = dispatch::getitem(&bytes, &types::new_int(20)).unwrap_err();
    assert!(dynrt::is_exception_of(&err, dynrt::ExcKind::IndexError));
    let first = dispatch::getitem(&bytes, &types::new_int(0)).unwrap();
    assert_eq!(first.with_payload(|p| p.as_int()), Some(65));
}

#[test]
fn test_push_then_pop_restores_list_state() {
    let list = types::new_list(vec![types::new_int(1), types::new_int(2)]);
    let before_len = dispatch::len(&list).unwrap();
    dispatch::push(&list, types::new_int(99)).unwrap();
    let popped = dispatch::pop(&list).unwrap();
    assert_eq!(popped.with_payload(|p| p.as_int()), Some(99));
    assert_eq!(dispatch::len(&list).unwrap(), before_len);
}

#[test]
fn test_freezing_a_list_turns_append_into_an_exception_handle() {
    let list = types::new_list(vec![types::new_int(1)]);
    lifecycle::freeze(&list).unwrap();
    let err = dispatch::push(&list, types::new_int(2)).unwrap_err();
    assert!(dynrt::is_exception(&err));
}

#[test]
fn test_double_freeze_is_idempotent() {
    let list = types::new_list(vec![types::new_int(1)]);
    lifecycle::freeze(&list).unwrap();
    let tag_after_first = format!("{:?}", list.header().tag);
    lifecycle::freeze(&list).unwrap();
    assert_eq!(format!("{:?}", list.header().tag), tag_after_first);
}

#[test]
fn test_frozen_copy_then_unfrozen_copy_round_trips_by_value_not_identity() {
    let list = types::new_list(vec![types::new_int(1), types::new_int(2)]);
    let frozen = lifecycle::frozen_copy(&list).unwrap();
    let round_tripped = lifecycle::unfrozen_copy(&frozen).unwrap();

    assert!(!dynrt::Obj::ptr_eq(&round_tripped, &list));
    assert_eq!(dispatch::len(&round_tripped).unwrap(), dispatch::len(&list).unwrap());
    for i in 0..2 {
        let a = dispatch::getitem(&list, &types::new_int(i)).unwrap();
        let b = dispatch::getitem(&round_tripped, &types::new_int(i)).unwrap();
        assert!(dynrt::hash::eq(&a, &b).unwrap());
    }
}

#[test]
fn test_iterating_a_list_then_rebuilding_yields_an_equal_collection() {
    let original = types::new_list(vec![types::new_int(10), types::new_int(20), types::new_int(30)]);
    let it = dispatch::iter(&original).unwrap();
    let mut collected = Vec::new();
    loop {
        match dispatch::next(&it) {
            Ok(v) => collected.push(v),
            Err(e) if dynrt::is_exception_of(&e, dynrt::ExcKind::StopIteration) => break,
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }
    let rebuilt = types::new_list(collected);
    assert_eq!(dispatch::len(&rebuilt).unwrap(), dispatch::len(&original).unwrap());
    for i in 0..3 {
        let a = dispatch::getitem(&original, &types::new_int(i)).unwrap();
        let b = dispatch::getitem(&rebuilt, &types::new_int(i)).unwrap();
        assert!(dynrt::hash::eq(&a, &b).unwrap());
    }
}
