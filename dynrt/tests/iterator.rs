//! The iterator protocol as seen through `dispatch`: exhaustion, lenhint
//! decay, and the close/throw handle-passing rules.

use dynrt::{dispatch, types};

fn drain(it: &dynrt::Obj) -> Vec<dynrt::Obj> {
    let mut out = Vec::new();
    loop {
        match dispatch::next(it) {
            Ok(v) => out.push(v),
            Err(e) if dynrt::is_exception_of(&e, dynrt::ExcKind::StopIteration) => break,
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }
    out
}

#[test]
fn test_list_iterator_yields_elements_in_order_then_stops() {
    let list = types::new_list(vec![types::new_int(1), types::new_int(2), types::new_int(3)]);
    let it = dispatch::iter(&list).unwrap();
    let values: Vec<i64> = drain(&it)
        .into_iter()
        .map(|v| v.with_payload(|p| p.as_int()).unwrap())
        .collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_iterator_stays_exhausted_after_first_stop_iteration() {
    let list = types::new_list(vec![]);
    let it = dispatch::iter(&list).unwrap();
    let first = dispatch::next(&it).unwrap_err();
    let second = dispatch::next(&it).unwrap_err();
    assert!(dynrt::is_exception_of(&first, dynrt::ExcKind::StopIteration));
    assert!(dynrt::is_exception_of(&second, dynrt::ExcKind::StopIteration));
}

#[test]
fn test_lenhint_decays_to_zero_as_a_sequence_iterator_is_consumed() {
    let tup = types::new_tuple(vec![types::new_int(1), types::new_int(2)]);
    let it = dispatch::iter(&tup).unwrap();
    assert_eq!(dispatch::iter_lenhint(&it).unwrap(), 2);
    dispatch::next(&it).unwrap();
    assert_eq!(dispatch::iter_lenhint(&it).unwrap(), 1);
    dispatch::next(&it).unwrap();
    assert_eq!(dispatch::iter_lenhint(&it).unwrap(), 0);
    assert!(dispatch::next(&it).is_err());
    assert_eq!(dispatch::iter_lenhint(&it).unwrap(), 0);
}

#[test]
fn test_close_on_an_iterator_is_idempotent_and_leaves_it_exhausted() {
    let list = types::new_list(vec![types::new_int(1), types::new_int(2)]);
    let it = dispatch::iter(&list).unwrap();
    dispatch::close(&it).unwrap();
    assert!(dispatch::next(&it).is_err());
    // closing an already-closed iterator is a no-op, not an error
    dispatch::close(&it).unwrap();
}

#[test]
fn test_throw_closes_the_iterator_and_propagates_the_given_exception() {
    let list = types::new_list(vec![types::new_int(1)]);
    let it = dispatch::iter(&list).unwrap();
    let injected = dynrt::singleton(dynrt::ExcKind::ValueError);
    let result = dispatch::throw(&it, injected).unwrap_err();
    assert!(dynrt::is_exception_of(&result, dynrt::ExcKind::ValueError));
    assert!(dispatch::next(&it).is_err());
}

#[test]
fn test_send_behaves_as_next_since_adapters_here_take_no_argument() {
    let list = types::new_list(vec![types::new_int(7)]);
    let it = dispatch::iter(&list).unwrap();
    let ignored = types::nil();
    let v = dispatch::send(&it, &ignored).unwrap();
    assert_eq!(v.with_payload(|p| p.as_int()), Some(7));
}

#[test]
fn test_bytes_iterator_yields_one_byte_objects_not_integers() {
    let b = types::new_bytes(b"hi".to_vec());
    let it = dispatch::iter(&b).unwrap();
    let parts = drain(&it);
    assert_eq!(parts.len(), 2);
    for p in &parts {
        assert_eq!(dispatch::len(p).unwrap(), 1);
    }
}

#[test]
fn test_reversed_iterator_over_a_list_yields_elements_back_to_front() {
    let list = types::new_list(vec![types::new_int(1), types::new_int(2), types::new_int(3)]);
    let it = dispatch::iter_reversed(&list).unwrap();
    let values: Vec<i64> = drain(&it)
        .into_iter()
        .map(|v| v.with_payload(|p| p.as_int()).unwrap())
        .collect();
    assert_eq!(values, vec![3, 2, 1]);
}

#[test]
fn test_iter_reversed_on_a_set_is_not_a_supported_operation() {
    let s = types::new_frozenset(vec![types::new_int(1)]).unwrap();
    assert!(dispatch::iter_reversed(&s).is_err());
}

#[test]
fn test_mini_iter_family_matches_the_plain_iterator_family() {
    let list = types::new_list(vec![types::new_int(1), types::new_int(2)]);
    let it = dispatch::mini_iter(&list).unwrap();
    assert_eq!(dispatch::mini_iter_lenhint(&it).unwrap(), 2);
    let first = dispatch::mini_iter_next(&it).unwrap();
    assert_eq!(first.with_payload(|p| p.as_int()), Some(1));
    assert_eq!(dispatch::mini_iter_lenhint(&it).unwrap(), 1);
}

#[test]
fn test_an_exhausted_iterator_reports_zero_items_remaining() {
    let list = types::new_list(vec![types::new_int(1)]);
    let it = dispatch::iter(&list).unwrap();
    dispatch::next(&it).unwrap();
    assert!(dispatch::next(&it).is_err());
    assert_eq!(dispatch::iter_lenhint(&it).unwrap(), 0);
}
