//! Set and dict behavior: construction from a bag of elements, the
//! boolean-algebra operations, and mapping item mutation.

use dynrt::{dispatch, types};
use dynrt::types::{dict, set};

fn chars(s: &str) -> Vec<dynrt::Obj> {
    s.chars().map(|c| types::new_str(c.to_string())).collect()
}

#[test]
fn test_set_from_abracadabra_has_five_distinct_letters() {
    let s = set::new_frozenset(chars("abracadabra")).unwrap();
    assert_eq!(dispatch::len(&s).unwrap(), 5);
    assert!(dispatch::contains(&s, &types::new_str("a".to_string())).unwrap());
    assert!(!dispatch::contains(&s, &types::new_str("z".to_string())).unwrap());
}

#[test]
fn test_difference_union_intersection_of_abracadabra_and_alacazam() {
    let a = set::new_frozenset(chars("abracadabra")).unwrap();
    let b = set::new_frozenset(chars("alacazam")).unwrap();

    let difference = set::difference(&a, &b).unwrap();
    assert_eq!(dispatch::len(&difference).unwrap(), 3);
    assert!(dispatch::contains(&difference, &types::new_str("b".to_string())).unwrap());
    assert!(!dispatch::contains(&difference, &types::new_str("a".to_string())).unwrap());

    let union = set::union(&a, &b).unwrap();
    assert_eq!(dispatch::len(&union).unwrap(), 8);
    assert!(dispatch::contains(&union, &types::new_str("z".to_string())).unwrap());
    assert!(!dispatch::contains(&union, &types::new_str("q".to_string())).unwrap());

    let intersection = set::intersection(&a, &b).unwrap();
    assert_eq!(dispatch::len(&intersection).unwrap(), 2);
    assert!(dispatch::contains(&intersection, &types::new_str("a".to_string())).unwrap());
    assert!(!dispatch::contains(&intersection, &types::new_str("b".to_string())).unwrap());
}

#[test]
fn test_dict_setitem_getitem_delitem_and_key_iteration() {
    let jack = types::new_str("jack".to_string());
    let sape = types::new_str("sape".to_string());
    let guido = types::new_str("guido".to_string());
    let irv = types::new_str("irv".to_string());

    let d = dict::new_dict(vec![
        (jack.clone(), types::new_int(4098)),
        (sape.clone(), types::new_int(4139)),
    ])
    .unwrap();
    // irv is inserted first below so the "natural order" check only relies
    // on dict preserving whatever order `set_item` builds it in, not on a
    // specific initialization-argument order.
    dispatch::setitem(&d, &irv, types::new_int(0)).unwrap();
    dispatch::setitem(&d, &guido, types::new_int(4127)).unwrap();
    assert_eq!(dispatch::len(&d).unwrap(), 4);

    let looked_up = dispatch::getitem(&d, &jack).unwrap();
    assert_eq!(looked_up.with_payload(|p| p.as_int()), Some(4098));

    dispatch::delitem(&d, &sape).unwrap();
    assert_eq!(dispatch::len(&d).unwrap(), 3);

    let keys_iter = dict::keys_iter(d.clone());
    let mut keys = Vec::new();
    loop {
        match dispatch::next(&keys_iter) {
            Ok(k) => keys.push(k.with_payload(|p| p.as_text().map(|s| s.to_string())).unwrap()),
            Err(e) if dynrt::is_exception_of(&e, dynrt::ExcKind::StopIteration) => break,
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }
    assert!(keys.contains(&"irv".to_string()));
    assert!(keys.contains(&"guido".to_string()));
    assert!(keys.contains(&"jack".to_string()));
    assert!(!keys.contains(&"4127".to_string()));
}

#[test]
fn test_setdefault_does_not_overwrite_an_existing_value() {
    let d = dict::new_dict(vec![]).unwrap();
    let key = types::new_int(1);
    let first = dict::setdefault(&d, key.clone(), types::new_int(10)).unwrap();
    let second = dict::setdefault(&d, key, types::new_int(20)).unwrap();
    assert_eq!(first.with_payload(|p| p.as_int()), Some(10));
    assert_eq!(second.with_payload(|p| p.as_int()), Some(10));
}

#[test]
fn test_frozendict_current_hash_depends_only_on_entries_not_insertion_order() {
    let a = dict::new_frozendict(vec![
        (types::new_int(1), types::new_int(10)),
        (types::new_int(2), types::new_int(20)),
    ])
    .unwrap();
    let b = dict::new_frozendict(vec![
        (types::new_int(2), types::new_int(20)),
        (types::new_int(1), types::new_int(10)),
    ])
    .unwrap();
    assert_eq!(dynrt::hash::hash(&a).unwrap(), dynrt::hash::hash(&b).unwrap());
}

#[test]
fn test_getdefault_on_missing_key_returns_fallback_without_raising() {
    let d = dict::new_dict(vec![(types::new_int(1), types::new_int(10))]).unwrap();
    let fallback = types::new_int(-1);
    let missing = dispatch::getdefault(&d, &types::new_int(99), &fallback).unwrap();
    assert_eq!(missing.with_payload(|p| p.as_int()), Some(-1));
}
