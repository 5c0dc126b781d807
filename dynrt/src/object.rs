//! Object Module - the universal handle, its tag, and its lifecycle
//!
//! Every value in the runtime is an [`Obj`]: a cheap, `Clone`-able handle
//! around a reference-counted cell. There is no separate "class" object and
//! no vtable pointer in the header — the tag alone selects behavior, and
//! every operation suite matches on it directly (see [`crate::dispatch`]).
//! A closed, exhaustively-matched enum is preferred here over an open
//! trait-object hierarchy, since the set of tags is fixed and known up
//! front rather than open to downstream extension.
//!
//! # Refcounting and immortality
//!
//! `Obj` wraps an `Rc<ObjCell>`. `incref`/`decref` are nothing more than
//! `Clone`/`Drop` — there is no manual count to get wrong. Immortal objects
//! (the exception singletons, `nil`, `True`, `False`, the empty immutable
//! containers) are produced by [`Obj::new_immortal`], which leaks one extra
//! strong reference via `mem::forget` at construction time. That leaked
//! clone is never dropped, so the underlying `Rc` can never reach a strong
//! count of zero — `incref`/`decref` on an immortal are therefore
//! observably no-ops with no special-casing anywhere else in the crate.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::hashtable::{Dict, KeySet};
use crate::iterator::GenState;

/// Index into the exception table (defined in [`crate::exception`], but
/// the numeric type lives here to avoid a dependency cycle: `object` must
/// not depend on `exception`, since `exception` depends on `object`).
pub type ExcId = usize;

/// The closed set of runtime types, encoded as even/odd pairs: the even
/// member of a pair is the immutable (frozen) variant, the odd member
/// (`tag + 1`) is its mutable counterpart. A handful of tags have no
/// mutable counterpart (`Nil`, `Bool`, `Exception`, `Type`) and simply
/// leave the odd slot unused.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Tag {
    Nil = 0,
    Bool = 2,
    Int = 4,
    IntStore = 5,
    Float = 6,
    FloatStore = 7,
    Bytes = 8,
    ByteArray = 9,
    Str = 10,
    ChrArray = 11,
    Tuple = 12,
    List = 13,
    FrozenSet = 14,
    Set = 15,
    FrozenDict = 16,
    Dict = 17,
    Iterator = 18,
    Exception = 20,
    Type = 22,
    Invalidated = 24,
    InvalidatedMutable = 25,
}

impl Tag {
    /// Odd tags are the mutable member of a pair.
    pub fn is_mutable(self) -> bool {
        (self as u8) & 1 == 1
    }

    /// The immutable tag of this tag's pair (itself, if already immutable).
    pub fn immutable_pair(self) -> Tag {
        match self {
            Tag::IntStore => Tag::Int,
            Tag::FloatStore => Tag::Float,
            Tag::ByteArray => Tag::Bytes,
            Tag::ChrArray => Tag::Str,
            Tag::List => Tag::Tuple,
            Tag::Set => Tag::FrozenSet,
            Tag::Dict => Tag::FrozenDict,
            Tag::InvalidatedMutable => Tag::Invalidated,
            other => other,
        }
    }

    /// The mutable tag of this tag's pair, if one exists.
    pub fn mutable_pair(self) -> Option<Tag> {
        match self {
            Tag::Int => Some(Tag::IntStore),
            Tag::Float => Some(Tag::FloatStore),
            Tag::Bytes => Some(Tag::ByteArray),
            Tag::Str => Some(Tag::ChrArray),
            Tag::Tuple => Some(Tag::List),
            Tag::FrozenSet => Some(Tag::Set),
            Tag::FrozenDict => Some(Tag::Dict),
            Tag::Invalidated => Some(Tag::InvalidatedMutable),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Nil => "nil",
            Tag::Bool => "bool",
            Tag::Int => "int",
            Tag::IntStore => "intstore",
            Tag::Float => "float",
            Tag::FloatStore => "floatstore",
            Tag::Bytes => "bytes",
            Tag::ByteArray => "bytearray",
            Tag::Str => "str",
            Tag::ChrArray => "chrarray",
            Tag::Tuple => "tuple",
            Tag::List => "list",
            Tag::FrozenSet => "frozenset",
            Tag::Set => "set",
            Tag::FrozenDict => "frozendict",
            Tag::Dict => "dict",
            Tag::Iterator => "iter",
            Tag::Exception => "exception",
            Tag::Type => "type",
            Tag::Invalidated => "invalidated",
            Tag::InvalidatedMutable => "invalidated",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(
            self,
            Tag::Tuple
                | Tag::List
                | Tag::FrozenSet
                | Tag::Set
                | Tag::FrozenDict
                | Tag::Dict
                | Tag::Bytes
                | Tag::ByteArray
                | Tag::Str
                | Tag::ChrArray
        )
    }

    pub fn is_invalidated(self) -> bool {
        matches!(self, Tag::Invalidated | Tag::InvalidatedMutable)
    }
}

/// The data each tag actually carries. One variant per *family*, shared
/// between a pair's immutable and mutable tag — the tag cell says which
/// member of the pair this particular `Obj` currently is.
pub enum Payload {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Bytes and ByteArray both store raw bytes; Str and ChrArray both
    /// store a Rust `String` (always valid UTF-8).
    Bytes(Vec<u8>),
    Text(String),
    Sequence(Vec<Obj>),
    SetData(KeySet),
    DictData(Dict),
    IterData(GenState),
    Exception(ExcId),
    /// `type(x)`: an immortal handle naming one of the tags above. Only
    /// constructed by `dispatch::type_of`.
    TypeRef(Tag),
    /// Left behind by `invalidate`/`deep_invalidate`: the only payload an
    /// `Invalidated`/`InvalidatedMutable` object may have.
    Invalidated,
}

impl Payload {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Payload::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Payload::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes_mut(&mut self) -> Option<&mut Vec<u8>> {
        match self {
            Payload::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut String> {
        match self {
            Payload::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Obj]> {
        match self {
            Payload::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Obj>> {
        match self {
            Payload::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&KeySet> {
        match self {
            Payload::SetData(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut KeySet> {
        match self {
            Payload::SetData(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Payload::DictData(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Payload::DictData(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_iter_mut(&mut self) -> Option<&mut GenState> {
        match self {
            Payload::IterData(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_exc_id(&self) -> Option<ExcId> {
        match self {
            Payload::Exception(id) => Some(*id),
            _ => None,
        }
    }
}

struct ObjCell {
    tag: Cell<Tag>,
    /// Memoized hash, only ever populated for immutable tags (the
    /// two-phase hash protocol: mutables always recompute via
    /// `current_hash`).
    cached_hash: Cell<Option<i64>>,
    payload: RefCell<Payload>,
}

/// A handle to a runtime value. Cheap to clone (one `Rc` bump); cheap to
/// drop (one `Rc` decrement, freeing the cell when it hits zero — except
/// for immortals, which never do).
#[derive(Clone)]
pub struct Obj(Rc<ObjCell>);

/// A read-only snapshot of an object's header fields, for introspection
/// without holding a live borrow on the payload.
#[derive(Debug, Clone, Copy)]
pub struct ObjHeader {
    pub tag: Tag,
    pub is_mutable: bool,
    pub strong_count: usize,
    pub cached_hash: Option<i64>,
}

impl Obj {
    fn new_mortal(tag: Tag, payload: Payload) -> Obj {
        Obj(Rc::new(ObjCell {
            tag: Cell::new(tag),
            cached_hash: Cell::new(None),
            payload: RefCell::new(payload),
        }))
    }

    /// Construct an object that never dies: one strong reference is leaked
    /// forever via `mem::forget`, so the `Rc` inside can never reach zero.
    pub fn new_immortal(tag: Tag, payload: Payload) -> Obj {
        let obj = Obj::new_mortal(tag, payload);
        std::mem::forget(obj.clone());
        obj
    }

    /// Construct an ordinary, mortal object.
    pub fn new(tag: Tag, payload: Payload) -> Obj {
        Obj::new_mortal(tag, payload)
    }

    pub fn new_int(v: i64) -> Obj {
        Obj::new(Tag::Int, Payload::Int(v))
    }

    pub fn new_intstore(v: i64) -> Obj {
        Obj::new(Tag::IntStore, Payload::Int(v))
    }

    pub fn new_float(v: f64) -> Obj {
        Obj::new(Tag::Float, Payload::Float(v))
    }

    pub fn tag(&self) -> Tag {
        self.0.tag.get()
    }

    pub fn set_tag(&self, tag: Tag) {
        self.0.tag.set(tag);
    }

    pub fn is_mutable(&self) -> bool {
        self.tag().is_mutable()
    }

    pub fn is_invalidated(&self) -> bool {
        self.tag().is_invalidated()
    }

    pub fn ptr_eq(a: &Obj, b: &Obj) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// A stable identifier for this handle's underlying cell, usable as a
    /// memo-set key while walking a possibly-cyclic container graph (e.g.
    /// `crate::lifecycle::deep_copy`). Not meaningful once the cell is
    /// freed; callers only ever use it while holding a live `Obj`.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn header(&self) -> ObjHeader {
        ObjHeader {
            tag: self.tag(),
            is_mutable: self.is_mutable(),
            strong_count: self.strong_count(),
            cached_hash: self.cached_hash(),
        }
    }

    pub fn cached_hash(&self) -> Option<i64> {
        self.0.cached_hash.get()
    }

    pub fn set_cached_hash(&self, h: i64) {
        self.0.cached_hash.set(Some(h));
    }

    pub fn clear_cached_hash(&self) {
        self.0.cached_hash.set(None);
    }

    pub fn with_payload<R>(&self, f: impl FnOnce(&Payload) -> R) -> R {
        f(&self.0.payload.borrow())
    }

    pub fn with_payload_mut<R>(&self, f: impl FnOnce(&mut Payload) -> R) -> R {
        f(&mut self.0.payload.borrow_mut())
    }

    pub fn exc_id(&self) -> Option<ExcId> {
        if self.tag() != Tag::Exception {
            return None;
        }
        self.with_payload(|p| p.as_exc_id())
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obj({}, ", self.tag().name())?;
        self.with_payload(|p| match p {
            Payload::Nil => write!(f, "nil"),
            Payload::Bool(b) => write!(f, "{b}"),
            Payload::Int(i) => write!(f, "{i}"),
            Payload::Float(x) => write!(f, "{x}"),
            Payload::Bytes(b) => write!(f, "{b:?}"),
            Payload::Text(s) => write!(f, "{s:?}"),
            Payload::Sequence(items) => write!(f, "<{} items>", items.len()),
            Payload::SetData(s) => write!(f, "<{} keys>", s.active_count()),
            Payload::DictData(d) => write!(f, "<{} entries>", d.len()),
            Payload::IterData(_) => write!(f, "<iterator>"),
            Payload::Exception(id) => write!(f, "<exc#{id}>"),
            Payload::TypeRef(t) => write!(f, "<type {}>", t.name()),
            Payload::Invalidated => write!(f, "<invalidated>"),
        })?;
        write!(f, ")")
    }
}
