//! The versioned object store.
//!
//! Every value and explanation the evaluator produces lives here at a
//! stable `Id`. Asking for the object at an id that is already taken reuses
//! the existing instance: its payload is overwritten, its handle and
//! annotation survive. That is what lets several slicing passes address
//! the same runtime node across one derivation.
//!
//! One store per session; nothing here is global.
//!
//! # Layout
//!
//! Payloads sit in `MemoTable`s. Value annotations and explanation links
//! sit in parallel `Cell` arrays so the slicing passes can update them
//! through a shared reference while reading explanations.

use std::cell::Cell;
use std::hash::Hash;

use lc_ir::{Annotation, BinderId, ExprId, Lattice, RecDef};
use rustc_hash::FxHashMap;

use crate::errors::{capacity_exceeded, malformed_rec_group, reclassify, EvalResult};
use crate::{Env, Expl, FrameId, Id, RecGroupId, Tid, Value, Vid};

/// Payloads that can be stored at an identity.
pub trait Shaped {
    /// What a table of these holds, for capacity errors.
    const KIND: &'static str;

    /// Whether `other` may overwrite `self` in place.
    fn same_shape(&self, other: &Self) -> bool;

    /// Shape description for reclassification errors.
    fn describe(&self) -> String;
}

impl Shaped for Value {
    const KIND: &'static str = "values";

    fn same_shape(&self, other: &Self) -> bool {
        Value::same_shape(self, other)
    }

    fn describe(&self) -> String {
        match self {
            Value::Data(d) => format!("Data({:?})", d.ctr),
            other => other.type_name().to_string(),
        }
    }
}

impl Shaped for Expl {
    const KIND: &'static str = "explanations";

    fn same_shape(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn describe(&self) -> String {
        self.kind_name().to_string()
    }
}

/// A handle type indexing one `MemoTable`.
pub trait Handle: Copy + Eq + Hash {
    fn from_raw(raw: u32) -> Self;
    fn index(self) -> usize;
}

impl Handle for Vid {
    fn from_raw(raw: u32) -> Self {
        Vid::new(raw)
    }

    fn index(self) -> usize {
        Vid::index(self)
    }
}

impl Handle for Tid {
    fn from_raw(raw: u32) -> Self {
        Tid::new(raw)
    }

    fn index(self) -> usize {
        Tid::index(self)
    }
}

/// At most one instance per `Id`, addressed by a dense handle.
pub struct MemoTable<H, T> {
    ids: Vec<Id>,
    payloads: Vec<T>,
    by_id: FxHashMap<Id, H>,
}

impl<H: Handle, T: Shaped> MemoTable<H, T> {
    pub fn new() -> Self {
        MemoTable {
            ids: Vec::new(),
            payloads: Vec::new(),
            by_id: FxHashMap::default(),
        }
    }

    /// The instance at `id`, created or overwritten with `payload`.
    ///
    /// Returns the handle and whether it was newly allocated. Reusing an id
    /// with a payload of a different shape is an invariant violation.
    pub fn at(&mut self, id: Id, payload: T) -> EvalResult<(H, bool)> {
        if let Some(&handle) = self.by_id.get(&id) {
            let existing = &mut self.payloads[handle.index()];
            if !existing.same_shape(&payload) {
                return Err(reclassify(
                    &id.to_string(),
                    &existing.describe(),
                    &payload.describe(),
                ));
            }
            *existing = payload;
            return Ok((handle, false));
        }

        let raw = u32::try_from(self.payloads.len())
            .map_err(|_| capacity_exceeded(T::KIND))?;
        let handle = H::from_raw(raw);
        self.ids.push(id);
        self.payloads.push(payload);
        self.by_id.insert(id, handle);
        Ok((handle, true))
    }

    #[inline]
    pub fn get(&self, handle: H) -> &T {
        &self.payloads[handle.index()]
    }

    #[inline]
    pub fn id(&self, handle: H) -> Id {
        self.ids[handle.index()]
    }

    pub fn lookup(&self, id: Id) -> Option<H> {
        self.by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

impl<H: Handle, T: Shaped> Default for MemoTable<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared record of one mutually recursive definition group.
///
/// Closures of the group point here instead of at each other; each
/// application closes the group again against `env`.
#[derive(Clone, Debug)]
pub struct RecGroup {
    pub defs: Vec<RecDef>,
    /// Environment the group was defined in, before the group's own bindings.
    pub env: Env,
    /// Frame the group was defined in.
    pub frame: FrameId,
}

/// Session-scoped store of versioned values and explanations.
#[derive(Default)]
pub struct Store {
    values: MemoTable<Vid, Value>,
    annotations: Vec<Cell<Annotation>>,
    value_expls: Vec<Cell<Option<Tid>>>,
    expls: MemoTable<Tid, Expl>,
    /// Non-root frames, keyed by parent frame and call site.
    frames: FxHashMap<(FrameId, ExprId), FrameId>,
    groups: Vec<RecGroup>,
    group_index: FxHashMap<(FrameId, BinderId), RecGroupId>,
    next_extern: u32,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh external identity.
    pub fn fresh(&mut self) -> Id {
        let id = Id::Extern(self.next_extern);
        self.next_extern += 1;
        id
    }

    // Values

    /// The value at `id`, created or overwritten with `value`.
    ///
    /// A new value starts out annotated `Top` with no explanation; an
    /// existing one keeps both.
    pub fn at(&mut self, id: Id, value: Value) -> EvalResult<Vid> {
        let (vid, created) = self.values.at(id, value)?;
        if created {
            self.annotations.push(Cell::new(Annotation::top()));
            self.value_expls.push(Cell::new(None));
        }
        Ok(vid)
    }

    /// Rebuild `v`'s payload under `id`.
    pub fn copy_at(&mut self, id: Id, v: Vid) -> EvalResult<Vid> {
        let payload = self.values.get(v).clone();
        self.at(id, payload)
    }

    #[inline]
    pub fn value(&self, v: Vid) -> &Value {
        self.values.get(v)
    }

    #[inline]
    pub fn id_of(&self, v: Vid) -> Id {
        self.values.id(v)
    }

    pub fn lookup(&self, id: Id) -> Option<Vid> {
        self.values.lookup(id)
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn vids(&self) -> impl Iterator<Item = Vid> {
        let len = u32::try_from(self.values.len()).unwrap_or(u32::MAX);
        (0..len).map(Vid::new)
    }

    // Annotations

    #[inline]
    pub fn annotation(&self, v: Vid) -> Annotation {
        self.annotations[v.index()].get()
    }

    #[inline]
    pub fn set_annotation(&self, v: Vid, annotation: Annotation) {
        self.annotations[v.index()].set(annotation);
    }

    /// Join onto `v`'s annotation, returning the new value.
    #[inline]
    pub fn join_annotation(&self, v: Vid, annotation: Annotation) -> Annotation {
        let cell = &self.annotations[v.index()];
        let joined = cell.get().join(annotation);
        cell.set(joined);
        joined
    }

    /// Meet onto `v`'s annotation, returning the new value.
    #[inline]
    pub fn meet_annotation(&self, v: Vid, annotation: Annotation) -> Annotation {
        let cell = &self.annotations[v.index()];
        let met = cell.get().meet(annotation);
        cell.set(met);
        met
    }

    /// Set the annotation of every value in the store.
    pub fn set_all_annotations(&self, annotation: Annotation) {
        for cell in &self.annotations {
            cell.set(annotation);
        }
    }

    /// Set the annotation of `v` and of every value reachable through
    /// constructor fields.
    pub fn set_value_annotation_deep(&self, v: Vid, annotation: Annotation) {
        let mut pending = vec![v];
        while let Some(v) = pending.pop() {
            self.set_annotation(v, annotation);
            pending.extend_from_slice(self.value(v).fields());
        }
    }

    // Explanations

    /// The explanation at `id`, created or overwritten.
    pub fn record(&mut self, id: Id, expl: Expl) -> EvalResult<Tid> {
        self.expls.at(id, expl).map(|(tid, _)| tid)
    }

    #[inline]
    pub fn expl(&self, t: Tid) -> &Expl {
        self.expls.get(t)
    }

    #[inline]
    pub fn expl_id(&self, t: Tid) -> Id {
        self.expls.id(t)
    }

    /// Link `v` to the explanation of how it was produced.
    #[inline]
    pub fn set_expl(&self, v: Vid, t: Tid) {
        self.value_expls[v.index()].set(Some(t));
    }

    #[inline]
    pub fn expl_of(&self, v: Vid) -> Option<Tid> {
        self.value_expls[v.index()].get()
    }

    pub fn expl_count(&self) -> usize {
        self.expls.len()
    }

    // Frames

    /// The frame for evaluating a closure body called at `site` from
    /// `parent`. The same pair always yields the same frame.
    pub fn enter_frame(&mut self, parent: FrameId, site: ExprId) -> EvalResult<FrameId> {
        if let Some(&frame) = self.frames.get(&(parent, site)) {
            return Ok(frame);
        }
        let raw = u32::try_from(self.frames.len() + 1)
            .map_err(|_| capacity_exceeded("instantiation frames"))?;
        let frame = FrameId::new(raw);
        self.frames.insert((parent, site), frame);
        Ok(frame)
    }

    /// Number of frames, the root included.
    pub fn frame_count(&self) -> usize {
        self.frames.len() + 1
    }

    // Recursive groups

    /// The group record for `defs` defined in `frame`, created or refreshed.
    pub fn rec_group(
        &mut self,
        frame: FrameId,
        defs: &[RecDef],
        env: Env,
    ) -> EvalResult<RecGroupId> {
        let Some(first) = defs.first() else {
            return Err(malformed_rec_group("empty group"));
        };
        let group = RecGroup {
            defs: defs.to_vec(),
            env,
            frame,
        };
        if let Some(&id) = self.group_index.get(&(frame, first.x)) {
            self.groups[id.index()] = group;
            return Ok(id);
        }
        let raw = u32::try_from(self.groups.len())
            .map_err(|_| capacity_exceeded("recursive groups"))?;
        let id = RecGroupId::new(raw);
        self.groups.push(group);
        self.group_index.insert((frame, first.x), id);
        Ok(id)
    }

    #[inline]
    pub fn group(&self, id: RecGroupId) -> &RecGroup {
        &self.groups[id.index()]
    }
}
