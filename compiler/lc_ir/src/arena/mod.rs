//! Flat arena for syntax nodes.
//!
//! Struct-of-arrays layout: node kinds live in one table per node category
//! and the annotation of each annotatable node (expressions and binders)
//! lives in a parallel table of `Cell`s. Kinds are never mutated once
//! allocated, so the arena can be shared by reference while the slicing
//! passes rewrite annotations.

use std::cell::Cell;

use crate::{
    Annotation, Args, ArgsId, BinderId, Def, DefId, DefRange, ExprId, ExprKind, ExprRange,
    Kont, Lattice, Name, Node, Trie, TrieId,
};

/// Convert a table length into the next `u32` index.
///
/// # Panics
/// Panics if a table grows past `u32::MAX` entries.
#[inline]
fn next_index(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what} in one arena"))
}

/// Arena for one program.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    /// Expression kinds (parallel with `expr_annotations`).
    exprs: Vec<ExprKind>,
    /// Per-expression annotation.
    expr_annotations: Vec<Cell<Annotation>>,
    /// Binder names (parallel with `binder_annotations`).
    binders: Vec<Name>,
    /// Per-binder annotation.
    binder_annotations: Vec<Cell<Annotation>>,
    /// Flattened constructor argument lists, indexed by `ExprRange`.
    expr_lists: Vec<ExprId>,
    /// Definitions, indexed by `DefId`/`DefRange`.
    defs: Vec<Def>,
    /// Tries, indexed by `TrieId`.
    tries: Vec<Trie>,
    /// Argument tries, indexed by `ArgsId`.
    args: Vec<Args>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    // Allocation

    /// Allocate an expression. New nodes are annotated `Top`.
    pub fn alloc_expr(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId::new(next_index(self.exprs.len(), "expressions"));
        self.exprs.push(kind);
        self.expr_annotations.push(Cell::new(Annotation::top()));
        id
    }

    /// Allocate a binding occurrence. New binders are annotated `Top`.
    pub fn alloc_binder(&mut self, name: Name) -> BinderId {
        let id = BinderId::new(next_index(self.binders.len(), "binders"));
        self.binders.push(name);
        self.binder_annotations.push(Cell::new(Annotation::top()));
        id
    }

    /// Allocate a contiguous list of expressions.
    pub fn alloc_expr_list(&mut self, exprs: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = next_index(self.expr_lists.len(), "expression lists");
        self.expr_lists.extend(exprs);
        let len = next_index(self.expr_lists.len(), "expression lists") - start;
        ExprRange::new(start, len)
    }

    /// Allocate the definitions of one `Defs` block.
    pub fn alloc_defs(&mut self, defs: impl IntoIterator<Item = Def>) -> DefRange {
        let start = next_index(self.defs.len(), "definitions");
        self.defs.extend(defs);
        let len = next_index(self.defs.len(), "definitions") - start;
        DefRange::new(start, len)
    }

    pub fn alloc_trie(&mut self, trie: Trie) -> TrieId {
        let id = TrieId::new(next_index(self.tries.len(), "tries"));
        self.tries.push(trie);
        id
    }

    pub fn alloc_args(&mut self, args: Args) -> ArgsId {
        let id = ArgsId::new(next_index(self.args.len(), "argument tries"));
        self.args.push(args);
        id
    }

    // Access

    #[inline]
    pub fn kind(&self, id: ExprId) -> ExprKind {
        self.exprs[id.index()]
    }

    #[inline]
    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.as_range()]
    }

    #[inline]
    pub fn def(&self, id: DefId) -> &Def {
        &self.defs[id.index()]
    }

    #[inline]
    pub fn binder_name(&self, id: BinderId) -> Name {
        self.binders[id.index()]
    }

    #[inline]
    pub fn trie(&self, id: TrieId) -> &Trie {
        &self.tries[id.index()]
    }

    #[inline]
    pub fn args(&self, id: ArgsId) -> Args {
        self.args[id.index()]
    }

    /// Number of expression nodes.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// All expression ids, in allocation order.
    pub fn expr_ids(&self) -> impl Iterator<Item = ExprId> {
        (0..next_index(self.exprs.len(), "expressions")).map(ExprId::new)
    }

    // Annotations

    #[inline]
    fn cell(&self, node: Node) -> &Cell<Annotation> {
        match node {
            Node::Expr(id) => &self.expr_annotations[id.index()],
            Node::Binder(id) => &self.binder_annotations[id.index()],
        }
    }

    #[inline]
    pub fn annotation(&self, node: impl Into<Node>) -> Annotation {
        self.cell(node.into()).get()
    }

    /// Overwrite a node's annotation.
    #[inline]
    pub fn set_annotation(&self, node: impl Into<Node>, annotation: Annotation) {
        self.cell(node.into()).set(annotation);
    }

    /// Join onto a node's annotation, returning the new value.
    #[inline]
    pub fn join_annotation(&self, node: impl Into<Node>, annotation: Annotation) -> Annotation {
        let cell = self.cell(node.into());
        let joined = cell.get().join(annotation);
        cell.set(joined);
        joined
    }

    /// Meet onto a node's annotation, returning the new value.
    #[inline]
    pub fn meet_annotation(&self, node: impl Into<Node>, annotation: Annotation) -> Annotation {
        let cell = self.cell(node.into());
        let met = cell.get().meet(annotation);
        cell.set(met);
        met
    }

    /// Set the annotation of every node in the subtree rooted at `root`,
    /// including binders and the bodies of tries.
    pub fn set_all_annotations(&self, root: ExprId, annotation: Annotation) {
        for node in self.subtree(root) {
            self.set_annotation(node, annotation);
        }
    }

    /// Every annotatable node reachable from `root`, each exactly once.
    pub fn subtree(&self, root: ExprId) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut exprs = vec![root];
        while let Some(id) = exprs.pop() {
            nodes.push(Node::Expr(id));
            match self.kind(id) {
                ExprKind::Num(_) | ExprKind::Str(_) | ExprKind::Var(_) => {}
                ExprKind::Fun(trie) => self.push_trie_bodies(trie, &mut exprs),
                ExprKind::Constr { args, .. } => {
                    exprs.extend(self.expr_list(args).iter().rev());
                }
                ExprKind::App { func, arg } => {
                    exprs.push(arg);
                    exprs.push(func);
                }
                ExprKind::BinaryApp { left, right, .. } => {
                    exprs.push(right);
                    exprs.push(left);
                }
                ExprKind::Defs { defs, body } => {
                    exprs.push(body);
                    for def_id in defs.iter().rev() {
                        match self.def(def_id) {
                            Def::Let { x, e } => {
                                nodes.push(Node::Binder(*x));
                                exprs.push(*e);
                            }
                            Def::Prim { x } => nodes.push(Node::Binder(*x)),
                            Def::LetRec(group) => {
                                for rec in group.iter().rev() {
                                    nodes.push(Node::Binder(rec.x));
                                    self.push_trie_bodies(rec.trie, &mut exprs);
                                }
                            }
                        }
                    }
                }
                ExprKind::MatchAs { scrutinee, trie } => {
                    self.push_trie_bodies(trie, &mut exprs);
                    exprs.push(scrutinee);
                }
            }
        }
        nodes
    }

    /// Push every branch body of a trie onto the worklist.
    fn push_trie_bodies(&self, trie: TrieId, exprs: &mut Vec<ExprId>) {
        let mut konts = Vec::new();
        let mut tries = vec![trie];
        while let Some(trie) = tries.pop() {
            match self.trie(trie) {
                Trie::Var { kont, .. } => konts.push(*kont),
                Trie::Constr(branches) => {
                    for &(_, args) in branches.iter().rev() {
                        konts.push(Kont::Args(args));
                    }
                }
            }
            while let Some(kont) = konts.pop() {
                match kont {
                    Kont::Expr(body) => exprs.push(body),
                    Kont::Args(args) => match self.args(args) {
                        Args::End(next) => konts.push(next),
                        Args::Next(field) => tries.push(field),
                    },
                }
            }
        }
    }
}
