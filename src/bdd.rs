use std::collections::HashMap;
use std::fmt::Debug;
use std::mem;

use log::debug;

use crate::cache::OpCache;
use crate::reference::Ref;
use crate::table::UniqueTable;

/// Default number of variables when none is given.
pub const DEFAULT_VARIABLES: u32 = 16;
/// Default unique-table size (prime).
pub const DEFAULT_UNIQUE_TABLE_SIZE: usize = 5003;
/// Default computed-table size (prime).
pub const DEFAULT_COMPUTED_TABLE_SIZE: usize = 5003;

/// Which cofactor of a node to take.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Branch {
    Low,
    High,
}

/// The BDD manager: owner of the node pool, the computed tables, and the
/// variable supports; home of the ITE synthesis engine.
///
/// Every function handled by one manager lives in one shared pool of
/// canonical nodes, so checking two functions for equality is a bit
/// comparison of their [`Ref`]s. Variables are totally ordered: a larger
/// index is tested earlier (sits closer to the root), and index `0` is
/// reserved for the leaf.
///
/// All synthesis funnels through [`ite`][Bdd::ite]; the Boolean operators
/// are one-line reductions to it.
pub struct Bdd {
    pub(crate) table: UniqueTable,
    ite_cache: OpCache<(Ref, Ref, Ref), Ref>,
    exist_cache: OpCache<(Ref, Ref, Ref), Ref>,
    /// Variable the `exist_cache` entries are valid for. The memo is keyed
    /// per node, so quantifying a different variable invalidates it.
    exist_var: Option<u32>,
    cache_size: usize,
    vars: Vec<Ref>,
    /// Acquired root counts per node index, mirrored into the node
    /// reference counters.
    pub(crate) external: HashMap<u32, u32>,
    num_vars: u32,
    pub zero: Ref,
    pub one: Ref,
}

impl Bdd {
    /// Create a manager for `variables` variables with the given table
    /// sizes (both rounded down to primes). The support of every variable
    /// is materialized eagerly and retained for the manager's lifetime.
    pub fn new(variables: u32, unique_size: usize, cache_size: usize) -> Self {
        let mut bdd = Self {
            table: UniqueTable::new(unique_size),
            ite_cache: OpCache::new(cache_size),
            exist_cache: OpCache::new(cache_size),
            exist_var: None,
            cache_size,
            vars: Vec::with_capacity(variables as usize + 1),
            external: HashMap::new(),
            num_vars: variables,
            zero: Ref::negative(UniqueTable::LEAF),
            one: Ref::positive(UniqueTable::LEAF),
        };
        bdd.materialize_supports();
        bdd
    }

    fn materialize_supports(&mut self) {
        self.vars.push(self.one);
        for i in 1..=self.num_vars {
            let v = self.mk_node(i, self.zero, self.one);
            self.table.bump_ref(v.index());
            self.vars.push(v);
        }
    }

    /// The pre-built support for `variable`: the function testing exactly
    /// that variable.
    pub fn create_variable(&self, variable: u32) -> Ref {
        assert!(
            (variable as usize) < self.vars.len(),
            "There is no support for this variable"
        );
        self.vars[variable as usize]
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Number of live nodes in the pool, the leaf included.
    pub fn num_nodes(&self) -> usize {
        self.table.num_nodes()
    }

    pub(crate) fn node(&self, index: u32) -> &crate::node::Node {
        self.table.node(index)
    }

    pub fn is_leaf(&self, f: Ref) -> bool {
        f.index() == UniqueTable::LEAF
    }

    pub fn is_one(&self, f: Ref) -> bool {
        f == self.one
    }

    pub fn is_zero(&self, f: Ref) -> bool {
        f == self.zero
    }

    /// Variable label of `f`'s node (`0` for the leaf).
    pub fn variable(&self, f: Ref) -> u32 {
        self.node(f.index()).variable
    }

    /// Else-child as stored on the node, ignoring `f`'s outer edge.
    pub fn low(&self, f: Ref) -> Ref {
        self.node(f.index()).low
    }

    /// Then-child as stored on the node, ignoring `f`'s outer edge.
    pub fn high(&self, f: Ref) -> Ref {
        self.node(f.index()).high
    }

    /// Else-cofactor of the function denoted by `f`, with the outer edge
    /// pushed through.
    pub fn low_node(&self, f: Ref) -> Ref {
        let low = self.low(f);
        if f.is_complemented() {
            -low
        } else {
            low
        }
    }

    /// Then-cofactor of the function denoted by `f`, with the outer edge
    /// pushed through.
    pub fn high_node(&self, f: Ref) -> Ref {
        let high = self.high(f);
        if f.is_complemented() {
            -high
        } else {
            high
        }
    }

    /// Reduced, canonical node construction: returns the handle for the
    /// function `if v then high else low`.
    ///
    /// Restores the two structural rules before touching the unique table:
    /// a complemented then-edge is pushed to the outside, and equal
    /// children collapse to the child itself.
    pub fn mk_node(&mut self, v: u32, low: Ref, high: Ref) -> Ref {
        debug!("mk_node(v = {}, low = {}, high = {})", v, low, high);

        assert_ne!(v, 0, "Variable index must not be zero");

        if high.is_complemented() {
            return -self.mk_node(v, -low, -high);
        }

        if low == high {
            return low;
        }

        assert!(
            v > self.variable(low) && v > self.variable(high),
            "Node children must carry smaller variable indices"
        );

        Ref::positive(self.table.find_or_add(v, low, high))
    }

    /// Both top cofactors of `node` with respect to `v`, as `(low, high)`.
    /// `v` must be at or above `node`'s root variable.
    pub fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        assert_ne!(v, 0, "Variable index must not be zero");

        let n = self.node(node.index());
        if n.variable < v {
            // The function does not test `v`: both cofactors are itself.
            return (node, node);
        }
        debug_assert_eq!(n.variable, v);
        if node.is_complemented() {
            (-n.low, -n.high)
        } else {
            (n.low, n.high)
        }
    }

    fn top_variable(&self, f: Ref, g: Ref, h: Ref) -> u32 {
        let top = self.variable(f).max(self.variable(g)).max(self.variable(h));
        assert_ne!(top, 0);
        top
    }

    /// Rewrite `(f, g, h)` into the canonical representative of its ITE
    /// equivalence class, returning the representative and the accumulated
    /// output complement.
    ///
    /// Distinct calls that denote the same function collapse onto one
    /// computed-table key this way. After standardization both `f` and `g`
    /// carry regular outer edges.
    fn standardize(&self, f: Ref, g: Ref, h: Ref) -> (Ref, Ref, Ref, bool) {
        let (mut f, mut g, mut h) = (f, g, h);
        let mut complemented = false;

        // Identity rules: f reappearing as g or h fixes that branch.
        if g == f {
            g = self.one;
        } else if h == f {
            h = self.zero;
        } else if h == -f {
            h = self.one;
        } else if g == -f {
            g = self.zero;
        }

        // Symmetry rules: of two equivalent argument orders, the one with
        // the smaller first variable represents the class.
        if g == self.one {
            // ite(f, 1, h) == ite(h, 1, f)
            if self.variable(f) > self.variable(h) {
                mem::swap(&mut f, &mut h);
            }
        } else if g == self.zero {
            // ite(f, 0, h) == ite(~h, 0, ~f)
            if self.variable(f) > self.variable(h) {
                mem::swap(&mut f, &mut h);
                f = -f;
                h = -h;
            }
        } else if g == -h {
            // ite(f, g, ~g) == ite(g, f, ~f)
            if self.variable(f) > self.variable(g) {
                mem::swap(&mut f, &mut g);
                h = -g;
            }
        } else if h == self.one {
            // ite(f, g, 1) == ite(~g, ~f, 1)
            if self.variable(f) > self.variable(g) {
                mem::swap(&mut f, &mut g);
                f = -f;
                g = -g;
            }
        } else if h == self.zero {
            // ite(f, g, 0) == ite(g, f, 0)
            if self.variable(f) > self.variable(g) {
                mem::swap(&mut f, &mut g);
            }
        }

        // Edge rules: f and g end up with regular outer edges; negation
        // moves into the output complement.
        if f.is_complemented() {
            mem::swap(&mut g, &mut h);
            f = -f;
        }
        if g.is_complemented() {
            g = -g;
            h = -h;
            complemented = !complemented;
        }

        (f, g, h, complemented)
    }

    fn terminal_case(&self, f: Ref, g: Ref, h: Ref) -> Option<Ref> {
        if f == self.one {
            Some(g)
        } else if f == self.zero {
            Some(h)
        } else if h == self.zero && g == self.one {
            Some(f)
        } else if g == h {
            Some(g)
        } else {
            None
        }
    }

    /// The universal synthesis operator:
    ///
    /// ```text
    /// ite(f, g, h) = f·g + ¬f·h
    /// ```
    ///
    /// Standardizes the triple, dispatches terminal cases, consults the
    /// computed table, and otherwise recurses on the cofactors at the top
    /// variable of the three arguments. Runs in O(|f|·|g|·|h|).
    ///
    /// # Examples
    ///
    /// ```
    /// use sbdd_rs::bdd::Bdd;
    ///
    /// let mut bdd = Bdd::default();
    /// let x = bdd.create_variable(3);
    /// let y = bdd.create_variable(2);
    /// let z = bdd.create_variable(1);
    /// let f = bdd.ite(x, y, z);
    /// assert_eq!(f, bdd.mk_node(3, z, y));
    /// ```
    pub fn ite(&mut self, f: Ref, g: Ref, h: Ref) -> Ref {
        debug!("ite(f = {}, g = {}, h = {})", f, g, h);

        let (f, g, h, complemented) = self.standardize(f, g, h);

        if let Some(res) = self.terminal_case(f, g, h) {
            return if complemented { -res } else { res };
        }

        let key = (f, g, h);
        if let Some(&res) = self.ite_cache.lookup(&key) {
            debug!("ite: cache hit for ({}, {}, {}) -> {}", f, g, h, res);
            return if complemented { -res } else { res };
        }

        let top = self.top_variable(f, g, h);
        let (f0, f1) = self.top_cofactors(f, top);
        let (g0, g1) = self.top_cofactors(g, top);
        let (h0, h1) = self.top_cofactors(h, top);

        let t = self.ite(f1, g1, h1);
        let e = self.ite(f0, g0, h0);

        if t == e {
            return if complemented { -t } else { t };
        }

        let res = self.mk_node(top, e, t);
        self.ite_cache.insert(key, res);
        debug!("ite: computed ({}, {}, {}) -> {}", f, g, h, res);

        if complemented {
            -res
        } else {
            res
        }
    }

    /// Negation: a constant-time edge flip.
    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    /// Conjunction: `ite(f, g, 0)`.
    pub fn apply_and(&mut self, f: Ref, g: Ref) -> Ref {
        self.ite(f, g, self.zero)
    }

    /// Disjunction: `ite(f, 1, g)`.
    pub fn apply_or(&mut self, f: Ref, g: Ref) -> Ref {
        self.ite(f, self.one, g)
    }

    /// Exclusive or: `ite(f, ¬g, g)`.
    pub fn apply_xor(&mut self, f: Ref, g: Ref) -> Ref {
        self.ite(f, -g, g)
    }

    /// Sheffer stroke: `ite(f, ¬g, 1)`.
    pub fn apply_nand(&mut self, f: Ref, g: Ref) -> Ref {
        self.ite(f, -g, self.one)
    }

    /// Joint denial: `ite(f, 0, ¬g)`.
    pub fn apply_nor(&mut self, f: Ref, g: Ref) -> Ref {
        self.ite(f, self.zero, -g)
    }

    /// Equivalence: `ite(f, g, ¬g)`.
    pub fn apply_xnor(&mut self, f: Ref, g: Ref) -> Ref {
        self.ite(f, g, -g)
    }

    /// `f ∧ ¬g`: `ite(f, ¬g, 0)`.
    pub fn apply_gt(&mut self, f: Ref, g: Ref) -> Ref {
        self.ite(f, -g, self.zero)
    }

    /// `¬f ∧ g`: `ite(f, 0, g)`.
    pub fn apply_lt(&mut self, f: Ref, g: Ref) -> Ref {
        self.ite(f, self.zero, g)
    }

    /// Restriction of `f` to `v = 1` ([`Branch::High`]) or `v = 0`
    /// ([`Branch::Low`]).
    ///
    /// Constant time when `v` is at or above the root label; otherwise a
    /// traversal bounded by the size of `f`.
    pub fn cofactor(&mut self, f: Ref, v: u32, branch: Branch) -> Ref {
        debug!("cofactor(f = {}, v = {}, branch = {:?})", f, v, branch);
        assert_ne!(v, 0, "Variable index must not be zero");

        let label = self.variable(f);
        if label < v {
            // `v` is above the root, so `f` cannot depend on it.
            return f;
        }
        if label == v {
            let n = self.node(f.index());
            let child = match branch {
                Branch::Low => n.low,
                Branch::High => n.high,
            };
            return if f.is_complemented() { -child } else { child };
        }

        let n = self.node(f.index());
        let (low, high) = (n.low, n.high);
        let t = self.cofactor(high, v, branch);
        let e = self.cofactor(low, v, branch);
        let res = self.mk_node(label, e, t);
        if f.is_complemented() {
            -res
        } else {
            res
        }
    }

    /// Existential quantification `∃v. f = f|v=0 ∨ f|v=1`.
    ///
    /// Quantifying over variable `0` is the identity. Runs in O(|f|²)
    /// since a fresh disjunction may be synthesized at every level.
    pub fn exist(&mut self, f: Ref, v: u32) -> Ref {
        if v == 0 {
            return f;
        }
        if self.exist_var != Some(v) {
            self.exist_cache.load(self.cache_size);
            self.exist_var = Some(v);
        }
        self.exist_recur(f, v)
    }

    fn exist_recur(&mut self, node: Ref, v: u32) -> Ref {
        debug!("exist(node = {}, v = {})", node, v);

        if self.is_leaf(node) {
            return node;
        }
        let label = self.variable(node);
        if label < v {
            // `v` cannot occur below this point.
            return node;
        }

        let (lo, hi) = self.top_cofactors(node, label);
        let key = (node, hi, lo);
        if let Some(&res) = self.exist_cache.lookup(&key) {
            debug!("exist: cache hit for {} -> {}", node, res);
            return res;
        }

        if label == v {
            let res = self.apply_or(lo, hi);
            self.exist_cache.insert(key, res);
            return res;
        }

        let t = self.exist_recur(hi, v);
        let e = self.exist_recur(lo, v);
        let res = if t == e { t } else { self.mk_node(label, e, t) };
        self.exist_cache.insert(key, res);
        res
    }

    /// Evaluate `f` under a total assignment; `assignment[i - 1]` is the
    /// value of variable `i`.
    pub fn eval(&self, f: Ref, assignment: &[bool]) -> bool {
        let mut node = f;
        loop {
            let n = self.node(node.index());
            if n.is_leaf() {
                return !node.is_complemented();
            }
            assert!(
                (n.variable as usize) <= assignment.len(),
                "Assignment does not cover variable {}",
                n.variable
            );
            let child = if assignment[n.variable as usize - 1] {
                n.high
            } else {
                n.low
            };
            node = if node.is_complemented() { -child } else { child };
        }
    }

    /// Number of distinct nodes reachable from `f`, the leaf included.
    /// Marks nodes during the walk and clears every mark before returning.
    pub fn count_nodes(&mut self, f: Ref) -> usize {
        let count = self.mark_recur(f.index());
        self.unmark_recur(f.index());
        count
    }

    pub(crate) fn mark_recur(&mut self, index: u32) -> usize {
        let node = self.node(index);
        if node.mark {
            return 0;
        }
        let (low, high, leaf) = (node.low, node.high, node.is_leaf());
        self.table.node_mut(index).mark = true;
        if leaf {
            1
        } else {
            1 + self.mark_recur(low.index()) + self.mark_recur(high.index())
        }
    }

    pub(crate) fn unmark_recur(&mut self, index: u32) {
        let node = self.node(index);
        if !node.mark {
            return;
        }
        let (low, high, leaf) = (node.low, node.high, node.is_leaf());
        self.table.node_mut(index).mark = false;
        if !leaf {
            self.unmark_recur(low.index());
            self.unmark_recur(high.index());
        }
    }

    /// Register `f` as a retained root: its node gains one reference until
    /// the matching [`release`][Bdd::release]. Returns `f` for chaining.
    pub fn acquire(&mut self, f: Ref) -> Ref {
        *self.external.entry(f.index()).or_insert(0) += 1;
        self.table.bump_ref(f.index());
        f
    }

    /// Drop one retained-root reference previously taken by
    /// [`acquire`][Bdd::acquire]. Releasing a root that was never acquired
    /// is an engine bug and aborts.
    pub fn release(&mut self, f: Ref) {
        let count = self
            .external
            .get_mut(&f.index())
            .expect("Releasing a root that was never acquired");
        assert!(*count > 0, "Releasing a root that was never acquired");
        *count -= 1;
        if *count == 0 {
            self.external.remove(&f.index());
        }
        self.table.drop_ref(f.index());
    }

    /// Whole-pool teardown: release every internal node, reload both
    /// computed tables, and re-materialize the variable supports. Handles
    /// obtained before the call are invalid afterwards.
    pub fn clear(&mut self) {
        debug!("clear: releasing {} nodes", self.num_nodes());
        self.table.clear();
        self.ite_cache.clear();
        self.ite_cache.load(self.cache_size);
        self.exist_cache.clear();
        self.exist_cache.load(self.cache_size);
        self.exist_var = None;
        self.external.clear();
        self.vars.clear();
        self.materialize_supports();
    }

    /// Compact nested dump: `handle:(xVar, then, else)`.
    pub fn to_bracket_string(&self, node: Ref) -> String {
        if self.is_zero(node) {
            return format!("{}:(0)", node);
        } else if self.is_one(node) {
            return format!("{}:(1)", node);
        }

        let v = self.variable(node);
        let low = self.low_node(node);
        let high = self.high_node(node);

        format!(
            "{}:(x{}, {}, {})",
            node,
            v,
            self.to_bracket_string(high),
            self.to_bracket_string(low)
        )
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(DEFAULT_VARIABLES, DEFAULT_UNIQUE_TABLE_SIZE, DEFAULT_COMPUTED_TABLE_SIZE)
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("num_vars", &self.num_vars)
            .field("unique_size", &self.table.size())
            .field("cache_size", &self.cache_size)
            .field("num_nodes", &self.num_nodes())
            .finish()
    }
}
