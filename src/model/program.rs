//! Solver-independent representation of a mixed-integer linear program.
//!
//! Variables live in an arena and are addressed by [`VarId`]; rows store
//! sparse `(VarId, coefficient)` terms with a `[lower, upper]` activity range.
//! The objective is always minimized.

use std::fmt;

/// Index of a variable in a [`MixedIntegerProgram`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    #[inline] pub fn index(self) -> usize { self.0 as usize }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind { Binary, Continuous }

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
    /// Objective coefficient.
    pub cost: f64,
}

/// Which family of constraints a row belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowTag {
    /// Every region belongs to exactly one district.
    SingleAssignment,
    /// Exactly `k` anchors.
    DistrictCount,
    /// Anchored district population at least the lower bound.
    PopulationLower,
    /// Anchored district population at most the upper bound.
    PopulationUpper,
    /// A region may only join an active anchor.
    Coupling,
    /// Each assigned region consumes one unit of its root's flow.
    FlowConservation,
    /// Flow may only enter regions assigned to the root.
    FlowCapacity,
    /// A root never receives its own flow.
    RootExclusion,
}

impl fmt::Display for RowTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowTag::SingleAssignment => "single-assignment",
            RowTag::DistrictCount => "district-count",
            RowTag::PopulationLower => "population-lower",
            RowTag::PopulationUpper => "population-upper",
            RowTag::Coupling => "coupling",
            RowTag::FlowConservation => "flow-conservation",
            RowTag::FlowCapacity => "flow-capacity",
            RowTag::RootExclusion => "root-exclusion",
        };
        f.write_str(name)
    }
}

/// A linear row `lower <= Σ coef * var <= upper`.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub tag: RowTag,
    pub terms: Vec<(VarId, f64)>,
    pub lower: f64,
    pub upper: f64,
}

impl Row {
    /// Evaluate the row activity for a full assignment of variable values.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(var, coef)| coef * values[var.index()]).sum()
    }
}

/// A minimization MIP built incrementally by the model builders.
#[derive(Clone, Debug, Default)]
pub struct MixedIntegerProgram {
    variables: Vec<Variable>,
    rows: Vec<Row>,
}

impl MixedIntegerProgram {
    pub fn new() -> Self { Self::default() }

    fn push_variable(&mut self, variable: Variable) -> VarId {
        let id = VarId(u32::try_from(self.variables.len()).expect("variable count exceeds u32::MAX"));
        self.variables.push(variable);
        id
    }

    /// Add a 0/1 variable with the given objective coefficient.
    pub fn add_binary(&mut self, cost: f64) -> VarId {
        self.push_variable(Variable { kind: VarKind::Binary, lower: 0.0, upper: 1.0, cost })
    }

    /// Add a continuous variable with bounds `[lower, upper]`.
    pub fn add_continuous(&mut self, cost: f64, lower: f64, upper: f64) -> VarId {
        self.push_variable(Variable { kind: VarKind::Continuous, lower, upper, cost })
    }

    /// Add a row `lower <= Σ terms <= upper`.
    pub fn add_row(&mut self, tag: RowTag, terms: Vec<(VarId, f64)>, lower: f64, upper: f64) {
        debug_assert!(terms.iter().all(|&(v, _)| v.index() < self.variables.len()));
        self.rows.push(Row { tag, terms, lower, upper });
    }

    /// Add a row `Σ terms = rhs`.
    #[inline] pub fn add_eq(&mut self, tag: RowTag, terms: Vec<(VarId, f64)>, rhs: f64) { self.add_row(tag, terms, rhs, rhs) }

    /// Add a row `Σ terms >= rhs`.
    #[inline] pub fn add_ge(&mut self, tag: RowTag, terms: Vec<(VarId, f64)>, rhs: f64) { self.add_row(tag, terms, rhs, f64::INFINITY) }

    /// Add a row `Σ terms <= rhs`.
    #[inline] pub fn add_le(&mut self, tag: RowTag, terms: Vec<(VarId, f64)>, rhs: f64) { self.add_row(tag, terms, f64::NEG_INFINITY, rhs) }

    #[inline] pub fn variables(&self) -> &[Variable] { &self.variables }

    #[inline] pub fn variable(&self, id: VarId) -> &Variable { &self.variables[id.index()] }

    #[inline] pub fn rows(&self) -> &[Row] { &self.rows }

    #[inline] pub fn num_variables(&self) -> usize { self.variables.len() }

    #[inline] pub fn num_rows(&self) -> usize { self.rows.len() }

    /// Number of variables of the given kind.
    pub fn count_variables(&self, kind: VarKind) -> usize {
        self.variables.iter().filter(|v| v.kind == kind).count()
    }

    /// Number of rows with the given tag.
    pub fn count_rows(&self, tag: RowTag) -> usize {
        self.rows.iter().filter(|r| r.tag == tag).count()
    }

    /// Objective value of a full assignment.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables.iter().zip(values).map(|(v, &x)| v.cost * x).sum()
    }

    /// Find the first bound or row violated by `values` beyond `tol`.
    ///
    /// Returns a human-readable description, or `None` if every bound,
    /// integrality requirement and row holds.
    pub fn first_violation(&self, values: &[f64], tol: f64) -> Option<String> {
        if values.len() != self.variables.len() {
            return Some(format!("expected {} values, got {}", self.variables.len(), values.len()));
        }
        for (i, (var, &x)) in self.variables.iter().zip(values).enumerate() {
            if x < var.lower - tol || x > var.upper + tol {
                return Some(format!("variable {i} = {x} outside [{}, {}]", var.lower, var.upper));
            }
            if var.kind == VarKind::Binary && (x - x.round()).abs() > tol {
                return Some(format!("binary variable {i} = {x} is fractional"));
            }
        }
        self.rows.iter().enumerate().find_map(|(r, row)| {
            let activity = row.activity(values);
            (activity < row.lower - tol || activity > row.upper + tol).then(|| {
                format!("{} row {r}: activity {activity} outside [{}, {}]", row.tag, row.lower, row.upper)
            })
        })
    }
}
