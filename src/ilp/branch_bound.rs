//! Depth-first branch-and-bound for small 0/1 programs.

use super::model::{IlpModel, Sense};
use super::solver::{IlpSolution, IlpSolver, SolverConfig, SolverStatus};
use std::time::Instant;

/// How often (in loop iterations) the clock and cancel flag are polled.
const POLL_INTERVAL: u64 = 1024;

/// A simple exact 0/1 ILP solver for testing and small instances.
///
/// Searches depth first, trying the value that helps the objective first.
/// Each constraint keeps the bounds of its left-hand side over the
/// unassigned variables, so a branch is cut as soon as some constraint can
/// no longer be met or the objective bound cannot beat the incumbent.
///
/// Equality rows of the form `Σ x = 1` with unit coefficients are treated
/// as choice groups: their members are branched on together, best
/// objective coefficient first, and each group adds at most its best free
/// member to the objective bound.
///
/// # Limitations
///
/// - No LP relaxation, cuts or propagation; worst case is exponential
/// - Intended for models with up to a few hundred variables, or larger
///   models with strong equality structure
pub struct SimpleIlpSolver;

impl SimpleIlpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimpleIlpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IlpSolver for SimpleIlpSolver {
    fn solve(&self, model: &IlpModel, config: &SolverConfig) -> IlpSolution {
        if let Err(e) = model.validate() {
            return IlpSolution::failed(SolverStatus::ModelInvalid, e.to_string());
        }
        if let Err(e) = config.validate() {
            return IlpSolution::failed(SolverStatus::Error, e.to_string());
        }

        let start_time = Instant::now();
        let mut search = Search::new(model, config.tolerance);
        let stop = search.run(config, start_time);
        let solve_time_ms = start_time.elapsed().as_millis() as u64;

        tracing::debug!(
            nodes = search.nodes,
            solve_time_ms,
            found = search.best.is_some(),
            "branch-and-bound finished"
        );

        let mut solution = match (search.best.take(), stop) {
            (Some((objective, values)), None) => IlpSolution {
                status: SolverStatus::Optimal,
                objective_value: Some(search.sign * objective),
                values,
                ..IlpSolution::empty(SolverStatus::Optimal)
            },
            (Some((objective, values)), Some(stop)) => IlpSolution {
                status: SolverStatus::Feasible,
                objective_value: Some(search.sign * objective),
                values,
                message: Some(format!("{}; returning incumbent", stop.reason())),
                ..IlpSolution::empty(SolverStatus::Feasible)
            },
            (None, None) => IlpSolution::empty(SolverStatus::Infeasible),
            (None, Some(stop)) => IlpSolution::failed(
                stop.status(),
                format!("{} before any feasible solution", stop.reason()),
            ),
        };
        solution.solve_time_ms = solve_time_ms;
        solution.nodes = search.nodes;
        solution
    }
}

#[derive(Debug, Clone, Copy)]
enum Stop {
    TimeLimit,
    NodeLimit,
    Cancelled,
}

impl Stop {
    fn reason(self) -> &'static str {
        match self {
            Stop::TimeLimit => "time limit reached",
            Stop::NodeLimit => "node limit reached",
            Stop::Cancelled => "cancelled",
        }
    }

    fn status(self) -> SolverStatus {
        match self {
            Stop::TimeLimit | Stop::NodeLimit => SolverStatus::Timeout,
            Stop::Cancelled => SolverStatus::Cancelled,
        }
    }
}

/// Left-hand side bounds of one constraint under a partial assignment.
struct Row {
    sense: Sense,
    rhs: f64,
    lo: f64,
    hi: f64,
}

impl Row {
    fn violated(&self, tol: f64) -> bool {
        match self.sense {
            Sense::LessEq => self.lo > self.rhs + tol,
            Sense::GreaterEq => self.hi < self.rhs - tol,
            Sense::Equal => self.lo > self.rhs + tol || self.hi < self.rhs - tol,
        }
    }
}

struct Search {
    /// +1 for maximization, -1 for minimization; `obj` is pre-multiplied.
    sign: f64,
    obj: Vec<f64>,
    /// Per variable: `(row, coefficient)` occurrences.
    occurs: Vec<Vec<(usize, f64)>>,
    rows: Vec<Row>,
    /// Members of each `Σ x = 1` row; a variable is listed in one group at most.
    groups: Vec<Vec<usize>>,
    ungrouped: Vec<usize>,
    /// Branching order over variables.
    order: Vec<usize>,
    fixed: Vec<Option<bool>>,
    assigned: Vec<bool>,
    value: Vec<bool>,
    obj_fixed: f64,
    best: Option<(f64, Vec<f64>)>,
    tol: f64,
    nodes: u64,
}

impl Search {
    fn new(model: &IlpModel, tol: f64) -> Self {
        let n = model.var_count();
        let (sign, terms) = match &model.objective {
            Some(objective) if objective.is_maximize() => (1.0, objective.terms()),
            Some(objective) => (-1.0, objective.terms()),
            None => (1.0, &[][..]),
        };
        let mut obj = vec![0.0; n];
        for (var, coef) in terms {
            obj[var.0] += sign * coef;
        }

        let mut occurs = vec![Vec::new(); n];
        let mut rows = Vec::with_capacity(model.constraint_count());
        let mut group_of: Vec<Option<usize>> = vec![None; n];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (ri, constraint) in model.constraints.iter().enumerate() {
            let mut lo = 0.0;
            let mut hi = 0.0;
            for &(var, coef) in &constraint.terms {
                occurs[var.0].push((ri, coef));
                lo += coef.min(0.0);
                hi += coef.max(0.0);
            }
            rows.push(Row {
                sense: constraint.sense,
                rhs: constraint.rhs,
                lo,
                hi,
            });

            let is_choice = constraint.sense == Sense::Equal
                && constraint.rhs == 1.0
                && !constraint.terms.is_empty()
                && constraint.terms.iter().all(|&(_, coef)| coef == 1.0);
            if is_choice {
                let members: Vec<usize> = constraint
                    .terms
                    .iter()
                    .map(|(var, _)| var.0)
                    .filter(|&v| group_of[v].is_none())
                    .collect();
                if !members.is_empty() {
                    for &v in &members {
                        group_of[v] = Some(groups.len());
                    }
                    groups.push(members);
                }
            }
        }

        let ungrouped: Vec<usize> = (0..n).filter(|&v| group_of[v].is_none()).collect();
        let mut order: Vec<usize> = Vec::with_capacity(n);
        for members in &groups {
            let mut members = members.clone();
            members.sort_by(|&a, &b| obj[b].total_cmp(&obj[a]));
            order.extend(members);
        }
        order.extend(ungrouped.iter().copied());

        Self {
            sign,
            obj,
            occurs,
            rows,
            groups,
            ungrouped,
            order,
            fixed: model.vars.iter().map(|v| v.fixed).collect(),
            assigned: vec![false; n],
            value: vec![false; n],
            obj_fixed: 0.0,
            best: None,
            tol,
            nodes: 0,
        }
    }

    fn run(&mut self, config: &SolverConfig, start_time: Instant) -> Option<Stop> {
        if self.rows.iter().any(|row| row.violated(self.tol)) {
            return None;
        }

        let n = self.order.len();
        let mut tried = vec![0u8; n];
        let mut depth = 0usize;
        let mut iterations = 0u64;

        loop {
            iterations += 1;
            if let Some(stop) = self.check_limits(config, start_time, iterations) {
                return Some(stop);
            }

            if depth == n {
                let improves = self
                    .best
                    .as_ref()
                    .map_or(true, |(best, _)| self.obj_fixed > best + self.tol);
                if improves {
                    let values = self.value.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
                    self.best = Some((self.obj_fixed, values));
                }
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                self.unassign(self.order[depth]);
                continue;
            }

            let var = self.order[depth];
            let (candidates, count) = self.candidates(var);
            let k = tried[depth] as usize;
            if k >= count {
                tried[depth] = 0;
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                self.unassign(self.order[depth]);
                continue;
            }
            tried[depth] += 1;
            self.nodes += 1;

            if self.assign(var, candidates[k]) && self.can_improve() {
                depth += 1;
            } else {
                self.unassign(var);
            }
        }
    }

    fn check_limits(&self, config: &SolverConfig, start_time: Instant, iterations: u64) -> Option<Stop> {
        if config.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return Some(Stop::NodeLimit);
        }
        if iterations % POLL_INTERVAL == 0 {
            if config.is_cancelled() {
                return Some(Stop::Cancelled);
            }
            if let Some(limit) = config.time_limit_ms {
                if start_time.elapsed().as_millis() as u64 >= limit {
                    return Some(Stop::TimeLimit);
                }
            }
        }
        None
    }

    /// Values to try for `var`, most promising first.
    fn candidates(&self, var: usize) -> ([bool; 2], usize) {
        match self.fixed[var] {
            Some(b) => ([b, b], 1),
            None if self.obj[var] > 0.0 => ([true, false], 2),
            None => ([false, true], 2),
        }
    }

    /// Upper bound on the objective of any completion of the current
    /// partial assignment.
    fn bound(&self) -> f64 {
        let free_gain = |v: usize| {
            if self.assigned[v] {
                0.0
            } else {
                self.obj[v].max(0.0)
            }
        };
        let grouped: f64 = self
            .groups
            .iter()
            .map(|members| {
                if members.iter().any(|&v| self.assigned[v] && self.value[v]) {
                    0.0
                } else {
                    members.iter().map(|&v| free_gain(v)).fold(0.0, f64::max)
                }
            })
            .sum();
        let ungrouped: f64 = self.ungrouped.iter().map(|&v| free_gain(v)).sum();
        self.obj_fixed + grouped + ungrouped
    }

    fn can_improve(&self) -> bool {
        match &self.best {
            Some((best, _)) => self.bound() > best + self.tol,
            None => true,
        }
    }

    /// Assigns `var` and updates row bounds; false if a row became violated.
    fn assign(&mut self, var: usize, b: bool) -> bool {
        let x = if b { 1.0 } else { 0.0 };
        self.assigned[var] = true;
        self.value[var] = b;
        self.obj_fixed += self.obj[var] * x;

        let mut ok = true;
        for &(ri, coef) in &self.occurs[var] {
            let row = &mut self.rows[ri];
            row.lo += coef * x - coef.min(0.0);
            row.hi += coef * x - coef.max(0.0);
            if row.violated(self.tol) {
                ok = false;
            }
        }
        ok
    }

    fn unassign(&mut self, var: usize) {
        let x = if self.value[var] { 1.0 } else { 0.0 };
        self.assigned[var] = false;
        self.value[var] = false;
        self.obj_fixed -= self.obj[var] * x;

        for &(ri, coef) in &self.occurs[var] {
            let row = &mut self.rows[ri];
            row.lo -= coef * x - coef.min(0.0);
            row.hi -= coef * x - coef.max(0.0);
        }
    }
}
