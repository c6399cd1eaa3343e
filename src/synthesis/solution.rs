//! Solution records produced by the enumeration

use crate::circuit::GateWiring;
use crate::config::ROOT_GATE;
use crate::sat::{SolveStatus, VariableManager};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Decision values of one gate slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateAssignment {
    pub used: bool,
    pub selector1: bool,
    pub selector2: bool,
    pub row_outputs: Vec<bool>,
}

impl GateAssignment {
    pub fn wiring(&self) -> GateWiring {
        GateWiring {
            used: self.used,
            selector1: self.selector1,
            selector2: self.selector2,
        }
    }
}

/// Snapshot of one solve: every gate's decision values plus the status and
/// objective the solver reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// 1-based position in the enumeration
    pub index: usize,
    pub status: SolveStatus,
    /// Number of gates in use
    pub objective_value: usize,
    pub gates: Vec<GateAssignment>,
}

impl Solution {
    /// Read gate values out of a solver assignment; unassigned variables
    /// are taken as false
    pub fn decode(
        index: usize,
        status: SolveStatus,
        objective_value: usize,
        assignment: &HashMap<i32, bool>,
        variables: &VariableManager,
    ) -> Self {
        let value = |var: i32| assignment.get(&var).copied().unwrap_or(false);
        let gates = variables
            .gates()
            .iter()
            .map(|vars| GateAssignment {
                used: value(vars.used),
                selector1: value(vars.selector1),
                selector2: value(vars.selector2),
                row_outputs: vars.row_outputs.iter().map(|&var| value(var)).collect(),
            })
            .collect();

        Self {
            index,
            status,
            objective_value,
            gates,
        }
    }

    /// Inverse of `decode` over the gate variables
    pub fn to_assignment(&self, variables: &VariableManager) -> HashMap<i32, bool> {
        let mut assignment = HashMap::new();
        for (gate, vars) in self.gates.iter().zip(variables.gates()) {
            assignment.insert(vars.used, gate.used);
            assignment.insert(vars.selector1, gate.selector1);
            assignment.insert(vars.selector2, gate.selector2);
            for (&var, &bit) in vars.row_outputs.iter().zip(&gate.row_outputs) {
                assignment.insert(var, bit);
            }
        }
        assignment
    }

    pub fn used_vector(&self) -> Vec<bool> {
        self.gates.iter().map(|g| g.used).collect()
    }

    /// Indices of the gates in use
    pub fn used_gates(&self) -> Vec<usize> {
        self.gates
            .iter()
            .enumerate()
            .filter(|(_, g)| g.used)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn wiring(&self) -> Vec<GateWiring> {
        self.gates.iter().map(GateAssignment::wiring).collect()
    }

    /// Output vector of the root gate
    pub fn root_outputs(&self) -> Option<&[bool]> {
        self.gates.get(ROOT_GATE).map(|g| g.row_outputs.as_slice())
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Serializable summary of a full enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationSummary {
    pub total: usize,
    pub minimum_gates: Option<usize>,
    pub complete: bool,
    pub error: Option<String>,
    pub solutions: Vec<Solution>,
}

impl EnumerationSummary {
    /// Save to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_assignment(vm: &VariableManager) -> HashMap<i32, bool> {
        let mut assignment = HashMap::new();
        assignment.insert(vm.used(0).unwrap(), true);
        assignment.insert(vm.row_output(0, 1).unwrap(), true);
        assignment.insert(vm.used(2).unwrap(), true);
        assignment.insert(vm.gate(2).unwrap().selector2, true);
        assignment
    }

    #[test]
    fn test_decode() {
        let vm = VariableManager::new(3, 2);
        let solution = Solution::decode(1, SolveStatus::Optimal, 2, &sample_assignment(&vm), &vm);

        assert_eq!(solution.used_vector(), vec![true, false, true]);
        assert_eq!(solution.used_gates(), vec![0, 2]);
        assert_eq!(solution.root_outputs(), Some(&[false, true][..]));
        assert!(solution.gates[2].selector2);
        assert!(!solution.gates[2].selector1);
    }

    #[test]
    fn test_assignment_covers_every_gate_variable() {
        let vm = VariableManager::new(3, 2);
        let solution = Solution::decode(1, SolveStatus::Optimal, 2, &sample_assignment(&vm), &vm);
        let assignment = solution.to_assignment(&vm);

        assert_eq!(assignment.len(), vm.variable_count());
        assert_eq!(assignment.get(&vm.used(1).unwrap()), Some(&false));
        assert_eq!(
            Solution::decode(1, SolveStatus::Optimal, 2, &assignment, &vm),
            solution
        );
    }

    #[test]
    fn test_json() {
        let vm = VariableManager::new(2, 4);
        let solution = Solution::decode(3, SolveStatus::Feasible, 1, &HashMap::new(), &vm);
        let json = solution.to_json().unwrap();
        assert!(json.contains("\"status\": \"feasible\""));
        assert_eq!(Solution::from_json(&json).unwrap(), solution);
    }
}
