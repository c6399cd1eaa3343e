//! Variable management for the gate network encoding

use crate::circuit::Channel;
use crate::error::ModelError;
use std::collections::HashMap;

/// Types of variables used in the encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// Gate is instantiated in the network
    Used { gate: usize },
    /// Gate consumes an external input channel
    Selector { gate: usize, channel: Channel },
    /// Gate's output bit on a truth table row
    RowOutput { gate: usize, row: usize },
}

/// Variable ids belonging to one gate slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateVariables {
    pub used: i32,
    pub selector1: i32,
    pub selector2: i32,
    pub row_outputs: Vec<i32>,
}

impl GateVariables {
    pub fn selector(&self, channel: Channel) -> i32 {
        match channel {
            Channel::One => self.selector1,
            Channel::Two => self.selector2,
        }
    }
}

/// Allocates every gate variable up front and maps ids back to their meaning
#[derive(Debug)]
pub struct VariableManager {
    gates: Vec<GateVariables>,
    reverse_map: HashMap<i32, VariableType>,
    /// Next available variable ID
    next_id: i32,
    row_count: usize,
}

impl VariableManager {
    /// Create variables for `gate_count` gates over `row_count` rows
    pub fn new(gate_count: usize, row_count: usize) -> Self {
        let mut manager = Self {
            gates: Vec::with_capacity(gate_count),
            reverse_map: HashMap::new(),
            next_id: 1, // SAT variables start from 1
            row_count,
        };

        for gate in 0..gate_count {
            let used = manager.allocate(VariableType::Used { gate });
            let selector1 = manager.allocate(VariableType::Selector {
                gate,
                channel: Channel::One,
            });
            let selector2 = manager.allocate(VariableType::Selector {
                gate,
                channel: Channel::Two,
            });
            let row_outputs = (0..row_count)
                .map(|row| manager.allocate(VariableType::RowOutput { gate, row }))
                .collect();
            manager.gates.push(GateVariables {
                used,
                selector1,
                selector2,
                row_outputs,
            });
        }

        manager
    }

    fn allocate(&mut self, var_type: VariableType) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        self.reverse_map.insert(id, var_type);
        id
    }

    /// Variables of a single gate
    pub fn gate(&self, gate: usize) -> Result<&GateVariables, ModelError> {
        self.gates.get(gate).ok_or(ModelError::UnknownGate {
            gate,
            gate_count: self.gates.len(),
        })
    }

    pub fn gates(&self) -> &[GateVariables] {
        &self.gates
    }

    pub fn used(&self, gate: usize) -> Result<i32, ModelError> {
        Ok(self.gate(gate)?.used)
    }

    pub fn selector(&self, gate: usize, channel: Channel) -> Result<i32, ModelError> {
        Ok(self.gate(gate)?.selector(channel))
    }

    pub fn row_output(&self, gate: usize, row: usize) -> Result<i32, ModelError> {
        self.gate(gate)?
            .row_outputs
            .get(row)
            .copied()
            .ok_or(ModelError::UnknownRow {
                row,
                row_count: self.row_count,
            })
    }

    /// All `used` variables in gate order
    pub fn used_variables(&self) -> Vec<i32> {
        self.gates.iter().map(|g| g.used).collect()
    }

    /// What a variable id stands for
    pub fn describe(&self, var: i32) -> Option<VariableType> {
        self.reverse_map.get(&var).copied()
    }

    /// Short printable name, e.g. `s3`, `t1[2]`, `x2[0]` (gates 1-based)
    pub fn name(&self, var: i32) -> String {
        match self.describe(var) {
            Some(VariableType::Used { gate }) => format!("s{}", gate + 1),
            Some(VariableType::Selector { gate, channel }) => {
                let index = match channel {
                    Channel::One => 1,
                    Channel::Two => 2,
                };
                format!("t{}[{}]", index, gate + 1)
            }
            Some(VariableType::RowOutput { gate, row }) => format!("x{}[{}]", gate + 1, row),
            None => format!("v{}", var),
        }
    }

    /// Get the total number of variables created
    pub fn variable_count(&self) -> usize {
        (self.next_id - 1) as usize
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        let mut stats = VariableStatistics {
            total_variables: self.variable_count(),
            ..Default::default()
        };

        for var_type in self.reverse_map.values() {
            match var_type {
                VariableType::Used { .. } => stats.used_variables += 1,
                VariableType::Selector { .. } => stats.selector_variables += 1,
                VariableType::RowOutput { .. } => stats.row_output_variables += 1,
            }
        }

        stats
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone, Default)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub used_variables: usize,
    pub selector_variables: usize,
    pub row_output_variables: usize,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Gate usage variables: {}", self.used_variables)?;
        writeln!(f, "  Selector variables: {}", self.selector_variables)?;
        writeln!(f, "  Row output variables: {}", self.row_output_variables)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_layout() {
        let vm = VariableManager::new(2, 4);

        // used, selector1, selector2, then one output per row
        assert_eq!(vm.used(0).unwrap(), 1);
        assert_eq!(vm.selector(0, Channel::Two).unwrap(), 3);
        assert_eq!(vm.row_output(0, 3).unwrap(), 7);
        assert_eq!(vm.used(1).unwrap(), 8);
        assert_eq!(vm.variable_count(), 14);
    }

    #[test]
    fn test_variable_bounds() {
        let vm = VariableManager::new(2, 2);

        assert!(vm.used(1).is_ok());
        assert!(vm.row_output(1, 1).is_ok());

        assert_eq!(
            vm.used(2).unwrap_err(),
            ModelError::UnknownGate { gate: 2, gate_count: 2 }
        );
        assert_eq!(
            vm.row_output(0, 2).unwrap_err(),
            ModelError::UnknownRow { row: 2, row_count: 2 }
        );
    }

    #[test]
    fn test_reverse_lookup() {
        let vm = VariableManager::new(3, 4);
        let var = vm.row_output(2, 1).unwrap();

        assert_eq!(vm.describe(var), Some(VariableType::RowOutput { gate: 2, row: 1 }));
        assert_eq!(vm.name(var), "x3[1]");
        assert_eq!(vm.name(vm.used(0).unwrap()), "s1");
        assert_eq!(vm.describe(1000), None);
    }

    #[test]
    fn test_all_variables_unique() {
        let vm = VariableManager::new(7, 4);
        let mut all: Vec<i32> = vm
            .gates()
            .iter()
            .flat_map(|g| {
                let mut vars = vec![g.used, g.selector1, g.selector2];
                vars.extend(&g.row_outputs);
                vars
            })
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
        assert_eq!(total, vm.variable_count());
    }

    #[test]
    fn test_statistics() {
        let vm = VariableManager::new(7, 4);
        let stats = vm.statistics();
        assert_eq!(stats.total_variables, 49);
        assert_eq!(stats.used_variables, 7);
        assert_eq!(stats.selector_variables, 14);
        assert_eq!(stats.row_output_variables, 28);
    }
}
