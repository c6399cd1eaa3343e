//! Gate semantics of the synthesized network
//!
//! A used gate outputs 1 on a row unless one of its live sources (a selected
//! external signal, or the output of a child gate) is 1 on that row, so
//! every gate behaves as a NOR over its sources. Unused gates output 0.

use super::{Channel, Row, Topology};

/// Structural choices for one gate slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateWiring {
    pub used: bool,
    pub selector1: bool,
    pub selector2: bool,
}

impl GateWiring {
    pub fn selects(&self, channel: Channel) -> bool {
        match channel {
            Channel::One => self.selector1,
            Channel::Two => self.selector2,
        }
    }
}

/// Compute every gate's output on every row, indexed `[gate][row]`
pub fn simulate(wiring: &[GateWiring], rows: &[Row], topology: &Topology) -> Vec<Vec<bool>> {
    let mut outputs = vec![vec![false; rows.len()]; wiring.len()];

    for gate in topology.evaluation_order() {
        let Some(gate_wiring) = wiring.get(gate) else {
            continue;
        };
        if !gate_wiring.used {
            continue;
        }

        for (row_index, row) in rows.iter().enumerate() {
            let external = Channel::ALL
                .iter()
                .any(|&channel| gate_wiring.selects(channel) && row.signal(channel));
            let from_children = topology.link_for(gate).map_or(false, |link| {
                link.children()
                    .iter()
                    .any(|&child| outputs.get(child).map_or(false, |o| o[row_index]))
            });
            outputs[gate][row_index] = !(external || from_children);
        }
    }

    outputs
}

/// Human readable expression for one gate, e.g. `g1 = NOR(a, g3)`
pub fn describe_gate(gate: usize, wiring: &[GateWiring], topology: &Topology) -> String {
    let Some(gate_wiring) = wiring.get(gate) else {
        return format!("g{} = ?", gate + 1);
    };
    if !gate_wiring.used {
        return format!("g{} = unused", gate + 1);
    }

    let mut sources: Vec<String> = Channel::ALL
        .iter()
        .filter(|&&channel| gate_wiring.selects(channel))
        .map(|channel| channel.name().to_string())
        .collect();
    if let Some(link) = topology.link_for(gate) {
        for child in link.children() {
            if wiring.get(child).map_or(false, |w| w.used) {
                sources.push(format!("g{}", child + 1));
            }
        }
    }

    if sources.is_empty() {
        format!("g{} = 1", gate + 1)
    } else {
        format!("g{} = NOR({})", gate + 1, sources.join(", "))
    }
}
