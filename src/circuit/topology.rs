//! Feed-forward topology over a fixed number of gate slots

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Gate `parent` also depends on the outputs of gates `left` and `right`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedLink {
    pub parent: usize,
    pub left: usize,
    pub right: usize,
}

impl FeedLink {
    pub fn new(parent: usize, left: usize, right: usize) -> Self {
        Self {
            parent,
            left,
            right,
        }
    }

    pub fn children(&self) -> [usize; 2] {
        [self.left, self.right]
    }
}

/// Validated set of feed links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    gate_count: usize,
    links: Vec<FeedLink>,
    /// Index into `links` for every gate that is a parent
    parent_link: Vec<Option<usize>>,
}

impl Topology {
    /// Build a topology, rejecting links that do not describe a feed-forward
    /// structure over `gate_count` gates
    pub fn new(gate_count: usize, links: Vec<FeedLink>) -> Result<Self, ModelError> {
        if gate_count == 0 {
            return Err(ModelError::NoGates);
        }

        let mut parent_link = vec![None; gate_count];
        for (index, link) in links.iter().enumerate() {
            for gate in [link.parent, link.left, link.right] {
                if gate >= gate_count {
                    return Err(ModelError::GateOutOfRange {
                        link: index,
                        gate,
                        gate_count,
                    });
                }
            }
            if link.parent == link.left || link.parent == link.right || link.left == link.right {
                return Err(ModelError::DegenerateLink { link: index });
            }
            if parent_link[link.parent].is_some() {
                return Err(ModelError::DuplicateParent { gate: link.parent });
            }
            parent_link[link.parent] = Some(index);
        }

        let topology = Self {
            gate_count,
            links,
            parent_link,
        };
        topology.check_acyclic()?;
        Ok(topology)
    }

    pub fn gate_count(&self) -> usize {
        self.gate_count
    }

    pub fn links(&self) -> &[FeedLink] {
        &self.links
    }

    /// The link whose parent is `gate`, if any
    pub fn link_for(&self, gate: usize) -> Option<&FeedLink> {
        self.parent_link
            .get(gate)
            .copied()
            .flatten()
            .map(|index| &self.links[index])
    }

    /// A leaf depends only on the external signals
    pub fn is_leaf(&self, gate: usize) -> bool {
        self.link_for(gate).is_none()
    }

    pub fn leaves(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.gate_count).filter(move |&gate| self.is_leaf(gate))
    }

    /// Gates ordered so that every child precedes its parent
    pub fn evaluation_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.gate_count);
        let mut visited = vec![false; self.gate_count];
        for gate in 0..self.gate_count {
            self.post_order(gate, &mut visited, &mut order);
        }
        order
    }

    fn post_order(&self, gate: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        if visited[gate] {
            return;
        }
        visited[gate] = true;
        if let Some(link) = self.link_for(gate) {
            for child in link.children() {
                self.post_order(child, visited, order);
            }
        }
        order.push(gate);
    }

    fn check_acyclic(&self) -> Result<(), ModelError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unseen,
            Active,
            Done,
        }

        fn visit(topology: &Topology, gate: usize, marks: &mut [Mark]) -> Result<(), ModelError> {
            match marks[gate] {
                Mark::Done => return Ok(()),
                Mark::Active => return Err(ModelError::Cycle { gate }),
                Mark::Unseen => {}
            }
            marks[gate] = Mark::Active;
            if let Some(link) = topology.link_for(gate) {
                for child in link.children() {
                    visit(topology, child, marks)?;
                }
            }
            marks[gate] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unseen; self.gate_count];
        for gate in 0..self.gate_count {
            visit(self, gate, &mut marks)?;
        }
        Ok(())
    }
}
