//! Task graph model.
//!
//! An immutable precedence DAG over work units, partitioned into
//! inseparable chains. Work units are dense indices `0..len()`.
//!
//! # Inseparable chains
//!
//! A chain is an ordered group of works that runs back-to-back as a single
//! scheduling block on one worker team. Every work belongs to exactly one
//! chain. Works not listed in any chain form singleton chains.
//!
//! Chain order is itself a precedence relation. The graph is acyclic when
//! the block graph (chains contracted to single nodes) is acyclic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::validation::{validate_graph, ValidationError, ValidationErrorKind};

/// Precedence DAG with inseparable-chain partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GraphInput", into = "GraphInput")]
pub struct TaskGraph {
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    /// Chains as given, followed by singletons for ungrouped works.
    chains: Vec<Vec<usize>>,
    chain_of: Vec<usize>,
    chain_position: Vec<usize>,
    /// Block graph: one entry per external parent edge, by chain.
    block_successors: Vec<Vec<usize>>,
    block_in_degree: Vec<usize>,
    topological_order: Vec<usize>,
}

/// Raw graph description as exchanged with the GA driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInput {
    /// `parents[w]`: direct predecessors of work `w`.
    pub parents: Vec<Vec<usize>>,
    /// Inseparable chains, each in execution order.
    #[serde(default)]
    pub inseparables: Vec<Vec<usize>>,
}

/// Chain partition of the works: chains, chain index per work, and
/// position of each work within its chain.
pub(crate) struct ChainPartition {
    pub chains: Vec<Vec<usize>>,
    pub chain_of: Vec<usize>,
    pub position: Vec<usize>,
}

impl ChainPartition {
    /// Builds the partition. Members must be in range and unique.
    pub fn new(works_count: usize, inseparables: &[Vec<usize>]) -> Self {
        let mut chains: Vec<Vec<usize>> = Vec::with_capacity(inseparables.len());
        let mut chain_of = vec![usize::MAX; works_count];
        let mut position = vec![0; works_count];

        for chain in inseparables.iter().filter(|c| !c.is_empty()) {
            let idx = chains.len();
            for (pos, &work) in chain.iter().enumerate() {
                chain_of[work] = idx;
                position[work] = pos;
            }
            chains.push(chain.clone());
        }
        for work in 0..works_count {
            if chain_of[work] == usize::MAX {
                chain_of[work] = chains.len();
                chains.push(vec![work]);
            }
        }

        Self {
            chains,
            chain_of,
            position,
        }
    }

    /// Edges of the contracted block graph (`from_chain → to_chain`), one per
    /// external parent edge.
    ///
    /// Returns `Err(work)` if `work` has a parent placed at or after it in its
    /// own chain.
    pub fn block_edges(
        &self,
        parents: &[Vec<usize>],
    ) -> std::result::Result<Vec<(usize, usize)>, usize> {
        let mut edges = Vec::new();
        for (chain_idx, chain) in self.chains.iter().enumerate() {
            for &work in chain {
                for &parent in &parents[work] {
                    if self.chain_of[parent] == chain_idx {
                        if self.position[parent] >= self.position[work] {
                            return Err(work);
                        }
                    } else {
                        edges.push((self.chain_of[parent], chain_idx));
                    }
                }
            }
        }
        Ok(edges)
    }
}

/// Kahn's algorithm over the block graph.
///
/// Returns the blocks in topological order (ties by smallest index). If the
/// result is shorter than `block_count`, the graph has a cycle.
pub(crate) fn block_topological_order(block_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut successors = vec![Vec::new(); block_count];
    let mut in_degree = vec![0usize; block_count];
    for &(from, to) in edges {
        successors[from].push(to);
        in_degree[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(b, _)| Reverse(b))
        .collect();
    let mut order = Vec::with_capacity(block_count);

    while let Some(Reverse(block)) = ready.pop() {
        order.push(block);
        for &next in &successors[block] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }
    order
}

impl TaskGraph {
    /// Builds a graph from parent lists and inseparable chains.
    ///
    /// # Errors
    /// [`Error::InvalidGraph`] with every problem found: dangling parent or
    /// chain references, duplicate chain membership, empty chains, cycles.
    pub fn new(parents: Vec<Vec<usize>>, inseparables: Vec<Vec<usize>>) -> Result<Self> {
        validate_graph(&parents, &inseparables).map_err(Error::InvalidGraph)?;

        let works_count = parents.len();
        let partition = ChainPartition::new(works_count, &inseparables);

        // Validation guarantees both of these succeed.
        let edges = partition.block_edges(&parents).unwrap_or_default();
        let block_order = block_topological_order(partition.chains.len(), &edges);

        let mut children = vec![Vec::new(); works_count];
        for (work, ps) in parents.iter().enumerate() {
            for &p in ps {
                children[p].push(work);
            }
        }

        let mut block_successors = vec![Vec::new(); partition.chains.len()];
        let mut block_in_degree = vec![0; partition.chains.len()];
        for &(from, to) in &edges {
            block_successors[from].push(to);
            block_in_degree[to] += 1;
        }

        let topological_order = block_order
            .iter()
            .flat_map(|&b| partition.chains[b].iter().copied())
            .collect();

        debug!(
            works = works_count,
            chains = partition.chains.len(),
            block_edges = edges.len(),
            "task graph built"
        );

        Ok(Self {
            parents,
            children,
            chains: partition.chains,
            chain_of: partition.chain_of,
            chain_position: partition.position,
            block_successors,
            block_in_degree,
            topological_order,
        })
    }

    /// Builds a graph and checks it against the expected work count.
    ///
    /// # Errors
    /// Same as [`TaskGraph::new`], plus a `WorksCountMismatch` error if
    /// `parents.len() != total_works_count`.
    pub fn with_works_count(
        total_works_count: usize,
        parents: Vec<Vec<usize>>,
        inseparables: Vec<Vec<usize>>,
    ) -> Result<Self> {
        if parents.len() != total_works_count {
            return Err(Error::InvalidGraph(vec![ValidationError::new(
                ValidationErrorKind::WorksCountMismatch,
                format!(
                    "expected {total_works_count} works, got {} parent lists",
                    parents.len()
                ),
            )]));
        }
        Self::new(parents, inseparables)
    }

    /// Number of work units.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the graph has no work units.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Direct predecessors of a work.
    pub fn parents(&self, work: usize) -> &[usize] {
        &self.parents[work]
    }

    /// Direct successors of a work.
    pub fn children(&self, work: usize) -> &[usize] {
        &self.children[work]
    }

    /// Index of the chain containing a work.
    pub fn chain_of(&self, work: usize) -> usize {
        self.chain_of[work]
    }

    /// Members of a chain, in execution order.
    pub fn chain(&self, chain: usize) -> &[usize] {
        &self.chains[chain]
    }

    /// Position of a work within its chain (0 for the head).
    pub fn chain_position(&self, work: usize) -> usize {
        self.chain_position[work]
    }

    /// First member of the chain containing a work.
    pub fn chain_head(&self, work: usize) -> usize {
        self.chains[self.chain_of[work]][0]
    }

    /// Whether a work is the first member of its chain.
    pub fn is_chain_head(&self, work: usize) -> bool {
        self.chain_position[work] == 0
    }

    /// Number of chains, singletons included.
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// All chains, singletons included.
    pub fn chains(&self) -> &[Vec<usize>] {
        &self.chains
    }

    /// Successor chains of a chain, one entry per external parent edge.
    pub fn block_successors(&self, chain: usize) -> &[usize] {
        &self.block_successors[chain]
    }

    /// Number of external parent edges entering a chain.
    pub fn block_in_degree(&self, chain: usize) -> usize {
        self.block_in_degree[chain]
    }

    /// A topological order of all works. Chain members are adjacent and in
    /// chain order.
    pub fn topological_order(&self) -> &[usize] {
        &self.topological_order
    }
}

impl TryFrom<GraphInput> for TaskGraph {
    type Error = Error;

    fn try_from(input: GraphInput) -> Result<Self> {
        Self::new(input.parents, input.inseparables)
    }
}

impl From<TaskGraph> for GraphInput {
    fn from(graph: TaskGraph) -> Self {
        let inseparables = graph
            .chains
            .into_iter()
            .filter(|c| c.len() > 1)
            .collect();
        Self {
            parents: graph.parents,
            inseparables,
        }
    }
}
