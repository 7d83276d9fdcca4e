use std::collections::HashMap;

use log::info;

use super::markov_model::MarkovModel;
use super::sparse::SparseMatrix;
use super::vocabulary::Vocabulary;
use super::walk::TransitionSource;
use crate::error::Result;

/// Weighted directed graph of token transitions.
///
/// Nodes live in an arena and are addressed by the ID assigned when they
/// are first inserted. Each node keeps its outgoing `(target, weight)`
/// edges; weights count observed transitions and are always positive.
/// Self-loops are allowed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightedDigraph {
	tokens: Vec<String>,
	ids: HashMap<String, usize>,
	edges: Vec<Vec<(usize, u64)>>,
}

impl WeightedDigraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a graph with one edge per adjacent pair of `corpus`.
	///
	/// Unlike [`MarkovModel::from_corpus`] every token becomes a node;
	/// there is no vocabulary filtering.
	pub fn from_corpus<S: AsRef<str>>(corpus: &[S]) -> Self {
		let mut graph = Self::new();
		let mut previous: Option<usize> = None;
		for token in corpus {
			let current = graph.add_node(token.as_ref());
			if let Some(from) = previous {
				graph.add_edge(from, current, 1);
			}
			previous = Some(current);
		}
		info!("built digraph with {} nodes and {} edges", graph.node_count(), graph.edge_count());
		graph
	}

	/// Returns the ID of `token`, inserting it if needed.
	pub fn add_node(&mut self, token: &str) -> usize {
		if let Some(&id) = self.ids.get(token) {
			return id;
		}
		let id = self.tokens.len();
		self.tokens.push(token.to_owned());
		self.ids.insert(token.to_owned(), id);
		self.edges.push(Vec::new());
		id
	}

	/// Records `count` more transitions from `from` to `to`.
	pub fn add_transition(&mut self, from: &str, to: &str, count: u64) {
		let from = self.add_node(from);
		let to = self.add_node(to);
		self.add_edge(from, to, count);
	}

	fn add_edge(&mut self, from: usize, to: usize, count: u64) {
		if count == 0 {
			return;
		}
		let edges = &mut self.edges[from];
		match edges.iter_mut().find(|(target, _)| *target == to) {
			Some((_, weight)) => *weight += count,
			None => edges.push((to, count)),
		}
	}

	pub fn node_id(&self, token: &str) -> Option<usize> {
		self.ids.get(token).copied()
	}

	/// Weight of the edge between two tokens, if present.
	pub fn edge_weight(&self, from: &str, to: &str) -> Option<u64> {
		let (from, to) = (self.node_id(from)?, self.node_id(to)?);
		self.edges[from]
			.iter()
			.find(|(target, _)| *target == to)
			.map(|(_, weight)| *weight)
	}

	pub fn edge_count(&self) -> usize {
		self.edges.iter().map(Vec::len).sum()
	}

	/// Converts into the (vocabulary, sparse matrix) form, node IDs becoming
	/// vocabulary indices, so the graph can go through the codec.
	pub fn to_model(&self) -> Result<MarkovModel> {
		let vocabulary = Vocabulary::new(self.tokens.iter().cloned())?;
		let mut sparse = SparseMatrix::new();
		for (row, edges) in self.edges.iter().enumerate() {
			sparse.insert_row(row, edges.clone())?;
		}
		MarkovModel::new(vocabulary, sparse)
	}
}

impl From<&MarkovModel> for WeightedDigraph {
	fn from(model: &MarkovModel) -> Self {
		let mut graph = Self::new();
		for token in model.vocabulary().iter() {
			graph.add_node(token);
		}
		for (row, entries) in model.sparse().iter() {
			graph.edges[row] = entries.to_vec();
		}
		graph
	}
}

impl TransitionSource for WeightedDigraph {
	fn node_count(&self) -> usize {
		self.tokens.len()
	}

	fn token(&self, node: usize) -> &str {
		&self.tokens[node]
	}

	fn neighbors(&self, node: usize) -> &[(usize, u64)] {
		&self.edges[node]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_every_adjacent_pair() {
		let graph = WeightedDigraph::from_corpus(&["a", "b", "a", "b", "b", "c"]);
		assert_eq!(graph.node_count(), 3);
		assert_eq!(graph.edge_weight("a", "b"), Some(2));
		assert_eq!(graph.edge_weight("b", "a"), Some(1));
		assert_eq!(graph.edge_weight("b", "b"), Some(1));
		assert_eq!(graph.edge_weight("b", "c"), Some(1));
		assert_eq!(graph.edge_weight("c", "a"), None);
		assert_eq!(graph.edge_count(), 4);
	}

	#[test]
	fn ids_follow_insertion_order() {
		let mut graph = WeightedDigraph::new();
		graph.add_transition("x", "y", 3);
		graph.add_transition("x", "y", 2);
		graph.add_transition("z", "x", 0);
		assert_eq!(graph.node_id("x"), Some(0));
		assert_eq!(graph.node_id("z"), Some(2));
		assert_eq!(graph.neighbors(0), [(1, 5)]);
		assert!(graph.neighbors(2).is_empty());
	}

	#[test]
	fn converts_to_and_from_model() {
		let graph = WeightedDigraph::from_corpus(&["the", "cat", "sat", "on", "the", "mat"]);
		let model = graph.to_model().unwrap();
		assert_eq!(model.vocabulary().words(), ["the", "cat", "sat", "on", "mat"]);
		assert_eq!(model.sparse().row(0), [(1, 1), (4, 1)]);
		assert_eq!(WeightedDigraph::from(&model), graph);
	}
}
