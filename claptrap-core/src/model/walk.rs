use std::sync::Arc;

use log::trace;
use rand::Rng;

/// Read-only view of a token transition graph.
///
/// Nodes are dense integer IDs in `0..node_count()`. Both the
/// (vocabulary, sparse matrix) model and the weighted digraph expose it,
/// so a [`Walker`] can run over either.
pub trait TransitionSource {
	/// Number of nodes in the graph.
	fn node_count(&self) -> usize;

	/// Token carried by a node.
	///
	/// # Panics
	/// May panic if `node >= node_count()`.
	fn token(&self, node: usize) -> &str;

	/// Outgoing `(target, weight)` pairs of a node; weights are positive.
	fn neighbors(&self, node: usize) -> &[(usize, u64)];
}

impl<T: TransitionSource + ?Sized> TransitionSource for &T {
	fn node_count(&self) -> usize {
		(**self).node_count()
	}

	fn token(&self, node: usize) -> &str {
		(**self).token(node)
	}

	fn neighbors(&self, node: usize) -> &[(usize, u64)] {
		(**self).neighbors(node)
	}
}

impl<T: TransitionSource + ?Sized> TransitionSource for Arc<T> {
	fn node_count(&self) -> usize {
		(**self).node_count()
	}

	fn token(&self, node: usize) -> &str {
		(**self).token(node)
	}

	fn neighbors(&self, node: usize) -> &[(usize, u64)] {
		(**self).neighbors(node)
	}
}

/// State of one weighted random walk: the current node, if any.
///
/// The walker never holds the graph or the random source, so any number of
/// walkers can share one model and the caller decides where randomness
/// comes from.
#[derive(Clone, Debug, Default)]
pub struct Walker {
	current: Option<usize>,
}

impl Walker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Node produced by the last step.
	pub fn current(&self) -> Option<usize> {
		self.current
	}

	/// Moves the walk to `node` without following an edge.
	pub fn jump(&mut self, node: usize) {
		self.current = Some(node);
	}

	/// Advances the walk by one node and returns it.
	///
	/// - The first step picks a node uniformly among all nodes.
	/// - A node without outgoing edges is followed by a uniform pick among
	///   all nodes.
	/// - Otherwise the next node is a neighbour chosen with probability
	///   proportional to its edge weight.
	///
	/// Returns `None` only when the source has no nodes.
	pub fn step<S, R>(&mut self, source: &S, rng: &mut R) -> Option<usize>
	where
		S: TransitionSource + ?Sized,
		R: Rng,
	{
		let node_count = source.node_count();
		if node_count == 0 {
			return None;
		}

		let next = match self.current {
			Some(node) => match weighted_choice(source.neighbors(node), rng) {
				Some(next) => next,
				None => {
					trace!("node {node} has no outgoing edges, resetting walk");
					rng.random_range(0..node_count)
				}
			},
			None => rng.random_range(0..node_count),
		};

		self.current = Some(next);
		Some(next)
	}

	/// Advances the walk and returns the token of the new node.
	pub fn next_token<'s, S, R>(&mut self, source: &'s S, rng: &mut R) -> Option<&'s str>
	where
		S: TransitionSource + ?Sized,
		R: Rng,
	{
		let node = self.step(source, rng)?;
		Some(source.token(node))
	}

	/// Lazy, unbounded token stream driven by this walker.
	///
	/// The stream only ends for a source with no nodes; consumers bound it
	/// themselves (for instance with `take`).
	pub fn tokens<'a, S, R>(&'a mut self, source: &'a S, rng: &'a mut R) -> Tokens<'a, S, R>
	where
		S: TransitionSource + ?Sized,
		R: Rng,
	{
		Tokens { walker: self, source, rng }
	}
}

/// Iterator returned by [`Walker::tokens`].
pub struct Tokens<'a, S: ?Sized, R> {
	walker: &'a mut Walker,
	source: &'a S,
	rng: &'a mut R,
}

impl<'a, S, R> Iterator for Tokens<'a, S, R>
where
	S: TransitionSource + ?Sized,
	R: Rng,
{
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.walker.next_token(self.source, &mut *self.rng)
	}
}

/// Picks a target with probability proportional to its weight.
///
/// Draws `r` in `0..total` and walks the cumulative weights until `r` falls
/// inside a bucket. Returns `None` when there are no edges or every weight
/// is zero.
pub fn weighted_choice<R: Rng>(edges: &[(usize, u64)], rng: &mut R) -> Option<usize> {
	let total: u64 = edges.iter().map(|(_, weight)| weight).sum();
	if total == 0 {
		return None;
	}

	let mut r = rng.random_range(0..total);
	for &(target, weight) in edges {
		if r < weight {
			return Some(target);
		}
		r -= weight;
	}

	// Unreachable: r < total
	edges.last().map(|(target, _)| *target)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	/// Tiny adjacency-list graph for walker tests.
	struct Graph {
		tokens: Vec<String>,
		edges: Vec<Vec<(usize, u64)>>,
	}

	impl Graph {
		fn new(edges: Vec<Vec<(usize, u64)>>) -> Self {
			let tokens = (0..edges.len()).map(|i| format!("t{i}")).collect();
			Self { tokens, edges }
		}
	}

	impl TransitionSource for Graph {
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

	#[test]
	fn follows_the_only_edge() {
		let graph = Graph::new(vec![vec![(1, 5)], vec![(2, 1)], vec![(0, 3)]]);
		let mut rng = StdRng::seed_from_u64(7);
		let mut walker = Walker::new();

		let start = walker.step(&graph, &mut rng).unwrap();
		let path: Vec<usize> = (0..6).map(|_| walker.step(&graph, &mut rng).unwrap()).collect();
		let expected: Vec<usize> = (1..=6).map(|k| (start + k) % 3).collect();
		assert_eq!(path, expected);
	}

	#[test]
	fn weights_bias_the_choice() {
		let edges = [(0, 1), (1, 99)];
		let mut rng = StdRng::seed_from_u64(1);
		let heavy = (0..10_000)
			.filter(|_| weighted_choice(&edges, &mut rng) == Some(1))
			.count();
		assert!(heavy > 9_700, "heavy edge chosen {heavy} times");
	}

	#[test]
	fn weighted_choice_without_weight_is_none() {
		let mut rng = StdRng::seed_from_u64(1);
		assert_eq!(weighted_choice(&[], &mut rng), None);
		assert_eq!(weighted_choice(&[(3, 0)], &mut rng), None);
	}

	#[test]
	fn dead_end_resets_over_all_nodes() {
		// Node 0 is a dead end; every other node leads back to it
		let graph = Graph::new(vec![vec![], vec![(0, 1)], vec![(0, 1)], vec![(0, 1)]]);
		let mut rng = StdRng::seed_from_u64(42);
		let mut walker = Walker::new();

		let mut after_dead_end = [0usize; 4];
		let mut previous = walker.step(&graph, &mut rng).unwrap();
		for _ in 0..4_000 {
			let next = walker.step(&graph, &mut rng).unwrap();
			if previous == 0 {
				after_dead_end[next] += 1;
			}
			previous = next;
		}
		assert!(after_dead_end.iter().all(|&count| count > 0), "{after_dead_end:?}");
	}

	#[test]
	fn jump_continues_from_the_new_node() {
		let graph = Graph::new(vec![vec![(1, 1)], vec![(0, 1)], vec![(2, 1)]]);
		let mut rng = StdRng::seed_from_u64(3);
		let mut walker = Walker::new();
		walker.jump(2);
		assert_eq!(walker.current(), Some(2));
		assert_eq!(walker.next_token(&graph, &mut rng), Some("t2"));
	}

	#[test]
	fn empty_source_ends_the_stream() {
		let graph = Graph::new(vec![]);
		let mut rng = StdRng::seed_from_u64(0);
		let mut walker = Walker::new();
		assert_eq!(walker.tokens(&graph, &mut rng).next(), None);
	}

	#[test]
	fn identical_seeds_give_identical_streams() {
		let graph = Graph::new(vec![vec![(1, 2), (2, 1)], vec![(0, 1), (2, 4)], vec![]]);
		let run = |seed| {
			let mut rng = StdRng::seed_from_u64(seed);
			let mut walker = Walker::new();
			walker.tokens(&graph, &mut rng).take(50).map(str::to_owned).collect::<Vec<_>>()
		};
		assert_eq!(run(9), run(9));
	}
}
