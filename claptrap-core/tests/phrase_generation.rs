use std::collections::HashSet;
use std::env;
use std::fs;

use claptrap_core::{MarkovModel, PhraseGenerator, PhraseLength, WeightedDigraph};

const TEXT: &str = "the puck slid across the ice . the crowd roared ! did he score ? \
	no , the goalie made the save . the coach shouted at the bench ; the players \
	skated harder . overtime began at last : the crowd stood , and the puck dropped .";

fn corpus() -> Vec<&'static str> {
	TEXT.split_whitespace().collect()
}

#[test]
fn phrases_from_dumped_model() {
	let path = env::temp_dir().join(format!("claptrap-phrasegen-{}.claptrap", std::process::id()));
	MarkovModel::from_corpus(&corpus(), 1000).unwrap().to_file(&path, true).unwrap();

	let model = MarkovModel::from_file(&path).unwrap();
	fs::remove_file(&path).unwrap();

	let mut generator = PhraseGenerator::seeded(model, 2024);
	assert_eq!(generator.phrase(PhraseLength::Exact(100)).unwrap().chars().count(), 100);
	assert_eq!(generator.phrase(PhraseLength::Exact(10)).unwrap().chars().count(), 10);
	for _ in 0..20 {
		let length = generator.phrase(PhraseLength::range(30, 40)).unwrap().chars().count();
		assert!((30..=40).contains(&length));
	}
}

#[test]
fn digraph_and_model_generators_agree_on_contract() {
	let graph = WeightedDigraph::from_corpus(&corpus());
	let mut generator = PhraseGenerator::seeded(graph, 5);
	for phrase in generator.phrases(PhraseLength::range(60, 100), 20).unwrap() {
		let length = phrase.chars().count();
		assert!((60..=100).contains(&length), "{phrase:?}");
		assert!(phrase.chars().next().unwrap().is_uppercase(), "{phrase:?}");
	}
}

#[test]
fn digraph_model_through_a_file() {
	let path = env::temp_dir().join(format!("claptrap-digraph-{}.claptrap", std::process::id()));
	WeightedDigraph::from_corpus(&corpus()).to_model().unwrap().to_file(&path, true).unwrap();

	let model = MarkovModel::from_file(&path).unwrap();
	fs::remove_file(&path).unwrap();

	let distinct: HashSet<&str> = corpus().into_iter().collect();
	assert_eq!(model.vocabulary().len(), distinct.len());
	assert_eq!(WeightedDigraph::from(&model).edge_weight("the", "puck"), Some(2));

	let mut generator = PhraseGenerator::seeded(model, 31);
	for phrase in generator.phrases(PhraseLength::range(40, 60), 10).unwrap() {
		assert!((40..=60).contains(&phrase.chars().count()), "{phrase:?}");
	}
}

#[test]
fn reloaded_model_reproduces_phrases() {
	let model = MarkovModel::from_corpus(&corpus(), 1000).unwrap();
	let reloaded = MarkovModel::from_bytes(&model.to_bytes(false).unwrap()).unwrap();

	let mut original = PhraseGenerator::seeded(&model, 77);
	let mut restored = PhraseGenerator::seeded(&reloaded, 77);
	assert_eq!(
		original.phrases(PhraseLength::range(20, 50), 5).unwrap(),
		restored.phrases(PhraseLength::range(20, 50), 5).unwrap()
	);
}

#[test]
fn missing_model_file_is_a_resource_error() {
	let result = MarkovModel::from_file("/no/such/dir/model.claptrap");
	assert!(matches!(result, Err(claptrap_core::ClaptrapError::Resource(_))));
}
