//! claptrap CLI
//!
//! Builds word-transition models from text files and prints phrases
//! generated from them.

mod length;
mod tokenize;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use claptrap_core::io::{MODEL_EXTENSION, build_output_path, read_text};
use claptrap_core::{DEFAULT_THRESHOLD, MarkovModel, PhraseGenerator, TransitionSource, WeightedDigraph};

use length::LengthRange;
use tokenize::tokenize;

#[derive(Parser)]
#[command(name = "claptrap")]
#[command(version)]
#[command(about = "Statistically plausible nonsense from word transitions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a model from a plain text corpus
    Build {
        /// Input text file
        corpus: PathBuf,

        /// Output model file (default: corpus path with a .claptrap extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of most frequent tokens to keep
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: usize,

        /// Drop this many leading tokens (front matter)
        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Write the model without xz compression
        #[arg(long)]
        no_compress: bool,

        /// Keep every token and every adjacent pair (ignores --threshold)
        #[arg(long)]
        digraph: bool,
    },

    /// Print phrases generated from a model
    Phrase {
        /// Model file
        model: PathBuf,

        /// Length or length range (delimit min-max)
        #[arg(short, long, default_value = "10-100")]
        length: LengthRange,

        /// Number of phrases to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        output_count: usize,

        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show model statistics
    Inspect {
        /// Model file
        model: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build { corpus, output, threshold, skip, no_compress, digraph } => {
            let text = read_text(&corpus)?;
            let tokens: Vec<String> = tokenize(&text).into_iter().skip(skip).collect();
            info!("{} tokens read from {}", tokens.len(), corpus.display());

            let model = if digraph {
                WeightedDigraph::from_corpus(&tokens).to_model()?
            } else {
                MarkovModel::from_corpus(&tokens, threshold)?
            };
            let output = match output {
                Some(path) => path,
                None => build_output_path(&corpus, MODEL_EXTENSION)?,
            };
            model.to_file(&output, !no_compress)?;
            println!("{}", output.display());
        }

        Commands::Phrase { model, length, output_count, seed } => {
            let model = MarkovModel::from_file(&model)?;
            let mut generator = match seed {
                Some(seed) => PhraseGenerator::seeded(model, seed),
                None => PhraseGenerator::from_entropy(model),
            };

            for _ in 0..output_count {
                let phrase_length = length.pick(generator.rng_mut());
                println!("{}", generator.phrase(phrase_length)?);
            }
        }

        Commands::Inspect { model } => {
            let model = MarkovModel::from_file(&model)?;
            let sparse = model.sparse();
            println!("tokens:      {}", model.node_count());
            println!("rows:        {}", sparse.row_count());
            println!("transitions: {}", sparse.entry_count());

            let mut busiest: Vec<(usize, usize)> = sparse.iter().map(|(row, entries)| (row, entries.len())).collect();
            busiest.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            for (row, fan_out) in busiest.into_iter().take(10) {
                println!("{:>6} {}", fan_out, model.token(row));
            }
        }
    }

    Ok(())
}
