use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use kg2vec::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kg2vec")]
#[command(about = "Knowledge graph walk extraction and entity embeddings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the walks extracted for each entity, one tab-separated walk per line
    Walks {
        #[arg(short, long)]
        triples: PathBuf,
        #[arg(short, long)]
        entities: PathBuf,
        #[arg(short, long, default_value_t = 2)]
        depth: usize,
        /// Walks sampled per entity; all walks are enumerated when omitted
        #[arg(short, long)]
        walks: Option<usize>,
        #[arg(long)]
        walklets: bool,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short, long, default_value_t = num_cpus::get())]
        jobs: usize,
    },
    /// Fit a transformer and save it
    Fit {
        #[arg(short, long)]
        triples: PathBuf,
        #[arg(short, long)]
        entities: PathBuf,
        /// JSON transformer configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the embedding of each entity with a saved transformer
    Transform {
        #[arg(short, long)]
        model: PathBuf,
        #[arg(short, long)]
        entities: PathBuf,
    },
}

/// Read `subject predicate object` triples, one per line.
fn read_graph(path: &Path) -> anyhow::Result<KnowledgeGraph> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read triples from {}", path.display()))?;

    let mut graph = KnowledgeGraph::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            bail!(
                "{}:{}: expected 3 fields, found {}",
                path.display(),
                line_no + 1,
                parts.len()
            );
        }
        graph.add_triple(parts[0], parts[1], parts[2]);
    }

    log::info!(
        "Loaded {} triples from {}",
        graph.len(),
        path.display()
    );
    Ok(graph)
}

fn read_entities(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read entities from {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Walks { triples, entities, depth, walks, walklets, seed, jobs } => {
            let graph = read_graph(&triples)?;
            let entities = read_entities(&entities)?;

            let mut random = RandomWalker::new(depth, walks).with_n_jobs(jobs);
            if let Some(seed) = seed {
                random = random.with_seed(seed);
            }
            let mut walker: WalkerKind = if walklets {
                WalkletWalker::from(random).into()
            } else {
                random.into()
            };

            let corpus = walker.extract(&graph, &entities)?;
            for walk in corpus.sentences() {
                println!("{}", walk.join("\t"));
            }
        }
        Commands::Fit { triples, entities, config, output } => {
            let graph = read_graph(&triples)?;
            let entities = read_entities(&entities)?;
            let config = match config {
                Some(path) => TransformerConfig::from_json_file(&path)
                    .with_context(|| format!("invalid configuration {}", path.display()))?,
                None => TransformerConfig::default(),
            };

            let mut transformer = Rdf2VecTransformer::from_config(config);
            transformer.fit(&graph, &entities)?;
            transformer.save(&output)?;
            println!(
                "Fitted {} entities ({} walks), saved to {}",
                entities.len(),
                transformer.walks().len(),
                output.display()
            );
        }
        Commands::Transform { model, entities } => {
            let transformer = Rdf2VecTransformer::<Word2Vec>::load(&model)
                .with_context(|| format!("failed to load {}", model.display()))?;
            let entities = read_entities(&entities)?;

            let embeddings = transformer.transform(&entities)?;
            for (entity, embedding) in entities.iter().zip(embeddings) {
                let values: Vec<String> = embedding.iter().map(|v| format!("{v:.6}")).collect();
                println!("{}\t{}", entity, values.join(" "));
            }
        }
    }

    Ok(())
}
