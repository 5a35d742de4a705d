use std::process::exit;

use clap::{Parser, Subcommand};
use spsm::{
    SPSMTreeMatcher, WeightingChoice,
    expr::{find_by_name, parse_candidate_triple, parse_tree},
    mapping_matrix::{MappingElement, new_mapping},
};

/// Demo driver for the structure-preserving semantic matching filter.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CliArgs {
    /// Verbosity
    #[clap(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Filter a candidate mapping between two function-expression trees.
    Match {
        /// The source tree, e.g. `f(a,b)`.
        #[clap(long)]
        source: String,
        /// The target tree, e.g. `f(a,b,c)`.
        #[clap(long)]
        target: String,
        /// Candidate relations as `name=name:REL` triples, e.g. `a=b:EQ`.
        #[clap(long = "candidate", value_name = "SOURCE=TARGET:REL")]
        candidates: Vec<String>,
        /// Score the source as a query against a possibly larger target.
        #[clap(long)]
        asymmetric: bool,
    },
}

fn main() {
    let args = CliArgs::parse();

    stderrlog::new().module(module_path!()).verbosity(if args.verbose { 3 } else { 2 }).init().unwrap();

    match real_main(args) {
        Ok(()) => {}
        Err(message) => {
            eprintln!("spsm: {message}");
            exit(1);
        }
    }
}

fn real_main(args: CliArgs) -> Result<(), String> {
    let CliCommand::Match { source, target, candidates, asymmetric } = args.command;

    let source_tree = parse_tree(&source).map_err(|e| e.to_string())?;
    let target_tree = parse_tree(&target).map_err(|e| e.to_string())?;

    let mut candidate = new_mapping(&source_tree, &target_tree);
    for triple in &candidates {
        let (source_name, target_name, relation) = parse_candidate_triple(triple).map_err(|e| e.to_string())?;
        let source_node = find_by_name(&source_tree, &source_name).ok_or_else(|| format!("no such source node: {source_name}"))?;
        let target_node = find_by_name(&target_tree, &target_name).ok_or_else(|| format!("no such target node: {target_name}"))?;
        candidate.add(MappingElement { source: source_node, target: target_node, relation });
    }

    let matcher = SPSMTreeMatcher {
        weighting: if asymmetric { WeightingChoice::Asymmetric } else { WeightingChoice::Symmetric },
        ..Default::default()
    };
    let result = matcher.process(&source_tree, &target_tree, &mut candidate).map_err(|e| e.to_string())?;

    for element in result.mapping.iter() {
        println!(
            "{} -> {} : {:?}",
            result.reordered_source.name(element.source),
            result.reordered_target.name(element.target),
            element.relation
        );
    }
    println!("similarity: {:.3}", result.mapping.get_similarity());

    Ok(())
}
