mod cli;

use std::error::Error;
use clap::Parser;
use colored::Colorize;
use itertools::Itertools;
use rand::SeedableRng;
use rand::rngs::StdRng;

use kd_design::persist::candidate_name;
use kd_design::persist::save_candidates;
use kd_design::persist::save_rnacomposer_inputs;
use kd_design::generate_candidates;
use kd_design::mfe_statistics;
use kd_design::plan_motifs;
use kd_design::Candidate;
use kd_design::ConflictPolicy;
use kd_design::gc_content;
use kd_design::FoldingOracle;
use kd_design::Topology;

use cli::Cli;
use cli::Command;
use cli::CatalogArgs;
use cli::DesignArgs;
use cli::FoldArgs;
use cli::LoopsArgs;

fn print_candidates(scaffold: &str, candidates: &[Candidate]) {
    for (i, c) in candidates.iter().enumerate() {
        let name = candidate_name(scaffold, i + 1);
        let dist = if c.bp_distance == 0 {
            c.bp_distance.to_string().green()
        } else {
            c.bp_distance.to_string().yellow()
        };
        println!("{}", name.bold());
        println!("  {}", c.sequence);
        println!("  {}  target", c.target_structure);
        println!("  {}  predicted", c.predicted_structure);
        println!("  mfe {:>8.2}  bp distance {}  GC {:.1}%", c.mfe, dist, 100.0 * c.gc_content());
    }
    if let Some(stats) = mfe_statistics(candidates) {
        println!(
            "{} candidates, MFE {:.2} to {:.2} (mean {:.2})",
            stats.count, stats.min_mfe, stats.max_mfe, stats.mean_mfe
        );
    } else {
        println!("{}", "No candidates.".red());
    }
}

fn design(args: DesignArgs) -> Result<(), Box<dyn Error>> {
    let catalog = args.catalog.load()?;
    let config = args.design_config()?;
    let oracle = args.oracle.build();

    let candidates = generate_candidates(&catalog, &args.scaffold, &config, &oracle)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    } else {
        print_candidates(&args.scaffold, &candidates);
    }

    if let Some(dir) = &args.output_dir {
        let paths = save_candidates(dir, &args.scaffold, &candidates)?;
        let composer = dir.join(format!("{}_rnacomposer.txt", args.scaffold));
        save_rnacomposer_inputs(&composer, &args.scaffold, &candidates)?;
        log::info!("Wrote {} records to {}.", paths.len(), dir.display());
    }
    Ok(())
}

fn loops(args: LoopsArgs) -> Result<(), Box<dyn Error>> {
    let catalog = args.catalog.load()?;
    let (structure, topology) = match catalog.get(&args.target) {
        Some(s) => (s.structure.clone(), s.topology),
        None => (args.target.clone(), Topology::Tetraloops),
    };
    let policy = if args.strict { ConflictPolicy::Reject } else { ConflictPolicy::Overwrite };
    let mut rng = StdRng::seed_from_u64(args.seed);
    let plan = plan_motifs(&structure, topology, policy, &mut rng)?;

    println!("{}  structure", plan.structure);
    println!("{}  constraints", plan.constraints);
    for (idx, hl) in plan.loops.iter().enumerate() {
        println!("loop {:>2} {:<10} len {:>2}  {}", idx, hl.to_string(), hl.len(), plan.motifs[idx]);
    }
    for (start, end, label) in plan.annotation.segments() {
        println!("{:>4}..{:<4} {}", start, end, label.cyan());
    }
    let pairs = plan.motifs.kissing_pairs();
    if !pairs.is_empty() {
        println!("kissing pairs: {}", pairs.iter().map(|(a, b)| format!("{a}-{b}")).join(", "));
    }
    Ok(())
}

fn scaffolds(args: CatalogArgs) -> Result<(), Box<dyn Error>> {
    let catalog = args.load()?;
    for scaffold in catalog.iter() {
        println!("{} {:<16} {}", format!("{:<24}", scaffold.name).bold(), format!("{:?}", scaffold.topology), scaffold.structure);
    }
    Ok(())
}

fn fold(args: FoldArgs) -> Result<(), Box<dyn Error>> {
    let sequence = args.read_sequence()?;
    let oracle = args.oracle.build();
    log::info!("Folding {} nt at {} C.", sequence.len(), args.oracle.temperature);
    let (structure, mfe) = oracle.fold(&sequence)?;
    let n_pairs = structure.chars().filter(|&c| c == '(').count();

    println!("{sequence}");
    println!("{} ({:.2})", structure.bold(), mfe);
    println!("length {}  base pairs {}  GC {:.1}%", sequence.len(), n_pairs, 100.0 * gc_content(&sequence));
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    cli::init_verbose(&cli);
    log::info!("Running {}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Design(args) => design(args)?,
        Command::Loops(args) => loops(args)?,
        Command::Scaffolds(args) => scaffolds(args)?,
        Command::Fold(args) => fold(args)?,
    }
    Ok(())
}
