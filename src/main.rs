use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::{error::ReadlineError, Editor};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use ontorule::notation::render_rule;
use ontorule::rdf::rules_to_triples;
use ontorule::{parse_document, Document, Reasoner, ReasonerConfig};

#[derive(Debug, StructOpt)]
#[structopt(name = "ontorule", about = "Runs SWRL rules over an ontology document")]
struct Opt {
    /// Document with prefixes, declarations, facts and rules
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Upper bound on saturation passes
    #[structopt(long, default_value = "64")]
    max_iterations: usize,

    /// Read further rules from a prompt after saturating
    #[structopt(short, long)]
    interactive: bool,

    /// Print the document's rules as N-Triples and exit
    #[structopt(long)]
    emit_rdf: bool,

    /// Raise the log level (-v debug, -vv trace); RUST_LOG takes precedence
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ontorule={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_input(document: &Document, code: &str) -> Result<String> {
    let rule = document.parse_rule(code)?;
    let table = rule.evaluate_antecedent(&document.ontology)?;
    let mut output = table.to_string();
    for atom in rule.consequent() {
        for inference in atom.evaluate_consequent(&table) {
            output.push_str(&format!("{}\t[{}]\n", inference.axiom, inference.provenance));
        }
    }
    Ok(output)
}

fn repl(document: &Document) -> Result<()> {
    let mut editor = Editor::<()>::new();
    loop {
        let readline = editor.readline("> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str());
                match handle_input(document, &line) {
                    Ok(output) => print!("{}", output),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    init_logging(opt.verbose);

    let code = std::fs::read_to_string(&opt.input)
        .with_context(|| format!("failed to read {}", opt.input.display()))?;
    let mut document = parse_document(&code)
        .with_context(|| format!("failed to parse {}", opt.input.display()))?;

    if opt.emit_rdf {
        for triple in rules_to_triples(&document.rules) {
            println!("{}", triple);
        }
        return Ok(());
    }

    for rule in &document.rules {
        let unbound = rule.unbound_variables();
        if !unbound.is_empty() {
            tracing::warn!(
                "rule {} never binds {:?}; atoms using them infer nothing",
                render_rule(rule),
                unbound
            );
        }
    }

    let config = ReasonerConfig {
        max_iterations: opt.max_iterations,
    };
    let reasoner = Reasoner::new(document.rules.clone(), config);
    let saturation = reasoner
        .saturate(&mut document.ontology)
        .context("rule evaluation failed")?;
    for (axiom, provenance) in document.ontology.inferred() {
        println!("{}\t[{}]", axiom, provenance);
    }
    if !saturation.fixpoint {
        eprintln!(
            "stopped after {} iterations before reaching a fixpoint",
            saturation.iterations
        );
    }

    if opt.interactive {
        repl(&document)?;
    }
    Ok(())
}
