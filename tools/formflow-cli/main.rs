use clap::{Parser, Subcommand};
use formflow::compiler::DiagramExport;
use formflow::prelude::*;
use formflow::validation::has_errors;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Form schema validation and workflow graph compilation
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Validate a module document and print its issues
    Validate {
        /// Path to the module JSON file
        module_path: String,
    },
    /// Compile a workflow's drawn layout into module order and rules
    Compile {
        /// Path to the workflow JSON file (or a diagram export with --diagram)
        workflow_path: String,
        /// Treat the input as a `{ nodes, edges }` diagram export
        #[arg(short, long)]
        diagram: bool,
    },
    /// Apply a JSON command script to a module through the editor
    Replay {
        /// Path to the module JSON file
        module_path: String,
        /// Path to a JSON array of commands
        commands_path: String,
        /// Optional path to an editor configuration JSON file
        #[arg(short, long)]
        config: Option<String>,
    },
    /// List the built-in field types
    Types,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        CliCommand::Validate { module_path } => run_validate(&module_path),
        CliCommand::Compile {
            workflow_path,
            diagram,
        } => run_compile(&workflow_path, diagram),
        CliCommand::Replay {
            module_path,
            commands_path,
            config,
        } => run_replay(&module_path, &commands_path, config.as_deref()),
        CliCommand::Types => run_types(),
    }
}

fn run_validate(module_path: &str) {
    let module = Module::from_json(&read_file(module_path))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse module: {}", e)));

    let registry = StandardFieldTypes::new();
    let issues = ValidationEngine::new(&registry).validate(&module);

    println!(
        "Module '{}' ({} fields): {} issue(s)",
        module.id,
        module.fields.len(),
        issues.len()
    );
    print_issues(&issues);

    if has_errors(&issues) {
        std::process::exit(2);
    }
}

fn run_compile(workflow_path: &str, diagram: bool) {
    let text = read_file(workflow_path);
    let workflow = if diagram {
        let export: DiagramExport = serde_json::from_str(&text)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse diagram: {}", e)));
        let layout = export
            .into_layout()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert diagram: {}", e)));
        let id = Path::new(workflow_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("workflow");
        Workflow::new(id).with_layout(layout)
    } else {
        Workflow::from_json(&text)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workflow: {}", e)))
    };

    let compile_start = Instant::now();
    let compiled = GraphCompiler::default().compile(&workflow);
    let compile_duration = compile_start.elapsed();

    eprintln!(
        "Compiled {} module(s) and {} rule(s) in {:?}",
        compiled.workflow.module_ids.len(),
        compiled.workflow.workflow_rules.len(),
        compile_duration
    );
    for rule in &compiled.workflow.workflow_rules {
        eprintln!(
            "  {} [{:?} {}] when {}",
            rule.id,
            rule.action,
            rule.target(),
            rule.condition
        );
    }
    for diagnostic in &compiled.diagnostics {
        eprintln!("  warning: {}", diagnostic);
    }

    let json = compiled
        .workflow
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode workflow: {}", e)));
    println!("{}", json);
}

fn run_replay(module_path: &str, commands_path: &str, config_path: Option<&str>) {
    let config = match config_path {
        Some(path) => EditorConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config '{}': {}", path, e))),
        None => EditorConfig::default(),
    };
    let module = Module::from_json(&read_file(module_path))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse module: {}", e)));
    let commands: Vec<Command> = serde_json::from_str(&read_file(commands_path))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse commands: {}", e)));

    let mut editor = EditorStateController::builder(module)
        .with_config(config)
        .build();

    let mut rejected = 0;
    for (i, command) in commands.into_iter().enumerate() {
        let kind = command.kind();
        if let Err(e) = editor.apply(command) {
            rejected += 1;
            eprintln!("  #{} {:?} rejected: {}", i + 1, kind, e);
        }
    }
    eprintln!("Replay finished, {} command(s) rejected", rejected);
    print_issues(editor.issues());

    let json = editor
        .module()
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode module: {}", e)));
    println!("{}", json);
}

fn run_types() {
    let registry = StandardFieldTypes::new();
    let mut names: Vec<&str> = registry.type_names().collect();
    names.sort_unstable();
    for name in names {
        if let Some(contract) = registry.contract(name) {
            println!("{:<14} {:?}  {}", name, contract.value_kind, contract.display_name);
        }
    }
}

fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        eprintln!("  {}", issue);
    }
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read file '{}': {}", path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
