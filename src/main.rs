use concurrent_lang::{
    codegen, diagnostics,
    language::parser::parse_source,
    runtime::Interpreter,
    sem,
    tools::dump,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: concurrent-lang [run|check|build] <filename.cl> [options]");
        process::exit(1);
    }

    let command = &args[1];
    let filename = &args[2];

    if !filename.ends_with(".cl") {
        eprintln!("Invalid file extension. Only .cl files are allowed.");
        process::exit(1);
    }

    let source = match fs::read_to_string(filename) {
        Ok(source) => source,
        Err(err) => {
            diagnostics::report_io_error(Path::new(filename), &err);
            process::exit(1);
        }
    };

    let program = match parse_source(&source) {
        Ok(program) => program,
        Err(errors) => {
            diagnostics::emit_syntax_errors(filename, &source, &errors.errors);
            process::exit(1);
        }
    };

    match command.as_str() {
        "run" => {
            let mut ast_json_path: Option<PathBuf> = None;
            let mut state_json_path: Option<PathBuf> = None;
            let mut rest = args[3..].iter();
            while let Some(arg) = rest.next() {
                match arg.as_str() {
                    "--ast-json" => ast_json_path = rest.next().map(PathBuf::from),
                    "--state-json" => state_json_path = rest.next().map(PathBuf::from),
                    other => {
                        eprintln!("Unknown option `{other}` for run");
                        process::exit(1);
                    }
                }
            }

            let table = sem::analyze(&program);
            tracing::debug!(symbols = ?table.top_level_names(), "program analyzed");

            if let Some(path) = &ast_json_path {
                write_json(path, &dump::ast_json(&program));
            }

            let interpreter = Interpreter::new();
            if let Err(err) = interpreter.run(&program) {
                diagnostics::report_runtime_error(&err);
                process::exit(1);
            }

            if let Some(path) = &state_json_path {
                let snapshot = interpreter.globals().snapshot();
                write_json(path, &dump::state_json(&snapshot));
            }
        }
        "check" => {
            let deadlocks = sem::deadlock::check(&program);
            let races = sem::race::unprotected_writes(&program);
            diagnostics::emit_deadlock_warnings(&deadlocks);
            diagnostics::emit_race_warnings(filename, &source, &races);
            if !deadlocks.is_empty() || !races.is_empty() {
                process::exit(1);
            }
        }
        "build" => {
            let out_dir = args
                .get(3)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("build"));
            if let Err(err) = fs::create_dir_all(&out_dir) {
                diagnostics::report_io_error(&out_dir, &err);
                process::exit(1);
            }
            let out_file = out_dir.join("module.ll");
            let ir = codegen::llvm::emit_module(&program);
            if let Err(err) = fs::write(&out_file, ir) {
                diagnostics::report_io_error(&out_file, &err);
                process::exit(1);
            }
            println!("LLVM IR written to {}", out_file.display());
        }
        _ => {
            eprintln!("Invalid command. Usage: concurrent-lang [run|check|build] <filename.cl>");
            process::exit(1);
        }
    }
}

fn write_json(path: &Path, value: &serde_json::Value) {
    let text = match serde_json::to_string_pretty(value) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("Failed to serialize JSON: {err}");
            process::exit(1);
        }
    };
    if let Err(err) = fs::write(path, text) {
        diagnostics::report_io_error(path, &err);
        process::exit(1);
    }
}
