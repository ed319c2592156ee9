use clap::Parser;
use std::collections::HashMap;
use std::process;

use difftree::formatter::{create_formatter, Formatter, HtmlFormatter, OutputFormat};
use difftree::{
    load_all_ignore_specs, load_json_file, load_json_input, logging, parse_options, DiffRequest,
    DiffTreeError,
};
use tracing::debug;

mod cli;

fn main() {
    let args = cli::Args::parse();
    logging::init(args.log_format, args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}

/// Returns whether the diff succeeded
fn run(args: &cli::Args) -> Result<bool, Box<dyn std::error::Error>> {
    args.validate()?;

    let mut request = match (&args.request, &args.old, &args.new) {
        (Some(path), _, _) => DiffRequest::from_json(&load_json_file(path)?)?,
        (None, Some(old), Some(new)) => {
            let old_json = load_json_input(old)
                .map_err(|e| format!("Failed to load {}: {}", old, e))?;
            let new_json = load_json_input(new)
                .map_err(|e| format!("Failed to load {}: {}", new, e))?;
            DiffRequest::new(&old_json, &new_json)
        }
        _ => {
            return Err(Box::new(DiffTreeError::InvalidArgs {
                message: "OLD and NEW inputs are required unless --request is given".to_string(),
            }))
        }
    };

    request = request
        .with_ignore_fields(&args.ignore)
        .with_ignore_spec(load_all_ignore_specs(&args.ignore_json)?);

    let file_options = match &args.options {
        Some(path) => match load_json_file(path)? {
            serde_json::Value::Object(options) => parse_options(&options)?,
            _ => {
                return Err(Box::new(DiffTreeError::InvalidArgs {
                    message: format!("{} must contain a JSON object", path.display()),
                }))
            }
        },
        None => Default::default(),
    };
    let options = args
        .flag_options()
        .or(file_options)
        .or(request.options.clone());
    request = request.with_options(options);
    debug!(options = ?request.options, ignore = ?request.ignore, "request prepared");

    request.validate()?;
    let mut engine = request.engine()?;
    let result = engine.generate_diff_tree(&request.old_data, &request.new_data);

    let formatter: Box<dyn Formatter> = match (args.format, &args.labels) {
        (OutputFormat::Html, Some(path)) => {
            let labels: HashMap<String, String> = serde_json::from_value(load_json_file(path)?)?;
            Box::new(HtmlFormatter::with_labels(labels))
        }
        (format, _) => create_formatter(format, !args.compact),
    };
    println!("{}", formatter.format(&result)?);

    if args.report {
        let report = engine.collector().detailed_report();
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(result.success)
}
