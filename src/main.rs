mod abbreviations;
mod cli;
mod collision;
mod error;
mod json_output;
mod metadata;
mod renamer;
mod resolver;
mod sanitizer;
mod scanner;
mod settings;
mod tags;

use abbreviations::Abbreviations;
use anyhow::{Result, anyhow};
use clap::Parser;
use cli::Args;
use colored::*;
use log::info;
use metadata::SidecarProvider;
use renamer::{RenameResult, Renamer, Summary};
use settings::Settings;
use std::path::{Path, PathBuf};
use tags::Tag;

fn main() -> Result<()> {
    let args = Args::parse();

    let settings_path = args.settings_path();
    let mut settings = Settings::load(&settings_path)?;
    args.apply(&mut settings);

    let level = if args.verbose {
        "debug"
    } else if settings.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
    info!("Starting pdf renamer with args: {:?}", args);

    if args.list_tags {
        println!("{}", "Valid tags:".bold());
        println!("{}", Tag::help_table());
        return Ok(());
    }

    if let Some(ref source) = args.add_abbreviation_file {
        let user_file = settings.user_abbreviations_path();
        let count = abbreviations::add_abbreviations(source, &user_file)?;
        println!(
            "{} Added {} journal abbreviation(s) to {}",
            "✓".green().bold(),
            count.to_string().cyan(),
            user_file.display()
        );
        return Ok(());
    }

    // Validate before touching any file
    let config = settings.to_config()?;

    if args.set_default {
        settings.save(&settings_path)?;
        if !args.json {
            println!(
                "{} Default settings stored in {}",
                "✓".green().bold(),
                settings_path.display()
            );
        }
    }

    let Some(target) = args.path.clone() else {
        if args.set_default {
            return Ok(());
        }
        return Err(anyhow!(
            "the following argument is required: PATH (see 'pdf-renamer --help')"
        ));
    };

    let abbreviations = Abbreviations::load(Some(&settings.user_abbreviations_path()))?;
    let provider = SidecarProvider;
    let results = Renamer::new(&config, &abbreviations, &provider)
        .dry_run(args.dry_run)
        .rename_target(&target)?;

    let root = report_root(&target);
    if args.json {
        let operations = json_output::OperationsOutput::from_results(&results, &root, args.dry_run);
        println!("{}", operations.to_json()?);
    } else {
        print_summary(&results, &root, args.dry_run);
    }

    Ok(())
}

fn report_root(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.to_path_buf()
    } else {
        target.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

fn prettify_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

fn print_summary(results: &[RenameResult], root: &Path, dry_run: bool) {
    if dry_run {
        println!("\n{}", "═══ DRY RUN MODE ═══".bold().bright_blue());
    }

    for result in results.iter().filter(|r| r.is_renamed()) {
        if let Some(ref new_path) = result.path_new {
            println!(
                "{} {} {} {}",
                "RENAME:".green().bold(),
                prettify_path(&result.path_original, root).bright_white(),
                "→".bright_blue().bold(),
                prettify_path(new_path, root).bright_cyan()
            );
        }
    }

    let summary = Summary::from_results(results);
    if summary.renamed == 0 {
        println!("\n{}", "No file has been renamed.".yellow());
    } else {
        let verb = if dry_run { "would be renamed" } else { "renamed" };
        println!(
            "\n{} {} file(s) {}",
            "📝".bright_white(),
            summary.renamed.to_string().bright_cyan().bold(),
            verb
        );
    }
    if summary.unchanged > 0 {
        println!(
            "{} {} file(s) already had the right name",
            "ℹ️".bright_blue(),
            summary.unchanged.to_string().bright_cyan()
        );
    }

    let failed: Vec<&RenameResult> = results
        .iter()
        .filter(|r| r.has_failed() || (r.has_identifier() && r.path_new.is_none()))
        .collect();
    if !failed.is_empty() {
        println!("\n{}", "⚠️  Could not rename:".red().bold());
        for result in failed {
            println!(
                "  {} {}",
                prettify_path(&result.path_original, root).bright_black(),
                result.error.as_deref().unwrap_or_default().red()
            );
        }
    }

    let missing: Vec<&RenameResult> = results
        .iter()
        .filter(|r| !r.has_identifier() && !r.has_failed())
        .collect();
    if !missing.is_empty() {
        println!(
            "\n{}",
            "No identifier or metadata was found for the following pdf files:".yellow().bold()
        );
        for result in missing {
            println!(
                "  {} {}",
                "-".bright_yellow(),
                prettify_path(&result.path_original, root).bright_white()
            );
        }
        println!(
            "{}",
            "Add a '<file>.pdf.json' metadata file next to each of them and run pdf-renamer again."
                .bright_black()
        );
    }
}
