//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the interrupt handler, validates
//! paths, runs the sorter and prints the summary.

use anyhow::{Result, anyhow};
use std::env;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use media_sort::cli::Args;
use media_sort::config::{CONFIG_ENV, locate_config, validate_and_normalize};
use media_sort::output as out;
use media_sort::{
    Config, ExifReader, RunSummary, default_config_path, load_config_from_xml_path, pipeline,
    shutdown,
};

use crate::logging::init_tracing;

fn print_config_location(args: &Args) {
    if let Some(p) = &args.config {
        out::print_info(&format!("Using --config:\n  {}", p.display()));
        return;
    }
    if let Ok(p) = env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {p}"));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or pass --config."));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default media_sort config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file exists there; defaults and CLI flags apply.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut cfg = match locate_config(args.config.as_deref())? {
        Some(path) => load_config_from_xml_path(&path)?,
        None => Config::default(),
    };
    args.apply_overrides(&mut cfg);
    Ok(cfg)
}

fn report(summary: &RunSummary, dry_run: bool) {
    if dry_run {
        out::print_info("Dry-run: no files were changed.");
    }
    out::print_count("Processed images and videos", summary.processed);
    out::print_count("Renamed", summary.renamed);
    out::print_count("Already in place", summary.in_place);
    out::print_count("Duplicates removed", summary.duplicates);
    out::print_count("Deferred", summary.deferred);
    out::print_count("Pruned", summary.pruned);
    out::print_count("Skipped (unrecognized)", summary.skipped);
    out::print_count("Failed", summary.failed);
    out::print_count("Interrupted", summary.interrupted);

    if !summary.unresolved.is_empty() {
        out::print_warn("Unresolved collisions:");
        for (target, sources) in &summary.unresolved {
            for src in sources {
                out::print_user(&format!("  {} <- {}", target.display(), src.display()));
            }
        }
    }
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    if args.print_config {
        print_config_location(&args);
        return Ok(());
    }

    let mut cfg = load_config(&args)?;

    let guard_opt = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    // Dropping the guard on Ctrl-C flushes the file appender.
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; finishing files in flight...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })?;
    }

    debug!("Starting media_sort: {:?}", args);

    let result = (|| -> Result<RunSummary> {
        validate_and_normalize(&mut cfg)?;
        pipeline::run(&cfg, &ExifReader)
    })();

    let outcome = match result {
        Ok(summary) => {
            report(&summary, cfg.dry_run);
            if summary.has_failures() {
                error!(
                    failed = summary.failed,
                    exhausted = summary.exhausted,
                    "some files could not be sorted"
                );
                Err(anyhow!(
                    "{} file(s) failed, {} exhausted their collision names",
                    summary.failed,
                    summary.exhausted
                ))
            } else if summary.interrupted > 0 {
                Err(anyhow!("interrupted; {} file(s) were not started", summary.interrupted))
            } else {
                Ok(())
            }
        }
        Err(e) => {
            match e.downcast_ref::<media_sort::SortError>() {
                Some(se) => error!(code = se.code(), "{se}"),
                None => error!(error = %format!("{e:#}"), "run aborted before sorting"),
            }
            Err(e)
        }
    };

    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    outcome
}
