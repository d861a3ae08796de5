use std::{io::Read, path::Path, sync::Arc};

use clap::Parser;
use stddict::{
    DataDir,
    DictionaryConfig,
    DictionaryService,
    EntryStore,
    Error,
    Result,
    cli::{Cli, Command, ConfigAction, ImportArgs, NamesArgs},
    config,
    defaults,
    merge::ImportSummary,
    naming,
    search,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("STDDICT_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let defaults_dir = cli
        .defaults_dir
        .clone()
        .unwrap_or_else(|| data_dir.defaults_dir());
    let service = open_service(&data_dir, &defaults_dir)?;

    match cli.command {
        Command::Search(args) => {
            let results = search::execute_search(&args.params(), &service)?;
            if args.json {
                println!("{}", search::format_json(&results, &args.query)?);
            } else {
                print!("{}", search::format_human(&results));
            }
        }
        Command::Import(args) => {
            cmd_import(service, &args)?;
        }
        Command::Reset => {
            service.reset()?;
            println!(
                "Reset to {} default entries.",
                service.defaults().len()
            );
        }
        Command::Status(args) => {
            cmd_status(&service, &data_dir, &defaults_dir, args.json)?;
        }
        Command::Names(args) => {
            cmd_names(&service, &args)?;
        }
        Command::Config { action } => {
            cmd_config(&service, action)?;
        }
        Command::Completions(_) => {}
    }

    Ok(())
}

fn open_service(
    data_dir: &DataDir,
    defaults_dir: &Path,
) -> Result<DictionaryService> {
    let defaults = defaults::load_default_entries(defaults_dir)?;
    let store = EntryStore::open(&data_dir.store_db())?;
    DictionaryService::open(store, defaults)
}

fn read_batch(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut json = String::new();
        std::io::stdin().read_to_string(&mut json)?;
        Ok(json)
    } else {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound {
                kind: "import file",
                name: path.display().to_string(),
            },
            _ => Error::Io(e),
        })
    }
}

fn cmd_import(service: DictionaryService, args: &ImportArgs) -> Result<()> {
    let json = read_batch(&args.path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;
    let service = Arc::new(service);
    let summary = runtime
        .block_on(Arc::clone(&service).import_json_in_background(json))?;

    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        print_summary(&summary);
        println!("Index now holds {} entries.", service.index().len());
    }
    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    println!(
        "Imported {} entries at {}: {} added, {} merged, {} skipped ({} conflicted)",
        summary.total(),
        summary.imported_at.to_rfc3339(),
        summary.added,
        summary.merged,
        summary.skipped,
        summary.conflicted
    );
}

fn cmd_status(
    service: &DictionaryService,
    data_dir: &DataDir,
    defaults_dir: &Path,
    json: bool,
) -> Result<()> {
    let status = service.status()?;

    if json {
        println!(
            "{}",
            serde_json::to_string(&serde_json::json!({
                "data_dir": data_dir.root(),
                "defaults_dir": defaults_dir,
                "status": status,
            }))?
        );
    } else {
        println!("Data directory: {}", data_dir.root().display());
        println!("Defaults directory: {}", defaults_dir.display());
        println!("Indexed entries: {}", status.entries);
        println!("Default entries: {}", status.default_entries);
        println!("User entries: {}", status.user_entries);
        println!("Override only: {}", status.override_only);
        println!("Result limit: {}", status.result_limit);
        match &status.last_import {
            Some(summary) => print_summary(summary),
            None => println!("No imports yet."),
        }
    }
    Ok(())
}

fn cmd_names(service: &DictionaryService, args: &NamesArgs) -> Result<()> {
    let params = search::SearchParams {
        query: args.query.clone(),
        count: Some(1),
        ..Default::default()
    };
    let best = search::execute_search(&params, service)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound {
            kind: "entry",
            name: args.query.clone(),
        })?;
    let names = naming::for_entry(&best.entry);

    if args.json {
        println!(
            "{}",
            serde_json::to_string(&serde_json::json!({
                "key": best.key,
                "base": best.entry.base_name(),
                "names": names,
            }))?
        );
    } else {
        println!("{} ({})", best.entry.korean_name, best.entry.base_name());
        println!("  camel:  {}", names.camel);
        println!("  snake:  {}", names.snake);
        println!("  pascal: {}", names.pascal);
    }
    Ok(())
}

fn cmd_config(service: &DictionaryService, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { json } => {
            let current = service.config()?;
            if json {
                println!("{}", serde_json::to_string(&current)?);
            } else {
                println!("override_only = {}", current.override_only);
                println!("result_limit = {}", current.result_limit);
            }
        }
        ConfigAction::SetOverrideOnly { value } => {
            let override_only = config::parse_bool(&value)?;
            service.set_override_only(override_only)?;
            println!("override_only = {override_only}");
        }
        ConfigAction::SetLimit { value } => {
            let result_limit = config::parse_limit(&value)?;
            DictionaryConfig {
                result_limit,
                ..service.config()?
            }
            .save(service.store())?;
            println!("result_limit = {result_limit}");
        }
    }
    Ok(())
}
