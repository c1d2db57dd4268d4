//! Command-line interface for the sluggable binary.
//!
//! The CLI exposes subcommands for normalizing text into slugs and for
//! running a configured behavior once against an in-memory record and store.

use std::{io, path::PathBuf, process};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use sluggable::{
    Error, LifecycleEvent, MemoryRecord, MemoryStore, SlugStrategy, SluggableBehavior,
    load_settings,
};
use tracing_subscriber::EnvFilter;

/// Command line interface for deriving and resolving slugs.
#[derive(Debug, Parser,)]
#[command(name = "sluggable", version, about = "Derive URL-safe slugs and keep them unique")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Normalize text into a slug.
    Slugify(SlugifyArgs,),
    /// Run a configured behavior once and print the resulting record.
    Resolve(ResolveArgs,),
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `slugify` subcommand.
struct SlugifyArgs
{
    /// Text to normalize. Multiple values are joined with `-`.
    #[arg(value_name = "TEXT", required = true)]
    text: Vec<String,>,

    /// Separator placed between words.
    #[arg(long = "separator", default_value_t = '-')]
    separator: char,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `resolve` subcommand.
struct ResolveArgs
{
    /// Path to the YAML file describing the behavior.
    #[arg(long = "config", value_name = "PATH", env = "SLUGGABLE_CONFIG")]
    config: PathBuf,

    /// Identity of an already persisted record.
    #[arg(long = "id", value_name = "KEY")]
    id: Option<String,>,

    /// Attribute loaded from storage, unchanged since load.
    #[arg(long = "attr", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    attributes: Vec<(String, String,),>,

    /// Attribute assigned since load.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    changes: Vec<(String, String,),>,

    /// Slug value already used by another record.
    #[arg(long = "taken", value_name = "SLUG")]
    taken: Vec<String,>,

    /// Lifecycle event to raise.
    #[arg(long = "event", value_enum, default_value_t = EventArg::BeforeValidate)]
    event: EventArg,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum,)]
enum EventArg
{
    BeforeValidate,
    BeforeInsert,
    BeforeUpdate,
}

impl From<EventArg,> for LifecycleEvent
{
    fn from(event: EventArg,) -> Self
    {
        match event {
            EventArg::BeforeValidate => Self::BeforeValidate,
            EventArg::BeforeInsert => Self::BeforeInsert,
            EventArg::BeforeUpdate => Self::BeforeUpdate,
        }
    }
}

fn parse_assignment(raw: &str,) -> Result<(String, String,), String,>
{
    let (field, value,) =
        raw.split_once('=',).ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"),)?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"),);
    }
    Ok((field.to_owned(), value.to_owned(),),)
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main()
{
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn",),),
        )
        .with_writer(io::stderr,)
        .init();

    if let Err(error,) = run() {
        eprintln!("{}", error.to_display_string());
        process::exit(if error.is_retryable() { 75 } else { 1 },);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates configuration, resolution and serialization errors.
fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Command::Slugify(args,) => run_slugify(&args, &mut handle,),
        Command::Resolve(args,) => run_resolve(&args, &mut handle,),
    }
}

fn run_slugify<W: io::Write,>(args: &SlugifyArgs, writer: &mut W,) -> Result<(), Error,>
{
    if !sluggable::is_valid_separator(args.separator,) {
        return Err(Error::configuration(format!(
            "separator {:?} must be an ASCII punctuation character",
            args.separator
        ),),);
    }
    let joined = args.text.join("-",);
    let slug = SlugStrategy::builder(&joined,).separator(args.separator,).build();
    writeln!(writer, "{slug}").map_err(|source| Error::Output {
        source,
    },)
}

fn run_resolve<W: io::Write,>(args: &ResolveArgs, writer: &mut W,) -> Result<(), Error,>
{
    let config = load_settings(&args.config,)?.into_config()?;
    let behavior = SluggableBehavior::new(config,)?;

    let store = MemoryStore::with_values(behavior.config().target_attribute(), args.taken.iter().cloned(),);
    let mut record = match args.id.as_deref() {
        Some(id,) => MemoryRecord::loaded(id, args.attributes.iter().cloned(),),
        None => {
            let mut record = MemoryRecord::new();
            for (field, value,) in &args.attributes {
                record.set(field.as_str(), value.as_str(),);
            }
            record
        }
    };
    for (field, value,) in &args.changes {
        record.set(field.as_str(), value.as_str(),);
    }

    behavior.handle(args.event.into(), &mut record, &store,)?;

    if args.pretty {
        serde_json::to_writer_pretty(&mut *writer, &record,)?;
    } else {
        serde_json::to_writer(&mut *writer, &record,)?;
    }
    Ok((),)
}
