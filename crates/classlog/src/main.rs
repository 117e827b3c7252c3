//! classlog - terminal browser for a class record site.
//!
//! Prints the timeline, the people roster, a person's records, the glossary
//! and a term page. Data is read from the configured site (URL or local
//! directory) and cached locally for a day.

use std::io;

use anyhow::{bail, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use classlog_core::markup::{format_with, HtmlRenderer, PlainRenderer, Renderer};
use classlog_core::views::{
    self, GlossarySortKey, PeopleSortKey, SortOrder, PLACEHOLDER,
};
use classlog_core::{Config, Person, ProgressReporter, Record, Session};

const USAGE: &str = "\
Usage: classlog [--html] <command> [args]

Commands:
  timeline [--desc]                          All records in date order
  people [--sort id|participation|authored] [--desc]
  person <id> [--authored]                   Records mentioning (or written by) a person
  glossary [--sort since|id] [--desc]
  term <id>                                  A glossary term and its records
  unlock <key>                               Enter the access key
  lock                                       Forget the access key
  clear-cache                                Remove cached datasets
  status                                     Show configuration and cache ages

Environment: CLASSLOG_BASE_URL, CLASSLOG_DATA_DIR, CLASSLOG_CACHE_TTL_HOURS,
CLASSLOG_ACCESS_KEY_HASH, RUST_LOG";

/// Initialize the tracing subscriber for logging.
///
/// Log lines go to stderr through a non-blocking writer so they never
/// interleave with the page written to stdout.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        for cause in e.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

/// Flags shared by all commands.
struct Options {
    html: bool,
    descending: bool,
    authored: bool,
    sort: Option<String>,
}

impl Options {
    fn order(&self) -> SortOrder {
        if self.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<(Options, Vec<String>)> {
    let mut options = Options {
        html: false,
        descending: false,
        authored: false,
        sort: None,
    };
    let mut positional = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--html" => options.html = true,
            "--desc" => options.descending = true,
            "--authored" => options.authored = true,
            "--sort" => match iter.next() {
                Some(key) => options.sort = Some(key),
                None => bail!("--sort needs a value"),
            },
            "-h" | "--help" => positional.insert(0, "help".to_string()),
            flag if flag.starts_with("--") => bail!("Unknown option: {}\n\n{}", flag, USAGE),
            _ => positional.push(arg),
        }
    }
    Ok((options, positional))
}

async fn run(args: Vec<String>) -> Result<()> {
    let (options, positional) = parse_args(args)?;
    let command = positional.first().map(String::as_str).unwrap_or("help");
    let argument = positional.get(1).map(String::as_str);

    if command == "help" {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::load()?;
    config.apply_env();
    let session = Session::from_config(&config)?;
    info!(command, "classlog starting");

    match command {
        "unlock" => {
            let Some(key) = argument else {
                bail!("Usage: classlog unlock <key>");
            };
            let verification = session.gate().verify(key)?;
            if !verification.ok {
                bail!(verification.message.unwrap_or_default());
            }
            println!("Access granted.");
            return Ok(());
        }
        "lock" => {
            session.gate().clear_access()?;
            println!("Access key forgotten.");
            return Ok(());
        }
        "clear-cache" => {
            let removed = session.clear_cache()?;
            println!("Removed {} cache entries.", removed);
            return Ok(());
        }
        "status" => {
            print_status(&config, &session)?;
            return Ok(());
        }
        _ => {}
    }

    if !session.gate().is_granted() {
        bail!("Access key required. Run `classlog unlock <key>` first.");
    }
    load_everything(&session).await?;

    let glossary = session.glossary().load_all().await?;
    let html = HtmlRenderer::with_glossary(&glossary);
    let renderer: &dyn Renderer = if options.html { &html } else { &PlainRenderer };

    match command {
        "timeline" => show_timeline(&session, renderer, &options).await,
        "people" => show_people(&session, renderer, &options).await,
        "person" => match argument {
            Some(id) => show_person(&session, renderer, &options, id).await,
            None => bail!("Usage: classlog person <id>"),
        },
        "glossary" => show_glossary(&session, renderer, &options).await,
        "term" => match argument {
            Some(id) => show_term(&session, renderer, id).await,
            None => bail!("Usage: classlog term <id>"),
        },
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

/// Load all datasets, drawing a percentage on stderr while the network is
/// involved.
async fn load_everything(session: &Session) -> Result<()> {
    if !session.needs_load() {
        return session.ensure_all_loaded(None).await;
    }

    let report = |fraction: f64| {
        eprint!("\rLoading... {:>3}%", (fraction * 100.0).round() as u32);
    };
    let result = session
        .ensure_all_loaded(Some(&report as &dyn ProgressReporter))
        .await;
    eprintln!();
    result
}

fn print_records(renderer: &dyn Renderer, records: &[&Record], people: &[Person]) {
    if records.is_empty() {
        println!("(no records)");
        return;
    }
    for record in records {
        println!("{}  {}", record.id, views::record_meta(renderer, record, people));
        println!("{}", format_with(renderer, &record.content));
        for attachment in &record.attachments {
            println!("  attachment: {} ({})", attachment.name, attachment.file);
        }
        println!();
    }
}

async fn show_timeline(session: &Session, renderer: &dyn Renderer, options: &Options) -> Result<()> {
    let records = session.records().load_all().await?;
    let people = session.people().load_all().await?;
    let sorted = views::sort_records(records.iter(), options.order());
    print_records(renderer, &sorted, &people);
    Ok(())
}

async fn show_people(session: &Session, renderer: &dyn Renderer, options: &Options) -> Result<()> {
    let key = match options.sort.as_deref() {
        None | Some("id") => PeopleSortKey::Id,
        Some("participation") => PeopleSortKey::Participation,
        Some("authored") => PeopleSortKey::Authored,
        Some(other) => bail!("Unknown sort key for people: {}", other),
    };
    let people = session.people().load_all().await?;
    let xref = session.cross_references().await?;

    for group in views::group_people_by_role(&people, &xref, key, options.order()) {
        println!("{}", group.role.display_name());
        for row in group.rows {
            let authored = row
                .authored
                .map_or_else(|| PLACEHOLDER.to_string(), |n| n.to_string());
            println!(
                "  {:<12} {:<24} participated {:>3}  authored {:>3}",
                row.person.id,
                format_with(renderer, views::or_placeholder(&row.person.alias)),
                row.participated,
                authored
            );
        }
        println!();
    }
    Ok(())
}

async fn show_person(
    session: &Session,
    renderer: &dyn Renderer,
    options: &Options,
    id: &str,
) -> Result<()> {
    let people = session.people().load_all().await?;
    let Some(person) = people.iter().find(|p| p.id == id) else {
        bail!("Unknown person: {}", id);
    };
    let xref = session.cross_references().await?;

    println!("{} ({})", person.id, person.role);
    println!("Alias: {}", format_with(renderer, views::or_placeholder(&person.alias)));
    println!("{}", format_with(renderer, views::or_placeholder(&person.bio)));
    println!();

    let (label, records) = if options.authored {
        ("Authored", xref.authored_by(id))
    } else {
        ("Participated", xref.participated_in(id))
    };
    println!("{} records: {}", label, records.len());
    println!();
    let sorted = views::sort_records(records, options.order());
    print_records(renderer, &sorted, &people);
    Ok(())
}

async fn show_glossary(session: &Session, renderer: &dyn Renderer, options: &Options) -> Result<()> {
    let key = match options.sort.as_deref() {
        None | Some("since") => GlossarySortKey::Since,
        Some("id") => GlossarySortKey::Id,
        Some(other) => bail!("Unknown sort key for glossary: {}", other),
    };
    let glossary = session.glossary().load_all().await?;

    for (i, term) in views::sort_glossary(&glossary, key, options.order()).iter().enumerate() {
        println!(
            "{:>3}. {:<16} {:<24} {}",
            i + 1,
            term.id,
            format_with(renderer, views::or_placeholder(&term.term)),
            views::or_placeholder(&term.since)
        );
    }
    Ok(())
}

async fn show_term(session: &Session, renderer: &dyn Renderer, id: &str) -> Result<()> {
    let glossary = session.glossary().load_all().await?;
    let Some(term) = glossary.iter().find(|t| t.id == id) else {
        bail!("Unknown term: {}", id);
    };
    let people = session.people().load_all().await?;
    let xref = session.cross_references().await?;

    println!("{}", views::or_placeholder(&term.term));
    println!("Since: {}", views::or_placeholder(&term.since));
    println!("Related: {}", views::related_people(renderer, term, &people));
    println!("{}", format_with(renderer, views::or_placeholder(&term.definition)));
    println!();

    let sorted = views::sort_records(xref.related_to_term(id), SortOrder::Ascending);
    print_records(renderer, &sorted, &people);
    Ok(())
}

fn print_status(config: &Config, session: &Session) -> Result<()> {
    match config.data_source()? {
        classlog_core::DataSource::Url(url) => println!("Source: {}", url),
        classlog_core::DataSource::Dir(dir) => println!("Source: {}", dir.display()),
    }
    println!("Cache:  {}", config.cache_dir()?.display());
    println!("TTL:    {}h", config.cache_ttl_hours);
    println!(
        "Access: {}",
        if session.gate().is_granted() { "granted" } else { "locked" }
    );
    for (kind, age) in session.cache_ages() {
        println!("  {:<10} {}", kind.to_string(), age.as_deref().unwrap_or("not cached"));
    }
    Ok(())
}
