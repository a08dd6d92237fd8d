//! abp - Always Be Proxying
//!
//! Generates proxy sheets from a list of card identifiers. Each input
//! line is a card name, a spoiler page URL, or a direct image URL;
//! everything after a `#` is a comment.

use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use abp::{
    compose_sheets, default_engines, parse_cards, resolve_all, AbpResult, CardResolver,
    CardSearcher, DownloadCache, Fetcher, DEFAULT_MATCH_THRESHOLD,
};

/// Generate proxy sheets from mythicspoiler.com
#[derive(Parser, Debug)]
#[command(name = "abp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Each line of FILE should be a MtG card name, or a url
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output dir, defaults to current dir
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Border width as a percent of card width
    #[arg(short, long, value_name = "PERCENT", default_value_t = 3.0)]
    margin: f64,

    /// Cache dir for downloaded files. NOTE: careful turning off the
    /// cache, search engines may ban your IP
    #[arg(short, long, value_name = "DIR", default_value = "abp_cache")]
    cache: PathBuf,

    /// Don't cache any downloaded files
    #[arg(short, long)]
    no_cache: bool,

    /// Force refresh of any cached downloads
    #[arg(short, long)]
    refresh: bool,

    /// Print verbose details
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> AbpResult<()> {
    let input = File::open(&args.input)?;
    let cards = parse_cards(BufReader::new(input))?;

    // --no-cache downloads into a temp dir deleted when the run ends
    let no_cache_dir;
    let cache_root = if args.no_cache {
        let dir = tempfile::tempdir()?;
        let root = dir.path().to_path_buf();
        no_cache_dir = Some(dir);
        root
    } else {
        no_cache_dir = None;
        args.cache.clone()
    };
    let cache = DownloadCache::open(&cache_root)?;

    if args.refresh {
        log::debug!("Purging cache because --refresh was specified");
        for entry in &cards {
            cache.purge(&entry.filename)?;
        }
    }

    let fetcher = Fetcher::new(cache);
    let searcher = CardSearcher::new(default_engines(), DEFAULT_MATCH_THRESHOLD);
    let mut resolver = CardResolver::new(fetcher, searcher, DEFAULT_MATCH_THRESHOLD);

    let images = resolve_all(&mut resolver, &cards);
    let sheets = compose_sheets(&images, args.margin);

    if !sheets.is_empty() && !args.output.exists() {
        log::info!("Creating output dir: {}", args.output.display());
        std::fs::create_dir_all(&args.output)?;
    }
    for sheet in &sheets {
        let path = args.output.join(&sheet.name);
        sheet.image.save(&path)?;
        println!("{}", path.display());
    }

    drop(no_cache_dir);
    Ok(())
}
