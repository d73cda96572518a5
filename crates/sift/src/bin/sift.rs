// ABOUTME: CLI binary for sift: extracts the main content of URLs or local HTML files.
// ABOUTME: Prints the text or markup view, or the full extraction as JSON.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use sift::{Client, ContentType, Extraction, Heuristics};

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Extract the main content of web pages")]
struct Args {
    /// Output format: html (default) or text/txt
    #[arg(short = 'f', long = "format", default_value = "html")]
    format: String,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output the full extraction as JSON instead of raw content
    #[arg(long = "json")]
    json_output: bool,

    /// HTML file to extract from ("-" reads stdin)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL recorded in the result when using --html
    #[arg(long = "url")]
    url: Option<String>,

    /// JSON heuristics file replacing the builtin tag tables and patterns
    #[arg(long = "heuristics")]
    heuristics: Option<PathBuf>,

    /// Print the builtin heuristics JSON and exit
    #[arg(long = "dump-heuristics")]
    dump_heuristics: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Log debug output (overridden by SIFT_LOG)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Only log errors (overridden by SIFT_LOG)
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,

    /// URLs to fetch and extract
    #[arg()]
    urls: Vec<String>,
}

fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SIFT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("warning: failed to initialize logging: {}", error);
    }
}

fn read_html(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(String::from_utf8_lossy(&buf).into_owned());
    }
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Raw content of each result separated by blank lines, or JSON.
fn format_output(
    results: &[Extraction],
    content_type: ContentType,
    json_output: bool,
) -> serde_json::Result<String> {
    if json_output {
        if results.len() == 1 {
            serde_json::to_string_pretty(&results[0])
        } else {
            serde_json::to_string_pretty(results)
        }
    } else {
        Ok(results
            .iter()
            .map(|r| r.content(content_type))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.quiet, args.verbose);

    if args.dump_heuristics {
        println!("{}", Heuristics::builtin_json().trim_end());
        return ExitCode::SUCCESS;
    }

    if args.html.is_none() && args.urls.is_empty() {
        eprintln!("error: at least one URL is required, or use --html");
        return ExitCode::from(1);
    }

    if args.html.is_some() && !args.urls.is_empty() {
        eprintln!("error: cannot use both --html and positional URLs");
        return ExitCode::from(1);
    }

    let content_type = ContentType::from(args.format.as_str());
    let mut builder = Client::builder()
        .content_type(content_type)
        .allow_private_networks(args.allow_private_networks);

    if let Some(path) = &args.heuristics {
        match Heuristics::from_path(path) {
            Ok(heuristics) => builder = builder.heuristics(Arc::new(heuristics)),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(1);
            }
        }
    }
    let client = builder.build();

    let start = Instant::now();
    let mut results: Vec<Extraction> = Vec::new();
    let mut had_error = false;

    if let Some(html_path) = &args.html {
        match read_html(html_path) {
            Ok(html) => {
                let url = args.url.as_deref().unwrap_or_default();
                results.push(client.parse_html(&html, url));
            }
            Err(e) => {
                eprintln!("error reading file {:?}: {}", html_path, e);
                had_error = true;
            }
        }
    } else {
        for url in &args.urls {
            match client.parse(url).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    eprintln!("error extracting {}: {}", url, e);
                    had_error = true;
                }
            }
        }
    }

    let elapsed = start.elapsed();

    if !results.is_empty() {
        match format_output(&results, client.content_type(), args.json_output) {
            Ok(output_str) => {
                if let Some(output_path) = &args.output {
                    if let Err(e) = fs::write(output_path, &output_str) {
                        eprintln!("error writing to {:?}: {}", output_path, e);
                        had_error = true;
                    }
                } else {
                    println!("{}", output_str);
                }
            }
            Err(e) => {
                eprintln!("error serializing output: {}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
