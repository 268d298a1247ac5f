use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gander::{Article, Config, Gander};

/// Extract article content from web pages.
#[derive(Parser, Debug)]
#[command(name = "gander")]
#[command(about = "Extract the main article from a URL or HTML file")]
struct Args {
    /// Output format: text (default), html, markdown/md, json
    #[arg(short = 'f', long = "format", default_value = "text")]
    format: String,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// HTML file to parse instead of fetching
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL context for --html (link resolution, date-in-URL)
    #[arg(long = "url")]
    url: Option<String>,

    /// Target language (2-letter code)
    #[arg(long = "lang", default_value = "en")]
    lang: String,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// URLs to fetch and parse
    #[arg()]
    urls: Vec<String>,
}

fn build_config(args: &Args) -> Config {
    let keep_html = matches!(args.format.to_lowercase().as_str(), "html" | "markdown" | "md");
    Config::builder()
        .language(args.lang.clone())
        .keep_article_html(keep_html)
        .allow_private_networks(args.allow_private_networks)
        .build()
}

fn render(article: &Article, format: &str) -> Result<String> {
    let out = match format.to_lowercase().as_str() {
        "json" => serde_json::to_string_pretty(article)?,
        "html" => article
            .body_html
            .clone()
            .unwrap_or_else(|| article.body_text.clone()),
        "markdown" | "md" => match &article.body_html {
            Some(html) => gander::format::html_to_markdown(html),
            None => article.body_text.clone(),
        },
        _ => article.body_text.clone(),
    };
    Ok(out)
}

fn run(args: &Args) -> Result<String> {
    let gander = Gander::new(build_config(args));
    let mut rendered: Vec<String> = Vec::new();

    if let Some(html_path) = &args.html {
        if !args.urls.is_empty() {
            bail!("--html and positional URLs are mutually exclusive");
        }
        let html = fs::read_to_string(html_path)
            .with_context(|| format!("reading {}", html_path.display()))?;
        let article = gander.extract_html(args.url.as_deref(), &html)?;
        rendered.push(render(&article, &args.format)?);
    } else {
        if args.urls.is_empty() {
            bail!("provide one or more URLs, or --html FILE");
        }
        for url in &args.urls {
            let article = gander.extract_url(url)?;
            rendered.push(render(&article, &args.format)?);
        }
    }

    Ok(rendered.join("\n\n"))
}

fn main() -> ExitCode {
    let args = Args::parse();
    let start = Instant::now();

    let output = match run(&args) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("gander: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    if args.timing {
        eprintln!("elapsed: {} ms", start.elapsed().as_millis());
    }

    let result = match &args.output {
        Some(path) => fs::write(path, output.as_bytes())
            .with_context(|| format!("writing {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            writeln!(stdout, "{}", output).map_err(Into::into)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("gander: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
