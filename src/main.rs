use clap::Parser;
use colored::*;
use env_logger::{Builder, Env, Target};
use log::info;
use searchlite::cli::{Cli, HighlightArg};
use searchlite::{
    BufferView, Config, HighlightMode, HighlightSpan, LineHighlighter, NullTicker,
    Result, RunOutcome, SearchLiteError, SearchSession, StartOutcome, SyntectLexer,
};
use std::collections::HashMap;
use std::fs;
use std::thread;

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    info!("searchlite started: {:?} under {:?}", cli.pattern, cli.path);

    let mut config = Config::load().unwrap_or_default();
    apply_cli_overrides(&mut config, &cli);

    let highlighter = match config.search.highlight {
        HighlightMode::Off => None,
        ref mode => Some(LineHighlighter::new(
            Box::new(SyntectLexer::new()),
            mode.clone(),
        )),
    };

    let mut session = SearchSession::new(config, BufferView::new());
    if let Some(highlighter) = highlighter {
        session = session.with_highlighter(highlighter);
    }

    loop {
        match session.request(&cli.pattern, &cli.path, &NullTicker) {
            StartOutcome::Rejected => {
                println!("{}", session.view().status().yellow());
                return Ok(());
            }
            StartOutcome::Deferred(delay) => {
                thread::sleep(delay);
                continue;
            }
            StartOutcome::Finished(outcome) => {
                print_results(&session, outcome);
                return Ok(());
            }
        }
    }
}

fn print_results(session: &SearchSession<BufferView>, outcome: RunOutcome) {
    let view = session.view();
    if view.lines().is_empty() {
        println!("{}", "No matches found".yellow());
    } else {
        let paints: HashMap<usize, &Vec<HighlightSpan>> = view
            .paints()
            .iter()
            .map(|(row, spans)| (*row, spans))
            .collect();

        for (row, line) in view.lines().iter().enumerate() {
            match paints.get(&row) {
                Some(spans) => println!("{}", paint_line(line, spans.as_slice())),
                None if line.ends_with(">:") => println!("{}", line.green().bold()),
                None => println!("{line}"),
            }
        }
    }

    let status = view.status();
    match outcome {
        RunOutcome::Completed => println!("\n{}", status.green()),
        RunOutcome::Capped => println!("\n{}", status.yellow()),
        RunOutcome::Cancelled => println!("\n{}", "CANCELLED".red()),
    }
}

/// Applies truecolor spans to a line for terminal output.
fn paint_line(line: &str, spans: &[HighlightSpan]) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for span in spans {
        if span.column >= line.len() {
            break;
        }
        let end = (span.column + span.len).min(line.len());
        if span.column > pos {
            out.push_str(&line[pos..span.column]);
        }
        let piece = &line[span.column..end];
        out.push_str(
            &piece
                .truecolor(span.color.r, span.color.g, span.color.b)
                .to_string(),
        );
        pos = end;
    }
    out.push_str(&line[pos..]);
    out
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_lines) = cli.max_lines {
        config.search.max_result_lines = max_lines;
    }
    if let Some(max_size) = cli.max_size {
        config.ignore.max_file_size_mb = max_size;
    }
    if let Some(exclude) = &cli.exclude {
        config.ignore.excluded_dirs = exclude.clone();
    }
    if let Some(highlight) = &cli.highlight {
        config.search.highlight = match highlight {
            HighlightArg::Off => HighlightMode::Off,
            HighlightArg::Detect => HighlightMode::Detect,
        };
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| SearchLiteError::Other(e.to_string()))?;
    Ok(())
}
