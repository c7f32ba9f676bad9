//! `figurag`: ask questions about FigureYa modules from the terminal.
//!
//! Usage:
//!   figurag ask 生存分析的参数如何设置
//!   figurag search 火山图 --limit 3
//!   figurag chat
//!   figurag ingest ./docs --export chunks.json
//!   figurag report ./docs
//!   figurag setup-key zhipuai <key>

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use figurag_cli::display::{format_answer, format_matches, format_status};
use figurag_cli::env_file::{key_var_for, key_warning, load_env_file, upsert_key};
use figurag_cli::init_tracing;
use figurag_core::config::Config;
use figurag_engine::{build_engine, RagEngine};
use figurag_text::{CorpusReport, Ingestor};

const HISTORY_LEN: usize = 10;

#[derive(Parser)]
#[command(name = "figurag", version, about = "FigureYa module Q&A helper")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Environment file loaded before configuration
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question
    Ask {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show ranked matches only
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Interactive session
    Chat,
    /// Show knowledge source and enabled capabilities
    Status,
    /// Chunk and tag a directory of .txt/.md documents
    Ingest {
        dir: PathBuf,
        /// Write the chunks as JSON
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Summarize a document directory as markdown
    Report { dir: PathBuf },
    /// Store an API key in the env file
    SetupKey { provider: String, key: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    load_env_file(&cli.env_file)?;

    match cli.command {
        Command::Ask { query } => {
            let engine = load_engine()?;
            print!("{}", format_answer(&engine.ask(&query.join(" "))));
        }
        Command::Search { query, limit } => {
            let engine = load_engine()?;
            print!("{}", format_matches(&engine.retrieve(&query.join(" "), limit)));
        }
        Command::Chat => chat(&load_engine()?)?,
        Command::Status => println!("{}", format_status(&load_engine()?.status())),
        Command::Ingest { dir, export } => {
            let report = ingest_with_progress(&dir)?;
            println!(
                "✅ Ingested {} chunks from {} files ({} skipped)",
                report.chunks.len(),
                report.files_processed,
                report.skipped_count()
            );
            for unit in &report.skipped {
                println!("  ⚠️ {}: {}", unit.path, unit.reason);
            }
            if let Some(path) = export {
                let json = serde_json::to_string_pretty(&report.chunks)?;
                std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                println!("📄 Exported chunks to {}", path.display());
            }
        }
        Command::Report { dir } => {
            let report = ingest_with_progress(&dir)?;
            print!("{}", CorpusReport::from_ingest(&report).to_markdown());
        }
        Command::SetupKey { provider, key } => {
            let var = key_var_for(&provider)
                .with_context(|| format!("unknown provider '{provider}' (expected openai or zhipuai)"))?;
            if let Some(warning) = key_warning(&provider, &key) {
                eprintln!("⚠️ {warning}");
            }
            upsert_key(&cli.env_file, var, key.trim())?;
            println!("✅ {var} saved to {}", cli.env_file.display());
        }
    }
    Ok(())
}

fn load_engine() -> anyhow::Result<RagEngine> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;
    Ok(build_engine(&settings, &std::env::current_dir()?))
}

fn ingest_with_progress(dir: &Path) -> anyhow::Result<figurag_core::types::IngestReport> {
    let settings = Config::load()?.settings()?;
    let ingestor = Ingestor::with_max_chars(settings.retrieval.chunk_max_chars);
    let files = ingestor.processor().list_source_files(dir, Some(settings.knowledge.max_files))?;
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    let report = ingestor.ingest_files(&files, |path| {
        pb.set_message(path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
        pb.inc(1);
    });
    pb.finish_and_clear();
    Ok(report)
}

fn chat(engine: &RagEngine) -> anyhow::Result<()> {
    println!("🧬 FigureYa 助手 (/help 查看命令, /quit 退出)");
    println!("{}\n", format_status(&engine.status()));
    let mut history: Vec<String> = Vec::new();
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" | "/exit" | "quit" | "exit" => break,
            "/help" => println!("/help 显示帮助\n/history 最近的问题\n/quit 退出\n其他输入按问题处理"),
            "/history" => {
                if history.is_empty() {
                    println!("(暂无历史)");
                }
                for (i, q) in history.iter().enumerate() {
                    println!("{}. {q}", i + 1);
                }
            }
            query => {
                print!("{}", format_answer(&engine.ask(query)));
                history.push(query.to_string());
                if history.len() > HISTORY_LEN {
                    history.remove(0);
                }
            }
        }
    }
    println!("再见！");
    Ok(())
}
