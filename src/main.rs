// src/main.rs
//
// botmarkup command line: render an HTML file (an email body) to bot markup.
//
// Policy layering: built-in defaults, then an optional TOML file (--config),
// then individual flags. `-` as INPUT reads stdin; output goes to stdout
// unless OUTPUT is given.
//
// CLI flags:
//   --max-chars N / --max-lines N / --max-depth N : budgets and nesting guard
//   --allowed-tags b,i,a                          : replace the allow-list
//   --spoiler-class NAME                          : span class marking spoilers
//   --chat-id ID [--preview-base URL]             : emit a sendMessage payload
//   --stats                                       : print budget counters to stderr

use anyhow::{Context, Result};
use botmarkup::dispatch::{preview_url, InlineKeyboard, SendMessage};
use botmarkup::message::message_key;
use botmarkup::{convert, parse_html, PolicyConfig};
use clap::{ArgAction, Parser};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// TOML policy file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Character budget for rendered text
    #[arg(long)]
    max_chars: Option<usize>,

    /// Estimated display-line budget
    #[arg(long)]
    max_lines: Option<usize>,

    /// Deepest element nesting that is still rendered
    #[arg(long)]
    max_depth: Option<usize>,

    /// Comma-separated tags allowed in the output
    #[arg(long, value_delimiter = ',')]
    allowed_tags: Option<Vec<String>>,

    /// Class marking a <span> as spoiler
    #[arg(long)]
    spoiler_class: Option<String>,

    /// Print a sendMessage JSON payload for this chat instead of bare markup
    #[arg(long)]
    chat_id: Option<String>,

    /// Preview endpoint for the inline keyboard (needs --message-id)
    #[arg(long, requires = "message_id")]
    preview_base: Option<String>,

    /// Message-ID of the mail the HTML came from
    #[arg(long)]
    message_id: Option<String>,

    /// Print conversion counters to stderr
    #[arg(long, action = ArgAction::SetTrue)]
    stats: bool,

    /// Input file, or '-' for stdin
    input: PathBuf,

    /// Output file (default: stdout)
    output: Option<PathBuf>,
}

impl Cli {
    fn policy(&self) -> Result<PolicyConfig> {
        let mut policy = match &self.config {
            Some(path) => {
                let src = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                PolicyConfig::from_toml(&src)?
            }
            None => PolicyConfig::default(),
        };

        // Flags override the file.
        if let Some(n) = self.max_chars {
            policy.max_chars = n;
        }
        if let Some(n) = self.max_lines {
            policy.max_lines = n;
        }
        if let Some(n) = self.max_depth {
            policy.max_depth = n;
        }
        if let Some(tags) = &self.allowed_tags {
            policy.allowed_tags = tags.iter().map(|t| t.trim().to_ascii_lowercase()).collect();
        }
        if let Some(class) = &self.spoiler_class {
            policy.spoiler_class = class.clone();
        }
        Ok(policy)
    }

    fn read_input(&self) -> Result<Vec<u8>> {
        if self.input.as_os_str() == "-" {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            return Ok(buf);
        }
        fs::read(&self.input).with_context(|| format!("failed to read {}", self.input.display()))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let policy = cli.policy()?;
    let src = cli.read_input()?;
    let dom = parse_html(src.as_slice()).context("failed to parse HTML")?;
    let conversion = convert(&dom, &policy);

    if cli.stats {
        let s = conversion.state;
        eprintln!(
            "chars_used={} lines_used={} truncated={}",
            s.chars_used, s.lines_used, s.truncated
        );
    }

    let mut out = match &cli.chat_id {
        Some(chat_id) => {
            let keyboard = match (&cli.preview_base, &cli.message_id) {
                (Some(base), Some(id)) => {
                    Some(InlineKeyboard::preview(preview_url(base, message_key(id))))
                }
                _ => None,
            };
            SendMessage::rendered(chat_id, conversion.markup, keyboard)
                .to_json()
                .context("failed to serialize payload")?
        }
        None => conversion.markup,
    };
    out.push('\n');

    match &cli.output {
        Some(path) => {
            fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))?
        }
        None => io::stdout()
            .write_all(out.as_bytes())
            .context("failed to write stdout")?,
    }
    Ok(())
}
