mod confirm;

use std::{
    env,
    ffi::OsString,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use dice_engine::{
    display,
    history::DEFAULT_HISTORY_LIMIT,
    roll_notation, Dice, HistoryLimit, HistoryStore, Roller,
};
use tracing_subscriber::EnvFilter;

use crate::confirm::{confirm, Confirmation};

/// Exit status when the user declines a destructive action.
const DECLINED: u8 = 1;

#[derive(Args)]
struct HistoryArgs {
    /// Number of recent rolls to show
    #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    limit: usize,
    /// Show all roll history (overrides --limit)
    #[arg(short, long)]
    all: bool,
}

impl HistoryArgs {
    fn window(&self) -> HistoryLimit {
        if self.all {
            HistoryLimit::All
        } else {
            HistoryLimit::Last(self.limit)
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Show roll history (default: last 20 rolls)
    History(HistoryArgs),
    /// Clear roll history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Parser)]
#[command(name = "dice-roller", version)]
#[command(about = "D&D Dice Roller CLI")]
#[command(after_help = "Roll dice using standard D&D notation:\n  \
    dice-roller 1d20     roll one 20-sided die\n  \
    dice-roller 3d6      roll three 6-sided dice and sum\n  \
    dice-roller 4d8+3    roll four 8-sided dice, sum, and add 3")]
struct Cli {
    /// Dice notation to roll, e.g. 1d20, 3d6, 4d8+3, 2d10-1
    notation: Option<String>,

    /// History file to use (takes precedence over $DICE_ROLLER_HISTORY)
    #[arg(long, global = true, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// RNG seed for reproducible rolls
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse_from(canonical_subcommand(env::args_os()));
    let store = HistoryStore::resolve(cli.history_file);
    tracing::debug!(path = %store.path().display(), "using history file");

    match (cli.cmd, cli.notation) {
        (Some(Cmd::History(args)), _) => show_history(&store, args.window()),
        (Some(Cmd::Clear { yes }), _) => return clear_history(&store, yes),
        (None, Some(notation)) => roll(&store, &notation, cli.seed),
        (None, None) => Cli::command().print_help()?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Rewrite the first positional argument to its registered subcommand name
/// when it matches one ignoring case, so `HISTORY` and `Clear` dispatch like
/// `history` and `clear`.
fn canonical_subcommand(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let cmd = Cli::command();
    let mut args: Vec<OsString> = args.into_iter().collect();

    let mut idx = 1;
    while idx < args.len() {
        let Some(arg) = args[idx].to_str() else {
            break;
        };
        if arg == "--" {
            break;
        }
        if let Some(long) = arg.strip_prefix("--") {
            let takes_value = !long.contains('=')
                && cmd
                    .get_arguments()
                    .find(|a| a.get_long() == Some(long))
                    .is_some_and(|a| a.get_action().takes_values());
            if takes_value {
                idx += 1;
            }
        } else if !arg.starts_with('-') {
            let matched = cmd
                .get_subcommands()
                .map(|sc| sc.get_name())
                .find(|name| name.eq_ignore_ascii_case(arg));
            if let Some(name) = matched {
                args[idx] = OsString::from(name);
            }
            break;
        }
        idx += 1;
    }
    args
}

fn roll(store: &HistoryStore, notation: &str, seed: Option<u64>) {
    let dice = match seed {
        Some(seed) => Dice::from_seed(seed),
        None => Dice::from_entropy(),
    };
    let mut roller = Roller::new(dice);

    match roll_notation(&mut roller, notation) {
        Ok(outcome) => {
            store.append(&outcome);
            for line in display::outcome_lines(&outcome) {
                println!("{}", line);
            }
        }
        Err(err) => {
            tracing::debug!(%err, notation, "rejected notation");
            for line in display::invalid_notation_lines(notation) {
                println!("{}", line);
            }
        }
    }
}

fn show_history(store: &HistoryStore, limit: HistoryLimit) {
    let entries = store.recent(limit);
    if entries.is_empty() {
        println!("{}", display::NO_HISTORY);
        return;
    }

    println!("{}", display::HISTORY_HEADER);
    println!("{}", display::history_rule());
    for entry in &entries {
        for line in display::entry_lines(entry) {
            println!("{}", line);
        }
        println!();
    }
}

fn clear_history(store: &HistoryStore, skip_prompt: bool) -> anyhow::Result<ExitCode> {
    let decision = if skip_prompt {
        Confirmation::Confirmed
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let decision = confirm(display::CLEAR_PROMPT, &mut io::stdin().lock(), &mut out)?;
        out.flush()?;
        decision
    };

    match decision {
        Confirmation::Confirmed => {
            store.clear();
            println!("{}", display::HISTORY_CLEARED);
            Ok(ExitCode::SUCCESS)
        }
        Confirmation::Declined => {
            tracing::debug!("clear declined");
            Ok(ExitCode::from(DECLINED))
        }
    }
}
