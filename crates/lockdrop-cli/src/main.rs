//! lockdrop
//!
//! Operator CLI for a lock-drop campaign kept in a local sled ledger, and the
//! offline aggregator that turns its event log into genesis balances.
//!
//! Usage:
//!   lockdrop init           --params <json>
//!   lockdrop deposit        --from <addr> --days <n> --value <wei> --receiver <hex>
//!   lockdrop cancel         --from <addr> --index <n>
//!   lockdrop withdraw       --from <addr>
//!   lockdrop lockers
//!   lockdrop locks          --account <addr>
//!   lockdrop balance
//!   lockdrop time-remaining
//!   lockdrop reconstruct    [--events <json>] [--out <path>]
//!   lockdrop export-events  [--out <path>]
//!
//! Every command accepts `--data-dir <path>` and `--at <unix_ts>`; the latter
//! pins the campaign clock instead of reading the system time.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lockdrop_aggregator::{Aggregator, BalanceTable};
use lockdrop_campaign::{Campaign, CampaignClock, CampaignQuery, FixedClock, SystemClock};
use lockdrop_core::{
    constants::SECONDS_PER_DAY,
    error::LockdropError,
    params::CampaignParams,
    types::{parse_wei, AccountId, LockIndex, ReceiverKey, Timestamp},
};
use lockdrop_state::{JsonEventLog, StateDb};

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lockdrop", version, about = "Lock-drop campaign ledger and genesis aggregator")]
struct Args {
    /// Directory holding the campaign database.
    #[arg(long, global = true, default_value = "~/.lockdrop")]
    data_dir: PathBuf,

    /// Evaluate the command at this Unix timestamp instead of now.
    #[arg(long, global = true)]
    at: Option<Timestamp>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a new campaign from a parameters file.
    Init {
        /// JSON file: { "lock_period_days": 92, "token_capacity": "…", "token_price": "…" }
        #[arg(long)]
        params: PathBuf,
    },

    /// Lock value for a number of days, crediting tokens to a receiver key.
    Deposit {
        /// Depositing account (0x-prefixed, 20 bytes).
        #[arg(long)]
        from: String,
        /// Lock duration in days.
        #[arg(long)]
        days: u64,
        /// Value to lock, in wei (decimal).
        #[arg(long)]
        value: String,
        /// Receiver key on the target chain (hex, up to 32 bytes).
        #[arg(long)]
        receiver: String,
    },

    /// Cancel an active lock while the campaign is running.
    Cancel {
        #[arg(long)]
        from: String,
        /// Lock index within the account's lock list.
        #[arg(long)]
        index: LockIndex,
    },

    /// Redeem every matured lock of an account after the campaign ended.
    Withdraw {
        #[arg(long)]
        from: String,
    },

    /// Live per-receiver token totals over active locks.
    Lockers,

    /// List an account's locks.
    Locks {
        #[arg(long)]
        account: String,
    },

    /// Value held in active locks and remaining capacity.
    Balance,

    /// Time left in the deposit window.
    TimeRemaining,

    /// Replay an event log into the genesis balance table.
    Reconstruct {
        /// Decoded event file. Defaults to the local ledger's log.
        #[arg(long)]
        events: Option<PathBuf>,
        /// Write the table here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Dump the local event log as a decoded event file.
    ExportEvents {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,lockdrop=info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.chain().find_map(|e| e.downcast_ref::<LockdropError>()) {
                Some(core) => eprintln!("error[{}]: {}", core.kind(), core),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let data_dir = expand_tilde(&args.data_dir);
    let clock: Box<dyn CampaignClock> = match args.at {
        Some(ts) => Box::new(FixedClock(ts)),
        None => Box::new(SystemClock),
    };

    match args.command {
        Command::Init { params } => cmd_init(&data_dir, &params, clock.as_ref()),

        Command::Deposit { from, days, value, receiver } => {
            let from = AccountId::from_hex(&from)?;
            let value = parse_wei(&value)?;
            let receiver = ReceiverKey::from_hex(&receiver)?;
            let (db, mut campaign) = load(&data_dir)?;
            let ev = campaign.lock(&from, days, receiver, value, clock.as_ref())?;
            db.commit(&mut campaign)?;
            println!("Lock:      {}#{}", ev.sender, ev.lock_index);
            println!("Tokens:    {} → {}", ev.num_of_tokens, ev.receiver);
            println!("Remaining: {}", campaign.remaining_capacity());
            Ok(())
        }

        Command::Cancel { from, index } => {
            let from = AccountId::from_hex(&from)?;
            let (db, mut campaign) = load(&data_dir)?;
            let receipt = campaign.unlock(&from, index, clock.as_ref())?;
            db.commit(&mut campaign)?;
            println!("Cancelled: {}#{}", from, index);
            println!("Refund:    {} wei", receipt.refund);
            println!("Released:  {} tokens", receipt.released_tokens);
            Ok(())
        }

        Command::Withdraw { from } => {
            let from = AccountId::from_hex(&from)?;
            let (db, mut campaign) = load(&data_dir)?;
            let receipt = campaign.withdraw(&from, clock.as_ref())?;
            db.commit(&mut campaign)?;
            println!("Redeemed:  {:?}", receipt.indices);
            println!("Tokens:    {}", receipt.tokens);
            println!("Value:     {} wei", receipt.value);
            Ok(())
        }

        Command::Lockers => {
            let (_db, campaign) = load(&data_dir)?;
            let sheet = CampaignQuery::new(&campaign).live_balance_sheet();
            let rows: Vec<(String, String)> = sheet
                .iter()
                .map(|(k, v)| (k.to_hex(), v.to_string()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }

        Command::Locks { account } => {
            let account = AccountId::from_hex(&account)?;
            let (_db, campaign) = load(&data_dir)?;
            let query = CampaignQuery::new(&campaign);
            let records = campaign.locks_for(&account);
            if records.is_empty() {
                println!("No locks for {account}");
            }
            for record in records {
                println!("{}", query.describe(&account, record.index, clock.now())?);
            }
            Ok(())
        }

        Command::Balance => {
            let (_db, campaign) = load(&data_dir)?;
            println!("Locked:    {} wei", campaign.balance());
            println!("Capacity:  {} / {} tokens remaining", campaign.remaining_capacity(), campaign.capacity().total());
            println!("Lockers:   {}", campaign.participants().len());
            Ok(())
        }

        Command::TimeRemaining => {
            let (_db, campaign) = load(&data_dir)?;
            let secs = campaign.time_remaining(clock.now());
            println!("Ends:      {}", format_timestamp(campaign.ending));
            if secs == 0 {
                println!("Remaining: campaign has ended");
            } else {
                println!("Remaining: {} ({secs} s)", format_duration(secs));
            }
            Ok(())
        }

        Command::Reconstruct { events, out } => {
            let table = match events {
                Some(path) => Aggregator::new().reconstruct(&JsonEventLog::load(expand_tilde(&path))?)?,
                None => Aggregator::new().reconstruct(&open_ledger(&data_dir)?)?,
            };
            write_table(&table, out.as_deref())
        }

        Command::ExportEvents { out } => {
            let (db, _campaign) = load(&data_dir)?;
            let log = JsonEventLog::from_events(&db.events()?);
            let json = log.to_json()?;
            match out {
                Some(path) => {
                    let path = expand_tilde(&path);
                    std::fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), deposits = log.deposits.len(), unlocks = log.unlocks.len(), "events exported");
                }
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_init(data_dir: &Path, params: &Path, clock: &dyn CampaignClock) -> anyhow::Result<()> {
    let params_path = expand_tilde(params);
    let json = std::fs::read_to_string(&params_path)
        .with_context(|| format!("reading {}", params_path.display()))?;
    let params: CampaignParams =
        serde_json::from_str(&json).context("parsing campaign parameters")?;

    if let Some(parent) = data_dir.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let db = StateDb::open(data_dir)?;
    let mut campaign = Campaign::new(&params, clock)?;
    db.init_campaign(&mut campaign)?;

    println!("Campaign:  {}", data_dir.display());
    println!("Opens:     {}", format_timestamp(campaign.beginning));
    println!("Ends:      {}", format_timestamp(campaign.ending));
    println!("Capacity:  {} tokens at {} wei", params.token_capacity, params.token_price);
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Open an existing ledger without creating one.
fn open_ledger(data_dir: &Path) -> anyhow::Result<StateDb> {
    if !data_dir.exists() {
        bail!(
            "no ledger at {}; run `lockdrop init --params <json>` first",
            data_dir.display()
        );
    }
    Ok(StateDb::open(data_dir)?)
}

fn load(data_dir: &Path) -> anyhow::Result<(StateDb, Campaign)> {
    let db = open_ledger(data_dir)?;
    let campaign = db.load_campaign()?;
    Ok((db, campaign))
}

fn write_table(table: &BalanceTable, out: Option<&Path>) -> anyhow::Result<()> {
    let json = table.to_genesis_json()?;
    match out {
        Some(path) => {
            let path = expand_tilde(path);
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), receivers = table.len(), total = %table.grand_total(), "balances written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn format_timestamp(ts: Timestamp) -> String {
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.to_rfc3339(),
        None => ts.to_string(),
    }
}

fn format_duration(secs: i64) -> String {
    let days = secs / SECONDS_PER_DAY;
    let rest = secs % SECONDS_PER_DAY;
    format!("{}d {:02}h {:02}m {:02}s", days, rest / 3600, rest % 3600 / 60, rest % 60)
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0d 00h 00m 00s");
        assert_eq!(format_duration(SECONDS_PER_DAY + 3_661), "1d 01h 01m 01s");
    }

    #[test]
    fn timestamps_render_as_rfc3339() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn missing_ledger_is_not_created() {
        let dir = std::env::temp_dir().join("lockdrop_cli_unit_missing_ledger");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(open_ledger(&dir).is_err());
        assert!(!dir.exists());
    }

    #[test]
    fn plain_paths_are_left_alone() {
        assert_eq!(expand_tilde(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
    }
}
