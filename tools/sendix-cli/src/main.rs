//! Command-line front end for the Sendix workflow engine.
//!
//! Every invocation opens the JSON snapshot, runs one request as the
//! persisted session and prints the response as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sendix_common::{LoadId, NewLoad, ProposalId, Role, ShipStage, ThreadId};
use sendix_engine::{Draft, JsonFileStore, Workflow, WorkflowRequest};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sendix", about = "Freight matching workflow: loads, bids, chat, tracking")]
struct Cli {
    /// Snapshot file (default: <data dir>/sendix/snapshot.json).
    #[arg(long, env = "SENDIX_DATA", global = true)]
    data: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn", global = true)]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a session on this device.
    Login {
        name: String,
        /// shipper, carrier or intermediary
        #[arg(long)]
        role: Role,
    },
    Logout,
    Whoami,

    /// Publish a load (shipper).
    Publish {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        #[arg(long = "type")]
        cargo_type: String,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        date: String,
    },
    /// Loads you published.
    MyLoads,
    /// Loads open for bidding.
    Offers,
    /// Bid on a load (carrier).
    Bid {
        load: String,
        #[arg(long)]
        vehicle: String,
        #[arg(long)]
        price: f64,
    },
    /// Your bids.
    MyBids,
    /// Filtered bids on one of your loads (shipper).
    Candidates { load: String },

    /// Pending and filtered bids (intermediary).
    Queue,
    Filter { proposal: String },
    Unfilter { proposal: String },
    Reject { proposal: String },
    /// Pick the winning bid (shipper).
    Approve { proposal: String },

    /// Your chat threads.
    Threads {
        #[arg(long)]
        query: Option<String>,
    },
    /// Show a thread and mark it read.
    Read { thread: ThreadId },
    Post {
        thread: ThreadId,
        text: String,
        /// Timestamp of the message being answered.
        #[arg(long)]
        reply_to: Option<i64>,
        #[arg(long = "attach")]
        attachments: Vec<String>,
    },
    Delete { thread: ThreadId, timestamp: i64 },
    MarkRead { thread: ThreadId },
    MarkAllRead,
    Unread,

    /// Shipments you can follow.
    Shipments {
        #[arg(long)]
        active: bool,
        #[arg(long)]
        query: Option<String>,
    },
    /// Move a shipment one stage forward (carrier).
    Advance { proposal: String },
    /// Set a shipment stage directly (carrier).
    SetStage { proposal: String, stage: ShipStage },
    ResetStage { proposal: String },

    Summary,
    Badges,

    /// Send a raw JSON request.
    Request { json: String },
}

impl Command {
    fn into_request(self) -> Result<WorkflowRequest> {
        use WorkflowRequest as Rq;

        Ok(match self {
            Command::Login { name, role } => Rq::Login { name, role },
            Command::Logout => Rq::Logout,
            Command::Whoami => Rq::WhoAmI,

            Command::Publish {
                origin,
                destination,
                cargo_type,
                size,
                date,
            } => Rq::CreateLoad(NewLoad {
                origin,
                destination,
                cargo_type,
                size,
                date,
            }),
            Command::MyLoads => Rq::MyLoads,
            Command::Offers => Rq::OpenLoads,
            Command::Bid {
                load,
                vehicle,
                price,
            } => Rq::SubmitProposal {
                load: LoadId::new(load),
                vehicle,
                price,
            },
            Command::MyBids => Rq::MyProposals,
            Command::Candidates { load } => Rq::SelectableProposals(LoadId::new(load)),

            Command::Queue => Rq::ModerationQueue,
            Command::Filter { proposal } => Rq::MarkFiltered(ProposalId::new(proposal)),
            Command::Unfilter { proposal } => Rq::Unfilter(ProposalId::new(proposal)),
            Command::Reject { proposal } => Rq::Reject(ProposalId::new(proposal)),
            Command::Approve { proposal } => Rq::Approve(ProposalId::new(proposal)),

            Command::Threads { query } => Rq::Threads { query },
            Command::Read { thread } => Rq::ReadThread(thread),
            Command::Post {
                thread,
                text,
                reply_to,
                attachments,
            } => Rq::PostMessage {
                thread,
                draft: Draft {
                    text,
                    reply_to,
                    attachments,
                },
            },
            Command::Delete { thread, timestamp } => Rq::DeleteMessage { thread, timestamp },
            Command::MarkRead { thread } => Rq::MarkRead(thread),
            Command::MarkAllRead => Rq::MarkAllRead,
            Command::Unread => Rq::UnreadTotal,

            Command::Shipments { active, query } => Rq::Shipments {
                only_active: active,
                query,
            },
            Command::Advance { proposal } => Rq::Advance(ProposalId::new(proposal)),
            Command::SetStage { proposal, stage } => Rq::SetStage {
                proposal: ProposalId::new(proposal),
                stage,
            },
            Command::ResetStage { proposal } => Rq::ResetStage(ProposalId::new(proposal)),

            Command::Summary => Rq::Summary,
            Command::Badges => Rq::HomeBadges,

            Command::Request { json } => {
                serde_json::from_str(&json).context("request is not a valid WorkflowRequest")?
            }
        })
    }
}

fn default_data_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("sendix").join("snapshot.json")
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    let path = cli.data.unwrap_or_else(default_data_path);
    tracing::debug!(path = %path.display(), "opening snapshot");
    let mut workflow = Workflow::with_store(JsonFileStore::new(&path))
        .with_context(|| format!("failed to open snapshot {}", path.display()))?;

    let request = cli.command.into_request()?;
    let response = workflow.handle(request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
