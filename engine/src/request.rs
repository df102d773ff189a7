use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sendix_common::{
    Load, LoadId, Message, Millis, NewLoad, Proposal, ProposalId, Role, Session, ShipStage,
    ThreadId,
};

use crate::board::{Candidate, ModerationQueue, OpenLoad};
use crate::chat::{Draft, ThreadSummary};
use crate::clock::Clock;
use crate::dashboard::{HomeBadges, Summary};
use crate::error::{require_role, Result};
use crate::ids::IdGenerator;
use crate::lifecycle::Approval;
use crate::store::Store;
use crate::tracker::{Shipment, StageChange};
use crate::workflow::Workflow;

/// Requests understood by the workflow engine. Everything except the
/// session and summary requests acts as the persisted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowRequest {
    // Session
    Login { name: String, role: Role },
    Logout,
    WhoAmI,

    // Load board
    CreateLoad(NewLoad),
    MyLoads,
    OpenLoads,
    MyProposals,
    SelectableProposals(LoadId),
    ModerationQueue,

    // Proposal lifecycle
    SubmitProposal { load: LoadId, vehicle: String, price: f64 },
    MarkFiltered(ProposalId),
    Unfilter(ProposalId),
    Reject(ProposalId),
    Approve(ProposalId),

    // Chat
    Threads { query: Option<String> },
    ReadThread(ThreadId),
    PostMessage { thread: ThreadId, draft: Draft },
    DeleteMessage { thread: ThreadId, timestamp: Millis },
    MarkRead(ThreadId),
    MarkAllRead,
    UnreadTotal,

    // Tracking
    Shipments { only_active: bool, query: Option<String> },
    Advance(ProposalId),
    SetStage { proposal: ProposalId, stage: ShipStage },
    ResetStage(ProposalId),

    // Dashboards
    Summary,
    HomeBadges,
}

/// Responses from the workflow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowResponse {
    Session(Option<Session>),
    Load(Load),
    Loads(Vec<Load>),
    OpenLoads(Vec<OpenLoad>),
    Proposal(Proposal),
    Proposals(Vec<Proposal>),
    Candidates(Vec<Candidate>),
    ModerationQueue(ModerationQueue),
    Approval(Approval),
    Threads(Vec<ThreadSummary>),
    Messages(Vec<Message>),
    Message(Message),
    Count(usize),
    Shipments(Vec<Shipment>),
    StageChange(StageChange),
    Summary(Summary),
    HomeBadges(HomeBadges),
    Done,
    Error(String),
}

impl<S: Store, C: Clock, I: IdGenerator> Workflow<S, C, I> {
    /// Route `request` to the managers. Failures become
    /// [`WorkflowResponse::Error`].
    pub fn handle_request(&mut self, request: WorkflowRequest) -> WorkflowResponse {
        debug!(?request, "handling request");
        match self.handle(request) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "request rejected");
                WorkflowResponse::Error(e.to_string())
            }
        }
    }

    /// Like [`Workflow::handle_request`], keeping the typed error.
    pub fn handle(&mut self, request: WorkflowRequest) -> Result<WorkflowResponse> {
        use WorkflowRequest as Rq;
        use WorkflowResponse as Rs;

        // Consumed by whichever arm needs an actor; `NoSession` otherwise.
        let actor = self.current_session();

        Ok(match request {
            Rq::Login { name, role } => Rs::Session(Some(self.login(&name, role)?)),
            Rq::Logout => Rs::Session(self.logout()?),
            Rq::WhoAmI => Rs::Session(self.session().cloned()),

            Rq::CreateLoad(input) => Rs::Load(self.create_load(&actor?, input)?),
            Rq::MyLoads => Rs::Loads(self.loads_owned_by(&actor?)),
            Rq::OpenLoads => Rs::OpenLoads(self.open_loads_for(&actor?)),
            Rq::MyProposals => Rs::Proposals(self.proposals_by(&actor?.name)),
            Rq::SelectableProposals(load) => {
                Rs::Candidates(self.selectable_proposals(&actor?, &load)?)
            }
            Rq::ModerationQueue => {
                require_role(&actor?, Role::Intermediary, "view the moderation queue")?;
                Rs::ModerationQueue(self.moderation_queue())
            }

            Rq::SubmitProposal {
                load,
                vehicle,
                price,
            } => Rs::Proposal(self.submit_proposal(&actor?, &load, &vehicle, price)?),
            Rq::MarkFiltered(id) => Rs::Proposal(self.mark_filtered(&actor?, &id)?),
            Rq::Unfilter(id) => Rs::Proposal(self.unfilter(&actor?, &id)?),
            Rq::Reject(id) => Rs::Proposal(self.reject(&actor?, &id)?),
            Rq::Approve(id) => Rs::Approval(self.approve(&actor?, &id)?),

            Rq::Threads { query } => Rs::Threads(self.thread_summaries(&actor?, query.as_deref())),
            Rq::ReadThread(thread) => Rs::Messages(self.read_thread(&actor?, &thread)?),
            Rq::PostMessage { thread, draft } => {
                Rs::Message(self.post_message(&actor?, &thread, draft)?)
            }
            Rq::DeleteMessage { thread, timestamp } => {
                Rs::Message(self.delete_message(&actor?, &thread, timestamp)?)
            }
            Rq::MarkRead(thread) => {
                self.mark_read(&actor?, &thread)?;
                Rs::Done
            }
            Rq::MarkAllRead => Rs::Count(self.mark_all_read(&actor?)?),
            Rq::UnreadTotal => Rs::Count(self.unread_total(&actor?)),

            Rq::Shipments { only_active, query } => {
                Rs::Shipments(self.shipments_for(&actor?, only_active, query.as_deref()))
            }
            Rq::Advance(id) => Rs::StageChange(self.advance(&actor?, &id)?),
            Rq::SetStage { proposal, stage } => {
                Rs::StageChange(self.set_stage(&actor?, &proposal, stage)?)
            }
            Rq::ResetStage(id) => Rs::StageChange(self.reset_stage(&actor?, &id)?),

            Rq::Summary => Rs::Summary(self.summary()),
            Rq::HomeBadges => Rs::HomeBadges(self.home_badges(&actor?)),
        })
    }
}
