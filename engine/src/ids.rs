use rand::distributions::Alphanumeric;
use rand::Rng;
use sendix_common::{LoadId, ProposalId};

/// Length of generated ids, matching the ids the web client issued.
const ID_LEN: usize = 8;

/// Issues ids for new loads and proposals.
pub trait IdGenerator {
    fn next_load_id(&mut self) -> LoadId;
    fn next_proposal_id(&mut self) -> ProposalId;
}

/// Random lowercase base36 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl RandomIds {
    fn token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect()
    }
}

impl IdGenerator for RandomIds {
    fn next_load_id(&mut self) -> LoadId {
        LoadId(Self::token())
    }

    fn next_proposal_id(&mut self) -> ProposalId {
        ProposalId(Self::token())
    }
}

/// `L1, L2, ...` and `P1, P2, ...`, for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    loads: u64,
    proposals: u64,
}

impl IdGenerator for SequentialIds {
    fn next_load_id(&mut self) -> LoadId {
        self.loads += 1;
        LoadId(format!("L{}", self.loads))
    }

    fn next_proposal_id(&mut self) -> ProposalId {
        self.proposals += 1;
        ProposalId(format!("P{}", self.proposals))
    }
}
