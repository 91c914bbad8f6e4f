//! Integration tests for the full cross-service pipeline.
//!
//! Command → ProposalStore → EventBus → ConsumerWorker → ContractStore
//!
//! Verifies:
//! - one approval produces exactly one contract
//! - redelivery and concurrent consumers never double-create
//! - store outages are retried until success, malformed messages are parked

use std::sync::Arc;
use std::time::{Duration, Instant};

use underwrite_core::ProposalId;
use underwrite_messaging::{
    EventBus, InMemoryDeadLetterSink, InMemoryEventBus, MessageEnvelope, ProposalApproved,
};

use crate::cancellation::CancellationToken;
use crate::commands::{ApproveProposal, CreateProposal, ProposalCommands};
use crate::consumer::ApprovedProposalConsumer;
use crate::queries::ContractQueries;
use crate::store::{ContractStore, InMemoryContractStore, InMemoryProposalStore};
use crate::workers::{ConsumerWorker, WorkerHandle};

type Bus = Arc<InMemoryEventBus<MessageEnvelope>>;
type Commands = ProposalCommands<Arc<InMemoryProposalStore>, Bus>;

struct Pipeline {
    commands: Commands,
    bus: Bus,
    contracts: Arc<InMemoryContractStore>,
    dead_letters: Arc<InMemoryDeadLetterSink>,
    workers: Vec<WorkerHandle>,
}

impl Pipeline {
    fn start(worker_count: usize) -> Self {
        underwrite_observability::init();

        let proposals = Arc::new(InMemoryProposalStore::new());
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let contracts = Arc::new(InMemoryContractStore::new());
        let dead_letters = Arc::new(InMemoryDeadLetterSink::new());

        let workers = (0..worker_count)
            .map(|_| {
                let consumer = ApprovedProposalConsumer::new(contracts.clone());
                ConsumerWorker::spawn(
                    "contracting-consumer",
                    bus.clone(),
                    dead_letters.clone(),
                    move |envelope: &MessageEnvelope| consumer.handle(envelope),
                )
            })
            .collect();

        Self {
            commands: ProposalCommands::new(proposals, bus.clone()),
            bus,
            contracts,
            dead_letters,
            workers,
        }
    }

    fn stop(self) {
        for worker in self.workers {
            worker.shutdown();
        }
    }

    fn create_and_approve(&self, name: &str, value_cents: i64) -> ProposalId {
        let cancel = CancellationToken::new();
        let id = self
            .commands
            .create(
                CreateProposal {
                    client_name: name.to_string(),
                    value_cents,
                },
                &cancel,
            )
            .unwrap();
        self.commands
            .approve(ApproveProposal { proposal_id: id }, &cancel)
            .unwrap();
        id
    }
}

fn wait_until(timeout: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    pred()
}

#[test]
fn approval_creates_exactly_one_contract_end_to_end() {
    let pipeline = Pipeline::start(1);

    // Tap the bus to capture the published envelope for later redelivery.
    let tap = pipeline.bus.subscribe();

    let id = pipeline.create_and_approve("Alice", 100_000);

    assert!(wait_until(Duration::from_secs(2), || {
        pipeline
            .contracts
            .get_by_proposal(id)
            .map(|c| c.is_some())
            .unwrap_or(false)
    }));

    let envelope = tap.try_recv().unwrap();
    assert_eq!(envelope.event_type(), ProposalApproved::EVENT_TYPE);
    let event: ProposalApproved = serde_json::from_value(envelope.payload().clone()).unwrap();
    assert_eq!(event.proposal_id, id);
    assert_eq!(event.client_name, "Alice");
    assert_eq!(event.value_cents, 100_000);

    // Redeliver the identical fact; still exactly one contract.
    pipeline.bus.publish(envelope.redelivery()).unwrap();
    std::thread::sleep(Duration::from_millis(200));

    assert_eq!(pipeline.contracts.list().unwrap().len(), 1);
    assert!(pipeline.dead_letters.is_empty());

    pipeline.stop();
}

#[test]
fn concurrent_consumers_never_double_create() {
    // Broadcast fan-out delivers every message to both workers, so each
    // approval is processed (at least) twice. The unique constraint holds.
    let pipeline = Pipeline::start(2);

    let ids: Vec<ProposalId> = (0..5i64)
        .map(|i| pipeline.create_and_approve(&format!("Client {i}"), 10_000 + i))
        .collect();

    assert!(wait_until(Duration::from_secs(2), || {
        pipeline.contracts.list().map(|c| c.len()).unwrap_or(0) == ids.len()
    }));
    std::thread::sleep(Duration::from_millis(200));

    let contracts = ContractQueries::new(pipeline.contracts.clone())
        .list()
        .unwrap();
    assert_eq!(contracts.len(), ids.len());
    for id in ids {
        assert!(contracts.iter().any(|c| c.proposal_id == id));
    }

    pipeline.stop();
}

#[test]
fn contract_store_outage_is_retried_until_success() {
    let pipeline = Pipeline::start(1);

    pipeline.contracts.set_available(false);
    let id = pipeline.create_and_approve("Alice", 100_000);

    // While the store is down the message keeps cycling: nothing is parked,
    // nothing is acknowledged.
    std::thread::sleep(Duration::from_millis(150));
    assert!(pipeline.dead_letters.is_empty());

    // Recover; the redelivery loop lands the contract exactly once.
    pipeline.contracts.set_available(true);
    assert!(wait_until(Duration::from_secs(2), || {
        pipeline
            .contracts
            .get_by_proposal(id)
            .map(|c| c.is_some())
            .unwrap_or(false)
    }));

    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(pipeline.contracts.list().unwrap().len(), 1);
    assert!(pipeline.dead_letters.is_empty());

    pipeline.stop();
}

#[test]
fn malformed_message_is_parked_not_retried() {
    let pipeline = Pipeline::start(1);

    let reference = MessageEnvelope::from_typed(&ProposalApproved::new(
        ProposalId::new(),
        "Alice",
        100_000,
    ))
    .unwrap();
    let malformed: MessageEnvelope = serde_json::from_value(serde_json::json!({
        "message_id": reference.message_id(),
        "event_type": ProposalApproved::EVENT_TYPE,
        "event_version": 1,
        "occurred_at": reference.occurred_at(),
        "payload": { "client_name": "Alice" },
    }))
    .unwrap();

    pipeline.bus.publish(malformed).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        pipeline.dead_letters.len() == 1
    }));
    assert!(pipeline.contracts.list().unwrap().is_empty());

    // Parked once, not resubmitted.
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(pipeline.dead_letters.len(), 1);
    let parked = pipeline.dead_letters.drain_snapshot();
    assert!(parked[0].reason.contains("malformed"));

    pipeline.stop();
}
