//! End-to-end runs over the queue execution path: the scheduler enqueues,
//! a worker drains the jobs through the executor, and the observable
//! campaign behavior matches the direct path. Also covers the fallback to
//! direct execution when the backend is unreachable.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use campaign_core::config::EngineConfig;
use campaign_core::constants::system;
use campaign_core::error::EngineError;
use campaign_core::models::{Campaign, CampaignStatus, CampaignType, Contact};
use campaign_core::orchestration::{
    CampaignJobExecutor, CampaignLockRegistry, CampaignOrchestrator, DispatchScheduler,
    ExecutionPath,
};
use campaign_core::processor::ContactProcessor;
use campaign_core::queue::{InMemoryJobQueue, QueueWorker, RetryPolicy};
use campaign_core::store::{CampaignStore, InMemoryCampaignStore};
use campaign_core::test_helpers::{fixture_campaign, FlakyStore, MockGateway, UnreachableQueue};

struct QueueHarness {
    store: Arc<InMemoryCampaignStore>,
    queue: Arc<InMemoryJobQueue>,
    scheduler: DispatchScheduler,
    worker: Arc<QueueWorker>,
}

fn build(gateway: MockGateway, config: EngineConfig) -> QueueHarness {
    let store = Arc::new(InMemoryCampaignStore::new());
    let queue = Arc::new(InMemoryJobQueue::new());
    let locks = Arc::new(CampaignLockRegistry::new());
    let processor = Arc::new(ContactProcessor::new(
        Arc::new(gateway),
        config.pacing.clone(),
    ));
    let orchestrator = Arc::new(CampaignOrchestrator::new(
        store.clone(),
        processor.clone(),
        locks.clone(),
        config.clone(),
    ));
    let executor = Arc::new(CampaignJobExecutor::new(
        store.clone(),
        processor,
        queue.clone(),
        locks,
        config.clone(),
        system::CAMPAIGN_JOBS_QUEUE,
    ));
    let worker = QueueWorker::new(
        queue.clone(),
        executor,
        RetryPolicy::new(&config.retry),
        config.queue.clone(),
        system::CAMPAIGN_JOBS_QUEUE,
    );
    let scheduler =
        DispatchScheduler::new(store.clone(), orchestrator, config).with_queue(queue.clone());

    QueueHarness {
        store,
        queue,
        scheduler,
        worker,
    }
}

async fn wait_until<S, F>(store: &Arc<S>, id: Uuid, predicate: F) -> Campaign
where
    S: CampaignStore + ?Sized,
    F: Fn(&Campaign) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(Some(campaign)) = store.find_by_id(id).await {
                if predicate(&campaign) {
                    return campaign;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("campaign did not reach the expected state in time")
}

fn phoned_contacts(count: usize) -> Vec<Contact> {
    (0..count)
        .map(|i| Contact::new(format!("Contact {i}")).with_phone(format!("+1555444{i:04}")))
        .collect()
}

#[tokio::test]
async fn test_queue_path_matches_direct_path_outcomes() {
    let harness = build(MockGateway::new(), EngineConfig::fast());
    let campaign = fixture_campaign(
        CampaignType::Sms,
        vec![
            Contact::new("Ada").with_phone("+15551230001"),
            Contact::new("Bob"),
            Contact::new("Cai").with_phone("+15551230003"),
        ],
    );
    harness.store.save(&campaign).await.unwrap();
    let handle = harness.worker.spawn();

    let receipt = harness
        .scheduler
        .start_campaign(campaign.id, campaign.user_id)
        .await
        .unwrap();
    assert!(receipt.accepted);
    assert_eq!(receipt.path, ExecutionPath::Queue);
    assert!(receipt.job_id.is_some());

    let done = wait_until(&harness.store, campaign.id, |c| {
        c.status == CampaignStatus::Completed
    })
    .await;

    harness.worker.stop();
    let _ = handle.await;

    // Same observable outcome the direct path produces for this batch
    assert_eq!(done.results.len(), 3);
    assert_eq!(done.success_count, 2);
    assert_eq!(done.failure_count, 1);
    let indices: Vec<usize> = done.results.iter().map(|r| r.contact_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_pause_drains_jobs_and_resume_completes() {
    let mut config = EngineConfig::fast();
    config.pacing.inter_contact_delay_ms = 60;
    let gateway = MockGateway::new();
    let sends = gateway.send_log();
    let harness = build(gateway, config);

    let campaign = fixture_campaign(CampaignType::Sms, phoned_contacts(5));
    harness.store.save(&campaign).await.unwrap();
    let handle = harness.worker.spawn();

    harness
        .scheduler
        .start_campaign(campaign.id, campaign.user_id)
        .await
        .unwrap();
    wait_until(&harness.store, campaign.id, |c| !c.results.is_empty()).await;

    harness
        .scheduler
        .pause_campaign(campaign.id, campaign.user_id)
        .await
        .unwrap();

    // Remaining contact jobs observe the pause and complete as no-ops
    tokio::time::timeout(Duration::from_secs(5), async {
        while harness.queue.pending_len(system::CAMPAIGN_JOBS_QUEUE) > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("queue should drain after pause");

    let paused = harness
        .store
        .find_by_id(campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paused.status, CampaignStatus::Paused);
    let processed = paused.results.len();
    assert!(processed >= 1 && processed < 5);

    // Resume fans out only the unprocessed tail
    harness
        .scheduler
        .start_campaign(campaign.id, campaign.user_id)
        .await
        .unwrap();
    let done = wait_until(&harness.store, campaign.id, |c| {
        c.status == CampaignStatus::Completed
    })
    .await;

    harness.worker.stop();
    let _ = handle.await;

    assert_eq!(done.results.len(), 5);
    assert_eq!(done.success_count, 5);
    let indices: Vec<usize> = done.results.iter().map(|r| r.contact_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    assert_eq!(sends.lock().len(), 5, "no contact was sent twice");
}

#[tokio::test]
async fn test_start_conflict_leaves_single_job_enqueued() {
    // No worker: the campaign stays running, so the repeat start must be
    // rejected before it can enqueue anything
    let harness = build(MockGateway::new(), EngineConfig::fast());
    let campaign = fixture_campaign(CampaignType::Sms, phoned_contacts(2));
    harness.store.save(&campaign).await.unwrap();

    harness
        .scheduler
        .start_campaign(campaign.id, campaign.user_id)
        .await
        .unwrap();
    let err = harness
        .scheduler
        .start_campaign(campaign.id, campaign.user_id)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Conflict(_)));
    assert_eq!(harness.queue.pending_len(system::CAMPAIGN_JOBS_QUEUE), 1);
}

#[tokio::test]
async fn test_abandoned_contact_job_pauses_campaign() {
    let config = EngineConfig::fast();
    // Seed save and the dispatcher's running save succeed; every checkpoint
    // attempt for contact 0 fails until its retries are exhausted, then the
    // store recovers so the forced pause can persist
    let store = Arc::new(FlakyStore::new(2, 3));
    let queue = Arc::new(InMemoryJobQueue::new());
    let locks = Arc::new(CampaignLockRegistry::new());
    let processor = Arc::new(ContactProcessor::new(
        Arc::new(MockGateway::new()),
        config.pacing.clone(),
    ));
    let orchestrator = Arc::new(CampaignOrchestrator::new(
        store.clone(),
        processor.clone(),
        locks.clone(),
        config.clone(),
    ));
    let executor = Arc::new(CampaignJobExecutor::new(
        store.clone(),
        processor,
        queue.clone(),
        locks,
        config.clone(),
        system::CAMPAIGN_JOBS_QUEUE,
    ));
    let worker = QueueWorker::new(
        queue.clone(),
        executor,
        RetryPolicy::new(&config.retry),
        config.queue.clone(),
        system::CAMPAIGN_JOBS_QUEUE,
    );
    let scheduler =
        DispatchScheduler::new(store.clone(), orchestrator, config).with_queue(queue.clone());

    let campaign = fixture_campaign(CampaignType::Sms, phoned_contacts(2));
    store.save(&campaign).await.unwrap();
    let handle = worker.spawn();

    scheduler
        .start_campaign(campaign.id, campaign.user_id)
        .await
        .unwrap();

    // Contact 0's job gives up; the campaign must not stay running
    let paused = wait_until(&store, campaign.id, |c| {
        c.status == CampaignStatus::Paused
    })
    .await;
    assert!(paused.results.is_empty());

    // Contact 1's job observes the pause and drains instead of holding
    // for a predecessor result that will never arrive
    tokio::time::timeout(Duration::from_secs(5), async {
        while queue.pending_len(system::CAMPAIGN_JOBS_QUEUE) > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("queue should drain after the forced pause");

    worker.stop();
    let _ = handle.await;

    assert_eq!(queue.archived_len(system::CAMPAIGN_JOBS_QUEUE), 1);
}

#[tokio::test]
async fn test_unreachable_backend_falls_back_to_direct() {
    let config = EngineConfig::fast();
    let store = Arc::new(InMemoryCampaignStore::new());
    let queue = Arc::new(UnreachableQueue::new());
    let locks = Arc::new(CampaignLockRegistry::new());
    let processor = Arc::new(ContactProcessor::new(
        Arc::new(MockGateway::new()),
        config.pacing.clone(),
    ));
    let orchestrator = Arc::new(CampaignOrchestrator::new(
        store.clone(),
        processor,
        locks,
        config.clone(),
    ));
    let scheduler =
        DispatchScheduler::new(store.clone(), orchestrator, config).with_queue(queue.clone());

    let first = fixture_campaign(CampaignType::Sms, phoned_contacts(2));
    store.save(&first).await.unwrap();

    // The failed enqueue is absorbed: the start still succeeds, direct
    let receipt = scheduler
        .start_campaign(first.id, first.user_id)
        .await
        .unwrap();
    assert!(receipt.accepted);
    assert_eq!(receipt.path, ExecutionPath::Direct);
    assert!(receipt.job_id.is_none());
    assert_eq!(queue.enqueue_attempts(), 1);
    assert!(!scheduler.queue_health().is_available());

    let done = wait_until(&store, first.id, |c| c.status == CampaignStatus::Completed).await;
    assert_eq!(done.results.len(), 2);

    // Once marked unavailable, the backend is not consulted again
    let second = fixture_campaign(CampaignType::Sms, phoned_contacts(1));
    store.save(&second).await.unwrap();
    let receipt = scheduler
        .start_campaign(second.id, second.user_id)
        .await
        .unwrap();
    assert_eq!(receipt.path, ExecutionPath::Direct);
    assert_eq!(queue.enqueue_attempts(), 1);

    wait_until(&store, second.id, |c| c.status == CampaignStatus::Completed).await;
}
