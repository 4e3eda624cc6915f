use std::{
    collections::HashSet,
    io,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use cool_asserts::assert_matches;
use dp_number::RawToken;
use tracing_subscriber::fmt::MakeWriter;

use super::*;
use crate::{
    domain::{models::RepoErr, ports::MockAssignmentRepo},
    outbound::memory::InMemoryAssignmentRepo,
};

fn owner(id: &str) -> OwnerId {
    OwnerId::parse(id).unwrap()
}

fn dp(value: u64) -> DpNumber {
    DpNumber::from_value(value).unwrap()
}

fn request(numbers: &[&str]) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        title: Some("Batch".to_string()),
        description: Some("numbers for the week".to_string()),
        numbers: Some(numbers.iter().copied().map(RawToken::from).collect()),
    }
}

fn stored(owner_id: &str, numbers: &[u64]) -> Assignment {
    Assignment {
        id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
        title: "existing".to_string(),
        description: None,
        numbers: numbers.iter().copied().map(dp).collect(),
        owner: owner(owner_id),
        created_at: Utc::now(),
    }
}

fn rendered(numbers: &[DpNumber]) -> Vec<String> {
    numbers.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn rejected_batches_never_reach_storage() {
    // no expectations are set, any storage call panics
    let service = AssignmentServiceImpl::new(MockAssignmentRepo::new());
    let alice = owner("alice");

    assert_matches!(
        service.create_assignment(&alice, request(&[])).await,
        Err(AssignmentErr::EmptyBatch)
    );
    assert_matches!(
        service
            .create_assignment(
                &alice,
                CreateAssignmentRequest {
                    numbers: None,
                    ..request(&[])
                }
            )
            .await,
        Err(AssignmentErr::EmptyBatch)
    );
    assert_matches!(
        service.create_assignment(&alice, request(&["DP1", "-4"])).await,
        Err(AssignmentErr::InvalidIdentifierFormat { token, .. }) => {
            assert_eq!(token, "-4");
        }
    );
    assert_matches!(
        service
            .create_assignment(&alice, request(&["DP0010", "10", "dp10"]))
            .await,
        Err(AssignmentErr::IntraBatchDuplicate(repeated)) => {
            assert_eq!(rendered(&repeated), ["DP0010"]);
        }
    );
    assert_matches!(
        service
            .create_assignment(
                &alice,
                CreateAssignmentRequest {
                    title: None,
                    ..request(&["1"])
                }
            )
            .await,
        Err(AssignmentErr::EmptyTitle)
    );
}

#[tokio::test]
async fn it_should_report_only_the_colliding_numbers() {
    let mut repo = MockAssignmentRepo::new();
    repo.expect_find_by_owner_and_numbers()
        .times(1)
        .withf(|owner, numbers| {
            assert_eq!(owner.as_ref(), "alice");
            assert_eq!(rendered(numbers), ["DP0005", "DP0002", "DP0003"]);
            true
        })
        .returning(|_, _| Box::pin(async { Ok(vec![stored("alice", &[99, 3, 2])]) }));
    repo.expect_insert().never();

    let res = AssignmentServiceImpl::new(repo)
        .create_assignment(&owner("alice"), request(&["5", "2", "3"]))
        .await;

    assert_matches!(res, Err(AssignmentErr::CrossRecordDuplicate(held)) => {
        assert_eq!(rendered(&held), ["DP0002", "DP0003"]);
    });
}

#[tokio::test]
async fn it_should_map_a_backstop_conflict_to_a_duplicate() {
    let mut repo = MockAssignmentRepo::new();
    repo.expect_find_by_owner_and_numbers()
        .times(1)
        .returning(|_, _| Box::pin(async { Ok(vec![]) }));
    repo.expect_insert()
        .times(1)
        .returning(|_, _| Box::pin(async { Err(RepoErr::NumbersTaken(vec![dp(2)])) }));

    let res = AssignmentServiceImpl::new(repo)
        .create_assignment(&owner("alice"), request(&["2"]))
        .await;

    assert_matches!(res, Err(AssignmentErr::CrossRecordDuplicate(held)) => {
        assert_eq!(held, vec![dp(2)]);
    });
}

#[tokio::test]
async fn it_should_hide_storage_failures() {
    let mut repo = MockAssignmentRepo::new();
    repo.expect_find_by_owner().times(1).returning(|_| {
        Box::pin(async { Err(RepoErr::StorageLayerError(anyhow::anyhow!("connection reset"))) })
    });

    let err = AssignmentServiceImpl::new(repo)
        .list_all_numbers(&owner("alice"))
        .await
        .unwrap_err();

    assert_matches!(err, AssignmentErr::StorageUnavailable(_));
    assert_eq!(err.to_string(), "Storage layer error");
}

#[tokio::test]
async fn it_should_pass_the_canonical_batch_to_storage() {
    let mut repo = MockAssignmentRepo::new();
    repo.expect_find_by_owner_and_numbers()
        .returning(|_, _| Box::pin(async { Ok(vec![]) }));
    repo.expect_insert()
        .times(1)
        .withf(|owner, new| {
            assert_eq!(owner.as_ref(), "alice");
            assert_eq!(new.title(), "Batch");
            assert_eq!(rendered(new.numbers()), ["DP0010", "DP0002"]);
            true
        })
        .returning(|owner, new| {
            let assignment = new.into_assignment(owner.clone());
            Box::pin(async move { Ok(assignment) })
        });

    let created = AssignmentServiceImpl::new(repo)
        .create_assignment(&owner("alice"), request(&[" dp10", "2 "]))
        .await
        .unwrap();

    assert_eq!(rendered(&created.numbers), ["DP0010", "DP0002"]);
    assert_eq!(created.owner.as_ref(), "alice");
}

#[tokio::test]
async fn missing_assignments_are_not_found() {
    let mut repo = MockAssignmentRepo::new();
    repo.expect_find_by_owner_and_id()
        .returning(|_, _| Box::pin(async { Ok(None) }));
    repo.expect_delete_by_owner_and_id()
        .returning(|_, _| Box::pin(async { Ok(None) }));
    let service = AssignmentServiceImpl::new(repo);

    assert_matches!(
        service.get_assignment(&owner("alice"), Uuid::nil()).await,
        Err(AssignmentErr::NotFound)
    );
    assert_matches!(
        service.delete_assignment(&owner("alice"), Uuid::nil()).await,
        Err(AssignmentErr::NotFound)
    );
}

#[tokio::test]
async fn it_should_list_numbers_in_numeric_order() {
    let service = AssignmentServiceImpl::new(InMemoryAssignmentRepo::new());
    let alice = owner("alice");

    service
        .create_assignment(&alice, request(&["DP0010", "DP0002"]))
        .await
        .unwrap();
    service
        .create_assignment(&alice, request(&["DP0005"]))
        .await
        .unwrap();
    service
        .create_assignment(&owner("bob"), request(&["DP0001"]))
        .await
        .unwrap();

    let numbers = service.list_all_numbers(&alice).await.unwrap();
    assert_eq!(rendered(&numbers), ["DP0002", "DP0005", "DP0010"]);

    service
        .create_assignment(&alice, request(&["10000", "9999"]))
        .await
        .unwrap();
    let numbers = service.list_all_numbers(&alice).await.unwrap();
    assert_eq!(
        rendered(&numbers),
        ["DP0002", "DP0005", "DP0010", "DP9999", "DP10000"]
    );
}

#[tokio::test]
async fn the_same_batch_is_accepted_for_another_owner() {
    let service = AssignmentServiceImpl::new(InMemoryAssignmentRepo::new());
    let (alice, bob) = (owner("alice"), owner("bob"));

    service
        .create_assignment(&alice, request(&["1", "2"]))
        .await
        .unwrap();

    assert_matches!(
        service.create_assignment(&alice, request(&["2", "3"])).await,
        Err(AssignmentErr::CrossRecordDuplicate(held)) => {
            assert_eq!(rendered(&held), ["DP0002"]);
        }
    );

    service
        .create_assignment(&bob, request(&["2", "3"]))
        .await
        .unwrap();
    assert_eq!(service.list_assignments(&alice).await.unwrap().len(), 1);
}

#[tokio::test]
async fn other_owners_cannot_read_or_delete() {
    let service = AssignmentServiceImpl::new(InMemoryAssignmentRepo::new());
    let (alice, bob) = (owner("alice"), owner("bob"));

    let created = service
        .create_assignment(&alice, request(&["42"]))
        .await
        .unwrap();

    assert_matches!(
        service.get_assignment(&bob, created.id).await,
        Err(AssignmentErr::NotFound)
    );
    assert_matches!(
        service.delete_assignment(&bob, created.id).await,
        Err(AssignmentErr::NotFound)
    );

    let fetched = service.get_assignment(&alice, created.id).await.unwrap();
    assert_eq!(fetched, created);
    service.delete_assignment(&alice, created.id).await.unwrap();
    assert!(service.list_assignments(&alice).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_batches_never_share_a_number() {
    let service = Arc::new(AssignmentServiceImpl::new(InMemoryAssignmentRepo::new()));
    let alice = owner("alice");

    let handles: Vec<_> = (0..32u64)
        .map(|i| {
            let service = service.clone();
            let alice = alice.clone();
            tokio::spawn(async move {
                // every batch holds DP0001 plus one number shared with its neighbour
                let numbers = ["1".to_string(), (100 + i / 2).to_string()];
                let numbers: Vec<&str> = numbers.iter().map(String::as_str).collect();
                service.create_assignment(&alice, request(&numbers)).await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => {
                assert_matches!(err, AssignmentErr::CrossRecordDuplicate(_));
            }
        }
    }
    assert_eq!(created, 1);

    let assignments = service.list_assignments(&alice).await.unwrap();
    assert_eq!(assignments.len(), 1);

    let mut seen = HashSet::new();
    for number in assignments.iter().flat_map(|a| a.numbers.iter()) {
        assert!(seen.insert(*number), "{number} persisted twice");
    }
}

/// collects formatted log lines written while the subscriber is the default
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn rejections_are_logged_once_at_warn() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let service = AssignmentServiceImpl::new(InMemoryAssignmentRepo::new());
    let alice = owner("alice");

    service
        .create_assignment(&alice, request(&["1", "dp1"]))
        .await
        .unwrap_err();
    service
        .get_assignment(&alice, Uuid::nil())
        .await
        .unwrap_err();

    let contents = logs.contents();
    assert!(!contents.contains("ERROR"), "{contents}");
    let warnings: Vec<&str> = contents.lines().filter(|l| l.contains("WARN")).collect();
    assert_eq!(warnings.len(), 2, "{contents}");
    assert!(warnings[0].contains("Duplicate DP numbers in request: DP0001"));
    assert!(warnings[1].contains("Assignment not found"));
}

#[tokio::test]
async fn storage_failures_are_logged_at_error() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let mut repo = MockAssignmentRepo::new();
    repo.expect_find_by_owner().times(1).returning(|_| {
        Box::pin(async { Err(RepoErr::StorageLayerError(anyhow::anyhow!("connection reset"))) })
    });

    AssignmentServiceImpl::new(repo)
        .list_assignments(&owner("alice"))
        .await
        .unwrap_err();

    assert!(logs.contents().contains("ERROR"));
}
