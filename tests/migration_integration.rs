//! Integration tests for state migration.
//!
//! These tests drive the full pipeline against two `MockApi` accounts and a
//! `MockBlobTransport`, so every call the pipeline makes is recorded.

use spacebridge::api::blob::{BlobCall, MockBlobTransport};
use spacebridge::api::mock::{FailOn, MockApi, MockOperation};
use spacebridge::api::ApiError;
use spacebridge::core::models::{Stack, VENDOR_TERRAFORM};
use spacebridge::migrate::access::{self, StackAction};
use spacebridge::migrate::{
    cancel_pair, CancelToken, MigrationError, MigrationPipeline, TransferState, TransferStep,
};
use spacebridge::ui::output::Verbosity;

fn stack(id: &str, name: &str) -> Stack {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "space": "root",
        "vendorType": VENDOR_TERRAFORM,
        "managesStateFile": true,
        "externalStateAccessEnabled": true,
    }))
    .unwrap()
}

fn source_stacks() -> Vec<Stack> {
    vec![
        stack("src-vpc", "vpc"),
        stack("src-dns", "dns"),
        stack("src-eks", "eks"),
    ]
}

fn destination() -> MockApi {
    MockApi::new().with_stacks(vec![
        stack("dst-vpc", "vpc"),
        stack("dst-dns", "dns"),
        stack("dst-eks", "eks"),
    ])
}

fn locks_and_unlocks(api: &MockApi) -> (Vec<String>, Vec<String>) {
    let mut locks = Vec::new();
    let mut unlocks = Vec::new();
    for op in api.operations() {
        match op {
            MockOperation::Lock { stack_id } => locks.push(stack_id),
            MockOperation::Unlock { stack_id } => unlocks.push(stack_id),
            _ => {}
        }
    }
    (locks, unlocks)
}

// =============================================================================
// Pipeline
// =============================================================================

mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn migrates_every_candidate() {
        let source = MockApi::new();
        let destination = destination();
        let blobs = MockBlobTransport::new().with_body("{\"version\":4}");

        let report = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .run(&source_stacks(), false)
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 0);
        assert!(report.into_result().is_ok());

        let (locks, unlocks) = locks_and_unlocks(&destination);
        assert_eq!(locks, vec!["dst-vpc", "dst-dns", "dst-eks"]);
        assert_eq!(locks, unlocks);

        let uploads: Vec<BlobCall> = blobs
            .calls()
            .into_iter()
            .filter(|c| matches!(c, BlobCall::Upload { .. }))
            .collect();
        assert_eq!(uploads.len(), 3);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_others() {
        let source = MockApi::new();
        let destination = destination().fail_on(
            FailOn::Import("dst-dns".into()),
            ApiError::GraphQl("state is corrupt".into()),
        );
        let blobs = MockBlobTransport::new().with_body("{}");

        let report = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .run(&source_stacks(), false)
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);

        let failed = report.results.iter().find(|r| r.name == "dns").unwrap();
        assert!(matches!(
            failed.outcome.state(),
            TransferState::Failed {
                at: TransferStep::Import,
                ..
            }
        ));
        assert!(failed.outcome.was_locked());

        // The failing stack was still unlocked.
        let (locks, unlocks) = locks_and_unlocks(&destination);
        assert_eq!(locks.len(), 3);
        assert_eq!(locks, unlocks);

        let err = report.into_result().unwrap_err();
        assert!(matches!(
            err,
            MigrationError::PartialFailure {
                failed: 1,
                succeeded: 2
            }
        ));
    }

    #[tokio::test]
    async fn download_url_failure_is_isolated() {
        let source = MockApi::new().fail_on(
            FailOn::StateDownloadUrl("src-dns".into()),
            ApiError::Http {
                status: 500,
                message: "Spacelift server error: boom".into(),
            },
        );
        let destination = destination();
        let blobs = MockBlobTransport::new().with_body("{}");

        let report = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .run(&source_stacks(), false)
            .await
            .unwrap();

        let names: Vec<(&str, bool)> = report
            .results
            .iter()
            .map(|r| (r.name.as_str(), r.outcome.succeeded()))
            .collect();
        assert_eq!(names, vec![("vpc", true), ("dns", false), ("eks", true)]);

        let (locks, _) = locks_and_unlocks(&destination);
        assert_eq!(locks, vec!["dst-vpc", "dst-eks"]);
    }

    #[tokio::test]
    async fn space_scope_leaves_child_spaces_alone() {
        use spacebridge::core::spaces::SpaceTree;
        use spacebridge::migrate::plan::stacks_in_scope;

        let spaces: Vec<spacebridge::core::models::Space> = serde_json::from_value(
            serde_json::json!([
                {"id": "root", "name": "root"},
                {"id": "infra-01H", "name": "infra", "parentSpace": "root"},
                {"id": "infra-prod-01J", "name": "infra-prod", "parentSpace": "infra-01H"}
            ]),
        )
        .unwrap();
        let mut app = stack("src-app", "app");
        app.space = "infra-01H".into();
        let mut db = stack("src-db", "db");
        db.space = "infra-prod-01J".into();

        let tree = SpaceTree::build(&spaces);
        let space_id = tree.resolve_filter_token("infra").unwrap().id.clone();
        let scoped = stacks_in_scope(&[app, db], Some(&space_id));
        assert_eq!(scoped.len(), 1);

        let source = MockApi::new();
        let destination = MockApi::new()
            .with_stacks(vec![stack("dst-app", "app"), stack("dst-db", "db")]);
        let blobs = MockBlobTransport::new().with_body("{}");

        let report = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .run(&scoped, false)
            .await
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].destination_id, "dst-app");
        assert_eq!(report.results[0].outcome.state(), &TransferState::Succeeded);
        let (locks, _) = locks_and_unlocks(&destination);
        assert_eq!(locks, vec!["dst-app"]);
    }

    #[tokio::test]
    async fn download_failure_never_locks() {
        let source = MockApi::new();
        let destination = destination();
        let blobs = MockBlobTransport::new().fail_download();

        let report = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .run(&source_stacks(), false)
            .await
            .unwrap();

        assert_eq!(report.failed(), 3);
        for result in &report.results {
            assert!(!result.outcome.was_locked());
            assert!(matches!(
                result.outcome.state(),
                TransferState::Failed {
                    at: TransferStep::Stream,
                    ..
                }
            ));
        }
        let (locks, _) = locks_and_unlocks(&destination);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn unmatched_and_unmanaged_stacks_are_not_transferred() {
        let mut unmanaged = stack("src-legacy", "legacy");
        unmanaged.manages_state_file = false;
        let mut no_access = stack("src-blocked", "blocked");
        no_access.external_state_access_enabled = false;

        let mut stacks = source_stacks();
        stacks.push(stack("src-new", "only-in-source"));
        stacks.push(unmanaged);
        stacks.push(no_access);

        let source = MockApi::new();
        let destination = destination().with_stacks(vec![
            stack("dst-vpc", "vpc"),
            stack("dst-dns", "dns"),
            stack("dst-eks", "eks"),
            stack("dst-legacy", "legacy"),
            stack("dst-blocked", "blocked"),
        ]);
        let blobs = MockBlobTransport::new();

        let report = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .run(&stacks, false)
            .await
            .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.plan.not_in_destination().count(), 1);
        assert_eq!(report.plan.skipped().count(), 1);
        assert_eq!(report.plan.no_access().count(), 1);

        let downloaded: Vec<MockOperation> = source
            .operations()
            .into_iter()
            .filter(|op| matches!(op, MockOperation::StateDownloadUrl { .. }))
            .collect();
        assert_eq!(downloaded.len(), 3);
    }

    #[tokio::test]
    async fn dry_run_issues_no_mutations() {
        let source = MockApi::new();
        let destination = destination();
        let blobs = MockBlobTransport::new();

        let report = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .run(&source_stacks(), true)
            .await
            .unwrap();

        assert!(report.dry_run);
        assert!(report.results.is_empty());
        assert_eq!(report.plan.candidates().count(), 3);
        assert_eq!(source.mutation_count(), 0);
        assert_eq!(destination.mutation_count(), 0);
        assert!(blobs.calls().is_empty());
    }

    #[tokio::test]
    async fn destination_listing_failure_is_fatal() {
        let source = MockApi::new();
        let destination =
            MockApi::new().fail_on(FailOn::ListStacks, ApiError::AuthFailed("bad key".into()));
        let blobs = MockBlobTransport::new();

        let err = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .run(&source_stacks(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Discovery(_)));
        assert_eq!(destination.mutation_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_during_import_still_unlocks() {
        let source = MockApi::new();
        let destination = destination().stall_on(FailOn::Import("dst-vpc".into()));
        let blobs = MockBlobTransport::new().with_body("{}");
        let (handle, token) = cancel_pair();

        let pipeline = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .with_cancel(token);
        let stacks = source_stacks();

        let (report, ()) = tokio::join!(pipeline.run(&stacks, false), async {
            tokio::task::yield_now().await;
            handle.cancel();
        });
        let report = report.unwrap();

        assert_eq!(report.succeeded(), 0);
        let first = &report.results[0];
        assert!(matches!(
            first.outcome.state(),
            TransferState::Failed {
                at: TransferStep::Import,
                ..
            }
        ));

        // Later stacks never start.
        for result in &report.results[1..] {
            assert!(!result.outcome.was_locked());
        }

        let (locks, unlocks) = locks_and_unlocks(&destination);
        assert_eq!(locks, vec!["dst-vpc"]);
        assert_eq!(unlocks, vec!["dst-vpc"]);
    }

    #[tokio::test]
    async fn cancelled_before_start_touches_nothing() {
        let source = MockApi::new();
        let destination = destination();
        let blobs = MockBlobTransport::new();
        let (handle, token) = cancel_pair();
        handle.cancel();

        let report = MigrationPipeline::new(&source, &destination, &blobs, Verbosity::Quiet)
            .with_cancel(token)
            .run(&source_stacks(), false)
            .await
            .unwrap();

        assert_eq!(report.failed(), 3);
        assert_eq!(destination.mutation_count(), 0);
        assert!(blobs.calls().is_empty());
    }
}

// =============================================================================
// Batch stack updates
// =============================================================================

mod access_tests {
    use super::*;

    fn disabled(id: &str) -> Stack {
        let mut s = stack(id, id);
        s.is_disabled = true;
        s
    }

    #[tokio::test]
    async fn enable_stacks_continues_past_failures() {
        let stacks = vec![disabled("a"), disabled("b"), disabled("c")];
        let api = MockApi::new()
            .with_stacks(stacks.clone())
            .fail_on(FailOn::EnableStack("b".into()), ApiError::RateLimited);

        let targets = access::disabled_stacks(&stacks);
        let report = access::apply(
            &api,
            StackAction::EnableStack,
            &targets,
            &CancelToken::never(),
            Verbosity::Quiet,
        )
        .await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert!(!api.stack("a").unwrap().is_disabled);
        assert!(api.stack("b").unwrap().is_disabled);
        assert!(!api.stack("c").unwrap().is_disabled);
    }

    #[tokio::test]
    async fn enable_access_only_targets_blocked_stacks() {
        let mut blocked = stack("blocked", "blocked");
        blocked.external_state_access_enabled = false;
        let mut unmanaged = stack("unmanaged", "unmanaged");
        unmanaged.external_state_access_enabled = false;
        unmanaged.manages_state_file = false;
        let stacks = vec![stack("ready", "ready"), blocked, unmanaged];

        let targets = access::stacks_needing_access(&stacks);
        let names: Vec<&str> = targets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["blocked"]);

        let api = MockApi::new().with_stacks(stacks.clone());
        let report = access::apply(
            &api,
            StackAction::EnableExternalStateAccess,
            &targets,
            &CancelToken::never(),
            Verbosity::Quiet,
        )
        .await;

        assert_eq!(report.succeeded(), 1);
        assert!(api.stack("blocked").unwrap().external_state_access_enabled);
        assert_eq!(api.mutation_count(), 1);
    }
}
