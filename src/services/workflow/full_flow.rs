//! Live-database scenarios for the completion path. Each test provisions the
//! dedicated test database and skips when none is reachable.

use crate::db::types::{ArchiveStatus, PersonRole, ReportStatus};
use crate::repositories;
use crate::services::workflow::{finalize, report, ReviewDecision, WorkflowError};
use crate::test_support;

#[tokio::test]
async fn card_generation_returns_the_same_card_on_repeat() {
    let _guard = test_support::env_lock();
    let Some(pool) = test_support::try_test_pool().await else { return };

    let student = test_support::insert_person(&pool, "student1", PersonRole::Student).await;
    let advisor = test_support::insert_person(&pool, "advisor1", PersonRole::Advisor).await;
    test_support::insert_active_period(&pool).await;
    let proposal =
        test_support::insert_accepted_proposal(&pool, &student, &advisor, None).await;
    test_support::accept_all_chapters(&pool, &proposal.id, &advisor.id).await;
    test_support::insert_accepted_report(&pool, &proposal.id, &advisor.id).await;

    let (first, record) = finalize::generate_supervision_card(&pool, &advisor, &proposal.id)
        .await
        .expect("first card");
    assert!(record.is_some());
    assert_eq!(first.card_number, "TS/student1/2025/2026");

    let (second, record) = finalize::generate_supervision_card(&pool, &advisor, &proposal.id)
        .await
        .expect("repeat call");
    assert!(record.is_none());
    assert_eq!(second.id, first.id);
    assert_eq!(second.card_number, first.card_number);
}

#[tokio::test]
async fn archiving_twice_reports_already_archived() {
    let _guard = test_support::env_lock();
    let Some(pool) = test_support::try_test_pool().await else { return };

    let student = test_support::insert_person(&pool, "student2", PersonRole::Student).await;
    let advisor = test_support::insert_person(&pool, "advisor2", PersonRole::Advisor).await;
    let proposal =
        test_support::insert_accepted_proposal(&pool, &student, &advisor, None).await;
    test_support::accept_all_chapters(&pool, &proposal.id, &advisor.id).await;
    test_support::insert_accepted_report(&pool, &proposal.id, &advisor.id).await;

    let (archive, _record) = finalize::create_archive_record(&pool, &advisor, &proposal.id)
        .await
        .expect("archive");
    assert_eq!(archive.status, ArchiveStatus::Completed);
    assert_eq!(archive.final_file_ref.as_deref(), Some("theses/fixture/final.pdf"));

    let err = finalize::create_archive_record(&pool, &advisor, &proposal.id)
        .await
        .expect_err("second archive");
    assert!(matches!(err, WorkflowError::AlreadyArchived));
}

#[tokio::test]
async fn accepting_the_final_report_archives_a_complete_thesis() {
    let _guard = test_support::env_lock();
    let Some(pool) = test_support::try_test_pool().await else { return };

    let student = test_support::insert_person(&pool, "student3", PersonRole::Student).await;
    let advisor = test_support::insert_person(&pool, "advisor3", PersonRole::Advisor).await;
    let proposal =
        test_support::insert_accepted_proposal(&pool, &student, &advisor, None).await;
    test_support::accept_all_chapters(&pool, &proposal.id, &advisor.id).await;
    let pending = test_support::insert_pending_report(&pool, &proposal.id).await;

    let (reviewed, archive, _record) =
        report::review_final_report(&pool, &advisor, &pending.id, ReviewDecision::Accepted, None)
            .await
            .expect("review");

    assert_eq!(reviewed.status, ReportStatus::Accepted);
    assert!(reviewed.verified_at.is_some());

    let archive = archive.expect("acceptance completed the thesis");
    assert_eq!(archive.proposal_id, proposal.id);
    assert!(repositories::archives::exists_by_proposal(&pool, &proposal.id)
        .await
        .expect("archive lookup"));
}

#[tokio::test]
async fn concurrent_archive_calls_serialize_on_the_proposal_lock() {
    let _guard = test_support::env_lock();
    let Some(pool) = test_support::try_test_pool().await else { return };

    let student = test_support::insert_person(&pool, "student4", PersonRole::Student).await;
    let advisor = test_support::insert_person(&pool, "advisor4", PersonRole::Advisor).await;
    let proposal =
        test_support::insert_accepted_proposal(&pool, &student, &advisor, None).await;
    test_support::accept_all_chapters(&pool, &proposal.id, &advisor.id).await;
    test_support::insert_accepted_report(&pool, &proposal.id, &advisor.id).await;

    // Both transactions fight over the proposal row lock; exactly one wins
    // the insert, the loser must observe it after the winner commits.
    let (a, b) = tokio::join!(
        finalize::create_archive_record(&pool, &advisor, &proposal.id),
        finalize::create_archive_record(&pool, &advisor, &proposal.id),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(err, WorkflowError::AlreadyArchived));
        }
    }
}
