use super::{create_test_service, signed_in};
use crate::core::errors::FreewiseError;
use crate::core::models::expense::NewExpense;
use crate::core::models::group::LeaveOutcome;
use crate::infrastructure::storage::Storage;

fn expense(group_id: &str, description: &str, amount: f64) -> NewExpense {
    NewExpense {
        group_id: group_id.to_string(),
        description: description.to_string(),
        amount,
        currency: "EUR".to_string(),
        date: None,
    }
}

#[tokio::test]
async fn test_create_group_makes_creator_sole_member() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let alice_id = alice.verify().unwrap().id.clone();

    let group = service
        .create_group(&alice, "  Weekend Trip ", Some("Lisbon"))
        .await
        .unwrap();

    assert_eq!(group.name, "Weekend Trip");
    assert_eq!(group.description.as_deref(), Some("Lisbon"));
    let members = service.storage().list_group_members(&group.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, alice_id);
}

#[tokio::test]
async fn test_create_group_rejects_blank_name() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;

    let err = service.create_group(&alice, "   ", None).await.unwrap_err();

    assert!(matches!(err, FreewiseError::InvalidInput(ref field, _) if field == "name"));
    assert!(service.storage().list_groups().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_group_requires_membership() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let mallory = signed_in(&service, "mallory").await;
    let group = service.create_group(&alice, "Trip", None).await.unwrap();

    assert!(matches!(
        service.get_group(&mallory, &group.id).await,
        Err(FreewiseError::NotAMember(_))
    ));
    assert!(matches!(
        service.get_group(&alice, "missing").await,
        Err(FreewiseError::NotAMember(_))
    ));
}

#[tokio::test]
async fn test_get_group_hides_whether_group_exists() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let mallory = signed_in(&service, "mallory").await;
    let group = service.create_group(&alice, "Trip", None).await.unwrap();

    let existing = service.get_group(&mallory, &group.id).await.unwrap_err();
    let unknown = service.get_group(&mallory, "no-such-group").await.unwrap_err();

    assert!(matches!(existing, FreewiseError::NotAMember(_)));
    assert!(matches!(unknown, FreewiseError::NotAMember(_)));
    assert_eq!(existing.code(), unknown.code());
    assert_eq!(existing.kind(), unknown.kind());
}

#[tokio::test]
async fn test_get_group_resolves_member_and_payer_names() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let group = service.create_group(&alice, "Trip", None).await.unwrap();
    service.join_group(&bob, &group.id).await.unwrap();
    service
        .create_expense(&bob, expense(&group.id, "Dinner", 42.5))
        .await
        .unwrap();

    let detail = service.get_group(&alice, &group.id).await.unwrap();

    let mut names: Vec<_> = detail.members.iter().map(|m| m.username.as_str()).collect();
    names.sort();
    assert_eq!(names, ["alice", "bob"]);
    assert_eq!(detail.expenses.len(), 1);
    assert_eq!(detail.expenses[0].paid_by_username, "bob");
    assert_eq!(detail.expenses[0].expense.amount, 42.5);
}

#[tokio::test]
async fn test_join_group_twice_conflicts() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let group = service.create_group(&alice, "Trip", None).await.unwrap();

    service.join_group(&bob, &group.id).await.unwrap();
    let again = service.join_group(&bob, &group.id).await;

    assert!(matches!(again, Err(FreewiseError::AlreadyMember(_))));
    assert_eq!(service.storage().list_group_members(&group.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_join_unknown_group() {
    let service = create_test_service();
    let bob = signed_in(&service, "bob").await;

    assert!(matches!(
        service.join_group(&bob, "no-such-group").await,
        Err(FreewiseError::GroupNotFound(_))
    ));
}

#[tokio::test]
async fn test_leave_group_requires_membership() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let group = service.create_group(&alice, "Trip", None).await.unwrap();

    assert!(matches!(
        service.leave_group(&bob, &group.id).await,
        Err(FreewiseError::NotAMember(_))
    ));
    assert!(service.storage().get_group(&group.id).await.unwrap().is_some());
}

// Bob leaving a two-member group leaves Alice behind, so the group stays.
// Deletion waits until nobody remains, as in the walkthrough where B leaves
// and G persists, then A leaves and G is gone.
#[tokio::test]
async fn test_group_survives_while_members_remain() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let group = service.create_group(&alice, "Trip", None).await.unwrap();
    service.join_group(&bob, &group.id).await.unwrap();
    service
        .create_expense(&alice, expense(&group.id, "Tickets", 30.0))
        .await
        .unwrap();

    let outcome = service.leave_group(&bob, &group.id).await.unwrap();

    assert_eq!(outcome, LeaveOutcome::Left { remaining_members: 1 });
    assert!(service.storage().get_group(&group.id).await.unwrap().is_some());
    assert_eq!(service.storage().list_group_expenses(&group.id).await.unwrap().len(), 1);
    assert!(matches!(
        service.get_group(&bob, &group.id).await,
        Err(FreewiseError::NotAMember(_))
    ));
}

#[tokio::test]
async fn test_one_of_three_leaving_keeps_group_and_expenses() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let carol = signed_in(&service, "carol").await;
    let group = service.create_group(&alice, "Trip", None).await.unwrap();
    service.join_group(&bob, &group.id).await.unwrap();
    service.join_group(&carol, &group.id).await.unwrap();
    service
        .create_expense(&alice, expense(&group.id, "Tickets", 30.0))
        .await
        .unwrap();
    service
        .create_expense(&carol, expense(&group.id, "Snacks", 9.5))
        .await
        .unwrap();

    let outcome = service.leave_group(&carol, &group.id).await.unwrap();

    assert_eq!(outcome, LeaveOutcome::Left { remaining_members: 2 });
    assert!(service.storage().get_group(&group.id).await.unwrap().is_some());
    assert_eq!(service.storage().list_group_members(&group.id).await.unwrap().len(), 2);
    let detail = service.get_group(&bob, &group.id).await.unwrap();
    assert_eq!(detail.expenses.len(), 2);
    assert!(detail.expenses.iter().any(|e| e.paid_by_username == "carol"));

    let outcome = service.leave_group(&bob, &group.id).await.unwrap();
    assert_eq!(outcome, LeaveOutcome::Left { remaining_members: 1 });
    assert_eq!(service.storage().list_group_expenses(&group.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_last_member_leaving_deletes_group_and_expenses() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let group = service.create_group(&alice, "Trip", None).await.unwrap();
    service
        .create_expense(&alice, expense(&group.id, "Tickets", 30.0))
        .await
        .unwrap();
    service
        .create_expense(&alice, expense(&group.id, "Hotel", 120.0))
        .await
        .unwrap();

    let outcome = service.leave_group(&alice, &group.id).await.unwrap();

    assert_eq!(outcome, LeaveOutcome::GroupDeleted { expenses_removed: 2 });
    assert!(service.storage().get_group(&group.id).await.unwrap().is_none());
    assert!(service.storage().list_expenses().await.unwrap().is_empty());
    assert!(service.storage().list_memberships().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_leave_outcome_wire_shape() {
    let json = serde_json::to_value(LeaveOutcome::Left { remaining_members: 2 }).unwrap();
    assert_eq!(json["outcome"], "left");
    assert_eq!(json["remaining_members"], 2);

    let json = serde_json::to_value(LeaveOutcome::GroupDeleted { expenses_removed: 0 }).unwrap();
    assert_eq!(json["outcome"], "group_deleted");
}
