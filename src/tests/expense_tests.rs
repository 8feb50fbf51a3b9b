use super::{create_test_service, signed_in};
use crate::core::errors::FreewiseError;
use crate::core::models::expense::{ExpenseShare, ExpenseUpdate, NewExpense};
use crate::core::models::group::LeaveOutcome;
use crate::infrastructure::storage::Storage;
use chrono::{TimeZone, Utc};

fn expense(group_id: &str, amount: f64, currency: &str) -> NewExpense {
    NewExpense {
        group_id: group_id.to_string(),
        description: "Groceries".to_string(),
        amount,
        currency: currency.to_string(),
        date: None,
    }
}

fn update(amount: f64) -> ExpenseUpdate {
    ExpenseUpdate {
        description: "Groceries and wine".to_string(),
        amount,
        currency: "EUR".to_string(),
    }
}

#[tokio::test]
async fn test_create_expense_sets_caller_as_payer() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let group = service.create_group(&alice, "Flat", None).await.unwrap();

    let created = service
        .create_expense(&alice, expense(&group.id, 30.0, "eur"))
        .await
        .unwrap();

    assert_eq!(created.paid_by_id, alice.verify().unwrap().id);
    assert_eq!(created.currency, "EUR");
    assert_eq!(created.created_at, created.updated_at);
}

#[tokio::test]
async fn test_create_expense_keeps_given_date() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let group = service.create_group(&alice, "Flat", None).await.unwrap();
    let date = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let mut input = expense(&group.id, 12.0, "EUR");
    input.date = Some(date);
    let created = service.create_expense(&alice, input).await.unwrap();

    assert_eq!(created.date, date);
}

#[tokio::test]
async fn test_non_member_cannot_add_expense() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let mallory = signed_in(&service, "mallory").await;
    let group = service.create_group(&alice, "Flat", None).await.unwrap();

    let err = service
        .create_expense(&mallory, expense(&group.id, 10.0, "EUR"))
        .await
        .unwrap_err();

    assert!(matches!(err, FreewiseError::NotAMember(_)));
    assert!(service.storage().list_expenses().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expense_amount_validation() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let group = service.create_group(&alice, "Flat", None).await.unwrap();

    for amount in [0.0, -5.0, 1_000_000.01, 10.005, f64::NAN] {
        let result = service.create_expense(&alice, expense(&group.id, amount, "EUR")).await;
        assert!(
            matches!(result, Err(FreewiseError::InvalidInput(ref field, _)) if field == "amount"),
            "amount {} should be rejected",
            amount
        );
    }
    assert!(service
        .create_expense(&alice, expense(&group.id, 0.1 + 0.2, "EUR"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_expense_currency_validation() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let group = service.create_group(&alice, "Flat", None).await.unwrap();

    for currency in ["", "EURO", "E1R"] {
        let result = service.create_expense(&alice, expense(&group.id, 5.0, currency)).await;
        assert!(matches!(result, Err(FreewiseError::InvalidInput(ref field, _)) if field == "currency"));
    }
}

#[tokio::test]
async fn test_only_payer_can_edit_expense() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let group = service.create_group(&alice, "Flat", None).await.unwrap();
    service.join_group(&bob, &group.id).await.unwrap();
    let created = service
        .create_expense(&alice, expense(&group.id, 30.0, "EUR"))
        .await
        .unwrap();

    let denied = service.update_expense(&bob, &created.id, update(1.0)).await;
    assert!(matches!(denied, Err(FreewiseError::NotOwner(_))));
    let untouched = service.storage().get_expense(&created.id).await.unwrap().unwrap();
    assert_eq!(untouched, created);

    let edited = service.update_expense(&alice, &created.id, update(45.0)).await.unwrap();
    assert_eq!(edited.amount, 45.0);
    assert_eq!(edited.description, "Groceries and wine");
    assert_eq!(edited.paid_by_id, created.paid_by_id);
    assert!(edited.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_edit_unknown_expense() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;

    assert!(matches!(
        service.update_expense(&alice, "missing", update(10.0)).await,
        Err(FreewiseError::ExpenseNotFound(_))
    ));
    assert!(matches!(
        service.delete_expense(&alice, "missing").await,
        Err(FreewiseError::ExpenseNotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_expense_removes_its_shares() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let group = service.create_group(&alice, "Flat", None).await.unwrap();
    service.join_group(&bob, &group.id).await.unwrap();
    let created = service
        .create_expense(&alice, expense(&group.id, 30.0, "EUR"))
        .await
        .unwrap();
    let kept = service
        .create_expense(&alice, expense(&group.id, 8.0, "EUR"))
        .await
        .unwrap();
    for (expense_id, user) in [(&created.id, "a"), (&created.id, "b"), (&kept.id, "b")] {
        service
            .storage()
            .create_expense_share(ExpenseShare {
                id: format!("{}-{}", expense_id, user),
                expense_id: expense_id.clone(),
                user_id: user.to_string(),
                amount: 15.0,
                is_paid: false,
                paid_at: None,
            })
            .await
            .unwrap();
    }

    assert!(matches!(
        service.delete_expense(&bob, &created.id).await,
        Err(FreewiseError::NotOwner(_))
    ));
    service.delete_expense(&alice, &created.id).await.unwrap();

    assert!(service.storage().get_expense(&created.id).await.unwrap().is_none());
    let shares = service.storage().list_expense_shares().await.unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].expense_id, kept.id);
}

/// Two users share a group, one pays, both leave in turn.
#[tokio::test]
async fn test_shared_group_lifecycle() {
    let service = create_test_service();
    let alice = signed_in(&service, "alice").await;
    let group = service.create_group(&alice, "G", None).await.unwrap();
    let bob = signed_in(&service, "bob").await;
    service.join_group(&bob, &group.id).await.unwrap();

    let paid = service
        .create_expense(&alice, expense(&group.id, 30.0, "EUR"))
        .await
        .unwrap();
    assert!(matches!(
        service.update_expense(&bob, &paid.id, update(45.0)).await,
        Err(FreewiseError::NotOwner(_))
    ));
    let edited = service.update_expense(&alice, &paid.id, update(45.0)).await.unwrap();
    assert_eq!(edited.amount, 45.0);

    assert_eq!(
        service.leave_group(&bob, &group.id).await.unwrap(),
        LeaveOutcome::Left { remaining_members: 1 }
    );
    let detail = service.get_group(&alice, &group.id).await.unwrap();
    assert_eq!(detail.expenses.len(), 1);

    assert_eq!(
        service.leave_group(&alice, &group.id).await.unwrap(),
        LeaveOutcome::GroupDeleted { expenses_removed: 1 }
    );
    assert!(service.storage().get_group(&group.id).await.unwrap().is_none());
    assert!(service.storage().get_expense(&paid.id).await.unwrap().is_none());
}
