use super::{create_test_service, signed_in, signed_in_admin};
use crate::auth::guard::{GuardError, Session};
use crate::core::errors::{ErrorKind, FreewiseError};
use crate::core::models::expense::NewExpense;

#[tokio::test]
async fn test_admin_lists_users_sorted_by_username() {
    let service = create_test_service();
    let admin = signed_in_admin(&service, "admin").await;
    signed_in(&service, "zoe").await;
    signed_in(&service, "bob").await;

    let users = service.get_all_users(&admin).await.unwrap();

    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["admin", "bob", "zoe"]);
}

#[tokio::test]
async fn test_plain_user_cannot_list() {
    let service = create_test_service();
    let bob = signed_in(&service, "bob").await;

    let err = service.get_all_users(&bob).await.unwrap_err();
    assert!(matches!(err, FreewiseError::Session(GuardError::NotAdmin)));
    assert_eq!(err.kind(), ErrorKind::Authorization);

    assert!(service.get_all_groups(&bob).await.is_err());
    assert!(service.get_all_group_memberships(&bob).await.is_err());
    assert!(service.get_all_expenses(&bob).await.is_err());
    assert!(service.get_all_expense_shares(&bob).await.is_err());
}

#[tokio::test]
async fn test_anonymous_admin_request_is_auth_error() {
    let service = create_test_service();

    let err = service.admin_overview(&Session::anonymous()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_admin_overview_sees_everything() {
    let service = create_test_service();
    let admin = signed_in_admin(&service, "admin").await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let flat = service.create_group(&alice, "Flat", None).await.unwrap();
    service.create_group(&bob, "Trip", None).await.unwrap();
    service.join_group(&bob, &flat.id).await.unwrap();
    service
        .create_expense(
            &alice,
            NewExpense {
                group_id: flat.id.clone(),
                description: "Rent".to_string(),
                amount: 900.0,
                currency: "EUR".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();

    let overview = service.admin_overview(&admin).await.unwrap();

    assert_eq!(overview.users.len(), 3);
    assert_eq!(overview.groups.len(), 2);
    assert_eq!(overview.memberships.len(), 3);
    assert_eq!(overview.expenses.len(), 1);
    assert!(overview.expense_shares.is_empty());
}
