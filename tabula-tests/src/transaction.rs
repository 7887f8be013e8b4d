use crate::users::{User, recreate, users_table};
use tabula::{Collection, Database, Transaction};

pub async fn transaction<D: Database>(database: &D) {
    let table = users_table("members");
    recreate(database, &table).await;
    let members = Collection::new(database.collection("members")).await;

    // Rolled back by its owner, the insert disappears
    let transaction = database
        .begin()
        .await
        .expect("Could not begin a transaction");
    assert!(transaction.in_transaction());
    {
        let inside = Collection::new(transaction.collection("members")).await;
        let mut carl = User {
            name: "Carl".into(),
            ..Default::default()
        };
        inside
            .insert_returning(&mut carl)
            .await
            .expect("Failed to insert Carl inside the transaction");
        assert!(carl.id.is_some());
        assert!(carl.created_at.is_some());
        // Still open, the collection did not resolve it
        assert!(transaction.in_transaction());
        assert_eq!(
            inside.find([]).count().await.expect("Could not count"),
            1
        );
    }
    transaction
        .rollback()
        .await
        .expect("Failed to rollback the transaction");
    assert_eq!(members.find([]).count().await.expect("Could not count"), 0);

    // Committed by its owner, the insert stays
    let transaction = database
        .begin()
        .await
        .expect("Could not begin a transaction");
    let mut dana = User {
        name: "Dana".into(),
        ..Default::default()
    };
    {
        let inside = Collection::new(transaction.collection("members")).await;
        inside
            .insert_returning(&mut dana)
            .await
            .expect("Failed to insert Dana inside the transaction");
    }
    transaction
        .commit()
        .await
        .expect("Failed to commit the transaction");
    let mut stored = User::default();
    members
        .find([tabula::Condition::key(dana.id.expect("Dana should have an id"))])
        .one(&mut stored)
        .await
        .expect("Could not find Dana");
    assert_eq!(stored, dana);
}
