use crate::users::{User, recreate, users_table};
use tabula::{Collection, Database, Statement};

pub async fn truncate<D: Database>(database: &D) {
    let table = users_table("visitors");
    recreate(database, &table).await;
    let visitors = Collection::new(database.collection("visitors")).await;
    for name in ["Eve", "Finn", "Gus"] {
        let mut visitor = User {
            name: name.into(),
            ..Default::default()
        };
        visitors
            .insert_returning(&mut visitor)
            .await
            .expect("Failed to insert a visitor");
    }
    assert_eq!(visitors.find([]).count().await.expect("Could not count"), 3);
    visitors
        .truncate()
        .await
        .expect("Failed to truncate visitors");
    assert_eq!(visitors.find([]).count().await.expect("Could not count"), 0);
    assert!(visitors.exists().await);

    // A table that is gone
    database
        .exec(&Statement::DropTable {
            name: "visitors",
            if_exists: false,
        })
        .await
        .expect("Failed to drop visitors");
    assert!(!visitors.exists().await);
    assert!(visitors.truncate().await.is_err());
    let missing = Collection::new(database.collection("visitors")).await;
    assert!(missing.primary_keys().is_empty());
    let mut visitor = User {
        name: "Hal".into(),
        ..Default::default()
    };
    assert!(missing.insert_returning(&mut visitor).await.is_err());
    assert_eq!(visitor.id, None);
}
