use tabula::{
    CollectionError, ColumnDef, Condition, Database, Record, Statement, TableDef, Value,
};
use time::OffsetDateTime;

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub(crate) struct User {
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) created_at: Option<OffsetDateTime>,
}

pub(crate) fn users_table(name: &'static str) -> TableDef {
    TableDef::new(name)
        .column(
            ColumnDef::new("id", Value::Int64(None))
                .primary_key()
                .auto_increment(),
        )
        .column(ColumnDef::new("name", Value::Varchar(None)).not_null())
        .column(
            ColumnDef::new("created_at", Value::TimestampWithTimezone(None))
                .default_current_timestamp(),
        )
}

pub(crate) async fn recreate<D: Database>(database: &D, table: &TableDef) {
    database
        .exec(&Statement::DropTable {
            name: &table.name,
            if_exists: true,
        })
        .await
        .expect("Failed to drop the table");
    database
        .exec(&Statement::CreateTable {
            table,
            if_not_exists: false,
        })
        .await
        .expect("Failed to create the table");
}

pub async fn users<D: Database>(database: &D) {
    let table = users_table("users");
    recreate(database, &table).await;
    let users = tabula::Collection::new(database.collection("users")).await;
    assert_eq!(users.primary_keys(), ["id"]);
    assert!(users.exists().await);

    // Generated key and default column come back into the item
    let mut ann = User {
        name: "Ann".into(),
        ..Default::default()
    };
    users
        .insert_returning(&mut ann)
        .await
        .expect("Failed to insert Ann");
    let ann_id = ann.id.expect("Ann should have received an id");
    assert_eq!(ann.name, "Ann");
    assert!(ann.created_at.is_some());

    let mut bob = User {
        name: "Bob".into(),
        ..Default::default()
    };
    users
        .insert_returning(&mut bob)
        .await
        .expect("Failed to insert Bob");
    assert_ne!(bob.id, Some(ann_id));

    // The item equals the stored row
    let mut stored = User::default();
    users
        .find([Condition::key(ann_id)])
        .one(&mut stored)
        .await
        .expect("Could not find Ann by key");
    assert_eq!(stored, ann);
    let all = users
        .find([])
        .all::<User>()
        .await
        .expect("Could not read the users");
    assert_eq!(all.len(), 2);
    assert!(all.contains(&bob));
    assert_eq!(
        users
            .find([Condition::equal("name", "Bob")])
            .count()
            .await
            .expect("Could not count Bob"),
        1
    );

    // A failed insert leaves the item untouched
    let mut duplicate = User {
        id: Some(ann_id),
        name: "Impostor".into(),
        created_at: None,
    };
    let before = duplicate.clone();
    assert!(users.insert_returning(&mut duplicate).await.is_err());
    assert_eq!(duplicate, before);

    // Nothing left behind by the failed insert
    assert_eq!(users.find([]).count().await.expect("Could not count"), 2);

    // Key lookups past the end
    let error = users
        .find([Condition::key(i64::MAX)])
        .one(&mut User::default())
        .await
        .expect_err("No user should have that id");
    assert!(matches!(
        error.downcast_ref::<CollectionError>(),
        Some(CollectionError::NoMoreRows { .. })
    ));

    // Looked up once, never again
    let first = users.primary_keys().to_vec();
    assert_eq!(users.primary_keys(), first.as_slice());
}
