use crate::users::recreate;
use tabula::{Collection, CollectionError, ColumnDef, Database, Error, Record, TableDef, Value};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct LogLine {
    message: String,
    level: i32,
}

fn assert_missing_key(error: &Error) {
    let Some(CollectionError::MissingKey { table }) = error.downcast_ref::<CollectionError>()
    else {
        panic!("Expected a missing key error, got: {:#}", error);
    };
    assert_eq!(table, "logs");
    assert!(error.to_string().contains("primary key"));
}

pub async fn logs<D: Database>(database: &D) {
    let table = TableDef::new("logs")
        .column(ColumnDef::new("message", Value::Varchar(None)).not_null())
        .column(ColumnDef::new("level", Value::Int32(None)));
    recreate(database, &table).await;
    let logs = Collection::new(database.collection("logs")).await;
    assert!(logs.primary_keys().is_empty());

    // Own transaction: the missing key cancels it, the insert is rolled back
    let mut line = LogLine {
        message: "disk almost full".into(),
        level: 3,
    };
    let before = line.clone();
    let error = logs
        .insert_returning(&mut line)
        .await
        .expect_err("A table without primary key cannot be read back");
    assert_missing_key(&error);
    assert_eq!(line, before);
    assert_eq!(logs.find([]).count().await.expect("Could not count"), 0);

    #[cfg(not(feature = "disable-transactions"))]
    {
        use tabula::{Condition, Transaction};

        // Caller's transaction: the row stays, its owner decides
        let transaction = database
            .begin()
            .await
            .expect("Could not begin a transaction");
        {
            let inside = Collection::new(transaction.collection("logs")).await;
            let error = inside
                .insert_returning(&mut line)
                .await
                .expect_err("A table without primary key cannot be read back");
            assert_missing_key(&error);
            assert_eq!(line, before);
            let stored = inside
                .find([Condition::equal("message", "disk almost full")])
                .all::<LogLine>()
                .await
                .expect("Could not read the logs");
            assert_eq!(stored, [before.clone()]);
        }
        transaction
            .commit()
            .await
            .expect("Failed to commit the transaction");
        let stored = logs
            .find([Condition::equal("level", 3)])
            .all::<LogLine>()
            .await
            .expect("Could not read the logs");
        assert_eq!(stored, [before]);
    }
}
