#[cfg(test)]
mod tests {
    use tabula::{
        AsValue, Collection, CollectionError, ColumnDef, Condition, Connection, Database, Error,
        Record, Result, Statement, TableDef, Transaction, Value,
    };
    use tabula_memory::{MemoryDatabase, Operation};
    use tabula_tests::{execute_tests, init_logs, silent_logs};
    use time::OffsetDateTime;

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Order {
        id: Option<i64>,
        product: String,
        quantity: i32,
        placed_at: Option<OffsetDateTime>,
    }

    impl Order {
        fn new(product: &str, quantity: i32) -> Self {
            Self {
                product: product.into(),
                quantity,
                ..Default::default()
            }
        }
    }

    #[derive(Record, Default)]
    struct Unstructured {}

    async fn database() -> MemoryDatabase {
        let database = MemoryDatabase::connect("memory://orders")
            .await
            .expect("Could not open the database");
        let table = TableDef::new("orders")
            .column(
                ColumnDef::new("id", Value::Int64(None))
                    .primary_key()
                    .auto_increment(),
            )
            .column(ColumnDef::new("product", Value::Varchar(None)).not_null())
            .column(ColumnDef::new("quantity", Value::Int32(None)).default_value(1))
            .column(
                ColumnDef::new("placed_at", Value::TimestampWithTimezone(None))
                    .default_current_timestamp(),
            );
        database
            .exec(&Statement::CreateTable {
                table: &table,
                if_not_exists: false,
            })
            .await
            .expect("Could not create the orders table");
        database
    }

    async fn count(database: &MemoryDatabase) -> u64 {
        database
            .table("orders")
            .await
            .find([])
            .count()
            .await
            .expect("Could not count the orders")
    }

    #[tokio::test]
    async fn memory() {
        init_logs();
        let connection = MemoryDatabase::connect("memory://suite")
            .await
            .expect("Could not open the database");
        execute_tests(connection).await;
    }

    #[tokio::test]
    async fn invalid_argument_makes_no_calls() {
        init_logs();
        let database = database().await;
        let orders = database.table("orders").await;
        database.reset_stats();
        let error = silent_logs! {
            orders
                .insert_returning(&mut Unstructured {})
                .await
                .expect_err("Should reject a record without fields")
        };
        assert!(matches!(
            error.downcast_ref::<CollectionError>(),
            Some(CollectionError::InvalidArgument { .. })
        ));
        assert_eq!(database.stats().total(), 0);
    }

    #[tokio::test]
    async fn primary_keys_are_looked_up_once() {
        init_logs();
        let database = database().await;
        database.reset_stats();
        let orders = database.table("orders").await;
        assert_eq!(database.stats().get(Operation::PrimaryKeys), 1);
        for _ in 0..3 {
            assert_eq!(orders.primary_keys(), ["id"]);
        }
        let mut order = Order::new("pen", 2);
        orders
            .insert_returning(&mut order)
            .await
            .expect("Failed to insert");
        let _ = orders.find([Condition::key(1)]).count().await;
        assert_eq!(database.stats().get(Operation::PrimaryKeys), 1);
    }

    #[tokio::test]
    async fn owned_transaction_commits() {
        init_logs();
        let database = database().await;
        let orders = database.table("orders").await;
        database.reset_stats();
        let mut order = Order::new("lamp", 0);
        orders
            .insert_returning(&mut order)
            .await
            .expect("Failed to insert");
        assert_eq!(order.id, Some(1));
        // Explicit zero is kept, defaults only fill nulls
        assert_eq!(order.quantity, 0);
        assert!(order.placed_at.is_some());
        let stats = database.stats();
        assert_eq!(stats.get(Operation::Begin), 1);
        assert_eq!(stats.get(Operation::Insert), 1);
        assert_eq!(stats.get(Operation::Select), 1);
        assert_eq!(stats.get(Operation::Commit), 1);
        assert_eq!(stats.get(Operation::Rollback), 0);
        assert!(!database.in_transaction());
    }

    #[tokio::test]
    async fn ambient_transaction_is_left_to_its_owner() {
        init_logs();
        let database = database().await;
        let transaction = database.begin().await.expect("Could not begin");
        let orders = Collection::new(transaction.collection("orders")).await;
        database.reset_stats();
        let mut order = Order::new("desk", 1);
        orders
            .insert_returning(&mut order)
            .await
            .expect("Failed to insert");
        assert!(order.id.is_some());
        database.fail_next(Operation::Select, "connection reset");
        let mut second = Order::new("chair", 4);
        let error = silent_logs! {
            orders
                .insert_returning(&mut second)
                .await
                .expect_err("The readback was told to fail")
        };
        assert!(format!("{:#}", error).contains("connection reset"));
        assert_eq!(second, Order::new("chair", 4));
        let stats = database.stats();
        assert_eq!(stats.get(Operation::Begin), 0);
        assert_eq!(stats.get(Operation::Commit), 0);
        assert_eq!(stats.get(Operation::Rollback), 0);
        assert!(transaction.in_transaction());
        // The owner decides
        assert_eq!(orders.find([]).count().await.expect("Could not count"), 2);
        drop(orders);
        transaction.commit().await.expect("Could not commit");
        assert_eq!(count(&database).await, 2);
    }

    #[tokio::test]
    async fn readback_failure_rolls_back() {
        init_logs();
        let database = database().await;
        let orders = database.table("orders").await;
        database.reset_stats();
        database.fail_next(Operation::Select, "timeout");
        let mut order = Order::new("mug", 3);
        let error = silent_logs! {
            orders
                .insert_returning(&mut order)
                .await
                .expect_err("The readback was told to fail")
        };
        assert!(format!("{:#}", error).contains("timeout"));
        assert_eq!(order, Order::new("mug", 3));
        let stats = database.stats();
        assert_eq!(stats.get(Operation::Insert), 1);
        assert_eq!(stats.get(Operation::Rollback), 1);
        assert_eq!(stats.get(Operation::Commit), 0);
        assert_eq!(count(&database).await, 0);
    }

    #[tokio::test]
    async fn commit_failure_leaves_the_item() {
        init_logs();
        let database = database().await;
        let orders = database.table("orders").await;
        database.fail_next(Operation::Commit, "disk full");
        let mut order = Order::new("book", 1);
        let error = silent_logs! {
            orders
                .insert_returning(&mut order)
                .await
                .expect_err("The commit was told to fail")
        };
        assert!(format!("{:#}", error).contains("disk full"));
        assert_eq!(order, Order::new("book", 1));
        assert_eq!(count(&database).await, 0);
        // Released, the next insert goes through
        orders
            .insert_returning(&mut order)
            .await
            .expect("Failed to insert after a failed commit");
        assert!(order.id.is_some());
    }

    #[tokio::test]
    async fn rollback_failure_reports_the_insert_error() {
        init_logs();
        let database = database().await;
        let orders = database.table("orders").await;
        database.fail_next(Operation::Insert, "constraint violated");
        database.fail_next(Operation::Rollback, "rollback lost");
        let mut order = Order::new("cup", 1);
        let error = silent_logs! {
            orders
                .insert_returning(&mut order)
                .await
                .expect_err("The insert was told to fail")
        };
        let message = format!("{:#}", error);
        assert!(message.contains("constraint violated"), "{}", message);
        assert!(!message.contains("rollback lost"), "{}", message);
        assert_eq!(order, Order::new("cup", 1));
        assert_eq!(database.stats().get(Operation::Rollback), 1);
        // The transaction was released anyway
        orders
            .insert_returning(&mut order)
            .await
            .expect("Failed to insert after a failed rollback");
    }

    #[tokio::test]
    async fn open_transaction_locks_other_writers() {
        init_logs();
        let database = database().await;
        let other = database.new_session();
        let transaction = database.begin().await.expect("Could not begin");
        {
            let inside = Collection::new(transaction.collection("orders")).await;
            inside
                .insert_returning(&mut Order::new("fork", 6))
                .await
                .expect("Failed to insert inside the transaction");
        }
        let outside = other.table("orders").await;
        let error = silent_logs! {
            outside
                .insert_returning(&mut Order::new("knife", 6))
                .await
                .expect_err("The database is locked")
        };
        assert!(format!("{:#}", error).contains("database is locked"));
        assert!(silent_logs! { other.begin().await.is_err() });
        // Readers see the last committed state
        assert!(outside.exists().await);
        assert_eq!(outside.find([]).count().await.expect("Could not count"), 0);
        // Dropping discards the work and releases the lock
        drop(transaction);
        assert_eq!(outside.find([]).count().await.expect("Could not count"), 0);
        outside
            .insert_returning(&mut Order::new("spoon", 6))
            .await
            .expect("Failed to insert once unlocked");
        assert_eq!(count(&database).await, 1);
    }

    #[tokio::test]
    async fn nested_transactions_are_rejected() {
        init_logs();
        let database = database().await;
        let transaction = database.begin().await.expect("Could not begin");
        assert!(silent_logs! { transaction.begin().await.is_err() });
        transaction.rollback().await.expect("Could not rollback");
        assert!(silent_logs! { database.new_session().commit().await.is_err() });
    }

    #[tokio::test]
    async fn catalog_failures_are_swallowed() {
        init_logs();
        let database = database().await;
        database.fail_next(Operation::PrimaryKeys, "catalog unavailable");
        let orders = database.table("orders").await;
        assert!(orders.primary_keys().is_empty());
        database.fail_next(Operation::TableExists, "catalog unavailable");
        assert!(!orders.exists().await);
        assert!(orders.exists().await);
        // Without a primary key the readback cannot find the row
        let error = silent_logs! {
            orders
                .insert_returning(&mut Order::new("clip", 1))
                .await
                .expect_err("The key cannot be resolved")
        };
        assert!(error.downcast_ref::<CollectionError>().is_none());
        assert_eq!(count(&database).await, 0);
    }

    #[tokio::test]
    async fn sequence_start_from_url() {
        init_logs();
        let database = MemoryDatabase::connect("memory://shop?sequence_start=500")
            .await
            .expect("Could not open the database");
        assert_eq!(database.config().name, "shop");
        let table = TableDef::new("tickets").column(
            ColumnDef::new("id", Value::Int32(None))
                .primary_key()
                .auto_increment(),
        );
        database
            .exec(&Statement::CreateTable {
                table: &table,
                if_not_exists: true,
            })
            .await
            .expect("Could not create tickets");

        #[derive(Record, Default, Debug)]
        struct Ticket {
            id: Option<i32>,
        }
        let tickets = database.table("tickets").await;
        let mut ticket = Ticket::default();
        tickets
            .insert_returning(&mut ticket)
            .await
            .expect("Failed to insert a ticket");
        assert_eq!(ticket.id, Some(500));
    }

    /// A voucher handed out to a customer can no longer change its code.
    #[derive(Default, Debug, Clone, PartialEq)]
    struct Voucher {
        id: Option<i64>,
        code: String,
        issued: bool,
    }

    impl Record for Voucher {
        fn field_names() -> &'static [&'static str] {
            &["id", "code"]
        }
        fn describe_fields(&self) -> Vec<(&'static str, Value)> {
            vec![("id", self.id.as_value()), ("code", self.code.clone().as_value())]
        }
        fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
            match name {
                "id" => self.id = AsValue::try_from_value(value)?,
                "code" if self.issued => return Err(Error::msg("Voucher already issued")),
                "code" => self.code = AsValue::try_from_value(value)?,
                _ => return Err(Error::msg(format!("Voucher has no field `{}`", name))),
            }
            Ok(())
        }
    }

    async fn vouchers(database: &MemoryDatabase) {
        let table = TableDef::new("vouchers")
            .column(
                ColumnDef::new("id", Value::Int64(None))
                    .primary_key()
                    .auto_increment(),
            )
            .column(ColumnDef::new("code", Value::Varchar(None)).not_null());
        database
            .exec(&Statement::CreateTable {
                table: &table,
                if_not_exists: false,
            })
            .await
            .expect("Could not create the vouchers table");
    }

    #[tokio::test]
    async fn failed_merge_after_commit_keeps_the_row() {
        init_logs();
        let database = database().await;
        vouchers(&database).await;
        let vouchers = database.table("vouchers").await;
        database.reset_stats();
        let mut voucher = Voucher {
            id: None,
            code: "WELCOME".into(),
            issued: true,
        };
        let before = voucher.clone();
        let error = silent_logs! {
            vouchers
                .insert_returning(&mut voucher)
                .await
                .expect_err("The merge cannot change an issued voucher")
        };
        assert!(format!("{:#}", error).contains("Voucher already issued"));
        // The id was assigned first and restored with the rest
        assert_eq!(voucher, before);
        // Committed before the merge, the row stays
        assert_eq!(database.stats().get(Operation::Commit), 1);
        assert_eq!(database.stats().get(Operation::Rollback), 0);
        let stored = vouchers
            .find([Condition::equal("code", "WELCOME")])
            .all::<Voucher>()
            .await
            .expect("Could not read the vouchers");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, Some(1));
    }

    #[tokio::test]
    async fn failed_merge_in_ambient_transaction() {
        init_logs();
        let database = database().await;
        vouchers(&database).await;
        let transaction = database.begin().await.expect("Could not begin");
        {
            let inside = Collection::new(transaction.collection("vouchers")).await;
            let mut voucher = Voucher {
                id: None,
                code: "SPRING".into(),
                issued: true,
            };
            let before = voucher.clone();
            assert!(silent_logs! { inside.insert_returning(&mut voucher).await.is_err() });
            assert_eq!(voucher, before);
            assert_eq!(inside.find([]).count().await.expect("Could not count"), 1);
        }
        transaction.rollback().await.expect("Could not rollback");
        assert_eq!(
            database
                .table("vouchers")
                .await
                .find([])
                .count()
                .await
                .expect("Could not count"),
            0
        );
    }

    #[tokio::test]
    async fn auto_increment_runs_out() {
        init_logs();
        let database = database().await;
        let orders = database.table("orders").await;
        let mut last = Order {
            id: Some(i64::MAX),
            ..Order::new("anchor", 1)
        };
        orders
            .insert_returning(&mut last)
            .await
            .expect("The largest id is a valid id");
        assert_eq!(last.id, Some(i64::MAX));
        database.reset_stats();
        let mut next = Order::new("rope", 1);
        let error = silent_logs! {
            orders
                .insert_returning(&mut next)
                .await
                .expect_err("No id is left")
        };
        assert!(format!("{:#}", error).contains("database or disk is full"));
        assert_eq!(next, Order::new("rope", 1));
        assert_eq!(database.stats().get(Operation::Rollback), 1);
        assert_eq!(count(&database).await, 1);
    }

    #[tokio::test]
    async fn truncate_counts_removed_rows() {
        init_logs();
        let database = database().await;
        let orders = database.table("orders").await;
        for product in ["pen", "ink"] {
            orders
                .insert_returning(&mut Order::new(product, 1))
                .await
                .expect("Failed to insert");
        }
        let result = database
            .exec(&Statement::Truncate { name: "orders" })
            .await
            .expect("Could not truncate");
        assert_eq!(result.rows_affected, 2);
        assert_eq!(count(&database).await, 0);
    }

    #[tokio::test]
    async fn bad_urls() {
        init_logs();
        silent_logs! {
            assert!(MemoryDatabase::connect("postgres://localhost").await.is_err());
            assert!(MemoryDatabase::connect("memory://x?pool=4").await.is_err());
        }
    }
}
