use tabula::{CollectionError, Database, Record};

#[derive(Record, Default)]
struct Opaque {
    #[record(skip)]
    _handle: u64,
}

pub async fn invalid<D: Database>(database: &D) {
    let collection = tabula::Collection::new(database.collection("users")).await;
    let mut item = Opaque { _handle: 7 };
    let error = collection
        .insert_returning(&mut item)
        .await
        .expect_err("A record without fields is not a structured record");
    assert!(matches!(
        error.downcast_ref::<CollectionError>(),
        Some(CollectionError::InvalidArgument { .. })
    ));
    assert_eq!(item._handle, 7);
}
