use crate::users::recreate;
use tabula::{Collection, ColumnDef, Condition, Database, Record, TableDef, Value};
use time::OffsetDateTime;

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Grade {
    student: i64,
    course: String,
    score: Option<i32>,
    graded_at: Option<OffsetDateTime>,
}

pub async fn grades<D: Database>(database: &D) {
    let table = TableDef::new("grades")
        .column(ColumnDef::new("student", Value::Int64(None)).primary_key())
        .column(ColumnDef::new("course", Value::Varchar(None)).primary_key())
        .column(ColumnDef::new("score", Value::Int32(None)).default_value(60))
        .column(
            ColumnDef::new("graded_at", Value::TimestampWithTimezone(None))
                .default_current_timestamp(),
        );
    recreate(database, &table).await;
    let grades = Collection::new(database.collection("grades")).await;
    assert_eq!(grades.primary_keys(), ["student", "course"]);

    // Read back through both key columns, defaults merged in
    let mut math = Grade {
        student: 3,
        course: "math".into(),
        ..Default::default()
    };
    grades
        .insert_returning(&mut math)
        .await
        .expect("Failed to insert the math grade");
    assert_eq!(math.student, 3);
    assert_eq!(math.course, "math");
    assert_eq!(math.score, Some(60));
    assert!(math.graded_at.is_some());

    // Same student, other course
    let mut art = Grade {
        student: 3,
        course: "art".into(),
        score: Some(92),
        ..Default::default()
    };
    grades
        .insert_returning(&mut art)
        .await
        .expect("Failed to insert the art grade");
    assert_eq!(art.score, Some(92));
    assert!(art.graded_at.is_some());

    let mut stored = Grade::default();
    grades
        .find([Condition::key(Value::List(Some(vec![
            Value::Int64(Some(3)),
            Value::Varchar(Some("math".into())),
        ])))])
        .one(&mut stored)
        .await
        .expect("Could not find the math grade by key");
    assert_eq!(stored, math);

    // The same pair again breaks the key
    let mut repeated = Grade {
        student: 3,
        course: "math".into(),
        score: Some(75),
        ..Default::default()
    };
    let before = repeated.clone();
    assert!(grades.insert_returning(&mut repeated).await.is_err());
    assert_eq!(repeated, before);
    assert_eq!(grades.find([]).count().await.expect("Could not count"), 2);
}
