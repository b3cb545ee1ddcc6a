use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Client, IndexModel,
};

/// Collection indexes the service relies on: filter/sort support for the
/// listing endpoint, a geo index for proximity queries, and uniqueness of
/// department names and codes.
pub async fn ensure_indexes(mongo_uri: &str) -> anyhow::Result<()> {
    let client = Client::with_uri_str(mongo_uri).await?;
    let db = client.database("civic");

    let issues = db.collection::<Document>("issues");
    issues
        .create_index(
            IndexModel::builder()
                .keys(doc! {"status": 1, "category": 1, "created_at": -1})
                .build(),
            None,
        )
        .await?;
    issues
        .create_index(
            IndexModel::builder()
                .keys(doc! {"location.coordinates": "2d"})
                .build(),
            None,
        )
        .await?;

    let departments = db.collection::<Document>("departments");
    let unique = IndexOptions::builder().unique(true).build();
    departments
        .create_index(
            IndexModel::builder()
                .keys(doc! {"name": 1})
                .options(unique.clone())
                .build(),
            None,
        )
        .await?;
    departments
        .create_index(
            IndexModel::builder()
                .keys(doc! {"code": 1})
                .options(unique)
                .build(),
            None,
        )
        .await?;

    Ok(())
}
