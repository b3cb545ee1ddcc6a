use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Client, IndexModel,
};

pub async fn ensure_indexes(mongo_uri: &str) -> anyhow::Result<()> {
    let client = Client::with_uri_str(mongo_uri).await?;
    let db = client.database("civic");

    let users = db.collection::<Document>("users");
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! {"email": 1})
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            None,
        )
        .await?;

    Ok(())
}
