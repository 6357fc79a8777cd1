use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Invitations: code strings must be unique among *active* records only;
    // a consumed or revoked code's string may be reissued later.
    create_indexes(
        db,
        "invitations",
        vec![
            index_partial_unique(
                bson::doc! { "code": 1 },
                bson::doc! { "active": true },
            ),
            index(bson::doc! { "issuer_id": 1, "created_at": -1 }),
            index(bson::doc! { "code": 1, "active": 1 }),
        ],
    )
    .await?;

    // Members
    create_indexes(
        db,
        "members",
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index(bson::doc! { "tenant_id": 1, "joined_at": -1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn index_partial_unique(keys: bson::Document, filter: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(filter)
                .build(),
        )
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
