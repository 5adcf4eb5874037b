use crate::{constants::*, utils::env_or_default};
use futures::stream::StreamExt;
use mongodb::bson::Document;
use mongodb::options::{FindOneOptions, FindOptions, UpdateOptions};
use mongodb::{options::ClientOptions, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

pub struct AppDatabase(Client);

#[cfg_attr(test, automock)]
impl AppDatabase {
    pub async fn new() -> anyhow::Result<Self> {
        // MONGODB_URI is mandatory, the pool sizes fall back to defaults
        let uri = std::env::var("MONGODB_URI")
            .map_err(|_| anyhow::anyhow!("MONGODB_URI not found in .env file"))?;
        let min_pool = env_or_default("MONGODB_MIN_POOL_SIZE", MONGO_MIN_POOL_SIZE);
        let max_pool = env_or_default("MONGODB_MAX_POOL_SIZE", MONGO_MAX_POOL_SIZE);
        let timeout = Duration::from_secs(MONGO_CONN_TIMEOUT);
        // create the mongodb client options
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.max_pool_size = Some(max_pool);
        client_options.min_pool_size = Some(min_pool);
        client_options.connect_timeout = Some(timeout);
        let client = Client::with_options(client_options)?;
        tracing::debug!("mongodb client created with pool size {min_pool}..{max_pool}");
        Ok(Self(client))
    }

    pub async fn find_one<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Option<Document>,
        options: Option<FindOneOptions>,
    ) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        let data = coll.find_one(filter, options).await?;
        Ok(data)
    }

    pub async fn find<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Option<Document>,
        options: Option<FindOptions>,
    ) -> anyhow::Result<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        let mut cursor = coll.find(filter, options).await?;
        let mut data = vec![];
        while let Some(doc) = cursor.next().await {
            data.push(doc?);
        }
        Ok(data)
    }

    /// Returns the number of documents matched by the filter
    pub async fn update_one(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
        update: Document,
        options: Option<UpdateOptions>,
    ) -> anyhow::Result<u64> {
        let coll = self.0.database(db).collection::<Document>(coll);
        let result = coll.update_one(filter, update, options).await?;
        Ok(result.matched_count)
    }
}
