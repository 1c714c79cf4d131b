pub mod query;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, ClientSession, Collection,
};
use std::time::Duration;

use crate::{config::Config, errors::AppResult};

pub use query::{ListOptions, QueryFilter, SortOrder};

#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut client_options = ClientOptions::parse(&config.mongo_conn_string).await?;

        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(2);
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        client_options.app_name = Some("eduhub-server".to_string());

        let client = Client::with_options(client_options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        log::info!("Connected to MongoDB database '{}'", config.mongo_db_name);

        Ok(Self {
            client,
            db_name: config.mongo_db_name.clone(),
        })
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.client
            .database(&self.db_name)
            .collection(collection_name)
    }

    /// Session for multi-document transactions. Requires a replica set deployment.
    pub async fn start_session(&self) -> AppResult<ClientSession> {
        Ok(self.client.start_session().await?)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

}

/// Collection names, shared by the repositories that read across collections.
pub mod collections {
    pub const USERS: &str = "users";
    pub const REFRESH_TOKENS: &str = "refresh_tokens";
    pub const COURSES: &str = "courses";
    pub const LESSONS: &str = "lessons";
    pub const TESTS: &str = "tests";
    pub const TEST_QUESTIONS: &str = "test_questions";
    pub const TEST_ATTEMPTS: &str = "test_attempts";
    pub const ENROLLMENTS: &str = "enrollments";
    pub const ANNOUNCEMENTS: &str = "announcements";
    pub const CONTACT_SUBMISSIONS: &str = "contact_submissions";
    pub const RESUME_SUBMISSIONS: &str = "resume_submissions";
}

/// True when a write failed on a unique index.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_structure() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Database>();
    }
}
