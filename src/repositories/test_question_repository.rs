use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions, ReplaceOptions},
    ClientSession, Collection, IndexModel,
};

use crate::{
    db::{collections, Database},
    errors::{AppError, AppResult},
    models::domain::{Test, TestQuestion},
};

/// Question store. Inserts and deletes rewrite the owning test's `question_count`
/// in the same transaction and return the new count.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestQuestionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestQuestion>>;
    /// Questions of a test ordered by `order_number`.
    async fn find_by_test(&self, test_id: &str) -> AppResult<Vec<TestQuestion>>;
    async fn count_by_test(&self, test_id: &str) -> AppResult<i64>;
    async fn create(&self, question: TestQuestion) -> AppResult<i64>;
    async fn update(&self, question: TestQuestion) -> AppResult<TestQuestion>;
    async fn delete(&self, id: &str, test_id: &str) -> AppResult<i64>;
    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64>;
}

pub struct MongoTestQuestionRepository {
    db: Database,
    questions: Collection<TestQuestion>,
    tests: Collection<Test>,
}

impl MongoTestQuestionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            questions: db.get_collection(collections::TEST_QUESTIONS),
            tests: db.get_collection(collections::TESTS),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let test_index = IndexModel::builder()
            .keys(doc! { "test_id": 1, "order_number": 1 })
            .build();

        self.questions.create_index(id_index).await?;
        self.questions.create_index(test_index).await?;
        log::info!("Created indexes on test_questions.id and test_questions.test_id");

        Ok(())
    }

    async fn write_question_count(
        &self,
        session: &mut ClientSession,
        test_id: &str,
    ) -> AppResult<i64> {
        let count = self
            .questions
            .count_documents(doc! { "test_id": test_id })
            .session(&mut *session)
            .await? as i64;

        let result = self
            .tests
            .update_one(
                doc! { "id": test_id },
                doc! { "$set": { "question_count": count } },
            )
            .session(&mut *session)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Test with id '{}' not found",
                test_id
            )));
        }

        Ok(count)
    }

    async fn insert_in_session(
        &self,
        session: &mut ClientSession,
        question: &TestQuestion,
    ) -> AppResult<i64> {
        self.questions
            .insert_one(question)
            .session(&mut *session)
            .await?;
        self.write_question_count(session, &question.test_id).await
    }

    async fn delete_in_session(
        &self,
        session: &mut ClientSession,
        id: &str,
        test_id: &str,
    ) -> AppResult<i64> {
        let result = self
            .questions
            .delete_one(doc! { "id": id, "test_id": test_id })
            .session(&mut *session)
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                id
            )));
        }

        self.write_question_count(session, test_id).await
    }

    async fn finish(session: &mut ClientSession, outcome: AppResult<i64>) -> AppResult<i64> {
        match outcome {
            Ok(count) => {
                session.commit_transaction().await?;
                Ok(count)
            }
            Err(e) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    log::warn!("Failed to abort question transaction: {}", abort_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TestQuestionRepository for MongoTestQuestionRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestQuestion>> {
        let question = self.questions.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn find_by_test(&self, test_id: &str) -> AppResult<Vec<TestQuestion>> {
        let options = FindOptions::builder()
            .sort(doc! { "order_number": 1, "created_at": 1 })
            .build();

        let cursor = self
            .questions
            .find(doc! { "test_id": test_id })
            .with_options(options)
            .await?;
        let questions: Vec<TestQuestion> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn count_by_test(&self, test_id: &str) -> AppResult<i64> {
        let count = self
            .questions
            .count_documents(doc! { "test_id": test_id })
            .await?;
        Ok(count as i64)
    }

    async fn create(&self, question: TestQuestion) -> AppResult<i64> {
        let mut session = self.db.start_session().await?;
        session.start_transaction().await?;

        let outcome = self.insert_in_session(&mut session, &question).await;
        Self::finish(&mut session, outcome).await
    }

    async fn update(&self, question: TestQuestion) -> AppResult<TestQuestion> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .questions
            .replace_one(doc! { "id": &question.id }, &question)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                question.id
            )));
        }

        Ok(question)
    }

    async fn delete(&self, id: &str, test_id: &str) -> AppResult<i64> {
        let mut session = self.db.start_session().await?;
        session.start_transaction().await?;

        let outcome = self.delete_in_session(&mut session, id, test_id).await;
        Self::finish(&mut session, outcome).await
    }

    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64> {
        let result = self
            .questions
            .delete_many(doc! { "test_id": test_id })
            .await?;
        Ok(result.deleted_count)
    }
}
