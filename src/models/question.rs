// src/models/question.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres};

use crate::models::{
    choice::{Choice, PublicChoice},
    tag::Tag,
};

/// Represents the 'questions' table. A question belongs to a test through its
/// test_session and carries a stable question_number within that test.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub test_session_id: i64,
    pub question_number: i32,
    pub content: String,
}

/// A question assembled with its choices and tags for display.
/// Correctness flags are hidden; grading contexts load full `Choice` rows.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub question_number: i32,
    pub content: String,
    pub choices: Vec<PublicChoice>,
    pub tags: Vec<Tag>,
}

#[derive(FromRow)]
struct QuestionTagRow {
    question_id: i64,
    id: i64,
    name: String,
}

impl Question {
    /// Subset of `ids` that exist, for bulk existence validation.
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder =
            sqlx::QueryBuilder::<Postgres>::new("SELECT id FROM questions WHERE id IN (");
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64,)> = query_builder.build_query_as().fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// All questions of a test, in question_number order.
    pub async fn for_test(pool: &PgPool, test_id: i64) -> Result<Vec<Question>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT q.id, q.test_session_id, q.question_number, q.content
            FROM questions q
            JOIN test_sessions ts ON q.test_session_id = ts.id
            WHERE ts.test_id = $1
            ORDER BY q.question_number
            "#,
        )
        .bind(test_id)
        .fetch_all(pool)
        .await
    }

    pub async fn by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Question>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT id, test_session_id, question_number, content FROM questions WHERE id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        query_builder.build_query_as().fetch_all(pool).await
    }

    /// Candidate question ids tagged with ANY of `tag_ids`, optionally
    /// restricted to questions whose test_session belongs to ANY of
    /// `test_ids`. First half of the mini-test search; evaluated eagerly.
    pub async fn ids_tagged_any(
        pool: &PgPool,
        tag_ids: &[i64],
        test_ids: &[i64],
    ) -> Result<Vec<i64>, sqlx::Error> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT q.id FROM questions q
             JOIN question_tags qt ON qt.question_id = q.id
             WHERE qt.tag_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in tag_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        if !test_ids.is_empty() {
            query_builder
                .push(" AND q.test_session_id IN (SELECT id FROM test_sessions WHERE test_id IN (");
            let mut separated = query_builder.separated(",");
            for id in test_ids {
                separated.push_bind(id);
            }
            separated.push_unseparated("))");
        }

        let rows: Vec<(i64,)> = query_builder.build_query_as().fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Random subset of `count` questions from the candidate ids (or all of
    /// them, if fewer exist). Second half of the mini-test search.
    pub async fn random_subset(
        pool: &PgPool,
        ids: &[i64],
        count: i64,
    ) -> Result<Vec<Question>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT id, test_session_id, question_number, content FROM questions WHERE id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY RANDOM() LIMIT ");
        query_builder.push_bind(count);

        query_builder.build_query_as().fetch_all(pool).await
    }

    /// Attaches choices and tags to the given questions, preserving their
    /// order. Two bulk queries instead of one query per question.
    pub async fn attach_associations(
        pool: &PgPool,
        questions: Vec<Question>,
    ) -> Result<Vec<QuestionView>, sqlx::Error> {
        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();

        let mut choices_by_question: HashMap<i64, Vec<PublicChoice>> = HashMap::new();
        for choice in Choice::for_questions(pool, &ids).await? {
            choices_by_question
                .entry(choice.question_id)
                .or_default()
                .push(PublicChoice::from(choice));
        }

        let mut tags_by_question: HashMap<i64, Vec<Tag>> = HashMap::new();
        if !ids.is_empty() {
            let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
                "SELECT qt.question_id, t.id, t.name
                 FROM tags t
                 JOIN question_tags qt ON qt.tag_id = t.id
                 WHERE qt.question_id IN (",
            );
            let mut separated = query_builder.separated(",");
            for id in &ids {
                separated.push_bind(id);
            }
            separated.push_unseparated(") ORDER BY t.id");

            let rows: Vec<QuestionTagRow> = query_builder.build_query_as().fetch_all(pool).await?;
            for row in rows {
                tags_by_question
                    .entry(row.question_id)
                    .or_default()
                    .push(Tag {
                        id: row.id,
                        name: row.name,
                    });
            }
        }

        Ok(questions
            .into_iter()
            .map(|q| QuestionView {
                id: q.id,
                question_number: q.question_number,
                content: q.content,
                choices: choices_by_question.remove(&q.id).unwrap_or_default(),
                tags: tags_by_question.remove(&q.id).unwrap_or_default(),
            })
            .collect())
    }
}
