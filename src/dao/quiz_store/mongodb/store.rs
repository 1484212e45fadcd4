use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::SystemTime,
};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{
        MongoAnswerDocument, MongoCounterDocument, MongoParticipantDocument,
        MongoQuestionDocument, MongoRoomDocument, MongoTotalsDocument, MongoUserDocument,
    },
};
use crate::{
    dao::{
        models::{
            AnswerEntity, AnswerRecordEntity, FeedRoomEntity, GlobalLeaderboardRowEntity,
            LeaderboardRowEntity, NewQuestionEntity, NewRoomEntity, ParticipantEntity,
            QuestionEntity, RoomEntity, RoomProgressEntity, UserEntity,
        },
        quiz_store::QuizStore,
        storage::StorageResult,
    },
    state::ranking::{self, Standing},
};

const USERS: &str = "users";
const ROOMS: &str = "rooms";
const QUESTIONS: &str = "questions";
const PARTICIPANTS: &str = "participants";
const ANSWERS: &str = "answers";
const COUNTERS: &str = "counters";

#[derive(Clone)]
pub struct MongoQuizStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

fn query(op: &'static str) -> impl FnOnce(mongodb::error::Error) -> MongoDaoError {
    move |source| MongoDaoError::Query { op, source }
}

impl MongoQuizStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let unique_indexes: [(&'static str, &'static str, Document); 4] = [
            (ANSWERS, "answer_identity_idx", doc! {"room_id": 1, "question_id": 1, "user_id": 1}),
            (PARTICIPANTS, "participant_identity_idx", doc! {"room_id": 1, "user_id": 1}),
            (QUESTIONS, "question_order_idx", doc! {"room_id": 1, "order_index": 1}),
            (USERS, "username_idx", doc! {"username": 1}),
        ];

        let database = self.database().await;
        for (collection, name, keys) in unique_indexes {
            let index = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(name.to_owned()))
                        .unique(Some(true))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(collection)
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index: name,
                    source,
                })?;
        }
        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<T>(name)
    }

    async fn next_sequence(&self, name: String) -> MongoResult<i64> {
        let counters = self.collection::<MongoCounterDocument>(COUNTERS).await;
        let counter = counters
            .find_one_and_update(doc! {"_id": name.as_str()}, doc! {"$inc": {"seq": 1_i64}})
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(query("next_sequence"))?;
        counter
            .map(|counter| counter.seq)
            .ok_or(MongoDaoError::MissingCounter { name })
    }

    async fn find_user(&self, user_id: i64) -> MongoResult<Option<UserEntity>> {
        let users = self.collection::<MongoUserDocument>(USERS).await;
        let user = users
            .find_one(doc! {"_id": user_id})
            .await
            .map_err(query("find_user"))?;
        Ok(user.map(Into::into))
    }

    async fn upsert_user(&self, user: UserEntity) -> MongoResult<()> {
        let users = self.collection::<MongoUserDocument>(USERS).await;
        users
            .update_one(
                doc! {"_id": user.id},
                doc! {"$set": {"username": user.username}},
            )
            .upsert(true)
            .await
            .map_err(query("upsert_user"))?;
        Ok(())
    }

    async fn create_room(&self, room: NewRoomEntity) -> MongoResult<RoomEntity> {
        let id = self.next_sequence(ROOMS.to_owned()).await?;
        let document = MongoRoomDocument {
            id,
            host_id: room.host_id,
            title: room.title,
            time_per_question: i64::from(room.time_per_question),
            start_time: room.start_time.map(DateTime::from_system_time),
            is_public: room.is_public,
            is_published: false,
            created_at: DateTime::now(),
        };
        let rooms = self.collection::<MongoRoomDocument>(ROOMS).await;
        rooms
            .insert_one(&document)
            .await
            .map_err(query("create_room"))?;
        Ok(document.into())
    }

    async fn find_room(&self, room_id: i64) -> MongoResult<Option<RoomEntity>> {
        let rooms = self.collection::<MongoRoomDocument>(ROOMS).await;
        let room = rooms
            .find_one(doc! {"_id": room_id})
            .await
            .map_err(query("find_room"))?;
        Ok(room.map(Into::into))
    }

    async fn schedule_room(&self, room_id: i64, start_time: Option<SystemTime>) -> MongoResult<bool> {
        let rooms = self.collection::<MongoRoomDocument>(ROOMS).await;
        let result = rooms
            .update_one(
                doc! {"_id": room_id},
                doc! {"$set": {"start_time": start_time.map(DateTime::from_system_time)}},
            )
            .await
            .map_err(query("schedule_room"))?;
        Ok(result.matched_count > 0)
    }

    async fn publish_room(&self, room_id: i64) -> MongoResult<bool> {
        let rooms = self.collection::<MongoRoomDocument>(ROOMS).await;
        let result = rooms
            .update_one(doc! {"_id": room_id}, doc! {"$set": {"is_published": true}})
            .await
            .map_err(query("publish_room"))?;
        Ok(result.matched_count > 0)
    }

    async fn list_feed_rooms(&self) -> MongoResult<Vec<FeedRoomEntity>> {
        let rooms = self.collection::<MongoRoomDocument>(ROOMS).await;
        let candidates: Vec<MongoRoomDocument> = rooms
            .find(doc! {
                "$or": [
                    {"is_public": true, "is_published": true},
                    {"is_public": false, "start_time": {"$ne": null}},
                ]
            })
            .sort(doc! {"created_at": -1, "_id": -1})
            .await
            .map_err(query("list_feed_rooms"))?
            .try_collect()
            .await
            .map_err(query("list_feed_rooms"))?;

        let questions = self.collection::<Document>(QUESTIONS).await;
        let participants = self.collection::<Document>(PARTICIPANTS).await;
        let mut feed = Vec::with_capacity(candidates.len());
        for room in candidates {
            let question_count = questions
                .count_documents(doc! {"room_id": room.id})
                .await
                .map_err(query("list_feed_rooms"))?;
            if question_count == 0 {
                continue;
            }
            let participant_count = participants
                .count_documents(doc! {"room_id": room.id})
                .await
                .map_err(query("list_feed_rooms"))?;
            let entity: RoomEntity = room.into();
            feed.push(FeedRoomEntity {
                id: entity.id,
                title: entity.title,
                is_public: entity.is_public,
                start_time: entity.start_time,
                time_per_question: entity.time_per_question,
                question_count: question_count as i64,
                participant_count: participant_count as i64,
            });
        }
        Ok(feed)
    }

    async fn add_question(&self, question: NewQuestionEntity) -> MongoResult<QuestionEntity> {
        let id = self.next_sequence(QUESTIONS.to_owned()).await?;
        // One counter per room keeps order indexes gap-free and race-free.
        let order_index = self
            .next_sequence(format!("{QUESTIONS}:{}", question.room_id))
            .await?;
        let document = MongoQuestionDocument {
            id,
            room_id: question.room_id,
            order_index,
            text: question.text,
            options: question.options,
            correct_answer_index: i64::from(question.correct_answer_index),
            image_url: question.image_url,
            created_at: DateTime::now(),
        };
        let questions = self.collection::<MongoQuestionDocument>(QUESTIONS).await;
        questions
            .insert_one(&document)
            .await
            .map_err(query("add_question"))?;
        Ok(document.into())
    }

    async fn find_question(&self, room_id: i64, question_id: i64) -> MongoResult<Option<QuestionEntity>> {
        let questions = self.collection::<MongoQuestionDocument>(QUESTIONS).await;
        let question = questions
            .find_one(doc! {"_id": question_id, "room_id": room_id})
            .await
            .map_err(query("find_question"))?;
        Ok(question.map(Into::into))
    }

    async fn list_questions(&self, room_id: i64) -> MongoResult<Vec<QuestionEntity>> {
        let questions = self.collection::<MongoQuestionDocument>(QUESTIONS).await;
        let documents: Vec<MongoQuestionDocument> = questions
            .find(doc! {"room_id": room_id})
            .sort(doc! {"order_index": 1, "_id": 1})
            .await
            .map_err(query("list_questions"))?
            .try_collect()
            .await
            .map_err(query("list_questions"))?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn count_questions(&self, room_id: i64) -> MongoResult<u64> {
        let questions = self.collection::<Document>(QUESTIONS).await;
        questions
            .count_documents(doc! {"room_id": room_id})
            .await
            .map_err(query("count_questions"))
    }

    async fn join_room(&self, room_id: i64, user_id: i64) -> MongoResult<bool> {
        let participants = self.collection::<MongoParticipantDocument>(PARTICIPANTS).await;
        let result = participants
            .update_one(
                doc! {"room_id": room_id, "user_id": user_id},
                doc! {"$setOnInsert": {
                    "total_score": 0_i64,
                    "position": null,
                    "joined_at": DateTime::now(),
                }},
            )
            .upsert(true)
            .await
            .map_err(query("join_room"))?;
        Ok(result.upserted_id.is_some())
    }

    async fn leave_room(&self, room_id: i64, user_id: i64) -> MongoResult<bool> {
        let participants = self.collection::<MongoParticipantDocument>(PARTICIPANTS).await;
        let result = participants
            .delete_one(doc! {"room_id": room_id, "user_id": user_id})
            .await
            .map_err(query("leave_room"))?;
        Ok(result.deleted_count > 0)
    }

    async fn find_participant(&self, room_id: i64, user_id: i64) -> MongoResult<Option<ParticipantEntity>> {
        let participants = self.collection::<MongoParticipantDocument>(PARTICIPANTS).await;
        let participant = participants
            .find_one(doc! {"room_id": room_id, "user_id": user_id})
            .await
            .map_err(query("find_participant"))?;
        Ok(participant.map(Into::into))
    }

    async fn upsert_answer(&self, answer: AnswerEntity) -> MongoResult<()> {
        let answers = self.collection::<MongoAnswerDocument>(ANSWERS).await;
        let filter = doc! {
            "room_id": answer.room_id,
            "question_id": answer.question_id,
            "user_id": answer.user_id,
        };
        let update = doc! {
            "$set": {
                "selected_index": i64::from(answer.selected_index),
                "is_correct": answer.is_correct,
                "score": i64::from(answer.score),
            },
            "$setOnInsert": {"created_at": DateTime::now()},
        };

        let outcome = answers
            .update_one(filter.clone(), update.clone())
            .upsert(true)
            .await;
        match outcome {
            Ok(_) => Ok(()),
            // MongoDB lets two concurrent upserts both miss the filter, and the unique
            // index rejects the second insert. Re-issuing it matches the existing row, so
            // the ledger write stays insert-or-overwrite. Request-level failures are not retried.
            Err(err) if is_duplicate_key(&err) => {
                debug!(room_id = answer.room_id, user_id = answer.user_id, "answer upsert raced, completing as update");
                answers
                    .update_one(filter, update)
                    .upsert(true)
                    .await
                    .map_err(query("upsert_answer"))?;
                Ok(())
            }
            Err(source) => Err(MongoDaoError::Query {
                op: "upsert_answer",
                source,
            }),
        }
    }

    async fn answer_totals(&self, filter: Document, op: &'static str) -> MongoResult<Vec<MongoTotalsDocument>> {
        let answers = self.collection::<Document>(ANSWERS).await;
        let pipeline = vec![
            doc! {"$match": filter},
            doc! {"$group": {
                "_id": "$user_id",
                "score": {"$sum": "$score"},
                "correct": {"$sum": {"$cond": ["$is_correct", 1, 0]}},
                "answered": {"$sum": 1},
                "rooms": {"$addToSet": "$room_id"},
            }},
            doc! {"$project": {
                "score": 1,
                "correct": 1,
                "answered": 1,
                "rooms_played": {"$size": "$rooms"},
            }},
        ];
        answers
            .aggregate(pipeline)
            .with_type::<MongoTotalsDocument>()
            .await
            .map_err(query(op))?
            .try_collect()
            .await
            .map_err(query(op))
    }

    async fn usernames(&self, user_ids: Vec<i64>) -> MongoResult<HashMap<i64, String>> {
        let users = self.collection::<MongoUserDocument>(USERS).await;
        let documents: Vec<MongoUserDocument> = users
            .find(doc! {"_id": {"$in": user_ids}})
            .await
            .map_err(query("usernames"))?
            .try_collect()
            .await
            .map_err(query("usernames"))?;
        Ok(documents
            .into_iter()
            .map(|user| (user.id, user.username))
            .collect())
    }

    /// Totals joined with usernames, sorted in leaderboard order.
    async fn ranked_totals(&self, filter: Document, op: &'static str) -> MongoResult<Vec<(Standing, i64)>> {
        let totals = self.answer_totals(filter, op).await?;
        let names = self
            .usernames(totals.iter().map(|row| row.user_id).collect())
            .await?;
        let rooms_played: HashMap<i64, i64> = totals
            .iter()
            .map(|row| (row.user_id, row.rooms_played))
            .collect();

        let standings = totals
            .into_iter()
            .filter_map(|row| {
                let username = names.get(&row.user_id)?.clone();
                Some(Standing {
                    user_id: row.user_id,
                    username,
                    score: row.score,
                    correct: row.correct,
                    answered: row.answered,
                })
            })
            .collect();

        Ok(ranking::rank(standings)
            .into_iter()
            .map(|(_, standing)| {
                let played = rooms_played.get(&standing.user_id).copied().unwrap_or(0);
                (standing, played)
            })
            .collect())
    }

    async fn refresh_room_standings(&self, room_id: i64) -> MongoResult<()> {
        let participants = self.collection::<MongoParticipantDocument>(PARTICIPANTS).await;
        let members: Vec<MongoParticipantDocument> = participants
            .find(doc! {"room_id": room_id})
            .await
            .map_err(query("refresh_room_standings"))?
            .try_collect()
            .await
            .map_err(query("refresh_room_standings"))?;

        let totals: HashMap<i64, MongoTotalsDocument> = self
            .answer_totals(doc! {"room_id": room_id}, "refresh_room_standings")
            .await?
            .into_iter()
            .map(|row| (row.user_id, row))
            .collect();

        let user_ids: BTreeSet<i64> = members
            .iter()
            .map(|member| member.user_id)
            .chain(totals.keys().copied())
            .collect();
        let names = self.usernames(user_ids.iter().copied().collect()).await?;

        let standings = user_ids
            .into_iter()
            .filter_map(|user_id| {
                let username = names.get(&user_id)?.clone();
                let row = totals.get(&user_id);
                Some(Standing {
                    user_id,
                    username,
                    score: row.map_or(0, |row| row.score),
                    correct: row.map_or(0, |row| row.correct),
                    answered: row.map_or(0, |row| row.answered),
                })
            })
            .collect();

        for (position, standing) in ranking::rank(standings) {
            participants
                .update_one(
                    doc! {"room_id": room_id, "user_id": standing.user_id},
                    doc! {"$set": {"total_score": standing.score, "position": i64::from(position)}},
                )
                .await
                .map_err(query("refresh_room_standings"))?;
        }
        Ok(())
    }

    async fn list_user_answers(&self, room_id: i64, user_id: i64) -> MongoResult<Vec<AnswerRecordEntity>> {
        let answers = self.collection::<MongoAnswerDocument>(ANSWERS).await;
        let documents: Vec<MongoAnswerDocument> = answers
            .find(doc! {"room_id": room_id, "user_id": user_id})
            .await
            .map_err(query("list_user_answers"))?
            .try_collect()
            .await
            .map_err(query("list_user_answers"))?;

        let order: HashMap<i64, i64> = self
            .list_questions(room_id)
            .await?
            .into_iter()
            .map(|question| (question.id, question.order_index))
            .collect();
        let mut records: Vec<AnswerRecordEntity> = documents.into_iter().map(Into::into).collect();
        records.sort_by_key(|record| order.get(&record.question_id).copied().unwrap_or(i64::MAX));
        Ok(records)
    }

    async fn user_room_progress(&self, user_id: i64, room_ids: Vec<i64>) -> MongoResult<Vec<RoomProgressEntity>> {
        let questions = self.collection::<Document>(QUESTIONS).await;
        let answers = self.collection::<Document>(ANSWERS).await;
        let mut progress = Vec::with_capacity(room_ids.len());
        for room_id in room_ids {
            let total_questions = questions
                .count_documents(doc! {"room_id": room_id})
                .await
                .map_err(query("user_room_progress"))?;
            let answered = answers
                .count_documents(doc! {"room_id": room_id, "user_id": user_id})
                .await
                .map_err(query("user_room_progress"))?;
            progress.push(RoomProgressEntity {
                room_id,
                total_questions: total_questions as i64,
                answered: answered as i64,
            });
        }
        Ok(progress)
    }

    async fn room_leaderboard(&self, room_id: i64) -> MongoResult<Vec<LeaderboardRowEntity>> {
        let ranked = self
            .ranked_totals(doc! {"room_id": room_id}, "room_leaderboard")
            .await?;
        Ok(ranked
            .into_iter()
            .map(|(standing, _)| LeaderboardRowEntity {
                user_id: standing.user_id,
                username: standing.username,
                score: standing.score,
                correct: standing.correct,
                answered: standing.answered,
            })
            .collect())
    }

    async fn global_leaderboard(&self) -> MongoResult<Vec<GlobalLeaderboardRowEntity>> {
        let ranked = self.ranked_totals(doc! {}, "global_leaderboard").await?;
        Ok(ranked
            .into_iter()
            .map(|(standing, rooms_played)| GlobalLeaderboardRowEntity {
                user_id: standing.user_id,
                username: standing.username,
                score: standing.score,
                correct: standing.correct,
                answered: standing.answered,
                rooms_played,
            })
            .collect())
    }
}

impl QuizStore for MongoQuizStore {
    fn find_user(&self, user_id: i64) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(user_id).await.map_err(Into::into) })
    }

    fn upsert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_user(user).await.map_err(Into::into) })
    }

    fn create_room(&self, room: NewRoomEntity) -> BoxFuture<'static, StorageResult<RoomEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_room(room).await.map_err(Into::into) })
    }

    fn find_room(&self, room_id: i64) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_room(room_id).await.map_err(Into::into) })
    }

    fn schedule_room(
        &self,
        room_id: i64,
        start_time: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .schedule_room(room_id, start_time)
                .await
                .map_err(Into::into)
        })
    }

    fn publish_room(&self, room_id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.publish_room(room_id).await.map_err(Into::into) })
    }

    fn list_feed_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<FeedRoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_feed_rooms().await.map_err(Into::into) })
    }

    fn add_question(
        &self,
        question: NewQuestionEntity,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        let store = self.clone();
        Box::pin(async move { store.add_question(question).await.map_err(Into::into) })
    }

    fn find_question(
        &self,
        room_id: i64,
        question_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_question(room_id, question_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_questions(
        &self,
        room_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_questions(room_id).await.map_err(Into::into) })
    }

    fn count_questions(&self, room_id: i64) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_questions(room_id).await.map_err(Into::into) })
    }

    fn join_room(&self, room_id: i64, user_id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.join_room(room_id, user_id).await.map_err(Into::into) })
    }

    fn leave_room(&self, room_id: i64, user_id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.leave_room(room_id, user_id).await.map_err(Into::into) })
    }

    fn find_participant(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_participant(room_id, user_id)
                .await
                .map_err(Into::into)
        })
    }

    fn upsert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_answer(answer).await.map_err(Into::into) })
    }

    fn refresh_room_standings(&self, room_id: i64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .refresh_room_standings(room_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_user_answers(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_user_answers(room_id, user_id)
                .await
                .map_err(Into::into)
        })
    }

    fn user_room_progress(
        &self,
        user_id: i64,
        room_ids: Vec<i64>,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomProgressEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .user_room_progress(user_id, room_ids)
                .await
                .map_err(Into::into)
        })
    }

    fn room_leaderboard(
        &self,
        room_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardRowEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.room_leaderboard(room_id).await.map_err(Into::into) })
    }

    fn global_leaderboard(
        &self,
    ) -> BoxFuture<'static, StorageResult<Vec<GlobalLeaderboardRowEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.global_leaderboard().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
