#[cfg(feature = "mongo-store")]
pub mod mongodb;
#[cfg(feature = "sqlite-store")]
pub mod sqlite;

use std::time::SystemTime;

use futures::future::BoxFuture;

use crate::dao::models::{
    AnswerEntity, AnswerRecordEntity, FeedRoomEntity, GlobalLeaderboardRowEntity,
    LeaderboardRowEntity, NewQuestionEntity, NewRoomEntity, ParticipantEntity, QuestionEntity,
    RoomEntity, RoomProgressEntity, UserEntity,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for rooms, questions, answers and standings.
pub trait QuizStore: Send + Sync {
    fn find_user(&self, user_id: i64) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn upsert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;

    fn create_room(&self, room: NewRoomEntity) -> BoxFuture<'static, StorageResult<RoomEntity>>;
    fn find_room(&self, room_id: i64) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Set or clear the start time. Returns `false` when the room does not exist.
    fn schedule_room(
        &self,
        room_id: i64,
        start_time: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Mark the room as published. Returns `false` when the room does not exist.
    fn publish_room(&self, room_id: i64) -> BoxFuture<'static, StorageResult<bool>>;
    /// Rooms eligible for the room feed.
    fn list_feed_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<FeedRoomEntity>>>;

    /// Append a question, assigning the next `order_index` of the room atomically.
    fn add_question(
        &self,
        question: NewQuestionEntity,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>>;
    /// Look a question up, only if it belongs to `room_id`.
    fn find_question(
        &self,
        room_id: i64,
        question_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Questions of a room in ascending `order_index`.
    fn list_questions(&self, room_id: i64)
    -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    fn count_questions(&self, room_id: i64) -> BoxFuture<'static, StorageResult<u64>>;

    /// Add a participant. Returns `false` when the user already joined.
    fn join_room(&self, room_id: i64, user_id: i64) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove a participant. Returns `false` when the user was not a member.
    fn leave_room(&self, room_id: i64, user_id: i64) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_participant(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>>;

    /// Insert the answer or overwrite the scoring fields of the existing row
    /// for the same `(room_id, question_id, user_id)`.
    fn upsert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Recompute `total_score` and `position` of every participant of the room.
    fn refresh_room_standings(&self, room_id: i64) -> BoxFuture<'static, StorageResult<()>>;
    fn list_user_answers(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerRecordEntity>>>;
    /// Question and answer counts of a user for each requested room, in request order.
    fn user_room_progress(
        &self,
        user_id: i64,
        room_ids: Vec<i64>,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomProgressEntity>>>;

    /// Per-user totals within a room, in leaderboard order.
    fn room_leaderboard(
        &self,
        room_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardRowEntity>>>;
    /// Per-user totals across every room, in leaderboard order.
    fn global_leaderboard(&self)
    -> BoxFuture<'static, StorageResult<Vec<GlobalLeaderboardRowEntity>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
