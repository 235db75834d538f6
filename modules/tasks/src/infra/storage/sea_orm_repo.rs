//! SeaORM adapter for [`TasksRepository`].

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::contract::model::Task;
use crate::domain::repo::TasksRepository;
use crate::infra::storage::entity::{ActiveModel as TaskAM, Column, Entity as TaskEntity};

pub struct SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> TasksRepository for SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, t: Task) -> anyhow::Result<()> {
        let m = TaskAM {
            id: Set(t.id),
            owner_id: Set(t.owner_id),
            title: Set(t.title),
            completed: Set(t.completed),
            created_at: Set(t.created_at),
            updated_at: Set(t.updated_at),
        };
        m.insert(&self.conn).await.context("insert failed")?;
        Ok(())
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>> {
        let found = TaskEntity::find_by_id(id)
            .filter(Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("find_owned failed")?;
        Ok(found.map(Into::into))
    }

    async fn update(&self, t: Task) -> anyhow::Result<()> {
        let m = TaskAM {
            title: Set(t.title),
            completed: Set(t.completed),
            updated_at: Set(t.updated_at),
            ..Default::default()
        };
        let res = TaskEntity::update_many()
            .set(m)
            .filter(Column::Id.eq(t.id))
            .filter(Column::OwnerId.eq(t.owner_id))
            .exec(&self.conn)
            .await
            .context("update failed")?;
        if res.rows_affected == 0 {
            anyhow::bail!("task {} vanished during update", t.id);
        }
        Ok(())
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = TaskEntity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::OwnerId.eq(owner_id))
            .exec(&self.conn)
            .await
            .context("delete_owned failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_owned(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<Task>> {
        let q = TaskEntity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let Some(needle) = search else {
            let rows = q
                .limit(limit)
                .offset(offset)
                .all(&self.conn)
                .await
                .context("list_owned failed")?;
            return Ok(rows.into_iter().map(Into::into).collect());
        };

        // SQLite's LOWER() folds ASCII only, so matching happens here with
        // Unicode case folding before the page window is applied.
        let rows = q.all(&self.conn).await.context("list_owned failed")?;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .filter(|m| title_matches(&m.title, needle))
            .skip(skip)
            .take(take)
            .map(Into::into)
            .collect())
    }
}

/// Case-insensitive literal substring match; `needle` is already lower-cased.
fn title_matches(title: &str, needle: &str) -> bool {
    title.to_lowercase().contains(needle)
}
