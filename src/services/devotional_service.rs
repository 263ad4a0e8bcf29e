//! Devotional content service

use std::sync::Arc;

use crate::errors::{LinkhubError, Result};
use crate::storage::{
    Devotional, DevotionalFilter, DevotionalStatus, DevotionalUpdate, NewDevotional,
    SeaOrmStorage,
};
use crate::utils::{parse_date, today};

const MAX_TITLE_LENGTH: usize = 200;
/// 公开列表的默认与最大条数
pub const DEFAULT_FEED_LIMIT: u64 = 10;
pub const MAX_FEED_LIMIT: u64 = 50;

#[derive(Debug, Clone, Default)]
pub struct CreateDevotionalRequest {
    pub title: String,
    pub content: String,
    /// `YYYY-MM-DD`
    pub devotional_date: String,
    /// `draft` (default) or `published`
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDevotionalRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub devotional_date: Option<String>,
    pub status: Option<String>,
}

pub fn parse_devotional_status(value: &str) -> Result<DevotionalStatus> {
    value.trim().parse().map_err(|_| {
        LinkhubError::validation(format!(
            "Invalid status '{}', expected draft or published",
            value
        ))
    })
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LinkhubError::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(LinkhubError::validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

fn validate_content(content: &str) -> Result<String> {
    if content.trim().is_empty() {
        return Err(LinkhubError::validation("Content is required"));
    }
    Ok(content.to_string())
}

pub struct DevotionalService {
    storage: Arc<SeaOrmStorage>,
}

impl DevotionalService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    fn not_found(id: i64) -> LinkhubError {
        LinkhubError::not_found(format!("Devotional {} not found", id))
    }

    pub async fn create(&self, req: CreateDevotionalRequest) -> Result<Devotional> {
        let new = NewDevotional {
            title: validate_title(&req.title)?,
            content: validate_content(&req.content)?,
            devotional_date: parse_date(&req.devotional_date)?,
            status: match req.status.as_deref() {
                Some(s) if !s.trim().is_empty() => parse_devotional_status(s)?,
                _ => DevotionalStatus::default(),
            },
        };
        self.storage.create_devotional(new).await
    }

    pub async fn get(&self, id: i64) -> Result<Devotional> {
        self.storage
            .get_devotional(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn list(&self, filter: DevotionalFilter) -> Result<Vec<Devotional>> {
        let filter = DevotionalFilter {
            search: crate::utils::non_empty(filter.search.as_deref()),
            ..filter
        };
        self.storage.list_devotionals(&filter).await
    }

    pub async fn update(&self, id: i64, req: UpdateDevotionalRequest) -> Result<Devotional> {
        let update = DevotionalUpdate {
            title: req.title.as_deref().map(validate_title).transpose()?,
            content: req.content.as_deref().map(validate_content).transpose()?,
            devotional_date: req.devotional_date.as_deref().map(parse_date).transpose()?,
            status: req
                .status
                .as_deref()
                .map(parse_devotional_status)
                .transpose()?,
        };

        self.storage
            .update_devotional(id, update)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// 软删除；不存在或已删除时返回 NotFound
    pub async fn soft_delete(&self, id: i64) -> Result<()> {
        if !self.storage.soft_delete_devotional(id).await? {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    /// 恢复软删除的记录
    pub async fn restore(&self, id: i64) -> Result<Devotional> {
        if !self.storage.restore_devotional(id).await? {
            return Err(LinkhubError::not_found(format!(
                "Deleted devotional {} not found",
                id
            )));
        }
        self.get(id).await
    }

    /// 公开 feed：已发布、未删除、日期不晚于今天
    pub async fn published_feed(&self, limit: Option<u64>) -> Result<Vec<Devotional>> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT);
        self.storage.published_devotionals(today(), limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devotional_status() {
        assert_eq!(
            parse_devotional_status("Published").unwrap(),
            DevotionalStatus::Published
        );
        assert_eq!(
            parse_devotional_status(" draft ").unwrap(),
            DevotionalStatus::Draft
        );
        assert!(parse_devotional_status("archived").is_err());
    }

    #[test]
    fn test_validate_title_and_content() {
        assert_eq!(validate_title("  Grace  ").unwrap(), "Grace");
        assert!(validate_title("").is_err());
        assert!(validate_content(" \n ").is_err());
        assert_eq!(validate_content("Psalm 23").unwrap(), "Psalm 23");
    }
}
