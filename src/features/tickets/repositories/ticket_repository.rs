use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::tickets::models::TicketSummary;
use crate::features::tickets::query::{escape_like, TicketQuery, Visibility};

/// Read access to tickets for listings
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Number of tickets matching visibility and filters, ignoring pagination
    async fn count(&self, query: &TicketQuery) -> Result<i64>;

    /// The requested page, sorted
    async fn fetch_page(&self, query: &TicketQuery) -> Result<Vec<TicketSummary>>;
}

pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) const SUMMARY_COLUMNS: &str = r#"
    SELECT
        t.id, t.title, t.content, t.status, t.deadline, t.filial, t.priority,
        t.category_id, t.user_id, t.created_at, t.updated_at,
        u.username AS owner_username,
        u.email AS owner_email,
        c.name AS category_name,
        c.color AS category_color,
        (SELECT COUNT(*) FROM file_attachments fa WHERE fa.ticket_id = t.id) AS attachment_count,
        (SELECT COUNT(*) FROM comments cm WHERE cm.ticket_id = t.id) AS comment_count
    FROM tickets t
    LEFT JOIN users u ON u.id = t.user_id
    LEFT JOIN categories c ON c.id = t.category_id
"#;

/// Append the WHERE clause shared by the count and the page query
fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &TicketQuery) {
    builder.push(" WHERE 1 = 1");

    if let Visibility::OwnedBy(user_id) = query.visibility {
        builder.push(" AND t.user_id = ").push_bind(user_id);
    }

    let filter = &query.filter;
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (t.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR t.content ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(status) = filter.status {
        builder.push(" AND t.status = ").push_bind(status);
    }
    if let Some(category_id) = filter.category_id {
        builder.push(" AND t.category_id = ").push_bind(category_id);
    }
    if let Some(filial) = &filter.filial {
        builder.push(" AND t.filial = ").push_bind(filial.clone());
    }
    if let Some(priority) = filter.priority {
        builder.push(" AND t.priority = ").push_bind(priority);
    }
    // deadline is stored as YYYY-MM-DD text, so string comparison orders by date
    if let Some(date_from) = &filter.date_from {
        builder.push(" AND t.deadline >= ").push_bind(date_from.clone());
    }
    if let Some(date_to) = &filter.date_to {
        builder.push(" AND t.deadline <= ").push_bind(date_to.clone());
    }
}

pub(crate) fn build_count_query(query: &TicketQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM tickets t");
    push_conditions(&mut builder, query);
    builder
}

pub(crate) fn build_page_query(query: &TicketQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SUMMARY_COLUMNS);
    push_conditions(&mut builder, query);

    let direction = query.sort.direction.as_sql();
    builder.push(format!(
        " ORDER BY {} {}, t.id {}",
        query.sort.field.as_sql(),
        direction,
        direction
    ));
    builder
        .push(" LIMIT ")
        .push_bind(query.page.limit())
        .push(" OFFSET ")
        .push_bind(query.page.offset());
    builder
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn count(&self, query: &TicketQuery) -> Result<i64> {
        let mut builder = build_count_query(query);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count tickets: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn fetch_page(&self, query: &TicketQuery) -> Result<Vec<TicketSummary>> {
        let mut builder = build_page_query(query);
        builder
            .build_query_as::<TicketSummary>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch ticket page: {:?}", e);
                AppError::Database(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tickets::dtos::TicketListQuery;
    use crate::shared::test_helpers::{create_admin_user, create_regular_user};

    #[test]
    fn test_admin_count_query_has_no_owner_condition() {
        let admin = create_admin_user();
        let query = TicketQuery::new(&TicketListQuery::default(), &admin);
        let builder = build_count_query(&query);
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM tickets t WHERE 1 = 1");
    }

    #[test]
    fn test_user_query_is_scoped_to_owner() {
        let user = create_regular_user();
        let query = TicketQuery::new(&TicketListQuery::default(), &user);
        let builder = build_count_query(&query);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM tickets t WHERE 1 = 1 AND t.user_id = $1"
        );
    }

    #[test]
    fn test_filters_bind_in_order() {
        let admin = create_admin_user();
        let params = TicketListQuery {
            search: Some("vpn".to_string()),
            status: Some("OPEN".to_string()),
            filial: Some("RJ".to_string()),
            date_from: Some("2026-01-01".to_string()),
            date_to: Some("2026-12-31".to_string()),
            ..Default::default()
        };
        let query = TicketQuery::new(&params, &admin);
        let builder = build_count_query(&query);
        let sql = builder.sql();

        assert!(sql.contains("(t.title ILIKE $1 ESCAPE '\\' OR t.content ILIKE $2 ESCAPE '\\')"));
        assert!(sql.contains("t.status = $3"));
        assert!(sql.contains("t.filial = $4"));
        assert!(sql.contains("t.deadline >= $5"));
        assert!(sql.contains("t.deadline <= $6"));
        assert!(!sql.contains("t.priority"));
    }

    #[test]
    fn test_bogus_status_produces_unfiltered_query() {
        let admin = create_admin_user();
        let bogus = TicketListQuery {
            status: Some("BOGUS".to_string()),
            ..Default::default()
        };
        let with_bogus = TicketQuery::new(&bogus, &admin);
        let without = TicketQuery::new(&TicketListQuery::default(), &admin);

        assert_eq!(
            build_page_query(&with_bogus).sql(),
            build_page_query(&without).sql()
        );
    }

    #[test]
    fn test_page_query_sort_and_pagination() {
        let user = create_regular_user();
        let params = TicketListQuery {
            sort_by: Some("title".to_string()),
            sort_order: Some("asc".to_string()),
            page: Some(2),
            size: Some(10),
            ..Default::default()
        };
        let query = TicketQuery::new(&params, &user);
        let builder = build_page_query(&query);
        let sql = builder.sql();

        assert!(sql.contains("LEFT JOIN users u ON u.id = t.user_id"));
        assert!(sql.contains("AND t.user_id = $1"));
        assert!(sql.ends_with("ORDER BY LOWER(t.title) ASC, t.id ASC LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let admin = create_admin_user();
        let query = TicketQuery::new(&TicketListQuery::default(), &admin);
        let builder = build_page_query(&query);
        assert!(builder
            .sql()
            .ends_with("ORDER BY t.created_at DESC, t.id DESC LIMIT $1 OFFSET $2"));
    }
}
