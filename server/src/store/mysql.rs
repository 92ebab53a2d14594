use async_trait::async_trait;
use campus_events_api_types::{Building, BuildingLabel, Category, LocationInfo, PersonSignup};
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions};
use sqlx::{Encode, Executor, QueryBuilder, Row, Type};
use tracing::{debug, info};

use crate::config::Config;
use crate::models::event::{
    EventCategoryRow, EventLocationRow, EventOrganizerRow, EventRow, EventSelection,
};
use crate::models::lookup::{BuildingLabelRow, BuildingRow, CategoryRow, LocationRow};
use crate::models::organizer::{NamedOrganizerRow, OrganizerDetailRow, OrganizerRow};
use crate::models::user::UserRow;
use crate::procedures::{
    FilterArgs, ParamCounts, UploadEventArgs, FILTER_EVENTS, NEW_EVENT_ID_VAR, SIGNUP_ATTENDEE,
    SIGNUP_CLUB, SIGNUP_MESSAGE_VAR, SIGNUP_SCHOOL, SIGNUP_STUDENT_ORGANIZER, UPLOAD_EVENT,
    USER_LOGIN,
};
use crate::store::{EventStore, Signup, StoreResult};

const EVENT_BASE_SELECT: &str = r#"
    SELECT
        e.event_id,
        e.title,
        e.description,
        e.perks,
        e.max_participants,
        e.application_required,
        e.event_type,
        CAST(e.cost AS DECIMAL(10, 2)) AS cost,
        t.start_date,
        t.end_date,
        t.start_time,
        t.end_time,
        MAX(ea.application_deadline) AS application_deadline,
        MAX(eol.online_link) AS online_link,
        e.flyer
    FROM events e
    JOIN timeslots t ON e.timeslot_id = t.timeslot_id
    LEFT JOIN Event_applications ea ON e.event_id = ea.event_id
    LEFT JOIN Event_online_links eol ON e.event_id = eol.event_id
"#;

const EVENT_ORGANIZERS_SELECT: &str = r#"
    SELECT
        eo.event_id,
        eo.organizer_id,
        o.organizer_type,
        cl.club_name,
        sch.name AS school_name,
        NULLIF(CONCAT_WS(' ', att.first_name, att.last_name), '') AS student_name,
        u.email
    FROM event_organizer eo
    JOIN Organizers o ON eo.organizer_id = o.organizer_id
    LEFT JOIN Users u ON o.user_id = u.user_id
    LEFT JOIN Organizer_student os ON o.organizer_id = os.organizer_id
    LEFT JOIN Attendees att ON os.attendee_id = att.attendee_id
    LEFT JOIN Clubs cl ON o.organizer_id = cl.organizer_id
    LEFT JOIN Organizer_school sch ON o.organizer_id = sch.organizer_id
    WHERE eo.event_id IN "#;

const EVENT_CATEGORIES_SELECT: &str = r#"
    SELECT DISTINCT ec.event_id, c.category_name
    FROM event_categories ec
    JOIN categories c ON ec.category_id = c.category_id
    WHERE ec.event_id IN "#;

const EVENT_LOCATIONS_SELECT: &str = r#"
    SELECT el.event_id, l.location_id, l.building, l.label, l.capacity
    FROM event_location el
    JOIN locations l ON el.location_id = l.location_id
    WHERE el.event_id IN "#;

const NAMED_ORGANIZERS_SELECT: &str = r#"
    SELECT
        o.organizer_id,
        o.organizer_type,
        cl.club_name,
        sch.name AS school_name,
        NULLIF(CONCAT_WS(' ', att.first_name, att.last_name), '') AS student_name,
        u.email
    FROM Organizers o
    LEFT JOIN Users u ON o.user_id = u.user_id
    LEFT JOIN Organizer_student os ON o.organizer_id = os.organizer_id
    LEFT JOIN Attendees att ON os.attendee_id = att.attendee_id
    LEFT JOIN Clubs cl ON o.organizer_id = cl.organizer_id
    LEFT JOIN Organizer_school sch ON o.organizer_id = sch.organizer_id
"#;

const ORGANIZER_DETAIL_SELECT: &str = r#"
    SELECT
        o.organizer_id,
        o.organizer_type,
        u.email,
        att.first_name,
        att.last_name,
        cl.club_name,
        cl.club_url,
        cl.contact_email AS club_contact_email,
        sch.name AS school_name,
        sch.department,
        sch.supervisor
    FROM Organizers o
    LEFT JOIN Users u ON o.user_id = u.user_id
    LEFT JOIN Organizer_student os ON o.organizer_id = os.organizer_id
    LEFT JOIN Attendees att ON os.attendee_id = att.attendee_id
    LEFT JOIN Clubs cl ON o.organizer_id = cl.organizer_id
    LEFT JOIN Organizer_school sch ON o.organizer_id = sch.organizer_id
    WHERE o.organizer_id = ?
    LIMIT 1
"#;

const BUILDINGS_SELECT: &str = r#"
    SELECT
        building,
        COUNT(*) AS label_count,
        MAX(capacity) AS max_capacity,
        GROUP_CONCAT(label ORDER BY label SEPARATOR ', ') AS all_labels
    FROM Locations
    GROUP BY building
    ORDER BY building
"#;

/// Appends `(?, ?, ...)` with one bind per value.
fn push_in_list<'args, T>(query: &mut QueryBuilder<'args, MySql>, values: &[T])
where
    T: Clone + Encode<'args, MySql> + Type<MySql> + Send + 'args,
{
    query.push("(");
    let mut separated = query.separated(", ");
    for value in values {
        separated.push_bind(value.clone());
    }
    separated.push_unseparated(")");
}

/// Some signup procedures insert into columns without defaults.
const SIGNUP_SQL_MODE: &str = "SET SESSION sql_mode = ''";
const SIGNUP_POOL_CONNECTIONS: u32 = 2;

/// Connections of this pool run with a relaxed `sql_mode` and are only used for signups, so the
/// shared pool keeps the server's strict mode.
fn signup_pool_options() -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(SIGNUP_POOL_CONNECTIONS)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute(SIGNUP_SQL_MODE).await?;
                Ok(())
            })
        })
}

/// [EventStore] backed by MySQL connection pools.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    signup_pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, signup_pool: MySqlPool) -> Self {
        Self { pool, signup_pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        let signup_pool = signup_pool_options().connect_lazy(&config.database_url)?;
        info!(
            max_connections = config.max_connections,
            "Successfully connected to database"
        );
        Ok(Self::new(pool, signup_pool))
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn bind_person<'q>(
    query: sqlx::query::Query<'q, MySql, sqlx::mysql::MySqlArguments>,
    signup: &'q PersonSignup,
) -> sqlx::query::Query<'q, MySql, sqlx::mysql::MySqlArguments> {
    query
        .bind(signup.email.as_deref())
        .bind(signup.password.as_deref())
        .bind(signup.first_name.as_deref())
        .bind(signup.last_name.as_deref())
        .bind(signup.net_id.as_deref())
        .bind(signup.grad_year)
}

#[async_trait]
impl EventStore for MySqlStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn routine_params(&self, name: &str) -> StoreResult<Option<ParamCounts>> {
        let routines: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.routines
             WHERE routine_schema = DATABASE() AND routine_name = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        if routines == 0 {
            return Ok(None);
        }

        let row = sqlx::query(
            "SELECT
                CAST(COALESCE(SUM(parameter_mode = 'IN'), 0) AS SIGNED) AS inputs,
                CAST(COALESCE(SUM(parameter_mode IN ('OUT', 'INOUT')), 0) AS SIGNED) AS outputs
             FROM information_schema.parameters
             WHERE specific_schema = DATABASE() AND specific_name = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        let inputs: i64 = row.try_get("inputs")?;
        let outputs: i64 = row.try_get("outputs")?;
        Ok(Some(ParamCounts {
            inputs: inputs.max(0) as usize,
            outputs: outputs.max(0) as usize,
        }))
    }

    async fn event_rows(&self, selection: &EventSelection) -> StoreResult<Vec<EventRow>> {
        let mut query = QueryBuilder::<MySql>::new(EVENT_BASE_SELECT);
        match selection {
            EventSelection::All => {}
            EventSelection::ById(id) => {
                query.push(" WHERE e.event_id = ").push_bind(*id);
            }
            EventSelection::ByIds(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                query.push(" WHERE e.event_id IN ");
                push_in_list(&mut query, ids);
            }
            EventSelection::ByOrganizer(organizer_id) => {
                query
                    .push(" WHERE e.event_id IN (SELECT eo.event_id FROM event_organizer eo")
                    .push(" WHERE eo.organizer_id = ")
                    .push_bind(*organizer_id)
                    .push(")");
            }
        }
        query.push(" GROUP BY e.event_id ORDER BY t.start_date DESC, t.start_time DESC");

        query
            .build_query_as::<EventRow>()
            .fetch_all(&self.pool)
            .await
    }

    async fn event_organizers(&self, event_ids: &[i32]) -> StoreResult<Vec<EventOrganizerRow>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<MySql>::new(EVENT_ORGANIZERS_SELECT);
        push_in_list(&mut query, event_ids);
        query.push(" ORDER BY eo.event_id, eo.organizer_id");
        query
            .build_query_as::<EventOrganizerRow>()
            .fetch_all(&self.pool)
            .await
    }

    async fn event_categories(&self, event_ids: &[i32]) -> StoreResult<Vec<EventCategoryRow>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<MySql>::new(EVENT_CATEGORIES_SELECT);
        push_in_list(&mut query, event_ids);
        query.push(" ORDER BY c.category_name");
        query
            .build_query_as::<EventCategoryRow>()
            .fetch_all(&self.pool)
            .await
    }

    async fn event_locations(&self, event_ids: &[i32]) -> StoreResult<Vec<EventLocationRow>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<MySql>::new(EVENT_LOCATIONS_SELECT);
        push_in_list(&mut query, event_ids);
        query.push(" ORDER BY el.event_id, l.location_id");
        query
            .build_query_as::<EventLocationRow>()
            .fetch_all(&self.pool)
            .await
    }

    async fn organizer_ids_by_name(&self, names: &[String]) -> StoreResult<Vec<i32>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<MySql>::new(
            "SELECT DISTINCT o.organizer_id
             FROM Organizers o
             LEFT JOIN Organizer_student os ON o.organizer_id = os.organizer_id
             LEFT JOIN Attendees att ON os.attendee_id = att.attendee_id
             LEFT JOIN Clubs cl ON o.organizer_id = cl.organizer_id
             LEFT JOIN Organizer_school sch ON o.organizer_id = sch.organizer_id
             WHERE cl.club_name IN ",
        );
        push_in_list(&mut query, names);
        query.push(" OR sch.name IN ");
        push_in_list(&mut query, names);
        query.push(" OR CONCAT_WS(' ', att.first_name, att.last_name) IN ");
        push_in_list(&mut query, names);

        query
            .build_query_scalar::<i32>()
            .fetch_all(&self.pool)
            .await
    }

    async fn filter_event_ids(&self, args: &FilterArgs) -> StoreResult<Vec<i32>> {
        let sql = FILTER_EVENTS.call_sql(&[]);
        debug!(?args, "Calling filter_events");
        let rows = sqlx::query(&sql)
            .bind(args.start_date)
            .bind(args.end_date)
            .bind(args.event_type.map(|t| t.as_str()))
            .bind(args.categories.as_deref())
            .bind(args.organizer_ids.as_deref())
            .bind(args.locations.as_deref())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<i32, _>("event_id"))
            .collect()
    }

    async fn upload_event(&self, args: &UploadEventArgs) -> StoreResult<Option<i64>> {
        // The OUT parameter lives in the session, so everything runs on one connection.
        let mut conn = self.pool.acquire().await?;

        sqlx::query(&format!("SET {} = NULL", NEW_EVENT_ID_VAR))
            .execute(&mut *conn)
            .await?;

        let sql = UPLOAD_EVENT.call_sql(&[NEW_EVENT_ID_VAR]);
        sqlx::query(&sql)
            .bind(&args.title)
            .bind(&args.description)
            .bind(args.perks.as_deref())
            .bind(args.max_participants)
            .bind(args.application_required)
            .bind(args.application_link.as_deref())
            .bind(args.application_deadline)
            .bind(args.flyer.as_deref())
            .bind(args.event_type.as_str())
            .bind(args.online_link.as_deref())
            .bind(args.building.as_deref())
            .bind(args.label.as_deref())
            .bind(args.start_date)
            .bind(args.end_date)
            .bind(args.start_time)
            .bind(args.end_time)
            .bind(args.cost)
            .bind(args.organizer_id)
            .bind(&args.collaborating_organizers)
            .bind(&args.category_ids)
            .execute(&mut *conn)
            .await?;

        sqlx::query_scalar::<_, Option<i64>>(&format!(
            "SELECT CAST({} AS SIGNED) AS event_id",
            NEW_EVENT_ID_VAR
        ))
        .fetch_one(&mut *conn)
        .await
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT category_id, category_name FROM categories ORDER BY category_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn locations(&self) -> StoreResult<Vec<LocationInfo>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT building, label, capacity FROM locations ORDER BY building, label",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LocationInfo::from).collect())
    }

    async fn buildings(&self) -> StoreResult<Vec<Building>> {
        let rows = sqlx::query_as::<_, BuildingRow>(BUILDINGS_SELECT)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Building::from).collect())
    }

    async fn building_labels(&self, building: &str) -> StoreResult<Vec<BuildingLabel>> {
        let rows = sqlx::query_as::<_, BuildingLabelRow>(
            "SELECT location_id, label, capacity FROM Locations WHERE building = ? ORDER BY label",
        )
        .bind(building)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BuildingLabel::from).collect())
    }

    async fn organizers(&self) -> StoreResult<Vec<OrganizerRow>> {
        sqlx::query_as::<_, OrganizerRow>(
            "SELECT organizer_id, organizer_type FROM Organizers ORDER BY organizer_id",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn named_organizers(&self) -> StoreResult<Vec<NamedOrganizerRow>> {
        sqlx::query_as::<_, NamedOrganizerRow>(NAMED_ORGANIZERS_SELECT)
            .fetch_all(&self.pool)
            .await
    }

    async fn organizer_detail(
        &self,
        organizer_id: i32,
    ) -> StoreResult<Option<OrganizerDetailRow>> {
        sqlx::query_as::<_, OrganizerDetailRow>(ORGANIZER_DETAIL_SELECT)
            .bind(organizer_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn user(&self, user_id: i32) -> StoreResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT user_id, user_type, email FROM Users WHERE user_id = ? LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn club_id_for_organizer(&self, organizer_id: i32) -> StoreResult<Option<i32>> {
        sqlx::query_scalar("SELECT club_id FROM Clubs WHERE organizer_id = ? LIMIT 1")
            .bind(organizer_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn attendee_exists(&self, attendee_id: i32) -> StoreResult<bool> {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT attendee_id FROM Attendees WHERE attendee_id = ? LIMIT 1")
                .bind(attendee_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn attendee_id_for_user(&self, user_id: i32) -> StoreResult<Option<i32>> {
        sqlx::query_scalar("SELECT attendee_id FROM Attendees WHERE user_id = ? LIMIT 1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_attendee_for_user(&self, user_id: i32) -> StoreResult<Option<i32>> {
        sqlx::query(
            "INSERT IGNORE INTO Attendees (user_id, first_name, last_name, email)
             SELECT user_id, SUBSTRING_INDEX(email, '@', 1), '', email
             FROM Users WHERE user_id = ?",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        self.attendee_id_for_user(user_id).await
    }

    async fn add_club_member(
        &self,
        club_id: i32,
        attendee_id: i32,
        remind_required: bool,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT IGNORE INTO Club_members (club_id, attendee_id, remind_required) VALUES (?, ?, ?)",
        )
        .bind(club_id)
        .bind(attendee_id)
        .bind(i8::from(remind_required))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_club_member(&self, club_id: i32, attendee_id: i32) -> StoreResult<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM Club_members WHERE club_id = ? AND attendee_id = ? LIMIT 1",
        )
        .bind(club_id)
        .bind(attendee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn save_category_preferences(
        &self,
        attendee_id: i32,
        category_ids: &[i32],
    ) -> StoreResult<()> {
        if category_ids.is_empty() {
            return Ok(());
        }
        let mut query = QueryBuilder::<MySql>::new(
            "INSERT IGNORE INTO Attendee_category_preferences (attendee_id, category_id) ",
        );
        query.push_values(category_ids, |mut row, category_id| {
            row.push_bind(attendee_id).push_bind(*category_id);
        });
        query.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn save_club_reminders(&self, attendee_id: i32, club_ids: &[i32]) -> StoreResult<()> {
        if club_ids.is_empty() {
            return Ok(());
        }
        let mut query = QueryBuilder::<MySql>::new(
            "INSERT INTO Club_members (club_id, attendee_id, remind_required) ",
        );
        query.push_values(club_ids, |mut row, club_id| {
            row.push_bind(*club_id).push_bind(attendee_id).push_bind(1_i8);
        });
        query.push(" ON DUPLICATE KEY UPDATE remind_required = 1");
        query.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> StoreResult<Option<i32>> {
        let sql = USER_LOGIN.select_sql("user_id");
        let user_id: Option<i64> = sqlx::query_scalar(&sql)
            .bind(email)
            .bind(password)
            .fetch_one(&self.pool)
            .await?;
        Ok(user_id
            .filter(|id| *id > 0)
            .and_then(|id| i32::try_from(id).ok()))
    }

    async fn signup(&self, signup: Signup<'_>) -> StoreResult<Option<String>> {
        let mut conn = self.signup_pool.acquire().await?;
        sqlx::query(&format!("SET {} = NULL", SIGNUP_MESSAGE_VAR))
            .execute(&mut *conn)
            .await?;

        let out = [SIGNUP_MESSAGE_VAR];
        match signup {
            Signup::Attendee(s) => {
                let sql = SIGNUP_ATTENDEE.call_sql(&out);
                bind_person(sqlx::query(&sql), s).execute(&mut *conn).await?;
            }
            Signup::StudentOrganizer(s) => {
                let sql = SIGNUP_STUDENT_ORGANIZER.call_sql(&out);
                bind_person(sqlx::query(&sql), s).execute(&mut *conn).await?;
            }
            Signup::Club(s) => {
                let sql = SIGNUP_CLUB.call_sql(&out);
                sqlx::query(&sql)
                    .bind(s.email.as_deref())
                    .bind(s.password.as_deref())
                    .bind(s.club_name.as_deref())
                    .bind(s.club_url.as_deref())
                    .bind(s.contact_email.as_deref())
                    .bind(s.year_founded)
                    .execute(&mut *conn)
                    .await?;
            }
            Signup::School(s) => {
                let sql = SIGNUP_SCHOOL.call_sql(&out);
                sqlx::query(&sql)
                    .bind(s.email.as_deref())
                    .bind(s.password.as_deref())
                    .bind(s.department.as_deref())
                    .bind(s.name.as_deref())
                    .bind(s.supervisor.as_deref())
                    .execute(&mut *conn)
                    .await?;
            }
        }

        sqlx::query_scalar::<_, Option<String>>(&format!(
            "SELECT CAST({} AS CHAR) AS message",
            SIGNUP_MESSAGE_VAR
        ))
        .fetch_one(&mut *conn)
        .await
    }

    async fn set_attendee_major(&self, email: &str, major: &str) -> StoreResult<bool> {
        let user_id: Option<i32> =
            sqlx::query_scalar("SELECT user_id FROM Users WHERE email = ? LIMIT 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        let Some(user_id) = user_id else {
            return Ok(false);
        };
        sqlx::query("UPDATE Attendees SET major = ? WHERE user_id = ?")
            .bind(major)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(true)
    }
}
