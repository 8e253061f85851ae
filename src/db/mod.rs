pub mod queries;

use crate::tracker::parser::PlanDay;
use crate::tracker::{ChecklistItem, Day, DayStatus, Milestone, Mood, Tracker};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummary {
    pub slug: String,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub total_days: u32,
    pub daily_hours: f64,
    pub days_logged: u32,
    pub days_completed: u32,
}

#[derive(Debug, Clone)]
pub struct NewTracker {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub total_days: u32,
    pub daily_hours: f64,
}

/// Partial day update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct DayUpdate {
    pub title: Option<String>,
    pub status: Option<DayStatus>,
    pub hours_logged: Option<f64>,
    pub notes: Option<String>,
    pub mood: Option<Mood>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub parsed: usize,
    pub created: usize,
    pub updated: usize,
}

struct DayRow {
    day_number: u32,
    title: String,
    status: String,
    hours_logged: f64,
    notes: String,
    mood: String,
    checklist_json: String,
}

impl DayRow {
    fn into_day(self) -> Result<Day> {
        let checklist = serde_json::from_str(&self.checklist_json).with_context(|| {
            format!("Failed to parse checklist of day {}", self.day_number)
        })?;

        Ok(Day {
            day_number: self.day_number,
            title: self.title,
            status: self.status.parse()?,
            hours_logged: self.hours_logged,
            notes: self.notes,
            mood: self.mood.parse()?,
            checklist,
        })
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite DB: {}", path.display()))?;
        conn.pragma_update(None, "foreign_keys", true)
            .context("Failed to enable foreign keys")?;

        let database = Self { conn };
        database.init_schema()?;

        Ok(database)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize schema")
                    .map(|_| ())
            })
    }

    /// Returns `false` when the slug is already taken.
    pub fn create_tracker(&self, tracker: &NewTracker) -> Result<bool> {
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO trackers (slug, title, description, start_date, total_days, daily_hours, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    tracker.slug,
                    tracker.title,
                    tracker.description,
                    tracker.start_date,
                    tracker.total_days,
                    tracker.daily_hours,
                    Utc::now().timestamp()
                ],
            )
            .context("Failed to insert tracker")?;

        Ok(inserted > 0)
    }

    pub fn tracker_id(&self, slug: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM trackers WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up tracker")
    }

    pub fn tracker_count(&self) -> Result<u32> {
        self.conn
            .query_row("SELECT COUNT(*) FROM trackers", [], |row| row.get(0))
            .context("Failed to count trackers")
    }

    pub fn list_trackers(&self) -> Result<Vec<TrackerSummary>> {
        let mut statement = self.conn.prepare(
            "SELECT t.slug, t.title, t.start_date, t.total_days, t.daily_hours,
                    (SELECT COUNT(*) FROM days d WHERE d.tracker_id = t.id),
                    (SELECT COUNT(*) FROM days d WHERE d.tracker_id = t.id AND d.status = 'completed')
             FROM trackers t
             ORDER BY t.created_at DESC, t.id DESC",
        )?;

        let rows = statement
            .query_map([], |row| {
                Ok(TrackerSummary {
                    slug: row.get(0)?,
                    title: row.get(1)?,
                    start_date: row.get(2)?,
                    total_days: row.get(3)?,
                    daily_hours: row.get(4)?,
                    days_logged: row.get(5)?,
                    days_completed: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list trackers")?;

        Ok(rows)
    }

    pub fn load_tracker(&self, slug: &str) -> Result<Option<Tracker>> {
        let header = self
            .conn
            .query_row(
                "SELECT id, slug, title, description, start_date, total_days, daily_hours
                 FROM trackers WHERE slug = ?1",
                params![slug],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        Tracker {
                            slug: row.get(1)?,
                            title: row.get(2)?,
                            description: row.get(3)?,
                            start_date: row.get(4)?,
                            total_days: row.get(5)?,
                            daily_hours: row.get(6)?,
                            milestones: Vec::new(),
                            days: Vec::new(),
                        },
                    ))
                },
            )
            .optional()
            .context("Failed to load tracker")?;

        let Some((tracker_id, mut tracker)) = header else {
            return Ok(None);
        };

        tracker.days = self.days_for_tracker(tracker_id)?;
        tracker.milestones = self.milestones_for_tracker(tracker_id)?;

        Ok(Some(tracker))
    }

    pub fn delete_tracker(&self, slug: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM trackers WHERE slug = ?1", params![slug])
            .context("Failed to delete tracker")?;

        Ok(deleted > 0)
    }

    pub fn days_for_tracker(&self, tracker_id: i64) -> Result<Vec<Day>> {
        let mut statement = self.conn.prepare(
            "SELECT day_number, title, status, hours_logged, notes, mood, checklist_json
             FROM days
             WHERE tracker_id = ?1
             ORDER BY day_number ASC",
        )?;

        let rows = statement
            .query_map(params![tracker_id], |row| {
                Ok(DayRow {
                    day_number: row.get(0)?,
                    title: row.get(1)?,
                    status: row.get(2)?,
                    hours_logged: row.get(3)?,
                    notes: row.get(4)?,
                    mood: row.get(5)?,
                    checklist_json: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query days")?;

        rows.into_iter().map(DayRow::into_day).collect()
    }

    /// Upserts parsed plan days. Existing day numbers get their title and
    /// checklist replaced while status, hours, notes and mood are kept.
    pub fn import_plan(&mut self, tracker_id: i64, plan: &[PlanDay]) -> Result<ImportSummary> {
        let now = Utc::now().timestamp();
        let transaction = self
            .conn
            .transaction()
            .context("Failed to start transaction")?;

        let mut summary = ImportSummary {
            parsed: plan.len(),
            ..ImportSummary::default()
        };

        for day in plan {
            let exists = transaction
                .query_row(
                    "SELECT 1 FROM days WHERE tracker_id = ?1 AND day_number = ?2",
                    params![tracker_id, day.day_number],
                    |_| Ok(()),
                )
                .optional()
                .context("Failed to look up day")?
                .is_some();

            let checklist_json = serde_json::to_string(&day.checklist)
                .context("Failed to serialize checklist")?;
            transaction
                .execute(
                    queries::UPSERT_PLAN_DAY,
                    params![tracker_id, day.day_number, day.title, checklist_json, now],
                )
                .with_context(|| format!("Failed to import day {}", day.day_number))?;

            if exists {
                summary.updated += 1;
            } else {
                summary.created += 1;
            }
        }

        transaction.commit().context("Failed to commit import")?;
        Ok(summary)
    }

    /// Returns `false` when the day number already exists for the tracker.
    pub fn create_day(&self, tracker_id: i64, day: &Day) -> Result<bool> {
        let checklist_json =
            serde_json::to_string(&day.checklist).context("Failed to serialize checklist")?;

        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO days (tracker_id, day_number, title, status, hours_logged, notes, mood, checklist_json, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    tracker_id,
                    day.day_number,
                    day.title,
                    day.status.as_str(),
                    day.hours_logged,
                    day.notes,
                    day.mood.as_str(),
                    checklist_json,
                    Utc::now().timestamp()
                ],
            )
            .context("Failed to insert day")?;

        Ok(inserted > 0)
    }

    /// Returns `false` when the day does not exist.
    pub fn update_day(&self, tracker_id: i64, day_number: u32, update: &DayUpdate) -> Result<bool> {
        let checklist_json = update
            .checklist
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to serialize checklist")?;

        let updated = self
            .conn
            .execute(
                "UPDATE days SET
                   title = COALESCE(?1, title),
                   status = COALESCE(?2, status),
                   hours_logged = COALESCE(?3, hours_logged),
                   notes = COALESCE(?4, notes),
                   mood = COALESCE(?5, mood),
                   checklist_json = COALESCE(?6, checklist_json),
                   updated_at = ?7
                 WHERE tracker_id = ?8 AND day_number = ?9",
                params![
                    update.title,
                    update.status.map(DayStatus::as_str),
                    update.hours_logged,
                    update.notes,
                    update.mood.map(Mood::as_str),
                    checklist_json,
                    Utc::now().timestamp(),
                    tracker_id,
                    day_number
                ],
            )
            .context("Failed to update day")?;

        Ok(updated > 0)
    }

    pub fn delete_day(&self, tracker_id: i64, day_number: u32) -> Result<bool> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM days WHERE tracker_id = ?1 AND day_number = ?2",
                params![tracker_id, day_number],
            )
            .context("Failed to delete day")?;

        Ok(deleted > 0)
    }

    /// Flips one checklist item. `None` when the day or index does not exist.
    pub fn toggle_checklist_item(
        &mut self,
        tracker_id: i64,
        day_number: u32,
        index: usize,
    ) -> Result<Option<ChecklistItem>> {
        let transaction = self
            .conn
            .transaction()
            .context("Failed to start transaction")?;

        let stored = transaction
            .query_row(
                "SELECT checklist_json FROM days WHERE tracker_id = ?1 AND day_number = ?2",
                params![tracker_id, day_number],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to load checklist")?;

        let Some(stored) = stored else {
            return Ok(None);
        };

        let mut checklist: Vec<ChecklistItem> =
            serde_json::from_str(&stored).context("Failed to parse checklist")?;
        let Some(item) = checklist.get_mut(index) else {
            return Ok(None);
        };
        item.completed = !item.completed;
        let toggled = item.clone();

        let checklist_json =
            serde_json::to_string(&checklist).context("Failed to serialize checklist")?;
        transaction
            .execute(
                "UPDATE days SET checklist_json = ?1, updated_at = ?2 WHERE tracker_id = ?3 AND day_number = ?4",
                params![checklist_json, Utc::now().timestamp(), tracker_id, day_number],
            )
            .context("Failed to update checklist")?;
        transaction
            .commit()
            .context("Failed to commit checklist toggle")?;

        Ok(Some(toggled))
    }

    pub fn milestones_for_tracker(&self, tracker_id: i64) -> Result<Vec<Milestone>> {
        let mut statement = self.conn.prepare(
            "SELECT title, day_number, completed
             FROM milestones
             WHERE tracker_id = ?1
             ORDER BY day_number ASC, id ASC",
        )?;

        let rows = statement
            .query_map(params![tracker_id], |row| {
                Ok(Milestone {
                    title: row.get(0)?,
                    day_number: row.get(1)?,
                    completed: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query milestones")?;

        Ok(rows)
    }

    pub fn add_milestone(&self, tracker_id: i64, milestone: &Milestone) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO milestones (tracker_id, title, day_number, completed) VALUES (?1, ?2, ?3, ?4)",
                params![
                    tracker_id,
                    milestone.title,
                    milestone.day_number,
                    milestone.completed
                ],
            )
            .context("Failed to insert milestone")?;

        Ok(())
    }

    /// Flips the milestone at `index` in display order.
    pub fn toggle_milestone(&self, tracker_id: i64, index: usize) -> Result<Option<Milestone>> {
        let Some(milestone_id) = self.milestone_id_at(tracker_id, index)? else {
            return Ok(None);
        };

        self.conn
            .execute(
                "UPDATE milestones SET completed = NOT completed WHERE id = ?1",
                params![milestone_id],
            )
            .context("Failed to toggle milestone")?;

        self.conn
            .query_row(
                "SELECT title, day_number, completed FROM milestones WHERE id = ?1",
                params![milestone_id],
                |row| {
                    Ok(Milestone {
                        title: row.get(0)?,
                        day_number: row.get(1)?,
                        completed: row.get(2)?,
                    })
                },
            )
            .optional()
            .context("Failed to reload milestone")
    }

    pub fn delete_milestone(&self, tracker_id: i64, index: usize) -> Result<bool> {
        let Some(milestone_id) = self.milestone_id_at(tracker_id, index)? else {
            return Ok(false);
        };

        let deleted = self
            .conn
            .execute("DELETE FROM milestones WHERE id = ?1", params![milestone_id])
            .context("Failed to delete milestone")?;

        Ok(deleted > 0)
    }

    fn milestone_id_at(&self, tracker_id: i64, index: usize) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM milestones
                 WHERE tracker_id = ?1
                 ORDER BY day_number ASC, id ASC
                 LIMIT 1 OFFSET ?2",
                params![tracker_id, index as i64],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up milestone")
    }
}
