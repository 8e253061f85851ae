pub const CREATE_TRACKERS: &str = r#"
CREATE TABLE IF NOT EXISTS trackers (
  id           INTEGER PRIMARY KEY AUTOINCREMENT,
  slug         TEXT NOT NULL UNIQUE,
  title        TEXT NOT NULL,
  description  TEXT NOT NULL DEFAULT '',
  start_date   TEXT,
  total_days   INTEGER NOT NULL DEFAULT 0,
  daily_hours  REAL NOT NULL DEFAULT 0,
  created_at   INTEGER NOT NULL
);
"#;

pub const CREATE_DAYS: &str = r#"
CREATE TABLE IF NOT EXISTS days (
  id             INTEGER PRIMARY KEY AUTOINCREMENT,
  tracker_id     INTEGER NOT NULL REFERENCES trackers(id) ON DELETE CASCADE,
  day_number     INTEGER NOT NULL,
  title          TEXT NOT NULL DEFAULT '',
  status         TEXT NOT NULL DEFAULT 'pending',
  hours_logged   REAL NOT NULL DEFAULT 0,
  notes          TEXT NOT NULL DEFAULT '',
  mood           TEXT NOT NULL DEFAULT '',
  checklist_json TEXT NOT NULL DEFAULT '[]',
  updated_at     INTEGER NOT NULL,
  UNIQUE(tracker_id, day_number)
);
"#;

pub const CREATE_MILESTONES: &str = r#"
CREATE TABLE IF NOT EXISTS milestones (
  id          INTEGER PRIMARY KEY AUTOINCREMENT,
  tracker_id  INTEGER NOT NULL REFERENCES trackers(id) ON DELETE CASCADE,
  title       TEXT NOT NULL,
  day_number  INTEGER NOT NULL,
  completed   INTEGER NOT NULL DEFAULT 0
);
"#;

pub const INDEX_DAYS_TRACKER: &str =
    "CREATE INDEX IF NOT EXISTS idx_days_tracker ON days(tracker_id, day_number);";

pub const INDEX_MILESTONES_TRACKER: &str =
    "CREATE INDEX IF NOT EXISTS idx_milestones_tracker ON milestones(tracker_id);";

pub const UPSERT_PLAN_DAY: &str = r#"
INSERT INTO days (tracker_id, day_number, title, checklist_json, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(tracker_id, day_number)
DO UPDATE SET title=excluded.title, checklist_json=excluded.checklist_json, updated_at=excluded.updated_at
"#;

pub fn schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_TRACKERS,
        CREATE_DAYS,
        CREATE_MILESTONES,
        INDEX_DAYS_TRACKER,
        INDEX_MILESTONES_TRACKER,
    ]
}
