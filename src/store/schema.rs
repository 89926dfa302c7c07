// SPDX-License-Identifier: MPL-2.0

/// SQL schema for the local store database
pub const SCHEMA: &str = r#"
-- Database version for migrations
PRAGMA user_version = 1;

-- local_storage: one serialized record per key, overwritten wholesale
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
