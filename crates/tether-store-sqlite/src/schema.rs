//! SQL schema for the Tether SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- brn/tin are the human-facing owner designators; each must name at most
-- one user. SQLite UNIQUE admits any number of NULLs, so users carrying
-- only one of the two are unaffected.
CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    created_at   TEXT NOT NULL,
    full_name    TEXT NOT NULL,
    email        TEXT NOT NULL UNIQUE,
    address      TEXT,
    phone_number TEXT,
    brn          TEXT UNIQUE,
    tin          TEXT UNIQUE,
    category     TEXT
);

-- Device-variant fields are flat nullable columns so the per-kind
-- identifiers (serial_number, imei) can carry UNIQUE indexes.
CREATE TABLE IF NOT EXISTS gadgets (
    gadget_id         TEXT PRIMARY KEY,
    owner_id          TEXT NOT NULL REFERENCES users(user_id),
    device_type       TEXT NOT NULL,   -- 'phone' | 'laptop'
    model             TEXT NOT NULL,
    brand             TEXT NOT NULL,
    serial_number     TEXT NOT NULL UNIQUE,
    color             TEXT,
    description       TEXT NOT NULL,
    purchase_location TEXT NOT NULL,
    registration_date TEXT NOT NULL,   -- ISO 8601 UTC
    storage_size      TEXT NOT NULL,
    -- phone-only
    imei              TEXT UNIQUE,
    sim_type          TEXT,
    phone_number      TEXT,
    network           TEXT,
    -- laptop-only
    device_id         TEXT,
    ram               TEXT
);

-- The ownership-reference set. The primary key makes duplicate references
-- impossible; the transfer transaction keeps this table and
-- gadgets.owner_id mutually consistent.
CREATE TABLE IF NOT EXISTS user_gadgets (
    user_id   TEXT NOT NULL REFERENCES users(user_id),
    gadget_id TEXT NOT NULL REFERENCES gadgets(gadget_id),
    PRIMARY KEY (user_id, gadget_id)
);

-- Reports are strictly write-once.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS reports (
    report_id           TEXT PRIMARY KEY,
    gadget_id           TEXT NOT NULL REFERENCES gadgets(gadget_id),
    date_last_seen      TEXT NOT NULL,
    location_last_seen  TEXT NOT NULL,
    contact_information TEXT NOT NULL,
    gadget_color        TEXT,
    person_reporting    TEXT NOT NULL,
    description         TEXT NOT NULL,
    report_date         TEXT NOT NULL,
    comments            TEXT,
    filed_at            TEXT NOT NULL   -- server-assigned
);

-- Notifications are strictly append-only.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    message         TEXT NOT NULL,
    date            TEXT NOT NULL,      -- server-assigned
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    kind            TEXT NOT NULL,      -- 'Transfer' | 'Report' | ...
    gadget_id       TEXT REFERENCES gadgets(gadget_id)
);

CREATE INDEX IF NOT EXISTS gadgets_owner_idx      ON gadgets(owner_id);
CREATE INDEX IF NOT EXISTS reports_gadget_idx     ON reports(gadget_id);
CREATE INDEX IF NOT EXISTS notifications_user_idx ON notifications(user_id);

PRAGMA user_version = 1;
";
