use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS session_state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            trading_date TEXT NOT NULL,
            payload TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS signals (
            id TEXT PRIMARY KEY,
            trading_date TEXT NOT NULL,
            strike_key TEXT NOT NULL,
            score INTEGER NOT NULL,
            tier TEXT NOT NULL,
            decision TEXT,
            payload TEXT NOT NULL,
            detected_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_signals_date ON signals(trading_date);
        CREATE INDEX IF NOT EXISTS idx_signals_detected ON signals(detected_at);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
