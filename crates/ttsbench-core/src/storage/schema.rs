pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
  id TEXT PRIMARY KEY,
  created_at TEXT NOT NULL,
  prompts_path TEXT,
  seed INTEGER,
  notes TEXT
);

CREATE TABLE IF NOT EXISTS models (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id TEXT REFERENCES runs(id),
  name TEXT,
  description TEXT,
  available BOOLEAN
);

CREATE TABLE IF NOT EXISTS prompts (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id TEXT REFERENCES runs(id),
  prompt_id TEXT,
  text TEXT,
  language TEXT,
  style TEXT
);

CREATE TABLE IF NOT EXISTS outputs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id TEXT REFERENCES runs(id),
  model_id INTEGER REFERENCES models(id),
  prompt_id INTEGER REFERENCES prompts(id),
  audio_path TEXT,
  sample_rate INTEGER
);

CREATE TABLE IF NOT EXISTS metrics (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  output_id INTEGER REFERENCES outputs(id),
  name TEXT,
  value REAL
);
"#;
