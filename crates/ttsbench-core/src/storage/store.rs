use crate::errors::BenchError;
use crate::model::{MetricMap, ModelRow, PromptRow, RunInfo};
use anyhow::Context;
use rusqlite::{params, Connection, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Append-only results database for one run directory.
///
/// Each write method commits its own transaction, so a crash between calls
/// leaves earlier units intact and later ones absent.
#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite db {}", path.display()))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("results store lock poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    /// Inserts the run row. A run id already present is
    /// [`BenchError::DuplicateRun`]; the existing row is left untouched.
    pub fn insert_run(&self, run: &RunInfo) -> anyhow::Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let res = tx.execute(
            "INSERT INTO runs(id, created_at, prompts_path, seed, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run.run_id,
                run.created_at.to_rfc3339(),
                run.prompts_path,
                run.seed as i64,
                run.notes
            ],
        );
        match res {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let prior_seed = Self::query_seed(&tx, &run.run_id)?;
                return Err(BenchError::DuplicateRun {
                    run_id: run.run_id.clone(),
                    prior_seed,
                }
                .into());
            }
            Err(e) => return Err(e).context("insert run"),
        }
        tx.commit()?;
        Ok(())
    }

    /// Inserts all model rows in one transaction; ids are returned in input
    /// order.
    pub fn insert_models(&self, run_id: &str, models: &[ModelRow]) -> anyhow::Result<Vec<i64>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(models.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO models(run_id, name, description, available) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for m in models {
                stmt.execute(params![run_id, m.name, m.description, m.available])
                    .with_context(|| format!("insert model {}", m.name))?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    pub fn insert_prompts(&self, run_id: &str, prompts: &[PromptRow]) -> anyhow::Result<Vec<i64>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(prompts.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO prompts(run_id, prompt_id, text, language, style) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for p in prompts {
                stmt.execute(params![run_id, p.id, p.text, p.language, p.style])
                    .with_context(|| format!("insert prompt {}", p.id))?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Inserts one output row and its metric rows atomically. Returns the
    /// output id.
    pub fn insert_output(
        &self,
        run_id: &str,
        model_id: i64,
        prompt_id: i64,
        audio_path: &str,
        sample_rate: u32,
        metrics: &MetricMap,
    ) -> anyhow::Result<i64> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let output_id =
            Self::insert_output_tx(&tx, run_id, model_id, prompt_id, audio_path, sample_rate)?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO metrics(output_id, name, value) VALUES (?1, ?2, ?3)")?;
            for (name, value) in metrics {
                stmt.execute(params![output_id, name, value])
                    .with_context(|| format!("insert metric {}", name))?;
            }
        }
        tx.commit()?;
        Ok(output_id)
    }

    fn insert_output_tx(
        tx: &Transaction,
        run_id: &str,
        model_id: i64,
        prompt_id: i64,
        audio_path: &str,
        sample_rate: u32,
    ) -> anyhow::Result<i64> {
        tx.execute(
            "INSERT INTO outputs(run_id, model_id, prompt_id, audio_path, sample_rate)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, model_id, prompt_id, audio_path, sample_rate],
        )
        .context("insert output")?;
        Ok(tx.last_insert_rowid())
    }

    pub fn fetch_metrics(&self, output_id: i64) -> anyhow::Result<MetricMap> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT name, value FROM metrics WHERE output_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![output_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;
        let mut out = MetricMap::new();
        for r in rows {
            let (name, value) = r?;
            out.insert(name, value);
        }
        Ok(out)
    }

    pub fn fetch_run_seed(&self, run_id: &str) -> anyhow::Result<Option<u64>> {
        let conn = self.lock()?;
        Self::query_seed(&conn, run_id)
    }

    fn query_seed(conn: &Connection, run_id: &str) -> anyhow::Result<Option<u64>> {
        let mut stmt = conn.prepare("SELECT seed FROM runs WHERE id = ?1")?;
        let mut rows = stmt.query(params![run_id])?;
        if let Some(row) = rows.next()? {
            Ok(row.get::<_, Option<i64>>(0)?.map(|s| s as u64))
        } else {
            Ok(None)
        }
    }

    pub fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        // Allowlist: the name is interpolated into SQL.
        if !["runs", "models", "prompts", "outputs", "metrics"].contains(&table) {
            anyhow::bail!("Invalid table name for count_rows: {}", table);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(n)
    }
}
