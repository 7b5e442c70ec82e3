//! The `exam history` command.

use std::sync::Arc;

use anyhow::Result;
use services::{ExamServices, ExamStore, QuestionBank, TokioTicks};
use tokio::runtime::Handle;

use crate::render;

pub async fn execute(db_url: &str, clear: bool) -> Result<()> {
    let services = ExamServices::new_sqlite(db_url).await?;
    let snapshots = services.snapshots();

    let (ticks, _tick_rx) = TokioTicks::channel(Handle::current());
    let mut store = ExamStore::new(Arc::new(QuestionBank::new(Vec::new())), Arc::new(ticks));
    snapshots.restore_into(&mut store).await?;

    if clear {
        let removed = store.result_history().len();
        store.clear_result_history();
        snapshots.persist_if_dirty(&mut store).await?;
        println!("Removed {removed} result(s).");
        return Ok(());
    }

    print!("{}", render::history(store.result_history()));
    Ok(())
}
