//! Delete command.

use anyhow::{Result, bail};
use cabinet_business::{
    BlobStore, DeleteOutcome, DeletePrompt, FileCatalog, FileManager, ListStatus, ManagedFile,
};
use inquire::Confirm;
use tracing::{instrument, warn};

use crate::context::CliContext;
use crate::output::Output;

/// Asks on the terminal before deleting.
pub struct ConfirmPrompt;

impl DeletePrompt for ConfirmPrompt {
    fn confirm(&self, file: &ManagedFile) -> bool {
        let answer = Confirm::new(&format!("Delete {} ({})?", file.name, file.size_display()))
            .with_default(false)
            .prompt();
        match answer {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Confirmation prompt failed, not deleting: {e}");
                false
            }
        }
    }
}

/// Settles the confirmation before the delete starts.
///
/// The prompt blocks on terminal input, so it runs on the blocking pool. Ids not in the
/// list skip the prompt; the delete then reports them as not found.
async fn confirm_delete<C, B, P>(
    manager: &FileManager<C, B>,
    id: &str,
    yes: bool,
    prompt: P,
) -> Result<bool>
where
    C: FileCatalog,
    B: BlobStore,
    P: DeletePrompt + Send + 'static,
{
    if yes {
        return Ok(true);
    }
    let Some(file) = manager.files().into_iter().find(|f| f.id == id) else {
        return Ok(false);
    };
    let answer = tokio::task::spawn_blocking(move || prompt.confirm(&file)).await?;
    Ok(answer)
}

#[instrument(skip_all, name = "remove", fields(id = %id, yes))]
pub async fn run_remove(ctx: &CliContext, id: &str, yes: bool) -> Result<()> {
    let out = Output::new();
    let identity = ctx.require_identity().await?;
    let manager = ctx.file_manager(identity);

    manager.mount().await;
    if manager.status() == ListStatus::Failed {
        for notice in manager.drain_notices() {
            out.error(notice);
        }
        bail!("could not load files");
    }

    let confirmed = confirm_delete(&manager, id, yes, ConfirmPrompt).await?;
    let outcome = manager.delete(id, &move |_: &ManagedFile| confirmed).await;

    match outcome {
        DeleteOutcome::Deleted => {
            out.success(format!("Deleted {id}"));
            Ok(())
        }
        DeleteOutcome::Cancelled => {
            out.dim("Cancelled.");
            Ok(())
        }
        DeleteOutcome::NotFound => bail!("No file with id {id}. Use `cabinet ls` to see ids."),
        DeleteOutcome::Failed => {
            for notice in manager.drain_notices() {
                out.error(notice);
            }
            bail!("delete failed")
        }
    }
}
