use crate::error::PipelineError;
use crate::naming::{artifact_file_name, Operation};
use crate::pipeline::{PipelineOutcome, Pipelines};
use crate::scratch::{ensure_scratch_dir, ScratchFile};
use std::time::Instant;

impl Pipelines {
    /// Captures `schema` as a changelog and uploads it.
    ///
    /// Steps run in order and stop at the first failure: name the artifact,
    /// prepare the scratch directory, generate the changelog, upload it. The
    /// scratch file is removed however the run ends. The upload is the last
    /// step that changes remote state.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty schema, `Config` when the database is not
    /// configured, and the failing step's error otherwise.
    pub async fn dump(&self, schema: &str) -> Result<PipelineOutcome, PipelineError> {
        if schema.is_empty() {
            return Err(PipelineError::Validation("schema is required".to_string()));
        }
        let target = self.connection_target()?;

        let started = Instant::now();
        tracing::info!(schema, "starting schema dump");

        let file_name = artifact_file_name(Operation::Dump, schema, (self.clock)());
        ensure_scratch_dir(&self.scratch_dir).await?;
        let scratch = ScratchFile::new(self.scratch_dir.join(&file_name));

        let result = async {
            let invocation = self.liquibase(&target, schema).generate_changelog(scratch.path());
            self.tool.run(&invocation.args, &invocation.options).await?;
            let remote_key = self.store.upload(scratch.path(), &file_name).await?;
            Ok::<_, PipelineError>(remote_key)
        }
        .await;
        scratch.remove().await;

        match result {
            Ok(remote_key) => {
                tracing::info!(
                    schema,
                    key = %remote_key,
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "schema dump complete"
                );
                Ok(PipelineOutcome {
                    schema: schema.to_string(),
                    remote_key,
                })
            }
            Err(e) => {
                tracing::warn!(schema, "schema dump failed: {}", e);
                Err(e)
            }
        }
    }
}
