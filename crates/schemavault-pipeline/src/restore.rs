use crate::error::PipelineError;
use crate::naming::{artifact_file_name, Operation};
use crate::pipeline::{PipelineOutcome, Pipelines};
use crate::scratch::{ensure_scratch_dir, ScratchFile};
use std::time::Instant;

impl Pipelines {
    /// Recreates `schema` from the changelog stored under `remote_key`.
    ///
    /// Steps run in order and stop at the first failure: create the schema if
    /// absent, download the changelog into the scratch directory, check it is
    /// readable, apply it with the scratch directory as the tool's working
    /// directory. The scratch file is removed however the run ends.
    ///
    /// The schema is not dropped if a later step fails.
    ///
    /// # Errors
    ///
    /// `Validation` when either input is empty, `Config` when the database is
    /// not configured, and the failing step's error otherwise.
    pub async fn restore(
        &self,
        schema: &str,
        remote_key: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        if schema.is_empty() || remote_key.is_empty() {
            return Err(PipelineError::Validation(
                "schema and s3Key are required".to_string(),
            ));
        }
        let target = self.connection_target()?;

        let started = Instant::now();
        tracing::info!(schema, key = remote_key, "starting schema restore");

        self.catalog.ensure_schema(schema).await?;

        ensure_scratch_dir(&self.scratch_dir).await?;
        let file_name = artifact_file_name(Operation::Restore, schema, (self.clock)());
        let scratch = ScratchFile::new(self.scratch_dir.join(&file_name));

        let result = async {
            self.store.download(remote_key, scratch.path()).await?;

            let metadata = tokio::fs::metadata(scratch.path()).await.map_err(|source| {
                PipelineError::ArtifactMissing {
                    path: scratch.path().to_path_buf(),
                    source,
                }
            })?;
            if !metadata.is_file() {
                return Err(PipelineError::ArtifactMissing {
                    path: scratch.path().to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "not a regular file",
                    ),
                });
            }

            let invocation = self
                .liquibase(&target, schema)
                .update(&file_name, &self.scratch_dir);
            self.tool.run(&invocation.args, &invocation.options).await?;
            Ok::<(), PipelineError>(())
        }
        .await;
        scratch.remove().await;

        match result {
            Ok(()) => {
                tracing::info!(
                    schema,
                    key = remote_key,
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "schema restore complete"
                );
                Ok(PipelineOutcome {
                    schema: schema.to_string(),
                    remote_key: remote_key.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(schema, key = remote_key, "schema restore failed: {}", e);
                Err(e)
            }
        }
    }
}
