//! upload_functions command - package function sources and publish them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::process::Command;
use tracing::{debug, info};

use stackwire_core::RetryPolicy;
use stackwire_params::ParameterStore;

use super::GlobalArgs;
use crate::aws::s3::ObjectStore;
use crate::context::DeployContext;
use crate::packaging::{package_functions, FunctionArchive};

pub const LAMBDA_BUCKET_KEY: &str = "LambdaBucket";
pub const LAMBDA_FOLDER_KEY: &str = "LambdaFolder";
pub const CURRENT_GIT_HASH_KEY: &str = "CurrentGitHash";

#[derive(Args, Debug, Clone)]
pub struct UploadFunctionsArgs {
    /// Directory whose sub-directories are functions (overrides settings)
    #[arg(long)]
    pub functions_dir: Option<PathBuf>,

    /// Build id appended to archive names (default: `git describe --always`)
    #[arg(long)]
    pub build_id: Option<String>,
}

pub async fn execute(global: &GlobalArgs, args: &UploadFunctionsArgs) -> Result<()> {
    let mut ctx = DeployContext::load(global).await?;
    let functions_dir = args
        .functions_dir
        .clone()
        .unwrap_or_else(|| ctx.settings.functions_dir.clone());
    let build_id = match &args.build_id {
        Some(id) => id.clone(),
        None => git_build_id().await?,
    };

    let store = ctx.object_store();
    let retry = ctx.retry_policy();
    let archives =
        publish_functions(&store, &retry, &mut ctx.params, &functions_dir, &build_id).await?;

    let parameter_file = &ctx.settings.parameter_file;
    ctx.params
        .persist(parameter_file)
        .with_context(|| format!("failed to write {}", parameter_file.display()))?;

    println!(
        "Uploaded {} functions for build {}",
        archives.len(),
        build_id
    );
    Ok(())
}

/// Package, upload, then record `build_id` as `CurrentGitHash`.
///
/// Each upload runs once under the policy timeout. The store is only
/// updated once every archive is uploaded.
pub async fn publish_functions(
    store: &dyn ObjectStore,
    retry: &RetryPolicy,
    params: &mut ParameterStore,
    functions_dir: &Path,
    build_id: &str,
) -> Result<Vec<FunctionArchive>> {
    let bucket = params.get(LAMBDA_BUCKET_KEY)?.to_string();
    let folder = params.get(LAMBDA_FOLDER_KEY)?.to_string();

    let archives = package_functions(functions_dir, build_id)?;
    for archive in &archives {
        let key = format!("{}/{}", folder, archive.file_name);
        let body = tokio::fs::read(&archive.path)
            .await
            .with_context(|| format!("failed to read {}", archive.path.display()))?;
        retry
            .run_once("upload function", store.put_object(&bucket, &key, body))
            .await?;
        info!("Uploaded s3://{}/{}", bucket, key);
    }

    if params.upsert(CURRENT_GIT_HASH_KEY, build_id) {
        debug!("{} set to {}", CURRENT_GIT_HASH_KEY, build_id);
    }
    Ok(archives)
}

async fn git_build_id() -> Result<String> {
    let output = Command::new("git")
        .args(["describe", "--always"])
        .output()
        .await
        .context("failed to run git describe")?;
    if !output.status.success() {
        bail!(
            "git describe failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if id.is_empty() {
        bail!("git describe returned an empty build id");
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::fs;
    use stackwire_core::CoreError;
    use stackwire_params::ParameterEntry;
    use std::time::Duration;
    use tempfile::TempDir;

    struct StalledStore;

    #[async_trait]
    impl ObjectStore for StalledStore {
        async fn put_object(&self, _bucket: &str, _key: &str, _body: Vec<u8>) -> Result<()> {
            std::future::pending::<Result<()>>().await
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        uploads: Mutex<Vec<(String, String, usize)>>,
        fail: bool,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
            if self.fail {
                bail!("access denied");
            }
            self.uploads
                .lock()
                .push((bucket.to_string(), key.to_string(), body.len()));
            Ok(())
        }
    }

    fn params() -> ParameterStore {
        vec![
            ParameterEntry::new("LambdaBucket", "deploy-bucket"),
            ParameterEntry::new("LambdaFolder", "functions"),
            ParameterEntry::new("CurrentGitHash", "old"),
        ]
        .into_iter()
        .collect()
    }

    fn functions() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("dummyfunction_src")).unwrap();
        fs::write(temp.path().join("dummyfunction_src/app.py"), "def handler(): pass").unwrap();
        temp
    }

    #[tokio::test]
    async fn test_publish_uploads_and_records_build_id() {
        let temp = functions();
        let store = RecordingStore::default();
        let mut params = params();

        let archives = publish_functions(&store, &RetryPolicy::none(), &mut params, temp.path(), "f00ba4")
            .await
            .unwrap();

        assert_eq!(archives.len(), 1);
        let uploads = store.uploads.lock();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "deploy-bucket");
        assert_eq!(uploads[0].1, "functions/dummyfunction_srcf00ba4.zip");
        assert!(uploads[0].2 > 0);
        assert_eq!(params.get("CurrentGitHash").unwrap(), "f00ba4");
        assert_eq!(params.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_build_id() {
        let temp = functions();
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let mut params = params();

        assert!(publish_functions(&store, &RetryPolicy::none(), &mut params, temp.path(), "f00ba4")
            .await
            .is_err());
        assert_eq!(params.get("CurrentGitHash").unwrap(), "old");
    }

    #[tokio::test]
    async fn test_missing_bucket_parameter() {
        let temp = functions();
        let store = RecordingStore::default();
        let mut params: ParameterStore = vec![ParameterEntry::new("LambdaFolder", "functions")]
            .into_iter()
            .collect();

        let err = publish_functions(&store, &RetryPolicy::none(), &mut params, temp.path(), "f00ba4")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("LambdaBucket"));
        assert!(store.uploads.lock().is_empty());
    }

    #[tokio::test]
    async fn test_stalled_upload_times_out() {
        let temp = functions();
        let retry = RetryPolicy::new(3).with_timeout(Duration::from_millis(20));
        let mut params = params();

        let err = publish_functions(&StalledStore, &retry, &mut params, temp.path(), "f00ba4")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Timeout { operation, .. }) if operation == "upload function"
        ));
        assert_eq!(params.get("CurrentGitHash").unwrap(), "old");
    }
}
