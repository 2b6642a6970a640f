//! Integrity check of a downloaded version against the manifest.

use std::path::Path;

use crate::checksum::{ChecksumAlgorithm, digests_match, file_digest_async};
use crate::error::{Error, Result};
use crate::manifest::DumpJob;

/// Outcome of a verification pass, by filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Files whose digest matches the manifest.
    pub passed: Vec<String>,
    /// Files absent from disk.
    pub missing: Vec<String>,
    /// Files present with a wrong digest. They have been deleted.
    pub crashed: Vec<String>,
}

impl VerifyReport {
    /// True iff nothing is missing and nothing is corrupt.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.missing.is_empty() && self.crashed.is_empty()
    }

    /// Total number of files checked.
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed.len() + self.missing.len() + self.crashed.len()
    }
}

/// Checks every shard of `job` under `dir` with `algorithm`.
///
/// Files are hashed one at a time. A corrupt file is removed so the next
/// download run fetches it again.
///
/// # Errors
///
/// Returns [`Error::Manifest`] if an entry lacks the selected digest (before
/// any file is touched), or an I/O error if a file cannot be read or removed.
pub async fn verify(job: &DumpJob, dir: &Path, algorithm: ChecksumAlgorithm) -> Result<VerifyReport> {
    let mut checks = Vec::with_capacity(job.files.len());
    for (name, file) in job.entries() {
        let expected = file.checksum(algorithm).ok_or_else(|| {
            Error::Manifest(format!("no {algorithm} checksum for {name}"))
        })?;
        checks.push((name, expected));
    }

    log::info!("Verify the files in folder: {}", dir.display());
    let mut report = VerifyReport::default();

    for (i, (name, expected)) in checks.into_iter().enumerate() {
        log::info!("#{i} {name} {expected}");
        let path = dir.join(name);

        if !tokio::fs::try_exists(&path).await? {
            log::warn!("Missing: {name}");
            report.missing.push(name.to_string());
            continue;
        }

        let actual = file_digest_async(path.clone(), algorithm).await?;
        if digests_match(&actual, expected) {
            log::debug!("Passed: {name}");
            report.passed.push(name.to_string());
        } else {
            log::warn!("Checksum mismatch for {name}: expected {expected}, got {actual}; removing");
            tokio::fs::remove_file(&path).await?;
            report.crashed.push(name.to_string());
        }
    }

    log::info!(
        "{} files passed, {} files missed, {} files crashed",
        report.passed.len(),
        report.missing.len(),
        report.crashed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DumpFile;
    use tempfile::TempDir;

    // md5("alpha"), md5("gamma")
    const ALPHA_MD5: &str = "2c1743a391305fbf367df8e4f069f9f9";
    const GAMMA_MD5: &str = "05b048d7242cb7b8b57cfa3b1d65ecea";

    fn entry(name: &str, md5: &str) -> (String, DumpFile) {
        (
            name.to_string(),
            DumpFile {
                url: format!("/enwiki/20240101/{name}"),
                md5: Some(md5.to_string()),
                sha1: None,
                size: None,
            },
        )
    }

    fn abc_job() -> DumpJob {
        DumpJob {
            status: "done".into(),
            files: [
                entry("A.7z", ALPHA_MD5),
                entry("B.7z", "9f4e4b9b1c1b3a6f5a2e8b7c6d5e4f3a"),
                entry("C.7z", GAMMA_MD5),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[tokio::test]
    async fn missing_file_fails_verification() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.7z"), b"alpha").unwrap();
        std::fs::write(dir.path().join("C.7z"), b"gamma").unwrap();

        let report = verify(&abc_job(), dir.path(), ChecksumAlgorithm::Md5)
            .await
            .unwrap();

        assert_eq!(report.passed, ["A.7z", "C.7z"]);
        assert_eq!(report.missing, ["B.7z"]);
        assert!(report.crashed.is_empty());
        assert_eq!(report.total(), 3);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn corrupt_file_is_removed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.7z"), b"alpha").unwrap();
        std::fs::write(dir.path().join("C.7z"), b"truncated").unwrap();

        let report = verify(&abc_job(), dir.path(), ChecksumAlgorithm::Md5)
            .await
            .unwrap();

        assert_eq!(report.passed, ["A.7z"]);
        assert_eq!(report.missing, ["B.7z"]);
        assert_eq!(report.crashed, ["C.7z"]);
        assert!(!dir.path().join("C.7z").exists());
        assert!(dir.path().join("A.7z").exists());
    }

    #[tokio::test]
    async fn all_present_and_matching_succeeds() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.7z"), b"alpha").unwrap();
        std::fs::write(dir.path().join("C.7z"), b"gamma").unwrap();
        let job = DumpJob {
            status: "done".into(),
            files: [entry("A.7z", &ALPHA_MD5.to_uppercase()), entry("C.7z", GAMMA_MD5)]
                .into_iter()
                .collect(),
        };

        let report = verify(&job, dir.path(), ChecksumAlgorithm::Md5).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.passed.len(), 2);
    }

    #[tokio::test]
    async fn absent_digest_is_rejected_up_front() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("C.7z"), b"not gamma").unwrap();

        let err = verify(&abc_job(), dir.path(), ChecksumAlgorithm::Sha1)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Manifest(_)));
        // Nothing was deleted.
        assert!(dir.path().join("C.7z").exists());
    }

    #[tokio::test]
    async fn empty_job_is_trivially_complete() {
        let dir = TempDir::new().unwrap();
        let report = verify(&DumpJob::default(), dir.path(), ChecksumAlgorithm::Md5)
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.total(), 0);
    }
}
