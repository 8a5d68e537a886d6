//! Hand-off of a finished artifact to version control.
//!
//! Publishing never affects the conversion result: a failure is reported
//! together with the commands to finish the job by hand.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::emit::group_thousands;
use crate::error::PublishError;

pub trait Publisher {
    fn publish(&self, artifact: &Path, record_count: usize) -> Result<(), PublishError>;

    /// Commands a person can run to finish a failed publish.
    fn manual_steps(&self, artifact: &Path, record_count: usize) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Skipped,
    Published,
    Failed {
        error: String,
        manual_steps: Vec<String>,
    },
}

pub fn commit_message(record_count: usize) -> String {
    format!(
        "Update: Add {} retailer records to database",
        group_thousands(record_count)
    )
}

/// Stage, commit and push the artifact with the `git` binary.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    pub repo: PathBuf,
    pub remote: String,
    pub branch: String,
}

impl GitPublisher {
    pub fn new(repo: impl Into<PathBuf>, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    /// Artifact path as git sees it from the repository root.
    fn relative_path(&self, artifact: &Path) -> Result<String, PublishError> {
        let outside = || PublishError::OutsideRepo {
            artifact: artifact.to_path_buf(),
            repo: self.repo.clone(),
        };
        let repo = self.repo.canonicalize().map_err(|_| outside())?;
        let artifact_abs = artifact.canonicalize().map_err(|_| outside())?;
        let rel = artifact_abs.strip_prefix(&repo).map_err(|_| outside())?;
        Ok(rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"))
    }

    fn git(&self, args: &[&str]) -> Result<(), PublishError> {
        let step = format!("git {}", args.join(" "));
        log::info!("  {}", step);
        let status = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .status()
            .map_err(|source| PublishError::Spawn {
                step: step.clone(),
                source,
            })?;
        if !status.success() {
            return Err(PublishError::Command {
                step,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, artifact: &Path, record_count: usize) -> Result<(), PublishError> {
        let rel = self.relative_path(artifact)?;
        self.git(&["add", rel.as_str()])?;
        self.git(&["commit", "-m", commit_message(record_count).as_str()])?;
        self.git(&["push", self.remote.as_str(), self.branch.as_str()])?;
        Ok(())
    }

    fn manual_steps(&self, artifact: &Path, record_count: usize) -> Vec<String> {
        let rel = self
            .relative_path(artifact)
            .unwrap_or_else(|_| artifact.display().to_string());
        vec![
            format!("cd {}", self.repo.display()),
            format!("git add {}", rel),
            format!("git commit -m '{}'", commit_message(record_count)),
            format!("git push {} {}", self.remote, self.branch),
        ]
    }
}

/// Run the publisher, folding any failure into the outcome.
pub fn publish_artifact(
    publisher: Option<&dyn Publisher>,
    artifact: &Path,
    record_count: usize,
) -> PublishOutcome {
    let Some(publisher) = publisher else {
        return PublishOutcome::Skipped;
    };

    match publisher.publish(artifact, record_count) {
        Ok(()) => {
            log::info!("Published {}", artifact.display());
            PublishOutcome::Published
        }
        Err(e) => {
            log::warn!("Publish failed: {}", e);
            PublishOutcome::Failed {
                error: e.to_string(),
                manual_steps: publisher.manual_steps(artifact, record_count),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingPublisher {
        fail: bool,
        calls: RefCell<Vec<usize>>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, _artifact: &Path, record_count: usize) -> Result<(), PublishError> {
            self.calls.borrow_mut().push(record_count);
            if self.fail {
                return Err(PublishError::Command {
                    step: "git push origin main".to_string(),
                    status: "exit status: 128".to_string(),
                });
            }
            Ok(())
        }

        fn manual_steps(&self, _artifact: &Path, _record_count: usize) -> Vec<String> {
            vec!["git push origin main".to_string()]
        }
    }

    #[test]
    fn test_commit_message_has_count() {
        assert_eq!(
            commit_message(612345),
            "Update: Add 612,345 retailer records to database"
        );
    }

    #[test]
    fn test_no_publisher_skips() {
        assert_eq!(
            publish_artifact(None, Path::new("data/retailers.js"), 3),
            PublishOutcome::Skipped
        );
    }

    #[test]
    fn test_success() {
        let publisher = RecordingPublisher {
            fail: false,
            calls: RefCell::new(Vec::new()),
        };
        let outcome = publish_artifact(Some(&publisher as &dyn Publisher), Path::new("data/retailers.js"), 3);
        assert_eq!(outcome, PublishOutcome::Published);
        assert_eq!(*publisher.calls.borrow(), vec![3]);
    }

    #[test]
    fn test_failure_folds_into_outcome() {
        let publisher = RecordingPublisher {
            fail: true,
            calls: RefCell::new(Vec::new()),
        };
        match publish_artifact(Some(&publisher as &dyn Publisher), Path::new("data/retailers.js"), 3) {
            PublishOutcome::Failed { error, manual_steps } => {
                assert!(error.contains("git push origin main"));
                assert_eq!(manual_steps, vec!["git push origin main"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_git_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        let artifact = dir.path().join("data").join("retailers.js");
        std::fs::write(&artifact, b"// x\n").unwrap();

        let git = GitPublisher::new(dir.path(), "origin", "main");
        assert_eq!(git.relative_path(&artifact).unwrap(), "data/retailers.js");
        let steps = git.manual_steps(&artifact, 1000);
        assert_eq!(steps[1], "git add data/retailers.js");
        assert_eq!(
            steps[2],
            "git commit -m 'Update: Add 1,000 retailer records to database'"
        );
        assert_eq!(steps[3], "git push origin main");
    }

    #[test]
    fn test_git_outside_repo() {
        let repo = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let artifact = other.path().join("retailers.js");
        std::fs::write(&artifact, b"// x\n").unwrap();

        let git = GitPublisher::new(repo.path(), "origin", "main");
        assert!(matches!(
            git.publish(&artifact, 1),
            Err(PublishError::OutsideRepo { .. })
        ));
    }
}
