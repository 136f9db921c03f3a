// Scorer seam: mAP computation is delegated to an external program that
// consumes the two annotation JSON documents.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

/// A capability that scores predictions against ground truth, given the
/// paths of the two exchange documents, and returns its own summary text.
pub trait Scorer {
    fn score(&self, gt_json: &Path, pred_json: &Path) -> Result<String>;
}

/// Blanket implementation so tests can pass a closure as the scorer.
impl<F> Scorer for F
where
    F: Fn(&Path, &Path) -> Result<String>,
{
    fn score(&self, gt_json: &Path, pred_json: &Path) -> Result<String> {
        self(gt_json, pred_json)
    }
}

/// Scorer backed by an external command invoked as `<program> <gt> <pred>`.
pub struct CommandScorer {
    program: String,
}

impl CommandScorer {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Scorer for CommandScorer {
    fn score(&self, gt_json: &Path, pred_json: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg(gt_json)
            .arg(pred_json)
            .output()
            .with_context(|| format!("Failed to run scorer command '{}'", self.program))?;

        if !output.status.success() {
            bail!(
                "Scorer command '{}' failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_closure_fake_implements_scorer() {
        let fake = |gt: &Path, pred: &Path| -> Result<String> {
            Ok(format!("scored {} vs {}", gt.display(), pred.display()))
        };
        let out = fake
            .score(&PathBuf::from("gt.json"), &PathBuf::from("pred.json"))
            .unwrap();
        assert_eq!(out, "scored gt.json vs pred.json");
    }

    #[test]
    fn test_missing_scorer_program_reports_command() {
        let scorer = CommandScorer::new("definitely-not-a-real-scorer-binary");
        let err = scorer
            .score(&PathBuf::from("gt.json"), &PathBuf::from("pred.json"))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("definitely-not-a-real-scorer-binary"));
    }
}
