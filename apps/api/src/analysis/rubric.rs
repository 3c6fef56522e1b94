//! Rubric selection: weighted keyword scoring of a job description against per-role tables.
//!
//! The winning role decides which rubric document from the corpus directory is injected
//! into the analysis prompt. Scoring is a pure function of the job description and the
//! fixed tables below; matchers are compiled once at startup and shared read-only.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Job-role categories that each carry their own evaluation rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Backend,
    Frontend,
    DataScience,
    Devops,
}

impl Role {
    /// Declaration order doubles as tie-break order: earlier roles win equal scores.
    pub const ALL: [Role; 4] = [Role::Backend, Role::Frontend, Role::DataScience, Role::Devops];

    /// Role used when no keyword from any table appears.
    pub const DEFAULT: Role = Role::Backend;

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Backend => "backend",
            Role::Frontend => "frontend",
            Role::DataScience => "data_science",
            Role::Devops => "devops",
        }
    }

    pub fn document_name(self) -> &'static str {
        match self {
            Role::Backend => "backend_rubric.md",
            Role::Frontend => "frontend_rubric.md",
            Role::DataScience => "data_science_rubric.md",
            Role::Devops => "devops_rubric.md",
        }
    }

    /// Lowercase keyword phrase → weight.
    pub fn keyword_weights(self) -> &'static [(&'static str, u32)] {
        match self {
            Role::Backend => &[
                ("software engineer", 15),
                ("backend", 10),
                ("api", 5),
                ("database", 5),
                ("python", 3),
                ("java", 3),
                ("node.js", 3),
                ("scalability", 8),
                ("microservices", 8),
                ("sql", 4),
                ("nosql", 4),
                ("server-side", 7),
            ],
            Role::Frontend => &[
                ("frontend", 10),
                ("react", 8),
                ("angular", 8),
                ("vue", 8),
                ("javascript", 4),
                ("css", 5),
                ("ui/ux", 5),
                ("typescript", 4),
                ("html", 3),
                ("user interface", 6),
            ],
            Role::DataScience => &[
                ("data scientist", 10),
                ("data analyst", 10),
                ("machine learning", 9),
                ("python", 5),
                (" r ", 5),
                ("pandas", 7),
                ("numpy", 6),
                ("scikit-learn", 7),
                ("tensorflow", 7),
                ("pytorch", 7),
                ("sql", 3),
                ("statistics", 6),
            ],
            Role::Devops => &[
                ("devops", 10),
                ("sre", 10),
                ("aws", 7),
                ("gcp", 7),
                ("azure", 7),
                ("docker", 8),
                ("kubernetes", 9),
                ("ci/cd", 8),
                ("terraform", 8),
                ("infrastructure", 6),
            ],
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RubricError {
    #[error("could not load rubric document {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Accumulated score per role for a single job description. Request-local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreTable(Vec<(Role, u32)>);

impl ScoreTable {
    pub fn get(&self, role: Role) -> u32 {
        self.0
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    /// The strictly greatest score wins; ties keep the earlier role and an all-zero table
    /// yields `Role::DEFAULT`.
    pub fn best_role(&self) -> Role {
        let mut best = Role::DEFAULT;
        let mut max_score = 0;
        for &(role, score) in &self.0 {
            if score > max_score {
                max_score = score;
                best = role;
            }
        }
        best
    }
}

impl std::fmt::Display for ScoreTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(r, s)| format!("{r}={s}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// The outcome of rubric selection for one request.
#[derive(Debug, Clone)]
pub struct SelectedRubric {
    pub role: Role,
    pub scores: ScoreTable,
    pub document: String,
}

struct KeywordMatcher {
    pattern: Regex,
    weight: u32,
}

/// Immutable per-role keyword matchers plus the corpus directory.
pub struct RubricCatalog {
    dir: PathBuf,
    tables: Vec<(Role, Vec<KeywordMatcher>)>,
}

impl RubricCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, regex::Error> {
        let mut tables = Vec::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let matchers = role
                .keyword_weights()
                .iter()
                .map(|&(keyword, weight)| {
                    Ok(KeywordMatcher {
                        pattern: keyword_pattern(keyword)?,
                        weight,
                    })
                })
                .collect::<Result<Vec<_>, regex::Error>>()?;
            tables.push((role, matchers));
        }

        Ok(Self {
            dir: dir.into(),
            tables,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scores every role: Σ occurrences × weight over its keyword table.
    pub fn score(&self, job_description: &str) -> ScoreTable {
        let jd = job_description.to_lowercase();
        let scores = self
            .tables
            .iter()
            .map(|(role, matchers)| {
                let total = matchers
                    .iter()
                    .map(|m| m.pattern.find_iter(&jd).count() as u32 * m.weight)
                    .sum::<u32>();
                (*role, total)
            })
            .collect();
        ScoreTable(scores)
    }

    /// Picks the role for `job_description` and reads its rubric document.
    /// A missing document is an error; no other role is substituted.
    pub async fn select_rubric(&self, job_description: &str) -> Result<SelectedRubric, RubricError> {
        let scores = self.score(job_description);
        let role = scores.best_role();
        let path = self.dir.join(role.document_name());

        info!(role = %role, scores = %scores, "Selected rubric {}", role.document_name());

        let document = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| RubricError::Unreadable { path, source })?;

        Ok(SelectedRubric {
            role,
            scores,
            document,
        })
    }

    /// Roles whose document is absent from the corpus directory.
    pub fn missing_documents(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| !self.dir.join(role.document_name()).is_file())
            .collect()
    }
}

/// `\b<keyword>\b` with the keyword escaped, so punctuation ("ci/cd", "node.js") and
/// padding spaces (" r ") are part of the literal match.
fn keyword_pattern(keyword: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\b{}\b", regex::escape(keyword)))
}
