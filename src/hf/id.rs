use derive_more::{Deref, Display};

/// A validated `namespace/name` model repository id on the default branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HfRepoId {
    repo_id: String,
    name_space: RepoSegment,
    repo_name: RepoSegment,
}

#[derive(Debug, thiserror::Error)]
pub enum HfRepoIdError {
    #[error("Invalid repository ID '{repo_id}': expected `namespace/name`")]
    Shape { repo_id: String },

    #[error("Invalid repository ID '{repo_id}': {part} '{segment}' {reason}")]
    Segment {
        repo_id: String,
        part: &'static str,
        segment: String,
        reason: &'static str,
    },
}

impl HfRepoId {
    /// Parses `namespace/name`, ignoring surrounding whitespace and slashes.
    pub fn try_new<Id: AsRef<str>>(repo_id: Id) -> Result<Self, HfRepoIdError> {
        let raw = repo_id.as_ref().trim().trim_matches('/');
        let shape_err = || HfRepoIdError::Shape {
            repo_id: raw.to_owned(),
        };

        let (ns, rn) = raw.split_once('/').ok_or_else(shape_err)?;
        if rn.contains('/') {
            return Err(shape_err());
        }

        let segment_err = |part, segment: &str, reason| HfRepoIdError::Segment {
            repo_id: raw.to_owned(),
            part,
            segment: segment.to_owned(),
            reason,
        };
        let name_space = RepoSegment::name_space(ns)
            .map_err(|reason| segment_err("namespace", ns, reason))?;
        let repo_name =
            RepoSegment::repo_name(rn).map_err(|reason| segment_err("name", rn, reason))?;

        Ok(Self {
            repo_id: format!("{name_space}/{repo_name}"),
            name_space,
            repo_name,
        })
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    pub fn name_space(&self) -> &str {
        &self.name_space
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }
}

impl std::fmt::Display for HfRepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.repo_id)
    }
}

/// One half of a repository id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display)]
struct RepoSegment(String);

impl RepoSegment {
    /// User or organization: 2-64 ASCII alphanumerics or single hyphens.
    fn name_space(s: &str) -> Result<Self, &'static str> {
        if !(2..=64).contains(&s.len()) {
            return Err("must be 2-64 characters");
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("may only contain ASCII letters, digits and '-'");
        }
        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err("has a leading, trailing or doubled '-'");
        }
        Ok(Self(s.to_owned()))
    }

    /// Repository: up to 96 of `[A-Za-z0-9._-]`, starting alphanumeric.
    fn repo_name(s: &str) -> Result<Self, &'static str> {
        if s.is_empty() || s.len() > 96 {
            return Err("must be 1-96 characters");
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err("may only contain ASCII letters, digits, '.', '_' and '-'");
        }
        if !s.starts_with(|c: char| c.is_ascii_alphanumeric())
            || s.ends_with(['.', '_', '-'])
        {
            return Err("must start with a letter or digit and not end with a separator");
        }
        Ok(Self(s.to_owned()))
    }
}
