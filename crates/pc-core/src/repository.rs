//! Project storage.
//!
//! A project is a titled `framesJson` payload owned by a user. The
//! [`ProjectRepository`] trait is the seam to whatever backend stores them;
//! two implementations live here: an in-memory table and a JSON file.

use crate::error::PersistError;
use crate::frame::Frame;
use crate::persist::decode_frames;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default file name of the JSON file repository.
pub const PROJECTS_FILE: &str = "post-projects.json";

/// What the editor hands to the repository on save.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub frames_json: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProject {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub frames_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedProject {
    /// Decoded frames.
    pub fn frames(&self) -> Result<Vec<Frame>, PersistError> {
        decode_frames(&self.frames_json)
    }
}

pub trait ProjectRepository {
    /// Create (`project_id == None`) or overwrite a project. Returns its id.
    fn save(
        &mut self,
        owner: &str,
        project_id: Option<&str>,
        draft: ProjectDraft,
    ) -> Result<String, PersistError>;

    /// Projects of `owner`, most recently updated first.
    fn list(&self, owner: &str) -> Result<Vec<SavedProject>, PersistError>;

    fn get(&self, owner: &str, project_id: &str) -> Result<SavedProject, PersistError> {
        self.list(owner)?
            .into_iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| PersistError::ProjectNotFound(project_id.to_string()))
    }

    /// Save from the editor. Without a current id, a project of the same
    /// title is overwritten instead of creating a duplicate.
    fn save_draft(
        &mut self,
        owner: &str,
        current_id: Option<&str>,
        draft: ProjectDraft,
    ) -> Result<String, PersistError> {
        let target = match current_id {
            Some(id) => Some(id.to_string()),
            None => self
                .list(owner)?
                .into_iter()
                .find(|p| p.title == draft.title)
                .map(|p| p.id),
        };
        self.save(owner, target.as_deref(), draft)
    }
}

/// Shared insert/update logic over a plain list of projects.
fn upsert(
    projects: &mut Vec<SavedProject>,
    owner: &str,
    project_id: Option<&str>,
    draft: ProjectDraft,
) -> Result<String, PersistError> {
    if draft.title.trim().is_empty() {
        return Err(PersistError::EmptyTitle);
    }
    let now = Utc::now();
    match project_id {
        Some(id) => {
            let project = projects
                .iter_mut()
                .find(|p| p.id == id && p.owner == owner)
                .ok_or_else(|| PersistError::ProjectNotFound(id.to_string()))?;
            project.title = draft.title;
            project.frames_json = draft.frames_json;
            project.updated_at = now;
            log::debug!("updated project {id}");
            Ok(project.id.clone())
        }
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            projects.push(SavedProject {
                id: id.clone(),
                owner: owner.to_string(),
                title: draft.title,
                frames_json: draft.frames_json,
                created_at: now,
                updated_at: now,
            });
            log::debug!("created project {id}");
            Ok(id)
        }
    }
}

fn owned_by(projects: &[SavedProject], owner: &str) -> Vec<SavedProject> {
    let mut out: Vec<SavedProject> = projects
        .iter()
        .filter(|p| p.owner == owner)
        .cloned()
        .collect();
    out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    out
}

// ─── In-memory ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryRepository {
    projects: Vec<SavedProject>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectRepository for MemoryRepository {
    fn save(
        &mut self,
        owner: &str,
        project_id: Option<&str>,
        draft: ProjectDraft,
    ) -> Result<String, PersistError> {
        upsert(&mut self.projects, owner, project_id, draft)
    }

    fn list(&self, owner: &str) -> Result<Vec<SavedProject>, PersistError> {
        Ok(owned_by(&self.projects, owner))
    }
}

// ─── JSON file ──────────────────────────────────────────────────────────

/// Stores every project in one JSON array on disk. The file is read on
/// every call and rewritten (via a sibling temp file) on every save.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Repository at `<dir>/post-projects.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(PROJECTS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<SavedProject>, PersistError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn write_all(&self, projects: &[SavedProject]) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(projects)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ProjectRepository for JsonFileRepository {
    fn save(
        &mut self,
        owner: &str,
        project_id: Option<&str>,
        draft: ProjectDraft,
    ) -> Result<String, PersistError> {
        let mut projects = self.read_all()?;
        let id = upsert(&mut projects, owner, project_id, draft)?;
        self.write_all(&projects)?;
        Ok(id)
    }

    fn list(&self, owner: &str) -> Result<Vec<SavedProject>, PersistError> {
        Ok(owned_by(&self.read_all()?, owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> ProjectDraft {
        ProjectDraft {
            title: title.into(),
            frames_json: "[]".into(),
        }
    }

    #[test]
    fn memory_save_and_list() {
        let mut repo = MemoryRepository::new();
        let id = repo.save("ana", None, draft("Launch")).unwrap();
        repo.save("bo", None, draft("Other")).unwrap();

        let listed = repo.list("ana").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert!(repo.get("bo", &id).is_err());
    }

    #[test]
    fn save_draft_reuses_same_title() {
        let mut repo = MemoryRepository::new();
        let first = repo.save_draft("ana", None, draft("Launch")).unwrap();
        let second = repo.save_draft("ana", None, draft("Launch")).unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.list("ana").unwrap().len(), 1);
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut repo = MemoryRepository::new();
        assert!(matches!(
            repo.save("ana", None, draft("  ")),
            Err(PersistError::EmptyTitle)
        ));
    }
}
