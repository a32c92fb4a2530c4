#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{IndexAddOption, Oid, Repository, Signature};
use tempfile::TempDir;

pub const TODAY: &str = "2024-05-15";

pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    pub fn init() -> Result<Self, git2::Error> {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let repo = Repository::init(dir.path())?;
        set_identity(&repo)?;
        Ok(Self { dir, repo })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_file(&self, rel_path: &str) -> String {
        fs::read_to_string(self.dir.path().join(rel_path)).unwrap_or_default()
    }

    /// Write a table under `data/` and commit it.
    pub fn seed_table(&self, file: &str, contents: &str) -> Result<Oid, Box<dyn std::error::Error>> {
        self.write_file(&format!("data/{file}"), contents)?;
        Ok(self.commit_all(&format!("Seed {file}"))?)
    }

    pub fn commit_all(&self, message: &str) -> Result<Oid, git2::Error> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let sig = Signature::now("eventops-test", "eventops-test@example.com")?;

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .and_then(|oid| self.repo.find_commit(oid).ok());

        let oid = match parent {
            Some(parent) => self
                .repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?,
            None => self
                .repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])?,
        };

        Ok(oid)
    }

    /// Commit messages on HEAD, newest first.
    pub fn log(&self) -> Vec<String> {
        let mut walk = match self.repo.revwalk() {
            Ok(walk) => walk,
            Err(_) => return Vec::new(),
        };
        if walk.push_head().is_err() {
            return Vec::new();
        }
        walk.filter_map(|oid| oid.ok())
            .filter_map(|oid| self.repo.find_commit(oid).ok())
            .map(|commit| commit.message().unwrap_or("").trim().to_string())
            .collect()
    }

    pub fn head_message(&self) -> String {
        self.log().into_iter().next().unwrap_or_default()
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }
}

fn set_identity(repo: &Repository) -> Result<(), git2::Error> {
    let mut cfg = repo.config()?;
    cfg.set_str("user.name", "eventops-test")?;
    cfg.set_str("user.email", "eventops-test@example.com")?;
    Ok(())
}

/// The binary pointed at `repo` as its store, with today pinned.
pub fn eventops_cmd(repo: &TestRepo) -> Command {
    let mut cmd = Command::cargo_bin("eventops").expect("binary");
    cmd.current_dir(repo.path())
        .env("EVENTOPS_STORE_PATH", repo.path())
        .env("EVENTOPS_TODAY", TODAY)
        .env_remove("EVENTOPS_CONFIG")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_OWNER")
        .env_remove("GITHUB_REPO")
        .env_remove("GITHUB_BRANCH")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a command with `--json` and return the parsed envelope.
pub fn run_json(repo: &TestRepo, args: &[&str]) -> serde_json::Value {
    let output = eventops_cmd(repo)
        .args(args)
        .arg("--json")
        .output()
        .expect("run eventops");
    assert!(
        output.status.success(),
        "eventops {args:?} failed: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    serde_json::from_slice(&output.stdout).expect("json output")
}

/// Run a command with `--json` that must fail; returns (exit code, envelope).
pub fn run_json_err(repo: &TestRepo, args: &[&str]) -> (i32, serde_json::Value) {
    let output = eventops_cmd(repo)
        .args(args)
        .arg("--json")
        .output()
        .expect("run eventops");
    assert!(!output.status.success(), "eventops {args:?} unexpectedly succeeded");
    let code = output.status.code().unwrap_or(-1);
    (code, serde_json::from_slice(&output.stdout).expect("json error"))
}

pub const EVENTS_CSV: &str = "event_id,event_name,location,start_date,end_date,status\n\
1,Spring Open,Lisbon,2024-05-15,2024-05-16,Ongoing\n\
2,Autumn Cup,Porto,2024-05-20,2024-05-22,Confirmed\n\
3,Winter Gala,Faro,2024-12-01,2024-12-02,Planned\n";

pub const TASKS_CSV: &str = "task_id,scope,event_id,task_name,due_date,owner,status,priority,category,notes\n\
1,,1,Book hall,2024-05-10,Rui,In progress,High,Logistics,\n\
2,General,,Pay invoices,2024-05-15,Mia,Not started,,Finance,\n\
3,Event,2,Send report,2024-05-25,Ana,Done,,Reporting,\n";
