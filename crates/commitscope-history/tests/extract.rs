//! Integration tests: build throwaway repositories with git2 and extract them.

use std::path::Path;

use commitscope_core::progress::NoopReporter;
use commitscope_core::Timezone;
use commitscope_history::csv_io::{read_history, write_history};
use commitscope_history::mining::{
    extract_history, git_identity, list_commits, open_repository, ExtractOptions,
};
use git2::{Commit, ObjectType, Oid, Repository, RepositoryInitOptions, Signature, Time};

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn init_repo(dir: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(dir, &opts).unwrap()
}

fn commit_on(
    repo: &Repository,
    update_ref: &str,
    parents: &[&Commit],
    file: &str,
    content: &str,
    message: &str,
    author: (&str, &str),
    when: i64,
) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(file), content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::new(author.0, author.1, &Time::new(when, 0)).unwrap();
    repo.commit(Some(update_ref), &sig, &sig, message, &tree, parents)
        .unwrap()
}

const ALICE: (&str, &str) = ("Alice", "alice@example.com");
const BOB: (&str, &str) = ("Bob", "bob@example.com");

/// main: c1 -> c2 -> c3, feature: c2 -> f1
struct Fixture {
    _dir: tempfile::TempDir,
    path: std::path::PathBuf,
    c1: Oid,
    c2: Oid,
    c3: Oid,
    f1: Oid,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let repo = init_repo(&path);
    let base = now() - 4 * 3600;

    let c1 = commit_on(&repo, "HEAD", &[], "README.md", "# demo\n", "docs: add readme", ALICE, base);
    let p1 = repo.find_commit(c1).unwrap();
    let c2 = commit_on(
        &repo,
        "HEAD",
        &[&p1],
        "events.rs",
        "fn create_event() {}\n",
        "feat: events CRUD\n\nAdds create endpoint.",
        ALICE,
        base + 3600,
    );
    let p2 = repo.find_commit(c2).unwrap();
    let f1 = commit_on(
        &repo,
        "refs/heads/feature",
        &[&p2],
        "tickets.rs",
        "fn ticket() {}\n",
        "feat: tickets",
        BOB,
        base + 2 * 3600,
    );
    // Restore the index to main's tree before the next main commit.
    repo.reset(p2.as_object(), git2::ResetType::Hard, None).unwrap();
    let c3 = commit_on(
        &repo,
        "HEAD",
        &[&p2],
        "events.rs",
        "fn create_event() {}\nfn delete_event() {}\n",
        "fix: delete event",
        ALICE,
        base + 3 * 3600,
    );

    Fixture {
        _dir: dir,
        path,
        c1,
        c2,
        c3,
        f1,
    }
}

fn utc_options() -> ExtractOptions {
    ExtractOptions {
        timezone: Timezone::Utc,
        ..ExtractOptions::default()
    }
}

#[test]
fn extracts_every_reference_newest_first() {
    let fx = fixture();
    let extraction = extract_history(&fx.path, &utc_options(), &NoopReporter).unwrap();

    assert_eq!(extraction.skipped, 0);
    let hashes: Vec<String> = extraction.records.iter().map(|r| r.hash.clone()).collect();
    assert_eq!(
        hashes,
        vec![
            fx.c3.to_string(),
            fx.f1.to_string(),
            fx.c2.to_string(),
            fx.c1.to_string()
        ]
    );
    assert!(extraction.records.iter().all(|r| r.has_valid_hash()));
}

#[test]
fn records_carry_metadata_and_stat_blob() {
    let fx = fixture();
    let extraction = extract_history(&fx.path, &utc_options(), &NoopReporter).unwrap();
    let c2 = extraction
        .records
        .iter()
        .find(|r| r.hash == fx.c2.to_string())
        .unwrap();

    assert_eq!(c2.author, "Alice");
    assert_eq!(c2.email, "alice@example.com");
    assert_eq!(c2.message, "feat: events CRUD");
    assert_eq!(c2.date.len(), 19);
    assert!(c2.code_changes.starts_with(&format!("commit {}", fx.c2)));
    assert!(c2.code_changes.contains("Author: Alice <alice@example.com>"));
    assert!(c2.code_changes.contains("    Adds create endpoint."));
    assert!(c2.code_changes.contains("events.rs"));
    assert!(c2.code_changes.contains("1 file changed"));
}

#[test]
fn branches_are_sorted_and_joined() {
    let fx = fixture();
    let extraction = extract_history(&fx.path, &utc_options(), &NoopReporter).unwrap();
    let branches_of = |oid: Oid| {
        extraction
            .records
            .iter()
            .find(|r| r.hash == oid.to_string())
            .map(|r| r.branches.clone())
            .unwrap()
    };

    assert_eq!(branches_of(fx.c1), "feature; main");
    assert_eq!(branches_of(fx.c2), "feature; main");
    assert_eq!(branches_of(fx.c3), "main");
    assert_eq!(branches_of(fx.f1), "feature");
}

#[test]
fn max_commits_limits_output() {
    let fx = fixture();
    let opts = ExtractOptions {
        max_commits: 2,
        ..utc_options()
    };
    let extraction = extract_history(&fx.path, &opts, &NoopReporter).unwrap();
    assert_eq!(extraction.records.len(), 2);
}

#[test]
fn single_branch_walk() {
    let fx = fixture();
    let repo = open_repository(&fx.path).unwrap();
    let opts = ExtractOptions {
        branch: Some("feature".into()),
        ..utc_options()
    };
    let oids = list_commits(&repo, &opts).unwrap();
    assert_eq!(oids, vec![fx.f1, fx.c2, fx.c1]);
}

#[test]
fn author_filter_matches_name_or_email() {
    let fx = fixture();
    let repo = open_repository(&fx.path).unwrap();

    let by_name = ExtractOptions {
        author: Some("BOB".into()),
        ..utc_options()
    };
    assert_eq!(list_commits(&repo, &by_name).unwrap(), vec![fx.f1]);

    let by_email = ExtractOptions {
        author: Some("alice@".into()),
        ..utc_options()
    };
    assert_eq!(list_commits(&repo, &by_email).unwrap().len(), 3);
}

#[test]
fn since_days_drops_old_commits() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(dir.path());
    let old = commit_on(&repo, "HEAD", &[], "a.txt", "a", "old", ALICE, 978_307_200);
    let parent = repo.find_commit(old).unwrap();
    let recent = commit_on(&repo, "HEAD", &[&parent], "b.txt", "b", "recent", ALICE, now() - 60);

    let opts = ExtractOptions {
        since_days: 30,
        ..utc_options()
    };
    assert_eq!(list_commits(&repo, &opts).unwrap(), vec![recent]);
}

#[test]
fn huge_since_days_keeps_every_commit() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(dir.path());
    let old = commit_on(&repo, "HEAD", &[], "a.txt", "a", "old", ALICE, 978_307_200);
    let parent = repo.find_commit(old).unwrap();
    let recent = commit_on(&repo, "HEAD", &[&parent], "b.txt", "b", "recent", ALICE, now() - 3600);

    for since_days in [1 << 50, u64::MAX] {
        let opts = ExtractOptions {
            since_days,
            ..utc_options()
        };
        assert_eq!(list_commits(&repo, &opts).unwrap(), vec![recent, old]);
    }
}

#[test]
fn unreadable_commit_is_skipped_not_fatal() {
    let fx = fixture();
    let repo = open_repository(&fx.path).unwrap();
    let c3 = repo.find_commit(fx.c3).unwrap();

    let mut raw = format!("tree {}\nparent {}\n", c3.tree_id(), fx.c3).into_bytes();
    let when = now() - 60;
    raw.extend_from_slice(b"author Bad \xff Name <bad@example.com> ");
    raw.extend_from_slice(format!("{when} +0000\n").as_bytes());
    raw.extend_from_slice(b"committer Bad \xff Name <bad@example.com> ");
    raw.extend_from_slice(format!("{when} +0000\n\nbroken author\n").as_bytes());
    let broken = repo.odb().unwrap().write(ObjectType::Commit, &raw).unwrap();
    repo.reference("refs/heads/broken", broken, true, "test fixture")
        .unwrap();

    let extraction = extract_history(&fx.path, &utc_options(), &NoopReporter).unwrap();
    assert_eq!(extraction.skipped, 1);
    assert_eq!(extraction.records.len(), 4);
    assert!(extraction
        .records
        .iter()
        .all(|r| r.hash != broken.to_string()));
}

#[test]
fn identity_comes_from_repo_config() {
    let fx = fixture();
    let repo = open_repository(&fx.path).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Alice Example").unwrap();
    config.set_str("user.email", "alice@example.com").unwrap();

    let identity = git_identity(&repo);
    assert_eq!(identity.name.as_deref(), Some("Alice Example"));
    assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
}

#[test]
fn extracted_csv_roundtrips_through_disk() {
    let fx = fixture();
    let extraction = extract_history(&fx.path, &utc_options(), &NoopReporter).unwrap();
    let out = tempfile::tempdir().unwrap();
    let csv_path = out.path().join("git_history.csv");

    write_history(&csv_path, &extraction.records).unwrap();
    let back = read_history(&csv_path).unwrap();
    assert_eq!(back, extraction.records);
}

#[test]
fn non_repository_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = extract_history(dir.path(), &utc_options(), &NoopReporter);
    assert!(result.is_err());
}
