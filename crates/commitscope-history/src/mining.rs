//! Commit extraction via git2.
//!
//! Walks every reference of a repository (or a single branch), and for each
//! commit gathers author metadata, the subject line, the local branches that
//! contain it, and a `git show --stat` style summary of its changes.

use std::path::Path;

use chrono::{DateTime, Local, TimeZone, Utc};
use commitscope_core::progress::ProgressReporter;
use commitscope_core::{CommitRecord, HistoryConfig, ScopeError, Timezone};
use git2::{BranchType, Commit, DiffFindOptions, DiffOptions, DiffStatsFormat, Oid, Repository, Sort};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const STAT_WIDTH: usize = 80;

/// Options for history extraction.
///
/// Zero means "no limit" for `since_days` and `max_commits`.
///
/// # Examples
///
/// ```
/// use commitscope_history::mining::ExtractOptions;
///
/// let opts = ExtractOptions::default();
/// assert_eq!(opts.since_days, 0);
/// assert_eq!(opts.max_commits, 0);
/// assert!(opts.branch.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Only include commits authored in the last N days.
    pub since_days: u64,
    /// Stop after this many commits.
    pub max_commits: usize,
    /// Walk this branch instead of every reference.
    pub branch: Option<String>,
    /// Case-insensitive substring matched against author name or email.
    pub author: Option<String>,
    /// Timezone for rendered dates.
    pub timezone: Timezone,
}

impl From<&HistoryConfig> for ExtractOptions {
    fn from(config: &HistoryConfig) -> Self {
        Self {
            since_days: config.since_days,
            max_commits: config.max_commits,
            branch: config.branch.clone(),
            author: config.author.clone(),
            timezone: config.timezone,
        }
    }
}

/// `user.name` and `user.email` from the repository's git configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Result of a full extraction run.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Successfully extracted commits, newest first.
    pub records: Vec<CommitRecord>,
    /// Commits that failed and were left out.
    pub skipped: usize,
}

/// Open the repository at `path`.
///
/// # Errors
///
/// Returns [`ScopeError::Git`] if `path` is not inside a git repository.
pub fn open_repository(path: &Path) -> Result<Repository, ScopeError> {
    Repository::discover(path)
        .map_err(|e| ScopeError::Git(format!("failed to open repository: {e}")))
}

/// Read the configured committer identity, if any.
pub fn git_identity(repo: &Repository) -> GitIdentity {
    let Ok(config) = repo.config() else {
        return GitIdentity::default();
    };
    GitIdentity {
        name: config.get_string("user.name").ok(),
        email: config.get_string("user.email").ok(),
    }
}

/// List commit ids to extract, newest first.
///
/// Without a branch this covers `HEAD` and every reference that peels to a
/// commit, merges included.
///
/// # Errors
///
/// Returns [`ScopeError::Git`] if the history cannot be walked.
pub fn list_commits(repo: &Repository, options: &ExtractOptions) -> Result<Vec<Oid>, ScopeError> {
    let mut revwalk = repo
        .revwalk()
        .map_err(|e| ScopeError::Git(format!("failed to create revwalk: {e}")))?;
    revwalk
        .set_sorting(Sort::TIME)
        .map_err(|e| ScopeError::Git(format!("failed to set sorting: {e}")))?;

    if let Some(ref branch) = options.branch {
        let reference = repo
            .resolve_reference_from_short_name(branch)
            .map_err(|e| ScopeError::Git(format!("failed to resolve branch '{branch}': {e}")))?;
        let commit = reference
            .peel_to_commit()
            .map_err(|e| ScopeError::Git(format!("branch '{branch}' has no commit: {e}")))?;
        revwalk
            .push(commit.id())
            .map_err(|e| ScopeError::Git(format!("failed to push oid: {e}")))?;
    } else {
        // An unborn HEAD is fine as long as some reference exists.
        let _ = revwalk.push_head();
        let references = repo
            .references()
            .map_err(|e| ScopeError::Git(format!("failed to list references: {e}")))?;
        for reference in references.flatten() {
            if let Ok(commit) = reference.peel_to_commit() {
                revwalk
                    .push(commit.id())
                    .map_err(|e| ScopeError::Git(format!("failed to push oid: {e}")))?;
            }
        }
    }

    let cutoff = (options.since_days > 0)
        .then(|| compute_cutoff(options.since_days))
        .flatten();
    let author_filter = options.author.as_ref().map(|a| a.to_lowercase());
    let mut oids = Vec::new();

    for oid_result in revwalk {
        let oid = oid_result.map_err(|e| ScopeError::Git(format!("revwalk error: {e}")))?;

        if cutoff.is_some() || author_filter.is_some() {
            let commit = repo
                .find_commit(oid)
                .map_err(|e| ScopeError::Git(format!("failed to find commit: {e}")))?;
            let author = commit.author();
            if cutoff.is_some_and(|c| author.when().seconds() < c) {
                continue;
            }
            if let Some(ref needle) = author_filter {
                let name = author.name().unwrap_or("").to_lowercase();
                let email = author.email().unwrap_or("").to_lowercase();
                if !name.contains(needle) && !email.contains(needle) {
                    continue;
                }
            }
        }

        oids.push(oid);
        if options.max_commits > 0 && oids.len() >= options.max_commits {
            break;
        }
    }

    Ok(oids)
}

/// Local branch names and their tip commits, sorted by name.
///
/// # Errors
///
/// Returns [`ScopeError::Git`] if branches cannot be listed.
pub fn local_branches(repo: &Repository) -> Result<Vec<(String, Oid)>, ScopeError> {
    let branches = repo
        .branches(Some(BranchType::Local))
        .map_err(|e| ScopeError::Git(format!("failed to list branches: {e}")))?;

    let mut tips = Vec::new();
    for entry in branches {
        let (branch, _) = entry.map_err(|e| ScopeError::Git(format!("branch error: {e}")))?;
        let Some(name) = branch.name().ok().flatten().map(str::to_string) else {
            continue;
        };
        if let Ok(commit) = branch.get().peel_to_commit() {
            tips.push((name, commit.id()));
        }
    }
    tips.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(tips)
}

/// Gather the full record for one commit.
///
/// # Errors
///
/// Returns [`ScopeError::Git`] if the commit cannot be read, its author or
/// message is not valid UTF-8, or its diff cannot be computed.
pub fn extract_commit(
    repo: &Repository,
    oid: Oid,
    branches: &[(String, Oid)],
    timezone: Timezone,
) -> Result<CommitRecord, ScopeError> {
    let commit = repo
        .find_commit(oid)
        .map_err(|e| ScopeError::Git(format!("failed to find commit: {e}")))?;

    let author = commit.author();
    let name = author
        .name()
        .ok_or_else(|| ScopeError::Git(format!("author name of {oid} is not valid UTF-8")))?
        .to_string();
    let email = author
        .email()
        .ok_or_else(|| ScopeError::Git(format!("author email of {oid} is not valid UTF-8")))?
        .to_string();
    if commit.message().is_none() {
        return Err(ScopeError::Git(format!(
            "message of {oid} is not valid UTF-8"
        )));
    }

    let date = format_timestamp(author.when().seconds(), timezone);
    let message = commit.summary().unwrap_or("").to_string();
    let branches = containing_branches(repo, oid, branches)?;
    let code_changes = show_stat(repo, &commit, &name, &email, &date)?;

    Ok(CommitRecord {
        hash: oid.to_string(),
        author: name,
        email,
        date,
        message,
        branches,
        code_changes,
    })
}

/// Extract every listed commit, skipping the ones that fail.
///
/// Per-commit failures are logged and counted; failures to open the
/// repository or walk its history are returned as errors.
///
/// # Errors
///
/// Returns [`ScopeError::Git`] if the repository cannot be opened or walked.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use commitscope_core::progress::NoopReporter;
/// use commitscope_history::mining::{extract_history, ExtractOptions};
///
/// let extraction = extract_history(Path::new("."), &ExtractOptions::default(), &NoopReporter).unwrap();
/// for record in &extraction.records {
///     println!("{}: {}", &record.hash[..8], record.message);
/// }
/// ```
pub fn extract_history(
    repo_path: &Path,
    options: &ExtractOptions,
    reporter: &dyn ProgressReporter,
) -> Result<Extraction, ScopeError> {
    let repo = open_repository(repo_path)?;

    let identity = git_identity(&repo);
    tracing::info!(
        "Fetching commits for {} ({})",
        identity.name.as_deref().unwrap_or("unknown"),
        identity.email.as_deref().unwrap_or("unknown"),
    );

    let oids = list_commits(&repo, options)?;
    let branches = local_branches(&repo)?;

    reporter.start("Processing commits", Some(oids.len() as u64));
    let mut records = Vec::with_capacity(oids.len());
    let mut skipped = 0;

    for oid in oids {
        match extract_commit(&repo, oid, &branches, options.timezone) {
            Ok(record) => {
                tracing::debug!("Processed commit {}", short_hash(&record.hash));
                records.push(record);
            }
            Err(e) => {
                tracing::warn!(commit = %oid, error = %e, "Error processing commit, skipping");
                skipped += 1;
            }
        }
        reporter.advance(1);
    }
    reporter.finish();

    Ok(Extraction { records, skipped })
}

/// Render a unix timestamp as `%Y-%m-%d %H:%M:%S`.
///
/// # Examples
///
/// ```
/// use commitscope_core::Timezone;
/// use commitscope_history::mining::format_timestamp;
///
/// assert_eq!(format_timestamp(1_700_000_000, Timezone::Utc), "2023-11-14 22:13:20");
/// ```
pub fn format_timestamp(seconds: i64, timezone: Timezone) -> String {
    let utc = DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default();
    match timezone {
        Timezone::Utc => utc.format(DATE_FORMAT).to_string(),
        Timezone::Local => match Local.timestamp_opt(seconds, 0).single() {
            Some(local) => local.format(DATE_FORMAT).to_string(),
            None => utc.format(DATE_FORMAT).to_string(),
        },
    }
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(8)]
}

/// Unix time `since_days` ago, or `None` when the window reaches past the
/// representable range (every commit qualifies).
fn compute_cutoff(since_days: u64) -> Option<i64> {
    let days = i64::try_from(since_days).ok()?;
    let window = chrono::Duration::try_days(days)?;
    Utc::now().checked_sub_signed(window).map(|t| t.timestamp())
}

fn containing_branches(
    repo: &Repository,
    oid: Oid,
    branches: &[(String, Oid)],
) -> Result<String, ScopeError> {
    let mut names = Vec::new();
    for (name, tip) in branches {
        let contains = *tip == oid
            || repo
                .graph_descendant_of(*tip, oid)
                .map_err(|e| ScopeError::Git(format!("failed to check branch '{name}': {e}")))?;
        if contains {
            names.push(name.as_str());
        }
    }
    Ok(names.join("; "))
}

fn show_stat(
    repo: &Repository,
    commit: &Commit,
    author: &str,
    email: &str,
    date: &str,
) -> Result<String, ScopeError> {
    let mut out = format!("commit {}\n", commit.id());
    if commit.parent_count() > 1 {
        let parents: Vec<String> = commit
            .parent_ids()
            .map(|p| short_hash(&p.to_string()).to_string())
            .collect();
        out.push_str(&format!("Merge: {}\n", parents.join(" ")));
    }
    out.push_str(&format!("Author: {author} <{email}>\nDate:   {date}\n\n"));
    for line in commit.message().unwrap_or("").trim_end().lines() {
        out.push_str(&format!("    {line}\n"));
    }
    out.push('\n');

    let commit_tree = commit
        .tree()
        .map_err(|e| ScopeError::Git(format!("failed to get commit tree: {e}")))?;

    // Merges are summarised against their first parent.
    let parent_tree = if commit.parent_count() > 0 {
        let parent = commit
            .parent(0)
            .map_err(|e| ScopeError::Git(format!("failed to get parent: {e}")))?;
        Some(
            parent
                .tree()
                .map_err(|e| ScopeError::Git(format!("failed to get parent tree: {e}")))?,
        )
    } else {
        None
    };

    let mut diff_opts = DiffOptions::new();
    let mut diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), Some(&mut diff_opts))
        .map_err(|e| ScopeError::Git(format!("failed to compute diff: {e}")))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))
        .map_err(|e| ScopeError::Git(format!("failed to find renames: {e}")))?;

    let stats = diff
        .stats()
        .map_err(|e| ScopeError::Git(format!("failed to compute diff stats: {e}")))?;
    let buf = stats
        .to_buf(DiffStatsFormat::FULL, STAT_WIDTH)
        .map_err(|e| ScopeError::Git(format!("failed to format diff stats: {e}")))?;
    out.push_str(buf.as_str().unwrap_or(""));

    Ok(out)
}
