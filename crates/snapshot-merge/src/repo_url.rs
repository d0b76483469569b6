//! Source-control URL classification.
//!
//! Maps an upstream URL to a canonical `(root url, project name)` pair by
//! trying host-specific patterns in a fixed order. The first match wins.

use std::sync::LazyLock;

use regex::Regex;
use rocks_model::RepoRef;

/// Hosting service a URL was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoHost {
    GitHub,
    GitLab,
    /// Any other `gitlab*` host.
    GitLabSelfHosted,
    Bitbucket,
    /// Legacy `<project>.googlecode.com/svn` mirrors.
    GoogleCode,
}

struct RepoPattern {
    host: RepoHost,
    regex: Regex,
}

// Group 1 is the canonical root URL, group 2 the project name.
static REPO_PATTERNS: LazyLock<Vec<RepoPattern>> = LazyLock::new(|| {
    [
        (RepoHost::GitHub, r"^(https://github\.com/[^/]+/([^/]+))(?:/|$)"),
        (RepoHost::GitLab, r"^(https://gitlab\.com.*/([^/.]+))(?:\.git)?"),
        (RepoHost::GitLabSelfHosted, r"^(https://gitlab[^/]+/.*/([^/.]+))(?:\.git)?"),
        (RepoHost::Bitbucket, r"^(https://bitbucket\.org.*/([^/.]+))(?:\.git)?"),
        (RepoHost::GoogleCode, r"^(https://([^.]+)\.googlecode\.com)/svn"),
    ]
    .into_iter()
    .map(|(host, pattern)| RepoPattern {
        host,
        regex: Regex::new(pattern).expect("Invalid regex pattern for repo host"),
    })
    .collect()
});

/// Classify `url`, reporting which host pattern matched.
pub fn match_repo_url(url: &str) -> Option<(RepoHost, RepoRef)> {
    REPO_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.regex.captures(url)?;
        let root = caps.get(1)?.as_str();
        let name = caps.get(2)?.as_str();
        Some((pattern.host, RepoRef::new(root, name)))
    })
}

/// Canonical repository for an optional upstream URL.
///
/// Absent or unrecognised URLs yield `None`; this is never an error.
pub fn classify_repo_url(url: Option<&str>) -> Option<RepoRef> {
    url.and_then(match_repo_url).map(|(_, repo)| repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(url: &str) -> Option<(RepoHost, String, String)> {
        match_repo_url(url).map(|(host, r)| (host, r.url, r.name))
    }

    #[test]
    fn test_github_strips_trailing_path() {
        assert_eq!(
            classify("https://github.com/ros/ros_comm/tree/noetic-devel"),
            Some((
                RepoHost::GitHub,
                "https://github.com/ros/ros_comm".to_string(),
                "ros_comm".to_string()
            ))
        );
    }

    #[test]
    fn test_github_keeps_git_suffix() {
        let (_, url, name) = classify("https://github.com/ros/roscpp_core.git").unwrap();
        assert_eq!(url, "https://github.com/ros/roscpp_core.git");
        assert_eq!(name, "roscpp_core.git");
    }

    #[test]
    fn test_gitlab_nested_group_drops_git_suffix() {
        assert_eq!(
            classify("https://gitlab.com/group/subgroup/driver.git"),
            Some((
                RepoHost::GitLab,
                "https://gitlab.com/group/subgroup/driver".to_string(),
                "driver".to_string()
            ))
        );
    }

    #[test]
    fn test_self_hosted_gitlab() {
        assert_eq!(
            classify("https://gitlab.example.org/team/planner.git"),
            Some((
                RepoHost::GitLabSelfHosted,
                "https://gitlab.example.org/team/planner".to_string(),
                "planner".to_string()
            ))
        );
    }

    #[test]
    fn test_bitbucket() {
        assert_eq!(
            classify("https://bitbucket.org/osrf/gazebo"),
            Some((
                RepoHost::Bitbucket,
                "https://bitbucket.org/osrf/gazebo".to_string(),
                "gazebo".to_string()
            ))
        );
    }

    #[test]
    fn test_google_code_svn_mirror() {
        assert_eq!(
            classify("https://android-ros.googlecode.com/svn/trunk"),
            Some((
                RepoHost::GoogleCode,
                "https://android-ros.googlecode.com".to_string(),
                "android-ros".to_string()
            ))
        );
    }

    #[test]
    fn test_unrecognised_and_absent_urls() {
        assert_eq!(classify_repo_url(None), None);
        assert_eq!(classify_repo_url(Some("git@github.com:ros/ros_comm.git")), None);
        assert_eq!(classify_repo_url(Some("https://example.com/ros/ros_comm")), None);
        assert_eq!(classify_repo_url(Some("")), None);
    }
}
